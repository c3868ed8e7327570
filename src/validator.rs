use crate::error::ValidatorError;
use crate::tokenizer::{TokenKind, Tokenizer};
use crate::types::{BalanceStack, Opener, Verdict};

/// Decides whether interactively typed C/C++ is complete, still open, or broken.
///
/// One validator serves one REPL session. Every [`validate`](Self::validate)
/// call scans a fragment, updates the bracket/conditional stack and appends the
/// fragment to the input collected for the current turn; [`reset`](Self::reset)
/// ends the turn.
#[derive(Debug, Default)]
pub struct InputValidator {
    /// The input being collected, fragments joined with newlines.
    input: String,
    /// Openers still waiting for their closers.
    stack: BalanceStack,
    /// Verdict of the last `validate()` call.
    last_verdict: Verdict,
}

impl InputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `code` together with everything collected since the last reset.
    ///
    /// The fragment is registered with `tokenizer` and lexed exactly once. It is
    /// appended to the collected input whatever the verdict, `Invalid` included.
    #[tracing::instrument(skip_all, fields(fragment_len = code.len()))]
    pub fn validate<T: Tokenizer + ?Sized>(&mut self, code: &str, tokenizer: &mut T) -> Verdict {
        tokenizer.enter_source(code);
        let (mut verdict, last) = self.scan(tokenizer);

        // A trailing comma keeps the turn open even over an invalid closer.
        // A trailing backslash is deliberately not a continuation marker.
        let trailing_comma = last == Some(TokenKind::Comma);
        if trailing_comma || (self.stack.has_pending() && verdict != Verdict::Invalid) {
            verdict = Verdict::Incomplete;
        }
        if !self.stack.has_pending() {
            self.stack.clear();
        }

        if !self.input.is_empty() {
            self.input.push('\n');
        }
        self.input.push_str(code);
        self.last_verdict = verdict;

        tracing::debug!(%verdict, depth = self.depth(), trailing_comma, "validated fragment");
        verdict
    }

    /// Run the balance scan over the current buffer of `tokenizer`.
    ///
    /// Returns the structural verdict and the kind of the token seen before the
    /// one that stopped the scan: the token ahead of `Eof`, or ahead of the
    /// closer or `#endif` that made the fragment invalid. A directive name stands
    /// in for its `#`.
    fn scan<T: Tokenizer + ?Sized>(&mut self, tokenizer: &mut T) -> (Verdict, Option<TokenKind>) {
        let mut verdict = Verdict::Complete;
        let mut last = None;
        let mut current = None;

        while verdict != Verdict::Invalid {
            last = current;
            let token = tokenizer.lex();
            let kind = token.kind;
            current = Some(kind);
            if kind == TokenKind::Eof {
                break;
            }

            if let Some(opener) = Opener::opened_by(kind) {
                self.stack.push(opener);
                tracing::trace!(?opener, depth = self.stack.len(), "push");
            } else if let Some(expected) = Opener::closed_by(kind) {
                if !self.close_bracket(kind, expected) {
                    verdict = Verdict::Invalid;
                }
            } else {
                match kind {
                    TokenKind::Less => self.stack.push(Opener::TemplateAngle),
                    TokenKind::Greater => self.close_template_markers(1),
                    TokenKind::GreaterGreater => self.close_template_markers(2),
                    TokenKind::Semi => self.stack.discard_template_markers(),
                    TokenKind::Hash => {
                        let name = tokenizer.lex();
                        if name.kind == TokenKind::Eof {
                            break;
                        }
                        if !self.directive(tokenizer.spelling(&name)) {
                            verdict = Verdict::Invalid;
                        }
                        current = Some(name.kind);
                    }
                    _ => {}
                }
            }
        }

        (verdict, last)
    }

    /// Match a closing bracket against the top of the stack.
    fn close_bracket(&mut self, closer: TokenKind, expected: Opener) -> bool {
        self.stack.discard_template_markers();
        if self.stack.top() != Some(expected) {
            tracing::trace!(?closer, top = ?self.stack.top(), "unmatched closer");
            return false;
        }
        self.stack.pop();

        // '}' also closes the template argument list it sits in: `Foo<Bar{1, 2}>`.
        if closer == TokenKind::RBrace
            && self.stack.len() == 1
            && self.stack.top() == Some(Opener::TemplateAngle)
        {
            self.stack.pop();
        }
        true
    }

    fn close_template_markers(&mut self, count: usize) {
        for _ in 0..count {
            if self.stack.top() != Some(Opener::TemplateAngle) {
                break;
            }
            self.stack.pop();
        }
    }

    /// Track `#if`-class and `#endif` directives by the spelling of their name.
    ///
    /// `#else` and `#elif` leave the stack alone.
    fn directive(&mut self, name: &str) -> bool {
        if name.starts_with("if") {
            self.stack.push(Opener::Conditional);
            tracing::trace!(directive = name, depth = self.stack.len(), "push");
        } else if is_endif(name) {
            self.stack.discard_template_markers();
            if self.stack.top() != Some(Opener::Conditional) {
                tracing::trace!(top = ?self.stack.top(), "unmatched #endif");
                return false;
            }
            self.stack.pop();
        }
        true
    }

    /// End the turn.
    ///
    /// With `Some(out)` the collected input is moved into `out`, which must be
    /// empty; a non-empty destination is rejected and nothing changes. With `None`
    /// the input is dropped. Either way the stack is cleared and the last verdict
    /// goes back to `Complete`.
    pub fn reset(&mut self, out: Option<&mut String>) -> Result<(), ValidatorError> {
        match out {
            Some(dest) if !dest.is_empty() => {
                return Err(ValidatorError::NonEmptyDestination { len: dest.len() });
            }
            Some(dest) => std::mem::swap(dest, &mut self.input),
            None => {}
        }
        self.discard();
        Ok(())
    }

    /// End the turn, dropping the collected input.
    pub fn discard(&mut self) {
        self.input = String::new();
        self.stack.clear();
        self.last_verdict = Verdict::Complete;
    }

    /// End the turn and hand back the collected input.
    pub fn take_input(&mut self) -> String {
        let input = std::mem::take(&mut self.input);
        self.discard();
        input
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_verdict(&self) -> Verdict {
        self.last_verdict
    }

    pub fn stack(&self) -> &BalanceStack {
        &self.stack
    }

    /// Number of unmatched openers. Template markers are not counted.
    pub fn depth(&self) -> usize {
        self.stack.pending_len()
    }
}

/// `endif` followed by nothing, a slash or whitespace.
fn is_endif(name: &str) -> bool {
    name.strip_prefix("endif").is_some_and(|rest| {
        rest.is_empty() || rest.starts_with('/') || rest.starts_with(char::is_whitespace)
    })
}
