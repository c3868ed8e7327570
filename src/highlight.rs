use std::borrow::Cow;
use std::collections::HashSet;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper, Result};

use crate::tokenizer::{self, TokenKind};

/// The rustyline helper for cxxrepl.
///
/// Combines syntax highlighting and tab-completion (keywords + identifiers from
/// accepted units). Line validation is left to the session, which sees every line
/// of a turn, so the rustyline validator accepts whatever is entered.
#[derive(Default)]
pub struct CxxHelper {
    /// Identifiers known to the session, synced before each readline.
    pub known_words: HashSet<String>,
}

impl CxxHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the set of known identifiers.
    pub fn update_words<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        self.known_words.clear();
        self.known_words.extend(words.into_iter().map(str::to_owned));
    }
}

impl Helper for CxxHelper {}

// ========== Highlighter ==========

/// ANSI color codes.
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

/// Keywords that get magenta highlighting.
const KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "constexpr", "continue",
    "decltype", "default", "delete", "do", "double", "else", "enum", "explicit", "extern",
    "false", "float", "for", "friend", "if", "inline", "int", "long", "namespace", "new",
    "noexcept", "nullptr", "operator", "private", "protected", "public", "return", "short",
    "signed", "sizeof", "static", "static_assert", "struct", "switch", "template", "this",
    "throw", "true", "try", "typedef", "typename", "union", "unsigned", "using", "virtual",
    "void", "volatile", "while",
];

fn color_for(kind: TokenKind, text: &str, in_directive: bool) -> Option<&'static str> {
    match kind {
        TokenKind::StringLiteral | TokenKind::CharLiteral => Some(YELLOW),
        TokenKind::Numeric => Some(CYAN),
        TokenKind::Comment => Some(GREY),
        TokenKind::Hash | TokenKind::HashHash => Some(GREEN),
        TokenKind::Identifier if in_directive => Some(GREEN),
        TokenKind::Identifier if KEYWORDS.contains(&text) => Some(MAGENTA),
        _ => None,
    }
}

impl Highlighter for CxxHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.is_empty() {
            return Cow::Borrowed(line);
        }

        let tokens = tokenizer::lex(line);
        if tokens.is_empty() {
            return Cow::Borrowed(line);
        }

        let mut result = String::with_capacity(line.len() + tokens.len() * 10);
        let mut last_end: usize = 0;
        let mut after_hash = false;

        for (kind, span) in tokens {
            // Append any gap between last token end and this token start
            if span.start > last_end {
                result.push_str(&line[last_end..span.start]);
            }

            let text = &line[span.clone()];
            match color_for(kind, text, after_hash) {
                Some(color) => {
                    result.push_str(color);
                    result.push_str(text);
                    result.push_str(RESET);
                }
                None => result.push_str(text),
            }

            // Only the name right after '#' is a directive name
            after_hash = kind == TokenKind::Hash;
            last_end = span.end;
        }

        // Append any trailing text
        if last_end < line.len() {
            result.push_str(&line[last_end..]);
        }

        Cow::Owned(result)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        // Always re-highlight (simple approach)
        true
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, _default: bool) -> Cow<'b, str> {
        Cow::Borrowed(prompt)
    }
}

// ========== Validator (pass-through) ==========

impl Validator for CxxHelper {}

// ========== Completer ==========

impl Completer for CxxHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>)> {
        let (word_start, word) = find_word_at(line, pos);
        if word.is_empty() {
            return Ok((pos, Vec::new()));
        }

        let mut completions: Vec<Pair> = KEYWORDS
            .iter()
            .copied()
            .chain(self.known_words.iter().map(String::as_str))
            .filter(|w| w.starts_with(word) && *w != word)
            .collect::<HashSet<&str>>()
            .into_iter()
            .map(|w| Pair {
                display: w.to_string(),
                replacement: w.to_string(),
            })
            .collect();
        completions.sort_by(|a, b| a.display.cmp(&b.display));

        Ok((word_start, completions))
    }
}

/// Find the identifier being typed at the cursor position.
/// Returns (start_position, word_slice).
fn find_word_at(line: &str, pos: usize) -> (usize, &str) {
    let bytes = line.as_bytes();
    let mut start = pos;
    while start > 0 && (bytes[start - 1].is_ascii_alphanumeric() || bytes[start - 1] == b'_') {
        start -= 1;
    }
    (start, &line[start..pos])
}

// ========== Hinter (no-op) ==========

impl Hinter for CxxHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}
