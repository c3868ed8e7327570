use std::collections::BTreeSet;

use crate::config;
use crate::error::ValidatorError;
use crate::tokenizer::{self, SourceLexer, Tokenizer};
use crate::types::Verdict;
use crate::validator::InputValidator;

/// What the REPL driver should do after feeding one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Blank line outside a turn; nothing to do.
    Empty,
    /// The turn is still open: ask for another line.
    Continue,
    /// The turn closed with a complete unit.
    Ready(String),
    /// The turn closed as invalid; its text was discarded from the session.
    Rejected(String),
}

/// One interactive session: a validator, the tokenizer it lexes with, and
/// bookkeeping across turns.
pub struct Session<T: Tokenizer = SourceLexer> {
    validator: InputValidator,
    tokenizer: T,
    /// Identifiers seen in accepted units, for completion.
    identifiers: BTreeSet<String>,
    accepted: usize,
    rejected: usize,
}

impl Default for Session<SourceLexer> {
    fn default() -> Self {
        Self::new()
    }
}

impl Session<SourceLexer> {
    pub fn new() -> Self {
        Self::with_tokenizer(SourceLexer::new())
    }
}

impl<T: Tokenizer> Session<T> {
    pub fn with_tokenizer(tokenizer: T) -> Self {
        Session {
            validator: InputValidator::new(),
            tokenizer,
            identifiers: BTreeSet::new(),
            accepted: 0,
            rejected: 0,
        }
    }

    /// Feed one line of input.
    ///
    /// Blank lines only count inside an open turn. A turn that resolves is
    /// drained from the validator and handed back.
    pub fn feed(&mut self, line: &str) -> Result<Outcome, ValidatorError> {
        if !self.is_continuing() && line.trim().is_empty() {
            return Ok(Outcome::Empty);
        }

        match self.validator.validate(line, &mut self.tokenizer) {
            Verdict::Incomplete => Ok(Outcome::Continue),
            Verdict::Complete => {
                let mut unit = String::new();
                self.validator.reset(Some(&mut unit))?;
                self.accepted += 1;
                self.identifiers
                    .extend(tokenizer::identifiers(&unit).into_iter().map(str::to_owned));
                Ok(Outcome::Ready(unit))
            }
            Verdict::Invalid | Verdict::Unknown => {
                let mut text = String::new();
                self.validator.reset(Some(&mut text))?;
                self.rejected += 1;
                tracing::warn!(lines = text.lines().count(), "discarding unbalanced input");
                Ok(Outcome::Rejected(text))
            }
        }
    }

    /// Drop the open turn, if any.
    pub fn cancel(&mut self) {
        if self.is_continuing() {
            tracing::debug!("turn cancelled");
        }
        self.validator.discard();
    }

    /// Hand back input of a turn that never closed, ending it.
    pub fn finish(&mut self) -> Option<String> {
        if !self.is_continuing() {
            return None;
        }
        Some(self.validator.take_input())
    }

    /// Whether the last line left the turn open.
    pub fn is_continuing(&self) -> bool {
        self.validator.last_verdict() == Verdict::Incomplete
    }

    pub fn prompt(&self) -> &'static str {
        if self.is_continuing() {
            config::CONTINUATION_PROMPT
        } else {
            config::PROMPT
        }
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }
}
