use std::fmt;

use crate::tokenizer::TokenKind;

/// Classification of the input collected so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// A self-contained unit, ready to hand to the compiler.
    #[default]
    Complete,
    /// More input is required before the unit can close.
    Incomplete,
    /// Structurally malformed; no amount of extra input can fix it.
    Invalid,
    /// Reserved. Never produced by the balance scan.
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Complete => "complete",
            Verdict::Incomplete => "incomplete",
            Verdict::Invalid => "invalid",
            Verdict::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// An unmatched opener on the balance stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opener {
    Square,
    Brace,
    Paren,
    /// An `#if`, `#ifdef` or `#ifndef` waiting for its `#endif`.
    Conditional,
    /// A `<` that may open a template argument list.
    ///
    /// Soft: it may just as well be a comparison, so it never keeps a fragment
    /// open on its own.
    TemplateAngle,
}

/// Bracket pairs: opening token, closing token, stack entry.
const BRACKET_PAIRS: [(TokenKind, TokenKind, Opener); 3] = [
    (TokenKind::LSquare, TokenKind::RSquare, Opener::Square),
    (TokenKind::LBrace, TokenKind::RBrace, Opener::Brace),
    (TokenKind::LParen, TokenKind::RParen, Opener::Paren),
];

impl Opener {
    /// The stack entry pushed for an opening bracket token.
    pub fn opened_by(kind: TokenKind) -> Option<Opener> {
        BRACKET_PAIRS
            .iter()
            .find(|(open, _, _)| *open == kind)
            .map(|(_, _, opener)| *opener)
    }

    /// The stack entry a closing bracket token must find on top.
    pub fn closed_by(kind: TokenKind) -> Option<Opener> {
        BRACKET_PAIRS
            .iter()
            .find(|(_, close, _)| *close == kind)
            .map(|(_, _, opener)| *opener)
    }

    /// The closing token for a bracket opener.
    pub fn closer(self) -> Option<TokenKind> {
        BRACKET_PAIRS
            .iter()
            .find(|(_, _, opener)| *opener == self)
            .map(|(_, close, _)| *close)
    }

    pub fn is_template(self) -> bool {
        self == Opener::TemplateAngle
    }
}

/// LIFO of unmatched openers, carried across the fragments of one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceStack {
    entries: Vec<Opener>,
}

impl BalanceStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, opener: Opener) {
        self.entries.push(opener);
    }

    pub fn pop(&mut self) -> Option<Opener> {
        self.entries.pop()
    }

    pub fn top(&self) -> Option<Opener> {
        self.entries.last().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[Opener] {
        &self.entries
    }

    /// Pop every template marker sitting on top of the stack.
    pub fn discard_template_markers(&mut self) {
        while self.top().is_some_and(Opener::is_template) {
            self.entries.pop();
        }
    }

    /// Number of openers other than template markers.
    pub fn pending_len(&self) -> usize {
        self.entries.iter().filter(|opener| !opener.is_template()).count()
    }

    /// Whether an opener other than a template marker is still unmatched.
    pub fn has_pending(&self) -> bool {
        self.entries.iter().any(|opener| !opener.is_template())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing_table() {
        assert_eq!(Opener::opened_by(TokenKind::LBrace), Some(Opener::Brace));
        assert_eq!(Opener::closed_by(TokenKind::RSquare), Some(Opener::Square));
        assert_eq!(Opener::closed_by(TokenKind::LParen), None);
        assert_eq!(Opener::opened_by(TokenKind::Less), None);
        assert_eq!(Opener::Paren.closer(), Some(TokenKind::RParen));
        assert_eq!(Opener::Conditional.closer(), None);
    }

    #[test]
    fn test_discard_template_markers_stops_at_hard_opener() {
        let mut stack = BalanceStack::new();
        stack.push(Opener::TemplateAngle);
        stack.push(Opener::Paren);
        stack.push(Opener::TemplateAngle);
        stack.push(Opener::TemplateAngle);
        stack.discard_template_markers();
        assert_eq!(stack.as_slice(), &[Opener::TemplateAngle, Opener::Paren]);
    }

    #[test]
    fn test_has_pending() {
        let mut stack = BalanceStack::new();
        assert!(!stack.has_pending());
        stack.push(Opener::TemplateAngle);
        assert!(!stack.has_pending());
        stack.push(Opener::Conditional);
        assert!(stack.has_pending());
        stack.push(Opener::TemplateAngle);
        assert_eq!(stack.pending_len(), 1);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Incomplete.to_string(), "incomplete");
        assert_eq!(Verdict::default(), Verdict::Complete);
    }
}
