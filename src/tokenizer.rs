use std::collections::VecDeque;
use std::ops::Range;

use logos::{Lexer, Logos};

/// Preprocessing-token kinds of C and C++ source.
///
/// Only brackets, `<`/`>`, `,`, `;` and `#` carry structural meaning for the
/// validator; everything else is lexed just precisely enough that brackets inside
/// literals and comments are never mistaken for real ones.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f\x0B]+")]
#[logos(skip r"\\\r?\n")]
pub enum TokenKind {
    #[token("[")]
    LSquare,
    #[token("]")]
    RSquare,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token(">>")]
    GreaterGreater,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("#")]
    Hash,
    #[token("##")]
    HashHash,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    /// pp-number, digit separators included.
    #[regex(r"\.?[0-9]([0-9A-Za-z_.]|'[0-9A-Za-z_]|[eEpP][+-])*")]
    Numeric,
    #[regex(r#"(u8|u|U|L)?""#, quoted)]
    #[regex(r#"(u8|u|U|L)?R""#, raw_string)]
    StringLiteral,
    #[regex(r"(u8|u|U|L)?'", quoted)]
    CharLiteral,
    #[regex(r"//[^\n]*")]
    #[token("/*", block_comment)]
    Comment,

    // Punctuators spelled with '<' or '>' that must not read as angle brackets.
    #[token("<<")]
    #[token("<<=")]
    #[token("<=")]
    #[token("<=>")]
    #[token(">=")]
    #[token(">>=")]
    #[token("->")]
    #[token("->*")]
    #[regex(r"[-+*/%&|^!~=?:.]")]
    Punct,

    /// Lexical error: a character or literal the lexer could not classify.
    Unknown,
    Eof,
}

/// Consume the body of a string or character literal up to its closing quote.
///
/// An unterminated literal stops at the end of the line.
fn quoted(lex: &mut Lexer<TokenKind>) -> bool {
    let quote = if lex.slice().ends_with('\'') { b'\'' } else { b'"' };
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'\n' => break,
            c if c == quote => {
                i += 1;
                break;
            }
            _ => i += 1,
        }
    }
    lex.bump(i.min(rest.len()));
    true
}

/// Consume a raw string literal body: `R"delim( ... )delim"`.
fn raw_string(lex: &mut Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let Some(open) = rest.find('(') else {
        return false;
    };
    let delimiter = &rest[..open];
    if delimiter.len() > 16
        || delimiter.contains(|c: char| c.is_whitespace() || matches!(c, '\\' | ')' | '"'))
    {
        return false;
    }
    let terminator = format!("){}\"", delimiter);
    let body = open + 1;
    let end = rest[body..]
        .find(&terminator)
        .map_or(rest.len(), |at| body + at + terminator.len());
    lex.bump(end);
    true
}

fn block_comment(lex: &mut Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let end = rest.find("*/").map_or(rest.len(), |at| at + 2);
    lex.bump(end);
    true
}

/// Handle of a fragment registered with a [`SourceMap`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// A token with the fragment it came from and its byte range in that fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub file: FileId,
    pub span: Range<usize>,
}

/// Owns every fragment handed to a tokenizer so tokens keep valid locations.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<String>,
}

impl SourceMap {
    /// Register a fragment as a new synthetic buffer.
    pub fn add(&mut self, code: &str) -> FileId {
        self.files.push(code.to_owned());
        FileId(self.files.len() - 1)
    }

    /// Text of a registered buffer, or `""` for an unknown id.
    pub fn text(&self, file: FileId) -> &str {
        self.files.get(file.0).map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The lexing capability the validator needs from a compiler front end.
pub trait Tokenizer {
    /// Register `code` as a synthetic buffer and position the stream at its start.
    fn enter_source(&mut self, code: &str) -> FileId;

    /// Next non-comment token of the current buffer; `Eof` once it is exhausted.
    fn lex(&mut self) -> Token;

    /// Raw character data a token was lexed from.
    fn spelling(&self, token: &Token) -> &str;
}

/// [`Tokenizer`] over the built-in C/C++ lexer.
#[derive(Debug, Default)]
pub struct SourceLexer {
    sources: SourceMap,
    pending: VecDeque<Token>,
    current: FileId,
}

impl SourceLexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }
}

impl Tokenizer for SourceLexer {
    fn enter_source(&mut self, code: &str) -> FileId {
        let file = self.sources.add(code);
        self.current = file;
        self.pending = lex(code)
            .into_iter()
            .filter(|(kind, _)| *kind != TokenKind::Comment)
            .map(|(kind, span)| Token { kind, file, span })
            .collect();
        file
    }

    fn lex(&mut self) -> Token {
        self.pending.pop_front().unwrap_or_else(|| {
            let end = self.sources.text(self.current).len();
            Token {
                kind: TokenKind::Eof,
                file: self.current,
                span: end..end,
            }
        })
    }

    fn spelling(&self, token: &Token) -> &str {
        self.sources
            .text(token.file)
            .get(token.span.clone())
            .unwrap_or("")
    }
}

/// Lex a whole source string, comments included.
///
/// Lexical errors come back as [`TokenKind::Unknown`]; the trailing `Eof` is not
/// part of the result.
#[tracing::instrument(level = "trace", skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Vec<(TokenKind, Range<usize>)> {
    TokenKind::lexer(source)
        .spanned()
        .map(|(kind, span)| (kind.unwrap_or(TokenKind::Unknown), span))
        .collect()
}

/// Spellings of every identifier in `source`, in order of appearance.
pub fn identifiers(source: &str) -> Vec<&str> {
    lex(source)
        .into_iter()
        .filter(|(kind, _)| *kind == TokenKind::Identifier)
        .map(|(_, span)| &source[span])
        .collect()
}
