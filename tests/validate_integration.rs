use std::collections::VecDeque;

use rstest::rstest;

use cxxrepl::tokenizer::{FileId, SourceLexer, Token, TokenKind, Tokenizer};
use cxxrepl::types::Verdict::{self, *};
use cxxrepl::validator::InputValidator;

/// Helper: feed lines into a fresh validator and collect the verdicts.
fn verdicts(lines: &[&str]) -> Vec<Verdict> {
    let mut validator = InputValidator::new();
    let mut lexer = SourceLexer::new();
    lines
        .iter()
        .map(|line| validator.validate(line, &mut lexer))
        .collect()
}

// ========== Single fragments ==========

#[rstest]
#[case("int x = 42;", Complete)]
#[case("std::cout << \"hi\" << std::endl;", Complete)]
#[case("x;", Complete)]
#[case("", Complete)]
#[case("int a[] = {1, 2, 3};", Complete)]
#[case("auto f = [](int v) { return v * 2; };", Complete)]
#[case("Foo<Bar{1,2}>", Complete)]
#[case("template <typename T> struct Box { T value; };", Complete)]
#[case("if (a < b && c > d) x = 1;", Complete)]
#[case("bool lt = a < b;", Complete)]
#[case("foo(1, 2,", Incomplete)]
#[case("int f() {", Incomplete)]
#[case("arr[", Incomplete)]
#[case("call((", Incomplete)]
#[case("#if X", Incomplete)]
#[case("#ifdef DEBUG", Incomplete)]
#[case("#ifndef GUARD", Incomplete)]
#[case(")", Invalid)]
#[case("}", Invalid)]
#[case("]", Invalid)]
#[case("(]", Invalid)]
#[case("[)", Invalid)]
#[case("{ ) }", Invalid)]
#[case("#endif", Invalid)]
#[case("( #endif", Invalid)]
#[case("const char* s = \"(((\";", Complete)]
#[case("auto r = R\"delim(}}})delim\";", Complete)]
#[case("int y; /* { */", Complete)]
#[case("char open = '{';", Complete)]
fn single_fragment(#[case] code: &str, #[case] expected: Verdict) {
    assert_eq!(verdicts(&[code]), vec![expected]);
}

// ========== Multi-line turns ==========

#[rstest]
#[case(&["foo(1, 2,", "3)"], &[Incomplete, Complete])]
#[case(&["#if X", "#endif"], &[Incomplete, Complete])]
#[case(&["int main() {", "  return 0;", "}"], &[Incomplete, Incomplete, Complete])]
#[case(&["struct S {", "  int v[3];", "};"], &[Incomplete, Incomplete, Complete])]
#[case(&["f(", "  {1, 2},", "  [] { return 0; }", ");"], &[Incomplete, Incomplete, Incomplete, Complete])]
#[case(&["#if A", "#elif B", "#else", "#endif"], &[Incomplete, Incomplete, Incomplete, Complete])]
#[case(&["#if A", "#if B", "#endif", "#endif"], &[Incomplete, Incomplete, Incomplete, Complete])]
#[case(&["std::map<std::string,", "int> counts;"], &[Incomplete, Complete])]
#[case(&["void f() {", "}", "}"], &[Incomplete, Complete, Invalid])]
#[case(&["(", "}"], &[Incomplete, Invalid])]
#[case(&["{", "#endif"], &[Incomplete, Invalid])]
#[case(&["f(a,]"], &[Incomplete])]
#[case(&["a, #endif"], &[Incomplete])]
#[case(&["a, #"], &[Incomplete])]
fn multi_line_turn(#[case] lines: &[&str], #[case] expected: &[Verdict]) {
    assert_eq!(verdicts(lines), expected.to_vec());
}

#[test]
fn unmatched_opener_stays_until_closed() {
    for (open, close) in [("[", "]"), ("{", "}"), ("(", ")")] {
        let mut validator = InputValidator::new();
        let mut lexer = SourceLexer::new();
        assert_eq!(validator.validate(&format!("x = {}", open), &mut lexer), Incomplete);
        assert_eq!(validator.depth(), 1);
        assert_eq!(validator.validate(close, &mut lexer), Complete);
        assert_eq!(validator.depth(), 0);
    }
}

#[test]
fn reset_returns_whole_turn() {
    let lines = ["int main() {", "  int v[] = {1,", "    2};", "}"];
    let mut validator = InputValidator::new();
    let mut lexer = SourceLexer::new();
    for line in &lines {
        validator.validate(line, &mut lexer);
    }
    assert_eq!(validator.last_verdict(), Complete);

    let mut out = String::new();
    validator.reset(Some(&mut out)).unwrap();
    assert_eq!(out, lines.join("\n"));
}

// ========== Capability interface ==========

/// A tokenizer that replays scripted tokens, one script per fragment.
struct ScriptedTokenizer {
    scripts: VecDeque<Vec<(TokenKind, &'static str)>>,
    current: Vec<(TokenKind, &'static str)>,
    next: usize,
    entered: Vec<String>,
}

impl ScriptedTokenizer {
    fn new(scripts: Vec<Vec<(TokenKind, &'static str)>>) -> Self {
        ScriptedTokenizer {
            scripts: scripts.into(),
            current: Vec::new(),
            next: 0,
            entered: Vec::new(),
        }
    }
}

impl Tokenizer for ScriptedTokenizer {
    fn enter_source(&mut self, code: &str) -> FileId {
        self.entered.push(code.to_string());
        self.current = self.scripts.pop_front().unwrap_or_default();
        self.next = 0;
        FileId::default()
    }

    fn lex(&mut self) -> Token {
        let index = self.next;
        let kind = match self.current.get(index) {
            Some((kind, _)) => {
                self.next += 1;
                *kind
            }
            None => TokenKind::Eof,
        };
        Token {
            kind,
            file: FileId::default(),
            span: index..index + 1,
        }
    }

    fn spelling(&self, token: &Token) -> &str {
        self.current
            .get(token.span.start)
            .map_or("", |(_, text)| *text)
    }
}

#[test]
fn validator_only_sees_the_token_stream() {
    use TokenKind::*;

    // The fragment text is irrelevant; only the scripted tokens count.
    let mut tokenizer = ScriptedTokenizer::new(vec![
        vec![(Hash, "#"), (Identifier, "ifdef"), (LParen, "(")],
        vec![(Unknown, "@"), (RParen, ")")],
        vec![(Hash, "#"), (Identifier, "endif")],
    ]);
    let mut validator = InputValidator::new();

    assert_eq!(validator.validate("one", &mut tokenizer), Incomplete);
    assert_eq!(validator.validate("two", &mut tokenizer), Incomplete);
    assert_eq!(validator.validate("three", &mut tokenizer), Complete);
    assert_eq!(tokenizer.entered, vec!["one", "two", "three"]);
    assert_eq!(validator.input(), "one\ntwo\nthree");
}

#[test]
fn scripted_mismatch_is_invalid() {
    use TokenKind::*;

    let mut tokenizer = ScriptedTokenizer::new(vec![vec![
        (LSquare, "["),
        (Identifier, "x"),
        (RBrace, "}"),
    ]]);
    let mut validator = InputValidator::new();
    assert_eq!(validator.validate("[x}", &mut tokenizer), Invalid);
}

#[test]
fn scripted_comma_before_mismatch_continues() {
    use TokenKind::*;

    let mut tokenizer = ScriptedTokenizer::new(vec![vec![
        (LSquare, "["),
        (Comma, ","),
        (RBrace, "}"),
    ]]);
    let mut validator = InputValidator::new();
    assert_eq!(validator.validate("[,}", &mut tokenizer), Incomplete);
}
