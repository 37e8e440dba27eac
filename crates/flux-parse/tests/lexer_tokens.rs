//! Lexer behavior: token kinds, numeric bases, disambiguation, and the
//! location invariants every token must satisfy.

use flux_ast::diag::DiagnosticEngine;
use flux_ast::span::{FileId, SourceManager};
use flux_parse::{Lexer, TokenKind, TokenValue};

fn quiet_diag() -> DiagnosticEngine {
    let mut diag = DiagnosticEngine::new();
    diag.set_handler(Box::new(|_| {}));
    diag
}

fn lex_kinds(src: &str) -> (Vec<TokenKind>, u32) {
    let mut diag = quiet_diag();
    let mut lexer = Lexer::new(src, FileId(0), &mut diag);
    let kinds = lexer.lex_all().iter().map(|t| t.kind).collect();
    (kinds, diag.error_count())
}

fn lex_int_values(src: &str) -> Vec<i64> {
    let mut diag = quiet_diag();
    let mut lexer = Lexer::new(src, FileId(0), &mut diag);
    lexer
        .lex_all()
        .iter()
        .filter_map(|t| match t.value {
            TokenValue::Int(v) => Some(v),
            _ => None,
        })
        .collect()
}

#[test]
fn empty_source_is_a_single_eof() {
    let (kinds, errors) = lex_kinds("");
    assert_eq!(kinds, vec![TokenKind::Eof]);
    assert_eq!(errors, 0);
}

#[test]
fn lex_all_ends_with_exactly_one_eof() {
    let (kinds, _) = lex_kinds("func main");
    assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Eof).count(), 1);
    assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);
}

#[test]
fn numeric_bases_and_underscores() {
    let values = lex_int_values("0xFF 0b1010 0o77 1_000_000");
    assert_eq!(values, vec![255, 10, 63, 1_000_000]);
}

#[test]
fn float_literals_with_exponents() {
    let mut diag = quiet_diag();
    let mut lexer = Lexer::new("3.14 1.0e10 2.5e-3 1e5", FileId(0), &mut diag);
    let floats: Vec<f64> = lexer
        .lex_all()
        .iter()
        .filter_map(|t| match t.value {
            TokenValue::Float(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(floats, vec![3.14, 1.0e10, 2.5e-3, 1e5]);
    assert_eq!(diag.error_count(), 0);
}

#[test]
fn dot_needs_a_digit_to_make_a_float() {
    // `1..3` is a range, not two floats.
    let (kinds, errors) = lex_kinds("1..3");
    assert_eq!(
        kinds,
        vec![
            TokenKind::IntLiteral,
            TokenKind::DotDot,
            TokenKind::IntLiteral,
            TokenKind::Eof
        ]
    );
    assert_eq!(errors, 0);
}

#[test]
fn lifetime_versus_char_literal() {
    let mut diag = quiet_diag();
    let mut lexer = Lexer::new("'a", FileId(0), &mut diag);
    let tokens = lexer.lex_all();
    assert_eq!(tokens[0].kind, TokenKind::Apostrophe);
    assert_eq!(tokens[0].text, "'a");
    assert_eq!(diag.error_count(), 0);

    let mut diag = quiet_diag();
    let mut lexer = Lexer::new("'a'", FileId(0), &mut diag);
    let tokens = lexer.lex_all();
    assert_eq!(tokens[0].kind, TokenKind::CharLiteral);
    assert_eq!(diag.error_count(), 0);
}

#[test]
fn escaped_char_literal() {
    let (kinds, errors) = lex_kinds(r"'\n'");
    assert_eq!(kinds[0], TokenKind::CharLiteral);
    assert_eq!(errors, 0);
}

#[test]
fn operator_spelling_round_trips() {
    use TokenKind::*;
    let kinds = [
        LParen, RParen, LBracket, RBracket, LBrace, RBrace, Comma, Semicolon, Colon, ColonColon,
        Dot, DotDot, DotDotEqual, DotDotDot, Arrow, FatArrow, At, Hash, HashBang, Plus, Minus,
        Star, Slash, Percent, Equal, EqualEqual, BangEqual, Less, LessEqual, Greater, GreaterEqual,
        Ampersand, Pipe, Caret, Tilde, ShiftLeft, ShiftRight, PlusEqual, MinusEqual, StarEqual,
        SlashEqual, PercentEqual, AmpersandEqual, PipeEqual, CaretEqual, Question, Underscore,
    ];

    for kind in kinds {
        let (lexed, errors) = lex_kinds(kind.as_str());
        assert_eq!(lexed, vec![kind, TokenKind::Eof], "kind {:?}", kind);
        assert_eq!(errors, 0, "kind {:?}", kind);
    }
}

#[test]
fn keywords_are_case_sensitive() {
    let (kinds, _) = lex_kinds("self Self selfish");
    assert_eq!(
        kinds,
        vec![
            TokenKind::KwSelf,
            TokenKind::KwSelfType,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn bare_underscore_versus_identifier() {
    let (kinds, _) = lex_kinds("_ _tmp");
    assert_eq!(
        kinds,
        vec![TokenKind::Underscore, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn comments_are_skipped_and_block_comments_nest() {
    let (kinds, errors) = lex_kinds("1 // line\n/* outer /* inner */ still outer */ 2");
    assert_eq!(
        kinds,
        vec![TokenKind::IntLiteral, TokenKind::IntLiteral, TokenKind::Eof]
    );
    assert_eq!(errors, 0);
}

#[test]
fn unterminated_block_comment_is_one_error() {
    let (kinds, errors) = lex_kinds("/* never closed");
    assert_eq!(errors, 1);
    assert_eq!(*kinds.last().unwrap(), TokenKind::Eof);
}

#[test]
fn string_text_is_the_content_without_quotes() {
    let mut diag = quiet_diag();
    let mut lexer = Lexer::new(r#""hello""#, FileId(0), &mut diag);
    let tokens = lexer.lex_all();
    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].text, "hello");
}

#[test]
fn newline_in_string_is_an_error() {
    let (_, errors) = lex_kinds("\"broken\nstring\"");
    assert!(errors >= 1);
}

#[test]
fn annotations() {
    let (kinds, _) = lex_kinds("@doc @deprecated @test @custom");
    assert_eq!(
        kinds,
        vec![
            TokenKind::KwDoc,
            TokenKind::KwDeprecated,
            TokenKind::KwTest,
            TokenKind::At,
            TokenKind::Identifier,
            TokenKind::Eof
        ]
    );
}

#[test]
fn bare_bang_is_an_error() {
    let (_, errors) = lex_kinds("!");
    assert_eq!(errors, 1);

    let (kinds, errors) = lex_kinds("a != b");
    assert_eq!(kinds[1], TokenKind::BangEqual);
    assert_eq!(errors, 0);
}

#[test]
fn missing_digits_after_base_prefix_is_an_error() {
    let (_, errors) = lex_kinds("0x");
    assert_eq!(errors, 1);
    let (_, errors) = lex_kinds("0b2");
    assert_eq!(errors, 1);
}

#[test]
fn token_locations_map_back_through_the_source_manager() {
    let src = "func add(a: Int32) -> Int32 {\n    return a;\n}\n";
    let mut sm = SourceManager::new();
    let file = sm.load_string("test.fl", src);

    let mut diag = quiet_diag();
    let mut lexer = Lexer::new(src, file, &mut diag);
    for tok in lexer.lex_all() {
        assert!(tok.loc.offset as usize <= src.len());
        let mapped = sm.location(file, tok.loc.offset);
        assert_eq!(mapped.line, tok.loc.line, "token {:?}", tok.kind);
        assert_eq!(mapped.column, tok.loc.column, "token {:?}", tok.kind);
    }
}

#[test]
fn peek_does_not_consume_and_state_restores() {
    let mut diag = quiet_diag();
    let mut lexer = Lexer::new("let x = 1;", FileId(0), &mut diag);

    let peeked = lexer.peek_token();
    let first = lexer.next_token();
    assert_eq!(peeked.kind, first.kind);
    assert_eq!(peeked.loc.offset, first.loc.offset);

    let state = lexer.save_state();
    let second = lexer.next_token();
    let third = lexer.next_token();
    lexer.restore_state(state);
    assert_eq!(lexer.next_token().kind, second.kind);
    assert_eq!(lexer.next_token().kind, third.kind);
}
