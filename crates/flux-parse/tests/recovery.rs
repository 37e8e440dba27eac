//! Error recovery: the parser reports through the diagnostic sink and
//! keeps producing a best-effort partial tree.

use flux_ast::ast::*;
use flux_ast::diag::DiagnosticEngine;
use flux_ast::span::FileId;
use flux_parse::parse_source;

fn parse(src: &str) -> (Module, u32) {
    let mut diag = DiagnosticEngine::new();
    diag.set_handler(Box::new(|_| {}));
    let module = parse_source(src, FileId(0), &mut diag);
    (module, diag.error_count())
}

#[test]
fn missing_semicolon_recovers_at_next_statement() {
    let (module, errors) = parse(
        "func f() -> Void { let x: Int32 = 1 let y: Int32 = 2; }",
    );
    assert!(errors >= 1);

    let Decl::Func(func) = &module.decls[0] else {
        panic!("expected func");
    };
    // Both lets survive in the partial tree.
    let stmts = &func.body.as_ref().unwrap().stmts;
    assert_eq!(stmts.len(), 2);
    assert!(matches!(&stmts[0], Stmt::Let(l) if l.name == "x"));
    assert!(matches!(&stmts[1], Stmt::Let(l) if l.name == "y"));
}

#[test]
fn top_level_garbage_is_skipped() {
    let (module, errors) = parse("42 func f() -> Void { }");
    assert!(errors >= 1);
    assert_eq!(module.decls.len(), 1);
    assert!(matches!(&module.decls[0], Decl::Func(f) if f.name == "f"));
}

#[test]
fn let_without_type_annotation_is_diagnosed_but_parsed() {
    let (module, errors) = parse("func f() -> Void { let x = 5; }");
    assert!(errors >= 1);

    let Decl::Func(func) = &module.decls[0] else {
        panic!("expected func");
    };
    assert!(matches!(
        &func.body.as_ref().unwrap().stmts[0],
        Stmt::Let(l) if l.name == "x"
    ));
}

#[test]
fn top_level_let_is_rejected() {
    let (module, errors) = parse("let x: Int32 = 1;");
    assert!(errors >= 1);
    assert!(module.decls.is_empty());
}

#[test]
fn truncated_function_still_yields_a_declaration() {
    let (module, errors) = parse("func f( {");
    assert!(errors >= 1);
    assert_eq!(module.decls.len(), 1);
    assert!(matches!(&module.decls[0], Decl::Func(_)));
}

#[test]
fn bad_expression_statement_does_not_derail_the_block() {
    let (module, errors) = parse("func f() -> Void { ); g(); }");
    assert!(errors >= 1);

    let Decl::Func(func) = &module.decls[0] else {
        panic!("expected func");
    };
    // The call after the bad token still parses.
    assert!(func
        .body
        .as_ref()
        .unwrap()
        .stmts
        .iter()
        .any(|s| matches!(s, Stmt::Expr(e) if matches!(e.expr, Expr::Call { .. }))));
}

#[test]
fn error_count_only_grows() {
    let mut diag = DiagnosticEngine::new();
    diag.set_handler(Box::new(|_| {}));

    let src = "func f() -> Void { let a: = ; }";
    let _module = parse_source(src, FileId(0), &mut diag);
    let after_parse = diag.error_count();
    assert!(after_parse >= 1);

    // Re-running later passes can only append.
    let module = parse_source("func ok() -> Void { }", FileId(0), &mut diag);
    assert!(diag.error_count() >= after_parse);
    assert_eq!(module.decls.len(), 1);
}
