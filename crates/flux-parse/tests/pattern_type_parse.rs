//! Pattern grammar (match arms) and the type grammar.

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

/// Parse a single match statement over `x` and return its arms.
fn parse_arms(arms: &str) -> Vec<MatchArm> {
    let src = format!("func test(x: Int32) -> Void {{ match x {{ {} }} }}", arms);
    let (mut module, errors) = parse(&src);
    assert_eq!(errors, 0, "unexpected parse errors for '{}'", arms);
    let Decl::Func(func) = module.decls.remove(0) else {
        panic!("expected func");
    };
    let Stmt::Match(m) = func.body.unwrap().stmts.remove(0) else {
        panic!("expected match statement");
    };
    m.arms
}

/// Parse the declared type of a `let` statement.
fn parse_ty(ty: &str) -> TypeNode {
    let src = format!("func test() -> Void {{ let v: {}; }}", ty);
    let (mut module, errors) = parse(&src);
    assert_eq!(errors, 0, "unexpected parse errors for '{}'", ty);
    let Decl::Func(func) = module.decls.remove(0) else {
        panic!("expected func");
    };
    let Stmt::Let(l) = func.body.unwrap().stmts.remove(0) else {
        panic!("expected let");
    };
    l.ty.unwrap()
}

// ============================================================================
// Patterns
// ============================================================================

#[test]
fn wildcard_and_binding_patterns() {
    let arms = parse_arms("_ => 1, other => 2,");
    assert!(matches!(arms[0].pattern, Pattern::Wildcard { .. }));
    assert!(matches!(
        arms[1].pattern,
        Pattern::Ident { ref name, .. } if name == "other"
    ));
}

#[test]
fn literal_patterns() {
    let arms = parse_arms("0 => 1, \"hi\" => 2, true => 3,");
    assert!(matches!(
        arms[0].pattern,
        Pattern::Literal { ref literal, .. }
            if matches!(literal.as_ref(), Expr::IntLiteral { value: 0, .. })
    ));
    assert!(matches!(
        arms[1].pattern,
        Pattern::Literal { ref literal, .. }
            if matches!(literal.as_ref(), Expr::StringLiteral { value, .. } if value == "hi")
    ));
    assert!(matches!(
        arms[2].pattern,
        Pattern::Literal { ref literal, .. }
            if matches!(literal.as_ref(), Expr::BoolLiteral { value: true, .. })
    ));
}

#[test]
fn tuple_pattern() {
    let arms = parse_arms("(a, b, _) => 1,");
    let Pattern::Tuple { elements, .. } = &arms[0].pattern else {
        panic!("expected tuple pattern");
    };
    assert_eq!(elements.len(), 3);
    assert!(matches!(elements[2], Pattern::Wildcard { .. }));
}

#[test]
fn qualified_constructor_with_positional_fields() {
    let arms = parse_arms("Option::Some(value) => 1,");
    let Pattern::Constructor {
        path, positional, ..
    } = &arms[0].pattern
    else {
        panic!("expected constructor pattern");
    };
    assert_eq!(path, &["Option", "Some"]);
    assert_eq!(positional.len(), 1);
    assert!(matches!(
        positional[0],
        Pattern::Ident { ref name, .. } if name == "value"
    ));
}

#[test]
fn single_segment_constructor_with_parens() {
    let arms = parse_arms("Some(v) => 1,");
    let Pattern::Constructor { path, positional, .. } = &arms[0].pattern else {
        panic!("expected constructor pattern");
    };
    assert_eq!(path, &["Some"]);
    assert_eq!(positional.len(), 1);
}

#[test]
fn named_field_pattern_with_shorthand() {
    let arms = parse_arms("Message::Move { x, y: dest } => 1,");
    let Pattern::Constructor { path, named, .. } = &arms[0].pattern else {
        panic!("expected constructor pattern");
    };
    assert_eq!(path, &["Message", "Move"]);
    assert_eq!(named.len(), 2);

    // `{ x }` is shorthand for `{ x: x }`.
    assert_eq!(named[0].name, "x");
    assert!(matches!(
        named[0].pattern,
        Pattern::Ident { ref name, .. } if name == "x"
    ));

    assert_eq!(named[1].name, "y");
    assert!(matches!(
        named[1].pattern,
        Pattern::Ident { ref name, .. } if name == "dest"
    ));
}

#[test]
fn unit_variant_constructor() {
    let arms = parse_arms("Option::None => 1,");
    let Pattern::Constructor {
        path,
        positional,
        named,
        ..
    } = &arms[0].pattern
    else {
        panic!("expected constructor pattern");
    };
    assert_eq!(path, &["Option", "None"]);
    assert!(positional.is_empty() && named.is_empty());
}

#[test]
fn or_pattern() {
    let arms = parse_arms("0 | 1 | 2 => 1,");
    let Pattern::Or { alternatives, .. } = &arms[0].pattern else {
        panic!("expected or pattern");
    };
    assert_eq!(alternatives.len(), 3);
}

#[test]
fn nested_constructor_pattern() {
    let arms = parse_arms("Option::Some((a, b)) => 1,");
    let Pattern::Constructor { positional, .. } = &arms[0].pattern else {
        panic!("expected constructor pattern");
    };
    assert!(matches!(positional[0], Pattern::Tuple { .. }));
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn named_and_path_types() {
    assert!(matches!(
        parse_ty("Int32"),
        TypeNode::Named { ref path, .. } if path == &["Int32"]
    ));
    assert!(matches!(
        parse_ty("std::collections::Map"),
        TypeNode::Named { ref path, .. } if path == &["std", "collections", "Map"]
    ));
}

#[test]
fn void_and_self_shortcuts() {
    assert!(matches!(
        parse_ty("Void"),
        TypeNode::Named { ref path, .. } if path == &["Void"]
    ));
    assert!(matches!(
        parse_ty("Self"),
        TypeNode::Named { ref path, .. } if path == &["Self"]
    ));
}

#[test]
fn reference_types() {
    let TypeNode::Reference { inner, lifetime, .. } = parse_ty("ref Int32") else {
        panic!("expected reference type");
    };
    assert!(lifetime.is_none());
    assert!(matches!(*inner, TypeNode::Named { .. }));

    let TypeNode::Reference { lifetime, .. } = parse_ty("ref 'a Int32") else {
        panic!("expected reference type");
    };
    assert_eq!(lifetime.as_deref(), Some("a"));

    assert!(matches!(parse_ty("&Int32"), TypeNode::Reference { .. }));
}

#[test]
fn mutable_reference_types() {
    assert!(matches!(parse_ty("mut ref String"), TypeNode::MutRef { .. }));
    assert!(matches!(parse_ty("&mut String"), TypeNode::MutRef { .. }));
}

#[test]
fn tuple_type() {
    let TypeNode::Tuple { elements, .. } = parse_ty("(Int32, Bool, String)") else {
        panic!("expected tuple type");
    };
    assert_eq!(elements.len(), 3);
}

#[test]
fn function_type() {
    let TypeNode::Function { params, ret, .. } = parse_ty("(Int32, Int32) -> Int32") else {
        panic!("expected function type");
    };
    assert_eq!(params.len(), 2);
    assert!(matches!(
        *ret,
        TypeNode::Named { ref path, .. } if path == &["Int32"]
    ));
}

#[test]
fn generic_types() {
    let TypeNode::Generic { base, args, .. } = parse_ty("Vec<Int32>") else {
        panic!("expected generic type");
    };
    assert!(matches!(
        *base,
        TypeNode::Named { ref path, .. } if path == &["Vec"]
    ));
    assert_eq!(args.len(), 1);

    let TypeNode::Generic { args, .. } = parse_ty("Map<String, Vec<Int32>>") else {
        panic!("expected generic type");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(args[1], TypeNode::Generic { .. }));
}

#[test]
fn function_type_as_parameter() {
    let (module, errors) = parse(
        "func apply(f: (Int32) -> Int32, x: Int32) -> Int32 { return f(x); }",
    );
    assert_eq!(errors, 0);
    let Decl::Func(func) = &module.decls[0] else {
        panic!("expected func");
    };
    assert!(matches!(
        func.params[0].ty,
        Some(TypeNode::Function { .. })
    ));
}
