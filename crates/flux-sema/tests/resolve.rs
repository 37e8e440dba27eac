//! Name resolution over parsed source: registration, scoping, and
//! undeclared-identifier / redefinition diagnostics.

use flux_ast::diag::DiagnosticEngine;
use flux_ast::span::FileId;
use flux_parse::parse_source;
use flux_sema::{NameResolver, ScopeTree, Sema, SymbolKind};

fn quiet_diag() -> DiagnosticEngine {
    let mut diag = DiagnosticEngine::new();
    diag.set_handler(Box::new(|_| {}));
    diag
}

/// Parse (asserting no syntax errors), resolve, and return the error count
/// plus collected messages.
fn resolve(src: &str) -> (u32, Vec<String>) {
    let mut diag = quiet_diag();
    let module = parse_source(src, FileId(0), &mut diag);
    assert_eq!(diag.error_count(), 0, "unexpected parse errors in {:?}", src);

    let mut scopes = ScopeTree::new();
    NameResolver::new(&mut diag, &mut scopes).resolve(&module);

    let messages = diag
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect();
    (diag.error_count(), messages)
}

#[test]
fn simple_function_resolves_cleanly() {
    let (errors, _) = resolve("func add(a: Int32, b: Int32) -> Int32 { return a + b; }");
    assert_eq!(errors, 0);
}

#[test]
fn generic_struct_registers_a_symbol() {
    let mut diag = quiet_diag();
    let module = parse_source(
        "struct Pair<A, B> { first: A, second: B, }",
        FileId(0),
        &mut diag,
    );
    assert_eq!(diag.error_count(), 0);

    let mut scopes = ScopeTree::new();
    NameResolver::new(&mut diag, &mut scopes).resolve(&module);
    assert_eq!(diag.error_count(), 0);

    let sym = scopes.lookup(scopes.root(), "Pair").expect("Pair symbol");
    assert_eq!(sym.kind, SymbolKind::Struct);
    assert_eq!(sym.generic_params, vec!["A", "B"]);
}

#[test]
fn duplicate_declarations_are_redefinitions() {
    let (errors, messages) = resolve("func foo() -> Void {} func foo() -> Void {}");
    assert!(errors >= 1);
    assert!(messages.iter().any(|m| m.contains("redefinition of 'foo'")));
}

#[test]
fn undeclared_identifier_in_initializer() {
    let (errors, messages) = resolve("func f() -> Void { let x: Int32 = y; }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("use of undeclared identifier 'y'")));
}

#[test]
fn let_cannot_reference_itself() {
    let (errors, messages) = resolve("func f() -> Void { let x: Int32 = x; }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("use of undeclared identifier 'x'")));
}

#[test]
fn forward_references_between_functions() {
    let (errors, _) = resolve("func a() -> Void { b(); } func b() -> Void { a(); }");
    assert_eq!(errors, 0);
}

#[test]
fn enum_variants_land_in_the_parent_scope() {
    let mut diag = quiet_diag();
    let module = parse_source(
        "enum Direction { North, South, East, West }",
        FileId(0),
        &mut diag,
    );
    assert_eq!(diag.error_count(), 0);

    let mut scopes = ScopeTree::new();
    NameResolver::new(&mut diag, &mut scopes).resolve(&module);

    let sym = scopes
        .lookup(scopes.root(), "North")
        .expect("variant symbol in parent scope");
    assert_eq!(sym.kind, SymbolKind::EnumVariant);
    assert_eq!(sym.qualified_name, "Direction::North");

    assert!(scopes.lookup(scopes.root(), "Direction").is_some());
}

#[test]
fn duplicate_variable_in_one_scope() {
    let (errors, messages) =
        resolve("func f() -> Void { let x: Int32 = 1; let x: Int32 = 2; }");
    assert!(errors >= 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("redefinition of variable 'x'")));
}

#[test]
fn inner_block_bindings_do_not_escape() {
    let (errors, messages) =
        resolve("func f() -> Void { { let a: Int32 = 1; } let b: Int32 = a; }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("use of undeclared identifier 'a'")));
}

#[test]
fn shadowing_in_an_inner_scope_is_allowed() {
    let (errors, _) =
        resolve("func f() -> Void { let x: Int32 = 1; { let x: Int32 = 2; } }");
    assert_eq!(errors, 0);
}

#[test]
fn for_loop_variable_is_scoped_to_the_loop() {
    let (errors, _) = resolve(
        "func f(xs: Vec<Int32>) -> Void { for i: Int32 in xs { let d: Int32 = i; } }",
    );
    assert_eq!(errors, 0);

    let (errors, _) = resolve(
        "func g(xs: Vec<Int32>) -> Void { for i: Int32 in xs { let d: Int32 = i; } let e: Int32 = i; }",
    );
    assert_eq!(errors, 1);
}

#[test]
fn closure_parameters_resolve_in_the_closure_body() {
    let (errors, _) =
        resolve("func f() -> Void { let g: (Int32) -> Int32 = |x| { return x; }; }");
    assert_eq!(errors, 0);
}

#[test]
fn match_arm_patterns_bind_per_arm() {
    let (errors, _) = resolve(
        "func f(x: Int32) -> Void { match x { n => n, _ => 0, } }",
    );
    assert_eq!(errors, 0);

    // A binding from one arm is not visible in another.
    let (errors, _) = resolve(
        "func g(x: Int32) -> Void { match x { n => n, _ => n, } }",
    );
    assert_eq!(errors, 1);
}

#[test]
fn function_parameters_and_generics_resolve() {
    let (errors, _) = resolve(
        "func id<T: Clone>(value: T) -> T { return value; }",
    );
    assert_eq!(errors, 0);
}

#[test]
fn impl_methods_resolve_their_bodies() {
    let (errors, messages) = resolve(
        "struct Point { x: Float64 }\n\
         impl Point { func get(self: Self) -> Float64 { return missing; } }",
    );
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("use of undeclared identifier 'missing'")));
}

#[test]
fn sema_driver_skips_type_check_after_resolution_errors() {
    let mut diag = quiet_diag();
    // `y` is undeclared and the `if 1` condition would also be a type
    // error, but type checking must not run after resolution failed.
    let module = parse_source(
        "func f() -> Void { let x: Int32 = y; if 1 { } }",
        FileId(0),
        &mut diag,
    );
    assert_eq!(diag.error_count(), 0);

    let mut sema = Sema::new(&mut diag);
    assert!(!sema.analyze(&module));
    assert_eq!(diag.error_count(), 1);
}

#[test]
fn empty_source_analyzes_cleanly() {
    let mut diag = quiet_diag();
    let module = parse_source("", FileId(0), &mut diag);
    assert_eq!(diag.error_count(), 0);
    assert!(module.decls.is_empty());

    let mut sema = Sema::new(&mut diag);
    assert!(sema.analyze(&module));
    assert_eq!(diag.error_count(), 0);
}
