//! Type checking over parsed-and-resolved source.

use flux_ast::diag::DiagnosticEngine;
use flux_ast::span::FileId;
use flux_parse::parse_source;
use flux_sema::Sema;

/// Run the full front-end (parse + resolve + check) and return the error
/// count plus messages. Asserts that parsing itself was clean.
fn analyze(src: &str) -> (u32, Vec<String>) {
    let mut diag = DiagnosticEngine::new();
    diag.set_handler(Box::new(|_| {}));

    let module = parse_source(src, FileId(0), &mut diag);
    assert_eq!(diag.error_count(), 0, "unexpected parse errors in {:?}", src);

    let mut sema = Sema::new(&mut diag);
    sema.analyze(&module);

    let messages = diag
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect();
    (diag.error_count(), messages)
}

#[test]
fn integer_condition_is_rejected() {
    let (errors, messages) = analyze("func f() -> Void { if 1 { } }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("condition must be of type 'Bool'")));
}

#[test]
fn bool_condition_is_accepted() {
    let (errors, _) = analyze("func f() -> Void { if true { } }");
    assert_eq!(errors, 0);
}

#[test]
fn comparison_condition_is_accepted() {
    let (errors, _) = analyze("func f(n: Int32) -> Void { if n < 10 { } }");
    assert_eq!(errors, 0);
}

#[test]
fn while_condition_must_be_bool() {
    let (errors, messages) = analyze("func f() -> Void { while 1 { } }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("condition must be of type 'Bool'")));
}

#[test]
fn let_initializer_mismatch() {
    let (errors, messages) = analyze(r#"func f() -> Void { let x: Int32 = "hello"; }"#);
    assert_eq!(errors, 1);
    assert!(messages.iter().any(|m| m.contains("type mismatch")));
}

#[test]
fn integer_literal_narrowing_is_permitted() {
    let (errors, _) = analyze("func f() -> Void { let a: Int8 = 1; let b: UInt64 = 2; }");
    assert_eq!(errors, 0);
}

#[test]
fn float_literal_narrows_to_float32() {
    let (errors, _) = analyze("func f() -> Void { let x: Float32 = 1.5; }");
    assert_eq!(errors, 0);
}

#[test]
fn return_type_mismatch() {
    let (errors, messages) = analyze(r#"func f() -> Int32 { return "s"; }"#);
    assert_eq!(errors, 1);
    assert!(messages.iter().any(|m| m.contains("return type mismatch")));
}

#[test]
fn returning_matching_literal_is_fine() {
    let (errors, _) = analyze("func f() -> Int64 { return 42; }");
    assert_eq!(errors, 0);
}

#[test]
fn bare_return_in_non_void_function() {
    let (errors, messages) = analyze("func f() -> Int32 { return; }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("non-void function must return a value")));
}

#[test]
fn bare_return_in_void_function_is_fine() {
    let (errors, _) = analyze("func f() -> Void { return; }");
    assert_eq!(errors, 0);
}

#[test]
fn unknown_type_in_let_binding() {
    let (errors, messages) = analyze("func f() -> Void { let x: Wibble; }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("unknown type 'Wibble'")));
}

#[test]
fn user_defined_types_become_known() {
    let (errors, _) = analyze(
        "struct Point { x: Float64, y: Float64 }\n\
         enum Direction { North }\n\
         func f() -> Void { let p: Point; let d: Direction; }",
    );
    assert_eq!(errors, 0);
}

#[test]
fn type_alias_is_a_known_type() {
    let (errors, _) = analyze("type UserId = Int32; func f() -> Void { let id: UserId; }");
    assert_eq!(errors, 0);
}

#[test]
fn unknown_struct_field_type() {
    let (errors, messages) = analyze("struct S { field: Mystery }");
    assert_eq!(errors, 1);
    assert!(messages.iter().any(|m| m.contains("unknown field type")));
}

#[test]
fn unknown_enum_variant_field_type() {
    let (errors, messages) = analyze("enum E { V(Mystery) }");
    assert_eq!(errors, 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("unknown type 'Mystery' in enum variant 'V'")));
}

#[test]
fn unknown_return_and_parameter_types() {
    let (errors, _) = analyze("func f(a: Nope) -> AlsoNope { }");
    assert_eq!(errors, 2);
}

#[test]
fn generic_type_arguments_are_trusted() {
    // Vec<Whatever> validates by its base name only.
    let (errors, _) = analyze("func f() -> Void { let v: Vec<Whatever>; }");
    assert_eq!(errors, 0);
}

#[test]
fn binary_mismatch_between_literal_operands() {
    let (errors, messages) = analyze(r#"func f() -> Void { let x: Int64 = 1 + "s"; }"#);
    assert!(errors >= 1);
    assert!(messages
        .iter()
        .any(|m| m.contains("binary expression type mismatch")));
}

#[test]
fn class_methods_are_checked() {
    let (errors, _) = analyze(
        "class Counter { count: Int32 }\n\
         impl Counter { func reset(self: Self) -> Int32 { return; } }",
    );
    assert_eq!(errors, 1);
}
