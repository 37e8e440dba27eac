//! End-to-end tests that invoke the compiled `flux` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

fn flux_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flux"))
}

fn write_source(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write source");
    path
}

fn run(args: &[&str]) -> Output {
    flux_bin().args(args).output().expect("run flux binary")
}

#[test]
fn valid_program_exits_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(
        &dir,
        "ok.fl",
        "func add(a: Int32, b: Int32) -> Int32 { return a + b; }\n",
    );

    let output = run(&[file.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn compile_error_exits_one_with_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(&dir, "bad.fl", "func f() -> Void { let x: Int32 = y; }\n");

    let output = run(&[file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("use of undeclared identifier 'y'"), "{}", stderr);
    assert!(stderr.contains("error(s) generated."), "{}", stderr);
    // Diagnostics carry the filename and location.
    assert!(stderr.contains("bad.fl:1:"), "{}", stderr);
}

#[test]
fn syntax_error_exits_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(&dir, "syntax.fl", "func f( -> {\n");

    let output = run(&[file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn dump_tokens_prints_the_stream() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(&dir, "tok.fl", "func main() -> Void { }\n");

    let output = run(&["--dump-tokens", file.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("func 'func' @ 1:1"), "{}", stdout);
    assert!(stdout.contains("IDENTIFIER 'main'"), "{}", stdout);
    assert!(stdout.contains("EOF"), "{}", stdout);
}

#[test]
fn dump_ast_pretty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(
        &dir,
        "ast.fl",
        "struct Point { x: Float64, y: Float64 }\nfunc main() -> Void { }\n",
    );

    let output = run(&["--dump-ast", file.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("struct Point"), "{}", stdout);
    assert!(stdout.contains("func main"), "{}", stdout);
}

#[test]
fn dump_ast_json_is_valid_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(&dir, "ast.fl", "func main() -> Void { }\n");

    let output = run(&["--dump-ast", "--format", "json", file.to_str().unwrap()]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON AST dump");
    assert!(value["decls"].is_array());
}

#[test]
fn version_flag() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("flux"), "{}", stdout);
}

#[test]
fn unknown_option_exits_one() {
    let output = run(&["--frobnicate"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_input_exits_one() {
    let output = flux_bin().output().expect("run flux binary");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn nonexistent_file_exits_one() {
    let output = run(&["/definitely/not/here.fl"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not open file"), "{}", stderr);
}

#[test]
fn emit_options_are_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = write_source(&dir, "opt.fl", "func main() -> Void { }\n");

    let output = run(&[
        "--emit",
        "llvm-ir",
        "-O2",
        "--target",
        "x86_64-unknown-linux-gnu",
        file.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
