#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

//! `flux` — command-line driver for the Flux compiler front-end.
//!
//! Runs lexing, parsing, and semantic analysis over one source file and
//! reports diagnostics. Code generation is an external back-end consuming
//! the validated AST; this binary stops once the front-end has produced it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser as ClapParser, ValueEnum};

use flux_ast::diag::DiagnosticEngine;
use flux_ast::print::AstPrinter;
use flux_ast::span::SourceManager;
use flux_parse::{parse_source, Lexer};
use flux_sema::Sema;

#[derive(ClapParser, Debug)]
#[command(name = "flux", version, about = "Flux compiler front-end")]
struct Cli {
    /// Input source file
    input: PathBuf,

    /// Output file path
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = EmitKind::Exe)]
    emit: EmitKind,

    /// Optimization level
    #[arg(short = 'O', value_name = "LEVEL", default_value_t = 0,
          value_parser = clap::value_parser!(u8).range(0..=3))]
    opt_level: u8,

    /// Target triple
    #[arg(long, value_name = "TRIPLE")]
    target: Option<String>,

    /// Print the token stream to stdout
    #[arg(long)]
    dump_tokens: bool,

    /// Print the AST to stdout
    #[arg(long)]
    dump_ast: bool,

    /// Format for --dump-ast
    #[arg(long, value_enum, default_value_t = DumpFormat::Pretty)]
    format: DumpFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EmitKind {
    LlvmIr,
    Bitcode,
    Asm,
    Obj,
    Exe,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DumpFormat {
    Pretty,
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code: u8 = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let mut sm = SourceManager::new();
    let file = sm
        .load_file(&cli.input)
        .with_context(|| format!("could not open file '{}'", cli.input.display()))?;
    let filename = sm.filename(file).to_string();
    let source = sm.source(file);

    let mut diag = DiagnosticEngine::new();
    diag.set_handler(Box::new(move |d| {
        eprint!("{}", d.render(Some(filename.as_str())));
    }));

    // === Phase 1: lexical analysis ===
    if cli.dump_tokens {
        let mut lexer = Lexer::new(source, file, &mut diag);
        for tok in lexer.lex_all() {
            println!(
                "{} '{}' @ {}:{}",
                tok.kind.as_str(),
                tok.text,
                tok.loc.line,
                tok.loc.column
            );
        }
        if diag.has_errors() {
            return Ok(1);
        }
    }

    // === Phase 2: parsing ===
    let module = parse_source(source, file, &mut diag);
    if diag.has_errors() {
        eprintln!("{} error(s) generated.", diag.error_count());
        return Ok(1);
    }

    if cli.dump_ast {
        match cli.format {
            DumpFormat::Pretty => print!("{}", AstPrinter::new().print(&module)),
            DumpFormat::Json => println!("{}", serde_json::to_string_pretty(&module)?),
        }
    }

    // === Phase 3: semantic analysis ===
    let analyzed = {
        let mut sema = Sema::new(&mut diag);
        sema.analyze(&module)
    };
    if !analyzed {
        eprintln!("{} error(s) generated.", diag.error_count());
        return Ok(1);
    }

    // The back-end consumes the validated AST through the visitor
    // interface; this build stops after producing it.
    if cli.output.is_some()
        || cli.target.is_some()
        || cli.opt_level > 0
        || cli.emit != EmitKind::Exe
    {
        eprintln!("note: code generation is not available in this build; stopping after semantic analysis");
    }

    Ok(0)
}
