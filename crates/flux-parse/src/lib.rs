#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{Lexer, LexerState};
pub use parser::{parse_source, Parser};
pub use token::{keyword_kind, Token, TokenKind, TokenValue};
