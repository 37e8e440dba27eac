#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

pub mod checker;
pub mod resolver;
pub mod scope;
mod sema;


pub use checker::{type_to_string, types_compatible, TypeChecker, BUILTIN_TYPES};
pub use resolver::NameResolver;
pub use scope::{Scope, ScopeId, ScopeTree, Symbol, SymbolKind};
pub use sema::Sema;
