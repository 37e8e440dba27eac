//! Semantic analysis driver: name resolution followed by type checking.

use flux_ast::ast::Module;
use flux_ast::diag::DiagnosticEngine;

use crate::checker::TypeChecker;
use crate::resolver::NameResolver;
use crate::scope::ScopeTree;

/// Orchestrates the semantic passes over a parsed module. The type checker
/// runs only when name resolution added no errors.
pub struct Sema<'d> {
    diag: &'d mut DiagnosticEngine,
    scopes: ScopeTree,
}

impl<'d> Sema<'d> {
    pub fn new(diag: &'d mut DiagnosticEngine) -> Self {
        Self {
            diag,
            scopes: ScopeTree::new(),
        }
    }

    /// Run all semantic passes. Returns true when no errors were found.
    pub fn analyze(&mut self, module: &Module) -> bool {
        let before = self.diag.error_count();

        NameResolver::new(self.diag, &mut self.scopes).resolve(module);
        if self.diag.error_count() > before {
            return false;
        }

        TypeChecker::new(self.diag, &self.scopes).check(module);
        self.diag.error_count() == before
    }

    /// The scope tree built during analysis.
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }
}
