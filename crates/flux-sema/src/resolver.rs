//! Two-pass name resolution.
//!
//! Pass one registers every top-level declaration in the global scope so
//! declarations may reference each other forward. Pass two walks bodies,
//! opening child scopes and diagnosing undeclared identifiers and
//! redefinitions. The AST is not annotated; resolution is validated by
//! presence in scope at lookup time.

use flux_ast::ast::*;
use flux_ast::diag::DiagnosticEngine;

use crate::checker::type_to_string;
use crate::scope::{ScopeId, ScopeTree, Symbol, SymbolKind};

pub struct NameResolver<'a> {
    diag: &'a mut DiagnosticEngine,
    scopes: &'a mut ScopeTree,
    current: ScopeId,
}

impl<'a> NameResolver<'a> {
    pub fn new(diag: &'a mut DiagnosticEngine, scopes: &'a mut ScopeTree) -> Self {
        let current = scopes.root();
        Self {
            diag,
            scopes,
            current,
        }
    }

    /// Resolve a module, mutating the scope tree.
    pub fn resolve(&mut self, module: &Module) {
        for decl in &module.decls {
            self.register_decl(decl);
        }
        for decl in &module.decls {
            self.resolve_decl(decl);
        }
    }

    // ---- pass one: top-level registration ----

    fn register_decl(&mut self, decl: &Decl) {
        let mut sym = match decl {
            Decl::Func(f) => function_symbol(f),
            Decl::Struct(s) => {
                let mut sym = Symbol::new(SymbolKind::Struct, &s.name);
                sym.vis = s.vis;
                sym.generic_params = generic_names(&s.generic_params);
                sym
            }
            Decl::Class(c) => {
                let mut sym = Symbol::new(SymbolKind::Class, &c.name);
                sym.vis = c.vis;
                sym.generic_params = generic_names(&c.generic_params);
                sym
            }
            Decl::Enum(e) => {
                let mut sym = Symbol::new(SymbolKind::Enum, &e.name);
                sym.vis = e.vis;
                sym.generic_params = generic_names(&e.generic_params);
                sym
            }
            Decl::Trait(t) => {
                let mut sym = Symbol::new(SymbolKind::Trait, &t.name);
                sym.vis = t.vis;
                sym.generic_params = generic_names(&t.generic_params);
                sym
            }
            Decl::TypeAlias(a) => {
                let mut sym = Symbol::new(SymbolKind::TypeAlias, &a.name);
                sym.vis = a.vis;
                sym
            }
            // Module, Import, and Impl do not register top-level names.
            Decl::Module(_) | Decl::Import(_) | Decl::Impl(_) => return,
        };
        sym.loc = decl.loc();

        let name = sym.name.clone();
        if !self.scopes.insert(self.current, sym) {
            self.diag
                .error(decl.loc(), format!("redefinition of '{}'", name));
        }
    }

    // ---- pass two: bodies ----

    fn resolve_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Module(_) => {}
            // Cross-module import resolution is out of scope; imports are
            // recognized syntactically only.
            Decl::Import(_) => {}
            Decl::Func(f) => self.resolve_func(f),
            Decl::Struct(s) => {
                self.enter_scope(&s.name);
                self.insert_generic_params(&s.generic_params, s.loc);
                self.exit_scope();
            }
            Decl::Class(c) => {
                self.enter_scope(&c.name);
                self.insert_generic_params(&c.generic_params, c.loc);
                for method in &c.methods {
                    self.resolve_func(method);
                }
                self.exit_scope();
            }
            Decl::Enum(e) => self.resolve_enum(e),
            Decl::Trait(t) => {
                self.enter_scope(&t.name);
                for method in &t.methods {
                    let mut sym = function_symbol(method);
                    sym.loc = method.loc;
                    let name = sym.name.clone();
                    if !self.scopes.insert(self.current, sym) {
                        self.diag
                            .error(method.loc, format!("redefinition of '{}'", name));
                    }
                    self.resolve_func(method);
                }
                self.exit_scope();
            }
            Decl::Impl(i) => {
                self.enter_scope("impl");
                self.insert_generic_params(&i.generic_params, i.loc);
                for method in &i.methods {
                    self.resolve_func(method);
                }
                self.exit_scope();
            }
            Decl::TypeAlias(_) => {
                // The aliased type is validated by the type checker.
            }
        }
    }

    fn resolve_func(&mut self, decl: &FuncDecl) {
        self.enter_scope(&decl.name);

        self.insert_generic_params(&decl.generic_params, decl.loc);

        for param in &decl.params {
            let mut sym = Symbol::new(SymbolKind::Variable, &param.name);
            sym.loc = param.loc;
            sym.is_mutable = param.is_mutable;
            if let Some(ty) = &param.ty {
                sym.type_name = type_to_string(ty);
            }
            self.scopes.insert(self.current, sym);
        }

        if let Some(body) = &decl.body {
            for stmt in &body.stmts {
                self.resolve_stmt(stmt);
            }
        }

        self.exit_scope();
    }

    /// Variants land in the enum's enclosing scope under their unqualified
    /// name, with `Enum::Variant` as the qualified name.
    fn resolve_enum(&mut self, decl: &EnumDecl) {
        for variant in &decl.variants {
            let mut sym = Symbol::new(SymbolKind::EnumVariant, &variant.name);
            sym.qualified_name = format!("{}::{}", decl.name, variant.name);
            sym.loc = variant.loc;
            self.scopes.insert(self.current, sym);
        }
    }

    fn insert_generic_params(&mut self, params: &[GenericParam], loc: flux_ast::span::SourceLocation) {
        for gp in params {
            if gp.name.is_empty() {
                continue; // lifetime parameters introduce no type name
            }
            let mut sym = Symbol::new(SymbolKind::GenericParam, &gp.name);
            sym.loc = loc;
            self.scopes.insert(self.current, sym);
        }
    }

    // ---- statements ----

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(s) => {
                // Resolve the initializer before the binding exists, so a
                // variable cannot reference itself.
                if let Some(init) = &s.init {
                    self.resolve_expr(init);
                }
                let mut sym = Symbol::new(SymbolKind::Variable, &s.name);
                sym.loc = s.loc;
                sym.is_mutable = s.is_mutable;
                if let Some(ty) = &s.ty {
                    sym.type_name = type_to_string(ty);
                }
                if !self.scopes.insert(self.current, sym) {
                    self.diag
                        .error(s.loc, format!("redefinition of variable '{}'", s.name));
                }
            }
            Stmt::Const(s) => {
                self.resolve_expr(&s.value);
                let mut sym = Symbol::new(SymbolKind::Variable, &s.name);
                sym.loc = s.loc;
                sym.is_const = true;
                if let Some(ty) = &s.ty {
                    sym.type_name = type_to_string(ty);
                }
                if !self.scopes.insert(self.current, sym) {
                    self.diag
                        .error(s.loc, format!("redefinition of constant '{}'", s.name));
                }
            }
            Stmt::Return(s) => {
                if let Some(value) = &s.value {
                    self.resolve_expr(value);
                }
            }
            Stmt::If(s) => {
                self.resolve_expr(&s.cond);
                self.resolve_block(&s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Match(s) => {
                self.resolve_expr(&s.scrutinee);
                for arm in &s.arms {
                    self.resolve_match_arm(arm);
                }
            }
            Stmt::For(s) => {
                self.resolve_expr(&s.iterable);
                self.enter_scope("for");
                let mut sym = Symbol::new(SymbolKind::Variable, &s.var_name);
                sym.loc = s.loc;
                if let Some(ty) = &s.var_ty {
                    sym.type_name = type_to_string(ty);
                }
                self.scopes.insert(self.current, sym);
                self.resolve_block(&s.body);
                self.exit_scope();
            }
            Stmt::While(s) => {
                self.resolve_expr(&s.cond);
                self.resolve_block(&s.body);
            }
            Stmt::Loop(s) => self.resolve_block(&s.body),
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::Block(s) => self.resolve_block(s),
            Stmt::Expr(s) => self.resolve_expr(&s.expr),
        }
    }

    fn resolve_block(&mut self, block: &BlockStmt) {
        self.enter_scope("block");
        for stmt in &block.stmts {
            self.resolve_stmt(stmt);
        }
        self.exit_scope();
    }

    /// Each arm gets its own scope holding the pattern's bindings.
    fn resolve_match_arm(&mut self, arm: &MatchArm) {
        self.enter_scope("match_arm");
        self.bind_pattern(&arm.pattern);
        if let Some(guard) = &arm.guard {
            self.resolve_expr(guard);
        }
        self.resolve_expr(&arm.body);
        self.exit_scope();
    }

    fn bind_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Wildcard { .. } | Pattern::Literal { .. } => {}
            Pattern::Ident {
                name,
                is_mutable,
                loc,
            } => {
                let mut sym = Symbol::new(SymbolKind::Variable, name);
                sym.loc = *loc;
                sym.is_mutable = *is_mutable;
                self.scopes.insert(self.current, sym);
            }
            Pattern::Tuple { elements, .. } => {
                for element in elements {
                    self.bind_pattern(element);
                }
            }
            Pattern::Constructor {
                positional, named, ..
            } => {
                for p in positional {
                    self.bind_pattern(p);
                }
                for field in named {
                    self.bind_pattern(&field.pattern);
                }
            }
            Pattern::Or { alternatives, .. } => {
                for alternative in alternatives {
                    self.bind_pattern(alternative);
                }
            }
        }
    }

    // ---- expressions ----

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident { name, loc } => {
                if self.scopes.lookup(self.current, name).is_none() {
                    self.diag
                        .error(*loc, format!("use of undeclared identifier '{}'", name));
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
            }
            Expr::Unary { operand, .. }
            | Expr::Ref { operand, .. }
            | Expr::MutRef { operand, .. }
            | Expr::Move { operand, .. }
            | Expr::Await { operand, .. }
            | Expr::Try { operand, .. } => self.resolve_expr(operand),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::MethodCall { object, args, .. } => {
                self.resolve_expr(object);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::MemberAccess { object, .. } => self.resolve_expr(object),
            Expr::Index { object, index, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
            }
            Expr::Cast { expr, .. } => self.resolve_expr(expr),
            Expr::Block(block) => {
                self.enter_scope("block_expr");
                for stmt in &block.stmts {
                    self.resolve_stmt(stmt);
                }
                if let Some(tail) = &block.tail {
                    self.resolve_expr(tail);
                }
                self.exit_scope();
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.resolve_expr(cond);
                self.resolve_expr(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_expr(else_branch);
                }
            }
            Expr::Match {
                scrutinee, arms, ..
            } => {
                self.resolve_expr(scrutinee);
                for arm in arms {
                    self.resolve_match_arm(arm);
                }
            }
            Expr::Closure { params, body, .. } => {
                self.enter_scope("closure");
                for param in params {
                    let mut sym = Symbol::new(SymbolKind::Variable, &param.name);
                    if let Some(ty) = &param.ty {
                        sym.type_name = type_to_string(ty);
                    }
                    self.scopes.insert(self.current, sym);
                }
                self.resolve_expr(body);
                self.exit_scope();
            }
            Expr::Construct {
                type_path, fields, ..
            } => {
                self.resolve_expr(type_path);
                for field in fields {
                    self.resolve_expr(&field.value);
                }
            }
            // The struct-literal type name is recorded as text only and
            // need not resolve here.
            Expr::StructLiteral { fields, .. } => {
                for field in fields {
                    self.resolve_expr(&field.value);
                }
            }
            Expr::Tuple { elements, .. } | Expr::Array { elements, .. } => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Range { start, end, .. } => {
                if let Some(start) = start {
                    self.resolve_expr(start);
                }
                if let Some(end) = end {
                    self.resolve_expr(end);
                }
            }
            Expr::Assign { target, value, .. }
            | Expr::CompoundAssign { target, value, .. } => {
                self.resolve_expr(target);
                self.resolve_expr(value);
            }
            // Literals and paths need no resolution.
            Expr::IntLiteral { .. }
            | Expr::FloatLiteral { .. }
            | Expr::StringLiteral { .. }
            | Expr::CharLiteral { .. }
            | Expr::BoolLiteral { .. }
            | Expr::Path { .. } => {}
        }
    }

    // ---- scope management ----

    fn enter_scope(&mut self, name: &str) {
        self.current = self.scopes.push_scope(name, self.current);
    }

    fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes.scope(self.current).parent {
            self.current = parent;
        }
    }
}

fn function_symbol(decl: &FuncDecl) -> Symbol {
    let mut sym = Symbol::new(SymbolKind::Function, &decl.name);
    sym.vis = decl.vis;
    sym.is_async = decl.is_async;
    sym.param_types = decl
        .params
        .iter()
        .map(|p| p.ty.as_ref().map(type_to_string).unwrap_or_default())
        .collect();
    sym.return_type = decl
        .return_type
        .as_ref()
        .map(type_to_string)
        .unwrap_or_else(|| "Void".to_string());
    sym.generic_params = generic_names(&decl.generic_params);
    sym
}

fn generic_names(params: &[GenericParam]) -> Vec<String> {
    params
        .iter()
        .filter(|p| !p.name.is_empty())
        .map(|p| p.name.clone())
        .collect()
}
