//! Type checking over the resolved AST.
//!
//! Validates every declared type reference against the known-type set
//! (builtins plus user-defined types from the global scope) and checks
//! expression-level compatibility for let initializers, returns, and
//! conditions. The scope tree is consulted read-only.

use std::collections::HashSet;

use flux_ast::ast::*;
use flux_ast::diag::DiagnosticEngine;

use crate::scope::{ScopeTree, SymbolKind};

/// Builtin type names known without any declaration.
pub const BUILTIN_TYPES: &[&str] = &[
    "Int8", "Int16", "Int32", "Int64", "UInt8", "UInt16", "UInt32", "UInt64", "Float32", "Float64",
    "Bool", "Char", "String", "Void", "Self", "Option", "Result", "Vec", "Map", "Set", "Box", "Rc",
    "Arc", "Mutex", "Channel", "Future",
];

pub struct TypeChecker<'a> {
    diag: &'a mut DiagnosticEngine,
    scopes: &'a ScopeTree,
    known_types: HashSet<String>,
    /// Declared return type of the function being checked; empty outside
    /// of one.
    current_return: String,
}

impl<'a> TypeChecker<'a> {
    pub fn new(diag: &'a mut DiagnosticEngine, scopes: &'a ScopeTree) -> Self {
        Self {
            diag,
            scopes,
            known_types: BUILTIN_TYPES.iter().map(|s| s.to_string()).collect(),
            current_return: String::new(),
        }
    }

    pub fn check(&mut self, module: &Module) {
        // User-defined types from the global scope join the known set.
        for sym in self.scopes.scope(self.scopes.root()).symbols() {
            if matches!(
                sym.kind,
                SymbolKind::Struct
                    | SymbolKind::Class
                    | SymbolKind::Enum
                    | SymbolKind::Trait
                    | SymbolKind::TypeAlias
            ) {
                self.known_types.insert(sym.name.clone());
            }
        }

        for decl in &module.decls {
            self.check_decl(decl);
        }
    }

    fn check_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(f) => self.check_func_decl(f),
            Decl::Struct(s) => self.check_struct_decl(s),
            Decl::Class(c) => self.check_class_decl(c),
            Decl::Enum(e) => self.check_enum_decl(e),
            Decl::Trait(t) => {
                for method in &t.methods {
                    self.check_func_decl(method);
                }
            }
            Decl::Impl(i) => {
                for method in &i.methods {
                    self.check_func_decl(method);
                }
            }
            Decl::Module(_) | Decl::Import(_) | Decl::TypeAlias(_) => {}
        }
    }

    fn check_func_decl(&mut self, decl: &FuncDecl) {
        match &decl.return_type {
            Some(ret) => {
                let ret_name = type_to_string(ret);
                if !self.is_valid_type(&ret_name) {
                    self.diag.error(
                        decl.loc,
                        format!(
                            "unknown return type '{}' in function '{}'",
                            ret_name, decl.name
                        ),
                    );
                }
                self.current_return = ret_name;
            }
            None => self.current_return = "Void".to_string(),
        }

        for param in &decl.params {
            match &param.ty {
                Some(ty) => {
                    let param_type = type_to_string(ty);
                    if !self.is_valid_type(&param_type) {
                        self.diag.error(
                            decl.loc,
                            format!(
                                "unknown parameter type '{}' for parameter '{}'",
                                param_type, param.name
                            ),
                        );
                    }
                }
                None => {
                    self.diag.error(
                        decl.loc,
                        format!(
                            "parameter '{}' must have an explicit type annotation",
                            param.name
                        ),
                    );
                }
            }
        }

        if let Some(body) = &decl.body {
            for stmt in &body.stmts {
                self.check_stmt(stmt);
            }
        }

        self.current_return.clear();
    }

    fn check_struct_decl(&mut self, decl: &StructDecl) {
        for field in &decl.fields {
            if let Some(ty) = &field.ty {
                let field_type = type_to_string(ty);
                if !self.is_valid_type(&field_type) {
                    self.diag.error(
                        decl.loc,
                        format!(
                            "unknown field type '{}' for field '{}' in struct '{}'",
                            field_type, field.name, decl.name
                        ),
                    );
                }
            }
        }
    }

    fn check_class_decl(&mut self, decl: &ClassDecl) {
        for field in &decl.fields {
            if let Some(ty) = &field.ty {
                let field_type = type_to_string(ty);
                if !self.is_valid_type(&field_type) {
                    self.diag.error(
                        decl.loc,
                        format!(
                            "unknown field type '{}' for field '{}' in class '{}'",
                            field_type, field.name, decl.name
                        ),
                    );
                }
            }
        }
        for method in &decl.methods {
            self.check_func_decl(method);
        }
    }

    fn check_enum_decl(&mut self, decl: &EnumDecl) {
        for variant in &decl.variants {
            for ty in &variant.tuple_fields {
                let field_type = type_to_string(ty);
                if !self.is_valid_type(&field_type) {
                    self.diag.error(
                        decl.loc,
                        format!(
                            "unknown type '{}' in enum variant '{}'",
                            field_type, variant.name
                        ),
                    );
                }
            }
            for field in &variant.struct_fields {
                if let Some(ty) = &field.ty {
                    let field_type = type_to_string(ty);
                    if !self.is_valid_type(&field_type) {
                        self.diag.error(
                            decl.loc,
                            format!(
                                "unknown type '{}' in enum variant '{}'",
                                field_type, variant.name
                            ),
                        );
                    }
                }
            }
        }
    }

    // ---- statements ----

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(s) => self.check_let_stmt(s),
            Stmt::Return(s) => self.check_return_stmt(s),
            Stmt::If(s) => self.check_if_stmt(s),
            Stmt::For(s) => {
                self.check_expr(&s.iterable);
                self.check_block(&s.body);
            }
            Stmt::While(s) => self.check_while_stmt(s),
            Stmt::Block(s) => self.check_block(s),
            Stmt::Expr(s) => {
                self.check_expr(&s.expr);
            }
            _ => {}
        }
    }

    fn check_let_stmt(&mut self, stmt: &LetStmt) {
        match &stmt.ty {
            Some(ty) => {
                let decl_type = type_to_string(ty);
                if !self.is_valid_type(&decl_type) {
                    self.diag.error(
                        stmt.loc,
                        format!("unknown type '{}' in let binding", decl_type),
                    );
                }
                if let Some(init) = &stmt.init {
                    let init_type = self.check_expr(init);
                    if !init_type.is_empty() && !types_compatible(&decl_type, &init_type) {
                        self.diag.error(
                            stmt.loc,
                            format!(
                                "type mismatch: expected '{}', got '{}'",
                                decl_type, init_type
                            ),
                        );
                    }
                }
            }
            None => {
                self.diag.error(
                    stmt.loc,
                    format!(
                        "variable '{}' must have an explicit type annotation",
                        stmt.name
                    ),
                );
            }
        }
    }

    fn check_return_stmt(&mut self, stmt: &ReturnStmt) {
        match &stmt.value {
            Some(value) => {
                let ret_type = self.check_expr(value);
                if !self.current_return.is_empty()
                    && !ret_type.is_empty()
                    && !types_compatible(&self.current_return, &ret_type)
                {
                    self.diag.error(
                        stmt.loc,
                        format!(
                            "return type mismatch: expected '{}', got '{}'",
                            self.current_return, ret_type
                        ),
                    );
                }
            }
            None => {
                if !self.current_return.is_empty() && self.current_return != "Void" {
                    self.diag
                        .error(stmt.loc, "non-void function must return a value");
                }
            }
        }
    }

    fn check_if_stmt(&mut self, stmt: &IfStmt) {
        let cond_type = self.check_expr(&stmt.cond);
        if !cond_type.is_empty() && cond_type != "Bool" {
            self.diag.error(
                stmt.loc,
                format!("condition must be of type 'Bool', got '{}'", cond_type),
            );
        }
        self.check_block(&stmt.then_branch);
        if let Some(else_branch) = &stmt.else_branch {
            self.check_stmt(else_branch);
        }
    }

    fn check_while_stmt(&mut self, stmt: &WhileStmt) {
        let cond_type = self.check_expr(&stmt.cond);
        if !cond_type.is_empty() && cond_type != "Bool" {
            self.diag.error(
                stmt.loc,
                format!("condition must be of type 'Bool', got '{}'", cond_type),
            );
        }
        self.check_block(&stmt.body);
    }

    fn check_block(&mut self, block: &BlockStmt) {
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
    }

    // ---- expressions ----

    /// Returns the expression's type as a string; empty means unknown.
    pub(crate) fn check_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::IntLiteral { .. } => "Int64".to_string(),
            Expr::FloatLiteral { .. } => "Float64".to_string(),
            Expr::StringLiteral { .. } => "String".to_string(),
            Expr::CharLiteral { .. } => "Char".to_string(),
            Expr::BoolLiteral { .. } => "Bool".to_string(),
            Expr::Ident { name, .. } => {
                match self.scopes.lookup(self.scopes.root(), name) {
                    Some(sym) => sym.type_name.clone(),
                    None => String::new(),
                }
            }
            Expr::Binary { op, lhs, rhs, loc } => {
                let lhs_type = self.check_expr(lhs);
                let rhs_type = self.check_expr(rhs);

                // Comparison and logical operators yield Bool.
                match op {
                    BinaryOp::Equal
                    | BinaryOp::NotEqual
                    | BinaryOp::Less
                    | BinaryOp::LessEqual
                    | BinaryOp::Greater
                    | BinaryOp::GreaterEqual
                    | BinaryOp::And
                    | BinaryOp::Or => return "Bool".to_string(),
                    _ => {}
                }

                // Arithmetic and bitwise operators need both sides to agree.
                if !lhs_type.is_empty()
                    && !rhs_type.is_empty()
                    && !types_compatible(&lhs_type, &rhs_type)
                {
                    self.diag.error(
                        *loc,
                        format!(
                            "binary expression type mismatch: '{}' vs '{}'",
                            lhs_type, rhs_type
                        ),
                    );
                }
                if lhs_type.is_empty() {
                    rhs_type
                } else {
                    lhs_type
                }
            }
            Expr::Call { callee, args, .. } => {
                self.check_expr(callee);
                for arg in args {
                    self.check_expr(arg);
                }
                // Full overload resolution is deferred to the back-end.
                String::new()
            }
            _ => String::new(),
        }
    }

    fn is_valid_type(&self, name: &str) -> bool {
        self.known_types.contains(name)
    }
}

/// Compatibility relation used for initializer/return checking. Reflexive;
/// `Int64` (the integer-literal type) narrows into the other integer
/// types, and `Float64` into `Float32`.
pub fn types_compatible(expected: &str, actual: &str) -> bool {
    if expected == actual {
        return true;
    }

    if actual == "Int64"
        && matches!(
            expected,
            "Int8" | "Int16" | "Int32" | "UInt8" | "UInt16" | "UInt32" | "UInt64"
        )
    {
        return true;
    }

    if actual == "Float64" && expected == "Float32" {
        return true;
    }

    false
}

/// Render a type node for known-type lookup and diagnostics. Named types
/// join their path segments with `::`; generic types use only the base
/// (type arguments are trusted); tuple and function types render
/// placeholders that bypass the known-type lookup.
pub fn type_to_string(ty: &TypeNode) -> String {
    match ty {
        TypeNode::Named { path, .. } => path.join("::"),
        TypeNode::Generic { base, .. } => type_to_string(base),
        TypeNode::Reference { inner, .. } => format!("&{}", type_to_string(inner)),
        TypeNode::MutRef { inner, .. } => format!("&mut {}", type_to_string(inner)),
        TypeNode::Array { element, .. } => format!("[{}]", type_to_string(element)),
        TypeNode::Option { .. } => "Option".to_string(),
        TypeNode::Result { .. } => "Result".to_string(),
        TypeNode::Tuple { .. } => "(tuple)".to_string(),
        TypeNode::Function { .. } => "(func)".to_string(),
        TypeNode::Inferred { .. } => "_".to_string(),
    }
}
