//! Visitor dispatch over the five AST node families.
//!
//! Implementors override the `visit_*` hooks they care about; the default
//! implementations call the matching `walk_*` function, which recurses into
//! children. Dispatch is exhaustive pattern matching on the node tag.

use crate::ast::*;

pub trait Visitor {
    fn visit_module(&mut self, module: &Module) {
        walk_module(self, module);
    }

    fn visit_decl(&mut self, decl: &Decl) {
        walk_decl(self, decl);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        walk_pattern(self, pattern);
    }

    fn visit_type(&mut self, ty: &TypeNode) {
        walk_type(self, ty);
    }
}

pub fn walk_module<V: Visitor + ?Sized>(v: &mut V, module: &Module) {
    for decl in &module.decls {
        v.visit_decl(decl);
    }
}

pub fn walk_decl<V: Visitor + ?Sized>(v: &mut V, decl: &Decl) {
    match decl {
        Decl::Module(_) | Decl::Import(_) => {}
        Decl::Func(func) => walk_func(v, func),
        Decl::Struct(s) => {
            for field in &s.fields {
                if let Some(ty) = &field.ty {
                    v.visit_type(ty);
                }
            }
        }
        Decl::Class(c) => {
            for field in &c.fields {
                if let Some(ty) = &field.ty {
                    v.visit_type(ty);
                }
            }
            for method in &c.methods {
                walk_func(v, method);
            }
        }
        Decl::Enum(e) => {
            for variant in &e.variants {
                for ty in &variant.tuple_fields {
                    v.visit_type(ty);
                }
                for field in &variant.struct_fields {
                    if let Some(ty) = &field.ty {
                        v.visit_type(ty);
                    }
                }
            }
        }
        Decl::Trait(t) => {
            for method in &t.methods {
                walk_func(v, method);
            }
        }
        Decl::Impl(i) => {
            if let Some(target) = &i.target {
                v.visit_type(target);
            }
            for method in &i.methods {
                walk_func(v, method);
            }
        }
        Decl::TypeAlias(a) => {
            if let Some(ty) = &a.aliased {
                v.visit_type(ty);
            }
        }
    }
}

fn walk_func<V: Visitor + ?Sized>(v: &mut V, func: &FuncDecl) {
    for param in &func.params {
        if let Some(ty) = &param.ty {
            v.visit_type(ty);
        }
    }
    if let Some(ret) = &func.return_type {
        v.visit_type(ret);
    }
    if let Some(body) = &func.body {
        for stmt in &body.stmts {
            v.visit_stmt(stmt);
        }
    }
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Let(s) => {
            if let Some(ty) = &s.ty {
                v.visit_type(ty);
            }
            if let Some(init) = &s.init {
                v.visit_expr(init);
            }
        }
        Stmt::Const(s) => {
            if let Some(ty) = &s.ty {
                v.visit_type(ty);
            }
            v.visit_expr(&s.value);
        }
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                v.visit_expr(value);
            }
        }
        Stmt::If(s) => {
            v.visit_expr(&s.cond);
            for stmt in &s.then_branch.stmts {
                v.visit_stmt(stmt);
            }
            if let Some(else_branch) = &s.else_branch {
                v.visit_stmt(else_branch);
            }
        }
        Stmt::Match(s) => {
            v.visit_expr(&s.scrutinee);
            for arm in &s.arms {
                walk_match_arm(v, arm);
            }
        }
        Stmt::For(s) => {
            if let Some(ty) = &s.var_ty {
                v.visit_type(ty);
            }
            v.visit_expr(&s.iterable);
            for stmt in &s.body.stmts {
                v.visit_stmt(stmt);
            }
        }
        Stmt::While(s) => {
            v.visit_expr(&s.cond);
            for stmt in &s.body.stmts {
                v.visit_stmt(stmt);
            }
        }
        Stmt::Loop(s) => {
            for stmt in &s.body.stmts {
                v.visit_stmt(stmt);
            }
        }
        Stmt::Break { .. } | Stmt::Continue { .. } => {}
        Stmt::Block(s) => {
            for stmt in &s.stmts {
                v.visit_stmt(stmt);
            }
        }
        Stmt::Expr(s) => v.visit_expr(&s.expr),
    }
}

fn walk_match_arm<V: Visitor + ?Sized>(v: &mut V, arm: &MatchArm) {
    v.visit_pattern(&arm.pattern);
    if let Some(guard) = &arm.guard {
        v.visit_expr(guard);
    }
    v.visit_expr(&arm.body);
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::IntLiteral { .. }
        | Expr::FloatLiteral { .. }
        | Expr::StringLiteral { .. }
        | Expr::CharLiteral { .. }
        | Expr::BoolLiteral { .. }
        | Expr::Ident { .. }
        | Expr::Path { .. } => {}
        Expr::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        Expr::Unary { operand, .. }
        | Expr::Ref { operand, .. }
        | Expr::MutRef { operand, .. }
        | Expr::Move { operand, .. }
        | Expr::Await { operand, .. }
        | Expr::Try { operand, .. } => v.visit_expr(operand),
        Expr::Call { callee, args, .. } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::MethodCall { object, args, .. } => {
            v.visit_expr(object);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        Expr::MemberAccess { object, .. } => v.visit_expr(object),
        Expr::Index { object, index, .. } => {
            v.visit_expr(object);
            v.visit_expr(index);
        }
        Expr::Cast { expr, target, .. } => {
            v.visit_expr(expr);
            v.visit_type(target);
        }
        Expr::Block(block) => {
            for stmt in &block.stmts {
                v.visit_stmt(stmt);
            }
            if let Some(tail) = &block.tail {
                v.visit_expr(tail);
            }
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            v.visit_expr(cond);
            v.visit_expr(then_branch);
            if let Some(else_branch) = else_branch {
                v.visit_expr(else_branch);
            }
        }
        Expr::Match {
            scrutinee, arms, ..
        } => {
            v.visit_expr(scrutinee);
            for arm in arms {
                walk_match_arm(v, arm);
            }
        }
        Expr::Closure {
            params,
            return_type,
            body,
            ..
        } => {
            for param in params {
                if let Some(ty) = &param.ty {
                    v.visit_type(ty);
                }
            }
            if let Some(ret) = return_type {
                v.visit_type(ret);
            }
            v.visit_expr(body);
        }
        Expr::Construct {
            type_path, fields, ..
        } => {
            v.visit_expr(type_path);
            for field in fields {
                v.visit_expr(&field.value);
            }
        }
        Expr::StructLiteral { fields, .. } => {
            for field in fields {
                v.visit_expr(&field.value);
            }
        }
        Expr::Tuple { elements, .. } | Expr::Array { elements, .. } => {
            for element in elements {
                v.visit_expr(element);
            }
        }
        Expr::Range { start, end, .. } => {
            if let Some(start) = start {
                v.visit_expr(start);
            }
            if let Some(end) = end {
                v.visit_expr(end);
            }
        }
        Expr::Assign { target, value, .. } | Expr::CompoundAssign { target, value, .. } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
    }
}

pub fn walk_pattern<V: Visitor + ?Sized>(v: &mut V, pattern: &Pattern) {
    match pattern {
        Pattern::Wildcard { .. } | Pattern::Ident { .. } => {}
        Pattern::Literal { literal, .. } => v.visit_expr(literal),
        Pattern::Tuple { elements, .. } => {
            for element in elements {
                v.visit_pattern(element);
            }
        }
        Pattern::Constructor {
            positional, named, ..
        } => {
            for p in positional {
                v.visit_pattern(p);
            }
            for field in named {
                v.visit_pattern(&field.pattern);
            }
        }
        Pattern::Or { alternatives, .. } => {
            for alternative in alternatives {
                v.visit_pattern(alternative);
            }
        }
    }
}

pub fn walk_type<V: Visitor + ?Sized>(v: &mut V, ty: &TypeNode) {
    match ty {
        TypeNode::Named { .. } | TypeNode::Inferred { .. } => {}
        TypeNode::Generic { base, args, .. } => {
            v.visit_type(base);
            for arg in args {
                v.visit_type(arg);
            }
        }
        TypeNode::Reference { inner, .. }
        | TypeNode::MutRef { inner, .. }
        | TypeNode::Option { inner, .. } => v.visit_type(inner),
        TypeNode::Tuple { elements, .. } => {
            for element in elements {
                v.visit_type(element);
            }
        }
        TypeNode::Function { params, ret, .. } => {
            for param in params {
                v.visit_type(param);
            }
            v.visit_type(ret);
        }
        TypeNode::Array { element, .. } => v.visit_type(element),
        TypeNode::Result { ok, err, .. } => {
            v.visit_type(ok);
            v.visit_type(err);
        }
    }
}
