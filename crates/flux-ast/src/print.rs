//! Human-readable AST dump, used by `flux --dump-ast`.

use std::fmt::Write as _;

use crate::ast::*;

/// Prints an indentation-based representation of a module.
#[derive(Default)]
pub struct AstPrinter {
    out: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(mut self, module: &Module) -> String {
        if module.name.is_empty() {
            self.line(0, "module <anonymous>");
        } else {
            self.line(0, &format!("module {}", module.name));
        }
        for import in &module.imports {
            self.line(1, &format!("import {}", import));
        }
        for decl in &module.decls {
            self.print_decl(decl, 1);
        }
        self.out
    }

    fn line(&mut self, indent: usize, text: &str) {
        let _ = writeln!(self.out, "{}{}", "  ".repeat(indent), text);
    }

    fn print_decl(&mut self, decl: &Decl, indent: usize) {
        let vis = match decl.visibility() {
            Visibility::Public => "pub ",
            Visibility::Private => "",
        };
        match decl {
            Decl::Module(d) => self.line(indent, &format!("module-decl {}", d.path.join("::"))),
            Decl::Import(d) => self.line(indent, &format!("import-decl {}", d.path.join("::"))),
            Decl::Func(func) => self.print_func(func, indent, vis),
            Decl::Struct(s) => {
                self.line(
                    indent,
                    &format!("{}struct {}{}", vis, s.name, generics(&s.generic_params)),
                );
                for field in &s.fields {
                    self.print_field(field, indent + 1);
                }
            }
            Decl::Class(c) => {
                self.line(
                    indent,
                    &format!("{}class {}{}", vis, c.name, generics(&c.generic_params)),
                );
                for field in &c.fields {
                    self.print_field(field, indent + 1);
                }
                for method in &c.methods {
                    self.print_func(method, indent + 1, "");
                }
            }
            Decl::Enum(e) => {
                self.line(
                    indent,
                    &format!("{}enum {}{}", vis, e.name, generics(&e.generic_params)),
                );
                for variant in &e.variants {
                    match variant.kind {
                        VariantKind::Unit => self.line(indent + 1, &variant.name),
                        VariantKind::Tuple => {
                            let tys: Vec<String> =
                                variant.tuple_fields.iter().map(type_text).collect();
                            self.line(indent + 1, &format!("{}({})", variant.name, tys.join(", ")));
                        }
                        VariantKind::Struct => {
                            self.line(indent + 1, &format!("{} {{..}}", variant.name));
                            for field in &variant.struct_fields {
                                self.print_field(field, indent + 2);
                            }
                        }
                    }
                }
            }
            Decl::Trait(t) => {
                let supers = if t.super_traits.is_empty() {
                    String::new()
                } else {
                    format!(": {}", t.super_traits.join(" + "))
                };
                self.line(indent, &format!("{}trait {}{}", vis, t.name, supers));
                for method in &t.methods {
                    self.print_func(method, indent + 1, "");
                }
            }
            Decl::Impl(i) => {
                let target = i.target.as_ref().map(type_text).unwrap_or_default();
                match &i.trait_name {
                    Some(trait_name) => {
                        self.line(indent, &format!("impl {} for {}", trait_name, target))
                    }
                    None => self.line(indent, &format!("impl {}", target)),
                }
                for method in &i.methods {
                    self.print_func(method, indent + 1, "");
                }
            }
            Decl::TypeAlias(a) => {
                let aliased = a.aliased.as_ref().map(type_text).unwrap_or_default();
                self.line(indent, &format!("{}type {} = {}", vis, a.name, aliased));
            }
        }
    }

    fn print_func(&mut self, func: &FuncDecl, indent: usize, vis: &str) {
        let params: Vec<String> = func
            .params
            .iter()
            .map(|p| {
                let ty = p.ty.as_ref().map(type_text).unwrap_or_default();
                format!("{}: {}", p.name, ty)
            })
            .collect();
        let ret = func
            .return_type
            .as_ref()
            .map(|t| format!(" -> {}", type_text(t)))
            .unwrap_or_default();
        let asyncness = if func.is_async { "async " } else { "" };
        self.line(
            indent,
            &format!(
                "{}{}func {}{}({}){}",
                vis,
                asyncness,
                func.name,
                generics(&func.generic_params),
                params.join(", "),
                ret
            ),
        );
        if let Some(body) = &func.body {
            for stmt in &body.stmts {
                self.print_stmt(stmt, indent + 1);
            }
        }
    }

    fn print_field(&mut self, field: &FieldDecl, indent: usize) {
        let ty = field.ty.as_ref().map(type_text).unwrap_or_default();
        self.line(indent, &format!("{}: {}", field.name, ty));
    }

    fn print_stmt(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Let(s) => {
                let ty = s.ty.as_ref().map(type_text).unwrap_or_default();
                let mutability = if s.is_mutable { "mut " } else { "" };
                self.line(indent, &format!("let {}{}: {}", mutability, s.name, ty));
                if let Some(init) = &s.init {
                    self.print_expr(init, indent + 1);
                }
            }
            Stmt::Const(s) => {
                let ty = s.ty.as_ref().map(type_text).unwrap_or_default();
                self.line(indent, &format!("const {}: {}", s.name, ty));
                self.print_expr(&s.value, indent + 1);
            }
            Stmt::Return(s) => {
                self.line(indent, "return");
                if let Some(value) = &s.value {
                    self.print_expr(value, indent + 1);
                }
            }
            Stmt::If(s) => {
                self.line(indent, "if");
                self.print_expr(&s.cond, indent + 1);
                self.line(indent, "then");
                for stmt in &s.then_branch.stmts {
                    self.print_stmt(stmt, indent + 1);
                }
                if let Some(else_branch) = &s.else_branch {
                    self.line(indent, "else");
                    self.print_stmt(else_branch, indent + 1);
                }
            }
            Stmt::Match(s) => {
                self.line(indent, "match");
                self.print_expr(&s.scrutinee, indent + 1);
                for arm in &s.arms {
                    self.line(indent + 1, &format!("arm {}", pattern_text(&arm.pattern)));
                    self.print_expr(&arm.body, indent + 2);
                }
            }
            Stmt::For(s) => {
                let ty = s.var_ty.as_ref().map(type_text).unwrap_or_default();
                self.line(indent, &format!("for {}: {}", s.var_name, ty));
                self.print_expr(&s.iterable, indent + 1);
                for stmt in &s.body.stmts {
                    self.print_stmt(stmt, indent + 1);
                }
            }
            Stmt::While(s) => {
                self.line(indent, "while");
                self.print_expr(&s.cond, indent + 1);
                for stmt in &s.body.stmts {
                    self.print_stmt(stmt, indent + 1);
                }
            }
            Stmt::Loop(s) => {
                self.line(indent, "loop");
                for stmt in &s.body.stmts {
                    self.print_stmt(stmt, indent + 1);
                }
            }
            Stmt::Break { .. } => self.line(indent, "break"),
            Stmt::Continue { .. } => self.line(indent, "continue"),
            Stmt::Block(s) => {
                self.line(indent, "block");
                for stmt in &s.stmts {
                    self.print_stmt(stmt, indent + 1);
                }
            }
            Stmt::Expr(s) => self.print_expr(&s.expr, indent),
        }
    }

    fn print_expr(&mut self, expr: &Expr, indent: usize) {
        match expr {
            Expr::IntLiteral { value, .. } => self.line(indent, &format!("int {}", value)),
            Expr::FloatLiteral { value, .. } => self.line(indent, &format!("float {}", value)),
            Expr::StringLiteral { value, .. } => self.line(indent, &format!("string {:?}", value)),
            Expr::CharLiteral { value, .. } => self.line(indent, &format!("char {:?}", value)),
            Expr::BoolLiteral { value, .. } => self.line(indent, &format!("bool {}", value)),
            Expr::Ident { name, .. } => self.line(indent, &format!("ident {}", name)),
            Expr::Path { segments, .. } => {
                self.line(indent, &format!("path {}", segments.join("::")))
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                self.line(indent, &format!("binary {:?}", op));
                self.print_expr(lhs, indent + 1);
                self.print_expr(rhs, indent + 1);
            }
            Expr::Unary { op, operand, .. } => {
                self.line(indent, &format!("unary {:?}", op));
                self.print_expr(operand, indent + 1);
            }
            Expr::Call { callee, args, .. } => {
                self.line(indent, "call");
                self.print_expr(callee, indent + 1);
                for arg in args {
                    self.print_expr(arg, indent + 1);
                }
            }
            Expr::MethodCall {
                object,
                method,
                args,
                ..
            } => {
                self.line(indent, &format!("method-call .{}", method));
                self.print_expr(object, indent + 1);
                for arg in args {
                    self.print_expr(arg, indent + 1);
                }
            }
            Expr::MemberAccess { object, member, .. } => {
                self.line(indent, &format!("member .{}", member));
                self.print_expr(object, indent + 1);
            }
            Expr::Index { object, index, .. } => {
                self.line(indent, "index");
                self.print_expr(object, indent + 1);
                self.print_expr(index, indent + 1);
            }
            Expr::Cast { expr, target, .. } => {
                self.line(indent, &format!("cast as {}", type_text(target)));
                self.print_expr(expr, indent + 1);
            }
            Expr::Block(block) => {
                self.line(indent, "block");
                for stmt in &block.stmts {
                    self.print_stmt(stmt, indent + 1);
                }
                if let Some(tail) = &block.tail {
                    self.print_expr(tail, indent + 1);
                }
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.line(indent, "if-expr");
                self.print_expr(cond, indent + 1);
                self.print_expr(then_branch, indent + 1);
                if let Some(else_branch) = else_branch {
                    self.print_expr(else_branch, indent + 1);
                }
            }
            Expr::Match {
                scrutinee, arms, ..
            } => {
                self.line(indent, "match-expr");
                self.print_expr(scrutinee, indent + 1);
                for arm in arms {
                    self.line(indent + 1, &format!("arm {}", pattern_text(&arm.pattern)));
                    if let Some(guard) = &arm.guard {
                        self.line(indent + 2, "guard");
                        self.print_expr(guard, indent + 3);
                    }
                    self.print_expr(&arm.body, indent + 2);
                }
            }
            Expr::Closure { params, body, .. } => {
                let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
                self.line(indent, &format!("closure |{}|", names.join(", ")));
                self.print_expr(body, indent + 1);
            }
            Expr::Construct {
                type_path, fields, ..
            } => {
                self.line(indent, "construct");
                self.print_expr(type_path, indent + 1);
                for field in fields {
                    self.line(indent + 1, &format!("{}:", field.name));
                    self.print_expr(&field.value, indent + 2);
                }
            }
            Expr::StructLiteral {
                type_name, fields, ..
            } => {
                self.line(indent, &format!("struct-literal {}", type_name));
                for field in fields {
                    self.line(indent + 1, &format!("{}:", field.name));
                    self.print_expr(&field.value, indent + 2);
                }
            }
            Expr::Tuple { elements, .. } => {
                self.line(indent, "tuple");
                for element in elements {
                    self.print_expr(element, indent + 1);
                }
            }
            Expr::Array { elements, .. } => {
                self.line(indent, "array");
                for element in elements {
                    self.print_expr(element, indent + 1);
                }
            }
            Expr::Range {
                start,
                end,
                inclusive,
                ..
            } => {
                self.line(indent, if *inclusive { "range ..=" } else { "range .." });
                if let Some(start) = start {
                    self.print_expr(start, indent + 1);
                }
                if let Some(end) = end {
                    self.print_expr(end, indent + 1);
                }
            }
            Expr::Ref { operand, .. } => {
                self.line(indent, "ref");
                self.print_expr(operand, indent + 1);
            }
            Expr::MutRef { operand, .. } => {
                self.line(indent, "mut ref");
                self.print_expr(operand, indent + 1);
            }
            Expr::Move { operand, .. } => {
                self.line(indent, "move");
                self.print_expr(operand, indent + 1);
            }
            Expr::Await { operand, .. } => {
                self.line(indent, "await");
                self.print_expr(operand, indent + 1);
            }
            Expr::Try { operand, .. } => {
                self.line(indent, "try ?");
                self.print_expr(operand, indent + 1);
            }
            Expr::Assign { target, value, .. } => {
                self.line(indent, "assign");
                self.print_expr(target, indent + 1);
                self.print_expr(value, indent + 1);
            }
            Expr::CompoundAssign {
                op, target, value, ..
            } => {
                self.line(indent, &format!("compound-assign {:?}", op));
                self.print_expr(target, indent + 1);
                self.print_expr(value, indent + 1);
            }
        }
    }
}

fn generics(params: &[GenericParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let names: Vec<String> = params
        .iter()
        .map(|p| match &p.lifetime {
            Some(lifetime) => format!("'{}", lifetime),
            None => p.name.clone(),
        })
        .collect();
    format!("<{}>", names.join(", "))
}

/// Single-line rendering of a type node.
pub fn type_text(ty: &TypeNode) -> String {
    match ty {
        TypeNode::Named { path, .. } => path.join("::"),
        TypeNode::Generic { base, args, .. } => {
            let args: Vec<String> = args.iter().map(type_text).collect();
            format!("{}<{}>", type_text(base), args.join(", "))
        }
        TypeNode::Reference { inner, lifetime, .. } => match lifetime {
            Some(lifetime) => format!("ref '{} {}", lifetime, type_text(inner)),
            None => format!("ref {}", type_text(inner)),
        },
        TypeNode::MutRef { inner, .. } => format!("mut ref {}", type_text(inner)),
        TypeNode::Tuple { elements, .. } => {
            let elements: Vec<String> = elements.iter().map(type_text).collect();
            format!("({})", elements.join(", "))
        }
        TypeNode::Function { params, ret, .. } => {
            let params: Vec<String> = params.iter().map(type_text).collect();
            format!("({}) -> {}", params.join(", "), type_text(ret))
        }
        TypeNode::Array { element, size, .. } => match size {
            Some(size) => format!("Array<{}, {}>", type_text(element), size),
            None => format!("Array<{}>", type_text(element)),
        },
        TypeNode::Option { inner, .. } => format!("Option<{}>", type_text(inner)),
        TypeNode::Result { ok, err, .. } => {
            format!("Result<{}, {}>", type_text(ok), type_text(err))
        }
        TypeNode::Inferred { .. } => "_".to_string(),
    }
}

fn pattern_text(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Wildcard { .. } => "_".to_string(),
        Pattern::Ident { name, .. } => name.clone(),
        Pattern::Literal { .. } => "<literal>".to_string(),
        Pattern::Tuple { elements, .. } => {
            let elements: Vec<String> = elements.iter().map(pattern_text).collect();
            format!("({})", elements.join(", "))
        }
        Pattern::Constructor { path, .. } => path.join("::"),
        Pattern::Or { alternatives, .. } => {
            let alternatives: Vec<String> = alternatives.iter().map(pattern_text).collect();
            alternatives.join(" | ")
        }
    }
}
