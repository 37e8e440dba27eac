use flux_ast::ast::*;
use flux_ast::diag::DiagnosticEngine;
use flux_ast::span::FileId;

use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Prefix operators bind tighter than every infix operator; postfix forms
/// (call, index, member, path, `?`, `as`) are handled separately and bind
/// tighter still.
const UNARY_BP: u8 = 26;

/// Parse a source buffer into a module. Errors are reported through `diag`;
/// the parser recovers and returns a best-effort partial tree.
pub fn parse_source(src: &str, file: FileId, diag: &mut DiagnosticEngine) -> Module {
    Parser::new(Lexer::new(src, file, diag)).parse_module()
}

/// Parser-side half of a speculation snapshot; composed with a
/// [`crate::lexer::LexerState`] to rewind both.
pub struct ParserState<'src> {
    current: Token<'src>,
    previous: Token<'src>,
}

/// Recursive-descent parser with one token of lookahead (plus the lexer's
/// own peek for two-token prefixes like `mut ref`).
pub struct Parser<'src, 'd> {
    lexer: Lexer<'src, 'd>,
    current: Token<'src>,
    previous: Token<'src>,
}

enum InfixOp {
    Assign,
    Compound(CompoundAssignOp),
    Bin(BinaryOp),
    Range { inclusive: bool },
}

fn infix_op(kind: TokenKind) -> Option<(InfixOp, u8, u8)> {
    use TokenKind::*;
    Some(match kind {
        // assignment, right-associative
        Equal => (InfixOp::Assign, 2, 1),
        PlusEqual => (InfixOp::Compound(CompoundAssignOp::AddAssign), 2, 1),
        MinusEqual => (InfixOp::Compound(CompoundAssignOp::SubAssign), 2, 1),
        StarEqual => (InfixOp::Compound(CompoundAssignOp::MulAssign), 2, 1),
        SlashEqual => (InfixOp::Compound(CompoundAssignOp::DivAssign), 2, 1),
        PercentEqual => (InfixOp::Compound(CompoundAssignOp::ModAssign), 2, 1),
        AmpersandEqual => (InfixOp::Compound(CompoundAssignOp::AndAssign), 2, 1),
        PipeEqual => (InfixOp::Compound(CompoundAssignOp::OrAssign), 2, 1),
        CaretEqual => (InfixOp::Compound(CompoundAssignOp::XorAssign), 2, 1),
        DotDot => (InfixOp::Range { inclusive: false }, 4, 5),
        DotDotEqual => (InfixOp::Range { inclusive: true }, 4, 5),
        KwOr => (InfixOp::Bin(BinaryOp::Or), 6, 7),
        KwAnd => (InfixOp::Bin(BinaryOp::And), 8, 9),
        EqualEqual => (InfixOp::Bin(BinaryOp::Equal), 10, 11),
        BangEqual => (InfixOp::Bin(BinaryOp::NotEqual), 10, 11),
        Less => (InfixOp::Bin(BinaryOp::Less), 12, 13),
        LessEqual => (InfixOp::Bin(BinaryOp::LessEqual), 12, 13),
        Greater => (InfixOp::Bin(BinaryOp::Greater), 12, 13),
        GreaterEqual => (InfixOp::Bin(BinaryOp::GreaterEqual), 12, 13),
        Pipe => (InfixOp::Bin(BinaryOp::BitOr), 14, 15),
        Caret => (InfixOp::Bin(BinaryOp::BitXor), 16, 17),
        Ampersand => (InfixOp::Bin(BinaryOp::BitAnd), 18, 19),
        ShiftLeft => (InfixOp::Bin(BinaryOp::ShiftLeft), 20, 21),
        ShiftRight => (InfixOp::Bin(BinaryOp::ShiftRight), 20, 21),
        Plus => (InfixOp::Bin(BinaryOp::Add), 22, 23),
        Minus => (InfixOp::Bin(BinaryOp::Sub), 22, 23),
        Star => (InfixOp::Bin(BinaryOp::Mul), 24, 25),
        Slash => (InfixOp::Bin(BinaryOp::Div), 24, 25),
        Percent => (InfixOp::Bin(BinaryOp::Mod), 24, 25),
        _ => return None,
    })
}

fn starts_expression(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        IntLiteral
            | FloatLiteral
            | StringLiteral
            | CharLiteral
            | Identifier
            | KwTrue
            | KwFalse
            | KwSelf
            | LParen
            | LBracket
            | LBrace
            | KwIf
            | KwMatch
            | Pipe
            | Minus
            | KwNot
            | Tilde
            | KwRef
            | KwMut
            | KwMove
            | KwAwait
            | Underscore
    )
}

fn starts_statement(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        KwLet
            | KwConst
            | KwReturn
            | KwIf
            | KwMatch
            | KwFor
            | KwWhile
            | KwLoop
            | KwBreak
            | KwContinue
            | LBrace
    )
}

/// Decode the payload of a char-literal token (`'a'` or `'\n'`).
fn char_value(text: &str) -> char {
    let mut chars = text.chars();
    chars.next(); // opening quote
    match chars.next() {
        Some('\\') => match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some(other) => other,
            None => '\0',
        },
        Some(c) => c,
        None => '\0',
    }
}

impl<'src, 'd> Parser<'src, 'd> {
    pub fn new(mut lexer: Lexer<'src, 'd>) -> Self {
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: current,
        }
    }

    // ======= token management =======

    fn advance(&mut self) -> Token<'src> {
        self.previous = self.current;
        self.current = self.lexer.next_token();
        self.previous
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// On mismatch, emits a diagnostic and returns the current token
    /// without consuming it; `synchronize` picks up at the next boundary.
    fn expect(&mut self, kind: TokenKind, message: &str) -> Token<'src> {
        if self.check(kind) {
            return self.advance();
        }
        let tok = self.current;
        self.error(tok, format!("{}, got '{}'", message, tok.text));
        tok
    }

    fn expect_semicolon(&mut self) -> Token<'src> {
        self.expect(TokenKind::Semicolon, "expected ';'")
    }

    /// Close a type-argument list. Nested generics end in `>>`, which the
    /// lexer's longest-match decodes as a shift; split it into two `>`s,
    /// consuming the first and leaving the second current.
    fn expect_generic_close(&mut self) {
        if self.check(TokenKind::Greater) {
            self.advance();
            return;
        }
        if self.check(TokenKind::ShiftRight) {
            let tok = self.current;
            self.previous = Token {
                kind: TokenKind::Greater,
                text: ">",
                loc: tok.loc,
                value: tok.value,
            };
            let mut rest = tok;
            rest.kind = TokenKind::Greater;
            rest.text = ">";
            rest.loc.column += 1;
            rest.loc.offset += 1;
            self.current = rest;
            return;
        }
        let tok = self.current;
        self.error(
            tok,
            format!("expected '>' after type arguments, got '{}'", tok.text),
        );
    }

    fn error(&mut self, tok: Token<'src>, message: impl Into<String>) {
        self.lexer.diag().error(tok.loc, message);
    }

    fn save_state(&self) -> ParserState<'src> {
        ParserState {
            current: self.current,
            previous: self.previous,
        }
    }

    fn restore_state(&mut self, state: ParserState<'src>) {
        self.current = state.current;
        self.previous = state.previous;
    }

    /// Advance to the next statement/declaration boundary after an error.
    fn synchronize(&mut self) {
        use TokenKind::*;
        while !self.check(Eof) {
            if self.previous.kind == Semicolon {
                return;
            }
            match self.current.kind {
                KwFunc | KwLet | KwConst | KwStruct | KwClass | KwEnum | KwTrait | KwImpl
                | KwReturn | KwIf | KwFor | KwWhile | KwLoop | KwModule | KwImport => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ======= module =======

    pub fn parse_module(&mut self) -> Module {
        let mut module = Module {
            loc: self.current.loc,
            ..Module::default()
        };

        if self.check(TokenKind::KwModule) {
            let decl = self.parse_module_decl();
            module.name = decl.path.join("::");
        }

        while self.check(TokenKind::KwImport) {
            let decl = self.parse_import_decl();
            module.imports.push(decl.path.join("::"));
        }

        while !self.check(TokenKind::Eof) {
            let before = self.current.loc.offset;
            match self.parse_declaration() {
                Some(decl) => module.decls.push(decl),
                None => {
                    // Error recovery: skip at most one token per iteration,
                    // and only when synchronize made no progress.
                    if self.current.loc.offset == before && !self.check(TokenKind::Eof) {
                        self.advance();
                    }
                }
            }
        }

        module
    }

    fn parse_module_decl(&mut self) -> ModuleDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwModule, "expected 'module'");
        let path = self.parse_path();
        self.expect_semicolon();
        ModuleDecl {
            path,
            vis: Visibility::Private,
            loc,
        }
    }

    fn parse_import_decl(&mut self) -> ImportDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwImport, "expected 'import'");
        let path = self.parse_path();
        self.expect_semicolon();
        ImportDecl {
            path,
            alias: None,
            vis: Visibility::Private,
            loc,
        }
    }

    fn parse_path(&mut self) -> Vec<String> {
        let mut segments = Vec::new();
        let tok = self.expect(TokenKind::Identifier, "expected identifier in path");
        segments.push(tok.text.to_string());
        while self.eat(TokenKind::ColonColon) {
            let tok = self.expect(TokenKind::Identifier, "expected identifier after '::'");
            segments.push(tok.text.to_string());
        }
        segments
    }

    // ======= declarations =======

    fn parse_declaration(&mut self) -> Option<Decl> {
        self.skip_annotations();

        match self.current.kind {
            TokenKind::KwFunc => Some(Decl::Func(self.parse_func_decl(false))),
            TokenKind::KwAsync => {
                self.advance();
                Some(Decl::Func(self.parse_func_decl(true)))
            }
            TokenKind::KwStruct => Some(Decl::Struct(self.parse_struct_decl())),
            TokenKind::KwClass => Some(Decl::Class(self.parse_class_decl())),
            TokenKind::KwEnum => Some(Decl::Enum(self.parse_enum_decl())),
            TokenKind::KwTrait => Some(Decl::Trait(self.parse_trait_decl())),
            TokenKind::KwImpl => Some(Decl::Impl(self.parse_impl_decl())),
            TokenKind::KwType => Some(Decl::TypeAlias(self.parse_type_alias_decl())),
            TokenKind::KwPub | TokenKind::KwPublic => {
                self.advance();
                let mut decl = self.parse_declaration()?;
                decl.set_visibility(Visibility::Public);
                Some(decl)
            }
            TokenKind::KwPrivate => {
                self.advance();
                let mut decl = self.parse_declaration()?;
                decl.set_visibility(Visibility::Private);
                Some(decl)
            }
            TokenKind::KwLet | TokenKind::KwConst => {
                let tok = self.current;
                self.error(
                    tok,
                    "top-level let/const statements are not yet supported outside functions",
                );
                self.synchronize();
                None
            }
            _ => {
                let tok = self.current;
                self.error(
                    tok,
                    "expected declaration (func, struct, class, enum, trait, impl, type)",
                );
                self.synchronize();
                None
            }
        }
    }

    /// Leading annotations are consumed and discarded, including a balanced
    /// `(...)` argument list.
    fn skip_annotations(&mut self) {
        use TokenKind::*;
        while matches!(
            self.current.kind,
            At | KwDoc | KwDeprecated | KwTest | Hash | HashBang
        ) {
            self.advance();
            if self.check(LParen) {
                self.advance();
                let mut depth = 1;
                while depth > 0 && !self.check(Eof) {
                    if self.check(LParen) {
                        depth += 1;
                    }
                    if self.check(RParen) {
                        depth -= 1;
                    }
                    self.advance();
                }
            }
        }
    }

    fn parse_func_decl(&mut self, is_async: bool) -> FuncDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwFunc, "expected 'func'");

        let name = self
            .expect(TokenKind::Identifier, "expected function name")
            .text
            .to_string();

        let generic_params = self.parse_generic_params();

        self.expect(TokenKind::LParen, "expected '(' in function declaration");
        let params = self.parse_func_params();
        self.expect(TokenKind::RParen, "expected ')' after parameters");

        let return_type = if self.eat(TokenKind::Arrow) {
            self.parse_type()
        } else {
            None
        };

        // A missing body (semicolon) is a trait method declaration.
        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_block())
        } else {
            self.expect_semicolon();
            None
        };

        FuncDecl {
            name,
            generic_params,
            params,
            return_type,
            body,
            is_async,
            vis: Visibility::Private,
            loc,
        }
    }

    /// `< (Ident (: Bound (+ Bound)*)? | 'lifetime),* >`
    fn parse_generic_params(&mut self) -> Vec<GenericParam> {
        let mut params = Vec::new();
        if !self.eat(TokenKind::Less) {
            return params;
        }

        while !self.check(TokenKind::Greater) && !self.check(TokenKind::Eof) {
            let loc = self.current.loc;

            if self.check(TokenKind::Apostrophe) {
                // The lexer packs the full `'name` into the token text.
                let tok = self.advance();
                params.push(GenericParam {
                    name: String::new(),
                    trait_bounds: Vec::new(),
                    lifetime: Some(tok.text.trim_start_matches('\'').to_string()),
                    loc,
                });
            } else {
                let name = self
                    .expect(TokenKind::Identifier, "expected type parameter name")
                    .text
                    .to_string();

                let mut trait_bounds = Vec::new();
                if self.eat(TokenKind::Colon) {
                    let bound = self.expect(TokenKind::Identifier, "expected trait bound");
                    trait_bounds.push(bound.text.to_string());
                    while self.eat(TokenKind::Plus) {
                        let bound = self.expect(TokenKind::Identifier, "expected trait bound");
                        trait_bounds.push(bound.text.to_string());
                    }
                }

                params.push(GenericParam {
                    name,
                    trait_bounds,
                    lifetime: None,
                    loc,
                });
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::Greater, "expected '>' after generic parameters");
        params
    }

    fn parse_func_params(&mut self) -> Vec<FuncParam> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return params;
        }

        params.push(self.parse_func_param());
        while self.eat(TokenKind::Comma) {
            if self.check(TokenKind::RParen) {
                break;
            }
            params.push(self.parse_func_param());
        }

        params
    }

    fn parse_func_param(&mut self) -> FuncParam {
        let loc = self.current.loc;
        let mut is_mutable = false;
        let mut is_ref = false;
        let mut is_mut_ref = false;
        let mut is_self = false;

        if self.eat(TokenKind::KwMut) {
            is_mutable = true;
            if self.eat(TokenKind::KwRef) {
                is_mut_ref = true;
            }
        }
        if !is_mut_ref && self.eat(TokenKind::KwRef) {
            is_ref = true;
        }

        let name = if self.check(TokenKind::KwSelf) {
            is_self = true;
            self.advance().text.to_string()
        } else {
            self.expect(TokenKind::Identifier, "expected parameter name")
                .text
                .to_string()
        };

        self.expect(TokenKind::Colon, "expected ':' after parameter name");
        let ty = self.parse_type();

        FuncParam {
            name,
            ty,
            is_mutable,
            is_self,
            is_ref,
            is_mut_ref,
            loc,
        }
    }

    fn parse_struct_decl(&mut self) -> StructDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwStruct, "expected 'struct'");

        let name = self
            .expect(TokenKind::Identifier, "expected struct name")
            .text
            .to_string();
        let generic_params = self.parse_generic_params();

        self.expect(TokenKind::LBrace, "expected '{' in struct declaration");
        let fields = self.parse_struct_fields();
        self.expect(TokenKind::RBrace, "expected '}' after struct fields");

        StructDecl {
            name,
            generic_params,
            fields,
            vis: Visibility::Private,
            loc,
        }
    }

    /// Struct fields are public by default.
    fn parse_struct_fields(&mut self) -> Vec<FieldDecl> {
        let mut fields = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let loc = self.current.loc;
            let name = self
                .expect(TokenKind::Identifier, "expected field name")
                .text
                .to_string();
            self.expect(TokenKind::Colon, "expected ':' after field name");
            let ty = self.parse_type();

            fields.push(FieldDecl {
                name,
                ty,
                vis: Visibility::Public,
                loc,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        fields
    }

    fn parse_class_decl(&mut self) -> ClassDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwClass, "expected 'class'");

        let name = self
            .expect(TokenKind::Identifier, "expected class name")
            .text
            .to_string();
        let generic_params = self.parse_generic_params();

        self.expect(TokenKind::LBrace, "expected '{' in class declaration");
        let fields = self.parse_class_fields();
        self.expect(TokenKind::RBrace, "expected '}' after class fields");

        ClassDecl {
            name,
            generic_params,
            fields,
            methods: Vec::new(),
            vis: Visibility::Private,
            loc,
        }
    }

    /// Class fields may carry visibility prefixes.
    fn parse_class_fields(&mut self) -> Vec<FieldDecl> {
        let mut fields = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let loc = self.current.loc;

            let vis = if self.eat(TokenKind::KwPublic) || self.eat(TokenKind::KwPub) {
                Visibility::Public
            } else if self.eat(TokenKind::KwPrivate) {
                Visibility::Private
            } else {
                Visibility::Public
            };

            let name = self
                .expect(TokenKind::Identifier, "expected field name")
                .text
                .to_string();
            self.expect(TokenKind::Colon, "expected ':' after field name");
            let ty = self.parse_type();

            fields.push(FieldDecl { name, ty, vis, loc });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        fields
    }

    fn parse_enum_decl(&mut self) -> EnumDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwEnum, "expected 'enum'");

        let name = self
            .expect(TokenKind::Identifier, "expected enum name")
            .text
            .to_string();
        let generic_params = self.parse_generic_params();

        self.expect(TokenKind::LBrace, "expected '{' in enum declaration");
        let variants = self.parse_enum_variants();
        self.expect(TokenKind::RBrace, "expected '}' after enum variants");

        EnumDecl {
            name,
            generic_params,
            variants,
            vis: Visibility::Private,
            loc,
        }
    }

    fn parse_enum_variants(&mut self) -> Vec<EnumVariant> {
        let mut variants = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let loc = self.current.loc;
            let name = self
                .expect(TokenKind::Identifier, "expected variant name")
                .text
                .to_string();

            let mut kind = VariantKind::Unit;
            let mut tuple_fields = Vec::new();
            let mut struct_fields = Vec::new();

            if self.eat(TokenKind::LParen) {
                // Tuple variant: Write(String)
                kind = VariantKind::Tuple;
                while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                    if let Some(ty) = self.parse_type() {
                        tuple_fields.push(ty);
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "expected ')' after tuple variant fields");
            } else if self.eat(TokenKind::LBrace) {
                // Struct variant: Move { x: Int32, y: Int32 }
                kind = VariantKind::Struct;
                while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
                    let field_loc = self.current.loc;
                    let field_name = self
                        .expect(TokenKind::Identifier, "expected field name")
                        .text
                        .to_string();
                    self.expect(TokenKind::Colon, "expected ':' after field name");
                    let ty = self.parse_type();
                    struct_fields.push(FieldDecl {
                        name: field_name,
                        ty,
                        vis: Visibility::Public,
                        loc: field_loc,
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "expected '}' after struct variant fields");
            }

            variants.push(EnumVariant {
                name,
                kind,
                tuple_fields,
                struct_fields,
                loc,
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        variants
    }

    fn parse_trait_decl(&mut self) -> TraitDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwTrait, "expected 'trait'");

        let name = self
            .expect(TokenKind::Identifier, "expected trait name")
            .text
            .to_string();
        let generic_params = self.parse_generic_params();

        let mut super_traits = Vec::new();
        if self.eat(TokenKind::Colon) {
            let tok = self.expect(TokenKind::Identifier, "expected super trait name");
            super_traits.push(tok.text.to_string());
            while self.eat(TokenKind::Plus) {
                let tok = self.expect(TokenKind::Identifier, "expected trait name");
                super_traits.push(tok.text.to_string());
            }
        }

        self.expect(TokenKind::LBrace, "expected '{' in trait declaration");
        let methods = self.parse_method_list("expected method declaration in trait");
        self.expect(TokenKind::RBrace, "expected '}' after trait methods");

        TraitDecl {
            name,
            generic_params,
            super_traits,
            methods,
            vis: Visibility::Private,
            loc,
        }
    }

    fn parse_impl_decl(&mut self) -> ImplDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwImpl, "expected 'impl'");

        let generic_params = self.parse_generic_params();
        let first_type = self.parse_type();

        let mut trait_name = None;
        let target;

        if self.eat(TokenKind::KwFor) {
            // The first type was the trait name; keep its last path segment.
            if let Some(TypeNode::Named { path, .. }) = &first_type {
                trait_name = path.last().cloned();
            }
            target = self.parse_type();
        } else {
            target = first_type;
        }

        self.expect(TokenKind::LBrace, "expected '{' in impl block");
        let methods = self.parse_method_list("expected method declaration in impl block");
        self.expect(TokenKind::RBrace, "expected '}' after impl block");

        ImplDecl {
            target,
            trait_name,
            generic_params,
            methods,
            vis: Visibility::Private,
            loc,
        }
    }

    fn parse_method_list(&mut self, error_message: &str) -> Vec<FuncDecl> {
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let is_async = self.eat(TokenKind::KwAsync);
            if self.check(TokenKind::KwFunc) {
                methods.push(self.parse_func_decl(is_async));
            } else {
                let tok = self.current;
                self.error(tok, error_message);
                self.advance();
            }
        }
        methods
    }

    fn parse_type_alias_decl(&mut self) -> TypeAliasDecl {
        let loc = self.current.loc;
        self.expect(TokenKind::KwType, "expected 'type'");

        let name = self
            .expect(TokenKind::Identifier, "expected type alias name")
            .text
            .to_string();
        let generic_params = self.parse_generic_params();

        self.expect(TokenKind::Equal, "expected '=' in type alias");
        let aliased = self.parse_type();
        self.expect_semicolon();

        TypeAliasDecl {
            name,
            generic_params,
            aliased,
            vis: Visibility::Private,
            loc,
        }
    }

    // ======= statements =======

    fn parse_statement(&mut self) -> Option<Stmt> {
        let before = self.current.loc.offset;
        let stmt = self.parse_statement_inner();
        if stmt.is_none() {
            self.synchronize();
            // Guarantee progress when synchronize stops on the same token.
            if self.current.loc.offset == before
                && !self.check(TokenKind::Eof)
                && !self.check(TokenKind::RBrace)
            {
                self.advance();
            }
        }
        stmt
    }

    fn parse_statement_inner(&mut self) -> Option<Stmt> {
        match self.current.kind {
            TokenKind::KwLet => self.parse_let_stmt(),
            TokenKind::KwConst => self.parse_const_stmt(),
            TokenKind::KwReturn => self.parse_return_stmt(),
            TokenKind::KwIf => self.parse_if_stmt().map(Stmt::If),
            TokenKind::KwMatch => self.parse_match_stmt(),
            TokenKind::KwFor => self.parse_for_stmt(),
            TokenKind::KwWhile => self.parse_while_stmt(),
            TokenKind::KwLoop => self.parse_loop_stmt(),
            TokenKind::KwBreak => {
                let loc = self.current.loc;
                self.advance();
                self.expect_semicolon();
                Some(Stmt::Break { loc })
            }
            TokenKind::KwContinue => {
                let loc = self.current.loc;
                self.advance();
                self.expect_semicolon();
                Some(Stmt::Continue { loc })
            }
            TokenKind::LBrace => Some(Stmt::Block(self.parse_block())),
            _ => {
                let loc = self.current.loc;
                let expr = self.parse_expression()?;
                self.expect_semicolon();
                Some(Stmt::Expr(ExprStmt { expr, loc }))
            }
        }
    }

    fn parse_let_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwLet, "expected 'let'");

        let is_mutable = self.eat(TokenKind::KwMut);
        let name = self
            .expect(TokenKind::Identifier, "expected variable name")
            .text
            .to_string();

        self.expect(
            TokenKind::Colon,
            "expected ':' after variable name (Flux requires explicit types)",
        );
        let ty = self.parse_type();

        let init = if self.eat(TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_semicolon();
        Some(Stmt::Let(LetStmt {
            name,
            ty,
            init,
            is_mutable,
            loc,
        }))
    }

    fn parse_const_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwConst, "expected 'const'");

        let name = self
            .expect(TokenKind::Identifier, "expected constant name")
            .text
            .to_string();

        self.expect(TokenKind::Colon, "expected ':' after constant name");
        let ty = self.parse_type();

        self.expect(TokenKind::Equal, "expected '=' in constant declaration");
        let value = self.parse_expression()?;

        self.expect_semicolon();
        Some(Stmt::Const(ConstStmt {
            name,
            ty,
            value,
            loc,
        }))
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwReturn, "expected 'return'");

        let value = if !self.check(TokenKind::Semicolon) && !self.check(TokenKind::RBrace) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_semicolon();
        Some(Stmt::Return(ReturnStmt { value, loc }))
    }

    fn parse_if_stmt(&mut self) -> Option<IfStmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwIf, "expected 'if'");

        let cond = self.parse_expression()?;
        let then_branch = self.parse_block();

        let else_branch = if self.eat(TokenKind::KwElse) {
            if self.check(TokenKind::KwIf) {
                Some(Box::new(Stmt::If(self.parse_if_stmt()?)))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block())))
            }
        } else {
            None
        };

        Some(IfStmt {
            cond,
            then_branch,
            else_branch,
            loc,
        })
    }

    fn parse_match_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwMatch, "expected 'match'");

        let scrutinee = self.parse_expression()?;
        self.expect(TokenKind::LBrace, "expected '{' in match statement");

        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            arms.push(self.parse_match_arm()?);
            self.eat(TokenKind::Comma);
        }

        self.expect(TokenKind::RBrace, "expected '}' after match arms");
        Some(Stmt::Match(MatchStmt {
            scrutinee,
            arms,
            loc,
        }))
    }

    fn parse_match_arm(&mut self) -> Option<MatchArm> {
        let loc = self.current.loc;
        let pattern = self.parse_pattern();

        let guard = if self.eat(TokenKind::KwIf) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(TokenKind::FatArrow, "expected '=>' in match arm");

        let body = if self.check(TokenKind::LBrace) {
            self.parse_block_expr()
        } else {
            self.parse_expression()?
        };

        Some(MatchArm {
            pattern,
            guard,
            body,
            loc,
        })
    }

    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwFor, "expected 'for'");

        let var_name = self
            .expect(TokenKind::Identifier, "expected loop variable name")
            .text
            .to_string();
        self.expect(TokenKind::Colon, "expected ':' after loop variable name");
        let var_ty = self.parse_type();

        self.expect(TokenKind::KwIn, "expected 'in' in for loop");
        let iterable = self.parse_expression()?;
        let body = self.parse_block();

        Some(Stmt::For(ForStmt {
            var_name,
            var_ty,
            iterable,
            body,
            loc,
        }))
    }

    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwWhile, "expected 'while'");

        let cond = self.parse_expression()?;
        let body = self.parse_block();

        Some(Stmt::While(WhileStmt { cond, body, loc }))
    }

    fn parse_loop_stmt(&mut self) -> Option<Stmt> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwLoop, "expected 'loop'");
        let body = self.parse_block();
        Some(Stmt::Loop(LoopStmt { body, loc }))
    }

    fn parse_block(&mut self) -> BlockStmt {
        let loc = self.current.loc;
        self.expect(TokenKind::LBrace, "expected '{'");

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
        }

        self.expect(TokenKind::RBrace, "expected '}'");
        BlockStmt { stmts, loc }
    }

    // ======= expressions =======

    fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            // Postfix forms bind tightest and are left-associative.
            match self.current.kind {
                TokenKind::LParen => {
                    lhs = self.parse_call(lhs);
                    continue;
                }
                TokenKind::LBracket => {
                    lhs = self.parse_index(lhs)?;
                    continue;
                }
                TokenKind::Dot => {
                    lhs = self.parse_member(lhs)?;
                    continue;
                }
                TokenKind::ColonColon => {
                    lhs = self.parse_path_continuation(lhs);
                    continue;
                }
                TokenKind::Question => {
                    let loc = lhs.loc();
                    self.advance();
                    lhs = Expr::Try {
                        operand: Box::new(lhs),
                        loc,
                    };
                    continue;
                }
                TokenKind::KwAs => {
                    let loc = lhs.loc();
                    self.advance();
                    if let Some(target) = self.parse_type() {
                        lhs = Expr::Cast {
                            expr: Box::new(lhs),
                            target,
                            loc,
                        };
                    }
                    continue;
                }
                _ => {}
            }

            let Some((op, lbp, rbp)) = infix_op(self.current.kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let loc = lhs.loc();
            self.advance();

            match op {
                InfixOp::Range { inclusive } => {
                    let end = if starts_expression(self.current.kind) {
                        match self.parse_expr_bp(rbp) {
                            Some(e) => Some(Box::new(e)),
                            None => break,
                        }
                    } else {
                        None
                    };
                    lhs = Expr::Range {
                        start: Some(Box::new(lhs)),
                        end,
                        inclusive,
                        loc,
                    };
                }
                InfixOp::Assign => {
                    let Some(value) = self.parse_expr_bp(rbp) else {
                        break;
                    };
                    lhs = Expr::Assign {
                        target: Box::new(lhs),
                        value: Box::new(value),
                        loc,
                    };
                }
                InfixOp::Compound(op) => {
                    let Some(value) = self.parse_expr_bp(rbp) else {
                        break;
                    };
                    lhs = Expr::CompoundAssign {
                        op,
                        target: Box::new(lhs),
                        value: Box::new(value),
                        loc,
                    };
                }
                InfixOp::Bin(op) => {
                    let Some(rhs) = self.parse_expr_bp(rbp) else {
                        break;
                    };
                    lhs = Expr::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                        loc,
                    };
                }
            }
        }

        Some(lhs)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let loc = self.current.loc;
        let kind = self.current.kind;

        match kind {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::Unary {
                    op: UnaryOp::Negate,
                    operand: Box::new(operand),
                    loc,
                })
            }
            TokenKind::KwNot => {
                self.advance();
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    loc,
                })
            }
            TokenKind::Tilde => {
                self.advance();
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::Unary {
                    op: UnaryOp::BitwiseNot,
                    operand: Box::new(operand),
                    loc,
                })
            }
            TokenKind::KwRef => {
                self.advance();
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::Ref {
                    operand: Box::new(operand),
                    loc,
                })
            }
            // `mut ref expr` is a two-token prefix; commit only when the
            // lexer's peek confirms `ref` follows `mut`.
            TokenKind::KwMut if self.lexer.peek_token().kind == TokenKind::KwRef => {
                self.advance(); // mut
                self.advance(); // ref
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::MutRef {
                    operand: Box::new(operand),
                    loc,
                })
            }
            TokenKind::KwMove => {
                self.advance();
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::Move {
                    operand: Box::new(operand),
                    loc,
                })
            }
            TokenKind::KwAwait => {
                self.advance();
                let operand = self.parse_expr_bp(UNARY_BP)?;
                Some(Expr::Await {
                    operand: Box::new(operand),
                    loc,
                })
            }

            TokenKind::IntLiteral => {
                let tok = self.advance();
                Some(Expr::IntLiteral {
                    value: tok.int_value(),
                    loc,
                })
            }
            TokenKind::FloatLiteral => {
                let tok = self.advance();
                Some(Expr::FloatLiteral {
                    value: tok.float_value(),
                    loc,
                })
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                Some(Expr::StringLiteral {
                    value: tok.text.to_string(),
                    loc,
                })
            }
            TokenKind::CharLiteral => {
                let tok = self.advance();
                Some(Expr::CharLiteral {
                    value: char_value(tok.text),
                    loc,
                })
            }
            TokenKind::KwTrue => {
                self.advance();
                Some(Expr::BoolLiteral { value: true, loc })
            }
            TokenKind::KwFalse => {
                self.advance();
                Some(Expr::BoolLiteral { value: false, loc })
            }

            TokenKind::Identifier => self.parse_ident_expr(),
            TokenKind::KwSelf => {
                self.advance();
                Some(Expr::Ident {
                    name: "self".to_string(),
                    loc,
                })
            }

            TokenKind::LParen => self.parse_paren_or_tuple(),
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.check(TokenKind::Eof) {
                    elements.push(self.parse_expression()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "expected ']' after array elements");
                Some(Expr::Array { elements, loc })
            }
            TokenKind::LBrace => Some(self.parse_block_expr()),
            TokenKind::KwIf => self.parse_if_expr(),
            TokenKind::KwMatch => self.parse_match_expr(),
            TokenKind::Pipe => self.parse_closure_expr(),
            TokenKind::Underscore => {
                self.advance();
                Some(Expr::Ident {
                    name: "_".to_string(),
                    loc,
                })
            }

            _ => {
                let tok = self.current;
                self.error(tok, format!("expected expression, got '{}'", tok.text));
                None
            }
        }
    }

    fn parse_ident_expr(&mut self) -> Option<Expr> {
        let tok = self.advance();
        let loc = tok.loc;
        let name = tok.text.to_string();

        // Qualified path: Foo::Bar::baz
        if self.check(TokenKind::ColonColon) {
            let mut segments = vec![name];
            while self.eat(TokenKind::ColonColon) {
                let seg = self.expect(TokenKind::Identifier, "expected identifier after '::'");
                segments.push(seg.text.to_string());
            }
            let path = Expr::Path { segments, loc };

            if self.check(TokenKind::LBrace) && self.brace_starts_struct_literal() {
                let fields = self.parse_field_inits();
                return Some(Expr::Construct {
                    type_path: Box::new(path),
                    fields,
                    loc,
                });
            }
            return Some(path);
        }

        // Struct literal: TypeName { field: value }
        if self.check(TokenKind::LBrace) && self.brace_starts_struct_literal() {
            let fields = self.parse_field_inits();
            return Some(Expr::StructLiteral {
                type_name: name,
                fields,
                loc,
            });
        }

        Some(Expr::Ident { name, loc })
    }

    /// Speculates past the `{` to tell a struct literal from a block: the
    /// literal starts with `}` (empty) or `Ident :`. Both parser and lexer
    /// state are rewound before returning.
    fn brace_starts_struct_literal(&mut self) -> bool {
        let parser_state = self.save_state();
        let lexer_state = self.lexer.save_state();

        self.advance(); // '{'
        let is_literal = if self.check(TokenKind::RBrace) {
            true
        } else if self.check(TokenKind::Identifier) {
            self.advance();
            self.check(TokenKind::Colon)
        } else {
            false
        };

        self.restore_state(parser_state);
        self.lexer.restore_state(lexer_state);
        is_literal
    }

    fn parse_field_inits(&mut self) -> Vec<FieldInit> {
        self.expect(TokenKind::LBrace, "expected '{'");

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let loc = self.current.loc;
            let name = self
                .expect(TokenKind::Identifier, "expected field name")
                .text
                .to_string();
            self.expect(TokenKind::Colon, "expected ':' after field name");
            let Some(value) = self.parse_expression() else {
                break;
            };
            fields.push(FieldInit { name, value, loc });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBrace, "expected '}' after struct literal");
        fields
    }

    /// `()` is the empty tuple; a trailing comma or two or more elements
    /// yields a tuple, otherwise the group is just parentheses.
    fn parse_paren_or_tuple(&mut self) -> Option<Expr> {
        let loc = self.current.loc;
        self.advance(); // '('

        if self.check(TokenKind::RParen) {
            self.advance();
            return Some(Expr::Tuple {
                elements: Vec::new(),
                loc,
            });
        }

        let first = self.parse_expression()?;

        if self.check(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.eat(TokenKind::Comma) {
                if self.check(TokenKind::RParen) {
                    break;
                }
                elements.push(self.parse_expression()?);
            }
            self.expect(TokenKind::RParen, "expected ')' after tuple");
            return Some(Expr::Tuple { elements, loc });
        }

        self.expect(TokenKind::RParen, "expected ')'");
        Some(first)
    }

    fn parse_block_expr(&mut self) -> Expr {
        let loc = self.current.loc;
        self.expect(TokenKind::LBrace, "expected '{'");

        let mut stmts = Vec::new();
        let mut tail = None;

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if starts_statement(self.current.kind) {
                if let Some(stmt) = self.parse_statement() {
                    stmts.push(stmt);
                }
                continue;
            }

            let Some(expr) = self.parse_expression() else {
                self.synchronize();
                continue;
            };
            if self.check(TokenKind::RBrace) {
                // Trailing expression without a semicolon: the block's value.
                tail = Some(Box::new(expr));
                break;
            }
            let expr_loc = expr.loc();
            self.expect_semicolon();
            stmts.push(Stmt::Expr(ExprStmt {
                expr,
                loc: expr_loc,
            }));
        }

        self.expect(TokenKind::RBrace, "expected '}'");
        Expr::Block(BlockExpr { stmts, tail, loc })
    }

    fn parse_if_expr(&mut self) -> Option<Expr> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwIf, "expected 'if'");

        let cond = self.parse_expression()?;
        let then_branch = self.parse_block_expr();

        let else_branch = if self.eat(TokenKind::KwElse) {
            if self.check(TokenKind::KwIf) {
                Some(Box::new(self.parse_if_expr()?))
            } else {
                Some(Box::new(self.parse_block_expr()))
            }
        } else {
            None
        };

        Some(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch,
            loc,
        })
    }

    fn parse_match_expr(&mut self) -> Option<Expr> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwMatch, "expected 'match'");

        let scrutinee = self.parse_expression()?;
        self.expect(TokenKind::LBrace, "expected '{' in match expression");

        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            arms.push(self.parse_match_arm()?);
            self.eat(TokenKind::Comma);
        }

        self.expect(TokenKind::RBrace, "expected '}' after match arms");
        Some(Expr::Match {
            scrutinee: Box::new(scrutinee),
            arms,
            loc,
        })
    }

    /// `|param: Type, ...| -> RetType { body }`
    fn parse_closure_expr(&mut self) -> Option<Expr> {
        let loc = self.current.loc;
        self.expect(TokenKind::Pipe, "expected '|' for closure");

        let mut params = Vec::new();
        while !self.check(TokenKind::Pipe) && !self.check(TokenKind::Eof) {
            let name = self
                .expect(TokenKind::Identifier, "expected parameter name")
                .text
                .to_string();
            let ty = if self.eat(TokenKind::Colon) {
                self.parse_type()
            } else {
                None
            };
            params.push(ClosureParam { name, ty });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Pipe, "expected '|' after closure parameters");

        let return_type = if self.eat(TokenKind::Arrow) {
            self.parse_type()
        } else {
            None
        };

        let body = self.parse_block_expr();

        Some(Expr::Closure {
            params,
            return_type,
            body: Box::new(body),
            loc,
        })
    }

    // ======= postfix =======

    fn parse_call(&mut self, callee: Expr) -> Expr {
        let loc = callee.loc();
        self.expect(TokenKind::LParen, "expected '('");

        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
            match self.parse_expression() {
                Some(arg) => args.push(arg),
                None => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen, "expected ')' after arguments");
        Expr::Call {
            callee: Box::new(callee),
            args,
            loc,
        }
    }

    fn parse_index(&mut self, object: Expr) -> Option<Expr> {
        let loc = object.loc();
        self.expect(TokenKind::LBracket, "expected '['");
        let index = self.parse_expression()?;
        self.expect(TokenKind::RBracket, "expected ']'");
        Some(Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
            loc,
        })
    }

    /// `.name` is member access; `.name(` promotes to a method call.
    fn parse_member(&mut self, object: Expr) -> Option<Expr> {
        let loc = object.loc();
        self.advance(); // '.'
        let member = self
            .expect(TokenKind::Identifier, "expected member name after '.'")
            .text
            .to_string();

        if self.eat(TokenKind::LParen) {
            let mut args = Vec::new();
            while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                args.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "expected ')' after method arguments");
            return Some(Expr::MethodCall {
                object: Box::new(object),
                method: member,
                args,
                loc,
            });
        }

        Some(Expr::MemberAccess {
            object: Box::new(object),
            member,
            loc,
        })
    }

    /// `:: Ident` promotes the left operand to a path, flattening existing
    /// `Ident`/`Path` segments.
    fn parse_path_continuation(&mut self, lhs: Expr) -> Expr {
        let loc = lhs.loc();
        self.advance(); // '::'

        let mut segments = match lhs {
            Expr::Ident { name, .. } => vec![name],
            Expr::Path { segments, .. } => segments,
            _ => Vec::new(),
        };

        let next = self.expect(TokenKind::Identifier, "expected identifier after '::'");
        segments.push(next.text.to_string());
        while self.eat(TokenKind::ColonColon) {
            let seg = self.expect(TokenKind::Identifier, "expected identifier after '::'");
            segments.push(seg.text.to_string());
        }

        let path = Expr::Path { segments, loc };

        if self.check(TokenKind::LBrace) && self.brace_starts_struct_literal() {
            let fields = self.parse_field_inits();
            return Expr::Construct {
                type_path: Box::new(path),
                fields,
                loc,
            };
        }

        path
    }

    // ======= patterns =======

    fn parse_pattern(&mut self) -> Pattern {
        let first = self.parse_pattern_primary();

        if self.check(TokenKind::Pipe) {
            let loc = first.loc();
            let mut alternatives = vec![first];
            while self.eat(TokenKind::Pipe) {
                alternatives.push(self.parse_pattern_primary());
            }
            return Pattern::Or { alternatives, loc };
        }

        first
    }

    fn parse_pattern_primary(&mut self) -> Pattern {
        let loc = self.current.loc;

        match self.current.kind {
            TokenKind::Underscore => {
                self.advance();
                Pattern::Wildcard { loc }
            }

            TokenKind::IntLiteral => {
                let tok = self.advance();
                Pattern::Literal {
                    literal: Box::new(Expr::IntLiteral {
                        value: tok.int_value(),
                        loc,
                    }),
                    loc,
                }
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                Pattern::Literal {
                    literal: Box::new(Expr::StringLiteral {
                        value: tok.text.to_string(),
                        loc,
                    }),
                    loc,
                }
            }
            TokenKind::KwTrue => {
                self.advance();
                Pattern::Literal {
                    literal: Box::new(Expr::BoolLiteral { value: true, loc }),
                    loc,
                }
            }
            TokenKind::KwFalse => {
                self.advance();
                Pattern::Literal {
                    literal: Box::new(Expr::BoolLiteral { value: false, loc }),
                    loc,
                }
            }

            TokenKind::LParen => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                    elements.push(self.parse_pattern());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen, "expected ')' after tuple pattern");
                Pattern::Tuple { elements, loc }
            }

            TokenKind::Identifier => {
                let tok = self.advance();
                let mut path = vec![tok.text.to_string()];
                while self.eat(TokenKind::ColonColon) {
                    let seg = self.expect(TokenKind::Identifier, "expected identifier");
                    path.push(seg.text.to_string());
                }

                // A qualified name or a following '(' / '{' makes this a
                // constructor pattern; a lone identifier is a binding.
                let is_constructor = path.len() >= 2
                    || self.check(TokenKind::LParen)
                    || self.check(TokenKind::LBrace);

                if !is_constructor {
                    let name = path.into_iter().next().unwrap_or_default();
                    return Pattern::Ident {
                        name,
                        is_mutable: false,
                        loc,
                    };
                }

                let mut positional = Vec::new();
                let mut named = Vec::new();

                if self.eat(TokenKind::LParen) {
                    while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                        positional.push(self.parse_pattern());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen, "expected ')' after constructor pattern");
                }

                if self.eat(TokenKind::LBrace) {
                    while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
                        let field_tok =
                            self.expect(TokenKind::Identifier, "expected field name");
                        let field_name = field_tok.text.to_string();

                        // `{ x }` is shorthand for `{ x: x }`.
                        let pattern = if self.eat(TokenKind::Colon) {
                            self.parse_pattern()
                        } else {
                            Pattern::Ident {
                                name: field_name.clone(),
                                is_mutable: false,
                                loc: field_tok.loc,
                            }
                        };

                        named.push(NamedFieldPattern {
                            name: field_name,
                            pattern,
                        });
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RBrace, "expected '}' after struct pattern");
                }

                Pattern::Constructor {
                    path,
                    positional,
                    named,
                    loc,
                }
            }

            _ => {
                let tok = self.current;
                self.error(tok, "expected pattern");
                Pattern::Wildcard { loc }
            }
        }
    }

    // ======= types =======

    fn parse_type(&mut self) -> Option<TypeNode> {
        let loc = self.current.loc;

        if self.check(TokenKind::KwRef) {
            return self.parse_ref_type();
        }

        if self.check(TokenKind::Ampersand) {
            self.advance();
            if self.eat(TokenKind::KwMut) {
                let inner = self.parse_type()?;
                return Some(TypeNode::MutRef {
                    inner: Box::new(inner),
                    lifetime: None,
                    loc,
                });
            }
            let lifetime = self.parse_optional_lifetime();
            let inner = self.parse_type()?;
            return Some(TypeNode::Reference {
                inner: Box::new(inner),
                lifetime,
                loc,
            });
        }

        if self.check(TokenKind::KwMut) {
            self.advance();
            if self.eat(TokenKind::KwRef) {
                let lifetime = self.parse_optional_lifetime();
                let inner = self.parse_type()?;
                return Some(TypeNode::MutRef {
                    inner: Box::new(inner),
                    lifetime,
                    loc,
                });
            }
            let tok = self.current;
            self.error(tok, "expected 'ref' after 'mut' in type");
            return None;
        }

        if self.check(TokenKind::LParen) {
            return self.parse_tuple_or_function_type();
        }

        self.parse_named_or_generic_type()
    }

    fn parse_ref_type(&mut self) -> Option<TypeNode> {
        let loc = self.current.loc;
        self.expect(TokenKind::KwRef, "expected 'ref'");
        let lifetime = self.parse_optional_lifetime();
        let inner = self.parse_type()?;
        Some(TypeNode::Reference {
            inner: Box::new(inner),
            lifetime,
            loc,
        })
    }

    fn parse_optional_lifetime(&mut self) -> Option<String> {
        if self.check(TokenKind::Apostrophe) {
            let tok = self.advance();
            Some(tok.text.trim_start_matches('\'').to_string())
        } else {
            None
        }
    }

    /// `(T1, T2)` is a tuple type; with a following `->` the group becomes
    /// a function type with the elements as the parameter list.
    fn parse_tuple_or_function_type(&mut self) -> Option<TypeNode> {
        let loc = self.current.loc;
        self.expect(TokenKind::LParen, "expected '('");

        let mut elements = Vec::new();
        while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
            elements.push(self.parse_type()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after tuple type");

        if self.eat(TokenKind::Arrow) {
            let ret = self.parse_type()?;
            return Some(TypeNode::Function {
                params: elements,
                ret: Box::new(ret),
                loc,
            });
        }

        Some(TypeNode::Tuple { elements, loc })
    }

    fn parse_named_or_generic_type(&mut self) -> Option<TypeNode> {
        let loc = self.current.loc;

        if self.eat(TokenKind::KwVoid) {
            return Some(TypeNode::Named {
                path: vec!["Void".to_string()],
                loc,
            });
        }
        if self.eat(TokenKind::KwSelfType) {
            return Some(TypeNode::Named {
                path: vec!["Self".to_string()],
                loc,
            });
        }

        let tok = self.expect(TokenKind::Identifier, "expected type name");
        let mut path = vec![tok.text.to_string()];

        while self.eat(TokenKind::ColonColon) {
            let tok = self.expect(TokenKind::Identifier, "expected type name after '::'");
            path.push(tok.text.to_string());
        }

        if self.eat(TokenKind::Less) {
            let mut args = Vec::new();
            while !self.check(TokenKind::Greater) && !self.check(TokenKind::Eof) {
                args.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_generic_close();

            let base = TypeNode::Named { path, loc };
            return Some(TypeNode::Generic {
                base: Box::new(base),
                args,
                loc,
            });
        }

        Some(TypeNode::Named { path, loc })
    }
}
