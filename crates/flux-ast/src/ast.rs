//! AST node definitions for the Flux language.
//!
//! Five tagged families: [`Decl`], [`Stmt`], [`Expr`], [`Pattern`], and
//! [`TypeNode`]. Every node carries a [`SourceLocation`] and exclusively owns
//! its children; cross-tree references live in the symbol table, not here.

use serde::Serialize;

use crate::span::SourceLocation;

/// A complete Flux source file.
#[derive(Debug, Default, Serialize)]
pub struct Module {
    /// `::`-joined path from the `module` header, empty if absent.
    pub name: String,
    /// Fully qualified import paths.
    pub imports: Vec<String>,
    pub decls: Vec<Decl>,
    pub loc: SourceLocation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Private,
    Public,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub enum Decl {
    Module(ModuleDecl),
    Import(ImportDecl),
    Func(FuncDecl),
    Struct(StructDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    TypeAlias(TypeAliasDecl),
}

impl Decl {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Decl::Module(d) => d.loc,
            Decl::Import(d) => d.loc,
            Decl::Func(d) => d.loc,
            Decl::Struct(d) => d.loc,
            Decl::Class(d) => d.loc,
            Decl::Enum(d) => d.loc,
            Decl::Trait(d) => d.loc,
            Decl::Impl(d) => d.loc,
            Decl::TypeAlias(d) => d.loc,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Decl::Module(d) => d.vis,
            Decl::Import(d) => d.vis,
            Decl::Func(d) => d.vis,
            Decl::Struct(d) => d.vis,
            Decl::Class(d) => d.vis,
            Decl::Enum(d) => d.vis,
            Decl::Trait(d) => d.vis,
            Decl::Impl(d) => d.vis,
            Decl::TypeAlias(d) => d.vis,
        }
    }

    pub fn set_visibility(&mut self, vis: Visibility) {
        match self {
            Decl::Module(d) => d.vis = vis,
            Decl::Import(d) => d.vis = vis,
            Decl::Func(d) => d.vis = vis,
            Decl::Struct(d) => d.vis = vis,
            Decl::Class(d) => d.vis = vis,
            Decl::Enum(d) => d.vis = vis,
            Decl::Trait(d) => d.vis = vis,
            Decl::Impl(d) => d.vis = vis,
            Decl::TypeAlias(d) => d.vis = vis,
        }
    }
}

/// `module my_project::services::user_service;`
#[derive(Clone, Debug, Serialize)]
pub struct ModuleDecl {
    pub path: Vec<String>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// `import std::collections::Map;`
#[derive(Clone, Debug, Serialize)]
pub struct ImportDecl {
    pub path: Vec<String>,
    /// Recognized in the record for `import X as Y`; the parser does not
    /// currently produce it.
    pub alias: Option<String>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// A generic type parameter: `T: Comparable + Clone`, or a lifetime `'a`.
#[derive(Clone, Debug, Serialize)]
pub struct GenericParam {
    pub name: String,
    pub trait_bounds: Vec<String>,
    pub lifetime: Option<String>,
    pub loc: SourceLocation,
}

/// A function parameter, optionally `mut`, `ref`, or `mut ref`, or `self`.
#[derive(Clone, Debug, Serialize)]
pub struct FuncParam {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub is_mutable: bool,
    pub is_self: bool,
    pub is_ref: bool,
    pub is_mut_ref: bool,
    pub loc: SourceLocation,
}

/// `func name<T: Bound>(params) -> ReturnType { body }`
#[derive(Clone, Debug, Serialize)]
pub struct FuncDecl {
    pub name: String,
    pub generic_params: Vec<GenericParam>,
    pub params: Vec<FuncParam>,
    /// `None` means `Void`.
    pub return_type: Option<TypeNode>,
    /// `None` for trait method declarations.
    pub body: Option<BlockStmt>,
    pub is_async: bool,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// A field of a struct, class, or struct-form enum variant.
#[derive(Clone, Debug, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// `struct Point { x: Float64, y: Float64 }`
#[derive(Clone, Debug, Serialize)]
pub struct StructDecl {
    pub name: String,
    pub generic_params: Vec<GenericParam>,
    pub fields: Vec<FieldDecl>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// `class User { private id: Int32, public name: String }`
#[derive(Clone, Debug, Serialize)]
pub struct ClassDecl {
    pub name: String,
    pub generic_params: Vec<GenericParam>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FuncDecl>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VariantKind {
    Unit,
    Tuple,
    Struct,
}

/// One case of an enum: `Quit`, `Write(String)`, or `Move { x: Int32 }`.
#[derive(Clone, Debug, Serialize)]
pub struct EnumVariant {
    pub name: String,
    pub kind: VariantKind,
    pub tuple_fields: Vec<TypeNode>,
    pub struct_fields: Vec<FieldDecl>,
    pub loc: SourceLocation,
}

/// `enum Message { Quit, Move { x: Int32, y: Int32 }, Write(String) }`
#[derive(Clone, Debug, Serialize)]
pub struct EnumDecl {
    pub name: String,
    pub generic_params: Vec<GenericParam>,
    pub variants: Vec<EnumVariant>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// `trait Drawable: Base { func draw(self: Self) -> Void; }`
#[derive(Clone, Debug, Serialize)]
pub struct TraitDecl {
    pub name: String,
    pub generic_params: Vec<GenericParam>,
    pub super_traits: Vec<String>,
    pub methods: Vec<FuncDecl>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// `impl Point { ... }` or `impl Drawable for Circle { ... }`
#[derive(Clone, Debug, Serialize)]
pub struct ImplDecl {
    pub target: Option<TypeNode>,
    /// Last path segment of the trait in `impl Trait for Type`.
    pub trait_name: Option<String>,
    pub generic_params: Vec<GenericParam>,
    pub methods: Vec<FuncDecl>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

/// `type UserId = Int32;`
#[derive(Clone, Debug, Serialize)]
pub struct TypeAliasDecl {
    pub name: String,
    pub generic_params: Vec<GenericParam>,
    pub aliased: Option<TypeNode>,
    pub vis: Visibility,
    pub loc: SourceLocation,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub enum Stmt {
    Let(LetStmt),
    Const(ConstStmt),
    Return(ReturnStmt),
    If(IfStmt),
    Match(MatchStmt),
    For(ForStmt),
    While(WhileStmt),
    Loop(LoopStmt),
    Break { loc: SourceLocation },
    Continue { loc: SourceLocation },
    Block(BlockStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Stmt::Let(s) => s.loc,
            Stmt::Const(s) => s.loc,
            Stmt::Return(s) => s.loc,
            Stmt::If(s) => s.loc,
            Stmt::Match(s) => s.loc,
            Stmt::For(s) => s.loc,
            Stmt::While(s) => s.loc,
            Stmt::Loop(s) => s.loc,
            Stmt::Break { loc } | Stmt::Continue { loc } => *loc,
            Stmt::Block(s) => s.loc,
            Stmt::Expr(s) => s.loc,
        }
    }
}

/// `let name: Type = value;` or `let mut name: Type = value;`
/// The type annotation is mandatory in Flux; `None` records a parse error.
#[derive(Clone, Debug, Serialize)]
pub struct LetStmt {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub init: Option<Expr>,
    pub is_mutable: bool,
    pub loc: SourceLocation,
}

/// `const NAME: Type = value;`
#[derive(Clone, Debug, Serialize)]
pub struct ConstStmt {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub value: Expr,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: BlockStmt,
    /// A block, or another `IfStmt` for `else if` chains.
    pub else_branch: Option<Box<Stmt>>,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchStmt {
    pub scrutinee: Expr,
    pub arms: Vec<MatchArm>,
    pub loc: SourceLocation,
}

/// `for name: Type in iterable { body }`
#[derive(Clone, Debug, Serialize)]
pub struct ForStmt {
    pub var_name: String,
    pub var_ty: Option<TypeNode>,
    pub iterable: Expr,
    pub body: BlockStmt,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: BlockStmt,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoopStmt {
    pub body: BlockStmt,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExprStmt {
    pub expr: Expr,
    pub loc: SourceLocation,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Negate,
    Not,
    BitwiseNot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CompoundAssignOp {
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
}

/// A match arm: `pattern if guard => body`.
#[derive(Clone, Debug, Serialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClosureParam {
    pub name: String,
    pub ty: Option<TypeNode>,
}

/// A field initializer in a struct literal or construct expression.
#[derive(Clone, Debug, Serialize)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
    pub loc: SourceLocation,
}

/// `{ stmt* tail? }` in expression position.
#[derive(Clone, Debug, Serialize)]
pub struct BlockExpr {
    pub stmts: Vec<Stmt>,
    /// Trailing expression without a semicolon; the block's value.
    pub tail: Option<Box<Expr>>,
    pub loc: SourceLocation,
}

#[derive(Clone, Debug, Serialize)]
pub enum Expr {
    IntLiteral {
        value: i64,
        loc: SourceLocation,
    },
    FloatLiteral {
        value: f64,
        loc: SourceLocation,
    },
    StringLiteral {
        value: String,
        loc: SourceLocation,
    },
    CharLiteral {
        value: char,
        loc: SourceLocation,
    },
    BoolLiteral {
        value: bool,
        loc: SourceLocation,
    },
    Ident {
        name: String,
        loc: SourceLocation,
    },
    /// `std::io::println` or `Option::Some`
    Path {
        segments: Vec<String>,
        loc: SourceLocation,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        loc: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        loc: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        loc: SourceLocation,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        loc: SourceLocation,
    },
    MemberAccess {
        object: Box<Expr>,
        member: String,
        loc: SourceLocation,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        loc: SourceLocation,
    },
    Cast {
        expr: Box<Expr>,
        target: TypeNode,
        loc: SourceLocation,
    },
    Block(BlockExpr),
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
        loc: SourceLocation,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
        loc: SourceLocation,
    },
    Closure {
        params: Vec<ClosureParam>,
        return_type: Option<TypeNode>,
        body: Box<Expr>,
        loc: SourceLocation,
    },
    /// Construction through a qualified path: `geo::Point { x: 1.0 }`.
    Construct {
        type_path: Box<Expr>,
        fields: Vec<FieldInit>,
        loc: SourceLocation,
    },
    /// Construction by bare name: `Point { x: 1.0, y: 2.0 }`.
    /// The name is recorded as text only; it need not resolve at parse time.
    StructLiteral {
        type_name: String,
        fields: Vec<FieldInit>,
        loc: SourceLocation,
    },
    Tuple {
        elements: Vec<Expr>,
        loc: SourceLocation,
    },
    Array {
        elements: Vec<Expr>,
        loc: SourceLocation,
    },
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        inclusive: bool,
        loc: SourceLocation,
    },
    Ref {
        operand: Box<Expr>,
        loc: SourceLocation,
    },
    MutRef {
        operand: Box<Expr>,
        loc: SourceLocation,
    },
    Move {
        operand: Box<Expr>,
        loc: SourceLocation,
    },
    Await {
        operand: Box<Expr>,
        loc: SourceLocation,
    },
    Try {
        operand: Box<Expr>,
        loc: SourceLocation,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        loc: SourceLocation,
    },
    CompoundAssign {
        op: CompoundAssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        loc: SourceLocation,
    },
}

impl Expr {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Expr::IntLiteral { loc, .. }
            | Expr::FloatLiteral { loc, .. }
            | Expr::StringLiteral { loc, .. }
            | Expr::CharLiteral { loc, .. }
            | Expr::BoolLiteral { loc, .. }
            | Expr::Ident { loc, .. }
            | Expr::Path { loc, .. }
            | Expr::Binary { loc, .. }
            | Expr::Unary { loc, .. }
            | Expr::Call { loc, .. }
            | Expr::MethodCall { loc, .. }
            | Expr::MemberAccess { loc, .. }
            | Expr::Index { loc, .. }
            | Expr::Cast { loc, .. }
            | Expr::If { loc, .. }
            | Expr::Match { loc, .. }
            | Expr::Closure { loc, .. }
            | Expr::Construct { loc, .. }
            | Expr::StructLiteral { loc, .. }
            | Expr::Tuple { loc, .. }
            | Expr::Array { loc, .. }
            | Expr::Range { loc, .. }
            | Expr::Ref { loc, .. }
            | Expr::MutRef { loc, .. }
            | Expr::Move { loc, .. }
            | Expr::Await { loc, .. }
            | Expr::Try { loc, .. }
            | Expr::Assign { loc, .. }
            | Expr::CompoundAssign { loc, .. } => *loc,
            Expr::Block(b) => b.loc,
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// A named field inside a constructor pattern: `Message::Move { x: p, y }`.
#[derive(Clone, Debug, Serialize)]
pub struct NamedFieldPattern {
    pub name: String,
    pub pattern: Pattern,
}

#[derive(Clone, Debug, Serialize)]
pub enum Pattern {
    /// `_`
    Wildcard { loc: SourceLocation },
    /// Binds the matched value to a name.
    Ident {
        name: String,
        is_mutable: bool,
        loc: SourceLocation,
    },
    /// Matches a specific literal value.
    Literal {
        literal: Box<Expr>,
        loc: SourceLocation,
    },
    /// `(a, b, c)`
    Tuple {
        elements: Vec<Pattern>,
        loc: SourceLocation,
    },
    /// `Option::Some(value)` or `Message::Move { x, y }`
    Constructor {
        path: Vec<String>,
        positional: Vec<Pattern>,
        named: Vec<NamedFieldPattern>,
        loc: SourceLocation,
    },
    /// `pattern1 | pattern2`
    Or {
        alternatives: Vec<Pattern>,
        loc: SourceLocation,
    },
}

impl Pattern {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Pattern::Wildcard { loc }
            | Pattern::Ident { loc, .. }
            | Pattern::Literal { loc, .. }
            | Pattern::Tuple { loc, .. }
            | Pattern::Constructor { loc, .. }
            | Pattern::Or { loc, .. } => *loc,
        }
    }
}

// ============================================================================
// Type nodes
// ============================================================================

#[derive(Clone, Debug, Serialize)]
pub enum TypeNode {
    /// `Int32`, `String`, `std::collections::Map`
    Named {
        path: Vec<String>,
        loc: SourceLocation,
    },
    /// `Vec<Int32>`, `Map<String, Int32>`; the base is always `Named`.
    Generic {
        base: Box<TypeNode>,
        args: Vec<TypeNode>,
        loc: SourceLocation,
    },
    /// `ref T` / `&T`, optionally `ref 'a T`
    Reference {
        inner: Box<TypeNode>,
        lifetime: Option<String>,
        loc: SourceLocation,
    },
    /// `mut ref T` / `&mut T`
    MutRef {
        inner: Box<TypeNode>,
        lifetime: Option<String>,
        loc: SourceLocation,
    },
    /// `(Int32, String)`
    Tuple {
        elements: Vec<TypeNode>,
        loc: SourceLocation,
    },
    /// `(Int32, Int32) -> Int32`
    Function {
        params: Vec<TypeNode>,
        ret: Box<TypeNode>,
        loc: SourceLocation,
    },
    /// Fixed- or dynamic-size array; never produced by the parser, which
    /// yields `Generic` for `Array<T, N>`.
    Array {
        element: Box<TypeNode>,
        size: Option<u64>,
        loc: SourceLocation,
    },
    Option {
        inner: Box<TypeNode>,
        loc: SourceLocation,
    },
    Result {
        ok: Box<TypeNode>,
        err: Box<TypeNode>,
        loc: SourceLocation,
    },
    /// Reserved placeholder; never produced by the parser.
    Inferred { loc: SourceLocation },
}

impl TypeNode {
    pub fn loc(&self) -> SourceLocation {
        match self {
            TypeNode::Named { loc, .. }
            | TypeNode::Generic { loc, .. }
            | TypeNode::Reference { loc, .. }
            | TypeNode::MutRef { loc, .. }
            | TypeNode::Tuple { loc, .. }
            | TypeNode::Function { loc, .. }
            | TypeNode::Array { loc, .. }
            | TypeNode::Option { loc, .. }
            | TypeNode::Result { loc, .. }
            | TypeNode::Inferred { loc } => *loc,
        }
    }
}
