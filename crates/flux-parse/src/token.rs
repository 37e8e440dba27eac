use flux_ast::span::SourceLocation;

/// Every token kind in the Flux language.
///
/// The `is_keyword`/`is_literal`/`is_operator` predicates rely on the
/// declaration order of the groups below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Special
    Eof,
    Invalid,

    // Literals
    IntLiteral,    // 42, 0xFF, 0b1010, 0o77
    FloatLiteral,  // 3.14, 1.0e10
    StringLiteral, // "hello"
    CharLiteral,   // 'a'
    BoolLiteral,   // true, false

    Identifier,

    // ---- Keywords ----
    // Declarations
    KwModule,
    KwImport,
    KwFunc,
    KwLet,
    KwMut,
    KwConst,
    KwStruct,
    KwClass,
    KwEnum,
    KwTrait,
    KwImpl,
    KwType,
    KwSelf,
    KwSelfType, // Self (capital)

    // Control flow
    KwIf,
    KwElse,
    KwMatch,
    KwFor,
    KwWhile,
    KwLoop,
    KwBreak,
    KwContinue,
    KwReturn,
    KwIn,

    // Ownership & borrowing
    KwMove,
    KwRef,
    KwDrop,

    // Concurrency
    KwAsync,
    KwAwait,
    KwSpawn,

    // Safety
    KwUnsafe,

    // Visibility
    KwPub,
    KwPublic,
    KwPrivate,

    // Boolean / logic
    KwTrue,
    KwFalse,
    KwAnd,
    KwOr,
    KwNot,

    // Misc keywords
    KwAs,
    KwIs,
    KwWhere,
    KwUse,
    KwVoid,
    KwPanic,
    KwAssert,

    // Annotations
    KwDoc,        // @doc
    KwDeprecated, // @deprecated
    KwTest,       // @test

    // ---- Punctuation / Operators ----
    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Separators
    Comma,
    Semicolon,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    DotDotEqual, // ..=
    DotDotDot,
    Arrow,    // ->
    FatArrow, // =>
    At,
    Hash,
    HashBang, // #!

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    Equal,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Bitwise
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    ShiftLeft,
    ShiftRight,

    // Compound assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpersandEqual,
    PipeEqual,
    CaretEqual,

    // Special operators
    Question,
    Underscore,

    // Lifetime marker; the token text carries the full `'name`
    Apostrophe,
}

impl TokenKind {
    /// Human-readable name; operators and punctuation render as their
    /// source spelling, so lexing `kind.as_str()` yields the kind back.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Invalid => "INVALID",
            TokenKind::IntLiteral => "INT_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::CharLiteral => "CHAR_LITERAL",
            TokenKind::BoolLiteral => "BOOL_LITERAL",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::KwModule => "module",
            TokenKind::KwImport => "import",
            TokenKind::KwFunc => "func",
            TokenKind::KwLet => "let",
            TokenKind::KwMut => "mut",
            TokenKind::KwConst => "const",
            TokenKind::KwStruct => "struct",
            TokenKind::KwClass => "class",
            TokenKind::KwEnum => "enum",
            TokenKind::KwTrait => "trait",
            TokenKind::KwImpl => "impl",
            TokenKind::KwType => "type",
            TokenKind::KwSelf => "self",
            TokenKind::KwSelfType => "Self",
            TokenKind::KwIf => "if",
            TokenKind::KwElse => "else",
            TokenKind::KwMatch => "match",
            TokenKind::KwFor => "for",
            TokenKind::KwWhile => "while",
            TokenKind::KwLoop => "loop",
            TokenKind::KwBreak => "break",
            TokenKind::KwContinue => "continue",
            TokenKind::KwReturn => "return",
            TokenKind::KwIn => "in",
            TokenKind::KwMove => "move",
            TokenKind::KwRef => "ref",
            TokenKind::KwDrop => "drop",
            TokenKind::KwAsync => "async",
            TokenKind::KwAwait => "await",
            TokenKind::KwSpawn => "spawn",
            TokenKind::KwUnsafe => "unsafe",
            TokenKind::KwPub => "pub",
            TokenKind::KwPublic => "public",
            TokenKind::KwPrivate => "private",
            TokenKind::KwTrue => "true",
            TokenKind::KwFalse => "false",
            TokenKind::KwAnd => "and",
            TokenKind::KwOr => "or",
            TokenKind::KwNot => "not",
            TokenKind::KwAs => "as",
            TokenKind::KwIs => "is",
            TokenKind::KwWhere => "where",
            TokenKind::KwUse => "use",
            TokenKind::KwVoid => "Void",
            TokenKind::KwPanic => "panic",
            TokenKind::KwAssert => "assert",
            TokenKind::KwDoc => "@doc",
            TokenKind::KwDeprecated => "@deprecated",
            TokenKind::KwTest => "@test",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::ColonColon => "::",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::DotDotEqual => "..=",
            TokenKind::DotDotDot => "...",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::At => "@",
            TokenKind::Hash => "#",
            TokenKind::HashBang => "#!",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Ampersand => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::ShiftLeft => "<<",
            TokenKind::ShiftRight => ">>",
            TokenKind::PlusEqual => "+=",
            TokenKind::MinusEqual => "-=",
            TokenKind::StarEqual => "*=",
            TokenKind::SlashEqual => "/=",
            TokenKind::PercentEqual => "%=",
            TokenKind::AmpersandEqual => "&=",
            TokenKind::PipeEqual => "|=",
            TokenKind::CaretEqual => "^=",
            TokenKind::Question => "?",
            TokenKind::Underscore => "_",
            TokenKind::Apostrophe => "'",
        }
    }

    pub fn is_keyword(&self) -> bool {
        *self >= TokenKind::KwModule && *self <= TokenKind::KwTest
    }

    pub fn is_literal(&self) -> bool {
        *self >= TokenKind::IntLiteral && *self <= TokenKind::BoolLiteral
    }

    pub fn is_operator(&self) -> bool {
        *self >= TokenKind::Plus && *self <= TokenKind::Underscore
    }
}

/// Exact-match, case-sensitive keyword table (`self` and `Self` differ).
pub fn keyword_kind(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "module" => TokenKind::KwModule,
        "import" => TokenKind::KwImport,
        "func" => TokenKind::KwFunc,
        "let" => TokenKind::KwLet,
        "mut" => TokenKind::KwMut,
        "const" => TokenKind::KwConst,
        "struct" => TokenKind::KwStruct,
        "class" => TokenKind::KwClass,
        "enum" => TokenKind::KwEnum,
        "trait" => TokenKind::KwTrait,
        "impl" => TokenKind::KwImpl,
        "type" => TokenKind::KwType,
        "self" => TokenKind::KwSelf,
        "Self" => TokenKind::KwSelfType,
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "match" => TokenKind::KwMatch,
        "for" => TokenKind::KwFor,
        "while" => TokenKind::KwWhile,
        "loop" => TokenKind::KwLoop,
        "break" => TokenKind::KwBreak,
        "continue" => TokenKind::KwContinue,
        "return" => TokenKind::KwReturn,
        "in" => TokenKind::KwIn,
        "move" => TokenKind::KwMove,
        "ref" => TokenKind::KwRef,
        "drop" => TokenKind::KwDrop,
        "async" => TokenKind::KwAsync,
        "await" => TokenKind::KwAwait,
        "spawn" => TokenKind::KwSpawn,
        "unsafe" => TokenKind::KwUnsafe,
        "pub" => TokenKind::KwPub,
        "public" => TokenKind::KwPublic,
        "private" => TokenKind::KwPrivate,
        "true" => TokenKind::KwTrue,
        "false" => TokenKind::KwFalse,
        "and" => TokenKind::KwAnd,
        "or" => TokenKind::KwOr,
        "not" => TokenKind::KwNot,
        "as" => TokenKind::KwAs,
        "is" => TokenKind::KwIs,
        "where" => TokenKind::KwWhere,
        "use" => TokenKind::KwUse,
        "Void" => TokenKind::KwVoid,
        "panic" => TokenKind::KwPanic,
        "assert" => TokenKind::KwAssert,
        _ => return None,
    };
    Some(kind)
}

/// Parsed payload of a numeric literal token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenValue {
    None,
    Int(i64),
    Float(f64),
}

/// A token: kind, a text slice into the source buffer, a location, and the
/// numeric payload for literals.
#[derive(Clone, Copy, Debug)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub loc: SourceLocation,
    pub value: TokenValue,
}

impl<'src> Token<'src> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_not(&self, kind: TokenKind) -> bool {
        self.kind != kind
    }

    pub fn int_value(&self) -> i64 {
        match self.value {
            TokenValue::Int(v) => v,
            _ => 0,
        }
    }

    pub fn float_value(&self) -> f64 {
        match self.value {
            TokenValue::Float(v) => v,
            _ => 0.0,
        }
    }
}
