use std::fmt;

use crate::source::{HasRange, Position, Range, SourceFileReference};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    If,
    Then,
    Else,
    Case,
    Of,
    Let,
    In,
    Import,
    As,
    Exposing,
    Type,
    Alias,
}

impl KeywordKind {
    pub const ALL: [KeywordKind; 12] = [
        KeywordKind::If,
        KeywordKind::Then,
        KeywordKind::Else,
        KeywordKind::Case,
        KeywordKind::Of,
        KeywordKind::Let,
        KeywordKind::In,
        KeywordKind::Import,
        KeywordKind::As,
        KeywordKind::Exposing,
        KeywordKind::Type,
        KeywordKind::Alias,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == word)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeywordKind::If => "if",
            KeywordKind::Then => "then",
            KeywordKind::Else => "else",
            KeywordKind::Case => "case",
            KeywordKind::Of => "of",
            KeywordKind::Let => "let",
            KeywordKind::In => "in",
            KeywordKind::Import => "import",
            KeywordKind::As => "as",
            KeywordKind::Exposing => "exposing",
            KeywordKind::Type => "type",
            KeywordKind::Alias => "alias",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    PipeRight,
    PipeLeft,
    Arrow,
    LogicalAnd,
    LogicalOr,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Equal,
    NotEqual,
    Not,
    BitwiseOr,
    BitwiseAnd,
    BitwiseXor,
    BitwiseNot,
    ShiftLeft,
    ShiftRight,
    Append,
    Cons,
    Colon,
    Assign,
    Dot,
    Comma,
    Lambda,
}

impl OperatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Plus => "+",
            OperatorKind::Minus => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Divide => "/",
            OperatorKind::Remainder => "%",
            OperatorKind::PipeRight => "|>",
            OperatorKind::PipeLeft => "<|",
            OperatorKind::Arrow => "->",
            OperatorKind::LogicalAnd => "&&",
            OperatorKind::LogicalOr => "||",
            OperatorKind::GreaterThan => ">",
            OperatorKind::GreaterOrEqual => ">=",
            OperatorKind::LessThan => "<",
            OperatorKind::LessOrEqual => "<=",
            OperatorKind::Equal => "==",
            OperatorKind::NotEqual => "!=",
            OperatorKind::Not => "!",
            OperatorKind::BitwiseOr => "|",
            OperatorKind::BitwiseAnd => "&",
            OperatorKind::BitwiseXor => "^",
            OperatorKind::BitwiseNot => "~",
            OperatorKind::ShiftLeft => "<<",
            OperatorKind::ShiftRight => ">>",
            OperatorKind::Append => "++",
            OperatorKind::Cons => "::",
            OperatorKind::Colon => ":",
            OperatorKind::Assign => "=",
            OperatorKind::Dot => ".",
            OperatorKind::Comma => ",",
            OperatorKind::Lambda => "\\",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParenKind {
    LeftParen,
    RightParen,
    LeftCurly,
    RightCurly,
    LeftBracket,
    RightBracket,
    LeftAngle,
    RightAngle,
    LeftArrayBracket,
    RightArrayBracket,
}

impl ParenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParenKind::LeftParen => "(",
            ParenKind::RightParen => ")",
            ParenKind::LeftCurly => "{",
            ParenKind::RightCurly => "}",
            ParenKind::LeftBracket => "[",
            ParenKind::RightBracket => "]",
            ParenKind::LeftAngle => "<",
            ParenKind::RightAngle => ">",
            ParenKind::LeftArrayBracket => "[|",
            ParenKind::RightArrayBracket => "|]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordToken {
    pub kind: KeywordKind,
    pub raw: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorToken {
    pub kind: OperatorKind,
    pub raw: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenToken {
    pub kind: ParenKind,
    pub source: SourceFileReference,
}

/// Integer or fixed-point literal. Fixed-point values are scaled by
/// [`FIXED_FACTOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberToken {
    pub value: i32,
    pub is_fixed: bool,
    pub raw: String,
    pub source: SourceFileReference,
}

pub const FIXED_FACTOR: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanToken {
    pub value: bool,
    pub raw: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringPart {
    /// Literal text; `ranges` holds one single-line range per physical line.
    Text { text: String, ranges: Vec<Range> },
    /// Source of an `${…}` interpolation and the position of its first character.
    Expression { source: String, start: Position },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToken {
    pub raw: String,
    pub text: String,
    pub source: SourceFileReference,
    /// One single-line range per physical line the literal covers.
    pub segments: Vec<Range>,
    pub parts: Vec<StringPart>,
}

impl StringToken {
    pub fn is_interpolated(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, StringPart::Expression { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterToken {
    pub value: char,
    pub raw: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNameToken {
    pub raw: String,
    pub source: SourceFileReference,
}

impl ResourceNameToken {
    /// The resource path without the leading `@`.
    pub fn name(&self) -> &str {
        self.raw.trim_start_matches('@')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIdToken {
    pub raw: String,
    pub source: SourceFileReference,
    pub type_symbol: TypeSymbolToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSymbolToken {
    pub raw: String,
    pub source: SourceFileReference,
}

impl VariableSymbolToken {
    pub fn is_ignore(&self) -> bool {
        self.raw == "_"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSymbolToken {
    pub raw: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleLineCommentToken {
    pub raw: String,
    pub text: String,
    pub for_doc: bool,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLineCommentPart {
    pub text: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLineCommentToken {
    pub parts: Vec<MultiLineCommentPart>,
    pub for_doc: bool,
    pub source: SourceFileReference,
}

impl MultiLineCommentToken {
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmToken {
    pub text: String,
    pub source: SourceFileReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Keyword(KeywordToken),
    Operator(OperatorToken),
    Paren(ParenToken),
    Number(NumberToken),
    Boolean(BooleanToken),
    String(StringToken),
    Character(CharacterToken),
    ResourceName(ResourceNameToken),
    TypeId(TypeIdToken),
    VariableSymbol(VariableSymbolToken),
    TypeSymbol(TypeSymbolToken),
    SingleLineComment(SingleLineCommentToken),
    MultiLineComment(MultiLineCommentToken),
    Asm(AsmToken),
}

impl Token {
    pub fn source(&self) -> &SourceFileReference {
        match self {
            Token::Keyword(token) => &token.source,
            Token::Operator(token) => &token.source,
            Token::Paren(token) => &token.source,
            Token::Number(token) => &token.source,
            Token::Boolean(token) => &token.source,
            Token::String(token) => &token.source,
            Token::Character(token) => &token.source,
            Token::ResourceName(token) => &token.source,
            Token::TypeId(token) => &token.source,
            Token::VariableSymbol(token) => &token.source,
            Token::TypeSymbol(token) => &token.source,
            Token::SingleLineComment(token) => &token.source,
            Token::MultiLineComment(token) => &token.source,
            Token::Asm(token) => &token.source,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Token::SingleLineComment(_) | Token::MultiLineComment(_))
    }

    /// Short tag used in debug dumps and parser messages.
    pub fn tag(&self) -> &'static str {
        match self {
            Token::Keyword(_) => "keyword",
            Token::Operator(_) => "operator",
            Token::Paren(_) => "paren",
            Token::Number(_) => "number",
            Token::Boolean(_) => "boolean",
            Token::String(_) => "string",
            Token::Character(_) => "character",
            Token::ResourceName(_) => "resource-name",
            Token::TypeId(_) => "type-id",
            Token::VariableSymbol(_) => "variable",
            Token::TypeSymbol(_) => "type",
            Token::SingleLineComment(_) => "comment",
            Token::MultiLineComment(_) => "comment",
            Token::Asm(_) => "asm",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(token) => f.write_str(&token.raw),
            Token::Operator(token) => f.write_str(&token.raw),
            Token::Paren(token) => f.write_str(token.kind.as_str()),
            Token::Number(token) => f.write_str(&token.raw),
            Token::Boolean(token) => f.write_str(&token.raw),
            Token::String(token) => f.write_str(&token.raw),
            Token::Character(token) => f.write_str(&token.raw),
            Token::ResourceName(token) => f.write_str(&token.raw),
            Token::TypeId(token) => f.write_str(&token.raw),
            Token::VariableSymbol(token) => f.write_str(&token.raw),
            Token::TypeSymbol(token) => f.write_str(&token.raw),
            Token::SingleLineComment(token) => f.write_str(&token.raw),
            Token::MultiLineComment(token) => write!(f, "{{-{}-}}", token.text()),
            Token::Asm(token) => write!(f, "__asm {{{}}}", token.text),
        }
    }
}

macro_rules! impl_token_range {
    ($($token:ty),* $(,)?) => {
        $(
            impl HasRange for $token {
                fn range(&self) -> Range {
                    self.source.range
                }
            }
        )*
    };
}

impl_token_range!(
    KeywordToken,
    OperatorToken,
    ParenToken,
    NumberToken,
    BooleanToken,
    StringToken,
    CharacterToken,
    ResourceNameToken,
    TypeIdToken,
    VariableSymbolToken,
    TypeSymbolToken,
    SingleLineCommentToken,
    MultiLineCommentToken,
    AsmToken,
);

impl HasRange for Token {
    fn range(&self) -> Range {
        self.source().range
    }
}
