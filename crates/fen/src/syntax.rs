use crate::token::{OperatorKind, ParenKind};

pub const BOOLEAN_LITERALS: &[(&str, bool)] = &[("True", true), ("False", false)];

/// Identifiers the lexer hands over as variables but the parser treats as
/// statement or expression introducers.
pub const ASM_INTRODUCER: &str = "__asm";
pub const EXTERNAL_FN_INTRODUCER: &str = "__externalfn";
pub const DATA_INTRODUCER: &str = "data";
pub const IGNORE_SYMBOL: &str = "_";

pub const PARENS_2: &[([char; 2], ParenKind)] = &[
    (['[', '|'], ParenKind::LeftArrayBracket),
    (['|', ']'], ParenKind::RightArrayBracket),
];

pub const PARENS_1: &[(char, ParenKind)] = &[
    ('(', ParenKind::LeftParen),
    (')', ParenKind::RightParen),
    ('{', ParenKind::LeftCurly),
    ('}', ParenKind::RightCurly),
    ('[', ParenKind::LeftBracket),
    (']', ParenKind::RightBracket),
];

pub const SYMBOLS_2: &[([char; 2], OperatorKind)] = &[
    (['|', '>'], OperatorKind::PipeRight),
    (['<', '|'], OperatorKind::PipeLeft),
    (['-', '>'], OperatorKind::Arrow),
    (['&', '&'], OperatorKind::LogicalAnd),
    (['|', '|'], OperatorKind::LogicalOr),
    (['>', '='], OperatorKind::GreaterOrEqual),
    (['<', '='], OperatorKind::LessOrEqual),
    (['=', '='], OperatorKind::Equal),
    (['!', '='], OperatorKind::NotEqual),
    (['<', '<'], OperatorKind::ShiftLeft),
    (['>', '>'], OperatorKind::ShiftRight),
    (['+', '+'], OperatorKind::Append),
    ([':', ':'], OperatorKind::Cons),
];

pub const SYMBOLS_1: &[(char, OperatorKind)] = &[
    ('+', OperatorKind::Plus),
    ('-', OperatorKind::Minus),
    ('*', OperatorKind::Multiply),
    ('/', OperatorKind::Divide),
    ('%', OperatorKind::Remainder),
    ('>', OperatorKind::GreaterThan),
    ('<', OperatorKind::LessThan),
    ('!', OperatorKind::Not),
    ('|', OperatorKind::BitwiseOr),
    ('&', OperatorKind::BitwiseAnd),
    ('^', OperatorKind::BitwiseXor),
    ('~', OperatorKind::BitwiseNot),
    (':', OperatorKind::Colon),
    ('=', OperatorKind::Assign),
    ('.', OperatorKind::Dot),
    (',', OperatorKind::Comma),
    ('\\', OperatorKind::Lambda),
];

pub fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

pub fn is_type_symbol(text: &str) -> bool {
    text.chars().next().is_some_and(|ch| ch.is_ascii_uppercase())
}
