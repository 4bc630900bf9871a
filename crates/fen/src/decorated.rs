//! Name-resolved, typed mirror of the surface tree.

use crate::source::{HasRange, Range};
use crate::surface::{ModuleReference, TypeIdentifier, VariableIdentifier};
use crate::token::StringToken;
use crate::types::{HasType, Ty};

mod statement;

pub use statement::{
    DecoratedAlias, DecoratedAnnotation, DecoratedCustomType, DecoratedImport, DecoratedStatement,
    DecoratedVariant,
};

/// Index into [`crate::module::Module::bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    FunctionParameter,
    LambdaParameter,
    LetVariable,
    CaseConsequenceParameter,
}

/// A locally bound name together with every place that uses it.
#[derive(Debug, Clone)]
pub struct Binding {
    pub identifier: VariableIdentifier,
    pub kind: BindingKind,
    pub ty: Ty,
    pub references: Vec<Range>,
}

impl Binding {
    pub fn was_referenced(&self) -> bool {
        !self.references.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    LetVariable,
    FunctionParameter,
    CaseConsequenceParameter,
    Constant,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget {
    Binding(BindingId),
    /// `import` is `None` for definitions of the current module, otherwise
    /// the index into the module's imports.
    Definition { import: Option<usize>, index: usize },
}

#[derive(Debug, Clone)]
pub struct VariableReference {
    pub kind: ReferenceKind,
    pub module: Option<ModuleReference>,
    pub identifier: VariableIdentifier,
    pub target: ReferenceTarget,
}

/// Use site of a custom type variant or a record alias in a constructor.
#[derive(Debug, Clone)]
pub struct NamedTypeReference {
    pub module: Option<ModuleReference>,
    pub identifier: TypeIdentifier,
    /// The custom type or alias the name resolved to.
    pub ty: Ty,
}

impl NamedTypeReference {
    pub fn range(&self) -> Range {
        match &self.module {
            Some(module) => module.range.combine_inclusive(&self.identifier.range),
            None => self.identifier.range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    FixedMultiply,
    FixedDivide,
    Append,
    Cons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOperator {
    Or,
    And,
    Xor,
    Not,
    ShiftLeft,
    ShiftRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorType {
    Arithmetic(ArithmeticOperator),
    Bitwise(BitwiseOperator),
    Boolean(BooleanOperator),
    Logical(LogicalOperator),
    Negate,
}

impl OperatorType {
    pub fn symbol(self) -> &'static str {
        match self {
            OperatorType::Arithmetic(op) => match op {
                ArithmeticOperator::Plus => "+",
                ArithmeticOperator::Minus => "-",
                ArithmeticOperator::Multiply | ArithmeticOperator::FixedMultiply => "*",
                ArithmeticOperator::Divide | ArithmeticOperator::FixedDivide => "/",
                ArithmeticOperator::Remainder => "%",
                ArithmeticOperator::Append => "++",
                ArithmeticOperator::Cons => "::",
            },
            OperatorType::Bitwise(op) => match op {
                BitwiseOperator::Or => "|",
                BitwiseOperator::And => "&",
                BitwiseOperator::Xor => "^",
                BitwiseOperator::Not => "~",
                BitwiseOperator::ShiftLeft => "<<",
                BitwiseOperator::ShiftRight => ">>",
            },
            OperatorType::Boolean(op) => match op {
                BooleanOperator::Equal => "==",
                BooleanOperator::NotEqual => "!=",
                BooleanOperator::Less => "<",
                BooleanOperator::LessOrEqual => "<=",
                BooleanOperator::Greater => ">",
                BooleanOperator::GreaterOrEqual => ">=",
            },
            OperatorType::Logical(op) => match op {
                LogicalOperator::And => "&&",
                LogicalOperator::Or => "||",
                LogicalOperator::Not => "!",
            },
            OperatorType::Negate => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeDirection {
    Right,
    Left,
}

#[derive(Debug, Clone)]
pub struct RecordLiteralField {
    pub name: VariableIdentifier,
    /// Index of the field in the record type.
    pub index: usize,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct RecordLookup {
    pub field: VariableIdentifier,
    pub index: usize,
    pub ty: Ty,
}

#[derive(Debug, Clone)]
pub enum InterpolationPart {
    Text { text: String, ranges: Vec<Range> },
    Expression(Expression),
}

#[derive(Debug, Clone)]
pub struct LetAssignment {
    /// One binding, or several for `{ a, b } = record`.
    pub bindings: Vec<BindingId>,
    /// Present for record destructuring.
    pub destructure_range: Option<Range>,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct CaseCustomConsequence {
    pub variant: NamedTypeReference,
    pub variant_index: usize,
    pub parameters: Vec<BindingId>,
    pub arrow: Range,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct CasePatternConsequence {
    pub pattern: Expression,
    pub arrow: Range,
    pub expression: Expression,
}

#[derive(Debug, Clone)]
pub struct CaseDefault {
    pub underscore: Range,
    pub arrow: Range,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct GuardItem {
    pub bar: Range,
    pub condition: Expression,
    pub arrow: Range,
    pub consequence: Expression,
}

#[derive(Debug, Clone)]
pub struct GuardDefault {
    pub bar: Range,
    pub underscore: Range,
    pub arrow: Range,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Integer(i32),
    Fixed(i32),
    Bool(bool),
    Character(char),
    String(StringToken),
    StringInterpolation {
        token: StringToken,
        parts: Vec<InterpolationPart>,
    },
    ResourceName(String),
    TypeId(NamedTypeReference),
    List(Vec<Expression>),
    Array(Vec<Expression>),
    Tuple(Vec<Expression>),
    RecordLiteral {
        template: Option<Box<Expression>>,
        /// Parse order.
        fields: Vec<RecordLiteralField>,
    },
    Reference(VariableReference),
    CustomTypeVariantConstructor {
        variant: NamedTypeReference,
        variant_index: usize,
        arguments: Vec<Expression>,
    },
    RecordConstructorFromRecord {
        alias: NamedTypeReference,
        record: Box<Expression>,
    },
    RecordConstructorFromParameters {
        alias: NamedTypeReference,
        arguments: Vec<Expression>,
    },
    BinaryOperator {
        operator: OperatorType,
        operator_range: Range,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOperator {
        operator: OperatorType,
        operator_range: Range,
        operand: Box<Expression>,
    },
    /// `a |> f` and `f <| a`; `call` is the rewritten application.
    Pipe {
        direction: PipeDirection,
        operator_range: Range,
        call: Box<Expression>,
    },
    If {
        if_keyword: Range,
        condition: Box<Expression>,
        then_keyword: Range,
        consequence: Box<Expression>,
        else_keyword: Range,
        alternative: Box<Expression>,
    },
    Let {
        let_keyword: Range,
        assignments: Vec<LetAssignment>,
        in_keyword: Range,
        body: Box<Expression>,
    },
    CaseCustomType {
        case_keyword: Range,
        test: Box<Expression>,
        of_keyword: Range,
        consequences: Vec<CaseCustomConsequence>,
        default: Option<CaseDefault>,
    },
    CasePattern {
        case_keyword: Range,
        test: Box<Expression>,
        of_keyword: Range,
        consequences: Vec<CasePatternConsequence>,
        default: Option<CaseDefault>,
    },
    Guard {
        items: Vec<GuardItem>,
        default: Option<GuardDefault>,
    },
    FunctionCall {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Call with fewer arguments than the callee's arity; the expression's
    /// type is the remaining function. A pipe completes it.
    IncompleteFunctionCall {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Partial application passed on as a value, e.g. as a call argument.
    CurryFunction {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// Call in tail position back to the enclosing definition.
    RecurCall {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Lambda {
        backslash: Range,
        parameters: Vec<BindingId>,
        arrow: Range,
        body: Box<Expression>,
    },
    RecordLookups {
        base: Box<Expression>,
        lookups: Vec<RecordLookup>,
    },
    CastOperator {
        expression: Box<Expression>,
        as_keyword: Range,
        alias: NamedTypeReference,
    },
    Asm(String),
    ExternalFunction {
        keyword: Range,
        name: String,
        name_range: Range,
        arity: i32,
        arity_range: Range,
    },
    /// Stand-in for a subtree that failed to decorate; typed as `*`.
    Poisoned { children: Vec<Expression> },
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub ty: Ty,
    pub range: Range,
}

impl Expression {
    pub fn new(kind: ExpressionKind, ty: Ty, range: Range) -> Self {
        Self { kind, ty, range }
    }

    pub fn is_poisoned(&self) -> bool {
        matches!(self.kind, ExpressionKind::Poisoned { .. })
    }

    /// Variant tag, used in tests and debug logging.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExpressionKind::Integer(_) => "Integer",
            ExpressionKind::Fixed(_) => "Fixed",
            ExpressionKind::Bool(_) => "Bool",
            ExpressionKind::Character(_) => "Character",
            ExpressionKind::String(_) => "String",
            ExpressionKind::StringInterpolation { .. } => "StringInterpolation",
            ExpressionKind::ResourceName(_) => "ResourceName",
            ExpressionKind::TypeId(_) => "TypeId",
            ExpressionKind::List(_) => "List",
            ExpressionKind::Array(_) => "Array",
            ExpressionKind::Tuple(_) => "Tuple",
            ExpressionKind::RecordLiteral { .. } => "RecordLiteral",
            ExpressionKind::Reference(_) => "Reference",
            ExpressionKind::CustomTypeVariantConstructor { .. } => "CustomTypeVariantConstructor",
            ExpressionKind::RecordConstructorFromRecord { .. } => "RecordConstructorFromRecord",
            ExpressionKind::RecordConstructorFromParameters { .. } => {
                "RecordConstructorFromParameters"
            }
            ExpressionKind::BinaryOperator { .. } => "BinaryOperator",
            ExpressionKind::UnaryOperator { .. } => "UnaryOperator",
            ExpressionKind::Pipe { .. } => "Pipe",
            ExpressionKind::If { .. } => "If",
            ExpressionKind::Let { .. } => "Let",
            ExpressionKind::CaseCustomType { .. } => "CaseCustomType",
            ExpressionKind::CasePattern { .. } => "CasePattern",
            ExpressionKind::Guard { .. } => "Guard",
            ExpressionKind::FunctionCall { .. } => "FunctionCall",
            ExpressionKind::IncompleteFunctionCall { .. } => "IncompleteFunctionCall",
            ExpressionKind::CurryFunction { .. } => "CurryFunction",
            ExpressionKind::RecurCall { .. } => "RecurCall",
            ExpressionKind::Lambda { .. } => "Lambda",
            ExpressionKind::RecordLookups { .. } => "RecordLookups",
            ExpressionKind::CastOperator { .. } => "CastOperator",
            ExpressionKind::Asm(_) => "Asm",
            ExpressionKind::ExternalFunction { .. } => "ExternalFunction",
            ExpressionKind::Poisoned { .. } => "Poisoned",
        }
    }
}

impl HasRange for Expression {
    fn range(&self) -> Range {
        self.range
    }
}

impl HasType for Expression {
    fn ty(&self) -> &Ty {
        &self.ty
    }
}

/// Body of a definition: parameters in scope plus the decorated expression.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub parameters: Vec<BindingId>,
    pub expression: Expression,
    /// Type fixed by the annotation.
    pub forced_type: Option<Ty>,
}
