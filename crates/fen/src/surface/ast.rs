use crate::source::{HasRange, Range};
use crate::token::{StringToken, FIXED_FACTOR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableIdentifier {
    pub name: String,
    pub range: Range,
}

impl VariableIdentifier {
    pub fn is_ignore(&self) -> bool {
        self.name == crate::syntax::IGNORE_SYMBOL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIdentifier {
    pub name: String,
    pub range: Range,
}

/// `A.B` prefix naming another module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    pub parts: Vec<TypeIdentifier>,
    pub range: Range,
}

impl ModuleReference {
    pub fn path(&self) -> Vec<String> {
        self.parts.iter().map(|part| part.name.clone()).collect()
    }

    pub fn dotted(&self) -> String {
        self.path().join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedVariableIdentifier {
    pub module: Option<ModuleReference>,
    pub identifier: VariableIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedTypeIdentifier {
    pub module: Option<ModuleReference>,
    pub identifier: TypeIdentifier,
}

impl ScopedTypeIdentifier {
    pub fn range(&self) -> Range {
        match &self.module {
            Some(module) => module.range.combine_inclusive(&self.identifier.range),
            None => self.identifier.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTypeField {
    pub name: VariableIdentifier,
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Reference {
        name: ScopedTypeIdentifier,
        arguments: Vec<TypeExpr>,
        range: Range,
    },
    Local(VariableIdentifier),
    Function {
        parts: Vec<TypeExpr>,
        range: Range,
    },
    Tuple {
        items: Vec<TypeExpr>,
        range: Range,
    },
    Record {
        fields: Vec<RecordTypeField>,
        range: Range,
    },
    Unmanaged {
        keyword: TypeIdentifier,
        name: TypeIdentifier,
        range: Range,
    },
    AnyMatching(Range),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExposedItem {
    Variable(VariableIdentifier),
    Type {
        name: TypeIdentifier,
        with_variants: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposingClause {
    pub keyword: Range,
    pub items: Vec<ExposedItem>,
    /// Set when the list is `(..)`.
    pub everything: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub keyword: Range,
    pub path: ModuleReference,
    pub alias: Option<(Range, TypeIdentifier)>,
    pub exposing: Option<ExposingClause>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasStatement {
    pub type_keyword: Range,
    pub alias_keyword: Option<Range>,
    pub name: TypeIdentifier,
    pub parameters: Vec<VariableIdentifier>,
    pub definition: TypeExpr,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDefinition {
    pub name: TypeIdentifier,
    pub parameters: Vec<TypeExpr>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTypeStatement {
    pub keyword: Range,
    pub name: TypeIdentifier,
    pub parameters: Vec<VariableIdentifier>,
    pub variants: Vec<VariantDefinition>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: VariableIdentifier,
    pub colon: Range,
    pub type_expr: TypeExpr,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: VariableIdentifier,
    pub parameters: Vec<VariableIdentifier>,
    pub expression: Expression,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDefinition {
    pub name: VariableIdentifier,
    pub expression: Expression,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Import(ImportStatement),
    Alias(AliasStatement),
    CustomType(CustomTypeStatement),
    Annotation(Annotation),
    Definition(Definition),
    Constant(ConstantDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperatorKind {
    PipeRight,
    PipeLeft,
    LogicalOr,
    LogicalAnd,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Cons,
    Append,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    ShiftLeft,
    ShiftRight,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperatorKind {
    Negate,
    Not,
    BitwiseNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLiteralField {
    pub name: VariableIdentifier,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLiteral {
    pub template: Option<Box<Expression>>,
    pub fields: Vec<RecordLiteralField>,
    /// Indices into `fields` ordered by field name.
    pub sorted: Vec<usize>,
    pub range: Range,
}

impl RecordLiteral {
    pub fn new(template: Option<Box<Expression>>, fields: Vec<RecordLiteralField>, range: Range) -> Self {
        let mut sorted: Vec<usize> = (0..fields.len()).collect();
        sorted.sort_by(|a, b| fields[*a].name.name.cmp(&fields[*b].name.name));
        Self {
            template,
            fields,
            sorted,
            range,
        }
    }

    pub fn sorted_fields(&self) -> impl Iterator<Item = &RecordLiteralField> {
        self.sorted.iter().map(|index| &self.fields[*index])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpolationPart {
    Text { text: String, ranges: Vec<Range> },
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetTarget {
    Single(VariableIdentifier),
    Record {
        names: Vec<VariableIdentifier>,
        range: Range,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetAssignment {
    pub target: LetTarget,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseCustomConsequence {
    pub variant: ScopedTypeIdentifier,
    pub parameters: Vec<VariableIdentifier>,
    pub arrow: Range,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePatternConsequence {
    pub pattern: Expression,
    pub arrow: Range,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDefault {
    pub underscore: Range,
    pub arrow: Range,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardItem {
    pub bar: Range,
    pub condition: Expression,
    pub arrow: Range,
    pub consequence: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDefault {
    pub bar: Range,
    pub underscore: Range,
    pub arrow: Range,
    pub expression: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Integer {
        value: i32,
        range: Range,
    },
    Fixed {
        value: i32,
        range: Range,
    },
    Bool {
        value: bool,
        range: Range,
    },
    Character {
        value: char,
        range: Range,
    },
    String(StringToken),
    StringInterpolation {
        token: StringToken,
        parts: Vec<InterpolationPart>,
    },
    ResourceName {
        name: String,
        range: Range,
    },
    TypeId {
        name: ScopedTypeIdentifier,
        range: Range,
    },
    List {
        items: Vec<Expression>,
        range: Range,
    },
    Array {
        items: Vec<Expression>,
        range: Range,
    },
    Tuple {
        items: Vec<Expression>,
        range: Range,
    },
    Record(RecordLiteral),
    Variable(ScopedVariableIdentifier),
    RecordLookup {
        base: Box<Expression>,
        lookups: Vec<VariableIdentifier>,
        range: Range,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
        range: Range,
    },
    Constructor {
        name: ScopedTypeIdentifier,
        arguments: Vec<Expression>,
        range: Range,
    },
    BinaryOperator {
        operator: BinaryOperatorKind,
        operator_range: Range,
        left: Box<Expression>,
        right: Box<Expression>,
        range: Range,
    },
    UnaryOperator {
        operator: UnaryOperatorKind,
        operator_range: Range,
        operand: Box<Expression>,
        range: Range,
    },
    If {
        if_keyword: Range,
        condition: Box<Expression>,
        then_keyword: Range,
        consequence: Box<Expression>,
        else_keyword: Range,
        alternative: Box<Expression>,
        range: Range,
    },
    Let {
        let_keyword: Range,
        assignments: Vec<LetAssignment>,
        in_keyword: Range,
        body: Box<Expression>,
        range: Range,
    },
    CaseCustomType {
        case_keyword: Range,
        test: Box<Expression>,
        of_keyword: Range,
        consequences: Vec<CaseCustomConsequence>,
        default: Option<CaseDefault>,
        range: Range,
    },
    CasePattern {
        case_keyword: Range,
        test: Box<Expression>,
        of_keyword: Range,
        consequences: Vec<CasePatternConsequence>,
        default: Option<CaseDefault>,
        range: Range,
    },
    Guard {
        items: Vec<GuardItem>,
        default: Option<GuardDefault>,
        range: Range,
    },
    Lambda {
        backslash: Range,
        parameters: Vec<VariableIdentifier>,
        arrow: Range,
        body: Box<Expression>,
        range: Range,
    },
    Cast {
        expression: Box<Expression>,
        as_keyword: Range,
        target: ScopedTypeIdentifier,
        range: Range,
    },
    Asm {
        text: String,
        range: Range,
    },
    ExternalFunction {
        keyword: Range,
        name: String,
        name_range: Range,
        arity: i32,
        arity_range: Range,
        range: Range,
    },
}

impl Expression {
    pub fn fixed_as_f64(value: i32) -> f64 {
        f64::from(value) / f64::from(FIXED_FACTOR)
    }

    pub fn is_literal_pattern(&self) -> bool {
        matches!(
            self,
            Expression::Integer { .. }
                | Expression::Fixed { .. }
                | Expression::Bool { .. }
                | Expression::Character { .. }
                | Expression::String(_)
        )
    }
}

impl HasRange for Expression {
    fn range(&self) -> Range {
        match self {
            Expression::Integer { range, .. }
            | Expression::Fixed { range, .. }
            | Expression::Bool { range, .. }
            | Expression::Character { range, .. }
            | Expression::ResourceName { range, .. }
            | Expression::TypeId { range, .. }
            | Expression::List { range, .. }
            | Expression::Array { range, .. }
            | Expression::Tuple { range, .. }
            | Expression::RecordLookup { range, .. }
            | Expression::Call { range, .. }
            | Expression::Constructor { range, .. }
            | Expression::BinaryOperator { range, .. }
            | Expression::UnaryOperator { range, .. }
            | Expression::If { range, .. }
            | Expression::Let { range, .. }
            | Expression::CaseCustomType { range, .. }
            | Expression::CasePattern { range, .. }
            | Expression::Guard { range, .. }
            | Expression::Lambda { range, .. }
            | Expression::Cast { range, .. }
            | Expression::Asm { range, .. }
            | Expression::ExternalFunction { range, .. } => *range,
            Expression::String(token) => token.source.range,
            Expression::StringInterpolation { token, .. } => token.source.range,
            Expression::Record(record) => record.range,
            Expression::Variable(variable) => match &variable.module {
                Some(module) => module.range.combine_inclusive(&variable.identifier.range),
                None => variable.identifier.range,
            },
        }
    }
}

impl HasRange for TypeExpr {
    fn range(&self) -> Range {
        match self {
            TypeExpr::Reference { range, .. }
            | TypeExpr::Function { range, .. }
            | TypeExpr::Tuple { range, .. }
            | TypeExpr::Record { range, .. }
            | TypeExpr::Unmanaged { range, .. } => *range,
            TypeExpr::Local(identifier) => identifier.range,
            TypeExpr::AnyMatching(range) => *range,
        }
    }
}

impl HasRange for Statement {
    fn range(&self) -> Range {
        match self {
            Statement::Import(statement) => statement.range,
            Statement::Alias(statement) => statement.range,
            Statement::CustomType(statement) => statement.range,
            Statement::Annotation(statement) => statement.range,
            Statement::Definition(statement) => statement.range,
            Statement::Constant(statement) => statement.range,
        }
    }
}

impl HasRange for VariableIdentifier {
    fn range(&self) -> Range {
        self.range
    }
}

impl HasRange for TypeIdentifier {
    fn range(&self) -> Range {
        self.range
    }
}

/// A parsed document: statements in source order plus the comments that the
/// parser skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceModule {
    pub statements: Vec<Statement>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub for_doc: bool,
    /// One single-line range per physical line.
    pub ranges: Vec<Range>,
}

impl Comment {
    pub fn range(&self) -> Range {
        match (self.ranges.first(), self.ranges.last()) {
            (Some(first), Some(last)) => first.combine_inclusive(last),
            _ => Range::default(),
        }
    }
}
