use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::source::{Range, SourceFileReference};
use crate::types::TypeError;

/// Everything the decorator can reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecorateErrorKind {
    #[error("type mismatch: expected {expected}, found {found}")]
    UnMatchingTypes { expected: String, found: String },
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("'{0}' is already declared")]
    AlreadyDeclared(String),
    #[error("annotation says {expected} but the definition has type {found}")]
    AnnotationMismatch { expected: String, found: String },
    #[error("{}", annotation_message(.name, *.definition_missing))]
    MustHaveAnnotationBefore {
        name: String,
        definition_missing: bool,
    },
    #[error("case does not handle {}", .missing.join(", "))]
    UnhandledCustomTypeVariants { missing: Vec<String> },
    #[error("variant '{0}' is already handled")]
    AlreadyHandledCustomTypeVariant(String),
    #[error("variant '{variant}' has {expected} parameters, the pattern binds {found}")]
    CaseWrongParameterCount {
        variant: String,
        expected: usize,
        found: usize,
    },
    #[error("the annotation declares {expected} parameters, the definition has {found}")]
    WrongNumberOfArgumentsInFunctionValue { expected: usize, found: usize },
    #[error("argument {index} should be {expected}, found {found}")]
    FunctionArgumentTypeMismatch {
        index: usize,
        expected: String,
        found: String,
    },
    #[error("function takes {expected} arguments but {found} were given")]
    ExtraFunctionArguments { expected: usize, found: usize },
    #[error("expected a function to call, found {0}")]
    ExpectedFunctionType(String),
    #[error("'{name}' has {expected} fields but {found} were given")]
    WrongNumberOfFieldsInConstructor {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("field '{field}' should be {expected}, found {found}")]
    WrongTypeForRecordConstructorField {
        field: String,
        expected: String,
        found: String,
    },
    #[error("field '{0}' is set more than once")]
    YouCanOnlySetFieldInRecordOnce(String),
    #[error("field '{field}' is not part of {ty}")]
    NewRecordLiteralFieldNotInType { field: String, ty: String },
    #[error("if condition must be Bool, found {0}")]
    IfTestMustHaveBooleanType(String),
    #[error("if branches differ: {consequence} and {alternative}")]
    IfConsequenceAndAlternativeMustHaveSameType {
        consequence: String,
        alternative: String,
    },
    #[error("list items must share a type: expected {expected}, found {found}")]
    EveryItemInTheListMustHaveTheSameType { expected: String, found: String },
    #[error("no field '{field}' in {ty}")]
    CouldNotFindFieldInLookup { field: String, ty: String },
    #[error("expected a record, found {0}")]
    ExpectedRecordType(String),
    #[error("'{name}' takes {expected} type arguments, {found} given")]
    ExtraTypeParameters {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("'{name}' needs {expected} type arguments")]
    UndefinedTypeParameter { name: String, expected: usize },
    #[error("unknown type parameter '{0}'")]
    UnknownTypeParameter(String),
    #[error("operator '{operator}' applied to {left} and {right}")]
    UnMatchingBinaryOperatorTypes {
        operator: String,
        left: String,
        right: String,
    },
    #[error("logical operator needs Bool operands, found {0}")]
    LogicalOperatorsMustBeBoolean(String),
    #[error("case expects a custom type, found {0}")]
    CaseTestMustBeCustomType(String),
    #[error("case needs at least one consequence")]
    CaseMustHaveConsequences,
    #[error("'{variant}' is not a variant of {ty}")]
    UnknownVariantInCase { variant: String, ty: String },
    #[error("variant '{variant}' takes {expected} arguments, {found} given")]
    WrongNumberOfVariantArguments {
        variant: String,
        expected: usize,
        found: usize,
    },
    #[error("guard needs a '_' default")]
    GuardMustHaveDefault,
    #[error("guard condition must be Bool, found {0}")]
    GuardConditionMustBeBoolean(String),
    #[error("lambda parameters cannot be inferred here")]
    LambdaNeedsContext,
    #[error("'{0}' is not a type alias")]
    CastTargetMustBeAlias(String),
    #[error("constant '{0}' depends on itself")]
    CyclicConstant(String),
    #[error("could not import '{path}': {reason}")]
    CouldNotImportModule { path: String, reason: String },
    #[error("unknown module '{0}'")]
    UnknownModule(String),
    #[error("module '{module}' has no '{name}'")]
    NotExposed { module: String, name: String },
    #[error("{0}")]
    Type(TypeError),
}

fn annotation_message(name: &str, definition_missing: bool) -> String {
    if definition_missing {
        format!("annotation for '{name}' must be followed by its definition")
    } else {
        format!("definition '{name}' must have an annotation just before it")
    }
}

impl DecorateErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            DecorateErrorKind::UnMatchingTypes { .. } => "E3001",
            DecorateErrorKind::UnknownVariable(_) => "E3002",
            DecorateErrorKind::UnknownType(_) => "E3003",
            DecorateErrorKind::AlreadyDeclared(_) => "E3004",
            DecorateErrorKind::AnnotationMismatch { .. } => "E3005",
            DecorateErrorKind::MustHaveAnnotationBefore { .. } => "E3006",
            DecorateErrorKind::UnhandledCustomTypeVariants { .. } => "E3007",
            DecorateErrorKind::AlreadyHandledCustomTypeVariant(_) => "E3008",
            DecorateErrorKind::CaseWrongParameterCount { .. } => "E3009",
            DecorateErrorKind::WrongNumberOfArgumentsInFunctionValue { .. } => "E3010",
            DecorateErrorKind::FunctionArgumentTypeMismatch { .. } => "E3011",
            DecorateErrorKind::ExtraFunctionArguments { .. } => "E3012",
            DecorateErrorKind::ExpectedFunctionType(_) => "E3013",
            DecorateErrorKind::WrongNumberOfFieldsInConstructor { .. } => "E3014",
            DecorateErrorKind::WrongTypeForRecordConstructorField { .. } => "E3015",
            DecorateErrorKind::YouCanOnlySetFieldInRecordOnce(_) => "E3016",
            DecorateErrorKind::NewRecordLiteralFieldNotInType { .. } => "E3017",
            DecorateErrorKind::IfTestMustHaveBooleanType(_) => "E3018",
            DecorateErrorKind::IfConsequenceAndAlternativeMustHaveSameType { .. } => "E3019",
            DecorateErrorKind::EveryItemInTheListMustHaveTheSameType { .. } => "E3020",
            DecorateErrorKind::CouldNotFindFieldInLookup { .. } => "E3021",
            DecorateErrorKind::ExpectedRecordType(_) => "E3022",
            DecorateErrorKind::ExtraTypeParameters { .. } => "E3023",
            DecorateErrorKind::UndefinedTypeParameter { .. } => "E3024",
            DecorateErrorKind::UnknownTypeParameter(_) => "E3025",
            DecorateErrorKind::UnMatchingBinaryOperatorTypes { .. } => "E3026",
            DecorateErrorKind::LogicalOperatorsMustBeBoolean(_) => "E3027",
            DecorateErrorKind::CaseTestMustBeCustomType(_) => "E3028",
            DecorateErrorKind::CaseMustHaveConsequences => "E3029",
            DecorateErrorKind::UnknownVariantInCase { .. } => "E3030",
            DecorateErrorKind::WrongNumberOfVariantArguments { .. } => "E3031",
            DecorateErrorKind::GuardMustHaveDefault => "E3032",
            DecorateErrorKind::GuardConditionMustBeBoolean(_) => "E3033",
            DecorateErrorKind::LambdaNeedsContext => "E3034",
            DecorateErrorKind::CastTargetMustBeAlias(_) => "E3035",
            DecorateErrorKind::CyclicConstant(_) => "E3036",
            DecorateErrorKind::CouldNotImportModule { .. } => "E3037",
            DecorateErrorKind::UnknownModule(_) => "E3038",
            DecorateErrorKind::NotExposed { .. } => "E3039",
            DecorateErrorKind::Type(_) => "E3040",
        }
    }
}

impl From<TypeError> for DecorateErrorKind {
    fn from(error: TypeError) -> Self {
        match error {
            TypeError::UnknownTypeParameter(name) => DecorateErrorKind::UnknownTypeParameter(name),
            TypeError::WrongNumberOfTypeArguments {
                name,
                expected,
                got,
            } if got > expected => DecorateErrorKind::ExtraTypeParameters {
                name,
                expected,
                found: got,
            },
            TypeError::WrongNumberOfTypeArguments { name, expected, .. } => {
                DecorateErrorKind::UndefinedTypeParameter { name, expected }
            }
            other => DecorateErrorKind::Type(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct DecorateError {
    pub kind: DecorateErrorKind,
    pub reference: SourceFileReference,
}

impl DecorateError {
    pub fn new(kind: DecorateErrorKind, reference: SourceFileReference) -> Self {
        Self { kind, reference }
    }

    pub fn range(&self) -> Range {
        self.reference.range
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code(), self.kind.to_string(), self.reference.range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKind {
    Definition,
    Parameter,
    LetVariable,
    CaseParameter,
    ImportedDefinition,
}

impl UnusedKind {
    fn describe(self) -> &'static str {
        match self {
            UnusedKind::Definition => "definition",
            UnusedKind::Parameter => "parameter",
            UnusedKind::LetVariable => "let variable",
            UnusedKind::CaseParameter => "case parameter",
            UnusedKind::ImportedDefinition => "imported definition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecorateWarningKind {
    #[error("unused {} '{name}'", .kind.describe())]
    Unused { kind: UnusedKind, name: String },
    #[error("unused import '{0}'")]
    UnusedImport(String),
}

impl DecorateWarningKind {
    pub fn code(&self) -> &'static str {
        match self {
            DecorateWarningKind::Unused { .. } => "W3001",
            DecorateWarningKind::UnusedImport(_) => "W3002",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct DecorateWarning {
    pub kind: DecorateWarningKind,
    pub reference: SourceFileReference,
}

impl DecorateWarning {
    pub fn new(kind: DecorateWarningKind, reference: SourceFileReference) -> Self {
        Self { kind, reference }
    }

    pub fn range(&self) -> Range {
        self.reference.range
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(self.kind.code(), self.kind.to_string(), self.reference.range)
    }
}

/// Failures outside a single document's decoration.
#[derive(Debug, Error)]
pub enum FenError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("document {0} is not available")]
    UnknownDocument(String),
    #[error("module {0} could not be found in any source root")]
    ModuleNotFound(String),
    #[error("cyclic import: {}", .0.join(" -> "))]
    CyclicImport(Vec<String>),
    #[error("invalid project file {path}: {message}")]
    Config { path: PathBuf, message: String },
}
