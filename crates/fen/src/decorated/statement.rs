use crate::source::{HasRange, Range};
use crate::surface::{ExposingClause, ModuleReference, TypeIdentifier, VariableIdentifier};
use crate::types::{LocalTypeDefinition, Ty};

#[derive(Debug, Clone)]
pub struct DecoratedImport {
    pub keyword: Range,
    pub path: ModuleReference,
    pub alias: Option<(Range, TypeIdentifier)>,
    pub exposing: Option<ExposingClause>,
    /// Index into the module's imports; `None` when the module failed to load.
    pub import_index: Option<usize>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct DecoratedAlias {
    pub type_keyword: Range,
    pub alias_keyword: Option<Range>,
    pub name: TypeIdentifier,
    pub parameters: Vec<LocalTypeDefinition>,
    /// Right-hand side as written, carrying use-site ranges.
    pub definition: Ty,
    /// The registered alias type.
    pub ty: Ty,
    pub range: Range,
}

impl DecoratedAlias {
    /// `type Point = { .. }` and `type alias P = { .. }`.
    pub fn is_record(&self) -> bool {
        matches!(self.definition.as_ref(), crate::types::Type::Record(_))
    }
}

#[derive(Debug, Clone)]
pub struct DecoratedVariant {
    pub name: TypeIdentifier,
    pub parameters: Vec<Ty>,
    pub index: usize,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct DecoratedCustomType {
    pub keyword: Range,
    pub name: TypeIdentifier,
    pub parameters: Vec<LocalTypeDefinition>,
    pub variants: Vec<DecoratedVariant>,
    pub ty: Ty,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub struct DecoratedAnnotation {
    pub name: VariableIdentifier,
    pub colon: Range,
    pub ty: Ty,
    /// Index of the definition this annotation was paired with.
    pub definition: Option<usize>,
    pub range: Range,
}

#[derive(Debug, Clone)]
pub enum DecoratedStatement {
    Import(DecoratedImport),
    Alias(DecoratedAlias),
    CustomType(DecoratedCustomType),
    Annotation(DecoratedAnnotation),
    /// Index into the module's definitions.
    Definition(usize),
}

impl DecoratedStatement {
    pub fn definition_index(&self) -> Option<usize> {
        match self {
            DecoratedStatement::Definition(index) => Some(*index),
            _ => None,
        }
    }
}

impl HasRange for DecoratedImport {
    fn range(&self) -> Range {
        self.range
    }
}

impl HasRange for DecoratedAlias {
    fn range(&self) -> Range {
        self.range
    }
}

impl HasRange for DecoratedCustomType {
    fn range(&self) -> Range {
        self.range
    }
}

impl HasRange for DecoratedAnnotation {
    fn range(&self) -> Range {
        self.range
    }
}
