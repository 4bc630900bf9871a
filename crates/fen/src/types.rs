//! Decorated types.
//!
//! Types are immutable and shared through [`Ty`]. Named wrappers
//! ([`TypeReference`], [`AliasType`]) keep the identifier written at the use
//! site so hover and semantic tokens can point back at the source, while
//! [`resolve`] unwinds them down to an atom.

use std::sync::{Arc, Weak};

use crate::source::{Range, SourceFileReference};
use crate::surface::{ModuleReference, TypeIdentifier};

mod display;
mod local_types;
mod primitives;
mod resolve;
mod unify;

#[cfg(test)]
mod tests;

pub use local_types::{LocalContextId, LocalTypeScope};
pub use primitives::{PrimitiveKind, PrimitiveTable};
pub use resolve::{
    custom_application, function_parts, record_of, resolve, strip, type_arity, TypeError,
};
pub use unify::{compatible, TypeUnifier};

pub(crate) use resolve::{bind_custom_arguments, strip_to_alias};
pub(crate) use unify::erase_local_types;

pub type Ty = Arc<Type>;

#[derive(Debug)]
pub enum Type {
    Primitive(PrimitiveType),
    Record(RecordType),
    Tuple(TupleType),
    Custom(CustomType),
    Function(FunctionType),
    Reference(TypeReference),
    /// Self reference from inside a custom type's own variants.
    RecursiveReference(RecursiveReference),
    /// A variant registered under its own name for constructor lookup.
    CustomVariant(CustomVariantType),
    Alias(AliasType),
    LocalType(LocalType),
    LocalTypeContext(LocalTypeNameOnlyContext),
    Invoker(InvokerType),
    Unmanaged(UnmanagedType),
    AnyMatching(AnyMatchingType),
}

#[derive(Debug, Clone)]
pub struct PrimitiveType {
    pub kind: PrimitiveKind,
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: String,
    /// Declaration site of the field name, when written in source.
    pub name_range: Option<Range>,
    pub ty: Ty,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct RecordType {
    /// Parse order; `fields[i].index == i`.
    pub fields: Vec<RecordField>,
    /// Indices into `fields` ordered by name.
    pub sorted: Vec<usize>,
    pub range: Option<Range>,
}

impl RecordType {
    pub fn new(fields: Vec<(String, Option<Range>, Ty)>, range: Option<Range>) -> Self {
        let fields: Vec<RecordField> = fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, name_range, ty))| RecordField {
                name,
                name_range,
                ty,
                index,
            })
            .collect();
        let mut sorted: Vec<usize> = (0..fields.len()).collect();
        sorted.sort_by(|a, b| fields[*a].name.cmp(&fields[*b].name));
        Self {
            fields,
            sorted,
            range,
        }
    }

    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.sorted
            .binary_search_by(|index| self.fields[*index].name.as_str().cmp(name))
            .ok()
            .map(|position| &self.fields[self.sorted[position]])
    }

    pub fn sorted_fields(&self) -> impl Iterator<Item = &RecordField> {
        self.sorted.iter().map(|index| &self.fields[*index])
    }
}

#[derive(Debug, Clone)]
pub struct TupleType {
    pub items: Vec<Ty>,
    pub range: Option<Range>,
}

/// Declaration site of a generic parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTypeDefinition {
    pub name: String,
    pub range: Option<Range>,
}

#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub name_range: Option<Range>,
    pub parameters: Vec<Ty>,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct CustomType {
    pub name: String,
    /// Module-qualified name; custom types compare by this.
    pub fq_name: String,
    pub declared_at: Option<SourceFileReference>,
    pub parameters: Vec<LocalTypeDefinition>,
    pub context: LocalContextId,
    pub variants: Vec<Variant>,
}

impl CustomType {
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    /// Parameter types followed by the return type.
    pub parts: Vec<Ty>,
    pub range: Option<Range>,
}

impl FunctionType {
    pub fn arity(&self) -> usize {
        self.parts.len().saturating_sub(1)
    }

    pub fn parameters(&self) -> &[Ty] {
        &self.parts[..self.arity()]
    }

    pub fn return_type(&self) -> Option<&Ty> {
        self.parts.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFlavour {
    Type,
    Scoped,
    Alias,
    CustomTypeVariant,
    Primitive,
    Function,
}

#[derive(Debug, Clone)]
pub struct TypeReference {
    pub flavour: ReferenceFlavour,
    pub module: Option<ModuleReference>,
    pub identifier: TypeIdentifier,
    pub next: Ty,
}

impl TypeReference {
    pub fn range(&self) -> Range {
        match &self.module {
            Some(module) => module.range.combine_inclusive(&self.identifier.range),
            None => self.identifier.range,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveReference {
    pub name: String,
    pub range: Option<Range>,
    pub target: Weak<Type>,
}

#[derive(Debug, Clone)]
pub struct CustomVariantType {
    pub custom: Ty,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct AliasType {
    pub name: String,
    pub fq_name: String,
    pub declared_at: Option<SourceFileReference>,
    pub parameters: Vec<LocalTypeDefinition>,
    pub context: LocalContextId,
    pub next: Ty,
}

#[derive(Debug, Clone)]
pub struct LocalType {
    pub name: String,
    /// Use site; absent for occurrences produced by substitution.
    pub range: Option<Range>,
    pub context: LocalContextId,
}

/// Generic names introduced implicitly by an annotation.
#[derive(Debug, Clone)]
pub struct LocalTypeNameOnlyContext {
    pub context: LocalContextId,
    pub names: Vec<LocalTypeDefinition>,
    pub next: Ty,
}

#[derive(Debug, Clone)]
pub struct InvokerType {
    pub generator: Ty,
    pub params: Vec<Ty>,
    pub range: Option<Range>,
}

#[derive(Debug, Clone)]
pub struct UnmanagedType {
    pub name: String,
    pub range: Option<Range>,
}

#[derive(Debug, Clone, Default)]
pub struct AnyMatchingType {
    pub range: Option<Range>,
}

impl Type {
    pub fn any() -> Ty {
        Arc::new(Type::AnyMatching(AnyMatchingType::default()))
    }

    pub fn function(parts: Vec<Ty>) -> Ty {
        Arc::new(Type::Function(FunctionType { parts, range: None }))
    }

    pub fn invoker(generator: Ty, params: Vec<Ty>) -> Ty {
        Arc::new(Type::Invoker(InvokerType {
            generator,
            params,
            range: None,
        }))
    }

    pub fn tuple(items: Vec<Ty>) -> Ty {
        Arc::new(Type::Tuple(TupleType { items, range: None }))
    }

    /// Short name of the type without its arguments.
    pub fn name(&self) -> String {
        match self {
            Type::Primitive(primitive) => primitive.kind.name().to_string(),
            Type::Record(_) => "Record".to_string(),
            Type::Tuple(_) => "Tuple".to_string(),
            Type::Custom(custom) => custom.name.clone(),
            Type::Function(_) => "Function".to_string(),
            Type::Reference(reference) => reference.identifier.name.clone(),
            Type::RecursiveReference(reference) => reference.name.clone(),
            Type::CustomVariant(variant) => match variant.custom.as_ref() {
                Type::Custom(custom) => custom
                    .variants
                    .get(variant.index)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| custom.name.clone()),
                other => other.name(),
            },
            Type::Alias(alias) => alias.name.clone(),
            Type::LocalType(local) => local.name.clone(),
            Type::LocalTypeContext(context) => context.next.name(),
            Type::Invoker(invoker) => invoker.generator.name(),
            Type::Unmanaged(unmanaged) => unmanaged.name.clone(),
            Type::AnyMatching(_) => "*".to_string(),
        }
    }

    /// Unwraps one named layer.
    pub fn next(&self) -> Option<Ty> {
        match self {
            Type::Reference(reference) => Some(reference.next.clone()),
            Type::RecursiveReference(reference) => reference.target.upgrade(),
            Type::CustomVariant(variant) => Some(variant.custom.clone()),
            Type::Alias(alias) => Some(alias.next.clone()),
            Type::LocalTypeContext(context) => Some(context.next.clone()),
            _ => None,
        }
    }

    /// Range written in source for this type, if any.
    pub fn source_range(&self) -> Option<Range> {
        match self {
            Type::Primitive(_) | Type::CustomVariant(_) => None,
            Type::Record(record) => record.range,
            Type::Tuple(tuple) => tuple.range,
            Type::Custom(custom) => custom.declared_at.as_ref().map(|at| at.range),
            Type::Function(function) => function.range,
            Type::Reference(reference) => Some(reference.range()),
            Type::RecursiveReference(reference) => reference.range,
            Type::Alias(alias) => alias.declared_at.as_ref().map(|at| at.range),
            Type::LocalType(local) => local.range,
            Type::LocalTypeContext(context) => context.next.source_range(),
            Type::Invoker(invoker) => invoker.range,
            Type::Unmanaged(unmanaged) => unmanaged.range,
            Type::AnyMatching(any) => any.range,
        }
    }

    pub fn is_any_matching(&self) -> bool {
        matches!(self, Type::AnyMatching(_))
    }

    pub fn human_readable(&self) -> String {
        display::human_readable(self)
    }
}

/// Implemented by nodes that carry a decorated type.
pub trait HasType {
    fn ty(&self) -> &Ty;
}
