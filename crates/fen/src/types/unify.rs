use std::collections::BTreeMap;
use std::sync::Arc;

use super::resolve::{expand_alias_invoker, strip, strip_to_alias};
use super::{
    FunctionType, InvokerType, LocalContextId, RecordField, RecordType, TupleType, Ty, Type,
};

const MAX_DEPTH: usize = 64;

/// Substitution built while checking one call site or one declaration.
///
/// Local types are keyed by their binding context and name, so `a` of
/// `Maybe a` and `a` of an annotation never collide.
#[derive(Debug, Clone, Default)]
pub struct TypeUnifier {
    bindings: BTreeMap<(LocalContextId, String), Ty>,
}

/// Symmetric compatibility check with a throwaway substitution.
pub fn compatible(a: &Ty, b: &Ty) -> bool {
    TypeUnifier::new().unify(a, b)
}

impl TypeUnifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, context: &LocalContextId, name: &str, ty: Ty) {
        self.bindings
            .insert((context.clone(), name.to_string()), ty);
    }

    pub fn lookup(&self, context: &LocalContextId, name: &str) -> Option<&Ty> {
        self.bindings.get(&(context.clone(), name.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn unify(&mut self, a: &Ty, b: &Ty) -> bool {
        self.unify_at(a, b, 0)
    }

    fn unify_at(&mut self, a: &Ty, b: &Ty, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        let a = self.strip_bound(a);
        let b = self.strip_bound(b);
        if Arc::ptr_eq(&a, &b) {
            return true;
        }

        match (a.as_ref(), b.as_ref()) {
            (Type::AnyMatching(_), _) | (_, Type::AnyMatching(_)) => true,
            (Type::LocalType(left), Type::LocalType(right))
                if left.context == right.context && left.name == right.name =>
            {
                true
            }
            (Type::LocalType(local), _) => {
                self.bind(&local.context, &local.name, b.clone());
                true
            }
            (_, Type::LocalType(local)) => {
                self.bind(&local.context, &local.name, a.clone());
                true
            }
            (Type::Invoker(left), Type::Invoker(right)) => {
                self.unify_invokers(left, right, &a, &b, depth)
            }
            (Type::Invoker(invoker), _) => self.unify_invoker_with(invoker, &b, depth),
            (_, Type::Invoker(invoker)) => self.unify_invoker_with(invoker, &a, depth),
            (Type::Primitive(left), Type::Primitive(right)) => left.kind == right.kind,
            (Type::Record(left), Type::Record(right)) => self.unify_records(left, right, depth),
            (Type::Tuple(left), Type::Tuple(right)) => {
                left.items.len() == right.items.len()
                    && left
                        .items
                        .iter()
                        .zip(&right.items)
                        .all(|(l, r)| self.unify_at(l, r, depth + 1))
            }
            (Type::Function(left), Type::Function(right)) => {
                left.parts.len() == right.parts.len()
                    && left
                        .parts
                        .iter()
                        .zip(&right.parts)
                        .all(|(l, r)| self.unify_at(l, r, depth + 1))
            }
            (Type::Custom(left), Type::Custom(right)) => left.fq_name == right.fq_name,
            (Type::Unmanaged(left), Type::Unmanaged(right)) => left.name == right.name,
            _ => false,
        }
    }

    /// Strips named layers and follows local types already bound here.
    fn strip_bound(&self, ty: &Ty) -> Ty {
        let mut current = strip(ty);
        for _ in 0..MAX_DEPTH {
            let Type::LocalType(local) = current.as_ref() else {
                break;
            };
            let Some(bound) = self.lookup(&local.context, &local.name) else {
                break;
            };
            if Arc::ptr_eq(bound, &current) {
                break;
            }
            current = strip(bound);
        }
        current
    }

    fn unify_records(&mut self, left: &RecordType, right: &RecordType, depth: usize) -> bool {
        if left.fields.len() != right.fields.len() {
            return false;
        }
        left.sorted_fields().zip(right.sorted_fields()).all(|(l, r)| {
            l.name == r.name && self.unify_at(&l.ty, &r.ty, depth + 1)
        })
    }

    fn unify_invokers(
        &mut self,
        left: &InvokerType,
        right: &InvokerType,
        a: &Ty,
        b: &Ty,
        depth: usize,
    ) -> bool {
        if let Some(expanded) = self.expand(left) {
            return self.unify_at(&expanded, b, depth + 1);
        }
        if let Some(expanded) = self.expand(right) {
            return self.unify_at(a, &expanded, depth + 1);
        }
        generator_identity(&left.generator) == generator_identity(&right.generator)
            && left.params.len() == right.params.len()
            && left
                .params
                .iter()
                .zip(&right.params)
                .all(|(l, r)| self.unify_at(l, r, depth + 1))
    }

    /// `F a` against a plain atom: aliases expand, otherwise the atom must be
    /// the generator itself (a bare `Maybe` or `List`).
    fn unify_invoker_with(&mut self, invoker: &InvokerType, other: &Ty, depth: usize) -> bool {
        if let Some(expanded) = self.expand(invoker) {
            return self.unify_at(&expanded, other, depth + 1);
        }
        let generator = strip(&invoker.generator);
        match (generator.as_ref(), other.as_ref()) {
            (Type::Primitive(left), Type::Primitive(right)) => left.kind == right.kind,
            (Type::Custom(left), Type::Custom(right)) => left.fq_name == right.fq_name,
            _ => false,
        }
    }

    fn expand(&self, invoker: &InvokerType) -> Option<Ty> {
        expand_alias_invoker(&invoker.generator, &invoker.params)
            .ok()
            .flatten()
    }

    /// Replaces bound local types. Types without local types are returned
    /// unchanged so references keep their use-site identifiers.
    pub fn substitute(&self, ty: &Ty) -> Ty {
        self.substitute_at(ty, 0)
    }

    fn substitute_at(&self, ty: &Ty, depth: usize) -> Ty {
        if depth > MAX_DEPTH || self.bindings.is_empty() || !has_local_types(ty) {
            return ty.clone();
        }
        match ty.as_ref() {
            Type::LocalType(local) => match self.lookup(&local.context, &local.name) {
                Some(bound) if !Arc::ptr_eq(bound, ty) => self.substitute_at(bound, depth + 1),
                _ => ty.clone(),
            },
            Type::Function(function) => Arc::new(Type::Function(FunctionType {
                parts: self.substitute_all(&function.parts, depth),
                range: function.range,
            })),
            Type::Tuple(tuple) => Arc::new(Type::Tuple(TupleType {
                items: self.substitute_all(&tuple.items, depth),
                range: tuple.range,
            })),
            Type::Record(record) => Arc::new(Type::Record(RecordType {
                fields: record
                    .fields
                    .iter()
                    .map(|field| RecordField {
                        ty: self.substitute_at(&field.ty, depth + 1),
                        ..field.clone()
                    })
                    .collect(),
                sorted: record.sorted.clone(),
                range: record.range,
            })),
            Type::Invoker(invoker) => Arc::new(Type::Invoker(InvokerType {
                generator: invoker.generator.clone(),
                params: self.substitute_all(&invoker.params, depth),
                range: invoker.range,
            })),
            Type::Reference(reference) => self.substitute_at(&reference.next, depth + 1),
            Type::LocalTypeContext(context) => self.substitute_at(&context.next, depth + 1),
            _ => ty.clone(),
        }
    }

    fn substitute_all(&self, types: &[Ty], depth: usize) -> Vec<Ty> {
        types
            .iter()
            .map(|ty| self.substitute_at(ty, depth + 1))
            .collect()
    }
}

/// Replaces local types of any context other than `keep` with `*`.
///
/// Applied to the result of a call so generics left open by the callee do not
/// get bound by an unrelated call site later on.
pub(crate) fn erase_local_types(ty: &Ty, keep: Option<&LocalContextId>) -> Ty {
    fn walk(ty: &Ty, keep: Option<&LocalContextId>, depth: usize) -> Ty {
        if depth > MAX_DEPTH || !has_local_types(ty) {
            return ty.clone();
        }
        let all = |types: &[Ty]| -> Vec<Ty> { types.iter().map(|t| walk(t, keep, depth + 1)).collect() };
        match ty.as_ref() {
            Type::LocalType(local) if Some(&local.context) == keep => ty.clone(),
            Type::LocalType(_) => Type::any(),
            Type::Function(function) => Arc::new(Type::Function(FunctionType {
                parts: all(&function.parts),
                range: function.range,
            })),
            Type::Tuple(tuple) => Arc::new(Type::Tuple(TupleType {
                items: all(&tuple.items),
                range: tuple.range,
            })),
            Type::Record(record) => Arc::new(Type::Record(RecordType {
                fields: record
                    .fields
                    .iter()
                    .map(|field| RecordField {
                        ty: walk(&field.ty, keep, depth + 1),
                        ..field.clone()
                    })
                    .collect(),
                sorted: record.sorted.clone(),
                range: record.range,
            })),
            Type::Invoker(invoker) => Arc::new(Type::Invoker(InvokerType {
                generator: invoker.generator.clone(),
                params: all(&invoker.params),
                range: invoker.range,
            })),
            Type::Reference(reference) => walk(&reference.next, keep, depth + 1),
            Type::LocalTypeContext(context) => walk(&context.next, keep, depth + 1),
            _ => ty.clone(),
        }
    }
    walk(ty, keep, 0)
}

/// True when substitution could change `ty`. Does not look through custom
/// types or aliases, whose parameters live in their own contexts.
pub(crate) fn has_local_types(ty: &Ty) -> bool {
    fn walk(ty: &Type, depth: usize) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }
        match ty {
            Type::LocalType(_) => true,
            Type::Function(function) => function.parts.iter().any(|part| walk(part, depth + 1)),
            Type::Tuple(tuple) => tuple.items.iter().any(|item| walk(item, depth + 1)),
            Type::Record(record) => record.fields.iter().any(|field| walk(&field.ty, depth + 1)),
            Type::Invoker(invoker) => invoker.params.iter().any(|param| walk(param, depth + 1)),
            Type::Reference(reference) => walk(&reference.next, depth + 1),
            Type::LocalTypeContext(context) => walk(&context.next, depth + 1),
            _ => false,
        }
    }
    walk(ty, 0)
}

/// Nominal identity of an invoker generator.
fn generator_identity(generator: &Ty) -> Option<String> {
    let stripped = strip_to_alias(generator);
    let stripped = match stripped.as_ref() {
        Type::Alias(_) => stripped.clone(),
        _ => strip(generator),
    };
    match stripped.as_ref() {
        Type::Primitive(primitive) => Some(primitive.kind.name().to_string()),
        Type::Custom(custom) => Some(custom.fq_name.clone()),
        Type::Alias(alias) => Some(alias.fq_name.clone()),
        Type::Unmanaged(unmanaged) => Some(unmanaged.name.clone()),
        _ => None,
    }
}
