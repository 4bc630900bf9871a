use thiserror::Error;

use super::unify::TypeUnifier;
use super::{CustomType, FunctionType, RecordType, Ty, Type};

/// Upper bound on wrapper layers; reaching it means the type graph is cyclic.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unresolved local type '{0}'")]
    UnresolvedLocalType(String),
    #[error("recursive reference to '{0}' outlived its type")]
    DanglingRecursiveReference(String),
    #[error("type '{0}' does not take type arguments")]
    NotAGenerator(String),
    #[error("type '{name}' expects {expected} type arguments, got {got}")]
    WrongNumberOfTypeArguments {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("unknown type parameter '{0}'")]
    UnknownTypeParameter(String),
    #[error("type '{0}' nests too deeply to resolve")]
    TooDeep(String),
}

/// Unwraps references, aliases, contexts and variant registrations without
/// expanding invokers.
pub fn strip(ty: &Ty) -> Ty {
    let mut current = ty.clone();
    for _ in 0..MAX_DEPTH {
        match current.next() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Follows named layers and alias applications down to an atom.
///
/// Applied custom types and containers (`Maybe Int`, `List a`) count as atoms
/// and are returned as the invoker itself.
pub fn resolve(ty: &Ty) -> Result<Ty, TypeError> {
    let mut current = ty.clone();
    for _ in 0..MAX_DEPTH {
        let next = match current.as_ref() {
            Type::Primitive(_)
            | Type::Record(_)
            | Type::Tuple(_)
            | Type::Custom(_)
            | Type::Function(_)
            | Type::Unmanaged(_)
            | Type::AnyMatching(_) => return Ok(current.clone()),
            Type::LocalType(local) => {
                return Err(TypeError::UnresolvedLocalType(local.name.clone()))
            }
            Type::RecursiveReference(reference) => match reference.target.upgrade() {
                Some(target) => target,
                None => {
                    return Err(TypeError::DanglingRecursiveReference(
                        reference.name.clone(),
                    ))
                }
            },
            Type::Invoker(invoker) => match expand_alias_invoker(&invoker.generator, &invoker.params)? {
                Some(expanded) => expanded,
                None => return Ok(current.clone()),
            },
            Type::Reference(_)
            | Type::CustomVariant(_)
            | Type::Alias(_)
            | Type::LocalTypeContext(_) => match current.next() {
                Some(next) => next,
                None => return Ok(current.clone()),
            },
        };
        current = next;
    }
    Err(TypeError::TooDeep(ty.name()))
}

/// Substitutes `params` into an alias generator. Returns `None` when the
/// generator is not an alias.
pub(crate) fn expand_alias_invoker(generator: &Ty, params: &[Ty]) -> Result<Option<Ty>, TypeError> {
    let stripped = strip_to_alias(generator);
    let Type::Alias(alias) = stripped.as_ref() else {
        return Ok(None);
    };
    if alias.parameters.len() != params.len() {
        return Err(TypeError::WrongNumberOfTypeArguments {
            name: alias.name.clone(),
            expected: alias.parameters.len(),
            got: params.len(),
        });
    }
    let mut unifier = TypeUnifier::new();
    for (definition, param) in alias.parameters.iter().zip(params) {
        unifier.bind(&alias.context, &definition.name, param.clone());
    }
    Ok(Some(unifier.substitute(&alias.next)))
}

/// Follows references until an alias or a non-wrapper is reached.
pub(crate) fn strip_to_alias(ty: &Ty) -> Ty {
    let mut current = ty.clone();
    for _ in 0..MAX_DEPTH {
        match current.as_ref() {
            Type::Alias(_) => return current,
            Type::Reference(reference) => current = reference.next.clone(),
            Type::LocalTypeContext(context) => current = context.next.clone(),
            _ => return current,
        }
    }
    current
}

/// The custom type behind `ty` together with its type arguments, if any.
pub fn custom_application(ty: &Ty) -> Option<(Ty, Vec<Ty>)> {
    let resolved = resolve(ty).ok()?;
    match resolved.as_ref() {
        Type::Custom(_) => Some((resolved.clone(), Vec::new())),
        Type::Invoker(invoker) => {
            let generator = strip(&invoker.generator);
            match generator.as_ref() {
                Type::Custom(_) => Some((generator.clone(), invoker.params.clone())),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Binds a custom type's parameters to `arguments` for variant substitution.
pub(crate) fn bind_custom_arguments(custom: &CustomType, arguments: &[Ty], unifier: &mut TypeUnifier) {
    for (definition, argument) in custom.parameters.iter().zip(arguments) {
        unifier.bind(&custom.context, &definition.name, argument.clone());
    }
}

/// The function type behind `ty`, resolving aliases on the way.
pub fn function_parts(ty: &Ty) -> Option<FunctionType> {
    let resolved = resolve(ty).ok()?;
    match resolved.as_ref() {
        Type::Function(function) => Some(function.clone()),
        _ => None,
    }
}

pub fn record_of(ty: &Ty) -> Option<RecordType> {
    let resolved = resolve(ty).ok()?;
    match resolved.as_ref() {
        Type::Record(record) => Some(record.clone()),
        _ => None,
    }
}

/// Number of type arguments a named type expects.
pub fn type_arity(ty: &Ty) -> usize {
    let named = strip_to_alias(ty);
    if let Type::Alias(alias) = named.as_ref() {
        return alias.parameters.len();
    }
    match strip(ty).as_ref() {
        Type::Custom(custom) => custom.parameters.len(),
        Type::Primitive(primitive) => primitive.kind.arity(),
        _ => 0,
    }
}
