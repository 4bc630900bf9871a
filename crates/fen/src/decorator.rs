//! Turns a parsed [`SourceModule`] into a decorated [`Module`].
//!
//! Declarations are read first (imports, types, annotations, and the
//! signatures of every definition), then bodies are decorated. Constants
//! without an annotation get their type from their body, so they are
//! decorated on first use. Errors never stop the walk: a failed subtree
//! becomes a poisoned expression typed `*`.

use crate::decorated::{Binding, BindingId, BindingKind, Expression, ExpressionKind};
use crate::errors::{DecorateError, DecorateErrorKind, DecorateWarning, DecorateWarningKind};
use crate::module::{Module, ModuleResolver};
use crate::source::{DocumentUri, Range};
use crate::surface::{self, SourceModule, VariableIdentifier};
use crate::types::{LocalContextId, Ty, Type};

mod calls;
mod case;
mod declarations;
mod definitions;
mod expressions;
mod operators;
mod records;
mod unused;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorateOptions {
    /// Emit unused warnings at all.
    pub unused_warnings: bool,
    /// Also warn for top-level definitions nobody references.
    pub unused_definitions: bool,
}

impl Default for DecorateOptions {
    fn default() -> Self {
        Self {
            unused_warnings: true,
            unused_definitions: false,
        }
    }
}

#[derive(Debug)]
pub struct DecorateResult {
    pub module: Module,
    pub errors: Vec<DecorateError>,
    pub warnings: Vec<DecorateWarning>,
}

impl DecorateResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Decorates one module. Imports are requested from `resolver`.
pub fn decorate_module(
    source: &SourceModule,
    path: Vec<String>,
    document: DocumentUri,
    resolver: &mut dyn ModuleResolver,
    options: DecorateOptions,
) -> DecorateResult {
    let module = Module::new(path, document);
    let mut decorator = Decorator::new(module, resolver, options);
    decorator.module.comments = source.comments.clone();
    decorator.declare(&source.statements);
    decorator.decorate_bodies();
    decorator.module.expose_all();
    if options.unused_warnings {
        decorator.report_unused();
    }
    let Decorator {
        module,
        errors,
        warnings,
        ..
    } = decorator;
    log::debug!(
        "decorated {}: {} definitions, {} types, {} errors, {} warnings",
        if module.fq_name.is_empty() { "<main>" } else { module.fq_name.as_str() },
        module.definitions.len(),
        module.types.len(),
        errors.len(),
        warnings.len()
    );
    DecorateResult {
        module,
        errors,
        warnings,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyState {
    Pending,
    InProgress,
    Done,
}

/// Raw body of a definition waiting for decoration.
struct PendingBody<'s> {
    parameters: &'s [VariableIdentifier],
    expression: &'s surface::Expression,
    /// Annotation's generic context, when annotated.
    context: Option<LocalContextId>,
}

/// Lexical environment of the expression being decorated. Names resolve
/// from parameters first, then `let` bindings, then case parameters.
#[derive(Debug, Clone, Default)]
struct Context {
    parameters: im::HashMap<String, BindingId>,
    lets: im::HashMap<String, BindingId>,
    case_parameters: im::HashMap<String, BindingId>,
    /// Definition whose body is being decorated.
    function: Option<usize>,
    /// Generic context of the enclosing annotation.
    generics: Option<LocalContextId>,
    tail: bool,
}

impl Context {
    fn with_parameter(&self, name: &str, id: BindingId) -> Self {
        let mut next = self.clone();
        next.parameters.insert(name.to_string(), id);
        next
    }

    fn with_let(&self, name: &str, id: BindingId) -> Self {
        let mut next = self.clone();
        next.lets.insert(name.to_string(), id);
        next
    }

    fn with_case_parameter(&self, name: &str, id: BindingId) -> Self {
        let mut next = self.clone();
        next.case_parameters.insert(name.to_string(), id);
        next
    }

    fn not_tail(&self) -> Self {
        let mut next = self.clone();
        next.tail = false;
        next
    }

    fn lookup(&self, name: &str) -> Option<BindingId> {
        self.parameters
            .get(name)
            .or_else(|| self.lets.get(name))
            .or_else(|| self.case_parameters.get(name))
            .copied()
    }
}

struct Decorator<'s, 'r> {
    module: Module,
    resolver: &'r mut dyn ModuleResolver,
    options: DecorateOptions,
    errors: Vec<DecorateError>,
    warnings: Vec<DecorateWarning>,
    next_context: usize,
    /// Parallel to `module.definitions`.
    bodies: Vec<Option<PendingBody<'s>>>,
    states: Vec<BodyState>,
}

impl<'s, 'r> Decorator<'s, 'r> {
    fn new(module: Module, resolver: &'r mut dyn ModuleResolver, options: DecorateOptions) -> Self {
        Self {
            module,
            resolver,
            options,
            errors: Vec::new(),
            warnings: Vec::new(),
            next_context: 0,
            bodies: Vec::new(),
            states: Vec::new(),
        }
    }

    fn error(&mut self, kind: DecorateErrorKind, range: Range) {
        let reference = self.module.reference_to(range);
        self.errors.push(DecorateError::new(kind, reference));
    }

    fn warning(&mut self, kind: DecorateWarningKind, range: Range) {
        let reference = self.module.reference_to(range);
        self.warnings.push(DecorateWarning::new(kind, reference));
    }

    fn new_context(&mut self) -> LocalContextId {
        let id = LocalContextId::new(&self.module.fq_name, self.next_context);
        self.next_context += 1;
        id
    }

    fn bind(&mut self, identifier: &VariableIdentifier, kind: BindingKind, ty: Ty) -> BindingId {
        let id = BindingId(self.module.bindings.len());
        self.module.bindings.push(Binding {
            identifier: identifier.clone(),
            kind,
            ty,
            references: Vec::new(),
        });
        id
    }

    fn poisoned(range: Range, children: Vec<Expression>) -> Expression {
        Expression::new(ExpressionKind::Poisoned { children }, Type::any(), range)
    }

    /// Records `UnMatchingTypes` unless the types are compatible.
    fn expect_compatible(&mut self, expected: &Ty, found: &Ty, range: Range) -> bool {
        if crate::types::compatible(expected, found) {
            return true;
        }
        self.error(
            DecorateErrorKind::UnMatchingTypes {
                expected: expected.human_readable(),
                found: found.human_readable(),
            },
            range,
        );
        false
    }

    fn primitive(&self, kind: crate::types::PrimitiveKind) -> Ty {
        self.module.primitives.get(kind)
    }
}
