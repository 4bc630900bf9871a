use std::sync::Arc;

use crate::decorated::{
    Expression, ExpressionKind, NamedTypeReference, PipeDirection, ReferenceTarget,
};
use crate::errors::DecorateErrorKind;
use crate::module::ModuleTypeKind;
use crate::source::{HasRange, Range};
use crate::surface::{self, ScopedTypeIdentifier};
use crate::type_lookup::TypeLookup;
use crate::types::{
    erase_local_types, function_parts, LocalType, Ty, Type, TypeUnifier,
};

use super::expressions::is_any;
use super::{Context, Decorator};

/// An argument waiting to be applied. Pipes supply their value already
/// decorated.
pub(super) enum CallArgument<'a> {
    Raw(&'a surface::Expression),
    Decorated(Expression),
}

/// An arity-short call handed to another call leaves as a closure.
fn into_closure(expression: Expression) -> Expression {
    match expression.kind {
        ExpressionKind::IncompleteFunctionCall { function, arguments } => Expression::new(
            ExpressionKind::CurryFunction { function, arguments },
            expression.ty,
            expression.range,
        ),
        kind => Expression { kind, ..expression },
    }
}

impl<'s, 'r> Decorator<'s, 'r> {
    pub(super) fn decorate_argument(
        &mut self,
        argument: CallArgument<'_>,
        context: &Context,
        hint: Option<&Ty>,
    ) -> Expression {
        match argument {
            CallArgument::Raw(expression) => into_closure(self.decorate_expression(expression, context, hint)),
            CallArgument::Decorated(expression) => expression,
        }
    }

    pub(super) fn decorate_arguments(&mut self, arguments: Vec<CallArgument<'_>>, context: &Context) -> Vec<Expression> {
        let inner = context.not_tail();
        arguments
            .into_iter()
            .map(|argument| self.decorate_argument(argument, &inner, Some(&Type::any())))
            .collect()
    }

    /// Applies `arguments` to an already decorated callee.
    pub(super) fn apply(
        &mut self,
        callee: Expression,
        arguments: Vec<CallArgument<'_>>,
        range: Range,
        context: &Context,
    ) -> Expression {
        if is_any(&callee.ty) {
            let arguments = self.decorate_arguments(arguments, context);
            return Expression::new(
                ExpressionKind::FunctionCall {
                    function: Box::new(callee),
                    arguments,
                },
                Type::any(),
                range,
            );
        }
        let Some(function) = function_parts(&callee.ty) else {
            self.error(
                DecorateErrorKind::ExpectedFunctionType(callee.ty.human_readable()),
                callee.range,
            );
            let mut children = vec![callee];
            children.extend(self.decorate_arguments(arguments, context));
            return Self::poisoned(range, children);
        };

        let arity = function.arity();
        let given = arguments.len();
        let inner = context.not_tail();
        let mut unifier = TypeUnifier::new();
        let mut decorated = Vec::with_capacity(given);
        for (position, argument) in arguments.into_iter().enumerate() {
            let Some(parameter) = function.parts.get(position).filter(|_| position < arity) else {
                decorated.push(self.decorate_argument(argument, &inner, Some(&Type::any())));
                continue;
            };
            let hint = unifier.substitute(parameter);
            let value = self.decorate_argument(argument, &inner, Some(&hint));
            if !unifier.unify(parameter, &value.ty) {
                self.error(
                    DecorateErrorKind::FunctionArgumentTypeMismatch {
                        index: position + 1,
                        expected: unifier.substitute(parameter).human_readable(),
                        found: value.ty.human_readable(),
                    },
                    value.range,
                );
            }
            decorated.push(value);
        }

        if given > arity {
            let extra = decorated.get(arity).map_or(range, |first| first.range);
            self.error(
                DecorateErrorKind::ExtraFunctionArguments {
                    expected: arity,
                    found: given,
                },
                extra,
            );
            let mut children = vec![callee];
            children.extend(decorated);
            return Self::poisoned(range, children);
        }

        let keep = context.generics.as_ref();
        if given < arity {
            let remaining = function.parts[given..]
                .iter()
                .map(|part| unifier.substitute(part))
                .collect();
            let ty = erase_local_types(&Type::function(remaining), keep);
            return Expression::new(
                ExpressionKind::IncompleteFunctionCall {
                    function: Box::new(callee),
                    arguments: decorated,
                },
                ty,
                range,
            );
        }

        let ty = match function.return_type() {
            Some(return_type) => erase_local_types(&unifier.substitute(return_type), keep),
            None => Type::any(),
        };
        let recursive = context.tail
            && match (&callee.kind, context.function) {
                (ExpressionKind::Reference(reference), Some(function)) => {
                    reference.target
                        == ReferenceTarget::Definition {
                            import: None,
                            index: function,
                        }
                }
                _ => false,
            };
        let kind = if recursive {
            ExpressionKind::RecurCall {
                function: Box::new(callee),
                arguments: decorated,
            }
        } else {
            ExpressionKind::FunctionCall {
                function: Box::new(callee),
                arguments: decorated,
            }
        };
        Expression::new(kind, ty, range)
    }

    /// `a |> f x` and `f x <| a` both become `f x a`.
    pub(super) fn decorate_pipe(
        &mut self,
        direction: PipeDirection,
        operator_range: Range,
        call: &surface::Expression,
        value: &surface::Expression,
        range: Range,
        context: &Context,
    ) -> Expression {
        let value = self.decorate_expression(value, &context.not_tail(), None);
        let call_range = call.range();
        let call = match call {
            surface::Expression::Call {
                function,
                arguments,
                ..
            } => {
                let callee = self.decorate_expression(function, &context.not_tail(), None);
                let mut pending: Vec<CallArgument> = arguments.iter().map(CallArgument::Raw).collect();
                pending.push(CallArgument::Decorated(value));
                self.apply(callee, pending, call_range, context)
            }
            surface::Expression::Constructor { name, arguments, .. } => {
                let mut pending: Vec<CallArgument> = arguments.iter().map(CallArgument::Raw).collect();
                pending.push(CallArgument::Decorated(value));
                self.decorate_constructor(name, pending, call_range, context, None)
            }
            other => {
                let callee = self.decorate_expression(other, &context.not_tail(), None);
                self.apply(callee, vec![CallArgument::Decorated(value)], call_range, context)
            }
        };
        let ty = call.ty.clone();
        Expression::new(
            ExpressionKind::Pipe {
                direction,
                operator_range,
                call: Box::new(call),
            },
            ty,
            range,
        )
    }

    /// `Variant a b` or `Alias { .. }` / `Alias a b`.
    pub(super) fn decorate_constructor(
        &mut self,
        name: &ScopedTypeIdentifier,
        arguments: Vec<CallArgument<'_>>,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let (reference, found) = match self.module.create_some_type_reference(name) {
            Ok(found) => found,
            Err(kind) => {
                self.error(kind, name.range());
                let children = self.decorate_arguments(arguments, context);
                return Self::poisoned(range, children);
            }
        };
        match found.kind {
            ModuleTypeKind::Variant => {
                self.decorate_variant_constructor(name, &found.ty, arguments, range, context, expected)
            }
            ModuleTypeKind::Alias => {
                self.decorate_record_constructor(name, reference, &found.ty, arguments, range, context)
            }
            ModuleTypeKind::Custom | ModuleTypeKind::Primitive => {
                self.error(
                    DecorateErrorKind::ExpectedFunctionType(name.identifier.name.clone()),
                    name.range(),
                );
                let children = self.decorate_arguments(arguments, context);
                Self::poisoned(range, children)
            }
        }
    }

    fn decorate_variant_constructor(
        &mut self,
        name: &ScopedTypeIdentifier,
        registered: &Ty,
        arguments: Vec<CallArgument<'_>>,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let (custom_ty, variant_index) = match registered.as_ref() {
            Type::CustomVariant(variant) => (variant.custom.clone(), variant.index),
            _ => (registered.clone(), 0),
        };
        let Type::Custom(custom) = custom_ty.as_ref() else {
            let children = self.decorate_arguments(arguments, context);
            return Self::poisoned(range, children);
        };
        let Some(variant) = custom.variants.get(variant_index) else {
            let children = self.decorate_arguments(arguments, context);
            return Self::poisoned(range, children);
        };

        if arguments.len() != variant.parameters.len() {
            self.error(
                DecorateErrorKind::WrongNumberOfVariantArguments {
                    variant: variant.name.clone(),
                    expected: variant.parameters.len(),
                    found: arguments.len(),
                },
                range,
            );
        }

        let locals: Vec<Ty> = custom
            .parameters
            .iter()
            .map(|parameter| {
                Arc::new(Type::LocalType(LocalType {
                    name: parameter.name.clone(),
                    range: None,
                    context: custom.context.clone(),
                }))
            })
            .collect();
        let mut unifier = TypeUnifier::new();
        if let Some(expected) = expected.filter(|_| !locals.is_empty()) {
            let applied = Type::invoker(custom_ty.clone(), locals.clone());
            unifier.unify(&applied, expected);
        }

        let inner = context.not_tail();
        let mut decorated = Vec::with_capacity(arguments.len());
        for (position, argument) in arguments.into_iter().enumerate() {
            let Some(parameter) = variant.parameters.get(position) else {
                decorated.push(self.decorate_argument(argument, &inner, Some(&Type::any())));
                continue;
            };
            let hint = unifier.substitute(parameter);
            let value = self.decorate_argument(argument, &inner, Some(&hint));
            if !unifier.unify(parameter, &value.ty) {
                self.error(
                    DecorateErrorKind::FunctionArgumentTypeMismatch {
                        index: position + 1,
                        expected: unifier.substitute(parameter).human_readable(),
                        found: value.ty.human_readable(),
                    },
                    value.range,
                );
            }
            decorated.push(value);
        }

        let ty = if custom.parameters.is_empty() {
            custom_ty.clone()
        } else {
            let params = custom
                .parameters
                .iter()
                .map(|parameter| match unifier.lookup(&custom.context, &parameter.name) {
                    Some(bound) => erase_local_types(&unifier.substitute(bound), context.generics.as_ref()),
                    None => Type::any(),
                })
                .collect();
            Type::invoker(custom_ty.clone(), params)
        };
        Expression::new(
            ExpressionKind::CustomTypeVariantConstructor {
                variant: NamedTypeReference {
                    module: name.module.clone(),
                    identifier: name.identifier.clone(),
                    ty: custom_ty.clone(),
                },
                variant_index,
                arguments: decorated,
            },
            ty,
            range,
        )
    }
}
