use std::collections::HashSet;

use crate::decorated::{
    BindingKind, Expression, ExpressionKind, InterpolationPart, LetAssignment, NamedTypeReference,
    RecordLookup, ReferenceKind, ReferenceTarget, VariableReference,
};
use crate::errors::DecorateErrorKind;
use crate::module::{DefinitionKind, DefinitionLookup, ModuleTypeKind};
use crate::source::{HasRange, Range};
use crate::surface::{self, LetTarget, ScopedTypeIdentifier, ScopedVariableIdentifier, VariableIdentifier};
use crate::type_lookup::TypeLookup;
use crate::types::{
    function_parts, record_of, resolve, strip, PrimitiveKind, Ty, Type,
};

use super::{BodyState, Context, Decorator};

/// True for `*`, including poisoned subtrees.
pub(super) fn is_any(ty: &Ty) -> bool {
    strip(ty).is_any_matching()
}

impl<'s, 'r> Decorator<'s, 'r> {
    /// Decorates one expression. `expected` is a hint used to type lambda
    /// parameters, record literals and empty containers; mismatches against
    /// it are reported by the caller.
    pub(super) fn decorate_expression(
        &mut self,
        expression: &surface::Expression,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        use surface::Expression as Raw;

        let range = expression.range();
        match expression {
            Raw::Integer { value, .. } => {
                Expression::new(ExpressionKind::Integer(*value), self.primitive(PrimitiveKind::Int), range)
            }
            Raw::Fixed { value, .. } => {
                Expression::new(ExpressionKind::Fixed(*value), self.primitive(PrimitiveKind::Fixed), range)
            }
            Raw::Bool { value, .. } => {
                Expression::new(ExpressionKind::Bool(*value), self.primitive(PrimitiveKind::Bool), range)
            }
            Raw::Character { value, .. } => Expression::new(
                ExpressionKind::Character(*value),
                self.primitive(PrimitiveKind::Char),
                range,
            ),
            Raw::String(token) => Expression::new(
                ExpressionKind::String(token.clone()),
                self.primitive(PrimitiveKind::String),
                range,
            ),
            Raw::StringInterpolation { token, parts } => {
                let inner = context.not_tail();
                let parts = parts
                    .iter()
                    .map(|part| match part {
                        surface::InterpolationPart::Text { text, ranges } => InterpolationPart::Text {
                            text: text.clone(),
                            ranges: ranges.clone(),
                        },
                        surface::InterpolationPart::Expression(expression) => {
                            InterpolationPart::Expression(self.decorate_expression(expression, &inner, None))
                        }
                    })
                    .collect();
                Expression::new(
                    ExpressionKind::StringInterpolation {
                        token: token.clone(),
                        parts,
                    },
                    self.primitive(PrimitiveKind::String),
                    range,
                )
            }
            Raw::ResourceName { name, .. } => Expression::new(
                ExpressionKind::ResourceName(name.clone()),
                self.primitive(PrimitiveKind::ResourceName),
                range,
            ),
            Raw::TypeId { name, .. } => self.decorate_type_id(name, range),
            Raw::List { items, .. } => {
                self.decorate_sequence(items, range, context, expected, PrimitiveKind::List)
            }
            Raw::Array { items, .. } => {
                self.decorate_sequence(items, range, context, expected, PrimitiveKind::Array)
            }
            Raw::Tuple { items, .. } => {
                let hints = expected
                    .and_then(|ty| resolve(ty).ok())
                    .and_then(|ty| match ty.as_ref() {
                        Type::Tuple(tuple) => Some(tuple.items.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                let inner = context.not_tail();
                let items: Vec<Expression> = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| self.decorate_expression(item, &inner, hints.get(index)))
                    .collect();
                let ty = Type::tuple(items.iter().map(|item| item.ty.clone()).collect());
                Expression::new(ExpressionKind::Tuple(items), ty, range)
            }
            Raw::Record(record) => self.decorate_record_literal(record, context, expected),
            Raw::Variable(variable) => self.decorate_variable(variable, range, context),
            Raw::RecordLookup { base, lookups, .. } => self.decorate_lookups(base, lookups, range, context),
            Raw::Call {
                function,
                arguments,
                ..
            } => {
                let callee = self.decorate_expression(function, &context.not_tail(), None);
                let arguments = arguments.iter().map(super::calls::CallArgument::Raw).collect();
                self.apply(callee, arguments, range, context)
            }
            Raw::Constructor { name, arguments, .. } => {
                let arguments = arguments.iter().map(super::calls::CallArgument::Raw).collect();
                self.decorate_constructor(name, arguments, range, context, expected)
            }
            Raw::BinaryOperator {
                operator,
                operator_range,
                left,
                right,
                ..
            } => self.decorate_binary(*operator, *operator_range, left, right, range, context),
            Raw::UnaryOperator {
                operator,
                operator_range,
                operand,
                ..
            } => self.decorate_unary(*operator, *operator_range, operand, range, context),
            Raw::If {
                if_keyword,
                condition,
                then_keyword,
                consequence,
                else_keyword,
                alternative,
                ..
            } => {
                let bool_type = self.primitive(PrimitiveKind::Bool);
                let condition = self.decorate_expression(condition, &context.not_tail(), Some(&bool_type));
                if !crate::types::compatible(&bool_type, &condition.ty) {
                    self.error(
                        DecorateErrorKind::IfTestMustHaveBooleanType(condition.ty.human_readable()),
                        condition.range,
                    );
                }
                let consequence = self.decorate_expression(consequence, context, expected);
                let hint = expected.cloned().unwrap_or_else(|| consequence.ty.clone());
                let alternative = self.decorate_expression(alternative, context, Some(&hint));
                if !crate::types::compatible(&consequence.ty, &alternative.ty) {
                    self.error(
                        DecorateErrorKind::IfConsequenceAndAlternativeMustHaveSameType {
                            consequence: consequence.ty.human_readable(),
                            alternative: alternative.ty.human_readable(),
                        },
                        alternative.range,
                    );
                }
                let ty = if is_any(&consequence.ty) {
                    alternative.ty.clone()
                } else {
                    consequence.ty.clone()
                };
                Expression::new(
                    ExpressionKind::If {
                        if_keyword: *if_keyword,
                        condition: Box::new(condition),
                        then_keyword: *then_keyword,
                        consequence: Box::new(consequence),
                        else_keyword: *else_keyword,
                        alternative: Box::new(alternative),
                    },
                    ty,
                    range,
                )
            }
            Raw::Let {
                let_keyword,
                assignments,
                in_keyword,
                body,
                ..
            } => self.decorate_let(*let_keyword, assignments, *in_keyword, body, range, context, expected),
            Raw::CaseCustomType {
                case_keyword,
                test,
                of_keyword,
                consequences,
                default,
                ..
            } => self.decorate_case_custom(
                *case_keyword,
                test,
                *of_keyword,
                consequences,
                default.as_ref(),
                range,
                context,
                expected,
            ),
            Raw::CasePattern {
                case_keyword,
                test,
                of_keyword,
                consequences,
                default,
                ..
            } => self.decorate_case_pattern(
                *case_keyword,
                test,
                *of_keyword,
                consequences,
                default.as_ref(),
                range,
                context,
                expected,
            ),
            Raw::Guard { items, default, .. } => {
                self.decorate_guard(items, default.as_ref(), range, context, expected)
            }
            Raw::Lambda {
                backslash,
                parameters,
                arrow,
                body,
                ..
            } => self.decorate_lambda(*backslash, parameters, *arrow, body, range, context, expected),
            Raw::Cast {
                expression,
                as_keyword,
                target,
                ..
            } => self.decorate_cast(expression, *as_keyword, target, range, context),
            Raw::Asm { text, .. } => Expression::new(ExpressionKind::Asm(text.clone()), Type::any(), range),
            Raw::ExternalFunction {
                keyword,
                name,
                name_range,
                arity,
                arity_range,
                ..
            } => {
                let parameters = usize::try_from(*arity).unwrap_or(0);
                let ty = Type::function(vec![Type::any(); parameters + 1]);
                Expression::new(
                    ExpressionKind::ExternalFunction {
                        keyword: *keyword,
                        name: name.clone(),
                        name_range: *name_range,
                        arity: *arity,
                        arity_range: *arity_range,
                    },
                    ty,
                    range,
                )
            }
        }
    }

    fn decorate_type_id(&mut self, name: &ScopedTypeIdentifier, range: Range) -> Expression {
        match self.module.create_some_type_reference(name) {
            Ok((reference, _)) => {
                let ty = Type::invoker(self.primitive(PrimitiveKind::TypeId), vec![reference.clone()]);
                Expression::new(
                    ExpressionKind::TypeId(NamedTypeReference {
                        module: name.module.clone(),
                        identifier: name.identifier.clone(),
                        ty: reference,
                    }),
                    ty,
                    range,
                )
            }
            Err(kind) => {
                self.error(kind, name.range());
                Self::poisoned(range, Vec::new())
            }
        }
    }

    fn decorate_sequence(
        &mut self,
        items: &[surface::Expression],
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
        container: PrimitiveKind,
    ) -> Expression {
        let hint = expected.and_then(|ty| container_element(ty, container));
        let inner = context.not_tail();
        let mut element: Option<Ty> = None;
        let mut decorated = Vec::with_capacity(items.len());
        for item in items {
            let item = self.decorate_expression(item, &inner, element.as_ref().or(hint.as_ref()));
            match &element {
                None => element = Some(item.ty.clone()),
                Some(first) => {
                    if !crate::types::compatible(first, &item.ty) {
                        self.error(
                            DecorateErrorKind::EveryItemInTheListMustHaveTheSameType {
                                expected: first.human_readable(),
                                found: item.ty.human_readable(),
                            },
                            item.range,
                        );
                    }
                }
            }
            decorated.push(item);
        }
        let element = element.or(hint).unwrap_or_else(Type::any);
        let ty = Type::invoker(self.primitive(container), vec![element]);
        let kind = match container {
            PrimitiveKind::Array => ExpressionKind::Array(decorated),
            _ => ExpressionKind::List(decorated),
        };
        Expression::new(kind, ty, range)
    }

    pub(super) fn decorate_variable(
        &mut self,
        variable: &ScopedVariableIdentifier,
        range: Range,
        context: &Context,
    ) -> Expression {
        let identifier = &variable.identifier;
        if let Some(module) = &variable.module {
            return match self.module.find_scoped_definition(&module.dotted(), &identifier.name) {
                Ok(DefinitionLookup::Imported(imported)) => self.imported_reference(imported, variable, range),
                Ok(DefinitionLookup::Local(index)) => self.local_reference(index, variable, range),
                Err(kind) => {
                    self.error(kind, range);
                    Self::poisoned(range, Vec::new())
                }
            };
        }

        if let Some(id) = context.lookup(&identifier.name) {
            if let Some(binding) = self.module.bindings.get_mut(id.0) {
                binding.references.push(identifier.range);
                let kind = match binding.kind {
                    BindingKind::LetVariable => ReferenceKind::LetVariable,
                    BindingKind::FunctionParameter | BindingKind::LambdaParameter => {
                        ReferenceKind::FunctionParameter
                    }
                    BindingKind::CaseConsequenceParameter => ReferenceKind::CaseConsequenceParameter,
                };
                return Expression::new(
                    ExpressionKind::Reference(VariableReference {
                        kind,
                        module: None,
                        identifier: identifier.clone(),
                        target: ReferenceTarget::Binding(id),
                    }),
                    binding.ty.clone(),
                    range,
                );
            }
        }

        match self.module.find_definition(&identifier.name) {
            Some(DefinitionLookup::Local(index)) => self.local_reference(index, variable, range),
            Some(DefinitionLookup::Imported(imported)) => self.imported_reference(imported, variable, range),
            None => {
                self.error(DecorateErrorKind::UnknownVariable(identifier.name.clone()), range);
                Self::poisoned(range, Vec::new())
            }
        }
    }

    fn local_reference(&mut self, index: usize, variable: &ScopedVariableIdentifier, range: Range) -> Expression {
        let unannotated = self
            .module
            .definitions
            .get(index)
            .is_some_and(|definition| !definition.annotated);
        if unannotated {
            match self.states.get(index) {
                Some(BodyState::Pending) => self.decorate_body(index),
                Some(BodyState::InProgress) => {
                    let is_constant = self
                        .module
                        .definitions
                        .get(index)
                        .is_some_and(|definition| definition.parameters.is_empty());
                    if is_constant {
                        self.error(
                            DecorateErrorKind::CyclicConstant(variable.identifier.name.clone()),
                            range,
                        );
                        return Self::poisoned(range, Vec::new());
                    }
                }
                _ => {}
            }
        }
        let Some(definition) = self.module.definitions.get_mut(index) else {
            return Self::poisoned(range, Vec::new());
        };
        definition.references.push(variable.identifier.range);
        let kind = reference_kind(definition.kind);
        Expression::new(
            ExpressionKind::Reference(VariableReference {
                kind,
                module: variable.module.clone(),
                identifier: variable.identifier.clone(),
                target: ReferenceTarget::Definition {
                    import: None,
                    index,
                },
            }),
            definition.ty.clone(),
            range,
        )
    }

    fn imported_reference(
        &mut self,
        imported: usize,
        variable: &ScopedVariableIdentifier,
        range: Range,
    ) -> Expression {
        let Some(entry) = self.module.imported_definitions.get_mut(imported) else {
            return Self::poisoned(range, Vec::new());
        };
        entry.references.push(variable.identifier.range);
        let (import_index, definition_index) = (entry.import_index, entry.definition_index);
        let Some((_, definition)) = self.module.imported_definition(imported) else {
            return Self::poisoned(range, Vec::new());
        };
        let (ty, kind) = (definition.ty.clone(), reference_kind(definition.kind));
        Expression::new(
            ExpressionKind::Reference(VariableReference {
                kind,
                module: variable.module.clone(),
                identifier: variable.identifier.clone(),
                target: ReferenceTarget::Definition {
                    import: Some(import_index),
                    index: definition_index,
                },
            }),
            ty,
            range,
        )
    }

    fn decorate_lookups(
        &mut self,
        base: &surface::Expression,
        lookups: &[VariableIdentifier],
        range: Range,
        context: &Context,
    ) -> Expression {
        let base = self.decorate_expression(base, &context.not_tail(), None);
        let mut current = base.ty.clone();
        let mut steps = Vec::with_capacity(lookups.len());
        for field in lookups {
            if is_any(&current) {
                steps.push(RecordLookup {
                    field: field.clone(),
                    index: 0,
                    ty: Type::any(),
                });
                current = Type::any();
                continue;
            }
            let next = match record_of(&current) {
                Some(record) => match record.field(&field.name) {
                    Some(found) => {
                        steps.push(RecordLookup {
                            field: field.clone(),
                            index: found.index,
                            ty: found.ty.clone(),
                        });
                        found.ty.clone()
                    }
                    None => {
                        self.error(
                            DecorateErrorKind::CouldNotFindFieldInLookup {
                                field: field.name.clone(),
                                ty: current.human_readable(),
                            },
                            field.range,
                        );
                        Type::any()
                    }
                },
                None => {
                    self.error(
                        DecorateErrorKind::ExpectedRecordType(current.human_readable()),
                        field.range,
                    );
                    Type::any()
                }
            };
            current = next;
        }
        Expression::new(
            ExpressionKind::RecordLookups {
                base: Box::new(base),
                lookups: steps,
            },
            current,
            range,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn decorate_let(
        &mut self,
        let_keyword: Range,
        assignments: &[surface::LetAssignment],
        in_keyword: Range,
        body: &surface::Expression,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let mut inner = context.clone();
        let mut names: HashSet<String> = HashSet::new();
        let mut decorated = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let value = self.decorate_expression(&assignment.expression, &inner.not_tail(), None);
            let mut bindings = Vec::new();
            let mut destructure_range = None;
            match &assignment.target {
                LetTarget::Single(identifier) => {
                    self.check_let_name(identifier, &mut names);
                    let id = self.bind(identifier, BindingKind::LetVariable, value.ty.clone());
                    inner = inner.with_let(&identifier.name, id);
                    bindings.push(id);
                }
                LetTarget::Record { names: fields, range } => {
                    destructure_range = Some(*range);
                    let record = record_of(&value.ty);
                    if record.is_none() && !is_any(&value.ty) {
                        self.error(
                            DecorateErrorKind::ExpectedRecordType(value.ty.human_readable()),
                            value.range,
                        );
                    }
                    for identifier in fields {
                        self.check_let_name(identifier, &mut names);
                        let ty = match &record {
                            Some(record) => match record.field(&identifier.name) {
                                Some(field) => field.ty.clone(),
                                None => {
                                    self.error(
                                        DecorateErrorKind::CouldNotFindFieldInLookup {
                                            field: identifier.name.clone(),
                                            ty: value.ty.human_readable(),
                                        },
                                        identifier.range,
                                    );
                                    Type::any()
                                }
                            },
                            None => Type::any(),
                        };
                        let id = self.bind(identifier, BindingKind::LetVariable, ty);
                        inner = inner.with_let(&identifier.name, id);
                        bindings.push(id);
                    }
                }
            }
            decorated.push(LetAssignment {
                bindings,
                destructure_range,
                expression: value,
            });
        }
        let body = self.decorate_expression(body, &inner, expected);
        let ty = body.ty.clone();
        Expression::new(
            ExpressionKind::Let {
                let_keyword,
                assignments: decorated,
                in_keyword,
                body: Box::new(body),
            },
            ty,
            range,
        )
    }

    fn check_let_name(&mut self, identifier: &VariableIdentifier, names: &mut HashSet<String>) {
        if identifier.is_ignore() {
            return;
        }
        if !names.insert(identifier.name.clone()) {
            self.error(
                DecorateErrorKind::AlreadyDeclared(identifier.name.clone()),
                identifier.range,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decorate_lambda(
        &mut self,
        backslash: Range,
        parameters: &[VariableIdentifier],
        arrow: Range,
        body: &surface::Expression,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let (parameter_types, return_hint) = match expected.map(|ty| (is_any(ty), function_parts(ty))) {
            Some((_, Some(function))) if function.arity() == parameters.len() => (
                function.parameters().to_vec(),
                function.return_type().cloned(),
            ),
            Some((_, Some(function))) => {
                self.error(
                    DecorateErrorKind::WrongNumberOfArgumentsInFunctionValue {
                        expected: function.arity(),
                        found: parameters.len(),
                    },
                    range,
                );
                (Vec::new(), None)
            }
            Some((true, None)) => (Vec::new(), None),
            _ => {
                self.error(DecorateErrorKind::LambdaNeedsContext, range);
                (Vec::new(), None)
            }
        };

        let mut inner = context.not_tail();
        let mut bound = Vec::with_capacity(parameters.len());
        let mut parts = Vec::with_capacity(parameters.len() + 1);
        for (position, parameter) in parameters.iter().enumerate() {
            let ty = parameter_types.get(position).cloned().unwrap_or_else(Type::any);
            let id = self.bind(parameter, BindingKind::LambdaParameter, ty.clone());
            inner = inner.with_parameter(&parameter.name, id);
            bound.push(id);
            parts.push(ty);
        }
        let body = self.decorate_expression(body, &inner, return_hint.as_ref());
        parts.push(body.ty.clone());
        Expression::new(
            ExpressionKind::Lambda {
                backslash,
                parameters: bound,
                arrow,
                body: Box::new(body),
            },
            Type::function(parts),
            range,
        )
    }

    fn decorate_cast(
        &mut self,
        expression: &surface::Expression,
        as_keyword: Range,
        target: &ScopedTypeIdentifier,
        range: Range,
        context: &Context,
    ) -> Expression {
        let value = self.decorate_expression(expression, &context.not_tail(), None);
        let ty = match self.module.create_some_type_reference(target) {
            Ok((reference, found)) if found.kind == ModuleTypeKind::Alias => {
                if let Type::Alias(alias) = found.ty.as_ref() {
                    self.expect_compatible(&alias.next, &value.ty, value.range);
                }
                reference
            }
            Ok(_) => {
                self.error(
                    DecorateErrorKind::CastTargetMustBeAlias(target.identifier.name.clone()),
                    target.range(),
                );
                Type::any()
            }
            Err(kind) => {
                self.error(kind, target.range());
                Type::any()
            }
        };
        Expression::new(
            ExpressionKind::CastOperator {
                expression: Box::new(value),
                as_keyword,
                alias: NamedTypeReference {
                    module: target.module.clone(),
                    identifier: target.identifier.clone(),
                    ty: ty.clone(),
                },
            },
            ty,
            range,
        )
    }
}

fn reference_kind(kind: DefinitionKind) -> ReferenceKind {
    match kind {
        DefinitionKind::Function => ReferenceKind::Function,
        DefinitionKind::Constant => ReferenceKind::Constant,
    }
}

/// Element type of `List x` / `Array x`.
fn container_element(ty: &Ty, container: PrimitiveKind) -> Option<Ty> {
    let resolved = resolve(ty).ok()?;
    let Type::Invoker(invoker) = resolved.as_ref() else {
        return None;
    };
    match strip(&invoker.generator).as_ref() {
        Type::Primitive(primitive) if primitive.kind == container => invoker.params.first().cloned(),
        _ => None,
    }
}
