use std::collections::HashSet;
use std::sync::Arc;

use crate::decorated::{Expression, ExpressionKind, NamedTypeReference, RecordLiteralField};
use crate::errors::DecorateErrorKind;
use crate::source::Range;
use crate::surface::{self, ScopedTypeIdentifier};
use crate::types::{erase_local_types, record_of, strip_to_alias, RecordType, Ty, Type, TypeUnifier};

use super::calls::CallArgument;
use super::expressions::is_any;
use super::{Context, Decorator};

impl<'s, 'r> Decorator<'s, 'r> {
    /// `{ a = 1 }` builds a new record type in parse order; `{ base | a = 1 }`
    /// keeps the type of `base`.
    pub(super) fn decorate_record_literal(
        &mut self,
        literal: &surface::RecordLiteral,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let inner = context.not_tail();
        let mut seen: HashSet<&str> = HashSet::new();

        if let Some(template) = &literal.template {
            let template = self.decorate_expression(template, &inner, expected);
            let record = record_of(&template.ty);
            if record.is_none() && !is_any(&template.ty) {
                self.error(
                    DecorateErrorKind::ExpectedRecordType(template.ty.human_readable()),
                    template.range,
                );
            }
            let mut fields = Vec::with_capacity(literal.fields.len());
            for field in &literal.fields {
                if !seen.insert(field.name.name.as_str()) {
                    self.error(
                        DecorateErrorKind::YouCanOnlySetFieldInRecordOnce(field.name.name.clone()),
                        field.name.range,
                    );
                }
                let target = record.as_ref().and_then(|record| record.field(&field.name.name)).cloned();
                let value = self.decorate_expression(&field.expression, &inner, target.as_ref().map(|t| &t.ty));
                match &target {
                    Some(target) => {
                        self.expect_compatible(&target.ty, &value.ty, value.range);
                    }
                    None if record.is_some() => self.error(
                        DecorateErrorKind::NewRecordLiteralFieldNotInType {
                            field: field.name.name.clone(),
                            ty: template.ty.human_readable(),
                        },
                        field.name.range,
                    ),
                    None => {}
                }
                fields.push(RecordLiteralField {
                    name: field.name.clone(),
                    index: target.map_or(0, |target| target.index),
                    expression: value,
                });
            }
            let ty = template.ty.clone();
            return Expression::new(
                ExpressionKind::RecordLiteral {
                    template: Some(Box::new(template)),
                    fields,
                },
                ty,
                literal.range,
            );
        }

        let target = expected.and_then(|ty| record_of(ty).map(|record| (ty.human_readable(), record)));
        let mut unknown = false;
        let mut types: Vec<(String, Option<Range>, Ty)> = Vec::with_capacity(literal.fields.len());
        let mut fields = Vec::with_capacity(literal.fields.len());
        for field in &literal.fields {
            let duplicate = !seen.insert(field.name.name.as_str());
            if duplicate {
                self.error(
                    DecorateErrorKind::YouCanOnlySetFieldInRecordOnce(field.name.name.clone()),
                    field.name.range,
                );
            }
            let field_hint = match &target {
                Some((ty, record)) => match record.field(&field.name.name) {
                    Some(found) => Some(found.ty.clone()),
                    None => {
                        self.error(
                            DecorateErrorKind::NewRecordLiteralFieldNotInType {
                                field: field.name.name.clone(),
                                ty: ty.clone(),
                            },
                            field.name.range,
                        );
                        unknown = true;
                        None
                    }
                },
                None => None,
            };
            let value = self.decorate_expression(&field.expression, &inner, field_hint.as_ref());
            let index = match types.iter().position(|(name, _, _)| *name == field.name.name) {
                Some(existing) => existing,
                None => {
                    types.push((field.name.name.clone(), Some(field.name.range), value.ty.clone()));
                    types.len() - 1
                }
            };
            fields.push(RecordLiteralField {
                name: field.name.clone(),
                index,
                expression: value,
            });
        }
        // Unknown fields are reported per field, not again for the literal.
        let ty = if unknown {
            Type::any()
        } else {
            Arc::new(Type::Record(RecordType::new(types, Some(literal.range))))
        };
        Expression::new(
            ExpressionKind::RecordLiteral {
                template: None,
                fields,
            },
            ty,
            literal.range,
        )
    }

    /// `Alias { .. }` or `Alias a b` where the alias names a record type.
    pub(super) fn decorate_record_constructor(
        &mut self,
        name: &ScopedTypeIdentifier,
        reference: Ty,
        found: &Ty,
        arguments: Vec<CallArgument<'_>>,
        range: Range,
        context: &Context,
    ) -> Expression {
        let alias_ty = strip_to_alias(found);
        let Type::Alias(alias) = alias_ty.as_ref() else {
            let children = self.decorate_arguments(arguments, context);
            return Self::poisoned(range, children);
        };
        let Some(record) = record_of(&alias.next) else {
            self.error(DecorateErrorKind::ExpectedRecordType(alias.name.clone()), name.range());
            let children = self.decorate_arguments(arguments, context);
            return Self::poisoned(range, children);
        };

        let named = NamedTypeReference {
            module: name.module.clone(),
            identifier: name.identifier.clone(),
            ty: alias_ty.clone(),
        };
        let inner = context.not_tail();
        let mut unifier = TypeUnifier::new();

        let from_record = match arguments.as_slice() {
            [CallArgument::Raw(surface::Expression::Record(literal))] if literal.template.is_none() => {
                Some(literal)
            }
            _ => None,
        };

        let kind = if let Some(literal) = from_record {
            let mut value = self.decorate_record_literal(literal, &inner, Some(&alias.next));
            let distinct: HashSet<&str> = literal.fields.iter().map(|field| field.name.name.as_str()).collect();
            if distinct.len() != record.fields.len() {
                self.error(
                    DecorateErrorKind::WrongNumberOfFieldsInConstructor {
                        name: alias.name.clone(),
                        expected: record.fields.len(),
                        found: distinct.len(),
                    },
                    range,
                );
            }
            let mut problems = Vec::new();
            if let ExpressionKind::RecordLiteral { fields, .. } = &mut value.kind {
                for field in fields.iter_mut() {
                    match record.field(&field.name.name) {
                        Some(target) => {
                            field.index = target.index;
                            if !unifier.unify(&target.ty, &field.expression.ty) {
                                problems.push((
                                    DecorateErrorKind::WrongTypeForRecordConstructorField {
                                        field: field.name.name.clone(),
                                        expected: unifier.substitute(&target.ty).human_readable(),
                                        found: field.expression.ty.human_readable(),
                                    },
                                    field.expression.range,
                                ));
                            }
                        }
                        None => problems.push((
                            DecorateErrorKind::NewRecordLiteralFieldNotInType {
                                field: field.name.name.clone(),
                                ty: alias.name.clone(),
                            },
                            field.name.range,
                        )),
                    }
                }
            }
            for (kind, at) in problems {
                self.error(kind, at);
            }
            ExpressionKind::RecordConstructorFromRecord {
                alias: named,
                record: Box::new(value),
            }
        } else {
            if arguments.len() != record.fields.len() {
                self.error(
                    DecorateErrorKind::WrongNumberOfFieldsInConstructor {
                        name: alias.name.clone(),
                        expected: record.fields.len(),
                        found: arguments.len(),
                    },
                    range,
                );
            }
            let mut decorated = Vec::with_capacity(arguments.len());
            for (position, argument) in arguments.into_iter().enumerate() {
                let Some(target) = record.fields.get(position) else {
                    decorated.push(self.decorate_argument(argument, &inner, Some(&Type::any())));
                    continue;
                };
                let hint = unifier.substitute(&target.ty);
                let value = self.decorate_argument(argument, &inner, Some(&hint));
                if !unifier.unify(&target.ty, &value.ty) {
                    self.error(
                        DecorateErrorKind::WrongTypeForRecordConstructorField {
                            field: target.name.clone(),
                            expected: unifier.substitute(&target.ty).human_readable(),
                            found: value.ty.human_readable(),
                        },
                        value.range,
                    );
                }
                decorated.push(value);
            }
            ExpressionKind::RecordConstructorFromParameters {
                alias: named,
                arguments: decorated,
            }
        };

        let ty = if alias.parameters.is_empty() {
            reference
        } else {
            let params = alias
                .parameters
                .iter()
                .map(|parameter| match unifier.lookup(&alias.context, &parameter.name) {
                    Some(bound) => erase_local_types(&unifier.substitute(bound), context.generics.as_ref()),
                    None => Type::any(),
                })
                .collect();
            Type::invoker(reference, params)
        };
        Expression::new(kind, ty, range)
    }
}
