use std::collections::BTreeSet;

use crate::decorated::{
    BindingKind, CaseCustomConsequence, CaseDefault, CasePatternConsequence, Expression, ExpressionKind,
    GuardDefault, GuardItem, NamedTypeReference,
};
use crate::errors::DecorateErrorKind;
use crate::source::Range;
use crate::surface;
use crate::types::{bind_custom_arguments, compatible, custom_application, PrimitiveKind, Ty, Type, TypeUnifier};

use super::expressions::is_any;
use super::{Context, Decorator};

/// Type of the first arm; later arms must be compatible with it.
#[derive(Default)]
struct ArmTypes {
    first: Option<Ty>,
}

impl ArmTypes {
    fn hint<'a>(&'a self, expected: Option<&'a Ty>) -> Option<&'a Ty> {
        expected.or(self.first.as_ref())
    }

    fn result(self) -> Ty {
        self.first.unwrap_or_else(Type::any)
    }
}

impl<'s, 'r> Decorator<'s, 'r> {
    fn check_arm(&mut self, arms: &mut ArmTypes, expression: &Expression) {
        match arms.first.clone() {
            Some(first) if !is_any(&first) => {
                self.expect_compatible(&first, &expression.ty, expression.range);
            }
            _ => arms.first = Some(expression.ty.clone()),
        }
    }

    fn decorate_case_default(
        &mut self,
        default: Option<&surface::CaseDefault>,
        arms: &mut ArmTypes,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Option<CaseDefault> {
        let default = default?;
        let expression = self.decorate_expression(&default.expression, context, arms.hint(expected));
        self.check_arm(arms, &expression);
        Some(CaseDefault {
            underscore: default.underscore,
            arrow: default.arrow,
            expression: Box::new(expression),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn decorate_case_custom(
        &mut self,
        case_keyword: Range,
        test: &surface::Expression,
        of_keyword: Range,
        consequences: &[surface::CaseCustomConsequence],
        default: Option<&surface::CaseDefault>,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let test = self.decorate_expression(test, &context.not_tail(), None);
        let application = custom_application(&test.ty);
        if application.is_none() && !is_any(&test.ty) {
            self.error(
                DecorateErrorKind::CaseTestMustBeCustomType(test.ty.human_readable()),
                test.range,
            );
        }
        let mut unifier = TypeUnifier::new();
        let custom = application.as_ref().and_then(|(custom_ty, arguments)| match custom_ty.as_ref() {
            Type::Custom(custom) => {
                bind_custom_arguments(custom, arguments, &mut unifier);
                Some(custom)
            }
            _ => None,
        });

        if consequences.is_empty() && default.is_none() {
            self.error(DecorateErrorKind::CaseMustHaveConsequences, case_keyword);
        }

        let mut arms = ArmTypes::default();
        let mut handled: BTreeSet<usize> = BTreeSet::new();
        let mut decorated = Vec::with_capacity(consequences.len());
        for consequence in consequences {
            let variant_name = &consequence.variant.identifier.name;
            let variant = custom.and_then(|custom| custom.variant(variant_name));
            let mut parameter_types: Vec<Ty> = Vec::new();
            let mut variant_index = 0;
            match (custom, variant) {
                (Some(custom), None) => self.error(
                    DecorateErrorKind::UnknownVariantInCase {
                        variant: variant_name.clone(),
                        ty: custom.name.clone(),
                    },
                    consequence.variant.range(),
                ),
                (_, Some(variant)) => {
                    variant_index = variant.index;
                    if !handled.insert(variant.index) {
                        self.error(
                            DecorateErrorKind::AlreadyHandledCustomTypeVariant(variant.name.clone()),
                            consequence.variant.range(),
                        );
                    }
                    if variant.parameters.len() != consequence.parameters.len() {
                        self.error(
                            DecorateErrorKind::CaseWrongParameterCount {
                                variant: variant.name.clone(),
                                expected: variant.parameters.len(),
                                found: consequence.parameters.len(),
                            },
                            consequence.variant.range(),
                        );
                    }
                    parameter_types = variant
                        .parameters
                        .iter()
                        .map(|parameter| unifier.substitute(parameter))
                        .collect();
                }
                (None, None) => {}
            }

            let mut inner = context.clone();
            let mut parameters = Vec::with_capacity(consequence.parameters.len());
            for (position, parameter) in consequence.parameters.iter().enumerate() {
                let ty = parameter_types.get(position).cloned().unwrap_or_else(Type::any);
                let id = self.bind(parameter, BindingKind::CaseConsequenceParameter, ty);
                inner = inner.with_case_parameter(&parameter.name, id);
                parameters.push(id);
            }
            let expression = self.decorate_expression(&consequence.expression, &inner, arms.hint(expected));
            self.check_arm(&mut arms, &expression);
            let custom_ty = application
                .as_ref()
                .map_or_else(Type::any, |(custom_ty, _)| custom_ty.clone());
            decorated.push(CaseCustomConsequence {
                variant: NamedTypeReference {
                    module: consequence.variant.module.clone(),
                    identifier: consequence.variant.identifier.clone(),
                    ty: custom_ty,
                },
                variant_index,
                parameters,
                arrow: consequence.arrow,
                expression,
            });
        }

        let default = self.decorate_case_default(default, &mut arms, context, expected);

        if let Some(custom) = custom {
            let missing: Vec<String> = custom
                .variants
                .iter()
                .filter(|variant| !handled.contains(&variant.index))
                .map(|variant| variant.name.clone())
                .collect();
            if default.is_none() && !missing.is_empty() && !decorated.is_empty() {
                self.error(DecorateErrorKind::UnhandledCustomTypeVariants { missing }, case_keyword);
            }
        }

        Expression::new(
            ExpressionKind::CaseCustomType {
                case_keyword,
                test: Box::new(test),
                of_keyword,
                consequences: decorated,
                default,
            },
            arms.result(),
            range,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn decorate_case_pattern(
        &mut self,
        case_keyword: Range,
        test: &surface::Expression,
        of_keyword: Range,
        consequences: &[surface::CasePatternConsequence],
        default: Option<&surface::CaseDefault>,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let test = self.decorate_expression(test, &context.not_tail(), None);
        if consequences.is_empty() && default.is_none() {
            self.error(DecorateErrorKind::CaseMustHaveConsequences, case_keyword);
        }
        let mut arms = ArmTypes::default();
        let mut decorated = Vec::with_capacity(consequences.len());
        for consequence in consequences {
            let pattern = self.decorate_expression(&consequence.pattern, &context.not_tail(), Some(&test.ty));
            self.expect_compatible(&test.ty, &pattern.ty, pattern.range);
            let expression = self.decorate_expression(&consequence.expression, context, arms.hint(expected));
            self.check_arm(&mut arms, &expression);
            decorated.push(CasePatternConsequence {
                pattern,
                arrow: consequence.arrow,
                expression,
            });
        }
        let default = self.decorate_case_default(default, &mut arms, context, expected);
        Expression::new(
            ExpressionKind::CasePattern {
                case_keyword,
                test: Box::new(test),
                of_keyword,
                consequences: decorated,
                default,
            },
            arms.result(),
            range,
        )
    }

    pub(super) fn decorate_guard(
        &mut self,
        items: &[surface::GuardItem],
        default: Option<&surface::GuardDefault>,
        range: Range,
        context: &Context,
        expected: Option<&Ty>,
    ) -> Expression {
        let bool_type = self.primitive(PrimitiveKind::Bool);
        let mut arms = ArmTypes::default();
        let mut decorated = Vec::with_capacity(items.len());
        for item in items {
            let condition = self.decorate_expression(&item.condition, &context.not_tail(), Some(&bool_type));
            if !compatible(&bool_type, &condition.ty) {
                self.error(
                    DecorateErrorKind::GuardConditionMustBeBoolean(condition.ty.human_readable()),
                    condition.range,
                );
            }
            let consequence = self.decorate_expression(&item.consequence, context, arms.hint(expected));
            self.check_arm(&mut arms, &consequence);
            decorated.push(GuardItem {
                bar: item.bar,
                condition,
                arrow: item.arrow,
                consequence,
            });
        }
        let default = match default {
            Some(default) => {
                let expression = self.decorate_expression(&default.expression, context, arms.hint(expected));
                self.check_arm(&mut arms, &expression);
                Some(GuardDefault {
                    bar: default.bar,
                    underscore: default.underscore,
                    arrow: default.arrow,
                    expression: Box::new(expression),
                })
            }
            None => {
                self.error(DecorateErrorKind::GuardMustHaveDefault, range);
                None
            }
        };
        Expression::new(
            ExpressionKind::Guard {
                items: decorated,
                default,
            },
            arms.result(),
            range,
        )
    }
}
