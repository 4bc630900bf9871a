use crate::decorated::{BindingKind, FunctionValue};
use crate::errors::DecorateErrorKind;
use crate::source::HasRange;
use crate::types::{function_parts, Ty, Type};

use super::{BodyState, Context, Decorator, PendingBody};

impl<'s, 'r> Decorator<'s, 'r> {
    pub(super) fn decorate_bodies(&mut self) {
        for index in 0..self.bodies.len() {
            self.decorate_body(index);
        }
    }

    /// Decorates the body of definition `index` unless it is already done or
    /// in progress.
    pub(super) fn decorate_body(&mut self, index: usize) {
        if self.states.get(index) != Some(&BodyState::Pending) {
            return;
        }
        let Some(body) = self.bodies.get_mut(index).and_then(Option::take) else {
            return;
        };
        self.states[index] = BodyState::InProgress;
        let Some((declared, annotated)) = self
            .module
            .definitions
            .get(index)
            .map(|definition| (definition.ty.clone(), definition.annotated))
        else {
            return;
        };

        let value = if annotated {
            self.decorate_annotated(index, &body, declared)
        } else {
            self.decorate_unannotated(index, &body)
        };

        if let Some(definition) = self.module.definitions.get_mut(index) {
            if !annotated && body.parameters.is_empty() {
                definition.ty = value.expression.ty.clone();
            }
            definition.value = Some(value);
        }
        self.states[index] = BodyState::Done;
    }

    fn decorate_annotated(&mut self, index: usize, body: &PendingBody<'s>, declared: Ty) -> FunctionValue {
        let context = Context {
            function: Some(index),
            generics: body.context.clone(),
            tail: true,
            ..Context::default()
        };
        if body.parameters.is_empty() {
            let expression = self.decorate_expression(body.expression, &context, Some(&declared));
            self.expect_compatible(&declared, &expression.ty, expression.range);
            return FunctionValue {
                parameters: Vec::new(),
                expression,
                forced_type: Some(declared),
            };
        }

        let name_range = self
            .module
            .definitions
            .get(index)
            .map(|definition| definition.identifier.range)
            .unwrap_or_else(|| body.expression.range());
        let (parameter_types, return_type) = match function_parts(&declared) {
            Some(function) if function.arity() == body.parameters.len() => (
                function.parameters().to_vec(),
                function.return_type().cloned(),
            ),
            Some(function) => {
                self.error(
                    DecorateErrorKind::WrongNumberOfArgumentsInFunctionValue {
                        expected: function.arity(),
                        found: body.parameters.len(),
                    },
                    name_range,
                );
                (Vec::new(), None)
            }
            None => {
                self.error(
                    DecorateErrorKind::WrongNumberOfArgumentsInFunctionValue {
                        expected: 0,
                        found: body.parameters.len(),
                    },
                    name_range,
                );
                (Vec::new(), None)
            }
        };

        let mut inner = context;
        let mut parameters = Vec::with_capacity(body.parameters.len());
        for (position, parameter) in body.parameters.iter().enumerate() {
            let ty = parameter_types.get(position).cloned().unwrap_or_else(Type::any);
            let id = self.bind(parameter, BindingKind::FunctionParameter, ty);
            inner = inner.with_parameter(&parameter.name, id);
            parameters.push(id);
        }

        let expression = self.decorate_expression(body.expression, &inner, return_type.as_ref());
        if let Some(return_type) = &return_type {
            self.expect_compatible(return_type, &expression.ty, expression.range);
        }
        FunctionValue {
            parameters,
            expression,
            forced_type: Some(declared),
        }
    }

    /// Constants, and definitions already reported for their missing
    /// annotation. Parameters are typed `*`.
    fn decorate_unannotated(&mut self, index: usize, body: &PendingBody<'s>) -> FunctionValue {
        let mut context = Context {
            function: Some(index),
            tail: true,
            ..Context::default()
        };
        let mut parameters = Vec::with_capacity(body.parameters.len());
        for parameter in body.parameters {
            let id = self.bind(parameter, BindingKind::FunctionParameter, Type::any());
            context = context.with_parameter(&parameter.name, id);
            parameters.push(id);
        }
        let expression = self.decorate_expression(body.expression, &context, None);
        FunctionValue {
            parameters,
            expression,
            forced_type: None,
        }
    }
}
