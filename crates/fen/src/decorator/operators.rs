use crate::decorated::{
    ArithmeticOperator, BitwiseOperator, BooleanOperator, Expression, ExpressionKind, LogicalOperator,
    OperatorType, PipeDirection,
};
use crate::errors::DecorateErrorKind;
use crate::source::Range;
use crate::surface::{self, BinaryOperatorKind, UnaryOperatorKind};
use crate::types::{compatible, strip, PrimitiveKind, Ty, Type};

use super::expressions::is_any;
use super::{Context, Decorator};

fn operator_type(kind: BinaryOperatorKind) -> Option<OperatorType> {
    let operator = match kind {
        BinaryOperatorKind::PipeRight | BinaryOperatorKind::PipeLeft => return None,
        BinaryOperatorKind::LogicalOr => OperatorType::Logical(LogicalOperator::Or),
        BinaryOperatorKind::LogicalAnd => OperatorType::Logical(LogicalOperator::And),
        BinaryOperatorKind::Equal => OperatorType::Boolean(BooleanOperator::Equal),
        BinaryOperatorKind::NotEqual => OperatorType::Boolean(BooleanOperator::NotEqual),
        BinaryOperatorKind::Less => OperatorType::Boolean(BooleanOperator::Less),
        BinaryOperatorKind::LessOrEqual => OperatorType::Boolean(BooleanOperator::LessOrEqual),
        BinaryOperatorKind::Greater => OperatorType::Boolean(BooleanOperator::Greater),
        BinaryOperatorKind::GreaterOrEqual => OperatorType::Boolean(BooleanOperator::GreaterOrEqual),
        BinaryOperatorKind::Cons => OperatorType::Arithmetic(ArithmeticOperator::Cons),
        BinaryOperatorKind::Append => OperatorType::Arithmetic(ArithmeticOperator::Append),
        BinaryOperatorKind::BitwiseOr => OperatorType::Bitwise(BitwiseOperator::Or),
        BinaryOperatorKind::BitwiseXor => OperatorType::Bitwise(BitwiseOperator::Xor),
        BinaryOperatorKind::BitwiseAnd => OperatorType::Bitwise(BitwiseOperator::And),
        BinaryOperatorKind::ShiftLeft => OperatorType::Bitwise(BitwiseOperator::ShiftLeft),
        BinaryOperatorKind::ShiftRight => OperatorType::Bitwise(BitwiseOperator::ShiftRight),
        BinaryOperatorKind::Plus => OperatorType::Arithmetic(ArithmeticOperator::Plus),
        BinaryOperatorKind::Minus => OperatorType::Arithmetic(ArithmeticOperator::Minus),
        BinaryOperatorKind::Multiply => OperatorType::Arithmetic(ArithmeticOperator::Multiply),
        BinaryOperatorKind::Divide => OperatorType::Arithmetic(ArithmeticOperator::Divide),
        BinaryOperatorKind::Remainder => OperatorType::Arithmetic(ArithmeticOperator::Remainder),
    };
    Some(operator)
}

fn is_primitive(ty: &Ty, kind: PrimitiveKind) -> bool {
    matches!(strip(ty).as_ref(), Type::Primitive(primitive) if primitive.kind == kind)
}

impl<'s, 'r> Decorator<'s, 'r> {
    pub(super) fn decorate_binary(
        &mut self,
        kind: BinaryOperatorKind,
        operator_range: Range,
        left: &surface::Expression,
        right: &surface::Expression,
        range: Range,
        context: &Context,
    ) -> Expression {
        match kind {
            BinaryOperatorKind::PipeRight => {
                return self.decorate_pipe(PipeDirection::Right, operator_range, right, left, range, context)
            }
            BinaryOperatorKind::PipeLeft => {
                return self.decorate_pipe(PipeDirection::Left, operator_range, left, right, range, context)
            }
            _ => {}
        }
        let Some(mut operator) = operator_type(kind) else {
            return Self::poisoned(range, Vec::new());
        };

        let inner = context.not_tail();
        let bool_type = self.primitive(PrimitiveKind::Bool);
        let (left, right, ty) = match operator {
            OperatorType::Logical(_) => {
                let left = self.decorate_expression(left, &inner, Some(&bool_type));
                let right = self.decorate_expression(right, &inner, Some(&bool_type));
                for operand in [&left, &right] {
                    if !compatible(&bool_type, &operand.ty) {
                        self.error(
                            DecorateErrorKind::LogicalOperatorsMustBeBoolean(operand.ty.human_readable()),
                            operand.range,
                        );
                    }
                }
                (left, right, bool_type)
            }
            OperatorType::Boolean(_) => {
                let left = self.decorate_expression(left, &inner, None);
                let right = self.decorate_expression(right, &inner, Some(&left.ty));
                self.check_operands(operator, &left.ty, &right.ty, operator_range);
                (left, right, bool_type)
            }
            OperatorType::Arithmetic(ArithmeticOperator::Cons) => {
                let left = self.decorate_expression(left, &inner, None);
                let list = self.module.primitives.list_of(left.ty.clone());
                let right = self.decorate_expression(right, &inner, Some(&list));
                self.check_operands(operator, &list, &right.ty, operator_range);
                let ty = if is_any(&left.ty) { right.ty.clone() } else { list };
                (left, right, ty)
            }
            _ => {
                let left = self.decorate_expression(left, &inner, None);
                let right = self.decorate_expression(right, &inner, Some(&left.ty));
                self.check_operands(operator, &left.ty, &right.ty, operator_range);
                if is_primitive(&left.ty, PrimitiveKind::Fixed) {
                    operator = match operator {
                        OperatorType::Arithmetic(ArithmeticOperator::Multiply) => {
                            OperatorType::Arithmetic(ArithmeticOperator::FixedMultiply)
                        }
                        OperatorType::Arithmetic(ArithmeticOperator::Divide) => {
                            OperatorType::Arithmetic(ArithmeticOperator::FixedDivide)
                        }
                        other => other,
                    };
                }
                let ty = if is_any(&left.ty) { right.ty.clone() } else { left.ty.clone() };
                (left, right, ty)
            }
        };

        Expression::new(
            ExpressionKind::BinaryOperator {
                operator,
                operator_range,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            range,
        )
    }

    fn check_operands(&mut self, operator: OperatorType, left: &Ty, right: &Ty, operator_range: Range) {
        if compatible(left, right) {
            return;
        }
        self.error(
            DecorateErrorKind::UnMatchingBinaryOperatorTypes {
                operator: operator.symbol().to_string(),
                left: left.human_readable(),
                right: right.human_readable(),
            },
            operator_range,
        );
    }

    pub(super) fn decorate_unary(
        &mut self,
        kind: UnaryOperatorKind,
        operator_range: Range,
        operand: &surface::Expression,
        range: Range,
        context: &Context,
    ) -> Expression {
        let inner = context.not_tail();
        let (operator, operand) = match kind {
            UnaryOperatorKind::Not => {
                let bool_type = self.primitive(PrimitiveKind::Bool);
                let operand = self.decorate_expression(operand, &inner, Some(&bool_type));
                if !compatible(&bool_type, &operand.ty) {
                    self.error(
                        DecorateErrorKind::LogicalOperatorsMustBeBoolean(operand.ty.human_readable()),
                        operand.range,
                    );
                }
                (OperatorType::Logical(LogicalOperator::Not), operand)
            }
            UnaryOperatorKind::Negate => (OperatorType::Negate, self.decorate_expression(operand, &inner, None)),
            UnaryOperatorKind::BitwiseNot => (
                OperatorType::Bitwise(BitwiseOperator::Not),
                self.decorate_expression(operand, &inner, None),
            ),
        };
        let ty = match operator {
            OperatorType::Logical(_) => self.primitive(PrimitiveKind::Bool),
            _ => operand.ty.clone(),
        };
        Expression::new(
            ExpressionKind::UnaryOperator {
                operator,
                operator_range,
                operand: Box::new(operand),
            },
            ty,
            range,
        )
    }
}
