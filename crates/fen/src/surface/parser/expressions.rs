use crate::source::{HasRange, Range};
use crate::syntax;
use crate::token::{KeywordKind, OperatorKind, ParenKind, StringPart, StringToken, Token};

use super::super::ast::*;
use super::{parse_fragment, Parser};

fn binary_operator(kind: OperatorKind) -> Option<BinaryOperatorKind> {
    let operator = match kind {
        OperatorKind::PipeRight => BinaryOperatorKind::PipeRight,
        OperatorKind::PipeLeft => BinaryOperatorKind::PipeLeft,
        OperatorKind::LogicalOr => BinaryOperatorKind::LogicalOr,
        OperatorKind::LogicalAnd => BinaryOperatorKind::LogicalAnd,
        OperatorKind::Equal => BinaryOperatorKind::Equal,
        OperatorKind::NotEqual => BinaryOperatorKind::NotEqual,
        OperatorKind::LessThan => BinaryOperatorKind::Less,
        OperatorKind::LessOrEqual => BinaryOperatorKind::LessOrEqual,
        OperatorKind::GreaterThan => BinaryOperatorKind::Greater,
        OperatorKind::GreaterOrEqual => BinaryOperatorKind::GreaterOrEqual,
        OperatorKind::Cons => BinaryOperatorKind::Cons,
        OperatorKind::Append => BinaryOperatorKind::Append,
        OperatorKind::BitwiseOr => BinaryOperatorKind::BitwiseOr,
        OperatorKind::BitwiseXor => BinaryOperatorKind::BitwiseXor,
        OperatorKind::BitwiseAnd => BinaryOperatorKind::BitwiseAnd,
        OperatorKind::ShiftLeft => BinaryOperatorKind::ShiftLeft,
        OperatorKind::ShiftRight => BinaryOperatorKind::ShiftRight,
        OperatorKind::Plus => BinaryOperatorKind::Plus,
        OperatorKind::Minus => BinaryOperatorKind::Minus,
        OperatorKind::Multiply => BinaryOperatorKind::Multiply,
        OperatorKind::Divide => BinaryOperatorKind::Divide,
        OperatorKind::Remainder => BinaryOperatorKind::Remainder,
        _ => return None,
    };
    Some(operator)
}

fn binary_prec(operator: BinaryOperatorKind) -> u8 {
    match operator {
        BinaryOperatorKind::PipeRight | BinaryOperatorKind::PipeLeft => 1,
        BinaryOperatorKind::LogicalOr => 2,
        BinaryOperatorKind::LogicalAnd => 3,
        BinaryOperatorKind::Equal
        | BinaryOperatorKind::NotEqual
        | BinaryOperatorKind::Less
        | BinaryOperatorKind::LessOrEqual
        | BinaryOperatorKind::Greater
        | BinaryOperatorKind::GreaterOrEqual => 4,
        BinaryOperatorKind::Cons | BinaryOperatorKind::Append => 5,
        BinaryOperatorKind::BitwiseOr => 6,
        BinaryOperatorKind::BitwiseXor => 7,
        BinaryOperatorKind::BitwiseAnd => 8,
        BinaryOperatorKind::ShiftLeft | BinaryOperatorKind::ShiftRight => 9,
        BinaryOperatorKind::Plus | BinaryOperatorKind::Minus => 10,
        BinaryOperatorKind::Multiply
        | BinaryOperatorKind::Divide
        | BinaryOperatorKind::Remainder => 11,
    }
}

fn is_right_associative(operator: BinaryOperatorKind) -> bool {
    matches!(
        operator,
        BinaryOperatorKind::PipeLeft | BinaryOperatorKind::Cons | BinaryOperatorKind::Append
    )
}

fn can_apply(expression: &Expression) -> bool {
    match expression {
        Expression::Constructor { arguments, .. } => arguments.is_empty(),
        Expression::Variable(_)
        | Expression::RecordLookup { .. }
        | Expression::Call { .. }
        | Expression::Lambda { .. } => true,
        _ => false,
    }
}

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Option<Expression> {
        if self.check_operator(OperatorKind::BitwiseOr) {
            return self.parse_guard();
        }
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<Expression> {
        let mut left = self.parse_unary()?;
        loop {
            if self.at_boundary() {
                break;
            }
            let Some(Token::Operator(op)) = self.peek() else {
                break;
            };
            let Some(operator) = binary_operator(op.kind) else {
                break;
            };
            // a `|` opening a line starts the next guard item
            if operator == BinaryOperatorKind::BitwiseOr && self.starts_line(self.pos) {
                break;
            }
            let prec = binary_prec(operator);
            if prec < min_prec {
                break;
            }
            let operator_range = op.source.range;
            self.pos += 1;
            let next_min = if is_right_associative(operator) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary(next_min)?;
            let range = left.range().combine_inclusive(&right.range());
            left = Expression::BinaryOperator {
                operator,
                operator_range,
                left: Box::new(left),
                right: Box::new(right),
                range,
            };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expression> {
        let operator = match self.peek() {
            Some(Token::Operator(op)) => match op.kind {
                OperatorKind::Minus => Some(UnaryOperatorKind::Negate),
                OperatorKind::Not => Some(UnaryOperatorKind::Not),
                OperatorKind::BitwiseNot => Some(UnaryOperatorKind::BitwiseNot),
                _ => None,
            },
            _ => None,
        };
        let Some(operator) = operator else {
            return self.parse_cast();
        };
        self.pos += 1;
        let operator_range = self.previous_range();
        let operand = self.parse_unary()?;
        Some(Expression::UnaryOperator {
            operator,
            operator_range,
            range: operator_range.combine_inclusive(&operand.range()),
            operand: Box::new(operand),
        })
    }

    fn parse_cast(&mut self) -> Option<Expression> {
        let mut expression = self.parse_application()?;
        while !self.at_boundary() && self.check_keyword(KeywordKind::As) {
            let as_keyword = self.consume_keyword(KeywordKind::As)?;
            let Some(target) = self.parse_scoped_type_identifier() else {
                let range = self.peek_range().unwrap_or(as_keyword);
                self.emit_diag("E2004", "expected a type name after 'as'", range);
                return None;
            };
            let range = expression.range().combine_inclusive(&target.range());
            expression = Expression::Cast {
                expression: Box::new(expression),
                as_keyword,
                target,
                range,
            };
        }
        Some(expression)
    }

    fn parse_application(&mut self) -> Option<Expression> {
        match self.peek() {
            Some(Token::Keyword(keyword)) => match keyword.kind {
                KeywordKind::If => return self.parse_if(),
                KeywordKind::Let => return self.parse_let(),
                KeywordKind::Case => return self.parse_case(),
                _ => {}
            },
            Some(Token::Operator(op)) if op.kind == OperatorKind::Lambda => {
                return self.parse_lambda();
            }
            Some(Token::VariableSymbol(symbol)) if symbol.raw == syntax::EXTERNAL_FN_INTRODUCER => {
                return self.parse_external_function();
            }
            _ => {}
        }

        let head = self.parse_postfix()?;
        if !can_apply(&head) {
            return Some(head);
        }
        let mut arguments = Vec::new();
        while !self.at_boundary() && self.starts_atom() {
            arguments.push(self.parse_postfix()?);
        }
        let Some(last) = arguments.last() else {
            return Some(head);
        };
        let range = head.range().combine_inclusive(&last.range());
        match head {
            Expression::Constructor { name, .. } => Some(Expression::Constructor {
                name,
                arguments,
                range,
            }),
            function => Some(Expression::Call {
                function: Box::new(function),
                arguments,
                range,
            }),
        }
    }

    fn starts_atom(&self) -> bool {
        match self.peek() {
            Some(Token::Number(_))
            | Some(Token::Boolean(_))
            | Some(Token::Character(_))
            | Some(Token::String(_))
            | Some(Token::ResourceName(_))
            | Some(Token::TypeId(_))
            | Some(Token::TypeSymbol(_))
            | Some(Token::Asm(_)) => true,
            Some(Token::VariableSymbol(symbol)) => symbol.raw != syntax::EXTERNAL_FN_INTRODUCER,
            Some(Token::Paren(paren)) => matches!(
                paren.kind,
                ParenKind::LeftParen
                    | ParenKind::LeftCurly
                    | ParenKind::LeftBracket
                    | ParenKind::LeftArrayBracket
            ),
            _ => false,
        }
    }

    fn parse_postfix(&mut self) -> Option<Expression> {
        let base = self.parse_atom()?;
        let mut lookups = Vec::new();
        while self.adjacent_dot_then(|token| matches!(token, Token::VariableSymbol(_))) {
            self.pos += 1;
            if let Some(field) = self.consume_variable() {
                lookups.push(field);
            }
        }
        let Some(last) = lookups.last() else {
            return Some(base);
        };
        let range = base.range().combine_inclusive(&last.range);
        Some(Expression::RecordLookup {
            base: Box::new(base),
            lookups,
            range,
        })
    }

    fn parse_atom(&mut self) -> Option<Expression> {
        let Some(token) = self.peek().cloned() else {
            let range = self.previous_range();
            self.emit_diag("E2002", "expected an expression", range);
            return None;
        };
        match token {
            Token::Number(number) => {
                self.pos += 1;
                let range = number.source.range;
                if number.is_fixed {
                    Some(Expression::Fixed {
                        value: number.value,
                        range,
                    })
                } else {
                    Some(Expression::Integer {
                        value: number.value,
                        range,
                    })
                }
            }
            Token::Boolean(boolean) => {
                self.pos += 1;
                Some(Expression::Bool {
                    value: boolean.value,
                    range: boolean.source.range,
                })
            }
            Token::Character(character) => {
                self.pos += 1;
                Some(Expression::Character {
                    value: character.value,
                    range: character.source.range,
                })
            }
            Token::String(string) => {
                self.pos += 1;
                Some(self.string_expression(string))
            }
            Token::ResourceName(resource) => {
                self.pos += 1;
                Some(Expression::ResourceName {
                    name: resource.name().to_string(),
                    range: resource.source.range,
                })
            }
            Token::TypeId(type_id) => {
                self.pos += 1;
                Some(Expression::TypeId {
                    name: ScopedTypeIdentifier {
                        module: None,
                        identifier: TypeIdentifier {
                            name: type_id.type_symbol.raw.clone(),
                            range: type_id.type_symbol.source.range,
                        },
                    },
                    range: type_id.source.range,
                })
            }
            Token::Asm(asm) => {
                self.pos += 1;
                Some(Expression::Asm {
                    text: asm.text,
                    range: asm.source.range,
                })
            }
            Token::VariableSymbol(_) => {
                let identifier = self.consume_variable()?;
                Some(Expression::Variable(ScopedVariableIdentifier {
                    module: None,
                    identifier,
                }))
            }
            Token::TypeSymbol(_) => {
                let path = self.parse_module_path()?;
                if self.adjacent_dot_then(|token| matches!(token, Token::VariableSymbol(_))) {
                    self.pos += 1;
                    let identifier = self.consume_variable()?;
                    return Some(Expression::Variable(ScopedVariableIdentifier {
                        module: Some(path),
                        identifier,
                    }));
                }
                let mut parts = path.parts;
                let identifier = parts.pop()?;
                let module = if parts.is_empty() {
                    None
                } else {
                    let range = parts[0].range.combine_inclusive(&parts[parts.len() - 1].range);
                    Some(ModuleReference { parts, range })
                };
                let name = ScopedTypeIdentifier { module, identifier };
                Some(Expression::Constructor {
                    range: name.range(),
                    name,
                    arguments: Vec::new(),
                })
            }
            Token::Paren(paren) => match paren.kind {
                ParenKind::LeftParen => self.parse_parenthesized(paren.source.range),
                ParenKind::LeftBracket => self
                    .parse_sequence(paren.source.range, ParenKind::RightBracket)
                    .map(|(items, range)| Expression::List { items, range }),
                ParenKind::LeftArrayBracket => self
                    .parse_sequence(paren.source.range, ParenKind::RightArrayBracket)
                    .map(|(items, range)| Expression::Array { items, range }),
                ParenKind::LeftCurly => self.parse_record_literal(paren.source.range),
                _ => {
                    self.emit_diag(
                        "E2002",
                        &format!("expected an expression, found '{}'", paren.kind.as_str()),
                        paren.source.range,
                    );
                    None
                }
            },
            other => {
                let range = other.range();
                self.emit_diag(
                    "E2002",
                    &format!("expected an expression, found '{other}'"),
                    range,
                );
                None
            }
        }
    }

    fn string_expression(&mut self, token: StringToken) -> Expression {
        if !token.is_interpolated() {
            return Expression::String(token);
        }
        let indentation = token.source.range.indentation;
        let mut parts = Vec::new();
        for part in &token.parts {
            match part {
                StringPart::Text { text, ranges } => parts.push(InterpolationPart::Text {
                    text: text.clone(),
                    ranges: ranges.clone(),
                }),
                StringPart::Expression { source, start } => {
                    let (expression, mut diagnostics) =
                        parse_fragment(source, &self.document, *start, indentation);
                    self.diagnostics.append(&mut diagnostics);
                    if let Some(expression) = expression {
                        parts.push(InterpolationPart::Expression(expression));
                    }
                }
            }
        }
        Expression::StringInterpolation { token, parts }
    }

    fn parse_parenthesized(&mut self, start: Range) -> Option<Expression> {
        self.pos += 1;
        self.with_block(0, |parser| {
            if let Some(end) = parser.consume_paren(ParenKind::RightParen) {
                parser.emit_diag(
                    "E2008",
                    "empty parentheses are not an expression",
                    start.combine_inclusive(&end),
                );
                return None;
            }
            let mut items = Vec::new();
            loop {
                items.push(parser.parse_expression()?);
                if parser.consume_operator(OperatorKind::Comma).is_none() {
                    break;
                }
            }
            let end = parser.expect_paren(ParenKind::RightParen, "expected ')'")?;
            if items.len() == 1 {
                return items.pop();
            }
            Some(Expression::Tuple {
                items,
                range: start.combine_inclusive(&end),
            })
        })
    }

    fn parse_sequence(&mut self, start: Range, close: ParenKind) -> Option<(Vec<Expression>, Range)> {
        self.pos += 1;
        self.with_block(0, |parser| {
            let mut items = Vec::new();
            while !parser.check_paren(close) {
                items.push(parser.parse_expression()?);
                if parser.consume_operator(OperatorKind::Comma).is_none() {
                    break;
                }
            }
            let end = parser.expect_paren(close, &format!("expected '{}'", close.as_str()))?;
            Some((items, start.combine_inclusive(&end)))
        })
    }

    fn parse_record_literal(&mut self, start: Range) -> Option<Expression> {
        self.pos += 1;
        self.with_block(0, |parser| {
            let template_follows = matches!(parser.peek(), Some(Token::VariableSymbol(_)))
                && matches!(parser.peek_at(1), Some(Token::Operator(op)) if op.kind == OperatorKind::BitwiseOr);
            let template = if template_follows {
                let identifier = parser.consume_variable()?;
                parser.pos += 1;
                Some(Box::new(Expression::Variable(ScopedVariableIdentifier {
                    module: None,
                    identifier,
                })))
            } else {
                None
            };

            let mut fields = Vec::new();
            while !parser.check_paren(ParenKind::RightCurly) {
                let Some(name) = parser.consume_variable() else {
                    let range = parser.peek_range().unwrap_or(start);
                    parser.emit_diag("E2004", "expected a field name", range);
                    return None;
                };
                parser.expect_operator(OperatorKind::Assign, "expected '=' after field name")?;
                let expression = parser.parse_expression()?;
                fields.push(RecordLiteralField { name, expression });
                if parser.consume_operator(OperatorKind::Comma).is_none() {
                    break;
                }
            }
            let end = parser.expect_paren(ParenKind::RightCurly, "expected '}' in record")?;
            Some(Expression::Record(RecordLiteral::new(
                template,
                fields,
                start.combine_inclusive(&end),
            )))
        })
    }

    fn parse_if(&mut self) -> Option<Expression> {
        let if_keyword = self.expect_keyword(KeywordKind::If, "expected 'if'")?;
        let condition = self.parse_expression()?;
        let then_keyword = self.expect_keyword(KeywordKind::Then, "expected 'then'")?;
        let consequence = self.parse_expression()?;
        let else_keyword = self.expect_keyword(KeywordKind::Else, "expected 'else'")?;
        let alternative = self.parse_expression()?;
        Some(Expression::If {
            range: if_keyword.combine_inclusive(&alternative.range()),
            if_keyword,
            condition: Box::new(condition),
            then_keyword,
            consequence: Box::new(consequence),
            else_keyword,
            alternative: Box::new(alternative),
        })
    }

    fn parse_let(&mut self) -> Option<Expression> {
        let let_keyword = self.expect_keyword(KeywordKind::Let, "expected 'let'")?;
        let assign_column = self.peek_range().map(|range| range.start.column).unwrap_or(0);
        let mut assignments = Vec::new();
        while !self.check_keyword(KeywordKind::In) {
            if !assignments.is_empty()
                && (!self.starts_line(self.pos)
                    || self.peek_range().map(|range| range.start.column) != Some(assign_column))
            {
                let range = self.peek_range().unwrap_or(let_keyword);
                self.emit_diag("E2005", "expected 'in' after let assignments", range);
                return None;
            }
            let target = if let Some(name) = self.consume_variable() {
                LetTarget::Single(name)
            } else if let Some(open) = self.consume_paren(ParenKind::LeftCurly) {
                let mut names = Vec::new();
                loop {
                    let Some(name) = self.consume_variable() else {
                        let range = self.peek_range().unwrap_or(open);
                        self.emit_diag("E2004", "expected a field name to destructure", range);
                        return None;
                    };
                    names.push(name);
                    if self.consume_operator(OperatorKind::Comma).is_none() {
                        break;
                    }
                }
                let close = self.expect_paren(ParenKind::RightCurly, "expected '}'")?;
                LetTarget::Record {
                    names,
                    range: open.combine_inclusive(&close),
                }
            } else {
                let range = self.peek_range().unwrap_or(let_keyword);
                self.emit_diag("E2004", "expected a name in let assignment", range);
                return None;
            };
            self.expect_operator(OperatorKind::Assign, "expected '=' in let assignment")?;
            let expression = self.with_block(assign_column, Self::parse_expression)?;
            assignments.push(LetAssignment { target, expression });
        }
        if assignments.is_empty() {
            self.emit_diag(
                "E2005",
                "let requires at least one assignment",
                let_keyword,
            );
        }
        let in_keyword = self.expect_keyword(KeywordKind::In, "expected 'in'")?;
        let body = self.parse_expression()?;
        Some(Expression::Let {
            range: let_keyword.combine_inclusive(&body.range()),
            let_keyword,
            assignments,
            in_keyword,
            body: Box::new(body),
        })
    }

    fn parse_case(&mut self) -> Option<Expression> {
        let case_keyword = self.expect_keyword(KeywordKind::Case, "expected 'case'")?;
        let test = self.parse_expression()?;
        let of_keyword = self.expect_keyword(KeywordKind::Of, "expected 'of'")?;

        let mut custom = Vec::new();
        let mut patterns = Vec::new();
        let mut default = None;
        let mut end = of_keyword;

        if !self.at_boundary() {
            let enclosing = self.block_column();
            let arm_column = self.peek_range().map(|range| range.start.column).unwrap_or(0);
            let mut first = true;
            loop {
                if !first {
                    let continues = self.starts_line(self.pos)
                        && self.peek_range().map(|range| range.start.column) == Some(arm_column)
                        && arm_column > enclosing;
                    if !continues {
                        break;
                    }
                }
                first = false;
                let arm = self.with_block(arm_column, Self::parse_case_arm)?;
                match arm {
                    CaseArm::Custom(consequence) => {
                        end = consequence.expression.range();
                        custom.push(consequence);
                    }
                    CaseArm::Pattern(consequence) => {
                        end = consequence.expression.range();
                        patterns.push(consequence);
                    }
                    CaseArm::Default(arm) => {
                        end = arm.expression.range();
                        default = Some(arm);
                    }
                }
            }
        }

        let range = case_keyword.combine_inclusive(&end);
        if !custom.is_empty() && !patterns.is_empty() {
            self.emit_diag(
                "E2009",
                "a case cannot mix variant patterns and literal patterns",
                patterns[0].pattern.range(),
            );
        }
        if custom.is_empty() && (!patterns.is_empty() || default.is_some()) {
            return Some(Expression::CasePattern {
                case_keyword,
                test: Box::new(test),
                of_keyword,
                consequences: patterns,
                default,
                range,
            });
        }
        Some(Expression::CaseCustomType {
            case_keyword,
            test: Box::new(test),
            of_keyword,
            consequences: custom,
            default,
            range,
        })
    }

    fn parse_case_arm(&mut self) -> Option<CaseArm> {
        if let Some(underscore) = self.consume_ignore_before_arrow() {
            let arrow = self.expect_operator(OperatorKind::Arrow, "expected '->'")?;
            let expression = self.parse_expression()?;
            return Some(CaseArm::Default(CaseDefault {
                underscore,
                arrow,
                expression: Box::new(expression),
            }));
        }

        if matches!(self.peek(), Some(Token::TypeSymbol(_))) {
            let variant = self.parse_scoped_type_identifier()?;
            let mut parameters = Vec::new();
            while let Some(parameter) = self.consume_variable() {
                parameters.push(parameter);
            }
            let arrow = self.expect_operator(OperatorKind::Arrow, "expected '->' after pattern")?;
            let expression = self.parse_expression()?;
            return Some(CaseArm::Custom(CaseCustomConsequence {
                variant,
                parameters,
                arrow,
                expression,
            }));
        }

        let pattern = self.parse_literal_pattern()?;
        let arrow = self.expect_operator(OperatorKind::Arrow, "expected '->' after pattern")?;
        let expression = self.parse_expression()?;
        Some(CaseArm::Pattern(CasePatternConsequence {
            pattern,
            arrow,
            expression,
        }))
    }

    fn parse_literal_pattern(&mut self) -> Option<Expression> {
        if let Some(minus) = self.consume_operator(OperatorKind::Minus) {
            let Some(Token::Number(number)) = self.peek().cloned() else {
                self.emit_diag("E2007", "expected a number after '-' in pattern", minus);
                return None;
            };
            self.pos += 1;
            let range = minus.combine_inclusive(&number.source.range);
            let value = -number.value;
            return Some(if number.is_fixed {
                Expression::Fixed { value, range }
            } else {
                Expression::Integer { value, range }
            });
        }
        let pattern = self.parse_atom()?;
        if !pattern.is_literal_pattern() {
            self.emit_diag(
                "E2007",
                "case patterns must be a variant, a literal or '_'",
                pattern.range(),
            );
            return None;
        }
        Some(pattern)
    }

    fn consume_ignore_before_arrow(&mut self) -> Option<Range> {
        let Some(Token::VariableSymbol(symbol)) = self.peek() else {
            return None;
        };
        if symbol.raw != syntax::IGNORE_SYMBOL {
            return None;
        }
        if !matches!(self.peek_at(1), Some(Token::Operator(op)) if op.kind == OperatorKind::Arrow) {
            return None;
        }
        let range = symbol.source.range;
        self.pos += 1;
        Some(range)
    }

    fn parse_guard(&mut self) -> Option<Expression> {
        let start = self.peek_range()?;
        let enclosing = self.block_column();
        let mut items = Vec::new();
        let mut default = None;
        let mut end = start;
        loop {
            if !items.is_empty() {
                let continues = self.check_operator(OperatorKind::BitwiseOr)
                    && self.starts_line(self.pos)
                    && self
                        .peek_range()
                        .is_some_and(|range| range.start.column > enclosing);
                if !continues {
                    break;
                }
            }
            let bar = self.expect_operator(OperatorKind::BitwiseOr, "expected '|'")?;
            let item_column = bar.start.column;
            if let Some(underscore) = self.consume_ignore_before_arrow() {
                let arrow = self.expect_operator(OperatorKind::Arrow, "expected '->'")?;
                let expression = self.with_block(item_column, Self::parse_expression)?;
                end = expression.range();
                default = Some(GuardDefault {
                    bar,
                    underscore,
                    arrow,
                    expression: Box::new(expression),
                });
                break;
            }
            let condition = self.with_block(item_column, |parser| parser.parse_binary(1))?;
            let arrow = self.expect_operator(OperatorKind::Arrow, "expected '->' in guard")?;
            let consequence = self.with_block(item_column, Self::parse_expression)?;
            end = consequence.range();
            items.push(GuardItem {
                bar,
                condition,
                arrow,
                consequence,
            });
        }
        Some(Expression::Guard {
            items,
            default,
            range: start.combine_inclusive(&end),
        })
    }

    fn parse_lambda(&mut self) -> Option<Expression> {
        let backslash = self.expect_operator(OperatorKind::Lambda, "expected '\\'")?;
        let mut parameters = Vec::new();
        while let Some(parameter) = self.consume_variable() {
            parameters.push(parameter);
        }
        if parameters.is_empty() {
            let range = self.peek_range().unwrap_or(backslash);
            self.emit_diag("E2004", "a lambda needs at least one parameter", range);
            return None;
        }
        let arrow = self.expect_operator(OperatorKind::Arrow, "expected '->' in lambda")?;
        let body = self.parse_expression()?;
        Some(Expression::Lambda {
            range: backslash.combine_inclusive(&body.range()),
            backslash,
            parameters,
            arrow,
            body: Box::new(body),
        })
    }

    fn parse_external_function(&mut self) -> Option<Expression> {
        let keyword = self.consume_variable()?.range;
        let Some(Token::String(name)) = self.peek().cloned() else {
            self.emit_diag("E2005", "expected the external function name", keyword);
            return None;
        };
        self.pos += 1;
        let Some(Token::Number(arity)) = self.peek().cloned() else {
            self.emit_diag("E2005", "expected the external function arity", name.source.range);
            return None;
        };
        self.pos += 1;
        Some(Expression::ExternalFunction {
            keyword,
            name: name.text,
            name_range: name.source.range,
            arity: arity.value,
            arity_range: arity.source.range,
            range: keyword.combine_inclusive(&arity.source.range),
        })
    }
}

enum CaseArm {
    Custom(CaseCustomConsequence),
    Pattern(CasePatternConsequence),
    Default(CaseDefault),
}
