use crate::source::HasRange;
use crate::token::{OperatorKind, ParenKind, Token};

use super::super::ast::*;
use super::Parser;

const UNMANAGED: &str = "Unmanaged";

impl Parser {
    pub(super) fn parse_type(&mut self) -> Option<TypeExpr> {
        let first = self.parse_type_application()?;
        let mut parts = vec![first];
        while !self.at_boundary() && self.consume_operator(OperatorKind::Arrow).is_some() {
            parts.push(self.parse_type_application()?);
        }
        if parts.len() == 1 {
            return parts.pop();
        }
        let range = parts[0].range().combine_inclusive(&parts[parts.len() - 1].range());
        Some(TypeExpr::Function { parts, range })
    }

    fn parse_type_application(&mut self) -> Option<TypeExpr> {
        if !matches!(self.peek(), Some(Token::TypeSymbol(_))) {
            return self.parse_type_atom();
        }
        let head = self.parse_type_atom()?;
        let TypeExpr::Reference {
            name,
            mut arguments,
            range,
        } = head
        else {
            return Some(head);
        };
        while !self.at_boundary() && self.starts_type_atom() {
            arguments.push(self.parse_type_atom()?);
        }
        let range = arguments
            .last()
            .map(|argument| range.combine_inclusive(&argument.range()))
            .unwrap_or(range);
        Some(TypeExpr::Reference {
            name,
            arguments,
            range,
        })
    }

    pub(super) fn starts_type_atom(&self) -> bool {
        match self.peek() {
            Some(Token::TypeSymbol(_)) | Some(Token::VariableSymbol(_)) => true,
            Some(Token::Operator(op)) => op.kind == OperatorKind::Multiply,
            Some(Token::Paren(paren)) => {
                matches!(paren.kind, ParenKind::LeftParen | ParenKind::LeftCurly)
            }
            _ => false,
        }
    }

    pub(super) fn parse_type_atom(&mut self) -> Option<TypeExpr> {
        let Some(token) = self.peek().cloned() else {
            let range = self.previous_range();
            self.emit_diag("E2003", "expected a type", range);
            return None;
        };
        match token {
            Token::TypeSymbol(symbol) if symbol.raw == UNMANAGED => {
                self.pos += 1;
                let keyword = TypeIdentifier {
                    name: symbol.raw.clone(),
                    range: symbol.source.range,
                };
                if self.consume_operator(OperatorKind::LessThan).is_none() {
                    return Some(TypeExpr::Reference {
                        range: keyword.range,
                        name: ScopedTypeIdentifier {
                            module: None,
                            identifier: keyword,
                        },
                        arguments: Vec::new(),
                    });
                }
                let name = self.expect_type_symbol("expected a host type name")?;
                let end = self.expect_operator(OperatorKind::GreaterThan, "expected '>'")?;
                Some(TypeExpr::Unmanaged {
                    range: keyword.range.combine_inclusive(&end),
                    keyword,
                    name,
                })
            }
            Token::TypeSymbol(_) => {
                let name = self.parse_scoped_type_identifier()?;
                Some(TypeExpr::Reference {
                    range: name.range(),
                    name,
                    arguments: Vec::new(),
                })
            }
            Token::VariableSymbol(_) => self.consume_variable().map(TypeExpr::Local),
            Token::Operator(op) if op.kind == OperatorKind::Multiply => {
                self.pos += 1;
                Some(TypeExpr::AnyMatching(op.source.range))
            }
            Token::Paren(paren) if paren.kind == ParenKind::LeftParen => {
                self.pos += 1;
                let start = paren.source.range;
                self.with_block(0, |parser| {
                    let mut items = Vec::new();
                    loop {
                        items.push(parser.parse_type()?);
                        if parser.consume_operator(OperatorKind::Comma).is_none() {
                            break;
                        }
                    }
                    let end = parser.expect_paren(ParenKind::RightParen, "expected ')' in type")?;
                    if items.len() == 1 {
                        return items.pop();
                    }
                    Some(TypeExpr::Tuple {
                        items,
                        range: start.combine_inclusive(&end),
                    })
                })
            }
            Token::Paren(paren) if paren.kind == ParenKind::LeftCurly => {
                self.pos += 1;
                let start = paren.source.range;
                self.with_block(0, |parser| {
                    let mut fields = Vec::new();
                    while !parser.check_paren(ParenKind::RightCurly) {
                        let Some(name) = parser.consume_variable() else {
                            let range = parser.peek_range().unwrap_or(start);
                            parser.emit_diag("E2004", "expected a field name", range);
                            return None;
                        };
                        parser.expect_operator(OperatorKind::Colon, "expected ':' after field name")?;
                        let type_expr = parser.parse_type()?;
                        fields.push(RecordTypeField { name, type_expr });
                        if parser.consume_operator(OperatorKind::Comma).is_none() {
                            break;
                        }
                    }
                    let end =
                        parser.expect_paren(ParenKind::RightCurly, "expected '}' in record type")?;
                    Some(TypeExpr::Record {
                        fields,
                        range: start.combine_inclusive(&end),
                    })
                })
            }
            other => {
                let range = other.range();
                self.emit_diag("E2003", &format!("expected a type, found '{other}'"), range);
                None
            }
        }
    }
}
