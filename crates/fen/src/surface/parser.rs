use crate::diagnostics::Diagnostic;
use crate::lexer::{lex, lex_fragment};
use crate::source::{DocumentUri, HasRange, Position, Range};
use crate::syntax;
use crate::token::{KeywordKind, OperatorKind, ParenKind, Token};

use super::ast::*;

mod expressions;
mod types;

#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub module: SourceModule,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lexes and parses a whole document. Lexer diagnostics come first.
pub fn parse_source(text: &str, document: &DocumentUri) -> ParseResult {
    let lexed = lex(text, document);
    let mut result = parse(lexed.tokens, document);
    let mut diagnostics = lexed.diagnostics;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;
    result
}

pub fn parse(tokens: Vec<Token>, document: &DocumentUri) -> ParseResult {
    let (comments, tokens): (Vec<Token>, Vec<Token>) =
        tokens.into_iter().partition(Token::is_comment);
    let mut parser = Parser::new(tokens, document);
    let statements = parser.parse_statements();
    ParseResult {
        module: SourceModule {
            statements,
            comments: comments.iter().filter_map(comment_from_token).collect(),
        },
        diagnostics: parser.diagnostics,
    }
}

/// Parses the source of a `${…}` interpolation into one expression.
pub(crate) fn parse_fragment(
    source: &str,
    document: &DocumentUri,
    start: Position,
    indentation: usize,
) -> (Option<Expression>, Vec<Diagnostic>) {
    let lexed = lex_fragment(source, document, start, indentation);
    let tokens: Vec<Token> = lexed
        .tokens
        .into_iter()
        .filter(|token| !token.is_comment())
        .collect();
    let mut diagnostics = lexed.diagnostics;
    if tokens.is_empty() {
        diagnostics.push(Diagnostic::error(
            "E2010",
            "string interpolation must contain an expression",
            Range::single_line(start.line, start.column.saturating_sub(2), 2),
        ));
        return (None, diagnostics);
    }
    let mut parser = Parser::new(tokens, document);
    parser.block_columns.push(0);
    let expression = parser.parse_expression();
    if let Some(token) = parser.peek() {
        let range = token.range();
        parser.emit_diag(
            "E2010",
            "string interpolation must contain exactly one expression",
            range,
        );
    }
    diagnostics.append(&mut parser.diagnostics);
    (expression, diagnostics)
}

fn comment_from_token(token: &Token) -> Option<Comment> {
    match token {
        Token::SingleLineComment(comment) => Some(Comment {
            text: comment.text.clone(),
            for_doc: comment.for_doc,
            ranges: vec![comment.source.range],
        }),
        Token::MultiLineComment(comment) => Some(Comment {
            text: comment.text(),
            for_doc: comment.for_doc,
            ranges: comment.parts.iter().map(|part| part.source.range).collect(),
        }),
        _ => None,
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    document: DocumentUri,
    /// Layout columns of the enclosing blocks; a token that starts a line at
    /// or left of the innermost column ends the current expression.
    block_columns: Vec<usize>,
}

impl Parser {
    fn new(tokens: Vec<Token>, document: &DocumentUri) -> Self {
        Self {
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            document: document.clone(),
            block_columns: Vec::new(),
        }
    }

    fn parse_statements(&mut self) -> Vec<Statement> {
        let mut statements: Vec<Statement> = Vec::new();
        while self.pos < self.tokens.len() {
            let loop_start = self.pos;
            let Some(token) = self.peek() else {
                break;
            };
            let range = token.range();
            if range.start.column != 0 || !self.starts_line(self.pos) {
                self.emit_diag(
                    "E2001",
                    "top-level statements must start at column 0",
                    range,
                );
                self.recover_to_statement();
                continue;
            }

            self.block_columns.push(0);
            let statement = self.parse_statement(statements.last());
            self.block_columns.pop();

            match statement {
                Some(statement) => {
                    statements.push(statement);
                    let trailing = self
                        .peek()
                        .filter(|token| {
                            !self.starts_line(self.pos) || token.range().start.column != 0
                        })
                        .map(|token| (format!("unexpected '{token}'"), token.range()));
                    if let Some((message, range)) = trailing {
                        self.emit_diag("E2001", &message, range);
                        self.recover_to_statement();
                    }
                }
                None => self.recover_to_statement(),
            }

            if self.pos == loop_start {
                self.pos += 1;
            }
        }
        statements
    }

    fn parse_statement(&mut self, previous: Option<&Statement>) -> Option<Statement> {
        let token = self.peek()?.clone();
        match &token {
            Token::Keyword(keyword) if keyword.kind == KeywordKind::Import => {
                self.parse_import().map(Statement::Import)
            }
            Token::Keyword(keyword) if keyword.kind == KeywordKind::Type => {
                self.parse_type_statement()
            }
            Token::VariableSymbol(symbol)
                if symbol.raw == syntax::DATA_INTRODUCER
                    && matches!(self.peek_at(1), Some(Token::TypeSymbol(_))) =>
            {
                self.pos += 1;
                self.parse_custom_type(symbol.source.range)
                    .map(Statement::CustomType)
            }
            Token::VariableSymbol(_) => {
                if matches!(self.peek_at(1), Some(Token::Operator(op)) if op.kind == OperatorKind::Colon)
                {
                    self.parse_annotation().map(Statement::Annotation)
                } else {
                    self.parse_definition(previous)
                }
            }
            other => {
                let range = other.range();
                self.emit_diag(
                    "E2000",
                    &format!("expected a statement, found '{other}'"),
                    range,
                );
                None
            }
        }
    }

    fn parse_import(&mut self) -> Option<ImportStatement> {
        let keyword = self.expect_keyword(KeywordKind::Import, "expected 'import'")?;
        let Some(path) = self.parse_module_path() else {
            let range = self.peek_range().unwrap_or(keyword);
            self.emit_diag("E2004", "expected a module name after 'import'", range);
            return None;
        };
        let mut end = path.range;

        let mut alias = None;
        if let Some(as_keyword) = self.consume_keyword(KeywordKind::As) {
            let Some(name) = self.consume_type_symbol() else {
                let range = self.peek_range().unwrap_or(as_keyword);
                self.emit_diag("E2004", "expected a module alias after 'as'", range);
                return None;
            };
            end = name.range;
            alias = Some((as_keyword, name));
        }

        let mut exposing = None;
        if let Some(keyword) = self.consume_keyword(KeywordKind::Exposing) {
            self.expect_paren(ParenKind::LeftParen, "expected '(' after 'exposing'")?;
            let mut items = Vec::new();
            let mut everything = None;
            loop {
                if let Some(range) = self.consume_dot_dot() {
                    everything = Some(range);
                } else if let Some(name) = self.consume_variable() {
                    items.push(ExposedItem::Variable(name));
                } else if let Some(name) = self.consume_type_symbol() {
                    let with_variants = if self.check_paren(ParenKind::LeftParen) {
                        self.pos += 1;
                        self.consume_dot_dot();
                        self.expect_paren(ParenKind::RightParen, "expected ')'")?;
                        true
                    } else {
                        false
                    };
                    items.push(ExposedItem::Type {
                        name,
                        with_variants,
                    });
                } else {
                    let range = self.peek_range().unwrap_or(keyword);
                    self.emit_diag("E2004", "expected a name in the exposing list", range);
                    return None;
                }
                if self.consume_operator(OperatorKind::Comma).is_none() {
                    break;
                }
            }
            end = self.expect_paren(ParenKind::RightParen, "expected ')' to close the exposing list")?;
            exposing = Some(ExposingClause {
                keyword,
                items,
                everything,
            });
        }

        Some(ImportStatement {
            keyword,
            path,
            alias,
            exposing,
            range: keyword.combine_inclusive(&end),
        })
    }

    fn parse_type_statement(&mut self) -> Option<Statement> {
        let type_keyword = self.expect_keyword(KeywordKind::Type, "expected 'type'")?;
        if let Some(alias_keyword) = self.consume_keyword(KeywordKind::Alias) {
            let name = self.expect_type_symbol("expected a type name after 'type alias'")?;
            let parameters = self.parse_type_parameters();
            self.expect_operator(OperatorKind::Assign, "expected '=' in type alias")?;
            let definition = self.parse_type()?;
            let range = type_keyword.combine_inclusive(&definition.range());
            return Some(Statement::Alias(AliasStatement {
                type_keyword,
                alias_keyword: Some(alias_keyword),
                name,
                parameters,
                definition,
                range,
            }));
        }

        let record_alias = matches!(self.peek_at(1), Some(Token::Operator(op)) if op.kind == OperatorKind::Assign)
            && matches!(self.peek_at(2), Some(Token::Paren(paren)) if paren.kind == ParenKind::LeftCurly);
        if record_alias {
            let name = self.expect_type_symbol("expected a type name after 'type'")?;
            self.expect_operator(OperatorKind::Assign, "expected '='")?;
            let definition = self.parse_type()?;
            let range = type_keyword.combine_inclusive(&definition.range());
            return Some(Statement::Alias(AliasStatement {
                type_keyword,
                alias_keyword: None,
                name,
                parameters: Vec::new(),
                definition,
                range,
            }));
        }

        self.parse_custom_type(type_keyword)
            .map(Statement::CustomType)
    }

    fn parse_custom_type(&mut self, keyword: Range) -> Option<CustomTypeStatement> {
        let name = self.expect_type_symbol("expected a type name")?;
        let parameters = self.parse_type_parameters();
        self.expect_operator(OperatorKind::Assign, "expected '=' in custom type")?;
        let mut variants = Vec::new();
        loop {
            let variant_name = self.expect_type_symbol("expected a variant name")?;
            let mut parameters = Vec::new();
            while !self.at_boundary() && self.starts_type_atom() {
                parameters.push(self.parse_type_atom()?);
            }
            let end = parameters
                .last()
                .map(|parameter| parameter.range())
                .unwrap_or(variant_name.range);
            variants.push(VariantDefinition {
                range: variant_name.range.combine_inclusive(&end),
                name: variant_name,
                parameters,
            });
            if self.at_boundary() || self.consume_operator(OperatorKind::BitwiseOr).is_none() {
                break;
            }
        }
        let end = variants
            .last()
            .map(|variant| variant.range)
            .unwrap_or(name.range);
        Some(CustomTypeStatement {
            keyword,
            range: keyword.combine_inclusive(&end),
            name,
            parameters,
            variants,
        })
    }

    fn parse_type_parameters(&mut self) -> Vec<VariableIdentifier> {
        let mut parameters = Vec::new();
        while !self.at_boundary() {
            match self.consume_variable() {
                Some(parameter) => parameters.push(parameter),
                None => break,
            }
        }
        parameters
    }

    fn parse_annotation(&mut self) -> Option<Annotation> {
        let name = self.consume_variable()?;
        let colon = self.expect_operator(OperatorKind::Colon, "expected ':'")?;
        let type_expr = self.parse_type()?;
        Some(Annotation {
            range: name.range.combine_inclusive(&type_expr.range()),
            name,
            colon,
            type_expr,
        })
    }

    fn parse_definition(&mut self, previous: Option<&Statement>) -> Option<Statement> {
        let name = self.consume_variable()?;
        let mut parameters = Vec::new();
        while let Some(parameter) = self.consume_variable() {
            parameters.push(parameter);
        }
        self.expect_operator(OperatorKind::Assign, "expected '=' in definition")?;
        let expression = self.parse_expression()?;
        let range = name.range.combine_inclusive(&expression.range());

        let annotated = matches!(
            previous,
            Some(Statement::Annotation(annotation)) if annotation.name.name == name.name
        );
        if parameters.is_empty() && !annotated {
            return Some(Statement::Constant(ConstantDefinition {
                name,
                expression,
                range,
            }));
        }
        Some(Statement::Definition(Definition {
            name,
            parameters,
            expression,
            range,
        }))
    }

    /// `A.B.C` with adjacent dots.
    fn parse_module_path(&mut self) -> Option<ModuleReference> {
        let first = self.consume_type_symbol()?;
        let mut parts = vec![first];
        while self.adjacent_dot_then(|token| matches!(token, Token::TypeSymbol(_))) {
            self.pos += 1;
            if let Some(part) = self.consume_type_symbol() {
                parts.push(part);
            }
        }
        let range = parts[0].range.combine_inclusive(&parts[parts.len() - 1].range);
        Some(ModuleReference { parts, range })
    }

    /// Parses `A.B.Name` (type identifier with optional module prefix).
    fn parse_scoped_type_identifier(&mut self) -> Option<ScopedTypeIdentifier> {
        let path = self.parse_module_path()?;
        let mut parts = path.parts;
        let identifier = parts.pop()?;
        let module = if parts.is_empty() {
            None
        } else {
            let range = parts[0].range.combine_inclusive(&parts[parts.len() - 1].range);
            Some(ModuleReference { parts, range })
        };
        Some(ScopedTypeIdentifier { module, identifier })
    }

    // ---- token helpers ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_range(&self) -> Option<Range> {
        self.peek().map(HasRange::range)
    }

    fn previous_range(&self) -> Range {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(HasRange::range)
            .unwrap_or_default()
    }

    fn starts_line(&self, index: usize) -> bool {
        let Some(token) = self.tokens.get(index) else {
            return false;
        };
        match index.checked_sub(1).and_then(|previous| self.tokens.get(previous)) {
            Some(previous) => previous.range().end.line < token.range().start.line,
            None => true,
        }
    }

    fn block_column(&self) -> usize {
        self.block_columns.last().copied().unwrap_or(0)
    }

    fn at_boundary(&self) -> bool {
        match self.peek() {
            None => true,
            Some(token) => {
                self.starts_line(self.pos) && token.range().start.column <= self.block_column()
            }
        }
    }

    fn with_block<T>(&mut self, column: usize, parse: impl FnOnce(&mut Self) -> T) -> T {
        self.block_columns.push(column);
        let result = parse(self);
        self.block_columns.pop();
        result
    }

    fn check_keyword(&self, kind: KeywordKind) -> bool {
        matches!(self.peek(), Some(Token::Keyword(keyword)) if keyword.kind == kind)
    }

    fn consume_keyword(&mut self, kind: KeywordKind) -> Option<Range> {
        if self.check_keyword(kind) {
            self.pos += 1;
            return Some(self.previous_range());
        }
        None
    }

    fn expect_keyword(&mut self, kind: KeywordKind, message: &str) -> Option<Range> {
        if let Some(range) = self.consume_keyword(kind) {
            return Some(range);
        }
        let range = self.peek_range().unwrap_or_else(|| self.previous_range());
        self.emit_diag("E2005", message, range);
        None
    }

    fn check_operator(&self, kind: OperatorKind) -> bool {
        matches!(self.peek(), Some(Token::Operator(op)) if op.kind == kind)
    }

    fn consume_operator(&mut self, kind: OperatorKind) -> Option<Range> {
        if self.check_operator(kind) {
            self.pos += 1;
            return Some(self.previous_range());
        }
        None
    }

    fn expect_operator(&mut self, kind: OperatorKind, message: &str) -> Option<Range> {
        if let Some(range) = self.consume_operator(kind) {
            return Some(range);
        }
        let range = self.peek_range().unwrap_or_else(|| self.previous_range());
        self.emit_diag("E2005", message, range);
        None
    }

    fn check_paren(&self, kind: ParenKind) -> bool {
        matches!(self.peek(), Some(Token::Paren(paren)) if paren.kind == kind)
    }

    fn consume_paren(&mut self, kind: ParenKind) -> Option<Range> {
        if self.check_paren(kind) {
            self.pos += 1;
            return Some(self.previous_range());
        }
        None
    }

    fn expect_paren(&mut self, kind: ParenKind, message: &str) -> Option<Range> {
        if let Some(range) = self.consume_paren(kind) {
            return Some(range);
        }
        let range = self.peek_range().unwrap_or_else(|| self.previous_range());
        self.emit_diag("E2005", message, range);
        None
    }

    fn consume_variable(&mut self) -> Option<VariableIdentifier> {
        let Some(Token::VariableSymbol(symbol)) = self.peek() else {
            return None;
        };
        let identifier = VariableIdentifier {
            name: symbol.raw.clone(),
            range: symbol.source.range,
        };
        self.pos += 1;
        Some(identifier)
    }

    fn consume_type_symbol(&mut self) -> Option<TypeIdentifier> {
        let Some(Token::TypeSymbol(symbol)) = self.peek() else {
            return None;
        };
        let identifier = TypeIdentifier {
            name: symbol.raw.clone(),
            range: symbol.source.range,
        };
        self.pos += 1;
        Some(identifier)
    }

    fn expect_type_symbol(&mut self, message: &str) -> Option<TypeIdentifier> {
        if let Some(identifier) = self.consume_type_symbol() {
            return Some(identifier);
        }
        let range = self.peek_range().unwrap_or_else(|| self.previous_range());
        self.emit_diag("E2004", message, range);
        None
    }

    /// Consumes `..` written as two adjacent dots.
    fn consume_dot_dot(&mut self) -> Option<Range> {
        let (Some(Token::Operator(first)), Some(Token::Operator(second))) =
            (self.peek(), self.peek_at(1))
        else {
            return None;
        };
        if first.kind != OperatorKind::Dot
            || second.kind != OperatorKind::Dot
            || !is_adjacent(&first.source.range, &second.source.range)
        {
            return None;
        }
        let range = first.source.range.combine_inclusive(&second.source.range);
        self.pos += 2;
        Some(range)
    }

    /// True when the next token is a dot glued to the previous token and the
    /// token after it is glued to the dot and satisfies `next`.
    fn adjacent_dot_then(&self, next: impl Fn(&Token) -> bool) -> bool {
        let (Some(dot), Some(after)) = (self.peek(), self.peek_at(1)) else {
            return false;
        };
        let Token::Operator(op) = dot else {
            return false;
        };
        op.kind == OperatorKind::Dot
            && is_adjacent(&self.previous_range(), &op.source.range)
            && is_adjacent(&op.source.range, &after.range())
            && next(after)
    }

    fn emit_diag(&mut self, code: &str, message: &str, range: Range) {
        self.diagnostics
            .push(Diagnostic::error(code, message.to_string(), range));
    }

    fn recover_to_statement(&mut self) {
        self.pos += 1;
        while self.pos < self.tokens.len() {
            if self.starts_line(self.pos)
                && self
                    .peek()
                    .is_some_and(|token| token.range().start.column == 0)
            {
                break;
            }
            self.pos += 1;
        }
    }
}

fn is_adjacent(left: &Range, right: &Range) -> bool {
    left.end.line == right.start.line && left.end.column + 1 == right.start.column
}
