use crate::diagnostics::Diagnostic;
use crate::source::{DocumentUri, Position, Range, SourceFileReference};
use crate::syntax;
use crate::token::{
    AsmToken, BooleanToken, CharacterToken, KeywordKind, KeywordToken, MultiLineCommentPart,
    MultiLineCommentToken, NumberToken, OperatorToken, ParenKind, ParenToken, ResourceNameToken,
    SingleLineCommentToken, StringPart, StringToken, Token, TypeIdToken, TypeSymbolToken,
    VariableSymbolToken, FIXED_FACTOR,
};

#[derive(Debug, Clone, Default)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn lex(content: &str, document: &DocumentUri) -> LexResult {
    Lexer::new(content, document, Position::default(), 0).run()
}

/// Lexes a fragment embedded in a larger document (string interpolation).
/// `start` is the absolute position of the first character and
/// `indentation` the indentation of the line it sits on.
pub fn lex_fragment(
    content: &str,
    document: &DocumentUri,
    start: Position,
    indentation: usize,
) -> LexResult {
    Lexer::new(content, document, start, indentation).run()
}

struct Lexer<'a> {
    chars: Vec<char>,
    index: usize,
    line: usize,
    col: usize,
    last: Position,
    base_line: usize,
    line_lengths: Vec<usize>,
    line_indents: Vec<usize>,
    document: &'a DocumentUri,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(content: &str, document: &'a DocumentUri, start: Position, indentation: usize) -> Self {
        let mut line_lengths = Vec::new();
        let mut line_indents = Vec::new();
        for (offset, line) in content.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let shift = if offset == 0 { start.column } else { 0 };
            line_lengths.push(shift + line.chars().count());
            if offset == 0 {
                line_indents.push(indentation);
            } else {
                line_indents.push(
                    line.chars()
                        .take_while(|ch| *ch == ' ' || *ch == '\t')
                        .count(),
                );
            }
        }
        Self {
            chars: content.chars().collect(),
            index: 0,
            line: start.line,
            col: start.column,
            last: start,
            base_line: start.line,
            line_lengths,
            line_indents,
            document,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> LexResult {
        while let Some(ch) = self.current() {
            if ch == '\n' || ch == '\r' || ch == ' ' || ch == '\t' {
                self.advance();
                continue;
            }

            if ch == '-' && self.peek(1) == Some('-') {
                self.lex_line_comment();
                continue;
            }

            if ch == '{' && self.peek(1) == Some('-') {
                self.lex_block_comment();
                continue;
            }

            if ch == '"' {
                self.lex_string();
                continue;
            }

            if ch == '\'' {
                self.lex_character();
                continue;
            }

            if ch == '@' {
                self.lex_resource_name();
                continue;
            }

            if ch == '$' && self.peek(1).is_some_and(|next| next.is_ascii_uppercase()) {
                self.lex_type_id();
                continue;
            }

            if syntax::is_ident_start(ch) {
                self.lex_identifier();
                continue;
            }

            if ch.is_ascii_digit() {
                self.lex_number();
                continue;
            }

            if self.lex_symbol() {
                continue;
            }

            let position = self.position();
            self.diagnostics.push(Diagnostic::error(
                "E1000",
                format!("unexpected character '{ch}'"),
                self.range(position, position),
            ));
            self.advance();
        }

        check_brackets(&self.tokens, &mut self.diagnostics);

        LexResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn peek_str(&self, needle: &str) -> bool {
        needle
            .chars()
            .enumerate()
            .all(|(offset, ch)| self.peek(offset) == Some(ch))
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.last = self.position();
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else if ch != '\r' {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_n(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn indentation_of(&self, line: usize) -> usize {
        self.line_indents
            .get(line - self.base_line)
            .copied()
            .unwrap_or(0)
    }

    fn line_length(&self, line: usize) -> usize {
        self.line_lengths
            .get(line - self.base_line)
            .copied()
            .unwrap_or(0)
    }

    fn range(&self, start: Position, end: Position) -> Range {
        Range::new(start, end).with_indentation(self.indentation_of(start.line))
    }

    fn reference(&self, start: Position, end: Position) -> SourceFileReference {
        SourceFileReference::new(self.range(start, end), self.document.clone())
    }

    /// Splits `[start, end]` into one range per physical line, skipping
    /// lines that contribute no characters.
    fn split_lines(&self, start: Position, end: Position) -> Vec<Range> {
        let mut ranges = Vec::new();
        if end < start {
            return ranges;
        }
        for line in start.line..=end.line {
            let from = if line == start.line { start.column } else { 0 };
            let length = self.line_length(line);
            let to = if line == end.line {
                end.column
            } else if length == 0 {
                continue;
            } else {
                length - 1
            };
            if from > to || (line != end.line && from >= length) {
                continue;
            }
            ranges.push(self.range(Position::new(line, from), Position::new(line, to)));
        }
        ranges
    }

    fn text_since(&self, start: usize) -> String {
        self.chars[start..self.index].iter().collect()
    }

    fn lex_line_comment(&mut self) {
        let start = self.position();
        let start_index = self.index;
        let for_doc = self.peek(2) == Some('-');
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
        let raw = self.text_since(start_index);
        let prefix = if for_doc { 3 } else { 2 };
        let text: String = raw.chars().skip(prefix).collect();
        let source = self.reference(start, self.last);
        self.tokens
            .push(Token::SingleLineComment(SingleLineCommentToken {
                raw: raw.trim_end_matches('\r').to_string(),
                text: text.trim().to_string(),
                for_doc,
                source,
            }));
    }

    fn lex_block_comment(&mut self) {
        let start = self.position();
        let for_doc = self.peek(2) == Some('|');
        let opener = if for_doc { 3 } else { 2 };
        self.advance_n(opener);

        let mut parts = Vec::new();
        let mut part_start = start;
        let mut part_text = String::new();
        let mut closed = false;
        while let Some(ch) = self.current() {
            if ch == '-' && self.peek(1) == Some('}') {
                self.advance_n(2);
                closed = true;
                break;
            }
            if ch == '\n' {
                if self.last >= part_start && self.last.line == part_start.line {
                    parts.push(MultiLineCommentPart {
                        text: part_text.trim().to_string(),
                        source: self.reference(part_start, self.last),
                    });
                }
                part_text.clear();
                self.advance();
                part_start = self.position();
                continue;
            }
            if ch != '\r' {
                part_text.push(ch);
            }
            self.advance();
        }

        if self.last >= part_start && self.last.line == part_start.line {
            parts.push(MultiLineCommentPart {
                text: part_text.trim().to_string(),
                source: self.reference(part_start, self.last),
            });
        }

        if !closed {
            self.diagnostics.push(
                Diagnostic::error(
                    "E1007",
                    "unterminated multi-line comment",
                    self.range(start, self.last),
                )
                .with_label("comment started here", self.range(start, start)),
            );
        }

        let source = self.reference(start, self.last);
        self.tokens.push(Token::MultiLineComment(MultiLineCommentToken {
            parts,
            for_doc,
            source,
        }));
    }

    fn lex_string(&mut self) {
        let start = self.position();
        let start_index = self.index;
        let triple = self.peek_str("\"\"\"");
        let quote_len = if triple { 3 } else { 1 };
        self.advance_n(quote_len);

        let mut text = String::new();
        let mut part_text = String::new();
        let mut part_start = start;
        let mut parts = Vec::new();
        let mut closed = false;

        while let Some(ch) = self.current() {
            if ch == '\n' && !triple {
                break;
            }
            if (triple && self.peek_str("\"\"\"")) || (!triple && ch == '"') {
                self.advance_n(quote_len);
                closed = true;
                break;
            }
            if ch == '\\' {
                let escape_start = self.position();
                self.advance();
                let Some(escaped) = self.current() else {
                    break;
                };
                if escaped == '\n' {
                    break;
                }
                self.advance();
                let value = match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    '\\' | '"' | '\'' | '$' => escaped,
                    other => {
                        self.diagnostics.push(Diagnostic::error(
                            "E1009",
                            format!("unknown escape sequence '\\{other}'"),
                            self.range(escape_start, self.last),
                        ));
                        other
                    }
                };
                text.push(value);
                part_text.push(value);
                continue;
            }
            if ch == '$' && self.peek(1) == Some('{') {
                self.advance();
                let brace = self.position();
                self.advance();
                parts.push(StringPart::Text {
                    text: std::mem::take(&mut part_text),
                    ranges: self.split_lines(part_start, brace),
                });

                let expression_start = self.position();
                let mut depth = 0usize;
                let mut source = String::new();
                let mut closed_expression = false;
                while let Some(inner) = self.current() {
                    if inner == '\n' && !triple {
                        break;
                    }
                    if inner == '{' {
                        depth += 1;
                    }
                    if inner == '}' {
                        if depth == 0 {
                            closed_expression = true;
                            break;
                        }
                        depth -= 1;
                    }
                    source.push(inner);
                    self.advance();
                }

                if !closed_expression {
                    self.diagnostics.push(Diagnostic::error(
                        "E1010",
                        "unterminated string interpolation",
                        self.range(brace, self.last),
                    ));
                }
                text.push_str("${");
                text.push_str(&source);
                text.push('}');
                parts.push(StringPart::Expression {
                    source,
                    start: expression_start,
                });
                part_start = self.position();
                if closed_expression {
                    self.advance();
                }
                continue;
            }
            if ch != '\r' {
                text.push(ch);
                part_text.push(ch);
            }
            self.advance();
        }

        let end = self.last;
        if !closed {
            self.diagnostics.push(
                Diagnostic::error(
                    "E1001",
                    "unterminated string literal",
                    self.range(start, end),
                )
                .with_label("string literal started here", self.range(start, start)),
            );
        }
        if end >= part_start {
            parts.push(StringPart::Text {
                text: part_text,
                ranges: self.split_lines(part_start, end),
            });
        }

        let raw = self.text_since(start_index);
        let segments = self.split_lines(start, end);
        let source = self.reference(start, end);
        self.tokens.push(Token::String(StringToken {
            raw,
            text,
            source,
            segments,
            parts,
        }));
    }

    fn lex_character(&mut self) {
        let start = self.position();
        let start_index = self.index;
        self.advance();

        let value = match self.current() {
            Some('\\') => {
                self.advance();
                let escaped = self.advance();
                match escaped {
                    Some('n') => Some('\n'),
                    Some('t') => Some('\t'),
                    Some('r') => Some('\r'),
                    Some('0') => Some('\0'),
                    Some(ch @ ('\\' | '\'' | '"')) => Some(ch),
                    _ => None,
                }
            }
            Some('\n') | Some('\'') | None => None,
            Some(_) => self.advance(),
        };

        let closed = self.current() == Some('\'');
        if closed {
            self.advance();
        }

        match (value, closed) {
            (Some(value), true) => {
                let raw = self.text_since(start_index);
                let source = self.reference(start, self.last);
                self.tokens.push(Token::Character(CharacterToken { value, raw, source }));
            }
            _ => {
                self.diagnostics.push(Diagnostic::error(
                    "E1004",
                    "invalid character literal",
                    self.range(start, self.last),
                ));
            }
        }
    }

    fn lex_resource_name(&mut self) {
        let start = self.position();
        let start_index = self.index;
        self.advance();
        while let Some(ch) = self.current() {
            if syntax::is_ident_continue(ch) || ch == '/' || ch == '.' || ch == '-' {
                self.advance();
            } else {
                break;
            }
        }
        if self.index - start_index == 1 {
            self.diagnostics.push(Diagnostic::error(
                "E1000",
                "unexpected character '@'",
                self.range(start, start),
            ));
            return;
        }
        let raw = self.text_since(start_index);
        let source = self.reference(start, self.last);
        self.tokens
            .push(Token::ResourceName(ResourceNameToken { raw, source }));
    }

    fn lex_type_id(&mut self) {
        let start = self.position();
        let start_index = self.index;
        self.advance();
        let name_start = self.position();
        let name_index = self.index;
        while self.current().is_some_and(syntax::is_ident_continue) {
            self.advance();
        }
        let raw = self.text_since(start_index);
        let type_symbol = TypeSymbolToken {
            raw: self.text_since(name_index),
            source: self.reference(name_start, self.last),
        };
        let source = self.reference(start, self.last);
        self.tokens.push(Token::TypeId(TypeIdToken {
            raw,
            source,
            type_symbol,
        }));
    }

    fn lex_identifier(&mut self) {
        let start = self.position();
        let start_index = self.index;
        while self.current().is_some_and(syntax::is_ident_continue) {
            self.advance();
        }
        let raw = self.text_since(start_index);
        let source = self.reference(start, self.last);

        if raw == syntax::ASM_INTRODUCER {
            self.lex_asm(start);
            return;
        }

        if let Some((_, value)) = syntax::BOOLEAN_LITERALS
            .iter()
            .find(|(literal, _)| *literal == raw)
        {
            self.tokens.push(Token::Boolean(BooleanToken {
                value: *value,
                raw,
                source,
            }));
            return;
        }

        if let Some(kind) = KeywordKind::from_word(&raw) {
            self.tokens
                .push(Token::Keyword(KeywordToken { kind, raw, source }));
            return;
        }

        if syntax::is_type_symbol(&raw) {
            self.tokens
                .push(Token::TypeSymbol(TypeSymbolToken { raw, source }));
        } else {
            self.tokens
                .push(Token::VariableSymbol(VariableSymbolToken { raw, source }));
        }
    }

    fn lex_asm(&mut self, start: Position) {
        while matches!(self.current(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
        if self.current() != Some('{') {
            self.diagnostics.push(Diagnostic::error(
                "E1008",
                "expected '{' after __asm",
                self.range(start, self.last),
            ));
            return;
        }
        self.advance();
        let body_index = self.index;
        let mut depth = 0usize;
        let mut closed = false;
        while let Some(ch) = self.current() {
            if ch == '{' {
                depth += 1;
            }
            if ch == '}' {
                if depth == 0 {
                    closed = true;
                    break;
                }
                depth -= 1;
            }
            self.advance();
        }
        let text = self.text_since(body_index);
        if closed {
            self.advance();
        } else {
            self.diagnostics.push(Diagnostic::error(
                "E1008",
                "unterminated __asm block",
                self.range(start, self.last),
            ));
        }
        let source = self.reference(start, self.last);
        self.tokens.push(Token::Asm(AsmToken {
            text: text.trim().to_string(),
            source,
        }));
    }

    fn lex_number(&mut self) {
        let start = self.position();
        let start_index = self.index;
        while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        let integer_part = self.text_since(start_index);
        let mut fraction_part = None;
        if self.current() == Some('.') && self.peek(1).is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
            let fraction_index = self.index;
            while self.current().is_some_and(|ch| ch.is_ascii_digit()) {
                self.advance();
            }
            fraction_part = Some(self.text_since(fraction_index));
        }
        let raw = self.text_since(start_index);
        let source = self.reference(start, self.last);

        let parsed = match &fraction_part {
            None => integer_part.parse::<i32>().ok(),
            Some(fraction) => parse_fixed(&integer_part, fraction),
        };
        let Some(value) = parsed else {
            self.diagnostics.push(Diagnostic::error(
                "E1003",
                format!("number literal '{raw}' is out of range"),
                source.range,
            ));
            self.tokens.push(Token::Number(NumberToken {
                value: 0,
                is_fixed: fraction_part.is_some(),
                raw,
                source,
            }));
            return;
        };
        self.tokens.push(Token::Number(NumberToken {
            value,
            is_fixed: fraction_part.is_some(),
            raw,
            source,
        }));
    }

    fn lex_symbol(&mut self) -> bool {
        let start = self.position();
        let Some(first) = self.current() else {
            return false;
        };
        let second = self.peek(1);

        if let Some(second) = second {
            if let Some((_, kind)) = syntax::PARENS_2
                .iter()
                .find(|(needle, _)| needle[0] == first && needle[1] == second)
            {
                self.advance_n(2);
                self.push_paren(*kind, start);
                return true;
            }
            if let Some((needle, kind)) = syntax::SYMBOLS_2
                .iter()
                .find(|(needle, _)| needle[0] == first && needle[1] == second)
            {
                self.advance_n(2);
                let source = self.reference(start, self.last);
                self.tokens.push(Token::Operator(OperatorToken {
                    kind: *kind,
                    raw: needle.iter().collect(),
                    source,
                }));
                return true;
            }
        }

        if let Some((_, kind)) = syntax::PARENS_1.iter().find(|(ch, _)| *ch == first) {
            self.advance();
            self.push_paren(*kind, start);
            return true;
        }

        if let Some((ch, kind)) = syntax::SYMBOLS_1.iter().find(|(ch, _)| *ch == first) {
            self.advance();
            let source = self.reference(start, self.last);
            self.tokens.push(Token::Operator(OperatorToken {
                kind: *kind,
                raw: ch.to_string(),
                source,
            }));
            return true;
        }

        false
    }

    fn push_paren(&mut self, kind: ParenKind, start: Position) {
        let source = self.reference(start, self.last);
        self.tokens.push(Token::Paren(ParenToken { kind, source }));
    }
}

fn parse_fixed(integer_part: &str, fraction: &str) -> Option<i32> {
    let integer = integer_part.parse::<i32>().ok()?;
    let mut scaled_fraction = 0i32;
    let mut factor = FIXED_FACTOR / 10;
    for digit in fraction.chars().take(3) {
        scaled_fraction += digit.to_digit(10)? as i32 * factor;
        factor /= 10;
    }
    integer
        .checked_mul(FIXED_FACTOR)?
        .checked_add(scaled_fraction)
}

fn closing_for(open: ParenKind) -> Option<ParenKind> {
    match open {
        ParenKind::LeftParen => Some(ParenKind::RightParen),
        ParenKind::LeftCurly => Some(ParenKind::RightCurly),
        ParenKind::LeftBracket => Some(ParenKind::RightBracket),
        ParenKind::LeftArrayBracket => Some(ParenKind::RightArrayBracket),
        ParenKind::LeftAngle => Some(ParenKind::RightAngle),
        _ => None,
    }
}

fn check_brackets(tokens: &[Token], diagnostics: &mut Vec<Diagnostic>) {
    let mut stack: Vec<(ParenKind, Range)> = Vec::new();

    for token in tokens {
        let Token::Paren(paren) = token else {
            continue;
        };
        if closing_for(paren.kind).is_some() {
            stack.push((paren.kind, paren.source.range));
            continue;
        }
        let Some((open, open_range)) = stack.pop() else {
            diagnostics.push(Diagnostic::error(
                "E1002",
                format!("unmatched closing '{}'", paren.kind.as_str()),
                paren.source.range,
            ));
            continue;
        };
        if closing_for(open) != Some(paren.kind) {
            diagnostics.push(
                Diagnostic::error(
                    "E1005",
                    format!(
                        "mismatched '{}' and '{}'",
                        open.as_str(),
                        paren.kind.as_str()
                    ),
                    paren.source.range,
                )
                .with_label("opening here", open_range),
            );
        }
    }

    for (open, range) in stack {
        diagnostics.push(Diagnostic::error(
            "E1006",
            format!("unclosed '{}'", open.as_str()),
            range,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::OperatorKind;

    fn diag_codes(diags: &[Diagnostic]) -> Vec<String> {
        let mut codes: Vec<String> = diags.iter().map(|d| d.code.clone()).collect();
        codes.sort();
        codes
    }

    fn lex_str(src: &str) -> LexResult {
        lex(src, &DocumentUri::default())
    }

    #[test]
    fn lex_classifies_symbols_keywords_and_literals() {
        let result = lex_str("add : Int -> Int\nadd a = if True then a else 0");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let tags: Vec<&str> = result.tokens.iter().map(Token::tag).collect();
        assert_eq!(
            tags,
            vec![
                "variable", "operator", "type", "operator", "type", "variable", "variable",
                "operator", "keyword", "boolean", "keyword", "variable", "keyword", "number",
            ]
        );
        let Token::Operator(arrow) = &result.tokens[3] else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.kind, OperatorKind::Arrow);
        assert_eq!(arrow.source.range.start, Position::new(0, 10));
        assert_eq!(arrow.source.range.end, Position::new(0, 11));
    }

    #[test]
    fn lex_records_indentation_of_the_starting_line() {
        let result = lex_str("f =\n    case x of\n        A -> 1");
        let case = result
            .tokens
            .iter()
            .find(|token| matches!(token, Token::Keyword(k) if k.kind == KeywordKind::Case))
            .expect("case keyword");
        assert_eq!(case.source().range.indentation, 4);
        assert_eq!(case.source().range.start, Position::new(1, 4));
    }

    #[test]
    fn lex_fixed_point_literals_are_scaled() {
        let result = lex_str("x = 12.34");
        let Some(Token::Number(number)) = result.tokens.last() else {
            panic!("expected number");
        };
        assert!(number.is_fixed);
        assert_eq!(number.value, 12_340);
        assert_eq!(number.source.range.start.column, 4);
        assert_eq!(number.source.range.end.column, 8);
    }

    #[test]
    fn lex_reports_integer_overflow() {
        let result = lex_str("x = 99999999999");
        assert_eq!(diag_codes(&result.diagnostics), vec!["E1003".to_string()]);
    }

    #[test]
    fn lex_unterminated_string_emits_error() {
        let result = lex_str("x = \"unterminated\n");
        let diagnostic = result
            .diagnostics
            .iter()
            .find(|d| d.code == "E1001")
            .expect("E1001 diagnostic");
        assert_eq!(diagnostic.range.start, Position::new(0, 4));
    }

    #[test]
    fn lex_multi_line_strings_carry_per_line_segments() {
        let result = lex_str("x = \"\"\"first\n  second\"\"\"");
        let Some(Token::String(string)) = result.tokens.last() else {
            panic!("expected string");
        };
        assert_eq!(string.text, "first\n  second");
        assert_eq!(string.segments.len(), 2);
        assert_eq!(string.segments[0].start, Position::new(0, 4));
        assert_eq!(string.segments[0].end, Position::new(0, 11));
        assert_eq!(string.segments[1].start, Position::new(1, 0));
        assert_eq!(string.segments[1].end, Position::new(1, 10));
    }

    #[test]
    fn lex_interpolation_splits_string_parts() {
        let result = lex_str("s = \"a ${name} b\"");
        let Some(Token::String(string)) = result.tokens.last() else {
            panic!("expected string");
        };
        assert!(string.is_interpolated());
        assert_eq!(string.parts.len(), 3);
        let StringPart::Expression { source, start } = &string.parts[1] else {
            panic!("expected interpolation");
        };
        assert_eq!(source, "name");
        assert_eq!(*start, Position::new(0, 9));
        let StringPart::Text { ranges, .. } = &string.parts[2] else {
            panic!("expected trailing text");
        };
        assert_eq!(ranges[0].start, Position::new(0, 13));
        assert_eq!(ranges[0].end, Position::new(0, 16));
    }

    #[test]
    fn lex_comments_keep_doc_flags_and_parts() {
        let result = lex_str("--- doc\n{- one\ntwo -}\n-- plain");
        assert_eq!(result.tokens.len(), 3);
        let Token::SingleLineComment(doc) = &result.tokens[0] else {
            panic!("expected doc comment");
        };
        assert!(doc.for_doc);
        assert_eq!(doc.text, "doc");
        let Token::MultiLineComment(block) = &result.tokens[1] else {
            panic!("expected block comment");
        };
        assert_eq!(block.parts.len(), 2);
        assert_eq!(block.parts[1].source.range.start, Position::new(2, 0));
        assert_eq!(block.parts[1].source.range.end, Position::new(2, 5));
    }

    #[test]
    fn lex_special_literals() {
        let result = lex_str("x = [| 'c', @icons/ok.png, $Point |]");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert!(result
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Character(c) if c.value == 'c')));
        assert!(result
            .tokens
            .iter()
            .any(|t| matches!(t, Token::ResourceName(r) if r.name() == "icons/ok.png")));
        let type_id = result
            .tokens
            .iter()
            .find_map(|t| match t {
                Token::TypeId(id) => Some(id),
                _ => None,
            })
            .expect("type id");
        assert_eq!(type_id.type_symbol.raw, "Point");
        assert_eq!(type_id.type_symbol.source.range.start.column, 28);
    }

    #[test]
    fn lex_asm_blocks_are_opaque() {
        let result = lex_str("f = __asm { lda #1 }");
        let Some(Token::Asm(asm)) = result.tokens.last() else {
            panic!("expected asm");
        };
        assert_eq!(asm.text, "lda #1");
    }

    #[test]
    fn lex_reports_mismatched_and_unclosed_brackets() {
        let codes = diag_codes(&lex_str("x = (]\n").diagnostics);
        assert!(codes.contains(&"E1005".to_string()), "{codes:?}");
        assert!(!codes.contains(&"E1006".to_string()), "{codes:?}");
        let codes = diag_codes(&lex_str("x = [1, 2").diagnostics);
        assert_eq!(codes, vec!["E1006".to_string()]);
    }

    #[test]
    fn lex_rejects_unknown_characters() {
        let codes = diag_codes(&lex_str("x = 1 ? 2").diagnostics);
        assert_eq!(codes, vec!["E1000".to_string()]);
    }
}
