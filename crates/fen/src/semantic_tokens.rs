//! Semantic tokens for editors.
//!
//! Tokens are classified from the decorated tree, sorted by position and
//! encoded as the LSP five-integer stream
//! `(deltaLine, deltaColumn, length, kind, modifiers)`.

use bitflags::bitflags;
use thiserror::Error;

use crate::decorated::{BindingKind, ExpressionKind, ReferenceKind};
use crate::module::{DefinitionKind, Module, ModuleTypeKind};
use crate::nodes::{expand_module, LiteralKind, Node};
use crate::source::Range;
use crate::surface::ExposedItem;
use crate::types::{ReferenceFlavour, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenKind {
    Namespace,
    Type,
    Class,
    Enum,
    Interface,
    Struct,
    TypeParameter,
    Parameter,
    Variable,
    Property,
    EnumMember,
    Event,
    Function,
    Method,
    Macro,
    Keyword,
    Modifier,
    Comment,
    String,
    Number,
    Regexp,
    Operator,
}

/// Legend names, indexed by [`TokenKind`].
pub const TOKEN_KINDS: [&str; 22] = [
    "namespace",
    "type",
    "class",
    "enum",
    "interface",
    "struct",
    "typeParameter",
    "parameter",
    "variable",
    "property",
    "enumMember",
    "event",
    "function",
    "method",
    "macro",
    "keyword",
    "modifier",
    "comment",
    "string",
    "number",
    "regexp",
    "operator",
];

/// Legend names, bit `i` of the modifier mask is `TOKEN_MODIFIERS[i]`.
pub const TOKEN_MODIFIERS: [&str; 10] = [
    "declaration",
    "definition",
    "readonly",
    "static",
    "deprecated",
    "abstract",
    "async",
    "modification",
    "documentation",
    "defaultLibrary",
];

bitflags! {
    pub struct TokenModifiers: u32 {
        const DECLARATION = 1 << 0;
        const DEFINITION = 1 << 1;
        const READONLY = 1 << 2;
        const STATIC = 1 << 3;
        const DEPRECATED = 1 << 4;
        const ABSTRACT = 1 << 5;
        const ASYNC = 1 << 6;
        const MODIFICATION = 1 << 7;
        const DOCUMENTATION = 1 << 8;
        const DEFAULT_LIBRARY = 1 << 9;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticToken {
    pub range: Range,
    pub kind: TokenKind,
    pub modifiers: TokenModifiers,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticTokenError {
    #[error("token at {range} does not start after the previous token at {previous}")]
    OutOfOrder { range: Range, previous: Range },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    /// Out-of-order tokens fail the whole request.
    Strict,
    /// Out-of-order tokens are dropped and logged.
    Lenient,
}

/// Delta encoder enforcing strictly increasing, non-overlapping tokens.
#[derive(Debug)]
pub struct TokenEmitter {
    mode: EmitMode,
    previous: Option<Range>,
    line: usize,
    column: usize,
    data: Vec<u32>,
}

impl TokenEmitter {
    pub fn new(mode: EmitMode) -> Self {
        Self {
            mode,
            previous: None,
            line: 0,
            column: 0,
            data: Vec::new(),
        }
    }

    pub fn emit(&mut self, token: &SemanticToken) -> Result<(), SemanticTokenError> {
        let range = token.range;
        let length = range.single_line_length();
        if length == 0 {
            return Ok(());
        }
        if let Some(previous) = self.previous {
            if !range.is_after(&previous) {
                return match self.mode {
                    EmitMode::Strict => Err(SemanticTokenError::OutOfOrder { range, previous }),
                    EmitMode::Lenient => {
                        log::warn!("dropping semantic token at {range}: overlaps token at {previous}");
                        Ok(())
                    }
                };
            }
        }
        let delta_line = range.start.line - self.line;
        let delta_column = if delta_line == 0 {
            range.start.column - self.column
        } else {
            range.start.column
        };
        self.data.extend([
            delta_line as u32,
            delta_column as u32,
            length as u32,
            token.kind as u32,
            token.modifiers.bits(),
        ]);
        self.line = range.start.line;
        self.column = range.start.column;
        self.previous = Some(range);
        Ok(())
    }

    pub fn finish(self) -> Vec<u32> {
        self.data
    }
}

/// Classified tokens of the module, sorted by start position.
pub fn collect_tokens(module: &Module) -> Vec<SemanticToken> {
    let mut tokens = Vec::new();
    for node in expand_module(module) {
        classify(&node, module, &mut tokens);
    }
    for comment in &module.comments {
        for range in &comment.ranges {
            tokens.push(token(*range, TokenKind::Comment, TokenModifiers::empty()));
        }
    }
    tokens.sort_by_key(|token| (token.range.start, token.range.end));
    tokens
}

pub fn semantic_tokens(module: &Module, mode: EmitMode) -> Result<Vec<u32>, SemanticTokenError> {
    let mut emitter = TokenEmitter::new(mode);
    for token in collect_tokens(module) {
        emitter.emit(&token)?;
    }
    Ok(emitter.finish())
}

/// Full-document tokens as served to the editor; never fails.
pub fn semantic_tokens_full(module: &Module) -> Vec<u32> {
    let mut emitter = TokenEmitter::new(EmitMode::Lenient);
    for token in collect_tokens(module) {
        // Lenient emitters only drop tokens.
        let _ = emitter.emit(&token);
    }
    emitter.finish()
}

fn token(range: Range, kind: TokenKind, modifiers: TokenModifiers) -> SemanticToken {
    SemanticToken {
        range,
        kind,
        modifiers,
    }
}

fn definition_kind(kind: DefinitionKind, modifiers: TokenModifiers) -> (TokenKind, TokenModifiers) {
    match kind {
        DefinitionKind::Function => (TokenKind::Function, modifiers),
        DefinitionKind::Constant => (TokenKind::Macro, TokenModifiers::empty()),
    }
}

fn classify(node: &Node<'_>, module: &Module, out: &mut Vec<SemanticToken>) {
    let none = TokenModifiers::empty();
    match *node {
        Node::ModulePart { part, .. } => out.push(token(part.range, TokenKind::Namespace, none)),
        Node::ModuleAlias(alias) => out.push(token(alias.range, TokenKind::Namespace, none)),
        Node::Exposed { import, item } => match item {
            ExposedItem::Variable(identifier) => {
                let kind = import
                    .import_index
                    .and_then(|index| module.imports.get(index))
                    .and_then(|import| import.module.definitions.find(&identifier.name))
                    .map_or(DefinitionKind::Function, |definition| definition.kind);
                let (kind, modifiers) = definition_kind(kind, none);
                out.push(token(identifier.range, kind, modifiers));
            }
            ExposedItem::Type { name, .. } => {
                let kind = import
                    .import_index
                    .and_then(|index| module.imports.get(index))
                    .and_then(|import| import.module.types.get(&name.name))
                    .map(|found| found.kind);
                let (kind, modifiers) = match kind {
                    Some(ModuleTypeKind::Custom | ModuleTypeKind::Variant) => (TokenKind::Enum, none),
                    _ => (TokenKind::Type, TokenModifiers::DECLARATION),
                };
                out.push(token(name.range, kind, modifiers));
            }
        },
        Node::AliasName(alias) => out.push(token(alias.name.range, TokenKind::Type, TokenModifiers::DECLARATION)),
        Node::CustomTypeName(custom) => out.push(token(custom.name.range, TokenKind::Enum, none)),
        Node::Variant { variant, .. } => out.push(token(variant.name.range, TokenKind::EnumMember, none)),
        Node::TypeParameter(_, range) => {
            out.push(token(range, TokenKind::TypeParameter, TokenModifiers::DECLARATION))
        }
        Node::AnnotationName(annotation) => {
            let kind = annotation
                .definition
                .and_then(|index| module.definitions.get(index))
                .map_or(DefinitionKind::Function, |definition| definition.kind);
            let (kind, modifiers) = definition_kind(kind, TokenModifiers::DECLARATION);
            out.push(token(annotation.name.range, kind, modifiers));
        }
        Node::DefinitionName(definition) => {
            let (kind, modifiers) = definition_kind(definition.kind, TokenModifiers::DEFINITION);
            out.push(token(definition.identifier.range, kind, modifiers));
        }
        Node::Binding(_, binding) => {
            let (kind, modifiers) = match binding.kind {
                BindingKind::LetVariable => (TokenKind::Variable, TokenModifiers::READONLY),
                BindingKind::FunctionParameter
                | BindingKind::LambdaParameter
                | BindingKind::CaseConsequenceParameter => (TokenKind::Parameter, none),
            };
            out.push(token(binding.identifier.range, kind, modifiers));
        }
        Node::Expression(expression) => classify_expression(expression, out),
        Node::NamedType(named) => {
            let (kind, modifiers) = match named.ty.as_ref() {
                Type::Alias(_) | Type::Reference(_) => (TokenKind::Type, TokenModifiers::DECLARATION),
                _ => (TokenKind::EnumMember, none),
            };
            out.push(token(named.identifier.range, kind, modifiers));
        }
        Node::Property { range, .. } => out.push(token(range, TokenKind::Property, none)),
        Node::Type(ty, range) => classify_type(ty, range, out),
        Node::Keyword(range) => out.push(token(range, TokenKind::Keyword, none)),
        Node::Operator(range) => out.push(token(range, TokenKind::Operator, none)),
        Node::Literal(LiteralKind::String, range) => out.push(token(range, TokenKind::String, none)),
        Node::Literal(LiteralKind::Number, range) => out.push(token(range, TokenKind::Number, none)),
        Node::Import(_)
        | Node::Alias(_)
        | Node::CustomType(_)
        | Node::Annotation(_)
        | Node::Definition(_) => {}
    }
}

fn classify_expression(expression: &crate::decorated::Expression, out: &mut Vec<SemanticToken>) {
    let none = TokenModifiers::empty();
    let range = expression.range;
    match &expression.kind {
        ExpressionKind::Integer(_) | ExpressionKind::Fixed(_) | ExpressionKind::Bool(_) => {
            out.push(token(range, TokenKind::Number, none))
        }
        ExpressionKind::Character(_) => out.push(token(range, TokenKind::String, none)),
        ExpressionKind::String(string) => {
            for segment in &string.segments {
                out.push(token(*segment, TokenKind::String, none));
            }
        }
        ExpressionKind::ResourceName(_) => out.push(token(range, TokenKind::Operator, none)),
        ExpressionKind::TypeId(_) => out.push(token(range, TokenKind::Macro, none)),
        ExpressionKind::Reference(reference) => {
            let (kind, modifiers) = match reference.kind {
                ReferenceKind::Function => (TokenKind::Function, none),
                ReferenceKind::Constant => (TokenKind::Macro, none),
                ReferenceKind::FunctionParameter | ReferenceKind::CaseConsequenceParameter => {
                    (TokenKind::Parameter, none)
                }
                ReferenceKind::LetVariable => (TokenKind::Variable, TokenModifiers::READONLY),
            };
            out.push(token(reference.identifier.range, kind, modifiers));
        }
        _ => {}
    }
}

fn classify_type(ty: &Type, range: Range, out: &mut Vec<SemanticToken>) {
    let none = TokenModifiers::empty();
    match ty {
        Type::Reference(reference) => {
            let (kind, modifiers) = match reference.flavour {
                ReferenceFlavour::Primitive => (
                    TokenKind::Type,
                    TokenModifiers::DECLARATION | TokenModifiers::DEFAULT_LIBRARY,
                ),
                ReferenceFlavour::Type | ReferenceFlavour::CustomTypeVariant => (TokenKind::Enum, none),
                ReferenceFlavour::Alias | ReferenceFlavour::Function => (TokenKind::Type, TokenModifiers::DECLARATION),
                ReferenceFlavour::Scoped => match reference.next.as_ref() {
                    Type::Custom(_) => (TokenKind::Enum, none),
                    _ => (TokenKind::Type, TokenModifiers::DECLARATION),
                },
            };
            out.push(token(reference.identifier.range, kind, modifiers));
        }
        Type::RecursiveReference(_) => out.push(token(range, TokenKind::Enum, none)),
        Type::LocalType(_) => out.push(token(range, TokenKind::TypeParameter, TokenModifiers::DECLARATION)),
        Type::Unmanaged(_) | Type::AnyMatching(_) => out.push(token(range, TokenKind::Type, none)),
        _ => {}
    }
}
