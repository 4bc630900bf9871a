//! Uniform view over the decorated tree for editor queries.
//!
//! [`Node`] borrows from a decorated [`Module`]. [`expand_child_nodes`] walks
//! a node and all of its descendants in pre-order, which is source order for
//! siblings and parent-before-child for nesting.

use crate::decorated::{
    Binding, BindingId, DecoratedAlias, DecoratedAnnotation, DecoratedCustomType, DecoratedImport,
    DecoratedStatement, DecoratedVariant, Expression, ExpressionKind, InterpolationPart, NamedTypeReference,
    RecordLookup,
};
use crate::module::{Module, ModuleDefinition};
use crate::source::Range;
use crate::surface::{ExposedItem, ModuleReference, TypeIdentifier};
use crate::types::{LocalTypeDefinition, Ty, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
}

#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Import(&'a DecoratedImport),
    /// One part of a module path (`A` or `B` in `A.B`).
    ModulePart {
        path: &'a ModuleReference,
        part: &'a TypeIdentifier,
    },
    ModuleAlias(&'a TypeIdentifier),
    Exposed {
        import: &'a DecoratedImport,
        item: &'a ExposedItem,
    },
    Alias(&'a DecoratedAlias),
    AliasName(&'a DecoratedAlias),
    CustomType(&'a DecoratedCustomType),
    CustomTypeName(&'a DecoratedCustomType),
    Variant {
        custom: &'a DecoratedCustomType,
        variant: &'a DecoratedVariant,
    },
    TypeParameter(&'a LocalTypeDefinition, Range),
    Annotation(&'a DecoratedAnnotation),
    AnnotationName(&'a DecoratedAnnotation),
    Definition(&'a ModuleDefinition),
    DefinitionName(&'a ModuleDefinition),
    Binding(BindingId, &'a Binding),
    Expression(&'a Expression),
    NamedType(&'a NamedTypeReference),
    /// A record field name, in a type, a literal or a lookup.
    Property {
        name: &'a str,
        range: Range,
        ty: Option<&'a Ty>,
    },
    /// A type as written in source.
    Type(&'a Ty, Range),
    Keyword(Range),
    Operator(Range),
    Literal(LiteralKind, Range),
}

impl<'a> Node<'a> {
    pub fn range(&self) -> Range {
        match self {
            Node::Import(import) => import.range,
            Node::ModulePart { part, .. } => part.range,
            Node::ModuleAlias(alias) => alias.range,
            Node::Exposed { item, .. } => match item {
                ExposedItem::Variable(identifier) => identifier.range,
                ExposedItem::Type { name, .. } => name.range,
            },
            Node::Alias(alias) => alias.range,
            Node::AliasName(alias) => alias.name.range,
            Node::CustomType(custom) => custom.range,
            Node::CustomTypeName(custom) => custom.name.range,
            Node::Variant { variant, .. } => variant.range,
            Node::TypeParameter(_, range) => *range,
            Node::Annotation(annotation) => annotation.range,
            Node::AnnotationName(annotation) => annotation.name.range,
            Node::Definition(definition) => match &definition.value {
                Some(value) => definition.identifier.range.combine_inclusive(&value.expression.range),
                None => definition.identifier.range,
            },
            Node::DefinitionName(definition) => definition.identifier.range,
            Node::Binding(_, binding) => binding.identifier.range,
            Node::Expression(expression) => expression.range,
            Node::NamedType(named) => named.range(),
            Node::Property { range, .. } => *range,
            Node::Type(_, range) => *range,
            Node::Keyword(range) | Node::Operator(range) | Node::Literal(_, range) => *range,
        }
    }

    /// Direct children in source order.
    pub fn children(&self, module: &'a Module) -> Vec<Node<'a>> {
        let mut out = Vec::new();
        match *self {
            Node::Import(import) => {
                out.push(Node::Keyword(import.keyword));
                push_module_path(&import.path, &mut out);
                if let Some((as_keyword, alias)) = &import.alias {
                    out.push(Node::Keyword(*as_keyword));
                    out.push(Node::ModuleAlias(alias));
                }
                if let Some(exposing) = &import.exposing {
                    out.push(Node::Keyword(exposing.keyword));
                    for item in &exposing.items {
                        out.push(Node::Exposed { import, item });
                    }
                }
            }
            Node::Alias(alias) => {
                out.push(Node::Keyword(alias.type_keyword));
                if let Some(keyword) = alias.alias_keyword {
                    out.push(Node::Keyword(keyword));
                }
                out.push(Node::AliasName(alias));
                push_type_parameters(&alias.parameters, &mut out);
                push_type(&alias.definition, &mut out);
            }
            Node::CustomType(custom) => {
                out.push(Node::Keyword(custom.keyword));
                out.push(Node::CustomTypeName(custom));
                push_type_parameters(&custom.parameters, &mut out);
                for variant in &custom.variants {
                    out.push(Node::Variant { custom, variant });
                }
            }
            Node::Variant { variant, .. } => {
                for parameter in &variant.parameters {
                    push_type(parameter, &mut out);
                }
            }
            Node::Annotation(annotation) => {
                out.push(Node::AnnotationName(annotation));
                push_type(&annotation.ty, &mut out);
            }
            Node::Definition(definition) => {
                out.push(Node::DefinitionName(definition));
                if let Some(value) = &definition.value {
                    push_bindings(module, &value.parameters, &mut out);
                    out.push(Node::Expression(&value.expression));
                }
            }
            Node::Expression(expression) => expression_children(expression, module, &mut out),
            Node::NamedType(named) => {
                if let Some(path) = &named.module {
                    push_module_path(path, &mut out);
                }
            }
            Node::Type(ty, _) => type_children(ty, &mut out),
            Node::ModulePart { .. }
            | Node::ModuleAlias(_)
            | Node::Exposed { .. }
            | Node::AliasName(_)
            | Node::CustomTypeName(_)
            | Node::TypeParameter(..)
            | Node::AnnotationName(_)
            | Node::DefinitionName(_)
            | Node::Binding(..)
            | Node::Property { .. }
            | Node::Keyword(_)
            | Node::Operator(_)
            | Node::Literal(..) => {}
        }
        out
    }
}

/// One node per top-level statement, in source order.
pub fn top_level_nodes(module: &Module) -> Vec<Node<'_>> {
    module
        .statements
        .iter()
        .filter_map(|statement| match statement {
            DecoratedStatement::Import(import) => Some(Node::Import(import)),
            DecoratedStatement::Alias(alias) => Some(Node::Alias(alias)),
            DecoratedStatement::CustomType(custom) => Some(Node::CustomType(custom)),
            DecoratedStatement::Annotation(annotation) => Some(Node::Annotation(annotation)),
            DecoratedStatement::Definition(index) => module.definitions.get(*index).map(Node::Definition),
        })
        .collect()
}

/// Appends `node` and every node below it.
pub fn expand_child_nodes<'a>(node: Node<'a>, module: &'a Module, out: &mut Vec<Node<'a>>) {
    out.push(node);
    for child in node.children(module) {
        expand_child_nodes(child, module, out);
    }
}

/// Every node of the module, flattened.
pub fn expand_module(module: &Module) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    for node in top_level_nodes(module) {
        expand_child_nodes(node, module, &mut out);
    }
    out
}

fn push_module_path<'a>(path: &'a ModuleReference, out: &mut Vec<Node<'a>>) {
    for part in &path.parts {
        out.push(Node::ModulePart { path, part });
    }
}

fn push_type_parameters<'a>(parameters: &'a [LocalTypeDefinition], out: &mut Vec<Node<'a>>) {
    for parameter in parameters {
        if let Some(range) = parameter.range {
            out.push(Node::TypeParameter(parameter, range));
        }
    }
}

fn push_bindings<'a>(module: &'a Module, ids: &[BindingId], out: &mut Vec<Node<'a>>) {
    for id in ids {
        if let Some(binding) = module.binding(*id) {
            out.push(Node::Binding(*id, binding));
        }
    }
}

/// Types only become nodes when they were written in source. Declared
/// custom types and aliases carry their declaration range, not a use site.
fn push_type<'a>(ty: &'a Ty, out: &mut Vec<Node<'a>>) {
    let written = !matches!(
        ty.as_ref(),
        Type::Primitive(_) | Type::Custom(_) | Type::Alias(_) | Type::CustomVariant(_)
    );
    if let Some(range) = ty.source_range().filter(|_| written) {
        out.push(Node::Type(ty, range));
    }
}

fn type_children<'a>(ty: &'a Ty, out: &mut Vec<Node<'a>>) {
    match ty.as_ref() {
        Type::Reference(reference) => {
            if let Some(path) = &reference.module {
                push_module_path(path, out);
            }
        }
        Type::Function(function) => {
            for part in &function.parts {
                push_type(part, out);
            }
        }
        Type::Tuple(tuple) => {
            for item in &tuple.items {
                push_type(item, out);
            }
        }
        Type::Record(record) => {
            for field in &record.fields {
                if let Some(range) = field.name_range {
                    out.push(Node::Property {
                        name: &field.name,
                        range,
                        ty: Some(&field.ty),
                    });
                }
                push_type(&field.ty, out);
            }
        }
        Type::Invoker(invoker) => {
            push_type(&invoker.generator, out);
            for param in &invoker.params {
                push_type(param, out);
            }
        }
        Type::LocalTypeContext(context) => push_type(&context.next, out),
        Type::Primitive(_)
        | Type::Custom(_)
        | Type::RecursiveReference(_)
        | Type::CustomVariant(_)
        | Type::Alias(_)
        | Type::LocalType(_)
        | Type::Unmanaged(_)
        | Type::AnyMatching(_) => {}
    }
}

fn push_expressions<'a>(expressions: &'a [Expression], out: &mut Vec<Node<'a>>) {
    out.extend(expressions.iter().map(Node::Expression));
}

fn expression_children<'a>(expression: &'a Expression, module: &'a Module, out: &mut Vec<Node<'a>>) {
    match &expression.kind {
        ExpressionKind::Integer(_)
        | ExpressionKind::Fixed(_)
        | ExpressionKind::Bool(_)
        | ExpressionKind::Character(_)
        | ExpressionKind::String(_)
        | ExpressionKind::ResourceName(_)
        | ExpressionKind::TypeId(_)
        | ExpressionKind::Asm(_) => {}
        ExpressionKind::StringInterpolation { parts, .. } => {
            for part in parts {
                match part {
                    InterpolationPart::Text { ranges, .. } => {
                        out.extend(ranges.iter().map(|range| Node::Literal(LiteralKind::String, *range)));
                    }
                    InterpolationPart::Expression(inner) => out.push(Node::Expression(inner)),
                }
            }
        }
        ExpressionKind::List(items) | ExpressionKind::Array(items) | ExpressionKind::Tuple(items) => {
            push_expressions(items, out)
        }
        ExpressionKind::RecordLiteral { template, fields } => {
            if let Some(template) = template {
                out.push(Node::Expression(template));
            }
            for field in fields {
                out.push(Node::Property {
                    name: &field.name.name,
                    range: field.name.range,
                    ty: Some(&field.expression.ty),
                });
                out.push(Node::Expression(&field.expression));
            }
        }
        ExpressionKind::Reference(reference) => {
            if let Some(path) = &reference.module {
                push_module_path(path, out);
            }
        }
        ExpressionKind::CustomTypeVariantConstructor { variant, arguments, .. } => {
            out.push(Node::NamedType(variant));
            push_expressions(arguments, out);
        }
        ExpressionKind::RecordConstructorFromRecord { alias, record } => {
            out.push(Node::NamedType(alias));
            out.push(Node::Expression(record));
        }
        ExpressionKind::RecordConstructorFromParameters { alias, arguments } => {
            out.push(Node::NamedType(alias));
            push_expressions(arguments, out);
        }
        ExpressionKind::BinaryOperator {
            operator_range,
            left,
            right,
            ..
        } => {
            out.push(Node::Expression(left));
            out.push(Node::Operator(*operator_range));
            out.push(Node::Expression(right));
        }
        ExpressionKind::UnaryOperator {
            operator_range,
            operand,
            ..
        } => {
            out.push(Node::Operator(*operator_range));
            out.push(Node::Expression(operand));
        }
        ExpressionKind::Pipe {
            operator_range, call, ..
        } => {
            out.push(Node::Operator(*operator_range));
            out.push(Node::Expression(call));
        }
        ExpressionKind::If {
            if_keyword,
            condition,
            then_keyword,
            consequence,
            else_keyword,
            alternative,
        } => {
            out.push(Node::Keyword(*if_keyword));
            out.push(Node::Expression(condition));
            out.push(Node::Keyword(*then_keyword));
            out.push(Node::Expression(consequence));
            out.push(Node::Keyword(*else_keyword));
            out.push(Node::Expression(alternative));
        }
        ExpressionKind::Let {
            let_keyword,
            assignments,
            in_keyword,
            body,
        } => {
            out.push(Node::Keyword(*let_keyword));
            for assignment in assignments {
                push_bindings(module, &assignment.bindings, out);
                out.push(Node::Expression(&assignment.expression));
            }
            out.push(Node::Keyword(*in_keyword));
            out.push(Node::Expression(body));
        }
        ExpressionKind::CaseCustomType {
            case_keyword,
            test,
            of_keyword,
            consequences,
            default,
        } => {
            out.push(Node::Keyword(*case_keyword));
            out.push(Node::Expression(test));
            out.push(Node::Keyword(*of_keyword));
            for consequence in consequences {
                out.push(Node::NamedType(&consequence.variant));
                push_bindings(module, &consequence.parameters, out);
                out.push(Node::Operator(consequence.arrow));
                out.push(Node::Expression(&consequence.expression));
            }
            if let Some(default) = default {
                out.push(Node::Operator(default.arrow));
                out.push(Node::Expression(&default.expression));
            }
        }
        ExpressionKind::CasePattern {
            case_keyword,
            test,
            of_keyword,
            consequences,
            default,
        } => {
            out.push(Node::Keyword(*case_keyword));
            out.push(Node::Expression(test));
            out.push(Node::Keyword(*of_keyword));
            for consequence in consequences {
                out.push(Node::Expression(&consequence.pattern));
                out.push(Node::Operator(consequence.arrow));
                out.push(Node::Expression(&consequence.expression));
            }
            if let Some(default) = default {
                out.push(Node::Operator(default.arrow));
                out.push(Node::Expression(&default.expression));
            }
        }
        ExpressionKind::Guard { items, default } => {
            for item in items {
                out.push(Node::Expression(&item.condition));
                out.push(Node::Operator(item.arrow));
                out.push(Node::Expression(&item.consequence));
            }
            if let Some(default) = default {
                out.push(Node::Operator(default.arrow));
                out.push(Node::Expression(&default.expression));
            }
        }
        ExpressionKind::FunctionCall { function, arguments }
        | ExpressionKind::IncompleteFunctionCall { function, arguments }
        | ExpressionKind::CurryFunction { function, arguments }
        | ExpressionKind::RecurCall { function, arguments } => {
            out.push(Node::Expression(function));
            push_expressions(arguments, out);
        }
        ExpressionKind::Lambda {
            backslash,
            parameters,
            arrow,
            body,
        } => {
            out.push(Node::Operator(*backslash));
            push_bindings(module, parameters, out);
            out.push(Node::Operator(*arrow));
            out.push(Node::Expression(body));
        }
        ExpressionKind::RecordLookups { base, lookups } => {
            out.push(Node::Expression(base));
            out.extend(lookups.iter().map(lookup_node));
        }
        ExpressionKind::CastOperator {
            expression,
            as_keyword,
            alias,
        } => {
            out.push(Node::Expression(expression));
            out.push(Node::Keyword(*as_keyword));
            out.push(Node::NamedType(alias));
        }
        ExpressionKind::ExternalFunction {
            keyword,
            name_range,
            arity_range,
            ..
        } => {
            out.push(Node::Keyword(*keyword));
            out.push(Node::Literal(LiteralKind::String, *name_range));
            out.push(Node::Literal(LiteralKind::Number, *arity_range));
        }
        ExpressionKind::Poisoned { children } => push_expressions(children, out),
    }
}

fn lookup_node(lookup: &RecordLookup) -> Node<'_> {
    Node::Property {
        name: &lookup.field.name,
        range: lookup.field.range,
        ty: Some(&lookup.ty),
    }
}
