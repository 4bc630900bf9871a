//! Position based lookups over a decorated module: hover and
//! goto-definition.

use crate::decorated::{ExpressionKind, ReferenceTarget};
use crate::module::Module;
use crate::nodes::{expand_module, Node};
use crate::source::{Position, Range, SourceFileReference};
use crate::surface::ExposedItem;
use crate::types::{strip_to_alias, Ty, Type};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hover {
    pub text: String,
    pub range: Range,
}

/// The most specific node containing `position`. Among nodes of equal size
/// the one visited last wins, which is the deepest.
pub fn find_node(module: &Module, position: Position) -> Option<Node<'_>> {
    let mut best: Option<Node<'_>> = None;
    for node in expand_module(module) {
        let range = node.range();
        if !range.contains(position) {
            continue;
        }
        match &best {
            Some(current) if range.compare_size(&current.range()).is_gt() => {}
            _ => best = Some(node),
        }
    }
    best
}

pub fn hover(module: &Module, position: Position) -> Option<Hover> {
    let node = find_node(module, position)?;
    let text = hover_text(&node, module)?;
    Some(Hover {
        text,
        range: node.range(),
    })
}

fn hover_text(node: &Node<'_>, module: &Module) -> Option<String> {
    let text = match *node {
        Node::Import(import) => format!("import {}", import.path.dotted()),
        Node::ModulePart { path, .. } => format!("module {}", path.dotted()),
        Node::ModuleAlias(alias) => format!("module {}", alias.name),
        Node::Exposed { import, item } => {
            let imported = import.import_index.and_then(|index| module.imports.get(index))?;
            match item {
                ExposedItem::Variable(identifier) => imported.module.definitions.find(&identifier.name)?.signature(),
                ExposedItem::Type { name, .. } => imported.module.types.get(&name.name)?.ty.human_readable(),
            }
        }
        Node::Alias(alias) | Node::AliasName(alias) => {
            format!("type alias {} = {}", alias.name.name, alias.definition.human_readable())
        }
        Node::CustomType(custom) | Node::CustomTypeName(custom) => {
            let variants: Vec<String> = custom
                .variants
                .iter()
                .map(|variant| {
                    std::iter::once(variant.name.name.clone())
                        .chain(variant.parameters.iter().map(|parameter| parameter.human_readable()))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            format!("type {} = {}", custom.ty.human_readable(), variants.join(" | "))
        }
        Node::Variant { custom, .. } => custom.ty.human_readable(),
        Node::TypeParameter(definition, _) => definition.name.clone(),
        Node::Annotation(annotation) | Node::AnnotationName(annotation) => match annotation.definition {
            Some(index) => module.definitions.get(index)?.signature(),
            None => format!("{} : {}", annotation.name.name, annotation.ty.human_readable()),
        },
        Node::Definition(definition) | Node::DefinitionName(definition) => definition.signature(),
        Node::Binding(_, binding) => format!("{} : {}", binding.identifier.name, binding.ty.human_readable()),
        Node::Expression(expression) => match &expression.kind {
            ExpressionKind::Reference(reference) => match reference.target {
                ReferenceTarget::Definition { import, index } => module.definition_for(import, index)?.1.signature(),
                ReferenceTarget::Binding(_) => {
                    format!("{} : {}", reference.identifier.name, expression.ty.human_readable())
                }
            },
            _ => expression.ty.human_readable(),
        },
        Node::NamedType(named) => strip_to_alias(&named.ty).name(),
        Node::Property { name, ty, .. } => match ty {
            Some(ty) => format!("{name} : {}", ty.human_readable()),
            None => name.to_string(),
        },
        Node::Type(ty, _) => ty.human_readable(),
        Node::Keyword(_) | Node::Operator(_) | Node::Literal(..) => return None,
    };
    Some(text)
}

/// Declaration sites for the symbol at `position`.
pub fn goto_definition(module: &Module, position: Position) -> Vec<SourceFileReference> {
    let Some(node) = find_node(module, position) else {
        return Vec::new();
    };
    definition_sites(&node, module)
}

fn definition_sites(node: &Node<'_>, module: &Module) -> Vec<SourceFileReference> {
    let local = |range: Range| vec![module.reference_to(range)];
    match *node {
        Node::ModulePart { path, .. } => module_document(module, &path.path()),
        Node::Import(import) => module_document(module, &import.path.path()),
        Node::ModuleAlias(alias) => module
            .imports
            .iter()
            .find(|import| import.alias.as_deref() == Some(alias.name.as_str()))
            .map(|import| vec![SourceFileReference::new(Range::default(), import.module.document.clone())])
            .unwrap_or_default(),
        Node::Exposed { import, item } => {
            let Some(imported) = import.import_index.and_then(|index| module.imports.get(index)) else {
                return Vec::new();
            };
            let foreign = imported.module.as_ref();
            match item {
                ExposedItem::Variable(identifier) => foreign
                    .definitions
                    .find(&identifier.name)
                    .map(|definition| vec![foreign.reference_to(definition.identifier.range)])
                    .unwrap_or_default(),
                ExposedItem::Type { name, .. } => foreign
                    .types
                    .get(&name.name)
                    .map(|entry| vec![foreign.reference_to(entry.declared_at)])
                    .unwrap_or_default(),
            }
        }
        Node::Alias(alias) | Node::AliasName(alias) => local(alias.name.range),
        Node::CustomType(custom) | Node::CustomTypeName(custom) => local(custom.name.range),
        Node::Variant { variant, .. } => local(variant.name.range),
        Node::TypeParameter(_, range) => local(range),
        Node::Annotation(annotation) | Node::AnnotationName(annotation) => {
            match annotation.definition.and_then(|index| module.definitions.get(index)) {
                Some(definition) => local(definition.identifier.range),
                None => local(annotation.name.range),
            }
        }
        Node::Definition(definition) | Node::DefinitionName(definition) => local(definition.identifier.range),
        Node::Binding(_, binding) => local(binding.identifier.range),
        Node::Expression(expression) => match &expression.kind {
            ExpressionKind::Reference(reference) => match reference.target {
                ReferenceTarget::Binding(id) => module
                    .binding(id)
                    .map(|binding| local(binding.identifier.range))
                    .unwrap_or_default(),
                ReferenceTarget::Definition { import, index } => module
                    .definition_for(import, index)
                    .map(|(owner, definition)| vec![owner.reference_to(definition.identifier.range)])
                    .unwrap_or_default(),
            },
            _ => Vec::new(),
        },
        Node::NamedType(named) => named_type_sites(&named.ty, &named.identifier.name),
        Node::Type(ty, _) => match ty.as_ref() {
            Type::Reference(reference) => named_type_sites(&reference.next, &reference.identifier.name),
            Type::RecursiveReference(reference) => reference
                .target
                .upgrade()
                .map(|target| named_type_sites(&target, &reference.name))
                .unwrap_or_default(),
            _ => Vec::new(),
        },
        Node::Property { .. } | Node::Keyword(_) | Node::Operator(_) | Node::Literal(..) => Vec::new(),
    }
}

/// Where a named type (or one of its variants) was declared.
fn named_type_sites(ty: &Ty, name: &str) -> Vec<SourceFileReference> {
    match strip_to_alias(ty).as_ref() {
        Type::Custom(custom) => {
            let Some(declared_at) = &custom.declared_at else {
                return Vec::new();
            };
            match custom.variant(name).and_then(|variant| variant.name_range) {
                Some(range) => vec![SourceFileReference::new(range, declared_at.document.clone())],
                None => vec![declared_at.clone()],
            }
        }
        Type::Alias(alias) => alias.declared_at.clone().into_iter().collect(),
        _ => Vec::new(),
    }
}

fn module_document(module: &Module, path: &[String]) -> Vec<SourceFileReference> {
    module
        .imports
        .iter()
        .find(|import| import.path == path)
        .map(|import| vec![SourceFileReference::new(Range::default(), import.module.document.clone())])
        .unwrap_or_default()
}

