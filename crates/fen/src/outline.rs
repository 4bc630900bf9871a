//! Document outline: one entry per top-level declaration.

use serde::Serialize;

use crate::decorated::DecoratedStatement;
use crate::module::{DefinitionKind, Module};
use crate::source::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutlineKind {
    Module,
    TypeAlias,
    Record,
    CustomType,
    Variant,
    Function,
    Constant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineSymbol {
    pub name: String,
    pub detail: Option<String>,
    pub kind: OutlineKind,
    /// Whole declaration.
    pub range: Range,
    /// The declared name.
    pub selection_range: Range,
    pub children: Vec<OutlineSymbol>,
}

pub fn document_symbols(module: &Module) -> Vec<OutlineSymbol> {
    module
        .statements
        .iter()
        .filter_map(|statement| statement_symbol(statement, module))
        .collect()
}

fn statement_symbol(statement: &DecoratedStatement, module: &Module) -> Option<OutlineSymbol> {
    let symbol = match statement {
        DecoratedStatement::Import(import) => OutlineSymbol {
            name: import.path.dotted(),
            detail: import.alias.as_ref().map(|(_, alias)| format!("as {}", alias.name)),
            kind: OutlineKind::Module,
            range: import.range,
            selection_range: import.path.range,
            children: Vec::new(),
        },
        DecoratedStatement::Alias(alias) => OutlineSymbol {
            name: alias.name.name.clone(),
            detail: Some(alias.definition.human_readable()),
            kind: if alias.is_record() {
                OutlineKind::Record
            } else {
                OutlineKind::TypeAlias
            },
            range: alias.range,
            selection_range: alias.name.range,
            children: Vec::new(),
        },
        DecoratedStatement::CustomType(custom) => OutlineSymbol {
            name: custom.name.name.clone(),
            detail: Some(custom.ty.human_readable()),
            kind: OutlineKind::CustomType,
            range: custom.range,
            selection_range: custom.name.range,
            children: custom
                .variants
                .iter()
                .map(|variant| OutlineSymbol {
                    name: variant.name.name.clone(),
                    detail: (!variant.parameters.is_empty()).then(|| {
                        variant
                            .parameters
                            .iter()
                            .map(|parameter| parameter.human_readable())
                            .collect::<Vec<_>>()
                            .join(" ")
                    }),
                    kind: OutlineKind::Variant,
                    range: variant.range,
                    selection_range: variant.name.range,
                    children: Vec::new(),
                })
                .collect(),
        },
        // Signatures are shown on the definition.
        DecoratedStatement::Annotation(_) => return None,
        DecoratedStatement::Definition(index) => {
            let definition = module.definitions.get(*index)?;
            let range = match &definition.value {
                Some(value) => definition.identifier.range.combine_inclusive(&value.expression.range),
                None => definition.identifier.range,
            };
            OutlineSymbol {
                name: definition.identifier.name.clone(),
                detail: Some(definition.ty.human_readable()),
                kind: match definition.kind {
                    DefinitionKind::Function => OutlineKind::Function,
                    DefinitionKind::Constant => OutlineKind::Constant,
                },
                range,
                selection_range: definition.identifier.range,
                children: Vec::new(),
            }
        }
    };
    Some(symbol)
}
