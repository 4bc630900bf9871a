use crate::decorated::BindingKind;
use crate::errors::{DecorateWarningKind, UnusedKind};
use crate::source::Range;

use super::Decorator;

impl<'s, 'r> Decorator<'s, 'r> {
    /// Warns about bindings, exposed imports and imports nobody uses.
    pub(super) fn report_unused(&mut self) {
        let mut found: Vec<(DecorateWarningKind, Range)> = Vec::new();

        for binding in &self.module.bindings {
            if binding.identifier.is_ignore() || binding.was_referenced() {
                continue;
            }
            let kind = match binding.kind {
                BindingKind::FunctionParameter | BindingKind::LambdaParameter => UnusedKind::Parameter,
                BindingKind::LetVariable => UnusedKind::LetVariable,
                BindingKind::CaseConsequenceParameter => UnusedKind::CaseParameter,
            };
            found.push((
                DecorateWarningKind::Unused {
                    kind,
                    name: binding.identifier.name.clone(),
                },
                binding.identifier.range,
            ));
        }

        for imported in &self.module.imported_definitions {
            let Some(exposing_range) = imported.exposing_range else {
                continue;
            };
            if imported.references.is_empty() {
                found.push((
                    DecorateWarningKind::Unused {
                        kind: UnusedKind::ImportedDefinition,
                        name: imported.name.clone(),
                    },
                    exposing_range,
                ));
            }
        }

        for import in self.module.imports.iter() {
            if !import.was_referenced {
                found.push((DecorateWarningKind::UnusedImport(import.dotted()), import.range));
            }
        }

        if self.options.unused_definitions {
            for definition in self.module.definitions.iter() {
                if definition.references.is_empty() {
                    found.push((
                        DecorateWarningKind::Unused {
                            kind: UnusedKind::Definition,
                            name: definition.identifier.name.clone(),
                        },
                        definition.identifier.range,
                    ));
                }
            }
        }

        found.sort_by_key(|(_, range)| range.start);
        for (kind, range) in found {
            self.warning(kind, range);
        }
    }
}
