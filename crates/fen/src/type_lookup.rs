//! Type name resolution against a module and its imports.

use std::sync::Arc;

use crate::errors::DecorateErrorKind;
use crate::module::{Module, ModuleType, ModuleTypeKind};
use crate::source::{Range, SourceFileReference};
use crate::surface::{ModuleReference, ScopedTypeIdentifier, TypeIdentifier};
use crate::types::{
    AliasType, CustomType, CustomVariantType, LocalContextId, LocalTypeDefinition, ReferenceFlavour, Ty, Type,
    TypeReference,
};

#[derive(Debug, Clone)]
pub struct FoundType {
    pub ty: Ty,
    pub kind: ModuleTypeKind,
}

impl FoundType {
    fn flavour(&self, scoped: bool) -> ReferenceFlavour {
        if scoped {
            return ReferenceFlavour::Scoped;
        }
        match self.kind {
            ModuleTypeKind::Primitive => ReferenceFlavour::Primitive,
            ModuleTypeKind::Alias => ReferenceFlavour::Alias,
            ModuleTypeKind::Custom => ReferenceFlavour::Type,
            ModuleTypeKind::Variant => ReferenceFlavour::CustomTypeVariant,
        }
    }
}

pub trait TypeLookup {
    /// Primitives, then local types, then types imported unqualified.
    fn find_type(&mut self, identifier: &TypeIdentifier) -> Result<FoundType, DecorateErrorKind>;

    /// `Mod.Type` routed through the module's imports.
    fn find_type_scoped(
        &mut self,
        module: &ModuleReference,
        identifier: &TypeIdentifier,
    ) -> Result<FoundType, DecorateErrorKind>;

    /// Wraps the found type so the use-site identifier is kept.
    fn create_type_reference(&mut self, identifier: &TypeIdentifier) -> Result<(Ty, FoundType), DecorateErrorKind> {
        let found = self.find_type(identifier)?;
        let reference = Arc::new(Type::Reference(TypeReference {
            flavour: found.flavour(false),
            module: None,
            identifier: identifier.clone(),
            next: found.ty.clone(),
        }));
        Ok((reference, found))
    }

    fn create_type_scoped_reference(
        &mut self,
        module: &ModuleReference,
        identifier: &TypeIdentifier,
    ) -> Result<(Ty, FoundType), DecorateErrorKind> {
        let found = self.find_type_scoped(module, identifier)?;
        let reference = Arc::new(Type::Reference(TypeReference {
            flavour: found.flavour(true),
            module: Some(module.clone()),
            identifier: identifier.clone(),
            next: found.ty.clone(),
        }));
        Ok((reference, found))
    }

    fn create_some_type_reference(
        &mut self,
        name: &ScopedTypeIdentifier,
    ) -> Result<(Ty, FoundType), DecorateErrorKind> {
        match &name.module {
            Some(module) => self.create_type_scoped_reference(module, &name.identifier),
            None => self.create_type_reference(&name.identifier),
        }
    }
}

/// Registration of declared types; only used while declarations are read.
pub trait TypeCreateAndLookup: TypeLookup {
    fn add_type_alias(
        &mut self,
        name: &TypeIdentifier,
        parameters: Vec<LocalTypeDefinition>,
        context: LocalContextId,
        next: Ty,
    ) -> Result<Ty, DecorateErrorKind>;

    /// Registers the custom type and each variant under its own name.
    /// Returns the errors of variants that collide with existing names.
    fn add_custom_type(&mut self, custom: Ty, declared_at: Range) -> Vec<(DecorateErrorKind, Range)>;
}

impl TypeLookup for Module {
    fn find_type(&mut self, identifier: &TypeIdentifier) -> Result<FoundType, DecorateErrorKind> {
        if let Some(ty) = self.primitives.find(&identifier.name) {
            return Ok(FoundType {
                ty,
                kind: ModuleTypeKind::Primitive,
            });
        }
        if let Some(entry) = self.types.get(&identifier.name) {
            return Ok(FoundType {
                ty: entry.ty.clone(),
                kind: entry.kind,
            });
        }
        let imported = self
            .imported_types
            .iter()
            .find(|imported| imported.exposed_unqualified && imported.name == identifier.name)
            .map(|imported| (imported.import_index, imported.ty.clone(), imported.kind));
        match imported {
            Some((import_index, ty, kind)) => {
                if let Some(import) = self.imports.get_mut(import_index) {
                    import.was_referenced = true;
                }
                log::trace!("{}: type '{}' resolved through an import", self.fq_name, identifier.name);
                Ok(FoundType { ty, kind })
            }
            None => Err(DecorateErrorKind::UnknownType(identifier.name.clone())),
        }
    }

    fn find_type_scoped(
        &mut self,
        module: &ModuleReference,
        identifier: &TypeIdentifier,
    ) -> Result<FoundType, DecorateErrorKind> {
        let dotted = module.dotted();
        let import_index = self
            .imports
            .find(&dotted)
            .ok_or_else(|| DecorateErrorKind::UnknownModule(dotted.clone()))?;
        let import = self
            .imports
            .get_mut(import_index)
            .ok_or_else(|| DecorateErrorKind::UnknownModule(dotted.clone()))?;
        let entry = import
            .module
            .exposed_types
            .get(&identifier.name)
            .cloned()
            .ok_or_else(|| DecorateErrorKind::NotExposed {
                module: dotted.clone(),
                name: identifier.name.clone(),
            })?;
        import.was_referenced = true;
        Ok(FoundType {
            ty: entry.ty,
            kind: entry.kind,
        })
    }
}

impl TypeCreateAndLookup for Module {
    fn add_type_alias(
        &mut self,
        name: &TypeIdentifier,
        parameters: Vec<LocalTypeDefinition>,
        context: LocalContextId,
        next: Ty,
    ) -> Result<Ty, DecorateErrorKind> {
        let alias = Arc::new(Type::Alias(AliasType {
            name: name.name.clone(),
            fq_name: self.fully_qualified_name(&name.name),
            declared_at: Some(SourceFileReference::new(name.range, self.document.clone())),
            parameters,
            context,
            next,
        }));
        self.add_type(ModuleType {
            name: name.name.clone(),
            ty: alias.clone(),
            kind: ModuleTypeKind::Alias,
            declared_at: name.range,
        })?;
        Ok(alias)
    }

    fn add_custom_type(&mut self, custom: Ty, declared_at: Range) -> Vec<(DecorateErrorKind, Range)> {
        let mut errors = Vec::new();
        let Type::Custom(CustomType { name, variants, .. }) = custom.as_ref() else {
            return errors;
        };
        if let Err(error) = self.add_type(ModuleType {
            name: name.clone(),
            ty: custom.clone(),
            kind: ModuleTypeKind::Custom,
            declared_at,
        }) {
            errors.push((error, declared_at));
        }
        for variant in variants {
            let range = variant.name_range.unwrap_or(declared_at);
            let registered = Arc::new(Type::CustomVariant(CustomVariantType {
                custom: custom.clone(),
                index: variant.index,
            }));
            if let Err(error) = self.add_type(ModuleType {
                name: variant.name.clone(),
                ty: registered,
                kind: ModuleTypeKind::Variant,
                declared_at: range,
            }) {
                errors.push((error, range));
            }
        }
        errors
    }
}
