//! Per-module symbol tables.
//!
//! A [`Module`] is built mutably by the decorator and frozen behind an `Arc`
//! once decoration finishes. Cross-module uses only flip the atomic
//! `was_referenced` flag of the imported definition; the use sites themselves
//! are recorded on the importing side in [`ImportedDefinition::references`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decorated::{Binding, BindingId, DecoratedStatement, FunctionValue};
use crate::errors::{DecorateErrorKind, FenError};
use crate::source::{DocumentUri, Range, SourceFileReference};
use crate::surface::{Comment, VariableIdentifier};
use crate::types::{PrimitiveTable, Ty};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Function,
    Constant,
}

#[derive(Debug)]
pub struct ModuleDefinition {
    pub identifier: VariableIdentifier,
    pub fq_name: String,
    pub kind: DefinitionKind,
    /// Annotated type, or the inferred type of a constant.
    pub ty: Ty,
    pub annotated: bool,
    pub parameters: Vec<VariableIdentifier>,
    pub value: Option<FunctionValue>,
    /// Use sites inside this module.
    pub references: Vec<Range>,
    was_referenced: AtomicBool,
}

impl ModuleDefinition {
    pub fn new(
        identifier: VariableIdentifier,
        fq_name: String,
        kind: DefinitionKind,
        ty: Ty,
        annotated: bool,
        parameters: Vec<VariableIdentifier>,
    ) -> Self {
        Self {
            identifier,
            fq_name,
            kind,
            ty,
            annotated,
            parameters,
            value: None,
            references: Vec::new(),
            was_referenced: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.identifier.name
    }

    pub fn was_referenced(&self) -> bool {
        self.was_referenced.load(Ordering::Relaxed)
    }

    pub fn mark_referenced(&self) {
        self.was_referenced.store(true, Ordering::Relaxed);
    }

    /// `name : Type` as shown on hover and in the outline.
    pub fn signature(&self) -> String {
        format!("{} : {}", self.identifier.name, self.ty.human_readable())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTypeKind {
    Primitive,
    Alias,
    Custom,
    /// A custom type variant registered for constructor lookup.
    Variant,
}

#[derive(Debug, Clone)]
pub struct ModuleType {
    pub name: String,
    pub ty: Ty,
    pub kind: ModuleTypeKind,
    pub declared_at: Range,
}

/// Locally declared types in declaration order.
#[derive(Debug, Default)]
pub struct ModuleTypes {
    entries: Vec<ModuleType>,
    by_name: HashMap<String, usize>,
}

impl ModuleTypes {
    pub fn add(&mut self, entry: ModuleType) -> Result<usize, DecorateErrorKind> {
        if self.by_name.contains_key(&entry.name) {
            return Err(DecorateErrorKind::AlreadyDeclared(entry.name));
        }
        let index = self.entries.len();
        self.by_name.insert(entry.name.clone(), index);
        self.entries.push(entry);
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<&ModuleType> {
        self.by_name.get(name).map(|index| &self.entries[*index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleType> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Top-level values and functions in declaration order.
#[derive(Debug, Default)]
pub struct ModuleDefinitions {
    entries: Vec<ModuleDefinition>,
    by_name: HashMap<String, usize>,
}

impl ModuleDefinitions {
    pub fn add(&mut self, definition: ModuleDefinition) -> Result<usize, DecorateErrorKind> {
        if self.by_name.contains_key(definition.name()) {
            return Err(DecorateErrorKind::AlreadyDeclared(definition.name().to_string()));
        }
        let index = self.entries.len();
        self.by_name.insert(definition.name().to_string(), index);
        self.entries.push(definition);
        Ok(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, index: usize) -> Option<&ModuleDefinition> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ModuleDefinition> {
        self.entries.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<&ModuleDefinition> {
        self.index_of(name).map(|index| &self.entries[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ModuleImport {
    pub path: Vec<String>,
    pub alias: Option<String>,
    pub module: Arc<Module>,
    /// Range of the module path in the import statement.
    pub range: Range,
    pub was_referenced: bool,
}

impl ModuleImport {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// Name the module is addressed by in scoped references.
    pub fn local_name(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.dotted())
    }
}

/// Imported modules, one entry per module path.
#[derive(Debug, Default)]
pub struct ModuleImports {
    entries: Vec<ModuleImport>,
}

impl ModuleImports {
    /// Adds the import, or returns the existing entry for the same path.
    pub fn add(&mut self, import: ModuleImport) -> usize {
        if let Some(index) = self.entries.iter().position(|entry| entry.path == import.path) {
            if self.entries[index].alias.is_none() {
                self.entries[index].alias = import.alias;
            }
            return index;
        }
        self.entries.push(import);
        self.entries.len() - 1
    }

    /// Finds an import by alias or by its full dotted path.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.alias.as_deref() == Some(name))
            .or_else(|| self.entries.iter().position(|entry| entry.dotted() == name))
    }

    pub fn get(&self, index: usize) -> Option<&ModuleImport> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ModuleImport> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleImport> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A definition of another module that this module can name.
#[derive(Debug, Clone)]
pub struct ImportedDefinition {
    pub import_index: usize,
    pub definition_index: usize,
    pub name: String,
    /// Set when the name is usable without a module prefix.
    pub exposed_unqualified: bool,
    /// The `exposing (name)` item that named it explicitly.
    pub exposing_range: Option<Range>,
    pub references: Vec<Range>,
}

#[derive(Debug, Clone)]
pub struct ImportedType {
    pub import_index: usize,
    pub name: String,
    pub ty: Ty,
    pub kind: ModuleTypeKind,
    pub exposed_unqualified: bool,
}

#[derive(Debug)]
pub struct Module {
    pub path: Vec<String>,
    pub fq_name: String,
    pub document: DocumentUri,
    pub types: ModuleTypes,
    pub definitions: ModuleDefinitions,
    pub imports: ModuleImports,
    pub imported_definitions: Vec<ImportedDefinition>,
    pub imported_types: Vec<ImportedType>,
    /// Name → index into `definitions`.
    pub exposed_definitions: BTreeMap<String, usize>,
    pub exposed_types: BTreeMap<String, ModuleType>,
    pub bindings: Vec<Binding>,
    pub statements: Vec<DecoratedStatement>,
    pub comments: Vec<Comment>,
    pub primitives: PrimitiveTable,
}

impl Module {
    pub fn new(path: Vec<String>, document: DocumentUri) -> Self {
        let fq_name = path.join(".");
        Self {
            path,
            fq_name,
            document,
            types: ModuleTypes::default(),
            definitions: ModuleDefinitions::default(),
            imports: ModuleImports::default(),
            imported_definitions: Vec::new(),
            imported_types: Vec::new(),
            exposed_definitions: BTreeMap::new(),
            exposed_types: BTreeMap::new(),
            bindings: Vec::new(),
            statements: Vec::new(),
            comments: Vec::new(),
            primitives: PrimitiveTable::new(),
        }
    }

    pub fn add_definition(&mut self, definition: ModuleDefinition) -> Result<usize, DecorateErrorKind> {
        self.definitions.add(definition)
    }

    pub fn add_type(&mut self, entry: ModuleType) -> Result<usize, DecorateErrorKind> {
        if self.primitives.find(&entry.name).is_some() {
            return Err(DecorateErrorKind::AlreadyDeclared(entry.name));
        }
        self.types.add(entry)
    }

    pub fn expose_definition(&mut self, name: &str) -> bool {
        match self.definitions.index_of(name) {
            Some(index) => {
                self.exposed_definitions.insert(name.to_string(), index);
                true
            }
            None => false,
        }
    }

    pub fn expose_type(&mut self, name: &str) -> bool {
        match self.types.get(name) {
            Some(entry) => {
                let entry = entry.clone();
                self.exposed_types.insert(name.to_string(), entry);
                true
            }
            None => false,
        }
    }

    /// Exposes every local definition and type.
    pub fn expose_all(&mut self) {
        let definitions: Vec<String> = self.definitions.iter().map(|d| d.name().to_string()).collect();
        for name in definitions {
            self.expose_definition(&name);
        }
        let types: Vec<String> = self.types.iter().map(|t| t.name.clone()).collect();
        for name in types {
            self.expose_type(&name);
        }
    }

    pub fn import_module(
        &mut self,
        path: Vec<String>,
        alias: Option<String>,
        module: Arc<Module>,
        range: Range,
    ) -> usize {
        self.imports.add(ModuleImport {
            path,
            alias,
            module,
            range,
            was_referenced: false,
        })
    }

    /// Local definition first, then unqualified imports. Marks the hit as
    /// referenced.
    pub fn find_definition(&mut self, name: &str) -> Option<DefinitionLookup> {
        if let Some(index) = self.definitions.index_of(name) {
            if let Some(definition) = self.definitions.get(index) {
                definition.mark_referenced();
            }
            log::trace!("{}: '{name}' resolved locally", self.fq_name);
            return Some(DefinitionLookup::Local(index));
        }
        let imported = self
            .imported_definitions
            .iter()
            .position(|imported| imported.exposed_unqualified && imported.name == name)?;
        self.mark_imported(imported);
        log::trace!("{}: '{name}' resolved through an import", self.fq_name);
        Some(DefinitionLookup::Imported(imported))
    }

    /// `Mod.name` through the import table.
    pub fn find_scoped_definition(
        &mut self,
        module: &str,
        name: &str,
    ) -> Result<DefinitionLookup, DecorateErrorKind> {
        let import_index = self
            .imports
            .find(module)
            .ok_or_else(|| DecorateErrorKind::UnknownModule(module.to_string()))?;
        let existing = self
            .imported_definitions
            .iter()
            .position(|imported| imported.import_index == import_index && imported.name == name);
        let imported = match existing {
            Some(imported) => imported,
            None => {
                let definition_index = self
                    .imports
                    .get(import_index)
                    .and_then(|import| import.module.exposed_definitions.get(name).copied())
                    .ok_or_else(|| DecorateErrorKind::NotExposed {
                        module: module.to_string(),
                        name: name.to_string(),
                    })?;
                self.imported_definitions.push(ImportedDefinition {
                    import_index,
                    definition_index,
                    name: name.to_string(),
                    exposed_unqualified: false,
                    exposing_range: None,
                    references: Vec::new(),
                });
                self.imported_definitions.len() - 1
            }
        };
        self.mark_imported(imported);
        Ok(DefinitionLookup::Imported(imported))
    }

    fn mark_imported(&mut self, imported: usize) {
        let Some(entry) = self.imported_definitions.get(imported) else {
            return;
        };
        let (import_index, definition_index) = (entry.import_index, entry.definition_index);
        if let Some(import) = self.imports.get_mut(import_index) {
            import.was_referenced = true;
            if let Some(definition) = import.module.definitions.get(definition_index) {
                definition.mark_referenced();
            }
        }
    }

    /// The foreign definition behind an imported entry.
    pub fn imported_definition(&self, imported: usize) -> Option<(&ModuleImport, &ModuleDefinition)> {
        let entry = self.imported_definitions.get(imported)?;
        let import = self.imports.get(entry.import_index)?;
        let definition = import.module.definitions.get(entry.definition_index)?;
        Some((import, definition))
    }

    pub fn fully_qualified_name(&self, identifier: &str) -> String {
        if self.fq_name.is_empty() {
            identifier.to_string()
        } else {
            format!("{}.{}", self.fq_name, identifier)
        }
    }

    pub fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0)
    }

    pub fn reference_to(&self, range: Range) -> SourceFileReference {
        SourceFileReference::new(range, self.document.clone())
    }

    /// Resolved definition for a decorated reference target.
    pub fn definition_for(&self, import: Option<usize>, index: usize) -> Option<(&Module, &ModuleDefinition)> {
        match import {
            None => self.definitions.get(index).map(|definition| (self, definition)),
            Some(import) => {
                let module = &self.imports.get(import)?.module;
                module
                    .definitions
                    .get(index)
                    .map(|definition| (module.as_ref(), definition))
            }
        }
    }

    /// Looks up a type by name, local types first, then unqualified imports.
    pub fn find_local_or_imported_type(&self, name: &str) -> Option<(Ty, ModuleTypeKind)> {
        if let Some(entry) = self.types.get(name) {
            return Some((entry.ty.clone(), entry.kind));
        }
        self.imported_types
            .iter()
            .find(|imported| imported.exposed_unqualified && imported.name == name)
            .map(|imported| (imported.ty.clone(), imported.kind))
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.types.is_empty() && self.imports.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionLookup {
    Local(usize),
    /// Index into [`Module::imported_definitions`].
    Imported(usize),
}

/// Supplies decorated modules for `import` statements.
pub trait ModuleResolver {
    fn resolve_module(&mut self, path: &[String], import_range: Range) -> Result<Arc<Module>, FenError>;
}

/// Resolver over a fixed set of already decorated modules.
#[derive(Debug, Default, Clone)]
pub struct StaticModules {
    modules: HashMap<Vec<String>, Arc<Module>>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: Arc<Module>) {
        self.modules.insert(module.path.clone(), module);
    }
}

impl ModuleResolver for StaticModules {
    fn resolve_module(&mut self, path: &[String], _import_range: Range) -> Result<Arc<Module>, FenError> {
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| FenError::ModuleNotFound(path.join(".")))
    }
}
