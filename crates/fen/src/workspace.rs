//! Document sources and the per-document compile cache.
//!
//! A [`Workspace`] maps module paths to files under its source roots,
//! compiles imports before the modules that use them and keeps the latest
//! [`CompiledDocument`] of every file it has seen.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::decorator::{decorate_module, DecorateOptions};
use crate::diagnostics::Diagnostic;
use crate::errors::{DecorateError, DecorateWarning, FenError};
use crate::module::{Module, ModuleResolver};
use crate::source::{DocumentUri, Range};
use crate::surface::parse_source;

pub const SOURCE_EXTENSION: &str = "fen";

pub trait DocumentProvider {
    fn read_document(&self, path: &Path) -> Result<String, FenError>;

    fn has_document(&self, path: &Path) -> bool {
        self.read_document(path).is_ok()
    }
}

/// Reads documents from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemDocuments;

impl DocumentProvider for FileSystemDocuments {
    fn read_document(&self, path: &Path) -> Result<String, FenError> {
        std::fs::read_to_string(path).map_err(|source| FenError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn has_document(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDocuments {
    documents: HashMap<PathBuf, String>,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.documents.insert(path.into(), text.into());
    }

    pub fn remove(&mut self, path: &Path) -> Option<String> {
        self.documents.remove(path)
    }
}

impl DocumentProvider for InMemoryDocuments {
    fn read_document(&self, path: &Path) -> Result<String, FenError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| FenError::UnknownDocument(path.display().to_string()))
    }

    fn has_document(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }
}

/// Open editor buffers layered over another provider.
#[derive(Debug, Clone, Default)]
pub struct DocumentOverlay<P> {
    open: HashMap<PathBuf, String>,
    fallback: P,
}

impl<P: DocumentProvider> DocumentOverlay<P> {
    pub fn new(fallback: P) -> Self {
        Self {
            open: HashMap::new(),
            fallback,
        }
    }

    pub fn open_in_memory(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.open.insert(path.into(), text.into());
    }

    pub fn close(&mut self, path: &Path) {
        self.open.remove(path);
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.open.contains_key(path)
    }
}

impl<P: DocumentProvider> DocumentProvider for DocumentOverlay<P> {
    fn read_document(&self, path: &Path) -> Result<String, FenError> {
        match self.open.get(path) {
            Some(text) => Ok(text.clone()),
            None => self.fallback.read_document(path),
        }
    }

    fn has_document(&self, path: &Path) -> bool {
        self.open.contains_key(path) || self.fallback.has_document(path)
    }
}

/// Result of compiling one document. Never partially updated; a recompile
/// replaces the whole value.
#[derive(Debug)]
pub struct CompiledDocument {
    pub path: PathBuf,
    pub uri: DocumentUri,
    pub module: Arc<Module>,
    pub parse_diagnostics: Vec<Diagnostic>,
    pub errors: Vec<DecorateError>,
    pub warnings: Vec<DecorateWarning>,
}

impl CompiledDocument {
    /// Parse diagnostics, then decoration errors, then warnings.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.parse_diagnostics.clone();
        diagnostics.extend(self.errors.iter().map(DecorateError::to_diagnostic));
        diagnostics.extend(self.warnings.iter().map(DecorateWarning::to_diagnostic));
        diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(Diagnostic::is_error)
    }
}

pub struct Workspace<P> {
    provider: P,
    source_roots: Vec<PathBuf>,
    options: DecorateOptions,
    documents: HashMap<PathBuf, Arc<CompiledDocument>>,
    /// Module paths currently being compiled, outermost first.
    compiling: Vec<Vec<String>>,
}

impl<P: DocumentProvider> Workspace<P> {
    pub fn new(provider: P, source_roots: Vec<PathBuf>) -> Self {
        Self {
            provider,
            source_roots,
            options: DecorateOptions::default(),
            documents: HashMap::new(),
            compiling: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: DecorateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> DecorateOptions {
        self.options
    }

    /// Changing options drops every cached document.
    pub fn set_options(&mut self, options: DecorateOptions) {
        if self.options != options {
            self.options = options;
            self.documents.clear();
        }
    }

    pub fn set_source_roots(&mut self, source_roots: Vec<PathBuf>) {
        self.source_roots = source_roots;
        self.documents.clear();
    }

    pub fn source_roots(&self) -> &[PathBuf] {
        &self.source_roots
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn get(&self, path: &Path) -> Option<Arc<CompiledDocument>> {
        self.documents.get(path).cloned()
    }

    pub fn invalidate(&mut self, path: &Path) {
        self.documents.remove(path);
    }

    /// Drops `path` and every cached document importing it, directly or
    /// through other modules. Returns the dropped paths, sorted.
    pub fn invalidate_with_dependents(&mut self, path: &Path) -> Vec<PathBuf> {
        let mut stale = vec![self.module_path_for(path)];
        let mut removed = Vec::new();
        if self.documents.remove(path).is_some() {
            removed.push(path.to_path_buf());
        }
        loop {
            let dependents: Vec<PathBuf> = self
                .documents
                .iter()
                .filter(|(_, compiled)| compiled.module.imports.iter().any(|import| stale.contains(&import.path)))
                .map(|(dependent, _)| dependent.clone())
                .collect();
            if dependents.is_empty() {
                break;
            }
            for dependent in dependents {
                if let Some(compiled) = self.documents.remove(&dependent) {
                    stale.push(compiled.module.path.clone());
                    removed.push(dependent);
                }
            }
        }
        removed.sort();
        removed
    }

    /// Every cached document path.
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.documents.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Reads, parses and decorates `path`, replacing any cached result.
    pub fn compile(&mut self, path: &Path) -> Result<Arc<CompiledDocument>, FenError> {
        let text = self.provider.read_document(path)?;
        let uri = DocumentUri::from_path(path);
        let module_path = self.module_path_for(path);
        let parsed = parse_source(&text, &uri);

        self.compiling.push(module_path.clone());
        let options = self.options;
        let result = decorate_module(&parsed.module, module_path, uri.clone(), self, options);
        self.compiling.pop();

        let compiled = Arc::new(CompiledDocument {
            path: path.to_path_buf(),
            uri,
            module: Arc::new(result.module),
            parse_diagnostics: parsed.diagnostics,
            errors: result.errors,
            warnings: result.warnings,
        });
        log::debug!(
            "compiled {}: {} diagnostics",
            path.display(),
            compiled.parse_diagnostics.len() + compiled.errors.len() + compiled.warnings.len()
        );
        self.documents.insert(path.to_path_buf(), compiled.clone());
        Ok(compiled)
    }

    /// Cached result, compiling on a miss.
    pub fn compiled(&mut self, path: &Path) -> Result<Arc<CompiledDocument>, FenError> {
        match self.get(path) {
            Some(compiled) => Ok(compiled),
            None => self.compile(path),
        }
    }

    /// `A.B` → `<root>/A/B.fen` in the first source root that has it.
    pub fn locate_module(&self, path: &[String]) -> Option<PathBuf> {
        self.source_roots.iter().find_map(|root| {
            let mut file = root.clone();
            for part in path {
                file.push(part);
            }
            file.set_extension(SOURCE_EXTENSION);
            self.provider.has_document(&file).then_some(file)
        })
    }

    /// Module path of a file below a source root; files outside every root
    /// are named after their stem.
    pub fn module_path_for(&self, file: &Path) -> Vec<String> {
        let relative = self
            .source_roots
            .iter()
            .find_map(|root| file.strip_prefix(root).ok())
            .unwrap_or_else(|| Path::new(file.file_name().unwrap_or_default()));
        let relative = relative.with_extension("");
        relative
            .components()
            .filter_map(|component| match component {
                std::path::Component::Normal(part) => part.to_str().map(str::to_string),
                _ => None,
            })
            .collect()
    }
}

impl<P: DocumentProvider> ModuleResolver for Workspace<P> {
    fn resolve_module(&mut self, path: &[String], import_range: Range) -> Result<Arc<Module>, FenError> {
        if let Some(start) = self.compiling.iter().position(|entry| entry == path) {
            let mut chain: Vec<String> = self.compiling[start..].iter().map(|entry| entry.join(".")).collect();
            chain.push(path.join("."));
            return Err(FenError::CyclicImport(chain));
        }
        let file = self
            .locate_module(path)
            .ok_or_else(|| FenError::ModuleNotFound(path.join(".")))?;
        log::trace!("import {} at {import_range} resolved to {}", path.join("."), file.display());
        Ok(self.compiled(&file)?.module.clone())
    }
}
