use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fen::{CompiledDocument, DocumentOverlay, FenError, FileSystemDocuments, ProjectConfig, Workspace};
use tower_lsp::lsp_types::{Diagnostic, Url};

use crate::backend::Backend;
use crate::settings::LspSettings;

pub(crate) type LspWorkspace = Workspace<DocumentOverlay<FileSystemDocuments>>;

pub(crate) struct OpenDocument {
    pub(crate) uri: Url,
    pub(crate) version: Option<i32>,
}

/// Diagnostics ready to send for one document.
#[derive(Debug)]
pub(crate) struct Published {
    pub(crate) uri: Url,
    pub(crate) version: Option<i32>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

pub(crate) struct BackendState {
    pub(crate) workspace: LspWorkspace,
    pub(crate) project: ProjectConfig,
    pub(crate) settings: LspSettings,
    pub(crate) open: HashMap<PathBuf, OpenDocument>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            workspace: Workspace::new(DocumentOverlay::new(FileSystemDocuments), Vec::new()),
            project: ProjectConfig::default(),
            settings: LspSettings::default(),
            open: HashMap::new(),
        }
    }
}

impl BackendState {
    /// Reads `fen.toml` under `root` and points the workspace at its source
    /// roots. On a bad project file the defaults stay in effect.
    pub(crate) fn configure_root(&mut self, root: Option<PathBuf>) -> Result<(), FenError> {
        let Some(root) = root else {
            return Ok(());
        };
        let loaded = ProjectConfig::load(&root);
        self.project = match &loaded {
            Ok(config) => config.clone(),
            Err(_) => ProjectConfig::default(),
        };
        self.workspace.set_source_roots(self.project.source_roots(&root));
        loaded.map(|_| ())
    }

    pub(crate) fn apply_settings(&mut self) {
        let options = self.settings.decorate_options(&self.project);
        self.workspace.set_options(options);
        if let Some(level) = self.settings.level() {
            crate::logging::set_level(level);
        }
    }

    /// Without a workspace root, a document's own directory resolves its
    /// imports.
    fn ensure_source_root(&mut self, path: &Path) {
        if !self.workspace.source_roots().is_empty() {
            return;
        }
        if let Some(parent) = path.parent() {
            log::debug!("no workspace root, resolving imports from {}", parent.display());
            self.workspace.set_source_roots(vec![parent.to_path_buf()]);
        }
    }

    /// Overlays `text` and recompiles it along with every open document that
    /// imports it.
    pub(crate) fn open_document(&mut self, uri: Url, version: Option<i32>, text: String) -> Vec<Published> {
        let path = Backend::path_from_uri(&uri);
        self.ensure_source_root(&path);
        self.workspace.provider_mut().open_in_memory(path.clone(), text);
        self.open.insert(path.clone(), OpenDocument { uri, version });
        let mut stale = self.workspace.invalidate_with_dependents(&path);
        if !stale.contains(&path) {
            stale.push(path);
        }
        self.recompile(stale)
    }

    /// Drops the overlay; dependents fall back to the file on disk.
    pub(crate) fn close_document(&mut self, uri: &Url) -> (Url, Vec<Published>) {
        let path = Backend::path_from_uri(uri);
        self.workspace.provider_mut().close(&path);
        let closed = self.open.remove(&path).map_or_else(|| uri.clone(), |document| document.uri);
        let stale = self.workspace.invalidate_with_dependents(&path);
        (closed, self.recompile(stale))
    }

    /// Recompiles every open document, e.g. after a settings change.
    pub(crate) fn recompile_open(&mut self) -> Vec<Published> {
        let mut paths: Vec<PathBuf> = self.open.keys().cloned().collect();
        paths.sort();
        for path in &paths {
            self.workspace.invalidate(path);
        }
        self.recompile(paths)
    }

    /// Latest compile of the document behind `uri`.
    pub(crate) fn compiled_for(&mut self, uri: &Url) -> Option<Arc<CompiledDocument>> {
        let path = Backend::path_from_uri(uri);
        match self.workspace.compiled(&path) {
            Ok(compiled) => Some(compiled),
            Err(err) => {
                log::debug!("no compiled document for {uri}: {err}");
                None
            }
        }
    }

    fn recompile(&mut self, paths: Vec<PathBuf>) -> Vec<Published> {
        let mut published = Vec::new();
        for path in paths {
            let Some(document) = self.open.get(&path) else {
                continue;
            };
            let (uri, version) = (document.uri.clone(), document.version);
            match self.workspace.compiled(&path) {
                Ok(compiled) => published.push(Published {
                    diagnostics: Backend::build_diagnostics(&uri, &compiled),
                    uri,
                    version,
                }),
                Err(err) => log::warn!("could not compile {}: {err}", path.display()),
            }
        }
        published
    }
}
