//! `fen.toml` project configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::decorator::DecorateOptions;
use crate::errors::FenError;

pub const PROJECT_FILE: &str = "fen.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub diagnostics: DiagnosticsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectSection {
    pub name: Option<String>,
    pub source_roots: Vec<PathBuf>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: None,
            source_roots: vec![PathBuf::from(".")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiagnosticsSection {
    pub unused: bool,
    pub unused_definitions: bool,
}

impl Default for DiagnosticsSection {
    fn default() -> Self {
        Self {
            unused: true,
            unused_definitions: false,
        }
    }
}

impl ProjectConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Reads `<root>/fen.toml`; a missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self, FenError> {
        let path = root.join(PROJECT_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no {PROJECT_FILE} under {}, using defaults", root.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(FenError::Io { path, source }),
        };
        Self::from_toml_str(&text).map_err(|err| FenError::Config {
            path,
            message: err.to_string(),
        })
    }

    /// Source roots resolved against the project root.
    pub fn source_roots(&self, root: &Path) -> Vec<PathBuf> {
        let roots: Vec<PathBuf> = self
            .project
            .source_roots
            .iter()
            .map(|source_root| root.join(source_root))
            .collect();
        if roots.is_empty() {
            vec![root.to_path_buf()]
        } else {
            roots
        }
    }

    pub fn decorate_options(&self) -> DecorateOptions {
        DecorateOptions {
            unused_warnings: self.diagnostics.unused,
            unused_definitions: self.diagnostics.unused_definitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ProjectConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.project.source_roots, vec![PathBuf::from(".")]);
        assert_eq!(config.decorate_options(), DecorateOptions::default());
    }

    #[test]
    fn reads_every_section() {
        let config = ProjectConfig::from_toml_str(
            r#"
[project]
name = "demo"
source-roots = ["src", "lib"]

[diagnostics]
unused = false
unused-definitions = true
"#,
        )
        .unwrap();
        assert_eq!(config.project.name.as_deref(), Some("demo"));
        assert_eq!(
            config.source_roots(Path::new("/work")),
            vec![PathBuf::from("/work/src"), PathBuf::from("/work/lib")]
        );
        let options = config.decorate_options();
        assert!(!options.unused_warnings);
        assert!(options.unused_definitions);
    }

    #[test]
    fn rejects_wrong_value_types() {
        assert!(ProjectConfig::from_toml_str("[diagnostics]\nunused = \"yes\"\n").is_err());
    }

    #[test]
    fn missing_project_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ProjectConfig::load(dir.path()).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn invalid_project_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_FILE), "[project\n").unwrap();
        match ProjectConfig::load(dir.path()) {
            Err(FenError::Config { path, .. }) => assert!(path.ends_with(PROJECT_FILE)),
            other => panic!("expected a config error, got {other:?}"),
        }
    }
}
