//! Client settings, from `initializationOptions` or the `fen` section of
//! `workspace/didChangeConfiguration`.

use fen::{DecorateOptions, ProjectConfig};
use log::LevelFilter;
use serde::Deserialize;
use serde_json::Value;

use crate::logging::parse_level;

pub const SECTION: &str = "fen";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LspSettings {
    /// Overrides `diagnostics.unused` from `fen.toml`.
    pub unused_warnings: Option<bool>,
    pub log_level: Option<String>,
}

impl LspSettings {
    /// Accepts either `{ "fen": { … } }` or the section itself.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let section = match value {
            Value::Object(mut map) if map.contains_key(SECTION) => map.remove(SECTION).unwrap_or_default(),
            other => other,
        };
        if section.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(section)
    }

    pub fn decorate_options(&self, project: &ProjectConfig) -> DecorateOptions {
        let mut options = project.decorate_options();
        if let Some(unused) = self.unused_warnings {
            options.unused_warnings = unused;
        }
        options
    }

    /// `None` when unset; an unknown name is logged and ignored.
    pub fn level(&self) -> Option<LevelFilter> {
        let name = self.log_level.as_deref()?;
        let level = parse_level(name);
        if level.is_none() {
            log::warn!("ignoring unknown logLevel '{name}'");
        }
        level
    }
}
