//! Engine configuration.
//!
//! Loaded from YAML (every field optional), then overridden by environment
//! variables:
//! - `PREP_APP_VERSION`: version stamped on new steps
//! - `PREP_PREVIEW_LIMIT`: default row limit of previews

use crate::observability::{LogFormat, TracingConfig};
use prep_core::error::{PrepError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log settings as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Output format; falls back to `PREP_LOG_FORMAT` or TTY detection.
    pub format: Option<LogFormat>,
    /// Filter directives; falls back to `PREP_LOG_LEVEL` / `RUST_LOG`.
    pub level: Option<String>,
    /// Include file and line.
    pub location: bool,
}

/// Settings of the transformation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Version stamped on steps created by this process.
    pub app_version: String,
    /// Default row limit of previews; `None` means unlimited.
    pub preview_limit: Option<u64>,
    /// Logging.
    pub log: LogSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            preview_limit: None,
            log: LogSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| PrepError::Serialization {
            cause: format!("invalid engine configuration: {e}"),
        })
    }

    /// Read a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Apply `PREP_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(version) = lookup("PREP_APP_VERSION").filter(|v| !v.is_empty()) {
            self.app_version = version;
        }
        if let Some(limit) = lookup("PREP_PREVIEW_LIMIT") {
            match limit.parse() {
                Ok(limit) => self.preview_limit = Some(limit),
                Err(_) => tracing::warn!(value = %limit, "Ignoring invalid PREP_PREVIEW_LIMIT"),
            }
        }
        self
    }

    /// Set the application version.
    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }

    /// Set the preview limit.
    #[must_use]
    pub fn with_preview_limit(mut self, limit: u64) -> Self {
        self.preview_limit = Some(limit);
        self
    }

    /// Tracing configuration: file settings layered over the environment.
    pub fn tracing_config(&self) -> TracingConfig {
        let env = TracingConfig::from_env();
        let location = self.log.location || env.location;
        TracingConfig {
            format: self.log.format.unwrap_or(env.format),
            filter: self.log.level.clone().unwrap_or(env.filter),
            location,
            ..env
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let yaml = r#"
app_version: "2.1.0"
preview_limit: 50
log:
  format: json
  level: debug
  location: true
"#;
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.app_version, "2.1.0");
        assert_eq!(config.preview_limit, Some(50));
        assert_eq!(config.log.format, Some(LogFormat::Json));

        let tracing = config.tracing_config();
        assert_eq!(tracing.format, LogFormat::Json);
        assert_eq!(tracing.filter, "debug");
        assert!(tracing.location);
    }

    #[test]
    fn invalid_yaml_is_serialization_error() {
        let err = EngineConfig::from_yaml_str("preview_limit: [nope").unwrap_err();
        assert_eq!(err.code(), "E901");
    }

    #[test]
    fn overrides_win_over_file() {
        let vars: HashMap<&str, &str> =
            [("PREP_APP_VERSION", "9.9"), ("PREP_PREVIEW_LIMIT", "3")].into();
        let config = EngineConfig::default()
            .with_preview_limit(100)
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.app_version, "9.9");
        assert_eq!(config.preview_limit, Some(3));
    }

    #[test]
    fn invalid_override_is_ignored() {
        let config = EngineConfig::default()
            .with_preview_limit(10)
            .with_overrides(|key| (key == "PREP_PREVIEW_LIMIT").then(|| "many".to_string()));
        assert_eq!(config.preview_limit, Some(10));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "preview_limit: 7\n").unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.preview_limit, Some(7));
        assert!(EngineConfig::from_file(dir.path().join("missing.yaml")).is_err());
    }
}
