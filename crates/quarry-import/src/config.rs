//! Layered import configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `QUARRY_LOG`, `QUARRY_REPORT_IGNORED`,
//!    `QUARRY_REPORT_HIERARCHY`, `QUARRY_REPORT_METADATA`
//! 2. Project-local: `.quarry/config.toml`
//! 3. Global: `~/.quarry/config.toml`
//!
//! Only diagnostics are configurable. The post-processing steps an import
//! runs are fixed.

use quarry_core::{QuarryError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
struct LogSection {
    #[serde(default)]
    filter: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ReportSection {
    #[serde(default)]
    ignored: Option<bool>,
    #[serde(default)]
    hierarchy: Option<bool>,
    #[serde(default)]
    metadata: Option<bool>,
}

/// Config file structure; every key is optional so layers can overlay
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    log: LogSection,
    #[serde(default)]
    report: ReportSection,
}

/// What an import logs beyond errors and the final summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportConfig {
    /// Scene data the model does not carry (cameras, bones, extra UV sets, ...)
    pub ignored: bool,
    /// The node hierarchy after a successful import
    pub hierarchy: bool,
    /// Scene metadata entries
    pub metadata: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            ignored: true,
            hierarchy: false,
            metadata: false,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// `env_logger` filter used by hosts that initialise logging
    pub log_filter: String,
    pub report: ReportConfig,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            report: ReportConfig::default(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl ImportConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = ImportConfig::default();

        // Layer 1: Global config (~/.quarry/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        // Layer 2: Project-local config (.quarry/config.toml)
        let local_path = PathBuf::from(".quarry/config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        // Layer 3: Environment variable overrides
        config.apply_env_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Load config from a specific file path only, still honouring env vars
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = ImportConfig::default();
        config.merge(Self::load_file(path)?);
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".quarry").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn merge(&mut self, overlay: ConfigFile) {
        if let Some(filter) = overlay.log.filter {
            self.log_filter = filter;
        }
        if let Some(ignored) = overlay.report.ignored {
            self.report.ignored = ignored;
        }
        if let Some(hierarchy) = overlay.report.hierarchy {
            self.report.hierarchy = hierarchy;
        }
        if let Some(metadata) = overlay.report.metadata {
            self.report.metadata = metadata;
        }
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(filter) = lookup("QUARRY_LOG") {
            self.log_filter = filter;
        }
        let flags = [
            ("QUARRY_REPORT_IGNORED", &mut self.report.ignored),
            ("QUARRY_REPORT_HIERARCHY", &mut self.report.hierarchy),
            ("QUARRY_REPORT_METADATA", &mut self.report.metadata),
        ];
        for (key, flag) in flags {
            if let Some(value) = lookup(key) {
                *flag = parse_flag(key, &value)?;
            }
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(QuarryError::ConfigError(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quarry_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        std::fs::remove_file(path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.log_filter, "info");
        assert!(config.report.ignored);
        assert!(!config.report.hierarchy);
        assert!(!config.report.metadata);
    }

    #[test]
    fn file_overrides_defaults() {
        let path = temp_config(
            r#"
[log]
filter = "quarry_import=debug"

[report]
hierarchy = true
"#,
        );
        let mut config = ImportConfig::default();
        config.merge(ImportConfig::load_file(&path).unwrap());

        assert_eq!(config.log_filter, "quarry_import=debug");
        assert!(config.report.hierarchy);
        // Unset keys keep the lower layer's value
        assert!(config.report.ignored);

        cleanup(&path);
    }

    #[test]
    fn later_layer_wins() {
        let mut config = ImportConfig::default();
        config.merge(toml::from_str("[report]\nmetadata = true").unwrap());
        config.merge(toml::from_str("[report]\nmetadata = false\nignored = false").unwrap());
        assert!(!config.report.metadata);
        assert!(!config.report.ignored);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [("QUARRY_LOG", "warn"), ("QUARRY_REPORT_HIERARCHY", "yes")]
            .into_iter()
            .collect();
        let mut config = ImportConfig::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.log_filter, "warn");
        assert!(config.report.hierarchy);
    }

    #[test]
    fn bad_env_flag_is_an_error() {
        let mut config = ImportConfig::default();
        let result = config.apply_env_overrides(|k| {
            (k == "QUARRY_REPORT_IGNORED").then(|| "sometimes".to_string())
        });
        assert!(matches!(result, Err(QuarryError::ConfigError(_))));
    }

    #[test]
    fn malformed_file_is_toml_error() {
        let path = temp_config("[report\nignored = ");
        let result = ImportConfig::load_file(&path);
        assert!(matches!(result, Err(QuarryError::TomlParseError(_))));
        let result = ImportConfig::load_from_file(&path);
        assert!(matches!(result, Err(QuarryError::TomlParseError(_))));
        cleanup(&path);
    }
}
