//! tableqr runtime configuration handling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default text size (pixels per em) for the table label
pub const DEFAULT_FONT_SIZE: u32 = 80;

/// Largest accepted label size in pixels per em
pub const MAX_FONT_SIZE: u32 = 1000;

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQrConfig {
    /// Batch generation inputs
    pub generation: GenerationOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl TableQrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No tableqr.toml / tableqr.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Look for `tableqr.{toml,yaml,yml}` in the working directory, then
    /// `$XDG_CONFIG_HOME/tableqr/config.{toml,yaml,yml}`.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        let xdg = env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
        Ok(discover_in(&cwd, xdg.as_deref()))
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.generation.apply_env_overrides();
        self.logging.apply_env_overrides();
    }
}

const EXTENSIONS: [&str; 3] = ["toml", "yaml", "yml"];

fn discover_in(cwd: &Path, xdg_config: Option<&Path>) -> Option<PathBuf> {
    let local = EXTENSIONS
        .iter()
        .map(|ext| cwd.join(format!("tableqr.{ext}")));
    let user = xdg_config.into_iter().flat_map(|base| {
        EXTENSIONS
            .iter()
            .map(move |ext| base.join("tableqr").join(format!("config.{ext}")))
    });
    local.chain(user).find(|path| path.is_file())
}

/// Unvalidated generation inputs, as collected from a form, file, or flags.
///
/// `table_count` is signed so that zero and negative counts survive parsing
/// and are rejected by validation instead of by the deserializer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// URL prefix; the table number is appended verbatim
    pub base_url: String,
    /// Number of tables to generate, starting at 1
    pub table_count: i64,
    /// Directory receiving `<n>.png` files (created when missing)
    pub output_dir: PathBuf,
    /// Scalable font (.ttf/.otf) used for the table label
    pub font_path: PathBuf,
    /// Label size in pixels per em
    pub font_size: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            base_url: "https://meusite.com/".to_string(),
            table_count: 15,
            output_dir: PathBuf::from("."),
            font_path: PathBuf::from("font/Ubuntu-B.ttf"),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl GenerationOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("TABLEQR_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(count) = env::var("TABLEQR_TABLE_COUNT") {
            if let Ok(parsed) = count.trim().parse::<i64>() {
                self.table_count = parsed;
            }
        }
        if let Ok(dir) = env::var("TABLEQR_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(font) = env::var("TABLEQR_FONT_PATH") {
            self.font_path = PathBuf::from(font);
        }
        if let Ok(size) = env::var("TABLEQR_FONT_SIZE") {
            if let Ok(parsed) = size.trim().parse::<u32>() {
                self.font_size = parsed;
            }
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `TABLEQR_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in console (stderr) logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("TABLEQR_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("TABLEQR_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("TABLEQR_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("TABLEQR_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_form_defaults() {
        let config = TableQrConfig::default();
        assert_eq!(config.generation.base_url, "https://meusite.com/");
        assert_eq!(config.generation.table_count, 15);
        assert_eq!(config.generation.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn discovery_prefers_working_directory_over_xdg() {
        let cwd = tempfile::tempdir().unwrap();
        let xdg = tempfile::tempdir().unwrap();
        assert_eq!(discover_in(cwd.path(), Some(xdg.path())), None);

        let user = xdg.path().join("tableqr").join("config.yml");
        fs::create_dir_all(user.parent().unwrap()).unwrap();
        fs::write(&user, "generation:\n  table_count: 4\n").unwrap();
        assert_eq!(discover_in(cwd.path(), Some(xdg.path())), Some(user.clone()));
        assert_eq!(discover_in(cwd.path(), None), None);

        let local = cwd.path().join("tableqr.yaml");
        fs::write(&local, "generation:\n  table_count: 2\n").unwrap();
        assert_eq!(discover_in(cwd.path(), Some(xdg.path())), Some(local));
    }

    #[test]
    fn parses_toml_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[generation]\nbase_url = \"https://site.com/t=\"\ntable_count = 3\n\n[logging]\nlevel = \"debug\"\nrotation = \"daily\""
        )
        .unwrap();

        let config = TableQrConfig::from_file(file.path()).unwrap();
        assert_eq!(config.generation.base_url, "https://site.com/t=");
        assert_eq!(config.generation.table_count, 3);
        assert_eq!(config.generation.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.rotation, Some(LogRotation::Daily));
    }

    #[test]
    fn parses_yaml_and_keeps_negative_counts() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "generation:\n  base_url: https://bar.example/\n  table_count: -1\n  font_size: 64"
        )
        .unwrap();

        let config = TableQrConfig::from_file(file.path()).unwrap();
        assert_eq!(config.generation.table_count, -1);
        assert_eq!(config.generation.font_size, 64);
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = TableQrConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rotation_parse_is_case_insensitive() {
        assert_eq!(LogRotation::parse("HOURLY"), Some(LogRotation::Hourly));
        assert_eq!(LogRotation::parse("weekly"), None);
    }
}
