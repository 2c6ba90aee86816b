//! stylegraft configuration (`stylegraft.toml`).
//!
//! Holds the defaults the CLI applies when a flag is not given: which
//! conflict policy to use, how local sources are placed, and how reports and
//! documents are written.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use stylegraft_core::merge::{ConflictResolution, PlacementKind};

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "stylegraft.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level stylegraft configuration.
///
/// Missing fields use defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylegraftConfig {
    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Merge defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Policy for true token conflicts (default: `theirs`).
    #[serde(default)]
    pub resolution: ConflictResolution,

    /// Local-source placement (default: `regular`).
    #[serde(default)]
    pub placement: PlacementKind,
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Report and document output settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print written project documents (default: `true`).
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: default_pretty(),
        }
    }
}

const fn default_pretty() -> bool {
    true
}

/// Report format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format `{other}` (expected text or json)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error from loading or parsing `stylegraft.toml`.
#[derive(Debug)]
pub struct ConfigError {
    /// The file being loaded, when known.
    pub path: Option<PathBuf>,
    /// Message, prefixed with the line number for parse errors.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(p) => write!(f, "{}: {}", p.display(), self.message),
            None => write!(f, "config error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl StylegraftConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors other than not-found, invalid TOML
    /// or unknown fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start].matches('\n').count() + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = StylegraftConfig::default();
        assert_eq!(cfg.merge.resolution, ConflictResolution::Theirs);
        assert_eq!(cfg.merge.placement, PlacementKind::Regular);
        assert_eq!(cfg.output.format, OutputFormat::Text);
        assert!(cfg.output.pretty);
    }

    #[test]
    fn parse_empty_string() {
        assert_eq!(StylegraftConfig::parse("").unwrap(), StylegraftConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[merge]
resolution = "merge"
placement = "portal"

[output]
format = "json"
pretty = false
"#;
        let cfg = StylegraftConfig::parse(toml).unwrap();
        assert_eq!(cfg.merge.resolution, ConflictResolution::Merge);
        assert_eq!(cfg.merge.placement, PlacementKind::Portal);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(!cfg.output.pretty);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = StylegraftConfig::parse("[merge]\nresolution = \"ours\"\n").unwrap();
        assert_eq!(cfg.merge.resolution, ConflictResolution::Ours);
        assert_eq!(cfg.merge.placement, PlacementKind::Regular);
        assert!(cfg.output.pretty);
    }

    #[test]
    fn unknown_field_reports_line() {
        let err = StylegraftConfig::parse("[merge]\nresolution = \"ours\"\nstrategy = \"x\"\n")
            .unwrap_err();
        assert!(err.message.starts_with("line 3:"), "{}", err.message);
        assert!(err.message.contains("strategy"), "{}", err.message);
    }

    #[test]
    fn unknown_resolution_is_rejected() {
        let err = StylegraftConfig::parse("[merge]\nresolution = \"both\"\n").unwrap_err();
        assert!(err.message.starts_with("line 2:"), "{}", err.message);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StylegraftConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(cfg, StylegraftConfig::default());
    }

    #[test]
    fn load_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[output]\nformat = 3\n").unwrap();

        let err = StylegraftConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }

    #[test]
    fn config_error_display_without_path() {
        let err = ConfigError {
            path: None,
            message: "bad field".to_owned(),
        };
        assert_eq!(err.to_string(), "config error: bad field");
    }
}
