//! Subcommand implementations.
//!
//! Each subcommand takes the resolved [`Settings`] and its own arguments and
//! returns the process exit code. Reports go to stdout, logs to stderr.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use stylegraft::config::{CONFIG_FILE_NAME, OutputFormat, StylegraftConfig};
use stylegraft::document::{self, to_json};
use stylegraft_core::StyleGraph;
use tracing::info;

pub mod edit;
pub mod inspect;
pub mod merge;

/// Configuration file merged with global flags.
pub struct Settings {
    pub config: StylegraftConfig,
    pub format: OutputFormat,
}

impl Settings {
    /// Load `config_path`, or `./stylegraft.toml` when none is given, and
    /// apply the `--format` override.
    pub fn load(config_path: Option<&Path>, format: Option<OutputFormat>) -> Result<Self> {
        let config = match config_path {
            Some(path) if !path.exists() => {
                anyhow::bail!("config file {} does not exist", path.display())
            }
            Some(path) => StylegraftConfig::load(path)?,
            None => StylegraftConfig::load(Path::new(CONFIG_FILE_NAME))?,
        };
        let format = format.unwrap_or(config.output.format);
        Ok(Self { config, format })
    }

    pub const fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Write `graph` to `path` honoring `[output] pretty`.
    pub fn save(&self, graph: &StyleGraph, path: &Path) -> Result<()> {
        document::save_graph(graph, path, self.config.output.pretty)?;
        info!(path = %path.display(), "project written");
        Ok(())
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = to_json(value, true).context("could not serialize report")?;
    print!("{json}");
    Ok(())
}

pub fn load_project(path: &Path) -> Result<StyleGraph> {
    Ok(document::load_graph(path)?)
}
