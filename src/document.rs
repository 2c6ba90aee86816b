//! JSON project and fragment documents.
//!
//! A project document is a serialized [`StyleGraph`]; a fragment document is
//! a serialized [`Fragment`]. Collections are arrays of records:
//!
//! ```json
//! {
//!   "breakpoints": [{ "id": "base", "label": "Base" }],
//!   "styleSources": [{ "type": "token", "id": "t1", "name": "Primary" }],
//!   "styleSourceSelections": [{ "instanceId": "i1", "values": ["t1"] }],
//!   "styles": [{ "styleSourceId": "t1", "breakpointId": "base",
//!               "property": "color", "value": { "type": "keyword", "value": "red" } }]
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use stylegraft_core::{Fragment, StyleGraph};
use tracing::debug;

/// Error reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: invalid document: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DocumentError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Load a project document.
///
/// # Errors
/// Returns [`DocumentError`] when the file cannot be read or parsed.
pub fn load_graph(path: &Path) -> Result<StyleGraph, DocumentError> {
    let graph: StyleGraph = read_json(path)?;
    debug!(
        path = %path.display(),
        style_sources = graph.style_sources.len(),
        styles = graph.styles.len(),
        "loaded project"
    );
    Ok(graph)
}

/// Load a fragment document.
///
/// # Errors
/// Returns [`DocumentError`] when the file cannot be read or parsed.
pub fn load_fragment(path: &Path) -> Result<Fragment, DocumentError> {
    read_json(path)
}

/// Serialize `value` as a document string.
///
/// # Errors
/// Returns the serializer error; the types in this crate always serialize.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    let mut json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    json.push('\n');
    Ok(json)
}

/// Save a project document.
///
/// Writes are atomic: content goes to `<path>.tmp` first and is renamed over
/// the destination. Parent directories are created if missing.
///
/// # Errors
/// Returns [`DocumentError`] on I/O or serialization failure.
pub fn save_graph(graph: &StyleGraph, path: &Path, pretty: bool) -> Result<(), DocumentError> {
    let io_err = |source: io::Error| DocumentError::Io {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = to_json(graph, pretty).map_err(|source| DocumentError::Json {
        path: path.to_owned(),
        source,
    })?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;

    debug!(path = %path.display(), "saved project");
    Ok(())
}
