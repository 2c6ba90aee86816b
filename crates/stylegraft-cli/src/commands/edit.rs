//! `rename` and `delete`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;
use stylegraft_core::model::{StyleGraph, StyleSource, StyleSourceId};
use stylegraft_core::{delete_style_sources, rename_style_source, validate_style_source_name};
use tracing::warn;

use super::{Settings, load_project, print_json};

// ---------------------------------------------------------------------------
// rename
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RenameArgs {
    /// Project document
    pub project: PathBuf,
    /// Token id
    pub id: String,
    /// New token name
    pub name: String,
}

#[derive(Serialize)]
struct Renamed<'a> {
    id: &'a StyleSourceId,
    from: String,
    to: &'a str,
}

pub fn rename(settings: &Settings, args: &RenameArgs) -> Result<ExitCode> {
    let mut graph = load_project(&args.project)?;
    let id = StyleSourceId::from(args.id.as_str());

    let from = match graph.style_sources.get(&id) {
        Some(StyleSource::Token { name, .. }) => name.clone(),
        Some(StyleSource::Local { .. }) => bail!("{id} is a local style source and has no name"),
        None => bail!("no style source with id {id}"),
    };
    let name = args.name.trim();
    if let Err(e) = validate_style_source_name(name, Some(&id), &graph.style_sources) {
        bail!("cannot rename {id} ({}): {e}", e.kind());
    }

    rename_style_source(&id, name, &mut graph.style_sources);
    settings.save(&graph, &args.project)?;

    if settings.json() {
        print_json(&Renamed {
            id: &id,
            from,
            to: name,
        })?;
    } else {
        println!("Renamed {id}: '{from}' -> '{name}'");
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct DeleteArgs {
    /// Project document
    pub project: PathBuf,
    /// Style source ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Serialize)]
struct Deleted<'a> {
    deleted: &'a [StyleSourceId],
    missing: &'a [StyleSourceId],
}

pub fn delete(settings: &Settings, args: &DeleteArgs) -> Result<ExitCode> {
    let mut graph = load_project(&args.project)?;
    let (present, missing): (Vec<StyleSourceId>, Vec<StyleSourceId>) = args
        .ids
        .iter()
        .map(|id| StyleSourceId::from(id.as_str()))
        .partition(|id| graph.style_sources.contains_key(id));
    for id in &missing {
        warn!(style_source = %id, "not in project, skipped");
    }

    let StyleGraph {
        style_sources,
        style_source_selections,
        styles,
        ..
    } = &mut graph;
    delete_style_sources(&present, style_sources, style_source_selections, styles);
    settings.save(&graph, &args.project)?;

    if settings.json() {
        print_json(&Deleted {
            deleted: &present,
            missing: &missing,
        })?;
    } else {
        println!("Deleted {} style source(s).", present.len());
        if !missing.is_empty() {
            let missing: Vec<&str> = missing.iter().map(StyleSourceId::as_str).collect();
            println!("Not found: {}", missing.join(", "));
        }
    }
    Ok(ExitCode::SUCCESS)
}
