//! Read-only reports: `unused`, `duplicates`, `check`.
//!
//! `unused --delete` is the one write path here: it garbage-collects the
//! reported tokens.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use stylegraft_core::model::{StyleGraph, StyleSourceId};
use stylegraft_core::{
    check_references, delete_style_sources, find_duplicate_tokens, find_unused_tokens,
    style_source_usages,
};

use super::{Settings, load_project, print_json};

#[derive(Args)]
pub struct ProjectArg {
    /// Project document
    pub project: PathBuf,
}

#[derive(Args)]
pub struct UnusedArgs {
    /// Project document
    pub project: PathBuf,
    /// Delete the unused tokens and write the project back
    #[arg(long)]
    pub delete: bool,
}

#[derive(Serialize)]
struct TokenRow<'a> {
    id: &'a StyleSourceId,
    name: &'a str,
}

fn token_name<'a>(graph: &'a StyleGraph, id: &StyleSourceId) -> &'a str {
    graph
        .style_sources
        .get(id)
        .and_then(|source| source.name())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// unused
// ---------------------------------------------------------------------------

pub fn unused(settings: &Settings, args: &UnusedArgs) -> Result<ExitCode> {
    let mut graph = load_project(&args.project)?;
    let usages = style_source_usages(&graph.style_source_selections);
    let unused = find_unused_tokens(&graph.style_sources, &usages);

    if settings.json() {
        let rows: Vec<TokenRow<'_>> = unused
            .iter()
            .map(|id| TokenRow {
                id,
                name: token_name(&graph, id),
            })
            .collect();
        print_json(&rows)?;
    } else if unused.is_empty() {
        println!("No unused tokens.");
    } else {
        println!("{} unused token(s):", unused.len());
        for id in &unused {
            println!("  {id}  {}", token_name(&graph, id));
        }
    }

    if args.delete && !unused.is_empty() {
        let StyleGraph {
            style_sources,
            style_source_selections,
            styles,
            ..
        } = &mut graph;
        delete_style_sources(&unused, style_sources, style_source_selections, styles);
        settings.save(&graph, &args.project)?;
        if !settings.json() {
            println!("Deleted {} token(s).", unused.len());
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// duplicates
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateRow<'a> {
    id: &'a StyleSourceId,
    name: &'a str,
    duplicates: &'a [StyleSourceId],
}

pub fn duplicates(settings: &Settings, args: &ProjectArg) -> Result<ExitCode> {
    let graph = load_project(&args.project)?;
    let duplicates = find_duplicate_tokens(&graph.style_sources, &graph.styles, &graph.breakpoints);

    if settings.json() {
        let rows: Vec<DuplicateRow<'_>> = duplicates
            .iter()
            .map(|(id, others)| DuplicateRow {
                id,
                name: token_name(&graph, id),
                duplicates: others,
            })
            .collect();
        print_json(&rows)?;
    } else if duplicates.is_empty() {
        println!("No duplicate tokens.");
    } else {
        for (id, others) in &duplicates {
            let others: Vec<String> = others
                .iter()
                .map(|other| format!("{other} '{}'", token_name(&graph, other)))
                .collect();
            println!("{id} '{}': {}", token_name(&graph, id), others.join(", "));
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

pub fn check(settings: &Settings, args: &ProjectArg) -> Result<ExitCode> {
    let graph = load_project(&args.project)?;
    let dangling = check_references(&graph);

    if settings.json() {
        print_json(&dangling)?;
    } else if dangling.is_empty() {
        println!("All references resolve.");
    } else {
        println!("{} dangling reference(s):", dangling.len());
        for reference in &dangling {
            println!("  {reference}");
        }
    }

    Ok(if dangling.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
