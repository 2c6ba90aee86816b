//! `conflicts`, `merge` and `extract`.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use stylegraft::document::{self, to_json};
use stylegraft_core::merge::{
    ConflictResolution, LocalPlacement, MergeOptions, MergeReport, PlacementKind, TokenAction,
    fresh_instance_ids,
};
use stylegraft_core::model::InstanceId;
use stylegraft_core::{collect_style_sources_from_instances, merge_fragment, preflight};

use super::{Settings, load_project, print_json};

// ---------------------------------------------------------------------------
// conflicts
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConflictsArgs {
    /// Project document
    pub project: PathBuf,
    /// Fragment document
    pub fragment: PathBuf,
}

pub fn conflicts(settings: &Settings, args: &ConflictsArgs) -> Result<ExitCode> {
    let graph = load_project(&args.project)?;
    let fragment = document::load_fragment(&args.fragment)?;
    let conflicts = preflight(&graph, &fragment);

    if settings.json() {
        print_json(&conflicts)?;
    } else if conflicts.is_empty() {
        println!("No conflicts.");
    } else {
        println!("{} conflict(s):", conflicts.len());
        for conflict in &conflicts {
            println!("  {conflict}");
        }
        println!();
        println!("Merge with --resolution ours|theirs|merge to settle them.");
    }

    Ok(if conflicts.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MergeArgs {
    /// Project document
    pub project: PathBuf,
    /// Fragment document
    pub fragment: PathBuf,
    /// Conflict policy (default: [merge] resolution, else theirs)
    #[arg(long, short)]
    pub resolution: Option<ConflictResolution>,
    /// Treat the fragment as portal content: local sources keep their ids
    #[arg(long)]
    pub portal: bool,
    /// Write the merged project here instead of over the input
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeSummary<'a> {
    resolution: ConflictResolution,
    placement: PlacementKind,
    dry_run: bool,
    written_to: Option<&'a Path>,
    #[serde(flatten)]
    report: &'a MergeReport,
}

pub fn merge(settings: &Settings, args: &MergeArgs) -> Result<ExitCode> {
    let mut graph = load_project(&args.project)?;
    let fragment = document::load_fragment(&args.fragment)?;

    let resolution = args.resolution.unwrap_or(settings.config.merge.resolution);
    let kind = if args.portal {
        PlacementKind::Portal
    } else {
        settings.config.merge.placement
    };
    let placement = match kind {
        PlacementKind::Portal => LocalPlacement::Portal,
        PlacementKind::Regular => LocalPlacement::Regular {
            new_instance_ids: fresh_instance_ids(&fragment),
        },
    };

    let report = merge_fragment(
        &mut graph,
        &fragment,
        &MergeOptions {
            resolution,
            placement,
        },
    );

    let target = args.output.as_ref().unwrap_or(&args.project);
    if !args.dry_run {
        settings.save(&graph, target)?;
    }

    if settings.json() {
        print_json(&MergeSummary {
            resolution,
            placement: kind,
            dry_run: args.dry_run,
            written_to: (!args.dry_run).then_some(target.as_path()),
            report: &report,
        })?;
    } else {
        print_merge_text(&report, resolution, args.dry_run, target);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_merge_text(
    report: &MergeReport,
    resolution: ConflictResolution,
    dry_run: bool,
    target: &Path,
) {
    println!("Merged with resolution '{resolution}':");
    for decision in &report.tokens {
        let line = match &decision.action {
            TokenAction::Inserted { id } => format!("inserted as {id}"),
            TokenAction::Reused { id } => format!("reused {id}"),
            TokenAction::KeptExisting { id } => format!("kept project token {id}"),
            TokenAction::Merged { id } => format!("merged into {id}"),
            TokenAction::Renamed { id, name } => format!("inserted as '{name}' ({id})"),
        };
        println!("  token '{}' ({}): {line}", decision.name, decision.fragment_id);
    }
    if !report.inserted_breakpoints.is_empty() {
        println!("  {} breakpoint(s) added", report.inserted_breakpoints.len());
    }
    println!(
        "  {} token declaration(s), {} local source(s) on {} instance(s)",
        report.token_declarations,
        report.locals.placed.len(),
        report.locals.instances.len()
    );
    if dry_run {
        println!("Dry run: nothing written.");
    } else {
        println!("Wrote {}", target.display());
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExtractArgs {
    /// Project document
    pub project: PathBuf,
    /// Instances whose styles to extract
    #[arg(required = true)]
    pub instances: Vec<String>,
    /// Write the fragment here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn extract(settings: &Settings, args: &ExtractArgs) -> Result<ExitCode> {
    let graph = load_project(&args.project)?;
    let instance_ids: BTreeSet<InstanceId> =
        args.instances.iter().map(|id| InstanceId::from(id.as_str())).collect();

    let fragment = collect_style_sources_from_instances(&graph, &instance_ids);
    let json = to_json(&fragment, settings.config.output.pretty)
        .context("could not serialize fragment")?;

    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("could not write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(json.as_bytes())
            .context("could not write fragment to stdout")?,
    }
    Ok(ExitCode::SUCCESS)
}
