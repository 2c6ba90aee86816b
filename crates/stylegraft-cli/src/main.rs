use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stylegraft::config::OutputFormat;

mod commands;
mod telemetry;

/// Merge style fragments into a project's style-source graph
///
/// A project is a JSON document holding breakpoints, style sources (named
/// tokens and per-instance locals), instance selections and style
/// declarations. A fragment is the same data cut out of another document,
/// e.g. by copy and paste.
///
/// stylegraft merges fragments without duplicating tokens, without leaving
/// references to missing style sources, and without silently overwriting
/// differently-styled tokens that share a name.
///
/// QUICK START:
///
///   stylegraft conflicts project.json fragment.json
///   stylegraft merge project.json fragment.json --resolution theirs
///   stylegraft check project.json
///
/// Defaults come from ./stylegraft.toml (or --config).
/// Set STYLEGRAFT_LOG=stderr for JSON logs.
#[derive(Parser)]
#[command(name = "stylegraft")]
#[command(version, about, verbatim_doc_comment)]
#[command(propagate_version = true)]
#[command(
    after_help = "See 'stylegraft <command> --help' for more information on a specific command."
)]
struct Cli {
    /// Configuration file (default: ./stylegraft.toml when present)
    #[arg(long, global = true, env = "STYLEGRAFT_CONFIG")]
    config: Option<PathBuf>,

    /// Report format: text or json (overrides [output] format)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List token conflicts a merge would have to settle
    ///
    /// Read-only. Exits with status 1 when at least one conflict exists.
    ///
    /// Examples:
    ///   stylegraft conflicts project.json fragment.json
    #[command(verbatim_doc_comment)]
    Conflicts(commands::merge::ConflictsArgs),

    /// Merge a fragment into a project
    ///
    /// Identical tokens are reused. Conflicts are settled by --resolution:
    ///   ours    keep the project token, drop the fragment's styles
    ///   theirs  insert the fragment token as name-1, name-2, ...
    ///   merge   overlay the fragment's styles onto the project token
    ///
    /// Examples:
    ///   stylegraft merge project.json fragment.json
    ///   stylegraft merge project.json fragment.json --resolution ours --dry-run
    ///   stylegraft merge project.json portal.json --portal -o merged.json
    #[command(verbatim_doc_comment)]
    Merge(commands::merge::MergeArgs),

    /// Cut the styles of some instances out of a project as a fragment
    ///
    /// Examples:
    ///   stylegraft extract project.json header logo > fragment.json
    #[command(verbatim_doc_comment)]
    Extract(commands::merge::ExtractArgs),

    /// List tokens no instance uses
    Unused(commands::inspect::UnusedArgs),

    /// List tokens sharing a name or identical styles with another token
    Duplicates(commands::inspect::ProjectArg),

    /// Report selections and declarations pointing at missing style sources
    ///
    /// Exits with status 1 when a dangling reference is found.
    Check(commands::inspect::ProjectArg),

    /// Rename a token
    ///
    /// Fails when the name is blank or already used by another token.
    Rename(commands::edit::RenameArgs),

    /// Delete style sources with their declarations and selection entries
    Delete(commands::edit::DeleteArgs),
}

fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = commands::Settings::load(cli.config.as_deref(), cli.format)?;

    match &cli.command {
        Commands::Conflicts(args) => commands::merge::conflicts(&settings, args),
        Commands::Merge(args) => commands::merge::merge(&settings, args),
        Commands::Extract(args) => commands::merge::extract(&settings, args),
        Commands::Unused(args) => commands::inspect::unused(&settings, args),
        Commands::Duplicates(args) => commands::inspect::duplicates(&settings, args),
        Commands::Check(args) => commands::inspect::check(&settings, args),
        Commands::Rename(args) => commands::edit::rename(&settings, args),
        Commands::Delete(args) => commands::edit::delete(&settings, args),
    }
}
