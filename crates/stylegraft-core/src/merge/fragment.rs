//! Fragment merge and extraction.
//!
//! [`merge_fragment`] runs the whole pipeline as one transaction:
//!
//! 1. normalize breakpoints,
//! 2. resolve tokens under the chosen policy,
//! 3. copy the declarations of the tokens marked for copying,
//! 4. place local sources (regular or portal variant).
//!
//! The pipeline works on a copy of the project and swaps it in at the end,
//! so callers never observe a half-merged graph.
//!
//! [`collect_style_sources_from_instances`] goes the other way and cuts a
//! fragment out of a project.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::model::{
    BreakpointId, Fragment, InstanceId, InstanceIdMap, StyleGraph, StyleSourceId, StyleSourceIdMap,
    insert_keyed,
};

use super::breakpoints::{BreakpointMerge, merge_breakpoints};
use super::conflict::{Conflict, ConflictResolution, detect_conflicts};
use super::local::{
    LocalPlacementOutcome, insert_local_style_sources_with_new_ids,
    insert_portal_local_style_sources,
};
use super::rewrite::copy_token_styles;
use super::signature::BreakpointScope;
use super::tokens::{TokenDecision, insert_style_sources};

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

/// Which local-source placement rule applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalPlacement {
    /// Pasted or duplicated content: fresh local ids per destination.
    Regular { new_instance_ids: InstanceIdMap },
    /// Portal content: local ids kept verbatim for the fragment's instances.
    Portal,
}

/// Placement kind without its payload, for configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementKind {
    #[default]
    Regular,
    Portal,
}

/// Inputs that shape a merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    pub resolution: ConflictResolution,
    pub placement: LocalPlacement,
}

/// Everything a merge decided.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub inserted_breakpoints: Vec<BreakpointId>,
    pub tokens: Vec<TokenDecision>,
    pub style_source_id_map: StyleSourceIdMap,
    pub token_declarations: usize,
    pub locals: LocalPlacementOutcome,
}

/// Map every fragment instance to a fresh id, except the root which stays
/// the root.
#[must_use]
pub fn fresh_instance_ids(fragment: &Fragment) -> InstanceIdMap {
    fragment
        .instance_ids
        .iter()
        .map(|id| {
            let target = if id.is_root() {
                id.clone()
            } else {
                InstanceId::random()
            };
            (id.clone(), target)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pre-flight
// ---------------------------------------------------------------------------

/// Conflicts `merge_fragment` would have to settle. Read-only.
#[must_use]
pub fn preflight(graph: &StyleGraph, fragment: &Fragment) -> Vec<Conflict> {
    let plan = merge_breakpoints(&fragment.breakpoints, &graph.breakpoints);
    let breakpoints = plan.merged_view(&graph.breakpoints);
    let scope = BreakpointScope::new(&breakpoints, &plan.merged_breakpoint_ids);
    detect_conflicts(
        &fragment.style_sources,
        &fragment.styles,
        &graph.style_sources,
        &graph.styles,
        &scope,
    )
}

// ---------------------------------------------------------------------------
// merge_fragment
// ---------------------------------------------------------------------------

/// Merge `fragment` into `graph`.
#[instrument(skip_all, fields(resolution = %options.resolution))]
pub fn merge_fragment(
    graph: &mut StyleGraph,
    fragment: &Fragment,
    options: &MergeOptions,
) -> MergeReport {
    let mut next = graph.clone();

    let BreakpointMerge {
        merged_breakpoint_ids,
        inserted,
    } = merge_breakpoints(&fragment.breakpoints, &next.breakpoints);
    for breakpoint in &inserted {
        insert_keyed(&mut next.breakpoints, breakpoint.clone());
    }

    let tokens = {
        let scope = BreakpointScope::new(&next.breakpoints, &merged_breakpoint_ids);
        insert_style_sources(
            &fragment.style_sources,
            &fragment.styles,
            &next.style_sources,
            &next.styles,
            &scope,
            options.resolution,
        )
    };
    next.style_sources = tokens.updated_style_sources;

    let token_declarations = copy_token_styles(
        &fragment.styles,
        &tokens.style_source_ids,
        &tokens.style_source_id_map,
        &merged_breakpoint_ids,
        &mut next.styles,
    );

    let locals = match &options.placement {
        LocalPlacement::Regular { new_instance_ids } => insert_local_style_sources_with_new_ids(
            fragment,
            new_instance_ids,
            &merged_breakpoint_ids,
            &tokens.style_source_id_map,
            &mut next,
        ),
        LocalPlacement::Portal => insert_portal_local_style_sources(
            fragment,
            &fragment.instance_ids,
            &merged_breakpoint_ids,
            &tokens.style_source_id_map,
            &mut next,
        ),
    };

    *graph = next;

    info!(
        tokens = tokens.decisions.len(),
        token_declarations,
        locals = locals.placed.len(),
        "fragment merged"
    );

    MergeReport {
        inserted_breakpoints: inserted.into_iter().map(|b| b.id).collect(),
        tokens: tokens.decisions,
        style_source_id_map: tokens.style_source_id_map,
        token_declarations,
        locals,
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Cut the style data of `instance_ids` out of `graph` as a fragment.
///
/// Selection entries naming a source the graph does not have are skipped.
#[must_use]
pub fn collect_style_sources_from_instances(
    graph: &StyleGraph,
    instance_ids: &BTreeSet<InstanceId>,
) -> Fragment {
    let mut fragment = Fragment {
        instance_ids: instance_ids.clone(),
        ..Fragment::default()
    };
    let mut collected: BTreeSet<StyleSourceId> = BTreeSet::new();

    for instance_id in instance_ids {
        let Some(selection) = graph.style_source_selections.get(instance_id) else {
            continue;
        };
        fragment.style_source_selections.push(selection.clone());
        for id in &selection.values {
            let Some(source) = graph.style_sources.get(id) else {
                warn!(instance = %instance_id, style_source = %id, "selection references missing style source");
                continue;
            };
            if collected.insert(id.clone()) {
                fragment.style_sources.push(source.clone());
            }
        }
    }

    for decl in graph.styles.values() {
        if !collected.contains(&decl.style_source_id) {
            continue;
        }
        if let Some(breakpoint) = graph.breakpoints.get(&decl.breakpoint_id) {
            insert_keyed(&mut fragment.breakpoints, breakpoint.clone());
        }
        fragment.styles.push(decl.clone());
    }

    fragment
}
