//! Placement of local (unnamed) style sources.
//!
//! Two variants:
//!
//! - **Portal**: local sources keep their fragment ids verbatim. Inserting
//!   the same portal content again rewrites the same records, so identity is
//!   stable across repeated instantiation.
//! - **Regular**: every destination instance gets a freshly-id'd copy of its
//!   local source. The one exception is the root instance: a document has a
//!   single root-local source, so fragment root-locals fold into the
//!   existing one.
//!
//! In both variants token references are resolved through the token
//! resolver's id map and declaration breakpoints are normalized.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::model::{
    BreakpointIdMap, Fragment, InstanceId, InstanceIdMap, StyleSource, StyleSourceId,
    StyleSourceIdMap, StyleGraph, StyleSourceSelection, insert_keyed,
};

use super::rewrite::{rebind_decl, remap_selection_values, resolve_shared};

/// What a placement pass wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPlacementOutcome {
    /// Fragment local id → every project id it was placed under.
    pub placed: BTreeMap<StyleSourceId, Vec<StyleSourceId>>,
    /// Destination instances whose selection was written.
    pub instances: Vec<InstanceId>,
    /// Declarations written for local sources.
    pub declarations: usize,
}

fn fragment_locals(fragment: &Fragment) -> BTreeMap<&StyleSourceId, &StyleSource> {
    fragment
        .style_sources
        .iter()
        .filter(|source| source.is_local())
        .map(|source| (source.id(), source))
        .collect()
}

/// Copy the placed locals' declarations into `graph.styles`.
fn copy_local_styles(
    fragment: &Fragment,
    merged_breakpoint_ids: &BreakpointIdMap,
    graph: &mut StyleGraph,
    outcome: &mut LocalPlacementOutcome,
) {
    for decl in &fragment.styles {
        let Some(targets) = outcome.placed.get(&decl.style_source_id) else {
            continue;
        };
        for target in targets {
            insert_keyed(
                &mut graph.styles,
                rebind_decl(decl, target.clone(), merged_breakpoint_ids),
            );
            outcome.declarations += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Portal variant
// ---------------------------------------------------------------------------

/// Place the local sources of portal content, keeping their ids.
///
/// Only selections of instances in `instance_ids` are considered, and only
/// locals those selections reference are copied.
pub fn insert_portal_local_style_sources(
    fragment: &Fragment,
    instance_ids: &BTreeSet<InstanceId>,
    merged_breakpoint_ids: &BreakpointIdMap,
    style_source_id_map: &StyleSourceIdMap,
    graph: &mut StyleGraph,
) -> LocalPlacementOutcome {
    let locals = fragment_locals(fragment);
    let mut outcome = LocalPlacementOutcome::default();

    for selection in &fragment.style_source_selections {
        if !instance_ids.contains(&selection.instance_id) {
            continue;
        }
        let values = remap_selection_values(&selection.values, |id| {
            if let Some(source) = locals.get(id) {
                if graph.style_sources.get(id).is_some_and(StyleSource::is_token) {
                    warn!(
                        style_source = %id,
                        "portal local replaces project token with the same id"
                    );
                }
                insert_keyed(&mut graph.style_sources, (*source).clone());
                let placed = outcome.placed.entry(id.clone()).or_default();
                if placed.is_empty() {
                    placed.push(id.clone());
                }
                return Some(id.clone());
            }
            resolve_shared(id, style_source_id_map, &graph.style_sources)
        });
        insert_keyed(
            &mut graph.style_source_selections,
            StyleSourceSelection {
                instance_id: selection.instance_id.clone(),
                values,
            },
        );
        outcome.instances.push(selection.instance_id.clone());
    }

    copy_local_styles(fragment, merged_breakpoint_ids, graph, &mut outcome);
    debug!(
        locals = outcome.placed.len(),
        declarations = outcome.declarations,
        "placed portal local sources"
    );
    outcome
}

// ---------------------------------------------------------------------------
// Regular variant
// ---------------------------------------------------------------------------

/// Place local sources for pasted or duplicated content.
///
/// `new_instance_ids` maps fragment instances to their destinations;
/// selections of unmapped instances are ignored.
pub fn insert_local_style_sources_with_new_ids(
    fragment: &Fragment,
    new_instance_ids: &InstanceIdMap,
    merged_breakpoint_ids: &BreakpointIdMap,
    style_source_id_map: &StyleSourceIdMap,
    graph: &mut StyleGraph,
) -> LocalPlacementOutcome {
    let locals = fragment_locals(fragment);
    let mut outcome = LocalPlacementOutcome::default();

    for selection in &fragment.style_source_selections {
        let Some(destination) = new_instance_ids.get(&selection.instance_id) else {
            continue;
        };
        let root_local = if destination.is_root() {
            graph.local_source_of(destination).cloned()
        } else {
            None
        };

        let values = remap_selection_values(&selection.values, |id| {
            if locals.contains_key(id) {
                let target = root_local.clone().unwrap_or_else(|| {
                    let fresh = StyleSourceId::random();
                    insert_keyed(
                        &mut graph.style_sources,
                        StyleSource::Local { id: fresh.clone() },
                    );
                    fresh
                });
                outcome.placed.entry(id.clone()).or_default().push(target.clone());
                return Some(target);
            }
            resolve_shared(id, style_source_id_map, &graph.style_sources)
        });

        let values = match graph.style_source_selections.get(destination) {
            Some(existing) if destination.is_root() => {
                let mut merged = existing.values.clone();
                merged.extend(values.into_iter().filter(|id| !existing.values.contains(id)));
                merged
            }
            _ => values,
        };
        insert_keyed(
            &mut graph.style_source_selections,
            StyleSourceSelection {
                instance_id: destination.clone(),
                values,
            },
        );
        outcome.instances.push(destination.clone());
    }

    copy_local_styles(fragment, merged_breakpoint_ids, graph, &mut outcome);
    if outcome.placed.values().any(|targets| targets.len() > 1) {
        warn!("fragment local source bound to several instances was duplicated per instance");
    }
    debug!(
        locals = outcome.placed.len(),
        declarations = outcome.declarations,
        "placed local sources with new ids"
    );
    outcome
}
