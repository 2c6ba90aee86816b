//! Reference rewriting.
//!
//! Applies the id maps produced by the token resolver and the breakpoint
//! normalizer to declarations and selections.

use std::collections::BTreeSet;

use tracing::warn;

use crate::model::{
    BreakpointIdMap, StyleDecl, StyleSourceId, StyleSourceIdMap, StyleSources, Styles,
    insert_keyed,
};

/// Copy of `decl` re-keyed onto `style_source_id`, with its breakpoint mapped
/// through `merged_breakpoint_ids`.
#[must_use]
pub fn rebind_decl(
    decl: &StyleDecl,
    style_source_id: StyleSourceId,
    merged_breakpoint_ids: &BreakpointIdMap,
) -> StyleDecl {
    StyleDecl {
        style_source_id,
        breakpoint_id: merged_breakpoint_ids
            .get(&decl.breakpoint_id)
            .unwrap_or(&decl.breakpoint_id)
            .clone(),
        ..decl.clone()
    }
}

/// Copy the declarations of every token in `style_source_ids` into
/// `styles`, re-keyed through `style_source_id_map`.
///
/// Existing declarations under the same key are overwritten; other existing
/// declarations of the target token are left alone. Returns the number of
/// declarations written.
pub fn copy_token_styles(
    fragment_styles: &[StyleDecl],
    style_source_ids: &BTreeSet<StyleSourceId>,
    style_source_id_map: &StyleSourceIdMap,
    merged_breakpoint_ids: &BreakpointIdMap,
    styles: &mut Styles,
) -> usize {
    let mut written = 0;
    for decl in fragment_styles {
        if !style_source_ids.contains(&decl.style_source_id) {
            continue;
        }
        let Some(target) = style_source_id_map.get(&decl.style_source_id) else {
            continue;
        };
        insert_keyed(styles, rebind_decl(decl, target.clone(), merged_breakpoint_ids));
        written += 1;
    }
    written
}

/// Rewrite a selection's ids.
///
/// Each id is passed to `resolve`; ids it rejects are dropped with a warning.
/// Order is preserved and an id resolving twice is kept once.
pub fn remap_selection_values<F>(values: &[StyleSourceId], mut resolve: F) -> Vec<StyleSourceId>
where
    F: FnMut(&StyleSourceId) -> Option<StyleSourceId>,
{
    let mut out: Vec<StyleSourceId> = Vec::with_capacity(values.len());
    for id in values {
        match resolve(id) {
            Some(mapped) if !out.contains(&mapped) => out.push(mapped),
            Some(_) => {}
            None => warn!(style_source = %id, "dropping reference to unknown style source"),
        }
    }
    out
}

/// Resolve a fragment selection entry that is not a fragment local: mapped
/// tokens follow the id map, ids already in the project pass through.
#[must_use]
pub fn resolve_shared(
    id: &StyleSourceId,
    style_source_id_map: &StyleSourceIdMap,
    style_sources: &StyleSources,
) -> Option<StyleSourceId> {
    if let Some(mapped) = style_source_id_map.get(id) {
        return Some(mapped.clone());
    }
    style_sources.contains_key(id).then(|| id.clone())
}
