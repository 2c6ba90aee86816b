//! Breakpoint normalization.
//!
//! A fragment carries its own breakpoint ids. Before any signature is built
//! or any declaration is written, every fragment breakpoint is matched to a
//! project breakpoint with the same `minWidth` (or both unconditioned). The
//! fragment breakpoints with no project equivalent are inserted.
//!
//! The plan is computed without touching the project so that the pre-flight
//! conflict check can use it, then applied once the merge is committed.

use tracing::debug;

use crate::model::{Breakpoint, BreakpointId, BreakpointIdMap, Breakpoints, insert_keyed};

/// Outcome of matching fragment breakpoints to project breakpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BreakpointMerge {
    /// Fragment breakpoint id → project breakpoint id, for every fragment
    /// breakpoint.
    pub merged_breakpoint_ids: BreakpointIdMap,
    /// Breakpoints the project lacks, already re-keyed.
    pub inserted: Vec<Breakpoint>,
}

impl BreakpointMerge {
    /// Add the missing breakpoints to `breakpoints`.
    pub fn apply(&self, breakpoints: &mut Breakpoints) {
        for breakpoint in &self.inserted {
            insert_keyed(breakpoints, breakpoint.clone());
        }
    }

    /// A copy of `existing` with the missing breakpoints added.
    #[must_use]
    pub fn merged_view(&self, existing: &Breakpoints) -> Breakpoints {
        let mut view = existing.clone();
        self.apply(&mut view);
        view
    }
}

/// Match `fragment` breakpoints against `existing` ones.
///
/// An inserted breakpoint keeps its fragment id unless the project already
/// uses that id for a different breakpoint, in which case it gets a fresh
/// one. Two fragment breakpoints with the same width collapse onto one.
#[must_use]
pub fn merge_breakpoints(fragment: &Breakpoints, existing: &Breakpoints) -> BreakpointMerge {
    let mut merge = BreakpointMerge::default();

    for breakpoint in fragment.values() {
        let equivalent = existing
            .values()
            .chain(merge.inserted.iter())
            .find(|candidate| candidate.min_width == breakpoint.min_width)
            .map(|candidate| candidate.id.clone());

        let target = if let Some(id) = equivalent {
            id
        } else {
            let taken = |id: &BreakpointId| {
                existing.contains_key(id) || merge.inserted.iter().any(|b| &b.id == id)
            };
            let id = if taken(&breakpoint.id) {
                BreakpointId::random()
            } else {
                breakpoint.id.clone()
            };
            debug!(breakpoint = %breakpoint.id, new_id = %id, "inserting breakpoint");
            merge.inserted.push(Breakpoint {
                id: id.clone(),
                ..breakpoint.clone()
            });
            id
        };

        merge
            .merged_breakpoint_ids
            .insert(breakpoint.id.clone(), target);
    }

    merge
}
