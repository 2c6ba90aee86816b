//! stylegraft-core: the style-source merge engine.
//!
//! Merges a fragment of design data (pasted instances plus the style sources,
//! selections and declarations that style them) into a project's style graph
//! without duplicating tokens, orphaning references, or silently overwriting
//! unrelated styles.
//!
//! # Modules
//!
//! - [`model`]: breakpoints, style sources, declarations, selections
//! - [`merge`]: signatures, conflict detection, token resolution, placement
//! - [`mutate`]: delete and rename primitives
//! - [`analysis`]: unused/duplicate finders and reference checks
//!
//! Every operation takes the collections it reads or writes explicitly.
//! There is no global state.

pub mod analysis;
pub mod merge;
pub mod model;
pub mod mutate;

#[cfg(test)]
mod test_support;

pub use analysis::{
    DanglingReference, StyleSourceUsages, check_references, find_duplicate_tokens,
    find_unused_tokens, style_source_usages,
};
pub use merge::{
    Conflict, ConflictResolution, LocalPlacement, MergeOptions, MergeReport, PlacementKind,
    collect_style_sources_from_instances, detect_conflicts, insert_style_sources, merge_fragment,
    preflight,
};
pub use model::{Fragment, StyleGraph};
pub use mutate::{
    NameError, delete_local_style_sources, delete_style_source, delete_style_sources,
    rename_style_source, validate_style_source_name,
};
