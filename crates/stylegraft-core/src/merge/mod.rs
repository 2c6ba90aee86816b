//! The fragment merge engine.
//!
//! Pipeline, leaves first:
//!
//! - [`signature`]: content identity of a style source
//! - [`breakpoints`]: fragment → project breakpoint normalization
//! - [`conflict`]: read-only pre-flight conflict detection
//! - [`tokens`]: per-token reuse / rename / merge decisions
//! - [`rewrite`]: applying id maps to declarations and selections
//! - [`local`]: portal and regular placement of local sources
//! - [`fragment`]: the whole pipeline as one transaction, and extraction

pub mod breakpoints;
pub mod conflict;
pub mod fragment;
pub mod local;
pub mod rewrite;
pub mod signature;
pub mod tokens;

#[cfg(test)]
mod proptests;

pub use breakpoints::{BreakpointMerge, merge_breakpoints};
pub use conflict::{Conflict, ConflictResolution, UnknownResolution, detect_conflicts};
pub use fragment::{
    LocalPlacement, MergeOptions, MergeReport, PlacementKind, collect_style_sources_from_instances,
    fresh_instance_ids, merge_fragment, preflight,
};
pub use local::{
    LocalPlacementOutcome, insert_local_style_sources_with_new_ids,
    insert_portal_local_style_sources,
};
pub use signature::{BreakpointScope, signature};
pub use tokens::{
    TokenAction, TokenDecision, TokenMergeOutcome, insert_style_sources, next_available_name,
};
