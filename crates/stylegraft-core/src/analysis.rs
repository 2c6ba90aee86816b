//! Read-only analyses over a project's style data.
//!
//! Nothing here mutates. The finders back cleanup tooling (unused and
//! duplicate tokens); [`check_references`] verifies that selections and
//! declarations only point at style sources that exist.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::merge::{BreakpointScope, signature};
use crate::model::{
    BreakpointIdMap, Breakpoints, InstanceId, StyleGraph, StyleSource, StyleSourceId,
    StyleSourceSelections, StyleSources, Styles,
};

/// Style source id → instances whose selection lists it.
pub type StyleSourceUsages = BTreeMap<StyleSourceId, BTreeSet<InstanceId>>;

/// Build the usage map from the project's selections.
#[must_use]
pub fn style_source_usages(selections: &StyleSourceSelections) -> StyleSourceUsages {
    let mut usages = StyleSourceUsages::new();
    for selection in selections.values() {
        for id in &selection.values {
            usages
                .entry(id.clone())
                .or_default()
                .insert(selection.instance_id.clone());
        }
    }
    usages
}

// ---------------------------------------------------------------------------
// Finders
// ---------------------------------------------------------------------------

/// Tokens no instance uses. Local sources are never reported.
#[must_use]
pub fn find_unused_tokens(
    style_sources: &StyleSources,
    usages: &StyleSourceUsages,
) -> Vec<StyleSourceId> {
    style_sources
        .values()
        .filter(|source| source.is_token())
        .filter(|source| usages.get(source.id()).is_none_or(BTreeSet::is_empty))
        .map(|source| source.id().clone())
        .collect()
}

/// Tokens that share their content signature or their name with another
/// token, each mapped to the ids of the tokens it duplicates.
///
/// Tokens without declarations share the empty signature and are therefore
/// reported as duplicates of each other.
#[must_use]
pub fn find_duplicate_tokens(
    style_sources: &StyleSources,
    styles: &Styles,
    breakpoints: &Breakpoints,
) -> BTreeMap<StyleSourceId, Vec<StyleSourceId>> {
    let no_mapping = BreakpointIdMap::new();
    let scope = BreakpointScope::new(breakpoints, &no_mapping);

    let mut by_signature: BTreeMap<String, Vec<&StyleSourceId>> = BTreeMap::new();
    let mut by_name: BTreeMap<&str, Vec<&StyleSourceId>> = BTreeMap::new();
    for source in style_sources.values() {
        let StyleSource::Token { id, name } = source else {
            continue;
        };
        by_signature
            .entry(signature(id, styles.values(), &scope))
            .or_default()
            .push(id);
        by_name.entry(name.as_str()).or_default().push(id);
    }

    let mut duplicates: BTreeMap<StyleSourceId, Vec<StyleSourceId>> = BTreeMap::new();
    for group in by_signature.values().chain(by_name.values()) {
        if group.len() < 2 {
            continue;
        }
        for &id in group {
            let others = duplicates.entry(id.clone()).or_default();
            for &other in group {
                if other != id && !others.contains(other) {
                    others.push(other.clone());
                }
            }
        }
    }
    duplicates
}

// ---------------------------------------------------------------------------
// Reference integrity
// ---------------------------------------------------------------------------

/// A reference to a style source the project does not contain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DanglingReference {
    /// An instance selection lists a missing source.
    #[serde(rename_all = "camelCase")]
    Selection {
        instance_id: InstanceId,
        style_source_id: StyleSourceId,
    },
    /// A declaration is keyed to a missing source.
    #[serde(rename_all = "camelCase")]
    Declaration {
        style_source_id: StyleSourceId,
        key: String,
    },
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection {
                instance_id,
                style_source_id,
            } => write!(
                f,
                "selection of {instance_id} references missing style source {style_source_id}"
            ),
            Self::Declaration {
                style_source_id,
                key,
            } => write!(
                f,
                "declaration {key} references missing style source {style_source_id}"
            ),
        }
    }
}

/// Every selection entry and declaration whose style source is missing.
#[must_use]
pub fn check_references(graph: &StyleGraph) -> Vec<DanglingReference> {
    let selections = graph.style_source_selections.values().flat_map(|selection| {
        selection
            .values
            .iter()
            .filter(|id| !graph.style_sources.contains_key(*id))
            .map(|id| DanglingReference::Selection {
                instance_id: selection.instance_id.clone(),
                style_source_id: id.clone(),
            })
    });
    let declarations = graph
        .styles
        .iter()
        .filter(|(key, _)| !graph.style_sources.contains_key(&key.style_source_id))
        .map(|(key, _)| DanglingReference::Declaration {
            style_source_id: key.style_source_id.clone(),
            key: key.to_string(),
        });
    selections.chain(declarations).collect()
}
