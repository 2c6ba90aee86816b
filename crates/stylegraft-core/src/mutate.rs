//! Deletion and rename primitives.
//!
//! Each primitive keeps style sources, selections and declarations
//! consistent with each other. Unknown ids are silently ignored.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{StyleSource, StyleSourceId, StyleSourceSelections, StyleSources, Styles};

/// Why a token name was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The name is empty or whitespace only.
    #[error("token name must not be empty")]
    MinLength,
    /// Another token already uses the name.
    #[error("token name '{name}' is already used by {owner}")]
    Duplicate {
        name: String,
        owner: StyleSourceId,
    },
}

impl NameError {
    /// Short machine-readable kind: `minlength` or `duplicate`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MinLength => "minlength",
            Self::Duplicate { .. } => "duplicate",
        }
    }
}

/// Check `name` as the new name of token `id`.
///
/// The name is compared trimmed. Local sources do not take part in the
/// uniqueness check, and neither does the token being renamed.
///
/// # Errors
/// [`NameError::MinLength`] for a blank name, [`NameError::Duplicate`] when
/// another token already owns it.
pub fn validate_style_source_name(
    name: &str,
    id: Option<&StyleSourceId>,
    style_sources: &StyleSources,
) -> Result<(), NameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NameError::MinLength);
    }
    let owner = style_sources.values().find(|source| {
        Some(source.id()) != id && source.name() == Some(name)
    });
    match owner {
        Some(owner) => Err(NameError::Duplicate {
            name: name.to_owned(),
            owner: owner.id().clone(),
        }),
        None => Ok(()),
    }
}

/// Rename token `id` to the trimmed `name`. Local sources and unknown ids
/// are left alone.
pub fn rename_style_source(id: &StyleSourceId, name: &str, style_sources: &mut StyleSources) {
    let name = name.trim();
    if let Some(StyleSource::Token { name: current, .. }) = style_sources.get_mut(id) {
        debug!(style_source = %id, from = %current, to = name, "renaming token");
        name.clone_into(current);
    }
}

/// Remove a style source, its id from every selection, and its declarations.
pub fn delete_style_source(
    id: &StyleSourceId,
    style_sources: &mut StyleSources,
    selections: &mut StyleSourceSelections,
    styles: &mut Styles,
) {
    if style_sources.remove(id).is_none() {
        debug!(style_source = %id, "delete of unknown style source ignored");
    }
    for selection in selections.values_mut() {
        selection.values.retain(|value| value != id);
    }
    styles.retain(|key, _| &key.style_source_id != id);
}

/// [`delete_style_source`] for every id in `ids`.
pub fn delete_style_sources(
    ids: &[StyleSourceId],
    style_sources: &mut StyleSources,
    selections: &mut StyleSourceSelections,
    styles: &mut Styles,
) {
    for id in ids {
        delete_style_source(id, style_sources, selections, styles);
    }
}

/// Remove local sources in `ids` and their declarations.
///
/// Used when instances are deleted: their selections go away with them, so
/// selections are not touched here. Ids naming tokens are ignored.
pub fn delete_local_style_sources(
    ids: &BTreeSet<StyleSourceId>,
    style_sources: &mut StyleSources,
    styles: &mut Styles,
) {
    let removed: BTreeSet<StyleSourceId> = ids
        .iter()
        .filter(|id| style_sources.get(*id).is_some_and(StyleSource::is_local))
        .cloned()
        .collect();
    style_sources.retain(|id, _| !removed.contains(id));
    styles.retain(|key, _| !removed.contains(&key.style_source_id));
}
