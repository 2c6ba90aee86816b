//! Token conflicts and the policies that resolve them.
//!
//! A conflict is a fragment token whose name is already taken by a project
//! token with different content. Same name and same content is not a
//! conflict: the fragment token is simply reused.
//!
//! [`detect_conflicts`] is the pre-flight step. It never mutates anything, so
//! a caller can show the list to a user, collect a [`ConflictResolution`], and
//! only then run [`insert_style_sources`](super::tokens::insert_style_sources).
//! Cancelling at that point leaves the project untouched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{StyleDecl, StyleSource, StyleSourceId, StyleSources, Styles};

use super::signature::{BreakpointScope, signature};

// ---------------------------------------------------------------------------
// ConflictResolution
// ---------------------------------------------------------------------------

/// How a true token conflict is settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
    /// Keep the project token; the fragment's declarations are dropped.
    Ours,
    /// Insert the fragment token under a suffixed name (`name-1`, `name-2`...).
    #[default]
    Theirs,
    /// Keep the project token and overlay the fragment's declarations onto
    /// it. Overlapping keys take the fragment value; nothing is removed.
    Merge,
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ours => write!(f, "ours"),
            Self::Theirs => write!(f, "theirs"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Error for an unrecognized policy name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown conflict resolution `{0}` (expected ours, theirs or merge)")]
pub struct UnknownResolution(pub String);

impl FromStr for ConflictResolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ours" => Ok(Self::Ours),
            "theirs" => Ok(Self::Theirs),
            "merge" => Ok(Self::Merge),
            other => Err(UnknownResolution(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Conflict
// ---------------------------------------------------------------------------

/// A fragment token colliding by name with a differently-styled project
/// token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub token_name: String,
    pub fragment_token_id: StyleSourceId,
    pub fragment_token: StyleSource,
    /// The first project token found with that name.
    pub existing_token: StyleSource,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token '{}': fragment {} differs from project {}",
            self.token_name,
            self.fragment_token_id,
            self.existing_token.id()
        )
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Project tokens grouped by name, each group in id order.
pub(crate) fn tokens_by_name(sources: &StyleSources) -> BTreeMap<String, Vec<StyleSourceId>> {
    let mut by_name: BTreeMap<String, Vec<StyleSourceId>> = BTreeMap::new();
    for source in sources.values() {
        if let StyleSource::Token { id, name } = source {
            by_name.entry(name.clone()).or_default().push(id.clone());
        }
    }
    by_name
}

/// Report every fragment token whose name is taken by a project token with
/// different content.
///
/// Local sources never conflict. When several project tokens share the
/// name, a signature match with any of them means no conflict.
#[must_use]
pub fn detect_conflicts(
    fragment_style_sources: &[StyleSource],
    fragment_styles: &[StyleDecl],
    existing_style_sources: &StyleSources,
    existing_styles: &Styles,
    scope: &BreakpointScope<'_>,
) -> Vec<Conflict> {
    let by_name = tokens_by_name(existing_style_sources);
    let mut conflicts = Vec::new();

    for source in fragment_style_sources {
        let StyleSource::Token { id, name } = source else {
            continue;
        };
        let Some(same_name) = by_name.get(name) else {
            continue;
        };

        let fragment_signature = signature(id, fragment_styles, scope);
        let reusable = same_name
            .iter()
            .any(|existing| signature(existing, existing_styles.values(), scope) == fragment_signature);
        if reusable {
            continue;
        }

        let Some(existing_token) = same_name
            .first()
            .and_then(|existing| existing_style_sources.get(existing))
        else {
            continue;
        };
        conflicts.push(Conflict {
            token_name: name.clone(),
            fragment_token_id: id.clone(),
            fragment_token: source.clone(),
            existing_token: existing_token.clone(),
        });
    }

    conflicts
}
