//! Token merge resolution.
//!
//! Decides, for each token in a fragment, what happens to it on merge:
//!
//! 1. **Fresh name**: inserted under a new id.
//! 2. **Same name, same content**: the project token is reused. Nothing is
//!    inserted and no declarations need copying.
//! 3. **Same name, different content**: settled by [`ConflictResolution`]:
//!    - `ours` maps onto the project token and drops the fragment's styles;
//!    - `merge` maps onto the project token and copies the fragment's styles
//!      over it;
//!    - `theirs` inserts the token under the next free `name-N`.
//!
//! Tokens are processed in fragment order. A token inserted earlier in the
//! same call takes part in later name lookups, so two fragment tokens
//! claiming the same new name are disambiguated against each other.
//!
//! # Invariants
//!
//! - `style_source_id_map` has exactly one entry per fragment token.
//! - Every map target is present in `updated_style_sources`.
//! - `style_source_ids` only contains fragment ids whose declarations must be
//!   copied; the ids dropped by `ours` or reuse are never in it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::{StyleDecl, StyleSource, StyleSourceId, StyleSourceIdMap, StyleSources, Styles};

use super::conflict::{ConflictResolution, tokens_by_name};
use super::signature::{BreakpointScope, signature};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// What happened to one fragment token.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum TokenAction {
    /// No project token had the name; inserted as-is under a new id.
    Inserted { id: StyleSourceId },
    /// A project token with the same name and content was reused.
    Reused { id: StyleSourceId },
    /// Conflict settled by `ours`: the project token was kept.
    KeptExisting { id: StyleSourceId },
    /// Conflict settled by `merge`: declarations overlay the project token.
    Merged { id: StyleSourceId },
    /// Conflict settled by `theirs`: inserted under a suffixed name.
    Renamed {
        id: StyleSourceId,
        #[serde(rename = "newName")]
        name: String,
    },
}

impl TokenAction {
    /// The id the fragment token now resolves to.
    #[must_use]
    pub const fn target(&self) -> &StyleSourceId {
        match self {
            Self::Inserted { id }
            | Self::Reused { id }
            | Self::KeptExisting { id }
            | Self::Merged { id }
            | Self::Renamed { id, .. } => id,
        }
    }
}

/// Per-token decision record.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDecision {
    pub fragment_id: StyleSourceId,
    pub name: String,
    #[serde(flatten)]
    pub action: TokenAction,
}

/// Result of [`insert_style_sources`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenMergeOutcome {
    /// Fragment token ids whose declarations must be copied.
    pub style_source_ids: BTreeSet<StyleSourceId>,
    /// Fragment token id → project token id.
    pub style_source_id_map: StyleSourceIdMap,
    /// Project sources plus every inserted token.
    pub updated_style_sources: StyleSources,
    /// One entry per fragment token, in fragment order.
    pub decisions: Vec<TokenDecision>,
}

// ---------------------------------------------------------------------------
// insert_style_sources
// ---------------------------------------------------------------------------

/// Resolve every fragment token against the project's tokens.
///
/// Local sources are skipped; they are placed separately by
/// [`super::local`].
#[must_use]
pub fn insert_style_sources(
    fragment_style_sources: &[StyleSource],
    fragment_styles: &[StyleDecl],
    existing_style_sources: &StyleSources,
    existing_styles: &Styles,
    scope: &BreakpointScope<'_>,
    conflict_resolution: ConflictResolution,
) -> TokenMergeOutcome {
    let mut resolver = Resolver {
        fragment_styles,
        existing_styles,
        scope,
        by_name: tokens_by_name(existing_style_sources),
        inserted_from: BTreeMap::new(),
        outcome: TokenMergeOutcome {
            updated_style_sources: existing_style_sources.clone(),
            ..TokenMergeOutcome::default()
        },
    };

    for source in fragment_style_sources {
        if let StyleSource::Token { id, name } = source {
            resolver.resolve(id, name, conflict_resolution);
        }
    }

    resolver.outcome
}

struct Resolver<'a> {
    fragment_styles: &'a [StyleDecl],
    existing_styles: &'a Styles,
    scope: &'a BreakpointScope<'a>,
    by_name: BTreeMap<String, Vec<StyleSourceId>>,
    /// Tokens inserted by this call → the fragment id their styles live under.
    inserted_from: BTreeMap<StyleSourceId, StyleSourceId>,
    outcome: TokenMergeOutcome,
}

impl Resolver<'_> {
    fn resolve(&mut self, fragment_id: &StyleSourceId, name: &str, policy: ConflictResolution) {
        let fresh_id = StyleSourceId::random();

        let Some(same_name) = self.by_name.get(name).cloned() else {
            self.insert(fragment_id, fresh_id.clone(), name.to_owned());
            self.record(fragment_id, name, TokenAction::Inserted { id: fresh_id });
            return;
        };

        let fragment_signature = signature(fragment_id, self.fragment_styles, self.scope);
        if let Some(existing) = same_name
            .iter()
            .find(|candidate| self.signature_of(candidate) == fragment_signature)
        {
            debug!(token = name, existing = %existing, "reusing identical token");
            self.map(fragment_id, existing.clone());
            self.record(fragment_id, name, TokenAction::Reused { id: existing.clone() });
            return;
        }

        // Non-empty by construction of `by_name`.
        let Some(first) = same_name.first().cloned() else {
            return;
        };
        debug!(token = name, existing = %first, %policy, "token conflict");

        match policy {
            ConflictResolution::Ours => {
                self.map(fragment_id, first.clone());
                self.record(fragment_id, name, TokenAction::KeptExisting { id: first });
            }
            ConflictResolution::Merge => {
                self.map(fragment_id, first.clone());
                self.outcome.style_source_ids.insert(fragment_id.clone());
                self.record(fragment_id, name, TokenAction::Merged { id: first });
            }
            ConflictResolution::Theirs => {
                let new_name = next_available_name(name, &self.outcome.updated_style_sources);
                self.insert(fragment_id, fresh_id.clone(), new_name.clone());
                self.record(
                    fragment_id,
                    name,
                    TokenAction::Renamed {
                        id: fresh_id,
                        name: new_name,
                    },
                );
            }
        }
    }

    /// Signature of a token known to this call, wherever its styles live.
    fn signature_of(&self, id: &StyleSourceId) -> String {
        match self.inserted_from.get(id) {
            Some(fragment_id) => signature(fragment_id, self.fragment_styles, self.scope),
            None => signature(id, self.existing_styles.values(), self.scope),
        }
    }

    fn insert(&mut self, fragment_id: &StyleSourceId, id: StyleSourceId, name: String) {
        self.outcome.updated_style_sources.insert(
            id.clone(),
            StyleSource::Token {
                id: id.clone(),
                name: name.clone(),
            },
        );
        self.outcome.style_source_ids.insert(fragment_id.clone());
        self.by_name.entry(name).or_default().push(id.clone());
        self.inserted_from.insert(id.clone(), fragment_id.clone());
        self.map(fragment_id, id);
    }

    fn map(&mut self, fragment_id: &StyleSourceId, target: StyleSourceId) {
        self.outcome
            .style_source_id_map
            .insert(fragment_id.clone(), target);
    }

    fn record(&mut self, fragment_id: &StyleSourceId, name: &str, action: TokenAction) {
        self.outcome.decisions.push(TokenDecision {
            fragment_id: fragment_id.clone(),
            name: name.to_owned(),
            action,
        });
    }
}

// ---------------------------------------------------------------------------
// Name disambiguation
// ---------------------------------------------------------------------------

/// Numeric suffix of `candidate` relative to `base` as a decimal digit
/// string without leading zeros: `"0"` for the bare name, `n` for `base-n`,
/// `None` for anything else.
///
/// Suffixes are kept as text so arbitrarily long ones compare correctly.
fn name_suffix<'a>(candidate: &'a str, base: &str) -> Option<&'a str> {
    let rest = candidate.strip_prefix(base)?;
    if rest.is_empty() {
        return Some("0");
    }
    let digits = rest.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

/// Add one to a decimal digit string.
fn increment_decimal(digits: &str) -> String {
    let mut bytes: Vec<u8> = digits.bytes().collect();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            carry = false;
            break;
        }
    }
    let mut out = String::with_capacity(bytes.len() + 1);
    if carry {
        out.push('1');
    }
    out.extend(bytes.into_iter().map(char::from));
    out
}

/// The name `base-(max+1)`, where `max` is the highest suffix among token
/// names of the form `base` or `base-<digits>`.
///
/// Gaps are never filled: with `x` and `x-2` taken the result is `x-3`.
#[must_use]
pub fn next_available_name(base: &str, sources: &StyleSources) -> String {
    let max = sources
        .values()
        .filter_map(StyleSource::name)
        .filter_map(|name| name_suffix(name, base))
        .max_by_key(|digits| (digits.len(), *digits))
        .unwrap_or("0");
    format!("{base}-{}", increment_decimal(max))
}
