//! Core style-graph types.
//!
//! Identifiers, breakpoints, style sources, declarations and selections, plus
//! the two containers that carry them around: [`StyleGraph`] (a project's
//! live collections) and [`Fragment`] (a not-yet-merged bundle).
//!
//! Every collection is a `BTreeMap` so iteration order, and therefore every
//! merge result, is deterministic. On the wire (JSON) collections are plain
//! arrays of records; the map key is always derivable from the record.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::Rng as _;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use super::value::StyleValue;

/// Length of freshly generated ids.
const GENERATED_ID_LEN: usize = 21;

/// Id of the document's synthetic top-level instance.
pub const ROOT_INSTANCE_ID: &str = ":root";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random id.
            #[must_use]
            pub fn random() -> Self {
                Self(
                    rand::rng()
                        .sample_iter(&Alphanumeric)
                        .take(GENERATED_ID_LEN)
                        .map(char::from)
                        .collect(),
                )
            }

            /// Return the inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`StyleSource`].
    StyleSourceId
);

string_id!(
    /// Identifier of a [`Breakpoint`].
    BreakpointId
);

string_id!(
    /// Identifier of a document instance.
    InstanceId
);

impl InstanceId {
    /// The synthetic root instance id.
    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_INSTANCE_ID)
    }

    /// Returns `true` for the synthetic root instance.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_INSTANCE_ID
    }
}

// ---------------------------------------------------------------------------
// Breakpoint
// ---------------------------------------------------------------------------

/// A responsive breakpoint.
///
/// Two breakpoints from different documents are equivalent when their
/// `min_width` matches; the raw id is irrelevant for comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub id: BreakpointId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
}

impl Breakpoint {
    /// Comparison key: the min width, or `base` for the unconditioned
    /// breakpoint.
    #[must_use]
    pub fn comparison_key(&self) -> String {
        self.min_width
            .map_or_else(|| "base".to_owned(), |width| width.to_string())
    }
}

// ---------------------------------------------------------------------------
// StyleSource
// ---------------------------------------------------------------------------

/// An addressable bag of declarations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleSource {
    /// Named and reusable. Names are unique among a project's tokens.
    Token { id: StyleSourceId, name: String },
    /// Unnamed, bound to a single instance.
    Local { id: StyleSourceId },
}

impl StyleSource {
    #[must_use]
    pub const fn id(&self) -> &StyleSourceId {
        match self {
            Self::Token { id, .. } | Self::Local { id } => id,
        }
    }

    /// Token name, `None` for local sources.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Token { name, .. } => Some(name),
            Self::Local { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_token(&self) -> bool {
        matches!(self, Self::Token { .. })
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

// ---------------------------------------------------------------------------
// StyleDecl and its composite key
// ---------------------------------------------------------------------------

/// One CSS declaration owned by a style source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDecl {
    pub style_source_id: StyleSourceId,
    pub breakpoint_id: BreakpointId,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub value: StyleValue,
}

impl StyleDecl {
    /// The composite key this declaration is stored under.
    #[must_use]
    pub fn key(&self) -> DeclKey {
        DeclKey {
            style_source_id: self.style_source_id.clone(),
            breakpoint_id: self.breakpoint_id.clone(),
            property: self.property.clone(),
            state: self.state.clone(),
        }
    }
}

/// Composite key `(style source, breakpoint, property, state)`.
///
/// Storing declarations under this key is what makes re-declaring the same
/// property on the same source/breakpoint/state an overwrite.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclKey {
    pub style_source_id: StyleSourceId,
    pub breakpoint_id: BreakpointId,
    pub property: String,
    pub state: Option<String>,
}

/// String form of a declaration's composite key:
/// `<source>:<breakpoint>:<property>:<state>` with an empty state segment
/// when the declaration has none.
#[must_use]
pub fn decl_key(decl: &StyleDecl) -> String {
    decl.key().to_string()
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.style_source_id,
            self.breakpoint_id,
            self.property,
            self.state.as_deref().unwrap_or_default()
        )
    }
}

// ---------------------------------------------------------------------------
// StyleSourceSelection
// ---------------------------------------------------------------------------

/// The ordered list of style sources applied to one instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSourceSelection {
    pub instance_id: InstanceId,
    pub values: Vec<StyleSourceId>,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

pub type Breakpoints = BTreeMap<BreakpointId, Breakpoint>;
pub type StyleSources = BTreeMap<StyleSourceId, StyleSource>;
pub type StyleSourceSelections = BTreeMap<InstanceId, StyleSourceSelection>;
pub type Styles = BTreeMap<DeclKey, StyleDecl>;

/// Old style-source id → new or existing style-source id.
pub type StyleSourceIdMap = BTreeMap<StyleSourceId, StyleSourceId>;
/// Fragment breakpoint id → project breakpoint id.
pub type BreakpointIdMap = BTreeMap<BreakpointId, BreakpointId>;
/// Fragment instance id → destination instance id.
pub type InstanceIdMap = BTreeMap<InstanceId, InstanceId>;

/// A record that knows the key it is stored under.
pub trait Keyed {
    type Key: Ord;
    fn record_key(&self) -> Self::Key;
}

impl Keyed for Breakpoint {
    type Key = BreakpointId;
    fn record_key(&self) -> BreakpointId {
        self.id.clone()
    }
}

impl Keyed for StyleSource {
    type Key = StyleSourceId;
    fn record_key(&self) -> StyleSourceId {
        self.id().clone()
    }
}

impl Keyed for StyleSourceSelection {
    type Key = InstanceId;
    fn record_key(&self) -> InstanceId {
        self.instance_id.clone()
    }
}

impl Keyed for StyleDecl {
    type Key = DeclKey;
    fn record_key(&self) -> DeclKey {
        self.key()
    }
}

/// Insert a record under its own key, replacing any previous one.
pub fn insert_keyed<V: Keyed>(map: &mut BTreeMap<V::Key, V>, value: V) {
    map.insert(value.record_key(), value);
}

/// Serde adapter: a keyed map travels as an array of its values.
mod keyed_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::Keyed;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: serde::Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<V::Key, V>, D::Error>
    where
        V: Keyed + Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let records = Vec::<V>::deserialize(deserializer)?;
        Ok(records.into_iter().map(|v| (v.record_key(), v)).collect())
    }
}

// ---------------------------------------------------------------------------
// StyleGraph
// ---------------------------------------------------------------------------

/// A project's live style collections.
///
/// The three style collections reference each other by id: selections and
/// declarations point at style sources. Every operation in this crate keeps
/// those references intact.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleGraph {
    #[serde(default, with = "keyed_list")]
    pub breakpoints: Breakpoints,
    #[serde(default, with = "keyed_list")]
    pub style_sources: StyleSources,
    #[serde(default, with = "keyed_list")]
    pub style_source_selections: StyleSourceSelections,
    #[serde(default, with = "keyed_list")]
    pub styles: Styles,
}

impl StyleGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The local style source currently bound to `instance_id`, if any.
    #[must_use]
    pub fn local_source_of(&self, instance_id: &InstanceId) -> Option<&StyleSourceId> {
        self.style_source_selections
            .get(instance_id)?
            .values
            .iter()
            .find(|id| self.style_sources.get(*id).is_some_and(StyleSource::is_local))
    }

    /// Iterate over token sources only.
    pub fn tokens(&self) -> impl Iterator<Item = &StyleSource> {
        self.style_sources.values().filter(|s| s.is_token())
    }
}

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// A self-contained bundle of style data about to be merged into, or just
/// extracted from, a project.
///
/// Sources, selections and declarations keep their original order: the
/// token resolver processes sources in sequence and later tokens see the
/// names claimed by earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    #[serde(default, with = "keyed_list")]
    pub breakpoints: Breakpoints,
    #[serde(default)]
    pub style_sources: Vec<StyleSource>,
    #[serde(default)]
    pub style_source_selections: Vec<StyleSourceSelection>,
    #[serde(default)]
    pub styles: Vec<StyleDecl>,
    #[serde(default)]
    pub instance_ids: BTreeSet<InstanceId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(source: &str, bp: &str, property: &str, state: Option<&str>) -> StyleDecl {
        StyleDecl {
            style_source_id: source.into(),
            breakpoint_id: bp.into(),
            property: property.to_owned(),
            state: state.map(str::to_owned),
            value: StyleValue::keyword("red"),
        }
    }

    #[test]
    fn decl_key_has_empty_state_segment() {
        assert_eq!(decl_key(&decl("s1", "bp", "color", None)), "s1:bp:color:");
        assert_eq!(
            decl_key(&decl("s1", "bp", "color", Some(":hover"))),
            "s1:bp:color::hover"
        );
    }

    #[test]
    fn redeclaring_same_key_overwrites() {
        let mut styles = Styles::new();
        insert_keyed(&mut styles, decl("s1", "bp", "color", None));
        let mut second = decl("s1", "bp", "color", None);
        second.value = StyleValue::keyword("blue");
        insert_keyed(&mut styles, second);
        insert_keyed(&mut styles, decl("s1", "bp", "color", Some(":hover")));

        assert_eq!(styles.len(), 2);
        let first_key = decl("s1", "bp", "color", None).key();
        assert_eq!(styles[&first_key].value, StyleValue::keyword("blue"));
    }

    #[test]
    fn random_ids_are_distinct() {
        let a = StyleSourceId::random();
        let b = StyleSourceId::random();
        assert_eq!(a.as_str().len(), GENERATED_ID_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn breakpoint_comparison_key() {
        let base = Breakpoint {
            id: "a".into(),
            label: "Base".to_owned(),
            min_width: None,
        };
        let tablet = Breakpoint {
            id: "b".into(),
            label: "Tablet".to_owned(),
            min_width: Some(768),
        };
        assert_eq!(base.comparison_key(), "base");
        assert_eq!(tablet.comparison_key(), "768");
    }

    #[test]
    fn local_source_of_finds_first_local() {
        let mut graph = StyleGraph::new();
        insert_keyed(
            &mut graph.style_sources,
            StyleSource::Token {
                id: "t1".into(),
                name: "Primary".to_owned(),
            },
        );
        insert_keyed(&mut graph.style_sources, StyleSource::Local { id: "l1".into() });
        insert_keyed(
            &mut graph.style_source_selections,
            StyleSourceSelection {
                instance_id: InstanceId::root(),
                values: vec!["t1".into(), "l1".into()],
            },
        );

        assert_eq!(
            graph.local_source_of(&InstanceId::root()),
            Some(&StyleSourceId::from("l1"))
        );
        assert_eq!(graph.local_source_of(&"other".into()), None);
    }

    #[test]
    fn graph_json_uses_arrays_and_type_tags() {
        let json = r#"{
            "breakpoints": [{"id": "bp", "label": "Base"}],
            "styleSources": [
                {"type": "token", "id": "t1", "name": "Primary"},
                {"type": "local", "id": "l1"}
            ],
            "styleSourceSelections": [{"instanceId": "i1", "values": ["t1", "l1"]}],
            "styles": [{
                "styleSourceId": "t1",
                "breakpointId": "bp",
                "property": "color",
                "value": {"type": "keyword", "value": "red"}
            }]
        }"#;
        let graph: StyleGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.style_sources.len(), 2);
        assert!(graph.style_sources[&StyleSourceId::from("l1")].is_local());
        assert_eq!(graph.styles.len(), 1);

        let back = serde_json::to_value(&graph).unwrap();
        assert!(back["styleSources"].is_array());
        assert_eq!(back["styleSources"][0]["type"], "local");
    }
}
