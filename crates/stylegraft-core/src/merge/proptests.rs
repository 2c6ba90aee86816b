//! Property tests for the merge engine.
//!
//! - signatures ignore declaration order and concrete breakpoint ids
//! - no merge, under any policy or placement, leaves a dangling reference
//! - reinserting a merged fragment adds no tokens unless the policy renames
//! - the project's token names stay unique

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use crate::analysis::check_references;
use crate::merge::{
    BreakpointScope, ConflictResolution, LocalPlacement, MergeOptions, fresh_instance_ids,
    merge_fragment, signature,
};
use crate::model::{BreakpointIdMap, Fragment, StyleDecl, StyleGraph, StyleSource, StyleValue};
use crate::test_support::{bp, decl, decl_with_state, fragment, graph, local, selection, token};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const NAMES: &[&str] = &["Primary", "Primary-1", "Primary-3", "Accent", "Muted"];
const PROPERTIES: &[&str] = &["color", "margin", "gap"];
const COLORS: &[&str] = &["red", "blue", "green"];

fn arb_resolution() -> impl Strategy<Value = ConflictResolution> {
    prop_oneof![
        Just(ConflictResolution::Ours),
        Just(ConflictResolution::Theirs),
        Just(ConflictResolution::Merge),
    ]
}

/// Declarations of one source over the `base` breakpoint, unique per key.
fn arb_decls(source: &'static str) -> impl Strategy<Value = Vec<StyleDecl>> {
    prop::collection::vec((0..PROPERTIES.len(), 0..COLORS.len()), 0..6).prop_map(move |picked| {
        picked
            .into_iter()
            .collect::<BTreeMap<_, _>>()
            .into_iter()
            .map(|(p, c)| decl(source, "base", PROPERTIES[p], StyleValue::keyword(COLORS[c])))
            .collect()
    })
}

/// Tokens as `(id, name, color, background)` with names from a small pool,
/// so collisions are common.
fn arb_tokens(prefix: &'static str) -> impl Strategy<Value = Vec<(String, String, usize, usize)>> {
    prop::collection::vec((0..NAMES.len(), 0..COLORS.len(), 0..COLORS.len()), 0..5).prop_map(
        move |tokens| {
            tokens
                .into_iter()
                .enumerate()
                .map(|(i, (name, c1, c2))| (format!("{prefix}{i}"), NAMES[name].to_owned(), c1, c2))
                .collect()
        },
    )
}

fn token_records(
    tokens: &[(String, String, usize, usize)],
) -> (Vec<StyleSource>, Vec<StyleDecl>) {
    let mut sources = Vec::new();
    let mut styles = Vec::new();
    for (id, name, c1, c2) in tokens {
        sources.push(token(id, name));
        styles.push(decl(id, "base", "color", StyleValue::keyword(COLORS[*c1])));
        if c2 != c1 {
            styles.push(decl(id, "base", "background", StyleValue::keyword(COLORS[*c2])));
        }
    }
    (sources, styles)
}

/// Project tokens with unique names, each used by one instance, plus a
/// root-local source.
fn project_from(tokens: &[(String, String, usize, usize)]) -> StyleGraph {
    let mut seen = BTreeSet::new();
    let unique: Vec<_> = tokens
        .iter()
        .filter(|(_, name, _, _)| seen.insert(name.clone()))
        .cloned()
        .collect();
    let (mut sources, mut styles) = token_records(&unique);
    let mut selections: Vec<_> = unique
        .iter()
        .map(|(id, ..)| selection(&format!("inst-{id}"), &[id.as_str()]))
        .collect();
    sources.push(local("root-local"));
    styles.push(decl("root-local", "base", "color", StyleValue::keyword("black")));
    selections.push(selection(":root", &["root-local"]));
    graph(sources, selections, styles)
}

/// Fragment tokens, one instance selecting all of them plus a local, and a
/// root instance with its own local.
fn fragment_from(tokens: &[(String, String, usize, usize)]) -> Fragment {
    let (mut sources, mut styles) = token_records(tokens);
    let mut values: Vec<&str> = tokens.iter().map(|(id, ..)| id.as_str()).collect();
    values.push("frag-local");
    sources.push(local("frag-local"));
    sources.push(local("frag-root-local"));
    styles.push(decl("frag-local", "base", "gap", StyleValue::unit(4.0, "px")));
    styles.push(decl("frag-root-local", "base", "margin", StyleValue::unit(0.0, "px")));
    fragment(
        sources,
        vec![
            selection("frag-inst", &values),
            selection(":root", &["frag-root-local"]),
        ],
        styles,
    )
}

fn assert_unique_token_names(graph: &StyleGraph) -> Result<(), TestCaseError> {
    let mut names = BTreeSet::new();
    for t in graph.tokens() {
        let name = t.name().unwrap_or_default();
        prop_assert!(names.insert(name.to_owned()), "duplicate token name {}", name);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn signature_ignores_declaration_order(
        (original, shuffled) in arb_decls("s").prop_flat_map(|d| (Just(d.clone()), Just(d).prop_shuffle()))
    ) {
        let mut breakpoints = crate::model::Breakpoints::new();
        crate::model::insert_keyed(&mut breakpoints, bp("base", None));
        let map = BreakpointIdMap::new();
        let scope = BreakpointScope::new(&breakpoints, &map);

        prop_assert_eq!(
            signature(&"s".into(), &original, &scope),
            signature(&"s".into(), &shuffled, &scope)
        );
    }

    #[test]
    fn signature_ignores_equivalent_breakpoint_ids(
        width in 320u32..2000,
        state in prop::option::of(Just("hover")),
        color in 0..COLORS.len(),
    ) {
        let mut breakpoints = crate::model::Breakpoints::new();
        crate::model::insert_keyed(&mut breakpoints, bp("project-bp", Some(width)));
        let map: BreakpointIdMap = [("fragment-bp".into(), "project-bp".into())].into_iter().collect();
        let scope = BreakpointScope::new(&breakpoints, &map);

        let make = |source: &str, breakpoint: &str| match state {
            Some(state) => decl_with_state(source, breakpoint, "color", state, StyleValue::keyword(COLORS[color])),
            None => decl(source, breakpoint, "color", StyleValue::keyword(COLORS[color])),
        };
        let project = vec![make("a", "project-bp")];
        let incoming = vec![make("b", "fragment-bp")];

        prop_assert_eq!(
            signature(&"a".into(), &project, &scope),
            signature(&"b".into(), &incoming, &scope)
        );
    }

    #[test]
    fn merge_never_leaves_dangling_references(
        existing in arb_tokens("p"),
        incoming in arb_tokens("f"),
        resolution in arb_resolution(),
        portal in any::<bool>(),
    ) {
        let mut project = project_from(&existing);
        let fragment = fragment_from(&incoming);
        let placement = if portal {
            LocalPlacement::Portal
        } else {
            LocalPlacement::Regular { new_instance_ids: fresh_instance_ids(&fragment) }
        };

        let report = merge_fragment(&mut project, &fragment, &MergeOptions { resolution, placement });

        prop_assert!(check_references(&project).is_empty(), "{:?}", check_references(&project));
        prop_assert_eq!(report.style_source_id_map.len(), incoming.len());
        for target in report.style_source_id_map.values() {
            prop_assert!(project.style_sources.contains_key(target));
        }
        assert_unique_token_names(&project)?;

        let root_locals = project.style_source_selections[&crate::model::InstanceId::root()]
            .values
            .iter()
            .filter(|id| project.style_sources.get(*id).is_some_and(StyleSource::is_local))
            .count();
        prop_assert_eq!(root_locals, 1);
    }

    #[test]
    fn remerging_adds_no_tokens_without_renames(
        existing in arb_tokens("p"),
        incoming in arb_tokens("f"),
        resolution in arb_resolution(),
    ) {
        let mut project = project_from(&existing);
        let fragment = fragment_from(&incoming);
        let options = |fragment: &Fragment| MergeOptions {
            resolution,
            placement: LocalPlacement::Regular { new_instance_ids: fresh_instance_ids(fragment) },
        };

        merge_fragment(&mut project, &fragment, &options(&fragment));
        let tokens_after_first = project.tokens().count();
        if resolution != ConflictResolution::Theirs {
            merge_fragment(&mut project, &fragment, &options(&fragment));
            prop_assert_eq!(project.tokens().count(), tokens_after_first);
        }
        prop_assert!(check_references(&project).is_empty());
    }
}
