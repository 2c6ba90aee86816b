//! Builders shared by the unit tests.

use crate::model::{
    Breakpoint, Fragment, InstanceId, StyleDecl, StyleGraph, StyleSource, StyleSourceSelection,
    StyleValue, insert_keyed,
};

pub fn bp(id: &str, min_width: Option<u32>) -> Breakpoint {
    Breakpoint {
        id: id.into(),
        label: id.to_owned(),
        min_width,
    }
}

pub fn token(id: &str, name: &str) -> StyleSource {
    StyleSource::Token {
        id: id.into(),
        name: name.to_owned(),
    }
}

pub fn local(id: &str) -> StyleSource {
    StyleSource::Local { id: id.into() }
}

pub fn decl(source: &str, breakpoint: &str, property: &str, value: StyleValue) -> StyleDecl {
    StyleDecl {
        style_source_id: source.into(),
        breakpoint_id: breakpoint.into(),
        property: property.to_owned(),
        state: None,
        value,
    }
}

pub fn decl_with_state(
    source: &str,
    breakpoint: &str,
    property: &str,
    state: &str,
    value: StyleValue,
) -> StyleDecl {
    StyleDecl {
        state: Some(state.to_owned()),
        ..decl(source, breakpoint, property, value)
    }
}

pub fn color(source: &str, name: &str) -> StyleDecl {
    decl(source, "base", "color", StyleValue::keyword(name))
}

pub fn selection(instance: &str, values: &[&str]) -> StyleSourceSelection {
    StyleSourceSelection {
        instance_id: InstanceId::from(instance),
        values: values.iter().map(|&v| v.into()).collect(),
    }
}

/// A project with a single `base` breakpoint and the given records.
pub fn graph(
    sources: Vec<StyleSource>,
    selections: Vec<StyleSourceSelection>,
    styles: Vec<StyleDecl>,
) -> StyleGraph {
    let mut graph = StyleGraph::new();
    insert_keyed(&mut graph.breakpoints, bp("base", None));
    for source in sources {
        insert_keyed(&mut graph.style_sources, source);
    }
    for selection in selections {
        insert_keyed(&mut graph.style_source_selections, selection);
    }
    for decl in styles {
        insert_keyed(&mut graph.styles, decl);
    }
    graph
}

/// A fragment sharing the `base` breakpoint id with [`graph`].
pub fn fragment(
    sources: Vec<StyleSource>,
    selections: Vec<StyleSourceSelection>,
    styles: Vec<StyleDecl>,
) -> Fragment {
    let mut fragment = Fragment {
        instance_ids: selections.iter().map(|s| s.instance_id.clone()).collect(),
        style_sources: sources,
        style_source_selections: selections,
        styles,
        ..Fragment::default()
    };
    insert_keyed(&mut fragment.breakpoints, bp("base", None));
    fragment
}
