//! Data model: ids, breakpoints, style sources, declarations, selections and
//! the typed CSS values they carry.

pub mod types;
pub mod value;

pub use types::{
    Breakpoint, BreakpointId, BreakpointIdMap, Breakpoints, DeclKey, Fragment, InstanceId,
    InstanceIdMap, Keyed, ROOT_INSTANCE_ID, StyleDecl, StyleGraph, StyleSource, StyleSourceId,
    StyleSourceIdMap, StyleSourceSelection, StyleSourceSelections, StyleSources, Styles, decl_key,
    insert_keyed,
};
pub use value::{StyleValue, to_value};
