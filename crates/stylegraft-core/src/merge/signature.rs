//! Content signatures for style sources.
//!
//! A signature is a deterministic string built from the declarations a style
//! source owns. Two sources with the same declarations produce the same
//! signature regardless of declaration order, of their own ids, and of the
//! concrete ids of equivalent breakpoints.
//!
//! Each declaration contributes one entry:
//!
//! ```text
//! <breakpoint-key>|<state>|<property>:<css-value>
//! ```
//!
//! where `<breakpoint-key>` is the breakpoint's `minWidth` or `base`.
//! Inside a segment, `\`, `|`, `:` and `;` are backslash-escaped so no value
//! can imitate a separator. Entries are sorted and joined with `;`. A source
//! with no declarations has the empty signature, so two unstyled sources
//! compare equal.

use crate::model::{
    Breakpoint, BreakpointId, BreakpointIdMap, Breakpoints, StyleDecl, StyleSourceId, to_value,
};

// ---------------------------------------------------------------------------
// BreakpointScope
// ---------------------------------------------------------------------------

/// The project breakpoints plus the fragment → project breakpoint id map
/// that signatures are computed against.
#[derive(Clone, Copy, Debug)]
pub struct BreakpointScope<'a> {
    pub breakpoints: &'a Breakpoints,
    pub merged_breakpoint_ids: &'a BreakpointIdMap,
}

impl<'a> BreakpointScope<'a> {
    #[must_use]
    pub const fn new(
        breakpoints: &'a Breakpoints,
        merged_breakpoint_ids: &'a BreakpointIdMap,
    ) -> Self {
        Self {
            breakpoints,
            merged_breakpoint_ids,
        }
    }

    /// Map a fragment breakpoint id onto its project equivalent, or return it
    /// unchanged when it has none.
    #[must_use]
    pub fn normalize<'b>(&'b self, id: &'b BreakpointId) -> &'b BreakpointId {
        self.merged_breakpoint_ids.get(id).unwrap_or(id)
    }

    /// Comparison key for a breakpoint id.
    ///
    /// Ids that resolve to no known breakpoint yield `?<id>`, which can never
    /// collide with a width or `base`.
    #[must_use]
    pub fn comparison_key(&self, id: &BreakpointId) -> String {
        let id = self.normalize(id);
        self.breakpoints
            .get(id)
            .map_or_else(|| format!("?{id}"), Breakpoint::comparison_key)
    }
}

// ---------------------------------------------------------------------------
// signature
// ---------------------------------------------------------------------------

/// Append `segment` to `out`, backslash-escaping separator characters.
fn push_escaped(out: &mut String, segment: &str) {
    for c in segment.chars() {
        if matches!(c, '\\' | '|' | ':' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
}

fn entry(decl: &StyleDecl, scope: &BreakpointScope<'_>) -> String {
    let mut out = String::new();
    push_escaped(&mut out, &scope.comparison_key(&decl.breakpoint_id));
    out.push('|');
    push_escaped(&mut out, decl.state.as_deref().unwrap_or_default());
    out.push('|');
    push_escaped(&mut out, &decl.property);
    out.push(':');
    push_escaped(&mut out, &to_value(&decl.value));
    out
}

/// Compute the content signature of `style_source_id` over `styles`.
///
/// Declarations owned by other sources are ignored.
pub fn signature<'s>(
    style_source_id: &StyleSourceId,
    styles: impl IntoIterator<Item = &'s StyleDecl>,
    scope: &BreakpointScope<'_>,
) -> String {
    let mut entries: Vec<String> = styles
        .into_iter()
        .filter(|decl| &decl.style_source_id == style_source_id)
        .map(|decl| entry(decl, scope))
        .collect();
    entries.sort_unstable();
    entries.join(";")
}
