//! Typed CSS values and their CSS-text serialization.
//!
//! Parsing free text into a [`StyleValue`] happens upstream; this crate only
//! needs the reverse direction, and only to build content signatures.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

/// A typed CSS value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleValue {
    /// `auto`, `flex`, `red`, ...
    Keyword { value: String },
    /// A number with a unit. The unit `number` means unitless.
    Unit { value: f64, unit: String },
    /// An sRGB color.
    Rgb { r: u8, g: u8, b: u8, alpha: f64 },
    /// A custom-property reference, stored without the leading `--`.
    Var {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
    /// Comma-separated layers (`background-image`, `transition`, ...).
    Layers { value: Vec<StyleValue> },
    /// Raw text kept verbatim, typically for custom properties.
    Unparsed { value: String },
    /// Text that failed to parse upstream.
    Invalid { value: String },
}

impl StyleValue {
    #[must_use]
    pub fn keyword(value: impl Into<String>) -> Self {
        Self::Keyword {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn unit(value: f64, unit: impl Into<String>) -> Self {
        Self::Unit {
            value,
            unit: unit.into(),
        }
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self::Rgb { r, g, b, alpha }
    }
}

/// Serialize a value to CSS text.
#[must_use]
pub fn to_value(value: &StyleValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &StyleValue) {
    // Writing into a String cannot fail.
    let _ = match value {
        StyleValue::Keyword { value }
        | StyleValue::Unparsed { value }
        | StyleValue::Invalid { value } => out.write_str(value),
        StyleValue::Unit { value, unit } if unit == "number" => write!(out, "{value}"),
        StyleValue::Unit { value, unit } => write!(out, "{value}{unit}"),
        StyleValue::Rgb { r, g, b, alpha } => write!(out, "rgba({r}, {g}, {b}, {alpha})"),
        StyleValue::Var { value, fallback } => match fallback {
            Some(fallback) => write!(out, "var(--{value}, {fallback})"),
            None => write!(out, "var(--{value})"),
        },
        StyleValue::Layers { value } => {
            for (index, layer) in value.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_value(out, layer);
            }
            Ok(())
        }
    };
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_value(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_and_units() {
        assert_eq!(to_value(&StyleValue::keyword("auto")), "auto");
        assert_eq!(to_value(&StyleValue::unit(10.0, "px")), "10px");
        assert_eq!(to_value(&StyleValue::unit(1.5, "number")), "1.5");
        assert_eq!(to_value(&StyleValue::unit(50.0, "%")), "50%");
    }

    #[test]
    fn colors_and_vars() {
        assert_eq!(
            to_value(&StyleValue::rgb(255, 0, 0, 1.0)),
            "rgba(255, 0, 0, 1)"
        );
        let var = StyleValue::Var {
            value: "brand".to_owned(),
            fallback: Some("blue".to_owned()),
        };
        assert_eq!(to_value(&var), "var(--brand, blue)");
    }

    #[test]
    fn layers_are_comma_separated() {
        let layers = StyleValue::Layers {
            value: vec![
                StyleValue::Unparsed {
                    value: "url(a.png)".to_owned(),
                },
                StyleValue::keyword("none"),
            ],
        };
        assert_eq!(to_value(&layers), "url(a.png), none");
    }

    #[test]
    fn json_shape() {
        let value: StyleValue =
            serde_json::from_str(r#"{"type":"unit","value":4,"unit":"rem"}"#).unwrap();
        assert_eq!(value, StyleValue::unit(4.0, "rem"));
    }
}
