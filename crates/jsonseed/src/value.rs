//! Scalar JSON values and JSON text escaping.
//!
//! [`JsonValue`] is the currency between the lexer, the parser, and the
//! sinks it drives: only scalars travel through `set_simple_property`, so
//! there are no composite variants. Composite values are represented by the
//! seeds that accumulate them, never by a generic value tree.

use std::fmt;

/// A scalar JSON value.
///
/// # Examples
///
/// ```
/// use jsonseed::JsonValue;
///
/// assert_eq!(JsonValue::Long(42).to_string(), "42");
/// assert_eq!(JsonValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// The `null` literal.
    Null,
    /// `true` or `false`.
    Boolean(bool),
    /// An integer (number text without a decimal point).
    Long(i64),
    /// A double (number text containing a decimal point).
    Double(f64),
    /// A string literal, with escapes already decoded.
    String(String),
}

impl JsonValue {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: JsonValue::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the JSON type carried, used in mismatch diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Long(_) => "integer",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for JsonValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Escapes a string for inclusion in a JSON string literal.
///
/// Writes to the provided formatter, replacing quotes, backslashes, control
/// characters (<= U+001F), and the Unicode line separators U+2028/U+2029
/// with their JSON escape sequences.
pub(crate) fn write_escaped_string<W: fmt::Write>(src: &str, f: &mut W) -> fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            // Line separators break pre-2019 JSON parsers when embedded raw.
            '\u{2028}' | '\u{2029}' => write!(f, "\\u{:04X}", c as u32)?,
            c if c.is_ascii_control() => write!(f, "\\u{:04X}", c as u32)?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Convenience wrapper around [`write_escaped_string`] returning a `String`.
pub(crate) fn escape_string(src: &str) -> String {
    let mut result = String::with_capacity(src.len());
    write_escaped_string(src, &mut result).expect("failed to escape string");
    result
}

/// Renders a double so that it re-lexes as a double.
///
/// The lexer classifies number text by the presence of a decimal point, so
/// finite whole values keep one fractional digit.
pub(crate) fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => f.write_str(if *v { "true" } else { "false" }),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => f.write_str(&format_double(*v)),
            Self::String(v) => {
                f.write_str("\"")?;
                write_escaped_string(v, f)?;
                f.write_str("\"")
            }
        }
    }
}
