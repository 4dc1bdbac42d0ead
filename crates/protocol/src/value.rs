//! Field value rendering for delimited output
//!
//! Mirrors what the extraction pipeline's CSV exporter produces, so staged
//! rows load the same way regardless of which exporter wrote them.

use std::borrow::Cow;

use serde_json::Value;

/// Separator used when flattening array values
const ARRAY_SEPARATOR: &str = ",";

/// Render a field value as text
///
/// - null → empty string
/// - strings → as-is
/// - numbers and booleans → their JSON text
/// - arrays → rendered items joined with `,`
/// - objects → compact JSON
pub fn render_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(true) => Cow::Borrowed("true"),
        Value::Bool(false) => Cow::Borrowed("false"),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(render_value)
                .collect::<Vec<_>>()
                .join(ARRAY_SEPARATOR),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}
