//! Lenient coercion of scalar front-matter fields.
//!
//! Headers are hand-written, so a field meant as text may arrive as a number,
//! a boolean or a flow list (`argument-hint: [message]`). These helpers turn
//! such values into text instead of rejecting the whole file.

use serde_json::Value;

/// Text form of a scalar field. Lists are joined with a space; `null` and
/// empty lists are absent. A mapping is unusable and logged.
pub fn text_field(key: &str, value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Bool(_) | Value::Number(_) => Some(item.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        Value::Object(_) => {
            tracing::warn!(field = key, "Ignoring mapping value for text field");
            None
        }
    }
}

/// Boolean field accepting `true`/`false` in either YAML or string form.
pub fn flag_field(key: &str, value: Option<&Value>, default: bool) -> bool {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("false") => false,
        Some(other) => {
            tracing::warn!(field = key, value = %other, default, "Unusable flag value, using default");
            default
        }
    }
}
