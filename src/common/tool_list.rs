//! Normalization of tool and name list fields.
//!
//! Front-matter writes lists in three shapes:
//! - `allowed-tools: Read, Grep, Bash(git:*)`
//! - `allowed-tools: [Read, Grep]`
//! - nested YAML lists, flattened one level

use serde_json::Value;

/// Normalize a list-valued front-matter field into trimmed, non-empty entries.
pub fn parse_tool_list(value: Option<&Value>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let mut tools = Vec::new();
    match value {
        Value::String(s) => tools.extend(s.split(',').map(str::to_string)),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Array(nested) => tools.extend(nested.iter().map(scalar_to_string)),
                    Value::Null | Value::Object(_) => {}
                    other => tools.push(scalar_to_string(other)),
                }
            }
        }
        _ => {}
    }

    tools
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
