use serde::Serialize;

/// Structured lookup failure for a component requested by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind} '{name}' not found{}", did_you_mean(.available))]
pub struct NotFound {
    pub kind: String,
    pub name: String,
    pub available: Vec<String>,
}

impl NotFound {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, available: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            available,
        }
    }
}

fn did_you_mean(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(", did you mean one of: {}", available.join(", "))
    }
}
