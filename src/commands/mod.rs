//! Slash commands: records, loading and prompt resolution.

mod executor;
mod loader;
mod processing;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use executor::{CommandExecutor, INLINE_COMMAND_TIMEOUT, ToolPattern, ToolRestrictions};
pub use loader::CommandLoader;
pub use processing::{
    FileReference, InlineOutput, execute_inline_commands, resolve_file_references,
    substitute_arguments,
};

use crate::common::{Named, Scope};
use crate::hooks::HooksMap;

/// Where a command or skill runs: inline in the main conversation or in a
/// forked sub-context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionContext {
    #[default]
    Main,
    Fork,
}

impl ExecutionContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Fork => "fork",
        }
    }
}

impl From<String> for ExecutionContext {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("fork") {
            Self::Fork
        } else {
            Self::Main
        }
    }
}

impl From<ExecutionContext> for String {
    fn from(context: ExecutionContext) -> Self {
        context.as_str().to_string()
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slash command loaded from a markdown file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// Display name, `namespace:leaf` when nested.
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    pub argument_hint: String,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub model: Option<String>,
    pub hooks: HooksMap,
    pub content: String,
    pub scope: Scope,
    pub namespace: String,
    pub context: ExecutionContext,
    pub agent: Option<String>,
}

impl Command {
    /// A bare command with only a name and body, mostly useful in tests.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: PathBuf::new(),
            description: String::new(),
            argument_hint: String::new(),
            allowed_tools: Vec::new(),
            disallowed_tools: Vec::new(),
            model: None,
            hooks: HooksMap::new(),
            content: content.into(),
            scope: Scope::default(),
            namespace: String::new(),
            context: ExecutionContext::default(),
            agent: None,
        }
    }

    pub fn with_allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.allowed_tools = tools;
        self
    }

    pub fn with_disallowed_tools(mut self, tools: Vec<String>) -> Self {
        self.disallowed_tools = tools;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn is_forked(&self) -> bool {
        self.context == ExecutionContext::Fork
    }
}

impl Named for Command {
    fn name(&self) -> &str {
        &self.name
    }
}
