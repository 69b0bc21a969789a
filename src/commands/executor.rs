//! Command executor: turns a command body into a ready-to-run prompt.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use super::Command;
use super::processing::{execute_inline_commands, resolve_file_references, substitute_arguments};
use crate::common::split_tool_pattern;

pub const INLINE_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A parametrized allowance such as `Bash(git:*)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolPattern {
    pub tool: String,
    pub pattern: String,
}

impl std::fmt::Display for ToolPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.tool, self.pattern)
    }
}

/// Tool guidance extracted from a command. Informational only; the host
/// runtime enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolRestrictions {
    pub allowed: Vec<String>,
    pub patterns: Vec<ToolPattern>,
    pub disallowed: Vec<String>,
}

impl ToolRestrictions {
    pub fn from_command(command: &Command) -> Self {
        let mut restrictions = Self {
            disallowed: command.disallowed_tools.clone(),
            ..Default::default()
        };

        for tool in &command.allowed_tools {
            match split_tool_pattern(tool) {
                Some((name, pattern)) => restrictions.patterns.push(ToolPattern {
                    tool: name.to_string(),
                    pattern: pattern.to_string(),
                }),
                None => restrictions.allowed.push(tool.clone()),
            }
        }

        restrictions
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.patterns.is_empty() && self.disallowed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CommandExecutor {
    project_root: PathBuf,
    inline_timeout: Duration,
}

impl CommandExecutor {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            inline_timeout: INLINE_COMMAND_TIMEOUT,
        }
    }

    pub fn with_inline_timeout(mut self, timeout: Duration) -> Self {
        self.inline_timeout = timeout;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve the command body: arguments, then `@file` references, then
    /// inline shell commands. Never fails.
    pub async fn prepare_prompt(&self, command: &Command, arguments: &[String]) -> String {
        let content = substitute_arguments(&command.content, arguments);
        let content = resolve_file_references(&content, &self.project_root).await;
        execute_inline_commands(&content, &self.project_root, self.inline_timeout).await
    }

    pub fn tool_restrictions(&self, command: &Command) -> ToolRestrictions {
        ToolRestrictions::from_command(command)
    }

    /// Guidance header naming the command and its tool and model preferences.
    pub fn format_header(&self, command: &Command) -> String {
        let restrictions = self.tool_restrictions(command);
        let mut header = format!("# Executing Command: /{}\n\n", command.name);

        if !restrictions.allowed.is_empty() {
            header.push_str(&format!(
                "**Allowed Tools**: {}\n",
                restrictions.allowed.join(", ")
            ));
        }

        if !restrictions.patterns.is_empty() {
            let patterns: Vec<String> = restrictions.patterns.iter().map(|p| p.to_string()).collect();
            header.push_str(&format!("**Tool Patterns**: {}\n", patterns.join(", ")));
        }

        if !restrictions.disallowed.is_empty() {
            header.push_str(&format!(
                "**Disallowed Tools**: {}\n",
                restrictions.disallowed.join(", ")
            ));
        }

        if let Some(model) = command.model.as_deref().filter(|m| !m.is_empty()) {
            header.push_str(&format!("**Preferred Model**: {}\n", model));
        }

        header.push_str("\n---\n\n");
        header
    }

    /// Header followed by the fully resolved prompt.
    pub async fn format_for_agent(&self, command: &Command, arguments: &[String]) -> String {
        let prompt = self.prepare_prompt(command, arguments).await;
        self.format_header(command) + &prompt
    }
}
