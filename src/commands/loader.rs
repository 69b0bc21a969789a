//! Slash command loading from `commands/` directories.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{Command, ExecutionContext};
use crate::common::{Scope, markdown_files, parse_frontmatter, parse_tool_list, text_field};
use crate::hooks::parse_hooks;

#[derive(Debug, Default, Deserialize)]
struct CommandFrontmatter {
    #[serde(default)]
    description: Option<Value>,
    #[serde(default, rename = "argument-hint")]
    argument_hint: Option<Value>,
    #[serde(default, rename = "allowed-tools")]
    allowed_tools: Option<Value>,
    #[serde(default, rename = "disallowedTools")]
    disallowed_tools: Option<Value>,
    #[serde(default)]
    model: Option<Value>,
    #[serde(default)]
    hooks: Option<Value>,
    #[serde(default)]
    context: Option<Value>,
    #[serde(default)]
    agent: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandLoader;

impl CommandLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every markdown file under `root`, recursively. Files that fail
    /// to load are logged and skipped.
    pub async fn load_directory(&self, root: &Path, scope: Scope) -> Vec<Command> {
        let mut commands = Vec::new();

        for path in markdown_files(root, true).await {
            match self.load_file(&path, root, scope).await {
                Ok(command) => commands.push(command),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to load command");
                }
            }
        }

        tracing::debug!(root = %root.display(), count = commands.len(), "Loaded commands");
        commands
    }

    pub async fn load_file(&self, path: &Path, root: &Path, scope: Scope) -> crate::Result<Command> {
        let content = tokio::fs::read_to_string(path).await?;
        self.parse(&content, path, root, scope)
    }

    pub fn parse(&self, content: &str, path: &Path, root: &Path, scope: Scope) -> crate::Result<Command> {
        let doc = parse_frontmatter(content);
        let fm: CommandFrontmatter = doc.deserialize()?;

        let leaf = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| crate::Error::Parse(format!("Invalid command file name: {}", path.display())))?;
        let namespace = namespace_for(path, root);
        let name = if namespace.is_empty() {
            leaf.to_string()
        } else {
            format!("{}:{}", namespace, leaf)
        };

        Ok(Command {
            name,
            path: path.to_path_buf(),
            description: text_field("description", fm.description.as_ref()).unwrap_or_default(),
            argument_hint: text_field("argument-hint", fm.argument_hint.as_ref()).unwrap_or_default(),
            allowed_tools: parse_tool_list(fm.allowed_tools.as_ref()),
            disallowed_tools: parse_tool_list(fm.disallowed_tools.as_ref()),
            model: text_field("model", fm.model.as_ref()),
            hooks: parse_hooks(fm.hooks.as_ref()),
            content: doc.body,
            scope,
            namespace,
            context: text_field("context", fm.context.as_ref())
                .map(ExecutionContext::from)
                .unwrap_or_default(),
            agent: text_field("agent", fm.agent.as_ref()),
        })
    }
}

/// Colon-joined directories between the commands root and the file.
fn namespace_for(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .and_then(Path::parent)
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(":")
        })
        .unwrap_or_default()
}
