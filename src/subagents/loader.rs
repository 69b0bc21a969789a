//! Subagent loader for `agents/*.md`.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{DEFAULT_MODEL, DEFAULT_PERMISSION_MODE, Subagent};
use crate::common::{Scope, markdown_files, parse_frontmatter, parse_tool_list, text_field};
use crate::hooks::parse_hooks;

#[derive(Debug, Deserialize)]
struct SubagentFrontmatter {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    tools: Option<Value>,
    #[serde(default, rename = "disallowedTools")]
    disallowed_tools: Option<Value>,
    #[serde(default)]
    model: Option<Value>,
    #[serde(default, rename = "permissionMode")]
    permission_mode: Option<Value>,
    #[serde(default)]
    hooks: Option<Value>,
    #[serde(default)]
    skills: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubagentLoader;

impl SubagentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load the markdown files directly inside `root`.
    pub async fn load_directory(&self, root: &Path, scope: Scope) -> Vec<Subagent> {
        let mut agents = Vec::new();

        for path in markdown_files(root, false).await {
            match self.load_file(&path, scope).await {
                Ok(agent) => agents.push(agent),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to load subagent");
                }
            }
        }

        tracing::debug!(root = %root.display(), count = agents.len(), "Loaded subagents");
        agents
    }

    pub async fn load_file(&self, path: &Path, scope: Scope) -> crate::Result<Subagent> {
        let content = tokio::fs::read_to_string(path).await?;
        self.parse(&content, path, scope)
    }

    pub fn parse(&self, content: &str, path: &Path, scope: Scope) -> crate::Result<Subagent> {
        let doc = parse_frontmatter(content);
        let fm: SubagentFrontmatter = doc.deserialize()?;

        let name = match text_field("name", fm.name.as_ref()).filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(String::from)
                .ok_or_else(|| {
                    crate::Error::Parse(format!("Invalid subagent file name: {}", path.display()))
                })?,
        };

        Ok(Subagent {
            name,
            path: path.to_path_buf(),
            description: text_field("description", fm.description.as_ref()).unwrap_or_default(),
            tools: parse_tool_list(fm.tools.as_ref()),
            disallowed_tools: parse_tool_list(fm.disallowed_tools.as_ref()),
            model: text_field("model", fm.model.as_ref())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            permission_mode: text_field("permissionMode", fm.permission_mode.as_ref())
                .unwrap_or_else(|| DEFAULT_PERMISSION_MODE.to_string()),
            hooks: parse_hooks(fm.hooks.as_ref()),
            skills: parse_tool_list(fm.skills.as_ref()),
            prompt: doc.body,
            scope,
        })
    }
}
