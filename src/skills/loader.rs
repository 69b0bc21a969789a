//! Skill loader: scans skill roots for `<name>/SKILL.md`.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::Skill;
use crate::commands::ExecutionContext;
use crate::common::{
    SKILL_FILE, Scope, flag_field, parse_frontmatter, parse_tool_list, regular_files, subdirectories,
    text_field,
};
use crate::hooks::parse_hooks;

#[derive(Debug, Deserialize)]
struct SkillFrontmatter {
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default, rename = "allowed-tools")]
    allowed_tools: Option<Value>,
    #[serde(default)]
    context: Option<Value>,
    #[serde(default, rename = "user-invocable")]
    user_invocable: Option<Value>,
    #[serde(default)]
    hooks: Option<Value>,
    #[serde(default)]
    agent: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillLoader;

impl SkillLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load every immediate subdirectory of `root` that has a descriptor.
    /// Directories without one are skipped silently; broken ones with a warning.
    pub async fn load_directory(&self, root: &Path, scope: Scope) -> Vec<Skill> {
        let mut skills = Vec::new();

        for dir in subdirectories(root).await {
            if !dir.join(SKILL_FILE).is_file() {
                continue;
            }

            match self.load_skill(&dir, scope).await {
                Ok(skill) => skills.push(skill),
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Failed to load skill");
                }
            }
        }

        tracing::debug!(root = %root.display(), count = skills.len(), "Loaded skills");
        skills
    }

    pub async fn load_skill(&self, dir: &Path, scope: Scope) -> crate::Result<Skill> {
        let descriptor = dir.join(SKILL_FILE);
        let content = tokio::fs::read_to_string(&descriptor).await?;
        let mut skill = self.parse(&content, dir, scope)?;

        skill.supporting_files = regular_files(dir)
            .await
            .into_iter()
            .filter(|p| p.file_name().is_none_or(|n| n != SKILL_FILE))
            .collect();

        Ok(skill)
    }

    /// Build a skill from descriptor text; `dir` supplies the fallback name.
    pub fn parse(&self, content: &str, dir: &Path, scope: Scope) -> crate::Result<Skill> {
        let doc = parse_frontmatter(content);
        let fm: SkillFrontmatter = doc.deserialize()?;

        let name = match text_field("name", fm.name.as_ref()).filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(String::from)
                .ok_or_else(|| {
                    crate::Error::Parse(format!("Cannot name skill at {}", dir.display()))
                })?,
        };

        Ok(Skill {
            name,
            path: dir.join(SKILL_FILE),
            description: text_field("description", fm.description.as_ref()).unwrap_or_default(),
            allowed_tools: parse_tool_list(fm.allowed_tools.as_ref()),
            context: text_field("context", fm.context.as_ref())
                .map(ExecutionContext::from)
                .unwrap_or_default(),
            user_invocable: flag_field("user-invocable", fm.user_invocable.as_ref(), true),
            hooks: parse_hooks(fm.hooks.as_ref()),
            content: doc.body,
            supporting_files: Vec::new(),
            agent: text_field("agent", fm.agent.as_ref()),
            scope,
        })
    }
}
