use std::path::Path;

use serde_json::Value;

use super::{Plugin, PluginError, PluginManifest};
use crate::commands::CommandLoader;
use crate::common::Scope;
use crate::hooks::{HooksMap, attach_plugin_root, parse_hooks_file};
use crate::skills::SkillLoader;
use crate::subagents::SubagentLoader;

const HOOKS_FILE: [&str; 2] = ["hooks", "hooks.json"];
const MCP_FILE: &str = ".mcp.json";

pub struct PluginLoader;

impl PluginLoader {
    /// Load one plugin root. A missing or malformed manifest is an error;
    /// broken component files, hook bundles and MCP files are logged and
    /// skipped.
    pub async fn load(root: &Path) -> Result<Plugin, PluginError> {
        let manifest = PluginManifest::load(root).await?;
        let name = manifest.name_or_dir(root);

        let mut plugin = Plugin {
            name: name.clone(),
            path: root.to_path_buf(),
            version: manifest.version_or_default(),
            description: manifest.description.clone().unwrap_or_default(),
            commands: Vec::new(),
            agents: Vec::new(),
            skills: Vec::new(),
            hooks: HooksMap::new(),
            mcp_config: None,
        };

        for dir in manifest.command_dirs(root) {
            let commands = CommandLoader::new().load_directory(&dir, Scope::Plugin).await;
            plugin.commands.extend(commands);
        }
        for dir in manifest.agent_dirs(root) {
            let agents = SubagentLoader::new().load_directory(&dir, Scope::Plugin).await;
            plugin.agents.extend(agents);
        }
        for dir in manifest.skill_dirs(root) {
            let skills = SkillLoader::new().load_directory(&dir, Scope::Plugin).await;
            plugin.skills.extend(skills);
        }

        for hooks in plugin
            .commands
            .iter_mut()
            .map(|c| &mut c.hooks)
            .chain(plugin.agents.iter_mut().map(|a| &mut a.hooks))
            .chain(plugin.skills.iter_mut().map(|s| &mut s.hooks))
        {
            attach_plugin_root(hooks, root);
        }

        match Self::load_hooks(root, &name).await {
            Ok(Some(mut hooks)) => {
                attach_plugin_root(&mut hooks, root);
                plugin.hooks = hooks;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(plugin = %name, error = %e, "Ignoring plugin hooks file"),
        }

        match Self::load_mcp(root).await {
            Ok(config) => plugin.mcp_config = config,
            Err(e) => tracing::warn!(plugin = %name, error = %e, "Ignoring plugin MCP config"),
        }

        tracing::debug!(
            plugin = %plugin.name,
            commands = plugin.commands.len(),
            agents = plugin.agents.len(),
            skills = plugin.skills.len(),
            "Loaded plugin"
        );
        Ok(plugin)
    }

    async fn load_hooks(root: &Path, plugin: &str) -> Result<Option<HooksMap>, PluginError> {
        let path = HOOKS_FILE.iter().fold(root.to_path_buf(), |p, s| p.join(s));
        if !path.is_file() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        parse_hooks_file(&content)
            .map(Some)
            .map_err(|e| PluginError::ResourceLoad {
                plugin: plugin.to_string(),
                message: format!("{}: {e}", path.display()),
            })
    }

    /// `.mcp.json`, kept verbatim for the host.
    async fn load_mcp(root: &Path) -> Result<Option<Value>, PluginError> {
        let path = root.join(MCP_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}
