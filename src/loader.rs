//! The load pass: walks every scope and fills a [`Registry`].

use std::path::{Path, PathBuf};

use crate::commands::CommandLoader;
use crate::common::{Scope, home_dir};
use crate::config::BridgeConfig;
use crate::plugins::{PluginDiscovery, PluginLoader};
use crate::registry::Registry;
use crate::skills::SkillLoader;
use crate::subagents::SubagentLoader;

const CLAUDE_DIR: &str = ".claude";

/// Scope order: user (when enabled), project, then plugins. Later writes
/// replace earlier ones of the same name.
#[derive(Debug, Clone)]
pub struct BridgeLoader {
    config: BridgeConfig,
    user_dir: Option<PathBuf>,
}

impl BridgeLoader {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            user_dir: home_dir().map(|home| home.join(CLAUDE_DIR)),
        }
    }

    /// Override the user-level `.claude` directory.
    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Never fails: broken files and plugins are logged and skipped.
    pub async fn load_all(&self) -> Registry {
        let mut registry = Registry::new();

        if self.config.user_scope {
            match &self.user_dir {
                Some(user_dir) => load_scope(&mut registry, user_dir, Scope::User).await,
                None => tracing::warn!("User scope enabled but no home directory found"),
            }
        }

        let project_dir = self.config.project_root.join(CLAUDE_DIR);
        load_scope(&mut registry, &project_dir, Scope::Project).await;

        for root in self.discovery().discover().await {
            match PluginLoader::load(&root).await {
                Ok(plugin) => registry.insert_plugin(plugin),
                Err(e) => {
                    tracing::warn!(path = %root.display(), error = %e, "Skipping plugin");
                }
            }
        }

        tracing::info!(
            project = %self.config.project_root.display(),
            "{}",
            registry.summary()
        );
        registry
    }

    fn discovery(&self) -> PluginDiscovery {
        let mut discovery = PluginDiscovery::new(&self.config.project_root);
        if self.config.user_scope
            && let Some(user_dir) = &self.user_dir
        {
            discovery = discovery.with_user_plugins_dir(user_dir.join("plugins"));
        }
        if let Some(bundled) = self.config.resolved_plugins_dir() {
            discovery = discovery.with_bundled_dir(bundled);
        }
        discovery
    }
}

/// `commands/`, `agents/` and `skills/` under one `.claude` directory.
async fn load_scope(registry: &mut Registry, claude_dir: &Path, scope: Scope) {
    for command in CommandLoader::new()
        .load_directory(&claude_dir.join("commands"), scope)
        .await
    {
        registry.insert_command(command);
    }
    for agent in SubagentLoader::new()
        .load_directory(&claude_dir.join("agents"), scope)
        .await
    {
        registry.insert_subagent(agent);
    }
    for skill in SkillLoader::new()
        .load_directory(&claude_dir.join("skills"), scope)
        .await
    {
        registry.insert_skill(skill);
    }
}
