use std::path::{Path, PathBuf};

use super::manifest::{PLUGIN_CONFIG_DIR, PluginManifest};
use crate::common::subdirectories;

const PROJECT_PLUGINS_DIR: &str = ".claude-plugins";
/// Marketplace checkouts under the user plugins dir are not plugins themselves.
const MARKETPLACES_DIR: &str = "marketplaces";

/// Finds plugin roots in scope order: user plugins (when enabled), the
/// project's `.claude-plugins/*`, the project root itself when it carries a
/// `.claude-plugin` directory, then the bundled plugins directory.
#[derive(Debug, Clone)]
pub struct PluginDiscovery {
    project_root: PathBuf,
    user_plugins_dir: Option<PathBuf>,
    bundled_dir: Option<PathBuf>,
}

impl PluginDiscovery {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            user_plugins_dir: None,
            bundled_dir: None,
        }
    }

    /// Returns the user plugins directory: `~/.claude/plugins/`.
    pub fn default_user_plugins_dir() -> Option<PathBuf> {
        crate::common::home_dir().map(|home| home.join(".claude").join("plugins"))
    }

    pub fn with_user_plugins_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_plugins_dir = Some(dir.into());
        self
    }

    pub fn with_bundled_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundled_dir = Some(dir.into());
        self
    }

    /// Candidate directories, in load order. Only those with a manifest are
    /// returned; anything else is simply not a plugin.
    pub async fn discover(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(user_dir) = &self.user_plugins_dir {
            candidates.extend(
                subdirectories(user_dir)
                    .await
                    .into_iter()
                    .filter(|d| d.file_name().is_none_or(|n| n != MARKETPLACES_DIR)),
            );
        }

        candidates.extend(subdirectories(&self.project_root.join(PROJECT_PLUGINS_DIR)).await);

        if self.project_root.join(PLUGIN_CONFIG_DIR).is_dir() {
            candidates.push(self.project_root.clone());
        }

        if let Some(bundled) = &self.bundled_dir {
            candidates.extend(subdirectories(bundled).await);
        }

        candidates.retain(|dir| Self::is_plugin_root(dir));
        tracing::debug!(count = candidates.len(), "Discovered plugins");
        candidates
    }

    pub fn is_plugin_root(dir: &Path) -> bool {
        PluginManifest::locate(dir).is_some()
    }
}
