use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PluginError;

pub(crate) const PLUGIN_CONFIG_DIR: &str = ".claude-plugin";
const PLUGIN_MANIFEST_FILE: &str = "plugin.json";
pub const DEFAULT_PLUGIN_VERSION: &str = "1.0.0";

/// One path or several, relative to the plugin root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentPaths {
    One(String),
    Many(Vec<String>),
}

impl ComponentPaths {
    pub fn resolve(&self, root: &Path) -> Vec<PathBuf> {
        match self {
            Self::One(path) => vec![root.join(path)],
            Self::Many(paths) => paths.iter().map(|p| root.join(p)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<ComponentPaths>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<ComponentPaths>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<ComponentPaths>,
    /// Everything else (author, homepage, keywords, ...), kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginManifest {
    /// `.claude-plugin/plugin.json`, falling back to `plugin.json` at the root.
    pub fn locate(root_dir: &Path) -> Option<PathBuf> {
        [
            root_dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE),
            root_dir.join(PLUGIN_MANIFEST_FILE),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    pub async fn load(root_dir: &Path) -> Result<Self, PluginError> {
        let manifest_path = Self::locate(root_dir).ok_or_else(|| PluginError::ManifestNotFound {
            path: root_dir.to_path_buf(),
        })?;
        let content = tokio::fs::read_to_string(&manifest_path).await?;
        Self::parse(&content, &manifest_path)
    }

    pub fn parse(content: &str, manifest_path: &Path) -> Result<Self, PluginError> {
        serde_json::from_str(content).map_err(|e| PluginError::InvalidManifest {
            path: manifest_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Declared name, else the plugin directory's name.
    pub fn name_or_dir(&self, root_dir: &Path) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                root_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_default()
    }

    pub fn version_or_default(&self) -> String {
        self.version
            .clone()
            .unwrap_or_else(|| DEFAULT_PLUGIN_VERSION.to_string())
    }

    /// Manifest-declared command directories (default `commands`) followed by
    /// the conventional `.claude/commands`.
    pub fn command_dirs(&self, root: &Path) -> Vec<PathBuf> {
        component_dirs(self.commands.as_ref(), "commands", root)
    }

    pub fn agent_dirs(&self, root: &Path) -> Vec<PathBuf> {
        component_dirs(self.agents.as_ref(), "agents", root)
    }

    pub fn skill_dirs(&self, root: &Path) -> Vec<PathBuf> {
        component_dirs(self.skills.as_ref(), "skills", root)
    }
}

fn component_dirs(declared: Option<&ComponentPaths>, default: &str, root: &Path) -> Vec<PathBuf> {
    let mut dirs = match declared {
        Some(paths) => paths.resolve(root),
        None => vec![root.join(default)],
    };

    let conventional = root.join(".claude").join(default);
    if !dirs.contains(&conventional) {
        dirs.push(conventional);
    }
    dirs
}
