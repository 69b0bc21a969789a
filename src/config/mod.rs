//! Bridge configuration.
//!
//! Values are layered: defaults, then `.claude/bridge.json` under the project
//! root, then `CLAUDE_BRIDGE_*` environment variables.
//!
//! ```rust,no_run
//! use claude_bridge::BridgeConfig;
//!
//! # async fn example() -> Result<(), claude_bridge::ConfigError> {
//! let config = BridgeConfig::load().await?.with_user_scope(true);
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod file;
pub mod memory;
pub mod provider;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use env::EnvConfigProvider;
pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::ConfigProvider;

use crate::commands::INLINE_COMMAND_TIMEOUT;
use crate::hooks::DEFAULT_HOOK_TIMEOUT_SECS;

pub const ENV_PREFIX: &str = "CLAUDE_BRIDGE_";
/// Project-relative location of the configuration file.
pub const CONFIG_FILE: &str = ".claude/bridge.json";

pub const KEY_PROJECT_ROOT: &str = "project_root";
pub const KEY_PLUGINS_DIR: &str = "plugins_dir";
pub const KEY_USER_SCOPE: &str = "user_scope";
pub const KEY_INLINE_TIMEOUT: &str = "inline_timeout_secs";
pub const KEY_HOOK_TIMEOUT: &str = "hook_timeout_secs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub project_root: PathBuf,
    /// Bundled plugins directory. Relative paths resolve against the project root.
    pub plugins_dir: Option<PathBuf>,
    /// Load `~/.claude` components and plugins before the project.
    pub user_scope: bool,
    pub inline_timeout_secs: u64,
    /// Applied to hooks that declare no timeout of their own.
    pub hook_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            plugins_dir: None,
            user_scope: false,
            inline_timeout_secs: INLINE_COMMAND_TIMEOUT.as_secs(),
            hook_timeout_secs: DEFAULT_HOOK_TIMEOUT_SECS,
        }
    }
}

impl BridgeConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `CLAUDE_BRIDGE_*` variables.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply(&EnvConfigProvider::prefixed(ENV_PREFIX))?;
        Ok(config)
    }

    /// Defaults, then the project's `.claude/bridge.json`, then the environment.
    ///
    /// The environment is consulted first for the project root so the file is
    /// looked up in the right place.
    pub async fn load() -> ConfigResult<Self> {
        let env = EnvConfigProvider::prefixed(ENV_PREFIX);
        let mut config = Self::default();
        config.apply(&env)?;

        let file = FileConfigProvider::open(config.project_root.join(CONFIG_FILE)).await?;
        config.apply(&file)?;
        config.apply(&env)?;
        Ok(config)
    }

    /// Overlay every key the provider knows about.
    pub fn apply(&mut self, provider: &dyn ConfigProvider) -> ConfigResult<()> {
        if let Some(root) = provider.get_raw(KEY_PROJECT_ROOT)? {
            self.project_root = PathBuf::from(root);
        }
        if let Some(dir) = provider.get_raw(KEY_PLUGINS_DIR)? {
            self.plugins_dir = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(raw) = provider.get_raw(KEY_USER_SCOPE)? {
            self.user_scope = parse_bool(KEY_USER_SCOPE, &raw)?;
        }
        if let Some(raw) = provider.get_raw(KEY_INLINE_TIMEOUT)? {
            self.inline_timeout_secs = parse_secs(KEY_INLINE_TIMEOUT, &raw)?;
        }
        if let Some(raw) = provider.get_raw(KEY_HOOK_TIMEOUT)? {
            self.hook_timeout_secs = parse_secs(KEY_HOOK_TIMEOUT, &raw)?;
        }
        tracing::debug!(provider = provider.name(), "Applied bridge configuration");
        Ok(())
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_plugins_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugins_dir = Some(dir.into());
        self
    }

    pub fn with_user_scope(mut self, enabled: bool) -> Self {
        self.user_scope = enabled;
        self
    }

    pub fn with_inline_timeout_secs(mut self, secs: u64) -> Self {
        self.inline_timeout_secs = secs;
        self
    }

    pub fn with_hook_timeout_secs(mut self, secs: u64) -> Self {
        self.hook_timeout_secs = secs;
        self
    }

    pub fn inline_timeout(&self) -> Duration {
        Duration::from_secs(self.inline_timeout_secs)
    }

    /// Bundled plugins directory, anchored at the project root when relative.
    pub fn resolved_plugins_dir(&self) -> Option<PathBuf> {
        self.plugins_dir.as_deref().map(|dir| self.resolve(dir))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("'{other}' is not a boolean"))),
    }
}

fn parse_secs(key: &str, raw: &str) -> ConfigResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(key, "must be greater than zero")),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::invalid(key, e.to_string())),
    }
}
