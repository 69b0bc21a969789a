//! # claude-bridge
//!
//! Load Claude Code components (slash commands, subagents, skills, plugins and
//! lifecycle hooks) from their markdown and JSON declarations, and prepare them
//! for execution by another agent runtime.
//!
//! The crate covers three pieces:
//!
//! - a discovery loader that walks project and plugin directories into a
//!   [`Registry`],
//! - a [`CommandExecutor`] that resolves a command body into a prompt
//!   (`$ARGUMENTS`, `@file` inlining, `` !`shell` `` substitution),
//! - a [`HookEngine`] that dispatches lifecycle hooks with matcher, `once`
//!   and block/continue/error semantics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use claude_bridge::{Bridge, BridgeConfig, CommandOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), claude_bridge::Error> {
//!     let mut bridge = Bridge::new(BridgeConfig::from_env()?);
//!     bridge.load().await;
//!
//!     match bridge.execute_command("review", &["src/main.rs".into()]).await {
//!         CommandOutcome::Ready(prepared) => println!("{}", prepared.prompt),
//!         CommandOutcome::Blocked { reason } => eprintln!("blocked: {reason}"),
//!         CommandOutcome::NotFound(missing) => eprintln!("{missing}"),
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod bridge;
pub mod commands;
pub mod common;
pub mod config;
pub mod context;
pub mod hooks;
pub mod loader;
pub mod plugins;
pub mod registry;
pub mod skills;
pub mod subagents;

pub use bridge::{Bridge, CommandOutcome, ComponentList, PreparedCommand};
pub use commands::{
    Command, CommandExecutor, ExecutionContext, INLINE_COMMAND_TIMEOUT, ToolPattern,
    ToolRestrictions,
};
pub use common::{NotFound, ParsedDocument, Scope, parse_frontmatter, parse_tool_list};
pub use config::{BridgeConfig, ConfigError};
pub use context::SystemPromptLoader;
pub use hooks::{
    AgentRunner, DEFAULT_HOOK_TIMEOUT_SECS, HookConfig, HookContext, HookEngine, HookEvent,
    HookKind, HookOutcome, HooksMap, PromptRunner, parse_hooks,
};
pub use loader::BridgeLoader;
pub use plugins::{Plugin, PluginError, PluginManifest};
pub use registry::Registry;
pub use skills::Skill;
pub use subagents::Subagent;

/// Error type for claude-bridge operations.
///
/// Most public operations degrade instead of failing (see [`Bridge`]); this
/// type surfaces from the internals and from the few strict entry points.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML front-matter could not be parsed.
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A component document is structurally invalid.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plugin discovery or loading failed.
    #[error("Plugin error: {0}")]
    Plugin(#[from] plugins::PluginError),

    /// A hook could not be dispatched.
    #[error("Hook error: {0}")]
    Hook(String),

    /// An injected prompt or agent runner failed.
    #[error("Runner '{runner}' failed: {message}")]
    Runner { runner: String, message: String },

    /// A component was requested by name and does not exist.
    #[error(transparent)]
    NotFound(#[from] common::NotFound),
}

impl Error {
    pub fn runner(runner: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Runner {
            runner: runner.into(),
            message: message.into(),
        }
    }

    /// Whether the failure came from a malformed document or manifest rather
    /// than from the environment.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::Yaml(_) | Error::Json(_) | Error::Plugin(_)
        )
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
