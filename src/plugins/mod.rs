//! Plugins: directories bundling commands, agents, skills, hooks and MCP
//! configuration behind a `plugin.json` manifest.
//!
//! # Directory Structure
//!
//! ```text
//! .claude-plugins/
//! └── my-plugin/
//!     ├── .claude-plugin/
//!     │   └── plugin.json
//!     ├── commands/
//!     │   └── hello.md
//!     ├── agents/
//!     │   └── reviewer.md
//!     ├── skills/
//!     │   └── commit/
//!     │       └── SKILL.md
//!     ├── hooks/
//!     │   └── hooks.json
//!     └── .mcp.json
//! ```
//!
//! Plugin components are not namespaced: a plugin command named `foo`
//! replaces a project command of the same name.

mod discovery;
mod error;
mod loader;
mod manifest;

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

pub use discovery::PluginDiscovery;
pub use error::PluginError;
pub use loader::PluginLoader;
pub use manifest::{ComponentPaths, DEFAULT_PLUGIN_VERSION, PluginManifest};

use crate::commands::Command;
use crate::common::Named;
use crate::hooks::HooksMap;
use crate::skills::Skill;
use crate::subagents::Subagent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugin {
    pub name: String,
    pub path: PathBuf,
    pub version: String,
    pub description: String,
    pub commands: Vec<Command>,
    pub agents: Vec<Subagent>,
    pub skills: Vec<Skill>,
    pub hooks: HooksMap,
    /// `.mcp.json` as written.
    pub mcp_config: Option<Value>,
}

impl Named for Plugin {
    fn name(&self) -> &str {
        &self.name
    }
}
