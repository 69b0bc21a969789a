//! Subagents: markdown definitions of delegated agents.

mod loader;

use std::path::PathBuf;

use serde::Serialize;

pub use loader::SubagentLoader;

use crate::common::{Named, Scope};
use crate::hooks::HooksMap;

pub const DEFAULT_MODEL: &str = "sonnet";
pub const DEFAULT_PERMISSION_MODE: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subagent {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    pub tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub model: String,
    pub permission_mode: String,
    pub hooks: HooksMap,
    /// Names of skills the agent preloads.
    pub skills: Vec<String>,
    pub prompt: String,
    pub scope: Scope,
}

impl Named for Subagent {
    fn name(&self) -> &str {
        &self.name
    }
}
