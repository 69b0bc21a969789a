//! Skills: directories holding a `SKILL.md` descriptor plus supporting files.

mod loader;

use std::path::PathBuf;

use serde::Serialize;

pub use loader::SkillLoader;

use crate::commands::ExecutionContext;
use crate::common::{Named, Scope};
use crate::hooks::HooksMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skill {
    pub name: String,
    /// Path of the `SKILL.md` descriptor.
    pub path: PathBuf,
    pub description: String,
    pub allowed_tools: Vec<String>,
    pub context: ExecutionContext,
    pub user_invocable: bool,
    pub hooks: HooksMap,
    pub content: String,
    /// Sibling files of the descriptor, sorted.
    pub supporting_files: Vec<PathBuf>,
    pub agent: Option<String>,
    pub scope: Scope,
}

impl Skill {
    /// Directory the skill lives in.
    pub fn base_dir(&self) -> Option<&std::path::Path> {
        self.path.parent()
    }
}

impl Named for Skill {
    fn name(&self) -> &str {
        &self.name
    }
}
