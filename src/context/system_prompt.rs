use std::path::{Path, PathBuf};

const CLAUDE_MD: &str = "CLAUDE.md";
const PROJECT_CONTEXT_FILE: &str = "project-context.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSection {
    Global,
    Project,
    Context,
}

impl PromptSection {
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Global => "## GLOBAL INSTRUCTIONS",
            Self::Project => "## PROJECT INSTRUCTIONS",
            Self::Context => "## PROJECT CONTEXT",
        }
    }
}

/// Builds one system prompt from `~/.claude/CLAUDE.md`, the project's
/// `CLAUDE.md` and `.claude/project-context.md`, in that order.
#[derive(Debug, Clone)]
pub struct SystemPromptLoader {
    project_root: PathBuf,
    global_file: Option<PathBuf>,
}

impl SystemPromptLoader {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            global_file: crate::common::home_dir().map(|h| h.join(".claude").join(CLAUDE_MD)),
        }
    }

    /// Replace the user-level instructions file, or drop it with `None`.
    pub fn with_global_file(mut self, path: Option<PathBuf>) -> Self {
        self.global_file = path;
        self
    }

    pub fn sources(&self) -> Vec<(PromptSection, PathBuf)> {
        let mut sources = Vec::with_capacity(3);
        if let Some(global) = &self.global_file {
            sources.push((PromptSection::Global, global.clone()));
        }
        sources.push((PromptSection::Project, self.project_root.join(CLAUDE_MD)));
        sources.push((
            PromptSection::Context,
            self.project_root.join(".claude").join(PROJECT_CONTEXT_FILE),
        ));
        sources
    }

    /// Empty when no source has content.
    pub async fn load(&self) -> String {
        let mut parts = Vec::new();
        for (section, path) in self.sources() {
            if let Some(text) = read_trimmed(&path).await {
                parts.push(format!("{}\n{}", section.heading(), text));
            }
        }
        parts.join("\n\n")
    }
}

async fn read_trimmed(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let trimmed = content.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read instructions file");
            None
        }
    }
}
