//! Hook events, dispatch context, outcomes and the injectable runners.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle events hooks can attach to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    /// Before a tool is executed
    PreToolUse,

    /// After successful tool execution
    PostToolUse,

    /// After failed tool execution
    PostToolUseFailure,

    /// When the agent stops
    Stop,

    SessionStart,
    SessionEnd,
    SubagentStart,
    SubagentStop,
    PermissionRequest,
    UserPromptSubmit,
    PreCompact,
    Notification,
}

impl HookEvent {
    pub fn all() -> &'static [HookEvent] {
        &[
            HookEvent::PreToolUse,
            HookEvent::PostToolUse,
            HookEvent::PostToolUseFailure,
            HookEvent::Stop,
            HookEvent::SessionStart,
            HookEvent::SessionEnd,
            HookEvent::SubagentStart,
            HookEvent::SubagentStop,
            HookEvent::PermissionRequest,
            HookEvent::UserPromptSubmit,
            HookEvent::PreCompact,
            HookEvent::Notification,
        ]
    }

    /// Name as written in hook configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "PreToolUse",
            HookEvent::PostToolUse => "PostToolUse",
            HookEvent::PostToolUseFailure => "PostToolUseFailure",
            HookEvent::Stop => "Stop",
            HookEvent::SessionStart => "SessionStart",
            HookEvent::SessionEnd => "SessionEnd",
            HookEvent::SubagentStart => "SubagentStart",
            HookEvent::SubagentStop => "SubagentStop",
            HookEvent::PermissionRequest => "PermissionRequest",
            HookEvent::UserPromptSubmit => "UserPromptSubmit",
            HookEvent::PreCompact => "PreCompact",
            HookEvent::Notification => "Notification",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|e| e.as_str() == name)
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data describing the event being dispatched.
#[derive(Clone, Debug, Serialize)]
pub struct HookContext {
    pub tool_name: String,
    pub tool_input: Value,
    pub tool_output: String,
    pub error: String,
    pub session_id: String,
    pub agent_name: String,
    pub plugin_root: Option<PathBuf>,
    pub project_root: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
}

impl Default for HookContext {
    fn default() -> Self {
        Self {
            tool_name: String::new(),
            tool_input: Value::Object(Default::default()),
            tool_output: String::new(),
            error: String::new(),
            session_id: String::new(),
            agent_name: String::new(),
            plugin_root: None,
            project_root: None,
            timestamp: Utc::now(),
        }
    }
}

impl HookContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn pre_tool_use(
        session_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self::new(session_id).with_tool(tool_name).with_tool_input(input)
    }

    pub fn post_tool_use(
        session_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::new(session_id)
            .with_tool(tool_name)
            .with_tool_output(output)
    }

    pub fn post_tool_use_failure(
        session_id: impl Into<String>,
        tool_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            ..Self::new(session_id).with_tool(tool_name)
        }
    }

    pub fn with_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    pub fn with_tool_input(mut self, input: Value) -> Self {
        self.tool_input = input;
        self
    }

    pub fn with_tool_output(mut self, output: impl Into<String>) -> Self {
        self.tool_output = output.into();
        self
    }

    pub fn with_agent(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    pub fn with_plugin_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.plugin_root = Some(root.into());
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Variables exposed to hooks, in substitution order.
    ///
    /// Roots missing from the context fall back to the given defaults.
    pub fn variables(
        &self,
        project_root: &Path,
        plugin_root: Option<&Path>,
    ) -> Vec<(&'static str, String)> {
        let plugin_root = self
            .plugin_root
            .as_deref()
            .or(plugin_root)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let project_root = self
            .project_root
            .as_deref()
            .unwrap_or(project_root)
            .display()
            .to_string();

        vec![
            ("TOOL_NAME", self.tool_name.clone()),
            ("TOOL_INPUT", self.tool_input.to_string()),
            ("TOOL_OUTPUT", self.tool_output.clone()),
            ("SESSION_ID", self.session_id.clone()),
            ("AGENT_NAME", self.agent_name.clone()),
            ("CLAUDE_PLUGIN_ROOT", plugin_root),
            ("PROJECT_ROOT", project_root),
        ]
    }
}

/// Result of running one hook, or the aggregate of an event dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HookOutcome {
    Continue,
    Block { reason: String },
    Error,
}

impl HookOutcome {
    pub fn block(reason: impl Into<String>) -> Self {
        Self::Block {
            reason: reason.into(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Block { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Evaluates prompt-kind hooks. The returned text blocks when it contains
/// `BLOCK` in any case.
#[async_trait]
pub trait PromptRunner: Send + Sync {
    async fn run_prompt(&self, prompt: &str, context: &HookContext) -> crate::Result<String>;
}

/// Runs agent-kind hooks by agent name.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run_agent(&self, agent: &str, context: &HookContext) -> crate::Result<String>;
}
