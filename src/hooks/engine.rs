//! Hook engine: registration, matching and sequential dispatch.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use regex::{Regex, RegexBuilder};

use super::command::{run_command_hook, substitute_variables};
use super::config::parse_hooks_file;
use super::{
    AgentRunner, DEFAULT_HOOK_TIMEOUT_SECS, HookConfig, HookContext, HookEvent, HookKind,
    HookOutcome, HooksMap, PromptRunner,
};

struct RegisteredHook {
    config: HookConfig,
    matcher: Option<Regex>,
}

impl RegisteredHook {
    fn new(config: HookConfig) -> Self {
        let matcher = compile_matcher(&config.matcher);
        Self { config, matcher }
    }

    fn matches(&self, tool_name: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(tool_name))
    }
}

/// Anchored at the start, case-insensitive. Invalid patterns never match.
fn compile_matcher(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(&format!("^(?:{})", pattern))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(matcher = %pattern, error = %e, "Invalid hook matcher, hook will never match");
            None
        }
    }
}

pub struct HookEngine {
    project_root: PathBuf,
    hooks: HashMap<String, Vec<RegisteredHook>>,
    fired_once: HashSet<String>,
    default_timeout_secs: u64,
    prompt_runner: Option<Arc<dyn PromptRunner>>,
    agent_runner: Option<Arc<dyn AgentRunner>>,
}

impl std::fmt::Debug for HookEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookEngine")
            .field("project_root", &self.project_root)
            .field("events", &self.event_names())
            .field("fired_once", &self.fired_once.len())
            .field("prompt_runner", &self.prompt_runner.is_some())
            .field("agent_runner", &self.agent_runner.is_some())
            .finish()
    }
}

impl HookEngine {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            hooks: HashMap::new(),
            fired_once: HashSet::new(),
            default_timeout_secs: DEFAULT_HOOK_TIMEOUT_SECS,
            prompt_runner: None,
            agent_runner: None,
        }
    }

    /// Timeout for command hooks that do not set their own.
    pub fn with_default_timeout(mut self, secs: u64) -> Self {
        self.default_timeout_secs = secs;
        self
    }

    pub fn with_prompt_runner(mut self, runner: Arc<dyn PromptRunner>) -> Self {
        self.prompt_runner = Some(runner);
        self
    }

    pub fn with_agent_runner(mut self, runner: Arc<dyn AgentRunner>) -> Self {
        self.agent_runner = Some(runner);
        self
    }

    pub fn set_prompt_runner(&mut self, runner: Arc<dyn PromptRunner>) {
        self.prompt_runner = Some(runner);
    }

    pub fn set_agent_runner(&mut self, runner: Arc<dyn AgentRunner>) {
        self.agent_runner = Some(runner);
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn register(&mut self, event: impl Into<String>, config: HookConfig) {
        self.hooks
            .entry(event.into())
            .or_default()
            .push(RegisteredHook::new(config));
    }

    /// Append every configuration in `hooks`, keeping per-event order.
    pub fn load_hooks(&mut self, hooks: &HooksMap) {
        for (event, configs) in hooks {
            for config in configs {
                self.register(event.clone(), config.clone());
            }
        }
    }

    /// Load a hooks JSON file, wrapped in `{"hooks": ...}` or bare.
    pub async fn load_hooks_from_file(&mut self, path: &Path) -> crate::Result<()> {
        let content = tokio::fs::read_to_string(path).await?;
        let hooks = parse_hooks_file(&content)?;
        tracing::debug!(path = %path.display(), events = hooks.len(), "Loaded hooks file");
        self.load_hooks(&hooks);
        Ok(())
    }

    pub fn has_hooks(&self, event: &str) -> bool {
        self.hooks.get(event).is_some_and(|h| !h.is_empty())
    }

    pub fn hooks_for_event(&self, event: &str) -> Vec<&HookConfig> {
        self.hooks
            .get(event)
            .map(|hooks| hooks.iter().map(|h| &h.config).collect())
            .unwrap_or_default()
    }

    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    pub fn has_fired(&self, event: &str, config: &HookConfig) -> bool {
        self.fired_once.contains(&config.once_key(event))
    }

    pub async fn dispatch(&mut self, event: HookEvent, context: &HookContext) -> HookOutcome {
        self.dispatch_event(event.as_str(), context).await
    }

    /// Run matching hooks for `event` in registration order.
    ///
    /// Stops at the first block. Otherwise the result is `Error` if any hook
    /// errored and `Continue` if none did.
    pub async fn dispatch_event(&mut self, event: &str, context: &HookContext) -> HookOutcome {
        let Self {
            project_root,
            hooks,
            fired_once,
            default_timeout_secs,
            prompt_runner,
            agent_runner,
        } = self;

        let Some(hooks) = hooks.get(event) else {
            return HookOutcome::Continue;
        };

        let env = ExecutionEnv {
            default_timeout_secs: *default_timeout_secs,
            prompt: prompt_runner.as_deref(),
            agent: agent_runner.as_deref(),
        };
        let mut result = HookOutcome::Continue;

        for hook in hooks {
            if !hook.matches(&context.tool_name) {
                continue;
            }

            let once_key = hook.config.once.then(|| hook.config.once_key(event));
            if let Some(key) = &once_key
                && fired_once.contains(key)
            {
                tracing::debug!(event, hook = %key, "Skipping once-hook that already fired");
                continue;
            }

            let outcome = execute_hook(event, &hook.config, context, project_root, &env).await;

            if let Some(key) = once_key {
                fired_once.insert(key);
            }

            match outcome {
                HookOutcome::Block { ref reason } => {
                    tracing::info!(event, tool = %context.tool_name, reason = %reason, "Hook blocked action");
                    return outcome;
                }
                HookOutcome::Error => result = HookOutcome::Error,
                HookOutcome::Continue => {}
            }
        }

        tracing::debug!(event, tool = %context.tool_name, outcome = ?result, "Dispatched hooks");
        result
    }
}

struct ExecutionEnv<'a> {
    default_timeout_secs: u64,
    prompt: Option<&'a dyn PromptRunner>,
    agent: Option<&'a dyn AgentRunner>,
}

async fn execute_hook(
    event: &str,
    config: &HookConfig,
    context: &HookContext,
    project_root: &Path,
    env: &ExecutionEnv<'_>,
) -> HookOutcome {
    let variables = context.variables(project_root, config.plugin_root.as_deref());
    let timeout = Duration::from_secs(config.timeout_secs(env.default_timeout_secs));

    match &config.kind {
        HookKind::Command => {
            let Some(command) = config.command.as_deref() else {
                tracing::warn!(event, "Command hook has no command");
                return HookOutcome::Error;
            };
            run_command_hook(event, command, timeout, context, project_root, &variables).await
        }
        HookKind::Prompt => {
            let (Some(template), Some(runner)) = (config.prompt.as_deref(), env.prompt) else {
                tracing::warn!(event, "Prompt hook needs a prompt and a prompt runner");
                return HookOutcome::Error;
            };
            let prompt = substitute_variables(template, &variables);
            let response = tokio::time::timeout(timeout, runner.run_prompt(&prompt, context)).await;
            verdict(event, response)
        }
        HookKind::Agent => {
            let (Some(agent), Some(runner)) = (config.agent.as_deref(), env.agent) else {
                tracing::warn!(event, "Agent hook needs an agent and an agent runner");
                return HookOutcome::Error;
            };
            let response = tokio::time::timeout(timeout, runner.run_agent(agent, context)).await;
            verdict(event, response)
        }
        HookKind::Other(kind) => {
            tracing::warn!(event, kind = %kind, "Unknown hook type");
            HookOutcome::Error
        }
    }
}

fn verdict(
    event: &str,
    response: Result<crate::Result<String>, tokio::time::error::Elapsed>,
) -> HookOutcome {
    match response {
        Ok(Ok(text)) if text.to_uppercase().contains("BLOCK") => HookOutcome::block(text.trim()),
        Ok(Ok(_)) => HookOutcome::Continue,
        Ok(Err(e)) => {
            tracing::warn!(event, error = %e, "Hook runner failed");
            HookOutcome::Error
        }
        Err(_) => {
            tracing::warn!(event, "Hook runner timed out");
            HookOutcome::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedRunner {
        reply: crate::Result<String>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(crate::Error::runner("prompt", "model unavailable")),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn reply(&self, input: &str) -> crate::Result<String> {
            self.seen.lock().unwrap().push(input.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(crate::Error::runner("prompt", e.to_string())),
            }
        }
    }

    #[async_trait]
    impl PromptRunner for ScriptedRunner {
        async fn run_prompt(&self, prompt: &str, _: &HookContext) -> crate::Result<String> {
            self.reply(prompt)
        }
    }

    #[async_trait]
    impl AgentRunner for ScriptedRunner {
        async fn run_agent(&self, agent: &str, _: &HookContext) -> crate::Result<String> {
            self.reply(agent)
        }
    }

    fn engine() -> (tempfile::TempDir, HookEngine) {
        let temp = tempfile::tempdir().unwrap();
        let engine = HookEngine::new(temp.path());
        (temp, engine)
    }

    #[test]
    fn test_matcher_anchored_case_insensitive() {
        let hook = RegisteredHook::new(HookConfig::command("x").with_matcher("Write|Edit"));
        assert!(hook.matches("Write"));
        assert!(hook.matches("edit"));
        assert!(hook.matches("WriteFile"));
        assert!(!hook.matches("NotebookEdit"));
    }

    #[test]
    fn test_invalid_matcher_never_matches() {
        let hook = RegisteredHook::new(HookConfig::command("x").with_matcher("(unclosed"));
        assert!(!hook.matches("(unclosed"));
        assert!(!hook.matches(""));
    }

    #[tokio::test]
    async fn test_engine_default_timeout() {
        let temp = tempfile::tempdir().unwrap();
        let mut engine = HookEngine::new(temp.path()).with_default_timeout(1);
        engine.register("Stop", HookConfig::command("sleep 5"));
        engine.register("Stop", HookConfig::command("sleep 0").with_timeout(10));

        let outcome = engine.dispatch(HookEvent::Stop, &HookContext::default()).await;
        assert_eq!(outcome, HookOutcome::Error);
    }

    #[tokio::test]
    async fn test_no_hooks_continue() {
        let (_temp, mut engine) = engine();
        let outcome = engine.dispatch(HookEvent::Stop, &HookContext::default()).await;
        assert_eq!(outcome, HookOutcome::Continue);
    }

    #[tokio::test]
    async fn test_block_short_circuits() {
        let (temp, mut engine) = engine();
        engine.register("PreToolUse", HookConfig::command("echo denied >&2; exit 2"));
        engine.register("PreToolUse", HookConfig::command("touch second.txt"));

        let ctx = HookContext::pre_tool_use("s", "Bash", serde_json::json!({}));
        let outcome = engine.dispatch(HookEvent::PreToolUse, &ctx).await;

        assert_eq!(outcome, HookOutcome::block("denied"));
        assert!(!temp.path().join("second.txt").exists());
    }

    #[tokio::test]
    async fn test_error_does_not_stop_later_hooks() {
        let (temp, mut engine) = engine();
        engine.register("Stop", HookConfig::command("exit 7"));
        engine.register("Stop", HookConfig::command("touch after.txt"));

        let outcome = engine.dispatch(HookEvent::Stop, &HookContext::default()).await;

        assert_eq!(outcome, HookOutcome::Error);
        assert!(temp.path().join("after.txt").exists());
    }

    #[tokio::test]
    async fn test_matcher_filters_by_tool() {
        let (temp, mut engine) = engine();
        engine.register(
            "PreToolUse",
            HookConfig::command("touch bash.txt").with_matcher("Bash"),
        );

        let read = HookContext::pre_tool_use("s", "Read", serde_json::json!({}));
        engine.dispatch(HookEvent::PreToolUse, &read).await;
        assert!(!temp.path().join("bash.txt").exists());

        let bash = HookContext::pre_tool_use("s", "bash", serde_json::json!({}));
        engine.dispatch(HookEvent::PreToolUse, &bash).await;
        assert!(temp.path().join("bash.txt").exists());
    }

    #[tokio::test]
    async fn test_once_hook_runs_once() {
        let (temp, mut engine) = engine();
        let config = HookConfig::command("echo run >> count.txt").run_once();
        engine.register("SessionStart", config.clone());

        for _ in 0..3 {
            engine.dispatch(HookEvent::SessionStart, &HookContext::default()).await;
        }

        let count = std::fs::read_to_string(temp.path().join("count.txt")).unwrap();
        assert_eq!(count.lines().count(), 1);
        assert!(engine.has_fired("SessionStart", &config));
    }

    #[tokio::test]
    async fn test_prompt_hook_verdicts() {
        let (_temp, engine) = engine();
        let runner = ScriptedRunner::replying("Please block this: unsafe");
        let mut engine = engine.with_prompt_runner(runner.clone());
        engine.register("PreToolUse", HookConfig::prompt("Check $TOOL_NAME"));

        let ctx = HookContext::pre_tool_use("s", "Bash", serde_json::json!({}));
        let outcome = engine.dispatch(HookEvent::PreToolUse, &ctx).await;

        assert_eq!(outcome, HookOutcome::block("Please block this: unsafe"));
        assert_eq!(runner.seen.lock().unwrap().as_slice(), ["Check Bash"]);
    }

    #[tokio::test]
    async fn test_prompt_hook_allows() {
        let (_temp, engine) = engine();
        let mut engine = engine.with_prompt_runner(ScriptedRunner::replying("looks fine"));
        engine.register("Stop", HookConfig::prompt("ok?"));

        let outcome = engine.dispatch(HookEvent::Stop, &HookContext::default()).await;
        assert_eq!(outcome, HookOutcome::Continue);
    }

    #[tokio::test]
    async fn test_missing_or_failing_runner_is_error() {
        let (_temp, mut engine) = engine();
        engine.register("Stop", HookConfig::prompt("ok?"));
        assert_eq!(
            engine.dispatch(HookEvent::Stop, &HookContext::default()).await,
            HookOutcome::Error
        );

        engine.set_prompt_runner(ScriptedRunner::failing());
        assert_eq!(
            engine.dispatch(HookEvent::Stop, &HookContext::default()).await,
            HookOutcome::Error
        );
    }

    #[tokio::test]
    async fn test_agent_hook() {
        let (_temp, engine) = engine();
        let runner = ScriptedRunner::replying("BLOCK: tests failing");
        let mut engine = engine.with_agent_runner(runner.clone());
        engine.register("SubagentStop", HookConfig::agent("verifier"));

        let outcome = engine
            .dispatch(HookEvent::SubagentStop, &HookContext::default())
            .await;
        assert!(outcome.is_blocked());
        assert_eq!(runner.seen.lock().unwrap().as_slice(), ["verifier"]);
    }

    #[tokio::test]
    async fn test_unknown_kind_and_custom_event() {
        let (_temp, mut engine) = engine();
        let mut config = HookConfig::command("true");
        config.kind = HookKind::Other("webhook".into());
        engine.register("DeployFinished", config);

        assert!(engine.has_hooks("DeployFinished"));
        let outcome = engine
            .dispatch_event("DeployFinished", &HookContext::default())
            .await;
        assert_eq!(outcome, HookOutcome::Error);
    }

    #[tokio::test]
    async fn test_plugin_root_from_config() {
        let (temp, mut engine) = engine();
        engine.register(
            "Stop",
            HookConfig::command("echo ${CLAUDE_PLUGIN_ROOT} > root.txt").with_plugin_root("/opt/fmt"),
        );

        engine.dispatch(HookEvent::Stop, &HookContext::default()).await;
        let root = std::fs::read_to_string(temp.path().join("root.txt")).unwrap();
        assert_eq!(root.trim(), "/opt/fmt");
    }

    #[tokio::test]
    async fn test_load_hooks_from_file() {
        let (temp, mut engine) = engine();
        let path = temp.path().join("hooks.json");
        std::fs::write(
            &path,
            r#"{"hooks": {"PreToolUse": [{"matcher": "Bash", "hooks": [{"type": "command", "command": "true"}]}]}}"#,
        )
        .unwrap();

        engine.load_hooks_from_file(&path).await.unwrap();
        assert_eq!(engine.hook_count(), 1);
        assert_eq!(engine.hooks_for_event("PreToolUse")[0].matcher, "Bash");

        assert!(engine.load_hooks_from_file(&temp.path().join("missing.json")).await.is_err());
    }
}
