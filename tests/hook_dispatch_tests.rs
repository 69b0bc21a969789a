//! Hook Dispatch Tests
//!
//! Matcher selection, `once` semantics, blocking and error aggregation, with
//! real `sh` subprocesses and scripted prompt/agent runners.
//!
//! Run: cargo nextest run --test hook_dispatch_tests

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use claude_bridge::{
    AgentRunner, Bridge, BridgeConfig, CommandOutcome, HookConfig, HookContext, HookEngine,
    HookEvent, HookOutcome, PromptRunner, hooks::parse_hooks_file,
};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

// =============================================================================
// Engine
// =============================================================================

mod engine_tests {
    use super::*;

    #[tokio::test]
    async fn test_once_hook_runs_once() {
        init_tracing();
        let dir = tempdir().unwrap();
        let counter = dir.path().join("count");
        let mut engine = HookEngine::new(dir.path());
        engine.register(
            "PreToolUse",
            HookConfig::command(format!("echo fired >> '{}'", counter.display())).run_once(),
        );

        let context = HookContext::pre_tool_use("s1", "Bash", serde_json::json!({}));
        assert_eq!(
            engine.dispatch(HookEvent::PreToolUse, &context).await,
            HookOutcome::Continue
        );
        assert_eq!(
            engine.dispatch(HookEvent::PreToolUse, &context).await,
            HookOutcome::Continue
        );
        assert_eq!(line_count(&counter), 1);
    }

    #[tokio::test]
    async fn test_exit_two_short_circuits() {
        let dir = tempdir().unwrap();
        let later = dir.path().join("later");
        let mut engine = HookEngine::new(dir.path());
        engine.register(
            "PreToolUse",
            HookConfig::command("echo 'writes to /etc are not allowed' >&2; exit 2"),
        );
        engine.register(
            "PreToolUse",
            HookConfig::command(format!("touch '{}'", later.display())),
        );

        let context = HookContext::pre_tool_use("s1", "Write", serde_json::json!({"file_path": "/etc/hosts"}));
        let outcome = engine.dispatch(HookEvent::PreToolUse, &context).await;

        assert_eq!(outcome, HookOutcome::block("writes to /etc are not allowed"));
        assert!(!later.exists());
    }

    #[tokio::test]
    async fn test_error_then_continue_is_error() {
        let dir = tempdir().unwrap();
        let later = dir.path().join("later");
        let mut engine = HookEngine::new(dir.path());
        engine.register("Stop", HookConfig::command("exit 3"));
        engine.register("Stop", HookConfig::command(format!("touch '{}'", later.display())));

        let outcome = engine.dispatch(HookEvent::Stop, &HookContext::new("s1")).await;
        assert_eq!(outcome, HookOutcome::Error);
        assert!(later.exists());
    }

    #[tokio::test]
    async fn test_matcher_is_prefix_and_case_insensitive() {
        let dir = tempdir().unwrap();
        let hits = dir.path().join("hits");
        let mut engine = HookEngine::new(dir.path());
        engine.register(
            "PostToolUse",
            HookConfig::command(format!("echo \"$TOOL_NAME\" >> '{}'", hits.display()))
                .with_matcher("Write|Edit"),
        );

        for tool in ["Write", "edit", "MultiEdit", "WriteFile", "Read"] {
            let context = HookContext::post_tool_use("s1", tool, "ok");
            engine.dispatch(HookEvent::PostToolUse, &context).await;
        }

        let seen = std::fs::read_to_string(&hits).unwrap();
        assert_eq!(seen.lines().collect::<Vec<_>>(), vec!["Write", "edit", "WriteFile"]);
    }

    #[tokio::test]
    async fn test_variables_in_template_and_env() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("vars");
        let mut engine = HookEngine::new(dir.path());
        engine.register(
            "SubagentStop",
            HookConfig::command(format!(
                "echo \"${{AGENT_NAME}} $SESSION_ID $(basename \"$PWD\")\" > '{}'",
                out.display()
            )),
        );

        let context = HookContext::new("sess-9").with_agent("reviewer");
        let outcome = engine.dispatch(HookEvent::SubagentStop, &context).await;

        assert_eq!(outcome, HookOutcome::Continue);
        let dir_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap().trim(),
            format!("reviewer sess-9 {dir_name}")
        );
    }

    #[tokio::test]
    async fn test_hooks_file_forms() {
        let wrapped = parse_hooks_file(
            r#"{"hooks": {"Notification": [{"type": "command", "command": "true", "timeout": 5, "once": true}]}}"#,
        )
        .unwrap();
        let bare = parse_hooks_file(r#"{"Notification": [{"command": "true"}]}"#).unwrap();

        let hook = &wrapped["Notification"][0];
        assert_eq!(hook.timeout, Some(5));
        assert!(hook.once);
        assert_eq!(bare["Notification"][0].matcher, ".*");
        assert!(parse_hooks_file("not json").is_err());
    }
}

// =============================================================================
// Runners
// =============================================================================

struct ScriptedRunner {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedRunner {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PromptRunner for ScriptedRunner {
    async fn run_prompt(&self, _prompt: &str, _context: &HookContext) -> claude_bridge::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

#[async_trait]
impl AgentRunner for ScriptedRunner {
    async fn run_agent(&self, _agent: &str, _context: &HookContext) -> claude_bridge::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

mod runner_tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_block_verdict() {
        let dir = tempdir().unwrap();
        let runner = ScriptedRunner::new("  Verdict: block, touches secrets ");
        let mut engine = HookEngine::new(dir.path()).with_prompt_runner(runner.clone());
        engine.register("UserPromptSubmit", HookConfig::prompt("Is $TOOL_INPUT safe?"));

        let outcome = engine
            .dispatch(HookEvent::UserPromptSubmit, &HookContext::new("s1"))
            .await;
        assert_eq!(outcome, HookOutcome::block("Verdict: block, touches secrets"));
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_agent_without_runner_is_error() {
        let dir = tempdir().unwrap();
        let mut engine = HookEngine::new(dir.path());
        engine.register("SubagentStart", HookConfig::agent("auditor"));

        let outcome = engine
            .dispatch(HookEvent::SubagentStart, &HookContext::new("s1"))
            .await;
        assert_eq!(outcome, HookOutcome::Error);
    }

    #[tokio::test]
    async fn test_agent_approval_continues() {
        let dir = tempdir().unwrap();
        let runner = ScriptedRunner::new("Looks fine");
        let mut engine = HookEngine::new(dir.path()).with_agent_runner(runner.clone());
        engine.register("SubagentStart", HookConfig::agent("auditor"));

        let outcome = engine
            .dispatch(HookEvent::SubagentStart, &HookContext::new("s1"))
            .await;
        assert_eq!(outcome, HookOutcome::Continue);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }
}

// =============================================================================
// Bridge seeding
// =============================================================================

mod bridge_tests {
    use super::*;

    #[tokio::test]
    async fn test_plugin_hook_uses_plugin_root() {
        init_tracing();
        let project = tempdir().unwrap();
        let root = project.path();
        let plugin = root.join(".claude-plugins/guard");
        write(&plugin, ".claude-plugin/plugin.json", r#"{"name": "guard"}"#);
        write(&plugin, "scripts/deny.sh", "echo \"denied by $1\" >&2\nexit 2\n");
        write(
            &plugin,
            "hooks/hooks.json",
            r#"{"hooks": {"PreToolUse": [{"matcher": "Command", "hooks": [{"type": "command", "command": "sh ${CLAUDE_PLUGIN_ROOT}/scripts/deny.sh guard"}]}]}}"#,
        );
        write(root, ".claude/commands/deploy.md", "Deploy now");

        let mut bridge = Bridge::new(BridgeConfig::new(root));
        bridge.load().await;

        let outcome = bridge.execute_command("deploy", &[]).await;
        assert_eq!(
            outcome,
            CommandOutcome::Blocked {
                reason: "denied by guard".into()
            }
        );
    }

    #[tokio::test]
    async fn test_prompt_runner_survives_reload() {
        let project = tempdir().unwrap();
        let root = project.path();
        write(
            root,
            ".claude/skills/careful/SKILL.md",
            "---\nhooks:\n  - event: PreToolUse\n    type: prompt\n    prompt: Review $TOOL_NAME\n---\nBe careful",
        );
        write(root, ".claude/commands/run.md", "Run");

        let runner = ScriptedRunner::new("ok");
        let mut bridge = Bridge::new(BridgeConfig::new(root)).with_prompt_runner(runner.clone());
        bridge.load().await;
        bridge.load().await;

        assert!(bridge.execute_command("run", &[]).await.is_ready());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_once_reset_by_reload() {
        let project = tempdir().unwrap();
        let root = project.path();
        let counter = root.join("count");
        write(
            root,
            ".claude/commands/hello.md",
            &format!(
                "---\nhooks:\n  PreToolUse:\n    - command: \"echo x >> '{}'\"\n      once: true\n---\nHi",
                counter.display()
            ),
        );

        let mut bridge = Bridge::new(BridgeConfig::new(root));
        bridge.load().await;
        bridge.execute_command("hello", &[]).await;
        bridge.execute_command("hello", &[]).await;
        assert_eq!(line_count(&counter), 1);

        bridge.load().await;
        bridge.execute_command("hello", &[]).await;
        assert_eq!(line_count(&counter), 2);
    }
}
