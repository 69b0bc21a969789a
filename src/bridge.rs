//! Facade tying the loader, command executor and hook engine together.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::commands::CommandExecutor;
use crate::common::{NotFound, Scope};
use crate::config::BridgeConfig;
use crate::context::SystemPromptLoader;
use crate::hooks::{AgentRunner, HookContext, HookEngine, HookEvent, HookOutcome, PromptRunner};
use crate::loader::BridgeLoader;
use crate::registry::Registry;
use crate::skills::Skill;
use crate::subagents::Subagent;

/// Tool name reported to `PreToolUse` hooks when a command is executed.
pub const COMMAND_TOOL_NAME: &str = "Command";

/// Sorted component names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentList {
    pub commands: Vec<String>,
    pub subagents: Vec<String>,
    pub skills: Vec<String>,
    pub plugins: Vec<String>,
}

/// A resolved command, ready to hand to the host runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedCommand {
    pub name: String,
    /// Guidance header followed by the resolved body.
    pub prompt: String,
    pub allowed_tools: Vec<String>,
    pub disallowed_tools: Vec<String>,
    pub model: Option<String>,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    Ready(PreparedCommand),
    Blocked { reason: String },
    NotFound(NotFound),
}

impl CommandOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn prepared(&self) -> Option<&PreparedCommand> {
        match self {
            Self::Ready(prepared) => Some(prepared),
            _ => None,
        }
    }
}

pub struct Bridge {
    config: BridgeConfig,
    loader: BridgeLoader,
    executor: CommandExecutor,
    registry: Registry,
    engine: HookEngine,
    session_id: String,
    prompt_runner: Option<Arc<dyn PromptRunner>>,
    agent_runner: Option<Arc<dyn AgentRunner>>,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("project_root", &self.config.project_root)
            .field("session_id", &self.session_id)
            .field("registry", &self.registry.summary())
            .field("engine", &self.engine)
            .finish()
    }
}

impl Bridge {
    /// Nothing is loaded until [`Bridge::load`].
    pub fn new(config: BridgeConfig) -> Self {
        let loader = BridgeLoader::new(config.clone());
        Self::with_loader(config, loader)
    }

    /// Use a preconfigured loader, e.g. one pointing at a different user directory.
    pub fn with_loader(config: BridgeConfig, loader: BridgeLoader) -> Self {
        let executor = CommandExecutor::new(&config.project_root)
            .with_inline_timeout(config.inline_timeout());
        let engine = HookEngine::new(&config.project_root)
            .with_default_timeout(config.hook_timeout_secs);
        Self {
            config,
            loader,
            executor,
            registry: Registry::new(),
            engine,
            session_id: format!("bridge-{}", chrono::Utc::now().timestamp_millis()),
            prompt_runner: None,
            agent_runner: None,
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_prompt_runner(mut self, runner: Arc<dyn PromptRunner>) -> Self {
        self.engine.set_prompt_runner(Arc::clone(&runner));
        self.prompt_runner = Some(runner);
        self
    }

    pub fn with_agent_runner(mut self, runner: Arc<dyn AgentRunner>) -> Self {
        self.engine.set_agent_runner(Arc::clone(&runner));
        self.agent_runner = Some(runner);
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn engine(&self) -> &HookEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut HookEngine {
        &mut self.engine
    }

    /// Run a load pass and rebuild the hook engine from it.
    ///
    /// The engine is seeded with the global hook mapping first, then with the
    /// hooks of each command, subagent and skill, sorted by name per kind.
    /// Fired `once` hooks are forgotten.
    pub async fn load(&mut self) -> &Registry {
        self.registry = self.loader.load_all().await;
        self.engine = self.build_engine();
        tracing::debug!(hooks = self.engine.hook_count(), "Hook engine seeded");
        &self.registry
    }

    fn build_engine(&self) -> HookEngine {
        let mut engine = HookEngine::new(&self.config.project_root)
            .with_default_timeout(self.config.hook_timeout_secs);
        if let Some(runner) = &self.prompt_runner {
            engine.set_prompt_runner(Arc::clone(runner));
        }
        if let Some(runner) = &self.agent_runner {
            engine.set_agent_runner(Arc::clone(runner));
        }

        let registry = &self.registry;
        engine.load_hooks(&registry.hooks);
        for name in registry.command_names() {
            engine.load_hooks(&registry.commands[&name].hooks);
        }
        for name in registry.subagent_names() {
            engine.load_hooks(&registry.subagents[&name].hooks);
        }
        for name in registry.skill_names() {
            engine.load_hooks(&registry.skills[&name].hooks);
        }
        engine
    }

    pub fn list_components(&self) -> ComponentList {
        ComponentList {
            commands: self.registry.command_names(),
            subagents: self.registry.subagent_names(),
            skills: self.registry.skill_names(),
            plugins: self.registry.plugin_names(),
        }
    }

    /// Run `PreToolUse` hooks for the command, then resolve its prompt.
    ///
    /// Hook errors are logged and do not stop execution; only a block does.
    pub async fn execute_command(&mut self, name: &str, arguments: &[String]) -> CommandOutcome {
        let Some(command) = self.registry.command(name).cloned() else {
            return CommandOutcome::NotFound(NotFound::new(
                "Command",
                name,
                self.registry.command_names(),
            ));
        };

        let context = HookContext::pre_tool_use(
            self.session_id.as_str(),
            COMMAND_TOOL_NAME,
            json!({ "command_name": name, "arguments": arguments }),
        );
        match self.engine.dispatch(HookEvent::PreToolUse, &context).await {
            HookOutcome::Block { reason } => {
                tracing::info!(command = %name, reason = %reason, "Command blocked by hook");
                return CommandOutcome::Blocked { reason };
            }
            HookOutcome::Error => {
                tracing::warn!(command = %name, "PreToolUse hooks reported errors");
            }
            HookOutcome::Continue => {}
        }

        let prompt = self.executor.format_for_agent(&command, arguments).await;
        CommandOutcome::Ready(PreparedCommand {
            name: command.name,
            prompt,
            allowed_tools: command.allowed_tools,
            disallowed_tools: command.disallowed_tools,
            model: command.model,
            scope: command.scope,
        })
    }

    pub fn get_subagent(&self, name: &str) -> Result<&Subagent, NotFound> {
        self.registry
            .subagent(name)
            .ok_or_else(|| NotFound::new("Subagent", name, self.registry.subagent_names()))
    }

    pub fn get_skill(&self, name: &str) -> Result<&Skill, NotFound> {
        self.registry
            .skill(name)
            .ok_or_else(|| NotFound::new("Skill", name, self.registry.skill_names()))
    }

    pub async fn dispatch(&mut self, event: HookEvent, context: &HookContext) -> HookOutcome {
        self.engine.dispatch(event, context).await
    }

    /// Dispatch an event by name, failing when nothing is registered for it.
    pub async fn dispatch_named_hook(
        &mut self,
        event: &str,
        context: &HookContext,
    ) -> crate::Result<HookOutcome> {
        if !self.engine.has_hooks(event) {
            return Err(crate::Error::Hook(format!(
                "No hooks registered for event '{event}'"
            )));
        }
        Ok(self.engine.dispatch_event(event, context).await)
    }

    pub fn to_json(&self) -> crate::Result<Value> {
        self.registry.to_json()
    }

    pub async fn system_prompt(&self) -> String {
        SystemPromptLoader::new(&self.config.project_root).load().await
    }
}
