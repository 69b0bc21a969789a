//! Lifecycle hooks: configuration, matching and dispatch.

mod command;
mod config;
mod engine;
mod traits;

pub use command::{BLOCK_EXIT_CODE, substitute_variables};
pub use config::{
    DEFAULT_HOOK_TIMEOUT_SECS, HookConfig, HookKind, HooksMap, MATCH_ALL, merge_hooks,
    parse_hooks, parse_hooks_file,
};
pub(crate) use config::attach_plugin_root;
pub use engine::HookEngine;
pub use traits::{AgentRunner, HookContext, HookEvent, HookOutcome, PromptRunner};
