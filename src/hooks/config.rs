//! Hook configuration and the normalization of `hooks` fields.
//!
//! Used by plugin hook bundles (`hooks/hooks.json`) and by command, skill and
//! subagent front-matter. Accepted shapes:
//!
//! - mapping: `{"PreToolUse": [{"type": "command", "matcher": "Bash", "command": "..."}]}`
//! - list: `[{"event": "PreToolUse", "command": "..."}]`
//! - nested rules: `{"PreToolUse": [{"matcher": "Write|Edit", "hooks": [{...}]}]}`
//! - bare commands: `{"SessionStart": ["echo start"]}`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::HookEvent;

pub const DEFAULT_HOOK_TIMEOUT_SECS: u64 = 600;
pub const MATCH_ALL: &str = ".*";

/// Hook configurations grouped by lifecycle event name, in registration order.
pub type HooksMap = HashMap<String, Vec<HookConfig>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HookKind {
    Command,
    Prompt,
    Agent,
    /// Unrecognized `type` value; dispatching it resolves to an error.
    Other(String),
}

impl HookKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Command => "command",
            Self::Prompt => "prompt",
            Self::Agent => "agent",
            Self::Other(kind) => kind,
        }
    }

    pub fn is_known(name: &str) -> bool {
        matches!(name, "command" | "prompt" | "agent")
    }
}

impl From<String> for HookKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "command" => Self::Command,
            "prompt" => Self::Prompt,
            "agent" => Self::Agent,
            _ => Self::Other(value),
        }
    }
}

impl From<HookKind> for String {
    fn from(kind: HookKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookConfig {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: HookKind,
    #[serde(default = "default_matcher", deserialize_with = "matcher_or_default")]
    pub matcher: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Seconds; the engine default applies when unset.
    #[serde(default, alias = "timeout_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub once: bool,
    /// Root of the plugin that declared this hook, if any.
    #[serde(skip)]
    pub plugin_root: Option<PathBuf>,
}

fn default_kind() -> HookKind {
    HookKind::Command
}

fn default_matcher() -> String {
    MATCH_ALL.to_string()
}

fn matcher_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_matcher))
}

impl HookConfig {
    fn with_kind(kind: HookKind) -> Self {
        Self {
            kind,
            matcher: default_matcher(),
            command: None,
            prompt: None,
            agent: None,
            timeout: None,
            once: false,
            plugin_root: None,
        }
    }

    pub fn command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::with_kind(HookKind::Command)
        }
    }

    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Self::with_kind(HookKind::Prompt)
        }
    }

    pub fn agent(agent: impl Into<String>) -> Self {
        Self {
            agent: Some(agent.into()),
            ..Self::with_kind(HookKind::Agent)
        }
    }

    pub fn with_matcher(mut self, matcher: impl Into<String>) -> Self {
        self.matcher = matcher.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn timeout_secs(&self, default: u64) -> u64 {
        self.timeout.unwrap_or(default)
    }

    pub fn run_once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn with_plugin_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.plugin_root = Some(root.into());
        self
    }

    /// The first of command, prompt and agent that is set.
    pub fn payload(&self) -> Option<&str> {
        self.command
            .as_deref()
            .or(self.prompt.as_deref())
            .or(self.agent.as_deref())
    }

    /// Identity used for `once` tracking: event, matcher and payload.
    pub fn once_key(&self, event: &str) -> String {
        format!("{}:{}:{}", event, self.matcher, self.payload().unwrap_or_default())
    }
}

/// Normalize a `hooks` value from front-matter or a bundle file into the
/// mapping form. Entries that cannot be read are logged and dropped.
pub fn parse_hooks(value: Option<&Value>) -> HooksMap {
    let mut hooks = HooksMap::new();

    match value {
        Some(Value::Object(map)) => {
            for (event, entries) in map {
                let Value::Array(entries) = entries else {
                    tracing::warn!(event = %event, "Hook entries must be a list, skipping");
                    continue;
                };
                let configs = hooks.entry(event.clone()).or_default();
                for entry in entries {
                    expand_entry(entry, None, configs);
                }
            }
        }
        Some(Value::Array(entries)) => {
            for entry in entries {
                let (event, entry) = split_event(entry);
                expand_entry(&entry, None, hooks.entry(event).or_default());
            }
        }
        Some(Value::Null) | None => {}
        Some(_) => tracing::warn!("Unsupported hooks value, expected a mapping or a list"),
    }

    hooks.retain(|_, configs| !configs.is_empty());
    hooks
}

/// Parse a hook bundle file body, accepting both `{"hooks": {...}}` and a
/// bare event mapping.
pub fn parse_hooks_file(content: &str) -> crate::Result<HooksMap> {
    let data: Value = serde_json::from_str(content)?;
    match data.get("hooks") {
        Some(inner @ (Value::Object(_) | Value::Array(_))) => Ok(parse_hooks(Some(inner))),
        _ => Ok(parse_hooks(Some(&data))),
    }
}

/// Append every configuration in `source` after the existing ones in `target`.
pub fn merge_hooks(target: &mut HooksMap, source: &HooksMap) {
    for (event, configs) in source {
        target
            .entry(event.clone())
            .or_default()
            .extend(configs.iter().cloned());
    }
}

/// Tag every configuration with the plugin root it was declared in.
pub(crate) fn attach_plugin_root(hooks: &mut HooksMap, root: &Path) {
    for config in hooks.values_mut().flatten() {
        config.plugin_root = Some(root.to_path_buf());
    }
}

/// Pull the event name off a list-form entry.
///
/// `event` wins; otherwise a `type` that is not a hook kind names the event.
fn split_event(entry: &Value) -> (String, Value) {
    let mut entry = entry.clone();
    let Value::Object(map) = &mut entry else {
        return (HookEvent::PreToolUse.to_string(), entry);
    };

    if let Some(event) = map.remove("event").and_then(|v| v.as_str().map(String::from)) {
        return (event, entry);
    }

    let typed_event = map
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !HookKind::is_known(t))
        .map(String::from);

    match typed_event {
        Some(event) => {
            map.remove("type");
            (event, entry)
        }
        None => (HookEvent::PreToolUse.to_string(), entry),
    }
}

fn expand_entry(entry: &Value, inherited_matcher: Option<&str>, out: &mut Vec<HookConfig>) {
    match entry {
        Value::String(command) => {
            let mut config = HookConfig::command(command.clone());
            if let Some(matcher) = inherited_matcher {
                config.matcher = matcher.to_string();
            }
            out.push(config);
        }
        Value::Object(map) if map.get("hooks").is_some_and(Value::is_array) => {
            let matcher = map
                .get("matcher")
                .and_then(Value::as_str)
                .or(inherited_matcher);
            if let Some(Value::Array(actions)) = map.get("hooks") {
                for action in actions {
                    expand_entry(action, matcher, out);
                }
            }
        }
        Value::Object(map) => {
            let mut map = map.clone();
            if let Some(matcher) = inherited_matcher
                && !map.contains_key("matcher")
            {
                map.insert("matcher".into(), Value::String(matcher.to_string()));
            }
            match serde_json::from_value::<HookConfig>(Value::Object(map)) {
                Ok(config) => out.push(config),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed hook entry"),
            }
        }
        other => tracing::warn!(entry = %other, "Skipping unsupported hook entry"),
    }
}
