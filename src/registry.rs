//! In-memory store of every component discovered in a load pass.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::commands::Command;
use crate::hooks::{HooksMap, merge_hooks};
use crate::plugins::Plugin;
use crate::skills::Skill;
use crate::subagents::Subagent;

/// Components keyed by name, plus the global hook mapping.
///
/// Every insert replaces an existing entry of the same name, so the last
/// scope loaded wins. Fired `once` hooks are tracked by the
/// [`HookEngine`](crate::HookEngine), not here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    pub commands: HashMap<String, Command>,
    pub subagents: HashMap<String, Subagent>,
    pub skills: HashMap<String, Skill>,
    pub plugins: HashMap<String, Plugin>,
    pub hooks: HooksMap,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_command(&mut self, command: Command) {
        if let Some(previous) = self.commands.insert(command.name.clone(), command) {
            tracing::debug!(name = %previous.name, scope = %previous.scope, "Command overridden");
        }
    }

    pub fn insert_subagent(&mut self, subagent: Subagent) {
        if let Some(previous) = self.subagents.insert(subagent.name.clone(), subagent) {
            tracing::debug!(name = %previous.name, scope = %previous.scope, "Subagent overridden");
        }
    }

    pub fn insert_skill(&mut self, skill: Skill) {
        if let Some(previous) = self.skills.insert(skill.name.clone(), skill) {
            tracing::debug!(name = %previous.name, scope = %previous.scope, "Skill overridden");
        }
    }

    /// Record a plugin and fold its components and hook bundle in.
    pub fn insert_plugin(&mut self, plugin: Plugin) {
        for command in &plugin.commands {
            self.insert_command(command.clone());
        }
        for agent in &plugin.agents {
            self.insert_subagent(agent.clone());
        }
        for skill in &plugin.skills {
            self.insert_skill(skill.clone());
        }
        self.merge_hooks(&plugin.hooks);
        self.plugins.insert(plugin.name.clone(), plugin);
    }

    pub fn merge_hooks(&mut self, hooks: &HooksMap) {
        merge_hooks(&mut self.hooks, hooks);
    }

    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn subagent(&self, name: &str) -> Option<&Subagent> {
        self.subagents.get(name)
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    pub fn plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    pub fn command_names(&self) -> Vec<String> {
        sorted_keys(&self.commands)
    }

    pub fn subagent_names(&self) -> Vec<String> {
        sorted_keys(&self.subagents)
    }

    pub fn skill_names(&self) -> Vec<String> {
        sorted_keys(&self.skills)
    }

    pub fn plugin_names(&self) -> Vec<String> {
        sorted_keys(&self.plugins)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
            && self.subagents.is_empty()
            && self.skills.is_empty()
            && self.plugins.is_empty()
            && self.hooks.is_empty()
    }

    pub fn to_json(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn summary(&self) -> String {
        format!(
            "Loaded: {} commands, {} subagents, {} skills, {} plugins",
            self.commands.len(),
            self.subagents.len(),
            self.skills.len(),
            self.plugins.len()
        )
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut names: Vec<String> = map.keys().cloned().collect();
    names.sort();
    names
}
