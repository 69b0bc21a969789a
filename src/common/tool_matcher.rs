//! Tool name pattern utilities.

use std::sync::OnceLock;

use regex::Regex;

fn scoped_tool_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)\(([^)]+)\)").expect("valid scoped tool regex"))
}

/// Split a scoped tool entry such as `"Bash(git:*)"` into `("Bash", "git:*")`.
///
/// Returns `None` for bare tool names.
pub fn split_tool_pattern(entry: &str) -> Option<(&str, &str)> {
    let caps = scoped_tool_regex().captures(entry)?;
    let tool = caps.get(1)?.as_str();
    let pattern = caps.get(2)?.as_str();
    Some((tool, pattern))
}
