//! Template resolution stages for command bodies.
//!
//! Each stage is total: failures become inline markers in the returned text.
//! - `$ARGUMENTS` and `$1`..`$9` substitution
//! - `@path` file inlining
//! - `` !`cmd` `` inline shell execution

use std::path::Path;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use crate::common::expand_home;

const MAX_POSITIONAL: usize = 9;

fn file_reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([^\s@]+)").expect("valid file reference regex"))
}

fn backtick_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!`([^`]+)`").expect("valid backtick regex"))
}

/// Replace `$ARGUMENTS` with the space-joined arguments, then `$1`..`$9`
/// positionally. Positional placeholders without an argument are removed.
pub fn substitute_arguments(content: &str, arguments: &[String]) -> String {
    let mut result = content.replace("$ARGUMENTS", &arguments.join(" "));

    for (i, arg) in arguments.iter().take(MAX_POSITIONAL).enumerate() {
        result = result.replace(&format!("${}", i + 1), arg);
    }

    for i in 1..=MAX_POSITIONAL {
        result = result.replace(&format!("${}", i), "");
    }

    result
}

/// Outcome of resolving one `@reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReference {
    Content { reference: String, content: String },
    ReadError { reference: String, message: String },
    NotFound { reference: String },
}

impl FileReference {
    /// Resolve against the project root first, then as a home-expanded path.
    pub async fn resolve(reference: &str, project_root: &Path) -> Self {
        let mut path = project_root.join(reference);
        if !path.exists() {
            path = expand_home(reference);
        }

        if !path.is_file() {
            return Self::NotFound {
                reference: reference.to_string(),
            };
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Self::Content {
                reference: reference.to_string(),
                content,
            },
            Err(e) => Self::ReadError {
                reference: reference.to_string(),
                message: e.to_string(),
            },
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Content { reference, content } => format!(
                "\n--- Content of {} ---\n{}\n--- End of {} ---\n",
                reference, content, reference
            ),
            Self::ReadError { reference, message } => {
                format!("[Error reading {}: {}]", reference, message)
            }
            Self::NotFound { reference } => format!("[File not found: {}]", reference),
        }
    }
}

/// Replace every `@reference` with the referenced file's content or a marker.
pub async fn resolve_file_references(content: &str, project_root: &Path) -> String {
    let mut result = String::with_capacity(content.len());
    let mut last = 0;

    for cap in file_reference_regex().captures_iter(content) {
        let Some(full) = cap.get(0) else { continue };
        let resolved = FileReference::resolve(&cap[1], project_root).await;

        result.push_str(&content[last..full.start()]);
        result.push_str(&resolved.render());
        last = full.end();
    }

    result.push_str(&content[last..]);
    result
}

/// Outcome of running one inline `` !`cmd` ``.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineOutput {
    Output { stdout: String, stderr: String },
    TimedOut { command: String },
    Failed { command: String, message: String },
}

impl InlineOutput {
    pub async fn run(command: &str, working_dir: &Path, timeout: Duration) -> Self {
        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, child).await {
            Ok(Ok(output)) => Self::Output {
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Ok(Err(e)) => Self::Failed {
                command: command.to_string(),
                message: e.to_string(),
            },
            Err(_) => Self::TimedOut {
                command: command.to_string(),
            },
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Output { stdout, stderr } => {
                let mut text = stdout.clone();
                if !stderr.is_empty() {
                    text.push_str(&format!("\n[stderr: {}]", stderr));
                }
                if text.is_empty() {
                    "[no output]".to_string()
                } else {
                    text
                }
            }
            Self::TimedOut { command } => format!("[Command timed out: {}]", command),
            Self::Failed { command, message } => {
                format!("[Error executing '{}': {}]", command, message)
            }
        }
    }
}

/// Run every `` !`cmd` `` in `working_dir` and splice its output in place.
pub async fn execute_inline_commands(content: &str, working_dir: &Path, timeout: Duration) -> String {
    let mut result = String::with_capacity(content.len());
    let mut last = 0;

    for cap in backtick_regex().captures_iter(content) {
        let Some(full) = cap.get(0) else { continue };
        let command = &cap[1];
        let output = InlineOutput::run(command, working_dir, timeout).await;
        tracing::debug!(command, output = ?output, "Executed inline command");

        result.push_str(&content[last..full.start()]);
        result.push_str(&output.render());
        last = full.end();
    }

    result.push_str(&content[last..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    const TIMEOUT: Duration = Duration::from_secs(30);

    #[test]
    fn test_substitute_arguments() {
        let result = substitute_arguments("Hello $ARGUMENTS, arg1=$1", &args(&["world", "x"]));
        assert_eq!(result, "Hello world x, arg1=world");
    }

    #[test]
    fn test_missing_positionals_removed() {
        let result = substitute_arguments("a=$1 b=$2 c=$9", &args(&["one"]));
        assert_eq!(result, "a=one b= c=");

        let empty = substitute_arguments("$1$2$3$4$5$6$7$8$9 $ARGUMENTS.", &[]);
        assert_eq!(empty, " .");
    }

    #[test]
    fn test_only_nine_positionals() {
        let values = args(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let result = substitute_arguments("$1 $2 $3 $4 $5 $6 $7 $8 $9", &values);
        assert_eq!(result, "a b c d e f g h i");
    }

    #[tokio::test]
    async fn test_file_reference_inlined() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "remember this").unwrap();

        let result = resolve_file_references("See @notes.txt please", temp.path()).await;
        assert_eq!(
            result,
            "See \n--- Content of notes.txt ---\nremember this\n--- End of notes.txt ---\n please"
        );
    }

    #[tokio::test]
    async fn test_missing_file_marker() {
        let temp = tempfile::tempdir().unwrap();
        let result = resolve_file_references("Check @missing.txt", temp.path()).await;
        assert_eq!(result, "Check [File not found: missing.txt]");
    }

    #[tokio::test]
    async fn test_directory_reference_not_found() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("src")).unwrap();
        let result = resolve_file_references("@src", temp.path()).await;
        assert_eq!(result, "[File not found: src]");
    }

    #[tokio::test]
    async fn test_at_terminates_reference() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), "A").unwrap();

        let result = resolve_file_references("@a.txt@b.txt", temp.path()).await;
        assert!(result.starts_with("\n--- Content of a.txt ---\nA\n"));
        assert!(result.ends_with("[File not found: b.txt]"));
    }

    #[tokio::test]
    async fn test_absolute_reference() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("abs.txt");
        std::fs::write(&file, "absolute").unwrap();

        let body = format!("@{}", file.display());
        let other_root = tempfile::tempdir().unwrap();
        let result = resolve_file_references(&body, other_root.path()).await;
        assert!(result.contains("absolute"));
    }

    #[tokio::test]
    async fn test_inline_command() {
        let temp = tempfile::tempdir().unwrap();
        let result = execute_inline_commands("Say: !`echo hi`", temp.path(), TIMEOUT).await;
        assert_eq!(result, "Say: hi");
        assert!(!result.contains('`'));
    }

    #[tokio::test]
    async fn test_inline_command_runs_in_working_dir() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();
        let result = execute_inline_commands("!`ls`", temp.path(), TIMEOUT).await;
        assert!(result.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_inline_command_markers() {
        let temp = tempfile::tempdir().unwrap();

        let empty = execute_inline_commands("!`true`", temp.path(), TIMEOUT).await;
        assert_eq!(empty, "[no output]");

        let stderr = execute_inline_commands("!`echo out; echo err >&2; exit 3`", temp.path(), TIMEOUT).await;
        assert_eq!(stderr, "out\n[stderr: err]");

        let timed_out =
            execute_inline_commands("!`sleep 5`", temp.path(), Duration::from_millis(200)).await;
        assert_eq!(timed_out, "[Command timed out: sleep 5]");
    }

    #[tokio::test]
    async fn test_inline_command_spawn_failure() {
        let missing = Path::new("/nonexistent/working/dir");
        let result = execute_inline_commands("!`echo hi`", missing, TIMEOUT).await;
        assert!(result.starts_with("[Error executing 'echo hi': "));
    }
}
