//! Command Resolution Tests
//!
//! The three-stage prompt pipeline: arguments, `@file` references and
//! inline shell commands.
//!
//! Run: cargo nextest run --test command_resolution_tests

use std::time::Duration;

use claude_bridge::{Command, CommandExecutor};
use tempfile::tempdir;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Argument substitution
// =============================================================================

mod argument_tests {
    use super::*;

    #[tokio::test]
    async fn test_arguments_and_positionals() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("hello", "Hello $ARGUMENTS, arg1=$1");

        let prompt = executor.prepare_prompt(&command, &args(&["world", "x"])).await;
        assert_eq!(prompt, "Hello world x, arg1=world");
    }

    #[tokio::test]
    async fn test_no_arguments_leaves_no_positionals() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("all", "$1 $2 $3 $4 $5 $6 $7 $8 $9 [$ARGUMENTS]");

        let prompt = executor.prepare_prompt(&command, &[]).await;
        for i in 1..=9 {
            assert!(!prompt.contains(&format!("${i}")));
        }
        assert_eq!(prompt.trim(), "[]");
    }
}

// =============================================================================
// File references
// =============================================================================

mod file_reference_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_marker() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("read", "Look at @missing.txt please");

        let prompt = executor.prepare_prompt(&command, &[]).await;
        assert!(prompt.contains("[File not found: missing.txt]"));
    }

    #[tokio::test]
    async fn test_file_inlined_by_reference() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), "pub fn answer() -> u32 { 42 }").unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("explain", "Explain @$1");

        let prompt = executor.prepare_prompt(&command, &args(&["src/lib.rs"])).await;
        assert_eq!(
            prompt,
            "Explain \n--- Content of src/lib.rs ---\npub fn answer() -> u32 { 42 }\n--- End of src/lib.rs ---\n"
        );
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bridge-fixture-dir")).unwrap();
        let executor = CommandExecutor::new(dir.path());

        let prompt = executor
            .prepare_prompt(&Command::new("d", "See @bridge-fixture-dir"), &[])
            .await;
        assert_eq!(prompt, "See [File not found: bridge-fixture-dir]");
    }
}

// =============================================================================
// Inline commands
// =============================================================================

mod inline_command_tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_replaced() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("hi", "Output: !`echo hi`");

        let prompt = executor.prepare_prompt(&command, &[]).await;
        assert!(prompt.contains("hi"));
        assert!(!prompt.contains('`'));
        assert_eq!(prompt, "Output: hi");
    }

    #[tokio::test]
    async fn test_runs_in_project_root() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let executor = CommandExecutor::new(dir.path());

        let prompt = executor
            .prepare_prompt(&Command::new("ls", "!`ls`"), &[])
            .await;
        assert_eq!(prompt, "marker.txt");
    }

    #[tokio::test]
    async fn test_timeout_and_empty_output() {
        let dir = tempdir().unwrap();
        let executor =
            CommandExecutor::new(dir.path()).with_inline_timeout(Duration::from_millis(200));
        let command = Command::new("slow", "A: !`sleep 5` B: !`true`");

        let prompt = executor.prepare_prompt(&command, &[]).await;
        assert_eq!(prompt, "A: [Command timed out: sleep 5] B: [no output]");
    }

    #[tokio::test]
    async fn test_argument_feeds_inline_command() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("count", "!`printf '%s' $1 | wc -c | tr -d ' '`");

        let prompt = executor.prepare_prompt(&command, &args(&["abcd"])).await;
        assert_eq!(prompt, "4");
    }
}

// =============================================================================
// Formatting
// =============================================================================

mod formatting_tests {
    use super::*;

    #[tokio::test]
    async fn test_header_and_body() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());
        let command = Command::new("ship", "Ship $1")
            .with_allowed_tools(args(&["Read", "Bash(git push:*)"]))
            .with_disallowed_tools(args(&["Write"]))
            .with_model("opus");

        let formatted = executor.format_for_agent(&command, &args(&["v2"])).await;
        assert_eq!(
            formatted,
            "# Executing Command: /ship\n\n\
             **Allowed Tools**: Read\n\
             **Tool Patterns**: Bash(git push:*)\n\
             **Disallowed Tools**: Write\n\
             **Preferred Model**: opus\n\
             \n---\n\nShip v2"
        );
    }

    #[tokio::test]
    async fn test_minimal_header() {
        let dir = tempdir().unwrap();
        let executor = CommandExecutor::new(dir.path());

        let formatted = executor
            .format_for_agent(&Command::new("plain", "Body"), &[])
            .await;
        assert_eq!(formatted, "# Executing Command: /plain\n\n\n---\n\nBody");
    }
}
