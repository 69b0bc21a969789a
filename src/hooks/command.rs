//! Shell execution of command-kind hooks.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{HookContext, HookOutcome};

/// Exit status a command hook uses to block the action.
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Replace `${VAR}` and then `$VAR` for every variable, in order.
pub fn substitute_variables(template: &str, variables: &[(&'static str, String)]) -> String {
    let mut result = template.to_string();
    for (name, value) in variables {
        result = result
            .replace(&format!("${{{}}}", name), value)
            .replace(&format!("${}", name), value);
    }
    result
}

#[derive(serde::Serialize)]
struct InputPayload<'a> {
    hook_event_name: &'a str,
    session_id: &'a str,
    tool_name: &'a str,
    tool_input: &'a serde_json::Value,
    #[serde(skip_serializing_if = "is_empty")]
    tool_output: &'a str,
    cwd: String,
}

fn is_empty(s: &&str) -> bool {
    s.is_empty()
}

/// Run a command hook through `sh -c` in `cwd`.
///
/// Exit 0 continues, exit 2 blocks with stderr as the reason, anything else
/// (including spawn failures and timeouts) is an error.
pub async fn run_command_hook(
    event: &str,
    command: &str,
    timeout: Duration,
    context: &HookContext,
    cwd: &Path,
    variables: &[(&'static str, String)],
) -> HookOutcome {
    let command = substitute_variables(command, variables);

    let payload = InputPayload {
        hook_event_name: event,
        session_id: &context.session_id,
        tool_name: &context.tool_name,
        tool_input: &context.tool_input,
        tool_output: &context.tool_output,
        cwd: cwd.display().to_string(),
    };
    let input_json = serde_json::to_string(&payload).unwrap_or_default();

    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(&command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .current_dir(cwd)
        .envs(variables.iter().map(|(k, v)| (*k, v.as_str())))
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command = %command, error = %e, "Failed to spawn hook command");
            return HookOutcome::Error;
        }
    };

    let stdin = child.stdin.take();
    let run = async move {
        if let Some(mut stdin) = stdin {
            // Hooks that never read stdin close the pipe early.
            let _ = stdin.write_all(input_json.as_bytes()).await;
        }
        child.wait_with_output().await
    };

    let output = match tokio::time::timeout(timeout, run).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::warn!(command = %command, error = %e, "Hook command failed");
            return HookOutcome::Error;
        }
        Err(_) => {
            tracing::warn!(command = %command, timeout_secs = timeout.as_secs(), "Hook command timed out");
            return HookOutcome::Error;
        }
    };

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    match output.status.code() {
        Some(0) => {
            tracing::debug!(
                command = %command,
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "Hook command succeeded"
            );
            HookOutcome::Continue
        }
        Some(BLOCK_EXIT_CODE) => {
            let reason = if stderr.is_empty() {
                "Blocked by hook".to_string()
            } else {
                stderr
            };
            HookOutcome::block(reason)
        }
        code => {
            tracing::warn!(command = %command, exit_code = ?code, stderr = %stderr, "Hook command exited with error");
            HookOutcome::Error
        }
    }
}
