//! Typed external-command execution.

use std::ffi::OsStr;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Captured result of an external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout and stderr concatenated, trimmed. Some interpreters report
    /// their version on stderr, so callers usually want both streams.
    pub fn combined(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.stdout);
        out.push_str(&self.stderr);
        out.trim().to_string()
    }
}

/// Run a program to completion and capture its output. The call blocks the
/// current task until the child exits; there is no timeout and no overlap
/// between external calls.
pub async fn run(program: &Path, args: &[&OsStr]) -> std::io::Result<CommandOutput> {
    debug!(program = %program.display(), ?args, "Running external command");

    let output = Command::new(program).args(args).output().await?;

    let result = CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    debug!(exit_code = result.exit_code, "Command completed");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let shell = PathBuf::from("/bin/sh");
        let output = run(&shell, &["-c".as_ref(), "echo hello".as_ref()])
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.combined(), "hello");
    }

    #[tokio::test]
    async fn reports_failure_exit_code() {
        let shell = PathBuf::from("/bin/sh");
        let output = run(&shell, &["-c".as_ref(), "exit 3".as_ref()])
            .await
            .unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let missing = PathBuf::from("/nonexistent/binary");
        assert!(run(&missing, &[]).await.is_err());
    }
}
