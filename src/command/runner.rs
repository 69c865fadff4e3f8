//! Subprocess invocation
//!
//! Runs the configured program to completion on tokio's process driver and
//! captures both output streams. The calling task is suspended until the
//! child exits; other tasks keep running.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use hyper::body::Bytes;
use tokio::process::Command;

use super::error::ExecError;
use crate::config::CommandConfig;

/// What to run for each request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

/// Result of one finished invocation
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Bytes,
    pub stderr: Bytes,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn from_config(config: &CommandConfig) -> Self {
        let mut spec = Self::new(config.program.as_str()).args(config.args.iter().cloned());
        spec.working_dir = config.working_dir.as_ref().map(PathBuf::from);
        spec
    }

    /// Run the command once and wait for it to exit.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::status`]. The child inherits our environment,
    /// gets no stdin, and is not killed if this future is dropped.
    pub async fn run(&self) -> Result<CommandOutput, ExecError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| ExecError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ExecError::Wait {
                program: self.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            status: output.status,
            stdout: Bytes::from(output.stdout),
            stderr: Bytes::from(output.stderr),
        })
    }
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Exit code, `None` when the child was killed by a signal
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandSpec {
        CommandSpec::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let output = shell("printf ready; printf oops >&2").run().await.unwrap();
        assert!(output.success());
        assert_eq!(output.exit_code(), Some(0));
        assert_eq!(&output.stdout[..], b"ready");
        assert_eq!(&output.stderr[..], b"oops");
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_output() {
        let output = shell("printf partial; exit 3").run().await.unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code(), Some(3));
        assert_eq!(&output.stdout[..], b"partial");
    }

    #[tokio::test]
    async fn test_binary_stdout_is_untouched() {
        let output = shell(r"printf '\000\377\n'").run().await.unwrap();
        assert_eq!(&output.stdout[..], &[0x00, 0xff, b'\n']);
    }

    #[tokio::test]
    async fn test_stdin_is_closed() {
        // `cat` would block forever on an inherited terminal
        let output = CommandSpec::new("cat").run().await.unwrap();
        assert!(output.success());
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let mut spec = shell("cat marker.txt");
        spec.working_dir = Some(dir.path().to_path_buf());

        let output = spec.run().await.unwrap();
        assert_eq!(&output.stdout[..], b"here");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = CommandSpec::new("/nonexistent/exec_relay/bin/server")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
        assert!(err
            .to_string()
            .starts_with("failed to spawn `/nonexistent/exec_relay/bin/server`"));
    }

    #[test]
    fn test_from_config() {
        let config = CommandConfig {
            program: "sh".to_string(),
            args: vec!["bin/server".to_string()],
            working_dir: Some("/srv".to_string()),
        };
        let spec = CommandSpec::from_config(&config);
        assert_eq!(spec, CommandSpec {
            program: "sh".to_string(),
            args: vec!["bin/server".to_string()],
            working_dir: Some(PathBuf::from("/srv")),
        });
    }
}
