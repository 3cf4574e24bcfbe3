// src/command.rs

//! External command execution
//!
//! Commands run synchronously through `sh -c` with stdin closed and both
//! output streams captured. A non-zero exit is not an error at this level:
//! callers inspect [`CommandOutput::succeeded`] and decide.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Captured result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
}

impl CommandOutput {
    /// Output of a command that exited with code 0
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            status: Some(0),
        }
    }

    /// Output of a command that exited with `code`
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            status: Some(code),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }

    /// Convert an unsuccessful run into `Error::CommandFailed`
    pub fn check(self, command: &str) -> Result<Self> {
        if self.succeeded() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: command.to_string(),
                code: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs shell command lines
pub trait CommandRunner {
    /// Report `description`, run `command` and capture its output
    ///
    /// Only a failure to start the shell is an `Err`.
    fn run(&self, description: &str, command: &str, cwd: Option<&Path>) -> Result<CommandOutput>;
}

/// Runs commands through `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, description: &str, command: &str, cwd: Option<&Path>) -> Result<CommandOutput> {
        info!("{}", description);
        debug!("Executing: {}", command);

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| Error::CommandSpawn {
            command: command.to_string(),
            source,
        })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
        };
        if !result.succeeded() {
            debug!("'{}' exited with {:?}", command, result.status);
        }
        Ok(result)
    }
}

/// Quote a string as a single shell word
pub fn shell_quote(word: &str) -> String {
    if !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@/._-+:=,".contains(c))
    {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}
