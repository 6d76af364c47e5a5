//! Shell command execution

use crate::config::Runner;
use crate::env::{process_env, EnvTable};
use crate::error::{Error, Result};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Runs catalog commands through the configured shell prefix.
///
/// Child processes share the terminal: stdin, stdout and stderr are inherited.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    runner: Runner,
    env: Arc<EnvTable>,
}

impl CommandRunner {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            env: process_env(),
        }
    }

    /// Expand `$NAME` in commands from `env` instead of the process snapshot
    pub fn with_env(mut self, env: Arc<EnvTable>) -> Self {
        self.env = env;
        self
    }

    /// Expand and run a single command to completion.
    ///
    /// Only the command string is expanded; the runner prefix is passed as is.
    pub async fn run(&self, command: &str) -> Result<()> {
        let expanded = self.env.expand(command);
        tracing::debug!(
            "Running {} {:?} {:?}",
            self.runner.command,
            self.runner.args,
            expanded
        );

        let status = Command::new(&self.runner.command)
            .args(&self.runner.args)
            .arg(&expanded)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::command_execution(&expanded, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::command_execution(expanded, status))
        }
    }

    /// Run commands in order, continuing past failures.
    ///
    /// Returns the failures; an empty vector means every command succeeded.
    pub async fn run_all<S: AsRef<str>>(&self, commands: &[S]) -> Vec<Error> {
        let mut failures = Vec::new();

        for command in commands {
            if let Err(e) = self.run(command.as_ref()).await {
                tracing::warn!("{}", e);
                failures.push(e);
            }
        }

        failures
    }
}
