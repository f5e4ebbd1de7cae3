//! Runs grepl and normalizes its outcome.
//!
//! `search` fails on a non-zero exit unless the caller asked for suppressed
//! errors; `help` never fails because many tools exit non-zero after
//! printing usage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::args::{build_args, SearchOptions};
use crate::config::Config;
use crate::error::GreplError;
use crate::process::{ProcessExecutor, ProcessOutput, SystemExecutor};

/// Captured output of one grepl invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// Result for a failed run in suppressed mode: whatever the process
    /// produced, with the error text standing in for an empty stderr.
    fn from_failure(err: &GreplError) -> Self {
        let stdout = err.stdout().unwrap_or_default().to_string();
        let stderr = match err.stderr() {
            Some(stderr) if !stderr.is_empty() => stderr.to_string(),
            _ => error_chain(err),
        };
        Self { stdout, stderr }
    }
}

/// Render an error and its causes as `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<ProcessOutput> for ExecutionResult {
    fn from(output: ProcessOutput) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Options for fetching grepl's usage text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpOptions {
    pub grepl_cmd: Option<PathBuf>,
}

/// Invokes grepl through a [`ProcessExecutor`].
pub struct Runner {
    config: Config,
    executor: Box<dyn ProcessExecutor>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Config::load())
    }
}

impl Runner {
    /// Runner that spawns real processes.
    pub fn new(config: Config) -> Self {
        Self::with_executor(config, SystemExecutor)
    }

    pub fn with_executor(config: Config, executor: impl ProcessExecutor + 'static) -> Self {
        Self {
            config,
            executor: Box::new(executor),
        }
    }

    /// Run a search.
    ///
    /// # Errors
    ///
    /// - [`GreplError::InvalidInput`] for a blank query, before anything is spawned
    /// - [`GreplError::BufferExceeded`] when output passes the search cap
    /// - [`GreplError::SubprocessFailure`] / [`GreplError::Spawn`] unless
    ///   `suppress_errors` is set
    pub fn search(&self, opts: &SearchOptions) -> Result<ExecutionResult, GreplError> {
        let args = build_args(opts)?;
        let program = self.config.command_for(opts.grepl_cmd.as_deref());

        let outcome = self
            .executor
            .run(program, &args, self.config.search_max_buffer)
            .and_then(|output| {
                if output.success() {
                    Ok(output)
                } else {
                    Err(GreplError::SubprocessFailure {
                        program: program.to_path_buf(),
                        exit_code: output.exit_code,
                        stdout: output.stdout,
                        stderr: output.stderr,
                    })
                }
            });

        match outcome {
            Ok(output) => Ok(output.into()),
            Err(err @ GreplError::BufferExceeded { .. }) => Err(err),
            Err(err) if opts.suppress_errors => {
                tracing::debug!(%err, "suppressing grepl failure");
                Ok(ExecutionResult::from_failure(&err))
            }
            Err(err) => Err(err),
        }
    }

    /// Run grepl without arguments and return its usage text.
    pub fn help(&self, opts: &HelpOptions) -> ExecutionResult {
        let program = self.config.command_for(opts.grepl_cmd.as_deref());

        match self
            .executor
            .run(program, &[], self.config.help_max_buffer)
        {
            Ok(output) => {
                if !output.success() {
                    tracing::debug!(code = ?output.exit_code, "grepl usage exited non-zero");
                }
                output.into()
            }
            Err(err) => {
                tracing::debug!(%err, "grepl usage failed");
                ExecutionResult::from_failure(&err)
            }
        }
    }
}
