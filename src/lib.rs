//! Wrapper around the external `grepl` search tool.
//!
//! Builds grepl's command line from typed options, runs it without a shell,
//! and installs the bundled grepl script into a user binary directory.

pub mod args;
pub mod config;
pub mod error;
pub mod install;
pub mod paths;
pub mod process;
pub mod prompt;
pub mod runner;

// Re-export commonly used types
pub use args::{build_args, SearchOptions};
pub use config::Config;
pub use error::GreplError;
pub use install::{install, InstallOptions, InstallResult, Installer, SkipReason};
pub use process::{ProcessExecutor, ProcessOutput, SystemExecutor};
pub use prompt::{Confirm, ScriptedPrompt, TerminalPrompt};
pub use runner::{ExecutionResult, HelpOptions, Runner};

/// Run a search with the process-wide default configuration.
pub fn search(opts: &SearchOptions) -> Result<ExecutionResult, GreplError> {
    Runner::default().search(opts)
}

/// Fetch grepl's usage text. Never fails.
pub fn help(opts: &HelpOptions) -> ExecutionResult {
    Runner::default().help(opts)
}
