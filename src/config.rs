use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::paths;

/// Environment variable overriding the grepl command path.
pub const COMMAND_ENV_VAR: &str = "GREPL_CMD";

/// Capture cap per stream for search output: 10 MiB.
pub const SEARCH_MAX_BUFFER: usize = 10 * 1024 * 1024;

/// Capture cap per stream for usage text: 2 MiB.
pub const HELP_MAX_BUFFER: usize = 2 * 1024 * 1024;

/// Runtime configuration for invoking grepl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Command used when a call carries no override
    pub command: PathBuf,
    pub search_max_buffer: usize,
    pub help_max_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_command(default_command().to_path_buf())
    }
}

impl Config {
    /// Load configuration from the environment, resolving the command once
    /// per process.
    pub fn load() -> Self {
        Self::default()
    }

    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            search_max_buffer: SEARCH_MAX_BUFFER,
            help_max_buffer: HELP_MAX_BUFFER,
        }
    }

    /// The command for a call: the per-call override wins over the default.
    pub fn command_for<'a>(&'a self, overridden: Option<&'a Path>) -> &'a Path {
        overridden
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(self.command.as_path())
    }
}

static DEFAULT_COMMAND: OnceLock<PathBuf> = OnceLock::new();

/// Process-wide default grepl command, resolved on first use.
pub fn default_command() -> &'static Path {
    DEFAULT_COMMAND.get_or_init(|| {
        let env_value = std::env::var_os(COMMAND_ENV_VAR).map(PathBuf::from);
        let command = resolve_command(env_value, &paths::bundle_candidates());
        tracing::debug!(command = %command.display(), "resolved default grepl command");
        command
    })
}

/// Resolution order: environment override, bundled copy on disk, `grepl` on
/// `PATH`, then the bare name so the spawn error names what was missing.
pub fn resolve_command(env_value: Option<PathBuf>, bundle_candidates: &[PathBuf]) -> PathBuf {
    if let Some(command) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        return command;
    }

    if let Some(bundled) = paths::find_bundle(bundle_candidates) {
        return bundled;
    }

    which::which(paths::GREPL_FILE_NAME).unwrap_or_else(|_| PathBuf::from(paths::GREPL_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        let bundled = temp_dir.path().join("grepl");
        std::fs::write(&bundled, "#!/bin/sh\n").unwrap();

        let command = resolve_command(Some(PathBuf::from("/opt/grepl")), &[bundled]);
        assert_eq!(command, PathBuf::from("/opt/grepl"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let bundled = temp_dir.path().join("grepl");
        std::fs::write(&bundled, "#!/bin/sh\n").unwrap();

        let command = resolve_command(Some(PathBuf::new()), &[bundled.clone()]);
        assert_eq!(command, bundled);
    }

    #[test]
    fn test_falls_back_to_path_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let command = resolve_command(None, &[temp_dir.path().join("missing")]);

        // Either a PATH hit or the bare name
        assert_eq!(command.file_name().unwrap(), "grepl");
    }

    #[test]
    fn test_per_call_override() {
        let config = Config::with_command("/usr/bin/grepl");

        assert_eq!(config.command_for(None), Path::new("/usr/bin/grepl"));
        assert_eq!(
            config.command_for(Some(Path::new("./my-grepl"))),
            Path::new("./my-grepl")
        );
        assert_eq!(
            config.command_for(Some(Path::new(""))),
            Path::new("/usr/bin/grepl")
        );
    }

    #[test]
    fn test_default_command_is_stable() {
        assert_eq!(default_command(), default_command());
        assert_eq!(Config::load().search_max_buffer, SEARCH_MAX_BUFFER);
        assert_eq!(Config::load().help_max_buffer, HELP_MAX_BUFFER);
    }
}
