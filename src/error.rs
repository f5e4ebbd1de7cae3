use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which captured stream overflowed its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GreplError {
    // Validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Subprocess
    #[error("failed to launch {}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", failure_message(.program, .exit_code, .stdout, .stderr))]
    SubprocessFailure {
        program: PathBuf,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("{stream} of {} exceeded the {limit} byte buffer", .program.display())]
    BufferExceeded {
        program: PathBuf,
        stream: Stream,
        limit: usize,
        stdout: String,
        stderr: String,
    },

    // Install
    #[error("bundled grepl script not found (searched: {})", join_paths(.searched))]
    BundleNotFound { searched: Vec<PathBuf> },

    #[error("{} already exists; pass --force to overwrite it", .path.display())]
    DestinationExists { path: PathBuf },

    #[error(
        "permission denied writing {}; choose a writable directory with --dest-dir or re-run with elevated privileges",
        .path.display()
    )]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read confirmation")]
    Prompt(#[source] std::io::Error),
}

impl GreplError {
    /// Exit code of the external tool, when it ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::SubprocessFailure { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Raw stdout captured before the failure, if any was produced.
    pub fn stdout(&self) -> Option<&str> {
        match self {
            Self::SubprocessFailure { stdout, .. } | Self::BufferExceeded { stdout, .. } => {
                Some(stdout.as_str())
            }
            _ => None,
        }
    }

    /// Raw stderr captured before the failure, if any was produced.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::SubprocessFailure { stderr, .. } | Self::BufferExceeded { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}

fn failure_message(
    program: &std::path::Path,
    exit_code: &Option<i32>,
    stdout: &str,
    stderr: &str,
) -> String {
    let mut message = match *exit_code {
        Some(code) => format!("grepl failed: {} exited with status {}", program.display(), code),
        None => format!("grepl failed: {} was terminated by a signal", program.display()),
    };
    if !stdout.is_empty() {
        message.push_str("\nSTDOUT:\n");
        message.push_str(stdout);
    }
    if !stderr.is_empty() {
        message.push_str("\nSTDERR:\n");
        message.push_str(stderr);
    }
    message
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_includes_labeled_streams() {
        let err = GreplError::SubprocessFailure {
            program: PathBuf::from("grepl"),
            exit_code: Some(2),
            stdout: "partial".to_string(),
            stderr: "boom".to_string(),
        };

        let message = err.to_string();
        assert!(message.starts_with("grepl failed: grepl exited with status 2"));
        assert!(message.contains("\nSTDOUT:\npartial"));
        assert!(message.contains("\nSTDERR:\nboom"));
        assert_eq!(err.exit_code(), Some(2));
        assert_eq!(err.stdout(), Some("partial"));
        assert_eq!(err.stderr(), Some("boom"));
    }

    #[test]
    fn test_failure_message_omits_empty_streams() {
        let err = GreplError::SubprocessFailure {
            program: PathBuf::from("grepl"),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };

        let message = err.to_string();
        assert!(message.contains("terminated by a signal"));
        assert!(!message.contains("STDOUT"));
        assert!(!message.contains("STDERR"));
        assert_eq!(err.exit_code(), None);
    }

    #[test]
    fn test_permission_denied_keeps_source() {
        use std::error::Error;

        let err = GreplError::PermissionDenied {
            path: PathBuf::from("/usr/local/bin/grepl"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        assert!(err.to_string().contains("--dest-dir"));
        assert!(err.source().is_some());
        assert_eq!(err.exit_code(), None);
    }
}
