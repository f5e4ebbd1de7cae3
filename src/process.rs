//! Subprocess execution behind a trait so the runner can be tested without
//! a real grepl binary.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{GreplError, Stream};

/// Streams and exit status of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external command to completion and captures its output.
///
/// Implementations return `Ok` whenever the process ran, whatever its exit
/// status; interpreting the status belongs to the caller. `Err` is reserved
/// for launch failures and exceeded buffers.
pub trait ProcessExecutor: Send + Sync {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        max_buffer: usize,
    ) -> Result<ProcessOutput, GreplError>;
}

/// Production executor backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        max_buffer: usize,
    ) -> Result<ProcessOutput, GreplError> {
        tracing::debug!(program = %program.display(), ?args, "spawning");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GreplError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let io_err = |source: io::Error| GreplError::Io {
            path: program.to_path_buf(),
            source,
        };

        // Drain stderr on its own thread so a chatty stderr can't block the
        // child while we are reading stdout.
        let stderr_reader = child
            .stderr
            .take()
            .map(|pipe| thread::spawn(move || read_capped(pipe, max_buffer)));

        let stdout = match child.stdout.take() {
            Some(pipe) => read_capped(pipe, max_buffer),
            None => Ok(Captured::default()),
        };
        let stderr = match stderr_reader {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stderr reader panicked"))),
            None => Ok(Captured::default()),
        };

        let status = child.wait().map_err(io_err)?;
        let stdout = stdout.map_err(io_err)?;
        let stderr = stderr.map_err(io_err)?;

        let overflow = if stdout.exceeded {
            Some(Stream::Stdout)
        } else if stderr.exceeded {
            Some(Stream::Stderr)
        } else {
            None
        };
        if let Some(stream) = overflow {
            return Err(GreplError::BufferExceeded {
                program: program.to_path_buf(),
                stream,
                limit: max_buffer,
                stdout: stdout.text(),
                stderr: stderr.text(),
            });
        }

        tracing::debug!(program = %program.display(), code = ?status.code(), "exited");

        Ok(ProcessOutput {
            stdout: stdout.text(),
            stderr: stderr.text(),
            exit_code: status.code(),
        })
    }
}

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    exceeded: bool,
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Read at most `cap` bytes, then discard the rest of the stream.
///
/// The remainder is drained rather than abandoned so the writer never blocks
/// on a full pipe.
fn read_capped<R: Read>(mut reader: R, cap: usize) -> io::Result<Captured> {
    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take((cap as u64).saturating_add(1))
        .read_to_end(&mut bytes)?;

    let exceeded = bytes.len() > cap;
    if exceeded {
        bytes.truncate(cap);
        io::copy(&mut reader, &mut io::sink())?;
    }

    Ok(Captured { bytes, exceeded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_capped_under_limit() {
        let captured = read_capped(Cursor::new(b"hello".to_vec()), 10).unwrap();
        assert_eq!(captured.text(), "hello");
        assert!(!captured.exceeded);
    }

    #[test]
    fn test_read_capped_exact_limit_is_not_exceeded() {
        let captured = read_capped(Cursor::new(b"hello".to_vec()), 5).unwrap();
        assert_eq!(captured.text(), "hello");
        assert!(!captured.exceeded);
    }

    #[test]
    fn test_read_capped_over_limit_truncates_and_drains() {
        let mut cursor = Cursor::new(vec![b'x'; 4096]);
        let captured = read_capped(&mut cursor, 16).unwrap();

        assert!(captured.exceeded);
        assert_eq!(captured.bytes.len(), 16);
        assert_eq!(cursor.position(), 4096);
    }

    #[test]
    fn test_read_capped_unbounded() {
        let captured = read_capped(Cursor::new(b"usage".to_vec()), usize::MAX).unwrap();
        assert_eq!(captured.text(), "usage");
        assert!(!captured.exceeded);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = SystemExecutor
            .run(
                Path::new("/nonexistent/definitely-not-grepl"),
                &[],
                1024,
            )
            .unwrap_err();
        assert!(matches!(err, GreplError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_captures_both_streams() {
        let args: Vec<OsString> = vec!["-c".into(), "echo out; echo err >&2; exit 3".into()];
        let output = SystemExecutor.run(Path::new("sh"), &args, 1024).unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_reports_overflow() {
        let args: Vec<OsString> = vec!["-c".into(), "yes | head -c 100000".into()];
        let err = SystemExecutor.run(Path::new("sh"), &args, 1000).unwrap_err();

        match err {
            GreplError::BufferExceeded {
                stream,
                limit,
                stdout,
                ..
            } => {
                assert_eq!(stream, Stream::Stdout);
                assert_eq!(limit, 1000);
                assert_eq!(stdout.len(), 1000);
            }
            other => panic!("expected BufferExceeded, got {:?}", other),
        }
    }
}
