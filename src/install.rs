//! Copies the bundled grepl script into a user binary directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GreplError;
use crate::paths;
use crate::prompt::{Confirm, TerminalPrompt};

/// Mode applied to the installed script: rwxr-xr-x
pub const INSTALLED_MODE: u32 = 0o755;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Destination directory. Defaults to `~/.local/bin`.
    pub dest_dir: Option<PathBuf>,
    /// Installed file name. Defaults to `grepl`.
    pub file_name: Option<String>,
    /// Overwrite an existing file without asking.
    pub force: bool,
    /// Fail instead of prompting when the destination exists.
    pub non_interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UserDeclined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallResult {
    pub installed: bool,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
}

impl InstallResult {
    fn installed(path: PathBuf) -> Self {
        Self {
            installed: true,
            path,
            skipped: false,
            reason: None,
        }
    }

    fn skipped(path: PathBuf, reason: SkipReason) -> Self {
        Self {
            installed: false,
            path,
            skipped: true,
            reason: Some(reason),
        }
    }
}

/// Installs the bundled script, asking through a [`Confirm`] port before
/// overwriting.
pub struct Installer<C: Confirm> {
    prompt: C,
    bundle_candidates: Vec<PathBuf>,
}

impl Installer<TerminalPrompt> {
    /// Installer that prompts on the terminal and searches the default
    /// bundle locations.
    pub fn interactive() -> Self {
        Self::new(TerminalPrompt)
    }
}

impl<C: Confirm> Installer<C> {
    pub fn new(prompt: C) -> Self {
        Self {
            prompt,
            bundle_candidates: paths::bundle_candidates(),
        }
    }

    /// Replace the locations searched for the bundled script.
    pub fn with_bundle_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.bundle_candidates = candidates;
        self
    }

    pub fn prompt(&self) -> &C {
        &self.prompt
    }

    /// Install the bundled script.
    ///
    /// A declined overwrite is not an error: it returns a skipped result.
    ///
    /// # Errors
    ///
    /// - [`GreplError::BundleNotFound`] when no bundled script exists
    /// - [`GreplError::DestinationExists`] when the target exists, `force` is
    ///   unset and prompting is disabled
    /// - [`GreplError::PermissionDenied`] when the copy or chmod is refused
    pub fn install(&mut self, opts: &InstallOptions) -> Result<InstallResult, GreplError> {
        let dest_dir = opts
            .dest_dir
            .as_deref()
            .map(paths::expand_user_path)
            .unwrap_or_else(paths::user_bin_dir);
        let file_name = opts
            .file_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(paths::GREPL_FILE_NAME);
        let dest = dest_dir.join(file_name);

        let source = paths::find_bundle(&self.bundle_candidates).ok_or_else(|| {
            GreplError::BundleNotFound {
                searched: self.bundle_candidates.clone(),
            }
        })?;
        tracing::debug!(source = %source.display(), dest = %dest.display(), "installing grepl");

        // A broken directory surfaces as a clearer error on the copy below
        if let Err(err) = fs::create_dir_all(&dest_dir) {
            tracing::debug!(dir = %dest_dir.display(), %err, "could not create destination directory");
        }

        if dest.exists() && !opts.force {
            if opts.non_interactive {
                return Err(GreplError::DestinationExists { path: dest });
            }

            let question = format!("{} already exists. Overwrite? [y/N]", dest.display());
            let overwrite = self
                .prompt
                .confirm(&question)
                .map_err(GreplError::Prompt)?;
            if !overwrite {
                tracing::debug!(dest = %dest.display(), "overwrite declined");
                return Ok(InstallResult::skipped(dest, SkipReason::UserDeclined));
            }
        }

        if is_same_file(&source, &dest) {
            tracing::debug!(dest = %dest.display(), "destination is the bundle itself; skipping copy");
        } else {
            fs::copy(&source, &dest).map_err(|err| install_error(&dest, err))?;
        }
        make_executable(&dest).map_err(|err| install_error(&dest, err))?;

        Ok(InstallResult::installed(dest))
    }
}

/// Install with the terminal prompt and default bundle locations.
pub fn install(opts: &InstallOptions) -> Result<InstallResult, GreplError> {
    Installer::interactive().install(opts)
}

fn install_error(path: &Path, source: io::Error) -> GreplError {
    if source.kind() == io::ErrorKind::PermissionDenied {
        GreplError::PermissionDenied {
            path: path.to_path_buf(),
            source,
        }
    } else {
        GreplError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(INSTALLED_MODE))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
