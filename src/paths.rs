//! Filesystem locations used by the runner and the installer.
//!
//! ```text
//! ~/.local/bin/grepl                      # default install destination
//! <exe dir>/../share/grepl-wrap/grepl     # bundle next to an installed binary
//! <source checkout>/bin/grepl             # bundle in a source checkout
//! ```

use std::path::{Path, PathBuf};

/// Default name of the installed script.
pub const GREPL_FILE_NAME: &str = "grepl";

/// Overrides the bundled script location.
pub const BUNDLE_ENV_VAR: &str = "GREPL_BUNDLE";

/// Per-user binary directory: `~/.local/bin`
pub fn user_bin_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("bin")
}

/// Places a bundled `grepl` script may live, in lookup order.
pub fn bundle_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = std::env::var_os(BUNDLE_ENV_VAR).filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(path));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(
            exe_dir
                .join("..")
                .join("share")
                .join(env!("CARGO_PKG_NAME"))
                .join(GREPL_FILE_NAME),
        );
    }

    candidates.push(source_bundle());
    candidates
}

/// The script shipped in this crate's source tree: `<manifest dir>/bin/grepl`
pub fn source_bundle() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("bin")
        .join(GREPL_FILE_NAME)
}

/// First candidate that exists as a regular file.
pub fn find_bundle(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

/// Expand `~` and `$VAR` in a user-supplied path.
///
/// Unknown variables leave the input untouched.
pub fn expand_user_path(raw: &Path) -> PathBuf {
    let Some(text) = raw.to_str() else {
        return raw.to_path_buf();
    };
    match shellexpand::full(text) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            tracing::debug!(path = text, %err, "leaving path unexpanded");
            raw.to_path_buf()
        }
    }
}
