//! Translation of [`SearchOptions`] into grepl's command line.
//!
//! Tokens are handed to the subprocess directly (no shell), so the query is
//! passed through verbatim as a single argument.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GreplError;

/// Options for a single grepl search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub query: String,
    /// File or directory to search. Defaults to the current directory.
    pub target: Option<PathBuf>,
    /// Lines of context before each match (`-B`). Negative values are ignored.
    pub before: Option<i64>,
    /// Lines of context after each match (`-A`). Negative values are ignored.
    pub after: Option<i64>,
    pub recursive: bool,
    pub whole_word: bool,
    pub match_case: bool,
    pub fixed_strings: bool,
    /// Per-call override of the grepl command path.
    pub grepl_cmd: Option<PathBuf>,
    /// Return captured output instead of failing when grepl exits non-zero.
    pub suppress_errors: bool,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Build grepl arguments relative to the process working directory.
pub fn build_args(opts: &SearchOptions) -> Result<Vec<OsString>, GreplError> {
    validate(opts)?;
    let cwd = std::env::current_dir().map_err(|source| GreplError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    Ok(assemble(opts, &cwd))
}

/// Build grepl arguments with an explicit working directory.
pub fn build_args_in(opts: &SearchOptions, cwd: &Path) -> Result<Vec<OsString>, GreplError> {
    validate(opts)?;
    Ok(assemble(opts, cwd))
}

fn validate(opts: &SearchOptions) -> Result<(), GreplError> {
    if opts.query.trim().is_empty() {
        return Err(GreplError::InvalidInput(
            "query is required and must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

fn assemble(opts: &SearchOptions, cwd: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    if let Some(before) = opts.before.filter(|n| *n >= 0) {
        args.push("-B".into());
        args.push(before.to_string().into());
    }
    if let Some(after) = opts.after.filter(|n| *n >= 0) {
        args.push("-A".into());
        args.push(after.to_string().into());
    }
    if opts.recursive {
        args.push("-R".into());
    }
    if opts.whole_word {
        args.push("-w".into());
    }
    if opts.match_case {
        args.push("-c".into());
    }
    if opts.fixed_strings {
        args.push("-F".into());
    }

    args.push(opts.query.clone().into());

    let target = opts.target.as_deref().unwrap_or(Path::new("."));
    args.push(absolutize(cwd, target).into_os_string());

    args
}

/// Resolve `target` against `cwd` and fold `.`/`..` lexically.
///
/// Symlinks are left alone; the path does not have to exist.
pub fn absolutize(cwd: &Path, target: &Path) -> PathBuf {
    let joined = if target.is_absolute() {
        target.to_path_buf()
    } else {
        cwd.join(target)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, same as `cd /..`
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"C:\work\project")
        } else {
            PathBuf::from("/work/project")
        }
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_minimal_options() {
        let args = build_args_in(&SearchOptions::new("needle"), &cwd()).unwrap();
        let args = strings(&args);

        assert_eq!(args.len(), 2);
        assert_eq!(args[0], "needle");
        assert_eq!(PathBuf::from(&args[1]), cwd());
    }

    #[test]
    fn test_flags_in_fixed_order() {
        let opts = SearchOptions {
            query: "foo".to_string(),
            target: Some(PathBuf::from("src")),
            before: Some(2),
            after: Some(1),
            recursive: true,
            whole_word: true,
            match_case: true,
            fixed_strings: true,
            ..SearchOptions::default()
        };

        let args = strings(&build_args_in(&opts, &cwd()).unwrap());

        assert_eq!(
            &args[..9],
            &["-B", "2", "-A", "1", "-R", "-w", "-c", "-F", "foo"]
        );
        assert_eq!(PathBuf::from(&args[9]), cwd().join("src"));
    }

    #[test]
    fn test_before_precedes_query() {
        let mut opts = SearchOptions::new("foo");
        opts.before = Some(3);

        let args = strings(&build_args_in(&opts, &cwd()).unwrap());
        let query_at = args.iter().position(|a| a == "foo").unwrap();

        assert_eq!(args[query_at - 2], "-B");
        assert_eq!(args[query_at - 1], "3");
    }

    #[test]
    fn test_negative_context_is_ignored() {
        let mut opts = SearchOptions::new("foo");
        opts.before = Some(-1);
        opts.after = Some(-5);

        let args = strings(&build_args_in(&opts, &cwd()).unwrap());
        assert!(!args.contains(&"-B".to_string()));
        assert!(!args.contains(&"-A".to_string()));
    }

    #[test]
    fn test_zero_context_is_forwarded() {
        let mut opts = SearchOptions::new("foo");
        opts.after = Some(0);

        let args = strings(&build_args_in(&opts, &cwd()).unwrap());
        assert_eq!(&args[..2], &["-A", "0"]);
    }

    #[test]
    fn test_blank_query_is_rejected() {
        for query in ["", "   ", "\t\n"] {
            let err = build_args_in(&SearchOptions::new(query), &cwd()).unwrap_err();
            assert!(matches!(err, GreplError::InvalidInput(_)), "query {:?}", query);
        }
    }

    #[test]
    fn test_query_is_passed_verbatim() {
        let opts = SearchOptions::new("  $(rm -rf /); echo 'x' ");
        let args = strings(&build_args_in(&opts, &cwd()).unwrap());
        assert_eq!(args[0], "  $(rm -rf /); echo 'x' ");
    }

    #[test]
    fn test_target_is_always_absolute() {
        let targets = ["src", "./src/../lib", "..", "."];
        for target in targets {
            let mut opts = SearchOptions::new("foo");
            opts.target = Some(PathBuf::from(target));
            let args = build_args_in(&opts, &cwd()).unwrap();
            let last = PathBuf::from(args.last().unwrap());
            assert!(last.is_absolute(), "{} -> {}", target, last.display());
        }
    }

    #[test]
    fn test_absolutize_folds_dots() {
        assert_eq!(absolutize(&cwd(), Path::new("./src/../lib")), cwd().join("lib"));
        assert_eq!(
            absolutize(&cwd(), Path::new("..")),
            cwd().parent().unwrap().to_path_buf()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_target_kept() {
        assert_eq!(
            absolutize(Path::new("/work"), Path::new("/etc/./hosts")),
            PathBuf::from("/etc/hosts")
        );
        assert_eq!(absolutize(Path::new("/"), Path::new("../..")), PathBuf::from("/"));
    }
}
