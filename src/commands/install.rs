use anyhow::{Context, Result};
use colored::Colorize;
use grepl_wrap::{InstallOptions, Installer};

/// Treat every install as non-interactive when set.
pub const NONINTERACTIVE_ENV_VAR: &str = "GREPL_NONINTERACTIVE";

/// Whether `GREPL_NONINTERACTIVE` is set to a truthy value.
pub fn noninteractive_from_env() -> bool {
    std::env::var(NONINTERACTIVE_ENV_VAR)
        .map(|value| is_truthy(&value))
        .unwrap_or(false)
}

/// Empty, `0`, `false`, `no` and `off` count as unset.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "0"
        || ["false", "no", "off"]
            .iter()
            .any(|falsy| value.eq_ignore_ascii_case(falsy)))
}

pub fn execute(opts: &InstallOptions, json: bool) -> Result<()> {
    let result = Installer::interactive()
        .install(opts)
        .context("Failed to install grepl")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.installed {
        println!("{} Installed grepl to {}", "✓".green(), result.path.display());
        if let Some(dir) = result.path.parent() {
            if !on_path(dir) {
                println!(
                    "  {} {} is not on your PATH",
                    "note:".yellow(),
                    dir.display()
                );
            }
        }
    } else {
        println!("Skipped: {} was left unchanged", result.path.display());
    }

    Ok(())
}

fn on_path(dir: &std::path::Path) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|p| p == dir))
        .unwrap_or(false)
}
