use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use grepl_wrap::GreplError;
use tracing_subscriber::EnvFilter;

mod commands;

/// Environment variable holding the log filter
const LOG_ENV_VAR: &str = "GREPL_LOG";

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Run and install the grepl search tool", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search files with grepl
    Search {
        /// Text or pattern to search for. A leading '-' is accepted; put
        /// `--` first when the query looks like one of the flags below
        #[arg(allow_hyphen_values = true)]
        query: String,

        /// File or directory to search
        #[arg(default_value = ".")]
        target: PathBuf,

        /// Lines of context before each match
        #[arg(short = 'B', long, allow_negative_numbers = true)]
        before: Option<i64>,

        /// Lines of context after each match
        #[arg(short = 'A', long, allow_negative_numbers = true)]
        after: Option<i64>,

        /// Search directories recursively
        #[arg(short = 'R', long)]
        recursive: bool,

        /// Match whole words only
        #[arg(short = 'w', long)]
        whole_word: bool,

        /// Match case (grepl is case-insensitive by default)
        #[arg(short = 'c', long)]
        match_case: bool,

        /// Treat the query as a fixed string
        #[arg(short = 'F', long)]
        fixed_strings: bool,

        /// Path to the grepl executable
        #[arg(long, value_name = "PATH")]
        grepl_cmd: Option<PathBuf>,

        /// Print captured output instead of failing when grepl exits non-zero
        #[arg(long)]
        suppress_errors: bool,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show grepl's usage text
    Usage {
        /// Path to the grepl executable
        #[arg(long, value_name = "PATH")]
        grepl_cmd: Option<PathBuf>,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Install the bundled grepl script
    Install {
        /// Destination directory (default: ~/.local/bin)
        #[arg(long, value_name = "DIR")]
        dest_dir: Option<PathBuf>,

        /// Name of the installed file
        #[arg(long, default_value = "grepl")]
        file_name: String,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,

        /// Fail instead of prompting when the file exists
        #[arg(long)]
        non_interactive: bool,

        /// Output results as JSON
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            exit_code_for(&err)
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Search {
            query,
            target,
            before,
            after,
            recursive,
            whole_word,
            match_case,
            fixed_strings,
            grepl_cmd,
            suppress_errors,
            json,
        } => {
            let opts = grepl_wrap::SearchOptions {
                query,
                target: Some(target),
                before,
                after,
                recursive,
                whole_word,
                match_case,
                fixed_strings,
                grepl_cmd,
                suppress_errors,
            };
            commands::search::execute(&opts, json)?;
        }
        Commands::Usage { grepl_cmd, json } => {
            commands::usage::execute(grepl_cmd, json)?;
        }
        Commands::Install {
            dest_dir,
            file_name,
            force,
            non_interactive,
            json,
        } => {
            // JSON output implies no prompt, same as the env override
            let non_interactive = non_interactive
                || json
                || commands::install::noninteractive_from_env();
            let opts = grepl_wrap::InstallOptions {
                dest_dir,
                file_name: Some(file_name),
                force,
                non_interactive,
            };
            commands::install::execute(&opts, json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// grepl's own exit code when it failed, 1 for everything else.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let code = err
        .downcast_ref::<GreplError>()
        .and_then(GreplError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1);
    ExitCode::from(code)
}
