use anyhow::Result;
use grepl_wrap::{ExecutionResult, Runner, SearchOptions};
use std::io::{self, Write};

pub fn execute(opts: &SearchOptions, json: bool) -> Result<()> {
    let result = Runner::default().search(opts)?;
    print_result(&result, json)
}

/// Echo captured streams to the matching handles, or as one JSON object.
pub fn print_result(result: &ExecutionResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    io::stdout().write_all(result.stdout.as_bytes())?;
    io::stderr().write_all(result.stderr.as_bytes())?;
    Ok(())
}
