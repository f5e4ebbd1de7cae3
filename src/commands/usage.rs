use anyhow::Result;
use grepl_wrap::{HelpOptions, Runner};
use std::path::PathBuf;

pub fn execute(grepl_cmd: Option<PathBuf>, json: bool) -> Result<()> {
    let result = Runner::default().help(&HelpOptions { grepl_cmd });
    super::search::print_result(&result, json)
}
