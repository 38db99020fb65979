//! Mailfeed CLI: `ingest` a mail tree into the index, or `search` it.

use anyhow::Result;
use clap::Parser;
use mailfeed::engine::arg_parser::Cli;
use mailfeed::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
