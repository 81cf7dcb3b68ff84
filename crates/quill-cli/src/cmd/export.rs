use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use quill_core::model::State;
use quill_core::transfer::export_json;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path (defaults to stdout).
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

pub fn run_export(args: &ExportArgs, state: &State) -> Result<()> {
    let json = export_json(state)?;

    if let Some(path) = &args.output {
        fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("exported {} work(s) to {}", state.works.len(), path.display());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{json}")?;
    Ok(())
}
