use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use quill_core::Store;
use quill_core::transfer::import_file;
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Backup produced by `quill export`.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Reject backups that fail the integrity checks.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    works: usize,
    chapters: usize,
    scenes: usize,
    blocks: usize,
    characters: usize,
}

/// Replace the whole state with the backup at `args.path`.
///
/// `strict_default` comes from `[import] strict` in the config file.
pub fn run_import(
    args: &ImportArgs,
    strict_default: bool,
    store: &mut Store,
    output: OutputMode,
) -> Result<()> {
    let strict = args.strict || strict_default;
    let action = import_file(&args.path, strict)
        .with_context(|| format!("import of {} failed", args.path.display()))?;
    store.dispatch(action);

    let state = store.state();
    let report = ImportReport {
        works: state.works.len(),
        chapters: state.chapters.len(),
        scenes: state.scenes.len(),
        blocks: state.blocks.len(),
        characters: state.characters.len(),
    };
    info!(path = %args.path.display(), strict, works = report.works, "imported backup");

    render(output, &report, |r, w| {
        writeln!(
            w,
            "imported {} work(s), {} chapter(s), {} scene(s), {} block(s), {} character(s)",
            r.works, r.chapters, r.scenes, r.blocks, r.characters
        )
    })
}
