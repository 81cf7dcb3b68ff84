use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use quill_core::compile::{CompileOptions, Selection, compile_text, compiled_file_name};
use quill_core::config::CompileConfig;
use quill_core::error::ErrorCode;
use quill_core::model::{ChapterId, SceneId, State, WorkId};
use serde::Serialize;

use crate::output::{CliError, OutputMode, render};

#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Work to compile.
    #[arg(long, value_name = "ID")]
    pub work: String,

    /// Include a chapter header and all of its scenes (repeatable).
    #[arg(long = "chapter", value_name = "ID")]
    pub chapters: Vec<String>,

    /// Include one scene's prose (repeatable).
    #[arg(long = "scene", value_name = "ID")]
    pub scenes: Vec<String>,

    /// Compile the whole work (the default when nothing is selected).
    #[arg(long)]
    pub all: bool,

    /// Keep hidden (black) lenses in the text.
    #[arg(long)]
    pub include_hidden: bool,

    /// Write to a file instead of stdout. A directory gets
    /// `<title>_compiled.txt` inside it.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Compiled {
    work_id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    text: String,
}

fn not_found(what: &str, id: &str) -> CliError {
    CliError::coded(ErrorCode::ItemNotFound, format!("{what} not found: {id}"))
}

/// Build the selection named by `args`, checking that every id belongs to
/// the work.
fn selection_for(state: &State, work: &WorkId, args: &CompileArgs) -> Result<Selection> {
    if args.all || (args.chapters.is_empty() && args.scenes.is_empty()) {
        return Ok(Selection::whole_work(state, work));
    }

    let mut selection = Selection::default();
    for raw in &args.chapters {
        let id = ChapterId::new(raw.as_str());
        match state.chapter(&id) {
            Some(chapter) if &chapter.work_id == work => selection.select_chapter(state, &id),
            _ => return Err(not_found("chapter", raw).into()),
        }
    }
    for raw in &args.scenes {
        let id = SceneId::new(raw.as_str());
        let in_work = state
            .scene(&id)
            .and_then(|scene| state.chapter(&scene.chapter_id))
            .is_some_and(|chapter| &chapter.work_id == work);
        if !in_work {
            return Err(not_found("scene", raw).into());
        }
        if !selection.scenes.contains(&id) {
            selection.toggle_scene(&id);
        }
    }
    Ok(selection)
}

fn target_path(output: &Path, title: &str) -> PathBuf {
    if output.is_dir() {
        output.join(compiled_file_name(title, "txt"))
    } else {
        output.to_path_buf()
    }
}

pub fn run_compile(
    args: &CompileArgs,
    config: &CompileConfig,
    state: &State,
    output: OutputMode,
) -> Result<()> {
    let work_id = WorkId::new(args.work.as_str());
    let work = state
        .work(&work_id)
        .ok_or_else(|| not_found("work", &args.work))?;

    let selection = selection_for(state, &work_id, args)?;
    let options = CompileOptions {
        skip_hidden_lenses: config.skip_hidden_lenses && !args.include_hidden,
    };
    let text = compile_text(state, &work_id, &selection, options);

    let path = args
        .output
        .as_ref()
        .map(|out| -> Result<PathBuf> {
            let path = target_path(out, &work.title);
            fs::write(&path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(path)
        })
        .transpose()?;

    let compiled = Compiled {
        work_id: work_id.to_string(),
        title: work.title.clone(),
        path,
        text,
    };
    render(output, &compiled, |c, w| {
        if let Some(path) = &c.path {
            return writeln!(w, "compiled {} to {}", c.title, path.display());
        }
        write!(w, "{}", c.text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::reducer::SequentialAllocator;
    use quill_core::seed::seed_state;

    fn args(work: &str) -> CompileArgs {
        CompileArgs {
            work: work.to_string(),
            chapters: Vec::new(),
            scenes: Vec::new(),
            all: false,
            include_hidden: false,
            output: None,
        }
    }

    #[test]
    fn no_selection_means_whole_work() {
        let state = seed_state(&mut SequentialAllocator::new("s"));
        let work = state.works[0].id.clone();
        let selection = selection_for(&state, &work, &args(work.as_str())).expect("selection");
        assert_eq!(selection, Selection::whole_work(&state, &work));
    }

    #[test]
    fn scene_outside_the_work_is_rejected() {
        let state = seed_state(&mut SequentialAllocator::new("s"));
        let work = state.works[0].id.clone();
        let mut a = args(work.as_str());
        a.scenes.push("nope".into());
        let err = selection_for(&state, &work, &a).expect_err("unknown scene");
        assert!(err.to_string().contains("scene not found: nope"));
    }

    #[test]
    fn scene_of_selected_chapter_stays_selected() {
        let state = seed_state(&mut SequentialAllocator::new("s"));
        let work = state.works[0].id.clone();
        let chapter = state.chapters_of(&work)[0].id.clone();
        let scene = state.scenes_of(&chapter)[0].id.clone();
        let mut a = args(work.as_str());
        a.chapters.push(chapter.to_string());
        a.scenes.push(scene.to_string());
        let selection = selection_for(&state, &work, &a).expect("selection");
        assert!(selection.scenes.contains(&scene));
    }

    #[test]
    fn directory_output_uses_title_file_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = target_path(dir.path(), "The Silent Echo");
        assert_eq!(path, dir.path().join("the_silent_echo_compiled.txt"));
    }
}
