use std::io::{self, Write};

use anyhow::Result;
use quill_core::model::{DocumentRef, State};
use serde::Serialize;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub active_work_id: Option<String>,
    pub active_document: Option<String>,
    pub works: Vec<WorkSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSummary {
    pub id: String,
    pub title: String,
    pub characters: usize,
    pub chapters: Vec<ChapterSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: String,
    pub title: String,
    pub blocks: usize,
    pub scenes: Vec<SceneSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub id: String,
    pub title: String,
    pub blocks: usize,
}

pub fn summarize(state: &State) -> Summary {
    let works = state
        .works_sorted()
        .into_iter()
        .map(|work| WorkSummary {
            id: work.id.to_string(),
            title: work.title.clone(),
            characters: state.characters_of(&work.id).len(),
            chapters: state
                .chapters_of(&work.id)
                .into_iter()
                .map(|chapter| ChapterSummary {
                    id: chapter.id.to_string(),
                    title: chapter.title.clone(),
                    blocks: state
                        .blocks_of(&DocumentRef::Chapter(chapter.id.clone()))
                        .len(),
                    scenes: state
                        .scenes_of(&chapter.id)
                        .into_iter()
                        .map(|scene| SceneSummary {
                            id: scene.id.to_string(),
                            title: scene.title.clone(),
                            blocks: state
                                .blocks_of(&DocumentRef::Scene(scene.id.clone()))
                                .len(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Summary {
        active_work_id: state.active_work_id.as_ref().map(ToString::to_string),
        active_document: state.active_document_id.as_ref().map(ToString::to_string),
        works,
    }
}

fn write_text(summary: &Summary, w: &mut dyn Write) -> io::Result<()> {
    for work in &summary.works {
        writeln!(w, "work\t{}\t{}", work.id, work.title)?;
        for chapter in &work.chapters {
            writeln!(w, "chapter\t{}\t{}", chapter.id, chapter.title)?;
            for scene in &chapter.scenes {
                writeln!(w, "scene\t{}\t{}", scene.id, scene.title)?;
            }
        }
    }
    Ok(())
}

fn write_pretty(summary: &Summary, w: &mut dyn Write) -> io::Result<()> {
    if summary.works.is_empty() {
        return writeln!(w, "No works yet.");
    }
    for work in &summary.works {
        let marker = if summary.active_work_id.as_deref() == Some(work.id.as_str()) {
            " (active)"
        } else {
            ""
        };
        pretty_section(w, &format!("{}{marker}", work.title))?;
        pretty_kv(w, "id", &work.id)?;
        pretty_kv(w, "characters", work.characters.to_string())?;
        for chapter in &work.chapters {
            writeln!(w, "  {} [{} blocks]  {}", chapter.title, chapter.blocks, chapter.id)?;
            for scene in &chapter.scenes {
                writeln!(w, "    {} [{} blocks]  {}", scene.title, scene.blocks, scene.id)?;
            }
        }
        writeln!(w)?;
    }
    if let Some(doc) = &summary.active_document {
        pretty_kv(w, "editing", doc)?;
    }
    Ok(())
}

pub fn run_show(state: &State, output: OutputMode) -> Result<()> {
    let summary = summarize(state);
    render_mode(output, &summary, write_text, write_pretty)
}
