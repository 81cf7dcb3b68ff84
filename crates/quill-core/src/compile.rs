//! Plain-text manuscript assembly and the per-document outline.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{BlockId, BlockKind, ChapterId, DocumentRef, SceneId, State, WorkId};

/// Which chapter headers and which scenes go into a compile.
///
/// A selected chapter contributes only its title; scene prose comes from
/// selected scenes. Chapter-level blocks never compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub chapters: BTreeSet<ChapterId>,
    pub scenes: BTreeSet<SceneId>,
}

impl Selection {
    /// Every chapter header and every scene of `work`.
    #[must_use]
    pub fn whole_work(state: &State, work: &WorkId) -> Self {
        let mut selection = Self::default();
        for chapter in state.chapters_of(work) {
            selection.select_chapter(state, &chapter.id);
        }
        selection
    }

    /// Include a chapter's header and all of its scenes.
    pub fn select_chapter(&mut self, state: &State, chapter: &ChapterId) {
        self.chapters.insert(chapter.clone());
        self.scenes
            .extend(state.scenes_of(chapter).into_iter().map(|s| s.id.clone()));
    }

    /// Drop a chapter's header and all of its scenes.
    pub fn deselect_chapter(&mut self, state: &State, chapter: &ChapterId) {
        self.chapters.remove(chapter);
        for scene in state.scenes_of(chapter) {
            self.scenes.remove(&scene.id);
        }
    }

    /// Flip one scene; returns whether it is now selected.
    pub fn toggle_scene(&mut self, scene: &SceneId) -> bool {
        if self.scenes.remove(scene) {
            false
        } else {
            self.scenes.insert(scene.clone());
            true
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty() && self.scenes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Leave black lenses out of the text.
    pub skip_hidden_lenses: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            skip_hidden_lenses: true,
        }
    }
}

/// Assemble the selected parts of `work` into plain text.
///
/// Chapters appear in order when their header or any of their scenes is
/// selected. Each non-blank block is followed by a blank line, selected
/// scenes in one chapter are separated by one more newline, and every
/// emitted chapter ends with a newline.
#[must_use]
pub fn compile_text(
    state: &State,
    work: &WorkId,
    selection: &Selection,
    options: CompileOptions,
) -> String {
    let mut text = String::new();

    for chapter in state.chapters_of(work) {
        let header = selection.chapters.contains(&chapter.id);
        let scenes: Vec<_> = state
            .scenes_of(&chapter.id)
            .into_iter()
            .filter(|s| selection.scenes.contains(&s.id))
            .collect();
        if !header && scenes.is_empty() {
            continue;
        }

        if header {
            text.push_str(&chapter.title);
            text.push_str("\n\n");
        }

        for (i, scene) in scenes.iter().enumerate() {
            let doc = DocumentRef::Scene(scene.id.clone());
            for block in state.blocks_of(&doc) {
                if options.skip_hidden_lenses && block.is_hidden_lens() {
                    continue;
                }
                if block.content.trim().is_empty() {
                    continue;
                }
                text.push_str(&block.content);
                text.push_str("\n\n");
            }
            if i + 1 < scenes.len() {
                text.push('\n');
            }
        }

        text.push('\n');
    }

    text
}

/// File name for a compiled work: title with non-alphanumerics replaced.
#[must_use]
pub fn compiled_file_name(title: &str, extension: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}_compiled.{extension}")
}

/// One block that carries an outline description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub block_id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub description: String,
    pub completed: bool,
}

/// Blocks of `doc` listed in the outline, in document order.
#[must_use]
pub fn outline(state: &State, doc: &DocumentRef) -> Vec<OutlineEntry> {
    state
        .blocks_of(doc)
        .into_iter()
        .filter_map(|block| {
            block.description.as_ref().map(|description| OutlineEntry {
                block_id: block.id.clone(),
                kind: block.kind,
                description: description.clone(),
                completed: block.completed,
            })
        })
        .collect()
}
