//! Chapters and scenes: the document tree of a work.

use crate::action::{ChapterPatch, ScenePatch};
use crate::model::{
    Block, BlockId, BlockKind, Chapter, ChapterId, CharacterId, DocumentRef, Scene, SceneId,
    State, WorkId,
};

use super::Allocator;
use super::cascade::{self, Removal};
use super::order;

const DEFAULT_SCENE_TITLE: &str = "New Scene";

/// Create a chapter holding one empty scene with one empty text block.
pub fn add_chapter(state: &mut State, alloc: &mut dyn Allocator, work_id: &WorkId, title: String) {
    if state.work(work_id).is_none() {
        return;
    }
    let chapter = Chapter {
        id: ChapterId::new(alloc.next_id()),
        work_id: work_id.clone(),
        title,
        order: state.chapters_of(work_id).len(),
    };
    let chapter_id = chapter.id.clone();
    state.chapters.push(chapter);
    push_scene(state, alloc, &chapter_id, DEFAULT_SCENE_TITLE.to_string(), 0);

    state.active_work_id = Some(work_id.clone());
    state.active_document_id = Some(DocumentRef::Chapter(chapter_id));
}

/// Append a scene (with one empty text block) to a chapter.
pub fn add_scene(state: &mut State, alloc: &mut dyn Allocator, chapter_id: &ChapterId, title: String) {
    let Some(work_id) = state.chapter(chapter_id).map(|c| c.work_id.clone()) else {
        return;
    };
    let position = state.scenes_of(chapter_id).len();
    let scene_id = push_scene(state, alloc, chapter_id, title, position);

    state.active_work_id = Some(work_id);
    state.active_document_id = Some(DocumentRef::Scene(scene_id));
}

fn push_scene(
    state: &mut State,
    alloc: &mut dyn Allocator,
    chapter_id: &ChapterId,
    title: String,
    position: usize,
) -> SceneId {
    let scene = Scene {
        id: SceneId::new(alloc.next_id()),
        chapter_id: chapter_id.clone(),
        title,
        order: position,
        character_ids: Vec::new(),
        character_notes: std::collections::BTreeMap::new(),
    };
    let scene_id = scene.id.clone();
    state.scenes.push(scene);
    state.blocks.push(Block::empty(
        BlockId::new(alloc.next_id()),
        DocumentRef::Scene(scene_id.clone()),
        BlockKind::Text,
        0,
    ));
    scene_id
}

pub fn update_chapter(state: &mut State, patch: ChapterPatch) {
    let Some(chapter) = state.chapters.iter_mut().find(|c| c.id == patch.id) else {
        return;
    };
    if let Some(title) = patch.title {
        chapter.title = title;
    }
}

pub fn update_scene(state: &mut State, patch: ScenePatch) {
    let Some(scene) = state.scenes.iter_mut().find(|s| s.id == patch.id) else {
        return;
    };
    if let Some(title) = patch.title {
        scene.title = title;
    }
}

pub fn delete_chapter(state: &mut State, id: &ChapterId) {
    let Some(work_id) = state.chapter(id).map(|c| c.work_id.clone()) else {
        return;
    };
    let removal = Removal::chapter(state, id);
    cascade::apply(state, &removal);
    order::renumber(&mut state.chapters, |c| c.work_id == work_id);
}

pub fn delete_scene(state: &mut State, id: &SceneId) {
    let Some(chapter_id) = state.scene(id).map(|s| s.chapter_id.clone()) else {
        return;
    };
    let removal = Removal::scene(state, id);
    cascade::apply(state, &removal);
    order::renumber(&mut state.scenes, |s| s.chapter_id == chapter_id);
}

pub fn reorder_chapters(state: &mut State, work_id: &WorkId, start: usize, end: usize) {
    order::move_member(&mut state.chapters, |c| &c.work_id == work_id, start, end);
}

pub fn reorder_scenes(state: &mut State, chapter_id: &ChapterId, start: usize, end: usize) {
    order::move_member(&mut state.scenes, |s| &s.chapter_id == chapter_id, start, end);
}

/// Relocate a scene into `new_chapter_id` at `new_index`, closing the gap
/// it leaves behind.
pub fn move_scene(state: &mut State, scene_id: &SceneId, new_chapter_id: &ChapterId, new_index: usize) {
    let Some(target) = state.scenes.iter().position(|s| &s.id == scene_id) else {
        return;
    };
    let Some(new_work) = state.chapter(new_chapter_id).map(|c| c.work_id.clone()) else {
        return;
    };
    let old_chapter_id = std::mem::replace(&mut state.scenes[target].chapter_id, new_chapter_id.clone());

    if &old_chapter_id != new_chapter_id {
        order::renumber(&mut state.scenes, |s| s.chapter_id == old_chapter_id);
    }
    order::place(
        &mut state.scenes,
        |s| &s.chapter_id == new_chapter_id,
        target,
        new_index,
    );

    // The active scene may have crossed into another work.
    if state.active_document_id == Some(DocumentRef::Scene(scene_id.clone())) {
        state.active_work_id = Some(new_work);
    }
}

pub fn toggle_scene_character(state: &mut State, scene_id: &SceneId, character_id: CharacterId) {
    if state.character(&character_id).is_none() {
        return;
    }
    let Some(scene) = state.scenes.iter_mut().find(|s| &s.id == scene_id) else {
        return;
    };
    if let Some(i) = scene.character_ids.iter().position(|c| c == &character_id) {
        scene.character_ids.remove(i);
    } else {
        scene.character_ids.push(character_id);
    }
}

pub fn set_scene_character_note(
    state: &mut State,
    scene_id: &SceneId,
    character_id: CharacterId,
    note: String,
) {
    if state.character(&character_id).is_none() {
        return;
    }
    if let Some(scene) = state.scenes.iter_mut().find(|s| &s.id == scene_id) {
        scene.character_notes.insert(character_id, note);
    }
}
