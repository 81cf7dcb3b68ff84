//! The reducer: the single authority for every state change.
//!
//! [`reduce`] maps `(State, Action)` to the next `State`. It is total over
//! [`Action`]: an action naming an entity that no longer exists is a no-op
//! and returns the state unchanged. Handlers validate every id they need
//! before touching the state, so a rejected action never leaves a partial
//! edit behind.
//!
//! Fresh ids and timestamps are drawn from an [`Allocator`]. [`reduce`]
//! uses [`SystemAllocator`] (UUID v4, wall clock); tests pass a
//! [`SequentialAllocator`] to [`reduce_with`] for predictable ids.

mod blocks;
pub mod cascade;
mod characters;
pub mod order;
mod outline;
mod whiteboard;
mod works;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use uuid::Uuid;

use crate::action::Action;
use crate::model::State;

/// Source of fresh entity ids and creation timestamps.
pub trait Allocator {
    fn next_id(&mut self) -> String;
    fn now(&mut self) -> DateTime<Utc>;
}

/// UUID v4 ids and the wall clock, truncated to milliseconds so that
/// timestamps survive the persisted millisecond encoding unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now(&mut self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids with a clock that ticks
/// one millisecond per call, starting at the Unix epoch.
#[derive(Debug, Clone)]
pub struct SequentialAllocator {
    prefix: String,
    next: u64,
    ticks: i64,
}

impl SequentialAllocator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
            ticks: 0,
        }
    }

    /// The id the next `next_id` call will return.
    #[must_use]
    pub fn peek(&self) -> String {
        format!("{}-{}", self.prefix, self.next)
    }
}

impl Allocator for SequentialAllocator {
    fn next_id(&mut self) -> String {
        let id = self.peek();
        self.next += 1;
        id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        DateTime::<Utc>::default() + TimeDelta::milliseconds(self.ticks)
    }
}

/// Apply one action using fresh UUIDs and the system clock.
#[must_use]
pub fn reduce(state: State, action: Action) -> State {
    reduce_with(state, action, &mut SystemAllocator)
}

/// Apply one action, drawing ids and timestamps from `alloc`.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn reduce_with(mut state: State, action: Action, alloc: &mut dyn Allocator) -> State {
    match action {
        // works
        Action::AddWork { title, icon } => works::add(&mut state, alloc, title, icon),
        Action::UpdateWork(patch) => works::update(&mut state, patch),
        Action::DeleteWork(id) => works::delete(&mut state, &id),
        Action::ReorderWorks {
            start_index,
            end_index,
        } => works::reorder(&mut state, start_index, end_index),

        // selection and view flags
        Action::SetActiveWork(id) => works::set_active_work(&mut state, &id),
        Action::SetActiveDocument(doc) => works::set_active_document(&mut state, doc),
        Action::SetActiveTab(tab) => state.active_tab = tab,
        Action::SetActiveLens(id) => blocks::set_active_lens(&mut state, id),
        Action::ToggleFocusMode => state.focus_mode = !state.focus_mode,
        Action::ToggleShowDescriptions => state.show_descriptions = !state.show_descriptions,

        // chapters
        Action::AddChapter { work_id, title } => {
            outline::add_chapter(&mut state, alloc, &work_id, title);
        }
        Action::UpdateChapter(patch) => outline::update_chapter(&mut state, patch),
        Action::DeleteChapter(id) => outline::delete_chapter(&mut state, &id),
        Action::ReorderChapters {
            work_id,
            start_index,
            end_index,
        } => outline::reorder_chapters(&mut state, &work_id, start_index, end_index),

        // scenes
        Action::AddScene { chapter_id, title } => {
            outline::add_scene(&mut state, alloc, &chapter_id, title);
        }
        Action::UpdateScene(patch) => outline::update_scene(&mut state, patch),
        Action::DeleteScene(id) => outline::delete_scene(&mut state, &id),
        Action::ReorderScenes {
            chapter_id,
            start_index,
            end_index,
        } => outline::reorder_scenes(&mut state, &chapter_id, start_index, end_index),
        Action::MoveScene {
            scene_id,
            new_chapter_id,
            new_index,
        } => outline::move_scene(&mut state, &scene_id, &new_chapter_id, new_index),
        Action::ToggleSceneCharacter {
            scene_id,
            character_id,
        } => outline::toggle_scene_character(&mut state, &scene_id, character_id),
        Action::UpdateSceneCharacterNote {
            scene_id,
            character_id,
            note,
        } => outline::set_scene_character_note(&mut state, &scene_id, character_id, note),

        // blocks
        Action::AddBlock {
            document,
            kind,
            after_block_id,
        } => blocks::add(&mut state, alloc, document, kind, after_block_id.as_ref()),
        Action::UpdateBlock(patch) => blocks::update(&mut state, patch),
        Action::BulkUpdateBlocks(updates) => blocks::bulk_update(&mut state, updates),
        Action::RemoveLens(id) => blocks::remove_lens(&mut state, &id),
        Action::DeleteBlock(id) => blocks::delete(&mut state, &id),
        Action::MergeBlockUp(id) => blocks::merge_up(&mut state, &id),
        Action::ReorderBlocks {
            document,
            start_index,
            end_index,
        } => blocks::reorder(&mut state, &document, start_index, end_index),

        // characters
        Action::AddCharacter { work_id, name } => {
            characters::add(&mut state, alloc, &work_id, name);
        }
        Action::UpdateCharacter(patch) => characters::update(&mut state, patch),
        Action::DeleteCharacter(id) => characters::delete(&mut state, &id),
        Action::ReorderCharacters {
            work_id,
            start_index,
            end_index,
        } => characters::reorder(&mut state, &work_id, start_index, end_index),

        // custom character fields
        Action::AddCharacterField {
            work_id,
            name,
            kind,
            options,
        } => characters::add_field(&mut state, alloc, &work_id, name, kind, options),
        Action::UpdateCharacterField(patch) => characters::update_field(&mut state, patch),
        Action::DeleteCharacterField { work_id, field_id } => {
            characters::delete_field(&mut state, &work_id, &field_id);
        }
        Action::ReorderCharacterFields {
            work_id,
            start_index,
            end_index,
        } => characters::reorder_fields(&mut state, &work_id, start_index, end_index),
        Action::UpdateCharacterCustomField {
            character_id,
            field_id,
            value,
        } => characters::set_custom_value(&mut state, &character_id, field_id, value),

        // whiteboard
        Action::AddWhiteboardNode {
            work_id,
            position,
            description,
        } => whiteboard::add_node(&mut state, alloc, work_id, position, description),
        Action::UpdateWhiteboardNode(patch) => whiteboard::update_node(&mut state, patch),
        Action::DeleteWhiteboardNode(id) => whiteboard::delete_node(&mut state, &id),
        Action::AddWhiteboardEdge {
            source,
            target,
            label,
        } => whiteboard::add_edge(&mut state, alloc, source, target, label),
        Action::UpdateWhiteboardEdge(patch) => whiteboard::update_edge(&mut state, patch),
        Action::DeleteWhiteboardEdge(id) => whiteboard::delete_edge(&mut state, &id),

        // bulk
        Action::ImportData(snapshot) => state = *snapshot,
    }
    state
}
