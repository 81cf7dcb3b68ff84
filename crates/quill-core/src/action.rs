//! The dispatch contract: every way the state can change.
//!
//! Actions are serialized adjacently tagged so that a dispatched action
//! reads `{"type": "ADD_CHAPTER", "payload": {"workId": "...", "title": "..."}}`.
//! Payload keys are camelCase like the persisted state.
//!
//! Partial updates use patch structs: a `None` field leaves the entity's
//! value untouched. Fields that can themselves be absent on the entity
//! (a block's `description`, for instance) use `Option<Option<T>>` where
//! `Some(None)` (JSON `null`) clears the value.

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::{
    ActiveTab, BlockId, BlockKind, ChapterId, CharacterId, DocumentRef, EdgeId, FieldId,
    FieldKind, FieldValue, LensColor, NodeId, Position, SceneId, State, WorkId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    // -- works ------------------------------------------------------------
    AddWork {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
    UpdateWork(WorkPatch),
    DeleteWork(WorkId),
    ReorderWorks {
        start_index: usize,
        end_index: usize,
    },

    // -- selection and view flags ------------------------------------------
    SetActiveWork(WorkId),
    SetActiveDocument(Option<DocumentRef>),
    SetActiveTab(ActiveTab),
    SetActiveLens(Option<BlockId>),
    ToggleFocusMode,
    ToggleShowDescriptions,

    // -- chapters -----------------------------------------------------------
    AddChapter {
        work_id: WorkId,
        title: String,
    },
    UpdateChapter(ChapterPatch),
    DeleteChapter(ChapterId),
    ReorderChapters {
        work_id: WorkId,
        start_index: usize,
        end_index: usize,
    },

    // -- scenes -------------------------------------------------------------
    AddScene {
        chapter_id: ChapterId,
        title: String,
    },
    UpdateScene(ScenePatch),
    DeleteScene(SceneId),
    ReorderScenes {
        chapter_id: ChapterId,
        start_index: usize,
        end_index: usize,
    },
    MoveScene {
        scene_id: SceneId,
        new_chapter_id: ChapterId,
        new_index: usize,
    },
    ToggleSceneCharacter {
        scene_id: SceneId,
        character_id: CharacterId,
    },
    UpdateSceneCharacterNote {
        scene_id: SceneId,
        character_id: CharacterId,
        note: String,
    },

    // -- blocks -------------------------------------------------------------
    AddBlock {
        document: DocumentRef,
        #[serde(rename = "type")]
        kind: BlockKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        after_block_id: Option<BlockId>,
    },
    UpdateBlock(BlockPatch),
    BulkUpdateBlocks(Vec<BlockContent>),
    RemoveLens(BlockId),
    DeleteBlock(BlockId),
    MergeBlockUp(BlockId),
    ReorderBlocks {
        document: DocumentRef,
        start_index: usize,
        end_index: usize,
    },

    // -- characters -----------------------------------------------------------
    AddCharacter {
        work_id: WorkId,
        name: String,
    },
    UpdateCharacter(CharacterPatch),
    DeleteCharacter(CharacterId),
    ReorderCharacters {
        work_id: WorkId,
        start_index: usize,
        end_index: usize,
    },

    // -- custom character fields ---------------------------------------------
    AddCharacterField {
        work_id: WorkId,
        name: String,
        #[serde(rename = "type")]
        kind: FieldKind,
        #[serde(default)]
        options: Vec<String>,
    },
    UpdateCharacterField(CharacterFieldPatch),
    DeleteCharacterField {
        work_id: WorkId,
        field_id: FieldId,
    },
    ReorderCharacterFields {
        work_id: WorkId,
        start_index: usize,
        end_index: usize,
    },
    /// `value: None` clears the character's value for the field.
    UpdateCharacterCustomField {
        character_id: CharacterId,
        field_id: FieldId,
        value: Option<FieldValue>,
    },

    // -- whiteboard ------------------------------------------------------------
    AddWhiteboardNode {
        work_id: WorkId,
        position: Position,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    UpdateWhiteboardNode(WhiteboardNodePatch),
    DeleteWhiteboardNode(NodeId),
    AddWhiteboardEdge {
        source: NodeId,
        target: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    UpdateWhiteboardEdge(WhiteboardEdgePatch),
    DeleteWhiteboardEdge(EdgeId),

    // -- bulk -------------------------------------------------------------------
    /// Replace the whole state. The snapshot is trusted as-is.
    ImportData(Box<State>),
}

impl Action {
    /// Stable tag of this action, as it appears in the `type` field.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::AddWork { .. } => "ADD_WORK",
            Self::UpdateWork(_) => "UPDATE_WORK",
            Self::DeleteWork(_) => "DELETE_WORK",
            Self::ReorderWorks { .. } => "REORDER_WORKS",
            Self::SetActiveWork(_) => "SET_ACTIVE_WORK",
            Self::SetActiveDocument(_) => "SET_ACTIVE_DOCUMENT",
            Self::SetActiveTab(_) => "SET_ACTIVE_TAB",
            Self::SetActiveLens(_) => "SET_ACTIVE_LENS",
            Self::ToggleFocusMode => "TOGGLE_FOCUS_MODE",
            Self::ToggleShowDescriptions => "TOGGLE_SHOW_DESCRIPTIONS",
            Self::AddChapter { .. } => "ADD_CHAPTER",
            Self::UpdateChapter(_) => "UPDATE_CHAPTER",
            Self::DeleteChapter(_) => "DELETE_CHAPTER",
            Self::ReorderChapters { .. } => "REORDER_CHAPTERS",
            Self::AddScene { .. } => "ADD_SCENE",
            Self::UpdateScene(_) => "UPDATE_SCENE",
            Self::DeleteScene(_) => "DELETE_SCENE",
            Self::ReorderScenes { .. } => "REORDER_SCENES",
            Self::MoveScene { .. } => "MOVE_SCENE",
            Self::ToggleSceneCharacter { .. } => "TOGGLE_SCENE_CHARACTER",
            Self::UpdateSceneCharacterNote { .. } => "UPDATE_SCENE_CHARACTER_NOTE",
            Self::AddBlock { .. } => "ADD_BLOCK",
            Self::UpdateBlock(_) => "UPDATE_BLOCK",
            Self::BulkUpdateBlocks(_) => "BULK_UPDATE_BLOCKS",
            Self::RemoveLens(_) => "REMOVE_LENS",
            Self::DeleteBlock(_) => "DELETE_BLOCK",
            Self::MergeBlockUp(_) => "MERGE_BLOCK_UP",
            Self::ReorderBlocks { .. } => "REORDER_BLOCKS",
            Self::AddCharacter { .. } => "ADD_CHARACTER",
            Self::UpdateCharacter(_) => "UPDATE_CHARACTER",
            Self::DeleteCharacter(_) => "DELETE_CHARACTER",
            Self::ReorderCharacters { .. } => "REORDER_CHARACTERS",
            Self::AddCharacterField { .. } => "ADD_CHARACTER_FIELD",
            Self::UpdateCharacterField(_) => "UPDATE_CHARACTER_FIELD",
            Self::DeleteCharacterField { .. } => "DELETE_CHARACTER_FIELD",
            Self::ReorderCharacterFields { .. } => "REORDER_CHARACTER_FIELDS",
            Self::UpdateCharacterCustomField { .. } => "UPDATE_CHARACTER_CUSTOM_FIELD",
            Self::AddWhiteboardNode { .. } => "ADD_WHITEBOARD_NODE",
            Self::UpdateWhiteboardNode(_) => "UPDATE_WHITEBOARD_NODE",
            Self::DeleteWhiteboardNode(_) => "DELETE_WHITEBOARD_NODE",
            Self::AddWhiteboardEdge { .. } => "ADD_WHITEBOARD_EDGE",
            Self::UpdateWhiteboardEdge(_) => "UPDATE_WHITEBOARD_EDGE",
            Self::DeleteWhiteboardEdge(_) => "DELETE_WHITEBOARD_EDGE",
            Self::ImportData(_) => "IMPORT_DATA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPatch {
    pub id: WorkId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub lenses_description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPatch {
    pub id: ChapterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePatch {
    pub id: SceneId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPatch {
    pub id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial block update.
///
/// `linked_lens_ids`, when present, is the complete new link list; the
/// reducer diffs it against the old list to keep links symmetric.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<LensColor>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_lens_ids: Option<Vec<BlockId>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl BlockPatch {
    #[must_use]
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// One entry of a `BULK_UPDATE_BLOCKS` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContent {
    pub id: BlockId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterFieldPatch {
    pub work_id: WorkId,
    pub field_id: FieldId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardNodePatch {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardEdgePatch {
    pub id: EdgeId,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<Option<String>>,
}

/// Distinguish "field absent" (`None`, via `#[serde(default)]`) from
/// "field is null" (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
