//! Entity model: plain data for every collection the store holds.

pub mod entity;
pub mod ids;
pub mod state;
pub mod whiteboard;

pub use entity::{
    Block, BlockKind, Chapter, Character, CharacterFieldDef, FieldKind, FieldValue, LensColor,
    Ordered, ParseEnumError, Scene, Work,
};
pub use ids::{
    BlockId, ChapterId, CharacterId, DocumentRef, EdgeId, FieldId, NodeId, SceneId, WorkId,
};
pub use state::{ActiveTab, State};
pub use whiteboard::{Position, WhiteboardEdge, WhiteboardNode};
