//! Typed identifiers for every entity kind.
//!
//! Ids are opaque strings on the wire (UUID v4 text for freshly created
//! entities). Wrapping them per kind keeps a chapter id from being passed
//! where a scene id is expected; [`DocumentRef`] replaces the untyped
//! "document id" that could name either a chapter or a scene.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id string without validation.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw id text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Work`](super::Work).
    WorkId
);
entity_id!(
    /// Identifier of a [`Chapter`](super::Chapter).
    ChapterId
);
entity_id!(
    /// Identifier of a [`Scene`](super::Scene).
    SceneId
);
entity_id!(
    /// Identifier of a [`Block`](super::Block).
    BlockId
);
entity_id!(
    /// Identifier of a [`Character`](super::Character).
    CharacterId
);
entity_id!(
    /// Identifier of a [`CharacterFieldDef`](super::CharacterFieldDef).
    FieldId
);
entity_id!(
    /// Identifier of a [`WhiteboardNode`](super::WhiteboardNode).
    NodeId
);
entity_id!(
    /// Identifier of a [`WhiteboardEdge`](super::WhiteboardEdge).
    EdgeId
);

/// A container that owns blocks: either a chapter or a scene.
///
/// Serialized externally tagged, e.g. `{"scene": "5b1c..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRef {
    Chapter(ChapterId),
    Scene(SceneId),
}

impl DocumentRef {
    /// Raw id text of the referenced document.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chapter(id) => id.as_str(),
            Self::Scene(id) => id.as_str(),
        }
    }

    #[must_use]
    pub const fn is_scene(&self) -> bool {
        matches!(self, Self::Scene(_))
    }
}

impl From<ChapterId> for DocumentRef {
    fn from(id: ChapterId) -> Self {
        Self::Chapter(id)
    }
}

impl From<SceneId> for DocumentRef {
    fn from(id: SceneId) -> Self {
        Self::Scene(id)
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chapter(id) => write!(f, "chapter:{id}"),
            Self::Scene(id) => write!(f, "scene:{id}"),
        }
    }
}
