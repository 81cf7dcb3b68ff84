use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use super::ids::{BlockId, ChapterId, CharacterId, DocumentRef, FieldId, SceneId, WorkId};

/// An entity that lives in an ordered sibling group.
pub trait Ordered {
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

macro_rules! impl_ordered {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Ordered for $ty {
                fn order(&self) -> usize {
                    self.order
                }

                fn set_order(&mut self, order: usize) {
                    self.order = order;
                }
            }
        )+
    };
}

/// A top-level writing project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: WorkId,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub character_fields: Vec<CharacterFieldDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lenses_description: Option<String>,
    /// `book-<color>` or a single emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Work {
    #[must_use]
    pub fn field(&self, id: &FieldId) -> Option<&CharacterFieldDef> {
        self.character_fields.iter().find(|f| &f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub work_id: WorkId,
    pub title: String,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: SceneId,
    pub chapter_id: ChapterId,
    pub title: String,
    pub order: usize,
    #[serde(default)]
    pub character_ids: Vec<CharacterId>,
    /// Scene-specific note per appearing character.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub character_notes: BTreeMap<CharacterId, String>,
}

/// Block variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Lens,
}

/// Fixed lens palette. `Black` marks hidden text that compile skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LensColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Black,
}

impl LensColor {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Black,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Black => "black",
        }
    }

    /// Hidden lenses are kept out of compiled output.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Black)
    }
}

impl fmt::Display for LensColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LensColor {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                expected: "lens color",
                got: s.to_string(),
            })
    }
}

/// The atomic content unit of a chapter or scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    /// Owning chapter or scene.
    pub document: DocumentRef,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<LensColor>,
    /// Private lens notes, never compiled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_lens_ids: Vec<BlockId>,
    /// Presence (even empty) lists the block in the outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub completed: bool,
}

impl Block {
    /// A fresh, empty block of the given kind. Lenses start red.
    #[must_use]
    pub fn empty(id: BlockId, document: DocumentRef, kind: BlockKind, order: usize) -> Self {
        Self {
            id,
            document,
            kind,
            content: String::new(),
            order,
            color: (kind == BlockKind::Lens).then_some(LensColor::Red),
            notes: None,
            linked_lens_ids: Vec::new(),
            description: None,
            completed: false,
        }
    }

    #[must_use]
    pub fn is_lens(&self) -> bool {
        self.kind == BlockKind::Lens
    }

    #[must_use]
    pub fn is_hidden_lens(&self) -> bool {
        self.is_lens() && self.color.is_some_and(LensColor::is_hidden)
    }

    #[must_use]
    pub const fn in_outline(&self) -> bool {
        self.description.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub work_id: WorkId,
    pub name: String,
    pub description: String,
    pub order: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<FieldId, FieldValue>,
}

/// Declared type of a custom character field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Select,
    Multiselect,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
        }
    }

    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

impl FromStr for FieldKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "select" => Ok(Self::Select),
            "multiselect" => Ok(Self::Multiselect),
            _ => Err(ParseEnumError {
                expected: "field type",
                got: s.to_string(),
            }),
        }
    }
}

/// A custom field definition owned by a work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterFieldDef {
    pub id: FieldId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl CharacterFieldDef {
    /// Whether `value` fits this field's declared type and options.
    ///
    /// Option membership is only enforced once the field declares options.
    #[must_use]
    pub fn accepts(&self, value: &FieldValue) -> bool {
        if value.kind() != self.kind {
            return false;
        }
        if self.options.is_empty() {
            return true;
        }
        match value {
            FieldValue::Select(choice) => self.options.contains(choice),
            FieldValue::Multiselect(choices) => choices.iter().all(|c| self.options.contains(c)),
            FieldValue::Text(_) | FieldValue::Number(_) => true,
        }
    }
}

/// A character's value for one custom field, tagged by the field's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Select(String),
    Multiselect(Vec<String>),
}

impl FieldValue {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Select(_) => FieldKind::Select,
            Self::Multiselect(_) => FieldKind::Multiselect,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Select(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Multiselect(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl_ordered!(Work, Chapter, Scene, Block, Character);

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}
