//! The `State` aggregate: every entity collection plus UI selection flags.
//!
//! Collections are flat vectors in insertion order; the `order` field of
//! each entity, not its vector position, defines sibling order. The sorted
//! accessors below (`chapters_of`, `scenes_of`, ...) are how readers walk
//! the tree.

use serde::{Deserialize, Serialize};

use super::entity::{Block, Chapter, Character, Scene, Work};
use super::ids::{BlockId, ChapterId, CharacterId, DocumentRef, NodeId, SceneId, WorkId};
use super::whiteboard::{WhiteboardEdge, WhiteboardNode};

/// Top-level view selected in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    #[default]
    Writing,
    Lenses,
    Characters,
    Architecture,
    Compile,
}

impl ActiveTab {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Lenses => "lenses",
            Self::Characters => "characters",
            Self::Architecture => "architecture",
            Self::Compile => "compile",
        }
    }
}

/// The full store state. Serialized as-is for persistence and export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    pub works: Vec<Work>,
    pub characters: Vec<Character>,
    pub chapters: Vec<Chapter>,
    pub scenes: Vec<Scene>,
    pub blocks: Vec<Block>,
    pub whiteboard_nodes: Vec<WhiteboardNode>,
    pub whiteboard_edges: Vec<WhiteboardEdge>,
    pub active_work_id: Option<WorkId>,
    pub active_document_id: Option<DocumentRef>,
    pub active_lens_id: Option<BlockId>,
    pub active_tab: ActiveTab,
    pub focus_mode: bool,
    pub show_descriptions: bool,
}

impl State {
    #[must_use]
    pub fn work(&self, id: &WorkId) -> Option<&Work> {
        self.works.iter().find(|w| &w.id == id)
    }

    #[must_use]
    pub fn chapter(&self, id: &ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    #[must_use]
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&WhiteboardNode> {
        self.whiteboard_nodes.iter().find(|n| &n.id == id)
    }

    #[must_use]
    pub fn document_exists(&self, doc: &DocumentRef) -> bool {
        match doc {
            DocumentRef::Chapter(id) => self.chapter(id).is_some(),
            DocumentRef::Scene(id) => self.scene(id).is_some(),
        }
    }

    /// The work that (transitively) owns a document.
    #[must_use]
    pub fn work_of_document(&self, doc: &DocumentRef) -> Option<&WorkId> {
        let chapter_id = match doc {
            DocumentRef::Chapter(id) => id,
            DocumentRef::Scene(id) => &self.scene(id)?.chapter_id,
        };
        self.chapter(chapter_id).map(|c| &c.work_id)
    }

    /// Title of a document, for display.
    #[must_use]
    pub fn document_title(&self, doc: &DocumentRef) -> Option<&str> {
        match doc {
            DocumentRef::Chapter(id) => self.chapter(id).map(|c| c.title.as_str()),
            DocumentRef::Scene(id) => self.scene(id).map(|s| s.title.as_str()),
        }
    }

    #[must_use]
    pub fn works_sorted(&self) -> Vec<&Work> {
        sorted_by_order(self.works.iter(), |w| w.order)
    }

    #[must_use]
    pub fn chapters_of(&self, work: &WorkId) -> Vec<&Chapter> {
        sorted_by_order(
            self.chapters.iter().filter(|c| &c.work_id == work),
            |c| c.order,
        )
    }

    #[must_use]
    pub fn scenes_of(&self, chapter: &ChapterId) -> Vec<&Scene> {
        sorted_by_order(
            self.scenes.iter().filter(|s| &s.chapter_id == chapter),
            |s| s.order,
        )
    }

    #[must_use]
    pub fn blocks_of(&self, doc: &DocumentRef) -> Vec<&Block> {
        sorted_by_order(self.blocks.iter().filter(|b| &b.document == doc), |b| b.order)
    }

    #[must_use]
    pub fn characters_of(&self, work: &WorkId) -> Vec<&Character> {
        sorted_by_order(
            self.characters.iter().filter(|c| &c.work_id == work),
            |c| c.order,
        )
    }

    /// Every document of a work in reading order: each chapter followed by
    /// its scenes.
    #[must_use]
    pub fn documents_of(&self, work: &WorkId) -> Vec<DocumentRef> {
        let mut docs = Vec::new();
        for chapter in self.chapters_of(work) {
            docs.push(DocumentRef::Chapter(chapter.id.clone()));
            docs.extend(
                self.scenes_of(&chapter.id)
                    .into_iter()
                    .map(|s| DocumentRef::Scene(s.id.clone())),
            );
        }
        docs
    }

    /// The document `SetActiveWork` lands on: first chapter's first scene,
    /// else the first chapter, else nothing.
    #[must_use]
    pub fn default_document_of(&self, work: &WorkId) -> Option<DocumentRef> {
        let first_chapter = self.chapters_of(work).into_iter().next()?;
        let doc = self
            .scenes_of(&first_chapter.id)
            .into_iter()
            .next()
            .map_or_else(
                || DocumentRef::Chapter(first_chapter.id.clone()),
                |scene| DocumentRef::Scene(scene.id.clone()),
            );
        Some(doc)
    }
}

fn sorted_by_order<'a, T: 'a>(
    items: impl Iterator<Item = &'a T>,
    key: impl Fn(&T) -> usize,
) -> Vec<&'a T> {
    let mut out: Vec<&T> = items.collect();
    out.sort_by_key(|item| key(item));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_on_load() {
        let state: State = serde_json::from_str(r#"{"works": [], "focusMode": true}"#)
            .expect("partial state should parse");
        assert!(state.focus_mode);
        assert!(state.whiteboard_nodes.is_empty());
        assert!(state.whiteboard_edges.is_empty());
        assert_eq!(state.active_tab, ActiveTab::Writing);
        assert_eq!(state.active_document_id, None);
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let json = serde_json::to_value(State::default()).expect("serialize");
        for key in [
            "works",
            "characters",
            "chapters",
            "scenes",
            "blocks",
            "whiteboardNodes",
            "whiteboardEdges",
            "activeWorkId",
            "activeDocumentId",
            "activeTab",
            "focusMode",
            "showDescriptions",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }
}
