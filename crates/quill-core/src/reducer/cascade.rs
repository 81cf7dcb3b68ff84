//! Cascading deletes and weak-reference pruning.
//!
//! Every delete path runs the same two steps: collect the full set of
//! entities that disappear ([`Removal`]), then [`apply`] it. `apply`
//! drops the entities and prunes every weak reference that could name
//! one of them: block links, scene memberships and notes, custom field
//! values, whiteboard edges, and the active selections.

use std::collections::HashSet;

use crate::model::{
    BlockId, ChapterId, CharacterId, DocumentRef, EdgeId, FieldId, NodeId, SceneId, State, WorkId,
};

/// Everything one action removes.
#[derive(Debug, Default)]
pub struct Removal {
    pub works: HashSet<WorkId>,
    pub chapters: HashSet<ChapterId>,
    pub scenes: HashSet<SceneId>,
    pub blocks: HashSet<BlockId>,
    pub characters: HashSet<CharacterId>,
    pub fields: HashSet<FieldId>,
    pub nodes: HashSet<NodeId>,
    pub edges: HashSet<EdgeId>,
}

impl Removal {
    fn holds_document(&self, doc: &DocumentRef) -> bool {
        match doc {
            DocumentRef::Chapter(id) => self.chapters.contains(id),
            DocumentRef::Scene(id) => self.scenes.contains(id),
        }
    }

    /// A work and everything under it.
    pub fn work(state: &State, id: &WorkId) -> Self {
        let mut removal = Self::default();
        removal.works.insert(id.clone());
        for chapter in state.chapters.iter().filter(|c| &c.work_id == id) {
            removal.add_chapter_tree(state, &chapter.id);
        }
        removal.characters.extend(
            state
                .characters
                .iter()
                .filter(|c| &c.work_id == id)
                .map(|c| c.id.clone()),
        );
        if let Some(work) = state.work(id) {
            removal
                .fields
                .extend(work.character_fields.iter().map(|f| f.id.clone()));
        }
        removal.nodes.extend(
            state
                .whiteboard_nodes
                .iter()
                .filter(|n| &n.work_id == id)
                .map(|n| n.id.clone()),
        );
        removal
    }

    /// A chapter, its scenes, and the blocks of all of them.
    pub fn chapter(state: &State, id: &ChapterId) -> Self {
        let mut removal = Self::default();
        removal.add_chapter_tree(state, id);
        removal
    }

    /// A scene and its blocks.
    pub fn scene(state: &State, id: &SceneId) -> Self {
        let mut removal = Self::default();
        removal.add_scene_tree(state, id);
        removal
    }

    fn add_chapter_tree(&mut self, state: &State, id: &ChapterId) {
        self.chapters.insert(id.clone());
        let doc = DocumentRef::Chapter(id.clone());
        self.add_blocks_of(state, &doc);
        for scene in state.scenes.iter().filter(|s| &s.chapter_id == id) {
            self.add_scene_tree(state, &scene.id);
        }
    }

    fn add_scene_tree(&mut self, state: &State, id: &SceneId) {
        self.scenes.insert(id.clone());
        self.add_blocks_of(state, &DocumentRef::Scene(id.clone()));
    }

    fn add_blocks_of(&mut self, state: &State, doc: &DocumentRef) {
        self.blocks.extend(
            state
                .blocks
                .iter()
                .filter(|b| &b.document == doc)
                .map(|b| b.id.clone()),
        );
    }
}

/// Drop every entity in `removal` and prune dangling references.
///
/// Sibling renumbering is left to the caller, which knows which groups
/// lost a member.
pub fn apply(state: &mut State, removal: &Removal) {
    state.works.retain(|w| !removal.works.contains(&w.id));
    state.chapters.retain(|c| !removal.chapters.contains(&c.id));
    state.scenes.retain(|s| !removal.scenes.contains(&s.id));
    state.blocks.retain(|b| !removal.blocks.contains(&b.id));
    state.characters.retain(|c| !removal.characters.contains(&c.id));
    state
        .whiteboard_nodes
        .retain(|n| !removal.nodes.contains(&n.id));
    state.whiteboard_edges.retain(|e| {
        !removal.edges.contains(&e.id)
            && !removal.nodes.contains(&e.source)
            && !removal.nodes.contains(&e.target)
    });

    if !removal.fields.is_empty() {
        for work in &mut state.works {
            work.character_fields
                .retain(|f| !removal.fields.contains(&f.id));
        }
    }

    prune(state, removal);
}

fn prune(state: &mut State, removal: &Removal) {
    if !removal.blocks.is_empty() {
        for block in &mut state.blocks {
            block
                .linked_lens_ids
                .retain(|id| !removal.blocks.contains(id));
        }
    }

    if !removal.characters.is_empty() {
        for scene in &mut state.scenes {
            scene
                .character_ids
                .retain(|id| !removal.characters.contains(id));
            scene
                .character_notes
                .retain(|id, _| !removal.characters.contains(id));
        }
    }

    if !removal.fields.is_empty() {
        for character in &mut state.characters {
            character
                .custom_fields
                .retain(|id, _| !removal.fields.contains(id));
        }
    }

    if state
        .active_work_id
        .as_ref()
        .is_some_and(|id| removal.works.contains(id))
    {
        state.active_work_id = None;
    }
    if state
        .active_document_id
        .as_ref()
        .is_some_and(|doc| removal.holds_document(doc))
    {
        state.active_document_id = None;
    }
    if state
        .active_lens_id
        .as_ref()
        .is_some_and(|id| removal.blocks.contains(id))
    {
        state.active_lens_id = None;
    }
}

/// Strip `id` from every block's links.
pub fn unlink_everywhere(state: &mut State, id: &BlockId) {
    for block in &mut state.blocks {
        block.linked_lens_ids.retain(|linked| linked != id);
    }
}
