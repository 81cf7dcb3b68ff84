//! Block handlers: insertion, edits, lens links, merge, and removal.
//!
//! Lens links are symmetric. Every path that changes a block's
//! `linked_lens_ids` updates the far side in the same transition, and a
//! link may only name another existing lens block.

use std::collections::HashSet;

use crate::action::{BlockContent, BlockPatch};
use crate::model::{Block, BlockId, BlockKind, DocumentRef, State};

use super::Allocator;
use super::cascade::{self, Removal};
use super::order;

/// Insert an empty block after `after` (or at the end of the document).
pub fn add(
    state: &mut State,
    alloc: &mut dyn Allocator,
    document: DocumentRef,
    kind: BlockKind,
    after: Option<&BlockId>,
) {
    if !state.document_exists(&document) {
        return;
    }
    let siblings = state.blocks_of(&document);
    let position = after
        .and_then(|after| siblings.iter().position(|b| &b.id == after))
        .map_or(siblings.len(), |i| i + 1);

    state.blocks.push(Block::empty(
        BlockId::new(alloc.next_id()),
        document.clone(),
        kind,
        position,
    ));
    let target = state.blocks.len() - 1;
    order::place(&mut state.blocks, |b| b.document == document, target, position);
}

/// Shallow-merge a patch. Lens-only fields are ignored on text blocks.
pub fn update(state: &mut State, patch: BlockPatch) {
    let Some(index) = state.blocks.iter().position(|b| b.id == patch.id) else {
        return;
    };

    let new_links = match patch.linked_lens_ids {
        Some(links) if state.blocks[index].is_lens() => Some(sanitize_links(state, &patch.id, links)),
        _ => None,
    };

    let block = &mut state.blocks[index];
    if let Some(content) = patch.content {
        block.content = content;
    }
    if let Some(description) = patch.description {
        block.description = description;
    }
    if let Some(completed) = patch.completed {
        block.completed = completed;
    }
    if block.is_lens() {
        if let Some(color) = patch.color {
            block.color = Some(color);
        }
        if let Some(notes) = patch.notes {
            block.notes = notes;
        }
    }

    if let Some(links) = new_links {
        relink(state, index, links);
    }
}

/// Keep only distinct ids of other existing lens blocks, in given order.
fn sanitize_links(state: &State, own: &BlockId, links: Vec<BlockId>) -> Vec<BlockId> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|id| id != own)
        .filter(|id| state.block(id).is_some_and(Block::is_lens))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Replace the links of `state.blocks[index]` and mirror the difference
/// onto every added or dropped target.
fn relink(state: &mut State, index: usize, links: Vec<BlockId>) {
    let own = state.blocks[index].id.clone();
    let old: HashSet<BlockId> = state.blocks[index].linked_lens_ids.iter().cloned().collect();
    let new: HashSet<BlockId> = links.iter().cloned().collect();
    state.blocks[index].linked_lens_ids = links;

    for block in &mut state.blocks {
        if block.id == own {
            continue;
        }
        let was = old.contains(&block.id);
        let is = new.contains(&block.id);
        if is && !was {
            if !block.linked_lens_ids.contains(&own) {
                block.linked_lens_ids.push(own.clone());
            }
        } else if was && !is {
            block.linked_lens_ids.retain(|id| id != &own);
        }
    }
}

/// Replace the content of many blocks at once. Unknown ids are skipped.
pub fn bulk_update(state: &mut State, updates: Vec<BlockContent>) {
    for update in updates {
        if let Some(block) = state.blocks.iter_mut().find(|b| b.id == update.id) {
            block.content = update.content;
        }
    }
}

/// Turn a lens back into plain text in place.
pub fn remove_lens(state: &mut State, id: &BlockId) {
    let Some(block) = state.blocks.iter_mut().find(|b| &b.id == id) else {
        return;
    };
    if !block.is_lens() {
        return;
    }
    block.kind = BlockKind::Text;
    block.color = None;
    block.notes = None;
    block.linked_lens_ids.clear();

    cascade::unlink_everywhere(state, id);
    if state.active_lens_id.as_ref() == Some(id) {
        state.active_lens_id = None;
    }
}

pub fn delete(state: &mut State, id: &BlockId) {
    let Some(document) = state.block(id).map(|b| b.document.clone()) else {
        return;
    };
    let mut removal = Removal::default();
    removal.blocks.insert(id.clone());
    cascade::apply(state, &removal);
    order::renumber(&mut state.blocks, |b| b.document == document);
}

/// Fold a text block into the text block right above it.
pub fn merge_up(state: &mut State, id: &BlockId) {
    let Some(block) = state.block(id) else {
        return;
    };
    if block.kind != BlockKind::Text {
        return;
    }
    let siblings = state.blocks_of(&block.document);
    let Some(i) = siblings.iter().position(|b| &b.id == id) else {
        return;
    };
    let Some(previous) = i.checked_sub(1).map(|p| siblings[p]) else {
        return;
    };
    if previous.kind != BlockKind::Text {
        return;
    }
    let previous_id = previous.id.clone();
    let merged = format!("{}\n{}", previous.content, block.content);

    if let Some(previous) = state.blocks.iter_mut().find(|b| b.id == previous_id) {
        previous.content = merged;
    }
    delete(state, id);
}

pub fn reorder(state: &mut State, document: &DocumentRef, start: usize, end: usize) {
    order::move_member(&mut state.blocks, |b| &b.document == document, start, end);
}

/// Select a lens for the detail panel; only existing lenses qualify.
pub fn set_active_lens(state: &mut State, id: Option<BlockId>) {
    match id {
        None => state.active_lens_id = None,
        Some(id) => {
            if state.block(&id).is_some_and(Block::is_lens) {
                state.active_lens_id = Some(id);
            }
        }
    }
}
