//! Find and replace over block contents.
//!
//! Matching is a literal, case-insensitive substring search. Matches never
//! overlap and are reported in reading order.

use serde::Serialize;

use crate::action::{Action, BlockContent, BlockPatch};
use crate::model::{BlockId, DocumentRef, State};

/// Where to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Blocks of the active document.
    #[default]
    ActiveDocument,
    /// Blocks of every chapter and scene of the active work.
    WholeWork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub block_id: BlockId,
    pub document: DocumentRef,
    /// Byte offset of the match in the block content.
    pub offset: usize,
    /// Byte length of the matched text.
    pub len: usize,
}

fn chars_match(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte length of a match of `needle` at the start of `rest`, if any.
fn match_at(rest: &str, needle: &[char]) -> Option<usize> {
    let mut chars = rest.char_indices();
    let mut end = 0;
    for &want in needle {
        let (at, got) = chars.next()?;
        if !chars_match(got, want) {
            return None;
        }
        end = at + got.len_utf8();
    }
    Some(end)
}

/// Non-overlapping `(offset, len)` pairs of `needle` in `haystack`.
#[must_use]
pub fn find_in(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut i = 0;
    while i < haystack.len() {
        let rest = &haystack[i..];
        if let Some(len) = match_at(rest, &needle) {
            found.push((i, len));
            i += len;
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

fn scope_documents(state: &State, scope: SearchScope) -> Vec<DocumentRef> {
    match scope {
        SearchScope::ActiveDocument => state.active_document_id.iter().cloned().collect(),
        SearchScope::WholeWork => state
            .active_work_id
            .as_ref()
            .map(|work| state.documents_of(work))
            .unwrap_or_default(),
    }
}

/// Every match of `needle` within `scope`.
#[must_use]
pub fn find(state: &State, needle: &str, scope: SearchScope) -> Vec<Match> {
    let mut matches = Vec::new();
    for doc in scope_documents(state, scope) {
        for block in state.blocks_of(&doc) {
            matches.extend(find_in(&block.content, needle).into_iter().map(|(offset, len)| {
                Match {
                    block_id: block.id.clone(),
                    document: doc.clone(),
                    offset,
                    len,
                }
            }));
        }
    }
    matches
}

fn splice_all(content: &str, spans: &[(usize, usize)], replacement: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for &(offset, len) in spans {
        out.push_str(&content[cursor..offset]);
        out.push_str(replacement);
        cursor = offset + len;
    }
    out.push_str(&content[cursor..]);
    out
}

/// A `BULK_UPDATE_BLOCKS` action replacing every match in `scope`, or
/// `None` when nothing matches.
#[must_use]
pub fn replace_all(
    state: &State,
    needle: &str,
    replacement: &str,
    scope: SearchScope,
) -> Option<Action> {
    let mut updates = Vec::new();
    for doc in scope_documents(state, scope) {
        for block in state.blocks_of(&doc) {
            let spans = find_in(&block.content, needle);
            if spans.is_empty() {
                continue;
            }
            updates.push(BlockContent {
                id: block.id.clone(),
                content: splice_all(&block.content, &spans, replacement),
            });
        }
    }
    (!updates.is_empty()).then_some(Action::BulkUpdateBlocks(updates))
}

/// An `UPDATE_BLOCK` action replacing the single match `m`, or `None`
/// when the block is gone or no longer holds text at that span.
#[must_use]
pub fn replace_one(state: &State, m: &Match, replacement: &str) -> Option<Action> {
    let block = state.block(&m.block_id)?;
    let before = block.content.get(..m.offset)?;
    let after = block.content.get(m.offset + m.len..)?;
    let mut patch = BlockPatch::new(block.id.clone());
    patch.content = Some(format!("{before}{replacement}{after}"));
    Some(Action::UpdateBlock(patch))
}
