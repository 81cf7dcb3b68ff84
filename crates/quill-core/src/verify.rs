//! Whole-state integrity checks.
//!
//! The reducer keeps these invariants on its own; the verifier exists for
//! snapshots that did not come through it (imports, hand-edited files) and
//! for the property tests.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use crate::model::{Block, Ordered, State};

/// Which rule a violation breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Two entities of one kind share an id.
    DuplicateId,
    /// A sibling group's `order` values are not `0..n`.
    DenseOrder,
    /// A child names a parent that does not exist.
    DanglingParent,
    /// A lens link names a missing block, a text block, or itself, or a
    /// text block carries links.
    LinkTarget,
    /// A link is not mirrored on the far side.
    LinkSymmetry,
    /// A weak reference (scene character, custom field, active selection)
    /// names something that does not exist.
    DanglingReference,
    /// A custom field value does not fit its definition.
    FieldValue,
    /// A whiteboard edge endpoint is missing.
    EdgeEndpoint,
    /// The active document belongs to a work other than the active one.
    ActiveScope,
}

impl Rule {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateId => "duplicate-id",
            Self::DenseOrder => "dense-order",
            Self::DanglingParent => "dangling-parent",
            Self::LinkTarget => "link-target",
            Self::LinkSymmetry => "link-symmetry",
            Self::DanglingReference => "dangling-reference",
            Self::FieldValue => "field-value",
            Self::EdgeEndpoint => "edge-endpoint",
            Self::ActiveScope => "active-scope",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule: Rule,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule.as_str(), self.detail)
    }
}

/// Aggregate verification report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub violations: Vec<Violation>,
}

impl VerifyReport {
    /// Return `true` when every check passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, rule: Rule, detail: impl Into<String>) {
        self.violations.push(Violation {
            rule,
            detail: detail.into(),
        });
    }
}

/// Check every structural invariant of `state`.
#[must_use]
pub fn verify_state(state: &State) -> VerifyReport {
    let mut report = VerifyReport::default();
    check_unique_ids(state, &mut report);
    check_parents(state, &mut report);
    check_order(state, &mut report);
    check_links(state, &mut report);
    check_weak_refs(state, &mut report);
    check_whiteboard(state, &mut report);
    report
}

fn duplicates<'a, K: Eq + Hash + fmt::Display + 'a>(
    ids: impl Iterator<Item = &'a K>,
    kind: &str,
    report: &mut VerifyReport,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            report.push(Rule::DuplicateId, format!("{kind} {id}"));
        }
    }
}

fn check_unique_ids(state: &State, report: &mut VerifyReport) {
    duplicates(state.works.iter().map(|w| &w.id), "work", report);
    duplicates(state.chapters.iter().map(|c| &c.id), "chapter", report);
    duplicates(state.scenes.iter().map(|s| &s.id), "scene", report);
    duplicates(state.blocks.iter().map(|b| &b.id), "block", report);
    duplicates(state.characters.iter().map(|c| &c.id), "character", report);
    duplicates(state.whiteboard_nodes.iter().map(|n| &n.id), "node", report);
    duplicates(state.whiteboard_edges.iter().map(|e| &e.id), "edge", report);
    for work in &state.works {
        duplicates(
            work.character_fields.iter().map(|f| &f.id),
            &format!("field of work {}", work.id),
            report,
        );
    }
}

fn check_parents(state: &State, report: &mut VerifyReport) {
    for chapter in &state.chapters {
        if state.work(&chapter.work_id).is_none() {
            report.push(
                Rule::DanglingParent,
                format!("chapter {} names missing work {}", chapter.id, chapter.work_id),
            );
        }
    }
    for scene in &state.scenes {
        if state.chapter(&scene.chapter_id).is_none() {
            report.push(
                Rule::DanglingParent,
                format!("scene {} names missing chapter {}", scene.id, scene.chapter_id),
            );
        }
    }
    for block in &state.blocks {
        if !state.document_exists(&block.document) {
            report.push(
                Rule::DanglingParent,
                format!("block {} names missing document {}", block.id, block.document),
            );
        }
    }
    for character in &state.characters {
        if state.work(&character.work_id).is_none() {
            report.push(
                Rule::DanglingParent,
                format!("character {} names missing work {}", character.id, character.work_id),
            );
        }
    }
    for node in &state.whiteboard_nodes {
        if state.work(&node.work_id).is_none() {
            report.push(
                Rule::DanglingParent,
                format!("node {} names missing work {}", node.id, node.work_id),
            );
        }
    }
}

/// Group `items` by `group_of` and require each group's orders to be `0..n`.
fn dense_groups<T: Ordered, G: Eq + Hash + fmt::Display>(
    items: &[T],
    group_of: impl Fn(&T) -> G,
    kind: &str,
    report: &mut VerifyReport,
) {
    let mut groups: HashMap<G, Vec<usize>> = HashMap::new();
    for item in items {
        groups.entry(group_of(item)).or_default().push(item.order());
    }
    for (group, mut orders) in groups {
        orders.sort_unstable();
        if orders.iter().enumerate().any(|(i, &o)| i != o) {
            report.push(
                Rule::DenseOrder,
                format!("{kind} of {group} have orders {orders:?}"),
            );
        }
    }
}

fn check_order(state: &State, report: &mut VerifyReport) {
    dense_groups(&state.works, |_| "workspace", "works", report);
    dense_groups(&state.chapters, |c| c.work_id.clone(), "chapters", report);
    dense_groups(&state.scenes, |s| s.chapter_id.clone(), "scenes", report);
    dense_groups(&state.blocks, |b| b.document.clone(), "blocks", report);
    dense_groups(&state.characters, |c| c.work_id.clone(), "characters", report);
}

fn check_links(state: &State, report: &mut VerifyReport) {
    let by_id: HashMap<_, &Block> = state.blocks.iter().map(|b| (&b.id, b)).collect();
    for block in &state.blocks {
        if !block.is_lens() {
            if !block.linked_lens_ids.is_empty() {
                report.push(Rule::LinkTarget, format!("text block {} carries links", block.id));
            }
            continue;
        }
        for target in &block.linked_lens_ids {
            if target == &block.id {
                report.push(Rule::LinkTarget, format!("lens {} links itself", block.id));
                continue;
            }
            let Some(other) = by_id.get(target) else {
                report.push(
                    Rule::LinkTarget,
                    format!("lens {} links missing block {target}", block.id),
                );
                continue;
            };
            if !other.is_lens() {
                report.push(
                    Rule::LinkTarget,
                    format!("lens {} links text block {target}", block.id),
                );
            } else if !other.linked_lens_ids.contains(&block.id) {
                report.push(
                    Rule::LinkSymmetry,
                    format!("lens {} links {target} but not the reverse", block.id),
                );
            }
        }
    }
}

fn check_weak_refs(state: &State, report: &mut VerifyReport) {
    for scene in &state.scenes {
        for id in scene.character_ids.iter().chain(scene.character_notes.keys()) {
            if state.character(id).is_none() {
                report.push(
                    Rule::DanglingReference,
                    format!("scene {} names missing character {id}", scene.id),
                );
            }
        }
    }

    for character in &state.characters {
        let work = state.work(&character.work_id);
        for (field_id, value) in &character.custom_fields {
            match work.and_then(|w| w.field(field_id)) {
                None => report.push(
                    Rule::DanglingReference,
                    format!("character {} has value for missing field {field_id}", character.id),
                ),
                Some(field) if !field.accepts(value) => report.push(
                    Rule::FieldValue,
                    format!(
                        "character {} value for {} is not a valid {}",
                        character.id,
                        field.name,
                        field.kind.as_str()
                    ),
                ),
                Some(_) => {}
            }
        }
    }

    if let Some(id) = &state.active_work_id {
        if state.work(id).is_none() {
            report.push(Rule::DanglingReference, format!("active work {id} is missing"));
        }
    }
    if let Some(doc) = &state.active_document_id {
        if !state.document_exists(doc) {
            report.push(Rule::DanglingReference, format!("active document {doc} is missing"));
        }
    }
    if let (Some(work), Some(doc)) = (&state.active_work_id, &state.active_document_id) {
        let owner = state.work_of_document(doc);
        if owner.is_some_and(|owner| owner != work) {
            report.push(
                Rule::ActiveScope,
                format!("active document {doc} is outside active work {work}"),
            );
        }
    }
    if let Some(id) = &state.active_lens_id {
        if !state.block(id).is_some_and(Block::is_lens) {
            report.push(Rule::DanglingReference, format!("active lens {id} is not a lens"));
        }
    }
}

fn check_whiteboard(state: &State, report: &mut VerifyReport) {
    for edge in &state.whiteboard_edges {
        for end in [&edge.source, &edge.target] {
            if state.node(end).is_none() {
                report.push(
                    Rule::EdgeEndpoint,
                    format!("edge {} names missing node {end}", edge.id),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BlockId, BlockKind, CharacterId, DocumentRef, EdgeId, NodeId, WhiteboardEdge,
    };
    use crate::reducer::SequentialAllocator;
    use crate::seed::seed_state;

    fn seed() -> State {
        seed_state(&mut SequentialAllocator::new("s"))
    }

    fn rules(report: &VerifyReport) -> Vec<Rule> {
        report.violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn seed_is_clean() {
        let report = verify_state(&seed());
        assert!(report.is_ok(), "{:?}", report.violations);
    }

    #[test]
    fn gap_in_order_is_reported() {
        let mut state = seed();
        state.chapters[1].order = 5;
        assert_eq!(rules(&verify_state(&state)), vec![Rule::DenseOrder]);
    }

    #[test]
    fn one_sided_link_is_reported() {
        let mut state = seed();
        let doc = state.blocks[0].document.clone();
        let mut other = Block::empty(BlockId::new("extra"), doc, BlockKind::Lens, 3);
        other.linked_lens_ids.push(state.blocks[1].id.clone());
        state.blocks.push(other);
        assert_eq!(rules(&verify_state(&state)), vec![Rule::LinkSymmetry]);
    }

    #[test]
    fn link_to_text_block_is_reported() {
        let mut state = seed();
        let text = state.blocks[0].id.clone();
        state.blocks[1].linked_lens_ids.push(text);
        assert_eq!(rules(&verify_state(&state)), vec![Rule::LinkTarget]);
    }

    #[test]
    fn dangling_weak_refs_are_reported() {
        let mut state = seed();
        state.scenes[0].character_ids.push(CharacterId::new("ghost"));
        state.whiteboard_edges.push(WhiteboardEdge {
            id: EdgeId::new("e"),
            source: NodeId::new("a"),
            target: NodeId::new("b"),
            label: None,
        });
        let found = rules(&verify_state(&state));
        assert_eq!(
            found,
            vec![Rule::DanglingReference, Rule::EdgeEndpoint, Rule::EdgeEndpoint]
        );
    }

    #[test]
    fn active_document_outside_active_work_is_reported() {
        let mut alloc = SequentialAllocator::new("s");
        let mut state = seed_state(&mut alloc);
        state = crate::reducer::reduce_with(
            state,
            crate::action::Action::AddWork {
                title: "Other".into(),
                icon: None,
            },
            &mut alloc,
        );
        let other = state.works[1].id.clone();
        assert!(verify_state(&state).is_ok());

        state.active_document_id = Some(DocumentRef::Chapter(state.chapters[0].id.clone()));
        state.active_work_id = Some(other);
        assert_eq!(rules(&verify_state(&state)), vec![Rule::ActiveScope]);

        state.active_work_id = None;
        assert!(verify_state(&state).is_ok());
    }

    #[test]
    fn orphaned_chapter_and_duplicate_ids_are_reported() {
        let mut state = seed();
        let mut copy = state.characters[0].clone();
        copy.order = 2;
        state.characters.push(copy);
        state.works.clear();
        let found = rules(&verify_state(&state));
        assert!(found.contains(&Rule::DuplicateId));
        assert!(found.contains(&Rule::DanglingParent));
        assert!(found.contains(&Rule::DanglingReference));
    }
}
