use crate::action::WorkPatch;
use crate::model::{DocumentRef, State, Work, WorkId};

use super::Allocator;
use super::cascade::{self, Removal};
use super::order;

pub fn add(state: &mut State, alloc: &mut dyn Allocator, title: String, icon: Option<String>) {
    let work = Work {
        id: WorkId::new(alloc.next_id()),
        title,
        created_at: alloc.now(),
        order: state.works.len(),
        character_fields: Vec::new(),
        lenses_description: None,
        icon,
    };
    state.active_work_id = Some(work.id.clone());
    state.active_document_id = None;
    state.works.push(work);
}

pub fn update(state: &mut State, patch: WorkPatch) {
    let Some(work) = state.works.iter_mut().find(|w| w.id == patch.id) else {
        return;
    };
    if let Some(title) = patch.title {
        work.title = title;
    }
    if let Some(description) = patch.lenses_description {
        work.lenses_description = description;
    }
    if let Some(icon) = patch.icon {
        work.icon = icon;
    }
}

pub fn delete(state: &mut State, id: &WorkId) {
    if state.work(id).is_none() {
        return;
    }
    let removal = Removal::work(state, id);
    cascade::apply(state, &removal);
    order::renumber(&mut state.works, |_| true);
}

pub fn reorder(state: &mut State, start: usize, end: usize) {
    order::move_member(&mut state.works, |_| true, start, end);
}

/// Select a work and land on its default document.
pub fn set_active_work(state: &mut State, id: &WorkId) {
    if state.work(id).is_none() {
        return;
    }
    state.active_document_id = state.default_document_of(id);
    state.active_work_id = Some(id.clone());
}

/// Select a document; the active work follows it.
pub fn set_active_document(state: &mut State, doc: Option<DocumentRef>) {
    let Some(doc) = doc else {
        state.active_document_id = None;
        return;
    };
    let Some(work_id) = state.work_of_document(&doc).cloned() else {
        return;
    };
    state.active_work_id = Some(work_id);
    state.active_document_id = Some(doc);
}
