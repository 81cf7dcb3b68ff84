//! Sibling-order maintenance.
//!
//! Entities of one kind live in a single flat vector; a sibling group is
//! the subset matching a predicate (chapters of a work, blocks of a
//! document, ...). Every helper here leaves the group's `order` values as
//! the dense range `0..n`. Ties in `order` keep vector position.

use crate::model::Ordered;

/// Vector indices of the group's members, sorted by current `order`.
fn sorted_members<T: Ordered>(items: &[T], in_group: impl Fn(&T) -> bool) -> Vec<usize> {
    let mut members: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| in_group(item))
        .map(|(i, _)| i)
        .collect();
    members.sort_by_key(|&i| items[i].order());
    members
}

fn assign<T: Ordered>(items: &mut [T], members: &[usize]) {
    for (position, &i) in members.iter().enumerate() {
        items[i].set_order(position);
    }
}

/// Close gaps and duplicates in a group.
pub fn renumber<T: Ordered>(items: &mut [T], in_group: impl Fn(&T) -> bool) {
    let members = sorted_members(items, in_group);
    assign(items, &members);
}

/// Move the member at `start` to `end` within the group.
///
/// Returns `false` (leaving `items` untouched) when `start` is out of
/// range. `end` is clamped to the last position.
pub fn move_member<T: Ordered>(
    items: &mut [T],
    in_group: impl Fn(&T) -> bool,
    start: usize,
    end: usize,
) -> bool {
    let mut members = sorted_members(items, in_group);
    if start >= members.len() {
        return false;
    }
    let end = end.min(members.len() - 1);
    let moved = members.remove(start);
    members.insert(end, moved);
    assign(items, &members);
    true
}

/// Seat `items[target]` at `position` among the other group members.
///
/// `target` must already satisfy `in_group`; its own current `order` is
/// ignored. `position` is clamped to the group's end.
pub fn place<T: Ordered>(
    items: &mut [T],
    in_group: impl Fn(&T) -> bool,
    target: usize,
    position: usize,
) {
    let mut members = sorted_members(items, in_group);
    members.retain(|&i| i != target);
    let position = position.min(members.len());
    members.insert(position, target);
    assign(items, &members);
}

/// Move an element of a plain vector (no `order` field), e.g. a work's
/// character field definitions. Same bounds policy as [`move_member`].
pub fn move_in_vec<T>(items: &mut Vec<T>, start: usize, end: usize) -> bool {
    if start >= items.len() {
        return false;
    }
    let end = end.min(items.len() - 1);
    let moved = items.remove(start);
    items.insert(end, moved);
    true
}
