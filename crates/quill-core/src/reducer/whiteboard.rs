//! Architecture whiteboard: nodes place works on a canvas, edges connect
//! nodes. Deleting a node takes its edges with it.

use crate::action::{WhiteboardEdgePatch, WhiteboardNodePatch};
use crate::model::{EdgeId, NodeId, Position, State, WhiteboardEdge, WhiteboardNode, WorkId};

use super::Allocator;
use super::cascade::{self, Removal};

pub fn add_node(
    state: &mut State,
    alloc: &mut dyn Allocator,
    work_id: WorkId,
    position: Position,
    description: Option<String>,
) {
    if state.work(&work_id).is_none() {
        return;
    }
    state.whiteboard_nodes.push(WhiteboardNode {
        id: NodeId::new(alloc.next_id()),
        work_id,
        position,
        description,
    });
}

pub fn update_node(state: &mut State, patch: WhiteboardNodePatch) {
    let Some(node) = state.whiteboard_nodes.iter_mut().find(|n| n.id == patch.id) else {
        return;
    };
    if let Some(position) = patch.position {
        node.position = position;
    }
    if let Some(description) = patch.description {
        node.description = description;
    }
}

pub fn delete_node(state: &mut State, id: &NodeId) {
    if state.node(id).is_none() {
        return;
    }
    let mut removal = Removal::default();
    removal.nodes.insert(id.clone());
    cascade::apply(state, &removal);
}

/// Connect two existing nodes. Self-loops and parallel edges are allowed.
pub fn add_edge(
    state: &mut State,
    alloc: &mut dyn Allocator,
    source: NodeId,
    target: NodeId,
    label: Option<String>,
) {
    if state.node(&source).is_none() || state.node(&target).is_none() {
        return;
    }
    state.whiteboard_edges.push(WhiteboardEdge {
        id: EdgeId::new(alloc.next_id()),
        source,
        target,
        label,
    });
}

pub fn update_edge(state: &mut State, patch: WhiteboardEdgePatch) {
    let Some(edge) = state.whiteboard_edges.iter_mut().find(|e| e.id == patch.id) else {
        return;
    };
    if let Some(label) = patch.label {
        edge.label = label;
    }
}

pub fn delete_edge(state: &mut State, id: &EdgeId) {
    state.whiteboard_edges.retain(|e| &e.id != id);
}
