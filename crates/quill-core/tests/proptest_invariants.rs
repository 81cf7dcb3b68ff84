use proptest::prelude::*;
use quill_core::action::Action;
use quill_core::model::{
    BlockId, ChapterId, CharacterId, EdgeId, NodeId, SceneId, State, WorkId,
};
use quill_core::reducer::{SequentialAllocator, reduce_with};
use quill_core::transfer::{export_json, parse_import};
use quill_core::verify::verify_state;

use generators::*;

fn build(ops: &[Op]) -> State {
    run_ops(State::default(), ops, &mut SequentialAllocator::new("p"))
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn every_reachable_state_verifies(ops in arb_ops(60)) {
        let state = build(&ops);
        let report = verify_state(&state);
        prop_assert!(report.is_ok(), "{:?}", report.violations);
    }

    #[test]
    fn invariants_hold_after_each_step(ops in arb_ops(30)) {
        let mut alloc = SequentialAllocator::new("p");
        let mut state = State::default();
        for op in &ops {
            let Some(action) = to_action(&state, op) else { continue };
            let tag = action.tag();
            state = reduce_with(state, action, &mut alloc);
            let report = verify_state(&state);
            prop_assert!(report.is_ok(), "after {}: {:?}", tag, report.violations);
        }
    }

    #[test]
    fn deleting_missing_ids_changes_nothing(ops in arb_ops(30)) {
        let state = build(&ops);
        let mut alloc = SequentialAllocator::new("x");
        let ghosts = [
            Action::DeleteBlock(BlockId::new("missing")),
            Action::RemoveLens(BlockId::new("missing")),
            Action::DeleteWork(WorkId::new("missing")),
            Action::DeleteChapter(ChapterId::new("missing")),
            Action::DeleteScene(SceneId::new("missing")),
            Action::DeleteCharacter(CharacterId::new("missing")),
            Action::DeleteWhiteboardNode(NodeId::new("missing")),
            Action::DeleteWhiteboardEdge(EdgeId::new("missing")),
        ];
        for action in ghosts {
            let tag = action.tag();
            let after = reduce_with(state.clone(), action, &mut alloc);
            prop_assert_eq!(&after, &state, "{} of a missing id changed the state", tag);
        }
    }

    #[test]
    fn export_import_round_trips(ops in arb_ops(40)) {
        let state = build(&ops);
        let json = export_json(&state).expect("export");
        let action = parse_import(&json, true).expect("import");
        let restored = reduce_with(State::default(), action, &mut SequentialAllocator::new("r"));
        prop_assert_eq!(restored, state);
    }

    #[test]
    fn deleting_every_work_empties_the_workspace(ops in arb_ops(40)) {
        let mut state = build(&ops);
        let mut alloc = SequentialAllocator::new("d");
        while let Some(work) = state.works.first().map(|w| w.id.clone()) {
            state = reduce_with(state, Action::DeleteWork(work), &mut alloc);
        }
        prop_assert!(state.chapters.is_empty());
        prop_assert!(state.scenes.is_empty());
        prop_assert!(state.blocks.is_empty());
        prop_assert!(state.characters.is_empty());
        prop_assert!(state.whiteboard_nodes.is_empty());
        prop_assert!(state.whiteboard_edges.is_empty());
        prop_assert_eq!(state.active_work_id, None);
        prop_assert_eq!(state.active_document_id, None);
        prop_assert_eq!(state.active_lens_id, None);
    }
}
