//! The demo project a fresh install starts with.

use std::collections::BTreeMap;

use crate::model::{
    ActiveTab, Block, BlockId, BlockKind, Chapter, ChapterId, Character, CharacterId,
    DocumentRef, LensColor, Scene, SceneId, State, Work, WorkId,
};
use crate::reducer::Allocator;

const OPENING: &str = "The rain poured relentlessly over the neon-lit streets of Neo-Veridia. \
                       Elias stood over the body, his coat heavy with water.";
const LOCKET: &str = "The victim held a small, silver locket tightly in their left hand. \
                      It bore the insignia of the old regime.";
const CLOSING: &str = "He sighed, knowing this case would be unlike any other.";

/// "The Silent Echo": two chapters, two scenes in the first, three blocks
/// in the opening scene (one red lens), and two characters.
pub fn seed_state(alloc: &mut dyn Allocator) -> State {
    let work_id = WorkId::new(alloc.next_id());
    let work = Work {
        id: work_id.clone(),
        title: "The Silent Echo".into(),
        created_at: alloc.now(),
        order: 0,
        character_fields: Vec::new(),
        lenses_description: None,
        icon: None,
    };

    let elias = CharacterId::new(alloc.next_id());
    let sarah = CharacterId::new(alloc.next_id());
    let characters = vec![
        Character {
            id: elias.clone(),
            work_id: work_id.clone(),
            name: "Elias Thorne".into(),
            description: "A detective with a troubled past.".into(),
            order: 0,
            custom_fields: BTreeMap::new(),
        },
        Character {
            id: sarah,
            work_id: work_id.clone(),
            name: "Sarah Vance".into(),
            description: "An investigative journalist.".into(),
            order: 1,
            custom_fields: BTreeMap::new(),
        },
    ];

    let awakening = ChapterId::new(alloc.next_id());
    let shadows = ChapterId::new(alloc.next_id());
    let chapters = vec![
        Chapter {
            id: awakening.clone(),
            work_id: work_id.clone(),
            title: "Chapter 1: The Awakening".into(),
            order: 0,
        },
        Chapter {
            id: shadows,
            work_id: work_id.clone(),
            title: "Chapter 2: Shadows".into(),
            order: 1,
        },
    ];

    let crime_scene = SceneId::new(alloc.next_id());
    let scenes = vec![
        Scene {
            id: crime_scene.clone(),
            chapter_id: awakening.clone(),
            title: "Scene 1: The Crime Scene".into(),
            order: 0,
            character_ids: vec![elias],
            character_notes: BTreeMap::new(),
        },
        Scene {
            id: SceneId::new(alloc.next_id()),
            chapter_id: awakening,
            title: "Scene 2: Interrogation".into(),
            order: 1,
            character_ids: Vec::new(),
            character_notes: BTreeMap::new(),
        },
    ];

    let doc = DocumentRef::Scene(crime_scene);
    let mut opening = Block::empty(BlockId::new(alloc.next_id()), doc.clone(), BlockKind::Text, 0);
    opening.content = OPENING.into();
    let mut locket = Block::empty(BlockId::new(alloc.next_id()), doc.clone(), BlockKind::Lens, 1);
    locket.content = LOCKET.into();
    locket.color = Some(LensColor::Red);
    locket.notes = Some("Crucial evidence. Connects to the mayor.".into());
    let mut closing = Block::empty(BlockId::new(alloc.next_id()), doc.clone(), BlockKind::Text, 2);
    closing.content = CLOSING.into();

    State {
        works: vec![work],
        characters,
        chapters,
        scenes,
        blocks: vec![opening, locket, closing],
        whiteboard_nodes: Vec::new(),
        whiteboard_edges: Vec::new(),
        active_work_id: Some(work_id),
        active_document_id: Some(doc),
        active_lens_id: None,
        active_tab: ActiveTab::Writing,
        focus_mode: false,
        show_descriptions: false,
    }
}
