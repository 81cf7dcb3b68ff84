use std::collections::BTreeMap;

use crate::action::{CharacterFieldPatch, CharacterPatch};
use crate::model::{
    Character, CharacterFieldDef, CharacterId, FieldId, FieldKind, FieldValue, State, WorkId,
};

use super::Allocator;
use super::cascade::{self, Removal};
use super::order;

pub fn add(state: &mut State, alloc: &mut dyn Allocator, work_id: &WorkId, name: String) {
    if state.work(work_id).is_none() {
        return;
    }
    let character = Character {
        id: CharacterId::new(alloc.next_id()),
        work_id: work_id.clone(),
        name,
        description: String::new(),
        order: state.characters_of(work_id).len(),
        custom_fields: BTreeMap::new(),
    };
    state.characters.push(character);
}

pub fn update(state: &mut State, patch: CharacterPatch) {
    let Some(character) = state.characters.iter_mut().find(|c| c.id == patch.id) else {
        return;
    };
    if let Some(name) = patch.name {
        character.name = name;
    }
    if let Some(description) = patch.description {
        character.description = description;
    }
}

/// Remove a character along with its scene memberships and notes.
pub fn delete(state: &mut State, id: &CharacterId) {
    let Some(work_id) = state.character(id).map(|c| c.work_id.clone()) else {
        return;
    };
    let mut removal = Removal::default();
    removal.characters.insert(id.clone());
    cascade::apply(state, &removal);
    order::renumber(&mut state.characters, |c| c.work_id == work_id);
}

pub fn reorder(state: &mut State, work_id: &WorkId, start: usize, end: usize) {
    order::move_member(&mut state.characters, |c| &c.work_id == work_id, start, end);
}

pub fn add_field(
    state: &mut State,
    alloc: &mut dyn Allocator,
    work_id: &WorkId,
    name: String,
    kind: FieldKind,
    options: Vec<String>,
) {
    let Some(work) = state.works.iter_mut().find(|w| &w.id == work_id) else {
        return;
    };
    work.character_fields.push(CharacterFieldDef {
        id: FieldId::new(alloc.next_id()),
        name,
        kind,
        options: if kind.has_options() { options } else { Vec::new() },
    });
}

/// Edit a field definition, then drop stored values it no longer accepts.
pub fn update_field(state: &mut State, patch: CharacterFieldPatch) {
    let Some(work) = state.works.iter_mut().find(|w| w.id == patch.work_id) else {
        return;
    };
    let Some(field) = work
        .character_fields
        .iter_mut()
        .find(|f| f.id == patch.field_id)
    else {
        return;
    };
    if let Some(name) = patch.name {
        field.name = name;
    }
    if let Some(kind) = patch.kind {
        field.kind = kind;
    }
    if let Some(options) = patch.options {
        field.options = options;
    }
    if !field.kind.has_options() {
        field.options.clear();
    }
    let field = field.clone();

    for character in state
        .characters
        .iter_mut()
        .filter(|c| c.work_id == patch.work_id)
    {
        let stale = character
            .custom_fields
            .get(&field.id)
            .is_some_and(|value| !field.accepts(value));
        if stale {
            character.custom_fields.remove(&field.id);
        }
    }
}

pub fn delete_field(state: &mut State, work_id: &WorkId, field_id: &FieldId) {
    if state.work(work_id).and_then(|w| w.field(field_id)).is_none() {
        return;
    }
    let mut removal = Removal::default();
    removal.fields.insert(field_id.clone());
    cascade::apply(state, &removal);
}

pub fn reorder_fields(state: &mut State, work_id: &WorkId, start: usize, end: usize) {
    if let Some(work) = state.works.iter_mut().find(|w| &w.id == work_id) {
        order::move_in_vec(&mut work.character_fields, start, end);
    }
}

/// Set or clear one custom field value. A value the field's definition
/// does not accept leaves the character unchanged.
pub fn set_custom_value(
    state: &mut State,
    character_id: &CharacterId,
    field_id: FieldId,
    value: Option<FieldValue>,
) {
    let Some(character) = state.character(character_id) else {
        return;
    };
    let Some(field) = state
        .work(&character.work_id)
        .and_then(|w| w.field(&field_id))
    else {
        return;
    };
    if value.as_ref().is_some_and(|v| !field.accepts(v)) {
        return;
    }

    let Some(character) = state.characters.iter_mut().find(|c| &c.id == character_id) else {
        return;
    };
    match value {
        Some(value) => {
            character.custom_fields.insert(field_id, value);
        }
        None => {
            character.custom_fields.remove(&field_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::action::{Action, CharacterFieldPatch, CharacterPatch};
    use crate::model::{CharacterId, FieldId, FieldKind, FieldValue, SceneId, State, WorkId};
    use crate::reducer::{SequentialAllocator, reduce_with};

    struct Fixture {
        state: State,
        alloc: SequentialAllocator,
        work: WorkId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut alloc = SequentialAllocator::new("id");
            let work = WorkId::new(alloc.peek());
            let state = reduce_with(
                State::default(),
                Action::AddWork {
                    title: "W".into(),
                    icon: None,
                },
                &mut alloc,
            );
            Self { state, alloc, work }
        }

        fn run(&mut self, action: Action) {
            let state = std::mem::take(&mut self.state);
            self.state = reduce_with(state, action, &mut self.alloc);
        }

        fn add_character(&mut self, name: &str) -> CharacterId {
            let id = CharacterId::new(self.alloc.peek());
            self.run(Action::AddCharacter {
                work_id: self.work.clone(),
                name: name.into(),
            });
            id
        }

        fn add_field(&mut self, name: &str, kind: FieldKind, options: &[&str]) -> FieldId {
            let id = FieldId::new(self.alloc.peek());
            self.run(Action::AddCharacterField {
                work_id: self.work.clone(),
                name: name.into(),
                kind,
                options: options.iter().map(|s| (*s).to_string()).collect(),
            });
            id
        }

        fn value(&self, character: &CharacterId, field: &FieldId) -> Option<FieldValue> {
            self.state
                .character(character)
                .and_then(|c| c.custom_fields.get(field).cloned())
        }
    }

    #[test]
    fn add_and_update_character() {
        let mut fx = Fixture::new();
        let elias = fx.add_character("Elias");
        let sarah = fx.add_character("Sarah");
        fx.run(Action::UpdateCharacter(CharacterPatch {
            id: elias.clone(),
            description: Some("Detective".into()),
            ..CharacterPatch::default()
        }));

        let c = fx.state.character(&elias).expect("character");
        assert_eq!(c.name, "Elias");
        assert_eq!(c.description, "Detective");
        assert_eq!(c.order, 0);
        assert_eq!(fx.state.character(&sarah).map(|c| c.order), Some(1));
    }

    #[test]
    fn add_character_to_unknown_work_is_noop() {
        let mut fx = Fixture::new();
        let before = fx.state.clone();
        fx.run(Action::AddCharacter {
            work_id: WorkId::new("ghost"),
            name: "Nobody".into(),
        });
        assert_eq!(fx.state, before);
    }

    #[test]
    fn delete_character_prunes_scene_membership() {
        let mut fx = Fixture::new();
        let chapter = crate::model::ChapterId::new(fx.alloc.peek());
        fx.run(Action::AddChapter {
            work_id: fx.work.clone(),
            title: "C".into(),
        });
        let scene: SceneId = fx.state.scenes_of(&chapter)[0].id.clone();
        let a = fx.add_character("A");
        let b = fx.add_character("B");
        fx.run(Action::ToggleSceneCharacter {
            scene_id: scene.clone(),
            character_id: a.clone(),
        });
        fx.run(Action::UpdateSceneCharacterNote {
            scene_id: scene.clone(),
            character_id: a.clone(),
            note: "nervous".into(),
        });

        fx.run(Action::DeleteCharacter(a.clone()));
        let s = fx.state.scene(&scene).expect("scene");
        assert!(s.character_ids.is_empty());
        assert!(s.character_notes.is_empty());
        assert!(fx.state.character(&a).is_none());
        assert_eq!(fx.state.character(&b).map(|c| c.order), Some(0));
    }

    #[test]
    fn custom_values_must_fit_the_field() {
        let mut fx = Fixture::new();
        let elias = fx.add_character("Elias");
        let age = fx.add_field("Age", FieldKind::Number, &[]);
        let role = fx.add_field("Role", FieldKind::Select, &["Hero", "Villain"]);

        fx.run(Action::UpdateCharacterCustomField {
            character_id: elias.clone(),
            field_id: age.clone(),
            value: Some(FieldValue::Text("old".into())),
        });
        assert_eq!(fx.value(&elias, &age), None);

        fx.run(Action::UpdateCharacterCustomField {
            character_id: elias.clone(),
            field_id: age.clone(),
            value: Some(FieldValue::Number(42.0)),
        });
        assert_eq!(fx.value(&elias, &age), Some(FieldValue::Number(42.0)));

        fx.run(Action::UpdateCharacterCustomField {
            character_id: elias.clone(),
            field_id: role.clone(),
            value: Some(FieldValue::Select("Sidekick".into())),
        });
        assert_eq!(fx.value(&elias, &role), None);

        fx.run(Action::UpdateCharacterCustomField {
            character_id: elias.clone(),
            field_id: age.clone(),
            value: None,
        });
        assert_eq!(fx.value(&elias, &age), None);
    }

    #[test]
    fn options_dropped_for_plain_kinds() {
        let mut fx = Fixture::new();
        let field = fx.add_field("Bio", FieldKind::Text, &["ignored"]);
        let work = fx.state.work(&fx.work).expect("work");
        assert!(work.field(&field).expect("field").options.is_empty());
    }

    #[test]
    fn changing_field_kind_drops_values_that_no_longer_fit() {
        let mut fx = Fixture::new();
        let elias = fx.add_character("Elias");
        let age = fx.add_field("Age", FieldKind::Number, &[]);
        fx.run(Action::UpdateCharacterCustomField {
            character_id: elias.clone(),
            field_id: age.clone(),
            value: Some(FieldValue::Number(30.0)),
        });

        fx.run(Action::UpdateCharacterField(CharacterFieldPatch {
            work_id: fx.work.clone(),
            field_id: age.clone(),
            name: Some("Age (years)".into()),
            kind: None,
            options: None,
        }));
        assert_eq!(fx.value(&elias, &age), Some(FieldValue::Number(30.0)));

        fx.run(Action::UpdateCharacterField(CharacterFieldPatch {
            work_id: fx.work.clone(),
            field_id: age.clone(),
            name: None,
            kind: Some(FieldKind::Text),
            options: None,
        }));
        assert_eq!(fx.value(&elias, &age), None);
    }

    #[test]
    fn delete_field_removes_definition_and_values() {
        let mut fx = Fixture::new();
        let elias = fx.add_character("Elias");
        let bio = fx.add_field("Bio", FieldKind::Text, &[]);
        fx.run(Action::UpdateCharacterCustomField {
            character_id: elias.clone(),
            field_id: bio.clone(),
            value: Some(FieldValue::Text("born late".into())),
        });

        fx.run(Action::DeleteCharacterField {
            work_id: fx.work.clone(),
            field_id: bio.clone(),
        });
        assert!(fx.state.work(&fx.work).and_then(|w| w.field(&bio)).is_none());
        assert_eq!(fx.value(&elias, &bio), None);
    }

    #[test]
    fn reorder_fields_moves_definitions() {
        let mut fx = Fixture::new();
        let a = fx.add_field("A", FieldKind::Text, &[]);
        let b = fx.add_field("B", FieldKind::Text, &[]);
        fx.run(Action::ReorderCharacterFields {
            work_id: fx.work.clone(),
            start_index: 1,
            end_index: 0,
        });
        let ids: Vec<_> = fx
            .state
            .work(&fx.work)
            .expect("work")
            .character_fields
            .iter()
            .map(|f| f.id.clone())
            .collect();
        assert_eq!(ids, vec![b, a]);
    }

    #[test]
    fn reorder_characters_keeps_order_dense() {
        let mut fx = Fixture::new();
        let a = fx.add_character("A");
        let b = fx.add_character("B");
        let c = fx.add_character("C");
        fx.run(Action::ReorderCharacters {
            work_id: fx.work.clone(),
            start_index: 0,
            end_index: 9,
        });

        let ids: Vec<_> = fx
            .state
            .characters_of(&fx.work)
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids, vec![b, c, a]);
        let orders: Vec<_> = fx.state.characters_of(&fx.work).iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        let before = fx.state.clone();
        fx.run(Action::ReorderCharacters {
            work_id: fx.work.clone(),
            start_index: 3,
            end_index: 0,
        });
        assert_eq!(fx.state, before);
    }
}
