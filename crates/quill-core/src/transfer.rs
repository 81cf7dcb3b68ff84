//! JSON backup export and import.
//!
//! Export is the full state, pretty-printed. Import accepts any JSON
//! object with a `works` array; missing collections default. The result
//! is an [`Action::ImportData`] for the caller to dispatch, so a rejected
//! file never touches the store.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::action::Action;
use crate::error::ErrorCode;
use crate::model::State;
use crate::verify::{Violation, verify_state};

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("import is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("import is not a backup: {0}")]
    Shape(String),

    #[error("import fails {} integrity check(s); first: {}", .violations.len(), first_violation(.violations))]
    Integrity { violations: Vec<Violation> },

    #[error("failed to encode state: {0}")]
    Encode(#[source] serde_json::Error),
}

fn first_violation(violations: &[Violation]) -> String {
    violations
        .first()
        .map_or_else(String::new, ToString::to_string)
}

impl TransferError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::StorageReadFailed,
            Self::NotJson(_) => ErrorCode::ImportNotJson,
            Self::Shape(_) => ErrorCode::ImportShapeInvalid,
            Self::Integrity { .. } => ErrorCode::ImportIntegrity,
            Self::Encode(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Pretty JSON of the whole state.
///
/// # Errors
///
/// Returns [`TransferError::Encode`] if serialization fails.
pub fn export_json(state: &State) -> Result<String, TransferError> {
    serde_json::to_string_pretty(state).map_err(TransferError::Encode)
}

/// Parse a backup into an `IMPORT_DATA` action.
///
/// With `strict`, the snapshot must also pass [`verify_state`].
///
/// # Errors
///
/// Returns [`TransferError`] if `raw` is not JSON, is not an object with a
/// `works` array, does not deserialize as state, or (when `strict`) breaks
/// an integrity rule.
pub fn parse_import(raw: &str, strict: bool) -> Result<Action, TransferError> {
    let value: Value = serde_json::from_str(raw).map_err(TransferError::NotJson)?;

    let Value::Object(fields) = &value else {
        return Err(TransferError::Shape("top level is not an object".into()));
    };
    if !fields.get("works").is_some_and(Value::is_array) {
        return Err(TransferError::Shape("missing `works` array".into()));
    }

    let state: State =
        serde_json::from_value(value).map_err(|err| TransferError::Shape(err.to_string()))?;

    if strict {
        let report = verify_state(&state);
        if !report.is_ok() {
            return Err(TransferError::Integrity {
                violations: report.violations,
            });
        }
    }

    Ok(Action::ImportData(Box::new(state)))
}

/// Read and parse a backup file.
///
/// # Errors
///
/// Returns [`TransferError::Io`] if the file cannot be read, otherwise as
/// [`parse_import`].
pub fn import_file(path: &Path, strict: bool) -> Result<Action, TransferError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TransferError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_import(&raw, strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, Position, WhiteboardNode};
    use crate::reducer::{SequentialAllocator, reduce};
    use crate::seed::seed_state;

    fn seed() -> State {
        seed_state(&mut SequentialAllocator::new("s"))
    }

    #[test]
    fn export_then_import_is_identity() {
        let state = seed();
        let json = export_json(&state).expect("export");
        let action = parse_import(&json, true).expect("import");
        assert_eq!(reduce(State::default(), action), state);
    }

    #[test]
    fn coordinates_survive_export_exactly() {
        let mut state = seed();
        state.whiteboard_nodes.push(WhiteboardNode {
            id: NodeId::new("n"),
            work_id: state.works[0].id.clone(),
            position: Position {
                x: 243_637.867_042_918_14,
                y: -0.1 - 0.2,
            },
            description: None,
        });
        let json = export_json(&state).expect("export");
        let Action::ImportData(back) = parse_import(&json, true).expect("import") else {
            panic!("expected import action");
        };
        assert_eq!(back.whiteboard_nodes, state.whiteboard_nodes);
        assert_eq!(*back, state);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = parse_import("not json", false).expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::ImportNotJson);
    }

    #[test]
    fn object_without_works_is_rejected() {
        for raw in [r#"{"chapters": []}"#, r#"{"works": {}}"#, "[]"] {
            let err = parse_import(raw, false).expect_err("must fail");
            assert_eq!(err.code(), ErrorCode::ImportShapeInvalid, "{raw}");
        }
    }

    #[test]
    fn minimal_backup_defaults_everything_else() {
        let action = parse_import(r#"{"works": []}"#, false).expect("import");
        let Action::ImportData(state) = action else {
            panic!("expected import action");
        };
        assert_eq!(*state, State::default());
    }

    #[test]
    fn strict_import_rejects_broken_links() {
        let mut state = seed();
        let text = state.blocks[0].id.clone();
        state.blocks[1].linked_lens_ids.push(text);
        let json = export_json(&state).expect("export");

        assert!(parse_import(&json, false).is_ok());
        let err = parse_import(&json, true).expect_err("strict must fail");
        assert_eq!(err.code(), ErrorCode::ImportIntegrity);
        assert!(err.to_string().contains("link-target"));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.json");
        let err = import_file(&path, false).expect_err("must fail");
        assert!(err.to_string().contains("absent.json"));
    }
}
