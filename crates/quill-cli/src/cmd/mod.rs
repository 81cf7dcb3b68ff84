pub mod compile;
pub mod dispatch;
pub mod export;
pub mod find;
pub mod import;
pub mod reset;
pub mod show;
pub mod verify;

use std::path::Path;

use anyhow::Result;
use quill_core::Store;
use quill_core::config::{QuillConfig, resolve_data_dir};
use quill_core::error::ErrorCode;
use quill_core::persist::FileStorage;
use tracing::{debug, info, warn};

use crate::output::CliError;

/// Open the store backed by `<data dir>/<key>.json`.
///
/// The first run writes the demo project straight away so that the ids a
/// command prints stay valid for the next one.
///
/// # Errors
///
/// Returns a [`ErrorCode::DataDirUnavailable`] error when no data directory
/// can be resolved.
pub fn open_store(data_dir: Option<&Path>, config: &QuillConfig) -> Result<Store> {
    let dir = resolve_data_dir(data_dir, &config.storage).ok_or_else(|| {
        CliError::coded(
            ErrorCode::DataDirUnavailable,
            "could not determine a data directory",
        )
    })?;
    debug!(dir = %dir.display(), key = %config.storage.key, "opening store");

    let storage = FileStorage::new(dir, config.storage.lock_timeout());
    let snapshot = storage.path_for(&config.storage.key);
    let fresh = !snapshot.exists();
    let mut store = Store::open(Box::new(storage), config.storage.key.clone());

    if fresh {
        match store.save() {
            Ok(()) => info!(path = %snapshot.display(), "created snapshot from demo project"),
            Err(err) => warn!(code = %err.code(), error = %err, "failed to write initial snapshot"),
        }
    }
    Ok(store)
}
