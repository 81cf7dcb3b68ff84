
use anyhow::Result;
use quill_core::Store;
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, render};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetReport {
    ok: bool,
    active_work_id: Option<String>,
}

/// Throw away the current state and restore the demo project.
pub fn run_reset(store: &mut Store, output: OutputMode) -> Result<()> {
    store.reset();
    info!(key = store.key(), "state reset to demo project");

    let report = ResetReport {
        ok: true,
        active_work_id: store.state().active_work_id.as_ref().map(ToString::to_string),
    };
    render(output, &report, |_, w| writeln!(w, "restored the demo project"))
}
