
use anyhow::Result;
use quill_core::model::State;
use quill_core::verify::verify_state;

use crate::output::{OutputMode, render};

/// Check the stored state against every integrity rule.
///
/// # Errors
///
/// Returns an error when any rule is broken.
pub fn run_verify(state: &State, output: OutputMode) -> Result<()> {
    let report = verify_state(state);

    render(output, &report, |r, w| {
        for violation in &r.violations {
            writeln!(w, "FAIL {violation}")?;
        }
        if r.is_ok() {
            writeln!(w, "verify: success")
        } else {
            writeln!(w, "verify: {} violation(s)", r.violations.len())
        }
    })?;

    if report.is_ok() {
        Ok(())
    } else {
        anyhow::bail!("verify: failed");
    }
}
