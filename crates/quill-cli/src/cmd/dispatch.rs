use std::io::{self, Read};

use anyhow::{Context as _, Result};
use clap::Args;
use quill_core::{Action, Store};
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct DispatchArgs {
    /// Action JSON, e.g. `{"type":"ADD_WORK","payload":{"title":"Draft"}}`.
    /// Use `-` to read it from stdin.
    #[arg(value_name = "JSON")]
    pub action: String,
}

#[derive(Debug, Serialize)]
struct Dispatched {
    ok: bool,
    action: &'static str,
    works: usize,
}

pub fn parse_action(raw: &str) -> Result<Action> {
    serde_json::from_str(raw.trim()).context("invalid action JSON")
}

pub fn run_dispatch(args: &DispatchArgs, store: &mut Store, output: OutputMode) -> Result<()> {
    let raw = if args.action == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read action from stdin")?;
        buf
    } else {
        args.action.clone()
    };

    let action = parse_action(&raw)?;
    let tag = action.tag();
    store.dispatch(action);
    info!(action = tag, "dispatched");

    let result = Dispatched {
        ok: true,
        action: tag,
        works: store.state().works.len(),
    };
    render(output, &result, |r, w| writeln!(w, "dispatched {}", r.action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_adjacently_tagged_actions() {
        let action = parse_action(r#" {"type":"ADD_WORK","payload":{"title":"Draft"}} "#)
            .expect("parse");
        assert_eq!(action.tag(), "ADD_WORK");
        let toggle = parse_action(r#"{"type":"TOGGLE_FOCUS_MODE"}"#).expect("parse");
        assert_eq!(toggle, Action::ToggleFocusMode);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = parse_action(r#"{"type":"LAUNCH_ROCKET"}"#).expect_err("must fail");
        assert!(err.to_string().contains("invalid action JSON"));
    }
}
