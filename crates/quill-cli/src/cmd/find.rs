
use anyhow::Result;
use clap::Args;
use quill_core::Store;
use quill_core::action::Action;
use quill_core::search::{SearchScope, find, replace_all};
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, render};

/// Characters of context shown on each side of a match.
const CONTEXT_CHARS: usize = 24;

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Literal text to look for (case-insensitive).
    pub text: String,

    /// Search every chapter and scene of the active work instead of the
    /// active document.
    #[arg(long)]
    pub whole_work: bool,

    /// Replace every match with this text.
    #[arg(long, value_name = "TEXT")]
    pub replace: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Hit {
    block_id: String,
    document: String,
    offset: usize,
    len: usize,
    snippet: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindReport {
    query: String,
    matches: Vec<Hit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced_blocks: Option<usize>,
}

/// The match with some surrounding text, newlines flattened.
fn snippet(content: &str, offset: usize, len: usize) -> String {
    let start = content[..offset]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    let end = content[offset + len..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(content.len(), |(i, _)| offset + len + i);
    content[start..end].replace('\n', " ")
}

pub fn run_find(args: &FindArgs, store: &mut Store, output: OutputMode) -> Result<()> {
    let scope = if args.whole_work {
        SearchScope::WholeWork
    } else {
        SearchScope::ActiveDocument
    };

    let state = store.state();
    let matches: Vec<Hit> = find(state, &args.text, scope)
        .into_iter()
        .map(|m| {
            let content = state
                .block(&m.block_id)
                .map_or("", |block| block.content.as_str());
            Hit {
                block_id: m.block_id.to_string(),
                document: m.document.to_string(),
                offset: m.offset,
                len: m.len,
                snippet: snippet(content, m.offset, m.len),
            }
        })
        .collect();

    let replaced_blocks = args.replace.as_ref().map(|replacement| {
        let action = replace_all(store.state(), &args.text, replacement, scope);
        let count = match &action {
            Some(Action::BulkUpdateBlocks(updates)) => updates.len(),
            _ => 0,
        };
        if let Some(action) = action {
            store.dispatch(action);
        }
        info!(query = %args.text, blocks = count, "replaced matches");
        count
    });

    let report = FindReport {
        query: args.text.clone(),
        matches,
        replaced_blocks,
    };
    render(output, &report, |r, w| {
        for hit in &r.matches {
            writeln!(w, "{}\t{}\t{}\t{}", hit.document, hit.block_id, hit.offset, hit.snippet)?;
        }
        let found = r.matches.len();
        let summary = r.replaced_blocks.map_or_else(
            || format!("{found} match(es)"),
            |blocks| format!("replaced {found} match(es) in {blocks} block(s)"),
        );
        writeln!(w, "{summary}")
    })
}
