#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use quill_core::config::load_config;
use quill_core::error::ErrorCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "quill",
    author,
    version,
    about = "quill: a local-first creative writing workspace",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for quill.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the state snapshot (overrides QUILL_DATA_DIR and
    /// the config file).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize works, chapters, and scenes.
    Show,

    /// Apply one action given as JSON.
    Dispatch(cmd::dispatch::DispatchArgs),

    /// Write a full JSON backup.
    Export(cmd::export::ExportArgs),

    /// Replace everything with a JSON backup.
    Import(cmd::import::ImportArgs),

    /// Assemble a work (or part of it) into plain text.
    Compile(cmd::compile::CompileArgs),

    /// Find, and optionally replace, text in blocks.
    Find(cmd::find::FindArgs),

    /// Check the stored state for integrity problems.
    Verify,

    /// Discard the current state and restore the demo project.
    Reset,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "quill=debug,info"
        } else {
            "quill=info,warn"
        })
    });

    let format = env::var("QUILL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let config = load_config(&project_root)
        .map_err(|err| CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}")))?;
    let mut store = cmd::open_store(cli.data_dir.as_deref(), &config)?;
    debug!(?store, "store ready");

    match &cli.command {
        Commands::Show => cmd::show::run_show(store.state(), output),
        Commands::Dispatch(args) => cmd::dispatch::run_dispatch(args, &mut store, output),
        Commands::Export(args) => cmd::export::run_export(args, store.state()),
        Commands::Import(args) => {
            cmd::import::run_import(args, config.import.strict, &mut store, output)
        }
        Commands::Compile(args) => {
            cmd::compile::run_compile(args, &config.compile, store.state(), output)
        }
        Commands::Find(args) => cmd::find::run_find(args, &mut store, output),
        Commands::Verify => cmd::verify::run_verify(store.state(), output),
        Commands::Reset => cmd::reset::run_reset(&mut store, output),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = OutputMode::resolve(cli.json);

    match run(&cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error = CliError::from_anyhow(&err);
            if render_error(output, &error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["quill", "show", "--json", "--data-dir", "/tmp/q"]);
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/q")));
        assert!(matches!(cli.command, Commands::Show));
    }

    #[test]
    fn compile_collects_repeated_selections() {
        let cli = Cli::parse_from([
            "quill", "compile", "--work", "w", "--chapter", "c1", "--chapter", "c2", "--scene",
            "s1",
        ]);
        let Commands::Compile(args) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(args.work, "w");
        assert_eq!(args.chapters, vec!["c1", "c2"]);
        assert_eq!(args.scenes, vec!["s1"]);
        assert!(!args.all);
    }

    #[test]
    fn import_requires_a_path() {
        assert!(Cli::try_parse_from(["quill", "import"]).is_err());
        let cli = Cli::parse_from(["quill", "import", "backup.json", "--strict"]);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(args.strict);
        assert_eq!(args.path, PathBuf::from("backup.json"));
    }

    #[test]
    fn find_takes_replacement() {
        let cli = Cli::parse_from(["quill", "find", "locket", "--whole-work", "--replace", "ring"]);
        let Commands::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert!(args.whole_work);
        assert_eq!(args.replace.as_deref(), Some("ring"));
    }
}
