mod common;
mod repl;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use clap::Parser;
use owo_colors::OwoColorize;

use common::Failure;
use ember_interpreter::{InterpreterConfig, PrintHandler, Program};

#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "Run an Ember script, or start the REPL")]
struct Cli {
    /// Script to run. Without one, the interactive REPL starts.
    file: Option<PathBuf>,

    /// Deepest allowed chain of nested function calls
    #[arg(
        long = "max-depth",
        env = "EMBER_MAX_DEPTH",
        default_value_t = InterpreterConfig::DEFAULT_MAX_CALL_DEPTH
    )]
    max_depth: usize,

    /// Skip the dead-prefix optimizer
    #[arg(long = "no-optimize", default_value_t = false)]
    no_optimize: bool,

    /// Don't print the REPL banner
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber, only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn run_source(src: &str, config: InterpreterConfig) -> Result<(), Failure> {
    let script = common::parse_source(src)?;
    let mut program = Program::with_config(config, PrintHandler::Stdout);
    for item in &script.items {
        program.run_item(item)?;
    }
    Ok(())
}

fn run_file(path: &Path, config: InterpreterConfig) -> ExitCode {
    let src = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("Failed to read {}: {}", path.display(), e).red()
            );
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(path = %path.display(), bytes = src.len(), "running script");
    match run_source(&src, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            common::render_failure(&src, &failure);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = InterpreterConfig::default()
        .with_max_call_depth(cli.max_depth)
        .with_optimize(!cli.no_optimize);

    match cli.file {
        Some(path) => run_file(&path, config),
        None => {
            repl::start_repl(config, cli.quiet);
            ExitCode::SUCCESS
        }
    }
}
