//! `tmo` command-line entry point.
//!
//! Provides command-line tools for working with JSON template files:
//! - `tmo render` - Format a template with parameters
//! - `tmo check` - Validate template files
//! - `tmo list` - List the templates in a file

mod commands;
mod output;

use std::io;
use std::process::exit;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{run_check, run_list, run_render, CheckArgs, ListArgs, RenderArgs};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Templated message tools.
#[derive(Debug, Parser)]
#[command(name = "tmo")]
#[command(about = "Templated message formatting tools", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Color output control
    #[arg(long, value_enum, default_value_t = ColorWhen::Auto, global = true)]
    pub color: ColorWhen,

    /// Log template selection and field evaluation to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// When to use colored output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Format a template from a template file
    Render(RenderArgs),
    /// Check template files for problems
    Check(CheckArgs),
    /// List the templates in a template file
    List(ListArgs),
}

/// Set up color output based on user preference.
fn setup_colors(color_when: ColorWhen) {
    match color_when {
        ColorWhen::Auto => {
            // owo-colors automatically checks TTY, NO_COLOR, FORCE_COLOR
        }
        ColorWhen::Always => {
            owo_colors::set_override(true);
        }
        ColorWhen::Never => {
            owo_colors::set_override(false);
        }
    }
}

/// Install the stderr log subscriber. `--verbose` wins over `RUST_LOG`.
fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tmo=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "tmo=warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_colors(cli.color);
    setup_tracing(cli.verbose);

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let result = match cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Check(args) => run_check(args),
        Commands::List(args) => run_list(args),
    };

    match result {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{:?}", e);
            exit(exitcode::SOFTWARE);
        }
    }
}
