mod config;
mod gemini;
mod views;

use anyhow::{Context, Result};
use autopatch_core::{DiffEngine, DiffResult, Session, SourceFile};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{Config, ViewMode};
use gemini::GeminiFixer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use views::RenderOptions;

/// Diff a source file against its suggested fix
#[derive(Parser)]
#[command(name = "autopatch", version, about)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the line diff between two files
    Diff {
        original: PathBuf,
        fixed: PathBuf,

        /// Print the runs as JSON instead of rendering them
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Ask the analysis service to fix a file, then show the explanation and diff
    Fix {
        file: PathBuf,

        /// Stack trace, compiler error, or bug description
        #[arg(long, conflicts_with = "error_file")]
        error: Option<String>,

        /// Read the error log from a file ("-" for stdin)
        #[arg(long, value_name = "PATH")]
        error_file: Option<PathBuf>,

        /// Overwrite FILE with the fixed code
        #[arg(long)]
        write: bool,

        /// Model to use instead of the configured one
        #[arg(long)]
        model: Option<String>,

        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Args)]
struct DisplayArgs {
    /// Layout (defaults to the configured view)
    #[arg(long, value_enum)]
    view: Option<ViewMode>,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Output width for the split view (defaults to the terminal width)
    #[arg(long)]
    width: Option<usize>,

    /// Hide line numbers
    #[arg(long)]
    no_line_numbers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Diff {
            original,
            fixed,
            json,
            display,
        } => run_diff(&config, &original, &fixed, json, &display),
        Command::Fix {
            file,
            error,
            error_file,
            write,
            model,
            display,
        } => run_fix(
            &config,
            &file,
            error,
            error_file.as_deref(),
            write,
            model,
            &display,
        ),
    }
}

fn run_diff(
    config: &Config,
    original: &Path,
    fixed: &Path,
    json: bool,
    display: &DisplayArgs,
) -> Result<()> {
    let original = SourceFile::read(original)?;
    let fixed = SourceFile::read(fixed)?;
    let result = diff_or_replace(&config.diff.engine(), &original.content, &fixed.content);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_diff(config, display, &result)
}

fn run_fix(
    config: &Config,
    path: &Path,
    error: Option<String>,
    error_file: Option<&Path>,
    write: bool,
    model: Option<String>,
    display: &DisplayArgs,
) -> Result<()> {
    let source = SourceFile::read_supported(path)?;
    let error_log = match (error, error_file) {
        (Some(text), _) => text,
        (None, Some(p)) if p == Path::new("-") => {
            io::read_to_string(io::stdin()).context("Failed to read error log from stdin")?
        }
        (None, Some(p)) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read error log {}", p.display()))?,
        (None, None) => String::new(),
    };

    let session = Session::new().load_file(source).with_error_log(error_log);
    // Missing input is reported before any client is built
    session.report()?;

    let mut fixer = GeminiFixer::new(&config.analysis)?;
    if let Some(model) = model {
        fixer = fixer.with_model(model);
    }

    let session = session.submit(&fixer);
    if let Some(failure) = &session.failure {
        anyhow::bail!("{failure}");
    }
    let (Some(file), Some(result)) = (&session.file, &session.result) else {
        anyhow::bail!("Analysis returned no result");
    };

    let color = use_color(display.color);
    let header = vec![
        Line::styled(
            "> Analysis",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Line::raw(result.explanation.clone()),
        Line::raw(""),
    ];
    views::print_lines(&mut io::stdout().lock(), &header, color)?;

    let diff = diff_or_replace(&config.diff.engine(), &file.content, &result.fixed_code);
    print_diff(config, display, &diff)?;

    if write {
        std::fs::write(path, &result.fixed_code)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote fixed code to {}", path.display());
    }

    Ok(())
}

/// Line diff within the configured ceiling, or a whole-file replacement beyond it
fn diff_or_replace(engine: &DiffEngine, original: &str, fixed: &str) -> DiffResult {
    engine.try_diff(original, fixed).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Falling back to whole-file view");
        DiffResult::whole_file_replace(original, fixed)
    })
}

fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stdout().is_terminal(),
    }
}

fn print_diff(config: &Config, display: &DisplayArgs, result: &DiffResult) -> Result<()> {
    let width = display.width.unwrap_or_else(|| {
        crossterm::terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(RenderOptions::default().width)
    });
    let opts = RenderOptions {
        line_numbers: config.display.line_numbers && !display.no_line_numbers,
        tab_width: config.display.tab_width as usize,
        width,
    };

    let lines = match display.view.unwrap_or(config.display.view) {
        ViewMode::Unified => views::render_unified(result, &opts),
        ViewMode::Split => views::render_side_by_side(result, &opts),
    };

    let color = use_color(display.color);
    let mut out = io::stdout().lock();
    views::print_lines(&mut out, &lines, color)?;

    let summary = format!(
        "{} insertion(s)(+), {} deletion(s)(-)",
        result.insertions(),
        result.deletions()
    );
    views::print_lines(
        &mut out,
        &[Line::styled(summary, Style::default().fg(Color::DarkGray))],
        color,
    )?;
    Ok(())
}
