mod aggregate;
mod assets;
mod catalog;
mod commands;
mod config;
mod content;
mod diagnostics;
mod error;
mod events;
mod progress;
mod render;
mod sections;
mod session;
mod storage;
mod theme;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coursebook", about = "Notebook-style course viewer with progress tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Site root containing the catalog and course files
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Log more detail to stderr (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the courses in the catalog
    Courses,
    /// Mark a section complete
    Mark {
        /// Course id
        course: String,
        /// Week key
        week: String,
        /// Zero-based section index within the week
        index: usize,
    },
    /// Show overall and per-week progress of a course
    Progress {
        /// Course id
        course: String,
    },
    /// Render a week, or a whole HTML course, to HTML
    Render {
        /// Course id
        course: String,
        /// Week key (defaults to the first week)
        #[arg(long)]
        week: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Clear all progress of a course
    Reset {
        /// Course id
        course: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Show the sections of a week and their completion state
    Show {
        /// Course id
        course: String,
        /// Week key (defaults to the first week)
        #[arg(long)]
        week: Option<String>,
    },
    /// Print the theme preference
    Theme {
        /// Switch between light and dark
        #[arg(long)]
        toggle: bool,
    },
    /// Mark a section incomplete
    Unmark {
        /// Course id
        course: String,
        /// Week key
        week: String,
        /// Zero-based section index within the week
        index: usize,
    },
    /// List the weeks of a course with their progress
    Weeks {
        /// Course id
        course: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = cli.root.as_path();
    let result = match cli.command {
        Commands::Courses => commands::courses(root),
        Commands::Mark { course, week, index } => commands::mark(root, &course, &week, index, true),
        Commands::Progress { course } => commands::progress(root, &course),
        Commands::Render { course, week, output } => {
            commands::render(root, &course, week.as_deref(), output.as_deref())
        },
        Commands::Reset { course, yes } => commands::reset(root, &course, yes),
        Commands::Show { course, week } => commands::show(root, &course, week.as_deref()),
        Commands::Theme { toggle } => commands::theme(root, toggle),
        Commands::Unmark { course, week, index } => {
            commands::mark(root, &course, &week, index, false)
        },
        Commands::Weeks { course } => commands::weeks(root, &course),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Send `tracing` output to stderr. `RUST_LOG` wins; otherwise `-v` raises
/// the level from `warn` to `info`, `-vv` to `debug`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    return;
}
