//! apiwalk - terminal API request runner
//!
//! The terminal is owned by the viewer, so logs go to a file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apiwalk::constants::{APP_NAME, DEFAULT_LOG_FILE};
use apiwalk::menu::{shortcut_for, Menu};
use apiwalk::messages::CrosstermKeys;
use apiwalk::storage::{discover_projects, ProjectStore};
use apiwalk::ui::{TerminalGuard, TerminalSurface};
use apiwalk::{App, SharedDisplay};

#[derive(Parser, Debug)]
#[command(name = APP_NAME, version, about = "Fire API project requests and browse the responses")]
struct Cli {
    /// Project directory containing a project.json
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Log file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_LOG_FILE)]
    log: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to file
    let log_dir = cli
        .log
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let log_name = cli
        .log
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Find projects before touching the terminal so errors print normally
    let chosen = cli.project.filter(|p| p.exists());
    let projects = match chosen {
        Some(_) => Vec::new(),
        None => {
            let projects = discover_projects(&std::env::current_dir()?)?;
            if projects.is_empty() {
                bail!("could not find any project directories containing a project.json");
            }
            projects
        }
    };

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    let _terminal = TerminalGuard::enter()?;
    let display = SharedDisplay::new(Box::new(TerminalSurface::new()?));
    let mut keys = CrosstermKeys;

    let project_dir = match chosen {
        Some(dir) => dir,
        None if projects.len() == 1 => projects[0].dir.clone(),
        None => {
            let mut menu = Menu::new(
                "Select from available projects:",
                projects
                    .iter()
                    .enumerate()
                    .map(|(idx, entry)| (entry.label(), shortcut_for(idx)))
                    .collect(),
            );
            match menu.wait_for_selection(&display, &mut keys)? {
                Some(idx) => projects[idx].dir.clone(),
                None => return Ok(()),
            }
        }
    };

    let store = ProjectStore::load(&project_dir)?;
    tracing::info!(project = %store.dir().display(), "Starting session");
    let mut app = App::new(store, display, runtime.handle().clone());
    app.run(&mut keys)
}
