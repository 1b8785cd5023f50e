//! Entry point for the Gantt terminal editor.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};

use chrono::Local;
use clap::Parser;
use gantt_core::{StorageConfig, load_or_sample, open_project_store};
use gantt_tui::{App, TuiResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log file written next to the project data.
const LOG_FILE_NAME: &str = "gantt-tui.log";

/// Interactive Gantt chart editor
#[derive(Debug, Parser)]
#[command(name = "gantt-tui")]
#[command(about = "Interactive Gantt chart editor")]
#[command(version)]
struct Args {
    /// Data directory (defaults to $GANTT_DATA_DIR, then the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Project to open (defaults to $GANTT_PROJECT, then "default")
    #[arg(long)]
    project: Option<String>,

    /// Only use the local snapshot file
    #[arg(long)]
    local_only: bool,
}

/// Log to a file in the data directory; the terminal belongs to the UI.
///
/// Logging is skipped if the file cannot be opened.
fn init_logging(config: &StorageConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let path = config.log_path(LOG_FILE_NAME);
    let file = fs::create_dir_all(config.data_dir())
        .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));

    if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .init();
    }
}

async fn run(args: Args) -> TuiResult<()> {
    let config = StorageConfig::resolve(args.data_dir, args.project, args.local_only)?;
    init_logging(&config);
    info!(
        "Opening project '{}' in {}",
        config.project,
        config.data_dir().display()
    );

    let store = Arc::new(open_project_store(&config).await);
    let today = Local::now().date_naive();
    let (state, source) = load_or_sample(store.as_ref(), today).await?;

    let mut app = App::new(state, store, source.describe())?;
    app.run().await
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Args::parse()).await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}
