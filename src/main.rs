use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gantt_cli::commands::Command;
use gantt_core::{
    GanttResult, LoadSource, Snapshot, SnapshotStore, StorageConfig, load_or_sample,
    open_project_store,
};

/// gantt - A project timeline editor
#[derive(Parser)]
#[command(name = "gantt")]
#[command(version = "0.1.0")]
#[command(about = "A project timeline (Gantt) editor", long_about = None)]
struct Args {
    /// Directory holding the project data (can also be set via GANTT_DATA_DIR env var)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Project name (can also be set via GANTT_PROJECT env var)
    #[arg(long, global = true)]
    project: Option<String>,

    /// Keep the data in the local JSON file only
    #[arg(long, global = true)]
    local_only: bool,

    /// Date treated as today (YYYY-MM-DD)
    #[arg(long, global = true, hide = true)]
    today: Option<NaiveDate>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

/// Initialize logging from the RUST_LOG environment variable
///
/// Examples:
/// - `RUST_LOG=trace` - show all trace logs
/// - `RUST_LOG=gantt_core=debug` - show engine debug logs
/// - unset - show warnings and errors only
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e.full_message());
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> GanttResult<()> {
    let args = Args::parse();
    let output = run_with_args(&args).await?;
    println!("{}", output);
    Ok(())
}

/// Run the application with the given arguments and return its output.
///
/// Loads the project, runs the command, and saves once if the command
/// changed anything. A stored project that failed to load is only
/// overwritten by `import` or `reset`.
async fn run_with_args(args: &Args) -> GanttResult<String> {
    // Storage settings using priority: CLI arg > env var > default
    let config = StorageConfig::resolve(
        args.data_dir.clone(),
        args.project.clone(),
        args.local_only,
    )?;

    let Some(command) = &args.command else {
        return Ok("Welcome to gantt!\nUse 'gantt --help' for usage information.".to_string());
    };

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let store = open_project_store(&config).await;
    let (mut state, source) = load_or_sample(&store, today).await?;
    let load_failed = matches!(source, LoadSource::SampleAfterError { .. });
    if load_failed {
        warn!("{}", source.describe());
    } else {
        debug!("{}", source.describe());
    }

    let mut output = command.execute(&mut state)?;

    if command.is_read_only() {
        return Ok(output);
    }
    if load_failed && !command.replaces_project() {
        warn!(
            "Not saving project {}: the stored document could not be loaded",
            config.project
        );
        output.push_str(
            "\nNot saved: the stored project could not be loaded. \
             Use 'gantt import' or 'gantt reset' to replace it.",
        );
        return Ok(output);
    }
    store.save(&Snapshot::capture(&state)).await?;
    info!("Saved project {} to {}", config.project, store.name());
    Ok(output)
}
