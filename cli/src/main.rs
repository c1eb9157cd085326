//! Terminal front end for the mirror console.
//!
//! Plays the role the browser page plays in a hosted deployment: it builds
//! the application context, reads persisted credentials, and wires operator
//! actions to the controller, rendering the controller's events as plain
//! text.

use clap::{Parser, Subcommand};
use mirror_console::util::{format_duration, format_timestamp};
use mirror_console::{
    parse_image_list, ApiError, ConfigError, ConnectionStatus, Controller, ControllerEvent,
    CredentialStore, GitHubClient, NoticeLevel, SettingsError, SyncError, TokenUpdate,
    WorkflowRun, DEFAULT_ALL_RUNS_PAGE_SIZE,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Mirror Console - submit Docker images for mirroring and watch the pipeline runs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the credentials file.
    #[arg(long, env = "MIRROR_CONSOLE_CONFIG", default_value = "mirror-console.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an image list without contacting GitHub.
    Validate {
        /// File with one image reference per line (stdin when omitted).
        file: Option<PathBuf>,
    },

    /// Show the capability tier and test the repository connection.
    Status,

    /// Save repository owner, access token and poll interval.
    Settings {
        /// Owner of the pipeline repository.
        #[arg(long)]
        owner: String,

        /// New access token; omit to keep the stored one.
        #[arg(long, env = "GITHUB_TOKEN")]
        token: Option<String>,

        /// Remove the stored token, dropping back to issue-based sync.
        #[arg(long, conflicts_with = "token")]
        clear_token: bool,

        /// Seconds between run-history polls.
        #[arg(long, default_value_t = 5)]
        poll_interval: u64,
    },

    /// Submit an image list for synchronization.
    Sync {
        /// File with one image reference per line (stdin when omitted).
        file: Option<PathBuf>,

        /// Dispatch the sync workflow directly instead of opening an issue.
        #[arg(long)]
        dispatch: bool,

        /// Re-push tags that already exist in the mirror.
        #[arg(long, requires = "dispatch")]
        force_update: bool,

        /// Only report what the pipeline would do.
        #[arg(long, requires = "dispatch")]
        dry_run: bool,

        /// Keep polling run history after submitting.
        #[arg(long)]
        watch: bool,
    },

    /// Dispatch the main pipeline workflow.
    Pipeline {
        /// Sync every tracked image even when already mirrored.
        #[arg(long)]
        force_sync: bool,
    },

    /// Show recent pipeline runs.
    History,

    /// Print the logs of one run.
    Logs {
        /// Run identifier, as shown in history output.
        run_id: u64,
    },

    /// Poll run history until the ceiling, printing updates.
    Watch,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to read image list: {0}")]
    Input(#[from] std::io::Error),

    #[error("{count} invalid image reference(s)")]
    InvalidImages { count: usize },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Compact single-line output; log level filtering via `RUST_LOG`
/// (defaults to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run(args: Args) -> Result<(), CliError> {
    // Validation is offline; skip the client entirely.
    if let Command::Validate { file } = &args.command {
        let text = read_image_list(file.as_deref())?;
        return validate(&text);
    }

    let store = CredentialStore::new(&args.config);
    let credentials = store.load()?;
    let client = GitHubClient::new(credentials, store)?;
    let (mut controller, mut events) = Controller::new(client);

    let result = dispatch(&args.command, &mut controller, &mut events).await;

    // Stop any polling session the command left behind and flush queued
    // events so every notice reaches the operator.
    controller.stop_polling();
    drop(controller);
    while let Ok(event) = events.try_recv() {
        render_event(&event);
    }

    result
}

async fn dispatch(
    command: &Command,
    controller: &mut Controller,
    events: &mut UnboundedReceiver<ControllerEvent>,
) -> Result<(), CliError> {
    match command {
        // Normally short-circuited in `run`; kept total so the match stays
        // exhaustive.
        Command::Validate { file } => {
            let text = read_image_list(file.as_deref())?;
            validate(&text)
        }

        Command::Status => {
            let tier = controller.capability();
            let gates = controller.gates();

            println!("Capability tier: {tier}");
            println!("  issue-based sync:  {}", enabled(gates.issue_sync));
            println!("  workflow dispatch: {}", enabled(gates.workflow_dispatch));
            println!("  run logs:          {}", enabled(gates.run_logs));
            println!("  full run history:  {}", enabled(gates.full_history));

            if gates.issue_sync {
                match controller.client().test_connection().await {
                    ConnectionStatus::Connected { repository } => {
                        println!("Connected to {}", repository.full_name);
                    }
                    ConnectionStatus::Failed { reason } => {
                        println!("Connection failed: {reason}");
                    }
                }
            }
            Ok(())
        }

        Command::Settings {
            owner,
            token,
            clear_token,
            poll_interval,
        } => {
            let update = if let Some(token) = token {
                TokenUpdate::Set(token.clone())
            } else if *clear_token {
                TokenUpdate::Clear
            } else {
                TokenUpdate::Keep
            };

            let tier = controller
                .save_settings(owner, update, *poll_interval)
                .await?;
            println!("Capability tier: {tier}");
            Ok(())
        }

        Command::Sync {
            file,
            dispatch,
            force_update,
            dry_run,
            watch,
        } => {
            let text = read_image_list(file.as_deref())?;

            if *dispatch {
                controller
                    .sync_via_dispatch(&text, *force_update, *dry_run)
                    .await?;
            } else {
                let issue = controller.sync_via_issue(&text).await?;
                println!("Opened {}", issue.html_url);
            }

            if *watch {
                watch_until_ceiling(events).await;
            }
            Ok(())
        }

        Command::Pipeline { force_sync } => {
            controller.trigger_main_workflow(*force_sync).await?;
            Ok(())
        }

        Command::History => {
            // Full access unlocks the longer listing; the snapshot path
            // serves issue-only operators.
            if controller.gates().full_history {
                match controller
                    .client()
                    .list_all_runs(DEFAULT_ALL_RUNS_PAGE_SIZE)
                    .await
                {
                    Ok(list) => print_runs(&list.workflow_runs),
                    Err(e) => println!("Run history is unavailable right now ({e})."),
                }
                return Ok(());
            }

            controller.refresh_history().await;

            let mut printed = false;
            while let Ok(event) = events.try_recv() {
                if let ControllerEvent::HistoryUpdated { runs, .. } = &event {
                    print_runs(runs);
                    printed = true;
                } else {
                    render_event(&event);
                }
            }
            if !printed {
                println!("Run history is unavailable right now.");
            }
            Ok(())
        }

        Command::Logs { run_id } => {
            let logs = controller.run_logs(*run_id).await?;
            print!("{logs}");
            Ok(())
        }

        Command::Watch => {
            controller.refresh_history().await;
            controller.start_polling();
            watch_until_ceiling(events).await;
            Ok(())
        }
    }
}

/// Renders events until the active polling session reports it stopped.
async fn watch_until_ceiling(events: &mut UnboundedReceiver<ControllerEvent>) {
    while let Some(event) = events.recv().await {
        let stopped = matches!(event, ControllerEvent::PollingStopped { .. });
        render_event(&event);
        if stopped {
            break;
        }
    }
}

fn validate(text: &str) -> Result<(), CliError> {
    let descriptors = parse_image_list(text);
    if descriptors.is_empty() {
        println!("No image references found.");
        return Ok(());
    }

    let mut invalid = 0;
    for descriptor in &descriptors {
        let marker = if descriptor.is_valid {
            "ok "
        } else {
            invalid += 1;
            "BAD"
        };
        println!("[{marker}] {}", descriptor.original);
        println!(
            "      name: {}  tag: {}  registry: {}",
            descriptor.name, descriptor.tag, descriptor.registry_host
        );
        if let Some(hint) = &descriptor.platform_hint {
            println!("      platform: {hint}");
        }
        for warning in &descriptor.warnings {
            println!("      warning: {warning}");
        }
    }

    println!("{} reference(s), {} invalid", descriptors.len(), invalid);
    if invalid > 0 {
        return Err(CliError::InvalidImages { count: invalid });
    }
    Ok(())
}

fn read_image_list(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => std::io::read_to_string(std::io::stdin()),
    }
}

fn render_event(event: &ControllerEvent) {
    match event {
        ControllerEvent::Notice { level, message } => {
            println!("{} {message}", notice_prefix(*level));
        }
        ControllerEvent::CapabilityChanged { tier } => {
            println!("-- capability tier is now '{tier}'");
        }
        ControllerEvent::EditorLoaded { content } => {
            println!("-- tracked image file has {} line(s)", content.lines().count());
        }
        ControllerEvent::IssueOpened { number, url } => {
            println!("-- issue #{number}: {url}");
        }
        ControllerEvent::HistoryUpdated { runs, .. } => {
            print_runs(runs);
        }
        ControllerEvent::PollingStarted { generation } => {
            println!("-- polling started (session {generation})");
        }
        ControllerEvent::PollingStopped { generation } => {
            println!("-- polling stopped (session {generation})");
        }
    }
}

fn print_runs(runs: &[WorkflowRun]) {
    if runs.is_empty() {
        println!("No runs recorded yet.");
        return;
    }

    for run in runs {
        let outcome = match run.conclusion {
            Some(conclusion) => conclusion.to_string(),
            None => run.status.to_string(),
        };

        println!(
            "#{} {} [{}]",
            run.id,
            run.name.as_deref().unwrap_or("(unnamed)"),
            outcome
        );
        println!(
            "    branch: {}  commit: {}",
            run.head_branch.as_deref().unwrap_or("?"),
            run.short_sha().unwrap_or("?")
        );
        println!(
            "    started: {}  duration: {}",
            format_timestamp(run.created_at.as_ref()),
            format_duration(run.created_at.as_ref(), run.updated_at.as_ref())
        );
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

fn notice_prefix(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "[info]",
        NoticeLevel::Success => "[ok]",
        NoticeLevel::Warning => "[warn]",
        NoticeLevel::Error => "[error]",
    }
}
