//! scholar - command-line client for the education platform API
//!
//! Every command opens a [`Session`] from the configuration, runs one
//! operation and prints its result as pretty JSON on stdout. Notifications
//! and diagnostics go to stderr through `tracing`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholar_api::{Session, SessionBuilder};
use scholar_core::EntityId;
use scholar_transport::ClientConfig;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Session file used when the configuration names none
const DEFAULT_STORAGE_PATH: &str = ".scholar/session.json";

/// scholar - education platform API client
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session file holding the token and user record
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Login name
        username: String,

        /// Password
        #[arg(long, env = "SCHOLAR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List experiments
    Experiments {
        /// Reload from the backend
        #[arg(long)]
        refresh: bool,

        /// Only this subject
        #[arg(long)]
        subject: Option<String>,

        /// Only experiments open for booking
        #[arg(long)]
        available: bool,
    },

    /// Show one experiment
    Experiment {
        /// Experiment id
        id: String,

        /// Reload from the backend
        #[arg(long)]
        refresh: bool,
    },

    /// List your exam bookings
    Bookings {
        /// Only bookings in this state (BOOKED, CONFIRMED, CANCELLED)
        #[arg(long)]
        status: Option<String>,
    },

    /// Cancel an exam booking
    CancelBooking {
        /// Booking id
        id: String,

        /// Reason given to the exam office
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// List your notifications
    Notifications {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark notifications as read
    MarkRead {
        /// Notification ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Download an experiment report
    ExportReport {
        /// Report id
        id: String,

        /// Export format, e.g. pdf or docx
        #[arg(long, default_value = "pdf")]
        format: String,

        /// Destination file
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let session = open_session(cli.config.as_deref(), cli.storage)?;
    run(&session, cli.command)
}

fn open_session(config_path: Option<&Path>, storage: Option<PathBuf>) -> Result<Session> {
    let mut config = ClientConfig::load(config_path).context("failed to load configuration")?;
    if let Some(path) = storage {
        config = config.storage_path(path);
    } else if config.storage_path.is_none() {
        config = config.storage_path(DEFAULT_STORAGE_PATH);
    }
    SessionBuilder::new(config)
        .open()
        .context("failed to open session")
}

fn run(session: &Session, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username, password } => {
            let user = session.login(&username, &password)?;
            print_json(&user)
        }
        Commands::Logout => {
            session.logout()?;
            print_json(&serde_json::json!({"loggedOut": true}))
        }
        Commands::Whoami => match session.current_user() {
            Some(user) => print_json(&user),
            None => anyhow::bail!("not logged in"),
        },
        Commands::Experiments {
            refresh,
            subject,
            available,
        } => {
            let store = session.experiments();
            let all = store.fetch_all(refresh)?;
            let shown: Vec<_> = all
                .iter()
                .filter(|e| subject.is_none() || e.subject == subject)
                .filter(|e| !available || e.is_available())
                .map(|e| e.as_ref())
                .collect();
            print_json(&shown)
        }
        Commands::Experiment { id, refresh } => {
            let experiment = session
                .experiments()
                .fetch_by_id(&EntityId::new(id), refresh)?;
            print_json(experiment.as_ref())
        }
        Commands::Bookings { status } => {
            let bookings = session
                .exam_bookings()
                .fetch_user_bookings(status.as_deref(), true)?;
            print_json(&bookings.iter().map(|b| b.as_ref()).collect::<Vec<_>>())
        }
        Commands::CancelBooking { id, reason } => {
            let id = EntityId::new(id);
            session.exam_bookings().cancel_booking(&id, &reason)?;
            print_json(&serde_json::json!({"cancelled": id.to_json()}))
        }
        Commands::Notifications { unread } => {
            let store = session.notifications();
            let all = store.fetch_all(true)?;
            let shown: Vec<_> = all
                .iter()
                .filter(|n| !unread || !n.is_read())
                .map(|n| n.as_ref())
                .collect();
            print_json(&shown)
        }
        Commands::MarkRead { ids } => {
            let ids: Vec<EntityId> = ids.into_iter().map(EntityId::new).collect();
            match ids.as_slice() {
                [one] => session.notifications().mark_as_read(one)?,
                many => {
                    session.notifications().batch_mark_as_read(many)?;
                }
            }
            let marked: Vec<_> = ids.iter().map(EntityId::to_json).collect();
            print_json(&serde_json::json!({"marked": marked}))
        }
        Commands::ExportReport { id, format, out } => {
            let bytes = session
                .experiments()
                .api()
                .export_report(&EntityId::new(id), &format)?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = bytes.len(), "Report saved");
            print_json(&serde_json::json!({
                "path": out.display().to_string(),
                "bytes": bytes.len(),
            }))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{}", rendered);
    Ok(())
}
