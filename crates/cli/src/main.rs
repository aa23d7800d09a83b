// SPDX-License-Identifier: MIT

//! `fman` — command-line front end for the scan-execution daemon.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fman_client::{ClientOptions, DaemonClient};
use fman_core::{JobId, JobStatus, ScanOptions};
use fman_daemon::server::Server;
use tracing_subscriber::EnvFilter;

use error::CliError;

/// Package version plus the git commit it was built from, set by `build.rs`.
const BUILD_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

#[derive(Parser)]
#[command(name = "fman", version, long_version = BUILD_VERSION, about = "Background file-indexing service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the daemon process.
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },
    /// Enqueue a scan of `path`.
    Scan {
        path: PathBuf,
        /// Record skipped-path diagnostics in the job's statistics.
        #[arg(long)]
        verbose: bool,
        /// Skip hashing files larger than this many bytes (0 = no cap).
        #[arg(long, default_value_t = 0)]
        max_hash_file_size: u64,
        /// Cooperative pause (ms) inserted every 100th file processed.
        #[arg(long, default_value_t = 0)]
        throttle_delay_ms: u64,
    },
    /// Inspect or cancel jobs.
    Job {
        #[command(subcommand)]
        command: JobCommand,
    },
    /// Drop all pending jobs.
    QueueClear,
}

#[derive(Subcommand)]
enum DaemonCommand {
    /// Start the daemon.
    Start {
        /// Stay attached to this terminal instead of backgrounding.
        #[arg(long)]
        foreground: bool,
    },
    /// Ask a running daemon to shut down.
    Stop,
    /// Print daemon status.
    Status,
}

#[derive(Subcommand)]
enum JobCommand {
    /// Fetch one job by id.
    Status { id: String },
    /// List jobs, optionally filtered by status.
    List {
        #[arg(long, value_enum)]
        status: Option<JobStatusArg>,
    },
    /// Cancel a pending or running job.
    Cancel { id: String },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum JobStatusArg {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl From<JobStatusArg> for JobStatus {
    fn from(arg: JobStatusArg) -> Self {
        match arg {
            JobStatusArg::Pending => JobStatus::Pending,
            JobStatusArg::Running => JobStatus::Running,
            JobStatusArg::Completed => JobStatus::Completed,
            JobStatusArg::Failed => JobStatus::Failed,
            JobStatusArg::Cancelled => JobStatus::Cancelled,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve the directory `.fman` is rooted under. Honors `FMAN_HOME` so
/// integration tests (and anyone running multiple daemons on one host)
/// don't have to touch the real `$HOME`.
fn resolve_home() -> Result<PathBuf, CliError> {
    if let Ok(dir) = std::env::var("FMAN_HOME") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir().ok_or_else(|| fman_daemon::config::ConfigError::NoHomeDir.into())
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let home = resolve_home()?;
    let options = ClientOptions::from_home(&home);

    match cli.command {
        Command::Daemon { command } => daemon_command(command, &home, &options).await,
        Command::Scan { path, verbose, max_hash_file_size, throttle_delay_ms } => {
            let options_scan = ScanOptions {
                verbose,
                max_hash_file_size,
                throttle_delay: std::time::Duration::from_millis(throttle_delay_ms),
                ..ScanOptions::default()
            };
            let mut client = DaemonClient::connect(&options).await?;
            let job = client.scan(path, options_scan).await?;
            println!("enqueued job {}", job.id);
            Ok(())
        }
        Command::Job { command } => job_command(command, &options).await,
        Command::QueueClear => {
            let mut client = DaemonClient::connect(&options).await?;
            client.clear_queue().await?;
            println!("queue cleared");
            Ok(())
        }
    }
}

async fn daemon_command(
    command: DaemonCommand,
    home: &std::path::Path,
    options: &ClientOptions,
) -> Result<(), CliError> {
    match command {
        DaemonCommand::Start { foreground } => {
            let config = fman_daemon::Config::load_from_home(home)?;
            if foreground {
                let store: std::sync::Arc<dyn fman_storage::MetadataStore + Send + Sync> =
                    std::sync::Arc::new(fman_storage::SqliteStore::open(&config.socket_path.with_file_name("index.db"))?);
                let handle = Server::start(config, store).await?;
                fman_daemon::lifecycle::install_signal_handlers(handle.cancellation_token())
                    .map_err(CliError::Io)?;
                handle.cancellation_token().cancelled().await;
                handle.stop().await;
                Ok(())
            } else {
                if fman_core::lifecycle::is_running(&config.pid_path) {
                    return Err(CliError::AlreadyRunning);
                }
                let program = std::env::current_exe().map_err(CliError::Io)?;
                fman_daemon::lifecycle::spawn_background(
                    &program,
                    &["daemon".to_string(), "start".to_string(), "--foreground".to_string()],
                )
                .map_err(CliError::Io)?;
                println!("daemon starting");
                Ok(())
            }
        }
        DaemonCommand::Stop => {
            let mut client = DaemonClient::connect(&ClientOptions { auto_start: false, ..options.clone() }).await?;
            client.stop_daemon().await?;
            println!("daemon stopped");
            Ok(())
        }
        DaemonCommand::Status => {
            let mut client =
                match DaemonClient::connect(&ClientOptions { auto_start: false, ..options.clone() }).await {
                    Ok(client) => client,
                    Err(_) => return Err(CliError::NotRunning),
                };
            let status = client.status().await?;
            println!(
                "running pid={} workers={} queued={} active={} completed={} failed={}",
                status.pid,
                status.worker_count,
                status.jobs_queued,
                status.jobs_active,
                status.jobs_completed,
                status.jobs_failed,
            );
            Ok(())
        }
    }
}

async fn job_command(command: JobCommand, options: &ClientOptions) -> Result<(), CliError> {
    let mut client = DaemonClient::connect(options).await?;
    match command {
        JobCommand::Status { id } => {
            let job = client.job_status(JobId::from_string(id)).await?;
            println!("{}", serde_json::to_string_pretty(&job).unwrap_or_default());
            Ok(())
        }
        JobCommand::List { status } => {
            let jobs = client.list_jobs(status.map(JobStatus::from)).await?;
            for job in jobs {
                println!("{} {} {}", job.id, job.status, job.path.display());
            }
            Ok(())
        }
        JobCommand::Cancel { id } => {
            client.cancel_job(JobId::from_string(id)).await?;
            println!("cancelled");
            Ok(())
        }
    }
}
