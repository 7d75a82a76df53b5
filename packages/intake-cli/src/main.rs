// Command-line front end for the intake watcher: watches a directory and
// logs each file as it becomes eligible, useful for smoke-testing a drop
// directory before wiring in a real unit of work.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_watcher::{RetryPolicy, UnitOfWork, Watcher, WatcherConfig};

#[derive(Debug, Parser)]
#[command(name = "intake", about = "Watch a directory and log each new file")]
struct Args {
    /// Directory to watch for incoming files
    watched_dir: PathBuf,

    /// File extension to match, without the leading dot (e.g. "csv")
    #[arg(short = 'e', long)]
    extension: String,

    /// Seconds to sleep between scans when no new file is found
    #[arg(long, default_value_t = 1)]
    poll_interval: u64,

    /// Maximum processing attempts per file
    #[arg(long, default_value_t = 1000)]
    max_attempts: u32,

    /// Seconds to wait after a failed attempt before retrying
    #[arg(long, default_value_t = 900)]
    retry_delay: u64,

    /// Start the watermark at launch time, ignoring files already present
    #[arg(long)]
    from_now: bool,
}

/// Unit of work that only announces the delivered file.
struct LogWork;

#[async_trait::async_trait]
impl UnitOfWork for LogWork {
    async fn process(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "new file");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,intake_watcher=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Args {
        watched_dir,
        extension,
        poll_interval,
        max_attempts,
        retry_delay,
        from_now,
    } = Args::parse();

    let mut config = WatcherConfig::new(watched_dir, extension)
        .with_poll_interval(Duration::from_secs(poll_interval))
        .with_retry(RetryPolicy::new(
            max_attempts,
            Duration::from_secs(retry_delay),
        ));
    if from_now {
        config = config.starting_from(Utc::now());
    }

    Watcher::new(config, Arc::new(LogWork))
        .run()
        .await
        .context("watcher stopped")?;

    Ok(())
}
