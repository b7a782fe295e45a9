//! Top-level scheduling loop.
//!
//! Runs a full archive pass over every configured feed, sleeps until the
//! next configured time of day, and repeats until shutdown. Feeds are
//! processed strictly sequentially; one feed finishes its download and
//! cleanup before the next begins.

use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tracing::{error, info};

use crate::archiver::FeedArchiver;
use crate::config::Config;
use crate::error::Error;
use crate::shutdown::{Cancelled, Shutdown};

/// The long-running archiver service.
pub struct ArchiverService {
    config: Config,
    client: reqwest::Client,
    shutdown: Shutdown,
}

impl ArchiverService {
    pub fn new(config: Config, client: reqwest::Client, shutdown: Shutdown) -> Self {
        Self {
            config,
            client,
            shutdown,
        }
    }

    /// Run until shutdown: archive everything, sleep until the next
    /// configured run time, repeat.
    pub async fn run(&self) -> Result<(), Cancelled> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            output_path = %self.config.output_path.display(),
            feeds = self.config.feeds.len(),
            "pod-minder started"
        );

        let times = self.config.run_times();

        loop {
            self.archive_all().await?;

            let now = Local::now().naive_local();
            let next = next_run(now, &times);
            let wait = (next - now).to_std().unwrap_or(std::time::Duration::ZERO);

            info!(
                next = %next.format("%Y-%m-%d %H:%M"),
                minutes = (next - now).num_minutes(),
                "waiting for next scheduled run"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.shutdown.cancelled() => return Err(Cancelled),
            }
        }
    }

    /// One full archive pass over all configured feeds, in list order.
    ///
    /// A feed whose fetch or parse fails is skipped for this pass; only
    /// cancellation stops the loop.
    pub async fn archive_all(&self) -> Result<(), Cancelled> {
        info!(feeds = self.config.feeds.len(), "archiving podcast feeds");

        let archiver = FeedArchiver::new(
            self.client.clone(),
            self.config.output_path.clone(),
            self.shutdown.clone(),
        );

        for source in &self.config.feeds {
            self.shutdown.check()?;

            match archiver.run(source).await {
                Ok(summary) => info!(
                    feed = %summary.title,
                    downloaded = summary.download.downloaded,
                    skipped = summary.download.skipped,
                    failed = summary.download.failed,
                    deleted = summary.cleanup.deleted,
                    delete_failed = summary.cleanup.failed,
                    "feed archive finished"
                ),
                Err(Error::Cancelled(cancelled)) => return Err(cancelled),
                Err(e) => {
                    error!(url = %source.url, error = %e, "feed pass failed, continuing with next feed");
                }
            }
        }

        Ok(())
    }
}

/// The soonest instant strictly after `now` among today's and tomorrow's
/// occurrences of the configured times of day.
fn next_run(now: NaiveDateTime, times: &[NaiveTime]) -> NaiveDateTime {
    let today = now.date();
    times
        .iter()
        .flat_map(|time| {
            [
                today.and_time(*time),
                (today + Days::new(1)).and_time(*time),
            ]
        })
        .filter(|candidate| *candidate > now)
        .min()
        // Tomorrow's instants are always in the future, so this only fires
        // for an empty times list
        .unwrap_or_else(|| now + chrono::Duration::days(1))
}
