//! Per-feed archiving: the download step and the retention cleanup step.
//!
//! One [`FeedArchiver`] handles one feed end to end: parse, download new
//! episodes into year folders, tag each file, then trim the feed's whole
//! archived history down to its retention count.
//!
//! There is no manifest or database. A file existing at its computed path
//! means the episode is archived; the date prefix of the file name is the
//! only persisted field cleanup reads back. Keep it that way — retention
//! correctness depends on scanning actual files.

use chrono::NaiveDate;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::config::FeedConfig;
use crate::feed::FeedFetcher;
use crate::model::{Episode, Feed};
use crate::sanitize;
use crate::shutdown::{Cancelled, Shutdown};
use crate::tagger::{self, TagError};

/// Applied as the album artist when a year's episodes disagree on authors.
const VARIOUS_ARTISTS: &str = "Various Artists";

/// A failure archiving one episode. Recovered by the download loop; siblings
/// continue. Only the `Cancelled` variant propagates.
#[derive(Debug, thiserror::Error)]
pub enum EpisodeError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to download {url}: {source}")]
    Download { url: String, source: reqwest::Error },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// What happened to a single episode during the download step.
enum Outcome {
    Downloaded,
    Skipped,
}

/// Download step tallies for one feed pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Cleanup step tallies for one feed pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Result of one full feed pass.
#[derive(Debug, Clone)]
pub struct FeedSummary {
    pub title: String,
    pub download: DownloadReport,
    pub cleanup: CleanupReport,
}

/// Archives episodes for one feed into the output directory tree.
pub struct FeedArchiver {
    client: reqwest::Client,
    output_root: PathBuf,
    shutdown: Shutdown,
}

impl FeedArchiver {
    pub fn new(
        client: reqwest::Client,
        output_root: impl Into<PathBuf>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            client,
            output_root: output_root.into(),
            shutdown,
        }
    }

    /// One full pass for one configured feed: parse, download, clean up.
    ///
    /// Fetch/parse failures abort this feed's pass only; the caller moves on
    /// to the next feed.
    pub async fn run(&self, source: &FeedConfig) -> crate::error::Result<FeedSummary> {
        let fetcher = FeedFetcher::new(self.client.clone());
        let feed = fetcher.fetch(&source.url).await?;
        let title = source.title.clone().unwrap_or_else(|| feed.title.clone());

        info!(
            feed = %title,
            url = %source.url,
            max_episodes = %source.count.map(|c| c.to_string()).unwrap_or_else(|| "all".to_string()),
            "starting feed archive"
        );

        let download = self.download(&feed, &title, source.count).await?;
        let cleanup = self.cleanup(&title, source.count)?;

        Ok(FeedSummary {
            title,
            download,
            cleanup,
        })
    }

    /// Download and tag every selected episode.
    ///
    /// With a retention count only the first `count` episodes are considered
    /// (document order, assumed newest-first). Episodes are grouped by
    /// publication year for foldering and album-artist resolution. Any
    /// per-episode failure is logged and tallied; the loop continues.
    pub async fn download(
        &self,
        feed: &Feed,
        feed_title: &str,
        count: Option<usize>,
    ) -> Result<DownloadReport, Cancelled> {
        let selected: Vec<&Episode> = match count {
            Some(n) => feed.episodes.iter().take(n).collect(),
            None => feed.episodes.iter().collect(),
        };

        let mut report = DownloadReport::default();

        for (year, group) in group_by_year(&selected) {
            let album_artists = resolve_album_artists(&group);
            let album_title = format!("{feed_title} ({year})");
            let folder = self.output_root.join(sanitize::folder_name(&album_title));

            for episode in group {
                self.shutdown.check()?;

                let archived = self
                    .archive_episode(
                        episode,
                        &folder,
                        &album_title,
                        feed.cover.as_deref(),
                        &album_artists,
                    )
                    .await;

                match archived {
                    Ok(Outcome::Downloaded) => report.downloaded += 1,
                    Ok(Outcome::Skipped) => report.skipped += 1,
                    Err(EpisodeError::Cancelled(cancelled)) => return Err(cancelled),
                    Err(e) => {
                        error!(episode = %episode.title, error = %e, "episode archive failed");
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    async fn archive_episode(
        &self,
        episode: &Episode,
        folder: &Path,
        album_title: &str,
        cover: Option<&[u8]>,
        album_artists: &[String],
    ) -> Result<Outcome, EpisodeError> {
        if !folder.exists() {
            info!(path = %folder.display(), "creating directory");
            std::fs::create_dir_all(folder).map_err(|source| EpisodeError::CreateDir {
                path: folder.to_path_buf(),
                source,
            })?;
        }

        let path = folder.join(episode_file_name(episode));

        if path.exists() {
            debug!(path = %path.display(), "episode already archived, skipping");
            return Ok(Outcome::Skipped);
        }

        info!(path = %path.display(), "downloading episode");
        self.fetch_to_file(&episode.url, &path).await?;

        info!(path = %path.display(), "tagging episode");
        tagger::clear_all_tags(&path)?;
        tagger::write_tags(&path, episode, album_title, cover, album_artists)?;

        Ok(Outcome::Downloaded)
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<(), EpisodeError> {
        let result = self.stream_to_file(url, path).await;

        // A half-written download must not satisfy the exists() check on the
        // next run. Cancellation is the exception: leave whatever is there
        // and stop immediately.
        if let Err(e) = &result
            && !matches!(e, EpisodeError::Cancelled(_))
        {
            let _ = std::fs::remove_file(path);
        }
        result
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<(), EpisodeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| EpisodeError::Download {
                url: url.to_string(),
                source,
            })?;

        let mut file =
            tokio::fs::File::create(path)
                .await
                .map_err(|source| EpisodeError::FileWrite {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            if self.shutdown.is_cancelled() {
                return Err(Cancelled.into());
            }
            let bytes = chunk.map_err(|source| EpisodeError::Download {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&bytes)
                .await
                .map_err(|source| EpisodeError::FileWrite {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        file.flush().await.map_err(|source| EpisodeError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Enforce the retention count across the feed's entire archived history.
    ///
    /// Every year folder ever created for this feed is scanned, files are
    /// sorted by the date parsed from their name prefix, and everything
    /// beyond the newest `count` is deleted. The cap is global across years,
    /// not per folder. No-op without a retention count.
    pub fn cleanup(
        &self,
        feed_title: &str,
        count: Option<usize>,
    ) -> Result<CleanupReport, Cancelled> {
        let Some(keep) = count else {
            return Ok(CleanupReport::default());
        };

        let folder_prefix = format!("{} (", sanitize::folder_name(feed_title));
        let mut files = collect_archived_files(&self.output_root, &folder_prefix);

        // Newest first across every year folder; unparsable names sort last
        files.sort_by(|a, b| b.date.cmp(&a.date));

        let mut report = CleanupReport::default();
        for file in files.into_iter().skip(keep) {
            self.shutdown.check()?;
            info!(path = %file.path.display(), "deleting old episode");
            match std::fs::remove_file(&file.path) {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    error!(path = %file.path.display(), error = %e, "failed to delete old episode");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Target file name: date prefix, sanitized title, extension from the URL.
/// The date prefix doubles as the field cleanup parses back out.
fn episode_file_name(episode: &Episode) -> String {
    format!(
        "{} {}{}",
        episode.pub_date.format("%Y-%m-%d"),
        sanitize::file_name(&episode.title),
        episode.extension()
    )
}

/// Group episodes by publication year, keeping first-occurrence order of the
/// years and the incoming order within each group.
fn group_by_year<'a>(episodes: &[&'a Episode]) -> Vec<(i32, Vec<&'a Episode>)> {
    let mut groups: Vec<(i32, Vec<&Episode>)> = Vec::new();
    for &episode in episodes {
        match groups.iter_mut().find(|(year, _)| *year == episode.year()) {
            Some((_, group)) => group.push(episode),
            None => groups.push((episode.year(), vec![episode])),
        }
    }
    groups
}

/// Album artists for one year group: the shared author list when every
/// episode agrees (order-sensitive), otherwise "Various Artists".
fn resolve_album_artists(group: &[&Episode]) -> Vec<String> {
    let Some(first) = group.first() else {
        return Vec::new();
    };
    if group.iter().all(|episode| episode.authors == first.authors) {
        first.authors.clone()
    } else {
        vec![VARIOUS_ARTISTS.to_string()]
    }
}

struct ArchivedFile {
    path: PathBuf,
    date: NaiveDate,
}

fn collect_archived_files(root: &Path, folder_prefix: &str) -> Vec<ArchivedFile> {
    let Ok(entries) = std::fs::read_dir(root) else {
        // Nothing archived yet
        return Vec::new();
    };

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(folder_prefix) || !entry.path().is_dir() {
            continue;
        }
        let Ok(children) = std::fs::read_dir(entry.path()) else {
            continue;
        };
        for child in children.flatten() {
            let path = child.path();
            if !path.is_file() {
                continue;
            }
            let date = child
                .file_name()
                .to_str()
                .map(parse_date_prefix)
                .unwrap_or(NaiveDate::MIN);
            files.push(ArchivedFile { path, date });
        }
    }
    files
}

/// Date reconstructed from the first 10 characters of a file name. Names
/// that don't parse get the minimum date and become the first deletion
/// candidates under retention pressure.
fn parse_date_prefix(name: &str) -> NaiveDate {
    name.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .unwrap_or(NaiveDate::MIN)
}

// ============================================================================
// Tests
// ============================================================================
