//! Domain types for parsed podcast feeds.
//!
//! [`Episode`] and [`Feed`] are built once per parse and live only for the
//! duration of a single archive pass. The authoritative state between runs is
//! the set of files on disk, keyed by folder and date-prefixed file name.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::path::Path;

/// One downloadable audio item within a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// Enclosure media URL. Always non-empty; items without one are dropped
    /// during parsing.
    pub url: String,
    pub title: String,
    pub pub_date: DateTime<Utc>,
    /// Performer names, in feed order. May be empty.
    pub authors: Vec<String>,
    /// Genre labels. Every episode of a feed shares the channel-level list,
    /// prefixed with the fixed "Podcast" entry.
    pub categories: Vec<String>,
    /// Plain-text description, written to the comment tag.
    pub description: String,
}

impl Episode {
    /// Track number, counted backwards from the end of the publication year
    /// so the most recent episode of a year gets the lowest number.
    ///
    /// Dec 31 of a non-leap year yields 1; Jan 1 yields 365 (366 in a leap
    /// year).
    pub fn number(&self) -> u32 {
        days_in_year(self.pub_date.date_naive()) + 1 - self.pub_date.ordinal()
    }

    /// Publication year, used for foldering and album grouping.
    pub fn year(&self) -> i32 {
        self.pub_date.year()
    }

    /// File extension (including the dot) derived from the URL's path
    /// component. Empty when the path carries no extension.
    pub fn extension(&self) -> String {
        reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|url| {
                Path::new(url.path())
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
            })
            .unwrap_or_default()
    }
}

/// One podcast's parsed metadata and episode list.
#[derive(Debug, Clone)]
pub struct Feed {
    pub title: String,
    /// Episodes in feed-document order, assumed newest-first.
    pub episodes: Vec<Episode>,
    /// Channel cover image, already re-encoded to JPEG.
    pub cover: Option<Vec<u8>>,
}

fn days_in_year(date: NaiveDate) -> u32 {
    if date.leap_year() { 366 } else { 365 }
}
