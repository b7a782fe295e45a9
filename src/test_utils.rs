//! Test fixtures shared across pod-minder tests.
//!
//! Mock factories for episodes and feeds. Customize with struct update
//! syntax:
//!
//! ```ignore
//! let episode = Episode {
//!     authors: vec!["Someone".to_string()],
//!     ..episode_on(2024, 3, 1)
//! };
//! ```

use chrono::{TimeZone, Utc};

use crate::model::{Episode, Feed};

/// An episode published at 06:00 UTC on the given date, with sensible
/// defaults for everything else.
pub fn episode_on(year: i32, month: u32, day: u32) -> Episode {
    Episode {
        url: "https://example.com/episode.mp3".to_string(),
        title: "Test Episode".to_string(),
        pub_date: Utc
            .with_ymd_and_hms(year, month, day, 6, 0, 0)
            .single()
            .expect("valid test date"),
        authors: Vec::new(),
        categories: vec!["Podcast".to_string()],
        description: String::new(),
    }
}

/// Like [`episode_on`] with a custom title; the URL extension stays `.mp3`.
pub fn titled_episode(title: &str, year: i32, month: u32, day: u32) -> Episode {
    Episode {
        title: title.to_string(),
        ..episode_on(year, month, day)
    }
}

/// A feed named "Test Feed" with the given episodes and no cover.
pub fn feed_with(episodes: Vec<Episode>) -> Feed {
    Feed {
        title: "Test Feed".to_string(),
        episodes,
        cover: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_on_defaults() {
        let episode = episode_on(2024, 3, 1);
        assert_eq!(episode.year(), 2024);
        assert_eq!(episode.extension(), ".mp3");
        assert!(episode.authors.is_empty());
    }

    #[test]
    fn test_titled_episode() {
        let episode = titled_episode("Custom", 2023, 1, 2);
        assert_eq!(episode.title, "Custom");
        assert_eq!(episode.year(), 2023);
    }

    #[test]
    fn test_feed_with() {
        let feed = feed_with(vec![episode_on(2024, 1, 1)]);
        assert_eq!(feed.title, "Test Feed");
        assert_eq!(feed.episodes.len(), 1);
        assert!(feed.cover.is_none());
    }
}
