//! Feed retrieval and normalization.
//!
//! Fetches an RSS document over HTTP and reduces it to the in-memory
//! [`Feed`] model: channel title, a normalized episode list, and an optional
//! re-encoded cover image. XML mechanics are delegated to the `rss` crate.
//!
//! The channel-level iTunes category list is read once and reused for every
//! episode of the feed. Per-item `<category>` elements are ignored. This
//! mirrors the long-standing behavior archives were built with; changing it
//! would re-tag every episode on the next retention cycle.

use rss::Channel;
use tracing::{debug, warn};

use crate::cover;
use crate::model::{Episode, Feed};

/// Fixed first genre entry for every archived episode.
const CATEGORY_PREFIX: &str = "Podcast";

/// Feed retrieval/parsing errors. Either kind aborts the current pass for
/// this feed only.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to fetch feed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to parse feed: {0}")]
    Parse(#[from] rss::Error),
}

/// Fetches and parses podcast feeds using a shared HTTP client.
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Retrieve and normalize the feed at `url`.
    ///
    /// The cover image is best-effort: any failure fetching or re-encoding it
    /// is logged and the feed proceeds without one.
    pub async fn fetch(&self, url: &str) -> Result<Feed, FeedError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        let channel = Channel::read_from(&body[..])?;

        let title = if channel.title().trim().is_empty() {
            "Unknown".to_string()
        } else {
            channel.title().to_string()
        };

        let cover = match channel.image().map(|image| image.url().to_string()) {
            Some(cover_url) if !cover_url.trim().is_empty() => {
                self.fetch_cover(&cover_url).await
            }
            _ => {
                debug!(feed = %title, "feed has no cover image");
                None
            }
        };

        Ok(Feed {
            title,
            episodes: build_episodes(&channel),
            cover,
        })
    }

    async fn fetch_cover(&self, url: &str) -> Option<Vec<u8>> {
        let fetched = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(response.bytes().await?.to_vec())
        }
        .await;

        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url, error = %e, "cover fetch failed, continuing without cover");
                return None;
            }
        };

        match cover::resize_to_jpeg(&bytes, cover::MAX_COVER_EDGE) {
            Ok(jpeg) => Some(jpeg),
            Err(e) => {
                warn!(url, error = %e, "cover re-encode failed, continuing without cover");
                None
            }
        }
    }
}

/// Map channel items to [`Episode`]s in document order.
///
/// Items without a usable enclosure URL are silently dropped. Pure so parser
/// tests can run on inline XML without touching the network.
fn build_episodes(channel: &Channel) -> Vec<Episode> {
    // Channel-level list, shared by every episode (see module docs)
    let categories: Vec<String> = std::iter::once(CATEGORY_PREFIX.to_string())
        .chain(
            channel
                .itunes_ext()
                .map(|ext| ext.categories())
                .unwrap_or_default()
                .iter()
                .map(|category| category.text().to_string())
                .filter(|text| !text.trim().is_empty()),
        )
        .collect();

    channel
        .items()
        .iter()
        .filter_map(|item| {
            let url = item.enclosure().map(|e| e.url().trim()).unwrap_or_default();
            if url.is_empty() {
                return None;
            }

            let pub_date = item
                .pub_date()
                .and_then(parse_pub_date)
                .unwrap_or_else(chrono::Utc::now);

            let authors = item
                .itunes_ext()
                .and_then(|ext| ext.author())
                .map(split_authors)
                .unwrap_or_default();

            Some(Episode {
                url: url.to_string(),
                title: item.title().unwrap_or("Unknown").to_string(),
                pub_date,
                authors,
                categories: categories.clone(),
                description: item.description().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

fn parse_pub_date(value: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc2822(value)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}

fn split_authors(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc};

    fn channel_from(xml: &str) -> Channel {
        Channel::read_from(xml.as_bytes()).unwrap()
    }

    const PODCAST_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Night Signals</title>
    <image><url>https://example.com/cover.png</url></image>
    <itunes:category text="Technology"/>
    <itunes:category text="News"/>
    <item>
      <title>Signal One</title>
      <pubDate>Wed, 03 Jan 2024 06:00:00 +0000</pubDate>
      <description>The first signal.</description>
      <itunes:author>Ada Byron, Charles Babbage</itunes:author>
      <enclosure url="https://example.com/ep1.mp3" type="audio/mpeg" length="1"/>
    </item>
    <item>
      <title>Signal Two</title>
      <pubDate>Mon, 01 Jan 2024 06:00:00 +0000</pubDate>
      <enclosure url="https://example.com/ep2.mp3" type="audio/mpeg" length="1"/>
    </item>
    <item>
      <title>No Audio Here</title>
      <pubDate>Sun, 31 Dec 2023 06:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_items_without_enclosure_are_dropped() {
        let episodes = build_episodes(&channel_from(PODCAST_XML));
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].title, "Signal One");
        assert_eq!(episodes[1].title, "Signal Two");
    }

    #[test]
    fn test_document_order_preserved() {
        let episodes = build_episodes(&channel_from(PODCAST_XML));
        assert_eq!(episodes[0].url, "https://example.com/ep1.mp3");
        assert_eq!(episodes[1].url, "https://example.com/ep2.mp3");
    }

    #[test]
    fn test_channel_categories_shared_by_all_episodes() {
        let episodes = build_episodes(&channel_from(PODCAST_XML));
        let expected = vec![
            "Podcast".to_string(),
            "Technology".to_string(),
            "News".to_string(),
        ];
        for episode in &episodes {
            assert_eq!(episode.categories, expected);
        }
    }

    #[test]
    fn test_authors_split_and_trimmed() {
        let episodes = build_episodes(&channel_from(PODCAST_XML));
        assert_eq!(episodes[0].authors, vec!["Ada Byron", "Charles Babbage"]);
        // Missing itunes:author gives an empty list
        assert!(episodes[1].authors.is_empty());
    }

    #[test]
    fn test_description_defaults_to_empty() {
        let episodes = build_episodes(&channel_from(PODCAST_XML));
        assert_eq!(episodes[0].description, "The first signal.");
        assert_eq!(episodes[1].description, "");
    }

    #[test]
    fn test_pub_date_parsed() {
        let episodes = build_episodes(&channel_from(PODCAST_XML));
        let date = episodes[0].pub_date;
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 3));
        assert_eq!(date.hour(), 6);
    }

    #[test]
    fn test_unparsable_pub_date_defaults_to_now() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>t</title>
    <item>
      <title>Bad Date</title>
      <pubDate>sometime last week</pubDate>
      <enclosure url="https://example.com/e.mp3" type="audio/mpeg" length="1"/>
    </item>
  </channel>
</rss>"#;

        let before = Utc::now();
        let episodes = build_episodes(&channel_from(xml));
        let after = Utc::now();

        assert!(episodes[0].pub_date >= before && episodes[0].pub_date <= after);
    }

    #[test]
    fn test_missing_title_defaults_to_unknown() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>t</title>
    <item>
      <enclosure url="https://example.com/e.mp3" type="audio/mpeg" length="1"/>
    </item>
  </channel>
</rss>"#;

        let episodes = build_episodes(&channel_from(xml));
        assert_eq!(episodes[0].title, "Unknown");
    }

    #[test]
    fn test_no_itunes_ext_yields_prefix_only() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>t</title>
    <item>
      <title>e</title>
      <enclosure url="https://example.com/e.mp3" type="audio/mpeg" length="1"/>
    </item>
  </channel>
</rss>"#;

        let episodes = build_episodes(&channel_from(xml));
        assert_eq!(episodes[0].categories, vec!["Podcast".to_string()]);
    }

    #[test]
    fn test_split_authors_semicolons_and_empties() {
        assert_eq!(split_authors("A; B ;; C,"), vec!["A", "B", "C"]);
        assert!(split_authors("  ").is_empty());
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let result = Channel::read_from("<not-rss/>".as_bytes());
        assert!(result.is_err());
    }
}
