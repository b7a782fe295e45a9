//! Audio file tag writing.
//!
//! Uses the lofty crate for format-independent metadata access. Each freshly
//! downloaded episode gets its tags cleared and rewritten from feed metadata,
//! so stale frames left by publisher tooling never survive into the archive.
//!
//! A failure here is classified separately from a download failure: the file
//! exists on disk (possibly untagged or partially tagged) and will be treated
//! as already archived on the next run.

use chrono::{Datelike, Utc};
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagExt, TagItem};
use std::path::{Path, PathBuf};

use crate::cover;
use crate::model::Episode;

/// Tag clear/write errors. Recovered per episode; the downloaded file stays
/// on disk.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("failed to read tags from {path}: {source}")]
    Read {
        path: PathBuf,
        source: lofty::error::LoftyError,
    },

    #[error("failed to write tags to {path}: {source}")]
    Write {
        path: PathBuf,
        source: lofty::error::LoftyError,
    },
}

/// Remove every recognized tag container from the file.
///
/// Run unconditionally before [`write_tags`] so the fresh tag set is the only
/// one present.
pub fn clear_all_tags(path: &Path) -> Result<(), TagError> {
    let tagged_file = Probe::open(path)
        .map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .read()
        .map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    for tag in tagged_file.tags() {
        tag.remove_from_path(path).map_err(|source| TagError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    Ok(())
}

/// Write a complete tag set for one archived episode.
///
/// `album_artists` is resolved once per year group by the archiver; it is the
/// shared author list when every episode of the year agrees, otherwise
/// "Various Artists".
pub fn write_tags(
    path: &Path,
    episode: &Episode,
    album_title: &str,
    cover_bytes: Option<&[u8]>,
    album_artists: &[String],
) -> Result<(), TagError> {
    let mut tagged_file = Probe::open(path)
        .map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .read()
        .map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    // Get the primary tag type for this format, or create one
    let tag_type = tagged_file.primary_tag_type();
    let tag = if let Some(tag) = tagged_file.tag_mut(tag_type) {
        tag
    } else {
        tagged_file.insert_tag(Tag::new(tag_type));
        tagged_file.tag_mut(tag_type).expect("Just inserted tag")
    };

    tag.set_title(format!(
        "{} {}",
        episode.pub_date.format("%d.%m."),
        episode.title
    ));
    tag.set_track(episode.number());
    tag.set_album(album_title.to_string());
    tag.set_year(tag_year(episode.year()));
    tag.set_comment(episode.description.clone());

    for author in &episode.authors {
        tag.push(TagItem::new(
            ItemKey::TrackArtist,
            ItemValue::Text(author.clone()),
        ));
    }
    for artist in album_artists {
        tag.push(TagItem::new(
            ItemKey::AlbumArtist,
            ItemValue::Text(artist.clone()),
        ));
    }
    for genre in &episode.categories {
        tag.push(TagItem::new(
            ItemKey::Genre,
            ItemValue::Text(genre.clone()),
        ));
    }

    if let Some(data) = cover_bytes {
        let mime = if cover::is_png(data) {
            MimeType::Png
        } else {
            MimeType::Jpeg
        };
        tag.push_picture(Picture::new_unchecked(
            PictureType::CoverFront,
            Some(mime),
            Some("Cover".to_string()),
            data.to_vec(),
        ));
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|source| TagError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Tag year: the publication year when plausible, otherwise the current year.
fn tag_year(year: i32) -> u32 {
    if (1900..=2100).contains(&year) {
        year as u32
    } else {
        Utc::now().year() as u32
    }
}
