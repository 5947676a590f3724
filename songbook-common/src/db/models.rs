//! Song catalog models
//!
//! Wire names follow the public JSON contract (`group`, `song`, `releaseDate`,
//! `text`, `link`); column names live only in the SQL of the repository.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{Error, Result};

/// Largest page size accepted by any paginated endpoint
pub const MAX_PAGE_SIZE: i64 = 100;

/// A catalog entry as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Song {
    /// Store-assigned identity, immutable after creation
    pub id: i64,
    /// Group / artist name
    pub group: String,
    /// Song title
    pub song: String,
    /// Release date as supplied by the client (not calendar-validated)
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    /// Full lyric text, verses separated by `\n`
    pub text: String,
    /// External link (not validated)
    pub link: String,
}

/// Create request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewSong {
    pub group: String,
    pub song: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl NewSong {
    /// Reject inputs whose lookup keys are blank
    pub fn validate(&self) -> Result<()> {
        if self.group.trim().is_empty() {
            return Err(Error::InvalidInput("group must not be empty".to_string()));
        }
        if self.song.trim().is_empty() {
            return Err(Error::InvalidInput("song must not be empty".to_string()));
        }
        Ok(())
    }

    /// Attach the store-assigned identity
    pub fn into_song(self, id: i64) -> Song {
        Song {
            id,
            group: self.group,
            song: self.song,
            release_date: self.release_date,
            text: self.text,
            link: self.link,
        }
    }
}

/// Mutable song attributes, in partial-update priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongField {
    Group,
    Song,
    ReleaseDate,
    Text,
    Link,
}

impl SongField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongField::Group => "group",
            SongField::Song => "song",
            SongField::ReleaseDate => "releaseDate",
            SongField::Text => "text",
            SongField::Link => "link",
        }
    }
}

/// Partial update request body
///
/// Only the first populated field (group, song, releaseDate, text, link) is
/// applied per request; the others are ignored even when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SongPatch {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default, rename = "releaseDate")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SongPatch {
    /// First populated field in priority order, with its new value
    pub fn first_populated(&self) -> Option<(SongField, &str)> {
        [
            (SongField::Group, &self.group),
            (SongField::Song, &self.song),
            (SongField::ReleaseDate, &self.release_date),
            (SongField::Text, &self.text),
            (SongField::Link, &self.link),
        ]
        .into_iter()
        .find_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (field, v))
        })
    }

    /// Apply the first populated field to `song`
    ///
    /// Returns the field that changed, or `None` when the patch is empty.
    pub fn apply_first(&self, song: &mut Song) -> Option<SongField> {
        let (field, value) = self.first_populated()?;
        let value = value.to_string();
        match field {
            SongField::Group => song.group = value,
            SongField::Song => song.song = value,
            SongField::ReleaseDate => song.release_date = value,
            SongField::Text => song.text = value,
            SongField::Link => song.link = value,
        }
        Some(field)
    }
}

/// Case folding used by the lyric text filter
///
/// Full Unicode lowercase mapping, so "ТЕПЛОЕ" and "теплое" fold alike.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Optional-field predicate for listings
///
/// Empty strings impose no constraint. `text` is a case-insensitive
/// substring match (see [`fold_case`]); every other field is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub group: Option<String>,
    pub song: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SongFilter {
    pub fn group(&self) -> Option<&str> {
        non_empty(&self.group)
    }

    pub fn song(&self) -> Option<&str> {
        non_empty(&self.song)
    }

    pub fn release_date(&self) -> Option<&str> {
        non_empty(&self.release_date)
    }

    pub fn text(&self) -> Option<&str> {
        non_empty(&self.text)
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.link)
    }

    pub fn is_empty(&self) -> bool {
        self.group().is_none()
            && self.song().is_none()
            && self.release_date().is_none()
            && self.text().is_none()
            && self.link().is_none()
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, song: &Song) -> bool {
        let exact = |wanted: Option<&str>, actual: &str| wanted.map_or(true, |w| w == actual);

        exact(self.group(), &song.group)
            && exact(self.song(), &song.song)
            && exact(self.release_date(), &song.release_date)
            && exact(self.link(), &song.link)
            && self
                .text()
                .map_or(true, |needle| fold_case(&song.text).contains(&fold_case(needle)))
    }
}

/// Validated page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Page must be ≥ 1 and limit within [1, MAX_PAGE_SIZE]
    pub fn new(page: i64, limit: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::InvalidInput(format!(
                "page must be at least 1 (got {})",
                page
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(Error::InvalidInput(format!(
                "limit must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, limit
            )));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip for SQL OFFSET
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
