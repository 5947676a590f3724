//! Persistence layer for the song catalog
//!
//! [`SongRepository`] is the seam between the domain service and storage.
//! [`SqliteSongRepository`] is the production adapter; [`InMemorySongRepository`]
//! is a drop-in fake with the same semantics.

use async_trait::async_trait;
use songbook_common::db::{NewSong, PageRequest, Song, SongFilter, SongPatch};
use songbook_common::Result;

mod memory;
mod sqlite;

pub use memory::InMemorySongRepository;
pub use sqlite::SqliteSongRepository;

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPage {
    /// Rows on this page, in listing order
    pub songs: Vec<Song>,
    /// Matching rows across all pages
    pub total_items: i64,
}

/// Storage operations for songs
///
/// Lookups report a missing row as [`songbook_common::Error::NotFound`];
/// every other failure is [`songbook_common::Error::Storage`] carrying the
/// operation name.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Insert a new song and return it with its assigned identity
    ///
    /// Duplicate (group, song) pairs are accepted.
    async fn create(&self, input: NewSong) -> Result<Song>;

    /// Fetch one song by identity
    async fn get_by_id(&self, id: i64) -> Result<Song>;

    /// Fetch one song by exact group and title
    ///
    /// When duplicates exist the one with the lowest identity is returned.
    async fn get_by_group_and_song(&self, group: &str, song: &str) -> Result<Song>;

    /// Filtered listing ordered by group, song, release date, text, link
    ///
    /// `page` is trusted to be validated by the caller.
    async fn list_filtered(&self, filter: &SongFilter, page: PageRequest) -> Result<SongPage>;

    /// Apply the first populated field of `patch` to `current` and persist it
    ///
    /// An empty patch writes nothing and returns `current` unchanged.
    async fn update_field(&self, patch: &SongPatch, current: Song) -> Result<Song>;

    /// Remove a song; deleting an unknown identity is not an error
    async fn delete(&self, id: i64) -> Result<()>;
}

fn song_not_found(id: i64) -> songbook_common::Error {
    songbook_common::Error::NotFound(format!("song {} not found", id))
}

fn group_song_not_found(group: &str, song: &str) -> songbook_common::Error {
    songbook_common::Error::NotFound(format!("song '{}' by '{}' not found", song, group))
}
