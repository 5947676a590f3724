//! Song catalog service
//!
//! Thin layer between handlers and the repository. The only logic of its
//! own is splitting lyric text into verses.

use std::sync::Arc;

use songbook_common::db::{NewSong, PageRequest, Song, SongFilter, SongPatch};
use songbook_common::Result;
use tracing::{debug, info_span, Span};

use crate::db::{SongPage, SongRepository};

/// A song title with its verse sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongVerses {
    pub song: String,
    pub verses: Vec<String>,
}

/// Split lyric text into verses at each `\n`
///
/// No trimming; blank lines are kept as empty verses.
pub fn split_verses(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

#[derive(Clone)]
pub struct SongService {
    repo: Arc<dyn SongRepository>,
    span: Span,
}

impl SongService {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self {
        Self {
            repo,
            span: info_span!("song_service"),
        }
    }

    pub async fn create(&self, input: NewSong) -> Result<Song> {
        self.repo.create(input).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Song> {
        self.repo.get_by_id(id).await
    }

    pub async fn get_by_group_and_song(&self, group: &str, song: &str) -> Result<Song> {
        self.repo.get_by_group_and_song(group, song).await
    }

    pub async fn list(&self, filter: &SongFilter, page: PageRequest) -> Result<SongPage> {
        self.repo.list_filtered(filter, page).await
    }

    pub async fn update_field(&self, patch: &SongPatch, current: Song) -> Result<Song> {
        self.repo.update_field(patch, current).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await
    }

    /// Song title and its verses; a missing song stays `NotFound`
    pub async fn get_text(&self, id: i64) -> Result<SongVerses> {
        let song = self.repo.get_by_id(id).await?;
        let verses = split_verses(&song.text);
        debug!(parent: &self.span, id, verses = verses.len(), "split song text");

        Ok(SongVerses {
            song: song.song,
            verses,
        })
    }
}
