//! In-memory song repository
//!
//! Same contract as the SQLite adapter, held in a `BTreeMap` behind a tokio
//! `RwLock`. Used by tests and by `--in-memory` runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use songbook_common::db::{NewSong, PageRequest, Song, SongFilter, SongPatch};
use songbook_common::Result;
use tokio::sync::RwLock;
use tracing::{debug, info_span, Span};

use super::{group_song_not_found, song_not_found, SongPage, SongRepository};

#[derive(Default)]
struct Store {
    songs: BTreeMap<i64, Song>,
    last_id: i64,
}

/// Song repository held entirely in process memory
pub struct InMemorySongRepository {
    store: RwLock<Store>,
    span: Span,
}

impl Default for InMemorySongRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySongRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
            span: info_span!("song_repository", backend = "memory"),
        }
    }
}

fn list_key(song: &Song) -> (&str, &str, &str, &str, &str, i64) {
    (
        &song.group,
        &song.song,
        &song.release_date,
        &song.text,
        &song.link,
        song.id,
    )
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
    async fn create(&self, input: NewSong) -> Result<Song> {
        let mut store = self.store.write().await;
        store.last_id += 1;
        let song = input.into_song(store.last_id);
        store.songs.insert(song.id, song.clone());

        debug!(parent: &self.span, id = song.id, "song created");
        Ok(song)
    }

    async fn get_by_id(&self, id: i64) -> Result<Song> {
        let store = self.store.read().await;
        store.songs.get(&id).cloned().ok_or_else(|| song_not_found(id))
    }

    async fn get_by_group_and_song(&self, group: &str, song: &str) -> Result<Song> {
        let store = self.store.read().await;
        // BTreeMap iterates in id order, so the first hit has the lowest id
        store
            .songs
            .values()
            .find(|s| s.group == group && s.song == song)
            .cloned()
            .ok_or_else(|| group_song_not_found(group, song))
    }

    async fn list_filtered(&self, filter: &SongFilter, page: PageRequest) -> Result<SongPage> {
        let store = self.store.read().await;

        let mut matching: Vec<&Song> = store.songs.values().filter(|s| filter.matches(s)).collect();
        matching.sort_by(|a, b| list_key(a).cmp(&list_key(b)));

        let total_items = matching.len() as i64;
        let songs = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        debug!(
            parent: &self.span,
            filtered = !filter.is_empty(),
            total_items,
            page = page.page(),
            "songs listed"
        );

        Ok(SongPage { songs, total_items })
    }

    async fn update_field(&self, patch: &SongPatch, current: Song) -> Result<Song> {
        let mut song = current;
        if patch.apply_first(&mut song).is_none() {
            return Ok(song);
        }

        let mut store = self.store.write().await;
        match store.songs.get_mut(&song.id) {
            Some(stored) => {
                *stored = song.clone();
                debug!(parent: &self.span, id = song.id, "song updated");
                Ok(song)
            }
            None => Err(song_not_found(song.id)),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let removed = self.store.write().await.songs.remove(&id).is_some();
        debug!(parent: &self.span, id, removed, "song deleted");
        Ok(())
    }
}
