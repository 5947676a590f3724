//! SQLite song repository
//!
//! Every operation is a single parameterized statement (two for listings:
//! count + page). No explicit transactions; isolation is SQLite's own.

use async_trait::async_trait;
use songbook_common::db::{fold_case, NewSong, PageRequest, Song, SongFilter, SongPatch};
use songbook_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info_span, Span};

use super::{group_song_not_found, song_not_found, SongPage, SongRepository};

const SONG_COLUMNS: &str = "id, group_name, song_name, release_date, text, link";

/// Deterministic listing order; id breaks ties between identical rows
const LIST_ORDER: &str = "group_name, song_name, release_date, text, link, id";

/// Song repository backed by a SQLite pool
#[derive(Clone)]
pub struct SqliteSongRepository {
    pool: SqlitePool,
    span: Span,
}

impl SqliteSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            span: info_span!("song_repository", backend = "sqlite"),
        }
    }
}

fn song_from_row(row: &SqliteRow) -> std::result::Result<Song, sqlx::Error> {
    Ok(Song {
        id: row.try_get("id")?,
        group: row.try_get("group_name")?,
        song: row.try_get("song_name")?,
        release_date: row.try_get("release_date")?,
        text: row.try_get("text")?,
        link: row.try_get("link")?,
    })
}

/// WHERE clause (empty when no filter field is set) and its bind values
///
/// Only populated fields contribute a predicate; they are joined with AND.
pub(crate) fn filter_clause(filter: &SongFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut binds = Vec::new();

    let exact = [
        ("group_name", filter.group()),
        ("song_name", filter.song()),
        ("release_date", filter.release_date()),
        ("link", filter.link()),
    ];
    for (column, value) in exact {
        if let Some(value) = value {
            clauses.push(format!("{} = ?", column));
            binds.push(value.to_string());
        }
    }

    // instr() instead of LIKE so '%' and '_' in the needle match literally;
    // both sides are folded in Rust since SQLite's lower() is ASCII-only
    if let Some(needle) = filter.text() {
        clauses.push("instr(text_folded, ?) > 0".to_string());
        binds.push(fold_case(needle));
    }

    if clauses.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), binds)
    }
}

#[async_trait]
impl SongRepository for SqliteSongRepository {
    async fn create(&self, input: NewSong) -> Result<Song> {
        let result = sqlx::query(
            r#"
            INSERT INTO songs (group_name, song_name, release_date, text, link, text_folded)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.group)
        .bind(&input.song)
        .bind(&input.release_date)
        .bind(&input.text)
        .bind(&input.link)
        .bind(fold_case(&input.text))
        .execute(&self.pool)
        .await
        .map_err(|e| Error::storage("create", e))?;

        let id = result.last_insert_rowid();
        debug!(parent: &self.span, id, group = %input.group, song = %input.song, "song created");

        Ok(input.into_song(id))
    }

    async fn get_by_id(&self, id: i64) -> Result<Song> {
        let sql = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::storage("get_by_id", e))?;

        match row {
            Some(row) => song_from_row(&row).map_err(|e| Error::storage("get_by_id", e)),
            None => {
                debug!(parent: &self.span, id, "song not found");
                Err(song_not_found(id))
            }
        }
    }

    async fn get_by_group_and_song(&self, group: &str, song: &str) -> Result<Song> {
        let sql = format!(
            "SELECT {} FROM songs WHERE group_name = ? AND song_name = ? ORDER BY id LIMIT 1",
            SONG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(group)
            .bind(song)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::storage("get_by_group_and_song", e))?;

        match row {
            Some(row) => {
                song_from_row(&row).map_err(|e| Error::storage("get_by_group_and_song", e))
            }
            None => {
                debug!(parent: &self.span, group, song, "song not found");
                Err(group_song_not_found(group, song))
            }
        }
    }

    async fn list_filtered(&self, filter: &SongFilter, page: PageRequest) -> Result<SongPage> {
        let (where_clause, binds) = filter_clause(filter);

        let count_sql = format!("SELECT COUNT(*) FROM songs{}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count_query = count_query.bind(value);
        }
        let total_items = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Error::storage("list_filtered", e))?;

        let page_sql = format!(
            "SELECT {} FROM songs{} ORDER BY {} LIMIT ? OFFSET ?",
            SONG_COLUMNS, where_clause, LIST_ORDER
        );
        let mut page_query = sqlx::query(&page_sql);
        for value in &binds {
            page_query = page_query.bind(value);
        }
        let rows = page_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::storage("list_filtered", e))?;

        let songs = rows
            .iter()
            .map(song_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::storage("list_filtered", e))?;

        debug!(
            parent: &self.span,
            filtered = !filter.is_empty(),
            total_items,
            returned = songs.len(),
            page = page.page(),
            limit = page.limit(),
            "songs listed"
        );

        Ok(SongPage { songs, total_items })
    }

    async fn update_field(&self, patch: &SongPatch, current: Song) -> Result<Song> {
        let mut song = current;
        let Some(field) = patch.apply_first(&mut song) else {
            debug!(parent: &self.span, id = song.id, "empty patch, nothing to update");
            return Ok(song);
        };

        let result = sqlx::query(
            r#"
            UPDATE songs
            SET group_name = ?,
                song_name = ?,
                release_date = ?,
                text = ?,
                link = ?,
                text_folded = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&song.group)
        .bind(&song.song)
        .bind(&song.release_date)
        .bind(&song.text)
        .bind(&song.link)
        .bind(fold_case(&song.text))
        .bind(song.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::storage("update_field", e))?;

        if result.rows_affected() == 0 {
            return Err(song_not_found(song.id));
        }

        debug!(parent: &self.span, id = song.id, field = field.as_str(), "song updated");
        Ok(song)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::storage("delete", e))?;

        debug!(parent: &self.span, id, rows = result.rows_affected(), "song deleted");
        Ok(())
    }
}
