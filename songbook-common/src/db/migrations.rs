//! Database schema migrations
//!
//! Versioned, idempotent schema changes tracked in the `schema_version`
//! table. Each migration checks the current shape of the database before
//! changing it, so re-running against an already migrated file is a no-op.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - databases in the field were built from them
//! 2. **Always add new migrations** - one function per schema change
//! 3. **Prefer ALTER TABLE** over DROP/CREATE to preserve catalog data

use crate::db::models::fold_case;
use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Get current schema version from database
///
/// Returns 0 if schema_version has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> = sqlx::query_scalar(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1"
    )
    .fetch_optional(pool)
    .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;

    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    if current_version < 3 {
        migrate_v3(pool).await?;
        set_schema_version(pool, 3).await?;
        info!("✓ Migration v3 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: songs table
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Create songs table");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            group_name TEXT NOT NULL,
            song_name TEXT NOT NULL,
            release_date TEXT NOT NULL DEFAULT '',
            text TEXT NOT NULL DEFAULT '',
            link TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Migration v2: index for lookups by group and song title
///
/// Deliberately non-unique: the catalog accepts duplicate (group, song)
/// pairs and lookups resolve them to the lowest id.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Index songs by group and title");

    let has_index: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='index' AND name='idx_songs_group_song'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if has_index {
        info!("  idx_songs_group_song already exists - skipping");
        return Ok(());
    }

    sqlx::query("CREATE INDEX idx_songs_group_song ON songs (group_name, song_name)")
        .execute(pool)
        .await?;

    info!("  ✓ Created idx_songs_group_song");
    Ok(())
}

/// Migration v3: case-folded copy of the lyric text
///
/// SQLite's `lower()` only maps ASCII, so the folded text is computed in
/// Rust and kept alongside `text` by the repository.
async fn migrate_v3(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v3: Add songs.text_folded");

    let has_column: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pragma_table_info('songs') WHERE name = 'text_folded')",
    )
    .fetch_one(pool)
    .await?;

    if !has_column {
        sqlx::query("ALTER TABLE songs ADD COLUMN text_folded TEXT NOT NULL DEFAULT ''")
            .execute(pool)
            .await?;
    }

    let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, text FROM songs")
        .fetch_all(pool)
        .await?;

    for (id, text) in &rows {
        sqlx::query("UPDATE songs SET text_folded = ? WHERE id = ?")
            .bind(fold_case(text))
            .bind(id)
            .execute(pool)
            .await?;
    }

    info!("  ✓ Folded text for {} existing songs", rows.len());
    Ok(())
}
