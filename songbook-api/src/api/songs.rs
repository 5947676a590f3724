//! Song catalog endpoints
//!
//! Request validation (JSON body, query string, path id, pagination bounds)
//! completes before the service is called, so malformed requests never
//! reach storage.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use songbook_common::db::{NewSong, Song, SongFilter, SongPatch};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::pagination::{
    page_request, total_pages, verse_window, DEFAULT_LIST_LIMIT, DEFAULT_VERSE_LIMIT,
};
use crate::AppState;

/// Build song routes
pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/songs",
            get(list_songs)
                .post(create_song)
                .patch(update_song)
                .delete(delete_song),
        )
        .route("/songs/:id", get(get_song))
        .route("/songs/:id/text", get(get_song_text))
        .route("/info", get(get_song_info))
}

/// Filter and pagination query for listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSongsQuery {
    /// Exact group name
    pub group: Option<String>,
    /// Exact song title
    pub song: Option<String>,
    /// Exact release date
    pub release_date: Option<String>,
    /// Case-insensitive substring of the lyrics
    pub text: Option<String>,
    /// Exact link
    pub link: Option<String>,
    /// Page number, 1-based (default 1)
    pub page: Option<i64>,
    /// Page size, 1..=100 (default 10)
    pub limit: Option<i64>,
}

impl ListSongsQuery {
    fn filter(&self) -> SongFilter {
        SongFilter {
            group: self.group.clone(),
            song: self.song.clone(),
            release_date: self.release_date.clone(),
            text: self.text.clone(),
            link: self.link.clone(),
        }
    }
}

/// Verse pagination query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VersePageQuery {
    /// Page number, 1-based (default 1)
    pub page: Option<i64>,
    /// Verses per page, 1..=100 (default 2)
    pub limit: Option<i64>,
}

/// Lookup by group and title, used by `/info`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InfoQuery {
    /// Group name
    pub group: Option<String>,
    /// Song title
    pub song: Option<String>,
}

/// Lookup by group and title, used by PATCH and DELETE
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SongKeyQuery {
    /// Group name
    pub group: Option<String>,
    /// Song title
    pub song_name: Option<String>,
}

/// Listing response
#[derive(Debug, Serialize, ToSchema)]
pub struct SongsPageResponse {
    pub data: Vec<Song>,
    pub page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

/// One page of verses
#[derive(Debug, Serialize, ToSchema)]
pub struct SongTextResponse {
    pub song: String,
    pub verses: Vec<String>,
}

/// Song details without the identity
#[derive(Debug, Serialize, ToSchema)]
pub struct SongInfoResponse {
    pub group: String,
    pub song: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl From<Song> for SongInfoResponse {
    fn from(song: Song) -> Self {
        Self {
            group: song.group,
            song: song.song,
            release_date: song.release_date,
            text: song.text,
            link: song.link,
        }
    }
}

/// Deletion acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteSongResponse {
    pub message: String,
    pub song: String,
    pub id: i64,
}

fn required_pair(
    first: Option<String>,
    second: Option<String>,
    names: &str,
) -> ApiResult<(String, String)> {
    match (first, second) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(ApiError::BadRequest(format!("{} parameters are required", names))),
    }
}

/// POST /songs
#[utoipa::path(
    post,
    tag = "songs",
    path = "/songs",
    request_body = NewSong,
    responses(
        (status = 200, description = "Created song", body = Song),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn create_song(
    State(state): State<AppState>,
    body: Result<Json<NewSong>, JsonRejection>,
) -> ApiResult<Json<Song>> {
    let Json(input) = body?;
    input.validate()?;

    let song = state.service.create(input).await?;
    info!(id = song.id, group = %song.group, song = %song.song, "Song created");

    Ok(Json(song))
}

/// GET /songs
#[utoipa::path(
    get,
    tag = "songs",
    path = "/songs",
    params(ListSongsQuery),
    responses(
        (status = 200, description = "Page of matching songs", body = SongsPageResponse),
        (status = 400, description = "Invalid query or pagination", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn list_songs(
    State(state): State<AppState>,
    query: Result<Query<ListSongsQuery>, QueryRejection>,
) -> ApiResult<Json<SongsPageResponse>> {
    let Query(query) = query?;
    let page = page_request(query.page, query.limit, DEFAULT_LIST_LIMIT)?;

    let result = state.service.list(&query.filter(), page).await?;

    Ok(Json(SongsPageResponse {
        data: result.songs,
        page: page.page(),
        total_pages: total_pages(result.total_items, page.limit()),
        total_items: result.total_items,
    }))
}

/// GET /songs/{id}
#[utoipa::path(
    get,
    tag = "songs",
    path = "/songs/{id}",
    params(("id" = i64, Path, description = "Song identifier")),
    responses(
        (status = 200, description = "Song", body = Song),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 404, description = "No such song", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn get_song(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Song>> {
    let Path(id) = id?;
    Ok(Json(state.service.get_by_id(id).await?))
}

/// GET /songs/{id}/text
#[utoipa::path(
    get,
    tag = "songs",
    path = "/songs/{id}/text",
    params(("id" = i64, Path, description = "Song identifier"), VersePageQuery),
    responses(
        (status = 200, description = "Page of verses", body = SongTextResponse),
        (status = 400, description = "Invalid identifier or pagination", body = ErrorResponse),
        (status = 404, description = "No such song", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn get_song_text(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<VersePageQuery>, QueryRejection>,
) -> ApiResult<Json<SongTextResponse>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let page = page_request(query.page, query.limit, DEFAULT_VERSE_LIMIT)?;

    let text = state.service.get_text(id).await?;
    let window = verse_window(text.verses.len(), page);

    Ok(Json(SongTextResponse {
        song: text.song,
        verses: text.verses[window].to_vec(),
    }))
}

/// PATCH /songs
///
/// Only the first populated body field is applied.
#[utoipa::path(
    patch,
    tag = "songs",
    path = "/songs",
    params(SongKeyQuery),
    request_body = SongPatch,
    responses(
        (status = 200, description = "Updated song", body = Song),
        (status = 400, description = "Missing lookup keys or invalid body", body = ErrorResponse),
        (status = 404, description = "No such song", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn update_song(
    State(state): State<AppState>,
    query: Result<Query<SongKeyQuery>, QueryRejection>,
    body: Result<Json<SongPatch>, JsonRejection>,
) -> ApiResult<Json<Song>> {
    let Query(query) = query?;
    let (group, song_name) = required_pair(query.group, query.song_name, "group and song_name")?;
    let Json(patch) = body?;

    let current = state.service.get_by_group_and_song(&group, &song_name).await?;
    let updated = state.service.update_field(&patch, current).await?;
    info!(id = updated.id, "Song updated");

    Ok(Json(updated))
}

/// DELETE /songs
#[utoipa::path(
    delete,
    tag = "songs",
    path = "/songs",
    params(SongKeyQuery),
    responses(
        (status = 200, description = "Song deleted", body = DeleteSongResponse),
        (status = 400, description = "Missing lookup keys", body = ErrorResponse),
        (status = 404, description = "No such song", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn delete_song(
    State(state): State<AppState>,
    query: Result<Query<SongKeyQuery>, QueryRejection>,
) -> ApiResult<Json<DeleteSongResponse>> {
    let Query(query) = query?;
    let (group, song_name) = required_pair(query.group, query.song_name, "group and song_name")?;

    let song = state.service.get_by_group_and_song(&group, &song_name).await?;
    state.service.delete(song.id).await?;
    info!(id = song.id, "Song deleted");

    Ok(Json(DeleteSongResponse {
        message: "song deleted".to_string(),
        song: song.song,
        id: song.id,
    }))
}

/// GET /info
#[utoipa::path(
    get,
    tag = "songs",
    path = "/info",
    params(InfoQuery),
    responses(
        (status = 200, description = "Song details", body = SongInfoResponse),
        (status = 400, description = "Missing lookup keys", body = ErrorResponse),
        (status = 404, description = "No such song", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
)]
pub async fn get_song_info(
    State(state): State<AppState>,
    query: Result<Query<InfoQuery>, QueryRejection>,
) -> ApiResult<Json<SongInfoResponse>> {
    let Query(query) = query?;
    let (group, song) = required_pair(query.group, query.song, "group and song")?;

    let found = state.service.get_by_group_and_song(&group, &song).await?;
    Ok(Json(found.into()))
}
