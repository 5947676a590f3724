//! OpenAPI document and Swagger UI

use axum::Router;
use songbook_common::db::{NewSong, Song, SongPatch};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::buildinfo::{self, BuildInfo};
use super::health::{self, HealthResponse};
use super::songs::{
    self, DeleteSongResponse, SongInfoResponse, SongTextResponse, SongsPageResponse,
};
use crate::error::ErrorResponse;

/// Path of the generated OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Songbook API",
        description = "Song catalog: create, list, lyric pages, partial update, delete"
    ),
    paths(
        songs::create_song,
        songs::list_songs,
        songs::get_song,
        songs::get_song_text,
        songs::update_song,
        songs::delete_song,
        songs::get_song_info,
        health::health_check,
        buildinfo::get_build_info,
    ),
    components(schemas(
        Song,
        NewSong,
        SongPatch,
        SongsPageResponse,
        SongTextResponse,
        SongInfoResponse,
        DeleteSongResponse,
        ErrorResponse,
        HealthResponse,
        BuildInfo,
    )),
    tags(
        (name = "songs", description = "Song catalog"),
        (name = "service", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, backed by the generated document
///
/// Stateless; merge after `with_state`.
pub fn docs_routes() -> Router {
    SwaggerUi::new("/docs")
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .into()
}
