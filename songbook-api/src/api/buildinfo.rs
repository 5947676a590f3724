//! Build information API endpoint
//!
//! Values are captured by build.rs at compile time.

use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Build information response
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: env!("GIT_HASH").to_string(),
            build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
            build_profile: env!("BUILD_PROFILE").to_string(),
        }
    }
}

/// GET /api/buildinfo
#[utoipa::path(
    get,
    tag = "service",
    path = "/api/buildinfo",
    responses((status = 200, description = "Build identification", body = BuildInfo)),
)]
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}
