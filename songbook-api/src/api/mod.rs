//! HTTP API handlers for songbook-api

pub mod buildinfo;
pub mod docs;
pub mod health;
pub mod songs;

pub use buildinfo::get_build_info;
pub use docs::{docs_routes, ApiDoc};
pub use health::health_routes;
pub use songs::song_routes;
