//! # Songbook Common Library
//!
//! Shared code for the songbook services including:
//! - Song catalog data model (songs, patches, filters, pagination requests)
//! - Database bootstrap and versioned schema migrations
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
