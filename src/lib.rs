//! # Spotify Stats
//!
//! Listening statistics from an exported Spotify extended streaming history.
//!
//! This crate provides:
//! - Loading and enriching the exported `*.json` history files
//! - Overview statistics and top lists (artists, tracks)
//! - Per-year artist rankings with dense ranks
//! - Genre counts via the Spotify Web API, cached on disk
//! - Terminal tables and SVG charts

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod analytics;
pub mod config;
pub mod display;
pub mod error;
pub mod genres;
pub mod history;
pub mod plot;
pub mod report;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use report::Report;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "spotify-stats";
