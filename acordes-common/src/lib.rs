//! # Acordes Common Library
//!
//! Shared code for the Acordes cache layer and its front-ends:
//! - Song, instrument and comment models (persisted JSON layout)
//! - Storage change events and the change bus
//! - Configuration loading and root folder resolution
//! - Input sanitizing and song identifier helpers
//! - Error type

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod sanitize;
pub mod slug;
pub mod time;

pub use error::{Error, Result};
pub use models::{Comment, Instrument, Song, SongSearchResult};
