//! # Acordes Cache
//!
//! Client-side persistent cache for songs, favorites, history and comments.
//!
//! Layers, leaves first:
//! - [`durable`]: synchronous string key/value stores (memory, filesystem)
//! - [`memory_cache`]: lazily loaded per-namespace snapshots with invalidation
//! - [`songs`], [`history`], [`favorites`], [`comments`]: namespace documents
//!   and the rules that mutate them
//! - [`store`]: the [`SongStore`] facade one front-end instance talks to, and
//!   the [`StorageOrigin`] several instances share
//! - [`library`]: load / instrument-switch / search flow against the external
//!   generation services
//!
//! Nothing in this crate fails hard on bad persisted data: corrupted
//! documents load as empty, rejected writes are logged.

pub mod comments;
mod decode;
pub mod durable;
pub mod favorites;
pub mod history;
pub mod library;
pub mod memory_cache;
pub mod namespace;
pub mod songs;
pub mod store;

pub use durable::{DurableStore, FileStore, MemoryStore};
pub use library::{ChordRequest, ChordService, Library, SearchService};
pub use memory_cache::{Document, NamespaceCache};
pub use namespace::Namespace;
pub use store::{SongStore, StorageOrigin, StorageUsage};
