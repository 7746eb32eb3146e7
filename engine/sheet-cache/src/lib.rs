//! # Sheet Cache
//!
//! Key-value storage for spreadsheet tables pulled by the refresh pipeline.
//!
//! Every value is a JSON document keyed by a plain string. Readers treat an
//! absent key as "no data yet"; the refresh pipeline overwrites the store
//! wholesale.
//!
//! ## Architecture
//!
//! - **KeyValueStore**: Abstract trait for string-keyed backends
//! - **RedisStore**: Redis implementation backed by a connection manager
//! - **InMemoryStore**: Process-local implementation used by tests and tooling
//! - **SheetCache**: Typed JSON wrapper shared by readers and the ingester

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;

pub use backend::{InMemoryStore, KeyValueStore, RedisStore};
pub use cache::SheetCache;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
