//! SQLite backend for the taggable tag store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Entity tables belong to the
//! application; this crate only creates the tag table and the per-type
//! tagging join tables.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod filter;

pub use error::{Error, Result};
pub use filter::TagFilter;
pub use store::SqliteStore;
