//! Core types and trait definitions for generic entity tagging.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! (e.g. `taggable-store-sqlite`) implement [`store::TagStore`]; application
//! code talks to a [`service::TaggingService`] per taggable entity type.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod query;
pub mod service;
pub mod store;
pub mod tag;

pub use config::{TaggableConfig, TaggableTable};
pub use error::{Error, Result};
pub use service::{Taggable, TaggingService};
