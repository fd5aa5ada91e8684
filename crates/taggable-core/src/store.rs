//! The `TagStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `taggable-store-sqlite`). [`crate::service::TaggingService`] and
//! applications depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  config::TaggableTable,
  query::TagQuery,
  tag::{Tag, Tagging},
};

/// Abstraction over a tag store backend: one shared tag table plus one
/// tagging join table per registered entity type.
///
/// Duplicate inserts rejected by the backend's unique constraints are not
/// errors; they are reported as "already present" so check-then-insert
/// callers stay correct under concurrency.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait TagStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Enable tagging for `entity_table`: inspect its primary key, create the
  /// tag table and the entity's join table if missing, and return the
  /// binding used by every other operation.
  ///
  /// Fails with a configuration error (and creates nothing) when the table
  /// is unknown or does not have exactly one integer primary-key column.
  fn register_taggable<'a>(
    &'a self,
    entity_table: &'a str,
  ) -> impl Future<Output = Result<TaggableTable, Self::Error>> + Send + 'a;

  /// Inspect `entity_table` and return its binding without creating any
  /// table. Fails like [`Self::register_taggable`]. Reads through a binding
  /// whose join table does not exist yet return empty results.
  fn bind_taggable<'a>(
    &'a self,
    entity_table: &'a str,
  ) -> impl Future<Output = Result<TaggableTable, Self::Error>> + Send + 'a;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// Return the tag named `name` (trimmed), creating it if unseen.
  ///
  /// A name that is empty after trimming is never stored: the call is a
  /// no-op and returns `None`.
  fn find_or_create_tag<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + 'a;

  /// Exact-name lookup (input trimmed).
  fn find_tag_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Tag>, Self::Error>> + Send + 'a;

  /// Every tag in the store, ordered by name.
  fn list_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// Delete a tag; its taggings go with it. Returns `false` if there was no
  /// such tag.
  fn delete_tag<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Taggings ──────────────────────────────────────────────────────────

  /// Link an entity to a tag. Returns `false` if the link already existed.
  fn link<'a>(
    &'a self,
    table: &'a TaggableTable,
    taggable_id: i64,
    tag_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Remove the link between an entity and a tag. Returns the number of rows
  /// removed (`0` when not linked).
  fn unlink<'a>(
    &'a self,
    table: &'a TaggableTable,
    taggable_id: i64,
    tag_id: i64,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// All tags linked to an entity.
  fn tags_for<'a>(
    &'a self,
    table: &'a TaggableTable,
    taggable_id: i64,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + 'a;

  /// Every tagging of this entity type that carries the tag named `name`.
  fn taggings_for_tag_name<'a>(
    &'a self,
    table: &'a TaggableTable,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<Tagging>, Self::Error>> + Send + 'a;

  /// Ids of the entities matching `query`, ascending.
  fn find_tagged<'a>(
    &'a self,
    table: &'a TaggableTable,
    query: &'a TagQuery,
  ) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + 'a;
}
