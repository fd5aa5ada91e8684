//! [`TaggingService`] — the tagging operations for one taggable entity type.
//!
//! The service is composed over any [`TagStore`] and a [`TaggableTable`]
//! binding; entities only need to expose their primary key through
//! [`Taggable`].

use std::collections::HashSet;

use crate::{
  config::TaggableTable,
  query::TagQuery,
  store::TagStore,
  tag::{Tag, TagInput, Tagging},
};

/// A persisted entity that can carry tags.
pub trait Taggable {
  /// The value of the entity's single primary-key column.
  fn taggable_id(&self) -> i64;
}

impl Taggable for i64 {
  fn taggable_id(&self) -> i64 { *self }
}

/// Add, remove, list and filter tags for the entities of one table.
///
/// Cloning is as cheap as cloning the store.
#[derive(Debug, Clone)]
pub struct TaggingService<S> {
  store: S,
  table: TaggableTable,
}

impl<S: TagStore> TaggingService<S> {
  pub fn new(store: S, table: TaggableTable) -> Self { Self { store, table } }

  /// Register `entity_table` with the store and build a service for it.
  pub async fn enable(store: S, entity_table: &str) -> Result<Self, S::Error> {
    let table = store.register_taggable(entity_table).await?;
    Ok(Self::new(store, table))
  }

  /// Build a service for an entity table without creating any table. For
  /// read-only callers; tagging through it fails until the table has been
  /// enabled.
  pub async fn bind(store: S, entity_table: &str) -> Result<Self, S::Error> {
    let table = store.bind_taggable(entity_table).await?;
    Ok(Self::new(store, table))
  }

  pub fn table(&self) -> &TaggableTable { &self.table }

  pub fn store(&self) -> &S { &self.store }

  /// Tag `entity` with every name in `tags`.
  ///
  /// Blank names are skipped. Tags are created on first use. A name the
  /// entity already carries is not linked again. Returns the tags newly
  /// linked by this call.
  pub async fn add_tags<E: Taggable + ?Sized>(
    &self,
    entity: &E,
    tags: impl Into<TagInput>,
  ) -> Result<Vec<Tag>, S::Error> {
    let input = tags.into();
    let names = input.names();
    if names.is_empty() {
      tracing::debug!(
        taggable_type = self.table.taggable_type(),
        "no tag names to add"
      );
      return Ok(Vec::new());
    }

    let taggable_id = entity.taggable_id();
    let mut current: HashSet<String> =
      self.get_tags(entity).await?.into_iter().collect();
    let mut linked = Vec::new();

    for name in names {
      let Some(tag) = self.store.find_or_create_tag(name).await? else {
        continue;
      };
      if current.contains(&tag.name) {
        continue;
      }
      if self.store.link(&self.table, taggable_id, tag.id).await? {
        linked.push(tag.clone());
      }
      current.insert(tag.name);
    }

    Ok(linked)
  }

  /// Remove every name in `tags` from `entity`. Unknown names and tags the
  /// entity does not carry are ignored. Returns the number of taggings
  /// removed.
  pub async fn remove_tags<E: Taggable + ?Sized>(
    &self,
    entity: &E,
    tags: impl Into<TagInput>,
  ) -> Result<usize, S::Error> {
    let input = tags.into();
    let taggable_id = entity.taggable_id();
    let mut removed = 0;

    for name in input.names() {
      let Some(tag) = self.store.find_tag_by_name(name).await? else {
        tracing::debug!(tag = name, "no such tag; nothing to remove");
        continue;
      };
      removed += self.store.unlink(&self.table, taggable_id, tag.id).await?;
    }

    Ok(removed)
  }

  /// The names of all tags on `entity`.
  pub async fn get_tags<E: Taggable + ?Sized>(
    &self,
    entity: &E,
  ) -> Result<Vec<String>, S::Error> {
    let tags = self.store.tags_for(&self.table, entity.taggable_id()).await?;
    Ok(tags.into_iter().map(|t| t.name).collect())
  }

  /// A query restricted to entities tagged with `name`. Narrow it further
  /// with [`TagQuery::and_tag`] and run it with [`Self::find`].
  pub fn filter_by_tag_name(&self, name: impl Into<String>) -> TagQuery {
    TagQuery::tagged(name)
  }

  /// Ids of the entities matching `query`.
  pub async fn find(&self, query: &TagQuery) -> Result<Vec<i64>, S::Error> {
    self.store.find_tagged(&self.table, query).await
  }

  /// Shorthand for running [`Self::filter_by_tag_name`].
  pub async fn tagged_with(&self, name: &str) -> Result<Vec<i64>, S::Error> {
    self.find(&self.filter_by_tag_name(name)).await
  }

  /// The raw taggings of this entity type that carry `name`.
  pub async fn taggings_for_tag_name(
    &self,
    name: &str,
  ) -> Result<Vec<Tagging>, S::Error> {
    self.store.taggings_for_tag_name(&self.table, name).await
  }
}
