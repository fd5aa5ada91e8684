//! [`SqliteStore`] — the SQLite implementation of [`TagStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use taggable_core::{
  TaggableConfig, TaggableTable,
  config::validate_identifier,
  query::TagQuery,
  store::TagStore,
  tag::{Tag, Tagging},
};

use crate::{
  Result,
  encode::{RawTag, RawTagging, encode_dt},
  filter::TagFilter,
  schema::{CONNECTION_PRAGMAS, tagging_ddl, tags_ddl},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tag store backed by a SQLite database shared with the application's
/// entity tables.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  config: Arc<TaggableConfig>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with the default table names.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_config(path, TaggableConfig::default()).await
  }

  /// Open (or create) a store at `path` with custom table names.
  pub async fn open_with_config(
    path: impl AsRef<Path>,
    config: TaggableConfig,
  ) -> Result<Self> {
    config.validate()?;
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::from_connection(conn, config).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::from_connection(conn, TaggableConfig::default()).await
  }

  /// Wrap a connection the application already uses for its entity tables.
  pub async fn from_connection(
    conn: tokio_rusqlite::Connection,
    config: TaggableConfig,
  ) -> Result<Self> {
    config.validate()?;
    conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, config: Arc::new(config) })
  }

  /// The underlying connection, for the application's own queries.
  pub fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  pub fn config(&self) -> &TaggableConfig { &self.config }

  /// Primary-key columns of `table` in key order, each with its declared
  /// type, or `None` if the table does not exist.
  async fn primary_key_columns(
    &self,
    table: &str,
  ) -> Result<Option<Vec<(String, String)>>> {
    let table = table.to_owned();

    let columns: Vec<(String, String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1)")?;
        let rows = stmt
          .query_map(rusqlite::params![table], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if columns.is_empty() {
      return Ok(None);
    }

    let mut key: Vec<(String, String, i64)> =
      columns.into_iter().filter(|(.., pk)| *pk > 0).collect();
    key.sort_by_key(|(.., pk)| *pk);
    Ok(Some(
      key.into_iter().map(|(name, declared, _)| (name, declared)).collect(),
    ))
  }

  /// Validate `entity_table` and bind it. Touches no schema.
  ///
  /// The key column must have INTEGER affinity, since the join table stores
  /// `taggable_id` as an integer referencing it.
  async fn bind_entity(&self, entity_table: &str) -> Result<TaggableTable> {
    validate_identifier(entity_table)?;

    let key = self
      .primary_key_columns(entity_table)
      .await?
      .ok_or_else(|| taggable_core::Error::UnknownTable(entity_table.to_owned()))?;
    let names: Vec<&str> = key.iter().map(|(name, _)| name.as_str()).collect();
    let table = self.config.bind(entity_table, &names)?;

    let (column, declared) = &key[0];
    if !has_integer_affinity(declared) {
      return Err(
        taggable_core::Error::UnsupportedPrimaryKeyType {
          table:    entity_table.to_owned(),
          column:   column.clone(),
          declared: declared.clone(),
        }
        .into(),
      );
    }
    Ok(table)
  }
}

/// SQLite's affinity rule: a declared type containing "INT" is an integer
/// column.
fn has_integer_affinity(declared: &str) -> bool {
  declared.to_ascii_uppercase().contains("INT")
}

/// Whether `err` is a UNIQUE or PRIMARY KEY constraint violation, i.e. the
/// row being inserted already exists.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

fn table_exists(conn: &rusqlite::Connection, name: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        rusqlite::params![name],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// Insert a tag row. Returns `false` if a tag with that name already exists,
/// including one created by another writer since the caller last looked.
pub(crate) fn insert_tag(
  conn: &rusqlite::Connection,
  tags_table: &str,
  name: &str,
  created_at: &str,
) -> rusqlite::Result<bool> {
  match conn.execute(
    &format!("INSERT INTO {tags_table} (name, created_at) VALUES (?1, ?2)"),
    rusqlite::params![name, created_at],
  ) {
    Ok(_) => Ok(true),
    Err(e) if is_unique_violation(&e) => Ok(false),
    Err(e) => Err(e),
  }
}

fn select_tag(
  conn: &rusqlite::Connection,
  tags_table: &str,
  name: &str,
) -> rusqlite::Result<Option<RawTag>> {
  conn
    .query_row(
      &format!("SELECT id, name, created_at FROM {tags_table} WHERE name = ?1"),
      rusqlite::params![name],
      RawTag::from_row,
    )
    .optional()
}

// ─── TagStore impl ───────────────────────────────────────────────────────────

impl TagStore for SqliteStore {
  type Error = crate::Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn register_taggable(&self, entity_table: &str) -> Result<TaggableTable> {
    let table = self.bind_entity(entity_table).await?;

    let ddl = format!("{}{}", tags_ddl(table.tags_table()), tagging_ddl(&table));
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(&ddl)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(
      taggable_type = table.taggable_type(),
      tagging_table = table.tagging_table(),
      "tagging enabled"
    );
    Ok(table)
  }

  async fn bind_taggable(&self, entity_table: &str) -> Result<TaggableTable> {
    self.bind_entity(entity_table).await
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn find_or_create_tag(&self, name: &str) -> Result<Option<Tag>> {
    let name = name.trim().to_owned();
    if name.is_empty() {
      return Ok(None);
    }
    let tags_table = self.config.tags_table.clone();
    let now_str    = encode_dt(Utc::now());

    let (raw, created): (RawTag, bool) = self
      .conn
      .call(move |conn| {
        conn.execute_batch(&tags_ddl(&tags_table))?;

        if let Some(existing) = select_tag(conn, &tags_table, &name)? {
          return Ok((existing, false));
        }

        let created = insert_tag(conn, &tags_table, &name, &now_str)?;

        let raw = select_tag(conn, &tags_table, &name)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok((raw, created))
      })
      .await?;

    let tag = raw.into_tag()?;
    if created {
      tracing::debug!(tag = %tag.name, id = tag.id, "created tag");
    }
    Ok(Some(tag))
  }

  async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
    let name       = name.trim().to_owned();
    let tags_table = self.config.tags_table.clone();

    let raw: Option<RawTag> = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, &tags_table)? {
          return Ok(None);
        }
        Ok(select_tag(conn, &tags_table, &name)?)
      })
      .await?;

    raw.map(RawTag::into_tag).transpose()
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    let tags_table = self.config.tags_table.clone();

    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, &tags_table)? {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&format!(
          "SELECT id, name, created_at FROM {tags_table} ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn delete_tag(&self, name: &str) -> Result<bool> {
    let name       = name.trim().to_owned();
    let tags_table = self.config.tags_table.clone();
    let log_name   = name.clone();

    let deleted = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, &tags_table)? {
          return Ok(0);
        }
        Ok(conn.execute(
          &format!("DELETE FROM {tags_table} WHERE name = ?1"),
          rusqlite::params![name],
        )?)
      })
      .await?;

    if deleted > 0 {
      tracing::debug!(tag = %log_name, "deleted tag and its taggings");
    }
    Ok(deleted > 0)
  }

  // ── Taggings ──────────────────────────────────────────────────────────────

  async fn link(
    &self,
    table:       &TaggableTable,
    taggable_id: i64,
    tag_id:      i64,
  ) -> Result<bool> {
    let tagging = table.tagging_table().to_owned();
    let now_str = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          &format!(
            "INSERT INTO {tagging} (taggable_id, tag_id, tagged_at) VALUES (?1, ?2, ?3)"
          ),
          rusqlite::params![taggable_id, tag_id, now_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if inserted {
      tracing::debug!(
        taggable_type = table.taggable_type(),
        taggable_id,
        tag_id,
        "linked tag"
      );
    } else {
      tracing::debug!(
        taggable_type = table.taggable_type(),
        taggable_id,
        tag_id,
        "tag already linked"
      );
    }
    Ok(inserted)
  }

  async fn unlink(
    &self,
    table:       &TaggableTable,
    taggable_id: i64,
    tag_id:      i64,
  ) -> Result<usize> {
    let tagging = table.tagging_table().to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {tagging} WHERE taggable_id = ?1 AND tag_id = ?2"),
          rusqlite::params![taggable_id, tag_id],
        )?)
      })
      .await?;

    tracing::debug!(
      taggable_type = table.taggable_type(),
      taggable_id,
      tag_id,
      removed,
      "unlinked tag"
    );
    Ok(removed)
  }

  async fn tags_for(&self, table: &TaggableTable, taggable_id: i64) -> Result<Vec<Tag>> {
    let tagging = table.tagging_table().to_owned();
    let sql = format!(
      "SELECT t.id, t.name, t.created_at
       FROM {tags} t
       JOIN {tagging} tg ON tg.tag_id = t.id
       WHERE tg.taggable_id = ?1
       ORDER BY t.name",
      tags = table.tags_table(),
      tagging = table.tagging_table(),
    );

    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, &tagging)? {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![taggable_id], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn taggings_for_tag_name(
    &self,
    table: &TaggableTable,
    name:  &str,
  ) -> Result<Vec<Tagging>> {
    let name    = name.trim().to_owned();
    let tagging = table.tagging_table().to_owned();
    let sql     = format!(
      "SELECT tg.taggable_id, tg.tag_id, tg.tagged_at
       FROM {tagging} tg
       JOIN {tags} t ON t.id = tg.tag_id
       WHERE t.name = ?1
       ORDER BY tg.taggable_id",
      tags = table.tags_table(),
      tagging = table.tagging_table(),
    );

    let raws: Vec<RawTagging> = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, &tagging)? {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![name], RawTagging::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| raw.into_tagging(table.taggable_type()))
      .collect()
  }

  async fn find_tagged(
    &self,
    table: &TaggableTable,
    query: &TagQuery,
  ) -> Result<Vec<i64>> {
    let filter = TagFilter::new(table, query);
    let joined = (!filter.is_unrestricted()).then(|| table.tagging_table().to_owned());
    let entity = table.taggable_type();
    let pk     = table.primary_key();
    let sql    = format!(
      "SELECT {entity}.{pk} FROM {entity}
       WHERE {predicate}
       ORDER BY {entity}.{pk}
       LIMIT ? OFFSET ?",
      predicate = filter.sql(),
    );

    // SQLite treats a negative LIMIT as "no limit".
    let limit_val  = query.limit.map_or(-1, |l| l as i64);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let mut params: Vec<Value> =
      filter.params().iter().cloned().map(Value::Text).collect();
    params.push(Value::Integer(limit_val));
    params.push(Value::Integer(offset_val));

    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        // Nothing can carry a tag before the join table exists.
        if let Some(tagging) = &joined
          && !table_exists(conn, tagging)?
        {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids)
  }
}
