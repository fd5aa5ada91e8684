//! Subcommands and their execution against a [`SqliteStore`].

use anyhow::{Context as _, Result};
use clap::Subcommand;
use serde::Serialize;
use taggable_core::{TaggingService, query::TagQuery, store::TagStore};
use taggable_store_sqlite::SqliteStore;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Enable tagging on an existing table (creates the tag and join tables).
  Enable { table: String },

  /// Tag an entity. Arguments may be comma-separated lists.
  Add {
    table: String,
    id:    i64,
    #[arg(required = true)]
    tags:  Vec<String>,
  },

  /// Remove tags from an entity. Unknown tags are ignored.
  Remove {
    table: String,
    id:    i64,
    #[arg(required = true)]
    tags:  Vec<String>,
  },

  /// List the tags on an entity.
  List { table: String, id: i64 },

  /// List ids of entities carrying every given tag.
  Filter {
    table:  String,
    #[arg(required = true)]
    tags:   Vec<String>,
    #[arg(long)]
    limit:  Option<usize>,
    #[arg(long)]
    offset: Option<usize>,
  },

  /// List the taggings of one tag within a table.
  Taggings { table: String, tag: String },

  /// List every tag in the store.
  Tags,

  /// Delete a tag and all of its taggings.
  DeleteTag { name: String },
}

async fn service(
  store: SqliteStore,
  table: &str,
) -> Result<TaggingService<SqliteStore>> {
  TaggingService::enable(store, table)
    .await
    .with_context(|| format!("cannot enable tagging on {table:?}"))
}

/// Service for read-only commands: checks the table but creates nothing.
async fn bound(
  store: SqliteStore,
  table: &str,
) -> Result<TaggingService<SqliteStore>> {
  TaggingService::bind(store, table)
    .await
    .with_context(|| format!("{table:?} cannot be tagged"))
}

pub async fn run(store: SqliteStore, command: Command, json: bool) -> Result<()> {
  match command {
    Command::Enable { table } => {
      let svc = service(store, &table).await?;
      emit(json, svc.table(), || {
        format!(
          "tagging enabled on {} (join table {})",
          svc.table().taggable_type(),
          svc.table().tagging_table()
        )
      })
    }

    Command::Add { table, id, tags } => {
      let svc = service(store, &table).await?;
      let linked = svc
        .add_tags(&id, tags.join(","))
        .await
        .with_context(|| format!("failed to tag {table} {id}"))?;
      emit(json, &linked, || {
        linked.iter().map(|t| format!("+ {}\n", t.name)).collect()
      })
    }

    Command::Remove { table, id, tags } => {
      let svc = service(store, &table).await?;
      let removed = svc
        .remove_tags(&id, tags.join(","))
        .await
        .with_context(|| format!("failed to untag {table} {id}"))?;
      emit(json, &removed, || format!("removed {removed} tagging(s)"))
    }

    Command::List { table, id } => {
      let svc = bound(store, &table).await?;
      let names = svc.get_tags(&id).await.context("failed to list tags")?;
      emit(json, &names, || lines(&names))
    }

    Command::Filter { table, tags, limit, offset } => {
      let svc = bound(store, &table).await?;
      let query = TagQuery { tags, limit, offset };
      let ids = svc.find(&query).await.context("failed to filter")?;
      emit(json, &ids, || lines(&ids))
    }

    Command::Taggings { table, tag } => {
      let svc = bound(store, &table).await?;
      let taggings = svc
        .taggings_for_tag_name(&tag)
        .await
        .context("failed to list taggings")?;
      emit(json, &taggings, || {
        taggings
          .iter()
          .map(|t| format!("{}\t{}\n", t.taggable_id, t.tagged_at.to_rfc3339()))
          .collect()
      })
    }

    Command::Tags => {
      let tags = store.list_tags().await.context("failed to list tags")?;
      emit(json, &tags, || {
        tags.iter().map(|t| format!("{}\t{}\n", t.id, t.name)).collect()
      })
    }

    Command::DeleteTag { name } => {
      let deleted = store
        .delete_tag(&name)
        .await
        .with_context(|| format!("failed to delete tag {name:?}"))?;
      if !deleted {
        tracing::warn!(tag = %name, "no such tag");
      }
      emit(json, &deleted, || {
        if deleted { format!("deleted {name}") } else { String::new() }
      })
    }
  }
}

/// Print `value` as JSON, or the text produced by `text`.
fn emit<T: Serialize + ?Sized>(
  json: bool,
  value: &T,
  text: impl FnOnce() -> String,
) -> Result<()> {
  let out = if json {
    serde_json::to_string_pretty(value).context("failed to encode output")?
  } else {
    text()
  };
  let out = out.trim_end();
  if !out.is_empty() {
    println!("{out}");
  }
  Ok(())
}

fn lines<T: std::fmt::Display>(items: &[T]) -> String {
  items.iter().map(|i| format!("{i}\n")).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lines_joins_with_newlines() {
    assert_eq!(lines(&[1, 2]), "1\n2\n");
    assert_eq!(lines::<i64>(&[]), "");
  }

  async fn table_list(store: &SqliteStore) -> String {
    store
      .connection()
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT group_concat(name, ',') FROM
             (SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name)",
          [],
          |row| row.get::<_, String>(0),
        )?)
      })
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn read_commands_leave_the_schema_alone() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .connection()
      .call(|conn| {
        conn.execute_batch("CREATE TABLE posts (id INTEGER PRIMARY KEY)")?;
        Ok(())
      })
      .await
      .unwrap();

    run(store.clone(), Command::List { table: "posts".into(), id: 1 }, true)
      .await
      .unwrap();
    run(
      store.clone(),
      Command::Filter {
        table:  "posts".into(),
        tags:   vec!["rust".into()],
        limit:  None,
        offset: None,
      },
      true,
    )
    .await
    .unwrap();
    run(
      store.clone(),
      Command::Taggings { table: "posts".into(), tag: "rust".into() },
      true,
    )
    .await
    .unwrap();
    assert_eq!(table_list(&store).await, "posts");

    run(store.clone(), Command::Enable { table: "posts".into() }, true)
      .await
      .unwrap();
    assert!(table_list(&store).await.contains("posts_taggings"));
  }

  #[tokio::test]
  async fn read_commands_still_reject_untaggable_tables() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = run(store, Command::List { table: "nope".into(), id: 1 }, true)
      .await
      .unwrap_err();
    assert!(err.to_string().contains("cannot be tagged"));
  }
}
