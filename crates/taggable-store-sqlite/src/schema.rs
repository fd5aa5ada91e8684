//! SQL schema for the taggable SQLite store.
//!
//! Nothing here touches the application's entity tables. The tag table and
//! the join tables are created lazily when a type is registered, so a failed
//! registration leaves the database untouched.

use taggable_core::TaggableTable;

/// Run on every connection the store opens.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// DDL for the shared tag table; idempotent.
///
/// `tags_table` must be a validated identifier.
pub fn tags_ddl(tags_table: &str) -> String {
  format!(
    "
CREATE TABLE IF NOT EXISTS {tags_table} (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE    -- trimmed; case-sensitive
                CHECK (name <> ''),
    created_at  TEXT NOT NULL           -- ISO 8601 UTC
);
"
  )
}

/// DDL for one entity type's join table; idempotent.
///
/// Both foreign keys cascade: deleting a tag or an entity removes its
/// taggings.
pub fn tagging_ddl(table: &TaggableTable) -> String {
  let tagging = table.tagging_table();
  let tags = table.tags_table();
  let entity = table.taggable_type();
  let pk = table.primary_key();

  format!(
    "
CREATE TABLE IF NOT EXISTS {tagging} (
    taggable_id INTEGER NOT NULL REFERENCES {entity}({pk}) ON DELETE CASCADE,
    tag_id      INTEGER NOT NULL REFERENCES {tags}(id)     ON DELETE CASCADE,
    tagged_at   TEXT NOT NULL,
    PRIMARY KEY (taggable_id, tag_id)
);

CREATE INDEX IF NOT EXISTS {tagging}_tag_idx ON {tagging}(tag_id);
"
  )
}
