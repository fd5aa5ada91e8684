//! Error types for `taggable-core`.
//!
//! All variants are configuration errors: they surface while a taggable
//! entity type is being registered and mean the type cannot be tagged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "table {table:?} has a composite primary key ({}); tagging requires a single-column key",
    columns.join(", ")
  )]
  CompositePrimaryKey { table: String, columns: Vec<String> },

  #[error(
    "primary key {table}.{column} is declared {declared:?}; tagging requires an integer key"
  )]
  UnsupportedPrimaryKeyType {
    table:    String,
    column:   String,
    declared: String,
  },

  #[error("table {0:?} has no primary key column")]
  MissingPrimaryKey(String),

  #[error("table {0:?} does not exist")]
  UnknownTable(String),

  #[error("invalid SQL identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("tagging table pattern {0:?} must contain exactly one `%s`")]
  InvalidTaggingPattern(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
