//! Error type for `taggable-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A configuration error raised while binding an entity table.
  #[error("core error: {0}")]
  Core(#[from] taggable_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// `true` for configuration errors: the taggable type cannot be built.
  pub fn is_configuration(&self) -> bool { matches!(self, Self::Core(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
