//! Schema configuration for taggable entity types.
//!
//! [`TaggableConfig`] names the shared tag table and the pattern for per-type
//! join tables. Binding it to a concrete entity table yields a
//! [`TaggableTable`], which every store operation takes explicitly.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const TAGGING_PLACEHOLDER: &str = "%s";

// ─── TaggableConfig ──────────────────────────────────────────────────────────

/// Table naming shared by every taggable type in one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggableConfig {
  /// The shared tag table.
  pub tags_table:    String,
  /// Join table name; `%s` is replaced with the entity table name.
  pub tagging_table: String,
}

impl Default for TaggableConfig {
  fn default() -> Self {
    Self {
      tags_table:    "taggable_tags".to_owned(),
      tagging_table: "%s_taggings".to_owned(),
    }
  }
}

impl TaggableConfig {
  /// Check that both names can produce valid identifiers.
  pub fn validate(&self) -> Result<()> {
    validate_identifier(&self.tags_table)?;
    if self.tagging_table.matches(TAGGING_PLACEHOLDER).count() != 1 {
      return Err(Error::InvalidTaggingPattern(self.tagging_table.clone()));
    }
    // Any valid identifier substituted for `%s` must yield a valid one.
    validate_identifier(&self.tagging_table.replace(TAGGING_PLACEHOLDER, "t"))
  }

  /// The join table name for `entity_table`.
  pub fn tagging_table_for(&self, entity_table: &str) -> String {
    self.tagging_table.replace(TAGGING_PLACEHOLDER, entity_table)
  }

  /// Bind this configuration to an entity table whose primary key consists
  /// of `primary_key` (as reported by the backend's schema introspection).
  ///
  /// Fails unless the key is exactly one column.
  pub fn bind<S: AsRef<str>>(
    &self,
    entity_table: &str,
    primary_key: &[S],
  ) -> Result<TaggableTable> {
    self.validate()?;
    validate_identifier(entity_table)?;

    let primary_key = match primary_key {
      [] => return Err(Error::MissingPrimaryKey(entity_table.to_owned())),
      [pk] => pk.as_ref(),
      columns => {
        return Err(Error::CompositePrimaryKey {
          table:   entity_table.to_owned(),
          columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
        });
      }
    };
    validate_identifier(primary_key)?;

    let tagging_table = self.tagging_table_for(entity_table);
    if tagging_table == entity_table || tagging_table == self.tags_table {
      return Err(Error::InvalidTaggingPattern(self.tagging_table.clone()));
    }

    Ok(TaggableTable {
      taggable_type: entity_table.to_owned(),
      primary_key: primary_key.to_owned(),
      tags_table: self.tags_table.clone(),
      tagging_table,
    })
  }
}

// ─── TaggableTable ───────────────────────────────────────────────────────────

/// A validated binding between one entity table and the tagging schema.
///
/// Only obtainable through [`TaggableConfig::bind`], so every name in it is a
/// checked identifier and safe to interpolate into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggableTable {
  taggable_type: String,
  primary_key:   String,
  tags_table:    String,
  tagging_table: String,
}

impl TaggableTable {
  /// The entity table name, also used as the taggable type discriminant.
  pub fn taggable_type(&self) -> &str { &self.taggable_type }

  /// The entity table's single primary-key column.
  pub fn primary_key(&self) -> &str { &self.primary_key }

  pub fn tags_table(&self) -> &str { &self.tags_table }

  pub fn tagging_table(&self) -> &str { &self.tagging_table }
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Accept `[A-Za-z_][A-Za-z0-9_]*`, the subset of SQL identifiers that never
/// needs quoting.
pub fn validate_identifier(name: &str) -> Result<()> {
  let mut chars = name.chars();
  let head_ok = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
  if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
    Ok(())
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}
