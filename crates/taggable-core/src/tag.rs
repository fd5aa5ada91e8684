//! Tags and taggings — the two record types of the tagging data model.
//!
//! A tag is a globally unique name. A tagging links one entity of one
//! taggable type to one tag; the pair `(taggable_id, tag_id)` is unique within
//! a taggable type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Tag ─────────────────────────────────────────────────────────────────────

/// A named label. Created on first use, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub id:         i64,
  /// Trimmed, case-sensitive, unique across the store.
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

// ─── Tagging ─────────────────────────────────────────────────────────────────

/// An association between one taggable entity and one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagging {
  /// The entity table name. Implied by the join table the row lives in.
  pub taggable_type: String,
  pub taggable_id:   i64,
  pub tag_id:        i64,
  pub tagged_at:     DateTime<Utc>,
}

// ─── TagInput ────────────────────────────────────────────────────────────────

/// Tag names as accepted by `add_tags` / `remove_tags`: either one
/// comma-separated string or an explicit list.
///
/// Deserialises from a JSON string or a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
  /// `"rust, sqlite"` — split on `,`.
  Delimited(String),
  /// Each element is one tag name; commas inside an element are kept.
  List(Vec<String>),
}

impl TagInput {
  /// The trimmed, non-empty names in input order. Duplicates are preserved;
  /// callers decide whether a repeat is meaningful.
  pub fn names(&self) -> Vec<&str> {
    let raw: Vec<&str> = match self {
      Self::Delimited(s) => s.split(',').collect(),
      Self::List(items) => items.iter().map(String::as_str).collect(),
    };
    raw.into_iter().map(str::trim).filter(|n| !n.is_empty()).collect()
  }

  pub fn is_empty(&self) -> bool { self.names().is_empty() }
}

impl From<&str> for TagInput {
  fn from(s: &str) -> Self { Self::Delimited(s.to_owned()) }
}

impl From<String> for TagInput {
  fn from(s: String) -> Self { Self::Delimited(s) }
}

impl From<&String> for TagInput {
  fn from(s: &String) -> Self { Self::Delimited(s.clone()) }
}

impl From<Vec<String>> for TagInput {
  fn from(v: Vec<String>) -> Self { Self::List(v) }
}

impl From<Vec<&str>> for TagInput {
  fn from(v: Vec<&str>) -> Self {
    Self::List(v.into_iter().map(str::to_owned).collect())
  }
}

impl From<&[&str]> for TagInput {
  fn from(v: &[&str]) -> Self {
    Self::List(v.iter().map(|s| (*s).to_owned()).collect())
  }
}

impl<const N: usize> From<[&str; N]> for TagInput {
  fn from(v: [&str; N]) -> Self {
    Self::List(v.iter().map(|s| (*s).to_owned()).collect())
  }
}

impl From<&[String]> for TagInput {
  fn from(v: &[String]) -> Self { Self::List(v.to_vec()) }
}
