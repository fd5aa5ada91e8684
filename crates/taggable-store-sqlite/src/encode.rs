//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; ids are SQLite integers.

use chrono::{DateTime, Utc};
use taggable_core::tag::{Tag, Tagging};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a tag table row.
pub struct RawTag {
  pub id:         i64,
  pub name:       String,
  pub created_at: String,
}

impl RawTag {
  /// Column order: `id, name, created_at`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      id:         self.id,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a join table row.
pub struct RawTagging {
  pub taggable_id: i64,
  pub tag_id:      i64,
  pub tagged_at:   String,
}

impl RawTagging {
  /// Column order: `taggable_id, tag_id, tagged_at`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      taggable_id: row.get(0)?,
      tag_id:      row.get(1)?,
      tagged_at:   row.get(2)?,
    })
  }

  pub fn into_tagging(self, taggable_type: &str) -> Result<Tagging> {
    Ok(Tagging {
      taggable_type: taggable_type.to_owned(),
      taggable_id:   self.taggable_id,
      tag_id:        self.tag_id,
      tagged_at:     decode_dt(&self.tagged_at)?,
    })
  }
}
