//! [`TagFilter`] — a [`TagQuery`] rendered as a SQL predicate over the
//! entity table, for splicing into application queries.
//!
//! ```rust,ignore
//! let filter = TagFilter::new(posts.table(), &posts.filter_by_tag_name("rust"));
//! let sql = format!("SELECT id, title FROM posts WHERE published = 1 AND {}", filter.sql());
//! let mut stmt = conn.prepare(&sql)?;
//! let rows = stmt.query_map(rusqlite::params_from_iter(filter.params()), map_post)?;
//! ```

use taggable_core::{TaggableTable, query::TagQuery};

/// A boolean SQL expression plus its positional (`?`) parameters.
///
/// The expression refers to the entity table by name, so the surrounding
/// query must select from it without aliasing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
  sql:    String,
  params: Vec<String>,
}

impl TagFilter {
  pub fn new(table: &TaggableTable, query: &TagQuery) -> Self {
    let names = query.required_names();
    if names.is_empty() {
      return Self { sql: "1".to_owned(), params: Vec::new() };
    }

    let entity = table.taggable_type();
    let pk = table.primary_key();
    let tagging = table.tagging_table();
    let tags = table.tags_table();
    let placeholders = vec!["?"; names.len()].join(", ");
    let required = names.len();

    let sql = format!(
      "{entity}.{pk} IN (
         SELECT tf_tagging.taggable_id
         FROM {tagging} tf_tagging
         JOIN {tags} tf_tag ON tf_tag.id = tf_tagging.tag_id
         WHERE tf_tag.name IN ({placeholders})
         GROUP BY tf_tagging.taggable_id
         HAVING COUNT(DISTINCT tf_tag.id) = {required}
       )"
    );

    Self {
      sql,
      params: names.into_iter().map(str::to_owned).collect(),
    }
  }

  pub fn sql(&self) -> &str { &self.sql }

  pub fn params(&self) -> &[String] { &self.params }

  /// `true` when the filter places no restriction on the entities.
  pub fn is_unrestricted(&self) -> bool { self.params.is_empty() }
}
