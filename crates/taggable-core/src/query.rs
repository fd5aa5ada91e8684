//! [`TagQuery`] — a composable "tagged with" restriction over one taggable
//! entity type.

use serde::{Deserialize, Serialize};

/// Restricts a taggable type's entities to those carrying every listed tag.
///
/// Built with [`TagQuery::tagged`] and narrowed with [`TagQuery::and_tag`].
/// A query without tags places no restriction on the entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagQuery {
  /// All of these tags must be present. Names are matched exactly after
  /// trimming.
  pub tags:   Vec<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl TagQuery {
  /// Entities tagged with `name`.
  pub fn tagged(name: impl Into<String>) -> Self {
    Self::default().and_tag(name)
  }

  /// Additionally require `name`.
  pub fn and_tag(mut self, name: impl Into<String>) -> Self {
    self.tags.push(name.into());
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn offset(mut self, offset: usize) -> Self {
    self.offset = Some(offset);
    self
  }

  /// The required names, trimmed and deduplicated, in first-seen order.
  ///
  /// Blank names are kept: no stored tag has an empty name, so requiring
  /// one matches nothing.
  pub fn required_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::with_capacity(self.tags.len());
    for name in self.tags.iter().map(|t| t.trim()) {
      if !names.contains(&name) {
        names.push(name);
      }
    }
    names
  }
}
