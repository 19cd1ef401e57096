//! Type-safe CMS document identifiers.
//!
//! The headless CMS assigns opaque string IDs to every document. Wrapping
//! them in a newtype keeps them from being mixed up with slugs, SKUs, and
//! other stringly-typed fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, stable CMS document ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this ID refers to an unpublished draft.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.0.starts_with("drafts.")
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_detection() {
        assert!(DocumentId::new("drafts.abc123").is_draft());
        assert!(!DocumentId::new("abc123").is_draft());
    }
}
