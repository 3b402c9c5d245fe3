//! Selectable items of the search-select inputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A selectable item: identified by `id`, displayed by `label`.
///
/// Labels may collide across distinct ids; identity checks must go through
/// [`Candidate::same_identity`] rather than `==`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            raw: None,
        }
    }

    /// Candidate whose label is its id (free-text entries, plain references).
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id)
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn same_identity(&self, other: &Candidate) -> bool {
        self.id == other.id
    }

    /// Reads a string field out of the opaque payload.
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.raw.as_ref()?.get(key)?.as_str()
    }
}

/// Ids of a selection, in order.
pub fn ids(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_label_and_payload() {
        let a = Candidate::new("1", "role-1-admin");
        let b = Candidate::new("1", "renamed").with_raw(serde_json::json!({"kind": "post"}));
        let c = Candidate::new("2", "role-1-admin");

        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn raw_fields_are_readable() {
        let candidate = Candidate::from_id("post.123")
            .with_raw(serde_json::json!({"kind": "post", "value": "123"}));

        assert_eq!(candidate.label, "post.123");
        assert_eq!(candidate.raw_str("kind"), Some("post"));
        assert_eq!(candidate.raw_str("missing"), None);
        assert_eq!(ids(&[candidate]), vec!["post.123"]);
    }
}
