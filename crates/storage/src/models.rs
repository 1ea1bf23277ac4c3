use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Parsed frontmatter of a single note. Author-defined keys, no fixed schema.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Note basename to cached entry.
pub type Index = BTreeMap<String, IndexEntry>;

/// Name of the reserved timestamp field stored next to the frontmatter keys.
pub const UPDATED_KEY: &str = "updated";

/// Cached metadata for one note.
///
/// Serialized flat: `updated` sits alongside the note's own top-level
/// frontmatter keys in the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub updated: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl IndexEntry {
    /// Builds an entry, dropping any author-defined `updated` key so the
    /// reserved timestamp field is the only one serialized.
    pub fn new(updated: String, mut metadata: Metadata) -> Self {
        if metadata.remove(UPDATED_KEY).is_some() {
            debug!("dropping frontmatter key `{}` shadowed by index field", UPDATED_KEY);
        }
        Self { updated, metadata }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_serializes_flat() {
        let mut metadata = Metadata::new();
        metadata.insert("title".into(), json!("Groceries"));
        metadata.insert("tags".into(), json!(["home", "todo"]));
        let entry = IndexEntry::new("2024-03-01T10:00:00.000Z".into(), metadata);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "updated": "2024-03-01T10:00:00.000Z",
                "title": "Groceries",
                "tags": ["home", "todo"],
            })
        );
    }

    #[test]
    fn author_updated_key_is_dropped() {
        let mut metadata = Metadata::new();
        metadata.insert("updated".into(), json!("yesterday"));
        metadata.insert("title".into(), json!("Plan"));
        let entry = IndexEntry::new("2024-03-01T10:00:00.000Z".into(), metadata);

        assert_eq!(entry.updated, "2024-03-01T10:00:00.000Z");
        assert!(!entry.metadata.contains_key("updated"));

        let text = serde_json::to_string(&entry).unwrap();
        let back: IndexEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn entry_without_updated_is_rejected() {
        let res = serde_json::from_value::<IndexEntry>(json!({ "title": "x" }));
        assert!(res.is_err());
    }
}
