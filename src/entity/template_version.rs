use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One revision of a template's source and payload schema.
///
/// Once `is_published` is set, `content` and `schema` must not change.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TemplateVersion {
    pub id: i64,
    pub template_id: i64,
    pub version: i32,
    pub content: String,
    pub schema: Value,
    #[serde(default)]
    pub sample_payload: Value,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TemplateVersion {
    pub fn new(
        id: i64,
        template_id: i64,
        version: i32,
        content: impl Into<String>,
        schema: Value,
    ) -> Self {
        Self {
            id,
            template_id,
            version,
            content: content.into(),
            schema,
            sample_payload: Value::Null,
            is_published: false,
            published_at: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the version as published. Publishing twice keeps the first timestamp.
    pub fn publish(mut self) -> Self {
        if !self.is_published {
            self.is_published = true;
            self.published_at = Some(Utc::now());
        }
        self
    }

    /// Whether replacing `self` with `next` would alter frozen content.
    /// Publication is one-way: a published version cannot be unpublished.
    pub fn conflicts_with(&self, next: &TemplateVersion) -> bool {
        self.is_published
            && (!next.is_published
                || next.published_at != self.published_at
                || self.content != next.content
                || self.schema != next.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unpublished_version_accepts_changes() {
        let current = TemplateVersion::new(1, 1, 1, "a", json!({"type": "object"}));
        let mut next = current.clone();
        next.content = "b".to_string();
        assert!(!current.conflicts_with(&next));
    }

    #[test]
    fn test_published_version_rejects_content_and_schema_changes() {
        let current = TemplateVersion::new(1, 1, 1, "a", json!({"type": "object"})).publish();
        assert!(current.published_at.is_some());

        let mut content_change = current.clone();
        content_change.content = "b".to_string();
        assert!(current.conflicts_with(&content_change));

        let mut schema_change = current.clone();
        schema_change.schema = json!({"type": "array"});
        assert!(current.conflicts_with(&schema_change));

        let mut unpublished = current.clone();
        unpublished.is_published = false;
        unpublished.published_at = None;
        assert!(current.conflicts_with(&unpublished));

        let mut sample_change = current.clone();
        sample_change.sample_payload = json!({"id": 1});
        assert!(!current.conflicts_with(&sample_change));
    }
}
