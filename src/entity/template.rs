use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document family identified by its unique business `code`.
///
/// `output_format` and `engine` decide which generator renders the
/// template's versions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentTemplate {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub output_format: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl DocumentTemplate {
    pub fn new(
        id: i64,
        code: impl Into<String>,
        name: impl Into<String>,
        output_format: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            code: code.into(),
            name: name.into(),
            description: None,
            engine: engine.into(),
            output_format: output_format.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
