use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::hashing::sha256_hex;

/// Outcome of a generation request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Generated,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generated => "generated",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation request and its outcome.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub id: i64,
    /// Caller correlation key.
    pub request_id: String,
    pub template_code: String,
    /// Pinned template version id.
    #[serde(default)]
    pub template_version: Option<i64>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub store_to_dms: bool,
    #[serde(default)]
    pub dms_document_id: Option<String>,
    #[serde(default)]
    pub dms_status: String,
    #[serde(default)]
    pub has_callback: bool,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub callback_status: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        request_id: impl Into<String>,
        template_code: impl Into<String>,
        template_version: Option<i64>,
        payload: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            request_id: request_id.into(),
            template_code: template_code.into(),
            template_version,
            payload,
            metadata: Value::Null,
            status: DocumentStatus::Pending,
            error_message: None,
            file_name: None,
            file_path: None,
            file_size: None,
            checksum: None,
            content_type: None,
            store_to_dms: false,
            dms_document_id: None,
            dms_status: String::new(),
            has_callback: false,
            callback_url: None,
            callback_status: String::new(),
            created_by: None,
            created_at: now,
            processed_at: None,
            updated_at: now,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_callback(mut self, url: impl Into<String>) -> Self {
        self.has_callback = true;
        self.callback_url = Some(url.into());
        self.callback_status = "pending".to_string();
        self
    }

    /// Record a successful render: file attributes, checksum and terminal status.
    pub fn mark_generated(&mut self, bytes: &[u8], content_type: &str, file_name: &str) {
        let now = Utc::now();
        self.status = DocumentStatus::Generated;
        self.error_message = None;
        self.file_name = Some(file_name.to_string());
        self.file_size = Some(bytes.len() as i64);
        self.checksum = Some(sha256_hex(bytes));
        self.content_type = Some(content_type.to_string());
        self.processed_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let now = Utc::now();
        self.status = DocumentStatus::Failed;
        self.error_message = Some(message.into());
        self.processed_at = Some(now);
        self.updated_at = now;
    }
}
