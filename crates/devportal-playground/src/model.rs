use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// HTTP methods the playground can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn next(self) -> Self {
        match self {
            HttpMethod::Get => HttpMethod::Post,
            HttpMethod::Post => HttpMethod::Put,
            HttpMethod::Put => HttpMethod::Patch,
            HttpMethod::Patch => HttpMethod::Delete,
            HttpMethod::Delete => HttpMethod::Get,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            HttpMethod::Get => HttpMethod::Delete,
            HttpMethod::Post => HttpMethod::Get,
            HttpMethod::Put => HttpMethod::Post,
            HttpMethod::Patch => HttpMethod::Put,
            HttpMethod::Delete => HttpMethod::Patch,
        }
    }

    /// Whether a request body is ever transmitted with this method.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Key-value rows ───────────────────────────────────────────────────

/// Identifier of a row, unique within its owning list.
pub type RowId = u64;

/// A single header or query parameter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueRow {
    pub id: RowId,
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl KeyValueRow {
    /// Whether this row contributes to a derived request.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

/// Which half of a row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Key,
    Value,
}

// ── Credential descriptors ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Dev,
    Prod,
}

impl KeyType {
    pub fn label(&self) -> &'static str {
        match self {
            KeyType::Dev => "dev",
            KeyType::Prod => "prod",
        }
    }
}

/// Metadata about a known credential. Never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    pub id: String,
    pub key_prefix: String,
    pub key_type: KeyType,
    pub is_active: bool,
    pub preview_text: String,
}

// ── Response record ──────────────────────────────────────────────────

/// Status text used for transport failures.
pub const NETWORK_ERROR_TEXT: &str = "Network Error";

/// Normalized result of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    /// `None` when the request never produced an HTTP response.
    pub status: Option<u16>,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
    pub duration_ms: u64,
    pub size_formatted: String,
}

impl ResponseRecord {
    pub fn is_network_error(&self) -> bool {
        self.status.is_none()
    }
}

// ── History entries ──────────────────────────────────────────────────

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Compact, immutable record of one past execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    pub method: HttpMethod,
    pub url: String,
    pub status: Option<u16>,
    pub duration_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub succeeded: bool,
}

impl HistoryEntry {
    pub fn new(method: HttpMethod, url: impl Into<String>, status: Option<u16>, duration_ms: Option<u64>) -> Self {
        Self {
            id: NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed),
            method,
            url: url.into(),
            status,
            duration_ms,
            timestamp: Utc::now(),
            succeeded: matches!(status, Some(code) if (200..400).contains(&code)),
        }
    }

    /// Short `12:03:44` style time for list rendering.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Human readable byte size.
pub fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
