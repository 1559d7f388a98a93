//! The editable request model and everything derived from it.

use crate::error::BodyError;
use crate::model::{HttpMethod, KeyValueRow, RowField, RowId};
use crate::presets::Preset;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const API_KEY_HEADER: &str = "X-API-Key";
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ── Row list ─────────────────────────────────────────────────────────

/// Ordered rows with ids that stay stable across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowList {
    rows: Vec<KeyValueRow>,
    next_id: RowId,
}

impl RowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut list = Self::new();
        for (key, value) in pairs {
            list.push(key, value);
        }
        list
    }

    /// Append an enabled row and return its id.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> RowId {
        let id = self.allocate_id();
        self.rows.push(KeyValueRow {
            id,
            key: key.into(),
            value: value.into(),
            enabled: true,
        });
        id
    }

    /// Append an empty enabled row.
    pub fn add_row(&mut self) -> RowId {
        self.push("", "")
    }

    /// Insert an empty enabled row at `index` (clamped to the end).
    pub fn insert_row(&mut self, index: usize) -> RowId {
        let id = self.allocate_id();
        let index = index.min(self.rows.len());
        self.rows.insert(
            index,
            KeyValueRow {
                id,
                key: String::new(),
                value: String::new(),
                enabled: true,
            },
        );
        id
    }

    /// Remove a row. Returns false if the id is unknown.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    pub fn update_row(&mut self, id: RowId, field: RowField, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                match field {
                    RowField::Key => row.key = value.into(),
                    RowField::Value => row.value = value.into(),
                }
                true
            }
            None => false,
        }
    }

    pub fn toggle_row(&mut self, id: RowId) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.enabled = !row.enabled;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: RowId) -> Option<&KeyValueRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    fn get_mut(&mut self, id: RowId) -> Option<&mut KeyValueRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    /// First row whose key matches `name`, ignoring ASCII case.
    pub fn find_by_key(&self, name: &str) -> Option<&KeyValueRow> {
        self.rows.iter().find(|row| row.key.eq_ignore_ascii_case(name))
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Rows that take part in a derived request, in order.
    pub fn active(&self) -> impl Iterator<Item = &KeyValueRow> {
        self.rows.iter().filter(|row| row.is_active())
    }

    fn allocate_id(&mut self) -> RowId {
        self.next_id += 1;
        self.next_id
    }

    /// Set the first row named `name` (any case) to `value` and enable it,
    /// appending a new row when none exists.
    fn upsert(&mut self, name: &str, value: &str) {
        match self
            .rows
            .iter_mut()
            .find(|row| row.key.eq_ignore_ascii_case(name))
        {
            Some(row) => {
                row.value = value.to_string();
                row.enabled = true;
            }
            None => {
                self.push(name, value);
            }
        }
    }
}

// ── Outgoing request ─────────────────────────────────────────────────

/// Immutable snapshot handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutgoingRequest {
    /// Case-insensitive header lookup (first match).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ── Request state ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestState {
    pub method: HttpMethod,
    pub base_url: String,
    pub path: String,
    pub headers: RowList,
    pub query_params: RowList,
    pub body: String,
    /// Informational only: multipart bodies are never transmitted.
    pub is_multipart: bool,
}

impl RequestState {
    /// Default state: GET `/` with JSON content negotiation headers.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            base_url: base_url.into(),
            path: "/".to_string(),
            headers: RowList::from_pairs([
                (CONTENT_TYPE, JSON_CONTENT_TYPE),
                ("Accept", JSON_CONTENT_TYPE),
            ]),
            query_params: RowList::new(),
            body: String::new(),
            is_multipart: false,
        }
    }

    /// Base URL without trailing slashes, plus path, plus encoded query.
    pub fn build_url(&self) -> String {
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), self.path);
        let query = self.query_string();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    fn query_string(&self) -> String {
        self.query_params
            .active()
            .map(|row| {
                format!(
                    "{}={}",
                    urlencoding::encode(&row.key),
                    urlencoding::encode(&row.value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Bulk-assign a preset. Only the Content-Type header row is touched.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.method = preset.method;
        self.path = preset.path.to_string();
        self.body = preset.body.to_string();
        self.is_multipart = preset.multipart;
        self.headers.upsert(CONTENT_TYPE, preset.content_type);
    }

    /// Whether the body would be transmitted for the current method.
    pub fn sends_body(&self) -> bool {
        self.method.allows_body() && !self.is_multipart && !self.body.is_empty()
    }

    pub fn parse_body(&self) -> Result<serde_json::Value, BodyError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Pretty-print the body in place. On error the body is left untouched.
    pub fn format_body(&mut self) -> Result<(), BodyError> {
        let value = self.parse_body()?;
        // Serializing a parsed Value cannot fail.
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            self.body = pretty;
        }
        Ok(())
    }

    /// Freeze the request as it will be sent with `credential`.
    ///
    /// User rows named `X-API-Key` are dropped and the credential header is
    /// appended last, so exactly one is sent.
    pub fn snapshot(&self, credential: &str) -> OutgoingRequest {
        let mut headers: Vec<(String, String)> = self
            .headers
            .active()
            .filter(|row| !row.key.eq_ignore_ascii_case(API_KEY_HEADER))
            .map(|row| (row.key.clone(), row.value.clone()))
            .collect();
        headers.push((API_KEY_HEADER.to_string(), credential.to_string()));

        OutgoingRequest {
            method: self.method,
            url: self.build_url(),
            headers,
            body: self.sends_body().then(|| self.body.clone()),
        }
    }
}
