//! Persisted QR tool state: settings and a short history of payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QrPayload;
use crate::form::{is_hex_color, FormValues};
use crate::storage::{merge_by_id, Identified, MergeSummary, ToolKey, Transferable};

/// History entries kept, newest first.
pub const HISTORY_LIMIT: usize = 20;

/// QR error correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    #[serde(rename = "L")]
    Low,
    #[default]
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "Q")]
    Quartile,
    #[serde(rename = "H")]
    High,
}

impl ErrorCorrection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Some(ErrorCorrection::Low),
            "M" | "MEDIUM" => Some(ErrorCorrection::Medium),
            "Q" | "QUARTILE" => Some(ErrorCorrection::Quartile),
            "H" | "HIGH" => Some(ErrorCorrection::High),
            _ => None,
        }
    }

    /// Byte-mode capacity of a version 40 symbol.
    pub fn capacity_bytes(&self) -> usize {
        match self {
            ErrorCorrection::Low => 2953,
            ErrorCorrection::Medium => 2331,
            ErrorCorrection::Quartile => 1663,
            ErrorCorrection::High => 1273,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            ErrorCorrection::Low => 'L',
            ErrorCorrection::Medium => 'M',
            ErrorCorrection::Quartile => 'Q',
            ErrorCorrection::High => 'H',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrSettings {
    /// Edge length in pixels
    pub size: u32,
    pub error_correction: ErrorCorrection,
    pub foreground: String,
    pub background: String,
}

pub const MIN_SIZE: u32 = 64;
pub const MAX_SIZE: u32 = 1024;

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            size: 256,
            error_correction: ErrorCorrection::Medium,
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

impl QrSettings {
    /// Overlay form values. Invalid colours and levels keep the current
    /// value; the size is clamped to the supported range.
    pub fn apply_form(&mut self, form: &FormValues) {
        if form.get("size").is_some() {
            self.size = form.count_or("size", self.size).clamp(MIN_SIZE, MAX_SIZE);
        }
        if let Some(level) = form.get("error_correction").and_then(ErrorCorrection::parse) {
            self.error_correction = level;
        }
        if let Some(color) = form.get("foreground").filter(|c| is_hex_color(c)) {
            self.foreground = color.to_ascii_lowercase();
        }
        if let Some(color) = form.get("background").filter(|c| is_hex_color(c)) {
            self.background = color.to_ascii_lowercase();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrHistoryEntry {
    pub payload: QrPayload,
    pub encoded: String,
    pub created_at: DateTime<Utc>,
}

/// Everything the QR tool persists under its storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrState {
    pub settings: QrSettings,
    pub history: Vec<QrHistoryEntry>,
}

impl QrState {
    /// Remember a generated payload. Re-generating an existing payload moves
    /// it to the front instead of duplicating it.
    pub fn record(&mut self, payload: QrPayload, encoded: String) {
        self.history.retain(|entry| entry.encoded != encoded);
        self.history.insert(
            0,
            QrHistoryEntry {
                payload,
                encoded,
                created_at: Utc::now(),
            },
        );
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Identified for QrHistoryEntry {
    fn id(&self) -> &str {
        &self.encoded
    }
}

impl Transferable for QrState {
    const TOOL: ToolKey = ToolKey::Qr;
    const KEYS: &'static [&'static str] = &["settings", "history"];

    /// Merge history by encoded text and keep local settings. The merged
    /// history is re-sorted newest first and trimmed to the limit.
    fn merge(&mut self, incoming: Self) -> MergeSummary {
        let summary = merge_by_id(&mut self.history, incoming.history);
        self.history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.history.truncate(HISTORY_LIMIT);
        summary
    }

    fn record_count(&self) -> usize {
        self.history.len()
    }
}
