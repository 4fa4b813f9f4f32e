//! Export and import of tool state as JSON files.
//!
//! Exports wrap the stored blob in an envelope naming the tool and format
//! version. Imports accept either an envelope or a bare blob of the same
//! shape. The whole file is parsed before anything is applied, so a
//! malformed import leaves the current state untouched.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::ToolKey;
use crate::error::{ImportError, Result};

/// Current export format version.
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope<T> {
    pub tool: ToolKey,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub data: T,
}

/// How imported records combine with existing ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Same-id records are replaced, new ids appended, settings kept
    #[default]
    Merge,
    /// Existing state is discarded
    Replace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
}

impl MergeSummary {
    pub fn combine(self, other: MergeSummary) -> MergeSummary {
        MergeSummary {
            added: self.added + other.added,
            updated: self.updated + other.updated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub added: usize,
    pub updated: usize,
}

/// A record with a stable identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Merge `incoming` into `existing` by id: matching ids are replaced in
/// place, unknown ids are appended in incoming order.
pub fn merge_by_id<T: Identified>(existing: &mut Vec<T>, incoming: Vec<T>) -> MergeSummary {
    let mut summary = MergeSummary::default();
    for record in incoming {
        match existing.iter().position(|r| r.id() == record.id()) {
            Some(index) => {
                existing[index] = record;
                summary.updated += 1;
            }
            None => {
                existing.push(record);
                summary.added += 1;
            }
        }
    }
    summary
}

/// Tool state that can be exported and imported.
pub trait Transferable: Serialize + DeserializeOwned + Sized {
    const TOOL: ToolKey;

    /// Top-level keys of the stored blob. An import may only use these.
    const KEYS: &'static [&'static str];

    /// Fold an imported state into `self`.
    fn merge(&mut self, incoming: Self) -> MergeSummary;

    /// Number of records, used to report a wholesale replace.
    fn record_count(&self) -> usize;
}

/// Serialize `state` inside an export envelope.
///
/// # Errors
/// Returns a JSON error if serialization fails.
pub fn export_to_string<T: Transferable>(state: &T) -> Result<String> {
    let envelope = ExportEnvelope {
        tool: T::TOOL,
        version: EXPORT_VERSION,
        exported_at: Utc::now(),
        data: state,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Write an export file.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn export_to_file<T: Transferable>(state: &T, path: &Path) -> Result<()> {
    std::fs::write(path, export_to_string(state)?)?;
    info!(tool = %T::TOOL, path = %path.display(), "state exported");
    Ok(())
}

fn looks_like_envelope(value: &serde_json::Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("tool") && obj.contains_key("data"))
}

/// Reject blobs that are empty or carry keys `T` does not store, so a
/// foreign or blank file never deserializes into a default state.
fn check_shape<T: Transferable>(value: &serde_json::Value) -> Result<(), ImportError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ImportError::Malformed(format!("expected a {} object", T::TOOL)))?;
    if obj.is_empty() {
        return Err(ImportError::Malformed(format!("no {} data found", T::TOOL)));
    }
    if let Some(key) = obj.keys().find(|key| !T::KEYS.contains(&key.as_str())) {
        return Err(ImportError::Malformed(format!(
            "unexpected field '{key}' for {}",
            T::TOOL
        )));
    }
    Ok(())
}

/// Parse an export file for `T` without applying it.
///
/// # Errors
/// Returns [`ImportError`] if the content is not JSON, belongs to another
/// tool, uses a newer format version, or does not match the state shape.
pub fn parse_import<T: Transferable>(content: &str) -> Result<T, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| ImportError::Malformed(e.to_string()))?;

    if !looks_like_envelope(&value) {
        check_shape::<T>(&value)?;
        return serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()));
    }

    let found = value["tool"].as_str().unwrap_or_default().to_string();
    if found != T::TOOL.as_str() {
        return Err(ImportError::WrongTool {
            expected: T::TOOL.as_str().to_string(),
            found,
        });
    }
    let version = value["version"].as_u64().unwrap_or(0) as u32;
    if version > EXPORT_VERSION {
        return Err(ImportError::UnsupportedVersion {
            found: version,
            supported: EXPORT_VERSION,
        });
    }
    check_shape::<T>(&value["data"])?;
    let envelope: ExportEnvelope<T> =
        serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))?;
    Ok(envelope.data)
}

/// Parse `content` and apply it to `state`.
///
/// # Errors
/// Returns [`ImportError`] if parsing fails; `state` is unchanged then.
pub fn apply_import<T: Transferable>(
    state: &mut T,
    content: &str,
    mode: ImportMode,
) -> Result<ImportSummary, ImportError> {
    let incoming = parse_import::<T>(content)?;
    let summary = match mode {
        ImportMode::Replace => {
            let added = incoming.record_count();
            *state = incoming;
            ImportSummary {
                mode,
                added,
                updated: 0,
            }
        }
        ImportMode::Merge => {
            let merged = state.merge(incoming);
            ImportSummary {
                mode,
                added: merged.added,
                updated: merged.updated,
            }
        }
    };
    info!(
        tool = %T::TOOL,
        ?mode,
        added = summary.added,
        updated = summary.updated,
        "state imported"
    );
    Ok(summary)
}

/// Read an export file from disk and apply it.
///
/// # Errors
/// Returns an IO error if the file cannot be read, or an import error if it
/// is malformed.
pub fn import_from_file<T: Transferable>(
    state: &mut T,
    path: &Path,
    mode: ImportMode,
) -> Result<ImportSummary> {
    let content = std::fs::read_to_string(path)?;
    Ok(apply_import(state, &content, mode)?)
}
