//! Subcommand implementations. Each module owns one tool's `XAction` enum
//! and a `run` entry point.

pub mod calendar;
pub mod config;
pub mod health;
pub mod housing;
pub mod qr;
pub mod sample_size;
pub mod todo;

use std::path::Path;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::Serialize;
use toolbench_core::storage::transfer::{export_to_file, import_from_file};
use toolbench_core::{FormInput, FormValues, ImportMode, JsonStore, Transferable};
use tracing::warn;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build form values from repeated `--set key=value` flags, warning about
/// fields `T` does not know.
pub fn form_for<T: FormInput>(sets: &[String]) -> Result<FormValues, Box<dyn std::error::Error>> {
    let form = FormValues::from_pairs(sets)?;
    for key in form.unknown_keys(T::FIELDS) {
        warn!(field = key, "ignoring unknown field");
        eprintln!("warning: unknown field '{key}' ignored");
    }
    Ok(form)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM-DD`, or `today` / `tomorrow`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today()),
        "tomorrow" => today()
            .succ_opt()
            .ok_or_else(|| "date out of range".to_string()),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD")),
    }
}

/// `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{raw}', expected HH:MM"))
}

/// Comma-separated list, blanks dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportModeArg {
    /// Replace same-id records and append new ones
    Merge,
    /// Discard current state
    Replace,
}

impl From<ImportModeArg> for ImportMode {
    fn from(mode: ImportModeArg) -> Self {
        match mode {
            ImportModeArg::Merge => ImportMode::Merge,
            ImportModeArg::Replace => ImportMode::Replace,
        }
    }
}

/// Export the stored state of `T` to `path`.
pub fn export_state<T>(path: &Path) -> CliResult
where
    T: Transferable + Default,
{
    let store: JsonStore<T> = JsonStore::open(T::TOOL)?;
    let state = store.load()?;
    export_to_file(&state, path)?;
    println!("exported {} to {}", T::TOOL, path.display());
    Ok(())
}

/// Import `path` into the stored state of `T` and save the result.
pub fn import_state<T>(path: &Path, mode: ImportModeArg) -> CliResult
where
    T: Transferable + Default,
{
    let store: JsonStore<T> = JsonStore::open(T::TOOL)?;
    let mut state = store.load()?;
    let summary = import_from_file(&mut state, path, mode.into())?;
    store.save(&state)?;
    println!(
        "imported {}: {} added, {} updated",
        T::TOOL,
        summary.added,
        summary.updated
    );
    Ok(())
}
