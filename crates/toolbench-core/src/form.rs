//! Form-style input handling shared by the calculators.
//!
//! Every calculator reads a flat set of named string fields. Numeric parsing
//! is lenient: a missing, empty or unparseable value falls back to the
//! field's default instead of raising. The only hard failure is the
//! required-field check run right before a calculation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Raw form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormValues {
    fields: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `key=value` pairs as typed on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair has no `=` or an empty key.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ValidationError::invalid(pair, "expected key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ValidationError::invalid(pair, "empty field name"));
            }
            form.insert(key, value);
        }
        Ok(form)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.trim().to_string());
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Trimmed value, `None` when the field is absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parsed number, or `None` if absent or not a finite number.
    pub fn optional_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(parse_number)
    }

    /// Parsed number or `default`.
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.optional_number(key).unwrap_or(default)
    }

    /// Whole non-negative count or `default`. Fractions are truncated.
    pub fn count_or(&self, key: &str, default: u32) -> u32 {
        match self.optional_number(key) {
            Some(n) if n >= 0.0 && n <= f64::from(u32::MAX) => n as u32,
            _ => default,
        }
    }

    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(str::to_ascii_lowercase).as_deref() {
            Some("true" | "yes" | "on" | "1") => true,
            Some("false" | "no" | "off" | "0") => false,
            _ => default,
        }
    }

    /// Field names that are not in `known`.
    pub fn unknown_keys<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        self.keys().filter(|k| !known.contains(k)).collect()
    }
}

/// Lenient number parsing: ignores spaces, underscores and a trailing `%`,
/// and accepts a comma as decimal separator when no dot is present.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    let normalized = if cleaned.contains('.') {
        cleaned.replace(',', "")
    } else {
        cleaned.replace(',', ".")
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Percent stored as a whole number (e.g. `3.5`) to a fraction (`0.035`).
pub fn percent(value: f64) -> f64 {
    value / 100.0
}

/// `#rrggbb` colour.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value.get(1..).is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// A calculator input that can be filled from form values.
pub trait FormInput: Sized + Default {
    /// Field names accepted by [`FormInput::apply_form`].
    const FIELDS: &'static [&'static str];

    /// Overwrite fields present in `form`; absent fields keep their value.
    fn apply_form(&mut self, form: &FormValues);

    /// Required-field check run before the calculation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequired`] naming every empty field.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Defaults overlaid with `form`.
    fn from_form(form: &FormValues) -> Self {
        let mut input = Self::default();
        input.apply_form(form);
        input
    }
}

/// Collect required fields whose value is not strictly positive.
pub(crate) fn require_positive(checks: &[(&str, f64)]) -> Result<(), ValidationError> {
    let fields: Vec<String> = checks
        .iter()
        .filter(|(_, value)| !(*value > 0.0))
        .map(|(name, _)| (*name).to_string())
        .collect();
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingRequired { fields })
    }
}
