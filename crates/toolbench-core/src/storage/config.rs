//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Display settings (currency symbol, decimal places)
//! - Log level for the CLI
//! - Housing calculator defaults for a fresh form
//!
//! Configuration is stored at `~/.config/toolbench/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::housing::HousingInput;

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Starting values of a fresh housing form, in percent and years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingDefaults {
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,
    #[serde(default = "default_appreciation_rate")]
    pub appreciation_rate: f64,
    #[serde(default = "default_mortgage_rate")]
    pub mortgage_rate: f64,
    #[serde(default = "default_mortgage_term_years")]
    pub mortgage_term_years: u32,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/toolbench/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub housing: HousingDefaults,
}

// Default functions
fn default_currency() -> String {
    "$".into()
}
fn default_decimal_places() -> u32 {
    2
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_inflation_rate() -> f64 {
    3.0
}
fn default_appreciation_rate() -> f64 {
    3.0
}
fn default_mortgage_rate() -> f64 {
    5.0
}
fn default_mortgage_term_years() -> u32 {
    25
}
fn default_horizon_years() -> u32 {
    10
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            decimal_places: default_decimal_places(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for HousingDefaults {
    fn default() -> Self {
        Self {
            inflation_rate: default_inflation_rate(),
            appreciation_rate: default_appreciation_rate(),
            mortgage_rate: default_mortgage_rate(),
            mortgage_term_years: default_mortgage_term_years(),
            horizon_years: default_horizon_years(),
        }
    }
}

impl HousingDefaults {
    /// Housing form prefilled with these defaults.
    pub fn to_input(&self) -> HousingInput {
        HousingInput {
            inflation_rate: self.inflation_rate,
            appreciation_rate: self.appreciation_rate,
            mortgage_rate: self.mortgage_rate,
            mortgage_term_years: self.mortgage_term_years,
            horizon_years: self.horizon_years,
            ..HousingInput::default()
        }
    }
}

impl GeneralConfig {
    /// Format an amount with the configured symbol and precision.
    pub fn money(&self, amount: f64) -> String {
        let places = self.decimal_places as usize;
        if amount < 0.0 {
            format!("-{}{:.*}", self.currency, places, -amount)
        } else {
            format!("{}{:.*}", self.currency, places, amount)
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                info!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit file.
    ///
    /// # Errors
    ///
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for keys that do not name a leaf
    /// value, and [`ConfigError::InvalidValue`] when the value does not fit
    /// the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (key, child) in map {
                        let path = if prefix.is_empty() {
                            key.clone()
                        } else {
                            format!("{prefix}.{key}")
                        };
                        walk(&path, child, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "configuration unreadable, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let parsed: Config = toml::from_str("[general]\ncurrency = \"€\"\n").unwrap();
        assert_eq!(parsed.general.currency, "€");
        assert_eq!(parsed.general.decimal_places, 2);
        assert_eq!(parsed.housing.mortgage_term_years, 25);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("general.currency").as_deref(), Some("$"));
        assert_eq!(cfg.get("housing.horizon_years").as_deref(), Some("10"));
        assert!(cfg.get("general.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("housing.mortgage_rate", "3.5").unwrap();
        assert_eq!(cfg.housing.mortgage_rate, 3.5);
        cfg.set("general.decimal_places", "0").unwrap();
        assert_eq!(cfg.general.decimal_places, 0);
    }

    #[test]
    fn set_updates_nested_string() {
        let mut cfg = Config::default();
        cfg.set("logging.level", "debug").unwrap();
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("general.nonexistent_key", "value"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.set("housing", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        let result = cfg.set("housing.mortgage_term_years", "thirty");
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_lists_every_leaf() {
        let entries = Config::default().entries();
        assert!(entries.contains(&("general.currency".to_string(), "$".to_string())));
        assert!(entries.contains(&("logging.level".to_string(), "warn".to_string())));
        assert_eq!(entries.len(), 8);
    }

    #[test]
    fn load_from_creates_defaults_on_first_use() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_from() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("general.currency", "£").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().general.currency, "£");
    }

    #[test]
    fn unparseable_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn money_uses_symbol_and_precision() {
        let general = GeneralConfig::default();
        assert_eq!(general.money(1234.5), "$1234.50");
        assert_eq!(general.money(-3.0), "-$3.00");
    }

    #[test]
    fn housing_defaults_prefill_the_form() {
        let defaults = HousingDefaults {
            mortgage_rate: 4.2,
            ..HousingDefaults::default()
        };
        let input = defaults.to_input();
        assert_eq!(input.mortgage_rate, 4.2);
        assert_eq!(input.adults, 2);
    }
}
