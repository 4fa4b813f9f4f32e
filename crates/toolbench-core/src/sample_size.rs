//! Statistical sample size calculator.
//!
//! Cochran's formula for a proportion, with a finite population correction
//! when the population size is known.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::form::{percent, require_positive, FormInput, FormValues};
use crate::storage::{MergeSummary, ToolKey, Transferable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "80")]
    P80,
    #[serde(rename = "85")]
    P85,
    #[serde(rename = "90")]
    P90,
    #[default]
    #[serde(rename = "95")]
    P95,
    #[serde(rename = "99")]
    P99,
}

impl ConfidenceLevel {
    pub const ALL: [ConfidenceLevel; 5] = [
        ConfidenceLevel::P80,
        ConfidenceLevel::P85,
        ConfidenceLevel::P90,
        ConfidenceLevel::P95,
        ConfidenceLevel::P99,
    ];

    /// Accepts `95`, `95%` or `0.95`.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = crate::form::parse_number(raw)?;
        let value = if value < 1.0 { value * 100.0 } else { value };
        Self::ALL
            .into_iter()
            .find(|level| (level.percent() - value).abs() < 1e-9)
    }

    pub fn percent(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 80.0,
            ConfidenceLevel::P85 => 85.0,
            ConfidenceLevel::P90 => 90.0,
            ConfidenceLevel::P95 => 95.0,
            ConfidenceLevel::P99 => 99.0,
        }
    }

    /// Two-sided z-score.
    pub fn z_score(&self) -> f64 {
        match self {
            ConfidenceLevel::P80 => 1.282,
            ConfidenceLevel::P85 => 1.440,
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.960,
            ConfidenceLevel::P99 => 2.576,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleSizeInput {
    pub confidence: ConfidenceLevel,
    /// Margin of error, percent
    pub margin_of_error: f64,
    /// Expected proportion, percent
    pub proportion: f64,
    /// Population size; `None` for an unbounded population
    pub population: Option<u64>,
}

impl Default for SampleSizeInput {
    fn default() -> Self {
        Self {
            confidence: ConfidenceLevel::P95,
            margin_of_error: 5.0,
            proportion: 50.0,
            population: None,
        }
    }
}

impl FormInput for SampleSizeInput {
    const FIELDS: &'static [&'static str] =
        &["confidence", "margin_of_error", "proportion", "population"];

    fn apply_form(&mut self, form: &FormValues) {
        if let Some(level) = form.get("confidence").and_then(ConfidenceLevel::parse) {
            self.confidence = level;
        }
        self.margin_of_error = form.number_or("margin_of_error", self.margin_of_error);
        self.proportion = form.number_or("proportion", self.proportion);
        if form.get("population").is_some() {
            self.population = form
                .optional_number("population")
                .filter(|n| *n >= 1.0)
                .map(|n| n as u64);
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_positive(&[
            ("margin_of_error", self.margin_of_error),
            ("proportion", self.proportion),
        ])?;
        if self.proportion >= 100.0 {
            return Err(ValidationError::invalid(
                "proportion",
                "must be below 100%",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeReport {
    pub z_score: f64,
    /// Cochran's n0 before rounding
    pub unadjusted: f64,
    /// Required respondents, rounded up
    pub sample_size: u64,
    /// True when a finite population correction was applied
    pub corrected: bool,
}

/// Apply the finite population correction to `n0`.
pub fn finite_population_correction(n0: f64, population: u64) -> f64 {
    let n = population as f64;
    n0 / (1.0 + (n0 - 1.0) / n)
}

/// Required sample size.
///
/// # Errors
///
/// Returns a validation error if the margin of error or proportion are
/// missing or out of range.
pub fn calculate(input: &SampleSizeInput) -> Result<SampleSizeReport, ValidationError> {
    input.validate()?;

    let z = input.confidence.z_score();
    let p = percent(input.proportion);
    let e = percent(input.margin_of_error);
    let n0 = z * z * p * (1.0 - p) / (e * e);

    let (n, corrected) = match input.population {
        Some(population) => (finite_population_correction(n0, population), true),
        None => (n0, false),
    };

    Ok(SampleSizeReport {
        z_score: z,
        unadjusted: n0,
        // float noise must not push an exact integer up
        sample_size: (n - 1e-9).ceil().max(1.0) as u64,
        corrected,
    })
}

/// Margin of error (percent) achieved by `sample_size` respondents.
pub fn margin_of_error(input: &SampleSizeInput, sample_size: u64) -> f64 {
    if sample_size == 0 {
        return 100.0;
    }
    let z = input.confidence.z_score();
    let p = percent(input.proportion);
    let n = sample_size as f64;
    let mut e = z * (p * (1.0 - p) / n).sqrt();
    if let Some(population) = input.population {
        let big_n = population as f64;
        if big_n > 1.0 {
            e *= ((big_n - n).max(0.0) / (big_n - 1.0)).sqrt();
        }
    }
    e * 100.0
}

impl Transferable for SampleSizeInput {
    const TOOL: ToolKey = ToolKey::SampleSize;
    const KEYS: &'static [&'static str] = <Self as FormInput>::FIELDS;

    fn merge(&mut self, incoming: Self) -> MergeSummary {
        *self = incoming;
        MergeSummary {
            added: 0,
            updated: 1,
        }
    }

    fn record_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_385() {
        let report = calculate(&SampleSizeInput::default()).unwrap();
        assert_eq!(report.sample_size, 385);
        assert!(!report.corrected);
    }

    #[test]
    fn finite_population_shrinks_sample() {
        let input = SampleSizeInput {
            population: Some(1_000),
            ..SampleSizeInput::default()
        };
        let report = calculate(&input).unwrap();
        assert!(report.corrected);
        assert_eq!(report.sample_size, 278);
    }

    #[test]
    fn tiny_population_never_exceeds_itself() {
        let input = SampleSizeInput {
            population: Some(50),
            ..SampleSizeInput::default()
        };
        assert!(calculate(&input).unwrap().sample_size <= 50);
    }

    #[test]
    fn confidence_parsing() {
        assert_eq!(ConfidenceLevel::parse("99"), Some(ConfidenceLevel::P99));
        assert_eq!(ConfidenceLevel::parse("0.9"), Some(ConfidenceLevel::P90));
        assert_eq!(ConfidenceLevel::parse("85%"), Some(ConfidenceLevel::P85));
        assert_eq!(ConfidenceLevel::parse("97"), None);
    }

    #[test]
    fn margin_inverts_sample_size() {
        let input = SampleSizeInput::default();
        let e = margin_of_error(&input, 385);
        assert!((e - 4.99).abs() < 0.02, "got {e}");
    }

    #[test]
    fn proportion_must_be_inside_range() {
        let input = SampleSizeInput {
            proportion: 100.0,
            ..SampleSizeInput::default()
        };
        assert!(calculate(&input).is_err());
        let input = SampleSizeInput {
            margin_of_error: 0.0,
            ..SampleSizeInput::default()
        };
        assert!(matches!(
            calculate(&input),
            Err(ValidationError::MissingRequired { .. })
        ));
    }

    #[test]
    fn unparseable_population_clears_it() {
        let mut input = SampleSizeInput {
            population: Some(10),
            ..SampleSizeInput::default()
        };
        input.apply_form(&FormValues::new().with("population", "none"));
        assert_eq!(input.population, None);
    }
}
