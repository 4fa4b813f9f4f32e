//! Health and nutrition calculator.
//!
//! BMI, basal metabolic rate (Mifflin–St Jeor), daily energy expenditure,
//! a calorie target for the chosen goal, a macro split and water intake.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::form::{require_positive, FormInput, FormValues};
use crate::storage::{MergeSummary, ToolKey, Transferable};

/// Calorie adjustment applied for weight loss or gain.
pub const GOAL_CALORIE_DELTA: f64 = 500.0;
/// Water recommendation, millilitres per kilogram of body weight.
pub const WATER_ML_PER_KG: f64 = 35.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            _ => None,
        }
    }

    fn bmr_offset(&self) -> f64 {
        match self {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        }
    }

    /// Lowest calorie target we recommend.
    fn calorie_floor(&self) -> f64 {
        match self {
            Sex::Male => 1500.0,
            Sex::Female => 1200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    /// TDEE multiplier.
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little or no exercise)",
            ActivityLevel::Light => "Light (1-3 days a week)",
            ActivityLevel::Moderate => "Moderate (3-5 days a week)",
            ActivityLevel::Active => "Active (6-7 days a week)",
            ActivityLevel::VeryActive => "Very active (physical job or twice a day)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl Goal {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lose" => Some(Goal::Lose),
            "maintain" => Some(Goal::Maintain),
            "gain" => Some(Goal::Gain),
            _ => None,
        }
    }

    fn calorie_delta(&self) -> f64 {
        match self {
            Goal::Lose => -GOAL_CALORIE_DELTA,
            Goal::Maintain => 0.0,
            Goal::Gain => GOAL_CALORIE_DELTA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthInput {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity: ActivityLevel,
    pub goal: Goal,
}

impl FormInput for HealthInput {
    const FIELDS: &'static [&'static str] =
        &["weight_kg", "height_cm", "age", "sex", "activity", "goal"];

    fn apply_form(&mut self, form: &FormValues) {
        self.weight_kg = form.number_or("weight_kg", self.weight_kg);
        self.height_cm = form.number_or("height_cm", self.height_cm);
        self.age = form.count_or("age", self.age);
        if let Some(sex) = form.get("sex").and_then(Sex::parse) {
            self.sex = sex;
        }
        if let Some(activity) = form.get("activity").and_then(ActivityLevel::parse) {
            self.activity = activity;
        }
        if let Some(goal) = form.get("goal").and_then(Goal::parse) {
            self.goal = goal;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_positive(&[
            ("weight_kg", self.weight_kg),
            ("height_cm", self.height_cm),
            ("age", f64::from(self.age)),
        ])
    }
}

/// Grams per day of each macronutrient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Macros {
    /// 30% protein, 40% carbs, 30% fat.
    pub fn from_calories(calories: f64) -> Self {
        Self {
            protein_g: calories * 0.30 / 4.0,
            carbs_g: calories * 0.40 / 4.0,
            fat_g: calories * 0.30 / 9.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: f64,
    pub macros: Macros,
    pub water_ml: f64,
    pub healthy_weight_min_kg: f64,
    pub healthy_weight_max_kg: f64,
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let meters = height_cm / 100.0;
    if meters <= 0.0 {
        return 0.0;
    }
    weight_kg / (meters * meters)
}

/// Mifflin–St Jeor basal metabolic rate in kcal/day.
pub fn bmr(input: &HealthInput) -> f64 {
    10.0 * input.weight_kg + 6.25 * input.height_cm - 5.0 * f64::from(input.age)
        + input.sex.bmr_offset()
}

/// Run the health calculation.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequired`] when weight, height or age
/// are missing.
pub fn calculate(input: &HealthInput) -> Result<HealthReport, ValidationError> {
    input.validate()?;

    let bmi = bmi(input.weight_kg, input.height_cm);
    let bmr = bmr(input);
    let tdee = bmr * input.activity.factor();
    let target_calories = (tdee + input.goal.calorie_delta()).max(input.sex.calorie_floor());
    let height_m = input.height_cm / 100.0;

    debug!(bmi, tdee, target_calories, "health calculation finished");

    Ok(HealthReport {
        bmi,
        bmi_category: BmiCategory::from_bmi(bmi),
        bmr,
        tdee,
        target_calories,
        macros: Macros::from_calories(target_calories),
        water_ml: input.weight_kg * WATER_ML_PER_KG,
        healthy_weight_min_kg: 18.5 * height_m * height_m,
        healthy_weight_max_kg: 24.9 * height_m * height_m,
    })
}

impl Transferable for HealthInput {
    const TOOL: ToolKey = ToolKey::Health;
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

    fn sample() -> HealthInput {
        HealthInput {
            weight_kg: 80.0,
            height_cm: 180.0,
            age: 30,
            sex: Sex::Male,
            activity: ActivityLevel::Moderate,
            goal: Goal::Maintain,
        }
    }

    #[test]
    fn bmi_and_category() {
        let report = calculate(&sample()).unwrap();
        assert!((report.bmi - 24.691).abs() < 1e-3);
        assert_eq!(report.bmi_category, BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(17.0), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(27.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(31.0), BmiCategory::Obese);
    }

    #[test]
    fn mifflin_st_jeor() {
        // 800 + 1125 - 150 + 5
        assert!((bmr(&sample()) - 1780.0).abs() < 1e-9);
        let female = HealthInput {
            sex: Sex::Female,
            ..sample()
        };
        assert!((bmr(&female) - 1614.0).abs() < 1e-9);
    }

    #[test]
    fn goal_adjusts_target_with_floor() {
        let lose = HealthInput {
            goal: Goal::Lose,
            ..sample()
        };
        let report = calculate(&lose).unwrap();
        assert!((report.target_calories - (1780.0 * 1.55 - 500.0)).abs() < 1e-9);

        let tiny = HealthInput {
            weight_kg: 40.0,
            height_cm: 150.0,
            age: 80,
            sex: Sex::Female,
            activity: ActivityLevel::Sedentary,
            goal: Goal::Lose,
        };
        assert_eq!(calculate(&tiny).unwrap().target_calories, 1200.0);
    }

    #[test]
    fn macros_add_back_up_to_calories() {
        let m = Macros::from_calories(2000.0);
        let kcal = m.protein_g * 4.0 + m.carbs_g * 4.0 + m.fat_g * 9.0;
        assert!((kcal - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn form_parses_enums_and_ignores_unknown_values() {
        let form = FormValues::new()
            .with("weight_kg", "70")
            .with("height_cm", "165")
            .with("age", "41")
            .with("sex", "F")
            .with("activity", "very-active")
            .with("goal", "bulk");
        let input = HealthInput::from_form(&form);
        assert_eq!(input.sex, Sex::Female);
        assert_eq!(input.activity, ActivityLevel::VeryActive);
        assert_eq!(input.goal, Goal::Maintain);
    }

    #[test]
    fn missing_fields_block_calculation() {
        let err = calculate(&HealthInput::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                fields: vec!["weight_kg".into(), "height_cm".into(), "age".into()]
            }
        );
    }
}
