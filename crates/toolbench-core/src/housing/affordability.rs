//! Debt-to-income affordability check.

use serde::{Deserialize, Serialize};

use super::mortgage::{monthly_payment, principal_for_payment};
use super::HousingInput;
use crate::error::ValidationError;
use crate::form::{percent, require_positive, FormInput, FormValues};

/// Conventional back-end DTI ceiling, in percent.
pub const DEFAULT_MAX_DTI: f64 = 36.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityInput {
    pub monthly_income: f64,
    /// Other monthly debt obligations (car, cards, student loans)
    pub monthly_debts: f64,
    /// DTI ceiling in percent
    pub max_dti: f64,
}

impl Default for AffordabilityInput {
    fn default() -> Self {
        Self {
            monthly_income: 0.0,
            monthly_debts: 0.0,
            max_dti: DEFAULT_MAX_DTI,
        }
    }
}

impl FormInput for AffordabilityInput {
    const FIELDS: &'static [&'static str] = &["monthly_income", "monthly_debts", "max_dti"];

    fn apply_form(&mut self, form: &FormValues) {
        self.monthly_income = form.number_or("monthly_income", self.monthly_income);
        self.monthly_debts = form.number_or("monthly_debts", self.monthly_debts);
        self.max_dti = form.number_or("max_dti", self.max_dti);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_positive(&[("monthly_income", self.monthly_income)])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affordability {
    /// Mortgage payment of the scenario under consideration
    pub monthly_payment: f64,
    /// DTI of the scenario, in percent
    pub dti: f64,
    pub within_limit: bool,
    /// Largest mortgage payment the DTI ceiling allows
    pub max_monthly_payment: f64,
    pub max_loan: f64,
    /// Price reachable with the configured down payment share
    pub max_property_price: f64,
}

/// Assess the housing scenario against a DTI ceiling.
///
/// Zero income yields zero affordability and an infinite DTI.
pub fn assess_affordability(housing: &HousingInput, income: &AffordabilityInput) -> Affordability {
    let payment = monthly_payment(
        housing.loan_amount(),
        housing.mortgage_rate,
        housing.mortgage_term_years,
    );
    let dti = if income.monthly_income > 0.0 {
        (payment + income.monthly_debts) / income.monthly_income * 100.0
    } else {
        f64::INFINITY
    };

    let max_monthly_payment =
        (income.monthly_income * percent(income.max_dti) - income.monthly_debts).max(0.0);
    let max_loan = principal_for_payment(
        max_monthly_payment,
        housing.mortgage_rate,
        housing.mortgage_term_years,
    );
    let financed_share = 1.0 - percent(housing.down_payment_percent);
    let max_property_price = if financed_share > 0.0 {
        max_loan / financed_share
    } else {
        0.0
    };

    Affordability {
        monthly_payment: payment,
        dti,
        within_limit: dti <= income.max_dti,
        max_monthly_payment,
        max_loan,
        max_property_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_income_affords_nothing() {
        let housing = HousingInput {
            property_price: 300_000.0,
            ..HousingInput::default()
        };
        let result = assess_affordability(&housing, &AffordabilityInput::default());
        assert_eq!(result.max_loan, 0.0);
        assert_eq!(result.max_property_price, 0.0);
        assert!(!result.within_limit);
    }

    #[test]
    fn max_price_scales_with_down_payment() {
        let housing = HousingInput {
            mortgage_rate: 0.0,
            mortgage_term_years: 10,
            down_payment_percent: 20.0,
            ..HousingInput::default()
        };
        let income = AffordabilityInput {
            monthly_income: 10_000.0,
            monthly_debts: 600.0,
            max_dti: 36.0,
        };
        let result = assess_affordability(&housing, &income);
        assert!((result.max_monthly_payment - 3_000.0).abs() < 1e-9);
        assert!((result.max_loan - 360_000.0).abs() < 1e-6);
        assert!((result.max_property_price - 450_000.0).abs() < 1e-6);
    }

    #[test]
    fn dti_includes_other_debts() {
        let housing = HousingInput {
            property_price: 150_000.0,
            down_payment_percent: 20.0,
            mortgage_rate: 0.0,
            mortgage_term_years: 10,
            ..HousingInput::default()
        };
        let income = AffordabilityInput {
            monthly_income: 5_000.0,
            monthly_debts: 500.0,
            max_dti: 36.0,
        };
        let result = assess_affordability(&housing, &income);
        // 120k over 120 months = 1000, plus 500 debts, over 5000
        assert!((result.dti - 30.0).abs() < 1e-9);
        assert!(result.within_limit);
    }
}
