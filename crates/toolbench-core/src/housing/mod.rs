//! Rent-vs-buy housing calculator.
//!
//! [`HousingInput`] is a flat record built from form values, consumed once by
//! [`compare`] and then discarded. Rates are stored as whole-number
//! percentages and divided by 100 at the point of use.

pub mod affordability;
pub mod mortgage;
pub mod projection;
pub mod space;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::form::{require_positive, FormInput, FormValues};
use crate::storage::{MergeSummary, ToolKey, Transferable};

pub use affordability::{assess_affordability, Affordability, AffordabilityInput};
pub use mortgage::{
    amortization_schedule, monthly_payment, remaining_balance, AmortizationYear, MAX_TERM_YEARS,
};
pub use projection::{
    compare, infer_rent_increase, HousingReport, Recommendation, RentGrowthSource, UpgradeEvent,
    YearCost,
};
pub use space::{project_space_needs, SpaceNeed};

/// Housing decision input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingInput {
    /// Annual rent paid today
    pub current_rent: f64,
    /// Annual rent two years ago (0 = unknown)
    pub previous_rent: f64,
    /// Configured rent increase, percent per year. `None` infers it.
    pub rent_increase_rate: Option<f64>,

    pub adults: u32,
    pub children: u32,
    /// Average age of the current children
    pub children_age: u32,
    pub planned_children: u32,
    /// Year offset at which planned children arrive
    pub planned_children_year: u32,

    pub property_price: f64,
    pub down_payment_percent: f64,
    pub mortgage_rate: f64,
    pub mortgage_term_years: u32,

    pub inflation_rate: f64,
    pub appreciation_rate: f64,
    pub maintenance_percent: f64,
    pub property_tax_percent: f64,
    pub purchase_cost_percent: f64,
    pub selling_cost_percent: f64,
    /// Extra yearly utilities when owning instead of renting
    pub utility_delta: f64,
    /// One-off cost of a move
    pub moving_cost: f64,

    pub horizon_years: u32,
    /// Year offset of the housing upgrade, if one is planned
    pub upgrade_year: Option<u32>,
    pub upgrade_property_price: f64,
    /// Annual rent after the upgrade
    pub upgrade_rent: f64,
}

impl Default for HousingInput {
    fn default() -> Self {
        Self {
            current_rent: 0.0,
            previous_rent: 0.0,
            rent_increase_rate: None,
            adults: 2,
            children: 0,
            children_age: 5,
            planned_children: 0,
            planned_children_year: 0,
            property_price: 0.0,
            down_payment_percent: 20.0,
            mortgage_rate: 5.0,
            mortgage_term_years: 25,
            inflation_rate: 3.0,
            appreciation_rate: 3.0,
            maintenance_percent: 1.0,
            property_tax_percent: 0.5,
            purchase_cost_percent: 3.0,
            selling_cost_percent: 5.0,
            utility_delta: 0.0,
            moving_cost: 0.0,
            horizon_years: 10,
            upgrade_year: None,
            upgrade_property_price: 0.0,
            upgrade_rent: 0.0,
        }
    }
}

impl HousingInput {
    pub fn down_payment(&self) -> f64 {
        self.property_price * self.down_payment_percent / 100.0
    }

    pub fn loan_amount(&self) -> f64 {
        (self.property_price - self.down_payment()).max(0.0)
    }

    /// Family members today.
    pub fn family_size(&self) -> u32 {
        self.adults + self.children
    }
}

impl FormInput for HousingInput {
    const FIELDS: &'static [&'static str] = &[
        "current_rent",
        "previous_rent",
        "rent_increase_rate",
        "adults",
        "children",
        "children_age",
        "planned_children",
        "planned_children_year",
        "property_price",
        "down_payment_percent",
        "mortgage_rate",
        "mortgage_term_years",
        "inflation_rate",
        "appreciation_rate",
        "maintenance_percent",
        "property_tax_percent",
        "purchase_cost_percent",
        "selling_cost_percent",
        "utility_delta",
        "moving_cost",
        "horizon_years",
        "upgrade_year",
        "upgrade_property_price",
        "upgrade_rent",
    ];

    fn apply_form(&mut self, form: &FormValues) {
        let d = self.clone();
        self.current_rent = form.number_or("current_rent", d.current_rent);
        self.previous_rent = form.number_or("previous_rent", d.previous_rent);
        if form.get("rent_increase_rate").is_some() {
            // an unparseable rate clears the override so growth is inferred again
            self.rent_increase_rate = form.optional_number("rent_increase_rate");
        }
        self.adults = form.count_or("adults", d.adults);
        self.children = form.count_or("children", d.children);
        self.children_age = form.count_or("children_age", d.children_age);
        self.planned_children = form.count_or("planned_children", d.planned_children);
        self.planned_children_year =
            form.count_or("planned_children_year", d.planned_children_year);
        self.property_price = form.number_or("property_price", d.property_price);
        self.down_payment_percent =
            form.number_or("down_payment_percent", d.down_payment_percent);
        self.mortgage_rate = form.number_or("mortgage_rate", d.mortgage_rate);
        self.mortgage_term_years = form
            .count_or("mortgage_term_years", d.mortgage_term_years)
            .min(MAX_TERM_YEARS);
        self.inflation_rate = form.number_or("inflation_rate", d.inflation_rate);
        self.appreciation_rate = form.number_or("appreciation_rate", d.appreciation_rate);
        self.maintenance_percent = form.number_or("maintenance_percent", d.maintenance_percent);
        self.property_tax_percent =
            form.number_or("property_tax_percent", d.property_tax_percent);
        self.purchase_cost_percent =
            form.number_or("purchase_cost_percent", d.purchase_cost_percent);
        self.selling_cost_percent =
            form.number_or("selling_cost_percent", d.selling_cost_percent);
        self.utility_delta = form.number_or("utility_delta", d.utility_delta);
        self.moving_cost = form.number_or("moving_cost", d.moving_cost);
        self.horizon_years = form
            .count_or("horizon_years", d.horizon_years)
            .min(MAX_TERM_YEARS);
        if form.get("upgrade_year").is_some() {
            self.upgrade_year = match form.count_or("upgrade_year", 0) {
                0 => None,
                year => Some(year),
            };
        }
        self.upgrade_property_price =
            form.number_or("upgrade_property_price", d.upgrade_property_price);
        self.upgrade_rent = form.number_or("upgrade_rent", d.upgrade_rent);
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_positive(&[
            ("current_rent", self.current_rent),
            ("property_price", self.property_price),
            ("horizon_years", f64::from(self.horizon_years)),
        ])?;
        for (field, years) in [
            ("horizon_years", self.horizon_years),
            ("mortgage_term_years", self.mortgage_term_years),
        ] {
            if years > MAX_TERM_YEARS {
                return Err(ValidationError::invalid(
                    field,
                    format!("{years} years is more than {MAX_TERM_YEARS}"),
                ));
            }
        }
        Ok(())
    }
}

impl Transferable for HousingInput {
    const TOOL: ToolKey = ToolKey::Housing;
    const KEYS: &'static [&'static str] = <Self as FormInput>::FIELDS;

    /// A saved form has no records to merge; the import replaces it.
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
