//! Ownership vs. rental cost projection.
//!
//! Projects both cost streams year by year over the holding horizon, applies
//! at most one housing upgrade, and recommends the option with the lower net
//! cost. Ownership net cost subtracts the equity left at the end of the
//! horizon; rental has no equity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::mortgage::{monthly_payment, remaining_balance};
use super::HousingInput;
use crate::error::ValidationError;
use crate::form::{percent, FormInput};

/// Where the rent growth rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentGrowthSource {
    /// Entered by the user
    Configured,
    /// Derived from previous vs current rent (assumes a two-year gap)
    Inferred,
    /// Neither of the above was usable
    Inflation,
}

/// Cheaper option over the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Rent,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Buying is cheaper",
            Recommendation::Rent => "Renting is cheaper",
        }
    }
}

/// Costs for one projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearCost {
    pub year: u32,
    /// True for years after the upgrade event
    pub upgraded: bool,
    pub mortgage: f64,
    pub maintenance: f64,
    pub tax: f64,
    pub utilities: f64,
    pub owner_total: f64,
    pub rent: f64,
    /// Market value of the owned property at year end
    pub property_value: f64,
    /// Mortgage balance at year end
    pub mortgage_balance: f64,
}

/// The single optional housing upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeEvent {
    pub year: u32,
    pub sale_value: f64,
    pub remaining_mortgage: f64,
    pub selling_costs: f64,
    /// Sale value minus mortgage minus selling costs, floored at zero
    pub equity_extracted: f64,
    pub required_down_payment: f64,
    pub new_down_payment: f64,
    /// Equity beyond the new down payment requirement
    pub cash_released: f64,
    pub new_property_price: f64,
    pub new_loan: f64,
    pub new_rent: f64,
    pub owner_cost: f64,
    pub renter_cost: f64,
}

/// Full comparison result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingReport {
    pub monthly_payment: f64,
    /// Rent growth in percent per year
    pub rent_growth_rate: f64,
    pub rent_growth_source: RentGrowthSource,
    pub owner_initial_cost: f64,
    pub renter_initial_cost: f64,
    pub years: Vec<YearCost>,
    pub upgrade: Option<UpgradeEvent>,
    pub owner_total_cost: f64,
    pub renter_total_cost: f64,
    pub final_equity: f64,
    pub owner_net_cost: f64,
    pub renter_net_cost: f64,
    pub recommendation: Recommendation,
    /// Difference between the two net costs
    pub savings: f64,
}

/// Yearly rent growth implied by rent two years ago vs today, in percent.
///
/// Only positive rates are returned. The two-year growth is halved, which is
/// an approximation rather than a compounded rate.
pub fn infer_rent_increase(current_rent: f64, previous_rent: f64) -> Option<f64> {
    if previous_rent <= 0.0 || current_rent <= 0.0 {
        return None;
    }
    let rate = ((current_rent / previous_rent) - 1.0) * 100.0 / 2.0;
    (rate > 0.0).then_some(rate)
}

fn rent_growth(input: &HousingInput) -> (f64, RentGrowthSource) {
    if let Some(rate) = input.rent_increase_rate {
        (rate, RentGrowthSource::Configured)
    } else if let Some(rate) = infer_rent_increase(input.current_rent, input.previous_rent) {
        (rate, RentGrowthSource::Inferred)
    } else {
        (input.inflation_rate, RentGrowthSource::Inflation)
    }
}

/// The property owned during one phase of the horizon.
struct Holding {
    price: f64,
    loan: f64,
    /// Year offset the property was bought at
    bought: u32,
    payment: f64,
}

impl Holding {
    fn new(price: f64, loan: f64, bought: u32, input: &HousingInput) -> Self {
        Self {
            price,
            loan,
            bought,
            payment: monthly_payment(loan, input.mortgage_rate, input.mortgage_term_years),
        }
    }

    fn mortgage_in(&self, year: u32, term: u32) -> f64 {
        let k = year.saturating_sub(self.bought);
        if k >= 1 && k <= term {
            self.payment * 12.0
        } else {
            0.0
        }
    }

    fn value_at(&self, year: u32, appreciation: f64) -> f64 {
        self.price * (1.0 + appreciation).powi(year.saturating_sub(self.bought) as i32)
    }

    fn balance_at(&self, year: u32, input: &HousingInput) -> f64 {
        remaining_balance(
            self.loan,
            input.mortgage_rate,
            input.mortgage_term_years,
            year.saturating_sub(self.bought),
        )
    }

    /// What selling at the end of `year` would leave in hand.
    fn realizable_equity(&self, year: u32, input: &HousingInput) -> f64 {
        let value = self.value_at(year, percent(input.appreciation_rate));
        let selling = value * percent(input.selling_cost_percent);
        (value - self.balance_at(year, input) - selling).max(0.0)
    }
}

fn plan_upgrade(
    holding: &Holding,
    year: u32,
    rent_this_year: f64,
    input: &HousingInput,
) -> UpgradeEvent {
    let sale_value = holding.value_at(year, percent(input.appreciation_rate));
    let remaining_mortgage = holding.balance_at(year, input);
    let selling_costs = sale_value * percent(input.selling_cost_percent);
    let equity_extracted = holding.realizable_equity(year, input);

    let new_property_price = if input.upgrade_property_price > 0.0 {
        input.upgrade_property_price
    } else {
        input.property_price
    };
    let new_rent = if input.upgrade_rent > 0.0 {
        input.upgrade_rent
    } else {
        rent_this_year
    };

    let required_down_payment = new_property_price * percent(input.down_payment_percent);
    let new_down_payment = equity_extracted.min(required_down_payment);
    let cash_released = equity_extracted - new_down_payment;
    let new_loan = (new_property_price - new_down_payment).max(0.0);

    let owner_cost = new_property_price * percent(input.purchase_cost_percent) + input.moving_cost
        - cash_released;
    let renter_cost = 2.0 * new_rent / 12.0 + input.moving_cost;

    UpgradeEvent {
        year,
        sale_value,
        remaining_mortgage,
        selling_costs,
        equity_extracted,
        required_down_payment,
        new_down_payment,
        cash_released,
        new_property_price,
        new_loan,
        new_rent,
        owner_cost,
        renter_cost,
    }
}

/// Compare owning against renting over `input.horizon_years`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequired`] when the required fields
/// (current rent, property price, horizon) are not filled in.
pub fn compare(input: &HousingInput) -> Result<HousingReport, ValidationError> {
    input.validate()?;

    let inflation = percent(input.inflation_rate);
    let appreciation = percent(input.appreciation_rate);
    let term = input.mortgage_term_years;
    let horizon = input.horizon_years;
    let (rent_growth_rate, rent_growth_source) = rent_growth(input);
    let growth = percent(rent_growth_rate);
    let upgrade_year = input.upgrade_year.filter(|u| *u >= 1 && *u < horizon);

    let mut holding = Holding::new(input.property_price, input.loan_amount(), 0, input);
    let first_payment = holding.payment;

    let owner_initial_cost =
        input.down_payment() + input.property_price * percent(input.purchase_cost_percent);
    let renter_initial_cost = 2.0 * input.current_rent / 12.0 + input.moving_cost;

    let mut owner_total_cost = owner_initial_cost;
    let mut renter_total_cost = renter_initial_cost;
    let mut rent_base = input.current_rent;
    let mut rent_since = 0u32;
    let mut upgrade = None;
    let mut years = Vec::with_capacity(horizon as usize);

    for year in 1..=horizon {
        let inflated = (1.0 + inflation).powi(year as i32 - 1);
        let mortgage = holding.mortgage_in(year, term);
        let maintenance = holding.price * percent(input.maintenance_percent) * inflated;
        let tax = holding.price * percent(input.property_tax_percent) * inflated;
        let utilities = input.utility_delta * inflated;
        let owner_total = mortgage + maintenance + tax + utilities;
        let rent = rent_base * (1.0 + growth).powi((year - rent_since - 1) as i32);

        years.push(YearCost {
            year,
            upgraded: upgrade.is_some(),
            mortgage,
            maintenance,
            tax,
            utilities,
            owner_total,
            rent,
            property_value: holding.value_at(year, appreciation),
            mortgage_balance: holding.balance_at(year, input),
        });
        owner_total_cost += owner_total;
        renter_total_cost += rent;

        if upgrade_year == Some(year) {
            let event = plan_upgrade(&holding, year, rent, input);
            debug!(
                year,
                equity = event.equity_extracted,
                cash_released = event.cash_released,
                "housing upgrade applied"
            );
            owner_total_cost += event.owner_cost;
            renter_total_cost += event.renter_cost;
            holding = Holding::new(event.new_property_price, event.new_loan, year, input);
            rent_base = event.new_rent;
            rent_since = year;
            upgrade = Some(event);
        }
    }

    let final_equity = holding.realizable_equity(horizon, input);
    let owner_net_cost = owner_total_cost - final_equity;
    let renter_net_cost = renter_total_cost;
    let recommendation = if owner_net_cost < renter_net_cost {
        Recommendation::Buy
    } else {
        Recommendation::Rent
    };

    debug!(
        owner_net_cost,
        renter_net_cost,
        ?recommendation,
        "housing comparison finished"
    );

    Ok(HousingReport {
        monthly_payment: first_payment,
        rent_growth_rate,
        rent_growth_source,
        owner_initial_cost,
        renter_initial_cost,
        years,
        upgrade,
        owner_total_cost,
        renter_total_cost,
        final_equity,
        owner_net_cost,
        renter_net_cost,
        recommendation,
        savings: (owner_net_cost - renter_net_cost).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> HousingInput {
        HousingInput {
            current_rent: 30_000.0,
            property_price: 400_000.0,
            horizon_years: 10,
            ..HousingInput::default()
        }
    }

    #[test]
    fn inferred_rate_halves_two_year_growth() {
        let rate = infer_rent_increase(50_000.0, 45_000.0).unwrap();
        assert!((rate - 5.5556).abs() < 1e-3, "got {rate}");
    }

    #[test]
    fn inferred_rate_only_if_positive() {
        assert_eq!(infer_rent_increase(40_000.0, 45_000.0), None);
        assert_eq!(infer_rent_increase(40_000.0, 40_000.0), None);
        assert_eq!(infer_rent_increase(40_000.0, 0.0), None);
    }

    #[test]
    fn rent_growth_prefers_configured_rate() {
        let input = HousingInput {
            rent_increase_rate: Some(2.0),
            previous_rent: 20_000.0,
            ..base()
        };
        let report = compare(&input).unwrap();
        assert_eq!(report.rent_growth_source, RentGrowthSource::Configured);
        assert_eq!(report.rent_growth_rate, 2.0);
    }

    #[test]
    fn rent_growth_falls_back_to_inflation() {
        let report = compare(&base()).unwrap();
        assert_eq!(report.rent_growth_source, RentGrowthSource::Inflation);
        assert_eq!(report.rent_growth_rate, 3.0);
    }

    #[test]
    fn totals_are_initial_plus_yearly() {
        let report = compare(&base()).unwrap();
        assert_eq!(report.years.len(), 10);
        let owner: f64 = report.years.iter().map(|y| y.owner_total).sum();
        let renter: f64 = report.years.iter().map(|y| y.rent).sum();
        assert!((report.owner_total_cost - report.owner_initial_cost - owner).abs() < 1e-6);
        assert!((report.renter_total_cost - report.renter_initial_cost - renter).abs() < 1e-6);
        assert!(
            (report.owner_net_cost - (report.owner_total_cost - report.final_equity)).abs() < 1e-6
        );
    }

    #[test]
    fn initial_costs() {
        let input = HousingInput {
            moving_cost: 1_000.0,
            ..base()
        };
        let report = compare(&input).unwrap();
        // 20% down + 3% purchase fees
        assert!((report.owner_initial_cost - 92_000.0).abs() < 1e-9);
        // first and last month + moving
        assert!((report.renter_initial_cost - 6_000.0).abs() < 1e-9);
    }

    #[test]
    fn non_mortgage_costs_inflate() {
        let report = compare(&base()).unwrap();
        let y1 = &report.years[0];
        let y2 = &report.years[1];
        assert!((y1.maintenance - 4_000.0).abs() < 1e-9);
        assert!((y2.maintenance - 4_120.0).abs() < 1e-9);
        assert_eq!(y1.mortgage, y2.mortgage);
    }

    #[test]
    fn mortgage_stops_after_term() {
        let input = HousingInput {
            mortgage_term_years: 5,
            ..base()
        };
        let report = compare(&input).unwrap();
        assert!(report.years[4].mortgage > 0.0);
        assert_eq!(report.years[5].mortgage, 0.0);
        assert_eq!(report.years[5].mortgage_balance, 0.0);
    }

    #[test]
    fn upgrade_must_fall_strictly_inside_horizon() {
        let at_end = HousingInput {
            upgrade_year: Some(10),
            upgrade_property_price: 600_000.0,
            ..base()
        };
        assert!(compare(&at_end).unwrap().upgrade.is_none());

        let inside = HousingInput {
            upgrade_year: Some(5),
            ..at_end
        };
        let report = compare(&inside).unwrap();
        let event = report.upgrade.expect("upgrade inside horizon");
        assert_eq!(event.year, 5);
        assert!(report.years[5].upgraded);
        assert!(!report.years[4].upgraded);
    }

    #[test]
    fn upgrade_down_payment_is_capped() {
        let input = HousingInput {
            down_payment_percent: 50.0,
            appreciation_rate: 10.0,
            upgrade_year: Some(8),
            upgrade_property_price: 100_000.0,
            upgrade_rent: 12_000.0,
            horizon_years: 12,
            ..base()
        };
        let event = compare(&input).unwrap().upgrade.unwrap();
        assert_eq!(event.required_down_payment, 50_000.0);
        assert_eq!(event.new_down_payment, 50_000.0);
        assert!(event.cash_released > 0.0);
        assert!(
            (event.equity_extracted - event.new_down_payment - event.cash_released).abs() < 1e-9
        );
        assert_eq!(event.new_loan, 50_000.0);
    }

    #[test]
    fn post_upgrade_rent_rebases() {
        let input = HousingInput {
            rent_increase_rate: Some(0.0),
            upgrade_year: Some(3),
            upgrade_rent: 48_000.0,
            upgrade_property_price: 500_000.0,
            ..base()
        };
        let report = compare(&input).unwrap();
        assert_eq!(report.years[2].rent, 30_000.0);
        assert_eq!(report.years[3].rent, 48_000.0);
        assert_eq!(report.upgrade.unwrap().renter_cost, 8_000.0);
    }

    #[test]
    fn missing_required_input_blocks_comparison() {
        let err = compare(&HousingInput::default()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequired { .. }));
    }

    #[test]
    fn recommendation_flips_with_parameters() {
        let buy_friendly = HousingInput {
            current_rent: 60_000.0,
            property_price: 300_000.0,
            mortgage_rate: 2.0,
            appreciation_rate: 6.0,
            rent_increase_rate: Some(6.0),
            horizon_years: 15,
            ..HousingInput::default()
        };
        let rent_friendly = HousingInput {
            current_rent: 12_000.0,
            property_price: 1_200_000.0,
            mortgage_rate: 9.0,
            appreciation_rate: 0.0,
            rent_increase_rate: Some(0.0),
            ..buy_friendly.clone()
        };
        assert_eq!(compare(&buy_friendly).unwrap().recommendation, Recommendation::Buy);
        assert_eq!(compare(&rent_friendly).unwrap().recommendation, Recommendation::Rent);
    }
}
