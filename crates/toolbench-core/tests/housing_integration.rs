//! Integration tests for the rent-vs-buy calculator.
//!
//! Amortization identities are checked over generated loans; the comparison
//! is driven end to end from form values the way the CLI feeds it.

use proptest::prelude::*;
use toolbench_core::form::{FormInput, FormValues};
use toolbench_core::housing::mortgage::principal_for_payment;
use toolbench_core::housing::{
    amortization_schedule, compare, monthly_payment, project_space_needs, remaining_balance,
    HousingInput, Recommendation, RentGrowthSource,
};

proptest! {
    #[test]
    fn payment_amortizes_to_zero(
        principal in 1_000.0f64..5_000_000.0,
        rate in 0.0f64..15.0,
        term in 1u32..=40,
    ) {
        let payment = monthly_payment(principal, rate, term);
        let r = rate / 100.0 / 12.0;
        let mut balance = principal;
        for _ in 0..term * 12 {
            balance = balance * (1.0 + r) - payment;
        }
        prop_assert!(balance.abs() < principal * 1e-6, "left {balance}");
    }

    #[test]
    fn balance_is_principal_at_start_and_zero_at_term(
        principal in 1_000.0f64..5_000_000.0,
        rate in 0.0f64..15.0,
        term in 1u32..=40,
    ) {
        prop_assert_eq!(remaining_balance(principal, rate, term, 0), principal);
        prop_assert!(remaining_balance(principal, rate, term, term).abs() < principal * 1e-6);
        prop_assert!(remaining_balance(principal, rate, term, term + 5).abs() < principal * 1e-6);
    }

    #[test]
    fn balance_never_increases(
        principal in 1_000.0f64..5_000_000.0,
        rate in 0.0f64..15.0,
        term in 2u32..=40,
    ) {
        let mut previous = principal;
        for year in 1..=term {
            let balance = remaining_balance(principal, rate, term, year);
            prop_assert!(balance <= previous + 1e-6);
            previous = balance;
        }
    }

    #[test]
    fn zero_rate_payment_is_exact(principal in 1.0f64..5_000_000.0, term in 1u32..=40) {
        prop_assert_eq!(
            monthly_payment(principal, 0.0, term),
            principal / f64::from(term * 12)
        );
    }

    #[test]
    fn principal_for_payment_inverts_payment(
        principal in 1_000.0f64..5_000_000.0,
        rate in 0.0f64..15.0,
        term in 1u32..=40,
    ) {
        let payment = monthly_payment(principal, rate, term);
        let back = principal_for_payment(payment, rate, term);
        prop_assert!((back - principal).abs() < principal * 1e-6);
    }
}

#[test]
fn test_reference_loan() {
    let payment = monthly_payment(800_000.0, 3.5, 25);
    assert!((payment - 4005.0).abs() < 2.0, "got {payment}");
    assert!(remaining_balance(800_000.0, 3.5, 25, 25).abs() < 1e-3);

    let schedule = amortization_schedule(800_000.0, 3.5, 25);
    assert_eq!(schedule.len(), 25);
    let repaid: f64 = schedule.iter().map(|y| y.principal_paid).sum();
    assert!((repaid - 800_000.0).abs() < 1e-3);
    assert_eq!(schedule[24].closing_balance, 0.0);
}

#[test]
fn test_compare_from_form_values() {
    let form = FormValues::from_pairs([
        "current_rent=50 000",
        "previous_rent=45000",
        "property_price=800000",
        "mortgage_rate=3.5",
        "mortgage_term_years=25",
        "horizon_years=15",
    ])
    .unwrap();
    let input = HousingInput::from_form(&form);
    input.validate().unwrap();

    let report = compare(&input).unwrap();
    assert_eq!(report.rent_growth_source, RentGrowthSource::Inferred);
    assert!((report.rent_growth_rate - 5.5556).abs() < 1e-3);
    assert_eq!(report.years.len(), 15);
    assert!((report.monthly_payment - 3204.0).abs() < 2.0);
}

#[test]
fn test_missing_fields_block_comparison() {
    let input = HousingInput::from_form(&FormValues::new().with("current_rent", "30000"));
    let err = input.validate().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("property_price"));
    assert!(!message.contains("current_rent"));
    assert!(compare(&input).is_err());
}

#[test]
fn test_recommendation_flips_with_parameters() {
    let buy_friendly = HousingInput {
        current_rent: 60_000.0,
        rent_increase_rate: Some(6.0),
        property_price: 400_000.0,
        mortgage_rate: 2.0,
        appreciation_rate: 5.0,
        horizon_years: 20,
        ..HousingInput::default()
    };
    let rent_friendly = HousingInput {
        current_rent: 12_000.0,
        rent_increase_rate: Some(0.0),
        property_price: 900_000.0,
        mortgage_rate: 9.0,
        appreciation_rate: 0.0,
        horizon_years: 5,
        ..HousingInput::default()
    };
    assert_eq!(
        compare(&buy_friendly).unwrap().recommendation,
        Recommendation::Buy
    );
    assert_eq!(
        compare(&rent_friendly).unwrap().recommendation,
        Recommendation::Rent
    );
}

#[test]
fn test_space_needs_cover_horizon() {
    let input = HousingInput {
        current_rent: 20_000.0,
        property_price: 300_000.0,
        children: 1,
        children_age: 10,
        planned_children: 1,
        planned_children_year: 3,
        horizon_years: 5,
        ..HousingInput::default()
    };
    let needs = project_space_needs(&input);
    assert_eq!(needs.len(), 6);
    assert_eq!(needs[0].family_size, 3);
    assert_eq!(needs[3].family_size, 4);
    assert!(needs[5].required_area > needs[0].required_area);
}
