//! Rent-vs-buy commands for CLI.

use std::path::PathBuf;

use clap::Subcommand;
use toolbench_core::housing::{
    amortization_schedule, assess_affordability, compare, monthly_payment, project_space_needs,
    remaining_balance, AffordabilityInput, HousingInput, HousingReport,
};
use toolbench_core::storage::GeneralConfig;
use toolbench_core::{Config, FormInput, JsonStore, ToolKey};

use super::{export_state, form_for, import_state, print_json, CliResult, ImportModeArg};

#[derive(Subcommand)]
pub enum HousingAction {
    /// Compare owning against renting over the horizon
    Compare {
        /// Form field override, e.g. `--set current_rent=30000` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Do not remember the input for the next run
        #[arg(long)]
        no_save: bool,
    },
    /// Monthly mortgage payment
    Payment {
        /// Loan principal
        principal: f64,
        /// Annual rate in percent
        rate: f64,
        /// Term in years
        term: u32,
    },
    /// Mortgage balance after a number of years
    Balance {
        principal: f64,
        rate: f64,
        term: u32,
        /// Years elapsed
        years: u32,
    },
    /// Yearly amortization schedule
    Schedule {
        principal: f64,
        rate: f64,
        term: u32,
        #[arg(long)]
        json: bool,
    },
    /// Family size and floor area needed each year
    Space {
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Debt-to-income check of the saved scenario
    Afford {
        /// Gross monthly income
        #[arg(long)]
        income: f64,
        /// Other monthly debt payments
        #[arg(long, default_value = "0")]
        debts: f64,
        /// DTI ceiling in percent
        #[arg(long, default_value = "36")]
        max_dti: f64,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the saved input
    Show,
    /// Forget the saved input
    Reset,
    /// Export the saved input to a file
    Export { path: PathBuf },
    /// Import input from a file
    Import {
        path: PathBuf,
        #[arg(long, value_enum, default_value = "replace")]
        mode: ImportModeArg,
    },
}

/// Saved input, or a fresh form seeded from the configured defaults.
fn saved_input(store: &JsonStore<HousingInput>, config: &Config) -> HousingInput {
    if store.exists() {
        store.load_or_default()
    } else {
        config.housing.to_input()
    }
}

fn input_with(
    store: &JsonStore<HousingInput>,
    config: &Config,
    sets: &[String],
) -> Result<HousingInput, Box<dyn std::error::Error>> {
    let form = form_for::<HousingInput>(sets)?;
    let mut input = saved_input(store, config);
    input.apply_form(&form);
    Ok(input)
}

fn print_report(report: &HousingReport, money: &GeneralConfig) {
    let m = |v: f64| money.money(v);
    println!("Monthly mortgage payment: {}", m(report.monthly_payment));
    println!(
        "Rent growth: {:.2}%/yr ({:?})",
        report.rent_growth_rate, report.rent_growth_source
    );
    println!();
    println!(
        "{:>4}  {:>14}  {:>14}  {:>14}  {:>14}",
        "Year", "Owner", "Renter", "Value", "Balance"
    );
    for year in &report.years {
        println!(
            "{:>4}{} {:>14}  {:>14}  {:>14}  {:>14}",
            year.year,
            if year.upgraded { "*" } else { " " },
            m(year.owner_total),
            m(year.rent),
            m(year.property_value),
            m(year.mortgage_balance),
        );
    }
    if let Some(upgrade) = &report.upgrade {
        println!();
        println!(
            "* Upgrade in year {}: sell for {}, equity {}, new loan {}, cash released {}",
            upgrade.year,
            m(upgrade.sale_value),
            m(upgrade.equity_extracted),
            m(upgrade.new_loan),
            m(upgrade.cash_released),
        );
    }
    println!();
    println!(
        "Owner:  initial {}, total {}, equity {}, net {}",
        m(report.owner_initial_cost),
        m(report.owner_total_cost),
        m(report.final_equity),
        m(report.owner_net_cost),
    );
    println!(
        "Renter: initial {}, total {}, net {}",
        m(report.renter_initial_cost),
        m(report.renter_total_cost),
        m(report.renter_net_cost),
    );
    println!(
        "{} by {}",
        report.recommendation.label(),
        m(report.savings)
    );
}

pub fn run(action: HousingAction, config: &Config) -> CliResult {
    let store: JsonStore<HousingInput> = JsonStore::open(ToolKey::Housing)?;

    match action {
        HousingAction::Compare {
            sets,
            json,
            no_save,
        } => {
            let input = input_with(&store, config, &sets)?;
            let report = compare(&input)?;
            if !no_save {
                store.save(&input)?;
            }
            if json {
                print_json(&report)?;
            } else {
                print_report(&report, &config.general);
            }
        }
        HousingAction::Payment {
            principal,
            rate,
            term,
        } => {
            let payment = monthly_payment(principal, rate, term);
            println!("{}", config.general.money(payment));
        }
        HousingAction::Balance {
            principal,
            rate,
            term,
            years,
        } => {
            let balance = remaining_balance(principal, rate, term, years);
            println!("{}", config.general.money(balance));
        }
        HousingAction::Schedule {
            principal,
            rate,
            term,
            json,
        } => {
            let rows = amortization_schedule(principal, rate, term);
            if json {
                print_json(&rows)?;
            } else {
                println!(
                    "{:>4}  {:>14}  {:>14}  {:>14}",
                    "Year", "Interest", "Principal", "Balance"
                );
                for row in rows {
                    println!(
                        "{:>4}  {:>14}  {:>14}  {:>14}",
                        row.year,
                        config.general.money(row.interest_paid),
                        config.general.money(row.principal_paid),
                        config.general.money(row.closing_balance),
                    );
                }
            }
        }
        HousingAction::Space { sets, json } => {
            let input = input_with(&store, config, &sets)?;
            let needs = project_space_needs(&input);
            if json {
                print_json(&needs)?;
            } else {
                println!("{:>4}  {:>6}  {:>8}", "Year", "Family", "Area m²");
                for need in needs {
                    println!(
                        "{:>4}  {:>6}  {:>8.0}",
                        need.year, need.family_size, need.required_area
                    );
                }
            }
        }
        HousingAction::Afford {
            income,
            debts,
            max_dti,
            sets,
            json,
        } => {
            let input = input_with(&store, config, &sets)?;
            let budget = AffordabilityInput {
                monthly_income: income,
                monthly_debts: debts,
                max_dti,
            };
            budget.validate()?;
            let result = assess_affordability(&input, &budget);
            if json {
                print_json(&result)?;
            } else {
                let m = |v: f64| config.general.money(v);
                println!(
                    "Payment {} at DTI {:.1}% ({})",
                    m(result.monthly_payment),
                    result.dti,
                    if result.within_limit {
                        "within limit"
                    } else {
                        "over limit"
                    }
                );
                println!("Max payment:  {}", m(result.max_monthly_payment));
                println!("Max loan:     {}", m(result.max_loan));
                println!("Max price:    {}", m(result.max_property_price));
            }
        }
        HousingAction::Show => {
            print_json(&saved_input(&store, config))?;
        }
        HousingAction::Reset => {
            store.clear()?;
            println!("housing input reset");
        }
        HousingAction::Export { path } => export_state::<HousingInput>(&path)?,
        HousingAction::Import { path, mode } => import_state::<HousingInput>(&path, mode)?,
    }
    Ok(())
}
