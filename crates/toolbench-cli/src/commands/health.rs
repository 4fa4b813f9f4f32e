//! Health calculator commands for CLI.

use std::path::PathBuf;

use clap::Subcommand;
use toolbench_core::health::{calculate, HealthInput};
use toolbench_core::{FormInput, JsonStore, ToolKey};

use super::{export_state, form_for, import_state, print_json, CliResult, ImportModeArg};

#[derive(Subcommand)]
pub enum HealthAction {
    /// BMI, daily calories, macros and water intake
    Calc {
        /// Form field override, e.g. `--set weight_kg=70` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Do not remember the input for the next run
        #[arg(long)]
        no_save: bool,
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

pub fn run(action: HealthAction) -> CliResult {
    let store: JsonStore<HealthInput> = JsonStore::open(ToolKey::Health)?;

    match action {
        HealthAction::Calc {
            sets,
            json,
            no_save,
        } => {
            let form = form_for::<HealthInput>(&sets)?;
            let mut input = store.load_or_default();
            input.apply_form(&form);
            let report = calculate(&input)?;
            if !no_save {
                store.save(&input)?;
            }
            if json {
                print_json(&report)?;
            } else {
                println!("BMI:             {:.1} ({:?})", report.bmi, report.bmi_category);
                println!(
                    "Healthy weight:  {:.1}-{:.1} kg",
                    report.healthy_weight_min_kg, report.healthy_weight_max_kg
                );
                println!("BMR:             {:.0} kcal", report.bmr);
                println!(
                    "TDEE:            {:.0} kcal ({})",
                    report.tdee,
                    input.activity.label()
                );
                println!("Target:          {:.0} kcal", report.target_calories);
                println!(
                    "Macros:          {:.0} g protein, {:.0} g carbs, {:.0} g fat",
                    report.macros.protein_g, report.macros.carbs_g, report.macros.fat_g
                );
                println!("Water:           {:.1} l", report.water_ml / 1000.0);
            }
        }
        HealthAction::Show => print_json(&store.load_or_default())?,
        HealthAction::Reset => {
            store.clear()?;
            println!("health input reset");
        }
        HealthAction::Export { path } => export_state::<HealthInput>(&path)?,
        HealthAction::Import { path, mode } => import_state::<HealthInput>(&path, mode)?,
    }
    Ok(())
}
