//! Sample size commands for CLI.

use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;
use toolbench_core::sample_size::{calculate, margin_of_error, SampleSizeInput};
use toolbench_core::{FormInput, JsonStore, ToolKey};

use super::{export_state, form_for, import_state, print_json, CliResult, ImportModeArg};

#[derive(Subcommand)]
pub enum SampleSizeAction {
    /// Respondents needed for a confidence level and margin of error
    Calc {
        /// Form field override, e.g. `--set confidence=99` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        sets: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Do not remember the input for the next run
        #[arg(long)]
        no_save: bool,
    },
    /// Margin of error achieved by a given number of respondents
    Margin {
        /// Number of respondents
        respondents: u64,
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

pub fn run(action: SampleSizeAction) -> CliResult {
    let store: JsonStore<SampleSizeInput> = JsonStore::open(ToolKey::SampleSize)?;

    match action {
        SampleSizeAction::Calc {
            sets,
            json,
            no_save,
        } => {
            let form = form_for::<SampleSizeInput>(&sets)?;
            let mut input = store.load_or_default();
            input.apply_form(&form);
            let report = calculate(&input)?;
            if !no_save {
                store.save(&input)?;
            }
            if json {
                print_json(&report)?;
            } else {
                println!("Sample size: {}", report.sample_size);
                println!(
                    "z = {:.3}, n0 = {:.1}{}",
                    report.z_score,
                    report.unadjusted,
                    if report.corrected {
                        ", finite population corrected"
                    } else {
                        ""
                    }
                );
            }
        }
        SampleSizeAction::Margin {
            respondents,
            sets,
            json,
        } => {
            let form = form_for::<SampleSizeInput>(&sets)?;
            let mut input = store.load_or_default();
            input.apply_form(&form);
            input.validate()?;
            let margin = margin_of_error(&input, respondents);
            if json {
                print_json(&json!({
                    "respondents": respondents,
                    "confidence": input.confidence,
                    "margin_of_error": margin,
                }))?;
            } else {
                println!(
                    "±{margin:.2}% at {}% confidence",
                    input.confidence.percent()
                );
            }
        }
        SampleSizeAction::Show => print_json(&store.load_or_default())?,
        SampleSizeAction::Reset => {
            store.clear()?;
            println!("sample size input reset");
        }
        SampleSizeAction::Export { path } => export_state::<SampleSizeInput>(&path)?,
        SampleSizeAction::Import { path, mode } => import_state::<SampleSizeInput>(&path, mode)?,
    }
    Ok(())
}
