use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use budgetbridge_core::sensitivity::rate_sweep::{analyze_rate_sensitivity, SensitivityInput};

use super::loan::LoanArgs;
use crate::input;

/// Arguments for interest-rate sensitivity
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON or YAML sensitivity file with a `loan` section
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Explicit annual rates to compare, in percent (e.g. "5.5,7.5,9.5")
    #[arg(long, value_delimiter = ',')]
    pub rates: Option<Vec<Decimal>>,

    /// Spacing of the rate ladder in percentage points
    #[arg(long, conflicts_with = "rates")]
    pub step: Option<Decimal>,

    /// Number of ladder rungs either side of the base rate
    #[arg(long, conflicts_with = "rates")]
    pub steps: Option<u32>,
}

pub fn run_sensitivity(
    args: SensitivityArgs,
    precision: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: SensitivityInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        SensitivityInput {
            loan: args.loan.to_loan_input()?,
            rates: args.rates,
            step: args.step,
            steps_each_side: args.steps,
        }
    };

    let mut output = analyze_rate_sensitivity(&sens_input)?;
    if let Some(dp) = precision {
        output.result = output.result.rounded(dp);
    }
    Ok(serde_json::to_value(output)?)
}
