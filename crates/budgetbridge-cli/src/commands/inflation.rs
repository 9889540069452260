use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use budgetbridge_core::inflation::{real_balance_path, InflationInput};

use super::loan::LoanArgs;
use crate::input;

/// Arguments for the inflation-adjusted balance path
#[derive(Args)]
pub struct RealBalanceArgs {
    /// Path to JSON or YAML file with `loan` and `annual_inflation_rate`
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    /// Annual inflation in percent
    #[arg(long)]
    pub inflation: Option<Decimal>,
}

pub fn run_real_balance(
    args: RealBalanceArgs,
    precision: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let infl_input: InflationInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let inflation = args
            .inflation
            .ok_or("--inflation is required (or provide --input)")?;
        InflationInput {
            loan: args.loan.to_loan_input()?,
            annual_inflation_rate: inflation,
        }
    };

    let mut output = real_balance_path(&infl_input)?;
    if let Some(dp) = precision {
        output.result = output.result.iter().map(|row| row.rounded(dp)).collect();
    }
    Ok(serde_json::to_value(output)?)
}
