use clap::Args;
use serde_json::Value;

use budgetbridge_core::amortization::schedule::amortize;
use budgetbridge_core::LoanInput;

use super::loan::LoanArgs;
use crate::input;

/// Arguments for building an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

pub fn run_schedule(
    args: ScheduleArgs,
    precision: Option<u32>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        args.loan.to_loan_input()?
    };

    let mut output = amortize(&loan_input)?;
    if let Some(dp) = precision {
        output.result = output.result.rounded(dp);
    }
    Ok(serde_json::to_value(output)?)
}
