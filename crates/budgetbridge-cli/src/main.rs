mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::inflation::RealBalanceArgs;
use commands::schedule::ScheduleArgs;
use commands::sensitivity::SensitivityArgs;

/// Loan amortization schedules and interest-rate sensitivity
#[derive(Parser)]
#[command(
    name = "bbridge",
    version,
    about = "Loan amortization schedules and interest-rate sensitivity",
    long_about = "A CLI for modelling fixed-rate loans with decimal precision. \
                  Builds amortization schedules with extra payments and tax on \
                  interest, compares outcomes across interest rates, and restates \
                  the outstanding balance for inflation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Decimal places for monetary values in the output
    #[arg(long, default_value_t = 2, global = true)]
    precision: u32,

    /// Print full-precision values instead of rounding them
    #[arg(long, global = true)]
    raw: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a period-by-period amortization schedule
    Schedule(ScheduleArgs),
    /// Compare total interest and payoff across interest rates
    Sensitivity(SensitivityArgs),
    /// Outstanding balance restated for inflation
    RealBalance(RealBalanceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let precision = if cli.raw { None } else { Some(cli.precision) };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args, precision),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args, precision),
        Commands::RealBalance(args) => commands::inflation::run_real_balance(args, precision),
        Commands::Version => {
            println!("bbridge {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
