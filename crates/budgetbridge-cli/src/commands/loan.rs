use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use budgetbridge_core::{LoanInput, PaymentFrequency, RateConvention};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Quarterly,
    Annually,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Quarterly => PaymentFrequency::Quarterly,
            FrequencyArg::Annually => PaymentFrequency::Annually,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConventionArg {
    Nominal,
    EffectiveAnnual,
}

impl From<ConventionArg> for RateConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::Nominal => RateConvention::Nominal,
            ConventionArg::EffectiveAnnual => RateConvention::EffectiveAnnual,
        }
    }
}

/// Loan terms given as individual flags
#[derive(Args, Debug, Default)]
pub struct LoanArgs {
    /// Loan amount before deposit
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Deposit / down payment
    #[arg(long)]
    pub deposit: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 7.5 for 7.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long, conflicts_with = "periods")]
    pub years: Option<u32>,

    /// Term in payment periods
    #[arg(long)]
    pub periods: Option<u32>,

    /// Extra principal paid every period
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Tax on the interest portion, in percent
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Payment frequency
    #[arg(long, value_enum)]
    pub frequency: Option<FrequencyArg>,

    /// How the annual rate becomes a periodic rate
    #[arg(long, value_enum)]
    pub convention: Option<ConventionArg>,

    /// Fixed periodic payment instead of the level annuity payment
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanArgs {
    /// Build a loan input from flags; validation is left to the engine.
    pub fn to_loan_input(&self) -> Result<LoanInput, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        if self.years.is_none() && self.periods.is_none() {
            return Err("--years or --periods is required (or provide --input)".into());
        }

        Ok(LoanInput {
            principal_requested: principal,
            deposit: self.deposit.unwrap_or(Decimal::ZERO),
            annual_interest_rate: rate,
            duration_periods: self.periods,
            duration_years: self.years,
            extra_payment_per_period: self.extra.unwrap_or(Decimal::ZERO),
            tax_rate: self.tax_rate.unwrap_or(Decimal::ZERO),
            frequency: self.frequency.map(Into::into).unwrap_or_default(),
            rate_convention: self.convention.map(Into::into).unwrap_or_default(),
            payment_override: self.payment,
            first_payment_date: self.start_date,
        })
    }
}
