//! Loan parameters and the validation step that produces them.
//!
//! [`LoanInput`] is the loosely-typed shape read from a form, file or CLI
//! flags. [`LoanParameters`] can only be obtained by validating one, so every
//! value the schedule builder sees already satisfies the loan invariants.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BudgetBridgeError;
use crate::time_value;
use crate::types::{Money, PaymentFrequency, Percent, Rate, RateConvention};
use crate::BudgetBridgeResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Highest annual rate (in percent) the engine accepts.
pub const MAX_ANNUAL_RATE: Percent = dec!(100);

/// Highest tax rate on interest (in percent) the engine accepts.
pub const MAX_TAX_RATE: Percent = dec!(100);

/// Upper bound on schedule length. 500 years of monthly payments.
pub const MAX_DURATION_PERIODS: u32 = 6000;

/// Largest principal, deposit, extra or fixed payment accepted.
///
/// Keeps every running total over [`MAX_DURATION_PERIODS`] well inside the
/// decimal range.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);

/// Largest `(1 + r)^n` a term may compound to.
///
/// Beyond this the early principal portions fall below decimal precision and
/// the level payment no longer clears the balance.
pub const MAX_COMPOUND_GROWTH: Decimal = dec!(1000000000000000);

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw loan description as supplied by an input collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanInput {
    /// Purchase price / amount requested before any deposit.
    pub principal_requested: Money,
    /// Down payment deducted from the requested amount.
    #[serde(default)]
    pub deposit: Money,
    /// Quoted annual rate in percent (7.5 = 7.5%).
    pub annual_interest_rate: Percent,
    /// Term as a number of payment periods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_periods: Option<u32>,
    /// Term in whole years; converted using the payment frequency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<u32>,
    /// Additional principal paid every period on top of the scheduled payment.
    #[serde(default)]
    pub extra_payment_per_period: Money,
    /// Tax / levy on the interest portion, in percent.
    #[serde(default)]
    pub tax_rate: Percent,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub rate_convention: RateConvention,
    /// Fixed periodic payment replacing the annuity payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_override: Option<Money>,
    /// Date of the first payment, used to label rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

impl LoanInput {
    /// Validate into immutable [`LoanParameters`].
    pub fn validate(&self) -> BudgetBridgeResult<LoanParameters> {
        LoanParameters::try_from(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Validated parameters
// ---------------------------------------------------------------------------

/// Validated, immutable loan parameters.
///
/// Deserialising goes through [`LoanInput`] validation, so a
/// `LoanParameters` value cannot hold an invalid combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoanInput")]
pub struct LoanParameters {
    principal_requested: Money,
    deposit: Money,
    financed_principal: Money,
    annual_interest_rate: Percent,
    duration_periods: u32,
    extra_payment_per_period: Money,
    tax_rate: Percent,
    frequency: PaymentFrequency,
    rate_convention: RateConvention,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_override: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_payment_date: Option<NaiveDate>,
    periodic_rate: Rate,
}

impl LoanParameters {
    pub fn principal_requested(&self) -> Money {
        self.principal_requested
    }

    pub fn deposit(&self) -> Money {
        self.deposit
    }

    /// Amount actually borrowed: `principal_requested - deposit`, always > 0.
    pub fn financed_principal(&self) -> Money {
        self.financed_principal
    }

    pub fn annual_interest_rate(&self) -> Percent {
        self.annual_interest_rate
    }

    pub fn duration_periods(&self) -> u32 {
        self.duration_periods
    }

    pub fn extra_payment_per_period(&self) -> Money {
        self.extra_payment_per_period
    }

    pub fn tax_rate(&self) -> Percent {
        self.tax_rate
    }

    pub fn frequency(&self) -> PaymentFrequency {
        self.frequency
    }

    pub fn rate_convention(&self) -> RateConvention {
        self.rate_convention
    }

    pub fn payment_override(&self) -> Option<Money> {
        self.payment_override
    }

    pub fn first_payment_date(&self) -> Option<NaiveDate> {
        self.first_payment_date
    }

    /// Rate charged per payment period, as a decimal fraction.
    pub fn periodic_rate(&self) -> Rate {
        self.periodic_rate
    }

    /// Copy of these parameters at a different annual rate.
    ///
    /// Everything else, including a payment override, is kept as is.
    pub fn with_annual_rate(&self, annual_interest_rate: Percent) -> BudgetBridgeResult<Self> {
        validate_annual_rate(annual_interest_rate)?;
        let periodic_rate =
            time_value::periodic_rate(annual_interest_rate, self.frequency, self.rate_convention)?;
        validate_compounding(annual_interest_rate, periodic_rate, self.duration_periods)?;
        Ok(Self {
            annual_interest_rate,
            periodic_rate,
            ..self.clone()
        })
    }
}

impl TryFrom<LoanInput> for LoanParameters {
    type Error = BudgetBridgeError;

    fn try_from(input: LoanInput) -> Result<Self, Self::Error> {
        if input.principal_requested <= Decimal::ZERO {
            return Err(BudgetBridgeError::invalid(
                "principal_requested",
                "Loan amount must be positive",
            ));
        }
        validate_amount("principal_requested", input.principal_requested)?;
        if input.deposit < Decimal::ZERO {
            return Err(BudgetBridgeError::invalid(
                "deposit",
                "Deposit cannot be negative",
            ));
        }
        if input.deposit > input.principal_requested {
            return Err(BudgetBridgeError::invalid(
                "deposit",
                format!(
                    "Deposit {} exceeds the loan amount {}",
                    input.deposit, input.principal_requested
                ),
            ));
        }
        let financed_principal = input.principal_requested - input.deposit;
        if financed_principal <= Decimal::ZERO {
            return Err(BudgetBridgeError::invalid(
                "deposit",
                "Deposit covers the loan amount; nothing left to finance",
            ));
        }

        validate_annual_rate(input.annual_interest_rate)?;

        if input.extra_payment_per_period < Decimal::ZERO {
            return Err(BudgetBridgeError::invalid(
                "extra_payment_per_period",
                "Extra payment cannot be negative",
            ));
        }
        validate_amount("extra_payment_per_period", input.extra_payment_per_period)?;
        if input.tax_rate < Decimal::ZERO || input.tax_rate > MAX_TAX_RATE {
            return Err(BudgetBridgeError::invalid(
                "tax_rate",
                format!("Tax rate must be between 0 and {MAX_TAX_RATE}%"),
            ));
        }
        if let Some(payment) = input.payment_override {
            if payment <= Decimal::ZERO {
                return Err(BudgetBridgeError::invalid(
                    "payment_override",
                    "Fixed payment must be positive",
                ));
            }
            validate_amount("payment_override", payment)?;
        }

        let duration_periods = resolve_duration(&input)?;
        let periodic_rate = time_value::periodic_rate(
            input.annual_interest_rate,
            input.frequency,
            input.rate_convention,
        )?;
        validate_compounding(input.annual_interest_rate, periodic_rate, duration_periods)?;

        Ok(LoanParameters {
            principal_requested: input.principal_requested,
            deposit: input.deposit,
            financed_principal,
            annual_interest_rate: input.annual_interest_rate,
            duration_periods,
            extra_payment_per_period: input.extra_payment_per_period,
            tax_rate: input.tax_rate,
            frequency: input.frequency,
            rate_convention: input.rate_convention,
            payment_override: input.payment_override,
            first_payment_date: input.first_payment_date,
            periodic_rate,
        })
    }
}

impl From<&LoanParameters> for LoanInput {
    fn from(params: &LoanParameters) -> Self {
        LoanInput {
            principal_requested: params.principal_requested,
            deposit: params.deposit,
            annual_interest_rate: params.annual_interest_rate,
            duration_periods: Some(params.duration_periods),
            duration_years: None,
            extra_payment_per_period: params.extra_payment_per_period,
            tax_rate: params.tax_rate,
            frequency: params.frequency,
            rate_convention: params.rate_convention,
            payment_override: params.payment_override,
            first_payment_date: params.first_payment_date,
        }
    }
}

pub(crate) fn validate_annual_rate(rate: Percent) -> BudgetBridgeResult<()> {
    if rate < Decimal::ZERO || rate > MAX_ANNUAL_RATE {
        return Err(BudgetBridgeError::invalid(
            "annual_interest_rate",
            format!("Annual rate {rate}% must be between 0 and {MAX_ANNUAL_RATE}%"),
        ));
    }
    Ok(())
}

fn validate_amount(field: &str, amount: Money) -> BudgetBridgeResult<()> {
    if amount > MAX_AMOUNT {
        return Err(BudgetBridgeError::invalid(
            field,
            format!("Amount {amount} exceeds the limit of {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

fn validate_compounding(
    annual_rate: Percent,
    periodic_rate: Rate,
    periods: u32,
) -> BudgetBridgeResult<()> {
    let growth = (Decimal::ONE + periodic_rate).checked_powi(i64::from(periods));
    match growth {
        Some(g) if g <= MAX_COMPOUND_GROWTH => Ok(()),
        _ => Err(BudgetBridgeError::invalid(
            "duration",
            format!(
                "{periods} periods at {annual_rate}% compound beyond the supported precision"
            ),
        )),
    }
}

fn resolve_duration(input: &LoanInput) -> BudgetBridgeResult<u32> {
    let periods = match (input.duration_periods, input.duration_years) {
        (Some(_), Some(_)) => {
            return Err(BudgetBridgeError::invalid(
                "duration",
                "Give either duration_periods or duration_years, not both",
            ));
        }
        (None, None) => {
            return Err(BudgetBridgeError::invalid(
                "duration",
                "A loan duration is required",
            ));
        }
        (Some(periods), None) => periods,
        (None, Some(years)) => years
            .checked_mul(input.frequency.periods_per_year())
            .unwrap_or(u32::MAX),
    };

    if periods == 0 {
        return Err(BudgetBridgeError::invalid(
            "duration",
            "Duration must be at least one payment period",
        ));
    }
    if periods > MAX_DURATION_PERIODS {
        return Err(BudgetBridgeError::invalid(
            "duration",
            format!("Duration of {periods} periods exceeds the limit of {MAX_DURATION_PERIODS}"),
        ));
    }
    Ok(periods)
}
