//! Amortization schedule builder.
//!
//! Produces the period-by-period split of each payment into interest, tax on
//! interest and principal, with optional extra principal that shortens the
//! term. All math in `rust_decimal::Decimal`; nothing is rounded here.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::amortization::params::{LoanInput, LoanParameters};
use crate::time_value;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::BudgetBridgeResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Remaining balance at or below this is treated as fully repaid.
pub const PAYOFF_TOLERANCE: Decimal = dec!(0.000001);

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A single payment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based, contiguous.
    pub period_index: u32,
    pub beginning_balance: Money,
    /// Interest plus scheduled principal; the full level payment when underfunded.
    pub scheduled_payment: Money,
    pub extra_payment: Money,
    pub interest_portion: Money,
    pub tax_on_interest: Money,
    pub principal_portion: Money,
    pub ending_balance: Money,
    /// Running principal reduction, extra payments included.
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    /// The scheduled payment did not cover this period's interest.
    #[serde(default)]
    pub underfunded: bool,
}

/// Conditions the caller should see but that do not stop the computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    /// The scheduled payment fell short of the interest due.
    UnderfundedPayment {
        first_period: u32,
        periods_affected: u32,
        /// Largest `interest_portion - scheduled_payment` seen.
        max_shortfall: Money,
    },
    /// Balance left after the final scheduled period.
    ResidualBalance { balance: Money },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::UnderfundedPayment {
                first_period,
                periods_affected,
                max_shortfall,
            } => write!(
                f,
                "Payment does not cover interest from period {first_period} \
                 ({periods_affected} periods affected, largest shortfall {})",
                round_money(*max_shortfall, 2)
            ),
            ScheduleWarning::ResidualBalance { balance } => write!(
                f,
                "Loan is not repaid within the term; residual balance {}",
                round_money(*balance, 2)
            ),
        }
    }
}

/// The full amortization table plus its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub periodic_rate: Rate,
    /// Level payment before any extra.
    pub scheduled_payment: Money,
    pub payment_with_extra: Money,
    pub rows: Vec<ScheduleRow>,
    pub total_principal_paid: Money,
    pub total_extra_paid: Money,
    pub total_interest_paid: Money,
    pub total_tax_paid: Money,
    /// Every payment, extra and tax included.
    pub total_paid: Money,
    /// Period in which the balance reached zero; `None` if it never did.
    pub actual_payoff_period: Option<u32>,
    pub periods_saved: u32,
    pub residual_balance: Money,
    pub warnings: Vec<ScheduleWarning>,
}

impl Schedule {
    /// Whether the balance reached zero within the term.
    pub fn is_paid_off(&self) -> bool {
        self.actual_payoff_period.is_some()
    }

    /// Copy with every monetary field rounded to `dp` places for display.
    pub fn rounded(&self, dp: u32) -> Schedule {
        let r = |v: Money| round_money(v, dp);
        Schedule {
            periodic_rate: self.periodic_rate,
            scheduled_payment: r(self.scheduled_payment),
            payment_with_extra: r(self.payment_with_extra),
            rows: self
                .rows
                .iter()
                .map(|row| ScheduleRow {
                    period_index: row.period_index,
                    beginning_balance: r(row.beginning_balance),
                    scheduled_payment: r(row.scheduled_payment),
                    extra_payment: r(row.extra_payment),
                    interest_portion: r(row.interest_portion),
                    tax_on_interest: r(row.tax_on_interest),
                    principal_portion: r(row.principal_portion),
                    ending_balance: r(row.ending_balance),
                    cumulative_principal: r(row.cumulative_principal),
                    cumulative_interest: r(row.cumulative_interest),
                    payment_date: row.payment_date,
                    underfunded: row.underfunded,
                })
                .collect(),
            total_principal_paid: r(self.total_principal_paid),
            total_extra_paid: r(self.total_extra_paid),
            total_interest_paid: r(self.total_interest_paid),
            total_tax_paid: r(self.total_tax_paid),
            total_paid: r(self.total_paid),
            actual_payoff_period: self.actual_payoff_period,
            periods_saved: self.periods_saved,
            residual_balance: r(self.residual_balance),
            warnings: self.warnings.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Running state for an underfunded stretch, folded into one warning.
#[derive(Default)]
struct Shortfall {
    first_period: Option<u32>,
    periods_affected: u32,
    max_shortfall: Money,
}

impl Shortfall {
    fn record(&mut self, period: u32, shortfall: Money) {
        self.first_period.get_or_insert(period);
        self.periods_affected += 1;
        self.max_shortfall = self.max_shortfall.max(shortfall);
    }

    fn into_warning(self) -> Option<ScheduleWarning> {
        self.first_period
            .map(|first_period| ScheduleWarning::UnderfundedPayment {
                first_period,
                periods_affected: self.periods_affected,
                max_shortfall: self.max_shortfall,
            })
    }
}

/// Build the amortization schedule for validated parameters.
///
/// Stops at the first period whose ending balance is zero, so extra payments
/// shorten the table rather than padding it with empty rows. With the level
/// annuity payment the final scheduled period always clears what is left.
pub fn build_schedule(params: &LoanParameters) -> BudgetBridgeResult<Schedule> {
    let rate = params.periodic_rate();
    let nper = params.duration_periods();
    let extra_per_period = params.extra_payment_per_period();
    let tax_fraction = params.tax_rate() / HUNDRED;

    let level = params.payment_override().is_none();
    let payment = match params.payment_override() {
        Some(fixed) => fixed,
        None => time_value::level_payment(params.financed_principal(), rate, nper)?,
    };

    let mut rows = Vec::with_capacity(nper as usize);
    let mut balance = params.financed_principal();
    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;
    let mut total_extra = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut shortfall = Shortfall::default();
    let mut payoff_period = None;

    for period in 1..=nper {
        let beginning = balance;
        let interest = beginning * rate;
        let tax = interest * tax_fraction;

        let covered = payment - interest;
        let underfunded = covered < Decimal::ZERO;
        if underfunded {
            shortfall.record(period, -covered);
        }
        let mut principal = covered.max(Decimal::ZERO).min(beginning);
        let extra = extra_per_period.min(beginning - principal);

        let mut ending = beginning - principal - extra;
        // Rounding residue left by the annuity payment on its last period.
        if ending <= PAYOFF_TOLERANCE || (level && !underfunded && period == nper) {
            principal = beginning - extra;
            ending = Decimal::ZERO;
        }

        let scheduled = if underfunded {
            payment
        } else {
            interest + principal
        };

        cumulative_principal += principal + extra;
        cumulative_interest += interest;
        total_extra += extra;
        total_tax += tax;
        total_paid += scheduled + extra + tax;

        rows.push(ScheduleRow {
            period_index: period,
            beginning_balance: beginning,
            scheduled_payment: scheduled,
            extra_payment: extra,
            interest_portion: interest,
            tax_on_interest: tax,
            principal_portion: principal,
            ending_balance: ending,
            cumulative_principal,
            cumulative_interest,
            payment_date: payment_date(params, period),
            underfunded,
        });

        balance = ending;
        if balance.is_zero() {
            payoff_period = Some(period);
            break;
        }
    }

    let mut warnings = Vec::new();
    if let Some(w) = shortfall.into_warning() {
        tracing::warn!(warning = %w, "underfunded payment");
        warnings.push(w);
    }
    if payoff_period.is_none() {
        let w = ScheduleWarning::ResidualBalance { balance };
        tracing::warn!(warning = %w, "residual balance after final period");
        warnings.push(w);
    }

    let periods_saved = payoff_period.map(|p| nper - p).unwrap_or(0);

    tracing::debug!(
        periods = rows.len(),
        payoff_period = ?payoff_period,
        total_interest = %cumulative_interest,
        "built amortization schedule"
    );

    Ok(Schedule {
        periodic_rate: rate,
        scheduled_payment: payment,
        payment_with_extra: payment + extra_per_period,
        rows,
        total_principal_paid: cumulative_principal,
        total_extra_paid: total_extra,
        total_interest_paid: cumulative_interest,
        total_tax_paid: total_tax,
        total_paid,
        actual_payoff_period: payoff_period,
        periods_saved,
        residual_balance: balance,
        warnings,
    })
}

fn payment_date(params: &LoanParameters, period: u32) -> Option<NaiveDate> {
    let first = params.first_payment_date()?;
    let step = params.frequency().months_between_payments();
    first.checked_add_months(Months::new((period - 1) * step))
}

/// Validate `input`, build its schedule and wrap it in the standard envelope.
pub fn amortize(input: &LoanInput) -> BudgetBridgeResult<ComputationOutput<Schedule>> {
    let start = Instant::now();
    let params = input.validate()?;
    let schedule = build_schedule(&params)?;
    let warnings = schedule.warnings.iter().map(ToString::to_string).collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with extra principal",
        &serde_json::json!({
            "financed_principal": params.financed_principal().to_string(),
            "annual_interest_rate": params.annual_interest_rate().to_string(),
            "periodic_rate": params.periodic_rate().to_string(),
            "duration_periods": params.duration_periods(),
            "frequency": params.frequency(),
            "rate_convention": params.rate_convention(),
            "payment_override": params.payment_override().map(|p| p.to_string()),
        }),
        warnings,
        elapsed,
        schedule,
    ))
}
