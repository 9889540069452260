//! Outstanding balance restated in first-period money under a flat annual
//! inflation rate.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::params::LoanInput;
use crate::amortization::schedule::{build_schedule, Schedule};
use crate::error::BudgetBridgeError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, PaymentFrequency, Percent};
use crate::BudgetBridgeResult;

const MAX_INFLATION_RATE: Percent = dec!(100);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InflationInput {
    pub loan: LoanInput,
    /// Annual inflation in percent.
    pub annual_inflation_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationAdjustedRow {
    pub period_index: u32,
    pub ending_balance: Money,
    /// `(1 + inflation)^(period / periods_per_year)`
    pub deflator: Decimal,
    pub real_ending_balance: Money,
}

impl InflationAdjustedRow {
    pub fn rounded(&self, dp: u32) -> InflationAdjustedRow {
        InflationAdjustedRow {
            period_index: self.period_index,
            ending_balance: round_money(self.ending_balance, dp),
            deflator: self.deflator,
            real_ending_balance: round_money(self.real_ending_balance, dp),
        }
    }
}

/// Deflate each row's ending balance by cumulative inflation.
pub fn adjust_for_inflation(
    schedule: &Schedule,
    annual_inflation_rate: Percent,
    frequency: PaymentFrequency,
) -> BudgetBridgeResult<Vec<InflationAdjustedRow>> {
    if annual_inflation_rate < Decimal::ZERO || annual_inflation_rate > MAX_INFLATION_RATE {
        return Err(BudgetBridgeError::invalid(
            "annual_inflation_rate",
            format!("Inflation must be between 0 and {MAX_INFLATION_RATE}%"),
        ));
    }

    let growth = Decimal::ONE + annual_inflation_rate / dec!(100);
    let periods_per_year = Decimal::from(frequency.periods_per_year());

    schedule
        .rows
        .iter()
        .map(|row| {
            let years = Decimal::from(row.period_index) / periods_per_year;
            let deflator = if annual_inflation_rate.is_zero() {
                Decimal::ONE
            } else {
                growth.checked_powd(years).ok_or_else(|| {
                    BudgetBridgeError::invalid(
                        "annual_inflation_rate",
                        format!("Deflator overflowed at period {}", row.period_index),
                    )
                })?
            };
            if deflator.is_zero() {
                return Err(BudgetBridgeError::DivisionByZero {
                    context: format!("inflation deflator at period {}", row.period_index),
                });
            }
            Ok(InflationAdjustedRow {
                period_index: row.period_index,
                ending_balance: row.ending_balance,
                deflator,
                real_ending_balance: row.ending_balance / deflator,
            })
        })
        .collect()
}

/// Build the loan's schedule and return its inflation-adjusted balance path.
pub fn real_balance_path(
    input: &InflationInput,
) -> BudgetBridgeResult<ComputationOutput<Vec<InflationAdjustedRow>>> {
    let start = Instant::now();
    let params = input.loan.validate()?;
    let schedule = build_schedule(&params)?;
    let rows = adjust_for_inflation(&schedule, input.annual_inflation_rate, params.frequency())?;
    let warnings = schedule.warnings.iter().map(ToString::to_string).collect();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Inflation-adjusted outstanding balance",
        &serde_json::json!({
            "annual_inflation_rate": input.annual_inflation_rate.to_string(),
            "frequency": params.frequency(),
        }),
        warnings,
        elapsed,
        rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn schedule() -> Schedule {
        let params = LoanInput {
            principal_requested: dec!(120000),
            annual_interest_rate: dec!(6),
            duration_years: Some(10),
            ..Default::default()
        }
        .validate()
        .unwrap();
        build_schedule(&params).unwrap()
    }

    #[test]
    fn test_zero_inflation_is_identity() {
        let s = schedule();
        let rows = adjust_for_inflation(&s, Decimal::ZERO, PaymentFrequency::Monthly).unwrap();
        assert_eq!(rows.len(), s.rows.len());
        for (adj, row) in rows.iter().zip(&s.rows) {
            assert_eq!(adj.real_ending_balance, row.ending_balance);
        }
    }

    #[test]
    fn test_one_year_deflator() {
        let s = schedule();
        let rows = adjust_for_inflation(&s, dec!(2), PaymentFrequency::Monthly).unwrap();
        let year_one = &rows[11];
        assert_eq!(year_one.period_index, 12);
        assert!((year_one.deflator - dec!(1.02)).abs() < dec!(0.0000001));
        assert!(year_one.real_ending_balance < year_one.ending_balance);
    }

    #[test]
    fn test_real_balance_below_nominal() {
        let s = schedule();
        let rows = adjust_for_inflation(&s, dec!(3), PaymentFrequency::Monthly).unwrap();
        assert!(rows
            .iter()
            .filter(|r| !r.ending_balance.is_zero())
            .all(|r| r.real_ending_balance < r.ending_balance));
    }

    #[test]
    fn test_inflation_bounds() {
        let s = schedule();
        assert!(adjust_for_inflation(&s, dec!(-1), PaymentFrequency::Monthly).is_err());
        assert!(adjust_for_inflation(&s, dec!(150), PaymentFrequency::Monthly).is_err());
    }

    #[test]
    fn test_real_balance_path_envelope() {
        let input = InflationInput {
            loan: LoanInput {
                principal_requested: dec!(10000),
                annual_interest_rate: dec!(12),
                duration_periods: Some(12),
                ..Default::default()
            },
            annual_inflation_rate: dec!(2),
        };
        let output = real_balance_path(&input).unwrap();
        assert_eq!(output.result.len(), 12);
        assert!(output.warnings.is_empty());
    }
}
