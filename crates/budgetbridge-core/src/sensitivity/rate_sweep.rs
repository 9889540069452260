//! Interest-rate sensitivity: the same loan re-amortised at a set of rates.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::params::{
    validate_annual_rate, LoanInput, LoanParameters, MAX_ANNUAL_RATE,
};
use crate::amortization::schedule::build_schedule;
use crate::error::BudgetBridgeError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Percent};
use crate::BudgetBridgeResult;

const DEFAULT_STEP: Percent = dec!(1);
const DEFAULT_STEPS_EACH_SIDE: u32 = 2;

/// Most ladder rungs allowed either side of the base rate.
pub const MAX_STEPS_EACH_SIDE: u32 = 100;

/// Input for a rate sensitivity run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub loan: LoanInput,
    /// Explicit rates to evaluate, in percent. Overrides the ladder settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<Percent>>,
    /// Ladder spacing in percentage points (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Percent>,
    /// Ladder rungs either side of the base rate (default 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_each_side: Option<u32>,
}

/// Outcome of the loan at one sampled rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub annual_interest_rate: Percent,
    pub scheduled_payment: Money,
    pub total_interest_paid: Money,
    pub total_paid: Money,
    pub actual_payoff_period: Option<u32>,
    /// `total_interest_paid` minus the base rate's total interest.
    pub interest_delta: Money,
    pub has_warnings: bool,
}

/// Sweep results in the order the rates were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub base_rate: Percent,
    pub base_total_interest: Money,
    pub points: Vec<SensitivityPoint>,
}

impl SensitivityResult {
    /// Copy with monetary fields rounded to `dp` places for display.
    pub fn rounded(&self, dp: u32) -> SensitivityResult {
        SensitivityResult {
            base_rate: self.base_rate,
            base_total_interest: round_money(self.base_total_interest, dp),
            points: self
                .points
                .iter()
                .map(|p| SensitivityPoint {
                    annual_interest_rate: p.annual_interest_rate,
                    scheduled_payment: round_money(p.scheduled_payment, dp),
                    total_interest_paid: round_money(p.total_interest_paid, dp),
                    total_paid: round_money(p.total_paid, dp),
                    actual_payoff_period: p.actual_payoff_period,
                    interest_delta: round_money(p.interest_delta, dp),
                    has_warnings: p.has_warnings,
                })
                .collect(),
        }
    }
}

/// Rates `base - n*step ..= base + n*step`, ascending, clamped to the
/// accepted rate range.
///
/// Rungs that clamp onto the same value are emitted once.
pub fn rate_ladder(
    base_rate: Percent,
    step: Percent,
    steps_each_side: u32,
) -> BudgetBridgeResult<Vec<Percent>> {
    validate_annual_rate(base_rate)?;
    if step <= Decimal::ZERO {
        return Err(BudgetBridgeError::invalid("step", "Step must be positive"));
    }

    if steps_each_side > MAX_STEPS_EACH_SIDE {
        return Err(BudgetBridgeError::invalid(
            "steps_each_side",
            format!("At most {MAX_STEPS_EACH_SIDE} steps either side of the base rate"),
        ));
    }

    let n = i64::from(steps_each_side);
    let mut rates: Vec<Percent> = Vec::with_capacity((2 * n + 1) as usize);
    for k in -n..=n {
        let rate = step
            .checked_mul(Decimal::from(k))
            .and_then(|offset| base_rate.checked_add(offset))
            .ok_or_else(|| {
                BudgetBridgeError::invalid("step", format!("Step {step} is out of range"))
            })?
            .clamp(Decimal::ZERO, MAX_ANNUAL_RATE);
        if rates.last() != Some(&rate) {
            rates.push(rate);
        }
    }
    Ok(rates)
}

/// Evaluate `base` at each rate in `rates`.
///
/// Each point runs its own schedule; nothing is shared between points, and
/// the output keeps the input order even when evaluated in parallel.
pub fn sweep(base: &LoanParameters, rates: &[Percent]) -> BudgetBridgeResult<SensitivityResult> {
    if rates.is_empty() {
        return Err(BudgetBridgeError::invalid(
            "rates",
            "At least one rate is required",
        ));
    }

    let variants = rates
        .iter()
        .map(|&rate| base.with_annual_rate(rate))
        .collect::<BudgetBridgeResult<Vec<_>>>()?;

    let base_total_interest = build_schedule(base)?.total_interest_paid;

    #[cfg(feature = "parallel")]
    let points = variants
        .par_iter()
        .map(|params| evaluate(params, base_total_interest))
        .collect::<BudgetBridgeResult<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let points = variants
        .iter()
        .map(|params| evaluate(params, base_total_interest))
        .collect::<BudgetBridgeResult<Vec<_>>>()?;

    tracing::debug!(
        base_rate = %base.annual_interest_rate(),
        points = points.len(),
        "rate sweep complete"
    );

    Ok(SensitivityResult {
        base_rate: base.annual_interest_rate(),
        base_total_interest,
        points,
    })
}

fn evaluate(
    params: &LoanParameters,
    base_total_interest: Money,
) -> BudgetBridgeResult<SensitivityPoint> {
    let schedule = build_schedule(params)?;
    Ok(SensitivityPoint {
        annual_interest_rate: params.annual_interest_rate(),
        scheduled_payment: schedule.scheduled_payment,
        total_interest_paid: schedule.total_interest_paid,
        total_paid: schedule.total_paid,
        actual_payoff_period: schedule.actual_payoff_period,
        interest_delta: schedule.total_interest_paid - base_total_interest,
        has_warnings: !schedule.warnings.is_empty(),
    })
}

/// Validate, pick the rates and run the sweep inside the standard envelope.
pub fn analyze_rate_sensitivity(
    input: &SensitivityInput,
) -> BudgetBridgeResult<ComputationOutput<SensitivityResult>> {
    let start = Instant::now();
    let base = input.loan.validate()?;

    let rates = match &input.rates {
        Some(rates) => rates.clone(),
        None => rate_ladder(
            base.annual_interest_rate(),
            input.step.unwrap_or(DEFAULT_STEP),
            input.steps_each_side.unwrap_or(DEFAULT_STEPS_EACH_SIDE),
        )?,
    };

    let result = sweep(&base, &rates)?;

    let mut warnings = Vec::new();
    for point in result.points.iter().filter(|p| p.has_warnings) {
        warnings.push(format!(
            "Rate {}%: loan not cleanly amortised within the term",
            point.annual_interest_rate
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Interest rate sensitivity (full re-amortisation per rate)",
        &serde_json::json!({
            "base_rate": base.annual_interest_rate().to_string(),
            "rates": rates.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "financed_principal": base.financed_principal().to_string(),
            "duration_periods": base.duration_periods(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn base_params() -> LoanParameters {
        LoanInput {
            principal_requested: dec!(10000),
            annual_interest_rate: dec!(12),
            duration_periods: Some(12),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_ladder_default_shape() {
        let rates = rate_ladder(dec!(7.5), dec!(1), 2).unwrap();
        assert_eq!(
            rates,
            vec![dec!(5.5), dec!(6.5), dec!(7.5), dec!(8.5), dec!(9.5)]
        );
    }

    #[test]
    fn test_ladder_clamps_and_dedups_at_zero() {
        let rates = rate_ladder(dec!(1), dec!(1), 3).unwrap();
        assert_eq!(rates, vec![dec!(0), dec!(1), dec!(2), dec!(3), dec!(4)]);
    }

    #[test]
    fn test_ladder_rejects_bad_step() {
        assert!(rate_ladder(dec!(5), Decimal::ZERO, 2).is_err());
    }

    #[test]
    fn test_ladder_clamps_at_max_rate() {
        let rates = rate_ladder(dec!(99.5), DEFAULT_STEP, DEFAULT_STEPS_EACH_SIDE).unwrap();
        assert_eq!(rates, vec![dec!(97.5), dec!(98.5), dec!(99.5), dec!(100)]);

        let rates = rate_ladder(dec!(50), dec!(60), 2).unwrap();
        assert_eq!(rates, vec![dec!(0), dec!(50), dec!(100)]);
    }

    #[test]
    fn test_ladder_bounds_rungs_and_step() {
        assert!(rate_ladder(dec!(5), dec!(1), MAX_STEPS_EACH_SIDE).is_ok());
        match rate_ladder(dec!(5), dec!(1), u32::MAX) {
            Err(BudgetBridgeError::InvalidInput { field, .. }) => {
                assert_eq!(field, "steps_each_side")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        match rate_ladder(dec!(5), dec!(10000000000000000000000000000), 8) {
            Err(BudgetBridgeError::InvalidInput { field, .. }) => assert_eq!(field, "step"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_near_max_rate() {
        let mut loan = LoanInput::from(&base_params());
        loan.annual_interest_rate = dec!(99.5);
        let input = SensitivityInput {
            loan,
            rates: None,
            step: None,
            steps_each_side: None,
        };
        let output = analyze_rate_sensitivity(&input).unwrap();
        let last = output.result.points.last().unwrap();
        assert_eq!(last.annual_interest_rate, dec!(100));
        assert_eq!(last.actual_payoff_period, Some(12));
    }

    #[test]
    fn test_sweep_preserves_order() {
        let rates = [dec!(15), dec!(3), dec!(9)];
        let result = sweep(&base_params(), &rates).unwrap();
        let seen: Vec<_> = result
            .points
            .iter()
            .map(|p| p.annual_interest_rate)
            .collect();
        assert_eq!(seen, rates.to_vec());
    }

    #[test]
    fn test_sweep_interest_rises_with_rate() {
        let rates = rate_ladder(dec!(12), dec!(2), 2).unwrap();
        let result = sweep(&base_params(), &rates).unwrap();
        for pair in result.points.windows(2) {
            assert!(pair[1].total_interest_paid > pair[0].total_interest_paid);
            assert!(pair[1].scheduled_payment > pair[0].scheduled_payment);
        }
        let base = result
            .points
            .iter()
            .find(|p| p.annual_interest_rate == dec!(12))
            .unwrap();
        assert_eq!(base.interest_delta, Decimal::ZERO);
        assert_eq!(base.actual_payoff_period, Some(12));
    }

    #[test]
    fn test_sweep_zero_rate_point() {
        let result = sweep(&base_params(), &[dec!(0)]).unwrap();
        let point = &result.points[0];
        assert_eq!(point.total_interest_paid, Decimal::ZERO);
        assert!(point.interest_delta < Decimal::ZERO);
    }

    #[test]
    fn test_sweep_rejects_empty_and_out_of_range() {
        assert!(sweep(&base_params(), &[]).is_err());
        assert!(sweep(&base_params(), &[dec!(5), dec!(101)]).is_err());
    }

    #[test]
    fn test_analyze_uses_explicit_rates() {
        let input = SensitivityInput {
            loan: LoanInput::from(&base_params()),
            rates: Some(vec![dec!(10), dec!(14)]),
            step: None,
            steps_each_side: None,
        };
        let output = analyze_rate_sensitivity(&input).unwrap();
        assert_eq!(output.result.points.len(), 2);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_analyze_flags_underfunded_rates() {
        let mut loan = LoanInput::from(&base_params());
        // 900 a month clears the loan at 12% but leaves a residual at 40%.
        loan.payment_override = Some(dec!(900));
        let input = SensitivityInput {
            loan,
            rates: Some(vec![dec!(12), dec!(40)]),
            step: None,
            steps_each_side: None,
        };
        let output = analyze_rate_sensitivity(&input).unwrap();
        assert!(!output.result.points[0].has_warnings);
        assert!(output.result.points[1].has_warnings);
        assert_eq!(output.warnings.len(), 1);
    }
}
