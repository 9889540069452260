use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::BudgetBridgeError;
use crate::types::{Money, PaymentFrequency, Percent, Rate, RateConvention};
use crate::BudgetBridgeResult;

const HUNDRED: Decimal = dec!(100);

/// Convert a quoted annual percentage into the rate applied each period.
pub fn periodic_rate(
    annual_rate: Percent,
    frequency: PaymentFrequency,
    convention: RateConvention,
) -> BudgetBridgeResult<Rate> {
    if annual_rate < Decimal::ZERO {
        return Err(BudgetBridgeError::invalid(
            "annual_interest_rate",
            "Annual rate must be non-negative",
        ));
    }

    let annual = annual_rate / HUNDRED;
    let periods = Decimal::from(frequency.periods_per_year());

    match convention {
        RateConvention::Nominal => Ok(annual / periods),
        RateConvention::EffectiveAnnual => {
            if annual.is_zero() || periods == Decimal::ONE {
                return Ok(annual);
            }
            let growth = (Decimal::ONE + annual)
                .checked_powd(Decimal::ONE / periods)
                .ok_or_else(|| BudgetBridgeError::invalid(
                    "annual_interest_rate",
                    "Effective annual rate conversion overflowed",
                ))?;
            Ok(growth - Decimal::ONE)
        }
    }
}

/// Level payment that fully amortises `principal` over `nper` periods.
///
/// Uses `P * r / (1 - (1 + r)^-n)`, or `P / n` when the rate is zero. When
/// `(1 + r)^n` exceeds the decimal range the discount term is treated as zero,
/// which leaves an interest-only payment of `P * r`.
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> BudgetBridgeResult<Money> {
    if nper == 0 {
        return Err(BudgetBridgeError::invalid(
            "duration_periods",
            "Number of periods must be > 0",
        ));
    }
    if rate < Decimal::ZERO {
        return Err(BudgetBridgeError::invalid(
            "periodic_rate",
            "Periodic rate must be non-negative",
        ));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let discount = match (Decimal::ONE + rate).checked_powi(i64::from(nper)) {
        Some(factor) if !factor.is_zero() => Decimal::ONE / factor,
        _ => Decimal::ZERO,
    };

    let annuity_factor = Decimal::ONE - discount;
    if annuity_factor.is_zero() {
        return Err(BudgetBridgeError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    Ok(principal * rate / annuity_factor)
}
