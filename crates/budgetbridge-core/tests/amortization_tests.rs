use budgetbridge_core::amortization::schedule::amortize;
use budgetbridge_core::{
    build_schedule, BudgetBridgeError, LoanInput, PaymentFrequency, RateConvention, ScheduleWarning,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(principal: Decimal, rate: Decimal, periods: u32) -> LoanInput {
    LoanInput {
        principal_requested: principal,
        annual_interest_rate: rate,
        duration_periods: Some(periods),
        ..Default::default()
    }
}

// ===========================================================================
// Reference scenario: 10,000 at 12% over 12 months
// ===========================================================================

#[test]
fn test_reference_loan_known_answers() {
    let params = loan(dec!(10000), dec!(12), 12).validate().unwrap();
    let schedule = build_schedule(&params).unwrap();

    assert_eq!(schedule.periodic_rate, dec!(0.01));
    assert!(
        (schedule.scheduled_payment - dec!(888.49)).abs() < dec!(0.005),
        "Expected payment ~888.49, got {}",
        schedule.scheduled_payment
    );

    let first = &schedule.rows[0];
    assert_eq!(first.interest_portion, dec!(100));
    assert!((first.principal_portion - dec!(788.49)).abs() < dec!(0.005));
    assert!((first.ending_balance - dec!(9211.51)).abs() < dec!(0.005));

    let last = schedule.rows.last().unwrap();
    assert_eq!(last.period_index, 12);
    assert_eq!(last.ending_balance, Decimal::ZERO);

    // 12 x 888.4879 - 10,000
    assert!(
        (schedule.total_interest_paid - dec!(661.85)).abs() < dec!(0.01),
        "Expected total interest ~661.85, got {}",
        schedule.total_interest_paid
    );
    assert_eq!(schedule.actual_payoff_period, Some(12));
}

#[test]
fn test_extra_payment_shortens_reference_loan() {
    let mut input = loan(dec!(10000), dec!(12), 12);
    input.extra_payment_per_period = dec!(500);
    let schedule = build_schedule(&input.validate().unwrap()).unwrap();

    let payoff = schedule.actual_payoff_period.unwrap();
    assert!(payoff < 12, "Expected early payoff, got period {payoff}");
    assert_eq!(schedule.rows.len() as u32, payoff);
    assert!(schedule.total_interest_paid < dec!(662.88));
    assert_eq!(schedule.periods_saved, 12 - payoff);
    assert!(schedule.warnings.is_empty());
}

#[test]
fn test_deposit_exceeding_principal_is_rejected() {
    let mut input = loan(dec!(10000), dec!(12), 12);
    input.deposit = dec!(12000);
    match amortize(&input) {
        Err(BudgetBridgeError::InvalidInput { field, .. }) => assert_eq!(field, "deposit"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Zero-rate loans
// ===========================================================================

#[test]
fn test_zero_rate_is_straight_line() {
    let params = loan(dec!(1200), dec!(0), 12).validate().unwrap();
    let schedule = build_schedule(&params).unwrap();
    assert_eq!(schedule.scheduled_payment, dec!(100));
    for row in &schedule.rows {
        assert_eq!(row.interest_portion, Decimal::ZERO);
        assert_eq!(row.principal_portion, row.scheduled_payment);
    }
    assert_eq!(schedule.actual_payoff_period, Some(12));
    assert_eq!(schedule.total_interest_paid, Decimal::ZERO);
}

// ===========================================================================
// Home-loan defaults: 250,000 less 25,000 deposit, 7.5%, 20 years
// ===========================================================================

#[test]
fn test_home_loan_defaults() {
    let input = LoanInput {
        principal_requested: dec!(250000),
        deposit: dec!(25000),
        annual_interest_rate: dec!(7.5),
        duration_years: Some(20),
        ..Default::default()
    };
    let schedule = build_schedule(&input.validate().unwrap()).unwrap();

    // 225,000 at 0.625% monthly over 240 months ≈ 1,812.58
    assert!(
        (schedule.scheduled_payment - dec!(1812.58)).abs() < dec!(0.01),
        "got {}",
        schedule.scheduled_payment
    );
    assert_eq!(schedule.rows.len(), 240);
    assert_eq!(schedule.rows[239].ending_balance, Decimal::ZERO);
    assert!(schedule.warnings.is_empty());
}

#[test]
fn test_effective_annual_convention_charges_less() {
    let mut nominal = loan(dec!(100000), dec!(6), 360);
    let nominal_schedule = build_schedule(&nominal.validate().unwrap()).unwrap();

    nominal.rate_convention = RateConvention::EffectiveAnnual;
    let effective_schedule = build_schedule(&nominal.validate().unwrap()).unwrap();

    assert!(effective_schedule.periodic_rate < nominal_schedule.periodic_rate);
    assert!(effective_schedule.total_interest_paid < nominal_schedule.total_interest_paid);
    assert_eq!(effective_schedule.actual_payoff_period, Some(360));
}

#[test]
fn test_annual_frequency() {
    let input = LoanInput {
        principal_requested: dec!(1000),
        annual_interest_rate: dec!(10),
        duration_years: Some(2),
        frequency: PaymentFrequency::Annually,
        ..Default::default()
    };
    let schedule = build_schedule(&input.validate().unwrap()).unwrap();
    assert_eq!(schedule.rows.len(), 2);
    assert_eq!(schedule.rows[0].interest_portion, dec!(100));
    // 1000 * 0.1 / (1 - 1.1^-2) ≈ 576.19
    assert!((schedule.scheduled_payment - dec!(576.19)).abs() < dec!(0.005));
}

// ===========================================================================
// Warning conditions
// ===========================================================================

#[test]
fn test_underfunded_payment_never_goes_negative() {
    let mut input = loan(dec!(10000), dec!(24), 24);
    // Interest in period 1 is 200; a 150 payment plus 30 extra cannot cover it.
    input.payment_override = Some(dec!(150));
    input.extra_payment_per_period = dec!(30);
    let schedule = build_schedule(&input.validate().unwrap()).unwrap();

    assert_eq!(schedule.rows.len(), 24);
    for row in &schedule.rows {
        assert!(row.principal_portion >= Decimal::ZERO);
        assert!(row.ending_balance <= row.beginning_balance);
        assert!(row.underfunded);
    }
    assert!(!schedule.is_paid_off());
    assert!(matches!(
        schedule.warnings[0],
        ScheduleWarning::UnderfundedPayment { first_period: 1, periods_affected: 24, .. }
    ));
    assert!(matches!(
        schedule.warnings[1],
        ScheduleWarning::ResidualBalance { balance } if balance > Decimal::ZERO
    ));
}

#[test]
fn test_envelope_serializes_warnings_as_text() {
    let mut input = loan(dec!(10000), dec!(12), 12);
    input.payment_override = Some(dec!(400));
    let output = amortize(&input).unwrap();
    assert_eq!(output.warnings.len(), 1);
    assert!(output.warnings[0].starts_with("Loan is not repaid within the term"));

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["result"]["warnings"][0]["kind"], "residual_balance");
    assert!(json["result"]["actual_payoff_period"].is_null());
}
