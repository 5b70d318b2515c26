use constructa_core::consortium::{generate_schedule, LoanParameters};
use constructa_core::metrics::{
    borrower_cash_flows, compute_cash_flow_metrics, compute_metrics, Payback,
};
use constructa_core::time_value::{irr, npv, Irr};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Schedule metrics
// ===========================================================================

#[test]
fn test_fee_free_contract_has_zero_irr() {
    let params = LoanParameters::new(dec!(600000), 60, Decimal::ZERO, Decimal::ZERO);
    let schedule = generate_schedule(&params).unwrap();
    let metrics = compute_metrics(&schedule, dec!(600000), Decimal::ZERO).unwrap();

    assert!(metrics.npv.abs() < dec!(0.000001));
    let rate = metrics.irr.rate().unwrap();
    assert!(rate.abs() < dec!(0.000001));
    assert_eq!(metrics.final_balance, Decimal::ZERO);
}

#[test]
fn test_admin_fee_shows_as_positive_cost_of_funds() {
    let params = LoanParameters::new(dec!(1000000), 60, dec!(0.12), Decimal::ZERO);
    let schedule = generate_schedule(&params).unwrap();
    let metrics = compute_metrics(&schedule, dec!(1000000), Decimal::ZERO).unwrap();

    // Fees: 0.01 * sum of opening balances = 0.01 * 1,000,000 * 30.5
    assert!((metrics.total_finance_charges - dec!(305000)).abs() < dec!(0.01));
    assert!((metrics.total_paid - dec!(1305000)).abs() < dec!(0.01));
    assert!(metrics.irr.rate().unwrap() > Decimal::ZERO);
    assert_eq!(metrics.max_exposure.round_dp(2), dec!(305000));
}

#[test]
fn test_irr_root_zeroes_npv() {
    let params = LoanParameters::new(dec!(800000), 120, dec!(0.18), dec!(0.05));
    let schedule = generate_schedule(&params).unwrap();
    let flows = borrower_cash_flows(dec!(800000), &schedule);
    let rate = irr(&flows).rate().unwrap();
    assert!(npv(rate, &flows).unwrap().abs() < dec!(100));
}

#[test]
fn test_discounting_lowers_cost_of_later_payments() {
    let params = LoanParameters::new(dec!(1000000), 60, dec!(0.12), Decimal::ZERO);
    let schedule = generate_schedule(&params).unwrap();
    let undiscounted = compute_metrics(&schedule, dec!(1000000), Decimal::ZERO).unwrap();
    let discounted = compute_metrics(&schedule, dec!(1000000), dec!(0.01)).unwrap();
    assert!(discounted.npv > undiscounted.npv);
}

// ===========================================================================
// Cash flow metrics
// ===========================================================================

#[test]
fn test_all_outflows_give_indeterminate_irr() {
    let flows = vec![dec!(-200000), dec!(-26666.67), dec!(-26666.67)];
    let metrics = compute_cash_flow_metrics(&flows, dec!(0.01)).unwrap();
    assert_eq!(metrics.irr, Irr::Indeterminate);
    assert_eq!(metrics.payback, Payback::NotReached);
    assert_eq!(metrics.total_inflows, Decimal::ZERO);
}

#[test]
fn test_development_curve_payback() {
    let mut flows = vec![Decimal::ZERO, dec!(-500), dec!(-300)];
    flows.extend(std::iter::repeat(dec!(200)).take(6));
    let metrics = compute_cash_flow_metrics(&flows, Decimal::ZERO).unwrap();
    // Running total: -500, -800, -600, -400, -200, 0
    assert_eq!(metrics.payback, Payback::Reached(6));
    assert_eq!(metrics.max_exposure, dec!(800));
    assert_eq!(metrics.npv, dec!(400));
}

#[test]
fn test_irr_serializes_as_tagged_sentinel() {
    let json = serde_json::to_value(Irr::Indeterminate).unwrap();
    assert_eq!(json["status"], "indeterminate");
    let json = serde_json::to_value(Payback::Reached(3)).unwrap();
    assert_eq!(json["month"], 3);
}
