use constructa_core::financing::{
    annuity_payment, bank_financed_flows, calculate_project_flows, generate_annuity_schedule,
    rate_economy, self_financed_flows, BankLoanTerms, ProjectInputs, ProjectRequest,
    RateConvention,
};
use constructa_core::metrics::{FinancingModel, Payback};
use constructa_core::scenarios::{compare_scenarios, ScenarioRun, SimulationRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn project() -> ProjectInputs {
    ProjectInputs {
        sales_value: dec!(10000000),
        construction_cost: dec!(7000000),
        term_months: 24,
        down_payment_pct: dec!(0.30),
    }
}

// ===========================================================================
// Bank annuity
// ===========================================================================

#[test]
fn test_annuity_payment_nominal_known_answer() {
    // 100,000 at 12% nominal (1% a month) over 12 months
    let payment = annuity_payment(
        dec!(100000),
        12,
        dec!(0.12),
        Decimal::ZERO,
        RateConvention::NominalMonthly,
    )
    .unwrap();
    assert_eq!(payment.round_dp(2), dec!(8884.88));
}

#[test]
fn test_annuity_schedule_amortizes_fully() {
    let schedule = generate_annuity_schedule(
        dec!(500000),
        36,
        dec!(0.10),
        dec!(0.04),
        RateConvention::EffectiveAnnual,
    )
    .unwrap();
    assert_eq!(schedule.len(), 36);
    assert_eq!(schedule.last().unwrap().closing_balance, Decimal::ZERO);
    let amortized: Decimal = schedule.iter().map(|e| e.amortization).sum();
    assert!((amortized - dec!(500000)).abs() < dec!(0.000001));
    // Level payments until the final settlement month
    assert_eq!(
        schedule[0].payment.round_dp(6),
        schedule[20].payment.round_dp(6)
    );
}

#[test]
fn test_consortium_rate_saves_against_bank_rate() {
    let result = rate_economy(dec!(2000), dec!(0.12), dec!(0.02), 120).unwrap();
    assert!(result.traditional_cost > result.consortium_cost);
    assert_eq!(
        result.economy,
        result.traditional_cost - result.consortium_cost
    );
}

// ===========================================================================
// Project flows
// ===========================================================================

#[test]
fn test_self_financed_curve() {
    let flows = self_financed_flows(&project()).unwrap();
    assert_eq!(flows.rows.len(), 24);
    assert_eq!(flows.rows[0].revenue, dec!(3000000));
    // 7,000,000 over 23 months
    assert_eq!(flows.rows[1].revenue.round_dp(2), dec!(304347.83));
    assert!((flows.summary.profit - dec!(3000000)).abs() < dec!(0.000001));
    assert_eq!(flows.summary.margin.round_dp(6), dec!(0.3));
    assert!(flows.summary.total_finance_charges.is_zero());
}

#[test]
fn test_bank_loan_costs_profit() {
    let terms = BankLoanTerms {
        financed_fraction: dec!(0.5),
        annual_rate: dec!(0.12),
        convention: RateConvention::NominalMonthly,
        term_months: None,
    };
    let own = self_financed_flows(&project()).unwrap();
    let bank = bank_financed_flows(&project(), &terms).unwrap();

    assert_eq!(bank.rows[0].financing_inflow, dec!(3500000));
    assert!(bank.summary.total_finance_charges > Decimal::ZERO);
    assert!(
        (own.summary.profit - bank.summary.profit - bank.summary.total_finance_charges).abs()
            < dec!(0.000001)
    );
}

#[test]
fn test_project_request_without_bank() {
    let request = ProjectRequest {
        project: project(),
        bank: None,
    };
    let out = calculate_project_flows(&request).unwrap();
    assert!(out.result.bank_financed.is_none());
    assert_eq!(out.result.self_financed.summary.payback, Payback::Reached(1));
}

#[test]
fn test_project_rejects_single_month_term() {
    let mut single = project();
    single.term_months = 1;
    assert!(self_financed_flows(&single).unwrap_err().is_validation());
}

// ===========================================================================
// Comparator
// ===========================================================================

const REQUEST: &str = r#"{
    "project": {
        "sales_value": "10000000",
        "construction_cost": "7000000",
        "term_months": 24,
        "down_payment_pct": "0.30"
    },
    "bank": {"financed_fraction": "0.5", "annual_rate": "0.12"},
    "consortium": {
        "loan": {
            "principal": "3500000",
            "term_months": 48,
            "fee_rate": "0.012",
            "bid_percentage": "0.25"
        },
        "dropdowns": [{"month": 12, "amount": "500000", "agio_percent": "10"}],
        "strategy": "preserve_payment"
    },
    "discount_rate_monthly": "0.008"
}"#;

#[test]
fn test_comparison_from_request_document() {
    let request: SimulationRequest = serde_json::from_str(REQUEST).unwrap();
    let out = compare_scenarios(&request).unwrap().result;

    assert_eq!(out.scenarios.len(), 3);
    assert!(out.scenarios.iter().all(|s| s.completed().is_some()));

    let consortium = out.scenarios[2].completed().unwrap();
    // Credit released in full, 25% lance paid in cash the same month
    assert_eq!(consortium.rows[0].financing_inflow, dec!(3500000));
    assert!(consortium.rows[0].debt_service >= dec!(875000));
    // Financed 2,625,000 over 48 months keeps the consortium tail past the project
    assert!(consortium.rows.len() > 24);
}

#[test]
fn test_lowest_exposure_ranking_picks_minimum() {
    let request: SimulationRequest = serde_json::from_str(REQUEST).unwrap();
    let out = compare_scenarios(&request).unwrap().result;

    let exposure = |model: FinancingModel| {
        out.scenarios
            .iter()
            .filter_map(ScenarioRun::completed)
            .find(|s| s.result.model == model)
            .map(|s| s.result.metrics.max_exposure)
            .unwrap()
    };
    let best = out.ranking.lowest_exposure.unwrap();
    for model in [
        FinancingModel::SelfFinanced,
        FinancingModel::TraditionalFinancing,
        FinancingModel::Consortium,
    ] {
        assert!(exposure(best) <= exposure(model));
    }
}

#[test]
fn test_comparison_output_serializes_status_tags() {
    let request: SimulationRequest = serde_json::from_str(REQUEST).unwrap();
    let out = compare_scenarios(&request).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["scenarios"][0]["status"], "completed");
    assert_eq!(json["result"]["scenarios"][2]["result"]["model"], "consortium");
}
