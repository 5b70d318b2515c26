use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::consortium::{apply_dropdowns, DropdownEvent, LoanParameters, RecalculationStrategy};
use crate::error::ConstructaError;
use crate::financing::project::{cash_flows, with_financing};
use crate::financing::{
    bank_financed_flows, self_financed_flows, BankLoanTerms, ProjectFlows, ProjectInputs,
    ProjectMonth, ProjectSummary,
};
use crate::metrics::{FinancingModel, ScenarioResult};
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::ConstructaResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Consortium quota used to fund the development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsortiumTerms {
    pub loan: LoanParameters,
    #[serde(default)]
    pub dropdowns: Vec<DropdownEvent>,
    #[serde(default)]
    pub strategy: RecalculationStrategy,
}

/// Everything a comparison needs, supplied once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub project: ProjectInputs,
    pub bank: BankLoanTerms,
    pub consortium: ConsortiumTerms,
    /// Monthly discount rate for NPV
    #[serde(default)]
    pub discount_rate_monthly: Rate,
}

/// A completed model run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectScenario {
    pub result: ScenarioResult,
    pub rows: Vec<ProjectMonth>,
    pub summary: ProjectSummary,
}

/// Outcome of one model. A failure is contained to its own model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioRun {
    Completed(Box<ProjectScenario>),
    Failed {
        model: FinancingModel,
        error: String,
        /// True when the contract terms were the problem rather than the input shape
        domain: bool,
    },
}

impl ScenarioRun {
    pub fn model(&self) -> FinancingModel {
        match self {
            ScenarioRun::Completed(s) => s.result.model,
            ScenarioRun::Failed { model, .. } => *model,
        }
    }

    pub fn completed(&self) -> Option<&ProjectScenario> {
        match self {
            ScenarioRun::Completed(s) => Some(s),
            ScenarioRun::Failed { .. } => None,
        }
    }
}

/// Best model per metric among the completed runs. Ties go to the model
/// listed first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub highest_npv: Option<FinancingModel>,
    pub lowest_exposure: Option<FinancingModel>,
    pub soonest_payback: Option<FinancingModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenarios: Vec<ScenarioRun>,
    pub ranking: Ranking,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every financing model and rank the ones that completed.
pub fn compare_scenarios(
    request: &SimulationRequest,
) -> ConstructaResult<ComputationOutput<ScenarioComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if request.discount_rate_monthly <= dec!(-1) {
        return Err(ConstructaError::invalid(
            "discount_rate_monthly",
            "Discount rate must be greater than -100%",
        ));
    }

    let runs: [(FinancingModel, ConstructaResult<ProjectScenario>); 3] = [
        (FinancingModel::SelfFinanced, run_self_financed(request)),
        (
            FinancingModel::TraditionalFinancing,
            run_traditional(request),
        ),
        (FinancingModel::Consortium, run_consortium(request)),
    ];

    let scenarios: Vec<ScenarioRun> = runs
        .into_iter()
        .map(|(model, outcome)| match outcome {
            Ok(scenario) => ScenarioRun::Completed(Box::new(scenario)),
            Err(e) => {
                log::warn!("{model:?} scenario failed: {e}");
                warnings.push(format!("{model:?} scenario failed: {e}"));
                ScenarioRun::Failed {
                    model,
                    error: e.to_string(),
                    domain: e.is_domain(),
                }
            }
        })
        .collect();

    let ranking = rank(&scenarios);
    let output = ScenarioComparison { scenarios, ranking };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Self-financed vs bank annuity vs consortium development cash flows",
        request,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

fn run_self_financed(request: &SimulationRequest) -> ConstructaResult<ProjectScenario> {
    let flows = self_financed_flows(&request.project)?;
    finish(FinancingModel::SelfFinanced, flows, request.discount_rate_monthly)
}

fn run_traditional(request: &SimulationRequest) -> ConstructaResult<ProjectScenario> {
    let flows = bank_financed_flows(&request.project, &request.bank)?;
    finish(
        FinancingModel::TraditionalFinancing,
        flows,
        request.discount_rate_monthly,
    )
}

/// Credit released in month 1 net of an embedded lance, cash lance paid in
/// month 1, installments and dropdowns from the consortium schedule.
fn run_consortium(request: &SimulationRequest) -> ConstructaResult<ProjectScenario> {
    let terms = &request.consortium;
    let schedule = apply_dropdowns(&terms.loan, &terms.dropdowns, terms.strategy)?;
    let flows = with_financing(
        &request.project,
        terms.loan.credit_released(),
        terms.loan.cash_lance(),
        schedule,
    )?;
    finish(
        FinancingModel::Consortium,
        flows,
        request.discount_rate_monthly,
    )
}

fn finish(
    model: FinancingModel,
    flows: ProjectFlows,
    discount_rate: Rate,
) -> ConstructaResult<ProjectScenario> {
    let result = ScenarioResult::assemble(
        model,
        flows.loan_schedule,
        cash_flows(&flows.rows),
        discount_rate,
    )?;
    Ok(ProjectScenario {
        result,
        rows: flows.rows,
        summary: flows.summary,
    })
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

fn rank(scenarios: &[ScenarioRun]) -> Ranking {
    let completed: Vec<&ProjectScenario> =
        scenarios.iter().filter_map(|s| s.completed()).collect();

    let highest_npv = best_by(&completed, |a, b| a.result.metrics.npv > b.result.metrics.npv);
    let lowest_exposure = best_by(&completed, |a, b| {
        a.result.metrics.max_exposure < b.result.metrics.max_exposure
    });
    let soonest_payback = best_by(&completed, |a, b| {
        match (a.result.metrics.payback.month(), b.result.metrics.payback.month()) {
            (Some(x), Some(y)) => x < y,
            (Some(_), None) => true,
            _ => false,
        }
    });

    // A model that never pays back cannot be the soonest.
    let soonest_payback = soonest_payback.filter(|model| {
        completed
            .iter()
            .any(|s| s.result.model == *model && s.result.metrics.payback.month().is_some())
    });

    Ranking {
        highest_npv,
        lowest_exposure,
        soonest_payback,
    }
}

/// First scenario not beaten by any later one under `better`.
fn best_by(
    scenarios: &[&ProjectScenario],
    better: impl Fn(&ProjectScenario, &ProjectScenario) -> bool,
) -> Option<FinancingModel> {
    let mut best: Option<&ProjectScenario> = None;
    for &candidate in scenarios {
        best = match best {
            Some(current) if !better(candidate, current) => Some(current),
            _ => Some(candidate),
        };
    }
    best.map(|s| s.result.model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::financing::RateConvention;
    use rust_decimal::Decimal;

    fn request() -> SimulationRequest {
        SimulationRequest {
            project: ProjectInputs {
                sales_value: dec!(35000000),
                construction_cost: dec!(24500000),
                term_months: 48,
                down_payment_pct: dec!(0.10),
            },
            bank: BankLoanTerms {
                financed_fraction: dec!(0.5),
                annual_rate: dec!(0.12),
                convention: RateConvention::EffectiveAnnual,
                term_months: None,
            },
            consortium: ConsortiumTerms {
                loan: LoanParameters::new(dec!(12250000), 60, dec!(0.012), Decimal::ZERO)
                    .with_bid(dec!(0.20)),
                dropdowns: vec![DropdownEvent::new(24, dec!(1000000), dec!(20))],
                strategy: RecalculationStrategy::PreserveTerm,
            },
            discount_rate_monthly: dec!(0.01),
        }
    }

    #[test]
    fn test_all_models_complete() {
        let out = compare_scenarios(&request()).unwrap();
        let models: Vec<FinancingModel> = out.result.scenarios.iter().map(|s| s.model()).collect();
        assert_eq!(
            models,
            vec![
                FinancingModel::SelfFinanced,
                FinancingModel::TraditionalFinancing,
                FinancingModel::Consortium,
            ]
        );
        assert!(out.result.scenarios.iter().all(|s| s.completed().is_some()));
        assert!(out.warnings.is_empty());
        assert!(out.result.ranking.highest_npv.is_some());
    }

    #[test]
    fn test_consortium_failure_does_not_block_others() {
        let mut req = request();
        req.consortium.dropdowns = vec![DropdownEvent::new(24, dec!(50000000), Decimal::ZERO)];
        let out = compare_scenarios(&req).unwrap();

        match &out.result.scenarios[2] {
            ScenarioRun::Failed { model, domain, .. } => {
                assert_eq!(*model, FinancingModel::Consortium);
                assert!(*domain);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(out.result.scenarios[0].completed().is_some());
        assert!(out.result.scenarios[1].completed().is_some());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_consortium_flows_carry_lance_and_credit() {
        let out = compare_scenarios(&request()).unwrap();
        let consortium = out.result.scenarios[2].completed().unwrap();
        let month1 = &consortium.rows[0];

        assert_eq!(month1.financing_inflow, dec!(12250000));
        // Cash lance 20% plus first installment
        assert!(month1.debt_service > dec!(2450000));
        assert_eq!(consortium.rows.len(), 60);
        assert_eq!(consortium.result.metrics.dropdown_injected, dec!(1000000));
    }

    #[test]
    fn test_rejects_discount_rate_at_minus_one() {
        let mut req = request();
        req.discount_rate_monthly = dec!(-1);
        assert!(compare_scenarios(&req).unwrap_err().is_validation());
    }

    #[test]
    fn test_bank_failure_is_contained() {
        let mut req = request();
        req.bank.financed_fraction = dec!(1.5);
        let out = compare_scenarios(&req).unwrap();
        match &out.result.scenarios[1] {
            ScenarioRun::Failed { domain, .. } => assert!(!*domain),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(out.result.ranking.highest_npv.is_some());
    }

    fn assert_all_failed_validation(req: &SimulationRequest) {
        let out = compare_scenarios(req).unwrap();
        assert_eq!(out.result.scenarios.len(), 3);
        for run in &out.result.scenarios {
            match run {
                ScenarioRun::Failed { domain, .. } => assert!(!*domain),
                other => panic!("expected failure, got {other:?}"),
            }
        }
        assert_eq!(out.warnings.len(), 3);
        assert_eq!(out.result.ranking, Ranking::default());
    }

    #[test]
    fn test_single_month_project_fails_every_model() {
        let mut req = request();
        req.project.term_months = 1;
        assert_all_failed_validation(&req);
    }

    #[test]
    fn test_zero_term_project_fails_every_model() {
        let mut req = request();
        req.project.term_months = 0;
        assert_all_failed_validation(&req);
    }

    #[test]
    fn test_zero_sales_project_fails_every_model() {
        let mut req = request();
        req.project.sales_value = Decimal::ZERO;
        assert_all_failed_validation(&req);
    }
}
