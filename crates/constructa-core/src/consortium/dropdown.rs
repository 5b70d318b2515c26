use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::consortium::params::{DropdownEvent, LoanParameters, RecalculationStrategy};
use crate::consortium::schedule::run_schedule;
use crate::consortium::validation::validate;
use crate::metrics::{borrower_cash_flows, economy, FinancingModel, ScenarioResult};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ScheduleEntry};
use crate::ConstructaResult;

/// Agio above this is legal but unusual for credit-letter resale.
const HIGH_AGIO_PERCENT: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One simulation run: a contract, its dropdowns and how to discount flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownRequest {
    pub loan: LoanParameters,
    #[serde(default)]
    pub dropdowns: Vec<DropdownEvent>,
    #[serde(default)]
    pub strategy: RecalculationStrategy,
    /// Monthly discount rate for NPV
    #[serde(default)]
    pub discount_rate_monthly: Rate,
}

/// Balance of both schedules at the end of one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub month: u32,
    pub baseline: Money,
    pub with_dropdowns: Money,
    pub reduction: Money,
}

/// Baseline schedule against the schedule with dropdowns applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropdownComparison {
    pub baseline: ScenarioResult,
    pub with_dropdowns: ScenarioResult,
    /// Baseline paid minus dropdown scenario paid minus dropdowns injected
    pub economy: Money,
    /// Sum of balance reductions, agio included
    pub total_balance_reduction: Money,
    /// Reduction obtained beyond the nominal amounts paid in
    pub agio_gain: Money,
    /// Installments the dropdowns removed from the contract
    pub months_saved: u32,
    pub balance_path: Vec<BalanceDelta>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply `events` to the contract and return the modified schedule.
///
/// Events are processed in month order regardless of input order. A
/// dropdown whose nominal amount exceeds the balance left after that
/// month's installment is rejected rather than clamped.
pub fn apply_dropdowns(
    params: &LoanParameters,
    events: &[DropdownEvent],
    strategy: RecalculationStrategy,
) -> ConstructaResult<Vec<ScheduleEntry>> {
    let loan = validate(params, events)?;
    Ok(run_schedule(&loan, strategy)?.entries)
}

/// Run the contract with and without its dropdowns and compare the pair.
pub fn simulate_dropdowns(
    request: &DropdownRequest,
) -> ConstructaResult<ComputationOutput<DropdownComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan = validate(&request.loan, &request.dropdowns)?;
    let baseline_loan = validate(&request.loan, &[])?;

    for event in &loan.events {
        if event.agio_percent > HIGH_AGIO_PERCENT {
            warnings.push(format!(
                "Agio of {}% at month {} is above {}%, verify the resale price",
                event.agio_percent, event.month, HIGH_AGIO_PERCENT
            ));
        }
    }

    let baseline_run = run_schedule(&baseline_loan, request.strategy)?;
    let dropdown_run = run_schedule(&loan, request.strategy)?;

    for (label, run) in [("baseline", &baseline_run), ("dropdown", &dropdown_run)] {
        if let Some(month) = run.floor_settled_at {
            warnings.push(format!(
                "The {label} schedule was settled at month {month} because the installment fell below {}",
                request.loan.min_payment
            ));
        }
    }

    // Member receives the released credit and pays the cash lance at signing.
    let released = request.loan.credit_released() - request.loan.cash_lance();
    let rate = request.discount_rate_monthly;

    let baseline_flows = borrower_cash_flows(released, &baseline_run.entries);
    let baseline = ScenarioResult::assemble(
        FinancingModel::Consortium,
        baseline_run.entries,
        baseline_flows,
        rate,
    )?;
    let dropdown_flows = borrower_cash_flows(released, &dropdown_run.entries);
    let with_dropdowns = ScenarioResult::assemble(
        FinancingModel::Consortium,
        dropdown_run.entries,
        dropdown_flows,
        rate,
    )?;

    let total_balance_reduction: Money = with_dropdowns
        .schedule
        .iter()
        .map(|e| e.dropdown_reduction)
        .sum();
    let agio_gain = total_balance_reduction - with_dropdowns.metrics.dropdown_injected;
    let months_saved = (baseline.schedule.len() as u32)
        .saturating_sub(with_dropdowns.schedule.len() as u32);

    let balance_path = baseline
        .schedule
        .iter()
        .map(|b| {
            let with = with_dropdowns.balance_at(b.month);
            BalanceDelta {
                month: b.month,
                baseline: b.closing_balance,
                with_dropdowns: with,
                reduction: b.closing_balance - with,
            }
        })
        .collect();

    let output = DropdownComparison {
        economy: economy(&baseline.metrics, &with_dropdowns.metrics),
        baseline,
        with_dropdowns,
        total_balance_reduction,
        agio_gain,
        months_saved,
        balance_path,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Consortium linear amortization with dropdown prepayments",
        request,
        warnings,
        elapsed,
        output,
    ))
}
