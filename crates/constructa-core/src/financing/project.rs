use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ConstructaError;
use crate::financing::annuity::{generate_annuity_schedule, RateConvention};
use crate::metrics::{max_exposure, payback_month, Payback};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ScheduleEntry};
use crate::ConstructaResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A development: sales value collected against a construction cost curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInputs {
    /// Total sales value (VGV)
    pub sales_value: Money,
    pub construction_cost: Money,
    /// Construction and sales period in months
    pub term_months: u32,
    /// Share of sales value received as down payment in month 1 (0.30 = 30%)
    pub down_payment_pct: Rate,
}

/// A bank loan layered on the cost curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankLoanTerms {
    /// Share of construction cost financed (0.50 = 50%)
    pub financed_fraction: Rate,
    pub annual_rate: Rate,
    #[serde(default)]
    pub convention: RateConvention,
    /// Loan term, defaults to the project term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_months: Option<u32>,
}

/// One month of a project cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMonth {
    pub month: u32,
    pub revenue: Money,
    pub construction_cost: Money,
    /// Loan or credit received
    pub financing_inflow: Money,
    /// Installments, lance and dropdowns paid
    pub debt_service: Money,
    /// Interest or fee portion of `debt_service`
    pub finance_charge: Money,
    pub net: Money,
    pub cumulative: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub total_revenue: Money,
    pub total_construction_cost: Money,
    pub total_finance_charges: Money,
    pub profit: Money,
    /// Profit over sales value
    pub margin: Rate,
    pub max_exposure: Money,
    pub payback: Payback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFlows {
    pub rows: Vec<ProjectMonth>,
    pub summary: ProjectSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loan_schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub project: ProjectInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankLoanTerms>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFlowsOutput {
    pub self_financed: ProjectFlows,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_financed: Option<ProjectFlows>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Self-financed and, when bank terms are given, bank-financed cash flows.
pub fn calculate_project_flows(
    request: &ProjectRequest,
) -> ConstructaResult<ComputationOutput<ProjectFlowsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_project(&request.project, &mut warnings)?;

    let self_financed = self_financed_flows(&request.project)?;
    let bank_financed = match &request.bank {
        Some(terms) => Some(bank_financed_flows(&request.project, terms)?),
        None => None,
    };

    if self_financed.summary.profit < Decimal::ZERO {
        warnings.push("Construction cost exceeds sales value, the project loses money".into());
    }

    let output = ProjectFlowsOutput {
        self_financed,
        bank_financed,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Real-estate development cash flow (down payment plus instalments against linear cost)",
        request,
        warnings,
        elapsed,
        output,
    ))
}

/// Down payment in month 1, the balance of sales value over months 2..n,
/// construction cost spread evenly over n months.
pub fn self_financed_flows(project: &ProjectInputs) -> ConstructaResult<ProjectFlows> {
    validate_project(project, &mut Vec::new())?;
    let rows = base_rows(project, project.term_months);
    Ok(finish(project, rows, Vec::new()))
}

/// Self-financed curve plus a bank loan of `financed_fraction` of cost,
/// received in month 1 and serviced by level payments from month 1.
pub fn bank_financed_flows(
    project: &ProjectInputs,
    terms: &BankLoanTerms,
) -> ConstructaResult<ProjectFlows> {
    validate_project(project, &mut Vec::new())?;
    if terms.financed_fraction < Decimal::ZERO || terms.financed_fraction > Decimal::ONE {
        return Err(ConstructaError::invalid(
            "financed_fraction",
            "Financed fraction must be between 0 and 1",
        ));
    }

    let financed = project.construction_cost * terms.financed_fraction;
    if financed.is_zero() {
        return self_financed_flows(project);
    }
    let loan_term = terms.term_months.unwrap_or(project.term_months);
    let schedule = generate_annuity_schedule(
        financed,
        loan_term,
        terms.annual_rate,
        Decimal::ZERO,
        terms.convention,
    )?;

    with_financing(project, financed, Decimal::ZERO, schedule)
}

// ---------------------------------------------------------------------------
// Shared with the scenario comparator
// ---------------------------------------------------------------------------

/// Layer a financing schedule on the project curve. `inflow` lands in month
/// 1, `upfront` is paid in month 1, schedule month m maps to project month m.
pub(crate) fn with_financing(
    project: &ProjectInputs,
    inflow: Money,
    upfront: Money,
    schedule: Vec<ScheduleEntry>,
) -> ConstructaResult<ProjectFlows> {
    validate_project(project, &mut Vec::new())?;
    let horizon = schedule
        .last()
        .map(|e| e.month)
        .unwrap_or(0)
        .max(project.term_months);
    let mut rows = base_rows(project, horizon);

    if let Some(first) = rows.first_mut() {
        first.financing_inflow = inflow;
        first.debt_service = upfront;
    }
    for entry in &schedule {
        let row = &mut rows[(entry.month - 1) as usize];
        row.debt_service += entry.payment + entry.dropdown_paid;
        row.finance_charge += entry.finance_charge;
    }

    Ok(finish(project, rows, schedule))
}

/// Net flows indexed by month with nothing at month 0.
pub(crate) fn cash_flows(rows: &[ProjectMonth]) -> Vec<Money> {
    std::iter::once(Decimal::ZERO)
        .chain(rows.iter().map(|r| r.net))
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_project(project: &ProjectInputs, warnings: &mut Vec<String>) -> ConstructaResult<()> {
    if project.sales_value <= Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "sales_value",
            "Sales value must be positive",
        ));
    }
    if project.construction_cost < Decimal::ZERO {
        return Err(ConstructaError::invalid(
            "construction_cost",
            "Construction cost cannot be negative",
        ));
    }
    if project.term_months < 2 {
        return Err(ConstructaError::invalid(
            "term_months",
            "Project term must be at least 2 months",
        ));
    }
    if project.down_payment_pct < Decimal::ZERO || project.down_payment_pct > Decimal::ONE {
        return Err(ConstructaError::invalid(
            "down_payment_pct",
            "Down payment must be between 0 and 1",
        ));
    }

    let cost_ratio = project.construction_cost / project.sales_value;
    if cost_ratio < dec!(0.5) || cost_ratio > dec!(0.9) {
        warnings.push(format!(
            "Construction cost is {:.1}% of sales value, outside the usual 50-90% range",
            cost_ratio * dec!(100)
        ));
    }
    Ok(())
}

fn base_rows(project: &ProjectInputs, horizon: u32) -> Vec<ProjectMonth> {
    let n = project.term_months;
    let down_payment = project.sales_value * project.down_payment_pct;
    let instalment =
        (project.sales_value - down_payment) / Decimal::from(n - 1);
    let monthly_cost = project.construction_cost / Decimal::from(n);

    (1..=horizon)
        .map(|month| {
            let revenue = match month {
                1 => down_payment,
                m if m <= n => instalment,
                _ => Decimal::ZERO,
            };
            ProjectMonth {
                month,
                revenue,
                construction_cost: if month <= n { monthly_cost } else { Decimal::ZERO },
                financing_inflow: Decimal::ZERO,
                debt_service: Decimal::ZERO,
                finance_charge: Decimal::ZERO,
                net: Decimal::ZERO,
                cumulative: Decimal::ZERO,
            }
        })
        .collect()
}

fn finish(
    project: &ProjectInputs,
    mut rows: Vec<ProjectMonth>,
    loan_schedule: Vec<ScheduleEntry>,
) -> ProjectFlows {
    let mut running = Decimal::ZERO;
    for row in rows.iter_mut() {
        row.net = row.revenue + row.financing_inflow - row.construction_cost - row.debt_service;
        running += row.net;
        row.cumulative = running;
    }

    let flows = cash_flows(&rows);
    let profit = running;
    let summary = ProjectSummary {
        total_revenue: rows.iter().map(|r| r.revenue).sum(),
        total_construction_cost: rows.iter().map(|r| r.construction_cost).sum(),
        total_finance_charges: rows.iter().map(|r| r.finance_charge).sum(),
        profit,
        margin: profit / project.sales_value,
        max_exposure: max_exposure(&flows),
        payback: payback_month(&flows),
    };

    ProjectFlows {
        rows,
        summary,
        loan_schedule,
    }
}
