use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::metrics::cash_flow::{compute_cash_flow_metrics, Payback};
use crate::time_value::Irr;
use crate::types::{Money, Rate, ScheduleEntry};
use crate::ConstructaResult;

/// Financing model a scenario was run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingModel {
    SelfFinanced,
    TraditionalFinancing,
    Consortium,
}

/// Scalar summary of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    pub npv: Money,
    pub irr: Irr,
    /// First month the running total is non-negative. Borrower flows open
    /// with the released credit at month 0, so a consortium contract seen
    /// from the member is always `Reached(0)`; project flows start at zero
    /// and carry the real payback.
    pub payback: Payback,
    /// Scheduled installments paid, dropdowns excluded
    pub total_paid: Money,
    /// Fee or interest portion of `total_paid`
    pub total_finance_charges: Money,
    /// Nominal dropdown amounts paid in
    pub dropdown_injected: Money,
    pub final_balance: Money,
    pub max_exposure: Money,
}

/// A model's full schedule, its signed cash flows and derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub model: FinancingModel,
    pub schedule: Vec<ScheduleEntry>,
    /// Net flow per month, index 0 = signing
    pub cash_flows: Vec<Money>,
    pub metrics: ScheduleMetrics,
}

impl ScenarioResult {
    /// Assemble a result, deriving metrics from `cash_flows` and the totals
    /// from `schedule`.
    pub fn assemble(
        model: FinancingModel,
        schedule: Vec<ScheduleEntry>,
        cash_flows: Vec<Money>,
        discount_rate: Rate,
    ) -> ConstructaResult<Self> {
        let metrics = summarize(&schedule, &cash_flows, discount_rate)?;
        Ok(ScenarioResult {
            model,
            schedule,
            cash_flows,
            metrics,
        })
    }

    /// Closing balance at `month`, zero once the schedule has ended.
    pub fn balance_at(&self, month: u32) -> Money {
        self.schedule
            .iter()
            .find(|e| e.month == month)
            .map(|e| e.closing_balance)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Borrower view of a schedule: `released` at month 0, then each month's
/// installment and dropdown as outflows. The series starts positive, so its
/// payback is month 0 whenever `released` is positive.
pub fn borrower_cash_flows(released: Money, schedule: &[ScheduleEntry]) -> Vec<Money> {
    let last_month = schedule.last().map(|e| e.month).unwrap_or(0) as usize;
    let mut flows = vec![Decimal::ZERO; last_month + 1];
    flows[0] = released;
    for entry in schedule {
        flows[entry.month as usize] -= entry.payment + entry.dropdown_paid;
    }
    flows
}

/// Metrics of a schedule seen by the borrower who received `released` at signing.
pub fn compute_metrics(
    schedule: &[ScheduleEntry],
    released: Money,
    discount_rate_monthly: Rate,
) -> ConstructaResult<ScheduleMetrics> {
    let flows = borrower_cash_flows(released, schedule);
    summarize(schedule, &flows, discount_rate_monthly)
}

/// Savings of `scenario` against `baseline` after paying for its dropdowns.
pub fn economy(baseline: &ScheduleMetrics, scenario: &ScheduleMetrics) -> Money {
    baseline.total_paid - scenario.total_paid - scenario.dropdown_injected
}

fn summarize(
    schedule: &[ScheduleEntry],
    flows: &[Money],
    discount_rate: Rate,
) -> ConstructaResult<ScheduleMetrics> {
    let cf = compute_cash_flow_metrics(flows, discount_rate)?;
    Ok(ScheduleMetrics {
        npv: cf.npv,
        irr: cf.irr,
        payback: cf.payback,
        total_paid: schedule.iter().map(|e| e.payment).sum(),
        total_finance_charges: schedule.iter().map(|e| e.finance_charge).sum(),
        dropdown_injected: schedule.iter().map(|e| e.dropdown_paid).sum(),
        final_balance: schedule
            .last()
            .map(|e| e.closing_balance)
            .unwrap_or(Decimal::ZERO),
        max_exposure: cf.max_exposure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(month: u32, payment: Money, dropdown_paid: Money, closing: Money) -> ScheduleEntry {
        ScheduleEntry {
            month,
            due_date: None,
            opening_balance: closing + payment,
            correction: Decimal::ZERO,
            amortization: payment,
            finance_charge: Decimal::ZERO,
            payment,
            dropdown_paid,
            dropdown_reduction: dropdown_paid,
            closing_balance: closing,
            cumulative_paid: Decimal::ZERO,
        }
    }

    #[test]
    fn test_borrower_flows_include_dropdowns() {
        let schedule = vec![
            entry(1, dec!(100), Decimal::ZERO, dec!(200)),
            entry(2, dec!(100), dec!(50), dec!(50)),
            entry(3, dec!(50), Decimal::ZERO, Decimal::ZERO),
        ];
        let flows = borrower_cash_flows(dec!(300), &schedule);
        assert_eq!(flows, vec![dec!(300), dec!(-100), dec!(-150), dec!(-50)]);

        let metrics = compute_metrics(&schedule, dec!(300), Decimal::ZERO).unwrap();
        assert_eq!(metrics.total_paid, dec!(250));
        assert_eq!(metrics.dropdown_injected, dec!(50));
        assert_eq!(metrics.final_balance, Decimal::ZERO);
        assert_eq!(metrics.npv, Decimal::ZERO);
    }

    #[test]
    fn test_economy_nets_dropdowns() {
        let base = compute_metrics(
            &[entry(1, dec!(1000), Decimal::ZERO, Decimal::ZERO)],
            dec!(1000),
            Decimal::ZERO,
        )
        .unwrap();
        let with = compute_metrics(
            &[entry(1, dec!(700), dec!(200), Decimal::ZERO)],
            dec!(1000),
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(economy(&base, &with), dec!(100));
    }

    #[test]
    fn test_borrower_view_pays_back_at_signing() {
        let schedule = vec![
            entry(1, dec!(600), Decimal::ZERO, dec!(600)),
            entry(2, dec!(600), Decimal::ZERO, Decimal::ZERO),
        ];
        let metrics = compute_metrics(&schedule, dec!(1200), Decimal::ZERO).unwrap();
        assert_eq!(metrics.payback, Payback::Reached(0));
        assert_eq!(metrics.max_exposure, Decimal::ZERO);
    }
}
