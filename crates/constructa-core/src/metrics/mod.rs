//! Discounted-cash-flow metrics over monthly series: NPV, IRR, payback,
//! exposure, and the totals compared between financing scenarios.

pub mod cash_flow;
pub mod scenario;

pub use cash_flow::{
    compute_cash_flow_metrics, cumulative, max_exposure, payback_month, CashFlowMetrics, Payback,
};
pub use scenario::{
    borrower_cash_flows, compute_metrics, economy, FinancingModel, ScenarioResult,
    ScheduleMetrics,
};
