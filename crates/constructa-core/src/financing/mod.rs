//! Bank financing with level (annuity) payments and the project cash flow
//! curves of a real-estate development, with and without a bank loan.

pub mod annuity;
pub mod project;

pub use annuity::{annuity_payment, generate_annuity_schedule, rate_economy, RateConvention};
pub use project::{
    bank_financed_flows, calculate_project_flows, self_financed_flows, BankLoanTerms,
    ProjectFlows, ProjectFlowsOutput, ProjectInputs, ProjectMonth, ProjectRequest, ProjectSummary,
};
