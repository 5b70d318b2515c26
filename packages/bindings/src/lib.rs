use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use constructa_core::consortium::{self, DropdownRequest, LoanParameters};
use constructa_core::financing::{self, ProjectRequest, RateConvention};
use constructa_core::market::{self, AdministratorReportInput};
use constructa_core::metrics;
use constructa_core::scenarios::{self, SimulationRequest};
use constructa_core::ScheduleEntry;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: serde::de::DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn render<T: serde::Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Consortium
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = parse(&input_json)?;
    let schedule = consortium::generate_schedule(&params).map_err(to_napi_error)?;
    render(&schedule)
}

#[napi]
pub fn credit_breakdown(input_json: String) -> NapiResult<String> {
    let params: LoanParameters = parse(&input_json)?;
    let output = consortium::credit::credit_breakdown(&params).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn apply_dropdowns(input_json: String) -> NapiResult<String> {
    let request: DropdownRequest = parse(&input_json)?;
    let schedule =
        consortium::apply_dropdowns(&request.loan, &request.dropdowns, request.strategy)
            .map_err(to_napi_error)?;
    render(&schedule)
}

#[napi]
pub fn simulate_dropdowns(input_json: String) -> NapiResult<String> {
    let request: DropdownRequest = parse(&input_json)?;
    let output = consortium::simulate_dropdowns(&request).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CashFlowInput {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    discount_rate: Decimal,
}

#[derive(Deserialize)]
struct ScheduleMetricsInput {
    schedule: Vec<ScheduleEntry>,
    credit_released: Decimal,
    #[serde(default)]
    discount_rate_monthly: Decimal,
}

#[napi]
pub fn cash_flow_metrics(input_json: String) -> NapiResult<String> {
    let input: CashFlowInput = parse(&input_json)?;
    let output = metrics::compute_cash_flow_metrics(&input.cash_flows, input.discount_rate)
        .map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn schedule_metrics(input_json: String) -> NapiResult<String> {
    let input: ScheduleMetricsInput = parse(&input_json)?;
    let output = metrics::compute_metrics(
        &input.schedule,
        input.credit_released,
        input.discount_rate_monthly,
    )
    .map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AnnuityInput {
    principal: Decimal,
    term_months: u32,
    rate_annual: Decimal,
    #[serde(default)]
    correction_index_annual: Decimal,
    #[serde(default)]
    convention: RateConvention,
}

#[derive(Deserialize)]
struct RateEconomyInput {
    monthly_amount: Decimal,
    traditional_rate_annual: Decimal,
    consortium_rate_annual: Decimal,
    term_months: u32,
}

#[napi]
pub fn annuity_payment(input_json: String) -> NapiResult<String> {
    let input: AnnuityInput = parse(&input_json)?;
    let payment = financing::annuity_payment(
        input.principal,
        input.term_months,
        input.rate_annual,
        input.correction_index_annual,
        input.convention,
    )
    .map_err(to_napi_error)?;
    render(&serde_json::json!({ "payment": payment }))
}

#[napi]
pub fn annuity_schedule(input_json: String) -> NapiResult<String> {
    let input: AnnuityInput = parse(&input_json)?;
    let schedule = financing::generate_annuity_schedule(
        input.principal,
        input.term_months,
        input.rate_annual,
        input.correction_index_annual,
        input.convention,
    )
    .map_err(to_napi_error)?;
    render(&schedule)
}

#[napi]
pub fn rate_economy(input_json: String) -> NapiResult<String> {
    let input: RateEconomyInput = parse(&input_json)?;
    let output = financing::rate_economy(
        input.monthly_amount,
        input.traditional_rate_annual,
        input.consortium_rate_annual,
        input.term_months,
    )
    .map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn calculate_project_flows(input_json: String) -> NapiResult<String> {
    let request: ProjectRequest = parse(&input_json)?;
    let output = financing::calculate_project_flows(&request).map_err(to_napi_error)?;
    render(&output)
}

// ---------------------------------------------------------------------------
// Scenarios and market
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_scenarios(input_json: String) -> NapiResult<String> {
    let request: SimulationRequest = parse(&input_json)?;
    let output = scenarios::compare_scenarios(&request).map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn analyze_administrators(input_json: String) -> NapiResult<String> {
    let input: AdministratorReportInput = parse(&input_json)?;
    let output = market::analyze_administrators(&input).map_err(to_napi_error)?;
    render(&output)
}
