use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use constructa_core::metrics::compute_cash_flow_metrics;

use crate::input;

#[derive(Deserialize)]
struct MetricsRequest {
    cash_flows: Vec<Decimal>,
    #[serde(default)]
    discount_rate: Decimal,
}

/// Arguments for cash flow metrics
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to a document with `cash_flows` and `discount_rate`
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly cash flows from month 0 (comma-separated, e.g. "-1000,300,400,500")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Monthly discount rate
    #[arg(long, default_value = "0")]
    pub discount_rate: Decimal,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match input::load::<MetricsRequest>(args.input.as_deref())? {
        Some(request) => request,
        None => MetricsRequest {
            cash_flows: args
                .cash_flows
                .ok_or("--cash-flows is required (or provide --input)")?,
            discount_rate: args.discount_rate,
        },
    };

    let metrics = compute_cash_flow_metrics(&request.cash_flows, request.discount_rate)?;
    Ok(serde_json::to_value(metrics)?)
}
