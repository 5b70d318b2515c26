use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use constructa_core::consortium::credit::credit_breakdown;
use constructa_core::consortium::{
    generate_schedule, simulate_dropdowns, DropdownEvent, DropdownRequest, FeeBasis,
    LoanParameters, RecalculationStrategy,
};

use crate::commands::parse_event;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FeeBasisArg {
    Annual,
    Monthly,
}

impl From<FeeBasisArg> for FeeBasis {
    fn from(arg: FeeBasisArg) -> Self {
        match arg {
            FeeBasisArg::Annual => FeeBasis::Annual,
            FeeBasisArg::Monthly => FeeBasis::Monthly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Keep the end month, lower the quota
    PreserveTerm,
    /// Keep the quota, finish earlier
    PreservePayment,
}

impl From<StrategyArg> for RecalculationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::PreserveTerm => RecalculationStrategy::PreserveTerm,
            StrategyArg::PreservePayment => RecalculationStrategy::PreservePayment,
        }
    }
}

/// Contract terms given as flags
#[derive(Args)]
pub struct LoanFlags {
    /// Credit letter value
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Administration fee rate (0.12 = 12%)
    #[arg(long)]
    pub fee_rate: Option<Decimal>,

    /// Whether --fee-rate is annual or already monthly
    #[arg(long, value_enum, default_value = "annual")]
    pub fee_basis: FeeBasisArg,

    /// Annual correction index (0.045 = 4.5%)
    #[arg(long, default_value = "0")]
    pub correction_index: Decimal,

    /// Cash bid as a fraction of the credit
    #[arg(long)]
    pub bid: Option<Decimal>,

    /// Embedded bid as a fraction of the credit
    #[arg(long)]
    pub embedded_bid: Option<Decimal>,

    /// Installment floor below which the balance is settled
    #[arg(long)]
    pub min_payment: Option<Decimal>,

    /// First due date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl LoanFlags {
    fn into_params(self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let term = self.term.ok_or("--term is required (or provide --input)")?;
        let fee_rate = self
            .fee_rate
            .ok_or("--fee-rate is required (or provide --input)")?;

        let mut params = LoanParameters::new(principal, term, fee_rate, self.correction_index);
        params.fee_basis = self.fee_basis.into();
        params.bid_percentage = self.bid;
        params.embedded_bid_percentage = self.embedded_bid;
        if let Some(floor) = self.min_payment {
            params.min_payment = floor;
        }
        params.start_date = self.start_date;
        Ok(params)
    }
}

/// Arguments for the baseline schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a contract document (JSON or YAML, overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = load_params(args.input.as_deref(), args.loan)?;
    let schedule = generate_schedule(&params)?;
    Ok(serde_json::to_value(schedule)?)
}

pub fn run_credit(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = load_params(args.input.as_deref(), args.loan)?;
    Ok(serde_json::to_value(credit_breakdown(&params)?)?)
}

/// Arguments for a dropdown simulation
#[derive(Args)]
pub struct DropdownArgs {
    /// Path to a dropdown request document (JSON or YAML, overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Dropdown as MONTH:AMOUNT[:AGIO_PERCENT], repeatable
    #[arg(long = "event", value_name = "SPEC")]
    pub events: Vec<String>,

    /// How the quota is recalculated after a dropdown
    #[arg(long, value_enum, default_value = "preserve-term")]
    pub strategy: StrategyArg,

    /// Monthly discount rate for NPV
    #[arg(long, default_value = "0")]
    pub discount_rate: Decimal,
}

pub fn run_dropdown(args: DropdownArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: DropdownRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let dropdowns = args
                .events
                .iter()
                .map(|raw| {
                    parse_event(raw)
                        .map(|(month, amount, agio)| DropdownEvent::new(month, amount, agio))
                })
                .collect::<Result<Vec<_>, _>>()?;
            DropdownRequest {
                loan: args.loan.into_params()?,
                dropdowns,
                strategy: args.strategy.into(),
                discount_rate_monthly: args.discount_rate,
            }
        }
    };

    let result = simulate_dropdowns(&request)?;
    Ok(serde_json::to_value(result)?)
}

fn load_params(
    path: Option<&str>,
    flags: LoanFlags,
) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    match input::load(path)? {
        Some(params) => Ok(params),
        None => flags.into_params(),
    }
}
