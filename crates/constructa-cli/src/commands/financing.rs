use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use constructa_core::financing::{
    annuity_payment, calculate_project_flows, generate_annuity_schedule, rate_economy,
    BankLoanTerms, ProjectInputs, ProjectRequest, RateConvention,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConventionArg {
    /// (1 + annual)^(1/12) - 1
    EffectiveAnnual,
    /// annual / 12
    NominalMonthly,
}

impl From<ConventionArg> for RateConvention {
    fn from(arg: ConventionArg) -> Self {
        match arg {
            ConventionArg::EffectiveAnnual => RateConvention::EffectiveAnnual,
            ConventionArg::NominalMonthly => RateConvention::NominalMonthly,
        }
    }
}

/// Arguments for a bank annuity
#[derive(Args)]
pub struct AnnuityArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Decimal,

    /// Term in months
    #[arg(long)]
    pub term: u32,

    /// Annual interest rate (0.12 = 12%)
    #[arg(long)]
    pub rate: Decimal,

    /// Annual correction index compounded with the rate
    #[arg(long, default_value = "0")]
    pub correction_index: Decimal,

    /// How the annual rate becomes monthly
    #[arg(long, value_enum, default_value = "effective-annual")]
    pub convention: ConventionArg,

    /// Include the month-by-month schedule
    #[arg(long)]
    pub schedule: bool,
}

pub fn run_annuity(args: AnnuityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let convention: RateConvention = args.convention.into();
    let payment = annuity_payment(
        args.principal,
        args.term,
        args.rate,
        args.correction_index,
        convention,
    )?;

    if !args.schedule {
        return Ok(json!({ "payment": payment }));
    }
    let schedule = generate_annuity_schedule(
        args.principal,
        args.term,
        args.rate,
        args.correction_index,
        convention,
    )?;
    Ok(json!({ "payment": payment, "schedule": schedule }))
}

/// Arguments for the traditional vs consortium rate comparison
#[derive(Args)]
pub struct RateEconomyArgs {
    /// Level monthly contribution
    #[arg(long)]
    pub monthly_amount: Decimal,

    /// Effective annual rate of the traditional loan
    #[arg(long)]
    pub traditional_rate: Decimal,

    /// Effective annual cost of the consortium
    #[arg(long)]
    pub consortium_rate: Decimal,

    /// Term in months
    #[arg(long)]
    pub term: u32,
}

pub fn run_rate_economy(args: RateEconomyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = rate_economy(
        args.monthly_amount,
        args.traditional_rate,
        args.consortium_rate,
        args.term,
    )?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for development cash flows
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a project request document (JSON or YAML, overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total sales value
    #[arg(long)]
    pub sales_value: Option<Decimal>,

    /// Total construction cost
    #[arg(long)]
    pub construction_cost: Option<Decimal>,

    /// Construction and sales period in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Down payment as a fraction of sales value
    #[arg(long, default_value = "0.30")]
    pub down_payment: Decimal,

    /// Share of construction cost financed by the bank
    #[arg(long)]
    pub financed_fraction: Option<Decimal>,

    /// Annual bank rate, required with --financed-fraction
    #[arg(long)]
    pub bank_rate: Option<Decimal>,

    #[arg(long, value_enum, default_value = "effective-annual")]
    pub convention: ConventionArg,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ProjectRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let project = ProjectInputs {
                sales_value: args
                    .sales_value
                    .ok_or("--sales-value is required (or provide --input)")?,
                construction_cost: args
                    .construction_cost
                    .ok_or("--construction-cost is required (or provide --input)")?,
                term_months: args.term.ok_or("--term is required (or provide --input)")?,
                down_payment_pct: args.down_payment,
            };
            let bank = match args.financed_fraction {
                Some(financed_fraction) => Some(BankLoanTerms {
                    financed_fraction,
                    annual_rate: args
                        .bank_rate
                        .ok_or("--bank-rate is required with --financed-fraction")?,
                    convention: args.convention.into(),
                    term_months: None,
                }),
                None => None,
            };
            ProjectRequest { project, bank }
        }
    };

    let result = calculate_project_flows(&request)?;
    Ok(serde_json::to_value(result)?)
}
