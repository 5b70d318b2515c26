use clap::Args;
use serde_json::Value;

use constructa_core::scenarios::{compare_scenarios, SimulationRequest};

use crate::input;

/// Arguments for the financing comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a simulation request (JSON or YAML) with project, bank and
    /// consortium sections
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SimulationRequest = input::require(args.input.as_deref(), "compare")?;
    let result = compare_scenarios(&request)?;
    Ok(serde_json::to_value(result)?)
}
