use clap::Args;
use serde_json::Value;

use constructa_core::market::{analyze_administrators, AdministratorReportInput, SegmentReport};

use crate::input;

/// Arguments for administrator health ratios
#[derive(Args)]
pub struct AdministratorsArgs {
    /// Segment reports: a CSV file with one report per row (headers named
    /// after the report fields), or a JSON/YAML document with `reports`
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_administrators(args: AdministratorsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let report_input = match args.input.as_deref() {
        Some(path) if input::file::has_extension(path, "csv") => AdministratorReportInput {
            reports: input::file::read_csv::<SegmentReport>(path)?,
        },
        path => input::require(path, "administrators")?,
    };

    let result = analyze_administrators(&report_input)?;
    Ok(serde_json::to_value(result)?)
}
