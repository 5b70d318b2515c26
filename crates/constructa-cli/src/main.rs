mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::consortium::{DropdownArgs, ScheduleArgs};
use commands::financing::{AnnuityArgs, ProjectArgs, RateEconomyArgs};
use commands::market::AdministratorsArgs;
use commands::metrics::MetricsArgs;
use commands::scenarios::CompareArgs;

/// Consortium, dropdown and development financing simulations
#[derive(Parser)]
#[command(
    name = "constructa",
    version,
    about = "Consortium, dropdown and development financing simulations",
    long_about = "Simulates consortium contracts with annual correction and dropdown \
                  prepayments, bank annuities, and real-estate development cash flows, \
                  and compares self-financing, bank financing and consortium on NPV, \
                  IRR, payback and exposure. All arithmetic is decimal. Set RUST_LOG \
                  for diagnostics on stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a consortium amortization schedule
    Schedule(ScheduleArgs),
    /// Lance, credit released and first installment of a contract
    Credit(ScheduleArgs),
    /// Compare a contract with and without dropdown prepayments
    Dropdown(DropdownArgs),
    /// NPV, IRR, payback and exposure of a monthly cash flow series
    Metrics(MetricsArgs),
    /// Level payment (and schedule) of a bank loan
    Annuity(AnnuityArgs),
    /// Future-value cost of a traditional rate against a consortium rate
    RateEconomy(RateEconomyArgs),
    /// Self-financed and bank-financed development cash flows
    Project(ProjectArgs),
    /// Rank self-financing, bank financing and consortium for a development
    Compare(CompareArgs),
    /// Health ratios of consortium administrators by segment
    Administrators(AdministratorsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::consortium::run_schedule(args),
        Commands::Credit(args) => commands::consortium::run_credit(args),
        Commands::Dropdown(args) => commands::consortium::run_dropdown(args),
        Commands::Metrics(args) => commands::metrics::run_metrics(args),
        Commands::Annuity(args) => commands::financing::run_annuity(args),
        Commands::RateEconomy(args) => commands::financing::run_rate_economy(args),
        Commands::Project(args) => commands::financing::run_project(args),
        Commands::Compare(args) => commands::scenarios::run_compare(args),
        Commands::Administrators(args) => commands::market::run_administrators(args),
        Commands::Version => {
            println!("constructa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
