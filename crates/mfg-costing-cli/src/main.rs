mod commands;
mod config;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use std::process;

use mfg_costing_core::Currency;

use commands::break_even::BreakEvenArgs;
use commands::cost_sheet::CostSheetArgs;
use commands::format::FormatArgs;
use commands::pricing::PricingArgs;
use commands::records::{SheetNumberArgs, ValidateArgs};
use commands::report::ReportArgs;

/// Cost sheets, pricing and break-even analysis for small manufacturers
#[derive(Parser)]
#[command(
    name = "costing",
    version,
    about = "Cost sheets, pricing and break-even analysis for small manufacturers",
    long_about = "A CLI for costing production runs with decimal precision. Aggregates \
                  materials, labor, overhead and other costs into a cost per unit, prices \
                  units by cost plus, desired profit or market basis, and sweeps break-even \
                  and target-profit volumes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to the config file value, then json)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Currency code used to render amounts, e.g. INR, USD
    #[arg(long, global = true, env = "COSTING_CURRENCY")]
    currency: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true, env = "COSTING_CONFIG")]
    config: Option<String>,

    /// Log more to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a cost sheet: prime cost, factory cost, total and cost per unit
    CostSheet(CostSheetArgs),
    /// Price a unit by cost plus, desired profit or market basis
    Pricing(PricingArgs),
    /// Break-even point and target-profit scenarios
    BreakEven(BreakEvenArgs),
    /// Totals and per-product rollups across saved cost sheets
    Report(ReportArgs),
    /// Next cost sheet number, e.g. CS-001
    SheetNumber(SheetNumberArgs),
    /// Check a product, cost sheet or pricing decision before it is saved
    Validate(ValidateArgs),
    /// Render an amount or percentage for display
    Format(FormatArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Settings shared by every command once flags, env and config are merged.
pub struct Context {
    pub currency: Currency,
    pub config: config::CliConfig,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg = match config::load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let output_format = cli.output.or(cfg.output).unwrap_or(OutputFormat::Json);
    let ctx = Context {
        currency: config::resolve_currency(cli.currency.as_deref(), &cfg),
        config: cfg,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::CostSheet(args) => commands::cost_sheet::run_cost_sheet(args, &ctx),
        Commands::Pricing(args) => commands::pricing::run_pricing(args, &ctx),
        Commands::BreakEven(args) => commands::break_even::run_break_even(args, &ctx),
        Commands::Report(args) => commands::report::run_report(args, &ctx),
        Commands::SheetNumber(args) => commands::records::run_sheet_number(args),
        Commands::Validate(args) => commands::records::run_validate(args),
        Commands::Format(args) => commands::format::run_format(args, &ctx),
        Commands::Version => {
            println!("costing {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&output_format, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
