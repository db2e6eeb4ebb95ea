//! Profit Projection CLI
//!
//! Command-line interface for running five-year profit and cash projections

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use profit_projection::inputs::save_config;
use profit_projection::projection::{write_annual_csv, write_monthly_csv, CsvOptions};
use profit_projection::{
    CashTiming, ConfigStore, ProjectionConfig, ProjectionEngine, ProjectionInputs, ProjectionResult,
    RepaymentMethod, ScenarioRunner, YearMonth,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "profit_projection", version, about = "Five-year profit and cash projection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a projection and write the results
    Run {
        /// Persisted configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// fixed-target or cash-flow-capped
        #[arg(long, default_value_t = RepaymentMethod::default())]
        repayment: RepaymentMethod,

        /// accrual or collection-schedule
        #[arg(long, default_value_t = CashTiming::default())]
        cash_timing: CashTiming,

        /// Monthly table output
        #[arg(long, default_value = "projection_monthly.csv")]
        monthly_csv: PathBuf,

        /// Annual table output
        #[arg(long, default_value = "projection_annual.csv")]
        annual_csv: PathBuf,

        /// Prefix CSV output with a UTF-8 byte order mark
        #[arg(long)]
        bom: bool,

        /// Also print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Fail instead of falling back to default inputs when the config cannot be loaded
        #[arg(long)]
        strict: bool,
    },

    /// Write a configuration file populated with default assumptions
    Template {
        #[arg(short, long)]
        output: PathBuf,

        /// First projection month (YYYY-MM), defaults to the current month
        #[arg(long)]
        start: Option<YearMonth>,
    },

    /// Compare every repayment and cash timing combination
    Compare {
        #[arg(short, long)]
        config: PathBuf,

        /// Fail instead of falling back to default inputs when the config cannot be loaded
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Run {
            config,
            repayment,
            cash_timing,
            monthly_csv,
            annual_csv,
            bom,
            json,
            strict,
        } => {
            let inputs = load_inputs(&config, strict)?;
            let engine = ProjectionEngine::new(ProjectionConfig::new(repayment, cash_timing));
            let result = engine.project(&inputs);

            print_annual_table(&result);

            let options = CsvOptions {
                utf8_bom: bom,
                opening_row: true,
            };
            let file = File::create(&monthly_csv)
                .with_context(|| format!("creating {}", monthly_csv.display()))?;
            write_monthly_csv(&result, BufWriter::new(file), &options)?;
            let file = File::create(&annual_csv)
                .with_context(|| format!("creating {}", annual_csv.display()))?;
            write_annual_csv(&result, BufWriter::new(file), &options)?;
            info!("Wrote {} and {}", monthly_csv.display(), annual_csv.display());

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::Template { output, start } => {
            let inputs = ProjectionInputs::with_defaults(start.unwrap_or_else(YearMonth::current));
            save_config(&output, &inputs).with_context(|| format!("writing {}", output.display()))?;
            println!("Template written to: {}", output.display());
        }
        Command::Compare { config, strict } => {
            let inputs = load_inputs(&config, strict)?;
            print_comparison(&ScenarioRunner::new(inputs));
        }
    }

    Ok(())
}

/// Load inputs through the store so a broken file falls back to defaults
fn load_inputs(path: &Path, strict: bool) -> Result<ProjectionInputs> {
    let mut store = ConfigStore::new(ProjectionInputs::with_defaults(YearMonth::current()));
    match store.import_path(path) {
        Ok(_) => {}
        Err(e) if strict => {
            return Err(e).with_context(|| format!("loading {}", path.display()));
        }
        Err(_) => warn!("Running with built-in default inputs"),
    }

    let inputs = store.current().clone();
    if inputs.projects.is_empty() && inputs.action_plans.is_empty() {
        warn!("No projects or action plans: every month will show zero revenue");
    }
    Ok(inputs)
}

fn print_annual_table(result: &ProjectionResult) {
    println!(
        "Projection ({} months, repayment={}, cash timing={})",
        result.records.len(),
        result.config.repayment,
        result.config.cash_timing
    );
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>10} {:>14} {:>14} {:>14}",
        "Year", "Revenue", "OpProfit", "NetProfit", "NetMargin", "SimpleCF", "Debt", "Cash"
    );
    println!("{}", "-".repeat(106));

    for year in result.annual_with_opening() {
        println!(
            "{:>4} {:>14.0} {:>14.0} {:>14.0} {:>9.1}% {:>14.0} {:>14.0} {:>14.0}",
            year.fiscal_year,
            year.revenue,
            year.operating_profit,
            year.net_profit,
            year.net_margin_ratio() * 100.0,
            year.simple_cash_flow,
            year.debt_balance,
            year.cash_balance,
        );
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Debt after 5 years: {:.0}", summary.final_debt);
    println!("  Cash after 5 years: {:.0}", summary.final_cash);
    println!("  Total repayment:    {:.0}", summary.total_repayment);
    println!("  Total tax:          {:.0}", summary.total_tax);
    if let Some(period) = summary.lowest_cash_period {
        println!("  Lowest cash:        {:.0} ({})", summary.lowest_cash, period);
    }
    match summary.debt_free_period {
        Some(period) => println!("  Debt free from:     {}", period),
        None => println!("  Debt free from:     beyond horizon"),
    }
}

fn print_comparison(runner: &ScenarioRunner) {
    println!(
        "{:<18} {:<20} {:>14} {:>14} {:>14} {:>10}",
        "Repayment", "Cash timing", "Repaid", "Final debt", "Final cash", "Debt free"
    );
    println!("{}", "-".repeat(95));

    for outcome in runner.compare_all() {
        let debt_free = outcome
            .summary
            .debt_free_period
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<18} {:<20} {:>14.0} {:>14.0} {:>14.0} {:>10}",
            outcome.config.repayment.to_string(),
            outcome.config.cash_timing.to_string(),
            outcome.summary.total_repayment,
            outcome.summary.final_debt,
            outcome.summary.final_cash,
            debt_free,
        );
    }
}
