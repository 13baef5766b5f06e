//! Run projections for every scenario in a CSV file
//!
//! Outputs one summary row per scenario for side-by-side comparison

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rebate_projection::policy::load_scenarios;
use rebate_projection::projection::ProjectionConfig;
use rebate_projection::{Assumptions, CombinedProjection, ParamsError, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "run-batch")]
#[command(version, about = "Project every scenario in a CSV file", long_about = None)]
struct Args {
    /// Scenario CSV (decimal rates)
    #[arg(short, long, default_value = "data/scenarios.csv")]
    file: PathBuf,

    /// Summary output path
    #[arg(short, long, default_value = "batch_projection_output.csv")]
    output: PathBuf,

    /// Directory containing tax_brackets.csv
    #[arg(short, long)]
    assumptions: Option<PathBuf>,

    /// Length of the multi-year projection
    #[arg(long, default_value_t = 10)]
    years: u32,
}

/// One line of the summary; figures are empty for skipped scenarios
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRow {
    #[serde(rename = "ScenarioID")]
    scenario_id: u32,
    status: &'static str,
    #[serde(rename = "Y1_Premium_USD")]
    y1_premium_usd: Option<f64>,
    #[serde(rename = "Y1_Rebate_USD")]
    y1_rebate_usd: Option<f64>,
    #[serde(rename = "Y1_Fund_USD")]
    y1_fund_usd: Option<f64>,
    #[serde(rename = "Y1_Policy_USD")]
    y1_policy_usd: Option<f64>,
    #[serde(rename = "Premium_USD")]
    premium_usd: Option<f64>,
    #[serde(rename = "Rebate_USD")]
    rebate_usd: Option<f64>,
    #[serde(rename = "Profit_USD")]
    profit_usd: Option<f64>,
    #[serde(rename = "Expense_USD")]
    expense_usd: Option<f64>,
    #[serde(rename = "Fund_USD")]
    fund_usd: Option<f64>,
    #[serde(rename = "Policy_USD")]
    policy_usd: Option<f64>,
    #[serde(rename = "Fund_TRY")]
    fund_try: Option<f64>,
    #[serde(rename = "Policy_TRY")]
    policy_try: Option<f64>,
    #[serde(rename = "Final_USDTRY")]
    final_usd_try: Option<f64>,
}

fn cents(value: f64) -> Option<f64> {
    Some((value * 100.0).round() / 100.0)
}

impl SummaryRow {
    fn new(scenario_id: u32, result: &Result<CombinedProjection, ParamsError>) -> Self {
        let Ok(p) = result else {
            return Self {
                scenario_id,
                status: "skipped",
                ..Default::default()
            };
        };
        let one = &p.one_year.totals_usd;
        let ten = &p.ten_year.totals_usd;

        Self {
            scenario_id,
            status: "ok",
            y1_premium_usd: cents(one.premium),
            y1_rebate_usd: cents(one.rebate),
            y1_fund_usd: cents(one.fund),
            y1_policy_usd: cents(one.policy_value),
            premium_usd: cents(ten.premium),
            rebate_usd: cents(ten.rebate),
            profit_usd: cents(ten.profit),
            expense_usd: cents(ten.expense),
            fund_usd: cents(ten.fund),
            policy_usd: cents(ten.policy_value),
            fund_try: cents(p.ten_year.totals_try.fund),
            policy_try: cents(p.ten_year.totals_try.policy_value),
            final_usd_try: Some((p.ten_year.final_usd_try * 10_000.0).round() / 10_000.0),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading scenarios from {}...", args.file.display());

    let scenarios = load_scenarios(&args.file)
        .with_context(|| format!("Failed to load scenarios from {}", args.file.display()))?;
    println!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let assumptions = match &args.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("Failed to load assumptions from {}", dir.display()))?,
        None => Assumptions::default_pricing(),
    };
    let runner = ScenarioRunner::with_config(
        assumptions,
        ProjectionConfig {
            projection_years: args.years,
        },
    );

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = runner.run_batch(&scenarios);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut skipped = 0;
    for (id, result) in &results {
        if let Err(err) = result {
            skipped += 1;
            log::warn!("Scenario {} skipped: {}", id, err);
        }
        writer.serialize(SummaryRow::new(*id, result))?;
    }
    writer.flush()?;

    println!("Output written to {}", args.output.display());
    if skipped > 0 {
        println!("  {} scenario(s) skipped for missing inputs", skipped);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
