//! Rebate Projection CLI
//!
//! Runs the 1-year and 10-year projections for one parameter set, prints
//! the tables and optionally exports the sheet.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use rebate_projection::exchange::{
    quote_or_fallback, HttpRateProvider, PayloadFileProvider, RateQuote, RateSource,
    DEFAULT_FALLBACK_RATE,
};
use rebate_projection::export::{export_filename, ExportFormat, ProjectionSheet};
use rebate_projection::policy::input::format_grouped;
use rebate_projection::projection::ProjectionConfig;
use rebate_projection::{Assumptions, CalculationParams, FormInput, ScenarioRunner};

/// Project premiums, tax rebates, profit share and policy value.
///
/// Numbers are read the way the form shows them: `.` groups thousands,
/// `,` is the decimal separator and rates are percentages.
#[derive(Parser, Debug)]
#[command(name = "rebate-projection")]
#[command(version, about, long_about = None)]
struct Args {
    /// Gross monthly salary (TRY), e.g. 100.000
    #[arg(long, default_value = "100.000")]
    salary: String,

    /// Monthly premium (USD)
    #[arg(long, default_value = "100")]
    premium: String,

    /// USD/TRY rate; left empty to fetch the live rate (fallback on failure)
    #[arg(long, default_value = "")]
    usd_try: String,

    /// Annual salary growth %
    #[arg(long, default_value = "15")]
    salary_growth: String,

    /// Annual premium growth %
    #[arg(long, default_value = "0")]
    premium_growth: String,

    /// Annual USD/TRY growth %
    #[arg(long, default_value = "15")]
    usd_growth: String,

    /// Annual profit share %
    #[arg(long, default_value = "6,24")]
    profit_rate: String,

    /// Annual profit share growth %
    #[arg(long, default_value = "0")]
    profit_growth: String,

    /// Expense deduction %
    #[arg(long, default_value = "5")]
    expense_rate: String,

    /// Annual tax bracket growth %
    #[arg(long, default_value = "15")]
    bracket_growth: String,

    /// JSON file with decimal parameters; replaces the form flags
    #[arg(long)]
    params: Option<PathBuf>,

    /// Saved USD/TRY quote payload used instead of the live endpoint
    #[arg(long)]
    rate_file: Option<PathBuf>,

    /// Live quote endpoint
    #[arg(long, default_value = rebate_projection::exchange::LIVE_RATE_URL)]
    rate_url: String,

    /// Skip the live fetch and use the fallback rate
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Rate used when no live quote is available
    #[arg(long, default_value_t = DEFAULT_FALLBACK_RATE)]
    fallback_rate: f64,

    /// Directory containing tax_brackets.csv
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Length of the multi-year projection
    #[arg(long, default_value_t = 10)]
    years: u32,

    /// Print the full result as JSON instead of tables
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Export the sheet (timestamped name unless --output is given)
    #[arg(long, default_value_t = false)]
    export: bool,

    /// Export as plain CSV instead of a styled xlsx workbook
    #[arg(long, default_value_t = false)]
    csv: bool,

    /// Export file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn form(&self) -> FormInput {
        FormInput {
            monthly_salary: self.salary.clone(),
            monthly_premium_usd: self.premium.clone(),
            usd_try: self.usd_try.clone(),
            annual_salary_growth: self.salary_growth.clone(),
            annual_premium_growth: self.premium_growth.clone(),
            annual_usd_growth: self.usd_growth.clone(),
            annual_profit_rate: self.profit_rate.clone(),
            annual_profit_rate_growth: self.profit_growth.clone(),
            annual_expense_rate: self.expense_rate.clone(),
            annual_tax_bracket_growth: self.bracket_growth.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut params = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<CalculationParams>(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => args.form().to_params(),
    };

    if params.usd_try <= 0.0 {
        let quote = match &args.rate_file {
            Some(path) => quote_or_fallback(&PayloadFileProvider::new(path), args.fallback_rate),
            None if args.offline => RateQuote {
                rate: args.fallback_rate,
                source: RateSource::Fallback,
            },
            None => quote_or_fallback(&HttpRateProvider::new(&args.rate_url), args.fallback_rate),
        };
        params.usd_try = quote.rate;
        let tag = if quote.is_fallback() { " (fallback)" } else { "" };
        println!("1 USD = {:.4} TRY{}", quote.rate, tag);
    }

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

    let projection = match runner.project(&params) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("{}", err);
            return Ok(());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&projection)?);
    } else {
        print_tables(&params, &projection);
    }

    if args.export || args.output.is_some() {
        let format = if args.csv { ExportFormat::Csv } else { ExportFormat::Xlsx };
        let path = args.output.clone().unwrap_or_else(|| {
            PathBuf::from(export_filename(chrono::Local::now().naive_local(), format))
        });
        ProjectionSheet::build(&params, &projection)
            .save(&path, format)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        println!("\nSheet written to: {}", path.display());
    }

    Ok(())
}

fn print_tables(params: &CalculationParams, projection: &rebate_projection::CombinedProjection) {
    println!(
        "\n{} TRY gross salary, {} USD premium\n",
        format_grouped(params.monthly_salary),
        params.monthly_premium_usd
    );

    println!("1-Year Projection:");
    println!(
        "{:>5} {:>10} {:>6} {:>10} {:>10} {:>10} {:>12}",
        "Month", "Premium", "Tax%", "Rebate", "Profit", "Expense", "Policy"
    );
    println!("{}", "-".repeat(70));
    for row in &projection.one_year.monthly_details {
        let tax = row
            .tax_rate
            .map(|r| format!("{:.0}", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5} {:>10.2} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>12.2}",
            row.label,
            row.premium_usd,
            tax,
            row.rebate_usd,
            row.profit_usd,
            row.expense_usd,
            row.policy_value_usd,
        );
    }

    let one = &projection.one_year;
    println!("\n  Premium paid:        {:>14} TRY", format_grouped(one.totals_try.premium));
    println!("  Tax rebate:          {:>14} TRY", format_grouped(one.totals_try.rebate));
    println!("  Year-end fund:       {:>14} TRY  ({:.2} USD)", format_grouped(one.totals_try.fund), one.totals_usd.fund);
    println!("  Year-end policy:     {:>14} TRY  ({:.2} USD)", format_grouped(one.totals_try.policy_value), one.totals_usd.policy_value);

    let ten = &projection.ten_year;
    println!("\n{}-Year Projection:", ten.yearly_data.len());
    println!(
        "{:>5} {:>12} {:>10} {:>10} {:>10} {:>14}",
        "Year", "Premium", "Rebate", "Profit", "Expense", "Policy"
    );
    println!("{}", "-".repeat(66));
    for year in &ten.yearly_data {
        println!(
            "{:>5} {:>12.2} {:>10.2} {:>10.2} {:>10.2} {:>14.2}",
            year.year,
            year.premium_usd,
            year.rebate_usd,
            year.profit_usd,
            year.expense_usd,
            year.end_policy_value_usd,
        );
    }
    println!(
        "{:>5} {:>12.2} {:>10.2} {:>10.2} {:>10.2} {:>14.2}",
        "Top.",
        ten.totals_usd.premium,
        ten.totals_usd.rebate,
        ten.totals_usd.profit,
        ten.totals_usd.expense,
        ten.totals_usd.policy_value,
    );

    println!("\nSummary:");
    println!("  Total premium:       {:>14} TRY", format_grouped(ten.totals_try.premium));
    println!("  Total rebate:        {:>14} TRY", format_grouped(ten.totals_try.rebate));
    println!("  Fund with rebates:   {:>14} TRY  ({:.2} USD)", format_grouped(ten.totals_try.fund), ten.totals_usd.fund);
    println!("  Policy value:        {:>14} TRY  ({:.2} USD)", format_grouped(ten.totals_try.policy_value), ten.totals_usd.policy_value);
    println!("  Final USD/TRY:       {:>14.4}", ten.final_usd_try);
}
