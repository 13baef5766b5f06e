//! Load projection scenarios from CSV
//!
//! One row per parameter set, decimal rates, `scenario_id` first.

use std::io::Read;
use std::path::Path;

use csv::Reader;
use serde::{Deserialize, Serialize};

use super::CalculationParams;
use crate::error::LoadError;

/// A labelled parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: u32,
    #[serde(flatten)]
    pub params: CalculationParams,
}

/// Raw CSV row matching scenarios.csv columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    scenario_id: u32,
    monthly_salary: f64,
    monthly_premium_usd: f64,
    usd_try: f64,
    annual_salary_growth: Option<f64>,
    annual_premium_growth: Option<f64>,
    annual_usd_growth: Option<f64>,
    annual_profit_rate: f64,
    annual_profit_rate_growth: Option<f64>,
    annual_expense_rate: f64,
    annual_tax_bracket_growth: Option<f64>,
}

impl CsvRow {
    fn into_scenario(self) -> Scenario {
        Scenario {
            scenario_id: self.scenario_id,
            params: CalculationParams {
                monthly_salary: self.monthly_salary,
                monthly_premium_usd: self.monthly_premium_usd,
                usd_try: self.usd_try,
                annual_salary_growth: self.annual_salary_growth.unwrap_or(0.0),
                annual_premium_growth: self.annual_premium_growth.unwrap_or(0.0),
                annual_usd_growth: self.annual_usd_growth.unwrap_or(0.0),
                annual_profit_rate: self.annual_profit_rate,
                annual_profit_rate_growth: self.annual_profit_rate_growth.unwrap_or(0.0),
                annual_expense_rate: self.annual_expense_rate,
                annual_tax_bracket_growth: self.annual_tax_bracket_growth.unwrap_or(0.0),
            },
        }
    }
}

/// Load all scenarios from a CSV file
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<Scenario>, LoadError> {
    let reader = Reader::from_path(path.as_ref())?;
    let scenarios = collect_scenarios(reader)?;
    log::info!(
        "Loaded {} scenarios from {}",
        scenarios.len(),
        path.as_ref().display()
    );
    Ok(scenarios)
}

/// Load scenarios from any reader (e.g., string buffer, request body)
pub fn load_scenarios_from_reader<R: Read>(reader: R) -> Result<Vec<Scenario>, LoadError> {
    collect_scenarios(Reader::from_reader(reader))
}

fn collect_scenarios<R: Read>(mut reader: Reader<R>) -> Result<Vec<Scenario>, LoadError> {
    let mut scenarios = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        scenarios.push(row.into_scenario());
    }
    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "scenario_id,monthly_salary,monthly_premium_usd,usd_try,annual_salary_growth,annual_premium_growth,annual_usd_growth,annual_profit_rate,annual_profit_rate_growth,annual_expense_rate,annual_tax_bracket_growth";

    #[test]
    fn test_load_scenarios_from_reader() {
        let data = format!(
            "{}\n1,100000,100,33,0,0,0,0.0624,0,0.05,0\n2,130000,100,41.95,0.15,0.05,0.15,0.0624,,0.05,0.15\n",
            HEADER
        );
        let scenarios = load_scenarios_from_reader(data.as_bytes()).unwrap();

        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].scenario_id, 1);
        assert_eq!(scenarios[0].params.usd_try, 33.0);
        assert_eq!(scenarios[1].params.annual_premium_growth, 0.05);
        assert_eq!(scenarios[1].params.annual_profit_rate_growth, 0.0);
    }

    #[test]
    fn test_bad_number_is_csv_error() {
        let data = format!("{}\n1,lots,100,33,0,0,0,0.0624,0,0.05,0\n", HEADER);
        let err = load_scenarios_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_load_bundled_scenarios() {
        let scenarios = load_scenarios("data/scenarios.csv").expect("Failed to load scenarios");
        assert_eq!(scenarios.len(), 4);
        assert!(scenarios.iter().all(|s| s.params.validate().is_ok()));
    }
}
