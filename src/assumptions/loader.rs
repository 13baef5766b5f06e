//! CSV-based assumption loader
//!
//! Loads tax-bracket schedules from CSV files in data/assumptions/

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::tax::{TaxBracket, TaxSchedule};
use crate::error::LoadError;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// File name of the bracket table inside an assumptions directory
pub const TAX_BRACKETS_FILE: &str = "tax_brackets.csv";

/// Raw CSV row: `upper_limit,rate`, empty limit for the unbounded bracket
#[derive(Debug, Deserialize)]
struct BracketRow {
    upper_limit: Option<f64>,
    rate: f64,
}

/// Load a tax schedule from any reader
pub fn load_tax_schedule_from_reader<R: Read>(reader: R) -> Result<TaxSchedule, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut brackets = Vec::new();

    for result in csv_reader.deserialize() {
        let row: BracketRow = result?;
        brackets.push(TaxBracket {
            upper_limit: row.upper_limit,
            rate: row.rate,
        });
    }

    TaxSchedule::new(brackets)
}

/// Load tax_brackets.csv from an assumptions directory
pub fn load_tax_schedule(path: &Path) -> Result<TaxSchedule, LoadError> {
    let file = File::open(path.join(TAX_BRACKETS_FILE))?;
    let schedule = load_tax_schedule_from_reader(file)?;
    log::info!(
        "Loaded {} tax brackets from {}",
        schedule.brackets().len(),
        path.display()
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_schedule_from_reader() {
        let data = "upper_limit,rate\n158000,0.15\n330000,0.20\n1200000,0.27\n4300000,0.35\n,0.40\n";
        let schedule = load_tax_schedule_from_reader(data.as_bytes()).unwrap();

        assert_eq!(schedule, TaxSchedule::income_tax_2025());
    }

    #[test]
    fn test_load_rejects_bounded_top_bracket() {
        let data = "upper_limit,rate\n70000,0.15\n150000,0.20\n";
        let err = load_tax_schedule_from_reader(data.as_bytes()).unwrap_err();

        assert!(matches!(err, LoadError::InvalidSchedule(_)));
    }

    #[test]
    fn test_load_rejects_malformed_rate() {
        let data = "upper_limit,rate\n70000,abc\n,0.40\n";
        let err = load_tax_schedule_from_reader(data.as_bytes()).unwrap_err();

        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = load_tax_schedule(Path::new("does/not/exist")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
