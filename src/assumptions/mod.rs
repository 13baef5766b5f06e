//! Projection assumptions: the income-tax schedule used for rebates

mod tax;
pub mod loader;

pub use tax::{resolve_rate, TaxBracket, TaxSchedule};

use std::path::Path;

use crate::error::LoadError;

/// Container for all projection assumptions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assumptions {
    /// Canonical (unscaled) bracket table
    pub tax: TaxSchedule,
}

impl Assumptions {
    /// Assumptions matching the current calculator (2025 brackets)
    pub fn default_pricing() -> Self {
        Self {
            tax: TaxSchedule::income_tax_2025(),
        }
    }

    /// Assumptions with a specific bracket table
    pub fn with_schedule(tax: TaxSchedule) -> Self {
        Self { tax }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            tax: loader::load_tax_schedule(path)?,
        })
    }
}
