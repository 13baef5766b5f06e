//! Scenario runner: the single entry point that validates a parameter set
//! and runs both projections
//!
//! Holds the assumptions once so many parameter sets can be projected
//! without reloading the bracket table.

use rayon::prelude::*;

use crate::error::{LoadError, ParamsError};
use crate::policy::{CalculationParams, Scenario};
use crate::projection::{CombinedProjection, ProjectionConfig, ProjectionEngine};
use crate::Assumptions;

/// Pre-loaded scenario runner
///
/// # Example
/// ```
/// use rebate_projection::{CalculationParams, ScenarioRunner};
///
/// let runner = ScenarioRunner::new();
/// let params = CalculationParams {
///     monthly_salary: 100_000.0,
///     monthly_premium_usd: 100.0,
///     usd_try: 33.0,
///     annual_profit_rate: 0.0624,
///     annual_expense_rate: 0.05,
///     ..Default::default()
/// };
/// let result = runner.project(&params).unwrap();
/// assert_eq!(result.ten_year.yearly_data.len(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Runner with the default bracket table and a 10-year horizon
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_pricing())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> Result<Self, LoadError> {
        Ok(Self::with_assumptions(Assumptions::from_csv()?))
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, LoadError> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self::with_config(assumptions, ProjectionConfig::default())
    }

    pub fn with_config(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self {
            engine: ProjectionEngine::new(assumptions, config),
        }
    }

    /// Validate `params` and run both projections.
    ///
    /// Missing salary, premium or rate is returned as [`ParamsError`] and
    /// nothing is computed.
    pub fn project(&self, params: &CalculationParams) -> Result<CombinedProjection, ParamsError> {
        if let Err(err) = params.validate() {
            log::debug!("Skipping projection: {}", err);
            return Err(err);
        }

        Ok(CombinedProjection {
            one_year: self.engine.project_one_year(params),
            ten_year: self.engine.project_ten_years(params),
        })
    }

    /// Project many independent scenarios in parallel, preserving order
    pub fn run_batch(
        &self,
        scenarios: &[Scenario],
    ) -> Vec<(u32, Result<CombinedProjection, ParamsError>)> {
        scenarios
            .par_iter()
            .map(|s| (s.scenario_id, self.project(&s.params)))
            .collect()
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }
}

/// Project with the default assumptions
pub fn project(params: &CalculationParams) -> Result<CombinedProjection, ParamsError> {
    ScenarioRunner::new().project(params)
}
