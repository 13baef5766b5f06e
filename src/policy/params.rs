//! Calculation parameters for a single projection

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Field names reported when a required input is missing
pub const FIELD_MONTHLY_SALARY: &str = "monthly_salary";
pub const FIELD_MONTHLY_PREMIUM: &str = "monthly_premium_usd";
pub const FIELD_USD_TRY: &str = "usd_try";

/// Inputs to a projection.
///
/// Every rate is a decimal (0.0624 = 6.24%). Growth rates are annual and
/// default to 0, which turns the 10-year projection into a flat one.
/// Absent required fields deserialize as 0 and fail [`validate`](Self::validate).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationParams {
    /// Gross monthly salary in TRY
    pub monthly_salary: f64,
    /// Monthly premium in USD
    pub monthly_premium_usd: f64,
    /// Base USD/TRY rate (live or fallback)
    pub usd_try: f64,

    pub annual_salary_growth: f64,
    pub annual_premium_growth: f64,
    pub annual_usd_growth: f64,

    /// Annual profit-share rate credited to the fund
    pub annual_profit_rate: f64,
    pub annual_profit_rate_growth: f64,

    /// Expense (fee) rate charged on each premium
    pub annual_expense_rate: f64,

    /// Annual inflation adjustment of bracket thresholds
    pub annual_tax_bracket_growth: f64,
}

impl CalculationParams {
    /// Starting values of the calculator form. The rate is left at 0 so the
    /// caller fills it from the rate collaborator.
    pub fn form_defaults() -> Self {
        Self {
            monthly_salary: 100_000.0,
            monthly_premium_usd: 100.0,
            usd_try: 0.0,
            annual_salary_growth: 0.15,
            annual_premium_growth: 0.0,
            annual_usd_growth: 0.15,
            annual_profit_rate: 0.0624,
            annual_profit_rate_growth: 0.0,
            annual_expense_rate: 0.05,
            annual_tax_bracket_growth: 0.15,
        }
    }

    /// Check the required inputs are positive.
    ///
    /// NaN counts as missing.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let missing: Vec<&'static str> = [
            (FIELD_MONTHLY_SALARY, self.monthly_salary),
            (FIELD_MONTHLY_PREMIUM, self.monthly_premium_usd),
            (FIELD_USD_TRY, self.usd_try),
        ]
        .into_iter()
        .filter(|(_, value)| !(*value > 0.0))
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParamsError::MissingRequired(missing))
        }
    }

    /// Parameters in effect during projection year `year` (1-indexed)
    pub fn for_year(&self, year: u32) -> YearParams {
        YearParams {
            year,
            monthly_salary: self.monthly_salary * growth_factor(self.annual_salary_growth, year),
            monthly_premium_usd: self.monthly_premium_usd
                * growth_factor(self.annual_premium_growth, year),
            usd_try: self.usd_try * growth_factor(self.annual_usd_growth, year),
            annual_profit_rate: self.annual_profit_rate
                * growth_factor(self.annual_profit_rate_growth, year),
            annual_expense_rate: self.annual_expense_rate,
            bracket_factor: growth_factor(self.annual_tax_bracket_growth, year),
        }
    }
}

/// Parameters scaled for one projection year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearParams {
    pub year: u32,
    pub monthly_salary: f64,
    pub monthly_premium_usd: f64,
    pub usd_try: f64,
    pub annual_profit_rate: f64,
    pub annual_expense_rate: f64,
    /// Multiplier applied to finite bracket thresholds
    pub bracket_factor: f64,
}

/// `(1 + rate)^(year - 1)`; exactly 1.0 in year 1
pub fn growth_factor(annual_rate: f64, year: u32) -> f64 {
    (1.0 + annual_rate).powi(year.saturating_sub(1) as i32)
}
