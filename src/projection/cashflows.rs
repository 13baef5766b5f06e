//! Output structures for projections

use serde::{Deserialize, Serialize};

/// Month labels used in tables and exports
pub const MONTH_LABELS: [&str; 12] = [
    "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
];

/// Label of the synthetic total row
pub const TOTAL_LABEL: &str = "Top.";

/// One month of the 1-year table (or its total row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDetail {
    pub label: String,
    /// Calendar month (1-12); `None` on the total row
    pub month: Option<u32>,

    pub gross_salary: f64,
    pub cumulative_income: f64,

    pub premium_usd: f64,
    pub premium_try: f64,

    /// Marginal rate used for the rebate; `None` on the total row
    pub tax_rate: Option<f64>,
    pub refundable_base_try: f64,
    pub rebate_try: f64,
    pub rebate_usd: f64,

    pub profit_usd: f64,
    pub expense_usd: f64,

    /// Running values after this month
    pub policy_value_usd: f64,
    pub fund_usd: f64,
}

impl MonthlyDetail {
    pub fn is_total(&self) -> bool {
        self.month.is_none()
    }
}

/// Flow totals and closing balances in one currency
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub premium: f64,
    pub rebate: f64,
    pub profit: f64,
    pub expense: f64,
    /// Closing fund value (with rebates)
    pub fund: f64,
    /// Closing policy value (without rebates)
    pub policy_value: f64,
}

/// 1-year projection: 12 monthly rows plus a total row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneYearProjection {
    pub monthly_details: Vec<MonthlyDetail>,
    pub totals_usd: ProjectionTotals,
    pub totals_try: ProjectionTotals,
    /// Rate used for every conversion
    pub usd_try: f64,
}

impl OneYearProjection {
    /// The twelve month rows, without the total row
    pub fn months(&self) -> &[MonthlyDetail] {
        let end = self.monthly_details.len().saturating_sub(1);
        &self.monthly_details[..end]
    }

    pub fn total_row(&self) -> Option<&MonthlyDetail> {
        self.monthly_details.last().filter(|row| row.is_total())
    }
}

/// One year of the 10-year table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyDetail {
    pub year: u32,

    // Parameters in effect this year
    pub monthly_salary: f64,
    pub monthly_premium_usd: f64,
    pub usd_try: f64,
    pub annual_profit_rate: f64,

    // Flows for the year
    pub premium_usd: f64,
    pub rebate_usd: f64,
    pub profit_usd: f64,
    pub expense_usd: f64,
    pub premium_try: f64,
    pub rebate_try: f64,
    pub profit_try: f64,
    pub expense_try: f64,

    // Running values at year end
    pub end_fund_usd: f64,
    pub end_policy_value_usd: f64,
    pub cumulative_premium_usd: f64,
}

/// Multi-year projection with grand totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenYearProjection {
    pub yearly_data: Vec<YearlyDetail>,
    pub totals_usd: ProjectionTotals,
    /// Flows summed at each year's rate; balances at the final year's rate
    pub totals_try: ProjectionTotals,
    /// Scaled rate of the last projected year
    pub final_usd_try: f64,
}

/// Both projections for one parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedProjection {
    pub one_year: OneYearProjection,
    pub ten_year: TenYearProjection,
}
