//! Running balances carried between monthly accrual steps

/// State of a policy between months
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccrualState {
    /// Fund value in USD, rebates included
    pub fund_usd: f64,

    /// Policy value in USD, rebates excluded
    pub policy_value_usd: f64,

    /// Gross salary earned so far in the current tax year (TRY)
    pub cumulative_income: f64,
}

impl AccrualState {
    /// Empty policy at projection start
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tax year. Fund and policy value carry over.
    pub fn start_tax_year(&mut self) {
        self.cumulative_income = 0.0;
    }
}
