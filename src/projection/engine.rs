//! Core projection engine: the monthly accrual step and the 1-year and
//! multi-year drivers built on it

use crate::assumptions::{Assumptions, TaxSchedule};
use crate::policy::{CalculationParams, YearParams};
use super::cashflows::{
    MonthlyDetail, OneYearProjection, ProjectionTotals, TenYearProjection, YearlyDetail,
    MONTH_LABELS, TOTAL_LABEL,
};
use super::state::AccrualState;

/// Day count used to turn the annual profit rate into a daily rate
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Average Gregorian month length in days
pub const AVERAGE_DAYS_PER_MONTH: f64 = 365.2425 / 12.0;

/// Share of gross monthly salary that can earn a rebate
pub const REBATE_SALARY_CAP: f64 = 0.15;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Default length of the multi-year projection
pub const DEFAULT_PROJECTION_YEARS: u32 = 10;

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// Number of years in the multi-year projection
    pub projection_years: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            projection_years: DEFAULT_PROJECTION_YEARS,
        }
    }
}

/// Everything one accrual step needs besides the running state
#[derive(Debug, Clone, Copy)]
pub struct MonthInputs<'a> {
    pub monthly_salary: f64,
    pub premium_usd: f64,
    pub usd_try: f64,
    pub annual_profit_rate: f64,
    pub annual_expense_rate: f64,
    pub brackets: &'a TaxSchedule,
}

impl<'a> MonthInputs<'a> {
    /// Inputs for every month of a projection year
    pub fn for_year(year: &YearParams, brackets: &'a TaxSchedule) -> Self {
        Self {
            monthly_salary: year.monthly_salary,
            premium_usd: year.monthly_premium_usd,
            usd_try: year.usd_try,
            annual_profit_rate: year.annual_profit_rate,
            annual_expense_rate: year.annual_expense_rate,
            brackets,
        }
    }
}

/// Result of one accrual step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyAccrual {
    pub gross_salary: f64,
    /// Cumulative income including this month's salary
    pub cumulative_income: f64,
    pub premium_usd: f64,
    pub premium_try: f64,
    pub tax_rate: f64,
    pub refundable_base_try: f64,
    pub rebate_try: f64,
    pub rebate_usd: f64,
    pub profit_usd: f64,
    pub expense_usd: f64,
    pub fund_usd: f64,
    pub policy_value_usd: f64,
}

impl MonthlyAccrual {
    fn into_detail(self, label: &str, month: u32) -> MonthlyDetail {
        MonthlyDetail {
            label: label.to_string(),
            month: Some(month),
            gross_salary: self.gross_salary,
            cumulative_income: self.cumulative_income,
            premium_usd: self.premium_usd,
            premium_try: self.premium_try,
            tax_rate: Some(self.tax_rate),
            refundable_base_try: self.refundable_base_try,
            rebate_try: self.rebate_try,
            rebate_usd: self.rebate_usd,
            profit_usd: self.profit_usd,
            expense_usd: self.expense_usd,
            policy_value_usd: self.policy_value_usd,
            fund_usd: self.fund_usd,
        }
    }
}

/// Profit credited over one average month, compounding `annual_rate / 365`
/// daily on the opening fund
pub fn monthly_profit(fund_usd: f64, annual_rate: f64) -> f64 {
    let daily_rate = annual_rate / DAYS_PER_YEAR;
    fund_usd * ((1.0 + daily_rate).powf(AVERAGE_DAYS_PER_MONTH) - 1.0)
}

/// Advance the state by one month.
///
/// The rebate uses this month's marginal rate on the whole refundable base,
/// and the base is capped at 15% of this month's gross salary.
pub fn accrue_month(state: &mut AccrualState, inputs: &MonthInputs<'_>) -> MonthlyAccrual {
    let profit_usd = monthly_profit(state.fund_usd, inputs.annual_profit_rate);
    let expense_usd = inputs.premium_usd * inputs.annual_expense_rate;
    let premium_try = inputs.premium_usd * inputs.usd_try;

    state.cumulative_income += inputs.monthly_salary;
    let tax_rate = inputs.brackets.resolve_rate(state.cumulative_income);
    let max_refundable_try = inputs.monthly_salary * REBATE_SALARY_CAP;
    let refundable_base_try = premium_try.min(max_refundable_try);
    let rebate_try = refundable_base_try * tax_rate;
    let rebate_usd = rebate_try / inputs.usd_try;

    state.fund_usd += profit_usd + inputs.premium_usd + rebate_usd - expense_usd;
    state.policy_value_usd += profit_usd + inputs.premium_usd - expense_usd;

    MonthlyAccrual {
        gross_salary: inputs.monthly_salary,
        cumulative_income: state.cumulative_income,
        premium_usd: inputs.premium_usd,
        premium_try,
        tax_rate,
        refundable_base_try,
        rebate_try,
        rebate_usd,
        profit_usd,
        expense_usd,
        fund_usd: state.fund_usd,
        policy_value_usd: state.policy_value_usd,
    }
}

/// Run the twelve months of one tax year
fn accrue_year(state: &mut AccrualState, inputs: &MonthInputs<'_>) -> Vec<MonthlyAccrual> {
    state.start_tax_year();
    (0..MONTHS_PER_YEAR)
        .map(|_| accrue_month(state, inputs))
        .collect()
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// 1-year projection with no growth and the canonical bracket table
    pub fn project_one_year(&self, params: &CalculationParams) -> OneYearProjection {
        let year = params.for_year(1);
        let inputs = MonthInputs::for_year(&year, &self.assumptions.tax);
        let mut state = AccrualState::new();

        let months = accrue_year(&mut state, &inputs);

        let mut details = Vec::with_capacity(months.len() + 1);
        let mut totals_try = ProjectionTotals::default();
        let mut totals_usd = ProjectionTotals::default();
        let mut salary_total = 0.0;
        let mut refundable_total = 0.0;

        for (i, month) in months.iter().enumerate() {
            totals_try.premium += month.premium_try;
            totals_try.rebate += month.rebate_try;
            totals_try.profit += month.profit_usd * year.usd_try;
            totals_try.expense += month.expense_usd * year.usd_try;
            totals_usd.profit += month.profit_usd;
            totals_usd.expense += month.expense_usd;
            salary_total += month.gross_salary;
            refundable_total += month.refundable_base_try;

            details.push(month.into_detail(MONTH_LABELS[i], i as u32 + 1));
        }

        totals_usd.premium = year.monthly_premium_usd * f64::from(MONTHS_PER_YEAR);
        totals_usd.rebate = totals_try.rebate / year.usd_try;
        totals_usd.fund = state.fund_usd;
        totals_usd.policy_value = state.policy_value_usd;
        totals_try.fund = state.fund_usd * year.usd_try;
        totals_try.policy_value = state.policy_value_usd * year.usd_try;

        details.push(MonthlyDetail {
            label: TOTAL_LABEL.to_string(),
            month: None,
            gross_salary: salary_total,
            cumulative_income: state.cumulative_income,
            premium_usd: totals_usd.premium,
            premium_try: totals_try.premium,
            tax_rate: None,
            refundable_base_try: refundable_total,
            rebate_try: totals_try.rebate,
            rebate_usd: totals_usd.rebate,
            profit_usd: totals_usd.profit,
            expense_usd: totals_usd.expense,
            policy_value_usd: state.policy_value_usd,
            fund_usd: state.fund_usd,
        });

        log::debug!(
            "1-year projection: fund {:.2} USD, policy value {:.2} USD, rebate {:.2} USD",
            totals_usd.fund,
            totals_usd.policy_value,
            totals_usd.rebate
        );

        OneYearProjection {
            monthly_details: details,
            totals_usd,
            totals_try,
            usd_try: year.usd_try,
        }
    }

    /// Multi-year projection. Salary, premium, rate, profit rate and bracket
    /// thresholds compound yearly; fund and policy value never reset.
    pub fn project_ten_years(&self, params: &CalculationParams) -> TenYearProjection {
        let years = self.config.projection_years;
        let mut state = AccrualState::new();
        let mut yearly_data = Vec::with_capacity(years as usize);
        let mut totals_usd = ProjectionTotals::default();
        let mut totals_try = ProjectionTotals::default();
        let mut cumulative_premium_usd = 0.0;

        for y in 1..=years {
            let year = params.for_year(y);
            let brackets = self.assumptions.tax.scaled(year.bracket_factor);
            let inputs = MonthInputs::for_year(&year, &brackets);

            let months = accrue_year(&mut state, &inputs);

            let mut detail = YearlyDetail {
                year: y,
                monthly_salary: year.monthly_salary,
                monthly_premium_usd: year.monthly_premium_usd,
                usd_try: year.usd_try,
                annual_profit_rate: year.annual_profit_rate,
                premium_usd: year.monthly_premium_usd * f64::from(MONTHS_PER_YEAR),
                rebate_usd: 0.0,
                profit_usd: 0.0,
                expense_usd: 0.0,
                premium_try: 0.0,
                rebate_try: 0.0,
                profit_try: 0.0,
                expense_try: 0.0,
                end_fund_usd: state.fund_usd,
                end_policy_value_usd: state.policy_value_usd,
                cumulative_premium_usd: 0.0,
            };

            for month in &months {
                detail.premium_try += month.premium_try;
                detail.rebate_try += month.rebate_try;
                detail.rebate_usd += month.rebate_usd;
                detail.profit_try += month.profit_usd * year.usd_try;
                detail.expense_try += month.expense_usd * year.usd_try;
                detail.profit_usd += month.profit_usd;
                detail.expense_usd += month.expense_usd;

                totals_usd.premium += month.premium_usd;
                totals_usd.rebate += month.rebate_usd;
                totals_usd.profit += month.profit_usd;
                totals_usd.expense += month.expense_usd;
            }

            cumulative_premium_usd += detail.premium_usd;
            detail.cumulative_premium_usd = cumulative_premium_usd;

            totals_try.premium += detail.premium_try;
            totals_try.rebate += detail.rebate_try;
            totals_try.profit += detail.profit_try;
            totals_try.expense += detail.expense_try;

            yearly_data.push(detail);
        }

        let final_usd_try = params.for_year(years.max(1)).usd_try;
        totals_usd.fund = state.fund_usd;
        totals_usd.policy_value = state.policy_value_usd;
        totals_try.fund = state.fund_usd * final_usd_try;
        totals_try.policy_value = state.policy_value_usd * final_usd_try;

        log::debug!(
            "{}-year projection: fund {:.2} USD, policy value {:.2} USD at final rate {:.4}",
            years,
            totals_usd.fund,
            totals_usd.policy_value,
            final_usd_try
        );

        TenYearProjection {
            yearly_data,
            totals_usd,
            totals_try,
            final_usd_try,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Worked example: 100 000 TRY salary, 100 USD premium, rate 33, no growth
    fn flat_params() -> CalculationParams {
        CalculationParams {
            monthly_salary: 100_000.0,
            monthly_premium_usd: 100.0,
            usd_try: 33.0,
            annual_profit_rate: 0.0624,
            annual_expense_rate: 0.05,
            ..Default::default()
        }
    }

    fn growing_params() -> CalculationParams {
        CalculationParams {
            monthly_salary: 100_000.0,
            monthly_premium_usd: 100.0,
            usd_try: 41.98,
            annual_salary_growth: 0.15,
            annual_premium_growth: 0.05,
            annual_usd_growth: 0.15,
            annual_profit_rate: 0.0624,
            annual_profit_rate_growth: 0.02,
            annual_expense_rate: 0.05,
            annual_tax_bracket_growth: 0.15,
        }
    }

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(Assumptions::default_pricing(), ProjectionConfig::default())
    }

    #[test]
    fn test_first_month_worked_example() {
        let schedule = TaxSchedule::income_tax_2025();
        let params = flat_params();
        let year = params.for_year(1);
        let inputs = MonthInputs::for_year(&year, &schedule);
        let mut state = AccrualState::new();

        let month = accrue_month(&mut state, &inputs);

        assert_eq!(month.profit_usd, 0.0);
        assert_relative_eq!(month.premium_try, 3_300.0);
        assert_relative_eq!(month.refundable_base_try, 3_300.0);
        assert_eq!(month.cumulative_income, 100_000.0);
        assert_eq!(month.tax_rate, 0.15);
        assert_relative_eq!(month.rebate_try, 495.0);
        assert_relative_eq!(month.rebate_usd, 15.0);
        assert_relative_eq!(month.expense_usd, 5.0);
        assert_relative_eq!(month.fund_usd, 110.0);
        assert_relative_eq!(month.policy_value_usd, 95.0);
    }

    #[test]
    fn test_second_month_profit_and_bracket() {
        let schedule = TaxSchedule::income_tax_2025();
        let params = flat_params();
        let year = params.for_year(1);
        let inputs = MonthInputs::for_year(&year, &schedule);
        let mut state = AccrualState::new();

        let first = accrue_month(&mut state, &inputs);
        let second = accrue_month(&mut state, &inputs);

        let expected_profit =
            first.fund_usd * ((1.0 + 0.0624 / 365.0_f64).powf(365.2425 / 12.0) - 1.0);
        assert_relative_eq!(second.profit_usd, expected_profit);
        // 200 000 cumulative income crosses the 158 000 threshold
        assert_eq!(second.tax_rate, 0.20);
        assert_relative_eq!(second.rebate_usd, 20.0, epsilon = 1e-12);
        assert_relative_eq!(
            second.fund_usd,
            110.0 + expected_profit + 100.0 + 20.0 - 5.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_monthly_profit_is_daily_compounding() {
        // Roughly 6.24% / 12 but slightly more because of compounding
        let profit = monthly_profit(10_000.0, 0.0624);
        assert!(profit > 10_000.0 * 0.0624 / 12.0);
        assert_abs_diff_eq!(profit, 52.1657, epsilon = 1e-4);
        assert_eq!(monthly_profit(0.0, 0.0624), 0.0);
        assert_eq!(monthly_profit(500.0, 0.0), 0.0);
    }

    #[test]
    fn test_rebate_capped_at_salary_share() {
        let schedule = TaxSchedule::income_tax_2025();
        let params = CalculationParams {
            monthly_salary: 20_000.0,
            monthly_premium_usd: 1_000.0,
            usd_try: 40.0,
            annual_expense_rate: 0.05,
            ..Default::default()
        };
        let year = params.for_year(1);
        let inputs = MonthInputs::for_year(&year, &schedule);
        let mut state = AccrualState::new();

        for _ in 0..12 {
            let month = accrue_month(&mut state, &inputs);
            assert_relative_eq!(month.refundable_base_try, 3_000.0);
            assert!(month.rebate_try <= 0.15 * 20_000.0 * schedule.top_rate() + 1e-9);
        }
    }

    #[test]
    fn test_one_year_shape_and_additivity() {
        let result = engine().project_one_year(&flat_params());

        assert_eq!(result.monthly_details.len(), 13);
        assert_eq!(result.months().len(), 12);
        assert_eq!(result.months()[0].label, "Oca");
        assert_eq!(result.months()[11].label, "Ara");

        let total = result.total_row().expect("total row");
        assert_eq!(total.label, TOTAL_LABEL);
        assert_eq!(total.tax_rate, None);

        let premium_sum: f64 = result.months().iter().map(|m| m.premium_usd).sum();
        assert_eq!(premium_sum, 100.0 * 12.0);
        assert_eq!(total.premium_usd, 1_200.0);
        assert_eq!(result.totals_usd.premium, 1_200.0);

        let profit_sum: f64 = result.months().iter().map(|m| m.profit_usd).sum();
        assert_relative_eq!(result.totals_usd.profit, profit_sum);
        assert_relative_eq!(result.totals_usd.expense, 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_one_year_totals_and_conversions() {
        let result = engine().project_one_year(&flat_params());
        let last = &result.months()[11];

        assert_eq!(result.totals_usd.fund, last.fund_usd);
        assert_eq!(result.totals_usd.policy_value, last.policy_value_usd);
        assert_relative_eq!(result.totals_try.fund, last.fund_usd * 33.0);
        assert_relative_eq!(result.totals_try.policy_value, last.policy_value_usd * 33.0);
        assert_relative_eq!(result.totals_usd.rebate, result.totals_try.rebate / 33.0);

        // Fund and policy value differ by exactly the rebates
        assert_relative_eq!(
            result.totals_usd.fund - result.totals_usd.policy_value,
            result.totals_usd.rebate,
            epsilon = 1e-6
        );
        // 3300 TRY premium is under the 15 000 cap every month, so the rebate
        // is 100 USD times the rate: 15% in month 1, 20% in months 2-3 and
        // 27% once cumulative income passes 330 000
        assert_relative_eq!(result.totals_usd.rebate, 15.0 + 2.0 * 20.0 + 9.0 * 27.0, epsilon = 1e-9);
    }

    #[test]
    fn test_one_year_ignores_growth() {
        let flat = engine().project_one_year(&flat_params());
        let grown = engine().project_one_year(&CalculationParams {
            annual_salary_growth: 0.5,
            annual_premium_growth: 0.5,
            annual_usd_growth: 0.5,
            annual_profit_rate_growth: 0.5,
            annual_tax_bracket_growth: 0.5,
            ..flat_params()
        });

        assert_eq!(flat, grown);
    }

    #[test]
    fn test_ten_year_first_year_matches_one_year() {
        let engine = engine();
        let params = growing_params();
        let one = engine.project_one_year(&params);
        let ten = engine.project_ten_years(&params);
        let y1 = &ten.yearly_data[0];

        assert_eq!(y1.end_fund_usd, one.totals_usd.fund);
        assert_eq!(y1.end_policy_value_usd, one.totals_usd.policy_value);
        assert_eq!(y1.profit_usd, one.totals_usd.profit);
        assert_eq!(y1.premium_try, one.totals_try.premium);
        assert_eq!(y1.rebate_try, one.totals_try.rebate);
    }

    #[test]
    fn test_ten_year_fund_carries_across_years() {
        let engine = engine();
        let params = growing_params();
        let ten = engine.project_ten_years(&params);

        assert_eq!(ten.yearly_data.len(), 10);

        // Replay year 2 from year 1's closing balances
        let y1 = &ten.yearly_data[0];
        let year = params.for_year(2);
        let brackets = engine.assumptions().tax.scaled(year.bracket_factor);
        let inputs = MonthInputs::for_year(&year, &brackets);
        let mut state = AccrualState {
            fund_usd: y1.end_fund_usd,
            policy_value_usd: y1.end_policy_value_usd,
            cumulative_income: 0.0,
        };
        let months = accrue_year(&mut state, &inputs);

        assert_eq!(months.last().unwrap().fund_usd, ten.yearly_data[1].end_fund_usd);
        assert_eq!(
            months.last().unwrap().policy_value_usd,
            ten.yearly_data[1].end_policy_value_usd
        );
        // First month of year 2 earns profit on year 1's closing fund
        assert_eq!(months[0].profit_usd, monthly_profit(y1.end_fund_usd, year.annual_profit_rate));
    }

    #[test]
    fn test_ten_year_scaling_and_totals() {
        let params = growing_params();
        let ten = engine().project_ten_years(&params);
        let y2 = &ten.yearly_data[1];
        let y10 = &ten.yearly_data[9];

        assert_relative_eq!(y2.monthly_salary, 115_000.0);
        assert_relative_eq!(y2.usd_try, 41.98 * 1.15);
        assert_relative_eq!(y2.premium_usd, 100.0 * 1.05 * 12.0);
        assert_relative_eq!(y2.annual_profit_rate, 0.0624 * 1.02);

        let final_rate = 41.98 * 1.15_f64.powi(9);
        assert_relative_eq!(ten.final_usd_try, final_rate, max_relative = 1e-12);
        assert_relative_eq!(ten.totals_try.fund, ten.totals_usd.fund * ten.final_usd_try);
        assert_relative_eq!(
            ten.totals_try.policy_value,
            ten.totals_usd.policy_value * ten.final_usd_try
        );

        let premium_sum: f64 = ten.yearly_data.iter().map(|y| y.premium_usd).sum();
        assert_relative_eq!(ten.totals_usd.premium, premium_sum, max_relative = 1e-12);
        assert_relative_eq!(y10.cumulative_premium_usd, premium_sum, max_relative = 1e-12);

        let rebate_try: f64 = ten.yearly_data.iter().map(|y| y.rebate_try).sum();
        assert_relative_eq!(ten.totals_try.rebate, rebate_try);

        assert_eq!(ten.totals_usd.fund, y10.end_fund_usd);
        assert!(ten.yearly_data.windows(2).all(|w| w[1].end_fund_usd > w[0].end_fund_usd));
    }

    #[test]
    fn test_bracket_growth_moves_first_threshold() {
        // Salary of 14 000/month reaches 168 000 by December. With brackets
        // grown 15%, year 2's first threshold is 181 700 and December stays
        // in the 15% bracket, while year 1's December is taxed at 20%.
        let params = CalculationParams {
            monthly_salary: 14_000.0,
            monthly_premium_usd: 50.0,
            usd_try: 40.0,
            annual_tax_bracket_growth: 0.15,
            annual_expense_rate: 0.05,
            ..Default::default()
        };
        let engine = engine();
        let ten = engine.project_ten_years(&params);

        // 50 USD * 40 = 2000 TRY < 2100 cap, so rebate = 2000 * rate / 40
        let y1_rebate = 11.0 * 50.0 * 0.15 + 50.0 * 0.20;
        let y2_rebate = 12.0 * 50.0 * 0.15;
        assert_relative_eq!(ten.yearly_data[0].rebate_usd, y1_rebate, epsilon = 1e-9);
        assert_relative_eq!(ten.yearly_data[1].rebate_usd, y2_rebate, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_years_is_configurable() {
        let engine = ProjectionEngine::new(
            Assumptions::default_pricing(),
            ProjectionConfig { projection_years: 3 },
        );
        let params = growing_params();
        let ten = engine.project_ten_years(&params);

        assert_eq!(ten.yearly_data.len(), 3);
        assert_relative_eq!(ten.final_usd_try, 41.98 * 1.15 * 1.15);
    }
}
