//! Projection engine for 1-year and multi-year policy projections

mod state;
mod engine;
mod cashflows;

pub use state::AccrualState;
pub use engine::{
    accrue_month, monthly_profit, MonthInputs, MonthlyAccrual, ProjectionConfig,
    ProjectionEngine, AVERAGE_DAYS_PER_MONTH, DAYS_PER_YEAR, DEFAULT_PROJECTION_YEARS,
    MONTHS_PER_YEAR, REBATE_SALARY_CAP,
};
pub use cashflows::{
    CombinedProjection, MonthlyDetail, OneYearProjection, ProjectionTotals, TenYearProjection,
    YearlyDetail, MONTH_LABELS, TOTAL_LABEL,
};
