//! Rebate Projection - projection engine for tax-rebated savings policies
//!
//! This library provides:
//! - Progressive tax-bracket lookup with inflation-scaled thresholds
//! - A monthly accrual step (daily-compounded profit share, expense, capped rebate)
//! - 1-year and 10-year projections of premiums, rebates, fund and policy value
//! - Locale-aware parsing of form input, exchange-rate fallback, spreadsheet export

pub mod error;
pub mod policy;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod exchange;
pub mod export;

// Re-export commonly used types
pub use error::{ExportError, LoadError, ParamsError, RateError};
pub use policy::{CalculationParams, FormInput, Scenario};
pub use assumptions::{Assumptions, TaxBracket, TaxSchedule};
pub use projection::{
    CombinedProjection, MonthlyDetail, OneYearProjection, ProjectionConfig, ProjectionEngine,
    TenYearProjection, YearlyDetail,
};
pub use scenario::{project, ScenarioRunner};
pub use exchange::{quote_for, quote_or_fallback, HttpRateProvider, RateProvider, RateQuote, RateSource};
