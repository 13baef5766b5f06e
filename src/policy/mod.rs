//! Projection inputs: numeric parameters, the text boundary, scenario loading

mod params;
pub mod input;
pub mod loader;

pub use params::{
    growth_factor, CalculationParams, YearParams, FIELD_MONTHLY_PREMIUM, FIELD_MONTHLY_SALARY,
    FIELD_USD_TRY,
};
pub use input::FormInput;
pub use loader::{load_scenarios, load_scenarios_from_reader, Scenario};
