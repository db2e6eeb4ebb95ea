//! Profit Projection - five-year monthly profit-and-loss and cash forecasting
//!
//! This library provides:
//! - A 60-month projection engine driven by static business assumptions
//! - Two-tier corporate tax and declining depreciation schedules
//! - Collection-lag cash timing and capped debt repayment policies
//! - Dated action plan overlays on revenue, cost of sales, and SG&A
//! - Annual aggregation, CSV export, and a persisted input format

pub mod error;
pub mod period;
pub mod inputs;
pub mod assumptions;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ConfigError, ExportError};
pub use period::YearMonth;
pub use inputs::{ActionPlanRow, ConfigStore, PlanCategory, ProjectRow, ProjectionInputs, SimulationParameters};
pub use assumptions::{Assumptions, CorporateTax, DepreciationSchedule};
pub use projection::{
    AnnualRecord, CashTiming, PeriodRecord, ProjectionConfig, ProjectionEngine, ProjectionResult,
    ProjectionSummary, RepaymentMethod,
};
pub use scenario::ScenarioRunner;
