//! Monthly profit-and-loss and cash projection

mod annual;
mod cashflows;
mod collections;
mod engine;
pub mod export;
mod state;
mod strategy;

pub use annual::{aggregate_annual, AnnualRecord};
pub use cashflows::{revenue_ratio, PeriodRecord, PlanImpact, ProjectionResult, ProjectionSummary};
pub use collections::CollectionSchedule;
pub use engine::{ProjectionConfig, ProjectionEngine, HORIZON_MONTHS};
pub use export::{write_annual_csv, write_monthly_csv, CsvOptions};
pub use state::ProjectionState;
pub use strategy::{
    AccrualApproximateCash, CashFlowCappedRepayment, CashMovement, CashTiming, CashTimingModel,
    CollectionScheduleCash, FixedTargetRepayment, PeriodFlows, RepaymentMethod, RepaymentPolicy,
};
