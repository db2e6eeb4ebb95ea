//! Interchangeable debt repayment and cash timing policies
//!
//! Dashboard variants disagree on how much debt is repaid each month and on
//! when revenue turns into cash. Both choices are explicit configuration:
//!
//! | Repayment | Monthly repayment |
//! |---|---|
//! | [`FixedTargetRepayment`] | `min(debt, target)` |
//! | [`CashFlowCappedRepayment`] | `min(debt, simple cash flow + target)` |
//!
//! | Cash timing | Cash movement |
//! |---|---|
//! | [`AccrualApproximateCash`] | `simple cash flow - repayment` |
//! | [`CollectionScheduleCash`] | `collections - (cash expenses + tax + repayment)` |

use super::collections::CollectionSchedule;
use crate::error::StrategyParseError;
use crate::inputs::ProjectRow;
use crate::period::YearMonth;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decides the debt repaid in one month
pub trait RepaymentPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Repayment given the debt before the month, the month's simple cash flow,
    /// and the contractual monthly target. Never exceeds `debt_before`, never negative.
    fn repayment(&self, debt_before: f64, simple_cash_flow: f64, monthly_target: f64) -> f64;
}

/// Pays the contractual target until the debt is gone
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTargetRepayment;

impl RepaymentPolicy for FixedTargetRepayment {
    fn name(&self) -> &'static str {
        "fixed-target"
    }

    fn repayment(&self, debt_before: f64, _simple_cash_flow: f64, monthly_target: f64) -> f64 {
        debt_before.min(monthly_target).max(0.0)
    }
}

/// Pays the target plus the month's simple cash flow, accelerating payoff in good months
#[derive(Debug, Clone, Copy, Default)]
pub struct CashFlowCappedRepayment;

impl RepaymentPolicy for CashFlowCappedRepayment {
    fn name(&self) -> &'static str {
        "cash-flow-capped"
    }

    fn repayment(&self, debt_before: f64, simple_cash_flow: f64, monthly_target: f64) -> f64 {
        debt_before.min(simple_cash_flow + monthly_target).max(0.0)
    }
}

/// Accounting figures for one month that drive cash movement
#[derive(Debug, Clone, Copy)]
pub struct PeriodFlows {
    pub period: YearMonth,
    pub total_cost_of_sales: f64,
    pub sga: f64,
    pub depreciation: f64,
    pub tax: f64,
    pub simple_cash_flow: f64,
    pub repayment: f64,
}

/// Cash received and paid in one month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CashMovement {
    pub cash_in: f64,
    pub cash_out: f64,
}

impl CashMovement {
    pub fn net(&self) -> f64 {
        self.cash_in - self.cash_out
    }
}

/// Decides when accrued figures become cash
pub trait CashTimingModel: Send + Sync {
    fn name(&self) -> &'static str;

    fn cash_movement(
        &self,
        flows: &PeriodFlows,
        projects: &[ProjectRow],
        schedule: &mut CollectionSchedule,
    ) -> CashMovement;
}

/// Treats revenue as collected when earned
#[derive(Debug, Clone, Copy, Default)]
pub struct AccrualApproximateCash;

impl CashTimingModel for AccrualApproximateCash {
    fn name(&self) -> &'static str {
        "accrual"
    }

    fn cash_movement(
        &self,
        flows: &PeriodFlows,
        _projects: &[ProjectRow],
        _schedule: &mut CollectionSchedule,
    ) -> CashMovement {
        CashMovement {
            cash_in: flows.simple_cash_flow,
            cash_out: flows.repayment,
        }
    }
}

/// Receives each project's revenue `collection_lag_months` after it accrues
///
/// Only project revenue is scheduled. Action plan revenue moves the income
/// statement but never reaches cash in this model.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionScheduleCash;

impl CashTimingModel for CollectionScheduleCash {
    fn name(&self) -> &'static str {
        "collection-schedule"
    }

    fn cash_movement(
        &self,
        flows: &PeriodFlows,
        projects: &[ProjectRow],
        schedule: &mut CollectionSchedule,
    ) -> CashMovement {
        // Register this month's accruals before collecting, so zero-lag revenue lands now
        for project in projects {
            schedule.register(flows.period, project.collection_lag_months, project.monthly_revenue);
        }

        let cash_in = schedule.collect(flows.period);
        let cash_expenses = flows.total_cost_of_sales + flows.sga - flows.depreciation;
        let cash_out = cash_expenses + flows.tax + flows.repayment;

        CashMovement { cash_in, cash_out }
    }
}

/// Repayment policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepaymentMethod {
    #[default]
    FixedTarget,
    CashFlowCapped,
}

impl RepaymentMethod {
    pub const ALL: [RepaymentMethod; 2] = [RepaymentMethod::FixedTarget, RepaymentMethod::CashFlowCapped];

    pub fn policy(self) -> &'static dyn RepaymentPolicy {
        match self {
            RepaymentMethod::FixedTarget => &FixedTargetRepayment,
            RepaymentMethod::CashFlowCapped => &CashFlowCappedRepayment,
        }
    }
}

impl fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.policy().name())
    }
}

impl FromStr for RepaymentMethod {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.policy().name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StrategyParseError {
                kind: "repayment method",
                value: s.to_string(),
            })
    }
}

/// Cash timing model selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CashTiming {
    Accrual,
    #[default]
    CollectionSchedule,
}

impl CashTiming {
    pub const ALL: [CashTiming; 2] = [CashTiming::Accrual, CashTiming::CollectionSchedule];

    pub fn model(self) -> &'static dyn CashTimingModel {
        match self {
            CashTiming::Accrual => &AccrualApproximateCash,
            CashTiming::CollectionSchedule => &CollectionScheduleCash,
        }
    }
}

impl fmt::Display for CashTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model().name())
    }
}

impl FromStr for CashTiming {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|timing| timing.model().name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StrategyParseError {
                kind: "cash timing",
                value: s.to_string(),
            })
    }
}
