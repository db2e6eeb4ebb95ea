//! Projection output structures

use super::engine::ProjectionConfig;
use crate::period::YearMonth;
use serde::{Deserialize, Serialize};

/// `numerator / revenue`, or 0 when there is no revenue
pub fn revenue_ratio(numerator: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        numerator / revenue
    } else {
        0.0
    }
}

/// One action plan's contribution to a period (0 while inactive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanImpact {
    pub name: String,
    pub amount: f64,
}

/// A single month of projection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    // Timing
    pub period: YearMonth,
    /// 1-based month of the projection
    pub projection_month: u32,
    /// 1-based projection year
    pub fiscal_year: u32,

    // Income statement
    pub revenue: f64,
    pub cost_of_sales: f64,
    pub gross_profit: f64,
    pub sga: f64,
    pub operating_profit: f64,
    pub ordinary_profit: f64,
    pub tax: f64,
    pub net_profit: f64,
    pub depreciation: f64,

    // Cash flow and balances
    pub simple_cash_flow: f64,
    pub repayment_actual: f64,
    pub debt_balance: f64,
    pub cash_in: f64,
    pub cash_out: f64,
    pub cash_balance: f64,
    /// Project revenue accrued but not yet collected at month end
    pub receivables: f64,

    // Memo columns, one per distinct action plan name
    pub plan_impacts: Vec<PlanImpact>,
}

impl PeriodRecord {
    pub fn gross_margin_ratio(&self) -> f64 {
        revenue_ratio(self.gross_profit, self.revenue)
    }

    pub fn operating_margin_ratio(&self) -> f64 {
        revenue_ratio(self.operating_profit, self.revenue)
    }

    pub fn ordinary_margin_ratio(&self) -> f64 {
        revenue_ratio(self.ordinary_profit, self.revenue)
    }

    pub fn net_margin_ratio(&self) -> f64 {
        revenue_ratio(self.net_profit, self.revenue)
    }

    /// Impact of the named plan this month, `None` if no such plan column exists
    pub fn plan_impact(&self, name: &str) -> Option<f64> {
        self.plan_impacts.iter().find(|p| p.name == name).map(|p| p.amount)
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Policies the run used
    pub config: ProjectionConfig,

    pub opening_debt: f64,
    pub opening_cash: f64,

    /// Distinct action plan names in first-appearance order
    pub plan_columns: Vec<String>,

    /// Monthly records in chronological order
    pub records: Vec<PeriodRecord>,
}

impl ProjectionResult {
    pub fn new(config: ProjectionConfig, opening_debt: f64, opening_cash: f64, plan_columns: Vec<String>) -> Self {
        Self {
            config,
            opening_debt,
            opening_cash,
            plan_columns,
            records: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: PeriodRecord) {
        self.records.push(row);
    }

    pub fn final_debt(&self) -> f64 {
        self.records.last().map(|r| r.debt_balance).unwrap_or(self.opening_debt)
    }

    pub fn final_cash(&self) -> f64 {
        self.records.last().map(|r| r.cash_balance).unwrap_or(self.opening_cash)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_revenue: f64 = self.records.iter().map(|r| r.revenue).sum();
        let total_net_profit: f64 = self.records.iter().map(|r| r.net_profit).sum();
        let total_tax: f64 = self.records.iter().map(|r| r.tax).sum();
        let total_repayment: f64 = self.records.iter().map(|r| r.repayment_actual).sum();

        let lowest = self
            .records
            .iter()
            .min_by(|a, b| a.cash_balance.total_cmp(&b.cash_balance));

        let debt_free_period = if self.opening_debt <= 0.0 {
            self.records.first().map(|r| r.period)
        } else {
            self.records.iter().find(|r| r.debt_balance <= 0.0).map(|r| r.period)
        };

        ProjectionSummary {
            total_months: self.records.len() as u32,
            total_revenue,
            total_net_profit,
            total_tax,
            total_repayment,
            final_debt: self.final_debt(),
            final_cash: self.final_cash(),
            lowest_cash: lowest.map(|r| r.cash_balance).unwrap_or(self.opening_cash),
            lowest_cash_period: lowest.map(|r| r.period),
            debt_free_period,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_months: u32,
    pub total_revenue: f64,
    pub total_net_profit: f64,
    pub total_tax: f64,
    pub total_repayment: f64,
    pub final_debt: f64,
    pub final_cash: f64,
    pub lowest_cash: f64,
    pub lowest_cash_period: Option<YearMonth>,
    /// First month ending with no debt
    pub debt_free_period: Option<YearMonth>,
}
