//! Annual view derived from monthly records
//!
//! Flows are summed, balances are taken from the last month of the year, and
//! margins are recomputed from the summed figures rather than averaged.

use super::cashflows::{revenue_ratio, PeriodRecord, PlanImpact, ProjectionResult};
use crate::period::YearMonth;
use serde::{Deserialize, Serialize};

/// One projection year of aggregated output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    /// 1-based projection year; 0 for the opening-balance row
    pub fiscal_year: u32,
    pub first_period: Option<YearMonth>,
    pub last_period: Option<YearMonth>,
    pub months: u32,

    pub revenue: f64,
    pub cost_of_sales: f64,
    pub gross_profit: f64,
    pub sga: f64,
    pub operating_profit: f64,
    pub ordinary_profit: f64,
    pub tax: f64,
    pub net_profit: f64,
    pub depreciation: f64,
    pub simple_cash_flow: f64,
    pub repayment_actual: f64,
    pub cash_in: f64,
    pub cash_out: f64,

    pub debt_balance: f64,
    pub cash_balance: f64,
    pub receivables: f64,

    pub plan_impacts: Vec<PlanImpact>,
}

impl AnnualRecord {
    /// Opening balances before the first projected month
    pub fn opening(result: &ProjectionResult) -> Self {
        let mut row = Self::empty(0, &result.plan_columns);
        row.debt_balance = result.opening_debt;
        row.cash_balance = result.opening_cash;
        row
    }

    fn empty(fiscal_year: u32, plan_columns: &[String]) -> Self {
        Self {
            fiscal_year,
            first_period: None,
            last_period: None,
            months: 0,
            revenue: 0.0,
            cost_of_sales: 0.0,
            gross_profit: 0.0,
            sga: 0.0,
            operating_profit: 0.0,
            ordinary_profit: 0.0,
            tax: 0.0,
            net_profit: 0.0,
            depreciation: 0.0,
            simple_cash_flow: 0.0,
            repayment_actual: 0.0,
            cash_in: 0.0,
            cash_out: 0.0,
            debt_balance: 0.0,
            cash_balance: 0.0,
            receivables: 0.0,
            plan_impacts: plan_columns
                .iter()
                .map(|name| PlanImpact {
                    name: name.clone(),
                    amount: 0.0,
                })
                .collect(),
        }
    }

    fn accumulate(&mut self, record: &PeriodRecord) {
        if self.first_period.is_none() {
            self.first_period = Some(record.period);
        }
        self.last_period = Some(record.period);
        self.months += 1;

        self.revenue += record.revenue;
        self.cost_of_sales += record.cost_of_sales;
        self.gross_profit += record.gross_profit;
        self.sga += record.sga;
        self.operating_profit += record.operating_profit;
        self.ordinary_profit += record.ordinary_profit;
        self.tax += record.tax;
        self.net_profit += record.net_profit;
        self.depreciation += record.depreciation;
        self.simple_cash_flow += record.simple_cash_flow;
        self.repayment_actual += record.repayment_actual;
        self.cash_in += record.cash_in;
        self.cash_out += record.cash_out;

        self.debt_balance = record.debt_balance;
        self.cash_balance = record.cash_balance;
        self.receivables = record.receivables;

        for impact in &record.plan_impacts {
            if let Some(total) = self.plan_impacts.iter_mut().find(|t| t.name == impact.name) {
                total.amount += impact.amount;
            }
        }
    }

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
}

/// Group monthly records by projection year
pub fn aggregate_annual(records: &[PeriodRecord], plan_columns: &[String]) -> Vec<AnnualRecord> {
    let mut years: Vec<AnnualRecord> = Vec::new();

    for record in records {
        let needs_new_year = years.last().map_or(true, |year| year.fiscal_year != record.fiscal_year);
        if needs_new_year {
            years.push(AnnualRecord::empty(record.fiscal_year, plan_columns));
        }
        if let Some(year) = years.last_mut() {
            year.accumulate(record);
        }
    }

    years
}

impl ProjectionResult {
    /// Annual view, one row per projection year
    pub fn annual(&self) -> Vec<AnnualRecord> {
        aggregate_annual(&self.records, &self.plan_columns)
    }

    /// Annual view preceded by a year-0 row holding the opening balances
    pub fn annual_with_opening(&self) -> Vec<AnnualRecord> {
        let mut rows = vec![AnnualRecord::opening(self)];
        rows.extend(self.annual());
        rows
    }
}
