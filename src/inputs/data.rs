//! Input records supplied to a projection run

use crate::assumptions::DEFAULT_DECAY_RATE;
use crate::error::{CategoryParseError, ConfigError};
use crate::period::YearMonth;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_decay_rate() -> f64 {
    DEFAULT_DECAY_RATE
}

/// Static business assumptions for one run (amounts in thousands of currency)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// First calendar month of the projection
    pub start_period: YearMonth,

    /// Opening cash balance
    pub initial_cash: f64,

    /// Opening debt balance
    pub initial_debt: f64,

    /// Gross margin as a fraction of revenue
    pub gross_margin_rate: f64,

    /// Operating margin as a fraction of revenue
    pub operating_margin_rate: f64,

    /// Ordinary (pre-tax) margin as a fraction of revenue
    pub ordinary_margin_rate: f64,

    /// Contractual monthly debt repayment
    pub monthly_repayment_target: f64,

    /// Annual depreciation for the first projection year
    pub initial_annual_depreciation: f64,

    /// Year-over-year retention of annual depreciation
    #[serde(default = "default_decay_rate")]
    pub depreciation_decay_rate: f64,
}

impl SimulationParameters {
    /// Default dashboard assumptions starting at the given month
    pub fn with_defaults(start_period: YearMonth) -> Self {
        Self {
            start_period,
            initial_cash: 10_000.0,
            initial_debt: 50_000.0,
            gross_margin_rate: 0.40,
            operating_margin_rate: 0.10,
            ordinary_margin_rate: 0.10,
            monthly_repayment_target: 5_000.0 / 12.0,
            initial_annual_depreciation: 5_000.0,
            depreciation_decay_rate: DEFAULT_DECAY_RATE,
        }
    }

    /// Check the guarantees the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let amounts = [
            ("initial_cash", self.initial_cash),
            ("initial_debt", self.initial_debt),
            ("monthly_repayment_target", self.monthly_repayment_target),
            ("initial_annual_depreciation", self.initial_annual_depreciation),
            ("depreciation_decay_rate", self.depreciation_decay_rate),
        ];
        for (field, value) in amounts {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not a finite number")));
            }
        }
        for (field, value) in [
            ("initial_debt", self.initial_debt),
            ("monthly_repayment_target", self.monthly_repayment_target),
            ("initial_annual_depreciation", self.initial_annual_depreciation),
            ("depreciation_decay_rate", self.depreciation_decay_rate),
        ] {
            if value < 0.0 {
                return Err(invalid(field, format!("{value} must not be negative")));
            }
        }

        let rates = [
            ("gross_margin_rate", self.gross_margin_rate),
            ("operating_margin_rate", self.operating_margin_rate),
            ("ordinary_margin_rate", self.ordinary_margin_rate),
        ];
        for (field, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{value} is outside [0, 1]")));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { field, reason }
}

/// A revenue-generating project billed every month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    /// Display label
    pub name: String,

    /// Revenue accrued each month
    pub monthly_revenue: f64,

    /// Months between accrual and cash receipt
    pub collection_lag_months: u32,
}

impl ProjectRow {
    pub fn new(name: impl Into<String>, monthly_revenue: f64, collection_lag_months: u32) -> Self {
        Self {
            name: name.into(),
            monthly_revenue,
            collection_lag_months,
        }
    }
}

/// P&L line an action plan adjusts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanCategory {
    Revenue,
    CostOfSales,
    #[serde(rename = "SGA")]
    Sga,
}

impl PlanCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanCategory::Revenue => "Revenue",
            PlanCategory::CostOfSales => "CostOfSales",
            PlanCategory::Sga => "SGA",
        }
    }
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-' | '&'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "revenue" | "sales" | "売上高" | "売上" => Ok(PlanCategory::Revenue),
            "costofsales" | "cogs" | "売上原価" | "原価" => Ok(PlanCategory::CostOfSales),
            "sga" | "販管費" | "販売費及び一般管理費" => Ok(PlanCategory::Sga),
            _ => Err(CategoryParseError(trimmed.to_string())),
        }
    }
}

/// A dated adjustment to one P&L line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlanRow {
    pub category: PlanCategory,

    /// Unique label, also the output column key
    pub name: String,

    /// Signed monthly amount added to the category's line
    pub monthly_impact: f64,

    /// First month the plan applies; `None` means never active
    pub effective_from: Option<YearMonth>,
}

impl ActionPlanRow {
    pub fn new(
        category: PlanCategory,
        name: impl Into<String>,
        monthly_impact: f64,
        effective_from: Option<YearMonth>,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            monthly_impact,
            effective_from,
        }
    }

    /// Whether the plan applies in `period`
    pub fn is_active(&self, period: YearMonth) -> bool {
        self.effective_from.is_some_and(|from| period >= from)
    }
}

/// Everything one projection run consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInputs {
    pub parameters: SimulationParameters,
    #[serde(default)]
    pub projects: Vec<ProjectRow>,
    #[serde(default)]
    pub action_plans: Vec<ActionPlanRow>,
}

impl ProjectionInputs {
    pub fn new(
        parameters: SimulationParameters,
        projects: Vec<ProjectRow>,
        action_plans: Vec<ActionPlanRow>,
    ) -> Self {
        Self {
            parameters,
            projects,
            action_plans,
        }
    }

    /// Default assumptions with one sample project worth 100,000 a year
    pub fn with_defaults(start_period: YearMonth) -> Self {
        Self {
            parameters: SimulationParameters::with_defaults(start_period),
            projects: vec![ProjectRow::new("Base business", 100_000.0 / 12.0, 0)],
            action_plans: Vec::new(),
        }
    }

    /// Sum of project revenue accrued every month
    pub fn base_monthly_revenue(&self) -> f64 {
        self.projects.iter().map(|p| p.monthly_revenue).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> YearMonth {
        YearMonth::new(2025, 4).unwrap()
    }

    #[test]
    fn test_default_parameters_validate() {
        let params = SimulationParameters::with_defaults(start());
        assert!(params.validate().is_ok());
        assert_eq!(params.depreciation_decay_rate, 0.90);
    }

    #[test]
    fn test_validate_rejects_out_of_range_margin() {
        let mut params = SimulationParameters::with_defaults(start());
        params.gross_margin_rate = 1.2;
        match params.validate() {
            Err(ConfigError::InvalidParameter { field, .. }) => assert_eq!(field, "gross_margin_rate"),
            other => panic!("expected invalid parameter, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_non_finite_and_negative() {
        let mut params = SimulationParameters::with_defaults(start());
        params.initial_cash = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = SimulationParameters::with_defaults(start());
        params.initial_debt = -1.0;
        assert!(params.validate().is_err());

        // Negative opening cash is an overdraft, not an error
        let mut params = SimulationParameters::with_defaults(start());
        params.initial_cash = -500.0;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Revenue".parse::<PlanCategory>().unwrap(), PlanCategory::Revenue);
        assert_eq!("cost of sales".parse::<PlanCategory>().unwrap(), PlanCategory::CostOfSales);
        assert_eq!("SG&A".parse::<PlanCategory>().unwrap(), PlanCategory::Sga);
        assert_eq!("売上高".parse::<PlanCategory>().unwrap(), PlanCategory::Revenue);
        assert_eq!("売上原価".parse::<PlanCategory>().unwrap(), PlanCategory::CostOfSales);
        assert_eq!("販管費".parse::<PlanCategory>().unwrap(), PlanCategory::Sga);
        assert!("Capex".parse::<PlanCategory>().is_err());
    }

    #[test]
    fn test_plan_activation() {
        let plan = ActionPlanRow::new(PlanCategory::Revenue, "New client", 2000.0, Some(start().offset(6)));
        assert!(!plan.is_active(start()));
        assert!(!plan.is_active(start().offset(5)));
        assert!(plan.is_active(start().offset(6)));
        assert!(plan.is_active(start().offset(40)));

        let never = ActionPlanRow::new(PlanCategory::Sga, "Undated", 100.0, None);
        assert!(!never.is_active(start().offset(59)));
    }

    #[test]
    fn test_base_monthly_revenue() {
        let inputs = ProjectionInputs::new(
            SimulationParameters::with_defaults(start()),
            vec![ProjectRow::new("A", 1000.0, 0), ProjectRow::new("B", 250.5, 2)],
            Vec::new(),
        );
        assert_eq!(inputs.base_monthly_revenue(), 1250.5);
    }
}
