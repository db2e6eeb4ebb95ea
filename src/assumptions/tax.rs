//! Two-tier corporate tax, prorated monthly from an annual threshold

use serde::{Deserialize, Serialize};

/// Annual taxable income taxed at the reduced rate (thousands of currency)
pub const ANNUAL_REDUCED_RATE_THRESHOLD: f64 = 8_000.0;

/// Rate applied up to the threshold
pub const REDUCED_RATE: f64 = 0.15;

/// Rate applied above the threshold
pub const STANDARD_RATE: f64 = 0.232;

/// Small-business corporate tax schedule
///
/// Each month is taxed on its own: a loss month pays nothing and earns no
/// carry-forward, and there is no annual true-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorporateTax {
    pub annual_threshold: f64,
    pub reduced_rate: f64,
    pub standard_rate: f64,
}

impl Default for CorporateTax {
    fn default() -> Self {
        Self {
            annual_threshold: ANNUAL_REDUCED_RATE_THRESHOLD,
            reduced_rate: REDUCED_RATE,
            standard_rate: STANDARD_RATE,
        }
    }
}

impl CorporateTax {
    /// Reduced-rate band for a single month
    pub fn monthly_threshold(&self) -> f64 {
        self.annual_threshold / 12.0
    }

    /// Tax on one month's ordinary profit
    pub fn monthly_tax(&self, ordinary_profit: f64) -> f64 {
        let taxable = ordinary_profit.max(0.0);
        let threshold = self.monthly_threshold();
        taxable.min(threshold) * self.reduced_rate
            + (taxable - threshold).max(0.0) * self.standard_rate
    }
}
