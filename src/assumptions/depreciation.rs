//! Declining depreciation schedule

use serde::{Deserialize, Serialize};

/// Share of the prior year's depreciation carried into the next year
pub const DEFAULT_DECAY_RATE: f64 = 0.90;

/// Annual depreciation decaying by a fixed rate at each 12-month boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    /// Depreciation for the first projection year
    pub initial_annual: f64,

    /// Year-over-year retention
    pub decay_rate: f64,
}

impl DepreciationSchedule {
    pub fn new(initial_annual: f64, decay_rate: f64) -> Self {
        Self {
            initial_annual,
            decay_rate,
        }
    }

    /// Annual depreciation for a 0-based projection year
    pub fn annual(&self, year_index: u32) -> f64 {
        self.initial_annual * self.decay_rate.powi(year_index as i32)
    }

    /// Monthly depreciation for a 0-based projection month
    pub fn monthly(&self, month_index: u32) -> f64 {
        self.annual(month_index / 12) / 12.0
    }
}
