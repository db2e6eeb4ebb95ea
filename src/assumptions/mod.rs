//! Projection assumptions: corporate tax tiers and depreciation decay

mod depreciation;
mod tax;

pub use depreciation::{DepreciationSchedule, DEFAULT_DECAY_RATE};
pub use tax::{CorporateTax, ANNUAL_REDUCED_RATE_THRESHOLD, REDUCED_RATE, STANDARD_RATE};

use crate::inputs::SimulationParameters;

/// Container for the rules a projection run applies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assumptions {
    pub tax: CorporateTax,
    pub depreciation: DepreciationSchedule,
}

impl Assumptions {
    /// Default tax schedule with the run's depreciation settings
    pub fn from_parameters(params: &SimulationParameters) -> Self {
        Self::with_tax(params, CorporateTax::default())
    }

    pub fn with_tax(params: &SimulationParameters, tax: CorporateTax) -> Self {
        Self {
            tax,
            depreciation: DepreciationSchedule::new(
                params.initial_annual_depreciation,
                params.depreciation_decay_rate,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::YearMonth;

    #[test]
    fn test_from_parameters_uses_run_depreciation() {
        let mut params = SimulationParameters::with_defaults(YearMonth::new(2025, 4).unwrap());
        params.initial_annual_depreciation = 1_200.0;
        params.depreciation_decay_rate = 0.5;

        let assumptions = Assumptions::from_parameters(&params);
        assert_eq!(assumptions.tax, CorporateTax::default());
        assert_eq!(assumptions.depreciation.annual(0), 1_200.0);
        assert_eq!(assumptions.depreciation.annual(2), 300.0);
    }
}
