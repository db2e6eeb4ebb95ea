//! Running balances carried from one month to the next

use super::collections::CollectionSchedule;
use crate::inputs::SimulationParameters;
use crate::period::YearMonth;

/// Mutable state of a projection between months
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// 0-based month of the projection
    pub month_index: u32,

    /// 0-based projection year
    pub year_index: u32,

    /// Calendar month being projected
    pub period: YearMonth,

    /// Debt outstanding before the current month's repayment
    pub debt_balance: f64,

    /// Cash on hand before the current month's movement
    pub cash_balance: f64,

    /// Revenue accrued and awaiting collection
    pub collections: CollectionSchedule,

    start_period: YearMonth,
}

impl ProjectionState {
    /// Initialize state at the projection start with opening balances
    pub fn from_parameters(params: &SimulationParameters) -> Self {
        Self {
            month_index: 0,
            year_index: 0,
            period: params.start_period,
            debt_balance: params.initial_debt,
            cash_balance: params.initial_cash,
            collections: CollectionSchedule::new(),
            start_period: params.start_period,
        }
    }

    /// Move to the given 0-based month, keeping balances
    pub fn enter_month(&mut self, month_index: u32) {
        self.month_index = month_index;
        self.year_index = month_index / 12;
        self.period = self.start_period.offset(month_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_month_tracks_calendar_and_year() {
        let params = SimulationParameters::with_defaults(YearMonth::new(2025, 4).unwrap());
        let mut state = ProjectionState::from_parameters(&params);
        assert_eq!(state.debt_balance, params.initial_debt);
        assert_eq!(state.cash_balance, params.initial_cash);

        state.enter_month(11);
        assert_eq!(state.year_index, 0);
        assert_eq!(state.period, YearMonth::new(2026, 3).unwrap());

        state.enter_month(12);
        assert_eq!(state.year_index, 1);
        assert_eq!(state.period, YearMonth::new(2026, 4).unwrap());
    }
}
