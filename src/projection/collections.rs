//! Cash collection schedule keyed by calendar month

use crate::period::YearMonth;
use std::collections::BTreeMap;

/// Project revenue waiting to be received, by month of receipt
#[derive(Debug, Clone, Default)]
pub struct CollectionSchedule {
    receipts: BTreeMap<YearMonth, f64>,
}

impl CollectionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register revenue accrued in `accrual_month` to be received `lag_months` later
    pub fn register(&mut self, accrual_month: YearMonth, lag_months: u32, amount: f64) {
        *self.receipts.entry(accrual_month.offset(lag_months)).or_insert(0.0) += amount;
    }

    /// Take everything due in `period`
    pub fn collect(&mut self, period: YearMonth) -> f64 {
        self.receipts.remove(&period).unwrap_or(0.0)
    }

    /// Total registered but not yet collected
    pub fn outstanding(&self) -> f64 {
        self.receipts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_collect() {
        let start = YearMonth::new(2025, 4).unwrap();
        let mut schedule = CollectionSchedule::new();

        schedule.register(start, 2, 1_000.0);
        schedule.register(start.offset(1), 1, 500.0);
        schedule.register(start, 0, 250.0);

        assert_eq!(schedule.collect(start), 250.0);
        assert_eq!(schedule.collect(start.offset(1)), 0.0);
        assert_eq!(schedule.outstanding(), 1_500.0);
        assert_eq!(schedule.collect(start.offset(2)), 1_500.0);
        assert_eq!(schedule.collect(start.offset(2)), 0.0);
        assert_eq!(schedule.outstanding(), 0.0);
    }
}
