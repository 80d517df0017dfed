//! Common types used across the platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive time range for ledger queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true when `at` falls within the range, bounds included
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_range_bounds_are_inclusive() {
        let start = Utc::now();
        let range = DateRange::new(start, start + Duration::hours(1));
        assert!(range.contains(start));
        assert!(range.contains(range.end));
        assert!(!range.contains(start - Duration::seconds(1)));
        assert!(range.is_valid());
        assert!(!DateRange::new(range.end, start).is_valid());
    }
}
