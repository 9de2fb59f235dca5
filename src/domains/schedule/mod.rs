//! Scheduling rules shared by events, modules and sessions: inclusive day and
//! hour durations, half-open overlap detection and day grouping.

pub mod duration;
pub mod grouping;
pub mod overlap;

use chrono::NaiveDateTime;
use uuid::Uuid;

pub use duration::{duration_days, duration_hours};
pub use grouping::{group_by_day, DayGroup};
pub use overlap::{ensure_no_overlap, find_overlap};

/// A titled time block that can be checked for overlap and grouped by day.
pub trait ScheduledBlock {
    fn block_id(&self) -> Uuid;
    fn title(&self) -> &str;
    fn starts_at(&self) -> Option<NaiveDateTime>;
    fn ends_at(&self) -> Option<NaiveDateTime>;

    fn duration_hours(&self) -> f64 {
        duration_hours(self.starts_at(), self.ends_at())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    pub struct Block {
        pub id: Uuid,
        pub name: String,
        pub start: Option<NaiveDateTime>,
        pub end: Option<NaiveDateTime>,
    }

    impl Block {
        pub fn new(name: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
            Self {
                id: Uuid::new_v4(),
                name: name.to_string(),
                start: Some(start),
                end: Some(end),
            }
        }
    }

    impl ScheduledBlock for Block {
        fn block_id(&self) -> Uuid {
            self.id
        }
        fn title(&self) -> &str {
            &self.name
        }
        fn starts_at(&self) -> Option<NaiveDateTime> {
            self.start
        }
        fn ends_at(&self) -> Option<NaiveDateTime> {
            self.end
        }
    }

    /// June 2025 at the given day and time.
    pub fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_default_duration_uses_endpoints() {
        let block = Block::new("A", at(1, 9, 0), at(1, 10, 30));
        assert_eq!(block.duration_hours(), 1.5);
    }
}
