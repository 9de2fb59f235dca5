use chrono::NaiveDate;
use serde::Serialize;

use super::duration::round_hours;
use super::ScheduledBlock;

/// Sessions sharing one calendar day, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup<T> {
    pub day: NaiveDate,
    pub sessions: Vec<T>,
    pub duration_hours: f64,
}

/// Partition blocks into runs sharing the start date.
///
/// Input must already be ordered by start time; a day that reappears after a
/// different day opens a new group. Blocks without a start are dropped.
pub fn group_by_day<T: ScheduledBlock>(blocks: Vec<T>) -> Vec<DayGroup<T>> {
    let mut groups: Vec<DayGroup<T>> = Vec::new();

    for block in blocks {
        let day = match block.starts_at() {
            Some(start) => start.date(),
            None => continue,
        };
        let hours = block.duration_hours();

        match groups.last_mut() {
            Some(current) if current.day == day => {
                current.duration_hours = round_hours(current.duration_hours + hours);
                current.sessions.push(block);
            }
            _ => groups.push(DayGroup {
                day,
                duration_hours: round_hours(hours),
                sessions: vec![block],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::schedule::tests::{at, Block};

    #[test]
    fn test_two_days() {
        let blocks = vec![
            Block::new("A", at(1, 9, 0), at(1, 11, 0)),
            Block::new("B", at(1, 14, 0), at(1, 16, 0)),
            Block::new("C", at(2, 9, 0), at(2, 10, 0)),
        ];
        let groups = group_by_day(blocks);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].day, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(groups[0].sessions.len(), 2);
        assert_eq!(groups[0].duration_hours, 4.0);
        assert_eq!(groups[1].sessions.len(), 1);
        assert_eq!(groups[1].duration_hours, 1.0);
    }

    #[test]
    fn test_missing_start_is_skipped() {
        let mut floating = Block::new("Floating", at(1, 9, 0), at(1, 10, 0));
        floating.start = None;
        let groups = group_by_day(vec![floating, Block::new("A", at(1, 9, 0), at(1, 10, 0))]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].sessions[0].name, "A");
    }

    #[test]
    fn test_unsorted_input_is_not_reordered() {
        let blocks = vec![
            Block::new("A", at(1, 9, 0), at(1, 10, 0)),
            Block::new("B", at(2, 9, 0), at(2, 10, 0)),
            Block::new("C", at(1, 14, 0), at(1, 15, 0)),
        ];
        let days: Vec<u32> = group_by_day(blocks)
            .iter()
            .map(|g| chrono::Datelike::day(&g.day))
            .collect();
        assert_eq!(days, vec![1, 2, 1]);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_day(Vec::<Block>::new()).is_empty());
    }
}
