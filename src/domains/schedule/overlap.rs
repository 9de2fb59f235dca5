use chrono::NaiveDateTime;
use log::debug;
use uuid::Uuid;

use super::ScheduledBlock;
use crate::errors::ValidationError;
use crate::validation::common::format_datetime;

/// First sibling whose half-open interval intersects `[start, end)`.
///
/// `exclude_id` is the block being written, which never collides with itself.
/// Siblings without both endpoints are ignored. Touching endpoints do not overlap.
pub fn find_overlap<'a, B: ScheduledBlock>(
    exclude_id: Option<Uuid>,
    start: NaiveDateTime,
    end: NaiveDateTime,
    siblings: &'a [B],
) -> Option<&'a B> {
    siblings.iter().find(|sibling| {
        if Some(sibling.block_id()) == exclude_id {
            return false;
        }
        match (sibling.starts_at(), sibling.ends_at()) {
            (Some(existing_start), Some(existing_end)) => existing_start < end && existing_end > start,
            _ => false,
        }
    })
}

/// Reject `[start, end)` when it intersects any sibling.
pub fn ensure_no_overlap<B: ScheduledBlock>(
    exclude_id: Option<Uuid>,
    start: NaiveDateTime,
    end: NaiveDateTime,
    siblings: &[B],
) -> Result<(), ValidationError> {
    debug!(
        "Scanning {} sibling sessions for overlap with {} - {}",
        siblings.len(),
        format_datetime(&start),
        format_datetime(&end)
    );
    match find_overlap(exclude_id, start, end, siblings) {
        None => Ok(()),
        Some(existing) => Err(ValidationError::Overlap {
            session: existing.title().to_string(),
            start: existing.starts_at().map(|dt| format_datetime(&dt)).unwrap_or_default(),
            end: existing.ends_at().map(|dt| format_datetime(&dt)).unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::schedule::tests::{at, Block};

    #[test]
    fn test_strict_overlap_is_found() {
        let existing = vec![Block::new("Morning", at(1, 9, 0), at(1, 11, 0))];
        let hit = find_overlap(None, at(1, 10, 0), at(1, 12, 0), &existing);
        assert_eq!(hit.map(|b| b.name.as_str()), Some("Morning"));

        // new interval fully containing the existing one
        assert!(find_overlap(None, at(1, 8, 0), at(1, 12, 0), &existing).is_some());
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        let existing = vec![Block::new("Morning", at(1, 9, 0), at(1, 11, 0))];
        assert!(find_overlap(None, at(1, 11, 0), at(1, 12, 0), &existing).is_none());
        assert!(find_overlap(None, at(1, 8, 0), at(1, 9, 0), &existing).is_none());
    }

    #[test]
    fn test_self_and_incomplete_blocks_are_skipped() {
        let morning = Block::new("Morning", at(1, 9, 0), at(1, 11, 0));
        let mut open_ended = Block::new("Open", at(1, 9, 0), at(1, 11, 0));
        open_ended.end = None;
        let siblings = vec![morning.clone(), open_ended];

        assert!(find_overlap(Some(morning.id), at(1, 9, 30), at(1, 10, 0), &siblings).is_none());
    }

    #[test]
    fn test_error_names_the_colliding_session() {
        let existing = vec![Block::new("Kick-off", at(1, 9, 0), at(1, 11, 0))];
        let err = ensure_no_overlap(None, at(1, 10, 0), at(1, 10, 30), &existing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Overlap detected with session 'Kick-off' (2025-06-01 09:00:00 - 2025-06-01 11:00:00)"
        );
    }
}
