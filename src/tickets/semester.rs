//! Splits tickets into the running academic semester and everything older.
//!
//! Semesters follow the two-intake calendar: winter term from October 1,
//! summer term from April 1. All dates are evaluated in UTC.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{day_start, Ticket};

const WINTER_START_MONTH: u32 = 10;
const SUMMER_START_MONTH: u32 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterPartition {
    pub current_semester: Vec<Ticket>,
    pub older_semesters: Vec<Ticket>,
}

/// First instant of the semester containing `now`.
pub fn semester_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = match now.month() {
        m if m >= WINTER_START_MONTH => (now.year(), WINTER_START_MONTH),
        m if m >= SUMMER_START_MONTH => (now.year(), SUMMER_START_MONTH),
        _ => (now.year() - 1, WINTER_START_MONTH),
    };

    // Out of range only at chrono's lower year limit.
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(day_start)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Partitions `tickets` relative to the semester containing `now`.
///
/// Relative order is kept inside each bucket. Tickets whose `created_at`
/// could not be parsed belong to neither bucket.
pub fn partition_by_semester(now: DateTime<Utc>, tickets: Vec<Ticket>) -> SemesterPartition {
    let start = semester_start(now);
    let mut partition = SemesterPartition::default();

    for ticket in tickets {
        match ticket.created_at.instant() {
            Some(created) if created >= start => partition.current_semester.push(ticket),
            Some(_) => partition.older_semesters.push(ticket),
            None => {}
        }
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::test_support::ticket;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn ids(tickets: &[Ticket]) -> Vec<&str> {
        tickets.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn start_follows_two_intake_calendar() {
        let oct = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let apr = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let prev_oct = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();

        assert_eq!(semester_start(at(2025, 11, 15)), oct);
        assert_eq!(semester_start(at(2025, 10, 1)), oct);
        assert_eq!(semester_start(at(2025, 9, 30)), apr);
        assert_eq!(semester_start(at(2025, 4, 1)), apr);
        assert_eq!(semester_start(at(2025, 3, 31)), prev_oct);
        assert_eq!(semester_start(at(2025, 1, 1)), prev_oct);
    }

    #[test]
    fn winter_term_boundary_is_inclusive() {
        let tickets = vec![
            ticket("oct-1", "a", "2025-10-01"),
            ticket("sep-30", "b", "2025-09-30"),
        ];

        let partition = partition_by_semester(at(2025, 11, 15), tickets);
        assert_eq!(ids(&partition.current_semester), vec!["oct-1"]);
        assert_eq!(ids(&partition.older_semesters), vec!["sep-30"]);
    }

    #[test]
    fn early_year_reaches_back_to_previous_october() {
        let tickets = vec![
            ticket("prev-oct", "a", "2024-10-01"),
            ticket("prev-sep", "b", "2024-09-30T23:59:59Z"),
        ];

        let partition = partition_by_semester(at(2025, 2, 15), tickets);
        assert_eq!(ids(&partition.current_semester), vec!["prev-oct"]);
        assert_eq!(ids(&partition.older_semesters), vec!["prev-sep"]);
    }

    #[test]
    fn invalid_dates_land_in_neither_bucket() {
        let tickets = vec![ticket("broken", "a", "31.12.2024"), ticket("ok", "b", "2025-05-01")];
        let partition = partition_by_semester(at(2025, 6, 1), tickets);
        assert_eq!(ids(&partition.current_semester), vec!["ok"]);
        assert!(partition.older_semesters.is_empty());
    }

    #[test]
    fn repeated_calls_with_same_now_agree() {
        let tickets = vec![ticket("1", "a", "2025-04-02"), ticket("2", "b", "2025-01-02")];
        let now = at(2025, 5, 5);
        assert_eq!(
            partition_by_semester(now, tickets.clone()),
            partition_by_semester(now, tickets)
        );
    }
}
