//! Derives the visible, ordered ticket set for the overview.
//!
//! Stages run in a fixed sequence: [`compact`] drops the `null` holes a
//! partial query result may contain, then [`filter_tickets`],
//! [`sort_tickets`] and [`partition_by_semester`]. Every stage is a pure
//! function of its arguments; "now" is always passed in.

pub mod commands;
pub mod filter;
pub mod query;
pub mod semester;
pub mod sort;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::Ticket;

pub use filter::{filter_tickets, FilterCriteria};
pub use query::TicketQuery;
pub use semester::{partition_by_semester, semester_start, SemesterPartition};
pub use sort::{sort_tickets, sorted_tickets, SortField, TicketSorting};

/// Removes missing entries so later stages only see real tickets.
pub fn compact<I>(records: I) -> Vec<Ticket>
where
    I: IntoIterator<Item = Option<Ticket>>,
{
    records.into_iter().flatten().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketOverview {
    pub semester_start: DateTime<Utc>,
    /// Tickets that survived compaction
    pub total: usize,
    /// Tickets that matched the filter, including any without a readable
    /// creation date
    pub matching: usize,
    #[serde(flatten)]
    pub partition: SemesterPartition,
}

impl TicketOverview {
    pub fn build<I>(
        records: I,
        filter: &FilterCriteria,
        sorting: &TicketSorting,
        now: DateTime<Utc>,
    ) -> Self
    where
        I: IntoIterator<Item = Option<Ticket>>,
    {
        let tickets = compact(records);
        let total = tickets.len();

        let mut visible = filter_tickets(filter, &tickets);
        let matching = visible.len();
        sort_tickets(sorting, &mut visible);

        Self {
            semester_start: semester_start(now),
            total,
            matching,
            partition: partition_by_semester(now, visible),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::db::models::{Ticket, TicketLabel, TicketState, Timestamp};

    pub fn ticket(id: &str, title: &str, created_at: &str) -> Ticket {
        Ticket {
            id: id.into(),
            title: title.into(),
            original_title: title.into(),
            text: String::new(),
            note: None,
            state: TicketState::New,
            created_at: Timestamp::parse(created_at),
            last_modified: Timestamp::parse(created_at),
            labels: Vec::new(),
        }
    }

    pub fn labelled(mut ticket: Ticket, labels: &[(i64, &str)]) -> Ticket {
        ticket.labels = labels
            .iter()
            .map(|(id, name)| TicketLabel {
                id: *id,
                name: (*name).into(),
                color: "#7a7777".into(),
            })
            .collect();
        ticket
    }
}
