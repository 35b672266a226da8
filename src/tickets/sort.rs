//! Total ordering of tickets by one selectable field.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::db::models::{Ticket, Timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    LastModified,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSorting {
    pub field: SortField,
    pub ascending: bool,
}

impl Default for TicketSorting {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            ascending: true,
        }
    }
}

impl TicketSorting {
    pub fn new(field: SortField, ascending: bool) -> Self {
        Self { field, ascending }
    }

    /// Comparator for one pair. Invalid timestamps stay last in both
    /// directions; only the comparison between valid values is flipped.
    pub fn compare(&self, a: &Ticket, b: &Ticket) -> Ordering {
        match self.field {
            SortField::CreatedAt => self.compare_instants(&a.created_at, &b.created_at),
            SortField::LastModified => self.compare_instants(&a.last_modified, &b.last_modified),
            SortField::Title => self.directed(compare_titles(&a.title, &b.title)),
        }
    }

    fn compare_instants(&self, a: &Timestamp, b: &Timestamp) -> Ordering {
        match (a.is_valid(), b.is_valid()) {
            (true, true) => self.directed(a.cmp_invalid_last(b)),
            _ => a.cmp_invalid_last(b),
        }
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

/// Lower-cased code point order. No locale collation: "Ä" sorts after "z".
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Sorts in place. The sort is stable, so equal elements keep input order.
pub fn sort_tickets(sorting: &TicketSorting, tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| sorting.compare(a, b));
}

/// Owned variant of [`sort_tickets`].
pub fn sorted_tickets(sorting: &TicketSorting, mut tickets: Vec<Ticket>) -> Vec<Ticket> {
    sort_tickets(sorting, &mut tickets);
    tickets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::test_support::ticket;

    fn ids(tickets: &[Ticket]) -> Vec<&str> {
        tickets.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn defaults_to_created_ascending() {
        let sorting = TicketSorting::default();
        assert_eq!(sorting.field, SortField::CreatedAt);
        assert!(sorting.ascending);
    }

    #[test]
    fn title_is_case_insensitive() {
        let tickets = vec![ticket("1", "Z", "2025-01-10"), ticket("2", "a", "2025-01-05")];
        let sorted = sorted_tickets(&TicketSorting::new(SortField::Title, true), tickets);
        assert_eq!(ids(&sorted), vec!["2", "1"]);
    }

    #[test]
    fn title_uses_code_point_order_not_locale() {
        // A locale-aware collator would put "Ärger" between "apfel" and "zebra".
        let tickets = vec![
            ticket("umlaut", "Ärger", "2025-01-01"),
            ticket("z", "zebra", "2025-01-01"),
            ticket("a", "apfel", "2025-01-01"),
        ];
        let sorted = sorted_tickets(&TicketSorting::new(SortField::Title, true), tickets);
        assert_eq!(ids(&sorted), vec!["a", "z", "umlaut"]);
    }

    #[test]
    fn last_modified_descending_is_reverse_chronological() {
        let mut first = ticket("1", "a", "2025-01-01");
        first.last_modified = Timestamp::parse("2025-03-01T10:00:00Z");
        let mut second = ticket("2", "b", "2025-01-01");
        second.last_modified = Timestamp::parse("2025-03-03T10:00:00Z");
        let mut third = ticket("3", "c", "2025-01-01");
        third.last_modified = Timestamp::parse("2025-03-02T10:00:00Z");

        let sorted = sorted_tickets(
            &TicketSorting::new(SortField::LastModified, false),
            vec![first, second, third],
        );
        assert_eq!(ids(&sorted), vec!["2", "3", "1"]);
    }

    #[test]
    fn ties_keep_input_order_in_both_directions() {
        let tickets = vec![
            ticket("b", "same", "2025-01-01"),
            ticket("a", "same", "2025-01-01"),
            ticket("c", "same", "2025-01-01"),
        ];

        for ascending in [true, false] {
            let sorted = sorted_tickets(
                &TicketSorting::new(SortField::CreatedAt, ascending),
                tickets.clone(),
            );
            assert_eq!(ids(&sorted), vec!["b", "a", "c"]);
        }
    }

    #[test]
    fn invalid_dates_sort_last_either_way() {
        let tickets = vec![
            ticket("broken", "x", "??"),
            ticket("old", "x", "2024-01-01"),
            ticket("new", "x", "2025-01-01"),
        ];

        let asc = sorted_tickets(&TicketSorting::default(), tickets.clone());
        assert_eq!(ids(&asc), vec!["old", "new", "broken"]);

        let desc = sorted_tickets(&TicketSorting::new(SortField::CreatedAt, false), tickets);
        assert_eq!(ids(&desc), vec!["new", "old", "broken"]);
    }
}
