//! Compound ticket predicate: free text AND states AND labels AND date range.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Ticket, TicketState};

/// User-selected constraints narrowing the visible ticket set.
///
/// Every field is always present. An empty `states` or `labels` set places no
/// restriction on that axis; a `None` date bound is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_term: String,
    pub states: BTreeSet<TicketState>,
    /// Label ids; a ticket matches when it carries any of them.
    pub labels: BTreeSet<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    /// The filter the ticket overview opens with: only unresolved tickets.
    pub fn landing() -> Self {
        Self {
            states: BTreeSet::from([TicketState::New, TicketState::Open]),
            ..Self::default()
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_search(ticket)
            && self.matches_state(ticket)
            && self.matches_labels(ticket)
            && self.matches_date_range(ticket)
    }

    fn matches_search(&self, ticket: &Ticket) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        ticket.title.to_lowercase().contains(&needle) || ticket.text.to_lowercase().contains(&needle)
    }

    fn matches_state(&self, ticket: &Ticket) -> bool {
        self.states.is_empty() || self.states.contains(&ticket.state)
    }

    fn matches_labels(&self, ticket: &Ticket) -> bool {
        self.labels.is_empty() || self.labels.iter().any(|id| ticket.has_label(*id))
    }

    fn matches_date_range(&self, ticket: &Ticket) -> bool {
        let after_start = self
            .start_date
            .map_or(true, |start| ticket.created_at.is_at_or_after(start));
        let before_end = self
            .end_date
            .map_or(true, |end| ticket.created_at.is_at_or_before(end));
        after_start && before_end
    }
}

/// Tickets matching `criteria`, in input order.
pub fn filter_tickets(criteria: &FilterCriteria, tickets: &[Ticket]) -> Vec<Ticket> {
    if criteria.is_unrestricted() {
        return tickets.to_vec();
    }
    tickets
        .iter()
        .filter(|ticket| criteria.matches(ticket))
        .cloned()
        .collect()
}
