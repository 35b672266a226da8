use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::TicketState;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_state(value: &str) -> Result<TicketState> {
    value
        .parse::<TicketState>()
        .with_context(|| format!("invalid ticket state in database: {value}"))
}

/// `?1, ?2, ...` for an `IN (...)` clause with `count` parameters.
pub fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_list() {
        assert_eq!(placeholders(3), "?1, ?2, ?3");
        assert_eq!(placeholders(0), "");
    }

    #[test]
    fn stored_states_round_trip() {
        assert_eq!(parse_state("CLOSED").unwrap(), TicketState::Closed);
        assert!(parse_state("DONE").is_err());
    }
}
