//! Ticket-related data models.

use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};

use super::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketState {
    New,
    Open,
    Closed,
}

impl TicketState {
    pub const ALL: [TicketState; 3] = [TicketState::New, TicketState::Open, TicketState::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::New => "NEW",
            TicketState::Open => "OPEN",
            TicketState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketState {
    type Err = Error;

    /// Case-insensitive, so both the stored `NEW` and the query form `new` work.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "NEW" => Ok(TicketState::New),
            "OPEN" => Ok(TicketState::Open),
            "CLOSED" => Ok(TicketState::Closed),
            _ => Err(anyhow!("unknown ticket state '{value}'")),
        }
    }
}

/// Label reference as embedded in a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLabel {
    pub id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub original_title: String,
    pub text: String,
    #[serde(default)]
    pub note: Option<String>,
    pub state: TicketState,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<TicketLabel>,
}

impl Ticket {
    pub fn has_label(&self, label_id: i64) -> bool {
        self.labels.iter().any(|label| label.id == label_id)
    }
}

/// Submission from the public form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketInput {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub label_ids: Vec<i64>,
}

/// Admin-side edit; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub note: Option<String>,
    pub state: Option<TicketState>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
