//! Query-string form of the overview's filter and sort state, so a filtered
//! view can be bookmarked or shared.
//!
//! Values are percent-encoded. Multi-valued keys join their encoded values
//! with a literal `+`, so a `+` inside a label name travels as `%2B`. In
//! single-valued keys a bare `+` reads as a space, as form encoding writes it.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::warn;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::db::models::{day_start, Label, TicketState};

use super::{FilterCriteria, SortField, TicketSorting};

pub const SEARCH_QUERY_KEY: &str = "search";
pub const STATUS_QUERY_KEY: &str = "status";
pub const LABELS_QUERY_KEY: &str = "labels";
pub const START_QUERY_KEY: &str = "start";
pub const END_QUERY_KEY: &str = "end";
pub const SORT_FIELD_QUERY_KEY: &str = "sort";
pub const SORT_ORDER_QUERY_KEY: &str = "ord";

const VALUE_SEPARATOR: char = '+';
// Everything that would end, split or reinterpret a value; non-ASCII is always
// encoded.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');
const DESCENDING: &str = "desc";
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";
// Date::toDateString(), e.g. "Wed Jan 01 2025"
const LEGACY_DATE_FORMAT: &str = "%a %b %d %Y";

impl SortField {
    pub fn query_value(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "Erstellt",
            SortField::LastModified => "Geändert",
            SortField::Title => "Titel",
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "Erstellt" | "created" | "createdAt" => Some(SortField::CreatedAt),
            "Geändert" | "modified" | "lastModified" => Some(SortField::LastModified),
            "Titel" | "title" => Some(SortField::Title),
            _ => None,
        }
    }
}

/// Filter and sort state as carried in a URL. Labels travel by name and are
/// resolved to ids against the current label list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub search: String,
    pub states: BTreeSet<TicketState>,
    pub label_names: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub sorting: TicketSorting,
}

impl Default for TicketQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            states: FilterCriteria::landing().states,
            label_names: Vec::new(),
            start: None,
            end: None,
            sorting: TicketSorting::default(),
        }
    }
}

impl TicketQuery {
    /// Takes pairs as they appear in the URL, values still encoded. Later
    /// duplicates of a key win. Unknown keys and unreadable values are
    /// ignored; a missing `status` means the landing states.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Self::default();

        for (key, value) in pairs {
            match key {
                SEARCH_QUERY_KEY => query.search = decode_value(value),
                STATUS_QUERY_KEY => {
                    query.states = split_values(value)
                        .filter_map(|raw| raw.parse::<TicketState>().ok())
                        .collect();
                }
                LABELS_QUERY_KEY => {
                    query.label_names = split_values(value).collect();
                }
                START_QUERY_KEY => query.start = parse_query_date(&decode_value(value)),
                END_QUERY_KEY => query.end = parse_query_date(&decode_value(value)),
                SORT_FIELD_QUERY_KEY => {
                    if let Some(field) = SortField::from_query_value(&decode_value(value)) {
                        query.sorting.field = field;
                    }
                }
                SORT_ORDER_QUERY_KEY => {
                    query.sorting.ascending = decode_value(value) != DESCENDING;
                }
                _ => {}
            }
        }

        query
    }

    /// Splits `a=b&c=d`; decoding happens per key in [`Self::from_pairs`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self::from_pairs(
            raw.split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.split_once('=').unwrap_or((pair, ""))),
        )
    }

    /// Builds the query for the given state, naming labels from `labels`.
    pub fn from_state(filter: &FilterCriteria, sorting: TicketSorting, labels: &[Label]) -> Self {
        let label_names = labels
            .iter()
            .filter(|label| filter.labels.contains(&label.id))
            .map(|label| label.name.clone())
            .collect();

        Self {
            search: filter.search_term.clone(),
            states: filter.states.clone(),
            label_names,
            start: filter.start_date.map(|dt| dt.date_naive()),
            end: filter.end_date.map(|dt| dt.date_naive()),
            sorting,
        }
    }

    /// Resolves label names case-insensitively; names without a matching label
    /// are dropped.
    pub fn to_criteria(&self, labels: &[Label]) -> (FilterCriteria, TicketSorting) {
        let mut label_ids = BTreeSet::new();
        for name in &self.label_names {
            match labels
                .iter()
                .find(|label| label.name.to_lowercase() == name.to_lowercase())
            {
                Some(label) => {
                    label_ids.insert(label.id);
                }
                None => warn!("Ignoring unknown label '{name}' in ticket query"),
            }
        }

        let filter = FilterCriteria {
            search_term: self.search.clone(),
            states: self.states.clone(),
            labels: label_ids,
            start_date: self.start.map(day_start),
            end_date: self.end.map(day_start),
        };

        (filter, self.sorting)
    }

    /// Key/value pairs with default values left out. Values come out encoded
    /// and ready to be joined into a query string.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if !self.search.is_empty() {
            pairs.push((SEARCH_QUERY_KEY, encode_value(&self.search)));
        }
        if self.states != FilterCriteria::landing().states {
            let states: Vec<String> = self
                .states
                .iter()
                .map(|state| state.as_str().to_lowercase())
                .collect();
            pairs.push((STATUS_QUERY_KEY, join_values(&states)));
        }
        if !self.label_names.is_empty() {
            pairs.push((LABELS_QUERY_KEY, join_values(&self.label_names)));
        }
        if let Some(start) = self.start {
            pairs.push((START_QUERY_KEY, start.format(QUERY_DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            pairs.push((END_QUERY_KEY, end.format(QUERY_DATE_FORMAT).to_string()));
        }
        if self.sorting.field != SortField::default() {
            pairs.push((SORT_FIELD_QUERY_KEY, encode_value(self.sorting.field.query_value())));
        }
        if !self.sorting.ascending {
            pairs.push((SORT_ORDER_QUERY_KEY, DESCENDING.to_string()));
        }

        pairs
    }

    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn decode_value(raw: &str) -> String {
    let spaced = raw.replace(VALUE_SEPARATOR, " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Splits on the literal separator before decoding each part.
fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(VALUE_SEPARATOR)
        .map(|part| percent_decode_str(part).decode_utf8_lossy().trim().to_string())
        .filter(|part| !part.is_empty())
}

fn join_values(values: &[String]) -> String {
    values
        .iter()
        .map(|value| encode_value(value))
        .collect::<Vec<_>>()
        .join(&VALUE_SEPARATOR.to_string())
}

fn parse_query_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), QUERY_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value.trim(), LEGACY_DATE_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn label(id: i64, name: &str) -> Label {
        let now = Utc::now();
        Label {
            id,
            name: name.into(),
            color: "#7a7777".into(),
            form_label: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_query_is_the_landing_view() {
        let query = TicketQuery::parse("");
        assert_eq!(query, TicketQuery::default());
        assert_eq!(query.to_query_string(), "");

        let (filter, sorting) = query.to_criteria(&[]);
        assert_eq!(filter, FilterCriteria::landing());
        assert_eq!(sorting, TicketSorting::default());
    }

    #[test]
    fn reads_every_key() {
        let query = TicketQuery::parse(
            "?search=beamer&status=closed+new&labels=Mensa+PAP&start=2025-01-01&end=Fri Jan 31 2025&sort=Titel&ord=desc",
        );

        assert_eq!(query.search, "beamer");
        assert_eq!(
            query.states,
            BTreeSet::from([TicketState::New, TicketState::Closed])
        );
        assert_eq!(query.label_names, vec!["Mensa", "PAP"]);
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(query.sorting, TicketSorting::new(SortField::Title, false));
    }

    #[test]
    fn label_names_resolve_to_ids_ignoring_case() {
        let labels = vec![label(1, "Mensa"), label(2, "PAP")];
        let query = TicketQuery::parse("labels=mensa+unbekannt");
        let (filter, _) = query.to_criteria(&labels);
        assert_eq!(filter.labels, BTreeSet::from([1]));
    }

    #[test]
    fn empty_status_value_lifts_the_state_restriction() {
        let query = TicketQuery::parse("status=");
        assert!(query.states.is_empty());
        assert_eq!(query.to_query_string(), "status=");

        let (filter, _) = query.to_criteria(&[]);
        assert!(filter.is_unrestricted());
    }

    #[test]
    fn state_survives_a_trip_through_the_url() {
        let labels = vec![label(4, "Vorkurs"), label(5, "Seminar")];
        let filter = FilterCriteria {
            search_term: "heizung".into(),
            states: BTreeSet::from([TicketState::Closed]),
            labels: BTreeSet::from([5]),
            start_date: NaiveDate::from_ymd_opt(2025, 4, 1).map(day_start),
            end_date: None,
        };
        let sorting = TicketSorting::new(SortField::LastModified, true);

        let rendered = TicketQuery::from_state(&filter, sorting, &labels).to_query_string();
        assert_eq!(
            rendered,
            "search=heizung&status=closed&labels=Seminar&start=2025-04-01&sort=Ge%C3%A4ndert"
        );

        let (parsed_filter, parsed_sorting) = TicketQuery::parse(&rendered).to_criteria(&labels);
        assert_eq!(parsed_filter, filter);
        assert_eq!(parsed_sorting, sorting);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let query = TicketQuery::parse("sort=priority&start=gestern&bogus=1");
        assert_eq!(query.sorting, TicketSorting::default());
        assert_eq!(query.start, None);
    }

    #[test]
    fn reserved_characters_survive_a_trip_through_the_url() {
        let labels = vec![label(1, "Tee+Kaffee"), label(2, "Mensa")];
        let filter = FilterCriteria {
            search_term: "Kaffee & Kuchen = 100%".into(),
            labels: BTreeSet::from([1, 2]),
            ..FilterCriteria::landing()
        };
        let sorting = TicketSorting::default();

        let rendered = TicketQuery::from_state(&filter, sorting, &labels).to_query_string();
        assert_eq!(
            rendered,
            "search=Kaffee%20%26%20Kuchen%20%3D%20100%25&labels=Tee%2BKaffee+Mensa"
        );

        let query = TicketQuery::parse(&rendered);
        assert_eq!(query.search, "Kaffee & Kuchen = 100%");
        assert_eq!(query.label_names, vec!["Tee+Kaffee", "Mensa"]);

        let (parsed_filter, _) = query.to_criteria(&labels);
        assert_eq!(parsed_filter, filter);
    }

    #[test]
    fn form_encoded_links_still_read() {
        let query =
            TicketQuery::parse("search=Kaffee+und+Kuchen&end=Fri+Jan+31+2025&sort=Ge%C3%A4ndert");
        assert_eq!(query.search, "Kaffee und Kuchen");
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2025, 1, 31));
        assert_eq!(query.sorting.field, SortField::LastModified);
    }
}
