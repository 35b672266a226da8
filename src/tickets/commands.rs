use std::collections::HashSet;

use chrono::Utc;

use crate::{
    db::models::{Ticket, TicketInput, TicketUpdate},
    tickets::{FilterCriteria, TicketOverview, TicketQuery, TicketSorting},
    AppState,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_warn};

/// Overview for a query string such as `status=new+open&sort=Titel&ord=desc`.
pub async fn get_ticket_overview(state: &AppState, query: &str) -> Result<TicketOverview, String> {
    let labels = state.db.get_labels().await.map_err(|e| e.to_string())?;
    let (filter, sorting) = TicketQuery::parse(query).to_criteria(&labels);
    log_debug!("ticket overview for {filter:?} sorted by {sorting:?}");

    let tickets = state.db.get_tickets().await.map_err(|e| {
        log_error!("failed to load tickets for the overview: {e:?}");
        e.to_string()
    })?;
    Ok(TicketOverview::build(
        tickets.into_iter().map(Some),
        &filter,
        &sorting,
        Utc::now(),
    ))
}

/// Shareable query string for the given overview state
pub async fn get_ticket_query_string(
    state: &AppState,
    filter: FilterCriteria,
    sorting: TicketSorting,
) -> Result<String, String> {
    let labels = state.db.get_labels().await.map_err(|e| e.to_string())?;
    Ok(TicketQuery::from_state(&filter, sorting, &labels).to_query_string())
}

pub async fn get_ticket(state: &AppState, ticket_id: String) -> Result<Option<Ticket>, String> {
    state
        .db
        .get_ticket(&ticket_id)
        .await
        .map_err(|e| e.to_string())
}

/// Public form submission. Only labels flagged for the form may be attached.
pub async fn submit_ticket(state: &AppState, input: TicketInput) -> Result<Ticket, String> {
    let form_labels: HashSet<i64> = state
        .db
        .get_form_labels()
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|label| label.id)
        .collect();

    if let Some(label_id) = input.label_ids.iter().find(|id| !form_labels.contains(*id)) {
        log_warn!("rejected submission with non-form label {label_id}");
        return Err(format!("Label {label_id} is not available on the form"));
    }

    state
        .db
        .create_ticket(input)
        .await
        .map_err(|e| e.to_string())
}

pub async fn update_ticket(
    state: &AppState,
    ticket_id: String,
    update: TicketUpdate,
) -> Result<Ticket, String> {
    state
        .db
        .update_ticket(&ticket_id, update)
        .await
        .map_err(|e| e.to_string())
}

pub async fn add_labels_to_ticket(
    state: &AppState,
    ticket_id: String,
    label_ids: Vec<i64>,
) -> Result<Ticket, String> {
    state
        .db
        .add_labels_to_ticket(&ticket_id, label_ids)
        .await
        .map_err(|e| e.to_string())
}

pub async fn remove_labels_from_ticket(
    state: &AppState,
    ticket_id: String,
    label_ids: Vec<i64>,
) -> Result<Ticket, String> {
    state
        .db
        .remove_labels_from_ticket(&ticket_id, label_ids)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_tickets(state: &AppState, ticket_ids: Vec<String>) -> Result<usize, String> {
    state
        .db
        .delete_tickets(ticket_ids)
        .await
        .map_err(|e| e.to_string())
}
