use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_state, placeholders},
    models::{Ticket, TicketInput, TicketLabel, TicketState, TicketUpdate, Timestamp},
};

use super::labels::ensure_labels_exist;

const TICKET_COLUMNS: &str =
    "id, title, original_title, text, note, state, created_at, last_modified";

fn row_to_ticket(row: &Row) -> Result<Ticket> {
    let state: String = row.get("state")?;
    let created_at: String = row.get("created_at")?;
    let last_modified: String = row.get("last_modified")?;

    Ok(Ticket {
        id: row.get("id")?,
        title: row.get("title")?,
        original_title: row.get("original_title")?,
        text: row.get("text")?,
        note: row.get("note")?,
        state: parse_state(&state)?,
        created_at: Timestamp::parse(&created_at),
        last_modified: Timestamp::parse(&last_modified),
        labels: Vec::new(),
    })
}

fn labels_for_ticket(conn: &Connection, ticket_id: &str) -> Result<Vec<TicketLabel>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.color
         FROM labels_tickets lt
         JOIN labels l ON l.id = lt.label_id
         WHERE lt.ticket_id = ?1
         ORDER BY l.name COLLATE NOCASE",
    )?;

    let labels = stmt
        .query_map(params![ticket_id], |row| {
            Ok(TicketLabel {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(labels)
}

fn fetch_ticket(conn: &Connection, ticket_id: &str) -> Result<Option<Ticket>> {
    let mut stmt = conn.prepare(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"))?;
    let mut rows = stmt.query(params![ticket_id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let mut ticket = row_to_ticket(row)?;
    ticket.labels = labels_for_ticket(conn, &ticket.id)?;
    Ok(Some(ticket))
}

fn require_ticket(conn: &Connection, ticket_id: &str) -> Result<Ticket> {
    fetch_ticket(conn, ticket_id)?.ok_or_else(|| anyhow!("Ticket {ticket_id} not found"))
}

fn touch_ticket(conn: &Connection, ticket_id: &str) -> Result<()> {
    let rows_affected = conn.execute(
        "UPDATE tickets SET last_modified = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), ticket_id],
    )?;
    if rows_affected == 0 {
        bail!("Ticket {ticket_id} not found");
    }
    Ok(())
}

fn assign_labels(conn: &Connection, ticket_id: &str, label_ids: &[i64]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO labels_tickets (ticket_id, label_id) VALUES (?1, ?2)",
    )?;
    for label_id in label_ids {
        stmt.execute(params![ticket_id, label_id])?;
    }
    Ok(())
}

fn validate_submission(input: &TicketInput) -> Result<()> {
    if input.title.trim().is_empty() {
        bail!("Ticket title must not be empty");
    }
    if input.text.trim().is_empty() {
        bail!("Ticket text must not be empty");
    }
    Ok(())
}

impl Database {
    /// Store a submission from the public form as a `NEW` ticket
    pub async fn create_ticket(&self, input: TicketInput) -> Result<Ticket> {
        validate_submission(&input)?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4().to_string(),
            title: input.title.trim().to_string(),
            original_title: input.title.trim().to_string(),
            text: input.text,
            note: None,
            state: TicketState::New,
            created_at: now.into(),
            last_modified: now.into(),
            labels: Vec::new(),
        };

        self.insert_ticket(&ticket, &input.label_ids).await
    }

    /// Insert a fully specified ticket, e.g. when importing or seeding
    pub async fn insert_ticket(&self, ticket: &Ticket, label_ids: &[i64]) -> Result<Ticket> {
        let (Some(created_at), Some(last_modified)) =
            (ticket.created_at.instant(), ticket.last_modified.instant())
        else {
            bail!("Ticket {} carries an unreadable timestamp", ticket.id);
        };

        let record = ticket.clone();
        let label_ids = label_ids.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            ensure_labels_exist(&tx, &label_ids)?;

            tx.execute(
                &format!(
                    "INSERT INTO tickets ({TICKET_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    record.id,
                    record.title,
                    record.original_title,
                    record.text,
                    record.note,
                    record.state.as_str(),
                    created_at.to_rfc3339(),
                    last_modified.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert ticket")?;
            assign_labels(&tx, &record.id, &label_ids)?;

            let stored = require_ticket(&tx, &record.id)?;
            tx.commit()?;
            Ok(stored)
        })
        .await
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
        let ticket_id = ticket_id.to_string();
        self.execute(move |conn| fetch_ticket(conn, &ticket_id)).await
    }

    /// All tickets with their labels, oldest first
    pub async fn get_tickets(&self) -> Result<Vec<Ticket>> {
        self.execute(|conn| {
            let mut assignments: HashMap<String, Vec<TicketLabel>> = HashMap::new();
            {
                let mut stmt = conn.prepare(
                    "SELECT lt.ticket_id, l.id, l.name, l.color
                     FROM labels_tickets lt
                     JOIN labels l ON l.id = lt.label_id
                     ORDER BY l.name COLLATE NOCASE",
                )?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    let ticket_id: String = row.get(0)?;
                    assignments.entry(ticket_id).or_default().push(TicketLabel {
                        id: row.get(1)?,
                        name: row.get(2)?,
                        color: row.get(3)?,
                    });
                }
            }

            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at ASC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut tickets = Vec::new();
            while let Some(row) = rows.next()? {
                let mut ticket = row_to_ticket(row)?;
                ticket.labels = assignments.remove(&ticket.id).unwrap_or_default();
                tickets.push(ticket);
            }

            Ok(tickets)
        })
        .await
    }

    /// Apply an admin edit and bump `last_modified`
    pub async fn update_ticket(&self, ticket_id: &str, update: TicketUpdate) -> Result<Ticket> {
        let ticket_id = ticket_id.to_string();
        self.execute(move |conn| {
            if update.title.is_none() && update.note.is_none() && update.state.is_none() {
                return Err(anyhow!("No fields to update"));
            }

            let tx = conn.transaction()?;
            let current = require_ticket(&tx, &ticket_id)?;

            let title = match update.title {
                Some(title) if title.trim().is_empty() => bail!("Ticket title must not be empty"),
                Some(title) => title.trim().to_string(),
                None => current.title,
            };
            let note = update.note.or(current.note);
            let state = update.state.unwrap_or(current.state);

            tx.execute(
                "UPDATE tickets
                 SET title = ?1,
                     note = ?2,
                     state = ?3,
                     last_modified = ?4
                 WHERE id = ?5",
                params![
                    title,
                    note,
                    state.as_str(),
                    Utc::now().to_rfc3339(),
                    ticket_id,
                ],
            )?;

            let updated = require_ticket(&tx, &ticket_id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
    }

    pub async fn add_labels_to_ticket(&self, ticket_id: &str, label_ids: Vec<i64>) -> Result<Ticket> {
        let ticket_id = ticket_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            require_ticket(&tx, &ticket_id)?;
            ensure_labels_exist(&tx, &label_ids)?;
            assign_labels(&tx, &ticket_id, &label_ids)?;
            touch_ticket(&tx, &ticket_id)?;

            let updated = require_ticket(&tx, &ticket_id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
    }

    pub async fn remove_labels_from_ticket(
        &self,
        ticket_id: &str,
        label_ids: Vec<i64>,
    ) -> Result<Ticket> {
        let ticket_id = ticket_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            require_ticket(&tx, &ticket_id)?;
            {
                let mut stmt = tx.prepare(
                    "DELETE FROM labels_tickets WHERE ticket_id = ?1 AND label_id = ?2",
                )?;
                for label_id in &label_ids {
                    stmt.execute(params![ticket_id, label_id])?;
                }
            }
            touch_ticket(&tx, &ticket_id)?;

            let updated = require_ticket(&tx, &ticket_id)?;
            tx.commit()?;
            Ok(updated)
        })
        .await
    }

    /// Delete tickets by id, returning how many existed
    pub async fn delete_tickets(&self, ticket_ids: Vec<String>) -> Result<usize> {
        if ticket_ids.is_empty() {
            return Ok(0);
        }

        self.execute(move |conn| {
            let query = format!(
                "DELETE FROM tickets WHERE id IN ({})",
                placeholders(ticket_ids.len())
            );
            let deleted = conn.execute(&query, params_from_iter(ticket_ids.iter()))?;
            Ok(deleted)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::LabelInput;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("tickets.sqlite3")).unwrap();
        (dir, db)
    }

    fn submission(title: &str, label_ids: Vec<i64>) -> TicketInput {
        TicketInput {
            title: title.into(),
            text: "Bitte kümmert euch darum".into(),
            label_ids,
        }
    }

    async fn label(db: &Database, name: &str) -> i64 {
        db.create_label(LabelInput {
            name: name.into(),
            color: None,
            form_label: true,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn submission_starts_new_with_original_title() {
        let (_dir, db) = open();
        let mensa = label(&db, "mensa").await;

        let ticket = db.create_ticket(submission("Kalter Kaffee", vec![mensa])).await.unwrap();
        assert_eq!(ticket.state, TicketState::New);
        assert_eq!(ticket.original_title, "Kalter Kaffee");
        assert_eq!(ticket.created_at, ticket.last_modified);
        assert!(ticket.has_label(mensa));

        let loaded = db.get_ticket(&ticket.id).await.unwrap().unwrap();
        assert_eq!(loaded, ticket);
    }

    #[tokio::test]
    async fn submission_with_unknown_label_is_rejected_whole() {
        let (_dir, db) = open();
        let err = db.create_ticket(submission("x", vec![42])).await.unwrap_err();
        assert!(err.to_string().contains("42"));
        assert!(db.get_tickets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_submissions_are_rejected() {
        let (_dir, db) = open();
        assert!(db.create_ticket(submission("   ", vec![])).await.is_err());
    }

    #[tokio::test]
    async fn edit_keeps_original_title_and_bumps_last_modified() {
        let (_dir, db) = open();
        let ticket = db.create_ticket(submission("LA1", vec![])).await.unwrap();

        let updated = db
            .update_ticket(
                &ticket.id,
                TicketUpdate {
                    title: Some("Lineare Algebra".into()),
                    note: Some("An Prof weiterleiten".into()),
                    state: Some(TicketState::Open),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Lineare Algebra");
        assert_eq!(updated.original_title, "LA1");
        assert_eq!(updated.note.as_deref(), Some("An Prof weiterleiten"));
        assert_eq!(updated.state, TicketState::Open);
        assert_eq!(updated.created_at, ticket.created_at);
        assert!(
            updated.last_modified.cmp_invalid_last(&ticket.last_modified)
                != std::cmp::Ordering::Less
        );

        assert!(db.update_ticket(&ticket.id, TicketUpdate::default()).await.is_err());
        assert!(db
            .update_ticket(
                "missing",
                TicketUpdate {
                    state: Some(TicketState::Closed),
                    ..TicketUpdate::default()
                }
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn label_assignment_add_and_remove() {
        let (_dir, db) = open();
        let pap = label(&db, "PAP").await;
        let vorkurs = label(&db, "Vorkurs").await;
        let ticket = db.create_ticket(submission("PAP", vec![pap])).await.unwrap();

        let added = db
            .add_labels_to_ticket(&ticket.id, vec![pap, vorkurs])
            .await
            .unwrap();
        let ids: Vec<i64> = added.labels.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![pap, vorkurs]);

        let removed = db
            .remove_labels_from_ticket(&ticket.id, vec![pap])
            .await
            .unwrap();
        assert!(!removed.has_label(pap));
        assert!(removed.has_label(vorkurs));

        assert!(db.add_labels_to_ticket(&ticket.id, vec![777]).await.is_err());
    }

    #[tokio::test]
    async fn list_attaches_labels_and_delete_counts() {
        let (_dir, db) = open();
        let soziales = label(&db, "soziales").await;
        let first = db.create_ticket(submission("eins", vec![soziales])).await.unwrap();
        let second = db.create_ticket(submission("zwei", vec![])).await.unwrap();

        let all = db.get_tickets().await.unwrap();
        assert_eq!(all.len(), 2);
        let first_loaded = all.iter().find(|t| t.id == first.id).unwrap();
        assert!(first_loaded.has_label(soziales));

        let deleted = db
            .delete_tickets(vec![first.id.clone(), second.id.clone(), "ghost".into()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert!(db.get_tickets().await.unwrap().is_empty());
        assert_eq!(db.delete_tickets(Vec::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_refuses_unreadable_timestamps() {
        let (_dir, db) = open();
        let now = Utc::now();
        let ticket = Ticket {
            id: "import-1".into(),
            title: "t".into(),
            original_title: "t".into(),
            text: "x".into(),
            note: None,
            state: TicketState::Closed,
            created_at: Timestamp::Invalid("gestern".into()),
            last_modified: now.into(),
            labels: Vec::new(),
        };
        assert!(db.insert_ticket(&ticket, &[]).await.is_err());
    }
}
