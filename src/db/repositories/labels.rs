use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, placeholders},
    models::{
        label::{validation, DEFAULT_LABEL_COLOR},
        Label, LabelInput, LabelUpdate,
    },
};

const LABEL_COLUMNS: &str = "id, name, color, form_label, created_at, updated_at";

fn row_to_label(row: &Row) -> Result<Label> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Label {
        id: row.get("id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        form_label: row.get("form_label")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn fetch_label(conn: &Connection, label_id: i64) -> Result<Option<Label>> {
    let mut stmt = conn.prepare(&format!("SELECT {LABEL_COLUMNS} FROM labels WHERE id = ?1"))?;
    let mut rows = stmt.query(params![label_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_label(row)?)),
        None => Ok(None),
    }
}

/// Names compare case-insensitively through the column collation.
fn name_taken(conn: &Connection, name: &str, except_id: Option<i64>) -> Result<bool> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM labels WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(matches!(existing, Some(id) if Some(id) != except_id))
}

/// Fails unless every id in `label_ids` names an existing label.
pub(crate) fn ensure_labels_exist(conn: &Connection, label_ids: &[i64]) -> Result<()> {
    let wanted: BTreeSet<i64> = label_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }

    let query = format!(
        "SELECT id FROM labels WHERE id IN ({})",
        placeholders(wanted.len())
    );
    let mut stmt = conn.prepare(&query)?;
    let found: BTreeSet<i64> = stmt
        .query_map(params_from_iter(wanted.iter()), |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    let missing: Vec<String> = wanted
        .difference(&found)
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        bail!("Unknown label id(s): {}", missing.join(", "));
    }

    Ok(())
}

impl Database {
    /// Create a new label
    /// Returns an error if the color is malformed or the name is taken
    pub async fn create_label(&self, input: LabelInput) -> Result<Label> {
        self.execute(move |conn| {
            let name = input.name.trim().to_string();
            validation::validate_name(&name)?;
            let color = input
                .color
                .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string());
            validation::validate_color(&color)?;

            if name_taken(conn, &name, None)? {
                bail!("A label named '{}' already exists", name);
            }

            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO labels (name, color, form_label, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, color, input.form_label, now, now],
            )?;

            let label_id = conn.last_insert_rowid();
            fetch_label(conn, label_id)?.ok_or_else(|| anyhow!("Label not found after insert"))
        })
        .await
    }

    /// Get all labels, ordered by name
    pub async fn get_labels(&self) -> Result<Vec<Label>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LABEL_COLUMNS} FROM labels ORDER BY name COLLATE NOCASE ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut labels = Vec::new();
            while let Some(row) = rows.next()? {
                labels.push(row_to_label(row)?);
            }

            Ok(labels)
        })
        .await
    }

    /// Labels offered on the public submission form
    pub async fn get_form_labels(&self) -> Result<Vec<Label>> {
        Ok(self
            .get_labels()
            .await?
            .into_iter()
            .filter(|label| label.form_label)
            .collect())
    }

    pub async fn get_label(&self, label_id: i64) -> Result<Option<Label>> {
        self.execute(move |conn| fetch_label(conn, label_id)).await
    }

    /// Update any subset of a label's name, color and form flag
    /// Returns an error if the new name is taken by another label
    pub async fn update_label(&self, label_id: i64, update: LabelUpdate) -> Result<Label> {
        self.execute(move |conn| {
            if update.is_empty() {
                return Err(anyhow!("No fields to update"));
            }

            // Build update query dynamically based on what's being updated
            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(name) = update.name.as_deref().map(str::trim) {
                validation::validate_name(name)?;
                if name_taken(conn, name, Some(label_id))? {
                    bail!("A label named '{}' already exists", name);
                }
                updates.push("name = ?");
                params_vec.push(Box::new(name.to_string()));
            }
            if let Some(color) = update.color.clone() {
                validation::validate_color(&color)?;
                updates.push("color = ?");
                params_vec.push(Box::new(color));
            }
            if let Some(form_label) = update.form_label {
                updates.push("form_label = ?");
                params_vec.push(Box::new(form_label));
            }

            updates.push("updated_at = ?");
            params_vec.push(Box::new(Utc::now().to_rfc3339()));

            let query = format!("UPDATE labels SET {} WHERE id = ?", updates.join(", "));
            params_vec.push(Box::new(label_id));

            // Convert to slice of trait objects for rusqlite
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let rows_affected = conn.execute(&query, params_refs.as_slice())?;
            if rows_affected == 0 {
                return Err(anyhow!("Label {label_id} not found"));
            }

            fetch_label(conn, label_id)?.ok_or_else(|| anyhow!("Label not found after update"))
        })
        .await
    }

    /// Delete a label; its ticket assignments go with it
    pub async fn delete_label(&self, label_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let rows_affected = conn.execute("DELETE FROM labels WHERE id = ?1", params![label_id])?;
            if rows_affected == 0 {
                return Err(anyhow!("Label {label_id} not found"));
            }
            Ok(())
        })
        .await
    }
}
