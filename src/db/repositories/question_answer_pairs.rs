use anyhow::{anyhow, bail, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    models::{QuestionAnswerInput, QuestionAnswerPair},
};

fn row_to_qap(row: &Row) -> Result<QuestionAnswerPair, rusqlite::Error> {
    Ok(QuestionAnswerPair {
        id: row.get("id")?,
        question: row.get("question")?,
        answer: row.get("answer")?,
        position: row.get("position")?,
    })
}

fn list_qaps(conn: &Connection) -> Result<Vec<QuestionAnswerPair>> {
    let mut stmt = conn.prepare(
        "SELECT id, question, answer, position
         FROM question_answer_pairs
         ORDER BY position ASC",
    )?;
    let qaps = stmt
        .query_map([], row_to_qap)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(qaps)
}

fn position_of(conn: &Connection, qap_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT position FROM question_answer_pairs WHERE id = ?1",
        params![qap_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| anyhow!("QuestionAnswerPair with id {qap_id} not found"))
}

fn validate(input: &QuestionAnswerInput) -> Result<()> {
    if input.question.trim().is_empty() || input.answer.trim().is_empty() {
        bail!("Question and answer must not be empty");
    }
    Ok(())
}

impl Database {
    /// Append a new entry after all existing ones
    pub async fn create_qap(&self, input: QuestionAnswerInput) -> Result<QuestionAnswerPair> {
        validate(&input)?;
        self.execute(move |conn| {
            let position: i64 =
                conn.query_row("SELECT COUNT(*) FROM question_answer_pairs", [], |row| {
                    row.get(0)
                })?;

            let qap = QuestionAnswerPair {
                id: Uuid::new_v4().to_string(),
                question: input.question.trim().to_string(),
                answer: input.answer.trim().to_string(),
                position,
            };

            conn.execute(
                "INSERT INTO question_answer_pairs (id, question, answer, position)
                 VALUES (?1, ?2, ?3, ?4)",
                params![qap.id, qap.question, qap.answer, qap.position],
            )
            .map_err(|err| anyhow!("failed to store question '{}': {err}", qap.question))?;

            Ok(qap)
        })
        .await
    }

    pub async fn get_qaps(&self) -> Result<Vec<QuestionAnswerPair>> {
        self.execute(|conn| list_qaps(conn)).await
    }

    pub async fn update_qap(
        &self,
        qap_id: &str,
        input: QuestionAnswerInput,
    ) -> Result<QuestionAnswerPair> {
        validate(&input)?;
        let qap_id = qap_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE question_answer_pairs SET question = ?1, answer = ?2 WHERE id = ?3",
                params![input.question.trim(), input.answer.trim(), qap_id],
            )?;
            if rows_affected == 0 {
                bail!("QuestionAnswerPair with id {qap_id} not found");
            }

            conn.query_row(
                "SELECT id, question, answer, position FROM question_answer_pairs WHERE id = ?1",
                params![qap_id],
                row_to_qap,
            )
            .map_err(Into::into)
        })
        .await
    }

    /// Remove an entry and close the gap it leaves in the ordering
    pub async fn delete_qap(&self, qap_id: &str) -> Result<()> {
        let qap_id = qap_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let position = position_of(&tx, &qap_id)?;

            tx.execute(
                "DELETE FROM question_answer_pairs WHERE id = ?1",
                params![qap_id],
            )?;
            tx.execute(
                "UPDATE question_answer_pairs SET position = position - 1 WHERE position > ?1",
                params![position],
            )?;

            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Move an entry to `new_index`, shifting the entries in between by one.
    /// Returns the full list in its new order.
    pub async fn move_qap(&self, qap_id: &str, new_index: i64) -> Result<Vec<QuestionAnswerPair>> {
        let qap_id = qap_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let count: i64 =
                tx.query_row("SELECT COUNT(*) FROM question_answer_pairs", [], |row| {
                    row.get(0)
                })?;
            if new_index < 0 || new_index >= count {
                bail!("Position {new_index} out of range (0..{count})");
            }

            let old_index = position_of(&tx, &qap_id)?;
            if old_index == new_index {
                return list_qaps(&tx);
            }

            if new_index < old_index {
                tx.execute(
                    "UPDATE question_answer_pairs
                     SET position = position + 1
                     WHERE position >= ?1 AND position < ?2",
                    params![new_index, old_index],
                )?;
            } else {
                tx.execute(
                    "UPDATE question_answer_pairs
                     SET position = position - 1
                     WHERE position > ?1 AND position <= ?2",
                    params![old_index, new_index],
                )?;
            }
            tx.execute(
                "UPDATE question_answer_pairs SET position = ?1 WHERE id = ?2",
                params![new_index, qap_id],
            )?;

            let reordered = list_qaps(&tx)?;
            tx.commit()?;
            Ok(reordered)
        })
        .await
    }
}
