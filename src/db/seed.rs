//! Demo data for development deployments.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use log::info;
use uuid::Uuid;

use super::{
    models::{LabelInput, QuestionAnswerInput, Ticket, TicketState, Timestamp},
    Database,
};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// (name, color, shown on the public form)
const DEMO_LABELS: &[(&str, &str, bool)] = &[
    ("dozent*in", "#474770", true),
    ("prof. mathe", "#476870", false),
    ("veranstaltung", "#47704e", true),
    ("lineare algebra", "#487047", false),
    ("fachschaft", "#477068", true),
    ("gremienwahlen", "#706047", false),
    ("sonstiges", "#6a4770", true),
    ("soziales", "#6a4770", false),
    ("mathematikon", "#797596", false),
    ("PAP", "#A1869E", false),
    ("Vorkurs", "#684A52", false),
    ("Bachelorarbeit", "#87A0B2", false),
    ("Seminar", "#A4BEF3", false),
    ("Mittagspause", "#4E8098", false),
    ("Laptop", "#B6CB9E", false),
];

struct DemoTicket {
    title: &'static str,
    original_title: &'static str,
    text: &'static str,
    note: &'static str,
    state: TicketState,
    labels: &'static [&'static str],
    created_days_ago: i64,
    modified_days_ago: i64,
}

const DEMO_TICKETS: &[DemoTicket] = &[
    DemoTicket {
        title: "Lineare Algebra",
        original_title: "LA1",
        text: "Ich komme mit der Mathe nicht klar :(",
        note: "",
        state: TicketState::New,
        labels: &["lineare algebra", "prof. mathe"],
        created_days_ago: 0,
        modified_days_ago: 0,
    },
    DemoTicket {
        title: "Praktikumsplatz",
        original_title: "AP",
        text: "Hilfe! Ich finde keine Dozent*innen die mir einen Praktikumsplatz anbieten.",
        note: "Vorschlag: Weiterführende Vorlesungen hören, beim DKFZ und ZITI nachfragen.",
        state: TicketState::Open,
        labels: &["sonstiges", "veranstaltung"],
        created_days_ago: 0,
        modified_days_ago: 0,
    },
    DemoTicket {
        title: "miau",
        original_title: "miau",
        text: "woof",
        note: "Spam",
        state: TicketState::Closed,
        labels: &["soziales", "fachschaft"],
        created_days_ago: 0,
        modified_days_ago: 0,
    },
    DemoTicket {
        title: "PAP",
        original_title: "PAP",
        text: "Das PAP geht mir zu lange",
        note: "",
        state: TicketState::Open,
        labels: &["veranstaltung", "PAP"],
        created_days_ago: 34,
        modified_days_ago: 0,
    },
    DemoTicket {
        title: "Bibliothek",
        original_title: "Bib",
        text: "Die Bibliothek ist immer voll!",
        note: "Weitergeben an Uni-Verwaltung.",
        state: TicketState::Open,
        labels: &["sonstiges", "veranstaltung"],
        created_days_ago: 60,
        modified_days_ago: 10,
    },
    DemoTicket {
        title: "Tutorium",
        original_title: "IPK Tut",
        text: "Das Tutorium für Programmieren fällt oft aus.",
        note: "Nachfragen bei Tutor*innen.",
        state: TicketState::Open,
        labels: &["Laptop", "veranstaltung"],
        created_days_ago: 740,
        modified_days_ago: 5,
    },
    DemoTicket {
        title: "Mentoring",
        original_title: "Buddys??",
        text: "Ich verstehe das Buddy-Programm nicht.",
        note: "An Verantwortliche weiterleiten.",
        state: TicketState::New,
        labels: &["soziales", "Vorkurs"],
        created_days_ago: 1105,
        modified_days_ago: 1105,
    },
];

const DEMO_FAQ: &[(&str, &str)] = &[
    (
        "Was ist der Kummerkasten?",
        "Eine anonyme Anlaufstelle für Kummer im und ums Studium.",
    ),
    (
        "Wer ist der Kummerkasten?",
        "Eine kleine Teilmenge der Fachschaft MathPhysInfo.",
    ),
    (
        "Wofür ist der Kummerkasten nicht da?",
        "Persönliche und mentale Probleme im Studium, Stress mit Kommilitonen",
    ),
    (
        "Wie werden meine Daten verarbeitet?",
        "Dein Feedback landet vollkommen anonym bei uns im System, und wir kümmern uns in unserem Team darum dieses auszuwerten.",
    ),
];

/// Inserts demo labels, FAQ entries and tickets. Labels and questions that
/// already exist are skipped; tickets are only added to an empty table.
pub async fn seed_dev_data(db: &Database) -> Result<()> {
    let existing = db.get_labels().await?;
    for (name, color, form_label) in DEMO_LABELS {
        if existing.iter().any(|l| l.name.eq_ignore_ascii_case(name)) {
            log_info!("Skipping seeding for existing label: {name}");
            continue;
        }
        db.create_label(LabelInput {
            name: (*name).to_string(),
            color: Some((*color).to_string()),
            form_label: *form_label,
        })
        .await
        .with_context(|| format!("failed to seed label {name}"))?;
    }

    let existing_questions = db.get_qaps().await?;
    for (question, answer) in DEMO_FAQ {
        if existing_questions.iter().any(|q| q.question == *question) {
            continue;
        }
        db.create_qap(QuestionAnswerInput {
            question: (*question).to_string(),
            answer: (*answer).to_string(),
        })
        .await
        .with_context(|| format!("failed to seed question {question}"))?;
    }

    if !db.get_tickets().await?.is_empty() {
        log_info!("Tickets present, skipping demo tickets");
        return Ok(());
    }

    let labels = db.get_labels().await?;
    let now = Utc::now();
    for demo in DEMO_TICKETS {
        let label_ids: Vec<i64> = labels
            .iter()
            .filter(|l| demo.labels.contains(&l.name.as_str()))
            .map(|l| l.id)
            .collect();

        let ticket = Ticket {
            id: Uuid::new_v4().to_string(),
            title: demo.title.to_string(),
            original_title: demo.original_title.to_string(),
            text: demo.text.to_string(),
            note: (!demo.note.is_empty()).then(|| demo.note.to_string()),
            state: demo.state,
            created_at: Timestamp::from(now - Duration::days(demo.created_days_ago)),
            last_modified: Timestamp::from(now - Duration::days(demo.modified_days_ago)),
            labels: Vec::new(),
        };
        db.insert_ticket(&ticket, &label_ids)
            .await
            .with_context(|| format!("failed to seed ticket {}", demo.title))?;
    }

    info!(
        "Seeded {} labels, {} questions and {} tickets",
        DEMO_LABELS.len(),
        DEMO_FAQ.len(),
        DEMO_TICKETS.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("seed.sqlite3")).unwrap();

        seed_dev_data(&db).await.unwrap();
        seed_dev_data(&db).await.unwrap();

        assert_eq!(db.get_labels().await.unwrap().len(), DEMO_LABELS.len());
        assert_eq!(db.get_qaps().await.unwrap().len(), DEMO_FAQ.len());

        let tickets = db.get_tickets().await.unwrap();
        assert_eq!(tickets.len(), DEMO_TICKETS.len());
        let pap = tickets.iter().find(|t| t.title == "PAP").unwrap();
        assert_eq!(pap.labels.len(), 2);
    }
}
