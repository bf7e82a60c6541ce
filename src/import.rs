use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::db::NoteStore;
use crate::error::{NotesError, Result};
use crate::levels::{EngagementLevel, UnderstandingLevel};
use crate::models::NewSessionNote;

#[derive(Debug, Deserialize)]
struct CsvRow {
    student_name: String,
    student_email: String,
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    session_date: String,
    engagement_level: String,
    understanding_level: String,
    #[serde(default)]
    lesson_summary: Option<String>,
    #[serde(default)]
    homework_assigned: Option<String>,
    #[serde(default)]
    tutor_notes: Option<String>,
    #[serde(default)]
    parent_feedback: Option<String>,
    #[serde(default)]
    source_key: Option<String>,
}

/// One CSV line with its date resolved, not yet tied to store ids.
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub student_name: String,
    pub student_email: String,
    pub class_name: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub session_date: DateTime<Utc>,
    pub engagement_level: String,
    pub understanding_level: String,
    pub lesson_summary: Option<String>,
    pub homework_assigned: Option<String>,
    pub tutor_notes: Option<String>,
    pub parent_feedback: Option<String>,
    pub source_key: String,
}

/// RFC 3339 timestamps, or bare `YYYY-MM-DD` dates at midnight UTC.
pub fn parse_session_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Stable key for rows without one, so re-imports stay idempotent while
/// same-day sessions in different classes or topics stay distinct.
fn default_source_key(
    student_email: &str,
    session_date: DateTime<Utc>,
    parts: [Option<&str>; 3],
) -> String {
    let mut key = format!("import-{}-{}", student_email, session_date.to_rfc3339());
    for part in parts {
        key.push('|');
        key.push_str(&part.unwrap_or("").to_lowercase());
    }
    key
}

pub fn parse_notes_csv<R: Read>(input: R) -> Result<Vec<ImportRow>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let line = index + 1;
        let session_date =
            parse_session_date(&row.session_date).ok_or_else(|| NotesError::InvalidDate {
                row: line,
                value: row.session_date.clone(),
            })?;

        if EngagementLevel::parse(&row.engagement_level).is_none()
            || UnderstandingLevel::parse(&row.understanding_level).is_none()
        {
            tracing::warn!(
                row = line,
                engagement = %row.engagement_level,
                understanding = %row.understanding_level,
                "unrecognized level; it will score 0"
            );
        }

        let student_email = row.student_email.trim().to_lowercase();
        let class_name = non_blank(row.class_name);
        let subject = non_blank(row.subject);
        let topic = non_blank(row.topic);
        let source_key = non_blank(row.source_key).unwrap_or_else(|| {
            default_source_key(
                &student_email,
                session_date,
                [class_name.as_deref(), subject.as_deref(), topic.as_deref()],
            )
        });

        rows.push(ImportRow {
            student_name: row.student_name.trim().to_string(),
            student_email,
            class_name,
            subject,
            topic,
            session_date,
            engagement_level: row.engagement_level.trim().to_string(),
            understanding_level: row.understanding_level.trim().to_string(),
            lesson_summary: non_blank(row.lesson_summary),
            homework_assigned: non_blank(row.homework_assigned),
            tutor_notes: non_blank(row.tutor_notes),
            parent_feedback: non_blank(row.parent_feedback),
            source_key,
        });
    }

    Ok(rows)
}

/// Writes parsed rows through the store and returns how many notes were new.
pub async fn import_rows(store: &dyn NoteStore, rows: Vec<ImportRow>) -> Result<usize> {
    let mut inserted = 0usize;

    for row in rows {
        let student_id = store
            .upsert_student(&row.student_name, &row.student_email)
            .await?;
        let class_id = match row.class_name.as_deref() {
            Some(name) => Some(store.upsert_class(name, row.subject.as_deref()).await?),
            None => None,
        };

        let note = NewSessionNote {
            student_id,
            class_id,
            session_date: row.session_date,
            subject: row.subject,
            topic: row.topic,
            engagement_level: row.engagement_level,
            understanding_level: row.understanding_level,
            lesson_summary: row.lesson_summary,
            homework_assigned: row.homework_assigned,
            tutor_notes: row.tutor_notes,
            parent_feedback: row.parent_feedback,
            attachments: Vec::new(),
            source_key: row.source_key,
        };

        if store.add_session_note(&note).await?.is_some() {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_csv(store: &dyn NoteStore, csv_path: &Path) -> Result<usize> {
    let file = std::fs::File::open(csv_path)?;
    let rows = parse_notes_csv(file)?;
    tracing::info!(rows = rows.len(), path = %csv_path.display(), "parsed session notes");
    import_rows(store, rows).await
}
