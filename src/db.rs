use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::levels::{EngagementLevel, UnderstandingLevel};
use crate::models::{Attachment, ClassInfo, NewSessionNote, SessionNote, Student};

/// Access to the hosted tutoring tables.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn students(&self) -> Result<Vec<Student>>;

    async fn student_by_email(&self, email: &str) -> Result<Option<Student>>;

    async fn classes(&self) -> Result<Vec<ClassInfo>>;

    async fn notes_for_student(&self, student_id: Uuid) -> Result<Vec<SessionNote>>;

    async fn upsert_student(&self, full_name: &str, email: &str) -> Result<Uuid>;

    async fn upsert_class(&self, name: &str, subject: Option<&str>) -> Result<Uuid>;

    /// Returns `None` when a note with the same source key already exists.
    async fn add_session_note(&self, note: &NewSessionNote) -> Result<Option<Uuid>>;
}

pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        tracing::debug!(max_connections = config.max_connections, "connected to Postgres");
        Ok(Self { pool })
    }

    pub async fn init_db(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn student_from_row(row: &PgRow) -> std::result::Result<Student, sqlx::Error> {
    Ok(Student {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        grade: row.try_get("grade")?,
    })
}

fn note_from_row(row: &PgRow) -> std::result::Result<SessionNote, sqlx::Error> {
    let attachments: Json<Vec<Attachment>> = row.try_get("attachments")?;
    Ok(SessionNote {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        session_date: row.try_get("session_date")?,
        subject: row.try_get("subject")?,
        class_id: row.try_get("class_id")?,
        topic: row.try_get("topic")?,
        topic_id: row.try_get("topic_id")?,
        engagement_level: row.try_get("engagement_level")?,
        understanding_level: row.try_get("understanding_level")?,
        lesson_summary: row.try_get("lesson_summary")?,
        homework_assigned: row.try_get("homework_assigned")?,
        tutor_notes: row.try_get("tutor_notes")?,
        parent_feedback: row.try_get("parent_feedback")?,
        attachments: attachments.0,
    })
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn students(&self) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            "SELECT id, full_name, email, grade FROM tutoring.students ORDER BY full_name",
        )
        .fetch_all(&self.pool)
        .await?;

        let students = rows
            .iter()
            .map(student_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(students)
    }

    async fn student_by_email(&self, email: &str) -> Result<Option<Student>> {
        let row = sqlx::query(
            "SELECT id, full_name, email, grade FROM tutoring.students WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(student_from_row).transpose()?)
    }

    async fn classes(&self) -> Result<Vec<ClassInfo>> {
        let rows = sqlx::query("SELECT id, name, subject FROM tutoring.classes ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        let mut classes = Vec::with_capacity(rows.len());
        for row in rows {
            classes.push(ClassInfo {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                subject: row.try_get("subject")?,
            });
        }
        Ok(classes)
    }

    async fn notes_for_student(&self, student_id: Uuid) -> Result<Vec<SessionNote>> {
        let rows = sqlx::query(
            "SELECT id, student_id, class_id, session_date, subject, topic, topic_id, \
             engagement_level, understanding_level, lesson_summary, homework_assigned, \
             tutor_notes, parent_feedback, attachments \
             FROM tutoring.session_notes \
             WHERE student_id = $1 \
             ORDER BY session_date",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        let notes = rows
            .iter()
            .map(note_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(%student_id, count = notes.len(), "fetched session notes");
        Ok(notes)
    }

    async fn upsert_student(&self, full_name: &str, email: &str) -> Result<Uuid> {
        let id: Uuid = sqlx::query(
            r#"
            INSERT INTO tutoring.students (id, full_name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?
        .try_get("id")?;
        Ok(id)
    }

    async fn upsert_class(&self, name: &str, subject: Option<&str>) -> Result<Uuid> {
        let id: Uuid = sqlx::query(
            r#"
            INSERT INTO tutoring.classes (id, name, subject)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET subject = COALESCE(EXCLUDED.subject, tutoring.classes.subject)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(subject)
        .fetch_one(&self.pool)
        .await?
        .try_get("id")?;
        Ok(id)
    }

    async fn add_session_note(&self, note: &NewSessionNote) -> Result<Option<Uuid>> {
        let id = Uuid::new_v4();
        let result = sqlx::query(
            r#"
            INSERT INTO tutoring.session_notes
            (id, student_id, class_id, session_date, subject, topic,
             engagement_level, understanding_level, lesson_summary,
             homework_assigned, tutor_notes, parent_feedback, attachments, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(note.student_id)
        .bind(note.class_id)
        .bind(note.session_date)
        .bind(&note.subject)
        .bind(&note.topic)
        .bind(&note.engagement_level)
        .bind(&note.understanding_level)
        .bind(&note.lesson_summary)
        .bind(&note.homework_assigned)
        .bind(&note.tutor_notes)
        .bind(&note.parent_feedback)
        .bind(Json(&note.attachments))
        .bind(&note.source_key)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(source_key = %note.source_key, "session note already recorded");
            return Ok(None);
        }
        Ok(Some(id))
    }
}

/// Demo students, classes and a month of weekly notes. Safe to re-run.
pub async fn seed(store: &dyn NoteStore) -> Result<usize> {
    let students = [
        ("Avery Lee", "avery.lee@example.com"),
        ("Jules Moreno", "jules.moreno@example.com"),
    ];
    let classes = [
        ("Algebra I", "Math", ["Linear equations", "Slope", "Systems", "Inequalities"]),
        ("Chemistry Basics", "Science", ["Atoms", "Bonding", "Moles", "Reactions"]),
    ];

    let mut class_ids = Vec::with_capacity(classes.len());
    for (name, subject, topics) in classes.iter() {
        let id = store.upsert_class(name, Some(*subject)).await?;
        class_ids.push((id, *subject, topics));
    }

    let first_session = Utc
        .with_ymd_and_hms(2026, 1, 6, 16, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let mut inserted = 0usize;

    for (student_index, (name, email)) in students.iter().enumerate() {
        let student_id = store.upsert_student(name, email).await?;

        for (class_index, (class_id, subject, topics)) in class_ids.iter().enumerate() {
            for (week, topic) in topics.iter().enumerate() {
                let session_date = first_session
                    + Duration::weeks(week as i64)
                    + Duration::days((class_index * 2) as i64);
                // Seeded students improve week over week at different rates.
                let step = (week + student_index) % 5;
                let engagement = EngagementLevel::ALL[4 - step.min(4)];
                let understanding = UnderstandingLevel::ALL[4 - step.min(4)];

                let note = NewSessionNote {
                    student_id,
                    class_id: Some(*class_id),
                    session_date,
                    subject: Some(subject.to_string()),
                    topic: Some(topic.to_string()),
                    engagement_level: engagement.as_str().to_string(),
                    understanding_level: understanding.as_str().to_string(),
                    lesson_summary: Some(format!("Covered {} with guided practice", topic.to_lowercase())),
                    homework_assigned: Some(format!("{} worksheet", topic)),
                    tutor_notes: None,
                    parent_feedback: None,
                    attachments: Vec::new(),
                    source_key: format!("seed-{student_index}-{class_index}-{week}"),
                };

                if store.add_session_note(&note).await?.is_some() {
                    inserted += 1;
                }
            }
        }
    }

    tracing::info!(inserted, "seeded demo session notes");
    Ok(inserted)
}

#[cfg(test)]
pub mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-process `NoteStore` for tests.
    #[derive(Default)]
    pub struct MemoryStore {
        pub students: Mutex<Vec<Student>>,
        pub classes: Mutex<Vec<ClassInfo>>,
        pub notes: Mutex<Vec<(String, SessionNote)>>,
    }

    #[async_trait]
    impl NoteStore for MemoryStore {
        async fn students(&self) -> Result<Vec<Student>> {
            let mut students = self.students.lock().unwrap().clone();
            students.sort_by(|a, b| a.full_name.cmp(&b.full_name));
            Ok(students)
        }

        async fn student_by_email(&self, email: &str) -> Result<Option<Student>> {
            let students = self.students.lock().unwrap();
            Ok(students.iter().find(|student| student.email == email).cloned())
        }

        async fn classes(&self) -> Result<Vec<ClassInfo>> {
            Ok(self.classes.lock().unwrap().clone())
        }

        async fn notes_for_student(&self, student_id: Uuid) -> Result<Vec<SessionNote>> {
            let notes = self.notes.lock().unwrap();
            Ok(notes
                .iter()
                .map(|(_, note)| note)
                .filter(|note| note.student_id == student_id)
                .cloned()
                .collect())
        }

        async fn upsert_student(&self, full_name: &str, email: &str) -> Result<Uuid> {
            let mut students = self.students.lock().unwrap();
            if let Some(student) = students.iter_mut().find(|student| student.email == email) {
                student.full_name = full_name.to_string();
                return Ok(student.id);
            }
            let id = Uuid::new_v4();
            students.push(Student {
                id,
                full_name: full_name.to_string(),
                email: email.to_string(),
                grade: None,
            });
            Ok(id)
        }

        async fn upsert_class(&self, name: &str, subject: Option<&str>) -> Result<Uuid> {
            let mut classes = self.classes.lock().unwrap();
            if let Some(class) = classes.iter_mut().find(|class| class.name == name) {
                if subject.is_some() {
                    class.subject = subject.map(str::to_string);
                }
                return Ok(class.id);
            }
            let id = Uuid::new_v4();
            classes.push(ClassInfo {
                id,
                name: name.to_string(),
                subject: subject.map(str::to_string),
            });
            Ok(id)
        }

        async fn add_session_note(&self, note: &NewSessionNote) -> Result<Option<Uuid>> {
            let mut notes = self.notes.lock().unwrap();
            if notes.iter().any(|(key, _)| *key == note.source_key) {
                return Ok(None);
            }
            let id = Uuid::new_v4();
            notes.push((
                note.source_key.clone(),
                SessionNote {
                    id,
                    student_id: note.student_id,
                    session_date: note.session_date,
                    subject: note.subject.clone(),
                    class_id: note.class_id,
                    topic: note.topic.clone(),
                    topic_id: None,
                    engagement_level: note.engagement_level.clone(),
                    understanding_level: note.understanding_level.clone(),
                    lesson_summary: note.lesson_summary.clone(),
                    homework_assigned: note.homework_assigned.clone(),
                    tutor_notes: note.tutor_notes.clone(),
                    parent_feedback: note.parent_feedback.clone(),
                    attachments: note.attachments.clone(),
                },
            ));
            Ok(Some(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let store = MemoryStore::default();
        let first = seed(&store).await.unwrap();
        let second = seed(&store).await.unwrap();

        assert_eq!(first, 16);
        assert_eq!(second, 0);
        assert_eq!(store.students().await.unwrap().len(), 2);
        assert_eq!(store.classes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn seeded_notes_use_known_levels() {
        let store = MemoryStore::default();
        seed(&store).await.unwrap();
        let avery = store
            .student_by_email("avery.lee@example.com")
            .await
            .unwrap()
            .unwrap();

        let notes = store.notes_for_student(avery.id).await.unwrap();
        assert_eq!(notes.len(), 8);
        assert!(notes
            .iter()
            .all(|note| EngagementLevel::parse(&note.engagement_level).is_some()
                && UnderstandingLevel::parse(&note.understanding_level).is_some()));
    }
}
