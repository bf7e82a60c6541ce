use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::models::SessionNote;

pub fn student_id() -> Uuid {
    Uuid::from_u128(0x5eed)
}

/// Midnight UTC on the given day, plus `hour` hours.
pub fn at(year: i32, month: u32, day: u32, hour: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap() + Duration::hours(hour)
}

pub fn note(seq: u128, session_date: DateTime<Utc>, understanding: &str) -> SessionNote {
    SessionNote {
        id: Uuid::from_u128(seq),
        student_id: student_id(),
        session_date,
        subject: Some("Math".to_string()),
        class_id: None,
        topic: Some("Fractions".to_string()),
        topic_id: None,
        engagement_level: "Engaged".to_string(),
        understanding_level: understanding.to_string(),
        lesson_summary: Some("Worked through practice set".to_string()),
        homework_assigned: None,
        tutor_notes: None,
        parent_feedback: None,
        attachments: Vec::new(),
    }
}
