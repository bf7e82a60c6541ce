use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub name: String,
    /// Type tag, usually `image` or `document`.
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNote {
    pub id: Uuid,
    pub student_id: Uuid,
    pub session_date: DateTime<Utc>,
    pub subject: Option<String>,
    pub class_id: Option<Uuid>,
    pub topic: Option<String>,
    pub topic_id: Option<Uuid>,
    pub engagement_level: String,
    pub understanding_level: String,
    pub lesson_summary: Option<String>,
    pub homework_assigned: Option<String>,
    pub tutor_notes: Option<String>,
    pub parent_feedback: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// A session note before the store has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewSessionNote {
    pub student_id: Uuid,
    pub class_id: Option<Uuid>,
    pub session_date: DateTime<Utc>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub engagement_level: String,
    pub understanding_level: String,
    pub lesson_summary: Option<String>,
    pub homework_assigned: Option<String>,
    pub tutor_notes: Option<String>,
    pub parent_feedback: Option<String>,
    pub attachments: Vec<Attachment>,
    pub source_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: Uuid,
    pub name: String,
    pub subject: Option<String>,
}

/// Known class names keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ClassDirectory {
    names: HashMap<Uuid, String>,
}

impl ClassDirectory {
    pub fn new(classes: &[ClassInfo]) -> Self {
        Self {
            names: classes
                .iter()
                .map(|class| (class.id, class.name.clone()))
                .collect(),
        }
    }

    pub fn name_of(&self, id: &Uuid) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSeries {
    pub labels: Vec<String>,
    pub engagement: Vec<u8>,
    pub understanding: Vec<u8>,
}

impl ScoreSeries {
    pub fn push(&mut self, label: String, engagement: u8, understanding: u8) {
        self.labels.push(label);
        self.engagement.push(engagement);
        self.understanding.push(understanding);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(flatten)]
    pub series: ScoreSeries,
    pub subjects: BTreeMap<String, ScoreSeries>,
    pub total_hours: f64,
    pub average_score: f64,
    pub improvement_rate: f64,
    pub attendance_rate: f64,
    pub recent_activity: Vec<SessionNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    pub period_start: NaiveDate,
    pub label: String,
    pub notes: Vec<SessionNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    /// `None` for notes without a class.
    pub class_id: Option<Uuid>,
    pub class_name: String,
    pub periods: Vec<TimeBucket>,
}

impl ClassGroup {
    pub fn note_count(&self) -> usize {
        self.periods.iter().map(|bucket| bucket.notes.len()).sum()
    }
}
