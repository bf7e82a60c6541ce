use serde::Serialize;
use uuid::Uuid;

use crate::analytics::compute_analytics_with;
use crate::config::AnalyticsSettings;
use crate::db::NoteStore;
use crate::error::Result;
use crate::grouping::group_by_class_and_period;
use crate::models::{AnalyticsSummary, ClassDirectory, ClassGroup, PeriodKind};

/// Everything the parent dashboard renders for one student.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: AnalyticsSummary,
    pub weekly: Vec<ClassGroup>,
    pub monthly: Vec<ClassGroup>,
}

pub async fn load_dashboard(
    store: &dyn NoteStore,
    student_id: Uuid,
    settings: &AnalyticsSettings,
) -> Result<Dashboard> {
    let notes = store.notes_for_student(student_id).await?;
    let classes = ClassDirectory::new(&store.classes().await?);

    Ok(Dashboard {
        summary: compute_analytics_with(&notes, settings),
        weekly: group_by_class_and_period(&notes, PeriodKind::Week, &classes),
        monthly: group_by_class_and_period(&notes, PeriodKind::Month, &classes),
    })
}
