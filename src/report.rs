use std::fmt::Write;

use crate::analytics::mean;
use crate::models::{AnalyticsSummary, ClassGroup};

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSummary {
    pub subject: String,
    pub sessions: usize,
    pub avg_engagement: f64,
    pub avg_understanding: f64,
}

pub fn summarize_by_subject(summary: &AnalyticsSummary) -> Vec<SubjectSummary> {
    let mut subjects: Vec<SubjectSummary> = summary
        .subjects
        .iter()
        .map(|(subject, series)| SubjectSummary {
            subject: subject.clone(),
            sessions: series.len(),
            avg_engagement: mean(&series.engagement),
            avg_understanding: mean(&series.understanding),
        })
        .collect();

    subjects.sort_by(|a, b| b.sessions.cmp(&a.sessions).then_with(|| a.subject.cmp(&b.subject)));
    subjects
}

pub fn build_report(
    student_name: &str,
    summary: &AnalyticsSummary,
    timeline: &[ClassGroup],
) -> String {
    let subjects = summarize_by_subject(summary);
    let mut output = String::new();

    let _ = writeln!(output, "# Session Progress Report");
    let _ = writeln!(output, "Prepared for {}", student_name);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Highlights");

    if summary.series.is_empty() {
        let _ = writeln!(output, "No sessions recorded yet.");
    } else {
        let _ = writeln!(output, "- Sessions: {}", summary.series.len());
        let _ = writeln!(output, "- Total hours: {:.1}", summary.total_hours);
        let _ = writeln!(output, "- Average understanding: {:.2} / 5", summary.average_score);
        let _ = writeln!(output, "- Improvement rate: {:.1}%", summary.improvement_rate);
        let _ = writeln!(output, "- Attendance rate: {:.1}%", summary.attendance_rate);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Subjects");

    if subjects.is_empty() {
        let _ = writeln!(output, "No subjects recorded.");
    } else {
        for subject in subjects.iter() {
            let _ = writeln!(
                output,
                "- {}: {} sessions (engagement {:.1}, understanding {:.1})",
                subject.subject, subject.sessions, subject.avg_engagement, subject.avg_understanding
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Timeline");

    if timeline.is_empty() {
        let _ = writeln!(output, "No sessions recorded yet.");
    } else {
        for group in timeline.iter() {
            let _ = writeln!(output, "### {}", group.class_name);
            for bucket in group.periods.iter() {
                let _ = writeln!(output, "- {}: {} sessions", bucket.label, bucket.notes.len());
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");

    if summary.recent_activity.is_empty() {
        let _ = writeln!(output, "No sessions recorded yet.");
    } else {
        for note in summary.recent_activity.iter() {
            let _ = writeln!(
                output,
                "- {} {} / {} ({}): {}",
                note.session_date.date_naive(),
                note.subject.as_deref().unwrap_or("General"),
                note.topic.as_deref().unwrap_or("no topic"),
                note.understanding_level,
                note.lesson_summary.as_deref().unwrap_or("no summary")
            );
        }
    }

    output
}
