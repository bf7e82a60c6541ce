use chrono::{DateTime, Datelike, Utc};

use crate::config::AnalyticsSettings;
use crate::levels::{engagement_score, understanding_score};
use crate::models::{AnalyticsSummary, SessionNote};

const SECONDS_PER_WEEK: f64 = 7.0 * 24.0 * 60.0 * 60.0;

pub fn compute_analytics(notes: &[SessionNote]) -> AnalyticsSummary {
    compute_analytics_with(notes, &AnalyticsSettings::default())
}

/// Chart series and headline metrics for one student's notes.
///
/// Pure: any permutation of the same notes yields the same summary, and an
/// empty slice yields the all-zero summary.
pub fn compute_analytics_with(
    notes: &[SessionNote],
    settings: &AnalyticsSettings,
) -> AnalyticsSummary {
    if notes.is_empty() {
        return AnalyticsSummary::default();
    }

    let mut sorted: Vec<&SessionNote> = notes.iter().collect();
    sorted.sort_by(|a, b| {
        a.session_date
            .cmp(&b.session_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut summary = AnalyticsSummary::default();

    for note in sorted.iter() {
        let label = date_label(note.session_date);
        let engagement = engagement_score(&note.engagement_level);
        let understanding = understanding_score(&note.understanding_level);

        summary
            .series
            .push(label.clone(), engagement, understanding);

        let subject = note
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|subject| !subject.is_empty());
        if let Some(subject) = subject {
            summary
                .subjects
                .entry(subject.to_string())
                .or_default()
                .push(label, engagement, understanding);
        }
    }

    let session_count = sorted.len();
    let first = sorted[0].session_date;
    let last = sorted[session_count - 1].session_date;

    let average_score = mean(&summary.series.understanding);
    let improvement = improvement_rate(&summary.series.understanding, settings.trend_window);

    summary.total_hours = session_count as f64 * settings.hours_per_session;
    summary.average_score = average_score;
    summary.improvement_rate = improvement;
    summary.attendance_rate = attendance_rate(
        session_count,
        first,
        last,
        settings.expected_sessions_per_week,
    );
    summary.recent_activity = sorted
        .iter()
        .rev()
        .take(settings.recent_activity_limit)
        .map(|note| (*note).clone())
        .collect();

    summary
}

/// `M/D` without zero padding.
pub fn date_label(date: DateTime<Utc>) -> String {
    let day = date.date_naive();
    format!("{}/{}", day.month(), day.day())
}

pub fn mean(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: u32 = scores.iter().map(|score| u32::from(*score)).sum();
    total as f64 / scores.len() as f64
}

/// Percentage change between the mean of the first and last `window` scores.
///
/// The two windows never overlap: with fewer than `2 * window` scores each
/// shrinks to half the available count, and a single score has no trend.
/// So `[1, 2, 3, 4]` compares 1.5 against 3.5, not the overlapping 2 and 3.
pub fn improvement_rate(scores: &[u8], window: usize) -> f64 {
    let window = window.min(scores.len() / 2);
    if window == 0 {
        return 0.0;
    }

    let first_avg = mean(&scores[..window]);
    let last_avg = mean(&scores[scores.len() - window..]);
    if first_avg == 0.0 {
        return 0.0;
    }

    (last_avg - first_avg) / first_avg * 100.0
}

/// Sessions held against `per_week` expected sessions over the spanned weeks.
///
/// Returns 0 when no whole week is spanned, which includes a single session.
pub fn attendance_rate(
    sessions: usize,
    first: DateTime<Utc>,
    last: DateTime<Utc>,
    per_week: f64,
) -> f64 {
    let weeks = (last - first).num_seconds() as f64 / SECONDS_PER_WEEK;
    let expected = weeks.ceil() * per_week;
    if !expected.is_finite() || expected <= 0.0 {
        return 0.0;
    }

    sessions as f64 / expected * 100.0
}
