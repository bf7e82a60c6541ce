use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{ClassDirectory, ClassGroup, PeriodKind, SessionNote, TimeBucket};

pub const UNASSIGNED_CLASS_NAME: &str = "Other";
pub const UNKNOWN_CLASS_NAME: &str = "Unknown Class";

/// Sunday of the note's week, or the 1st of its month, in UTC.
pub fn period_start(date: DateTime<Utc>, period: PeriodKind) -> NaiveDate {
    let day = date.date_naive();
    match period {
        PeriodKind::Week => {
            day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
        }
        PeriodKind::Month => day.with_day(1).unwrap_or(day),
    }
}

pub fn period_label(start: NaiveDate, period: PeriodKind) -> String {
    match period {
        PeriodKind::Week => format!("Week of {}", start.format("%b %-d, %Y")),
        PeriodKind::Month => start.format("%B %Y").to_string(),
    }
}

fn class_name(class_id: Option<Uuid>, classes: &ClassDirectory) -> String {
    match class_id {
        None => UNASSIGNED_CLASS_NAME.to_string(),
        Some(id) => classes
            .name_of(&id)
            .unwrap_or(UNKNOWN_CLASS_NAME)
            .to_string(),
    }
}

/// Partitions notes by class, then by week or month, newest first.
///
/// Classes are ordered by their newest note. Every note lands in exactly one
/// bucket and empty buckets are never produced.
pub fn group_by_class_and_period(
    notes: &[SessionNote],
    period: PeriodKind,
    classes: &ClassDirectory,
) -> Vec<ClassGroup> {
    let mut sorted: Vec<&SessionNote> = notes.iter().collect();
    sorted.sort_by(|a, b| {
        b.session_date
            .cmp(&a.session_date)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut groups: Vec<ClassGroup> = Vec::new();
    let mut index_by_class: HashMap<Option<Uuid>, usize> = HashMap::new();

    for note in sorted {
        let index = *index_by_class.entry(note.class_id).or_insert_with(|| {
            groups.push(ClassGroup {
                class_id: note.class_id,
                class_name: class_name(note.class_id, classes),
                periods: Vec::new(),
            });
            groups.len() - 1
        });

        let start = period_start(note.session_date, period);
        let group = &mut groups[index];
        match group
            .periods
            .iter_mut()
            .find(|bucket| bucket.period_start == start)
        {
            Some(bucket) => bucket.notes.push(note.clone()),
            None => group.periods.push(TimeBucket {
                period_start: start,
                label: period_label(start, period),
                notes: vec![note.clone()],
            }),
        }
    }

    groups
}
