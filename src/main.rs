use std::path::PathBuf;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod analytics;
mod config;
mod dashboard;
mod db;
mod error;
mod grouping;
mod import;
mod levels;
mod models;
mod report;
#[cfg(test)]
mod testing;

use config::AppConfig;
use db::{NoteStore, PgNoteStore};
use error::NotesError;
use models::{ClassDirectory, NewSessionNote, PeriodKind, Student};

#[derive(Parser)]
#[command(name = "session-notes")]
#[command(about = "Session notes and progress analytics for tutors and parents", long_about = None)]
struct Cli {
    /// Path to config file (default: ./session-notes.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Week,
    Month,
}

impl From<PeriodArg> for PeriodKind {
    fn from(value: PeriodArg) -> Self {
        match value {
            PeriodArg::Week => PeriodKind::Week,
            PeriodArg::Month => PeriodKind::Month,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo students, classes and session notes
    Seed,
    /// Import session notes from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record a single session note
    AddNote {
        #[arg(long)]
        email: String,
        /// Session date, YYYY-MM-DD or RFC 3339
        #[arg(long)]
        date: String,
        #[arg(long)]
        engagement: String,
        #[arg(long)]
        understanding: String,
        #[arg(long)]
        class: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        homework: Option<String>,
        #[arg(long)]
        tutor_notes: Option<String>,
        #[arg(long)]
        parent_feedback: Option<String>,
    },
    /// List students
    Students,
    /// Show progress analytics for a student
    Analytics {
        #[arg(long)]
        email: String,
        /// Print the summary with weekly and monthly timelines as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show session notes grouped by class and period
    Timeline {
        #[arg(long)]
        email: String,
        #[arg(long, value_enum, default_value_t = PeriodArg::Week)]
        period: PeriodArg,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn find_student(store: &dyn NoteStore, email: &str) -> anyhow::Result<Student> {
    let email = email.trim().to_lowercase();
    let student = store
        .student_by_email(&email)
        .await?
        .ok_or(NotesError::UnknownStudent(email))?;
    Ok(student)
}

fn parse_date_arg(value: &str) -> anyhow::Result<DateTime<Utc>> {
    import::parse_session_date(value).ok_or_else(|| {
        anyhow!("--date {value:?} is neither YYYY-MM-DD nor an RFC 3339 timestamp")
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "session_notes=info,warn".into()),
        )
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load session-notes.toml")?,
    };
    config.apply_env();

    let database_url = config.database_url()?.to_string();
    let store = PgNoteStore::connect(&database_url, &config.database)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            store.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let inserted = db::seed(&store).await?;
            println!("Seed data inserted ({inserted} new session notes).");
        }
        Commands::Import { csv } => {
            let inserted = import::import_csv(&store, &csv)
                .await
                .with_context(|| format!("failed to import {}", csv.display()))?;
            println!("Inserted {inserted} session notes from {}.", csv.display());
        }
        Commands::AddNote {
            email,
            date,
            engagement,
            understanding,
            class,
            subject,
            topic,
            summary,
            homework,
            tutor_notes,
            parent_feedback,
        } => {
            let student = find_student(&store, &email).await?;
            let session_date = parse_date_arg(&date)?;
            if levels::EngagementLevel::parse(&engagement).is_none()
                || levels::UnderstandingLevel::parse(&understanding).is_none()
            {
                tracing::warn!(%engagement, %understanding, "unrecognized level; it will score 0");
            }
            let class_id = match class.as_deref() {
                Some(name) => Some(store.upsert_class(name, subject.as_deref()).await?),
                None => None,
            };

            let note = NewSessionNote {
                student_id: student.id,
                class_id,
                session_date,
                subject,
                topic,
                engagement_level: engagement,
                understanding_level: understanding,
                lesson_summary: summary,
                homework_assigned: homework,
                tutor_notes,
                parent_feedback,
                attachments: Vec::new(),
                source_key: format!("manual-{}", Uuid::new_v4()),
            };
            let id = store.add_session_note(&note).await?;
            match id {
                Some(id) => println!("Recorded session note {id} for {}.", student.full_name),
                None => println!("Session note already recorded."),
            }
        }
        Commands::Students => {
            let students = store.students().await?;
            if students.is_empty() {
                println!("No students found.");
                return Ok(());
            }
            for student in students.iter() {
                println!(
                    "- {} ({}){}",
                    student.full_name,
                    student.email,
                    student
                        .grade
                        .as_deref()
                        .map(|grade| format!(" grade {grade}"))
                        .unwrap_or_default()
                );
            }
        }
        Commands::Analytics { email, json } => {
            let student = find_student(&store, &email).await?;
            let dashboard =
                dashboard::load_dashboard(&store, student.id, &config.analytics).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
                return Ok(());
            }
            let summary = dashboard.summary;
            if summary.series.is_empty() {
                println!("No session notes found for {}.", student.full_name);
                return Ok(());
            }

            println!("Progress for {}:", student.full_name);
            println!("- {} sessions, {:.1} hours", summary.series.len(), summary.total_hours);
            println!("- average understanding {:.2}", summary.average_score);
            println!("- improvement rate {:.1}%", summary.improvement_rate);
            println!("- attendance rate {:.1}%", summary.attendance_rate);
            for (subject, series) in summary.subjects.iter() {
                println!(
                    "- {}: understanding {:?} over {}",
                    subject,
                    series.understanding,
                    series.labels.join(", ")
                );
            }
        }
        Commands::Timeline { email, period } => {
            let student = find_student(&store, &email).await?;
            let notes = store.notes_for_student(student.id).await?;
            let classes = ClassDirectory::new(&store.classes().await?);
            let groups = grouping::group_by_class_and_period(&notes, period.into(), &classes);

            if groups.is_empty() {
                println!("No session notes found for {}.", student.full_name);
                return Ok(());
            }
            for group in groups.iter() {
                println!("{}", group.class_name);
                for bucket in group.periods.iter() {
                    println!("  {}", bucket.label);
                    for note in bucket.notes.iter() {
                        println!(
                            "    - {} {} ({}, {})",
                            analytics::date_label(note.session_date),
                            note.topic.as_deref().unwrap_or("no topic"),
                            note.engagement_level,
                            note.understanding_level
                        );
                    }
                }
            }
        }
        Commands::Report { email, out } => {
            let student = find_student(&store, &email).await?;
            let dashboard =
                dashboard::load_dashboard(&store, student.id, &config.analytics).await?;
            let report =
                report::build_report(&student.full_name, &dashboard.summary, &dashboard.weekly);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
