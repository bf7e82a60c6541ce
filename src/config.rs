use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::NotesError;

const DEFAULT_CONFIG_FILE: &str = "session-notes.toml";

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub analytics: AnalyticsSettings,
}

impl AppConfig {
    /// Load from `session-notes.toml` in the working directory, falling back
    /// to defaults if the file doesn't exist.
    pub fn load() -> Result<Self, NotesError> {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, NotesError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// `DATABASE_URL` wins over the file.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database.url = Some(url);
            }
        }
    }

    pub fn database_url(&self) -> Result<&str, NotesError> {
        self.database.url.as_deref().ok_or_else(|| {
            NotesError::Config("DATABASE_URL must be set or database.url configured".into())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

/// Heuristic constants behind the dashboard metrics.
///
/// None of these come from real schedule data: one hour per session and two
/// expected sessions per week are placeholders kept for compatibility with
/// the numbers parents already see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub hours_per_session: f64,
    pub expected_sessions_per_week: f64,
    /// Notes averaged at each end of the improvement comparison.
    pub trend_window: usize,
    pub recent_activity_limit: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            hours_per_session: 1.0,
            expected_sessions_per_week: 2.0,
            trend_window: 3,
            recent_activity_limit: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nurl = \"postgres://localhost/tutoring\"").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/tutoring"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.analytics, AnalyticsSettings::default());
    }

    #[test]
    fn analytics_section_overrides_heuristics() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[analytics]\nexpected_sessions_per_week = 3.0\nrecent_activity_limit = 10"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.analytics.expected_sessions_per_week, 3.0);
        assert_eq!(config.analytics.recent_activity_limit, 10);
        assert_eq!(config.analytics.trend_window, 3);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[analytics\ntrend_window = ").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, NotesError::ConfigParse(_)));
    }

    #[test]
    fn database_url_is_required() {
        let config = AppConfig::default();
        assert!(matches!(config.database_url(), Err(NotesError::Config(_))));
    }
}
