// src/pipeline/inspect.rs

//! Single-step diagnostics: matching and date parsing in isolation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, UniversityDirectoryEntry};
use crate::services::{MatchOutcome, UniversityDirectory, UniversityMatcher};
use crate::utils::{DateParser, reference_year};

/// How a date text was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDate {
    pub input: String,
    pub reference_year: i32,
    pub date: Option<NaiveDate>,
    /// Instant used when the text closes an intake
    pub deadline: Option<DateTime<Utc>>,
    /// Instant used when the text opens an intake
    pub opening: Option<DateTime<Utc>>,
}

/// Look up the directory entry for a university name and city.
pub async fn run_match(
    config: &Config,
    directory: Arc<dyn UniversityDirectory>,
    name: Option<&str>,
    city: Option<&str>,
) -> Result<Option<UniversityDirectoryEntry>> {
    if name.is_none() && city.is_none() {
        return Err(AppError::validation("a university name or a city is required"));
    }

    let matcher = UniversityMatcher::new(directory, &config.matching, &config.directory);
    let outcome = matcher.find_university(name, city).await;
    match &outcome {
        MatchOutcome::Found(entry) => log::info!("Matched {} ({})", entry.name, entry.id),
        MatchOutcome::NotFound => log::info!("No match for name={:?} city={:?}", name, city),
    }
    Ok(outcome.into_entry())
}

/// Parse `text` against an explicit year, or the year of `academic_year`.
pub fn run_parse_date(
    config: &Config,
    text: &str,
    year: Option<i32>,
    academic_year: Option<&str>,
    today: NaiveDate,
) -> ParsedDate {
    let parser = DateParser::new(&config.dates);
    let reference_year = year.unwrap_or_else(|| reference_year(academic_year, today));
    let parsed = ParsedDate {
        input: text.to_string(),
        reference_year,
        date: parser.parse_date(text, reference_year),
        deadline: parser.parse_deadline(text, reference_year),
        opening: parser.parse_opening(text, reference_year),
    };
    if parsed.date.is_none() {
        log::warn!("Unparseable date text: {:?}", text);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StaticDirectory;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_parse_date_with_academic_year() {
        let parsed = run_parse_date(&Config::default(), "15 January", None, Some("2026/2027"), today());
        assert_eq!(parsed.reference_year, 2026);
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2027, 1, 15));
        assert_eq!(
            parsed.deadline.map(|d| d.to_rfc3339()),
            Some("2027-01-15T23:59:59+00:00".to_string())
        );
        assert_eq!(
            parsed.opening.map(|d| d.to_rfc3339()),
            Some("2027-01-15T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_explicit_year_wins() {
        let parsed = run_parse_date(&Config::default(), "1 October", Some(2030), Some("2026/2027"), today());
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2030, 10, 1));
    }

    #[test]
    fn test_unparseable_text() {
        let parsed = run_parse_date(&Config::default(), "TBA", None, None, today());
        assert_eq!(parsed.reference_year, 2026);
        assert!(parsed.date.is_none());
        assert!(parsed.deadline.is_none());
        assert!(parsed.opening.is_none());
    }

    #[tokio::test]
    async fn test_run_match() {
        let directory = Arc::new(StaticDirectory::new(vec![UniversityDirectoryEntry {
            id: "unitn".into(),
            name: "Università di Trento".into(),
            city: "Trento".into(),
            ..UniversityDirectoryEntry::default()
        }]));

        let found = run_match(&Config::default(), directory.clone(), Some("Trento"), None)
            .await
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some("unitn".to_string()));

        let missing = run_match(&Config::default(), directory.clone(), Some("Bari"), None)
            .await
            .unwrap();
        assert!(missing.is_none());

        assert!(run_match(&Config::default(), directory, None, None).await.is_err());
    }
}
