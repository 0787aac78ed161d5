// src/services/mock.rs

//! Placeholder deadlines.
//!
//! Shown whenever no authoritative deadline can be resolved, always with a
//! disclaimer pointing the reader to the official source.

use chrono::{Datelike, Months, NaiveDate};

use crate::models::{DeadlineSource, MockConfig, ResolvedDeadline};
use crate::utils::{end_of_day, slugify};

/// Builder for the two-entry placeholder list.
#[derive(Debug, Clone, Default)]
pub struct MockDeadlines {
    config: MockConfig,
}

impl MockDeadlines {
    pub fn new(config: &MockConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// An "Application" and a "Scholarship" deadline, one and three months
    /// (by default) after `today`'s month in `reference_year`.
    pub fn build(
        &self,
        course_name: Option<&str>,
        reference_year: Option<i32>,
        today: NaiveDate,
    ) -> Vec<ResolvedDeadline> {
        let year = reference_year.unwrap_or_else(|| today.year());
        let anchor = NaiveDate::from_ymd_opt(year, today.month(), self.config.day_of_month)
            .unwrap_or(today);
        let slug = course_name.map(slugify).filter(|s| !s.is_empty());
        let slug = slug.as_deref().unwrap_or("course");

        let rounds = [
            ("Application", self.config.application_offset_months),
            ("Scholarship", self.config.scholarship_offset_months),
        ];
        let total = rounds.len();

        rounds
            .iter()
            .enumerate()
            .map(|(index, (label, offset))| {
                let date = anchor.checked_add_months(Months::new(*offset)).unwrap_or(anchor);
                ResolvedDeadline {
                    id: format!("mock-{slug}-{index}"),
                    deadline_type: label.to_string(),
                    date: end_of_day(date),
                    start_date: None,
                    description: self.describe(label, course_name),
                    is_rolling_admission: false,
                    related_link: None,
                    is_nearest: index == 0,
                    total_upcoming_intakes_count: total,
                    source: DeadlineSource::Mock,
                }
            })
            .collect()
    }

    fn describe(&self, label: &str, course_name: Option<&str>) -> String {
        match course_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("{label} deadline for {name}. {}", self.config.disclaimer),
            None => format!("{label} deadline. {}", self.config.disclaimer),
        }
    }
}

/// Placeholder deadlines with default settings.
pub fn create_mock_deadlines(
    course_name: Option<&str>,
    reference_year: Option<i32>,
    today: NaiveDate,
) -> Vec<ResolvedDeadline> {
    MockDeadlines::default().build(course_name, reference_year, today)
}
