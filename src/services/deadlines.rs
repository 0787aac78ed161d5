// src/services/deadlines.rs

//! Deadline derivation service.
//!
//! Turns a course into a non-empty list of deadlines: the upcoming intakes of
//! its matched university when there are any, placeholder deadlines
//! otherwise. Lists are never a mix of the two.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};

use crate::models::{
    Config, Course, CourseDeadlines, DeadlineSource, Intake, ResolvedDeadline,
    UniversityDirectoryEntry,
};
use crate::services::directory::UniversityDirectory;
use crate::services::matcher::{MatchOutcome, UniversityMatcher};
use crate::services::mock::MockDeadlines;
use crate::utils::{DateParser, non_blank, reference_year, slugify};

/// Service resolving courses to upcoming deadlines.
#[derive(Clone)]
pub struct DeadlineDeriver {
    matcher: UniversityMatcher,
    parser: DateParser,
    mock: MockDeadlines,
    max_concurrent: usize,
}

impl DeadlineDeriver {
    /// Create a deriver over the given directory.
    pub fn new(config: &Config, directory: Arc<dyn UniversityDirectory>) -> Self {
        Self {
            matcher: UniversityMatcher::new(directory, &config.matching, &config.directory),
            parser: DateParser::new(&config.dates),
            mock: MockDeadlines::new(&config.mock),
            max_concurrent: config.directory.max_concurrent.max(1),
        }
    }

    /// Deadlines for `course` as of today (UTC).
    pub async fn derive(&self, course: &Course) -> Vec<ResolvedDeadline> {
        self.derive_at(course, Utc::now().date_naive()).await
    }

    /// Deadlines for `course` as of `today`.
    pub async fn derive_at(&self, course: &Course, today: NaiveDate) -> Vec<ResolvedDeadline> {
        let year = reference_year(course.academic_year.as_deref(), today);
        let fallback = || self.mock.build(course.name(), Some(year), today);

        if !course.has_institution_info() {
            log::debug!("Course {:?} has no institution info, using placeholders", course.name());
            return fallback();
        }

        let university = match self
            .matcher
            .find_university(course.university(), course.city())
            .await
        {
            MatchOutcome::Found(entry) => entry,
            MatchOutcome::NotFound => {
                log::debug!(
                    "No university for {:?} / {:?}, using placeholders",
                    course.university(),
                    course.city()
                );
                return fallback();
            }
        };

        let upcoming = self.upcoming_deadlines(&university, year, today);
        if upcoming.is_empty() {
            log::debug!("{} has no upcoming intakes, using placeholders", university.name);
            return fallback();
        }
        upcoming
    }

    /// Resolve many courses, at most `max_concurrent` at a time, keeping
    /// input order.
    pub async fn derive_all(&self, courses: &[Course]) -> Vec<CourseDeadlines> {
        let today = Utc::now().date_naive();
        self.derive_all_at(courses, today).await
    }

    pub async fn derive_all_at(&self, courses: &[Course], today: NaiveDate) -> Vec<CourseDeadlines> {
        stream::iter(courses.iter().cloned())
            .map(|course| async move {
                let deadlines = self.derive_at(&course, today).await;
                CourseDeadlines { course, deadlines }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    /// Ranked upcoming deadlines of a university; empty when none qualify.
    pub fn upcoming_deadlines(
        &self,
        university: &UniversityDirectoryEntry,
        reference_year: i32,
        today: NaiveDate,
    ) -> Vec<ResolvedDeadline> {
        let mut upcoming: Vec<ResolvedDeadline> = university
            .intakes
            .iter()
            .enumerate()
            .filter_map(|(index, intake)| {
                self.resolve_intake(university, index, intake, reference_year)
            })
            .filter(|deadline| deadline.date.date_naive() >= today)
            .collect();

        upcoming.sort_by_key(|deadline| deadline.date);

        let mut seen = HashSet::new();
        upcoming.retain(|d| seen.insert((d.deadline_type.to_lowercase(), d.date)));

        let total = upcoming.len();
        for (position, deadline) in upcoming.iter_mut().enumerate() {
            deadline.is_nearest = position == 0;
            deadline.total_upcoming_intakes_count = total;
        }
        upcoming
    }

    /// Build a deadline from one intake; `None` without a parseable end date.
    fn resolve_intake(
        &self,
        university: &UniversityDirectoryEntry,
        index: usize,
        intake: &Intake,
        reference_year: i32,
    ) -> Option<ResolvedDeadline> {
        let end_text = non_blank(intake.end_date.as_deref())?;
        let Some(date) = self.parser.parse_deadline(end_text, reference_year) else {
            log::debug!(
                "Dropping intake {:?} of {}: unparseable end date {:?}",
                intake.name,
                university.name,
                end_text
            );
            return None;
        };
        let start_date = non_blank(intake.start_date.as_deref())
            .and_then(|text| self.parser.parse_opening(text, reference_year));

        let label = non_blank(Some(intake.name.as_str())).unwrap_or("Application");
        let description = non_blank(intake.notes.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{label} deadline for {}", university.name));

        Some(ResolvedDeadline {
            id: format!("{}-{}-{}", university.id, index, slugify(label)),
            deadline_type: label.to_string(),
            date,
            start_date,
            description,
            is_rolling_admission: intake.is_rolling_admission(),
            related_link: university.application_link.clone(),
            is_nearest: false,
            total_upcoming_intakes_count: 0,
            source: DeadlineSource::Real,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::services::directory::{DirectoryQuery, StaticDirectory};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn intake(name: &str, start: Option<&str>, end: Option<&str>) -> Intake {
        Intake {
            name: name.to_string(),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            notes: None,
        }
    }

    fn university(id: &str, name: &str, city: &str, intakes: Vec<Intake>) -> UniversityDirectoryEntry {
        UniversityDirectoryEntry {
            id: id.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            region: None,
            application_link: Some(format!("https://example.org/{id}/apply")),
            intakes,
        }
    }

    fn course(name: Option<&str>, city: Option<&str>, year: Option<&str>) -> Course {
        Course {
            university_name: name.map(str::to_string),
            municipality: city.map(str::to_string),
            academic_year: year.map(str::to_string),
            course_name: Some("Computer Science".into()),
            ..Course::default()
        }
    }

    fn deriver(entries: Vec<UniversityDirectoryEntry>) -> DeadlineDeriver {
        DeadlineDeriver::new(&Config::default(), Arc::new(StaticDirectory::new(entries)))
    }

    fn assert_invariants(deadlines: &[ResolvedDeadline]) {
        assert!(!deadlines.is_empty());
        let source = deadlines[0].source;
        assert!(deadlines.iter().all(|d| d.source == source));
        assert_eq!(deadlines.iter().filter(|d| d.is_nearest).count(), 1);
        assert!(deadlines.iter().all(|d| d.total_upcoming_intakes_count == deadlines.len()));
        if source == DeadlineSource::Real {
            assert!(deadlines.windows(2).all(|w| w[0].date <= w[1].date));
            let min = deadlines.iter().map(|d| d.date).min();
            assert_eq!(deadlines.iter().find(|d| d.is_nearest).map(|d| d.date), min);
        }
    }

    /// Counts lookups and never finds anything.
    #[derive(Default)]
    struct CountingDirectory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UniversityDirectory for CountingDirectory {
        async fn search(&self, _query: &DirectoryQuery) -> Vec<UniversityDirectoryEntry> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_sapienza_scenario() {
        let d = deriver(vec![university(
            "sapienza",
            "Sapienza Università di Roma",
            "Rome",
            vec![intake("Non-EU", None, Some("15 January"))],
        )]);
        let deadlines = d
            .derive_at(&course(Some("Sapienza"), Some("Roma"), Some("2026/2027")), today())
            .await;

        assert_invariants(&deadlines);
        assert_eq!(deadlines.len(), 1);
        let deadline = &deadlines[0];
        assert_eq!(deadline.date.to_rfc3339(), "2027-01-15T23:59:59+00:00");
        assert!(deadline.is_nearest);
        assert_eq!(deadline.source, DeadlineSource::Real);
        assert_eq!(deadline.id, "sapienza-0-non-eu");
        assert_eq!(deadline.related_link.as_deref(), Some("https://example.org/sapienza/apply"));
        assert!(!deadline.is_rolling_admission);
    }

    #[tokio::test]
    async fn test_no_institution_info_skips_lookup() {
        let directory = Arc::new(CountingDirectory::default());
        let d = DeadlineDeriver::new(&Config::default(), directory.clone());
        let deadlines = d.derive_at(&course(None, None, Some("2026/2027")), today()).await;

        assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
        assert_eq!(deadlines.len(), 2);
        assert!(deadlines.iter().all(|d| d.source == DeadlineSource::Mock));
        assert_invariants(&deadlines);
    }

    #[tokio::test]
    async fn test_ambiguous_match_falls_back_to_mock() {
        let d = deriver(vec![
            university("polimi", "Politecnico di Milano", "Milano", vec![intake("Round 1", None, Some("1 March"))]),
            university("bocconi", "Università Bocconi", "Milano", vec![intake("Round 1", None, Some("1 March"))]),
        ]);
        let deadlines = d
            .derive_at(&course(Some("Statale"), Some("Milano"), Some("2026/2027")), today())
            .await;
        assert_eq!(deadlines.len(), 2);
        assert!(deadlines.iter().all(|d| d.source == DeadlineSource::Mock));
    }

    #[tokio::test]
    async fn test_past_intakes_fall_back_to_mock() {
        let d = deriver(vec![university(
            "pisa",
            "Università di Pisa",
            "Pisa",
            vec![
                intake("Early", None, Some("1 September 2026")),
                intake("Late", None, Some("15 October 2026")),
            ],
        )]);
        let deadlines = d
            .derive_at(&course(Some("Pisa"), Some("Pisa"), Some("2026/2027")), today())
            .await;
        assert!(deadlines.iter().all(|d| d.source == DeadlineSource::Mock));
        assert_invariants(&deadlines);
    }

    #[tokio::test]
    async fn test_deadline_today_is_upcoming() {
        let d = deriver(vec![university(
            "pisa",
            "Università di Pisa",
            "Pisa",
            vec![intake("Today", None, Some("16 October 2026"))],
        )]);
        let deadlines = d.derive_at(&course(Some("Pisa"), None, None), today()).await;
        assert_eq!(deadlines[0].source, DeadlineSource::Real);
    }

    #[tokio::test]
    async fn test_empty_intake_list_falls_back_to_mock() {
        let d = deriver(vec![university("x", "Università X", "Trento", Vec::new())]);
        let deadlines = d.derive_at(&course(Some("Università X"), None, None), today()).await;
        assert!(deadlines.iter().all(|d| d.source == DeadlineSource::Mock));
    }

    #[tokio::test]
    async fn test_missing_academic_year_uses_current_year() {
        let d = deriver(vec![university(
            "pavia",
            "Università di Pavia",
            "Pavia",
            vec![intake("Spring", None, Some("1 March"))],
        )]);
        let deadlines = d.derive_at(&course(Some("Pavia"), None, None), today()).await;
        assert_eq!(deadlines[0].date.to_rfc3339(), "2027-03-01T23:59:59+00:00");
    }

    #[test]
    fn test_ranking_filtering_and_dedup() {
        let d = deriver(Vec::new());
        let uni = university(
            "polito",
            "Politecnico di Torino",
            "Torino",
            vec![
                intake("Second Round", Some("1 February"), Some("31 March")),
                intake("Rolling Admission", Some(""), Some("")),
                intake("First Round", Some("1 October"), Some("15 January")),
                intake("Old Round", None, Some("1 September 2026")),
                intake("TBA Round", None, Some("TBA")),
                intake("First Round", None, Some("15/01/2027")),
                intake("Third Round", None, Some("30 April")),
            ],
        );

        let deadlines = d.upcoming_deadlines(&uni, 2026, today());
        let labels: Vec<&str> = deadlines.iter().map(|d| d.deadline_type.as_str()).collect();
        assert_eq!(labels, vec!["First Round", "Second Round", "Third Round"]);
        assert_invariants(&deadlines);

        assert_eq!(deadlines[0].id, "polito-2-first-round");
        assert_eq!(
            deadlines[0].start_date.map(|d| d.to_rfc3339()),
            Some("2026-10-01T00:00:00+00:00".to_string())
        );
        assert_eq!(deadlines[0].description, "First Round deadline for Politecnico di Torino");
        assert!(deadlines.iter().all(|d| d.total_upcoming_intakes_count == 3));
    }

    #[test]
    fn test_nameless_intake_is_labelled_application() {
        let d = deriver(Vec::new());
        let uni = university(
            "unipi",
            "Università di Pisa",
            "Pisa",
            vec![intake("", None, Some("15 January")), intake("Main", None, Some("1 March"))],
        );

        let deadlines = d.upcoming_deadlines(&uni, 2026, today());
        assert_eq!(deadlines.len(), 2);
        assert_eq!(deadlines[0].deadline_type, "Application");
        assert_eq!(deadlines[0].id, "unipi-0-application");
        assert_eq!(deadlines[0].description, "Application deadline for Università di Pisa");
        assert_eq!(deadlines[1].deadline_type, "Main");
    }

    #[test]
    fn test_notes_become_description() {
        let d = deriver(Vec::new());
        let mut round = intake("Scholarship Deadline", None, Some("1 May"));
        round.notes = Some("Apply through the DSU portal".into());
        let uni = university("unibo", "Università di Bologna", "Bologna", vec![round]);

        let deadlines = d.upcoming_deadlines(&uni, 2026, today());
        assert_eq!(deadlines[0].description, "Apply through the DSU portal");
    }

    #[tokio::test]
    async fn test_failing_directory_falls_back_to_mock() {
        let directory = Arc::new(CountingDirectory::default());
        let d = DeadlineDeriver::new(&Config::default(), directory.clone());
        let deadlines = d
            .derive_at(&course(Some("Sapienza"), Some("Roma"), None), today())
            .await;
        assert_eq!(directory.calls.load(Ordering::SeqCst), 3);
        assert!(deadlines.iter().all(|d| d.source == DeadlineSource::Mock));
    }

    #[tokio::test]
    async fn test_derive_all_preserves_order() {
        let d = deriver(vec![university(
            "pavia",
            "Università di Pavia",
            "Pavia",
            vec![intake("Spring", None, Some("1 March"))],
        )]);
        let courses = vec![
            course(None, None, None),
            course(Some("Pavia"), None, Some("2026/2027")),
            course(Some("Nowhere"), Some("Atlantis"), None),
        ];
        let results = d.derive_all_at(&courses, today()).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source(), Some(DeadlineSource::Mock));
        assert_eq!(results[1].source(), Some(DeadlineSource::Real));
        assert_eq!(results[1].course, courses[1]);
        assert_eq!(results[2].source(), Some(DeadlineSource::Mock));
        for result in &results {
            assert_invariants(&result.deadlines);
            assert!(result.nearest().is_some());
        }
    }
}
