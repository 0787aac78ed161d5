// src/pipeline/resolve.rs

//! Deadline resolution pipeline.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Course, CourseDeadlines, DeadlineSource};
use crate::services::{DeadlineDeriver, HttpDirectory, StaticDirectory, UniversityDirectory};

/// Outcome counts of a batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub course_count: usize,
    pub real_count: usize,
    pub mock_count: usize,
}

impl BatchSummary {
    fn from_results(
        results: &[CourseDeadlines],
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        let real_count = results
            .iter()
            .filter(|r| r.source() == Some(DeadlineSource::Real))
            .count();
        Self {
            start_time,
            end_time,
            course_count: results.len(),
            real_count,
            mock_count: results.len() - real_count,
        }
    }
}

/// Directory backend: a static JSON file when given, the HTTP API otherwise.
pub fn open_directory(
    config: &Config,
    directory_file: Option<&Path>,
) -> Result<Arc<dyn UniversityDirectory>> {
    match directory_file {
        Some(path) => {
            let directory = StaticDirectory::load(path)?;
            log::info!(
                "Loaded {} universities from {}",
                directory.entries().len(),
                path.display()
            );
            Ok(Arc::new(directory))
        }
        None => {
            log::info!("Using directory API at {}", config.directory.base_url);
            Ok(Arc::new(HttpDirectory::new(&config.directory)?))
        }
    }
}

/// Read a single course from a JSON file.
pub fn load_course(path: impl AsRef<Path>) -> Result<Course> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a JSON array of courses.
pub fn load_courses(path: impl AsRef<Path>) -> Result<Vec<Course>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let courses: Vec<Course> = serde_json::from_str(&content)?;
    if courses.is_empty() {
        return Err(AppError::validation(format!(
            "{}: no courses to resolve",
            path.display()
        )));
    }
    Ok(courses)
}

/// Resolve deadlines for one course.
pub async fn run_resolve(
    config: &Config,
    directory: Arc<dyn UniversityDirectory>,
    course: Course,
) -> Result<CourseDeadlines> {
    let deriver = DeadlineDeriver::new(config, directory);
    let deadlines = deriver.derive(&course).await;
    let result = CourseDeadlines { course, deadlines };

    match (result.source(), result.nearest()) {
        (Some(source), Some(nearest)) => log::info!(
            "{} {:?} deadline(s), nearest {} on {}",
            result.deadlines.len(),
            source,
            nearest.deadline_type,
            nearest.date.format("%Y-%m-%d")
        ),
        _ => log::warn!("No deadlines resolved"),
    }

    Ok(result)
}

/// Resolve deadlines for many courses, keeping input order.
pub async fn run_batch(
    config: &Config,
    directory: Arc<dyn UniversityDirectory>,
    courses: &[Course],
) -> Result<(Vec<CourseDeadlines>, BatchSummary)> {
    let start_time = Utc::now();
    log::info!(
        "Resolving {} courses ({} at a time)",
        courses.len(),
        config.directory.max_concurrent
    );

    let deriver = DeadlineDeriver::new(config, directory);
    let results = deriver.derive_all(courses).await;

    let summary = BatchSummary::from_results(&results, start_time, Utc::now());
    log::info!(
        "Resolved {} courses: {} from directory data, {} placeholders",
        summary.course_count,
        summary.real_count,
        summary.mock_count
    );

    Ok((results, summary))
}
