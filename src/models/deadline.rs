//! Resolved deadline value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Course;

/// Where a deadline list came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineSource {
    /// Parsed from a matched directory entry
    Real,
    /// Synthetic placeholder
    Mock,
}

/// A single upcoming deadline, ready to embed in an API response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDeadline {
    /// Stable identifier
    pub id: String,

    /// Label of the admission round
    pub deadline_type: String,

    /// Closing instant
    pub date: DateTime<Utc>,

    /// Opening instant, when known
    pub start_date: Option<DateTime<Utc>>,

    pub description: String,

    pub is_rolling_admission: bool,

    pub related_link: Option<String>,

    /// Set on the earliest entry of a list
    pub is_nearest: bool,

    /// Size of the list this entry belongs to
    pub total_upcoming_intakes_count: usize,

    pub source: DeadlineSource,
}

/// A course paired with its resolved deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDeadlines {
    pub course: Course,
    pub deadlines: Vec<ResolvedDeadline>,
}

impl CourseDeadlines {
    /// The entry flagged as nearest, if any.
    pub fn nearest(&self) -> Option<&ResolvedDeadline> {
        self.deadlines.iter().find(|d| d.is_nearest)
    }

    /// Source shared by every entry of the list.
    pub fn source(&self) -> Option<DeadlineSource> {
        self.deadlines.first().map(|d| d.source)
    }
}
