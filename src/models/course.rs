//! Course record supplied by callers.

use serde::{Deserialize, Serialize};

use crate::utils::text::non_blank;

/// A study program as recorded by the platform.
///
/// Only the free-text institution fields are used for matching; nothing
/// guarantees they point at a real directory entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Institution name as typed by whoever recorded the course
    #[serde(default, alias = "uni")]
    pub university_name: Option<String>,

    /// Municipality of the institution
    #[serde(default, alias = "city", alias = "comune")]
    pub municipality: Option<String>,

    /// Academic year label (e.g., "2026/2027")
    #[serde(default, alias = "academicYearLabel")]
    pub academic_year: Option<String>,

    /// Program name
    #[serde(default, alias = "nome")]
    pub course_name: Option<String>,

    /// Program type (e.g., "Laurea Magistrale")
    #[serde(default, alias = "type", alias = "tipo")]
    pub course_type: Option<String>,

    /// Program page
    #[serde(default)]
    pub link: Option<String>,
}

impl Course {
    /// Institution name, if present and not blank.
    pub fn university(&self) -> Option<&str> {
        non_blank(self.university_name.as_deref())
    }

    /// Municipality, if present and not blank.
    pub fn city(&self) -> Option<&str> {
        non_blank(self.municipality.as_deref())
    }

    /// Program name, if present and not blank.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.course_name.as_deref())
    }

    /// Whether the course carries anything the matcher can search on.
    pub fn has_institution_info(&self) -> bool {
        self.university().is_some() || self.city().is_some()
    }
}
