//! University directory records.

use serde::{Deserialize, Serialize};

use crate::utils::text::non_blank;

/// A university as listed in the external directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UniversityDirectoryEntry {
    /// Directory identifier
    #[serde(alias = "_id")]
    pub id: String,

    /// Official name (e.g., "Sapienza Università di Roma")
    pub name: String,

    /// City as recorded by the directory
    #[serde(default)]
    pub city: String,

    /// Region or province
    #[serde(default)]
    pub region: Option<String>,

    /// Admissions portal
    #[serde(default, alias = "application_link")]
    pub application_link: Option<String>,

    /// Admission rounds
    #[serde(default)]
    pub intakes: Vec<Intake>,
}

impl UniversityDirectoryEntry {
    /// Whether `key` (already lowercased) appears in the city or region.
    pub fn located_in(&self, key: &str) -> bool {
        self.city.to_lowercase().contains(key)
            || self
                .region
                .as_deref()
                .is_some_and(|region| region.to_lowercase().contains(key))
    }
}

/// A named admission window with informal date texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Intake {
    /// Label (e.g., "Non-EU Autumn Round")
    #[serde(default)]
    pub name: String,

    /// Opening date as free text
    #[serde(default, alias = "start_date", alias = "startDateText")]
    pub start_date: Option<String>,

    /// Closing date as free text
    #[serde(default, alias = "end_date", alias = "endDateText")]
    pub end_date: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Intake {
    /// Rolling admission: no dates at all and not labelled as a deadline.
    pub fn is_rolling_admission(&self) -> bool {
        non_blank(self.start_date.as_deref()).is_none()
            && non_blank(self.end_date.as_deref()).is_none()
            && !self.name.to_lowercase().contains("deadline")
    }
}
