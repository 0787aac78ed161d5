//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory API client settings
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// University matching rules
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Date parsing settings
    #[serde(default)]
    pub dates: DateConfig,

    /// Placeholder deadline settings
    #[serde(default)]
    pub mock: MockConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.directory.base_url.trim().is_empty() {
            return Err(AppError::validation("directory.base_url is empty"));
        }
        url::Url::parse(&self.directory.base_url)?;
        if self.directory.user_agent.trim().is_empty() {
            return Err(AppError::validation("directory.user_agent is empty"));
        }
        if self.directory.timeout_secs == 0 {
            return Err(AppError::validation("directory.timeout_secs must be > 0"));
        }
        if self.directory.name_limit == 0 || self.directory.city_limit == 0 {
            return Err(AppError::validation(
                "directory.name_limit and directory.city_limit must be > 0",
            ));
        }
        if self.directory.max_concurrent == 0 {
            return Err(AppError::validation("directory.max_concurrent must be > 0"));
        }
        if !(1..=12).contains(&self.dates.academic_year_pivot_month) {
            return Err(AppError::validation(
                "dates.academic_year_pivot_month must be within 1..=12",
            ));
        }
        if !(1..=28).contains(&self.mock.day_of_month) {
            return Err(AppError::validation("mock.day_of_month must be within 1..=28"));
        }
        if self.mock.scholarship_offset_months < self.mock.application_offset_months {
            return Err(AppError::validation(
                "mock.scholarship_offset_months must not precede the application offset",
            ));
        }
        if self
            .matching
            .city_aliases
            .iter()
            .any(|alias| alias.names.iter().all(|n| n.trim().is_empty()))
        {
            return Err(AppError::validation("matching.city_aliases has an empty group"));
        }
        Ok(())
    }
}

/// HTTP directory client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Origin of the platform API (the client appends `/api/universities`)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after a transport error or 5xx response
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Delay between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,

    /// Candidate cap for name-based lookups
    #[serde(default = "defaults::name_limit")]
    pub name_limit: usize,

    /// Candidate cap for city-only lookups
    #[serde(default = "defaults::city_limit")]
    pub city_limit: usize,

    /// Maximum courses resolved concurrently in batch mode
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay(),
            name_limit: defaults::name_limit(),
            city_limit: defaults::city_limit(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// University matching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Groups of spellings that name the same city
    #[serde(default = "defaults::city_aliases")]
    pub city_aliases: Vec<CityAlias>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            city_aliases: defaults::city_aliases(),
        }
    }
}

impl MatchingConfig {
    /// Every lowercased spelling sharing a group with `name`.
    ///
    /// Returns an empty list when `name` is not a known city.
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        let needle = name.trim().to_lowercase();
        self.city_aliases
            .iter()
            .find(|group| group.contains(&needle))
            .map(|group| group.names.iter().map(|n| n.to_lowercase()).collect())
            .unwrap_or_default()
    }

    /// Whether `name` is exactly a known city spelling.
    pub fn is_known_city(&self, name: &str) -> bool {
        let needle = name.trim().to_lowercase();
        self.city_aliases.iter().any(|group| group.contains(&needle))
    }
}

/// Alternative spellings of one city (e.g., "Roma", "Rome").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityAlias {
    pub names: Vec<String>,
}

impl CityAlias {
    fn contains(&self, lowered: &str) -> bool {
        self.names.iter().any(|n| n.to_lowercase() == lowered)
    }
}

/// Date parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateConfig {
    /// First month of the academic year; yearless dates in earlier months
    /// fall in the following calendar year
    #[serde(default = "defaults::pivot_month")]
    pub academic_year_pivot_month: u32,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            academic_year_pivot_month: defaults::pivot_month(),
        }
    }
}

/// Placeholder deadline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// Text attached to every placeholder deadline
    #[serde(default = "defaults::disclaimer")]
    pub disclaimer: String,

    #[serde(default = "defaults::application_offset")]
    pub application_offset_months: u32,

    #[serde(default = "defaults::scholarship_offset")]
    pub scholarship_offset_months: u32,

    #[serde(default = "defaults::day_of_month")]
    pub day_of_month: u32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            disclaimer: defaults::disclaimer(),
            application_offset_months: defaults::application_offset(),
            scholarship_offset_months: defaults::scholarship_offset(),
            day_of_month: defaults::day_of_month(),
        }
    }
}

mod defaults {
    use super::CityAlias;

    // Directory defaults
    pub fn base_url() -> String {
        "http://localhost:5000".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; deadlines/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_retries() -> u32 {
        2
    }
    pub fn retry_delay() -> u64 {
        250
    }
    pub fn name_limit() -> usize {
        10
    }
    pub fn city_limit() -> usize {
        20
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Date defaults
    pub fn pivot_month() -> u32 {
        8
    }

    // Mock defaults
    pub fn disclaimer() -> String {
        "Estimated date. Always verify deadlines on the university's official website.".into()
    }
    pub fn application_offset() -> u32 {
        1
    }
    pub fn scholarship_offset() -> u32 {
        3
    }
    pub fn day_of_month() -> u32 {
        15
    }

    // Matching defaults
    const CITY_ALIASES: &[&[&str]] = &[
        &["Roma", "Rome"],
        &["Milano", "Milan"],
        &["Torino", "Turin"],
        &["Napoli", "Naples"],
        &["Firenze", "Florence"],
        &["Venezia", "Venice"],
        &["Genova", "Genoa"],
        &["Padova", "Padua"],
        &["Bologna"],
        &["Pisa"],
        &["Siena"],
        &["Trento"],
        &["Pavia"],
        &["Bari"],
        &["Palermo"],
        &["Catania"],
        &["Perugia"],
        &["Parma"],
        &["Verona"],
        &["Trieste"],
        &["Cagliari"],
        &["Salerno"],
        &["Messina"],
        &["Brescia"],
        &["Bergamo"],
    ];

    pub fn city_aliases() -> Vec<CityAlias> {
        CITY_ALIASES
            .iter()
            .map(|names| CityAlias {
                names: names.iter().map(|n| n.to_string()).collect(),
            })
            .collect()
    }
}
