// src/models/mod.rs

//! Domain models for the deadline engine.
//!
//! Courses and directory entries come from outside and are read-only here;
//! resolved deadlines are produced per request and never stored.

mod config;
mod course;
mod deadline;
mod university;

// Re-export all public types
pub use config::{CityAlias, Config, DateConfig, DirectoryConfig, MatchingConfig, MockConfig};
pub use course::Course;
pub use deadline::{CourseDeadlines, DeadlineSource, ResolvedDeadline};
pub use university::{Intake, UniversityDirectoryEntry};
