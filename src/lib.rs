// src/lib.rs

//! Course deadline resolution library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

pub use services::{DeadlineDeriver, MatchOutcome, UniversityMatcher, create_mock_deadlines};
pub use utils::parse_deadline_date_string;
