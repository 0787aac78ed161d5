//! Utility functions and helpers.

pub mod date;
pub mod http;
pub mod text;

pub use date::{DateParser, end_of_day, parse_deadline_date_string, reference_year, start_of_day};
pub use text::{contains_ci, non_blank, slugify};
