//! Pipeline entry points for deadline operations.
//!
//! - `run_resolve` / `run_batch`: Derive deadlines for one or many courses
//! - `run_match`: Look up the directory entry of a university
//! - `run_parse_date`: Parse a single date text
//! - `run_validate`: Check configuration and directory data

pub mod inspect;
pub mod resolve;
pub mod validate;

pub use inspect::{ParsedDate, run_match, run_parse_date};
pub use resolve::{BatchSummary, load_course, load_courses, open_directory, run_batch, run_resolve};
pub use validate::run_validate;
