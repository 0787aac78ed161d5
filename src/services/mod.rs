//! Service layer for deadline resolution.
//!
//! - Directory access (`UniversityDirectory`, `HttpDirectory`, `StaticDirectory`)
//! - University matching (`UniversityMatcher`)
//! - Deadline derivation (`DeadlineDeriver`)
//! - Placeholder deadlines (`MockDeadlines`)

mod deadlines;
mod directory;
mod matcher;
mod mock;

pub use deadlines::DeadlineDeriver;
pub use directory::{DirectoryQuery, HttpDirectory, StaticDirectory, UniversityDirectory};
pub use matcher::{MatchOutcome, UniversityMatcher};
pub use mock::{MockDeadlines, create_mock_deadlines};
