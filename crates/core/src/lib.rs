//! Coursetrack core data models.
//!
//! This crate defines the curriculum reference table and the per-user
//! progress snapshot that the progress engine derives its values from.

#![warn(missing_docs)]

// Core identities
mod id;

// Reference data
mod curriculum;

// User state
mod progress;

// Re-exports
pub use id::*;

pub use curriculum::{Category, Course, Curriculum, CurriculumError, Difficulty, Lecture};
pub use progress::{LectureCompletion, ProgressSnapshot, QuizAttempt};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// Calendar date type (`YYYY-MM-DD` on the wire)
pub type Date = chrono::NaiveDate;
