//! Admission and scheduling core for a university project-matching portal.
//!
//! Faculty publish projects, students apply, faculty decide applications and schedule
//! meetings. The [`portal`] module holds the record model, the entity store, and the rules
//! that keep projects, applications, and meetings consistent with one another.

pub mod config;
pub mod error;
pub mod portal;
pub mod telemetry;
