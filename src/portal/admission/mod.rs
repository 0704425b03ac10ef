//! Admission gates for project applications.
//!
//! Three invariants hold across projects and applications: a student below a project's
//! minimum CGPA cannot apply, a project never holds more accepted students than its team size,
//! and a project whose team fills up moves to ASSIGNED. The rules themselves are pure functions
//! in `rules`; [`AdmissionService`] loads the records, applies them, and writes the outcome.

mod error;
pub mod policy;
pub(crate) mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use error::AdmissionError;
pub use policy::{AdmissionPolicy, MissingCgpaPolicy};
pub use service::{AdmissionService, Decision, ProjectListing};
