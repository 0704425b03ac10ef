//! Pure admission rules. Nothing here touches the store.

use super::error::AdmissionError;
use super::policy::MissingCgpaPolicy;
use crate::portal::domain::{Application, ApplicationStatus, Project, ProjectId, MAX_CGPA};

/// Result of checking a requested application status against the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Already in the requested status.
    Unchanged,
    Apply,
}

/// CGPA gate. A project without a minimum admits everyone.
pub(crate) fn check_cgpa(
    project: &Project,
    cgpa: Option<f32>,
    missing: MissingCgpaPolicy,
) -> Result<(), AdmissionError> {
    let Some(required) = project.min_cgpa else {
        return Ok(());
    };

    let actual = match (cgpa, missing) {
        (Some(cgpa), _) => cgpa,
        (None, MissingCgpaPolicy::Permit) => return Ok(()),
        (None, MissingCgpaPolicy::TreatAsZero) => 0.0,
        (None, MissingCgpaPolicy::Reject) => {
            return Err(AdmissionError::MissingCgpa { required })
        }
    };

    if actual < required {
        return Err(AdmissionError::IneligibleCgpa { required, actual });
    }
    Ok(())
}

/// A project minimum must be a finite value on the CGPA scale.
pub(crate) fn check_min_cgpa(min_cgpa: Option<f32>) -> Result<(), AdmissionError> {
    match min_cgpa {
        Some(value) if !value.is_finite() || !(0.0..=MAX_CGPA).contains(&value) => {
            Err(AdmissionError::InvalidMinCgpa { value })
        }
        _ => Ok(()),
    }
}

pub(crate) fn accepted_count(applications: &[Application], project_id: &ProjectId) -> usize {
    applications
        .iter()
        .filter(|application| {
            &application.project_id == project_id
                && application.status == ApplicationStatus::Accepted
        })
        .count()
}

/// Whether `accepted` students fill the project's team.
pub(crate) fn is_full(project: &Project, accepted: usize) -> bool {
    accepted >= usize::from(project.max_students)
}

/// Capacity gate: one more student must still fit.
pub(crate) fn check_capacity(project: &Project, accepted: usize) -> Result<(), AdmissionError> {
    if is_full(project, accepted) {
        return Err(AdmissionError::CapacityExceeded {
            max_students: project.max_students,
        });
    }
    Ok(())
}

/// Applications are decided once: PENDING moves to ACCEPTED or REJECTED and stays there.
pub(crate) fn check_transition(
    current: ApplicationStatus,
    requested: ApplicationStatus,
) -> Result<Transition, AdmissionError> {
    if current == requested {
        return Ok(Transition::Unchanged);
    }
    if current.is_terminal() || !requested.is_terminal() {
        return Err(AdmissionError::InvalidTransition { current, requested });
    }
    Ok(Transition::Apply)
}
