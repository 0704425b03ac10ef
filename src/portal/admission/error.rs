use crate::portal::domain::{ApplicationStatus, ProjectId, ProjectStatus, UserId, MAX_CGPA};
use crate::portal::store::StoreError;

/// Reasons an admission operation had no effect.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("CGPA {actual:.2} is below the required {required:.2}")]
    IneligibleCgpa { required: f32, actual: f32 },
    #[error("project requires a CGPA of {required:.2} but none is on record")]
    MissingCgpa { required: f32 },
    #[error("minimum CGPA must be between 0 and {max}, got {value}", max = MAX_CGPA)]
    InvalidMinCgpa { value: f32 },
    #[error("project already has {max_students} accepted student(s)")]
    CapacityExceeded { max_students: u8 },
    #[error("student {student_id} already applied to project {project_id}")]
    DuplicateApplication {
        project_id: ProjectId,
        student_id: UserId,
    },
    #[error("project {project_id} is {} and not accepting applications", .status.label())]
    ProjectNotOpen {
        project_id: ProjectId,
        status: ProjectStatus,
    },
    #[error("user {0} is not a student")]
    NotAStudent(UserId),
    #[error("user {0} is not a faculty member")]
    NotFaculty(UserId),
    #[error("application cannot move from {} to {}", .current.label(), .requested.label())]
    InvalidTransition {
        current: ApplicationStatus,
        requested: ApplicationStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdmissionError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable snake_case code so callers can branch on the cause without matching fields.
    pub const fn reason_code(&self) -> &'static str {
        match self {
            AdmissionError::NotFound { .. } => "not_found",
            AdmissionError::IneligibleCgpa { .. } => "ineligible_cgpa",
            AdmissionError::MissingCgpa { .. } => "missing_cgpa",
            AdmissionError::InvalidMinCgpa { .. } => "invalid_min_cgpa",
            AdmissionError::CapacityExceeded { .. } => "capacity_exceeded",
            AdmissionError::DuplicateApplication { .. } => "duplicate_application",
            AdmissionError::ProjectNotOpen { .. } => "project_not_open",
            AdmissionError::NotAStudent(_) => "not_a_student",
            AdmissionError::NotFaculty(_) => "not_faculty",
            AdmissionError::InvalidTransition { .. } => "invalid_transition",
            AdmissionError::Store(_) => "store_failure",
        }
    }
}
