use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Hard cap on the number of students a project can take.
pub const MAX_TEAM_SIZE: u8 = 7;

/// Highest CGPA on the university's ten point scale.
pub const MAX_CGPA: f32 = 10.0;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier wrapper for registered users.
    UserId
);
record_id!(
    /// Identifier wrapper for published projects.
    ProjectId
);
record_id!(
    /// Identifier wrapper for submitted applications.
    ApplicationId
);
record_id!(
    /// Identifier wrapper for scheduled meetings.
    MeetingId
);

/// Raised when a status or role label does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Faculty,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Faculty => "faculty",
        }
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "faculty" => Ok(UserRole::Faculty),
            _ => Err(UnknownVariant {
                kind: "role",
                value: value.to_string(),
            }),
        }
    }
}

/// Project lifecycle. Changes are direct overwrites; a closed project may be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Open,
    Assigned,
    Closed,
}

impl ProjectStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::Assigned => "assigned",
            ProjectStatus::Closed => "closed",
        }
    }

    pub const fn accepts_applications(self) -> bool {
        matches!(self, ProjectStatus::Open)
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(ProjectStatus::Open),
            "assigned" => Ok(ProjectStatus::Assigned),
            "closed" => Ok(ProjectStatus::Closed),
            _ => Err(UnknownVariant {
                kind: "project status",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" | "accept" => Ok(ApplicationStatus::Accepted),
            "rejected" | "reject" => Ok(ApplicationStatus::Rejected),
            _ => Err(UnknownVariant {
                kind: "application status",
                value: value.to_string(),
            }),
        }
    }
}

/// Meeting lifecycle. Terminal statuses are not enforced as immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MeetingStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(MeetingStatus::Scheduled),
            "completed" => Ok(MeetingStatus::Completed),
            "cancelled" | "canceled" => Ok(MeetingStatus::Cancelled),
            _ => Err(UnknownVariant {
                kind: "meeting status",
                value: value.to_string(),
            }),
        }
    }
}

/// Registered portal account. Only students carry a CGPA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cgpa: Option<f32>,
}

/// Faculty-published project. `faculty_name` is a snapshot taken at publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub faculty_id: UserId,
    pub faculty_name: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    #[serde(deserialize_with = "stored_team_size")]
    pub max_students: u8,
    #[serde(rename = "minCGPA", default, skip_serializing_if = "Option::is_none")]
    pub min_cgpa: Option<f32>,
}

/// A student's request to join a project, with name and CGPA snapshotted at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub project_id: ProjectId,
    pub student_id: UserId,
    pub student_name: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub note: String,
    pub cgpa: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: MeetingId,
    pub project_id: ProjectId,
    pub faculty_id: UserId,
    pub student_id: UserId,
    pub scheduled_at: DateTime<Utc>,
    pub status: MeetingStatus,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
}

/// User fields supplied at creation; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub cgpa: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub faculty_id: UserId,
    pub faculty_name: String,
    pub status: ProjectStatus,
    pub deadline: DateTime<Utc>,
    /// Requested team size; clamped when the record is built.
    pub max_students: u32,
    pub min_cgpa: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub project_id: ProjectId,
    pub student_id: UserId,
    pub student_name: String,
    pub status: ApplicationStatus,
    pub note: String,
    pub cgpa: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMeeting {
    pub project_id: ProjectId,
    pub faculty_id: UserId,
    pub student_id: UserId,
    pub scheduled_at: DateTime<Utc>,
    pub status: MeetingStatus,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
}

/// Partial user update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub cgpa: Option<Option<f32>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub faculty_name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub deadline: Option<DateTime<Utc>>,
    pub max_students: Option<u32>,
    pub min_cgpa: Option<Option<f32>>,
}

impl ProjectPatch {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub note: Option<String>,
}

impl ApplicationPatch {
    pub fn status(status: ApplicationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingPatch {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: Option<MeetingStatus>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Option<String>>,
    pub meeting_link: Option<Option<String>>,
}

impl MeetingPatch {
    pub fn status(status: MeetingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Clamp a requested team size into `1..=MAX_TEAM_SIZE`.
pub fn clamp_team_size(requested: u32) -> u8 {
    u8::try_from(requested.clamp(1, u32::from(MAX_TEAM_SIZE))).unwrap_or(MAX_TEAM_SIZE)
}

// Blobs written by other clients may carry any team size; clamp instead of failing the
// whole collection.
fn stored_team_size<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let requested = u64::deserialize(deserializer)?;
    Ok(clamp_team_size(u32::try_from(requested).unwrap_or(u32::MAX)))
}
