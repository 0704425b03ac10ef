use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::portal::domain::UnknownVariant;

/// How the CGPA gate treats a student with no CGPA on record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCgpaPolicy {
    /// Skip the gate entirely.
    #[default]
    Permit,
    /// Compare as if the student had a CGPA of zero.
    TreatAsZero,
    /// Refuse any project that sets a minimum.
    Reject,
}

impl MissingCgpaPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            MissingCgpaPolicy::Permit => "permit",
            MissingCgpaPolicy::TreatAsZero => "zero",
            MissingCgpaPolicy::Reject => "reject",
        }
    }
}

impl FromStr for MissingCgpaPolicy {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permit" | "allow" => Ok(MissingCgpaPolicy::Permit),
            "zero" | "treat_as_zero" => Ok(MissingCgpaPolicy::TreatAsZero),
            "reject" | "deny" => Ok(MissingCgpaPolicy::Reject),
            _ => Err(UnknownVariant {
                kind: "missing CGPA policy",
                value: value.to_string(),
            }),
        }
    }
}

/// Switches for the admission gates that sit outside the three core invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    pub missing_cgpa: MissingCgpaPolicy,
    pub reject_duplicate_applications: bool,
    pub require_open_project: bool,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            missing_cgpa: MissingCgpaPolicy::default(),
            reject_duplicate_applications: true,
            require_open_project: true,
        }
    }
}
