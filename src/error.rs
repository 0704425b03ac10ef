use crate::config::ConfigError;
use crate::portal::{AdmissionError, IdentityError, MeetingError, StoreError};
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Store(StoreError),
    Admission(AdmissionError),
    Meeting(MeetingError),
    Identity(IdentityError),
    /// The command cannot run in the current session (e.g. nobody is signed in).
    Session(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Admission(err) => {
                write!(f, "admission refused ({}): {}", err.reason_code(), err)
            }
            AppError::Meeting(err) => write!(f, "meeting error: {}", err),
            AppError::Identity(err) => write!(f, "identity error: {}", err),
            AppError::Session(message) => write!(f, "session error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Admission(err) => Some(err),
            AppError::Meeting(err) => Some(err),
            AppError::Identity(err) => Some(err),
            AppError::Session(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AdmissionError> for AppError {
    fn from(value: AdmissionError) -> Self {
        Self::Admission(value)
    }
}

impl From<MeetingError> for AppError {
    fn from(value: MeetingError) -> Self {
        Self::Meeting(value)
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}
