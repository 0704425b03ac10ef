use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::portal::{AdmissionPolicy, MissingCgpaPolicy};

/// Distinguishes runtime behavior for different stages of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub admission: AdmissionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("PORTAL_DATA_DIR").unwrap_or_else(|_| ".portal-data".to_string());

        let missing_cgpa = match env::var("PORTAL_MISSING_CGPA") {
            Ok(raw) => raw
                .parse::<MissingCgpaPolicy>()
                .map_err(|_| ConfigError::InvalidMissingCgpaPolicy { value: raw })?,
            Err(_) => MissingCgpaPolicy::default(),
        };
        let reject_duplicate_applications = bool_var("PORTAL_REJECT_DUPLICATES", true)?;
        let require_open_project = bool_var("PORTAL_REQUIRE_OPEN_PROJECT", true)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig {
                data_dir: PathBuf::from(data_dir),
            },
            admission: AdmissionConfig {
                missing_cgpa,
                reject_duplicate_applications,
                require_open_project,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean { name, value: raw }),
    }
}

/// Where the JSON collections live on disk.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Admission gate switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionConfig {
    pub missing_cgpa: MissingCgpaPolicy,
    pub reject_duplicate_applications: bool,
    pub require_open_project: bool,
}

impl From<&AdmissionConfig> for AdmissionPolicy {
    fn from(config: &AdmissionConfig) -> Self {
        AdmissionPolicy {
            missing_cgpa: config.missing_cgpa,
            reject_duplicate_applications: config.reject_duplicate_applications,
            require_open_project: config.require_open_project,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidMissingCgpaPolicy { value: String },
    InvalidBoolean { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMissingCgpaPolicy { value } => write!(
                f,
                "PORTAL_MISSING_CGPA must be one of permit, zero, reject (got '{}')",
                value
            ),
            ConfigError::InvalidBoolean { name, value } => {
                write!(f, "{} must be true or false (got '{}')", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
