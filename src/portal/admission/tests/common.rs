use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::portal::admission::{AdmissionPolicy, AdmissionService, ProjectListing};
use crate::portal::domain::{
    Application, ApplicationId, ApplicationStatus, NewUser, Project, ProjectId, ProjectStatus,
    User, UserId, UserRole,
};
use crate::portal::persistence::{Collection, MemoryBackend, PersistenceBackend, PersistenceError};
use crate::portal::store::EntityStore;

pub(super) fn build_service(
    policy: AdmissionPolicy,
) -> (
    AdmissionService<MemoryBackend>,
    Arc<EntityStore<MemoryBackend>>,
) {
    let store = Arc::new(EntityStore::new(Arc::new(MemoryBackend::new())));
    let service = AdmissionService::new(store.clone(), policy);
    (service, store)
}

pub(super) fn faculty(store: &EntityStore<MemoryBackend>) -> User {
    store
        .create(NewUser {
            name: "Dr. Sarah Johnson".to_string(),
            email: "sarah@university.edu".to_string(),
            role: UserRole::Faculty,
            cgpa: None,
        })
        .expect("faculty created")
}

pub(super) fn student(store: &EntityStore<MemoryBackend>, name: &str, cgpa: Option<f32>) -> User {
    store
        .create(NewUser {
            name: name.to_string(),
            email: format!("{}@university.edu", name.to_ascii_lowercase().replace(' ', ".")),
            role: UserRole::Student,
            cgpa,
        })
        .expect("student created")
}

pub(super) fn listing(max_students: u32, min_cgpa: Option<f32>) -> ProjectListing {
    ProjectListing {
        title: "Compiler optimisation pipeline".to_string(),
        description: "Build an SSA-based optimiser for a teaching language".to_string(),
        requirements: "Rust, data-flow analysis".to_string(),
        deadline: Utc::now() + Duration::days(30),
        max_students,
        min_cgpa,
    }
}

pub(super) fn published(
    service: &AdmissionService<MemoryBackend>,
    faculty: &User,
    max_students: u32,
    min_cgpa: Option<f32>,
) -> Project {
    service
        .publish_project(&faculty.id, listing(max_students, min_cgpa))
        .expect("project published")
}

/// Project record built without a store, for the pure rule checks.
pub(super) fn project_fixture(max_students: u8, min_cgpa: Option<f32>) -> Project {
    let created = Utc
        .with_ymd_and_hms(2025, 2, 3, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Project {
        id: ProjectId::from("project-fixture"),
        title: "Robotics lab scheduler".to_string(),
        description: "Allocate lab benches across teams".to_string(),
        requirements: "Constraint solving".to_string(),
        faculty_id: UserId::from("faculty1"),
        faculty_name: "Dr. Sarah Johnson".to_string(),
        status: ProjectStatus::Open,
        created_at: created,
        deadline: created + Duration::days(21),
        max_students,
        min_cgpa,
    }
}

pub(super) fn application_fixture(
    id: &str,
    project_id: &ProjectId,
    status: ApplicationStatus,
) -> Application {
    Application {
        id: ApplicationId::from(id),
        project_id: project_id.clone(),
        student_id: UserId::from(format!("student-{id}").as_str()),
        student_name: "Jordan Lee".to_string(),
        status,
        created_at: Utc::now(),
        note: String::new(),
        cgpa: 8.0,
    }
}

pub(super) struct UnavailableBackend;

impl PersistenceBackend for UnavailableBackend {
    fn load(&self, _collection: Collection) -> Result<Option<Vec<Value>>, PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }

    fn store(&self, _collection: Collection, _records: Vec<Value>) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }

    fn load_session(&self) -> Result<Option<Value>, PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }

    fn store_session(&self, _session: Option<Value>) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("database offline".to_string()))
    }
}
