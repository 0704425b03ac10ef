//! Project portal core: records, persistence, admission rules, meetings, and identity.

pub mod admission;
pub mod domain;
pub mod identity;
pub mod meetings;
pub mod persistence;
pub mod seed;
pub mod store;

use std::sync::Arc;

pub use admission::{
    AdmissionError, AdmissionPolicy, AdmissionService, Decision, MissingCgpaPolicy,
    ProjectListing,
};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, Meeting, MeetingId, MeetingStatus, Project,
    ProjectId, ProjectStatus, User, UserId, UserRole, MAX_TEAM_SIZE,
};
pub use identity::{IdentityError, IdentityService, Registration};
pub use meetings::{partition_upcoming, MeetingAgenda, MeetingDetails, MeetingError, MeetingScheduler};
pub use persistence::{
    Collection, JsonFileBackend, MemoryBackend, PersistenceBackend, PersistenceError,
};
pub use seed::{sample_catalog, SeedCatalog};
pub use store::{EntityStore, Record, StoreError};

/// The portal services wired over one shared store.
pub struct Portal<B> {
    pub store: Arc<EntityStore<B>>,
    pub admissions: AdmissionService<B>,
    pub meetings: MeetingScheduler<B>,
    pub identity: IdentityService<B>,
}

impl<B> Portal<B>
where
    B: PersistenceBackend,
{
    pub fn new(backend: Arc<B>, policy: AdmissionPolicy) -> Self {
        let store = Arc::new(EntityStore::new(backend));
        Self {
            admissions: AdmissionService::new(store.clone(), policy),
            meetings: MeetingScheduler::new(store.clone()),
            identity: IdentityService::new(store.clone()),
            store,
        }
    }
}
