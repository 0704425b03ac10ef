//! Generic get-all / get-by-id / create / update over the portal collections.
//!
//! Every write loads the full collection, mutates it, and stores it back. The write lock makes
//! that read-modify-write atomic for callers sharing one store inside a process.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::domain::{
    clamp_team_size, Application, ApplicationId, ApplicationPatch, Meeting, MeetingId,
    MeetingPatch, NewApplication, NewMeeting, NewProject, NewUser, Project, ProjectId,
    ProjectPatch, User, UserId, UserPatch,
};
use super::persistence::{Collection, PersistenceBackend, PersistenceError};
use super::seed::SeedCatalog;

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_record_id(prefix: &str, now: DateTime<Utc>) -> String {
    let sequence = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence:04}", now.timestamp_millis())
}

/// Binds a record type to its collection, identity, creation draft, and partial update.
pub trait Record: Serialize + DeserializeOwned + Clone {
    type Id: Clone + PartialEq + fmt::Display;
    /// Fields supplied at creation, excluding `id` and `created_at`.
    type Draft;
    type Patch;

    const COLLECTION: Collection;
    const ID_PREFIX: &'static str;

    fn id(&self) -> &Self::Id;
    fn from_draft(id: String, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;
    /// Shallow field replacement of every field present in `patch`.
    fn apply(&mut self, patch: Self::Patch);
}

impl Record for User {
    type Id = UserId;
    type Draft = NewUser;
    type Patch = UserPatch;

    const COLLECTION: Collection = Collection::Users;
    const ID_PREFIX: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewUser) -> Self {
        User {
            id: UserId(id),
            name: draft.name,
            email: draft.email,
            role: draft.role,
            created_at,
            cgpa: draft.cgpa,
        }
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(cgpa) = patch.cgpa {
            self.cgpa = cgpa;
        }
    }
}

impl Record for Project {
    type Id = ProjectId;
    type Draft = NewProject;
    type Patch = ProjectPatch;

    const COLLECTION: Collection = Collection::Projects;
    const ID_PREFIX: &'static str = "project";

    fn id(&self) -> &ProjectId {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewProject) -> Self {
        Project {
            id: ProjectId(id),
            title: draft.title,
            description: draft.description,
            requirements: draft.requirements,
            faculty_id: draft.faculty_id,
            faculty_name: draft.faculty_name,
            status: draft.status,
            created_at,
            deadline: draft.deadline,
            max_students: clamp_team_size(draft.max_students),
            min_cgpa: draft.min_cgpa,
        }
    }

    fn apply(&mut self, patch: ProjectPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(requirements) = patch.requirements {
            self.requirements = requirements;
        }
        if let Some(faculty_name) = patch.faculty_name {
            self.faculty_name = faculty_name;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(max_students) = patch.max_students {
            self.max_students = clamp_team_size(max_students);
        }
        if let Some(min_cgpa) = patch.min_cgpa {
            self.min_cgpa = min_cgpa;
        }
    }
}

impl Record for Application {
    type Id = ApplicationId;
    type Draft = NewApplication;
    type Patch = ApplicationPatch;

    const COLLECTION: Collection = Collection::Applications;
    const ID_PREFIX: &'static str = "application";

    fn id(&self) -> &ApplicationId {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewApplication) -> Self {
        Application {
            id: ApplicationId(id),
            project_id: draft.project_id,
            student_id: draft.student_id,
            student_name: draft.student_name,
            status: draft.status,
            created_at,
            note: draft.note,
            cgpa: draft.cgpa,
        }
    }

    fn apply(&mut self, patch: ApplicationPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
    }
}

impl Record for Meeting {
    type Id = MeetingId;
    type Draft = NewMeeting;
    type Patch = MeetingPatch;

    const COLLECTION: Collection = Collection::Meetings;
    const ID_PREFIX: &'static str = "meeting";

    fn id(&self) -> &MeetingId {
        &self.id
    }

    // Meetings carry no creation timestamp of their own.
    fn from_draft(id: String, _created_at: DateTime<Utc>, draft: NewMeeting) -> Self {
        Meeting {
            id: MeetingId(id),
            project_id: draft.project_id,
            faculty_id: draft.faculty_id,
            student_id: draft.student_id,
            scheduled_at: draft.scheduled_at,
            status: draft.status,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            meeting_link: draft.meeting_link,
        }
    }

    fn apply(&mut self, patch: MeetingPatch) {
        if let Some(scheduled_at) = patch.scheduled_at {
            self.scheduled_at = scheduled_at;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(meeting_link) = patch.meeting_link {
            self.meeting_link = meeting_link;
        }
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("record in {collection} could not be decoded: {source}")]
    Decode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("record for {collection} could not be encoded: {source}")]
    Encode {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("store write lock poisoned")]
    Poisoned,
}

/// Entity store over an injected persistence backend.
pub struct EntityStore<B> {
    backend: Arc<B>,
    write_lock: Mutex<()>,
}

impl<B> EntityStore<B>
where
    B: PersistenceBackend,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// All records of a collection in stored order; an unwritten collection is empty.
    pub fn get_all<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let collection = T::COLLECTION;
        let Some(values) = self.backend.load(collection)? else {
            return Ok(Vec::new());
        };

        values
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|source| StoreError::Decode {
                    collection: collection.storage_key(),
                    source,
                })
            })
            .collect()
    }

    pub fn get_by_id<T: Record>(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        Ok(self
            .get_all::<T>()?
            .into_iter()
            .find(|record| record.id() == id))
    }

    pub fn find<T, F>(&self, predicate: F) -> Result<Vec<T>, StoreError>
    where
        T: Record,
        F: Fn(&T) -> bool,
    {
        Ok(self
            .get_all::<T>()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    /// Assign a fresh id and timestamp, append, and persist the whole collection.
    pub fn create<T: Record>(&self, draft: T::Draft) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut records = self.get_all::<T>()?;
        let now = Utc::now();
        let record = T::from_draft(next_record_id(T::ID_PREFIX, now), now, draft);
        records.push(record.clone());
        self.persist(&records)?;

        debug!(
            collection = T::COLLECTION.storage_key(),
            id = %record.id(),
            "record created"
        );
        Ok(record)
    }

    /// Merge `patch` into the record with `id`; `None` when no such record exists.
    pub fn update<T: Record>(&self, id: &T::Id, patch: T::Patch) -> Result<Option<T>, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut records = self.get_all::<T>()?;
        let Some(record) = records.iter_mut().find(|record| record.id() == id) else {
            return Ok(None);
        };
        record.apply(patch);
        let updated = record.clone();
        self.persist(&records)?;

        debug!(
            collection = T::COLLECTION.storage_key(),
            id = %updated.id(),
            "record updated"
        );
        Ok(Some(updated))
    }

    /// Write each catalog collection that the backend has never stored.
    pub fn seed(&self, catalog: SeedCatalog) -> Result<Vec<Collection>, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let SeedCatalog {
            users,
            projects,
            applications,
            meetings,
        } = catalog;

        let mut seeded = Vec::new();
        if self.seed_collection(&users)? {
            seeded.push(Collection::Users);
        }
        if self.seed_collection(&projects)? {
            seeded.push(Collection::Projects);
        }
        if self.seed_collection(&applications)? {
            seeded.push(Collection::Applications);
        }
        if self.seed_collection(&meetings)? {
            seeded.push(Collection::Meetings);
        }
        Ok(seeded)
    }

    fn seed_collection<T: Record>(&self, records: &[T]) -> Result<bool, StoreError> {
        if self.backend.load(T::COLLECTION)?.is_some() {
            return Ok(false);
        }
        self.persist(records)?;
        Ok(true)
    }

    fn persist<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let collection = T::COLLECTION;
        let values = records
            .iter()
            .map(|record| {
                serde_json::to_value(record).map_err(|source| StoreError::Encode {
                    collection: collection.storage_key(),
                    source,
                })
            })
            .collect::<Result<Vec<Value>, _>>()?;
        self.backend.store(collection, values)?;
        Ok(())
    }
}
