use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::error::AdmissionError;
use super::policy::AdmissionPolicy;
use super::rules::{self, Transition};
use crate::portal::domain::{
    Application, ApplicationId, ApplicationPatch, ApplicationStatus, NewApplication, NewProject,
    Project, ProjectId, ProjectPatch, ProjectStatus, User, UserId, UserRole,
};
use crate::portal::persistence::PersistenceBackend;
use crate::portal::store::{EntityStore, StoreError};

/// Faculty decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            Decision::Accept => ApplicationStatus::Accepted,
            Decision::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Form fields a faculty member fills in when publishing a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectListing {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub deadline: DateTime<Utc>,
    pub max_students: u32,
    pub min_cgpa: Option<f32>,
}

/// Service applying the admission rules over the entity store.
pub struct AdmissionService<B> {
    store: Arc<EntityStore<B>>,
    policy: AdmissionPolicy,
    admission_lock: Mutex<()>,
}

impl<B> AdmissionService<B>
where
    B: PersistenceBackend,
{
    pub fn new(store: Arc<EntityStore<B>>, policy: AdmissionPolicy) -> Self {
        Self {
            store,
            policy,
            admission_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Publish a new OPEN project owned by `faculty_id`, snapshotting the faculty name.
    pub fn publish_project(
        &self,
        faculty_id: &UserId,
        listing: ProjectListing,
    ) -> Result<Project, AdmissionError> {
        let faculty = self.user(faculty_id)?;
        if faculty.role != UserRole::Faculty {
            return Err(AdmissionError::NotFaculty(faculty.id));
        }
        rules::check_min_cgpa(listing.min_cgpa)?;

        let project: Project = self.store.create(NewProject {
            title: listing.title,
            description: listing.description,
            requirements: listing.requirements,
            faculty_id: faculty.id,
            faculty_name: faculty.name,
            status: ProjectStatus::Open,
            deadline: listing.deadline,
            max_students: listing.max_students,
            min_cgpa: listing.min_cgpa,
        })?;

        info!(
            project_id = %project.id,
            faculty_id = %project.faculty_id,
            max_students = project.max_students,
            "project published"
        );
        Ok(project)
    }

    /// Edit project fields. The team-size cap and the minimum CGPA range still apply.
    pub fn revise_project(
        &self,
        project_id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<Project, AdmissionError> {
        if let Some(min_cgpa) = patch.min_cgpa {
            rules::check_min_cgpa(min_cgpa)?;
        }
        self.store
            .update::<Project>(project_id, patch)?
            .ok_or_else(|| AdmissionError::not_found("project", project_id))
    }

    /// Overwrite a project's status. Any status may follow any other, so CLOSED projects can
    /// be reopened.
    pub fn set_project_status(
        &self,
        project_id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<Project, AdmissionError> {
        let _guard = self.lock()?;

        let previous = self.project(project_id)?.status;
        let project = self.revise_project(project_id, ProjectPatch::status(status))?;

        info!(
            project_id = %project.id,
            from = previous.label(),
            to = status.label(),
            "project status changed"
        );
        Ok(project)
    }

    /// Run the admission gates and, when they pass, record a PENDING application with the
    /// student's name and CGPA snapshotted.
    pub fn submit_application(
        &self,
        project_id: &ProjectId,
        student_id: &UserId,
        note: impl Into<String>,
    ) -> Result<Application, AdmissionError> {
        let _guard = self.lock()?;

        let project = self.project(project_id)?;
        let student = self.user(student_id)?;
        if student.role != UserRole::Student {
            return Err(AdmissionError::NotAStudent(student.id));
        }

        if self.policy.require_open_project && !project.status.accepts_applications() {
            debug!(project_id = %project.id, status = project.status.label(), "project closed to applications");
            return Err(AdmissionError::ProjectNotOpen {
                project_id: project.id,
                status: project.status,
            });
        }

        let applications = self.store.find::<Application, _>(|application| {
            application.project_id == project.id
        })?;

        if self.policy.reject_duplicate_applications
            && applications
                .iter()
                .any(|application| application.student_id == student.id)
        {
            debug!(project_id = %project.id, student_id = %student.id, "duplicate application");
            return Err(AdmissionError::DuplicateApplication {
                project_id: project.id,
                student_id: student.id,
            });
        }

        if let Err(err) = rules::check_cgpa(&project, student.cgpa, self.policy.missing_cgpa) {
            debug!(project_id = %project.id, student_id = %student.id, %err, "CGPA gate refused");
            return Err(err);
        }

        let accepted = rules::accepted_count(&applications, &project.id);
        if let Err(err) = rules::check_capacity(&project, accepted) {
            debug!(project_id = %project.id, accepted, %err, "capacity gate refused");
            return Err(err);
        }

        let application: Application = self.store.create(NewApplication {
            project_id: project.id,
            student_id: student.id,
            student_name: student.name,
            status: ApplicationStatus::Pending,
            note: note.into(),
            cgpa: student.cgpa.unwrap_or(0.0),
        })?;

        info!(
            application_id = %application.id,
            project_id = %application.project_id,
            student_id = %application.student_id,
            "application submitted"
        );
        Ok(application)
    }

    /// Accept or reject a pending application. Filling the team moves the project to ASSIGNED;
    /// nothing ever moves it back.
    pub fn decide_application(
        &self,
        application_id: &ApplicationId,
        decision: Decision,
    ) -> Result<Application, AdmissionError> {
        let _guard = self.lock()?;

        let application = self
            .store
            .get_by_id::<Application>(application_id)?
            .ok_or_else(|| AdmissionError::not_found("application", application_id))?;
        let project = self.project(&application.project_id)?;

        let requested = decision.status();
        if rules::check_transition(application.status, requested)? == Transition::Unchanged {
            return Ok(application);
        }

        if decision == Decision::Accept {
            let accepted = self.accepted_for(&project.id)?;
            rules::check_capacity(&project, accepted)?;
        }

        let decided = self
            .store
            .update::<Application>(application_id, ApplicationPatch::status(requested))?
            .ok_or_else(|| AdmissionError::not_found("application", application_id))?;

        info!(
            application_id = %decided.id,
            project_id = %project.id,
            status = requested.label(),
            "application decided"
        );

        if decision == Decision::Accept {
            let accepted = self.accepted_for(&project.id)?;
            if rules::is_full(&project, accepted) && project.status != ProjectStatus::Assigned {
                self.revise_project(&project.id, ProjectPatch::status(ProjectStatus::Assigned))?;
                info!(
                    project_id = %project.id,
                    accepted,
                    max_students = project.max_students,
                    "team full, project assigned"
                );
            }
        }

        Ok(decided)
    }

    pub fn project(&self, project_id: &ProjectId) -> Result<Project, AdmissionError> {
        self.store
            .get_by_id::<Project>(project_id)?
            .ok_or_else(|| AdmissionError::not_found("project", project_id))
    }

    pub fn open_projects(&self) -> Result<Vec<Project>, AdmissionError> {
        Ok(self
            .store
            .find::<Project, _>(|project| project.status.accepts_applications())?)
    }

    pub fn projects_for_faculty(&self, faculty_id: &UserId) -> Result<Vec<Project>, AdmissionError> {
        Ok(self
            .store
            .find::<Project, _>(|project| &project.faculty_id == faculty_id)?)
    }

    pub fn applications_for_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Application>, AdmissionError> {
        Ok(self
            .store
            .find::<Application, _>(|application| &application.project_id == project_id)?)
    }

    pub fn applications_for_student(
        &self,
        student_id: &UserId,
    ) -> Result<Vec<Application>, AdmissionError> {
        Ok(self
            .store
            .find::<Application, _>(|application| &application.student_id == student_id)?)
    }

    fn user(&self, user_id: &UserId) -> Result<User, AdmissionError> {
        self.store
            .get_by_id::<User>(user_id)?
            .ok_or_else(|| AdmissionError::not_found("user", user_id))
    }

    fn accepted_for(&self, project_id: &ProjectId) -> Result<usize, AdmissionError> {
        let applications = self.applications_for_project(project_id)?;
        Ok(rules::accepted_count(&applications, project_id))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, AdmissionError> {
        self.admission_lock
            .lock()
            .map_err(|_| AdmissionError::Store(StoreError::Poisoned))
    }
}
