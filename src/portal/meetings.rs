//! Meeting scheduling between faculty and accepted students.
//!
//! Creation does not look for conflicts with other meetings, and status changes are plain
//! overwrites: a completed meeting can be set back to scheduled.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Meeting, MeetingId, MeetingPatch,
    MeetingStatus, NewMeeting, Project, ProjectId, UserId,
};
use super::persistence::PersistenceBackend;
use super::store::{EntityStore, StoreError};

/// Agenda fields for a meeting; participants come from the application.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDetails {
    pub scheduled_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
}

/// Error raised by the meeting scheduler.
#[derive(Debug, thiserror::Error)]
pub enum MeetingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("application {application_id} is {} and cannot have meetings yet", .status.label())]
    ApplicationNotAccepted {
        application_id: ApplicationId,
        status: ApplicationStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MeetingError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Meetings split by whether they still lie ahead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeetingAgenda {
    pub upcoming: Vec<Meeting>,
    pub past: Vec<Meeting>,
}

pub struct MeetingScheduler<B> {
    store: Arc<EntityStore<B>>,
}

impl<B> MeetingScheduler<B>
where
    B: PersistenceBackend,
{
    pub fn new(store: Arc<EntityStore<B>>) -> Self {
        Self { store }
    }

    /// Record a SCHEDULED meeting as given.
    pub fn schedule_meeting(
        &self,
        project_id: ProjectId,
        faculty_id: UserId,
        student_id: UserId,
        details: MeetingDetails,
    ) -> Result<Meeting, MeetingError> {
        let meeting: Meeting = self.store.create(NewMeeting {
            project_id,
            faculty_id,
            student_id,
            scheduled_at: details.scheduled_at,
            status: MeetingStatus::Scheduled,
            title: details.title,
            description: details.description,
            location: details.location,
            meeting_link: details.meeting_link,
        })?;

        info!(
            meeting_id = %meeting.id,
            project_id = %meeting.project_id,
            student_id = %meeting.student_id,
            scheduled_at = %meeting.scheduled_at,
            "meeting scheduled"
        );
        Ok(meeting)
    }

    /// Schedule a meeting for an accepted application with the project's faculty owner.
    pub fn schedule_for_application(
        &self,
        application_id: &ApplicationId,
        details: MeetingDetails,
    ) -> Result<Meeting, MeetingError> {
        let application = self
            .store
            .get_by_id::<Application>(application_id)?
            .ok_or_else(|| MeetingError::not_found("application", application_id))?;

        if application.status != ApplicationStatus::Accepted {
            return Err(MeetingError::ApplicationNotAccepted {
                application_id: application.id,
                status: application.status,
            });
        }

        let project = self
            .store
            .get_by_id::<Project>(&application.project_id)?
            .ok_or_else(|| MeetingError::not_found("project", &application.project_id))?;

        self.schedule_meeting(project.id, project.faculty_id, application.student_id, details)
    }

    pub fn set_meeting_status(
        &self,
        meeting_id: &MeetingId,
        status: MeetingStatus,
    ) -> Result<Meeting, MeetingError> {
        let meeting = self
            .store
            .update::<Meeting>(meeting_id, MeetingPatch::status(status))?
            .ok_or_else(|| MeetingError::not_found("meeting", meeting_id))?;

        info!(meeting_id = %meeting.id, status = status.label(), "meeting status changed");
        Ok(meeting)
    }

    pub fn meeting(&self, meeting_id: &MeetingId) -> Result<Meeting, MeetingError> {
        self.store
            .get_by_id::<Meeting>(meeting_id)?
            .ok_or_else(|| MeetingError::not_found("meeting", meeting_id))
    }

    pub fn meetings_for_project(&self, project_id: &ProjectId) -> Result<Vec<Meeting>, MeetingError> {
        Ok(self
            .store
            .find::<Meeting, _>(|meeting| &meeting.project_id == project_id)?)
    }

    pub fn meetings_for_faculty(&self, faculty_id: &UserId) -> Result<Vec<Meeting>, MeetingError> {
        Ok(self
            .store
            .find::<Meeting, _>(|meeting| &meeting.faculty_id == faculty_id)?)
    }

    pub fn meetings_for_student(&self, student_id: &UserId) -> Result<Vec<Meeting>, MeetingError> {
        Ok(self
            .store
            .find::<Meeting, _>(|meeting| &meeting.student_id == student_id)?)
    }
}

/// Upcoming means still SCHEDULED and not yet started; everything else is past. Upcoming
/// meetings come back soonest first.
pub fn partition_upcoming(meetings: Vec<Meeting>, now: DateTime<Utc>) -> MeetingAgenda {
    let (mut upcoming, past): (Vec<Meeting>, Vec<Meeting>) = meetings
        .into_iter()
        .partition(|meeting| meeting.status == MeetingStatus::Scheduled && meeting.scheduled_at > now);
    upcoming.sort_by_key(|meeting| meeting.scheduled_at);
    MeetingAgenda { upcoming, past }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::admission::{AdmissionPolicy, AdmissionService, Decision, ProjectListing};
    use crate::portal::domain::{NewUser, User, UserRole};
    use crate::portal::persistence::MemoryBackend;
    use chrono::{Duration, TimeZone};

    struct Fixture {
        admissions: AdmissionService<MemoryBackend>,
        scheduler: MeetingScheduler<MemoryBackend>,
        faculty: User,
        application: Application,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(EntityStore::new(Arc::new(MemoryBackend::new())));
        let admissions = AdmissionService::new(store.clone(), AdmissionPolicy::default());
        let scheduler = MeetingScheduler::new(store.clone());

        let faculty: User = store
            .create(NewUser {
                name: "Prof. Michael Chen".to_string(),
                email: "michael@university.edu".to_string(),
                role: UserRole::Faculty,
                cgpa: None,
            })
            .expect("faculty");
        let student: User = store
            .create(NewUser {
                name: "Alex Taylor".to_string(),
                email: "alex@university.edu".to_string(),
                role: UserRole::Student,
                cgpa: Some(8.5),
            })
            .expect("student");
        let project = admissions
            .publish_project(
                &faculty.id,
                ProjectListing {
                    title: "Smart Home Automation System".to_string(),
                    description: "IoT control of home appliances".to_string(),
                    requirements: "Embedded systems".to_string(),
                    deadline: Utc::now() + Duration::days(60),
                    max_students: 3,
                    min_cgpa: Some(8.0),
                },
            )
            .expect("project");
        let application = admissions
            .submit_application(&project.id, &student.id, "Built a home sensor mesh")
            .expect("application");

        Fixture {
            admissions,
            scheduler,
            faculty,
            application,
        }
    }

    fn details(scheduled_at: DateTime<Utc>) -> MeetingDetails {
        MeetingDetails {
            scheduled_at,
            title: "Kick-off".to_string(),
            description: "Scope and milestones".to_string(),
            location: Some("Lab 3".to_string()),
            meeting_link: None,
        }
    }

    #[test]
    fn pending_applications_cannot_have_meetings() {
        let fixture = fixture();

        match fixture
            .scheduler
            .schedule_for_application(&fixture.application.id, details(Utc::now()))
        {
            Err(MeetingError::ApplicationNotAccepted { status, .. }) => {
                assert_eq!(status, ApplicationStatus::Pending)
            }
            other => panic!("expected not accepted error, got {other:?}"),
        }
    }

    #[test]
    fn accepted_application_gets_a_meeting_with_its_faculty_owner() {
        let fixture = fixture();
        fixture
            .admissions
            .decide_application(&fixture.application.id, Decision::Accept)
            .expect("accepted");

        let when = Utc::now() + Duration::days(2);
        let meeting = fixture
            .scheduler
            .schedule_for_application(&fixture.application.id, details(when))
            .expect("scheduled");

        assert_eq!(meeting.status, MeetingStatus::Scheduled);
        assert_eq!(meeting.faculty_id, fixture.faculty.id);
        assert_eq!(meeting.student_id, fixture.application.student_id);
        assert_eq!(meeting.project_id, fixture.application.project_id);
        assert_eq!(
            fixture
                .scheduler
                .meetings_for_faculty(&fixture.faculty.id)
                .expect("listing"),
            vec![meeting.clone()]
        );
        assert_eq!(
            fixture
                .scheduler
                .meetings_for_student(&fixture.application.student_id)
                .expect("listing")
                .len(),
            1
        );
    }

    #[test]
    fn overlapping_meetings_are_not_rejected() {
        let fixture = fixture();
        let when = Utc::now() + Duration::hours(4);
        for _ in 0..2 {
            fixture
                .scheduler
                .schedule_meeting(
                    fixture.application.project_id.clone(),
                    fixture.faculty.id.clone(),
                    fixture.application.student_id.clone(),
                    details(when),
                )
                .expect("scheduled");
        }

        assert_eq!(
            fixture
                .scheduler
                .meetings_for_project(&fixture.application.project_id)
                .expect("listing")
                .len(),
            2
        );
    }

    #[test]
    fn meeting_status_is_a_plain_overwrite() {
        let fixture = fixture();
        let meeting = fixture
            .scheduler
            .schedule_meeting(
                fixture.application.project_id.clone(),
                fixture.faculty.id.clone(),
                fixture.application.student_id.clone(),
                details(Utc::now()),
            )
            .expect("scheduled");

        let completed = fixture
            .scheduler
            .set_meeting_status(&meeting.id, MeetingStatus::Completed)
            .expect("completed");
        assert_eq!(completed.status, MeetingStatus::Completed);

        let reverted = fixture
            .scheduler
            .set_meeting_status(&meeting.id, MeetingStatus::Scheduled)
            .expect("terminal status is not enforced");
        assert_eq!(reverted.status, MeetingStatus::Scheduled);

        assert!(matches!(
            fixture
                .scheduler
                .set_meeting_status(&MeetingId::from("meeting-missing"), MeetingStatus::Cancelled),
            Err(MeetingError::NotFound { entity: "meeting", .. })
        ));
    }

    #[test]
    fn agenda_separates_upcoming_from_past() {
        let now = Utc
            .with_ymd_and_hms(2025, 3, 10, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let meeting = |id: &str, offset_hours: i64, status: MeetingStatus| Meeting {
            id: MeetingId::from(id),
            project_id: ProjectId::from("1"),
            faculty_id: UserId::from("faculty1"),
            student_id: UserId::from("student1"),
            scheduled_at: now + Duration::hours(offset_hours),
            status,
            title: "Sync".to_string(),
            description: String::new(),
            location: None,
            meeting_link: Some("https://meet.example.edu/sync".to_string()),
        };

        let agenda = partition_upcoming(
            vec![
                meeting("later", 48, MeetingStatus::Scheduled),
                meeting("overdue", -2, MeetingStatus::Scheduled),
                meeting("soon", 1, MeetingStatus::Scheduled),
                meeting("cancelled", 5, MeetingStatus::Cancelled),
            ],
            now,
        );

        let upcoming: Vec<&str> = agenda.upcoming.iter().map(|m| m.id.as_str()).collect();
        let past: Vec<&str> = agenda.past.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(upcoming, vec!["soon", "later"]);
        assert_eq!(past, vec!["overdue", "cancelled"]);
    }
}
