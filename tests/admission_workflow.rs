use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use project_portal::portal::domain::ProjectPatch;
use project_portal::portal::{
    sample_catalog, AdmissionError, AdmissionPolicy, Application, ApplicationStatus, Collection,
    Decision, JsonFileBackend, MeetingDetails, MemoryBackend, PersistenceBackend, Portal, Project,
    ProjectListing, ProjectStatus, Registration, User, UserRole,
};

fn memory_portal() -> Portal<MemoryBackend> {
    Portal::new(Arc::new(MemoryBackend::new()), AdmissionPolicy::default())
}

fn register<B: PersistenceBackend>(
    portal: &Portal<B>,
    name: &str,
    role: UserRole,
    cgpa: Option<f32>,
) -> User {
    let email = format!("{}@university.edu", name.to_lowercase().replace(' ', "."));
    portal
        .identity
        .register(Registration {
            name: name.to_string(),
            email,
            role,
            cgpa,
        })
        .expect("registration succeeds")
}

fn listing(max_students: u32, min_cgpa: Option<f32>) -> ProjectListing {
    ProjectListing {
        title: "Distributed Cache".to_string(),
        description: "Build a sharded cache with consistent hashing".to_string(),
        requirements: "Networking, Rust".to_string(),
        deadline: Utc.with_ymd_and_hms(2030, 6, 30, 23, 59, 59).unwrap(),
        max_students,
        min_cgpa,
    }
}

#[test]
fn full_team_assigns_the_project_and_blocks_further_applicants() {
    let portal = memory_portal();
    let faculty = register(&portal, "Grace Hopper", UserRole::Faculty, None);
    let first = register(&portal, "Ana Lima", UserRole::Student, Some(8.2));
    let second = register(&portal, "Ben Okafor", UserRole::Student, Some(9.1));
    let late = register(&portal, "Chen Wei", UserRole::Student, Some(9.8));

    let project = portal
        .admissions
        .publish_project(&faculty.id, listing(2, Some(7.5)))
        .expect("project published");
    assert_eq!(project.status, ProjectStatus::Open);

    for student in [&first, &second] {
        let application = portal
            .admissions
            .submit_application(&project.id, &student.id, "keen")
            .expect("eligible student applies");
        portal
            .admissions
            .decide_application(&application.id, Decision::Accept)
            .expect("accept within capacity");
    }

    let project = portal.admissions.project(&project.id).expect("project exists");
    assert_eq!(project.status, ProjectStatus::Assigned);

    let err = portal
        .admissions
        .submit_application(&project.id, &late.id, "")
        .expect_err("assigned project refuses applicants");
    assert!(matches!(err, AdmissionError::ProjectNotOpen { .. }));
}

#[test]
fn capacity_holds_when_the_open_gate_is_switched_off() {
    let portal = Portal::new(
        Arc::new(MemoryBackend::new()),
        AdmissionPolicy {
            require_open_project: false,
            ..AdmissionPolicy::default()
        },
    );
    let faculty = register(&portal, "Grace Hopper", UserRole::Faculty, None);
    let first = register(&portal, "Ana Lima", UserRole::Student, Some(8.2));
    let second = register(&portal, "Ben Okafor", UserRole::Student, Some(9.1));

    let project = portal
        .admissions
        .publish_project(&faculty.id, listing(1, None))
        .expect("project published");

    let pending_first = portal
        .admissions
        .submit_application(&project.id, &first.id, "")
        .expect("first applies");
    let pending_second = portal
        .admissions
        .submit_application(&project.id, &second.id, "")
        .expect("second applies while a seat is free");

    portal
        .admissions
        .decide_application(&pending_first.id, Decision::Accept)
        .expect("first accepted");
    let err = portal
        .admissions
        .decide_application(&pending_second.id, Decision::Accept)
        .expect_err("team already full");
    assert_eq!(err.reason_code(), "capacity_exceeded");

    let accepted = portal
        .admissions
        .applications_for_project(&project.id)
        .expect("applications listed")
        .into_iter()
        .filter(|application| application.status == ApplicationStatus::Accepted)
        .count();
    assert_eq!(accepted, 1);
}

#[test]
fn team_size_is_clamped_on_publish_and_revise() {
    let portal = memory_portal();
    let faculty = register(&portal, "Grace Hopper", UserRole::Faculty, None);

    let project = portal
        .admissions
        .publish_project(&faculty.id, listing(12, None))
        .expect("project published");
    assert_eq!(project.max_students, 7);

    let revised = portal
        .admissions
        .revise_project(
            &project.id,
            ProjectPatch {
                max_students: Some(40),
                ..ProjectPatch::default()
            },
        )
        .expect("project revised");
    assert_eq!(revised.max_students, 7);
}

#[test]
fn record_ids_are_unique_across_rapid_creates() {
    let portal = memory_portal();
    let faculty = register(&portal, "Grace Hopper", UserRole::Faculty, None);

    let ids: HashSet<_> = (0..50)
        .map(|_| {
            portal
                .admissions
                .publish_project(&faculty.id, listing(3, None))
                .expect("project published")
                .id
        })
        .collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn json_store_survives_a_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (project_id, application_id) = {
        let portal = Portal::new(
            Arc::new(JsonFileBackend::new(dir.path())),
            AdmissionPolicy::default(),
        );
        portal
            .store
            .seed(sample_catalog(Utc::now()))
            .expect("seed written");
        let faculty = register(&portal, "Grace Hopper", UserRole::Faculty, None);
        let student = register(&portal, "Ana Lima", UserRole::Student, Some(9.0));
        let project = portal
            .admissions
            .publish_project(&faculty.id, listing(1, Some(8.0)))
            .expect("project published");
        let application = portal
            .admissions
            .submit_application(&project.id, &student.id, "")
            .expect("student applies");
        portal
            .admissions
            .decide_application(&application.id, Decision::Accept)
            .expect("accepted");
        (project.id, application.id)
    };

    let reopened = Portal::new(
        Arc::new(JsonFileBackend::new(dir.path())),
        AdmissionPolicy::default(),
    );
    let project = reopened
        .admissions
        .project(&project_id)
        .expect("project reloaded");
    assert_eq!(project.status, ProjectStatus::Assigned);

    let application = reopened
        .store
        .get_by_id::<Application>(&application_id)
        .expect("store readable")
        .expect("application reloaded");
    assert_eq!(application.status, ApplicationStatus::Accepted);

    let current = reopened
        .identity
        .current_user()
        .expect("session readable")
        .expect("last registration stays signed in");
    assert_eq!(current.name, "Ana Lima");

    let projects = reopened.store.get_all::<Project>().expect("projects load");
    assert_eq!(projects.len(), 4);
    assert!(reopened
        .store
        .seed(sample_catalog(Utc::now()))
        .expect("seed is a no-op")
        .is_empty());

    let on_disk = std::fs::read_to_string(
        dir.path()
            .join(format!("{}.json", Collection::Projects.storage_key())),
    )
    .expect("projects file exists");
    assert!(on_disk.contains("\"maxStudents\""));
}

#[test]
fn meetings_follow_accepted_applications() {
    let portal = memory_portal();
    let faculty = register(&portal, "Grace Hopper", UserRole::Faculty, None);
    let student = register(&portal, "Ana Lima", UserRole::Student, Some(8.0));
    let project = portal
        .admissions
        .publish_project(&faculty.id, listing(2, None))
        .expect("project published");
    let application = portal
        .admissions
        .submit_application(&project.id, &student.id, "")
        .expect("student applies");

    let details = MeetingDetails {
        scheduled_at: Utc::now() + Duration::days(2),
        title: "Kick-off".to_string(),
        description: "Plan the first sprint".to_string(),
        location: None,
        meeting_link: Some("https://meet.example.edu/kickoff".to_string()),
    };
    assert!(portal
        .meetings
        .schedule_for_application(&application.id, details.clone())
        .is_err());

    portal
        .admissions
        .decide_application(&application.id, Decision::Accept)
        .expect("accepted");
    let meeting = portal
        .meetings
        .schedule_for_application(&application.id, details)
        .expect("meeting scheduled");
    assert_eq!(meeting.faculty_id, faculty.id);
    assert_eq!(meeting.student_id, student.id);
    assert_eq!(
        portal
            .meetings
            .meetings_for_student(&student.id)
            .expect("meetings listed")
            .len(),
        1
    );
}
