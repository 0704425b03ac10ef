use crate::cli::{print_application, print_meeting, print_project};
use chrono::{Duration, Utc};
use project_portal::error::AppError;
use project_portal::portal::{
    partition_upcoming, sample_catalog, AdmissionPolicy, Decision, MeetingDetails, MemoryBackend,
    Portal, ProjectListing, Registration, UserRole,
};
use std::sync::Arc;

/// Walk through one admission round against an in-memory store. Nothing touches the data
/// directory.
pub(crate) fn run_demo(policy: AdmissionPolicy) -> Result<(), AppError> {
    let now = Utc::now();
    let portal = Portal::new(Arc::new(MemoryBackend::new()), policy);
    portal.store.seed(sample_catalog(now))?;

    println!("== Seeded catalog ==");
    for project in portal.admissions.open_projects()? {
        print_project(&project);
    }

    let faculty = portal.identity.register(Registration {
        name: "Dr. Ada Demo".to_string(),
        email: "ada.demo@university.edu".to_string(),
        role: UserRole::Faculty,
        cgpa: None,
    })?;
    let strong = portal.identity.register(Registration {
        name: "Priya Student".to_string(),
        email: "priya.demo@university.edu".to_string(),
        role: UserRole::Student,
        cgpa: Some(8.0),
    })?;
    let weak = portal.identity.register(Registration {
        name: "Sam Student".to_string(),
        email: "sam.demo@university.edu".to_string(),
        role: UserRole::Student,
        cgpa: Some(6.0),
    })?;

    println!();
    println!("== {} publishes a single-seat project ==", faculty.name);
    let project = portal.admissions.publish_project(
        &faculty.id,
        ProjectListing {
            title: "Compiler Testing Harness".to_string(),
            description: "Differential fuzzing for a teaching compiler".to_string(),
            requirements: "Rust, parsing basics".to_string(),
            deadline: now + Duration::days(30),
            max_students: 1,
            min_cgpa: Some(7.5),
        },
    )?;
    print_project(&project);

    println!();
    println!("== Applications ==");
    let application = portal.admissions.submit_application(
        &project.id,
        &strong.id,
        "I maintain a small interpreter in my spare time.",
    )?;
    print_application(&application);

    match portal
        .admissions
        .submit_application(&project.id, &weak.id, "")
    {
        Ok(unexpected) => print_application(&unexpected),
        Err(err) => println!("- {} refused ({}): {}", weak.name, err.reason_code(), err),
    }

    println!();
    println!("== Decision ==");
    let accepted = portal
        .admissions
        .decide_application(&application.id, Decision::Accept)?;
    print_application(&accepted);
    let project = portal.admissions.project(&project.id)?;
    print_project(&project);

    println!();
    println!("== Kick-off meeting ==");
    let meeting = portal.meetings.schedule_for_application(
        &accepted.id,
        MeetingDetails {
            scheduled_at: now + Duration::days(3),
            title: "Kick-off".to_string(),
            description: "Scope the first milestone".to_string(),
            location: Some("Lab 4B".to_string()),
            meeting_link: None,
        },
    )?;
    print_meeting(&meeting);

    let agenda = partition_upcoming(portal.meetings.meetings_for_student(&strong.id)?, now);
    println!(
        "{} has {} upcoming and {} past meeting(s)",
        strong.name,
        agenda.upcoming.len(),
        agenda.past.len()
    );

    Ok(())
}
