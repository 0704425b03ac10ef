use super::common::*;
use crate::portal::admission::rules::{
    accepted_count, check_capacity, check_cgpa, check_min_cgpa, check_transition, is_full,
    Transition,
};
use crate::portal::admission::{AdmissionError, MissingCgpaPolicy};
use crate::portal::domain::{ApplicationStatus, ProjectId};

#[test]
fn cgpa_gate_refuses_students_below_minimum() {
    let project = project_fixture(3, Some(7.5));

    match check_cgpa(&project, Some(6.0), MissingCgpaPolicy::Permit) {
        Err(AdmissionError::IneligibleCgpa { required, actual }) => {
            assert_eq!(required, 7.5);
            assert_eq!(actual, 6.0);
        }
        other => panic!("expected ineligible CGPA, got {other:?}"),
    }
    assert!(check_cgpa(&project, Some(7.5), MissingCgpaPolicy::Permit).is_ok());
    assert!(check_cgpa(&project, Some(9.1), MissingCgpaPolicy::Permit).is_ok());
}

#[test]
fn cgpa_gate_is_open_without_a_minimum() {
    let project = project_fixture(3, None);
    assert!(check_cgpa(&project, Some(2.0), MissingCgpaPolicy::Reject).is_ok());
    assert!(check_cgpa(&project, None, MissingCgpaPolicy::Reject).is_ok());
}

#[test]
fn missing_cgpa_follows_policy() {
    let project = project_fixture(3, Some(6.5));

    assert!(check_cgpa(&project, None, MissingCgpaPolicy::Permit).is_ok());
    assert!(matches!(
        check_cgpa(&project, None, MissingCgpaPolicy::TreatAsZero),
        Err(AdmissionError::IneligibleCgpa { actual, .. }) if actual == 0.0
    ));
    assert!(matches!(
        check_cgpa(&project, None, MissingCgpaPolicy::Reject),
        Err(AdmissionError::MissingCgpa { .. })
    ));
}

#[test]
fn project_minimum_must_lie_on_the_scale() {
    assert!(check_min_cgpa(None).is_ok());
    assert!(check_min_cgpa(Some(0.0)).is_ok());
    assert!(check_min_cgpa(Some(10.0)).is_ok());

    for value in [f32::NAN, f32::INFINITY, -0.5, 10.5] {
        let err = check_min_cgpa(Some(value)).expect_err("off-scale minimum");
        assert_eq!(err.reason_code(), "invalid_min_cgpa");
    }
}

#[test]
fn capacity_counts_only_accepted_applications_of_the_project() {
    let project = project_fixture(2, None);
    let other = ProjectId::from("project-other");
    let applications = vec![
        application_fixture("a1", &project.id, ApplicationStatus::Accepted),
        application_fixture("a2", &project.id, ApplicationStatus::Pending),
        application_fixture("a3", &project.id, ApplicationStatus::Rejected),
        application_fixture("a4", &other, ApplicationStatus::Accepted),
    ];

    let accepted = accepted_count(&applications, &project.id);
    assert_eq!(accepted, 1);
    assert!(!is_full(&project, accepted));
    assert!(check_capacity(&project, accepted).is_ok());

    assert!(is_full(&project, 2));
    assert!(matches!(
        check_capacity(&project, 2),
        Err(AdmissionError::CapacityExceeded { max_students: 2 })
    ));
}

#[test]
fn applications_are_decided_once() {
    use ApplicationStatus::*;

    assert_eq!(check_transition(Pending, Accepted).ok(), Some(Transition::Apply));
    assert_eq!(check_transition(Pending, Rejected).ok(), Some(Transition::Apply));
    assert_eq!(
        check_transition(Accepted, Accepted).ok(),
        Some(Transition::Unchanged)
    );

    let err = check_transition(Accepted, Rejected).expect_err("accepted is terminal");
    assert_eq!(err.reason_code(), "invalid_transition");
    assert_eq!(
        err.to_string(),
        "application cannot move from accepted to rejected"
    );
    assert!(check_transition(Rejected, Accepted).is_err());
    assert!(check_transition(Accepted, Pending).is_err());
}
