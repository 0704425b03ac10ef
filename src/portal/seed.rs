use chrono::{DateTime, Duration, Utc};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Meeting, Project, ProjectId, ProjectStatus,
    User, UserId, UserRole,
};

/// Records written on first run, one vector per collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedCatalog {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub applications: Vec<Application>,
    pub meetings: Vec<Meeting>,
}

/// Demo catalog: two faculty members, one student, three open projects, one pending application.
pub fn sample_catalog(now: DateTime<Utc>) -> SeedCatalog {
    let users = vec![
        User {
            id: UserId::from("student1"),
            name: "Alex Taylor".to_string(),
            email: "alex@university.edu".to_string(),
            role: UserRole::Student,
            created_at: now,
            cgpa: Some(8.5),
        },
        User {
            id: UserId::from("faculty1"),
            name: "Dr. Sarah Johnson".to_string(),
            email: "sarah@university.edu".to_string(),
            role: UserRole::Faculty,
            created_at: now,
            cgpa: None,
        },
        User {
            id: UserId::from("faculty2"),
            name: "Prof. Michael Chen".to_string(),
            email: "michael@university.edu".to_string(),
            role: UserRole::Faculty,
            created_at: now,
            cgpa: None,
        },
    ];

    let projects = vec![
        seed_project(
            "1",
            "AI-Based Image Recognition System",
            "Design and implement an AI system for image recognition using deep learning techniques.",
            "Knowledge of Python, TensorFlow/PyTorch, and basic understanding of CNN architectures.",
            ("faculty1", "Dr. Sarah Johnson"),
            now,
            30,
            5,
            7.0,
        ),
        seed_project(
            "2",
            "Blockchain-based Voting System",
            "Develop a secure voting system using blockchain technology to ensure transparency and security.",
            "Understanding of blockchain concepts, smart contracts, and web development.",
            ("faculty1", "Dr. Sarah Johnson"),
            now,
            45,
            7,
            7.5,
        ),
        seed_project(
            "3",
            "Smart Home Automation System",
            "Create an IoT-based smart home system that can control various home appliances and monitor energy usage.",
            "Experience with IoT platforms, embedded systems, and mobile app development.",
            ("faculty2", "Prof. Michael Chen"),
            now,
            60,
            6,
            8.0,
        ),
    ];

    let applications = vec![Application {
        id: ApplicationId::from("app1"),
        project_id: ProjectId::from("1"),
        student_id: UserId::from("student1"),
        student_name: "Alex Taylor".to_string(),
        status: ApplicationStatus::Pending,
        created_at: now,
        note: "I'm very interested in AI and have completed several projects using TensorFlow."
            .to_string(),
        cgpa: 8.5,
    }];

    SeedCatalog {
        users,
        projects,
        applications,
        meetings: Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_project(
    id: &str,
    title: &str,
    description: &str,
    requirements: &str,
    (faculty_id, faculty_name): (&str, &str),
    now: DateTime<Utc>,
    open_days: i64,
    max_students: u8,
    min_cgpa: f32,
) -> Project {
    Project {
        id: ProjectId::from(id),
        title: title.to_string(),
        description: description.to_string(),
        requirements: requirements.to_string(),
        faculty_id: UserId::from(faculty_id),
        faculty_name: faculty_name.to_string(),
        status: ProjectStatus::Open,
        created_at: now,
        deadline: now + Duration::days(open_days),
        max_students,
        min_cgpa: Some(min_cgpa),
    }
}
