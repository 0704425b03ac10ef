use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use project_portal::config::AppConfig;
use project_portal::error::AppError;
use project_portal::portal::{
    partition_upcoming, sample_catalog, AdmissionError, Application, ApplicationId, Decision,
    JsonFileBackend, Meeting, MeetingDetails, MeetingId, MeetingStatus, Portal, Project,
    ProjectId, ProjectListing, ProjectStatus, Registration, User, UserRole,
};
use project_portal::telemetry;
use tracing::info;

use crate::demo::run_demo;

#[derive(Parser, Debug)]
#[command(
    name = "project-portal",
    about = "Publish projects, apply, decide applications, and schedule meetings",
    version
)]
struct Cli {
    /// Override the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the sample catalog into collections that do not exist yet
    Init,
    /// Create an account and sign in as it
    Register(RegisterArgs),
    /// Sign in with a registered email
    Login {
        #[arg(long)]
        email: String,
    },
    /// Clear the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Publish, list, and change the status of projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// Apply to a project as the signed-in student
    Apply(ApplyArgs),
    /// List the signed-in student's applications
    Applications,
    /// Accept or reject an application to one of your projects
    Decide(DecideArgs),
    /// Schedule and track meetings
    Meeting {
        #[command(subcommand)]
        command: MeetingCommand,
    },
    /// Run the admission scenario end to end against an in-memory store
    Demo,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, value_enum)]
    role: RoleArg,
    /// Current CGPA (students only)
    #[arg(long)]
    cgpa: Option<f32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Student,
    Faculty,
}

impl From<RoleArg> for UserRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Student => UserRole::Student,
            RoleArg::Faculty => UserRole::Faculty,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Publish a project as the signed-in faculty member
    Publish(PublishArgs),
    /// List projects, optionally filtered by status or a title/description search
    List {
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Overwrite a project's status (closing and reopening are both allowed)
    Status {
        project_id: String,
        status: ProjectStatus,
    },
    /// Show the applications received by a project
    Applications { project_id: String },
}

#[derive(Args, Debug)]
struct PublishArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    requirements: String,
    /// Application deadline (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    deadline: NaiveDate,
    /// Team size; anything above 7 is capped at 7
    #[arg(long, default_value_t = 2)]
    max_students: u32,
    #[arg(long)]
    min_cgpa: Option<f32>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    project_id: String,
    #[arg(long, default_value = "")]
    note: String,
}

#[derive(Args, Debug)]
struct DecideArgs {
    application_id: String,
    #[arg(value_enum)]
    decision: DecisionArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecisionArg {
    Accept,
    Reject,
}

impl From<DecisionArg> for Decision {
    fn from(value: DecisionArg) -> Self {
        match value {
            DecisionArg::Accept => Decision::Accept,
            DecisionArg::Reject => Decision::Reject,
        }
    }
}

#[derive(Subcommand, Debug)]
enum MeetingCommand {
    /// Schedule a meeting for an accepted application
    Schedule(ScheduleArgs),
    /// List the signed-in user's meetings, upcoming first
    List,
    /// Mark a meeting completed or cancelled
    Status {
        meeting_id: String,
        status: MeetingStatus,
    },
}

#[derive(Args, Debug)]
struct ScheduleArgs {
    application_id: String,
    #[arg(long)]
    title: String,
    /// Start time (RFC 3339, e.g. 2025-10-01T14:00:00Z)
    #[arg(long, value_parser = parse_timestamp)]
    at: DateTime<Utc>,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    link: Option<String>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    telemetry::init(&config.telemetry)?;

    info!(
        ?config.environment,
        data_dir = %config.storage.data_dir.display(),
        missing_cgpa = config.admission.missing_cgpa.label(),
        "portal ready"
    );
    let backend = Arc::new(JsonFileBackend::new(config.storage.data_dir.clone()));
    let portal = Portal::new(backend, (&config.admission).into());

    match cli.command {
        Command::Init => {
            let seeded = portal.store.seed(sample_catalog(Utc::now()))?;
            let root = portal.store.backend().root().display();
            if seeded.is_empty() {
                println!("{root} already initialized");
            } else {
                for collection in seeded {
                    println!("Seeded {} in {root}", collection.storage_key());
                }
            }
        }
        Command::Register(args) => {
            let user = portal.identity.register(Registration {
                name: args.name,
                email: args.email,
                role: args.role.into(),
                cgpa: args.cgpa,
            })?;
            println!("Registered and signed in as {}", describe_user(&user));
        }
        Command::Login { email } => {
            let user = portal.identity.login(&email)?;
            println!("Signed in as {}", describe_user(&user));
        }
        Command::Logout => {
            portal.identity.logout()?;
            println!("Signed out");
        }
        Command::Whoami => match portal.identity.current_user()? {
            Some(user) => println!("{}", describe_user(&user)),
            None => println!("Not signed in"),
        },
        Command::Project { command } => run_project(&portal, command)?,
        Command::Apply(args) => {
            let student = signed_in(&portal, UserRole::Student)?;
            let application = portal.admissions.submit_application(
                &ProjectId(args.project_id),
                &student.id,
                args.note,
            )?;
            println!("Application submitted");
            print_application(&application);
        }
        Command::Applications => {
            let student = signed_in(&portal, UserRole::Student)?;
            let applications = portal.admissions.applications_for_student(&student.id)?;
            if applications.is_empty() {
                println!("No applications");
            }
            for application in &applications {
                print_application(application);
            }
        }
        Command::Decide(args) => {
            let faculty = signed_in(&portal, UserRole::Faculty)?;
            let application_id = ApplicationId(args.application_id);
            let application = portal
                .store
                .get_by_id::<Application>(&application_id)?
                .ok_or_else(|| AdmissionError::NotFound {
                    entity: "application",
                    id: application_id.to_string(),
                })?;
            ensure_owner(&portal.admissions.project(&application.project_id)?, &faculty)?;

            let decided = portal
                .admissions
                .decide_application(&application_id, args.decision.into())?;
            print_application(&decided);
            let project = portal.admissions.project(&decided.project_id)?;
            println!("Project {} is {}", project.id, project.status.label());
        }
        Command::Meeting { command } => run_meeting(&portal, command)?,
        Command::Demo => run_demo(portal.admissions.policy().clone())?,
    }

    Ok(())
}

fn run_project(portal: &Portal<JsonFileBackend>, command: ProjectCommand) -> Result<(), AppError> {
    match command {
        ProjectCommand::Publish(args) => {
            let faculty = signed_in(portal, UserRole::Faculty)?;
            let project = portal.admissions.publish_project(
                &faculty.id,
                ProjectListing {
                    title: args.title,
                    description: args.description,
                    requirements: args.requirements,
                    deadline: end_of_day(args.deadline),
                    max_students: args.max_students,
                    min_cgpa: args.min_cgpa,
                },
            )?;
            println!("Published project");
            print_project(&project);
        }
        ProjectCommand::List { status, search } => {
            let needle = search.map(|term| term.trim().to_lowercase());
            let projects = portal.store.find::<Project, _>(|project| {
                status.map_or(true, |status| project.status == status)
                    && needle
                        .as_deref()
                        .map_or(true, |needle| matches_search(project, needle))
            })?;
            if projects.is_empty() {
                println!("No projects");
            }
            for project in &projects {
                print_project(project);
            }
        }
        ProjectCommand::Status { project_id, status } => {
            let faculty = signed_in(portal, UserRole::Faculty)?;
            let project_id = ProjectId(project_id);
            ensure_owner(&portal.admissions.project(&project_id)?, &faculty)?;
            let project = portal.admissions.set_project_status(&project_id, status)?;
            print_project(&project);
        }
        ProjectCommand::Applications { project_id } => {
            let applications = portal
                .admissions
                .applications_for_project(&ProjectId(project_id))?;
            if applications.is_empty() {
                println!("No applications");
            }
            for application in &applications {
                print_application(application);
            }
        }
    }
    Ok(())
}

fn run_meeting(portal: &Portal<JsonFileBackend>, command: MeetingCommand) -> Result<(), AppError> {
    match command {
        MeetingCommand::Schedule(args) => {
            let faculty = signed_in(portal, UserRole::Faculty)?;
            let application_id = ApplicationId(args.application_id);
            if let Some(application) = portal.store.get_by_id::<Application>(&application_id)? {
                ensure_owner(&portal.admissions.project(&application.project_id)?, &faculty)?;
            }
            let meeting = portal.meetings.schedule_for_application(
                &application_id,
                MeetingDetails {
                    scheduled_at: args.at,
                    title: args.title,
                    description: args.description,
                    location: args.location,
                    meeting_link: args.link,
                },
            )?;
            println!("Meeting scheduled");
            print_meeting(&meeting);
        }
        MeetingCommand::List => {
            let user = current(portal)?;
            let meetings = match user.role {
                UserRole::Faculty => portal.meetings.meetings_for_faculty(&user.id)?,
                UserRole::Student => portal.meetings.meetings_for_student(&user.id)?,
            };
            let agenda = partition_upcoming(meetings, Utc::now());
            println!("Upcoming meetings");
            for meeting in &agenda.upcoming {
                print_meeting(meeting);
            }
            println!("\nPast meetings");
            for meeting in &agenda.past {
                print_meeting(meeting);
            }
        }
        MeetingCommand::Status { meeting_id, status } => {
            let faculty = signed_in(portal, UserRole::Faculty)?;
            let meeting_id = MeetingId(meeting_id);
            let meeting = portal.meetings.meeting(&meeting_id)?;
            if meeting.faculty_id != faculty.id {
                return Err(AppError::Session(format!(
                    "meeting {meeting_id} belongs to another faculty member"
                )));
            }
            let meeting = portal.meetings.set_meeting_status(&meeting_id, status)?;
            print_meeting(&meeting);
        }
    }
    Ok(())
}

fn current(portal: &Portal<JsonFileBackend>) -> Result<User, AppError> {
    portal
        .identity
        .current_user()?
        .ok_or_else(|| AppError::Session("nobody is signed in; run `login` first".to_string()))
}

fn signed_in(portal: &Portal<JsonFileBackend>, role: UserRole) -> Result<User, AppError> {
    let user = current(portal)?;
    if user.role != role {
        return Err(AppError::Session(format!(
            "this command requires a {} account, signed in as {}",
            role.label(),
            user.role.label()
        )));
    }
    Ok(user)
}

fn ensure_owner(project: &Project, faculty: &User) -> Result<(), AppError> {
    if project.faculty_id != faculty.id {
        return Err(AppError::Session(format!(
            "project {} belongs to {}",
            project.id, project.faculty_name
        )));
    }
    Ok(())
}

fn matches_search(project: &Project, needle: &str) -> bool {
    project.title.to_lowercase().contains(needle)
        || project.description.to_lowercase().contains(needle)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    Utc.from_utc_datetime(&date.and_time(last_second))
}

fn describe_user(user: &User) -> String {
    match user.cgpa {
        Some(cgpa) => format!(
            "{} <{}> ({}, CGPA {:.2}) [{}]",
            user.name,
            user.email,
            user.role.label(),
            cgpa,
            user.id
        ),
        None => format!(
            "{} <{}> ({}) [{}]",
            user.name,
            user.email,
            user.role.label(),
            user.id
        ),
    }
}

pub(crate) fn print_project(project: &Project) {
    let min_cgpa = project
        .min_cgpa
        .map(|min| format!(", min CGPA {min:.1}"))
        .unwrap_or_default();
    println!(
        "- {} | {} | {} | team of {}{} | by {} | deadline {}",
        project.id,
        project.title,
        project.status.label(),
        project.max_students,
        min_cgpa,
        project.faculty_name,
        project.deadline.date_naive()
    );
}

pub(crate) fn print_application(application: &Application) {
    println!(
        "- {} | project {} | {} (CGPA {:.2}) | {}",
        application.id,
        application.project_id,
        application.student_name,
        application.cgpa,
        application.status.label()
    );
}

pub(crate) fn print_meeting(meeting: &Meeting) {
    let place = match (&meeting.location, &meeting.meeting_link) {
        (Some(location), _) => format!(" @ {location}"),
        (None, Some(link)) => format!(" @ {link}"),
        (None, None) => String::new(),
    };
    println!(
        "- {} | {} | {}{} | {}",
        meeting.id,
        meeting.title,
        meeting.scheduled_at.format("%Y-%m-%d %H:%M UTC"),
        place,
        meeting.status.label()
    );
}
