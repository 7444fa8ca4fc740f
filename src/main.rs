use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use mentor_buddy::api::{ApiClient, ApiError, FileTokenStore, TokenStore};
use mentor_buddy::config::{AppConfig, ConfigError};
use mentor_buddy::keepalive::{self, KeepAliveReport};
use mentor_buddy::model::{
    AssignmentStatus, BuddyStatus, MentorStatus, ResourceKind, Role, SubmissionResource, TaskAssignment, TaskPriority,
    TaskStatus,
};
use mentor_buddy::poll::spawn_dashboard_poller;
use mentor_buddy::state::AppState;
use mentor_buddy::workflow::progress::verify_reported;
use mentor_buddy::workflow::{
    AssignmentFilter, BuddyFilter, CurriculumRollup, MentorFilter, NewSubmission, ReviewDecision, TaskFilter,
    build_threads, status,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("assignment {assignment} not found for buddy {buddy}")]
    AssignmentNotFound { buddy: Uuid, assignment: Uuid },
    #[error("assignment {0} has no submissions yet")]
    NoSubmissions(Uuid),
    #[error("backend is {0}")]
    BackendDown(String),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl CliError {
    fn user_line(&self) -> String {
        match self {
            Self::Api(e) if e.is_auth_failure() => {
                format!("{} Run `mentor-buddy login` to log in again.", e.user_message())
            }
            Self::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mentor-buddy", about = "Mentor-Buddy mentorship tracking client and keep-alive service")]
struct Cli {
    #[arg(long, env = "MENTOR_BUDDY_API_URL", global = true)]
    api_url: Option<String>,

    #[arg(long, env = "MENTOR_BUDDY_TOKEN_FILE", global = true)]
    token_file: Option<std::path::PathBuf>,

    #[arg(long, short, global = true, help = "Log at debug level")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `GET /api/keep-alive` and `GET /healthz`.
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Ping the backend health URL once, or every N seconds.
    KeepAlive {
        #[arg(long, value_name = "SECS")]
        every: Option<u64>,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MENTOR_BUDDY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MENTOR_BUDDY_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "buddy")]
        role: Role,
    },
    Logout,
    Whoami,
    Mentors(MentorArgs),
    Buddies(BuddyArgs),
    Tasks(TaskArgs),
    /// Dashboard stats and recent activity.
    Stats,
    /// Poll the dashboard and print every update until interrupted.
    Watch,
    Curricula(CurriculumCommand),
    /// A buddy's enrollment with per-week progress.
    Progress {
        buddy_id: Uuid,
        #[arg(long, value_parser = parse_wire::<AssignmentStatus>)]
        status: Option<AssignmentStatus>,
    },
    /// Move an assignment to another status.
    Status {
        buddy_id: Uuid,
        assignment_id: Uuid,
        to: AssignmentStatus,
    },
    Submit(SubmitArgs),
    /// Approve or request a revision of the latest submission.
    Review {
        buddy_id: Uuid,
        assignment_id: Uuid,
        decision: ReviewDecision,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Submissions awaiting review.
    Queue,
    Feedback(FeedbackCommand),
}

#[derive(Args, Debug)]
struct MentorArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_wire::<MentorStatus>)]
    status: Option<MentorStatus>,
    #[arg(long)]
    expertise: Option<String>,
    /// List the buddies of this mentor instead.
    #[arg(long, value_name = "MENTOR_ID")]
    buddies_of: Option<Uuid>,
}

#[derive(Args, Debug)]
struct BuddyArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_wire::<BuddyStatus>)]
    status: Option<BuddyStatus>,
    #[arg(long)]
    mentor: Option<Uuid>,
    #[arg(long, default_value_t = false)]
    unassigned: bool,
    /// Assign `--mentor` to this buddy instead of listing.
    #[arg(long, value_name = "BUDDY_ID", requires = "mentor")]
    assign: Option<Uuid>,
}

#[derive(Args, Debug)]
struct TaskArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_wire::<TaskStatus>)]
    status: Option<TaskStatus>,
    #[arg(long, value_parser = parse_wire::<TaskPriority>)]
    priority: Option<TaskPriority>,
    #[arg(long)]
    buddy: Option<Uuid>,
}

#[derive(Args, Debug)]
struct CurriculumCommand {
    #[command(subcommand)]
    command: CurriculumSubcommand,
}

#[derive(Subcommand, Debug)]
enum CurriculumSubcommand {
    List,
    Show { curriculum_id: Uuid },
    Publish { curriculum_id: Uuid },
    Enroll { buddy_id: Uuid, curriculum_id: Uuid },
}

#[derive(Args, Debug)]
struct SubmitArgs {
    buddy_id: Uuid,
    assignment_id: Uuid,
    #[arg(long)]
    description: String,
    /// Attach a link; repeatable.
    #[arg(long = "link", value_name = "URL")]
    links: Vec<String>,
    /// Attach a repository URL; repeatable.
    #[arg(long = "repo", value_name = "URL")]
    repos: Vec<String>,
}

#[derive(Args, Debug)]
struct FeedbackCommand {
    #[command(subcommand)]
    command: FeedbackSubcommand,
}

#[derive(Subcommand, Debug)]
enum FeedbackSubcommand {
    Show {
        submission_id: Uuid,
    },
    Post {
        submission_id: Uuid,
        message: String,
        #[arg(long, value_name = "FEEDBACK_ID")]
        reply_to: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.user_line());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(path) = cli.token_file {
        config.token_file = path;
    }

    match cli.command {
        Command::Serve { port } => run_serve(&config, port.unwrap_or(config.port)).await,
        Command::KeepAlive { every } => run_keep_alive(&config, every).await,
        command => {
            let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_file.clone()));
            let api = ApiClient::from_config(&config, tokens)?;
            run_client(&api, &config, command).await
        }
    }
}

// =============================================================================
// KEEP-ALIVE
// =============================================================================

async fn run_serve(config: &AppConfig, port: u16) -> Result<(), CliError> {
    let state = AppState::from_config(config)?;
    let app = mentor_buddy::routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, health_url = %config.health_url, "keep-alive service listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_keep_alive(config: &AppConfig, every: Option<u64>) -> Result<(), CliError> {
    let state = AppState::from_config(config)?;
    let Some(secs) = every else {
        let report = keepalive::check_backend(&state.http, &state.health_url, state.secret()).await;
        print_json(&report)?;
        return ensure_healthy(&report);
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    loop {
        interval.tick().await;
        let report = keepalive::check_backend(&state.http, &state.health_url, state.secret()).await;
        println!("{}", serde_json::to_string(&report)?);
    }
}

fn ensure_healthy(report: &KeepAliveReport) -> Result<(), CliError> {
    if report.ok {
        return Ok(());
    }
    Err(CliError::BackendDown(wire(&report.status)))
}

// =============================================================================
// CLIENT COMMANDS
// =============================================================================

async fn run_client(api: &ApiClient, config: &AppConfig, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let session = api.login(&email, &password).await?;
            println!("logged in as {} ({})", session.user.name, session.user.role);
            Ok(())
        }
        Command::Register { email, password, name, role } => {
            let session = api.register(&email, &password, &name, role).await?;
            println!("registered {} as {}", session.user.email, session.user.role);
            Ok(())
        }
        Command::Logout => {
            api.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = api.me().await?;
            println!("{} <{}>  role={}  home={}", user.name, user.email, user.role, user.role.home_path());
            Ok(())
        }
        Command::Mentors(args) => run_mentors(api, args).await,
        Command::Buddies(args) => run_buddies(api, args).await,
        Command::Tasks(args) => run_tasks(api, args).await,
        Command::Stats => run_stats(api).await,
        Command::Watch => run_watch(api, config).await,
        Command::Curricula(cmd) => run_curricula(api, cmd).await,
        Command::Progress { buddy_id, status } => run_progress(api, buddy_id, status).await,
        Command::Status { buddy_id, assignment_id, to } => {
            let assignment = find_assignment(api, buddy_id, assignment_id).await?;
            let updated = api.update_assignment_status(&assignment, to).await?;
            println!("{}: {} -> {}", updated.title, assignment.status, updated.status);
            Ok(())
        }
        Command::Submit(args) => run_submit(api, args).await,
        Command::Review { buddy_id, assignment_id, decision, comment } => {
            run_review(api, buddy_id, assignment_id, decision, comment).await
        }
        Command::Queue => {
            for submission in api.review_queue().await? {
                println!(
                    "{}  assignment={}  v{}  {}  submitted {}",
                    submission.id,
                    submission.assignment_id,
                    submission.version,
                    submission.status,
                    stamp(submission.submitted_at)
                );
            }
            Ok(())
        }
        Command::Feedback(cmd) => run_feedback(api, cmd).await,
        Command::Serve { .. } | Command::KeepAlive { .. } => Ok(()),
    }
}

async fn run_mentors(api: &ApiClient, args: MentorArgs) -> Result<(), CliError> {
    if let Some(mentor_id) = args.buddies_of {
        for buddy in api.mentor_buddies(mentor_id).await? {
            println!("{}  {:<24} {:<28} {:>3}%", buddy.id, buddy.name, buddy.email, buddy.progress);
        }
        return Ok(());
    }

    let mentors = api.mentors().await?;
    let filter = MentorFilter { search: args.search, status: args.status, expertise: args.expertise };
    for mentor in filter.apply(&mentors) {
        let capacity = mentor.max_buddies.map_or_else(|| "-".to_string(), |max| max.to_string());
        println!(
            "{}  {:<24} {:<28} {:<9} buddies {}/{}{}",
            mentor.id,
            mentor.name,
            mentor.email,
            wire(&mentor.status),
            mentor.buddy_count,
            capacity,
            if mentor.has_capacity() { "" } else { "  (full)" }
        );
    }
    Ok(())
}

async fn run_buddies(api: &ApiClient, args: BuddyArgs) -> Result<(), CliError> {
    if let (Some(buddy_id), Some(mentor_id)) = (args.assign, args.mentor) {
        let buddy = api.assign_mentor(buddy_id, mentor_id).await?;
        println!("{} is now mentored by {}", buddy.name, buddy.mentor_name.as_deref().unwrap_or("(unknown)"));
        return Ok(());
    }

    let buddies = api.buddies().await?;
    let filter = BuddyFilter {
        search: args.search,
        status: args.status,
        mentor_id: args.mentor,
        unassigned_only: args.unassigned,
    };
    for buddy in filter.apply(&buddies) {
        println!(
            "{}  {:<24} {:<28} {:<9} {:>3}%  mentor: {}",
            buddy.id,
            buddy.name,
            buddy.email,
            wire(&buddy.status),
            buddy.progress,
            buddy.mentor_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn run_tasks(api: &ApiClient, args: TaskArgs) -> Result<(), CliError> {
    let tasks = api.tasks().await?;
    let filter = TaskFilter { search: args.search, status: args.status, priority: args.priority, buddy_id: args.buddy };
    let now = OffsetDateTime::now_utc();
    for task in filter.apply(&tasks) {
        println!(
            "{}  {:<32} {:<11} {:<6} due {}{}",
            task.id,
            task.title,
            wire(&task.status),
            wire(&task.priority),
            task.due_date.map_or_else(|| "-".to_string(), stamp),
            if task.is_overdue_at(now) { "  OVERDUE" } else { "" }
        );
    }
    Ok(())
}

async fn run_stats(api: &ApiClient) -> Result<(), CliError> {
    let stats = api.dashboard_stats().await?;
    print_json(&stats)?;
    for activity in api.recent_activity().await? {
        println!("{}  [{}] {}", stamp(activity.timestamp), activity.kind, activity.description);
    }
    Ok(())
}

async fn run_watch(api: &ApiClient, config: &AppConfig) -> Result<(), CliError> {
    api.session()?;
    let (handle, mut rx) = spawn_dashboard_poller(api.clone(), config.poll);
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if let Some(stats) = &snapshot.stats {
                    println!(
                        "mentors={} buddies={} active={} tasks={}/{} reviews={} avg={:.1}%",
                        stats.total_mentors,
                        stats.total_buddies,
                        stats.active_buddies,
                        stats.completed_tasks,
                        stats.total_tasks,
                        stats.pending_reviews,
                        stats.average_progress
                    );
                }
                if let Some(latest) = snapshot.activity.first() {
                    println!("  latest: {}", latest.description);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.abort();
                return Ok(());
            }
        }
    }
    // The poller only ends on its own when the session is rejected.
    api.session()?;
    Ok(())
}

async fn run_curricula(api: &ApiClient, cmd: CurriculumCommand) -> Result<(), CliError> {
    match cmd.command {
        CurriculumSubcommand::List => {
            for curriculum in api.curricula().await? {
                println!(
                    "{}  {:<32} {:>2} weeks  {:>3} tasks  {}",
                    curriculum.id,
                    curriculum.name,
                    curriculum.duration_weeks,
                    curriculum.task_count(),
                    if curriculum.is_published { "published" } else { "draft" }
                );
            }
            Ok(())
        }
        CurriculumSubcommand::Show { curriculum_id } => {
            let curriculum = api.curriculum(curriculum_id).await?;
            println!("{} ({} weeks)", curriculum.name, curriculum.duration_weeks);
            for week in curriculum.ordered_weeks() {
                println!("  week {}: {}", week.week_number, week.title);
                for task in &week.tasks {
                    println!("    {}. {} [{}]", task.order, task.title, wire(&task.difficulty));
                }
            }
            Ok(())
        }
        CurriculumSubcommand::Publish { curriculum_id } => {
            let curriculum = api.curriculum(curriculum_id).await?;
            let published = api.publish_curriculum(&curriculum).await?;
            println!("published {}", published.name);
            Ok(())
        }
        CurriculumSubcommand::Enroll { buddy_id, curriculum_id } => {
            let curriculum = api.curriculum(curriculum_id).await?;
            let enrollment = api.enroll(buddy_id, &curriculum).await?;
            println!("enrolled buddy {} in {}", enrollment.buddy_id, enrollment.curriculum_name);
            Ok(())
        }
    }
}

async fn run_progress(api: &ApiClient, buddy_id: Uuid, status: Option<AssignmentStatus>) -> Result<(), CliError> {
    let enrollment = api.buddy_curriculum(buddy_id).await?;
    let rollup = CurriculumRollup::from_weeks(&enrollment.weeks);
    println!(
        "{}: {}/{} tasks ({}%), current week {}",
        enrollment.curriculum_name, rollup.completed, rollup.total, rollup.percentage, rollup.current_week
    );
    if rollup.percentage != enrollment.progress_percentage {
        tracing::warn!(
            reported = enrollment.progress_percentage,
            expected = rollup.percentage,
            "enrollment progress differs from task counts"
        );
    }

    let filter = AssignmentFilter { status };
    let mut weeks: Vec<_> = enrollment.weeks.iter().collect();
    weeks.sort_by_key(|w| w.week_number);
    for week in weeks {
        if let Some(drift) = verify_reported(week) {
            tracing::warn!(week = drift.week_number, reported = drift.reported, expected = drift.expected, "week progress drift");
        }
        println!(
            "  week {} {:<24} {}/{} ({}%)",
            week.week_number, week.title, week.completed_tasks, week.total_tasks, week.progress_percentage
        );
        for assignment in filter.apply(&week.assignments) {
            let next: Vec<&str> = status::next_states(assignment.status).into_iter().map(AssignmentStatus::as_str).collect();
            println!(
                "    {}  {:<32} {:<14} next: {}",
                assignment.id,
                assignment.title,
                assignment.status,
                if next.is_empty() { "-".to_string() } else { next.join(", ") }
            );
        }
    }
    Ok(())
}

async fn run_submit(api: &ApiClient, args: SubmitArgs) -> Result<(), CliError> {
    let assignment = find_assignment(api, args.buddy_id, args.assignment_id).await?;
    let resources = args
        .links
        .into_iter()
        .map(|url| SubmissionResource { kind: ResourceKind::Link, url, title: None })
        .chain(args.repos.into_iter().map(|url| SubmissionResource { kind: ResourceKind::Repository, url, title: None }))
        .collect();
    let work = NewSubmission { description: args.description, resources };
    let submission = api.create_submission(&assignment, work).await?;
    println!("submitted v{} of {} ({})", submission.version, assignment.title, submission.id);
    Ok(())
}

async fn run_review(
    api: &ApiClient,
    buddy_id: Uuid,
    assignment_id: Uuid,
    decision: ReviewDecision,
    comment: Option<String>,
) -> Result<(), CliError> {
    let assignment = find_assignment(api, buddy_id, assignment_id).await?;
    let history = api.submissions(assignment_id).await?;
    let latest = history.last().ok_or(CliError::NoSubmissions(assignment_id))?;
    let reviewed = api.review_submission(&assignment, latest, decision, comment).await?;
    println!("v{} of {} is now {}", reviewed.version, assignment.title, reviewed.status);
    Ok(())
}

async fn run_feedback(api: &ApiClient, cmd: FeedbackCommand) -> Result<(), CliError> {
    match cmd.command {
        FeedbackSubcommand::Show { submission_id } => {
            let threads = build_threads(api.feedback(submission_id).await?);
            for thread in &threads {
                for (depth, comment) in thread.flatten() {
                    println!(
                        "{}{} ({}) {}: {}",
                        "  ".repeat(depth),
                        comment.author_name,
                        comment.author_role,
                        stamp(comment.created_at),
                        comment.message
                    );
                }
            }
            Ok(())
        }
        FeedbackSubcommand::Post { submission_id, message, reply_to } => {
            let posted = api.post_feedback(submission_id, &message, reply_to).await?;
            println!("posted {}", posted.id);
            Ok(())
        }
    }
}

async fn find_assignment(api: &ApiClient, buddy_id: Uuid, assignment_id: Uuid) -> Result<TaskAssignment, CliError> {
    let enrollment = api.buddy_curriculum(buddy_id).await?;
    enrollment
        .assignment(assignment_id)
        .cloned()
        .ok_or(CliError::AssignmentNotFound { buddy: buddy_id, assignment: assignment_id })
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Parse a CLI value the way the API spells it (`on_leave`, `in-progress`).
fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(Value::String(normalized)).map_err(|_| format!("unrecognized value: {raw}"))
}

/// Wire spelling of a unit enum.
fn wire<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

fn stamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
