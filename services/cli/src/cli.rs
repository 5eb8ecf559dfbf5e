use crate::infra::JsonFileStore;
use crate::report;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use ia_exam::config::AppConfig;
use ia_exam::dispatch::{Dispatcher, Request, Response};
use ia_exam::error::AppError;
use ia_exam::store::RecordStore;
use ia_exam::telemetry;
use ia_exam::workflows::application::UserId;
use ia_exam::workflows::exam::{write_attempts_csv, ExamError, SubmittedAnswer};
use serde_json::Value;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "ia-exam",
    about = "Track IA applications and administer the qualification exam from the command line",
    version
)]
struct Cli {
    /// Record store file (overrides APP_DATA_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Print dispatcher responses as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, inspect, and submit applications
    Application {
        #[command(subcommand)]
        command: ApplicationCommand,
    },
    /// Reviewer decisions on submitted applications
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
    /// Start, submit, and review exam attempts
    Exam {
        #[command(subcommand)]
        command: ExamCommand,
    },
    /// Dispatch a raw request and print the JSON response
    Request(RawRequestArgs),
    /// List the request kinds the dispatcher understands
    Commands,
    /// Print the audit trail for a user
    Audit(UserArgs),
}

#[derive(Subcommand, Debug)]
enum ApplicationCommand {
    /// Create a draft application
    Create(CreateArgs),
    /// Show application details
    Show(UserArgs),
    /// Submit a draft application for review
    Submit(UserArgs),
    /// Show the current application status
    Status(UserArgs),
}

#[derive(Subcommand, Debug)]
enum ReviewCommand {
    /// Approve an application and open the exam
    Approve(UserArgs),
    /// Reject an application with a reason
    Reject(RejectArgs),
}

#[derive(Subcommand, Debug)]
enum ExamCommand {
    /// Draw a question set for an eligible applicant
    Start(UserArgs),
    /// Grade a set of answers
    Submit(SubmitArgs),
    /// Report exam attempts, most recent first
    Results(ResultsArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    user_id: String,
}

#[derive(Args, Debug)]
struct CreateArgs {
    user_id: String,
    /// Applicant display name
    #[arg(long)]
    name: String,
    /// Applicant contact email
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct RejectArgs {
    user_id: String,
    /// Reason recorded in the audit trail
    #[arg(long)]
    reason: String,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    user_id: String,
    /// Answer as <question id>=<option label>, repeatable
    #[arg(long = "answer", value_parser = parse_answer)]
    answers: Vec<SubmittedAnswer>,
    /// Session start time (RFC 3339) used to record time taken
    #[arg(long, value_parser = parse_timestamp)]
    started_at: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
struct ResultsArgs {
    user_id: String,
    /// Also write every attempt to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RawRequestArgs {
    /// Request kind, see `ia-exam commands`
    kind: String,
    user_id: String,
    /// JSON payload for the request
    #[arg(long, value_parser = parse_payload)]
    payload: Option<Value>,
}

fn parse_answer(raw: &str) -> Result<SubmittedAnswer, String> {
    let (id, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <question id>=<label>, got `{raw}`"))?;
    let id: u32 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid question id `{}`", id.trim()))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing answer for question {id}"));
    }
    Ok(SubmittedAnswer::new(id, label))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("invalid RFC 3339 timestamp `{raw}`: {err}"))
}

fn parse_payload(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid JSON payload: {err}"))
}

struct Session {
    dispatcher: Dispatcher<JsonFileStore>,
    store: Arc<JsonFileStore>,
    json: bool,
}

impl Session {
    /// Runs a request, turning a declined response into [`AppError::Refused`].
    fn dispatch(&self, request: Request) -> Result<Response, AppError> {
        let response = self.dispatcher.handle(request)?;
        if self.json {
            println!("{}", to_json(&response)?);
        }
        if response.success {
            Ok(response)
        } else {
            Err(AppError::Refused(response.message.unwrap_or_default()))
        }
    }

    fn emit(&self, text: impl FnOnce() -> String) {
        if !self.json {
            println!("{}", text());
        }
    }
}

fn exam_error(err: ExamError) -> AppError {
    match err {
        ExamError::Store(err) => AppError::Store(err),
        other => AppError::Refused(other.to_string()),
    }
}

fn to_json(response: &Response) -> Result<String, AppError> {
    serde_json::to_string_pretty(response).map_err(|err| AppError::Io(err.into()))
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = cli.data {
        config.storage.data_path = path;
    }
    telemetry::init(&config.telemetry, cli.verbose.then_some("debug"))?;

    let bank = config.load_question_bank()?;
    let store = Arc::new(JsonFileStore::open(&config.storage.data_path)?);
    info!(
        environment = ?config.environment,
        data_path = %config.storage.data_path.display(),
        questions = bank.len(),
        "record store ready"
    );

    let session = Session {
        dispatcher: Dispatcher::new(Arc::clone(&store), bank, config.exam.clone()),
        store,
        json: cli.json,
    };

    match cli.command {
        Command::Application { command } => run_application(&session, command),
        Command::Review { command } => run_review(&session, command),
        Command::Exam { command } => run_exam(&session, command),
        Command::Request(args) => run_raw(&session, args),
        Command::Commands => {
            let help = Dispatcher::<JsonFileStore>::help();
            println!("{}", report::commands(&help));
            Ok(())
        }
        Command::Audit(args) => {
            let user_id = UserId::from(args.user_id);
            let entries = session.store.audit_trail(&user_id)?;
            println!("{}", report::audit_trail(&user_id, &entries));
            Ok(())
        }
    }
}

fn run_application(session: &Session, command: ApplicationCommand) -> Result<(), AppError> {
    match command {
        ApplicationCommand::Create(args) => {
            let response = session.dispatch(Request::CreateApplication {
                user_id: UserId::from(args.user_id),
                name: args.name,
                email: args.email,
            })?;
            session.emit(|| {
                let message = response.message.unwrap_or_default();
                match response.user_id {
                    Some(user_id) => format!("{message} ({user_id})"),
                    None => message,
                }
            });
        }
        ApplicationCommand::Show(args) => {
            let response = session.dispatch(Request::GetApplication {
                user_id: UserId::from(args.user_id),
            })?;
            if let Some(record) = response.data {
                session.emit(|| report::application(&record));
            }
        }
        ApplicationCommand::Submit(args) => {
            let response = session.dispatch(Request::SubmitApplication {
                user_id: UserId::from(args.user_id),
            })?;
            session.emit(|| response.message.unwrap_or_default());
        }
        ApplicationCommand::Status(args) => {
            let user_id = UserId::from(args.user_id);
            let response = session.dispatch(Request::GetStatus {
                user_id: user_id.clone(),
            })?;
            if let Some(status) = response.status {
                session.emit(|| report::status(&user_id, status));
            }
        }
    }
    Ok(())
}

fn run_review(session: &Session, command: ReviewCommand) -> Result<(), AppError> {
    let workflow = session.dispatcher.workflow();
    let record = match command {
        ReviewCommand::Approve(args) => workflow.approve(&UserId::from(args.user_id))?,
        ReviewCommand::Reject(args) => workflow.reject(&UserId::from(args.user_id), &args.reason)?,
    };

    if session.json {
        let response = Response {
            success: true,
            data: Some(record),
            ..Response::default()
        };
        println!("{}", to_json(&response)?);
    } else {
        println!("{}", report::application(&record));
    }
    Ok(())
}

fn run_exam(session: &Session, command: ExamCommand) -> Result<(), AppError> {
    match command {
        ExamCommand::Start(args) => {
            let response = session.dispatch(Request::StartExam {
                user_id: UserId::from(args.user_id),
            })?;
            if let Some(exam) = response.exam_session {
                session.emit(|| report::session(&exam));
            }
        }
        ExamCommand::Submit(args) => {
            let response = session.dispatch(Request::SubmitExam {
                user_id: UserId::from(args.user_id),
                answers: args.answers,
                started_at: args.started_at,
            })?;
            session.emit(|| {
                report::outcome(
                    response.message.as_deref().unwrap_or_default(),
                    response.score.unwrap_or_default(),
                    response.passed.unwrap_or_default(),
                    response.correct_answers.unwrap_or_default(),
                    response.total_questions.unwrap_or_default(),
                )
            });
        }
        ExamCommand::Results(args) => {
            let user_id = UserId::from(args.user_id);
            let response = session.dispatch(Request::GetExamResults {
                user_id: user_id.clone(),
            })?;
            let attempts = response.results.unwrap_or_default();

            let exam = session.dispatcher.exam();
            let remaining = exam.attempts_remaining(&user_id).map_err(exam_error)?;
            let latest_answers = match attempts.first() {
                Some(latest) => exam.answers(latest.id).map_err(exam_error)?,
                None => Vec::new(),
            };
            session.emit(|| report::exam_report(&user_id, &attempts, &latest_answers, remaining));

            if let Some(path) = args.csv {
                write_attempts_csv(&attempts, File::create(&path)?)?;
                info!(path = %path.display(), rows = attempts.len(), "exam results exported");
            }
        }
    }
    Ok(())
}

/// Raw requests always print the full response; a declined request is still a printed result.
fn run_raw(session: &Session, args: RawRequestArgs) -> Result<(), AppError> {
    let response = session.dispatcher.handle_raw(
        &args.kind,
        UserId::from(args.user_id),
        args.payload.unwrap_or(Value::Null),
    )?;
    println!("{}", to_json(&response)?);
    Ok(())
}
