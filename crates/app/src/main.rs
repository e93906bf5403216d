use std::fmt;
use std::sync::Arc;

use assess_core::grading::{AnswerKeyGrader, Grader, RandomGrader};
use assess_core::model::AssessmentId;
use services::{AssessmentService, AssessmentSessionManager, Clock, ManagerConfig, TimeoutPolicy};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidAssessmentId { raw: String },
    InvalidGrader { raw: String },
    InvalidTimeoutPolicy { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidAssessmentId { raw } => {
                write!(f, "invalid --assessment-id value: {raw}")
            }
            ArgsError::InvalidGrader { raw } => {
                write!(f, "invalid --grader value (expected answer-key or random): {raw}")
            }
            ArgsError::InvalidTimeoutPolicy { raw } => {
                write!(
                    f,
                    "invalid --on-timeout value (expected continue or auto-submit): {raw}"
                )
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraderKind {
    AnswerKey,
    Random,
}

impl GraderKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "answer-key" | "key" => Some(Self::AnswerKey),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    fn build(self) -> Arc<dyn Grader> {
        match self {
            GraderKind::AnswerKey => Arc::new(AnswerKeyGrader),
            GraderKind::Random => Arc::new(RandomGrader::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Take,
    List,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "take" => Some(Self::Take),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Args {
    assessment_id: AssessmentId,
    grader: GraderKind,
    timeout_policy: TimeoutPolicy,
    json: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- take [--assessment-id <id>] [--grader <kind>] [--on-timeout <policy>] [--json]");
    eprintln!("  cargo run -p app -- list");
    eprintln!();
    eprintln!("Defaults for take:");
    eprintln!("  --assessment-id 1");
    eprintln!("  --grader answer-key      (answer-key | random)");
    eprintln!("  --on-timeout continue    (continue | auto-submit)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESS_ID, ASSESS_GRADER, ASSESS_TIMEOUT, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut assessment_id = match std::env::var("ASSESS_ID") {
            Ok(raw) => raw
                .parse::<AssessmentId>()
                .map_err(|_| ArgsError::InvalidAssessmentId { raw })?,
            Err(_) => AssessmentId::new(1),
        };
        let mut grader = match std::env::var("ASSESS_GRADER") {
            Ok(raw) => GraderKind::parse(&raw).ok_or(ArgsError::InvalidGrader { raw })?,
            Err(_) => GraderKind::AnswerKey,
        };
        let mut timeout_policy = match std::env::var("ASSESS_TIMEOUT") {
            Ok(raw) => {
                TimeoutPolicy::parse(&raw).ok_or(ArgsError::InvalidTimeoutPolicy { raw })?
            }
            Err(_) => TimeoutPolicy::default(),
        };
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--assessment-id" => {
                    let value = require_value(args, "--assessment-id")?;
                    assessment_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidAssessmentId { raw: value.clone() })?;
                }
                "--grader" => {
                    let value = require_value(args, "--grader")?;
                    grader = GraderKind::parse(&value)
                        .ok_or(ArgsError::InvalidGrader { raw: value.clone() })?;
                }
                "--on-timeout" => {
                    let value = require_value(args, "--on-timeout")?;
                    timeout_policy = TimeoutPolicy::parse(&value)
                        .ok_or(ArgsError::InvalidTimeoutPolicy { raw: value.clone() })?;
                }
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            assessment_id,
            grader,
            timeout_policy,
            json,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Taking an assessment is the default when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Take,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Take,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::debug!(
        command = ?cmd,
        assessment_id = %parsed.assessment_id,
        grader = ?parsed.grader,
        timeout_policy = ?parsed.timeout_policy,
        "configuration resolved"
    );

    let storage = Storage::in_memory_seeded().await?;
    let config = ManagerConfig::default().with_timeout_policy(parsed.timeout_policy);
    let manager = AssessmentSessionManager::build(parsed.grader.build(), Clock::default(), config);
    let service = AssessmentService::new(manager, storage.questions, storage.attempts);

    match cmd {
        Command::List => {
            for def in service.catalog().await? {
                println!(
                    "{:>3}  {}  ({} questions, pass {}%, {} min, {}/{} attempts{})",
                    def.id(),
                    def.title(),
                    def.question_count(),
                    def.passing_score(),
                    def.time_limit_minutes(),
                    def.attempts(),
                    def.max_attempts(),
                    if def.is_adaptive() { ", adaptive" } else { "" },
                );
            }
            Ok(())
        }
        Command::Take => {
            let Some(result) = terminal::run_session(&service, parsed.assessment_id).await? else {
                println!("No result recorded.");
                return Ok(());
            };
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::print_result(&result);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
