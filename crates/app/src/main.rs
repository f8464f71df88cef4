mod terminal;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quiz_core::daily::QuizSet;
use quiz_core::model::{QuestionRecord, QuizSessionConfig, SessionParams, UserId};
use serde::Deserialize;
use services::ports::PreferenceReader;
use services::{
    Clock, DailyQuizService, HistoryResultSink, QuizSession, SessionDeps, SessionEnd, StaticUser,
    StoredPreferences, StoredReminderCanceler, local_user_id, spawn_session,
};
use storage::repository::Storage;
use terminal::{TerminalConfirmer, TerminalFeedback, TerminalInput, TerminalPresenter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str, command: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidLimit { raw: String },
    InvalidToggle { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag, command } => write!(f, "{command} requires {flag}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid user id (expected a UUID): {raw}"),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::InvalidToggle { flag, raw } => {
                write!(f, "invalid {flag} value (expected on/off): {raw}")
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz play    --questions <file.json> --set-id <id> --title <title> [--difficulty easy|medium|hard]");
    eprintln!("  quiz daily   --catalog <file.json>");
    eprintln!("  quiz history [--limit <n>]");
    eprintln!("  quiz prefs   [--sound on|off] [--haptics on|off]");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>   (default {DEFAULT_DB_URL})");
    eprintln!("  --user <uuid>       (default: local profile)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_USER_ID, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Daily,
    History,
    Prefs,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "daily" => Some(Self::Daily),
            "history" => Some(Self::History),
            "prefs" => Some(Self::Prefs),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Daily => "daily",
            Self::History => "history",
            Self::Prefs => "prefs",
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    db_url: String,
    user_id: Option<UserId>,
    questions: Option<PathBuf>,
    catalog: Option<PathBuf>,
    set_id: Option<String>,
    title: Option<String>,
    difficulty: Option<String>,
    limit: u32,
    sound: Option<bool>,
    haptics: Option<bool>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let user_id = match std::env::var("QUIZ_USER_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_user_id(raw)?),
            _ => None,
        };

        let mut parsed = Self {
            db_url,
            user_id,
            limit: DEFAULT_HISTORY_LIMIT,
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--user" => parsed.user_id = Some(parse_user_id(require_value(args, "--user")?)?),
                "--questions" => {
                    parsed.questions = Some(require_value(args, "--questions")?.into());
                }
                "--catalog" => parsed.catalog = Some(require_value(args, "--catalog")?.into()),
                "--set-id" => parsed.set_id = Some(require_value(args, "--set-id")?),
                "--title" => parsed.title = Some(require_value(args, "--title")?),
                "--difficulty" => parsed.difficulty = Some(require_value(args, "--difficulty")?),
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    parsed.limit = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                }
                "--sound" => parsed.sound = Some(parse_toggle("--sound", require_value(args, "--sound")?)?),
                "--haptics" => {
                    parsed.haptics =
                        Some(parse_toggle("--haptics", require_value(args, "--haptics")?)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn parse_user_id(raw: String) -> Result<UserId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidUserId { raw })
}

fn parse_toggle(flag: &'static str, raw: String) -> Result<bool, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(ArgsError::InvalidToggle { flag, raw }),
    }
}

fn require<T>(value: Option<T>, flag: &'static str, command: Command) -> Result<T, ArgsError> {
    value.ok_or(ArgsError::MissingFlag {
        flag,
        command: command.name(),
    })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// A question file is either a bare list or a named set.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionFile {
    Set(QuizSet),
    List(Vec<QuestionRecord>),
}

impl QuestionFile {
    fn into_questions(self) -> Vec<QuestionRecord> {
        match self {
            Self::Set(set) => set.questions,
            Self::List(questions) => questions,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    Ok(value)
}

fn session_deps(storage: &Storage, clock: Clock, user_id: UserId) -> SessionDeps {
    SessionDeps {
        clock,
        user: Arc::new(StaticUser::signed_in(user_id)),
        preferences: Arc::new(StoredPreferences::new(Arc::clone(&storage.settings))),
        feedback: Arc::new(TerminalFeedback),
        sink: Arc::new(HistoryResultSink::new(Arc::clone(&storage.history), clock)),
        notifications: Arc::new(StoredReminderCanceler::new(Arc::clone(&storage.settings))),
        presenter: Arc::new(TerminalPresenter),
    }
}

async fn play_session(
    config: QuizSessionConfig,
    deps: SessionDeps,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = spawn_session(QuizSession::new(config), deps);

    let input = TerminalInput::from_stdin();
    let confirmer = TerminalConfirmer::new(Arc::clone(&input));
    match terminal::play(&handle, &input, &confirmer).await? {
        SessionEnd::Completed(_) => {}
        SessionEnd::Abandoned => tracing::info!("player left the quiz"),
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let clock = Clock::default_clock();
    let user_id = match parsed.user_id {
        Some(id) => id,
        None => local_user_id(storage.settings.as_ref()).await?,
    };

    match cmd {
        Command::Play => {
            let path = require(parsed.questions, "--questions", cmd)?;
            let params = SessionParams {
                quiz_set_id: require(parsed.set_id, "--set-id", cmd)?,
                quiz_title: require(parsed.title, "--title", cmd)?,
                difficulty: parsed.difficulty,
                questions: read_json::<QuestionFile>(&path)?.into_questions(),
            };
            let config = QuizSessionConfig::new(params)?;
            play_session(config, session_deps(&storage, clock, user_id)).await
        }
        Command::Daily => {
            let path = require(parsed.catalog, "--catalog", cmd)?;
            let catalog: Vec<QuizSet> = read_json(&path)?;
            let daily = DailyQuizService::new(Arc::clone(&storage.history), clock);
            if daily.is_completed_today(user_id).await? {
                println!("You already played today's daily quiz. Come back tomorrow!");
                return Ok(());
            }
            let config = daily.prepare_today(&catalog)?;
            play_session(config, session_deps(&storage, clock, user_id)).await
        }
        Command::History => {
            let rows = storage.history.list_history(user_id, parsed.limit).await?;
            if rows.is_empty() {
                println!("No quizzes played yet.");
            }
            for row in rows {
                println!(
                    "{}  {:<32} {:>3}%  {:>4} XP  {:>4} s  {}",
                    row.date_taken,
                    row.quiz_title,
                    row.score,
                    row.xp,
                    row.time_taken_seconds,
                    row.difficulty
                );
            }
            Ok(())
        }
        Command::Prefs => {
            let prefs = StoredPreferences::new(Arc::clone(&storage.settings));
            if let Some(sound) = parsed.sound {
                prefs.set_sound_enabled(sound).await?;
            }
            if let Some(haptics) = parsed.haptics {
                prefs.set_haptics_enabled(haptics).await?;
            }
            let current = prefs.feedback_preferences().await?;
            println!(
                "sound: {}  haptics: {}",
                on_off(current.sound),
                on_off(current.haptics)
            );
            Ok(())
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
