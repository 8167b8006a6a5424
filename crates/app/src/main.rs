use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use phrase_core::model::UnitStep;
use services::{AppServices, Location, MemoryHistory, SpeechCapability, StudyError, StudyService};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;
mod seed;

use commands::Input;
use console::ConsoleSpeech;

const DEFAULT_DATA_DIR: &str = "./public";
const DEFAULT_DB_URL: &str = "sqlite://flash-phrase.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDataDir { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDataDir { raw } => write!(f, "invalid --data value: {raw}"),
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

struct Args {
    data_dir: PathBuf,
    db_url: Option<String>,
    open: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  flash-phrase ui   [--data <dir>] [--db <sqlite_url> | --memory] [--open <fragment>]");
    eprintln!("  flash-phrase seed [--data <dir>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data {DEFAULT_DATA_DIR}");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLASH_PHRASE_DATA, FLASH_PHRASE_DB, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut data_dir = std::env::var("FLASH_PHRASE_DATA")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);
        let mut db_url = Some(
            std::env::var("FLASH_PHRASE_DB")
                .ok()
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
        );
        let mut open = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data" => {
                    let value = require_value(args, "--data")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDataDir { raw: value });
                    }
                    data_dir = PathBuf::from(value);
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--memory" => db_url = None,
                "--open" => {
                    let value = require_value(args, "--open")?;
                    open = Some(if value.starts_with('#') {
                        value
                    } else {
                        format!("#{value}")
                    });
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            data_dir,
            db_url,
            open,
        })
    }
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
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file exists so the pool can open it.
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

    let path = std::path::Path::new(path);
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

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means the study loop.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    match cmd {
        Command::Ui => run_ui(parsed).await,
        Command::Seed => {
            let written = seed::write_samples(&parsed.data_dir).await?;
            info!(written, data_dir = %parsed.data_dir.display(), "seed complete");
            Ok(())
        }
    }
}

async fn run_ui(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let services = match &args.db_url {
        Some(db_url) => {
            prepare_sqlite_file(db_url)?;
            AppServices::new_sqlite(db_url, args.data_dir.clone()).await?
        }
        None => AppServices::in_memory(args.data_dir.clone()).await?,
    };
    info!(data_dir = %services.data_dir().display(), "phrase data directory");

    let history = MemoryHistory::new(args.open.unwrap_or_else(|| "#/".to_owned()));
    let speech: Arc<dyn SpeechCapability> = Arc::new(ConsoleSpeech::new());
    let (mut study, mut events) = services.into_study(speech, history);

    if let Err(err) = study.initialize().await {
        println!("! {err}");
    }
    println!("{}", console::render(&study));
    println!("(type `help` for commands)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Input::parse(&line) {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => console::print_help(),
                    Ok(input) => {
                        if let Err(err) = apply(&mut study, input).await {
                            println!("! {err}");
                        }
                        drain_location(&mut study).await;
                        println!("{}", console::render(&study));
                    }
                    Err(err) => println!("! {err}"),
                }
            }
            Some(event) = events.recv() => {
                if study.handle_autoplay_event(event) {
                    println!("{}", console::render(&study));
                }
            }
        }
    }

    study.stop_autoplay();
    info!(fragment = %study.location().fragment(), "leaving");
    Ok(())
}

async fn apply(
    study: &mut StudyService<MemoryHistory>,
    input: Input,
) -> Result<(), StudyError> {
    match input {
        Input::Help | Input::Quit => {}
        Input::Home => study.return_to_picker(),
        Input::Study {
            selector,
            direction,
        } => study.select_unit(selector, direction).await?,
        Input::List(unit) => study.open_unit_listing(unit).await?,
        Input::Advance => {
            study.advance()?;
        }
        Input::Retreat => {
            if !study.retreat()? {
                println!("(already at the first card)");
            }
        }
        Input::Shuffle => {
            study.toggle_shuffle();
        }
        Input::Play => {
            if !study.start_autoplay()? {
                println!("(autoplay is already running)");
            }
        }
        Input::Stop => {
            study.stop_autoplay();
        }
        Input::Skip => {
            study.skip_autoplay();
        }
        Input::Back => {
            if !study.location_mut().back() {
                println!("(no earlier page)");
            }
        }
        Input::Forward => {
            if !study.location_mut().forward() {
                println!("(no later page)");
            }
        }
        Input::PreviousUnit => step_unit(study, UnitStep::Previous).await?,
        Input::NextUnit => step_unit(study, UnitStep::Next).await?,
        Input::ToggleEnglish => {
            study.toggle_listing_answer();
        }
        Input::ToggleJapanese => {
            study.toggle_listing_prompt();
        }
        Input::SayPrompt => report_silent(study.speak_prompt()),
        Input::SayAnswer => report_silent(study.speak_answer()),
        Input::SayRow { row, language } => report_silent(study.speak_listing_row(row, language)),
        Input::Settings => study.open_settings(),
        Input::Close => study.close_settings(),
        Input::Set(patch) => {
            study.update_settings(patch).await?;
        }
        Input::Reset => {
            study.reset_settings().await?;
        }
    }
    Ok(())
}

async fn step_unit<L: Location>(
    study: &mut StudyService<L>,
    step: UnitStep,
) -> Result<(), StudyError> {
    if study.navigate_unit(step).await?.is_none() {
        println!("(no more units in that direction)");
    }
    Ok(())
}

fn report_silent(spoken: bool) {
    if !spoken {
        println!("(nothing to speak)");
    }
}

/// Deliver queued location changes, including the ones restoring causes.
async fn drain_location(study: &mut StudyService<MemoryHistory>) {
    loop {
        let changes = study.location_mut().take_changes();
        if changes.is_empty() {
            break;
        }
        for change in changes {
            if let Err(err) = study.handle_location_change(&change).await {
                warn!(error = %err, fragment = %change, "location change not applied");
                println!("! {err}");
            }
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
