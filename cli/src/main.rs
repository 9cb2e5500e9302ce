//! Yuri CLI - line-oriented chat loop over a sliding-injection [`Session`].
//!
//! ```text
//! main() -> YuriConfig -> OllamaBackend + Session -> stdin loop
//!                                                      |
//!                                                      v
//!                                     "AI: <think>\n..." | error line
//! ```
//!
//! Errors from a single exchange are printed and the loop continues. Nothing
//! is retried automatically.

use anyhow::{Context, Result};
use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use yuri_engine::{ChatBackend, OllamaBackend, Session, SessionOptions, YuriConfig};

const EXIT_COMMANDS: [&str; 3] = ["exit", "quit", "退出"];
const LOG_FILE_NAME: &str = "yuri.log";

/// Route tracing to a log file. Stdout carries the conversation itself, so
/// when no file can be opened the subscriber gets no writer at all.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match open_log_file() {
        Ok((path, file, skipped)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
            for reason in skipped {
                tracing::warn!("Skipped log location: {reason}");
            }
        }
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

/// First log location that can be opened for append, plus why earlier ones were skipped.
fn open_log_file() -> Result<(PathBuf, File, Vec<String>), Vec<String>> {
    let mut skipped = Vec::new();

    for path in log_locations() {
        let opened = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
        match opened {
            Ok(file) => return Ok((path, file, skipped)),
            Err(e) => skipped.push(format!("{}: {e}", path.display())),
        }
    }

    Err(skipped)
}

/// `logs/` next to the config file, then `./.yuri/logs/` for sandboxes without a home dir.
fn log_locations() -> Vec<PathBuf> {
    let beside_config = yuri_engine::config_path()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join("logs").join(LOG_FILE_NAME));
    let local = PathBuf::from(".yuri").join("logs").join(LOG_FILE_NAME);

    beside_config.into_iter().chain([local]).collect()
}

/// What to do with one line read from stdin.
#[derive(Debug, PartialEq, Eq)]
enum LineAction<'a> {
    Skip,
    Exit,
    /// The line exactly as typed, without its line terminator.
    Send(&'a str),
}

fn classify_line(line: &str) -> LineAction<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        LineAction::Skip
    } else if EXIT_COMMANDS
        .iter()
        .any(|cmd| trimmed.eq_ignore_ascii_case(cmd))
    {
        LineAction::Exit
    } else {
        LineAction::Send(line)
    }
}

async fn run_loop<B: ChatBackend>(session: &mut Session<B>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    loop {
        write!(stdout, "User: ")?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = match classify_line(&line) {
            LineAction::Skip => continue,
            LineAction::Exit => break,
            LineAction::Send(input) => input,
        };

        match session.chat(input).await {
            Ok(reply) => writeln!(stdout, "AI: {reply}")?,
            Err(e) => {
                tracing::warn!(error = %e, "Exchange failed");
                writeln!(stdout, "Error: {e}")?;
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let config = YuriConfig::load()
        .context("failed to load config")?
        .unwrap_or_default();

    let backend = OllamaBackend::new(&config.ollama_base_url(), config.ollama_timeout_secs())
        .context("failed to build HTTP client")?;
    let options = SessionOptions::from_config(&config).context("invalid config")?;
    let mut session = Session::new(options, backend).context("failed to start session")?;

    if let Some(locator) = session.locator() {
        println!("History: {}", locator.display());
    }

    let result = run_loop(&mut session).await;
    tracing::info!(turns = session.history().len(), "Session ended");
    result
}
