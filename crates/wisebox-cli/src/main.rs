use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use wisebox_client::gemini::DEFAULT_MODEL;
use wisebox_client::gemini::GeminiSession;
use wisebox_core::config::Config;
use wisebox_core::state::ChatState;

mod ui;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let options = match parse_args(env::args().skip(1).collect())? {
        Parsed::Run(options) => options,
        Parsed::Help => {
            print_help();
            return Ok(());
        }
        Parsed::Version => {
            println!("wisebox {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    let _log_guard = init_logging()?;

    let config = load_config(&config_path());
    let model = options
        .model
        .or(config.model.default_model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
        "GEMINI_API_KEY is not set; export it or add it to a .env file in the working directory"
    })?;

    tracing::info!(%model, "starting session");
    let session = GeminiSession::new(api_key, model);
    let state = ChatState::new();
    ui::run(state, session)
}

struct RunOptions {
    model: Option<String>,
}

enum Parsed {
    Run(RunOptions),
    Help,
    Version,
}

fn parse_args(args: Vec<String>) -> Result<Parsed, Box<dyn std::error::Error>> {
    let mut model = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" | "help" => return Ok(Parsed::Help),
            "--version" | "-V" | "version" => return Ok(Parsed::Version),
            "--model" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--model requires a name".into());
                };
                model = Some(value.clone());
                i += 2;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    Ok(Parsed::Run(RunOptions { model }))
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wisebox")
        .join("config.toml")
}

/// Missing or unreadable config is not fatal; the defaults are fine.
fn load_config(path: &Path) -> Config {
    let Ok(raw) = fs::read_to_string(path) else {
        return Config::default();
    };
    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring malformed config");
            Config::default()
        }
    }
}

/// File logging only; stderr belongs to the TUI.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>>
{
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wisebox");
    fs::create_dir_all(&log_dir)?;
    let appender = tracing_appender::rolling::never(&log_dir, "wisebox.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn print_help() {
    println!("wisebox {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  wisebox [--model NAME]");
    println!("  wisebox --help");
    println!("  wisebox --version");
    println!();
    println!("Requires GEMINI_API_KEY in the environment or a .env file.");
}
