use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::mpsc;

use newsdigest::app::{App, AppEvent};
use newsdigest::config::{Config, API_URL_ENV};
use newsdigest::session::{EndReason, SessionStore};
use newsdigest::storage::{Database, DatabaseError};
use newsdigest::ui;

/// Get the config directory path (~/.config/newsdigest/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("newsdigest"))
}

#[derive(Parser, Debug)]
#[command(name = "newsdigest", about = "Terminal client for an AI news digest service")]
struct Args {
    /// Backend API root (overrides config file and environment)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Config file (default: ~/.config/newsdigest/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Forget the stored credential and exit
    #[arg(long)]
    logout: bool,
}

/// Log to a file: the terminal belongs to the UI.
fn init_tracing(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("newsdigest.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // User-only access: the directory holds the credential store
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700)) {
            eprintln!(
                "Warning: failed to set permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }

    init_tracing(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?
        .with_overrides(std::env::var(API_URL_ENV).ok(), args.api_url.clone());
    config.validate().context("Invalid configuration")?;

    let db_path = config_dir.join("state.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!("Error: Another instance of newsdigest appears to be running. Please close it and try again.");
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    if args.logout {
        let mut session = SessionStore::new(db);
        session.end(EndReason::Logout).await;
        println!("Signed out.");
        return Ok(());
    }

    tracing::info!(api_url = %config.api_url, "Starting newsdigest");
    let mut app = App::new(config, db).context("Failed to create application")?;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
