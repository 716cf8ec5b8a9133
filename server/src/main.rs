//! Shoebox photo album server

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod albums;
mod api;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "shoebox")]
#[command(about = "Shoebox photo album server daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (runs in background)
    Serve {
        /// Run in foreground (don't daemonize)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the server
    Down,
    /// Show server status
    Status,
}

fn pid_file() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shoebox.pid")
}

fn is_server_running() -> Option<u32> {
    let pid_path = pid_file();
    if pid_path.exists() {
        if let Ok(pid_str) = fs::read_to_string(&pid_path) {
            if let Ok(pid) = pid_str.trim().parse::<u32>() {
                // Check if process is still running
                #[cfg(unix)]
                {
                    let result = Command::new("kill")
                        .args(["-0", &pid.to_string()])
                        .stdout(Stdio::null())
                        .stderr(Stdio::null())
                        .status();
                    if result.map(|s| s.success()).unwrap_or(false) {
                        return Some(pid);
                    }
                }
                #[cfg(not(unix))]
                {
                    return Some(pid);
                }
            }
        }
        // Stale pid file, remove it
        let _ = fs::remove_file(&pid_path);
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that don't need full init
    match &cli.command {
        Commands::Down => {
            return stop_server();
        }
        Commands::Status => {
            return show_status();
        }
        Commands::Serve { foreground } if !foreground => {
            return start_daemon();
        }
        _ => {}
    }

    // Initialize logging for the foreground server
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoebox=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { foreground: _ } => {
            run_server(config).await?;
        }
        Commands::Down | Commands::Status => unreachable!(),
    }

    Ok(())
}

fn start_daemon() -> anyhow::Result<()> {
    // Check if already running
    if let Some(pid) = is_server_running() {
        println!("shoebox already running (pid {})", pid);
        return Ok(());
    }

    // Re-exec ourselves detached, in foreground mode
    let exe = std::env::current_exe()?;
    let child = Command::new(&exe)
        .args(["serve", "--foreground"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let pid = child.id();

    let pid_path = pid_file();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, pid.to_string())?;

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    println!("shoebox serving on localhost:{}", config.rest_port);
    println!("pid: {}", pid);

    Ok(())
}

fn stop_server() -> anyhow::Result<()> {
    if let Some(pid) = is_server_running() {
        #[cfg(unix)]
        {
            Command::new("kill").args([&pid.to_string()]).status()?;
        }
        #[cfg(not(unix))]
        {
            Command::new("taskkill")
                .args(["/PID", &pid.to_string(), "/F"])
                .status()?;
        }

        let _ = fs::remove_file(pid_file());
        println!("shoebox stopped");
    } else {
        println!("shoebox not running");
    }
    Ok(())
}

fn show_status() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    if let Some(pid) = is_server_running() {
        println!("shoebox running");
        println!("  pid: {}", pid);
        println!("  rest: localhost:{}", config.rest_port);
        println!("  albums: {}", config.album_root);
    } else {
        println!("shoebox not running");
    }
    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    // Save PID for foreground mode too
    let pid_path = pid_file();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;

    // The album root is the sole durable store; make sure it exists before
    // the first request scans it.
    tokio::fs::create_dir_all(&config.album_root).await?;

    let store = albums::AlbumStore::new(&config.album_root);
    let app_state = api::AppState::new(store, config.clone());

    let rest_addr = format!("0.0.0.0:{}", config.rest_port).parse()?;
    tracing::info!(
        "{} serving albums from {} on {}",
        config.server_name,
        config.album_root,
        rest_addr
    );
    api::rest::serve(rest_addr, app_state).await?;

    // Cleanup PID file
    let _ = fs::remove_file(pid_file());

    Ok(())
}
