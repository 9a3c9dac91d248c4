//! wikiguard: inspect the security decisions of a file-backed wiki.
//!
//! Resolves URL paths against a content root, reports the read/write/delete
//! verdicts an anonymous or authenticated caller would get, performs
//! access-checked file operations, and replays login attempts through the
//! throttle to tune its delay steps.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::GuardConfig;
use std::path::PathBuf;
use tracing::error;
use wikiguard_core::GuardError;

/// wikiguard: access decisions for a file-backed wiki
#[derive(Parser, Debug)]
#[command(name = "wikiguard", version, about = "Path confinement, access checks and login throttling for a file-backed wiki")]
struct Cli {
    /// Config file path
    #[arg(long, global = true, default_value = "~/.wikiguard/config.toml")]
    config: String,

    /// Content root (overrides the config file)
    #[arg(short, long, global = true)]
    root: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the filesystem path a URL path resolves to
    Resolve {
        /// URL path, e.g. /docs/setup
        path: String,
    },

    /// Print read/write/delete verdicts for a URL path
    Access {
        path: String,
        /// Evaluate as an authenticated caller
        #[arg(long)]
        authenticated: bool,
    },

    /// Print the content behind a URL path
    Read {
        path: String,
        #[arg(long)]
        authenticated: bool,
    },

    /// Write stdin to the file behind a URL path
    Write {
        path: String,
        #[arg(long)]
        authenticated: bool,
    },

    /// Delete the file behind a URL path
    Delete {
        path: String,
        #[arg(long)]
        authenticated: bool,
    },

    /// Replay login attempts and print the delay each one would get
    Throttle {
        #[arg(long, default_value = "user")]
        user: String,
        #[arg(long, default_value = "127.0.0.1")]
        addr: String,
        /// Number of attempts to replay
        #[arg(long, default_value_t = 10)]
        attempts: u32,
        /// Replay successful instead of failed attempts
        #[arg(long)]
        success: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    use tracing_subscriber::EnvFilter;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match GuardConfig::load(&PathBuf::from(&cli.config), cli.root.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "failed to load config");
            eprintln!("wikiguard: {e:#}");
            std::process::exit(1);
        }
    };

    let json = cli.json;
    let result = match cli.command {
        Command::Resolve { path } => commands::resolve::run(&config, &path, json),
        Command::Access {
            path,
            authenticated,
        } => commands::access::run(&config, &path, authenticated, json),
        Command::Read {
            path,
            authenticated,
        } => commands::content::run_read(&config, &path, authenticated),
        Command::Write {
            path,
            authenticated,
        } => commands::content::run_write(&config, &path, authenticated),
        Command::Delete {
            path,
            authenticated,
        } => commands::content::run_delete(&config, &path, authenticated),
        Command::Throttle {
            user,
            addr,
            attempts,
            success,
        } => commands::throttle::run(&config, &user, &addr, attempts, success, json).await,
    };

    if let Err(e) = result {
        eprintln!("wikiguard: {e:#}");
        std::process::exit(exit_code(&e));
    }
}

/// 2 for not-found, 3 for access-denied, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<GuardError>() {
        Some(GuardError::NotFound(_)) => 2,
        Some(GuardError::AccessDenied(_)) => 3,
        _ => 1,
    }
}
