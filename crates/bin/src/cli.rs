//! CLI argument definitions for the yagogame binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Identity store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Users file in the data directory (default)
    File,
    /// SQLite database in the data directory
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// In-memory only; users are lost on restart
    Inmemory,
}

/// yagogame identity server
#[derive(Parser, Debug)]
#[command(name = "yagogame")]
#[command(about = "yagogame: identity directory and credential gate for the game server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the server
    Serve(ServeArgs),
    /// Show the configured backend and how many users it holds
    Info(InfoArgs),
    /// Check health of a running server
    Health(HealthArgs),
}

/// Backend selection shared by the commands that open a store
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "file", env = "YAGOGAME_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For File: stores users.json
    /// For SQLite: stores users.db
    #[arg(short = 'D', long, env = "YAGOGAME_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Users file for the file backend, overriding <data-dir>/users.json
    #[arg(long, env = "YAGOGAME_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "YAGOGAME_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 7777, env = "YAGOGAME_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "localhost", env = "YAGOGAME_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,
}

/// Arguments for the info command
#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:7777", env = "YAGOGAME_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
