use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const PUBLIC_URL_ENV: &str = "BURROW_PUBLIC_URL";
pub const SEED_ENV: &str = "BURROW_SEED";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_STORAGE";
pub const DB_PATH_ENV: &str = "BURROW_DB_PATH";
pub const DATA_DIR_ENV: &str = "BURROW_DATA_DIR";
pub const MAX_ATTEMPTS_ENV: &str = "BURROW_MAX_ATTEMPTS";
pub const COPY_ENV: &str = "BURROW_COPY";
pub const DEMO_ENV: &str = "BURROW_DEMO";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "sqlite")]
    Sqlite,
    #[value(name = "files")]
    Files,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Sqlite => write!(f, "sqlite"),
            StorageBackendArg::Files => write!(f, "files"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "burrow", about = "A small URL shortener")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base URL short links are served under. Defaults to `http://<listen-addr>`.
    #[arg(long, env = PUBLIC_URL_ENV)]
    pub public_url: Option<String>,

    /// Secret mixed into every deletion credential.
    #[arg(long, env = SEED_ENV, hide_env_values = true)]
    pub seed: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Sqlite
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DB_PATH_ENV, required_if_eq("storage", "sqlite"))]
    pub db_path: Option<PathBuf>,

    #[arg(long, env = DATA_DIR_ENV, required_if_eq("storage", "files"))]
    pub data_dir: Option<PathBuf>,

    /// How many tokens to try before giving up on a generated link.
    #[arg(long, env = MAX_ATTEMPTS_ENV, default_value_t = burrow_registry::config::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Extra text appended to the index page.
    #[arg(long, env = COPY_ENV)]
    pub copy: Option<String>,

    /// Mark the instance as a demo on the index page.
    #[arg(long, env = DEMO_ENV)]
    pub demo: bool,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CLI {
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.listen_addr))
    }
}
