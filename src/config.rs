use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        api_url: get_env_or_default("FACSEARCH_API_URL", DEFAULT_API_URL),
        bind_addr: get_env_or_default("FACSEARCH_BIND", DEFAULT_BIND_ADDR),
        timeout_secs: parse_env_or_default("FACSEARCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        catalog_path: get_env_opt("FACSEARCH_CATALOG").map(PathBuf::from),
        log_level: parse_env_or_default("FACSEARCH_LOG", tracing::Level::INFO),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the search API; `/api/search` is resolved against it.
    pub api_url: String,
    pub bind_addr: String,
    pub timeout_secs: u64,
    /// JSON school -> departments table; the builtin table when unset.
    pub catalog_path: Option<PathBuf>,
    pub log_level: tracing::Level,
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env_opt(key).unwrap_or_else(|| default.to_string())
}

// Runs before the subscriber is installed, so bad values go to stderr.
fn parse_env_or_default<T: FromStr>(key: &str, default: T) -> T {
    match get_env_opt(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            eprintln!("ignoring invalid {key}={raw:?}, using the default");
            default
        }),
    }
}
