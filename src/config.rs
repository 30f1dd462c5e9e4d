use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Freedom";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title shown at the top of the interactive surface.
pub const APP_TITLE: &str = "Project: Freedom";

/// Opening line shown to every new session.
pub const GREETING: &str = "Hello! I am Freedom, your personal Data Science tutor powered by Gemini. \
How may I assist you today?";

/// Usage hints shown next to the history panel.
pub const INSTRUCTIONS: &[&str] = &[
    "Upload a file (image, PDF, or Word document) to analyze its content.",
    "Or enter a Data Science topic to receive a detailed explanation.",
    "View query history in the sidebar.",
];

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
/// Sessions untouched for this long are dropped with their history: 15 minutes.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 900;

const ENV_API_KEY: &str = "GOOGLE_API_KEY";
const ENV_MODEL: &str = "FREEDOM_MODEL";
const ENV_GEMINI_URL: &str = "FREEDOM_GEMINI_URL";
const ENV_TIMEOUT: &str = "FREEDOM_REQUEST_TIMEOUT_SECS";
const ENV_BIND_ADDR: &str = "FREEDOM_BIND_ADDR";
const ENV_SESSION_IDLE: &str = "FREEDOM_SESSION_IDLE_SECS";

/// Default `EnvFilter` directive when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "freedom_lib=info,freedom=info,tower_http=warn"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API key not found. Set GOOGLE_API_KEY in the environment or a .env file.")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub gemini_url: String,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::MissingApiKey)?;

        let request_timeout = positive_secs(ENV_TIMEOUT, get(ENV_TIMEOUT), DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let session_idle_timeout =
            positive_secs(ENV_SESSION_IDLE, get(ENV_SESSION_IDLE), DEFAULT_SESSION_IDLE_SECS)?;

        let bind_raw = get(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                name: ENV_BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        Ok(Self {
            api_key,
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_url: get(ENV_GEMINI_URL).unwrap_or_else(|| DEFAULT_GEMINI_URL.to_string()),
            request_timeout,
            bind_addr,
            session_idle_timeout,
        })
    }
}

/// Whole seconds, strictly positive.
fn positive_secs(
    name: &'static str,
    raw: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidValue { name, value: raw }),
        },
        None => Ok(Duration::from_secs(default)),
    }
}
