// Client configuration loaded from the environment
// Read once at startup, after `.env` has been loaded

use reqwest::Url;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_SESSION_FILE: &str = ".trek-session.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors raised while reading the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("Invalid environment '{0}': expected 'development' or 'production'")]
    InvalidEnvironment(String),

    #[error("Invalid request timeout '{0}': expected a whole number of seconds")]
    InvalidTimeout(String),
}

/// Deployment environment of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Parse an environment flag, accepting the usual short forms
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidEnvironment(value.to_string())),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings shared by the HTTP wrapper and the session store
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub environment: Environment,
    pub session_file: PathBuf,
    /// `None` disables the default per-request timeout
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Build a configuration for the given base URL with default settings
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            environment: Environment::default(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Read the configuration from process environment variables
    ///
    /// Recognized variables:
    /// - `TREK_API_URL`
    /// - `TREK_ENV`
    /// - `TREK_SESSION_FILE`
    /// - `TREK_REQUEST_TIMEOUT_SECS` (0 disables the timeout)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but with an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("TREK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&api_url)?;

        if let Some(env) = lookup("TREK_ENV") {
            config.environment = Environment::parse(&env)?;
        }

        if let Some(path) = lookup("TREK_SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }

        if let Some(raw) = lookup("TREK_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        tracing::debug!(
            "Loaded client config: api={}, env={}, session_file={}",
            config.api_base_url,
            config.environment,
            config.session_file.display()
        );

        Ok(config)
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}
