use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ai: AiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ai: AiConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Completion provider and evaluation pacing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub batch_delay: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 4000,
            max_attempts: 3,
            retry_delay: Duration::from_millis(2000),
            batch_delay: Duration::from_millis(1000),
        }
    }
}

impl AiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_key = env::var("GROQ_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let base_url = env::var("GROQ_BASE_URL").unwrap_or(defaults.base_url);
        let model = env::var("AI_MODEL").unwrap_or(defaults.model);

        let temperature = match env::var("AI_TEMPERATURE") {
            Ok(raw) => raw
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| (0.0..=2.0).contains(value))
                .ok_or(ConfigError::InvalidNumber {
                    variable: "AI_TEMPERATURE",
                    value: raw,
                })?,
            Err(_) => defaults.temperature,
        };

        let max_tokens = parse_u64("AI_MAX_TOKENS", u64::from(defaults.max_tokens))? as u32;
        let max_attempts = parse_u64("AI_MAX_ATTEMPTS", u64::from(defaults.max_attempts))? as u32;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "AI_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        let retry_delay = Duration::from_millis(parse_u64(
            "AI_RETRY_DELAY_MS",
            defaults.retry_delay.as_millis() as u64,
        )?);
        let batch_delay = Duration::from_millis(parse_u64(
            "AI_BATCH_DELAY_MS",
            defaults.batch_delay.as_millis() as u64,
        )?);

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature,
            max_tokens,
            max_attempts,
            retry_delay,
            batch_delay,
        })
    }
}

fn parse_u64(variable: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map(u64::from)
            .map_err(|_| ConfigError::InvalidNumber {
                variable,
                value: raw,
            }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} has an invalid value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
