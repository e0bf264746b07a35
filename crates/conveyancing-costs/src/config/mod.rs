use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API2PDF_BASE_URL: &str = "https://v2.api2pdf.com";
pub const DEFAULT_BREVO_BASE_URL: &str = "https://api.brevo.com";
pub const DEFAULT_SENDER_NAME: &str = "Bond Calculator";

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
    pub storage: StorageConfig,
    pub delivery: DeliveryConfig,
    pub admin: AdminConfig,
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

        let data_dir = non_empty_var("APP_DATA_DIR").map(PathBuf::from);

        let timeout_secs = env::var("APP_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let delivery = DeliveryConfig {
            api2pdf_base_url: non_empty_var("API2PDF_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API2PDF_BASE_URL.to_string()),
            api2pdf_api_key: non_empty_var("API2PDF_API_KEY"),
            brevo_base_url: non_empty_var("BREVO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BREVO_BASE_URL.to_string()),
            brevo_api_key: non_empty_var("BREVO_API_KEY"),
            sender_name: non_empty_var("APP_SENDER_NAME")
                .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
            sender_email: non_empty_var("APP_SENDER_EMAIL"),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig { data_dir },
            delivery,
            admin: AdminConfig {
                token: non_empty_var("APP_ADMIN_TOKEN"),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where cost tables and settings are persisted. `None` keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

/// Outbound provider endpoints and the credentials used to seed the settings record.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub api2pdf_base_url: String,
    pub api2pdf_api_key: Option<String>,
    pub brevo_base_url: String,
    pub brevo_api_key: Option<String>,
    pub sender_name: String,
    pub sender_email: Option<String>,
    pub timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            api2pdf_base_url: DEFAULT_API2PDF_BASE_URL.to_string(),
            api2pdf_api_key: None,
            brevo_base_url: DEFAULT_BREVO_BASE_URL.to_string(),
            brevo_api_key: None,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            sender_email: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Bearer token guarding the staff endpoints. Without one, staff endpoints refuse every caller.
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    pub token: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidTimeout,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidTimeout => {
                write!(f, "APP_HTTP_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_DATA_DIR",
            "APP_ADMIN_TOKEN",
            "APP_HTTP_TIMEOUT_SECS",
            "API2PDF_API_KEY",
            "API2PDF_BASE_URL",
            "BREVO_API_KEY",
            "BREVO_BASE_URL",
            "APP_SENDER_NAME",
            "APP_SENDER_EMAIL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.storage.data_dir.is_none());
        assert!(config.admin.token.is_none());
        assert_eq!(config.delivery.api2pdf_base_url, DEFAULT_API2PDF_BASE_URL);
        assert_eq!(config.delivery.brevo_base_url, DEFAULT_BREVO_BASE_URL);
        assert_eq!(config.delivery.sender_name, DEFAULT_SENDER_NAME);
        assert_eq!(config.delivery.timeout, Duration::from_secs(30));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn blank_credentials_are_treated_as_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("API2PDF_API_KEY", "   ");
        env::set_var("BREVO_API_KEY", "xkeysib-123");
        env::set_var("APP_ADMIN_TOKEN", "s3cret");
        let config = AppConfig::load().expect("config loads");
        assert!(config.delivery.api2pdf_api_key.is_none());
        assert_eq!(config.delivery.brevo_api_key.as_deref(), Some("xkeysib-123"));
        assert_eq!(config.admin.token.as_deref(), Some("s3cret"));
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HTTP_TIMEOUT_SECS", "0");
        let error = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(error, ConfigError::InvalidTimeout));
        reset_env();
    }
}
