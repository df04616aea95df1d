use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::renewals::NotifyWindow;

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
    pub notify: NotifyWindow,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("RENEWDESK_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("RENEWDESK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("RENEWDESK_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("RENEWDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut notify = NotifyWindow::default();
        notify.due_soon_days = day_window("RENEWDESK_DUE_SOON_DAYS", notify.due_soon_days)?;
        notify.installment_expiry_days = day_window(
            "RENEWDESK_INSTALLMENT_EXPIRY_DAYS",
            notify.installment_expiry_days,
        )?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            notify,
        })
    }
}

fn day_window(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let days = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidWindow { name })?;
            if days < 0 {
                return Err(ConfigError::InvalidWindow { name });
            }
            Ok(days)
        }
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWindow { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "RENEWDESK_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "RENEWDESK_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWindow { name } => {
                write!(f, "{name} must be a non-negative whole number of days")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidWindow { .. } => None,
        }
    }
}
