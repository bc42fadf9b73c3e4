use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use mime::Mime;

use crate::workflows::intake::{
    AttachmentPolicy, OptionCatalogs, DEFAULT_MAX_ATTACHMENT_BYTES, OTHERS_OPTION,
};

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
    pub intake: IntakeConfig,
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
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            intake: IntakeConfig::load()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output, enabled in development.
    pub ansi: bool,
}

/// Attachment limits and option catalogs for the intake wizard.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub max_attachment_bytes: u64,
    pub accepted_media_types: Vec<Mime>,
    pub catalogs: OptionCatalogs,
}

impl IntakeConfig {
    fn load() -> Result<Self, ConfigError> {
        let max_attachment_bytes = match env::var("INTAKE_MAX_ATTACHMENT_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidAttachmentLimit)?,
            Err(_) => DEFAULT_MAX_ATTACHMENT_BYTES,
        };

        let accepted_media_types = match env::var("INTAKE_ACCEPTED_MEDIA_TYPES") {
            Ok(raw) => parse_media_types(&raw)?,
            Err(_) => AttachmentPolicy::default().accepted().to_vec(),
        };

        let reference = OptionCatalogs::reference();
        let purposes = catalog_from_env("INTAKE_PURPOSE_OPTIONS", reference.purposes)?;
        let professions = catalog_from_env("INTAKE_PROFESSION_OPTIONS", reference.professions)?;

        Ok(Self {
            max_attachment_bytes,
            accepted_media_types,
            catalogs: OptionCatalogs {
                purposes,
                professions,
            },
        })
    }

    pub fn attachment_policy(&self) -> AttachmentPolicy {
        AttachmentPolicy::new(self.max_attachment_bytes, self.accepted_media_types.clone())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_media_types(raw: &str) -> Result<Vec<Mime>, ConfigError> {
    let parsed = split_list(raw)
        .map(|value| {
            value
                .parse::<Mime>()
                .map_err(|_| ConfigError::InvalidMediaType {
                    value: value.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if parsed.is_empty() {
        return Err(ConfigError::EmptyList {
            name: "INTAKE_ACCEPTED_MEDIA_TYPES",
        });
    }
    Ok(parsed)
}

/// Comma-separated catalog override. "Others" is always offered last.
fn catalog_from_env(name: &'static str, fallback: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(fallback);
    };

    let mut options: Vec<String> = Vec::new();
    for value in split_list(&raw) {
        if value != OTHERS_OPTION && !options.iter().any(|known| known == value) {
            options.push(value.to_string());
        }
    }
    if options.is_empty() {
        return Err(ConfigError::EmptyList { name });
    }
    options.push(OTHERS_OPTION.to_string());
    Ok(options)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAttachmentLimit,
    InvalidMediaType { value: String },
    EmptyList { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAttachmentLimit => {
                write!(f, "INTAKE_MAX_ATTACHMENT_BYTES must be a positive integer")
            }
            ConfigError::InvalidMediaType { value } => {
                write!(f, "'{}' is not a valid media type", value)
            }
            ConfigError::EmptyList { name } => write!(f, "{} must list at least one value", name),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidAttachmentLimit
            | ConfigError::InvalidMediaType { .. }
            | ConfigError::EmptyList { .. } => None,
        }
    }
}
