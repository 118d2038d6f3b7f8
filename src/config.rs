//! Configuration loaded once at startup and handed to constructors.

use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 60 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("media service credentials are not set")]
    MediaCredentialsMissing,
}

/// Account credentials for the media-processing service.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for MediaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct MediaServiceConfig {
    /// `None` when any of the three credential variables is absent or blank.
    pub credentials: Option<MediaCredentials>,
    /// Upload API, e.g. `https://api.cloudinary.com`
    pub api_base: String,
    /// Delivery host for transformed assets, e.g. `https://res.cloudinary.com`
    pub delivery_base: String,
    pub timeout: Duration,
}

impl MediaServiceConfig {
    pub fn credentials(&self) -> Result<&MediaCredentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::MediaCredentialsMissing)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityKey {
    /// PEM-encoded RSA public key (RS256).
    RsaPem(String),
    /// Shared secret (HS256).
    Secret(String),
}

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub key: Option<IdentityKey>,
    pub issuer: Option<String>,
    pub sign_in_url: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Largest accepted upload body, also advertised to clients
    pub max_upload_bytes: usize,
    pub media: MediaServiceConfig,
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Load configuration from `.env` and environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let credentials = match (
            non_blank("CLOUDINARY_CLOUD_NAME"),
            non_blank("CLOUDINARY_API_KEY"),
            non_blank("CLOUDINARY_SECRET_KEY"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(MediaCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        let identity_key = match (
            non_blank("IDENTITY_JWT_PUBLIC_KEY"),
            non_blank("IDENTITY_JWT_SECRET"),
        ) {
            (Some(pem), _) => Some(IdentityKey::RsaPem(pem.replace("\\n", "\n"))),
            (None, Some(secret)) => Some(IdentityKey::Secret(secret)),
            (None, None) => None,
        };

        Ok(Self {
            addr: non_blank("ADDR").unwrap_or_else(|| String::from("127.0.0.1")),
            port: non_blank("PORT").unwrap_or_else(|| String::from("3000")),
            database_url: non_blank("DATABASE_URL"),
            database_max_connections: parse_number(
                "DATABASE_MAX_CONNECTIONS",
                non_blank("DATABASE_MAX_CONNECTIONS"),
                5,
            )?,
            max_upload_bytes: parse_number(
                "MAX_UPLOAD_BYTES",
                non_blank("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            media: MediaServiceConfig {
                credentials,
                api_base: non_blank("CLOUDINARY_API_BASE")
                    .unwrap_or_else(|| String::from("https://api.cloudinary.com")),
                delivery_base: non_blank("CLOUDINARY_DELIVERY_BASE")
                    .unwrap_or_else(|| String::from("https://res.cloudinary.com")),
                timeout: Duration::from_secs(parse_number(
                    "MEDIA_UPLOAD_TIMEOUT_SECS",
                    non_blank("MEDIA_UPLOAD_TIMEOUT_SECS"),
                    300,
                )?),
            },
            identity: IdentityConfig {
                key: identity_key,
                issuer: non_blank("IDENTITY_JWT_ISSUER"),
                sign_in_url: non_blank("SIGN_IN_URL").unwrap_or_else(|| String::from("/sign-in")),
            },
        })
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn parse_number<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(parsed),
            _ => Err(ConfigError::InvalidNumber { name, value: raw }),
        },
    }
}
