use std::env;
use std::fmt;

use chirpy_auth::jwt::DEFAULT_ACCESS_TOKEN_TTL_SECONDS;
use chirpy_auth::AccessTokenCodec;
use chirpy_auth::Authenticator;
use chirpy_auth::PasswordHasher;
use chirpy_auth::SigningSecret;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::session::service::DEFAULT_REFRESH_TOKEN_TTL_SECONDS;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub refresh_token: RefreshTokenConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub api_key: ApiKeyConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_access_token_ttl_seconds")]
    pub access_token_ttl_seconds: i64,
    #[serde(default)]
    pub enforce_issuer: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshTokenConfig {
    #[serde(default = "default_refresh_token_ttl_seconds")]
    pub ttl_seconds: i64,
}

/// Argon2id cost parameters. Defaults match the argon2 crate defaults.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

#[derive(Deserialize, Clone, Default)]
pub struct ApiKeyConfig {
    #[serde(default)]
    pub webhook_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

fn default_access_token_ttl_seconds() -> i64 {
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS
}

fn default_refresh_token_ttl_seconds() -> i64 {
    DEFAULT_REFRESH_TOKEN_TTL_SECONDS
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_ttl_seconds: default_access_token_ttl_seconds(),
            enforce_issuer: false,
        }
    }
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_refresh_token_ttl_seconds(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"..")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("enforce_issuer", &self.enforce_issuer)
            .finish()
    }
}

impl fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("webhook_key", &self.webhook_key.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CHIRPY_JWT__SECRET, CHIRPY_API_KEY__WEBHOOK_KEY, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: CHIRPY_JWT__SECRET=... overrides jwt.secret
            .add_source(
                Environment::with_prefix("CHIRPY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.access_token_ttl()?;
        config.refresh_token_ttl()?;

        Ok(config)
    }

    /// Signing secret for access tokens.
    ///
    /// # Errors
    /// * `Message` - `jwt.secret` is empty
    pub fn signing_secret(&self) -> Result<SigningSecret, ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }
        Ok(SigningSecret::new(self.jwt.secret.as_bytes()))
    }

    /// # Errors
    /// * `Message` - `jwt.access_token_ttl_seconds` is not positive or out of range
    pub fn access_token_ttl(&self) -> Result<Duration, ConfigError> {
        positive_ttl("jwt.access_token_ttl_seconds", self.jwt.access_token_ttl_seconds)
    }

    /// # Errors
    /// * `Message` - `refresh_token.ttl_seconds` is not positive or out of range
    pub fn refresh_token_ttl(&self) -> Result<Duration, ConfigError> {
        positive_ttl("refresh_token.ttl_seconds", self.refresh_token.ttl_seconds)
    }

    /// Password hasher using the configured cost.
    ///
    /// # Errors
    /// * `Message` - Cost parameters are out of range
    pub fn password_hasher(&self) -> Result<PasswordHasher, ConfigError> {
        PasswordHasher::with_params(
            self.password.memory_kib,
            self.password.iterations,
            self.password.parallelism,
        )
        .map_err(|e| ConfigError::Message(e.to_string()))
    }

    pub fn access_token_codec(&self) -> AccessTokenCodec {
        let codec = AccessTokenCodec::new();
        if self.jwt.enforce_issuer {
            codec.with_issuer_check()
        } else {
            codec
        }
    }

    /// Authenticator assembled from the jwt and password sections.
    ///
    /// # Errors
    /// * `Message` - Empty secret or invalid cost parameters
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        Ok(Authenticator::new(self.signing_secret()?)
            .with_password_hasher(self.password_hasher()?)
            .with_codec(self.access_token_codec())
            .with_access_token_ttl(self.access_token_ttl()?))
    }
}

/// Upper bound for configured lifetimes: ten years.
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

fn positive_ttl(key: &str, seconds: i64) -> Result<Duration, ConfigError> {
    if seconds <= 0 || seconds > MAX_TTL_SECONDS {
        return Err(ConfigError::Message(format!(
            "{} must be between 1 and {}, got {}",
            key, MAX_TTL_SECONDS, seconds
        )));
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| ConfigError::Message(format!("{} is out of range", key)))
}
