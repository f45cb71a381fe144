/**
 * Application Configuration
 * Built once from the environment at startup and passed down explicitly.
 */
use chrono::Duration;

use crate::db::DbConfig;

/// Fallback secret for local development only.
pub const DEV_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

/// Default token lifetime (30 days).
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 30;

/// Signing key and lifetime for identity tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

/// Credentials for the admin account seeded at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: AdminPassword,
}

/// Either an already-hashed password or a plain one still to be hashed.
#[derive(Debug, Clone)]
pub enum AdminPassword {
    Hash(String),
    Plain(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    pub bcrypt_cost: u32,
    pub database: Option<DbConfig>,
    pub admin: Option<AdminSeed>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a secure, unique value in production")]
    InsecureSecret,

    #[error("invalid value for {0}")]
    Invalid(&'static str),
}

fn env_parse<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key)),
        _ => Ok(None),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_string("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let secret = env_string("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());
        if environment == "production" && secret == DEV_JWT_SECRET {
            return Err(ConfigError::InsecureSecret);
        }

        let ttl_hours = env_parse::<i64>("JWT_TTL_HOURS")?.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        if ttl_hours <= 0 {
            return Err(ConfigError::Invalid("JWT_TTL_HOURS"));
        }

        let bcrypt_cost = env_parse::<u32>("BCRYPT_COST")?.unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        let database = env_string("DATABASE_URL").map(|_| DbConfig::default());

        let admin = match (env_string("ADMIN_USERNAME"), env_string("ADMIN_EMAIL")) {
            (Some(username), Some(email)) => {
                let password = if let Some(hash) = env_string("ADMIN_PASSWORD_HASH") {
                    Some(AdminPassword::Hash(hash))
                } else {
                    env_string("ADMIN_PASSWORD").map(AdminPassword::Plain)
                };
                match password {
                    Some(password) => Some(AdminSeed {
                        username,
                        email,
                        password,
                    }),
                    None => {
                        tracing::warn!(
                            "ADMIN_USERNAME/ADMIN_EMAIL set without ADMIN_PASSWORD_HASH or ADMIN_PASSWORD; skipping admin seed"
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(Self {
            environment,
            host: env_string("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env_parse("PORT")?.unwrap_or(5000),
            token: TokenConfig::new(secret, Duration::hours(ttl_hours)),
            bcrypt_cost,
            database,
            admin,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Configuration for tests: in-memory store, cheap bcrypt cost.
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            token: TokenConfig::new("test-secret", Duration::hours(1)),
            bcrypt_cost: 4,
            database: None,
            admin: None,
        }
    }
}
