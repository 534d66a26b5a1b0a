// src/config.rs

use std::env;
use std::net::SocketAddr;

use dotenvy::dotenv;

/// Default token lifetime: 30 days.
pub const DEFAULT_JWT_EXPIRATION: u64 = 30 * 24 * 60 * 60;

/// Passing threshold applied to quizzes created without one.
pub const DEFAULT_PASSING_SCORE: i32 = 60;

/// XP granted by a quiz when the creator does not specify it.
pub const DEFAULT_XP_REWARD: i32 = 100;

/// Number of rows kept in each analytics "top" list.
pub const ANALYTICS_TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    /// Additional allowed CORS origin (the deployed SPA).
    pub frontend_url: Option<String>,
    pub seed: Option<SeedSchool>,
}

/// Optional bootstrap school with its first director.
#[derive(Debug, Clone)]
pub struct SeedSchool {
    pub school_name: String,
    pub director_email: String,
    pub director_password: String,
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| ConfigError("JWT_SECRET must be set".to_string()))?;

        let jwt_expiration = match env::var("JWT_EXPIRATION") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError(format!("JWT_EXPIRATION is not a number: {}", raw)))?,
            Err(_) => DEFAULT_JWT_EXPIRATION,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError(format!("PORT is not a valid port: {}", raw)))?,
            Err(_) => 5000,
        };

        let frontend_url = env::var("FRONTEND_URL").ok().filter(|s| !s.is_empty());

        let seed = match (
            env::var("SEED_SCHOOL_NAME"),
            env::var("SEED_DIRECTOR_EMAIL"),
            env::var("SEED_DIRECTOR_PASSWORD"),
        ) {
            (Ok(school_name), Ok(director_email), Ok(director_password)) => Some(SeedSchool {
                school_name,
                director_email,
                director_password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            frontend_url,
            seed,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Origins allowed by the CORS layer.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![
            "http://localhost:3000".to_string(),
            "http://localhost:5173".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ];
        if let Some(url) = &self.frontend_url {
            origins.push(url.trim_end_matches('/').to_string());
        }
        origins
    }
}
