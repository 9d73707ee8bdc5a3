//! Runtime Configuration
//! Mission: Collect all environment-provided settings into one immutable struct

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Process-wide configuration, built once at startup and passed by
/// reference into everything that needs it. Nothing here mutates after
/// `from_env` returns.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Allowed CORS origins. Empty means a permissive policy (dev mode).
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Read configuration from the environment. `JWT_SECRET` is mandatory;
    /// everything else has a development default.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set (signing secret for bearer tokens)")?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let db_path = resolve_data_path(env::var("DATABASE_PATH").ok(), "chirp.db");

        let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(30);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Ok(Self {
            bind_addr,
            db_path,
            jwt_secret,
            token_ttl_minutes,
            allowed_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Resolve a database path from the environment, defaulting next to the
/// crate so running from a different working directory doesn't silently
/// create a second empty database.
fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

/// Load `.env` files before any configuration is read. Checks the working
/// directory chain first, then the manifest directory.
pub fn load_env() {
    let _ = dotenv::dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
