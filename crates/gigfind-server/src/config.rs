use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Duration;
use tracing::warn;

use gigfind_api::auth::DEFAULT_TOKEN_TTL_DAYS;
use gigfind_core::StatusPolicy;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Runtime settings, read from `GIGFIND_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub status_policy: StatusPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = var_or("GIGFIND_HOST", "0.0.0.0");
        let port: u16 = var_or("GIGFIND_PORT", "3000")
            .parse()
            .context("GIGFIND_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let jwt_secret = var_or("GIGFIND_JWT_SECRET", DEV_JWT_SECRET);
        if jwt_secret == DEV_JWT_SECRET {
            warn!("GIGFIND_JWT_SECRET not set; using the development secret");
        }

        let ttl_days: i64 = var_or("GIGFIND_TOKEN_TTL_DAYS", &DEFAULT_TOKEN_TTL_DAYS.to_string())
            .parse()
            .context("GIGFIND_TOKEN_TTL_DAYS must be a whole number")?;
        if ttl_days <= 0 {
            anyhow::bail!("GIGFIND_TOKEN_TTL_DAYS must be positive");
        }

        let status_policy = var_or("GIGFIND_APPLICATION_STATUS_POLICY", "reversible")
            .parse::<StatusPolicy>()
            .map_err(anyhow::Error::msg)?;

        Ok(Self {
            addr,
            db_path: PathBuf::from(var_or("GIGFIND_DB_PATH", "gigfind.db")),
            jwt_secret,
            token_ttl: Duration::days(ttl_days),
            status_policy,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}
