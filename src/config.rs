//! Command-line and environment configuration.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Service configuration. Every flag falls back to an environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "todos")]
#[command(about = "A to-do list served as HTML pages and a JSON API")]
#[command(version)]
pub struct Config {
    /// Secret key for the application. Never logged.
    #[arg(long, env = "TODOS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: SecretKey,

    /// SQLite database file, or `:memory:`
    #[arg(long, env = "TODOS_DATABASE", default_value = "todos_db.sqlite3")]
    pub database: PathBuf,

    /// Address to listen on
    #[arg(long, env = "TODOS_ADDR", default_value = "127.0.0.1:8000")]
    pub addr: SocketAddr,

    /// How long the `/slow/` page waits before answering, in seconds
    #[arg(long, env = "TODOS_SLOW_DELAY_SECS", default_value_t = 10)]
    pub slow_delay_secs: u64,
}

impl Config {
    pub fn slow_delay(&self) -> Duration {
        Duration::from_secs(self.slow_delay_secs)
    }
}

/// A non-empty secret whose `Debug` and `Display` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

#[derive(Debug, Error)]
#[error("secret key must not be empty")]
pub struct EmptySecretKey;

impl SecretKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for SecretKey {
    type Err = EmptySecretKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(EmptySecretKey);
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(**redacted**)")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("**redacted**")
    }
}
