//! Application configuration loaded from environment variables.

use common::AccountId;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A `SEED_ACCOUNTS` entry is not of the form `account:balance`.
    #[error("invalid seed account entry {0:?}, expected account:balance")]
    InvalidSeedAccount(String),
}

/// An account opened at startup with an initial balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub account: AccountId,
    pub balance: i64,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `SEED_ACCOUNTS` — comma-separated `account:balance` pairs opened in the
///   in-memory bank (default: `"A:1000,B:0"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub seed_accounts: Vec<SeedAccount>,
}

const DEFAULT_SEED_ACCOUNTS: &str = "A:1000,B:0";

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let seed_accounts = std::env::var("SEED_ACCOUNTS")
            .unwrap_or_else(|_| DEFAULT_SEED_ACCOUNTS.to_string());

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            seed_accounts: parse_seed_accounts(&seed_accounts)?,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            seed_accounts: vec![
                SeedAccount {
                    account: AccountId::new("A"),
                    balance: 1000,
                },
                SeedAccount {
                    account: AccountId::new("B"),
                    balance: 0,
                },
            ],
        }
    }
}

/// Parses `account:balance` pairs separated by commas. Blank entries are skipped.
pub fn parse_seed_accounts(raw: &str) -> Result<Vec<SeedAccount>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::InvalidSeedAccount(entry.to_string());
            let (account, balance) = entry.split_once(':').ok_or_else(invalid)?;
            let account = account.trim();
            if account.is_empty() {
                return Err(invalid());
            }
            let balance = balance.trim().parse().map_err(|_| invalid())?;
            Ok(SeedAccount {
                account: AccountId::new(account),
                balance,
            })
        })
        .collect()
}
