//! Configuration management for the indexer.
//!
//! Loads all settings from environment variables (after `.env`, if present).

use crate::errors::{IndexerError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint (e.g., https://soroban-testnet.stellar.org)
    pub rpc_url: String,

    /// Crowdfunding contract address (Strkey format: C...)
    pub contract_id: String,

    /// SQLite database URL or file path
    pub database_url: String,

    /// Port the REST API listens on
    pub api_port: u16,

    /// Delay between two RPC polls
    pub poll_interval_secs: u64,

    /// First ledger to index when no cursor is stored; `0` starts at the RPC's latest ledger
    pub start_ledger: i64,

    /// RPC request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `CONTRACT_ID`: Crowdfunding contract address
    ///
    /// Optional variables (with defaults):
    /// - `RPC_URL`: Soroban RPC endpoint (defaults to testnet)
    /// - `DATABASE_URL`: defaults to `sqlite:crowdfunding.db`
    /// - `API_PORT`: defaults to 8080
    /// - `POLL_INTERVAL_SECS`: defaults to 5
    /// - `START_LEDGER`: defaults to 0
    /// - `TIMEOUT_SECS`: defaults to 30
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            rpc_url: env_var("RPC_URL")
                .unwrap_or_else(|_| "https://soroban-testnet.stellar.org".to_string()),

            contract_id: env_var("CONTRACT_ID")?,

            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:crowdfunding.db".to_string()),

            api_port: parse_var("API_PORT", 8080)?,
            poll_interval_secs: parse_var("POLL_INTERVAL_SECS", 5)?,
            start_ledger: parse_var("START_LEDGER", 0)?,
            timeout_secs: parse_var("TIMEOUT_SECS", 30)?,
        })
    }

    /// Validate that all configuration is well-formed.
    pub fn validate(&self) -> Result<()> {
        if !self.contract_id.starts_with('C') || self.contract_id.len() != 56 {
            return Err(IndexerError::Config(
                "CONTRACT_ID must be a valid Stellar contract address (starts with 'C')"
                    .to_string(),
            ));
        }

        if !self.rpc_url.starts_with("http") {
            return Err(IndexerError::Config(
                "RPC_URL must be a valid HTTP(S) URL".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(IndexerError::Config(
                "POLL_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        if self.start_ledger < 0 {
            return Err(IndexerError::Config(
                "START_LEDGER cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| IndexerError::Config(format!("Missing required environment variable: {key}")))
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IndexerError::Config(format!("Invalid {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}
