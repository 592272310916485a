//! Error taxonomy for the keeper
//!
//! Only [`ConfigError`] is fatal. Collection and submission errors are
//! recoverable and are absorbed at cycle or batch scope.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Startup configuration problems. Aborts before the first cycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for [`crate::config::Config`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// One or more settings are missing or invalid
    #[error("configuration errors:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<String>),
    /// Contract ABI artifact missing on disk
    #[error("contract ABI not found at {0}")]
    AbiNotFound(PathBuf),
    /// Contract ABI artifact present but unusable
    #[error("invalid contract ABI at {path}: {reason}")]
    InvalidAbi { path: PathBuf, reason: String },
    /// Credentials rejected while building the chain client
    #[error("invalid credentials: {0}")]
    Credentials(String),
}

/// Price source failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectionError {
    /// Source could not be reached or answered with an error
    #[error("price source unreachable: {0}")]
    Unreachable(String),
    /// Source did not answer within the bounded wait
    #[error("price source timed out after {0:?}")]
    Timeout(Duration),
    /// Neither the primary source nor the fallback produced observations
    #[error("no observations available")]
    NoData,
}

/// Failures while talking to the chain for one batch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// RPC connectivity failure (submit or gas price query)
    #[error("transport error: {0}")]
    Transport(String),
    /// No commit result within the bounded wait
    #[error("no receipt after {0:?}")]
    Timeout(Duration),
    /// Gas price query did not answer within the bounded wait
    #[error("gas price query timed out after {0:?}")]
    GasQueryTimeout(Duration),
    /// A price could not be converted to the on-chain fixed-point unit
    #[error("cannot encode price for {symbol}: {reason}")]
    Encoding { symbol: String, reason: String },
}

/// Cycle-level errors surfaced by the coordinator
#[derive(Debug, Error)]
pub enum KeeperError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_lists_every_problem() {
        let err = ConfigError::Invalid(vec![
            "RPC_URL not set".to_string(),
            "PRIVATE_KEY not set".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("configuration errors:"));
        assert!(msg.contains("  - RPC_URL not set"));
        assert!(msg.contains("  - PRIVATE_KEY not set"));
    }

    #[test]
    fn test_submission_error_display() {
        let err = SubmissionError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "no receipt after 300s");

        let err = SubmissionError::GasQueryTimeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "gas price query timed out after 30s");

        let err = SubmissionError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn test_keeper_error_wraps_collection() {
        let err: KeeperError = CollectionError::NoData.into();
        assert!(matches!(err, KeeperError::Collection(CollectionError::NoData)));
        assert_eq!(err.to_string(), "no observations available");
    }
}
