//! Error types for the Hetu client

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Hetu client
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file errors
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Keystore errors
    #[error(transparent)]
    Keystore(#[from] crate::wallet::KeystoreError),

    /// JSON-RPC and signing errors
    #[error(transparent)]
    Chain(#[from] crate::chain::Error),

    /// ABI and contract call errors
    #[error(transparent)]
    Contract(#[from] crate::contracts::ContractError),

    /// Amount parsing errors
    #[error(transparent)]
    Amount(#[from] crate::utils::balance::AmountError),

    /// Invalid address errors
    #[error(transparent)]
    InvalidAddress(#[from] crate::utils::address::InvalidAddress),

    /// Transaction included with a failing status
    #[error("{label} failed in block {block}")]
    TransactionFailed {
        label: String,
        hash: String,
        block: String,
    },

    /// Transaction not mined before the receipt timeout
    #[error("{label} transaction {hash} still pending after {waited_secs}s")]
    TransactionPending {
        label: String,
        hash: String,
        waited_secs: u64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Other(format!("Serialization error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::ContractError;

    #[test]
    fn test_messages_pass_through() {
        let err: Error = ContractError::UnsupportedMethod("foo".into()).into();
        assert_eq!(err.to_string(), "unsupported method: foo");

        let err: Error = crate::config::ConfigError::Missing("RPC URL").into();
        assert_eq!(err.to_string(), "No RPC URL found in config or CLI.");
    }
}
