use ethers::types::{Address, H256};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("Invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Signature verification failed: expected signer {expected:?}, recovered {recovered:?}")]
    SignatureVerificationFailed { expected: Address, recovered: Address },
    #[error("Network mismatch: {context} is on chain {actual}, transaction targets chain {expected}")]
    NetworkMismatch {
        context: String,
        expected: u64,
        actual: u64,
    },
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Nonce conflict: {0}")]
    NonceConflict(String),
    #[error("Simulation reverted: {0}")]
    SimulationRevert(String),
    #[error("Invalid bridge response: {0}")]
    InvalidBridgeResponse(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Unsupported wallet: {0}")]
    UnsupportedWallet(String),
    #[error("No swap route: {0}")]
    NoRoute(String),
    #[error("Approval {approval_hash:?} was broadcast but the follow-up transaction failed: {source}")]
    ApprovedButSwapFailed {
        approval_hash: H256,
        #[source]
        source: Box<Error>,
    },
    #[error("Transaction {hash:?} not confirmed within {timeout_secs}s")]
    ConfirmationTimeout { hash: H256, timeout_secs: u64 },
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_amount(amount: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidAmount {
            amount: amount.into(),
            reason: reason.into(),
        }
    }

    /// Errors caused by the environment (wrong wallet, wrong chain) that a blind
    /// retry would reproduce.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::SignatureVerificationFailed { .. }
            | Error::NetworkMismatch { .. }
            | Error::InvalidSignature(_)
            | Error::UnsupportedWallet(_) => true,
            Error::ApprovedButSwapFailed { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonParse(err.to_string())
    }
}
