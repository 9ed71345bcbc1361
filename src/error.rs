use std::path::PathBuf;

use crate::blockchain::ChainViolation;

/// Failures of the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode block: {0}")]
    Encode(serde_json::Error),
    #[error("store holds no blocks")]
    Empty,
}

/// Errors surfaced by the ledger core.
///
/// Every variant returned from [`crate::blockchain::Blockchain::append`]
/// guarantees the chain was left untouched.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A mandatory fact was absent or blank.
    #[error("missing required field `{field}`")]
    InvalidRecord { field: &'static str },
    #[error("duplicate {field}: {value}")]
    DuplicateRecord { field: &'static str, value: String },
    #[error("chain validation failed: {0}")]
    ValidationFailure(ChainViolation),
    #[error("mining aborted at nonce {nonce}")]
    MiningAborted { nonce: u64 },
    /// The nonce counter overflowed before the target was met.
    #[error("nonce space exhausted at difficulty {difficulty}")]
    NonceExhausted { difficulty: u32 },
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),
}
