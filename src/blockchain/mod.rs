pub mod block;
pub mod lookup;
pub mod model;
pub mod validator;

pub use block::{Block, CancelToken, ProductRecord, digest, meets_difficulty};
pub use lookup::{ProductFacts, QrIndex};
pub use model::Blockchain;
pub use validator::{ChainViolation, Validity, ViolationKind, check_chain, check_stored_chain};

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Target milliseconds between blocks for auto-adjust.
pub const TARGET_BLOCK_INTERVAL_MILLIS: i64 = 30_000;

/// Difficulty bounds. A SHA-256 hex digest has 64 digits.
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 64;
