use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::LedgerError;

/// How many nonces are tried between two looks at the cancel flag.
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Facts supplied by the caller for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRecord {
    pub data_seed_id: String,
    pub qr_code_id: String,
    pub price_id: String,
    pub company_name: String,
}

impl ProductRecord {
    pub fn new(
        data_seed_id: impl Into<String>,
        qr_code_id: impl Into<String>,
        price_id: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            data_seed_id: data_seed_id.into(),
            qr_code_id: qr_code_id.into(),
            price_id: price_id.into(),
            company_name: company_name.into(),
        }
    }

    /// Reject records with an empty mandatory fact. Content is otherwise
    /// opaque: whitespace is a value like any other.
    pub fn check(&self) -> Result<(), LedgerError> {
        let fields = [
            ("dataSeedId", &self.data_seed_id),
            ("qrCodeId", &self.qr_code_id),
            ("priceId", &self.price_id),
            ("companyName", &self.company_name),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                return Err(LedgerError::InvalidRecord { field });
            }
        }
        Ok(())
    }
}

/// One ledger entry bound to its predecessor through `preceding_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // epoch millis (UTC)
    pub data_seed_id: String,
    pub qr_code_id: String,
    pub price_id: String,
    pub company_name: String,
    pub preceding_hash: String,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis(timestamp: i64) -> Self {
        let record = ProductRecord {
            data_seed_id: String::from("Genesis Block"),
            ..ProductRecord::default()
        };
        Self::new(0, String::from("0"), timestamp, record)
    }

    /// Create a new block (not mined yet). Call `mine()` to perform PoW.
    pub fn new(index: u64, preceding_hash: String, timestamp: i64, record: ProductRecord) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data_seed_id: record.data_seed_id,
            qr_code_id: record.qr_code_id,
            price_id: record.price_id,
            company_name: record.company_name,
            preceding_hash,
            hash: String::new(),
            nonce: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn compute_hash(&self) -> String {
        digest(
            self.index,
            &self.preceding_hash,
            self.timestamp,
            &self.data_seed_id,
            &self.qr_code_id,
            &self.price_id,
            &self.company_name,
            self.nonce,
        )
    }

    /// Perform Proof-of-Work by advancing the nonce from its current value
    /// until the hash starts with `difficulty` zero hex digits.
    pub fn mine(&mut self, difficulty: u32, cancel: &CancelToken) -> Result<(), LedgerError> {
        loop {
            self.hash = self.compute_hash();
            if meets_difficulty(&self.hash, difficulty) {
                return Ok(());
            }
            if self.nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                return Err(LedgerError::MiningAborted { nonce: self.nonce });
            }
            self.nonce = self
                .nonce
                .checked_add(1)
                .ok_or(LedgerError::NonceExhausted { difficulty })?;
        }
    }

    /// Whether the cached `hash` matches the block's content.
    pub fn has_consistent_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

/// SHA-256 (lowercase hex) over the plain concatenation of the fields.
///
/// The field order is part of the chain format: reordering it changes every
/// digest after genesis.
#[allow(clippy::too_many_arguments)]
pub fn digest(
    index: u64,
    preceding_hash: &str,
    timestamp: i64,
    data_seed_id: &str,
    qr_code_id: &str,
    price_id: &str,
    company_name: &str,
    nonce: u64,
) -> String {
    let preimage = format!(
        "{index}{preceding_hash}{timestamp}{data_seed_id}{qr_code_id}{price_id}{company_name}{nonce}"
    );
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// Count of leading `'0'` hex digits required by `difficulty` is met.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    hash.len() >= difficulty as usize && hash.chars().take(difficulty as usize).all(|c| c == '0')
}

/// Cooperative cancellation flag shared between the ledger and whoever
/// needs to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
