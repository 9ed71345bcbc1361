//! Tamper-evident product provenance ledger.
//!
//! Product facts (seed id, QR code id, price id, company) are sealed into
//! Proof-of-Work blocks chained by SHA-256 digests; a QR code can later be
//! checked for authenticity against the chain.

pub mod api;
pub mod blockchain;
pub mod clock;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;

pub use blockchain::{Block, Blockchain, ProductFacts, ProductRecord};
pub use error::{LedgerError, StoreError};
