//! Persistence collaborators.
//!
//! The ledger keeps its in-memory chain authoritative and writes every
//! accepted block through a [`BlockStore`] before exposing it.

mod file;
mod mem;

pub use file::JsonFileStore;
pub use mem::MemoryStore;

use crate::blockchain::Block;
use crate::error::StoreError;

pub trait BlockStore: Send {
    /// Every stored block, ordered by index.
    fn load(&self) -> Result<Vec<Block>, StoreError>;

    /// Durably record one newly accepted block.
    fn save(&mut self, block: &Block) -> Result<(), StoreError>;
}
