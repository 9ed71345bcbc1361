use std::sync::{Arc, Mutex};

use super::BlockStore;
use crate::blockchain::Block;
use crate::error::StoreError;

/// Volatile store; clones share the same blocks.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: Arc<Mutex<Vec<Block>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing sequence, as if it had been persisted earlier.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: Arc::new(Mutex::new(blocks)),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.lock().expect("mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlockStore for MemoryStore {
    fn load(&self) -> Result<Vec<Block>, StoreError> {
        let mut blocks = self.blocks.lock().expect("mutex poisoned").clone();
        blocks.sort_by_key(|b| b.index);
        Ok(blocks)
    }

    fn save(&mut self, block: &Block) -> Result<(), StoreError> {
        self.blocks
            .lock()
            .expect("mutex poisoned")
            .push(block.clone());
        Ok(())
    }
}
