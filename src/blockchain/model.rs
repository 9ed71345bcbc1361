use log::{debug, info, warn};
use std::collections::HashSet;

use super::{
    Block, CancelToken, DIFF_MAX, ProductFacts, ProductRecord, QrIndex, Validity, check_chain,
    check_stored_chain,
};
use crate::clock::Clock;
use crate::config::ChainConfig;
use crate::error::{LedgerError, StoreError};
use crate::network::Broadcaster;
use crate::storage::BlockStore;

/// Single-writer, append-only product ledger with Proof-of-Work.
///
/// The in-memory chain is authoritative; every accepted block is written
/// through the [`BlockStore`] before it becomes visible. Callers sharing one
/// instance must serialize `append` (the HTTP layer wraps it in a `Mutex`).
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
    config: ChainConfig,
    qr_index: QrIndex,
    seed_ids: HashSet<String>,
    store: Box<dyn BlockStore>,
    broadcaster: Box<dyn Broadcaster>,
    clock: Box<dyn Clock>,
    cancel: CancelToken,
}

impl Blockchain {
    /// Load the stored chain, or seed an empty store with a genesis block.
    ///
    /// A stored chain without a proper genesis, with index gaps, or that
    /// fails validation is refused.
    pub fn open(
        mut config: ChainConfig,
        mut store: Box<dyn BlockStore>,
        broadcaster: Box<dyn Broadcaster>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        config.min_difficulty = config.min_difficulty.min(DIFF_MAX);
        let difficulty = config
            .initial_difficulty
            .clamp(config.min_difficulty, DIFF_MAX);

        let mut chain = store.load()?;
        if chain.is_empty() {
            let genesis = Block::genesis(clock.now_millis());
            store.save(&genesis)?;
            info!("CHAIN - created genesis block (hash={})", genesis.hash);
            chain.push(genesis);
        } else if let Validity::Invalid(violation) = check_stored_chain(&chain) {
            warn!("CHAIN - stored chain rejected: {violation}");
            return Err(LedgerError::ValidationFailure(violation));
        }

        let mut bc = Self {
            chain: Vec::new(),
            difficulty,
            config,
            qr_index: QrIndex::default(),
            seed_ids: HashSet::new(),
            store,
            broadcaster,
            clock,
            cancel: CancelToken::new(),
        };
        bc.install(chain);
        info!(
            "CHAIN - opened with {} block(s), difficulty {}",
            bc.len(),
            bc.difficulty
        );
        Ok(bc)
    }

    /// Return the last block in the chain.
    pub fn head(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Owned copy of the whole chain, for persistence or transmission.
    pub fn snapshot(&self) -> Vec<Block> {
        self.chain.clone()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Handle that aborts any running and future mining when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Mine and append a block carrying `record`, then retarget difficulty.
    ///
    /// Either everything happens (mined, persisted, appended, retargeted,
    /// announced) or nothing does.
    pub fn append(&mut self, record: ProductRecord) -> Result<&Block, LedgerError> {
        record.check()?;
        if self.seed_ids.contains(&record.data_seed_id) {
            return Err(LedgerError::DuplicateRecord {
                field: "dataSeedId",
                value: record.data_seed_id,
            });
        }
        if self.qr_index.contains(&record.qr_code_id) {
            return Err(LedgerError::DuplicateRecord {
                field: "qrCodeId",
                value: record.qr_code_id,
            });
        }

        let (prev_hash, prev_timestamp) = {
            let head = self.head();
            (head.hash.clone(), head.timestamp)
        };
        let index = self.chain.len() as u64;
        let timestamp = self.clock.now_millis().max(prev_timestamp);
        let difficulty = self.difficulty;

        let mut block = Block::new(index, prev_hash, timestamp, record);
        if let Err(e) = block.mine(difficulty, &self.cancel) {
            warn!("MINER - block #{index} not sealed: {e}");
            return Err(e);
        }
        block.hash = block.compute_hash();

        if let Err(e) = self.store.save(&block) {
            warn!("STORE - block #{index} not persisted: {e}");
            return Err(e.into());
        }

        let appended_at = self.clock.now_millis().max(timestamp);
        self.seed_ids.insert(block.data_seed_id.clone());
        self.qr_index.insert(&block.qr_code_id, self.chain.len());
        self.chain.push(block);
        self.retarget(appended_at.saturating_sub(prev_timestamp));

        let block = self.head();
        info!(
            "MINER - sealed block #{} (hash={}, nonce={}, difficulty={})",
            block.index, block.hash, block.nonce, difficulty
        );
        self.broadcaster.announce(block);
        Ok(block)
    }

    /// Audit digest consistency and linkage of the whole chain.
    pub fn validate(&self) -> Validity {
        check_chain(&self.chain)
    }

    /// Facts recorded for `qr_code_id`, or `None` when the code is unknown.
    pub fn lookup_by_qr_code(&self, qr_code_id: &str) -> Option<ProductFacts> {
        self.qr_index.resolve(&self.chain, qr_code_id)
    }

    /// Replace the in-memory chain with the stored one.
    ///
    /// The stored chain must be non-empty and valid; otherwise nothing
    /// changes. Difficulty is kept.
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        let chain = self.store.load()?;
        if chain.is_empty() {
            return Err(StoreError::Empty.into());
        }
        if let Validity::Invalid(violation) = check_stored_chain(&chain) {
            warn!("CHAIN - reload rejected: {violation}");
            return Err(LedgerError::ValidationFailure(violation));
        }
        self.install(chain);
        debug!("CHAIN - reloaded {} block(s) from store", self.len());
        Ok(())
    }

    fn install(&mut self, chain: Vec<Block>) {
        self.qr_index = QrIndex::rebuild(&chain);
        self.seed_ids = chain
            .iter()
            .skip(1)
            .map(|b| b.data_seed_id.clone())
            .collect();
        self.chain = chain;
    }

    /// One step up when blocks come faster than the target, one step down
    /// otherwise, kept within `[min_difficulty, DIFF_MAX]`.
    fn retarget(&mut self, elapsed_millis: i64) {
        let old = self.difficulty;
        self.difficulty = if elapsed_millis < self.config.target_interval_millis {
            old.saturating_add(1).min(DIFF_MAX)
        } else {
            old.saturating_sub(1).max(self.config.min_difficulty)
        };
        debug!(
            "DIFF - {} -> {} (elapsed={}ms, target={}ms)",
            old, self.difficulty, elapsed_millis, self.config.target_interval_millis
        );
    }
}
