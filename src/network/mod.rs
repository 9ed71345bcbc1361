//! Block announcement collaborator.
//!
//! There is no peer protocol here: an announcer is told about every block
//! the ledger accepts and decides what to do with it.

use log::info;

use crate::blockchain::Block;

pub trait Broadcaster: Send + Sync {
    /// Fired once per successful append, after the block is in the chain.
    fn announce(&self, block: &Block);
}

/// Announces to a fixed peer list by logging each delivery.
#[derive(Debug, Clone, Default)]
pub struct LogBroadcaster {
    peers: Vec<String>,
}

impl LogBroadcaster {
    /// `own_address` is dropped from `peers`, as are duplicates.
    pub fn new(peers: Vec<String>, own_address: &str) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(peers.len());
        for peer in peers {
            if peer != own_address && !unique.contains(&peer) {
                unique.push(peer);
            }
        }
        Self { peers: unique }
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }
}

impl Broadcaster for LogBroadcaster {
    fn announce(&self, block: &Block) {
        if self.peers.is_empty() {
            info!("NET - block #{} accepted (no peers)", block.index);
            return;
        }
        for peer in &self.peers {
            info!("NET - newBlock #{} ({}) -> {}", block.index, block.hash, peer);
        }
    }
}
