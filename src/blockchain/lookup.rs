use serde::Serialize;
use std::collections::HashMap;

use super::Block;

/// Provenance facts returned for a genuine QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFacts {
    pub data_seed_id: String,
    pub price_id: String,
    pub company_name: String,
}

impl From<&Block> for ProductFacts {
    fn from(block: &Block) -> Self {
        Self {
            data_seed_id: block.data_seed_id.clone(),
            price_id: block.price_id.clone(),
            company_name: block.company_name.clone(),
        }
    }
}

/// `qr_code_id` -> chain position.
///
/// When a code appears more than once (possible only for sequences loaded
/// from storage) the earliest position is kept. Genesis is never indexed.
#[derive(Debug, Default)]
pub struct QrIndex {
    positions: HashMap<String, usize>,
}

impl QrIndex {
    pub fn rebuild(blocks: &[Block]) -> Self {
        let mut index = Self::default();
        for (pos, block) in blocks.iter().enumerate().skip(1) {
            index.insert(&block.qr_code_id, pos);
        }
        index
    }

    pub fn insert(&mut self, qr_code_id: &str, pos: usize) {
        if qr_code_id.is_empty() {
            return;
        }
        self.positions.entry(qr_code_id.to_string()).or_insert(pos);
    }

    pub fn contains(&self, qr_code_id: &str) -> bool {
        self.positions.contains_key(qr_code_id)
    }

    /// Resolve a code to its facts, `None` when the code was never recorded.
    pub fn resolve(&self, blocks: &[Block], qr_code_id: &str) -> Option<ProductFacts> {
        self.positions
            .get(qr_code_id)
            .and_then(|&pos| blocks.get(pos))
            .map(ProductFacts::from)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
