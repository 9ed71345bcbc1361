//! Whole-chain integrity audit.
//!
//! Only digest consistency and linkage are checked. Whether each historical
//! hash still meets the difficulty it was mined at is not re-verified: the
//! difficulty in force at mining time is not recorded on the block.
//!
//! Sequences read back from storage go through [`check_stored_chain`], which
//! also requires a well-formed genesis and gap-free indices.

use serde::Serialize;
use std::fmt;

use super::Block;

/// Which of the two per-block checks failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Stored `hash` differs from the recomputed digest.
    DigestMismatch,
    /// `preceding_hash` differs from the previous block's `hash`.
    BrokenLinkage,
    /// Position 0 is not a genesis block (`index 0`, `preceding_hash "0"`,
    /// consistent hash).
    MalformedGenesis,
    /// A block's `index` differs from its position.
    IndexMismatch,
}

/// First offending position in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainViolation {
    pub index: usize,
    pub kind: ViolationKind,
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::DigestMismatch => write!(f, "digest mismatch at block {}", self.index),
            ViolationKind::BrokenLinkage => write!(f, "broken linkage at block {}", self.index),
            ViolationKind::MalformedGenesis => write!(f, "malformed genesis block"),
            ViolationKind::IndexMismatch => write!(f, "unexpected index at position {}", self.index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(ChainViolation),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn violation(&self) -> Option<ChainViolation> {
        match self {
            Validity::Valid => None,
            Validity::Invalid(v) => Some(*v),
        }
    }
}

/// Audit every non-genesis block; stops at the first violation.
pub fn check_chain(blocks: &[Block]) -> Validity {
    for (i, pair) in blocks.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let index = i + 1;

        if !current.has_consistent_hash() {
            return Validity::Invalid(ChainViolation {
                index,
                kind: ViolationKind::DigestMismatch,
            });
        }
        if current.preceding_hash != prev.hash {
            return Validity::Invalid(ChainViolation {
                index,
                kind: ViolationKind::BrokenLinkage,
            });
        }
    }
    Validity::Valid
}

/// Audit a non-empty sequence loaded from storage before adopting it.
pub fn check_stored_chain(blocks: &[Block]) -> Validity {
    let genesis_ok = blocks.first().is_some_and(|g| {
        g.index == 0 && g.preceding_hash == "0" && g.has_consistent_hash()
    });
    if !genesis_ok {
        return Validity::Invalid(ChainViolation {
            index: 0,
            kind: ViolationKind::MalformedGenesis,
        });
    }
    if let Some(pos) = blocks
        .iter()
        .enumerate()
        .position(|(pos, b)| b.index != pos as u64)
    {
        return Validity::Invalid(ChainViolation {
            index: pos,
            kind: ViolationKind::IndexMismatch,
        });
    }
    check_chain(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{CancelToken, ProductRecord};

    fn build_chain(n: u64) -> Vec<Block> {
        let cancel = CancelToken::new();
        let mut chain = vec![Block::genesis(0)];
        for i in 1..=n {
            let prev = chain.last().unwrap().hash.clone();
            let record = ProductRecord::new(format!("S{i}"), format!("Q{i}"), "P", "Acme");
            let mut b = Block::new(i, prev, i as i64 * 1_000, record);
            b.mine(1, &cancel).unwrap();
            chain.push(b);
        }
        chain
    }

    #[test]
    fn untouched_chain_is_valid() {
        assert!(check_chain(&build_chain(5)).is_valid());
    }

    #[test]
    fn genesis_only_and_empty_chains_are_valid() {
        assert!(check_chain(&[]).is_valid());
        assert!(check_chain(&build_chain(0)).is_valid());
    }

    #[test]
    fn genesis_is_exempt() {
        let mut chain = build_chain(0);
        chain[0].company_name = "Forged".into();
        assert!(check_chain(&chain).is_valid());
    }

    #[test]
    fn tampering_any_field_is_detected() {
        let tampers: [fn(&mut Block); 8] = [
            |b| b.index += 10,
            |b| b.timestamp += 1,
            |b| b.data_seed_id.push('x'),
            |b| b.qr_code_id.push('x'),
            |b| b.price_id.push('x'),
            |b| b.company_name.push('x'),
            |b| b.nonce += 1,
            |b| b.hash = "0".repeat(64),
        ];
        for tamper in tampers {
            let mut chain = build_chain(3);
            tamper(&mut chain[2]);
            assert_eq!(
                check_chain(&chain).violation(),
                Some(ChainViolation {
                    index: 2,
                    kind: ViolationKind::DigestMismatch
                })
            );
        }
    }

    #[test]
    fn rehashed_tamper_breaks_linkage() {
        let mut chain = build_chain(3);
        chain[1].price_id = "P-forged".into();
        chain[1].hash = chain[1].compute_hash();

        assert_eq!(
            check_chain(&chain).violation(),
            Some(ChainViolation {
                index: 2,
                kind: ViolationKind::BrokenLinkage
            })
        );
    }

    #[test]
    fn stored_chain_needs_genesis_first() {
        assert!(check_stored_chain(&build_chain(3)).is_valid());

        let headless = build_chain(3).split_off(1);
        let malformed = Some(ChainViolation {
            index: 0,
            kind: ViolationKind::MalformedGenesis,
        });
        assert_eq!(check_stored_chain(&headless).violation(), malformed);
        assert_eq!(check_stored_chain(&[]).violation(), malformed);

        let mut forged = build_chain(1);
        forged[0].company_name = "Forged".into();
        assert_eq!(check_stored_chain(&forged).violation(), malformed);
    }

    #[test]
    fn stored_chain_needs_contiguous_indices() {
        let mut chain = build_chain(3);
        chain.remove(2);
        assert_eq!(
            check_stored_chain(&chain).violation(),
            Some(ChainViolation {
                index: 2,
                kind: ViolationKind::IndexMismatch
            })
        );
    }

    #[test]
    fn reordered_blocks_are_invalid() {
        let mut chain = build_chain(3);
        chain.swap(1, 2);
        assert!(!check_chain(&chain).is_valid());
    }
}
