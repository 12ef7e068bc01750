//! Merkle tree over transaction ids: pairwise double-SHA-256, duplicating
//! the last element of an odd-length level, each leaf reversed to its
//! internal byte order before hashing. No domain-separation prefixes.

use crate::codec::{dsha256, Hash32};

/// One step of a Merkle inclusion proof: the sibling hash and which side it
/// sits on relative to the node being proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub sibling: Hash32,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub steps: Vec<ProofStep>,
}

impl MerkleProof {
    /// Recompute the root implied by `leaf` and this proof's steps.
    pub fn compute_root(&self, leaf: Hash32) -> Hash32 {
        let mut current = leaf.to_internal();
        for step in &self.steps {
            let sibling = step.sibling.to_internal();
            let mut buf = Vec::with_capacity(64);
            match step.side {
                Side::Left => {
                    buf.extend_from_slice(&sibling);
                    buf.extend_from_slice(&current);
                }
                Side::Right => {
                    buf.extend_from_slice(&current);
                    buf.extend_from_slice(&sibling);
                }
            }
            current = dsha256(&buf);
        }
        Hash32::from_internal(current)
    }
}

/// A full Merkle tree over a fixed set of leaves, supporting root
/// computation and inclusion proof extraction.
pub struct MerkleTree {
    /// Each level's internal-order node hashes, leaves first.
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    pub fn new(txids: &[Hash32]) -> Self {
        assert!(!txids.is_empty(), "merkle tree requires at least one leaf");
        let mut levels = vec![txids.iter().map(Hash32::to_internal).collect::<Vec<_>>()];
        while levels.last().unwrap().len() > 1 {
            levels.push(next_layer(levels.last().unwrap()));
        }
        Self { levels }
    }

    pub fn root(&self) -> Hash32 {
        Hash32::from_internal(self.levels.last().unwrap()[0])
    }

    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.levels[0].len() {
            return None;
        }
        let mut steps = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 {
                (idx + 1).min(level.len() - 1)
            } else {
                idx - 1
            };
            let side = if idx % 2 == 0 { Side::Right } else { Side::Left };
            steps.push(ProofStep {
                sibling: Hash32::from_internal(level[sibling_idx]),
                side,
            });
            idx /= 2;
        }
        Some(MerkleProof { steps })
    }
}

fn next_layer(level: &[[u8; 32]]) -> Vec<[u8; 32]> {
    let mut out = Vec::with_capacity(level.len().div_ceil(2));
    let mut i = 0;
    while i < level.len() {
        let left = level[i];
        let right = if i + 1 < level.len() { level[i + 1] } else { left };
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&left);
        buf.extend_from_slice(&right);
        out.push(dsha256(&buf));
        i += 2;
    }
    out
}

/// Compute the Merkle root of an ordered list of txids directly, without
/// retaining the intermediate tree.
pub fn merkle_root(txids: &[Hash32]) -> Hash32 {
    MerkleTree::new(txids).root()
}
