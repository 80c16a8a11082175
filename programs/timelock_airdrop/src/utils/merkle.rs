use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;

/// Leaf hash for a `(claimant, amount)` entry: sha256(claimant || amount_le)
pub fn claim_leaf(claimant: &Pubkey, amount: u64) -> [u8; 32] {
    hashv(&[&claimant.to_bytes(), &amount.to_le_bytes()]).to_bytes()
}

/// Hash of two sibling nodes, ordered lexicographically so proofs carry no direction bits
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    if a <= b {
        hashv(&[a, b]).to_bytes()
    } else {
        hashv(&[b, a]).to_bytes()
    }
}

/// Verifies that `leaf` is committed under `root` given the sibling path `proof`.
pub fn verify(proof: &[[u8; 32]], root: [u8; 32], leaf: [u8; 32]) -> bool {
    let computed = proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(&node, sibling));
    computed == root
}
