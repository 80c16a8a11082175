use anchor_lang::prelude::Pubkey;
use timelock_airdrop::utils::{claim_leaf, hash_pair, verify};

use crate::error::{HarnessError, HarnessResult};

/// Everything a claimant needs to call `claim` against a given root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFixture {
    pub claimant: Pubkey,
    pub amount: u64,
    pub proof: Vec<[u8; 32]>,
    pub merkle_root: [u8; 32],
}

/// Merkle tree over (claimant, amount) allocations.
///
/// Nodes are stored level by level, leaves first. An odd node at the end of a
/// level is paired with itself.
#[derive(Debug, Clone)]
pub struct AirdropTree {
    entries: Vec<(Pubkey, u64)>,
    nodes: Vec<[u8; 32]>,
}

impl AirdropTree {
    pub fn new(entries: &[(Pubkey, u64)]) -> HarnessResult<Self> {
        if entries.is_empty() {
            return Err(HarnessError::Fixture("cannot build a merkle tree without entries".into()));
        }

        let mut nodes: Vec<[u8; 32]> = entries
            .iter()
            .map(|(claimant, amount)| claim_leaf(claimant, *amount))
            .collect();

        let mut level_start = 0;
        let mut level_len = entries.len();
        while level_len > 1 {
            for i in (0..level_len).step_by(2) {
                let left = nodes[level_start + i];
                let right = if i + 1 < level_len {
                    nodes[level_start + i + 1]
                } else {
                    left
                };
                nodes.push(hash_pair(&left, &right));
            }
            level_start += level_len;
            level_len = Self::next_level_len(level_len);
        }

        Ok(Self {
            entries: entries.to_vec(),
            nodes,
        })
    }

    fn next_level_len(level_len: usize) -> usize {
        level_len.div_ceil(2)
    }

    pub fn root(&self) -> [u8; 32] {
        // Non-empty by construction; the root is always the last node
        self.nodes[self.nodes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, claimant: &Pubkey) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| entry == claimant)
    }

    /// Sibling path from leaf `index` up to the root
    pub fn proof(&self, index: usize) -> HarnessResult<Vec<[u8; 32]>> {
        if index >= self.entries.len() {
            return Err(HarnessError::Fixture(format!(
                "leaf index {index} out of bounds for {} entries",
                self.entries.len()
            )));
        }

        let mut proof = Vec::new();
        let mut current = index;
        let mut level_start = 0;
        let mut level_len = self.entries.len();

        while level_len > 1 {
            let sibling = if current % 2 == 0 {
                if current + 1 < level_len {
                    current + 1
                } else {
                    current
                }
            } else {
                current - 1
            };
            proof.push(self.nodes[level_start + sibling]);

            current /= 2;
            level_start += level_len;
            level_len = Self::next_level_len(level_len);
        }

        Ok(proof)
    }

    pub fn fixture(&self, index: usize) -> HarnessResult<ClaimFixture> {
        let proof = self.proof(index)?;
        let (claimant, amount) = self.entries[index];
        Ok(ClaimFixture {
            claimant,
            amount,
            proof,
            merkle_root: self.root(),
        })
    }

    pub fn fixture_for(&self, claimant: &Pubkey) -> HarnessResult<ClaimFixture> {
        let index = self
            .position(claimant)
            .ok_or_else(|| HarnessError::Fixture(format!("{claimant} is not in the tree")))?;
        self.fixture(index)
    }
}

impl ClaimFixture {
    /// Checks the fixture locally with the program's verifier
    pub fn verifies(&self) -> bool {
        verify(
            &self.proof,
            self.merkle_root,
            claim_leaf(&self.claimant, self.amount),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<(Pubkey, u64)> {
        (0..n).map(|i| (Pubkey::new_unique(), 1_000 * (i as u64 + 1))).collect()
    }

    #[test]
    fn every_leaf_verifies() {
        for n in 1..=9 {
            let tree = AirdropTree::new(&entries(n)).unwrap();
            for index in 0..n {
                let fixture = tree.fixture(index).unwrap();
                assert!(fixture.verifies(), "leaf {index} of {n}");
            }
        }
    }

    #[test]
    fn single_entry_root_is_the_leaf() {
        let claimant = Pubkey::new_unique();
        let tree = AirdropTree::new(&[(claimant, 100)]).unwrap();
        let fixture = tree.fixture_for(&claimant).unwrap();

        assert!(fixture.proof.is_empty());
        assert_eq!(tree.root(), claim_leaf(&claimant, 100));
    }

    #[test]
    fn wrong_amount_does_not_verify() {
        let data = entries(4);
        let tree = AirdropTree::new(&data).unwrap();
        let mut fixture = tree.fixture(2).unwrap();
        fixture.amount += 1;
        assert!(!fixture.verifies());
    }

    #[test]
    fn tampered_proof_does_not_verify() {
        let tree = AirdropTree::new(&entries(4)).unwrap();
        let mut fixture = tree.fixture(0).unwrap();
        fixture.proof[0][0] = fixture.proof[0][0].wrapping_add(1);
        assert!(!fixture.verifies());
    }

    #[test]
    fn fixture_errors() {
        assert!(matches!(AirdropTree::new(&[]), Err(HarnessError::Fixture(_))));

        let tree = AirdropTree::new(&entries(3)).unwrap();
        assert!(matches!(tree.proof(10), Err(HarnessError::Fixture(_))));
        assert!(matches!(
            tree.fixture_for(&Pubkey::new_unique()),
            Err(HarnessError::Fixture(_))
        ));
    }
}
