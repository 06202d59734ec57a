use crate::crypto::Hash;
use std::{collections::BTreeMap, str::FromStr};

// Hard-coded block hashes at fixed heights. Any chain accepted by a node
// must match every checkpointed height it has reached; a divergence is
// conclusive evidence of an invalid or attacker-controlled chain.
// The table is built once at parameter construction and never mutated.
#[derive(Debug, Clone)]
pub struct Checkpoints {
    entries: BTreeMap<u64, Hash>,
}

impl Checkpoints {
    pub(super) fn from_table(table: &[(u64, &str)]) -> Self {
        let mut entries = BTreeMap::new();
        let mut previous = None;
        for (height, hex) in table {
            if let Some(previous) = previous {
                assert!(
                    height > previous,
                    "checkpoint heights must be strictly increasing"
                );
            }
            previous = Some(height);

            let hash = Hash::from_str(hex).expect("invalid checkpoint hash");
            entries.insert(*height, hash);
        }
        Self { entries }
    }

    // True when no checkpoint is registered at this height, or the
    // registered hash matches exactly
    pub fn verify(&self, height: u64, hash: &Hash) -> bool {
        match self.entries.get(&height) {
            Some(expected) => expected == hash,
            None => true,
        }
    }

    pub fn contains(&self, height: u64) -> bool {
        self.entries.contains_key(&height)
    }

    pub fn expected_at(&self, height: u64) -> Option<&Hash> {
        self.entries.get(&height)
    }

    // Checkpointed heights in ascending order
    pub fn heights(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    pub fn highest(&self) -> Option<u64> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
