use crate::{
    block::BlockHeader,
    crypto::{Hash, Hashable},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("genesis hash mismatch: computed {computed}, expected {expected}")]
pub struct GenesisMismatch {
    pub computed: Hash,
    pub expected: Hash,
}

// Verify that a freshly built genesis header hashes to the documented
// constant. A mismatch means the parameter table itself is corrupted and
// the process must not start; this is checked eagerly, never at use time.
pub fn check_genesis(header: &BlockHeader, expected: &Hash) -> Result<(), GenesisMismatch> {
    let computed = header.hash();
    if computed != *expected {
        return Err(GenesisMismatch {
            computed,
            expected: expected.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chain::ChainParams, network::Network};

    #[test]
    fn test_documented_genesis_verifies() {
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            let params = ChainParams::get(network);
            check_genesis(params.genesis(), params.genesis_hash()).unwrap();
        }
    }

    #[test]
    fn test_any_tampered_field_fails() {
        let params = ChainParams::get(Network::Mainnet);

        let mut tampered = params.genesis().clone();
        tampered.timestamp += 1;
        assert!(check_genesis(&tampered, params.genesis_hash()).is_err());

        let mut tampered = params.genesis().clone();
        tampered.nonce -= 1;
        assert!(check_genesis(&tampered, params.genesis_hash()).is_err());

        let mut tampered = params.genesis().clone();
        tampered.bits = 0x1d00ffff;
        assert!(check_genesis(&tampered, params.genesis_hash()).is_err());
    }
}
