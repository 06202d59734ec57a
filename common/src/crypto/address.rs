use crate::{chain::ChainParams, network::Network};
use thiserror::Error;
use std::fmt::{Display, Error as FmtError, Formatter};

// 160-bit key or script digest carried by every address
pub const ADDRESS_PAYLOAD_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid base58 encoding: {0}")]
    InvalidEncoding(#[from] bs58::decode::Error),
    #[error("invalid address length: {0} bytes")]
    InvalidLength(usize),
    #[error("address version {0} is not valid for {1}")]
    InvalidVersion(u8, Network),
}

// A Base58Check encoded destination: one version byte identifying the
// network and the address kind, followed by the 160-bit payload.
// The checksum is the first four bytes of the payload's double SHA-256.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    version: u8,
    payload: [u8; ADDRESS_PAYLOAD_SIZE],
}

impl Address {
    pub const fn new(version: u8, payload: [u8; ADDRESS_PAYLOAD_SIZE]) -> Self {
        Self { version, payload }
    }

    // Parse a textual address and reject versions belonging to another network
    pub fn from_string(s: &str, params: &ChainParams) -> Result<Self, AddressError> {
        let decoded = bs58::decode(s).with_check(None).into_vec()?;
        if decoded.len() != ADDRESS_PAYLOAD_SIZE + 1 {
            return Err(AddressError::InvalidLength(decoded.len()));
        }

        let version = decoded[0];
        if !params.acceptable_address_versions().contains(&version) {
            return Err(AddressError::InvalidVersion(version, params.network()));
        }

        let mut payload = [0u8; ADDRESS_PAYLOAD_SIZE];
        payload.copy_from_slice(&decoded[1..]);
        Ok(Self { version, payload })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn payload(&self) -> &[u8; ADDRESS_PAYLOAD_SIZE] {
        &self.payload
    }

    pub fn is_p2sh(&self, params: &ChainParams) -> bool {
        self.version == params.p2sh_version()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut bytes = Vec::with_capacity(ADDRESS_PAYLOAD_SIZE + 1);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.payload);
        write!(f, "{}", bs58::encode(bytes).with_check().into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(seed: u8) -> [u8; ADDRESS_PAYLOAD_SIZE] {
        [seed; ADDRESS_PAYLOAD_SIZE]
    }

    #[test]
    fn test_round_trip() {
        let params = ChainParams::get(Network::Mainnet);
        let address = Address::new(params.address_version(), payload(0x42));
        let text = address.to_string();
        // mainnet standard addresses start with 'P'
        assert!(text.starts_with('P'), "{}", text);
        let parsed = Address::from_string(&text, params).unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_p2sh_version_accepted() {
        let params = ChainParams::get(Network::Mainnet);
        let address = Address::new(params.p2sh_version(), payload(0x01));
        let parsed = Address::from_string(&address.to_string(), params).unwrap();
        assert!(parsed.is_p2sh(params));
    }

    #[test]
    fn test_foreign_network_rejected() {
        let mainnet = ChainParams::get(Network::Mainnet);
        let testnet = ChainParams::get(Network::Testnet);
        let address = Address::new(testnet.address_version(), payload(0x07));
        match Address::from_string(&address.to_string(), mainnet) {
            Err(AddressError::InvalidVersion(version, network)) => {
                assert_eq!(version, testnet.address_version());
                assert_eq!(network, Network::Mainnet);
            }
            other => panic!("expected version rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let params = ChainParams::get(Network::Mainnet);
        let mut text = Address::new(params.address_version(), payload(0x42)).to_string();
        // flip the last character
        let last = text.pop().unwrap();
        text.push(if last == '1' { '2' } else { '1' });
        assert!(matches!(
            Address::from_string(&text, params),
            Err(AddressError::InvalidEncoding(_))
        ));
    }
}
