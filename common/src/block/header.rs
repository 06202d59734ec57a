use crate::{
    crypto::{Hash, Hashable},
    serializer::{Reader, ReaderError, Serializer, Writer},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Error as FmtError, Formatter};

use super::HEADER_SIZE;

// Proof-of-work block header. The chain commits to transactions only
// through `merkle_root`; the header alone is enough for a light client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    pub previous_hash: Hash,
    pub merkle_root: Hash,
    // Unix seconds
    pub timestamp: u32,
    // Compact difficulty target
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub const fn new(
        version: u32,
        previous_hash: Hash,
        merkle_root: Hash,
        timestamp: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            previous_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
        }
    }
}

impl Serializer for BlockHeader {
    fn write(&self, writer: &mut Writer) {
        writer.write_u32(self.version);
        writer.write_hash(&self.previous_hash);
        writer.write_hash(&self.merkle_root);
        writer.write_u32(self.timestamp);
        writer.write_u32(self.bits);
        writer.write_u32(self.nonce);
    }

    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        Ok(Self {
            version: reader.read_u32()?,
            previous_hash: reader.read_hash()?,
            merkle_root: reader.read_hash()?,
            timestamp: reader.read_u32()?,
            bits: reader.read_u32()?,
            nonce: reader.read_u32()?,
        })
    }

    fn size(&self) -> usize {
        HEADER_SIZE
    }
}

impl Hashable for BlockHeader {}

impl Display for BlockHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "BlockHeader[version {}, previous {}, timestamp {}, bits {:#010x}, nonce {}]",
            self.version, self.previous_hash, self.timestamp, self.bits, self.nonce
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash;

    fn header() -> BlockHeader {
        BlockHeader::new(
            1,
            Hash::zero(),
            hash(b"merkle"),
            1417219200,
            0x1e0fffff,
            42,
        )
    }

    #[test]
    fn test_wire_size() {
        let header = header();
        assert_eq!(header.to_bytes().len(), HEADER_SIZE);
        assert_eq!(header.size(), HEADER_SIZE);
    }

    #[test]
    fn test_round_trip() {
        let header = header();
        let decoded = BlockHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_hash_commits_to_every_field() {
        let base = header();
        let mut changed = base.clone();
        changed.nonce += 1;
        assert_ne!(base.hash(), changed.hash());

        let mut changed = base.clone();
        changed.timestamp += 1;
        assert_ne!(base.hash(), changed.hash());

        let mut changed = base.clone();
        changed.bits = 0x1d00ffff;
        assert_ne!(base.hash(), changed.hash());
    }
}
