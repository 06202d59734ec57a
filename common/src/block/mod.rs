mod header;

pub use header::BlockHeader;

// Serialized size of a block header on the wire
pub const HEADER_SIZE: usize = 80;
