pub mod address;
pub mod hash;

pub use address::{Address, AddressError};
pub use hash::{hash, Hash, Hashable, HASH_SIZE};
