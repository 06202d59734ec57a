mod checkpoints;
mod genesis;
mod params;

pub use checkpoints::Checkpoints;
pub use genesis::{check_genesis, GenesisMismatch};
pub use params::ChainParams;
