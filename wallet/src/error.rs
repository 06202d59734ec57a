use crate::node::NodeError;
use pecunia_common::network::Network;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("amount must be strictly positive")]
    ZeroAmount,
    #[error("insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: u64, have: u64 },
    #[error("address version {0} is not spendable on {1}")]
    ForeignAddress(u8, Network),
    #[error("wallet is locked and requires a passphrase")]
    WalletLocked,
    #[error(transparent)]
    Node(#[from] NodeError),
}
