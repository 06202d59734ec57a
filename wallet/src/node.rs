use async_trait::async_trait;
use pecunia_common::{
    api::daemon::{GetInfoResult, IncomingTransactionResult},
    crypto::Hash,
};
use thiserror::Error;

// RPC error codes the daemon uses to reject a spend
pub const RPC_INSUFFICIENT_FUNDS: i32 = -6;
pub const RPC_WALLET_LOCKED: i32 = -13;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("daemon rpc error (code {code}): {message}")]
    Rpc { code: i32, message: String },
    #[error("unexpected rpc response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

// Everything the wallet needs from the node it trusts. The daemon owns
// networking, chain validation, keys and transaction construction; the
// wallet only observes and submits through this interface.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn get_info(&self) -> Result<GetInfoResult, NodeError>;

    async fn get_block_hash_at_height(&self, height: u64) -> Result<Hash, NodeError>;

    // Transactions crediting the wallet, mined at or above `min_height`
    // plus everything still in the mempool
    async fn list_incoming(
        &self,
        min_height: Option<u64>,
    ) -> Result<Vec<IncomingTransactionResult>, NodeError>;

    async fn get_confirmations(&self, hash: &Hash) -> Result<u32, NodeError>;

    // Whether the daemon knows the transaction (mempool or chain)
    async fn has_transaction(&self, hash: &Hash) -> Result<bool, NodeError>;

    // Build, sign and broadcast a spend of `amount` to `address`,
    // returning the new transaction hash
    async fn send_to_address(&self, address: String, amount: u64) -> Result<Hash, NodeError>;
}
