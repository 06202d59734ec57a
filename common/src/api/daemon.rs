use crate::{crypto::Hash, network::Network};
use serde::{Deserialize, Serialize};

// Data types of the daemon JSON-RPC interface consumed by light wallets.
// The daemon owns networking, validation and key management; wallets only
// see these shapes.

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GetInfoResult {
    pub version: String,
    pub network: Network,
    // Best chain height
    pub height: u64,
    pub top_block_hash: Hash,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GetBlockHashAtHeightParams {
    pub height: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListIncomingParams {
    // Only return entries mined at or above this height.
    // Mempool entries are always included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u64>,
}

// A transaction crediting the wallet, as reported by the daemon
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IncomingTransactionResult {
    pub hash: Hash,
    // Value received by the wallet, in atomic units
    pub value: u64,
    // Height of the including block, absent while in mempool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    pub confirmations: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GetConfirmationsParams {
    pub hash: Hash,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HasTransactionParams {
    pub hash: Hash,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendToAddressParams {
    pub address: String,
    // Amount in atomic units; the daemon adds the relay fee on top
    pub amount: u64,
}
