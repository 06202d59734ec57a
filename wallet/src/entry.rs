use pecunia_common::{api::daemon::IncomingTransactionResult, crypto::Hash};
use serde::{Deserialize, Serialize};

// A transaction that credited the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub hash: Hash,
    // Value received by this wallet, in atomic units
    pub value: u64,
    // Height of the including block, None while in mempool
    pub height: Option<u64>,
    pub confirmations: u32,
}

impl From<IncomingTransactionResult> for TransactionEntry {
    fn from(result: IncomingTransactionResult) -> Self {
        Self {
            hash: result.hash,
            value: result.value,
            height: result.height,
            confirmations: result.confirmations,
        }
    }
}
