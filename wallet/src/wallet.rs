use crate::{
    config::EVENT_CHANNEL_SIZE,
    confirmation::{ConfirmationTracker, DepthFuture},
    entry::TransactionEntry,
    error::WalletError,
    node::{NodeClient, NodeError, RPC_INSUFFICIENT_FUNDS, RPC_WALLET_LOCKED},
};
use log::{debug, trace, warn};
use pecunia_common::{
    chain::ChainParams,
    crypto::{Address, Hash},
    utils::format_coins,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::{broadcast, oneshot};

// Wallet must be behind an Arc to be shared with the network handler
// and every forwarding continuation
pub type SharedWallet = Arc<Wallet>;

// Events propagated to subscribers
#[derive(Debug, Clone)]
pub enum Event {
    // A new transaction credited the wallet
    CoinsReceived { entry: TransactionEntry },
    BalanceChanged { balance: u64 },
    Online,
    Offline,
    SyncError { message: String },
}

// Handle returned by a spend submission
pub struct SendResult {
    pub hash: Hash,
    // Resolves once the daemon first reports the transaction on the
    // network; dropped unresolved when the wallet shuts down first
    pub broadcast_complete: oneshot::Receiver<Hash>,
}

struct WalletState {
    balance: u64,
    entries: HashMap<Hash, TransactionEntry>,
    // spends submitted but not yet seen by the daemon
    pending_broadcasts: HashMap<Hash, oneshot::Sender<Hash>>,
}

// Light wallet over a trusted daemon. The network handler feeds chain
// signals in through the `on_*` methods; applications observe through
// the event channel and spend through `send_coins`.
pub struct Wallet {
    params: &'static ChainParams,
    node: Arc<dyn NodeClient>,
    state: Mutex<WalletState>,
    tracker: ConfirmationTracker,
    events: broadcast::Sender<Event>,
}

impl Wallet {
    pub fn new(params: &'static ChainParams, node: Arc<dyn NodeClient>) -> SharedWallet {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Arc::new(Self {
            params,
            node,
            state: Mutex::new(WalletState {
                balance: 0,
                entries: HashMap::new(),
                pending_broadcasts: HashMap::new(),
            }),
            tracker: ConfirmationTracker::new(),
            events,
        })
    }

    pub fn params(&self) -> &'static ChainParams {
        self.params
    }

    pub fn node(&self) -> &Arc<dyn NodeClient> {
        &self.node
    }

    pub fn balance(&self) -> u64 {
        self.state.lock().unwrap().balance
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn propagate_event(&self, event: Event) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }

    // Value the given transaction sent to this wallet, if known
    pub fn value_sent_to_me(&self, hash: &Hash) -> Option<u64> {
        self.state.lock().unwrap().entries.get(hash).map(|e| e.value)
    }

    // Called by the network layer for each transaction crediting the
    // wallet. The first sighting credits the balance and emits
    // CoinsReceived; replays only refresh metadata.
    pub fn on_transaction_received(&self, entry: TransactionEntry) {
        let balance = {
            let mut state = self.state.lock().unwrap();
            if let Some(existing) = state.entries.get_mut(&entry.hash) {
                existing.height = entry.height;
                existing.confirmations = entry.confirmations;
                if existing.value != entry.value {
                    // a reorg changed the receipt; kept and surfaced when
                    // the value is read again
                    warn!(
                        "receipt value of {} changed from {} to {}",
                        entry.hash,
                        format_coins(existing.value),
                        format_coins(entry.value)
                    );
                    existing.value = entry.value;
                }
                return;
            }

            state.balance += entry.value;
            state.entries.insert(entry.hash.clone(), entry.clone());
            state.balance
        };

        debug!(
            "received {} in {}, new balance {}",
            format_coins(entry.value),
            entry.hash,
            format_coins(balance)
        );
        self.propagate_event(Event::BalanceChanged { balance });
        self.propagate_event(Event::CoinsReceived { entry });
    }

    // Depth signal from the network layer
    pub fn on_depth_changed(&self, hash: &Hash, depth: u32) {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(entry) = state.entries.get_mut(hash) {
                entry.confirmations = depth;
            }
        }
        self.tracker.notify(hash, depth);
    }

    // The daemon reported one of our submitted spends
    pub fn on_transaction_seen(&self, hash: &Hash) {
        let sender = self.state.lock().unwrap().pending_broadcasts.remove(hash);
        if let Some(sender) = sender {
            trace!("broadcast of {} complete", hash);
            let _ = sender.send(hash.clone());
        }
    }

    // Wait until `hash` reaches `required_depth`. Resolves immediately
    // when the entry is already deep enough.
    pub fn wait_for_depth(&self, hash: &Hash, required_depth: u32) -> DepthFuture {
        let current = {
            let state = self.state.lock().unwrap();
            state.entries.get(hash).map(|e| e.confirmations)
        };
        match current {
            Some(depth) if depth >= required_depth => DepthFuture::resolved(hash.clone()),
            _ => self.tracker.track(hash.clone(), required_depth),
        }
    }

    // Transactions still waiting for a confirmation depth
    pub fn tracked_transactions(&self) -> Vec<Hash> {
        self.tracker.tracked()
    }

    // Spends submitted but not yet seen on the network
    pub fn pending_broadcasts(&self) -> Vec<Hash> {
        self.state
            .lock()
            .unwrap()
            .pending_broadcasts
            .keys()
            .cloned()
            .collect()
    }

    // Submit a spend of `amount` to `destination` through the daemon.
    // Exactly one submission happens per call; nothing is retried here.
    pub async fn send_coins(
        &self,
        destination: &Address,
        amount: u64,
    ) -> Result<SendResult, WalletError> {
        if amount == 0 {
            return Err(WalletError::ZeroAmount);
        }
        if !self
            .params
            .acceptable_address_versions()
            .contains(&destination.version())
        {
            return Err(WalletError::ForeignAddress(
                destination.version(),
                self.params.network(),
            ));
        }

        let have = self.balance();
        if amount > have {
            return Err(WalletError::InsufficientBalance { need: amount, have });
        }

        let hash = self
            .node
            .send_to_address(destination.to_string(), amount)
            .await
            .map_err(|e| match e {
                NodeError::Rpc {
                    code: RPC_WALLET_LOCKED,
                    ..
                } => WalletError::WalletLocked,
                NodeError::Rpc {
                    code: RPC_INSUFFICIENT_FUNDS,
                    ..
                } => WalletError::InsufficientBalance { need: amount, have },
                other => WalletError::Node(other),
            })?;

        let (sender, receiver) = oneshot::channel();
        let balance = {
            let mut state = self.state.lock().unwrap();
            state.pending_broadcasts.insert(hash.clone(), sender);
            // the daemon owns the authoritative balance; this cache only
            // reflects what we know we spent
            state.balance = state.balance.saturating_sub(amount);
            state.balance
        };

        debug!("submitted spend {} of {}", hash, format_coins(amount));
        self.propagate_event(Event::BalanceChanged { balance });
        Ok(SendResult {
            hash,
            broadcast_complete: receiver,
        })
    }

    // Shutdown: abandoned trackers and broadcast watches resolve with an
    // error so no forwarding continuation runs afterwards
    pub fn shutdown(&self) {
        debug!("wallet shutting down");
        self.tracker.abandon_all();
        self.state.lock().unwrap().pending_broadcasts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pecunia_common::{
        api::daemon::{GetInfoResult, IncomingTransactionResult},
        config::{COIN_VALUE, VERSION},
        crypto::hash,
        network::Network,
    };

    struct TestNode {
        sends: Mutex<Vec<(String, u64)>>,
        send_error: Option<i32>,
    }

    impl TestNode {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sends: Mutex::new(Vec::new()),
                send_error: None,
            })
        }

        fn failing(code: i32) -> Arc<Self> {
            Arc::new(Self {
                sends: Mutex::new(Vec::new()),
                send_error: Some(code),
            })
        }
    }

    #[async_trait]
    impl NodeClient for TestNode {
        async fn get_info(&self) -> Result<GetInfoResult, NodeError> {
            Ok(GetInfoResult {
                version: VERSION.to_owned(),
                network: Network::Regtest,
                height: 0,
                top_block_hash: Hash::zero(),
            })
        }

        async fn get_block_hash_at_height(&self, _height: u64) -> Result<Hash, NodeError> {
            Ok(Hash::zero())
        }

        async fn list_incoming(
            &self,
            _min_height: Option<u64>,
        ) -> Result<Vec<IncomingTransactionResult>, NodeError> {
            Ok(Vec::new())
        }

        async fn get_confirmations(&self, _hash: &Hash) -> Result<u32, NodeError> {
            Ok(0)
        }

        async fn has_transaction(&self, _hash: &Hash) -> Result<bool, NodeError> {
            Ok(true)
        }

        async fn send_to_address(&self, address: String, amount: u64) -> Result<Hash, NodeError> {
            if let Some(code) = self.send_error {
                return Err(NodeError::Rpc {
                    code,
                    message: "rejected".to_owned(),
                });
            }
            self.sends.lock().unwrap().push((address, amount));
            Ok(hash(b"spend"))
        }
    }

    fn entry(seed: &[u8], value: u64) -> TransactionEntry {
        TransactionEntry {
            hash: hash(seed),
            value,
            height: None,
            confirmations: 0,
        }
    }

    fn destination(params: &ChainParams) -> Address {
        Address::new(params.address_version(), [7u8; 20])
    }

    #[tokio::test]
    async fn test_receive_credits_balance_once() {
        let wallet = Wallet::new(ChainParams::get(Network::Regtest), TestNode::new());
        let incoming = entry(b"a", COIN_VALUE);

        wallet.on_transaction_received(incoming.clone());
        assert_eq!(wallet.balance(), COIN_VALUE);
        assert_eq!(wallet.value_sent_to_me(&incoming.hash), Some(COIN_VALUE));

        // a replay only refreshes metadata
        wallet.on_transaction_received(incoming);
        assert_eq!(wallet.balance(), COIN_VALUE);
    }

    #[tokio::test]
    async fn test_send_coins_submits_through_node() {
        let node = TestNode::new();
        let wallet = Wallet::new(ChainParams::get(Network::Regtest), node.clone());
        wallet.on_transaction_received(entry(b"a", COIN_VALUE));

        let destination = destination(wallet.params());
        let result = wallet.send_coins(&destination, COIN_VALUE / 2).await.unwrap();

        let sends = node.sends.lock().unwrap();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0], (destination.to_string(), COIN_VALUE / 2));
        drop(sends);

        // broadcast completes when the daemon reports the transaction
        wallet.on_transaction_seen(&result.hash);
        assert_eq!(result.broadcast_complete.await.unwrap(), hash(b"spend"));
    }

    #[tokio::test]
    async fn test_send_coins_rejections() {
        let wallet = Wallet::new(ChainParams::get(Network::Regtest), TestNode::new());
        let destination = destination(wallet.params());

        assert!(matches!(
            wallet.send_coins(&destination, 0).await,
            Err(WalletError::ZeroAmount)
        ));
        assert!(matches!(
            wallet.send_coins(&destination, 100).await,
            Err(WalletError::InsufficientBalance { need: 100, have: 0 })
        ));

        // a mainnet address cannot be spent to from a regtest wallet
        let mainnet = ChainParams::get(Network::Mainnet);
        let foreign = Address::new(mainnet.address_version(), [7u8; 20]);
        wallet.on_transaction_received(entry(b"a", COIN_VALUE));
        assert!(matches!(
            wallet.send_coins(&foreign, 100).await,
            Err(WalletError::ForeignAddress(55, Network::Regtest))
        ));
    }

    #[tokio::test]
    async fn test_locked_wallet_is_fatal_for_the_spend() {
        let wallet = Wallet::new(
            ChainParams::get(Network::Regtest),
            TestNode::failing(RPC_WALLET_LOCKED),
        );
        wallet.on_transaction_received(entry(b"a", COIN_VALUE));
        let destination = destination(wallet.params());
        assert!(matches!(
            wallet.send_coins(&destination, 100).await,
            Err(WalletError::WalletLocked)
        ));
    }

    #[tokio::test]
    async fn test_wait_for_depth_immediate_when_deep_enough() {
        let wallet = Wallet::new(ChainParams::get(Network::Regtest), TestNode::new());
        let mut incoming = entry(b"a", COIN_VALUE);
        incoming.confirmations = 3;
        wallet.on_transaction_received(incoming.clone());

        let future = wallet.wait_for_depth(&incoming.hash, 1);
        assert_eq!(future.wait().await.unwrap(), incoming.hash);
    }

    #[tokio::test]
    async fn test_shutdown_abandons_everything() {
        let wallet = Wallet::new(ChainParams::get(Network::Regtest), TestNode::new());
        let incoming = entry(b"a", COIN_VALUE);
        wallet.on_transaction_received(incoming.clone());

        let future = wallet.wait_for_depth(&incoming.hash, 1);
        wallet.shutdown();
        assert!(future.wait().await.is_err());
    }
}
