use crate::{
    config::{AUTO_RECONNECT_INTERVAL, POLL_INTERVAL},
    node::NodeError,
    wallet::{Event, SharedWallet},
};
use anyhow::Error;
use log::{debug, error, trace, warn};
use pecunia_common::{crypto::Hash, network::Network};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{
    sync::Mutex,
    task::{JoinError, JoinHandle},
    time::sleep,
};

// NetworkHandler must be behind an Arc to be accessed from the owning
// application (to stop it) and from its own tokio task
pub type SharedNetworkHandler = Arc<NetworkHandler>;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network handler is already running")]
    AlreadyRunning,
    #[error("network handler is not running")]
    NotRunning,
    #[error("daemon is on {daemon}, wallet expects {expected}")]
    NetworkMismatch { daemon: Network, expected: Network },
    #[error("checkpoint mismatch at height {height}: daemon returned {found}, expected {expected}")]
    CheckpointMismatch {
        height: u64,
        found: Hash,
        expected: Hash,
    },
    #[error(transparent)]
    TaskError(#[from] JoinError),
    #[error(transparent)]
    Node(#[from] NodeError),
}

// What the poll loop has already established about the daemon's chain
struct SyncState {
    // height below which incoming transactions were already scanned
    scanned_height: Option<u64>,
    // highest checkpointed height verified against the daemon
    verified_checkpoint: u64,
}

// Feeds the wallet from the daemon: discovers incoming transactions,
// refreshes confirmation depths, confirms broadcasts and audits the
// daemon's chain against the hard-coded checkpoints.
pub struct NetworkHandler {
    // tokio task
    task: Mutex<Option<JoinHandle<Result<(), Error>>>>,
    // wallet for event propagation
    wallet: SharedWallet,
}

impl NetworkHandler {
    pub fn new(wallet: SharedWallet) -> SharedNetworkHandler {
        Arc::new(Self {
            task: Mutex::new(None),
            wallet,
        })
    }

    // Start the polling task. Verifies the daemon is on the expected
    // network first; a mismatch is fatal, not retried.
    pub async fn start(self: &Arc<Self>, auto_reconnect: bool) -> Result<(), NetworkError> {
        trace!("Starting network handler");

        if self.is_running().await {
            return Err(NetworkError::AlreadyRunning);
        }

        let info = self.wallet.node().get_info().await?;
        let expected = self.wallet.params().network();
        if info.network != expected {
            return Err(NetworkError::NetworkMismatch {
                daemon: info.network,
                expected,
            });
        }
        debug!(
            "daemon running version {} at height {}",
            info.version, info.height
        );

        let zelf = Arc::clone(self);
        *self.task.lock().await = Some(tokio::spawn(async move {
            let mut state = SyncState {
                scanned_height: None,
                verified_checkpoint: 0,
            };
            loop {
                zelf.wallet.propagate_event(Event::Online);

                let res = zelf.poll_loop(&mut state).await;
                if let Err(e) = res.as_ref() {
                    error!("Error while syncing with daemon: {}", e);
                    zelf.wallet.propagate_event(Event::SyncError {
                        message: e.to_string(),
                    });
                }

                zelf.wallet.propagate_event(Event::Offline);

                // a checkpoint divergence is conclusive: the chain the
                // daemon serves must be rejected, not polled again
                if let Err(e) = res.as_ref() {
                    if matches!(
                        e.downcast_ref::<NetworkError>(),
                        Some(NetworkError::CheckpointMismatch { .. })
                    ) {
                        break res;
                    }
                }

                if !auto_reconnect {
                    break res;
                }

                warn!(
                    "Connection to daemon lost, trying again in {} seconds",
                    AUTO_RECONNECT_INTERVAL
                );
                sleep(Duration::from_secs(AUTO_RECONNECT_INTERVAL)).await;
            }
        }));

        Ok(())
    }

    pub async fn stop(&self) -> Result<(), NetworkError> {
        trace!("Stopping network handler");
        let task = self.task.lock().await.take().ok_or(NetworkError::NotRunning)?;
        task.abort();
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        let task = self.task.lock().await;
        match task.as_ref() {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }

    async fn poll_loop(&self, state: &mut SyncState) -> Result<(), Error> {
        loop {
            self.poll_once(state).await?;
            sleep(Duration::from_secs(POLL_INTERVAL)).await;
        }
    }

    async fn poll_once(&self, state: &mut SyncState) -> Result<(), Error> {
        let node = self.wallet.node().clone();
        let info = node.get_info().await?;

        // audit every checkpointed height the daemon's chain newly reached
        let checkpoints = self.wallet.params().checkpoints();
        for height in checkpoints.heights() {
            if height <= state.verified_checkpoint || height > info.height {
                continue;
            }
            let found = node.get_block_hash_at_height(height).await?;
            if !checkpoints.verify(height, &found) {
                let expected = checkpoints
                    .expected_at(height)
                    .expect("verified height is checkpointed")
                    .clone();
                return Err(NetworkError::CheckpointMismatch {
                    height,
                    found,
                    expected,
                }
                .into());
            }
            trace!("checkpoint at height {} verified", height);
            state.verified_checkpoint = height;
        }

        // new transactions crediting the wallet
        for incoming in node.list_incoming(state.scanned_height).await? {
            self.wallet.on_transaction_received(incoming.into());
        }

        // refresh depth for transactions someone is waiting on
        for hash in self.wallet.tracked_transactions() {
            let depth = node.get_confirmations(&hash).await?;
            if depth > 0 {
                self.wallet.on_depth_changed(&hash, depth);
            }
        }

        // broadcast confirmations for submitted spends
        for hash in self.wallet.pending_broadcasts() {
            if node.has_transaction(&hash).await? {
                self.wallet.on_transaction_seen(&hash);
            }
        }

        state.scanned_height = Some(info.height);
        Ok(())
    }
}
