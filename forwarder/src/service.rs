use anyhow::{anyhow, bail, Context, Result};
use log::{debug, error, info, warn};
use pecunia_common::{
    config::MIN_TX_FEE,
    crypto::{Address, Hash},
    utils::format_coins,
};
use pecunia_wallet::{
    entry::TransactionEntry,
    wallet::{Event, SharedWallet},
};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use tokio::sync::broadcast::{error::RecvError, Receiver};

// Forwards every confirmed payment the wallet receives to a fixed
// destination, minus the relay fee. One forward per incoming
// transaction, never retried: a failed forward needs an operator.
pub struct ForwardingService {
    wallet: SharedWallet,
    destination: Address,
    required_confirmations: u32,
    // transactions a forward was already started for; entries are never
    // removed, which is what makes the forward at-most-once
    forwarding: Mutex<HashSet<Hash>>,
}

impl ForwardingService {
    pub fn new(
        wallet: SharedWallet,
        destination: Address,
        required_confirmations: u32,
    ) -> Arc<Self> {
        Arc::new(Self {
            wallet,
            destination,
            required_confirmations,
            forwarding: Mutex::new(HashSet::new()),
        })
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    // Consume wallet events until the channel closes
    pub async fn run(self: Arc<Self>, mut events: Receiver<Event>) {
        loop {
            match events.recv().await {
                Ok(Event::CoinsReceived { entry }) => self.on_incoming(entry),
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!("event subscriber lagged, {} events dropped", missed)
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    // Called once per transaction crediting the wallet. Registers the
    // at-most-once marker, then waits for the configured depth before
    // forwarding. Duplicate calls for the same hash are no-ops.
    pub fn on_incoming(self: &Arc<Self>, entry: TransactionEntry) {
        if entry.value == 0 {
            debug!("ignoring {}, it did not credit the wallet", entry.hash);
            return;
        }

        {
            let mut forwarding = self.forwarding.lock().unwrap();
            if !forwarding.insert(entry.hash.clone()) {
                debug!("{} is already being forwarded", entry.hash);
                return;
            }
        }

        println!(
            "Received {} PEC in transaction {}",
            format_coins(entry.value),
            entry.hash
        );
        println!(
            "Transaction will be forwarded after {} confirmation(s).",
            self.required_confirmations
        );

        let depth = self
            .wallet
            .wait_for_depth(&entry.hash, self.required_confirmations);
        let zelf = Arc::clone(self);
        tokio::spawn(async move {
            match depth.wait().await {
                Ok(hash) => {
                    if let Err(e) = zelf.forward_coins(&hash, entry.value).await {
                        error!("failed to forward {}: {:#}", hash, e);
                    }
                }
                // shutdown; the forward must not run
                Err(e) => debug!("tracking of {} ended: {}", entry.hash, e),
            }
        });
    }

    // Build and submit the forward. The received value is re-read from
    // the wallet: a difference means a reorg changed the receipt while
    // we waited, which needs an operator, not a retry.
    async fn forward_coins(&self, hash: &Hash, received: u64) -> Result<()> {
        let value = self
            .wallet
            .value_sent_to_me(hash)
            .ok_or_else(|| anyhow!("no wallet entry for {}", hash))?;
        if value != received {
            bail!(
                "received value changed from {} to {} while waiting for confirmation",
                format_coins(received),
                format_coins(value)
            );
        }

        let amount = match value.checked_sub(MIN_TX_FEE) {
            Some(amount) if amount > 0 => amount,
            _ => {
                warn!(
                    "not forwarding {}: received {} does not cover the {} fee",
                    hash,
                    format_coins(value),
                    format_coins(MIN_TX_FEE)
                );
                return Ok(());
            }
        };

        info!("forwarding {} from {}", format_coins(amount), hash);
        let result = self
            .wallet
            .send_coins(&self.destination, amount)
            .await
            .context("spend submission failed")?;
        println!(
            "Sending {} PEC to {}...",
            format_coins(amount),
            self.destination
        );

        let forwarded = result
            .broadcast_complete
            .await
            .map_err(|_| anyhow!("broadcast of {} was abandoned", result.hash))?;
        println!("Sent coins onwards! Transaction hash is {}", forwarded);
        Ok(())
    }
}
