use log::trace;
use pecunia_common::crypto::Hash;
use std::{collections::HashMap, sync::Mutex};
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    // Shutdown happened before the depth was reached; the continuation
    // waiting on this future must not run
    #[error("confirmation tracking was abandoned before the depth was reached")]
    Abandoned,
}

struct Watcher {
    required_depth: u32,
    sender: oneshot::Sender<Hash>,
}

struct TrackerState {
    watchers: HashMap<Hash, Vec<Watcher>>,
    abandoned: bool,
}

// Tracks interest in transactions reaching a confirmation depth.
// Each `track` call resolves exactly once: the watcher is removed from
// the registry before its channel fires, so repeated depth signals at or
// above the requirement cannot resolve it twice. Depth only grows; the
// only other outcome is abandonment at shutdown.
pub struct ConfirmationTracker {
    state: Mutex<TrackerState>,
}

// Single-resolution handle returned by `track`
pub struct DepthFuture {
    receiver: oneshot::Receiver<Hash>,
}

impl DepthFuture {
    // A future already satisfied, for transactions that are deep enough
    // at registration time
    pub(crate) fn resolved(hash: Hash) -> Self {
        let (sender, receiver) = oneshot::channel();
        // the receiver is alive, this cannot fail
        let _ = sender.send(hash);
        Self { receiver }
    }

    pub async fn wait(self) -> Result<Hash, TrackerError> {
        self.receiver.await.map_err(|_| TrackerError::Abandoned)
    }
}

impl ConfirmationTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState {
                watchers: HashMap::new(),
                abandoned: false,
            }),
        }
    }

    // Register interest in `hash` reaching `required_depth`.
    // After `abandon_all` every new future resolves as abandoned.
    pub fn track(&self, hash: Hash, required_depth: u32) -> DepthFuture {
        let (sender, receiver) = oneshot::channel();
        let mut state = self.state.lock().unwrap();
        if !state.abandoned {
            trace!("tracking {} until depth {}", hash, required_depth);
            state.watchers.entry(hash).or_default().push(Watcher {
                required_depth,
                sender,
            });
        }
        // an abandoned tracker drops the sender, resolving the future
        // with TrackerError::Abandoned
        DepthFuture { receiver }
    }

    // Depth signal from the chain. Resolves and removes every watcher of
    // `hash` whose requirement is met.
    pub fn notify(&self, hash: &Hash, depth: u32) {
        let mut state = self.state.lock().unwrap();
        let drained = match state.watchers.get_mut(hash) {
            Some(watchers) => {
                let mut i = 0;
                while i < watchers.len() {
                    if watchers[i].required_depth <= depth {
                        let watcher = watchers.swap_remove(i);
                        // the waiting side may be gone already, nothing to do then
                        let _ = watcher.sender.send(hash.clone());
                    } else {
                        i += 1;
                    }
                }
                watchers.is_empty()
            }
            None => return,
        };

        if drained {
            state.watchers.remove(hash);
        }
    }

    // Hashes still waiting for their depth
    pub fn tracked(&self) -> Vec<Hash> {
        self.state.lock().unwrap().watchers.keys().cloned().collect()
    }

    // Shutdown: drop every pending watcher so their futures resolve as
    // abandoned, and refuse new registrations
    pub fn abandon_all(&self) {
        let mut state = self.state.lock().unwrap();
        state.abandoned = true;
        state.watchers.clear();
    }
}

impl Default for ConfirmationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pecunia_common::crypto::hash;

    #[tokio::test]
    async fn test_resolves_when_depth_reached() {
        let tracker = ConfirmationTracker::new();
        let hash = hash(b"tx");
        let future = tracker.track(hash.clone(), 3);

        tracker.notify(&hash, 1);
        tracker.notify(&hash, 2);
        assert_eq!(tracker.tracked(), vec![hash.clone()]);

        tracker.notify(&hash, 3);
        assert_eq!(future.wait().await.unwrap(), hash);
        assert!(tracker.tracked().is_empty());
    }

    #[tokio::test]
    async fn test_resolves_exactly_once() {
        let tracker = ConfirmationTracker::new();
        let hash = hash(b"tx");
        let future = tracker.track(hash.clone(), 1);

        // the depth signal may fire many times at or above the requirement
        tracker.notify(&hash, 1);
        tracker.notify(&hash, 1);
        tracker.notify(&hash, 5);

        assert_eq!(future.wait().await.unwrap(), hash);
        // nothing left registered, later signals are no-ops
        assert!(tracker.tracked().is_empty());
        tracker.notify(&hash, 6);
    }

    #[tokio::test]
    async fn test_independent_watchers() {
        let tracker = ConfirmationTracker::new();
        let hash = hash(b"tx");
        let shallow = tracker.track(hash.clone(), 1);
        let deep = tracker.track(hash.clone(), 6);

        tracker.notify(&hash, 1);
        assert_eq!(shallow.wait().await.unwrap(), hash);
        assert_eq!(tracker.tracked(), vec![hash.clone()]);

        tracker.notify(&hash, 6);
        assert_eq!(deep.wait().await.unwrap(), hash);
    }

    #[tokio::test]
    async fn test_abandon_resolves_with_error() {
        let tracker = ConfirmationTracker::new();
        let hash = hash(b"tx");
        let future = tracker.track(hash.clone(), 1);

        tracker.abandon_all();
        assert_eq!(future.wait().await, Err(TrackerError::Abandoned));

        // a depth signal arriving after shutdown must not revive anything
        tracker.notify(&hash, 10);
        let late = tracker.track(hash.clone(), 1);
        assert_eq!(late.wait().await, Err(TrackerError::Abandoned));
    }

    #[tokio::test]
    async fn test_pre_resolved_future() {
        let hash = hash(b"tx");
        let future = DepthFuture::resolved(hash.clone());
        assert_eq!(future.wait().await.unwrap(), hash);
    }
}
