use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::CancelReason;

/// Registry of in-flight requests keyed by fingerprint.
///
/// Invariant: at most one live entry per fingerprint. Registering a duplicate
/// cancels and removes the prior entry in the same critical section, so no
/// window exists where two entries for one fingerprint are live.
#[derive(Default)]
pub(crate) struct PendingRequests {
    entries: Mutex<HashMap<String, Entry>>,
    next_id: AtomicU64,
}

struct Entry {
    id: u64,
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl Entry {
    fn cancel(self, reason: CancelReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }
}

/// Cancellation handle held by a single dispatch for its own lifetime.
pub(crate) struct PendingSlot {
    id: u64,
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl PendingSlot {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Resolves when this dispatch is cancelled, yielding the reason.
    pub(crate) async fn cancelled(&self) -> CancelReason {
        self.token.cancelled().await;
        self.reason
            .get()
            .copied()
            .unwrap_or(CancelReason::Superseded)
    }
}

impl PendingRequests {
    /// Register a dispatch under `fingerprint`, superseding any live duplicate.
    pub(crate) fn begin(&self, fingerprint: &str) -> PendingSlot {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let reason = Arc::new(OnceLock::new());

        let mut entries = self.entries.lock();
        if let Some(prior) = entries.remove(fingerprint) {
            prior.cancel(CancelReason::Superseded);
        }
        entries.insert(
            fingerprint.to_owned(),
            Entry {
                id,
                token: token.clone(),
                reason: Arc::clone(&reason),
            },
        );

        PendingSlot { id, token, reason }
    }

    /// Remove the entry for a settled dispatch.
    ///
    /// Only removes when the registered id still matches: a late settlement of
    /// a superseded dispatch must not evict its successor's entry.
    pub(crate) fn settle(&self, fingerprint: &str, id: u64) {
        let mut entries = self.entries.lock();
        if entries.get(fingerprint).is_some_and(|entry| entry.id == id) {
            entries.remove(fingerprint);
        }
    }

    /// Cancel every live entry and clear the registry.
    pub(crate) fn cancel_all(&self) {
        let mut entries = self.entries.lock();
        for (_, entry) in entries.drain() {
            entry.cancel(CancelReason::CancelAll);
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.entries.lock().len()
    }
}
