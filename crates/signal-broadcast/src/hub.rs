//! Subscriber fan-out.

use std::sync::Arc;

use signal_core::types::SignalsBatch;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::cache::SignalCache;

/// A newly attached subscriber.
///
/// `snapshot` is the cache contents at attach time and must be delivered
/// before anything read from `feed`.
pub struct Subscription {
    pub id: Uuid,
    pub snapshot: Arc<SignalsBatch>,
    pub feed: BroadcastStream<Arc<SignalsBatch>>,
}

/// Owns the signal cache and the broadcast channel subscribers listen on.
///
/// Publishing and attaching are serialized against the cache lock, so a
/// subscriber sees either the old snapshot followed by the new batch, or the
/// new snapshot alone; never a gap and never the same batch twice.
#[derive(Debug)]
pub struct SignalHub {
    cache: SignalCache,
    tx: broadcast::Sender<Arc<SignalsBatch>>,
}

impl SignalHub {
    /// Create a hub whose channel buffers up to `capacity` batches per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            cache: SignalCache::new(),
            tx,
        }
    }

    /// Attach a subscriber, handing it the current snapshot and a feed of
    /// future batches.
    pub fn attach(&self) -> Subscription {
        let (snapshot, rx) = self
            .cache
            .read_then(|current| (Arc::clone(current), self.tx.subscribe()));

        let id = Uuid::new_v4();
        debug!(subscriber = %id, instruments = snapshot.len(), "Subscriber attached");

        Subscription {
            id,
            snapshot,
            feed: BroadcastStream::new(rx),
        }
    }

    /// Replace the cache with `batch` and send it to every subscriber.
    ///
    /// Returns the number of subscribers the batch was delivered to.
    pub fn publish(&self, batch: SignalsBatch) -> usize {
        self.publish_shared(Arc::new(batch))
    }

    /// [`SignalHub::publish`] for a batch that is already shared.
    pub fn publish_shared(&self, batch: Arc<SignalsBatch>) -> usize {
        let reached = self.cache.replace_then(batch, |current| {
            // No receivers is not an error: the batch is still cached.
            self.tx.send(Arc::clone(current)).unwrap_or(0)
        });
        trace!(subscribers = reached, "Published batch");
        reached
    }

    /// Current cache snapshot.
    pub fn snapshot(&self) -> Arc<SignalsBatch> {
        self.cache.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new(64)
    }
}
