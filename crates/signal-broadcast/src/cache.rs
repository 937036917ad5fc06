//! Latest-signal cache.

use std::sync::{Arc, PoisonError, RwLock};

use signal_core::types::SignalsBatch;

/// Holds the most recent batch of signals, one per instrument.
///
/// The cache is replaced wholesale: an instrument missing from the new batch
/// disappears until a later cycle evaluates it again. Readers always see a
/// complete batch since only fully built batches are swapped in.
#[derive(Debug, Default)]
pub struct SignalCache {
    current: RwLock<Arc<SignalsBatch>>,
}

impl SignalCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current snapshot.
    pub fn get(&self) -> Arc<SignalsBatch> {
        self.read_then(Arc::clone)
    }

    /// Swap in a new batch, returning the shared handle to it.
    pub fn replace(&self, batch: SignalsBatch) -> Arc<SignalsBatch> {
        self.replace_then(Arc::new(batch), Arc::clone)
    }

    /// Number of instruments in the current snapshot.
    pub fn len(&self) -> usize {
        self.read_then(|batch| batch.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap in `batch` and run `f` before the write lock is released.
    pub(crate) fn replace_then<R>(
        &self,
        batch: Arc<SignalsBatch>,
        f: impl FnOnce(&Arc<SignalsBatch>) -> R,
    ) -> R {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = batch;
        f(&*current)
    }

    /// Run `f` against the current snapshot while holding the read lock.
    pub(crate) fn read_then<R>(&self, f: impl FnOnce(&Arc<SignalsBatch>) -> R) -> R {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(&*current)
    }
}
