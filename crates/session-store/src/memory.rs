//! In-process session store

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::store::{BoxFuture, SessionStore, Slots, Snapshot, TokenPair};

/// Session store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<Slots>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token pair (epoch 1).
    pub fn with_tokens(tokens: TokenPair) -> Self {
        let mut slots = Slots::default();
        slots.replace(tokens);
        Self {
            slots: Mutex::new(slots),
        }
    }
}

impl SessionStore for MemoryStore {
    fn snapshot(&self) -> BoxFuture<'_, Result<Snapshot>> {
        Box::pin(async move { Ok(self.slots.lock().await.snapshot()) })
    }

    fn set_tokens(&self, tokens: TokenPair) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut slots = self.slots.lock().await;
            slots.replace(tokens);
            debug!(epoch = slots.epoch, "stored session tokens");
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut slots = self.slots.lock().await;
            slots.clear();
            debug!(epoch = slots.epoch, "cleared session tokens");
            Ok(())
        })
    }

    fn set_tokens_if(&self, epoch: u64, tokens: TokenPair) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut slots = self.slots.lock().await;
            if slots.epoch != epoch {
                debug!(expected = epoch, actual = slots.epoch, "stale token write skipped");
                return Ok(false);
            }
            slots.replace(tokens);
            Ok(true)
        })
    }

    fn clear_if(&self, epoch: u64) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut slots = self.slots.lock().await;
            if slots.epoch != epoch {
                debug!(expected = epoch, actual = slots.epoch, "stale session clear skipped");
                return Ok(false);
            }
            slots.clear();
            Ok(true)
        })
    }
}
