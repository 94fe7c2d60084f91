//! The `SessionStore` seam between the API client and token persistence

use std::future::Future;
use std::pin::Pin;

use common::Secret;

use crate::error::Result;

/// Boxed future returned by `SessionStore` methods.
///
/// Uses `Pin<Box<dyn Future>>` so the trait stays dyn-compatible and the
/// client can hold an `Arc<dyn SessionStore>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A token pair to be written to the store.
///
/// `refresh: None` removes any stored refresh token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub access: Secret<String>,
    pub refresh: Option<Secret<String>>,
}

impl TokenPair {
    pub fn new(access: impl Into<Secret<String>>, refresh: impl Into<Secret<String>>) -> Self {
        Self {
            access: access.into(),
            refresh: Some(refresh.into()),
        }
    }
}

/// Point-in-time view of the stored session.
///
/// `epoch` increments on every write, so two snapshots with equal epochs saw
/// the same token pair.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub access: Option<Secret<String>>,
    pub refresh: Option<Secret<String>>,
    pub epoch: u64,
}

impl Snapshot {
    /// Whether any credential is stored.
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// Storage for the access/refresh token pair.
///
/// Implementations serialize writes internally; callers may share one store
/// across tasks behind an `Arc`.
pub trait SessionStore: Send + Sync {
    /// Read both tokens and the current epoch.
    fn snapshot(&self) -> BoxFuture<'_, Result<Snapshot>>;

    /// Replace the stored pair unconditionally (login).
    fn set_tokens(&self, tokens: TokenPair) -> BoxFuture<'_, Result<()>>;

    /// Remove both tokens unconditionally (logout).
    fn clear(&self) -> BoxFuture<'_, Result<()>>;

    /// Replace the stored pair only if the epoch still equals `epoch`.
    ///
    /// Returns `false` without writing when another writer got there first.
    fn set_tokens_if(&self, epoch: u64, tokens: TokenPair) -> BoxFuture<'_, Result<bool>>;

    /// Remove both tokens only if the epoch still equals `epoch`.
    fn clear_if(&self, epoch: u64) -> BoxFuture<'_, Result<bool>>;

    fn get_access(&self) -> BoxFuture<'_, Result<Option<Secret<String>>>> {
        Box::pin(async move { Ok(self.snapshot().await?.access) })
    }

    fn get_refresh(&self) -> BoxFuture<'_, Result<Option<Secret<String>>>> {
        Box::pin(async move { Ok(self.snapshot().await?.refresh) })
    }
}

/// In-memory slot state shared by the store implementations.
#[derive(Debug, Default)]
pub(crate) struct Slots {
    pub access: Option<Secret<String>>,
    pub refresh: Option<Secret<String>>,
    pub epoch: u64,
}

impl Slots {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
            epoch: self.epoch,
        }
    }

    pub fn replace(&mut self, tokens: TokenPair) {
        self.access = Some(tokens.access);
        self.refresh = tokens.refresh;
        self.epoch += 1;
    }

    pub fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
        self.epoch += 1;
    }
}
