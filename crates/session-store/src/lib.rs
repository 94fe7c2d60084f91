//! Session token storage for the mini-overflow API client
//!
//! Holds the access/refresh token pair behind the `SessionStore` trait so the
//! client owns an injectable store instead of reaching for ambient global
//! state. Two implementations ship here:
//!
//! - `MemoryStore` keeps the pair in process (tests, short-lived tools)
//! - `FileStore` persists a string key-value file that survives restarts,
//!   with the access token under `token` and the refresh token under `refresh`
//!
//! Every write bumps an epoch counter. Writers that raced with a newer login
//! use `set_tokens_if` / `clear_if` so a late refresh result never clobbers
//! a session established after it started.

pub mod claims;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use claims::{AccessClaims, decode_unverified};
pub use error::{Error, Result};
pub use file::{ACCESS_KEY, FileStore, REFRESH_KEY};
pub use memory::MemoryStore;
pub use store::{BoxFuture, SessionStore, Snapshot, TokenPair};
