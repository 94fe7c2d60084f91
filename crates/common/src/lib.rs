//! Shared types for the mini-overflow workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
