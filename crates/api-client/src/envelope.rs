//! List response normalization
//!
//! List endpoints answer either with a paginated envelope
//! (`{"count": .., "next": .., "previous": .., "results": [..]}`, or the
//! `items` / `nextPageToken` spelling) or with a bare JSON array, depending
//! on backend pagination settings. Both are resolved here, once, into
//! `Listing<T>`.

use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Bare(Vec<T>),
    Paginated {
        #[serde(alias = "items")]
        results: Vec<T>,
        #[serde(default, alias = "nextPageToken")]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        #[serde(default)]
        count: Option<u64>,
    },
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Opaque continuation: the backend's `next` link or page token.
    pub next: Option<String>,
    pub previous: Option<String>,
    /// Total across all pages, when the backend reports it.
    pub total: Option<u64>,
}

impl<T: DeserializeOwned> Listing<T> {
    pub fn from_value(value: Value) -> Result<Self> {
        let envelope: Envelope<T> = serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("expected a list or paginated envelope: {e}")))?;
        Ok(match envelope {
            Envelope::Bare(items) => Listing {
                items,
                next: None,
                previous: None,
                total: None,
            },
            Envelope::Paginated {
                results,
                next,
                previous,
                count,
            } => Listing {
                items: results,
                next,
                previous,
                total: count,
            },
        })
    }
}

impl<T> Listing<T> {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Page number of the next page when `next` is a `?page=N` link.
    pub fn next_page(&self) -> Option<u32> {
        let next = self.next.as_deref()?;
        let url = Url::parse(next).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    }
}
