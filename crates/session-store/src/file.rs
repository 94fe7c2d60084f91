//! File-backed session store
//!
//! Persists a flat JSON object of string keys, the same shape a browser's
//! local storage would hold: the access token under `token`, the refresh
//! token under `refresh`. Keys this crate does not own are preserved on
//! every write. All writes use atomic temp-file + rename and a tokio Mutex
//! serializes them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use common::Secret;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{BoxFuture, SessionStore, Snapshot, TokenPair};

/// Storage key holding the access token.
pub const ACCESS_KEY: &str = "token";

/// Storage key holding the refresh token.
pub const REFRESH_KEY: &str = "refresh";

#[derive(Debug)]
struct FileState {
    entries: BTreeMap<String, String>,
    epoch: u64,
}

impl FileState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            access: self.entries.get(ACCESS_KEY).cloned().map(Secret::new),
            refresh: self.entries.get(REFRESH_KEY).cloned().map(Secret::new),
            epoch: self.epoch,
        }
    }

    /// Entries with `tokens` in place of the stored pair.
    fn with_tokens(&self, tokens: &TokenPair) -> BTreeMap<String, String> {
        let mut entries = self.entries.clone();
        entries.insert(ACCESS_KEY.to_owned(), tokens.access.expose().clone());
        match &tokens.refresh {
            Some(refresh) => {
                entries.insert(REFRESH_KEY.to_owned(), refresh.expose().clone());
            }
            None => {
                entries.remove(REFRESH_KEY);
            }
        }
        entries
    }

    /// Entries with both tokens removed.
    fn without_tokens(&self) -> BTreeMap<String, String> {
        let mut entries = self.entries.clone();
        entries.remove(ACCESS_KEY);
        entries.remove(REFRESH_KEY);
        entries
    }

    /// Adopt entries that are already on disk.
    fn commit(&mut self, entries: BTreeMap<String, String>) {
        self.entries = entries;
        self.epoch += 1;
    }
}

/// Session store persisted to a JSON file.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FileStore {
    /// Load the session file at `path`.
    ///
    /// A missing file is a logged-out session: the parent directory is
    /// created and the file written as `{}`.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing session file: {e}")))?;
            info!(
                path = %path.display(),
                logged_in = entries.contains_key(ACCESS_KEY),
                "loaded session"
            );
            entries
        } else {
            info!(path = %path.display(), "session file not found, starting logged out");
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| Error::Io(format!("creating session directory: {e}")))?;
            }
            let entries = BTreeMap::new();
            write_atomic(&path, &entries).await?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(FileState { entries, epoch: 0 }),
        })
    }

    /// Read an arbitrary key.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.state.lock().await.entries.get(key).cloned()
    }

    /// Persist `entries`, then make them the live session. A failed write
    /// leaves memory and epoch untouched.
    async fn persist(&self, state: &mut FileState, entries: BTreeMap<String, String>) -> Result<()> {
        write_atomic(&self.path, &entries).await?;
        state.commit(entries);
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn snapshot(&self) -> BoxFuture<'_, Result<Snapshot>> {
        Box::pin(async move { Ok(self.state.lock().await.snapshot()) })
    }

    fn set_tokens(&self, tokens: TokenPair) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let entries = state.with_tokens(&tokens);
            self.persist(&mut state, entries).await?;
            debug!(epoch = state.epoch, "stored session tokens");
            Ok(())
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let entries = state.without_tokens();
            self.persist(&mut state, entries).await?;
            debug!(epoch = state.epoch, "cleared session tokens");
            Ok(())
        })
    }

    fn set_tokens_if(&self, epoch: u64, tokens: TokenPair) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                debug!(expected = epoch, actual = state.epoch, "stale token write skipped");
                return Ok(false);
            }
            let entries = state.with_tokens(&tokens);
            self.persist(&mut state, entries).await?;
            Ok(true)
        })
    }

    fn clear_if(&self, epoch: u64) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                debug!(expected = epoch, actual = state.epoch, "stale session clear skipped");
                return Ok(false);
            }
            let entries = state.without_tokens();
            self.persist(&mut state, entries).await?;
            Ok(true)
        })
    }
}

/// Write the entries to `path` atomically with 0600 permissions.
async fn write_atomic(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| Error::Parse(format!("serializing session: {e}")))?;

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}
