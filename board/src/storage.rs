//! Persistence for the single cached access token.

use crate::identity::Credential;
use eyre::Context;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// The key the token is stored under.
pub const STORAGE_KEY: &str = "yt-token";

/// Somewhere to keep the credential between runs.
pub trait CredentialStore {
    fn load(&self) -> impl Future<Output = eyre::Result<Option<Credential>>> + Send;
    fn save(&self, credential: &Credential) -> impl Future<Output = eyre::Result<()>> + Send;
    fn clear(&self) -> impl Future<Output = eyre::Result<()>> + Send;
}

/// Stores the credential as `{"yt-token": "..."}` in a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> eyre::Result<Option<Credential>> {
        if !tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("check for {}", self.path.display()))?
        {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read {}", self.path.display()))?;
        let mut entries: BTreeMap<String, String> = match serde_json::from_str(&json) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable stored credential"
                );
                return Ok(None);
            }
        };
        Ok(entries
            .remove(STORAGE_KEY)
            .filter(|token| !token.is_empty())
            .map(Credential::new))
    }

    async fn save(&self, credential: &Credential) -> eyre::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create {}", dir.display()))?;
        }
        let entries = BTreeMap::from([(STORAGE_KEY, credential.secret())]);
        let json = serde_json::to_string(&entries).context("serialize credential")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("write {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "stored credential");
        Ok(())
    }

    async fn clear(&self) -> eyre::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed stored credential");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
    }
}

/// Keeps the credential in memory only. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Option<Credential>>>,
}

impl MemoryCredentialStore {
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(credential))),
        }
    }

    pub fn get(&self) -> Option<Credential> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, credential: Option<Credential>) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = credential;
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> eyre::Result<Option<Credential>> {
        Ok(self.get())
    }

    async fn save(&self, credential: &Credential) -> eyre::Result<()> {
        self.set(Some(credential.clone()));
        Ok(())
    }

    async fn clear(&self) -> eyre::Result<()> {
        self.set(None);
        Ok(())
    }
}
