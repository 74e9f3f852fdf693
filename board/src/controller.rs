//! The session state machine behind the board.
//!
//! A [`Controller`] owns the credential for one user session. It logs the user in through an
//! [`IdentityProvider`], loads the board from a [`ChannelSource`], and publishes every change of
//! [`BoardState`] on a watch channel for the presentation layer to render.
//!
//! ```text
//! LoggedOut ──login──▶ Authenticating ──ok──▶ Loading ──ok──▶ Ready
//!     ▲                     │                   │  │             │
//!     └─────── denied ──────┘                   │  └──error──▶ Errored
//!     ▲                                         │                │
//!     └────────── credential rejected ──────────┘                │
//!     └───────────────────────── logout ─────────────────────────┘
//! ```

use crate::identity::{Credential, IdentityProvider};
use crate::model::{Channel, sort_by_recency};
use crate::source::ChannelSource;
use crate::storage::CredentialStore;
use eyre::Context;
use tokio::sync::watch;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please connect again.";
pub const LOAD_FAILED: &str = "Failed to fetch YouTube data. Please try again later.";
pub const SAVE_FAILED: &str = "Could not save your session. Please connect again.";

/// What the presentation layer should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardState {
    /// No credential. `message` explains why, if there is something to explain.
    LoggedOut { message: Option<String> },
    Authenticating,
    Loading,
    /// The board, newest video first. May be empty.
    Ready(Vec<Channel>),
    Errored(String),
}

impl BoardState {
    pub fn channels(&self) -> &[Channel] {
        match self {
            Self::Ready(channels) => channels,
            _ => &[],
        }
    }
}

/// Owns one user's session: the credential and the board loaded with it.
pub struct Controller<I, S, K> {
    identity: I,
    source: S,
    store: K,
    credential: Option<Credential>,
    state: watch::Sender<BoardState>,
}

impl<I, S, K> Controller<I, S, K>
where
    I: IdentityProvider,
    S: ChannelSource,
    K: CredentialStore,
{
    pub fn new(identity: I, source: S, store: K) -> Self {
        let (state, _) = watch::channel(BoardState::LoggedOut { message: None });
        Self {
            identity,
            source,
            store,
            credential: None,
            state,
        }
    }

    /// Returns a receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> BoardState {
        self.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.credential.is_some()
    }

    fn transition(&self, next: BoardState) {
        tracing::debug!(
            state = match &next {
                BoardState::LoggedOut { .. } => "logged-out",
                BoardState::Authenticating => "authenticating",
                BoardState::Loading => "loading",
                BoardState::Ready(_) => "ready",
                BoardState::Errored(_) => "errored",
            },
            "board state transition"
        );
        self.state.send_replace(next);
    }

    /// Resumes a stored session, loading the board if there is one.
    pub async fn start(&mut self) -> eyre::Result<()> {
        if self.restore().await? {
            self.load().await
        } else {
            Ok(())
        }
    }

    /// Picks up the stored credential without loading anything. Returns whether there was one.
    pub async fn restore(&mut self) -> eyre::Result<bool> {
        match self.store.load().await.context("load stored credential")? {
            Some(credential) => {
                tracing::info!("resuming stored session");
                self.credential = Some(credential);
                Ok(true)
            }
            None => {
                tracing::debug!("no stored session");
                Ok(false)
            }
        }
    }

    /// Asks the identity provider for a fresh credential and loads the board with it.
    ///
    /// A refused login leaves the session logged out, with the reason in the state. If the
    /// credential cannot be stored the session is logged out too, and the error is returned.
    pub async fn login(&mut self) -> eyre::Result<()> {
        self.transition(BoardState::Authenticating);
        let credential = match self.identity.request_token().await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.transition(BoardState::LoggedOut {
                    message: Some(format!(
                        "Google Auth Error: {e}. Please check your Client ID and Authorized \
                         Origins in the Google Cloud Console."
                    )),
                });
                return Ok(());
            }
        };
        if let Err(e) = self.store.save(&credential).await {
            self.transition(BoardState::LoggedOut {
                message: Some(SAVE_FAILED.to_string()),
            });
            return Err(e).context("store credential");
        }
        self.credential = Some(credential);
        self.load().await
    }

    /// Loads the board again with the current credential. Does nothing while logged out.
    pub async fn reload(&mut self) -> eyre::Result<()> {
        if self.credential.is_none() {
            tracing::debug!("not reloading, no credential");
            return Ok(());
        }
        self.load().await
    }

    /// Revokes the credential, forgets it and the board, and returns to logged out.
    pub async fn logout(&mut self) -> eyre::Result<()> {
        if let Some(credential) = self.credential.take() {
            if let Err(e) = self.identity.revoke(&credential).await {
                tracing::warn!(error = %e, "failed to revoke credential");
            }
        }
        self.transition(BoardState::LoggedOut { message: None });
        self.store.clear().await.context("clear stored credential")
    }

    /// Fetches the board exactly once and settles in `Ready`, `Errored` or `LoggedOut`.
    ///
    /// The state is settled even when forgetting a rejected credential fails.
    async fn load(&mut self) -> eyre::Result<()> {
        let Some(credential) = &self.credential else {
            return Ok(());
        };
        self.transition(BoardState::Loading);

        match self.source.fetch_channels(credential).await {
            Ok(mut channels) => {
                sort_by_recency(&mut channels);
                tracing::info!(channels = channels.len(), "board ready");
                self.transition(BoardState::Ready(channels));
            }
            Err(e) if e.is_auth() => {
                tracing::warn!("credential rejected, logging out");
                self.credential = None;
                self.transition(BoardState::LoggedOut {
                    message: Some(SESSION_EXPIRED.to_string()),
                });
                self.store.clear().await.context("clear stored credential")?;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load board");
                self.transition(BoardState::Errored(LOAD_FAILED.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{mock_search, mock_subscriptions, mock_videos, video_json};
    use crate::error::{BoardError, Result};
    use crate::identity::IdentityError;
    use crate::model::tests::channel;
    use crate::source::LiveSource;
    use crate::storage::{FileCredentialStore, MemoryCredentialStore};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default, Clone)]
    struct FakeIdentity {
        deny: bool,
        revoked: Arc<AtomicUsize>,
    }

    impl IdentityProvider for FakeIdentity {
        async fn request_token(&self) -> Result<Credential, IdentityError> {
            if self.deny {
                Err(IdentityError::Denied {
                    error: "access_denied".to_string(),
                    description: None,
                })
            } else {
                Ok(Credential::new("fresh"))
            }
        }

        async fn revoke(&self, _credential: &Credential) -> Result<(), IdentityError> {
            self.revoked.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum Outcome {
        Channels,
        Auth,
        Transport,
    }

    #[derive(Clone)]
    struct FakeSource {
        outcome: Outcome,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChannelSource for FakeSource {
        async fn fetch_channels(&self, _credential: &Credential) -> Result<Vec<Channel>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Channels => Ok(vec![
                    channel("old", "2025-05-01T00:00:00Z"),
                    channel("new", "2025-05-03T00:00:00Z"),
                ]),
                Outcome::Auth => Err(BoardError::Auth),
                Outcome::Transport => Err(BoardError::Transport {
                    status: None,
                    message: "connection reset".to_string(),
                }),
            }
        }
    }

    /// Holds a credential in memory but fails every write.
    #[derive(Default, Clone)]
    struct ReadOnlyStore {
        inner: MemoryCredentialStore,
    }

    impl CredentialStore for ReadOnlyStore {
        async fn load(&self) -> eyre::Result<Option<Credential>> {
            self.inner.load().await
        }

        async fn save(&self, _credential: &Credential) -> eyre::Result<()> {
            eyre::bail!("disk full")
        }

        async fn clear(&self) -> eyre::Result<()> {
            eyre::bail!("disk full")
        }
    }

    fn ids(state: &BoardState) -> Vec<&str> {
        state.channels().iter().map(|c| c.channel_id.as_str()).collect()
    }

    #[tokio::test]
    async fn start_without_credential_stays_logged_out() {
        let source = FakeSource::new(Outcome::Channels);
        let mut c = Controller::new(
            FakeIdentity::default(),
            source.clone(),
            MemoryCredentialStore::default(),
        );
        c.start().await.unwrap();
        assert_eq!(c.state(), BoardState::LoggedOut { message: None });
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn start_with_credential_loads_sorted_board() {
        let source = FakeSource::new(Outcome::Channels);
        let store = MemoryCredentialStore::with_credential(Credential::new("stored"));
        let mut c = Controller::new(FakeIdentity::default(), source.clone(), store);
        let mut rx = c.subscribe();

        c.start().await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(ids(&c.state()), ["new", "old"]);
        assert!(rx.has_changed().unwrap());
        assert!(matches!(*rx.borrow_and_update(), BoardState::Ready(_)));
    }

    #[tokio::test]
    async fn login_stores_credential_and_loads() {
        let source = FakeSource::new(Outcome::Channels);
        let store = MemoryCredentialStore::default();
        let mut c = Controller::new(FakeIdentity::default(), source.clone(), store.clone());

        c.login().await.unwrap();
        assert_eq!(store.get(), Some(Credential::new("fresh")));
        assert_eq!(source.calls(), 1);
        assert_eq!(ids(&c.state()), ["new", "old"]);
    }

    #[tokio::test]
    async fn denied_login_reports_error() {
        let source = FakeSource::new(Outcome::Channels);
        let store = MemoryCredentialStore::default();
        let identity = FakeIdentity {
            deny: true,
            ..Default::default()
        };
        let mut c = Controller::new(identity, source.clone(), store.clone());

        c.login().await.unwrap();
        assert_eq!(
            c.state(),
            BoardState::LoggedOut {
                message: Some(
                    "Google Auth Error: access_denied. Please check your Client ID and \
                     Authorized Origins in the Google Cloud Console."
                        .to_string()
                )
            }
        );
        assert_eq!(store.get(), None);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_credential_forces_logout() {
        let source = FakeSource::new(Outcome::Auth);
        let store = MemoryCredentialStore::with_credential(Credential::new("stale"));
        let mut c = Controller::new(FakeIdentity::default(), source, store.clone());

        c.start().await.unwrap();
        assert_eq!(
            c.state(),
            BoardState::LoggedOut {
                message: Some(SESSION_EXPIRED.to_string())
            }
        );
        assert_eq!(store.get(), None);
        assert!(!c.is_logged_in());
    }

    #[tokio::test]
    async fn other_failures_keep_credential() {
        let source = FakeSource::new(Outcome::Transport);
        let store = MemoryCredentialStore::with_credential(Credential::new("ok"));
        let mut c = Controller::new(FakeIdentity::default(), source.clone(), store.clone());

        c.start().await.unwrap();
        assert_eq!(c.state(), BoardState::Errored(LOAD_FAILED.to_string()));
        assert_eq!(store.get(), Some(Credential::new("ok")));

        // no automatic retry, but the user can ask again
        assert_eq!(source.calls(), 1);
        c.reload().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let source = FakeSource::new(Outcome::Channels);
        let store = MemoryCredentialStore::with_credential(Credential::new("stored"));
        let identity = FakeIdentity::default();
        let mut c = Controller::new(identity.clone(), source.clone(), store.clone());

        c.start().await.unwrap();
        assert_eq!(c.state().channels().len(), 2);

        c.logout().await.unwrap();
        assert_eq!(identity.revoked.load(Ordering::SeqCst), 1);
        assert_eq!(c.state(), BoardState::LoggedOut { message: None });
        assert!(c.state().channels().is_empty());
        assert_eq!(store.get(), None);

        c.reload().await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(c.state(), BoardState::LoggedOut { message: None });
    }

    #[tokio::test]
    async fn logout_after_restore_revokes_without_loading() {
        let source = FakeSource::new(Outcome::Channels);
        let store = MemoryCredentialStore::with_credential(Credential::new("stored"));
        let identity = FakeIdentity::default();
        let mut c = Controller::new(identity.clone(), source.clone(), store.clone());

        assert!(c.restore().await.unwrap());
        c.logout().await.unwrap();
        assert_eq!(source.calls(), 0);
        assert_eq!(identity.revoked.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn failed_save_settles_logged_out() {
        let source = FakeSource::new(Outcome::Channels);
        let mut c = Controller::new(
            FakeIdentity::default(),
            source.clone(),
            ReadOnlyStore::default(),
        );

        assert!(c.login().await.is_err());
        assert_eq!(
            c.state(),
            BoardState::LoggedOut {
                message: Some(SAVE_FAILED.to_string())
            }
        );
        assert!(!c.is_logged_in());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn failed_clear_after_rejection_still_settles() {
        let store = ReadOnlyStore {
            inner: MemoryCredentialStore::with_credential(Credential::new("stale")),
        };
        let source = FakeSource::new(Outcome::Auth);
        let mut c = Controller::new(FakeIdentity::default(), source, store);

        assert!(c.start().await.is_err());
        assert_eq!(
            c.state(),
            BoardState::LoggedOut {
                message: Some(SESSION_EXPIRED.to_string())
            }
        );
        assert!(!c.is_logged_in());
    }

    #[tokio::test]
    async fn logout_removes_unreadable_credential_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credential.json");
        std::fs::write(&path, "ya29.bare-token").unwrap();

        let source = FakeSource::new(Outcome::Channels);
        let identity = FakeIdentity::default();
        let mut c = Controller::new(
            identity.clone(),
            source.clone(),
            FileCredentialStore::new(&path),
        );

        assert!(!c.restore().await.unwrap());
        c.logout().await.unwrap();
        assert!(!path.exists());
        assert_eq!(identity.revoked.load(Ordering::SeqCst), 0);
        assert_eq!(c.state(), BoardState::LoggedOut { message: None });
    }

    #[tokio::test]
    async fn end_to_end_against_youtube() {
        let mut server = mockito::Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["A", "B", "C"]).await;
        let _sa = mock_search(&mut server, "A", Some("va")).await;
        let _sb = mock_search(&mut server, "B", Some("vb")).await;
        let _sc = mock_search(&mut server, "C", None).await;
        let _videos = mock_videos(
            &mut server,
            vec![
                video_json("va", "2025-05-01T10:00:00Z"),
                video_json("vb", "2025-05-02T10:00:00Z"),
            ],
        )
        .await;

        let source = LiveSource::new(reqwest::Client::new()).with_base_url(server.url());
        let store = MemoryCredentialStore::with_credential(Credential::new("tok"));
        let mut c = Controller::new(FakeIdentity::default(), source, store);

        c.start().await.unwrap();
        assert_eq!(ids(&c.state()), ["B", "A"]);
    }

    #[tokio::test]
    async fn end_to_end_forbidden_logs_out() {
        let mut server = mockito::Server::new_async().await;
        let _subs = server
            .mock("GET", "/subscriptions")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let source = LiveSource::new(reqwest::Client::new()).with_base_url(server.url());
        let store = MemoryCredentialStore::with_credential(Credential::new("tok"));
        let mut c = Controller::new(FakeIdentity::default(), source, store.clone());

        c.start().await.unwrap();
        assert_eq!(
            c.state(),
            BoardState::LoggedOut {
                message: Some(SESSION_EXPIRED.to_string())
            }
        );
        assert_eq!(store.get(), None);
    }
}
