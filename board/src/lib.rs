//! A board of the newest video from each of a user's YouTube subscriptions.
//!
//! The [`Controller`] drives a session: it signs the user in through an [`IdentityProvider`],
//! fetches the board from a [`ChannelSource`] and publishes [`BoardState`] changes. Cards can
//! be annotated with AI summaries through [`SummaryRequester`].

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod gemini;
pub mod identity;
pub mod model;
pub mod oauth;
pub mod render;
pub mod source;
pub mod storage;
pub mod summary;
pub mod youtube_api;

pub use config::{Config, DataSource};
pub use controller::{BoardState, Controller};
pub use error::{BoardError, Result};
pub use gemini::GeminiClient;
pub use identity::{Credential, DemoIdentity, IdentityError, IdentityProvider};
pub use model::{Channel, Video};
pub use oauth::GoogleIdentity;
pub use source::{ChannelSource, LiveSource, SyntheticSource};
pub use storage::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use summary::{SummaryCards, SummaryRequester, SummaryState};
