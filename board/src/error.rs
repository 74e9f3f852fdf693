//! Error taxonomy shared by the data sources and the summary requester.

use reqwest::StatusCode;

/// Failures that can come out of fetching board data or generating text.
///
/// [`BoardError::Auth`] is the only variant the session controller reacts to specially: it means
/// the credential was rejected and the user has to connect again. Everything else is reported
/// generically to the user and logged in full.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The YouTube API answered 401 or 403.
    #[error("YouTube rejected the access token")]
    Auth,

    /// Any other non-success response, or a request that never got a response.
    #[error("Failed to fetch data: {message}")]
    Transport {
        /// `None` when the request failed before a status was received.
        status: Option<StatusCode>,
        message: String,
    },

    /// A response body that does not have the shape we expect.
    #[error("unexpected response format: {0}")]
    Format(String),

    /// The generative text service failed.
    #[error("text generation failed: {0}")]
    Generation(String),
}

impl BoardError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }

    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self::Transport {
            status: e.status(),
            message: e.to_string(),
        }
    }
}

pub type Result<T, E = BoardError> = std::result::Result<T, E>;
