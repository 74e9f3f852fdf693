//! Core YouTube API client functionality.

use crate::error::{BoardError, Result};
use crate::identity::Credential;
use crate::youtube_api::{
    search::SearchListResponse, subscriptions::SubscriptionListResponse, types::ErrorEnvelope,
    videos::VideoListResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Where the YouTube Data API v3 lives unless configured otherwise.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Client for interacting with the YouTube Data API v3 on behalf of one user.
///
/// This client wraps a bearer [`Credential`] and provides methods to call the read-only
/// endpoints the board needs. It never refreshes or replaces the credential: a rejected
/// credential surfaces as [`BoardError::Auth`] and it is up to the caller to obtain a new one.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    credential: Credential,
    base_url: String,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Creates a client that talks to [`DEFAULT_API_BASE`].
    pub fn new(credential: Credential, client: reqwest::Client) -> Self {
        Self {
            credential,
            base_url: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Points the client at a different API root, such as a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Makes an authenticated GET request to the YouTube API with common error handling.
    ///
    /// Status handling is the same for every endpoint:
    ///
    /// * 401 and 403 become [`BoardError::Auth`], whatever the body says.
    /// * Other non-success statuses become [`BoardError::Transport`] carrying `error.message`
    ///   from Google's error envelope, or the status's reason phrase if there is none.
    /// * Failing to get a response at all is also a [`BoardError::Transport`].
    #[instrument(skip(self), level = tracing::Level::TRACE)]
    pub(crate) async fn make_authenticated_request(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.credential.secret())
            .query(query_params)
            .send()
            .await
            .map_err(BoardError::network)?;

        let status_code = response.status();
        if status_code.is_success() {
            return Ok(response);
        }

        if status_code == StatusCode::UNAUTHORIZED || status_code == StatusCode::FORBIDDEN {
            tracing::warn!(%status_code, endpoint, "YouTube API rejected credential");
            return Err(BoardError::Auth);
        }

        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(%status_code, endpoint, body = %error_text, "YouTube API error");
        let message = ErrorEnvelope::message_from(&error_text).unwrap_or_else(|| {
            status_code
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
        Err(BoardError::Transport {
            status: Some(status_code),
            message,
        })
    }

    /// Issues a request and decodes the JSON body into `T`.
    ///
    /// A body that is not valid JSON for `T` is a [`BoardError::Format`]; a body that could not
    /// be read at all is a [`BoardError::Transport`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .make_authenticated_request(endpoint, query_params)
            .await?;
        let body = response.bytes().await.map_err(BoardError::network)?;
        serde_json::from_slice(&body)
            .map_err(|e| BoardError::Format(format!("parse YouTube {endpoint} response: {e}")))
    }

    /// Lists the first page of the authenticated user's subscriptions, alphabetically.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube.readonly`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/subscriptions/list>
    #[instrument(skip(self))]
    pub async fn list_my_subscriptions(
        &self,
        max_results: u32,
    ) -> Result<SubscriptionListResponse> {
        let max_results_string = max_results.to_string();
        let query_params = [
            ("part", "snippet"),
            ("mine", "true"),
            ("maxResults", max_results_string.as_str()),
            ("order", "alphabetical"),
        ];

        let subscriptions: SubscriptionListResponse =
            self.get_json("subscriptions", &query_params).await?;

        tracing::debug!(
            total_results = subscriptions.page_info.total_results,
            returned_items = subscriptions.items.len(),
            "fetched subscriptions"
        );

        Ok(subscriptions)
    }

    /// Finds the id of the most recently published video on a channel.
    ///
    /// Only uploads of type `video` are considered, so live streams and playlists are skipped.
    /// Returns `Ok(None)` if the channel has no searchable video.
    ///
    /// # API Cost
    ///
    /// `search.list` costs 100 quota units per call.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/search/list>
    #[instrument(skip(self))]
    pub async fn latest_video_id(&self, channel_id: &str) -> Result<Option<String>> {
        let query_params = [
            ("part", "id"),
            ("channelId", channel_id),
            ("maxResults", "1"),
            ("order", "date"),
            ("type", "video"),
        ];

        let results: SearchListResponse = self.get_json("search", &query_params).await?;
        let video_id = results.first_video_id();

        tracing::debug!(channel_id, ?video_id, "looked up latest video");

        Ok(video_id)
    }

    /// Gets snippet, content details and statistics for a batch of videos in one call.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    #[instrument(skip(self))]
    pub async fn list_videos(&self, video_ids: &[String]) -> Result<VideoListResponse> {
        let ids = video_ids.join(",");
        let query_params = [
            ("part", "snippet,contentDetails,statistics"),
            ("id", ids.as_str()),
        ];

        let videos: VideoListResponse = self.get_json("videos", &query_params).await?;

        tracing::debug!(
            requested = video_ids.len(),
            returned_items = videos.items.len(),
            "fetched video details"
        );

        Ok(videos)
    }
}
