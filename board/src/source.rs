//! Where the board's channels come from.

use crate::aggregate::aggregate;
use crate::error::Result;
use crate::gemini::GeminiClient;
use crate::identity::Credential;
use crate::model::Channel;
use crate::youtube_api::{DEFAULT_API_BASE, YouTubeClient};
use serde_json::json;
use std::future::Future;

/// A strategy for producing the board's channel list.
pub trait ChannelSource {
    fn fetch_channels(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<Channel>>> + Send;
}

/// Real data: the user's subscriptions, aggregated from the YouTube Data API.
#[derive(Debug, Clone)]
pub struct LiveSource {
    base_url: String,
    http: reqwest::Client,
}

impl LiveSource {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ChannelSource for LiveSource {
    async fn fetch_channels(&self, credential: &Credential) -> Result<Vec<Channel>> {
        let client = YouTubeClient::new(credential.clone(), self.http.clone())
            .with_base_url(self.base_url.as_str());
        aggregate(&client).await
    }
}

/// Demo data: a fictional subscription list made up by Gemini.
///
/// The credential is ignored.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    gemini: GeminiClient,
}

const SYNTHETIC_PROMPT: &str = "\
Generate a realistic but fictional list of 12 YouTube channel subscriptions.
For each channel, provide its name, a fictional channel ID, a placeholder thumbnail URL from \
picsum.photos (square, 100x100), and details for its single latest video.
The video details should include a fictional video ID, a compelling title, a placeholder \
thumbnail URL from picsum.photos (16:9 ratio, e.g., 480x270), a realistic ISO 8601 publish date \
from within the last 7 days, a realistic raw view count (e.g., \"1234567\"), and an ISO 8601 \
duration (e.g., \"PT15M32S\").
The channels should cover a variety of topics like tech, cooking, vlogging, science, and gaming.
Ensure the publish dates are varied to allow for sorting.";

impl SyntheticSource {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// The response schema: an array of channels, each with its latest video.
    fn schema() -> serde_json::Value {
        json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "channelName": { "type": "STRING" },
                    "channelId": { "type": "STRING" },
                    "channelThumbnailUrl": { "type": "STRING" },
                    "latestVideo": {
                        "type": "OBJECT",
                        "properties": {
                            "videoId": { "type": "STRING" },
                            "title": { "type": "STRING" },
                            "thumbnailUrl": { "type": "STRING" },
                            "publishedAt": { "type": "STRING", "format": "date-time" },
                            "viewCount": { "type": "STRING" },
                            "duration": { "type": "STRING" }
                        },
                        "required": ["videoId", "title", "thumbnailUrl", "publishedAt", "viewCount", "duration"]
                    }
                },
                "required": ["channelName", "channelId", "channelThumbnailUrl", "latestVideo"]
            }
        })
    }
}

impl ChannelSource for SyntheticSource {
    async fn fetch_channels(&self, _credential: &Credential) -> Result<Vec<Channel>> {
        let mut channels: Vec<Channel> = self
            .gemini
            .generate_json(SYNTHETIC_PROMPT, Self::schema())
            .await?;
        let mut seen = std::collections::HashSet::new();
        channels.retain(|c| seen.insert(c.channel_id.clone()));
        tracing::info!(channels = channels.len(), "generated synthetic board");
        Ok(channels)
    }
}
