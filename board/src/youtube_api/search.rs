//! YouTube Search API types.

use crate::youtube_api::types::PageInfo;
use serde::Deserialize;

/// Response structure for the `search.list` API call, requested with `part=id`.
///
/// See: <https://developers.google.com/youtube/v3/docs/search/list>
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A single search hit. With `part=id` only the identifier is populated.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
}

/// Identifies the resource a search hit refers to.
///
/// Exactly one of the id fields is set, depending on `kind`.
#[derive(Debug, Deserialize)]
pub struct SearchResultId {
    #[serde(default)]
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "playlistId")]
    pub playlist_id: Option<String>,
}

impl SearchListResponse {
    /// The video id of the first hit, if there is one and it is a video.
    pub fn first_video_id(self) -> Option<String> {
        self.items.into_iter().next().and_then(|r| r.id.video_id)
    }
}
