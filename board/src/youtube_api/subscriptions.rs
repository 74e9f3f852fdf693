//! YouTube Subscriptions API types.

use crate::youtube_api::types::{PageInfo, Thumbnails};
use serde::Deserialize;

/// Response structure for the `subscriptions.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/subscriptions/list>
#[derive(Debug, Deserialize)]
pub struct SubscriptionListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#subscriptionListResponse`.
    #[serde(default)]
    pub kind: String,
    /// The subscriptions that match the request criteria.
    ///
    /// YouTube omits the field entirely for users with no subscriptions.
    #[serde(default)]
    pub items: Vec<Subscription>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    /// Token for the next page. Only the first page is ever requested.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A `subscription` resource: the authenticated user following one channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/subscriptions#resource>
#[derive(Debug, Deserialize)]
pub struct Subscription {
    /// The ID of the subscription itself, not of the subscribed channel.
    #[serde(default)]
    pub id: String,
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionSnippet {
    /// The subscribed channel's title.
    pub title: String,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId,
    /// The subscribed channel's avatar.
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Identifies the subscribed channel.
#[derive(Debug, Deserialize)]
pub struct ResourceId {
    #[serde(default)]
    pub kind: String,
    #[serde(rename = "channelId")]
    pub channel_id: String,
}
