//! YouTube Data API v3 client library.
//!
//! Only the read-only calls the board needs are covered:
//!
//! - [`YouTubeClient::list_my_subscriptions`] (`subscriptions.list`)
//! - [`YouTubeClient::latest_video_id`] (`search.list`)
//! - [`YouTubeClient::list_videos`] (`videos.list`)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use subscription_board::identity::Credential;
//! use subscription_board::youtube_api::YouTubeClient;
//!
//! # async fn example() -> Result<(), subscription_board::BoardError> {
//! let client = YouTubeClient::new(Credential::new("ya29..."), reqwest::Client::new());
//!
//! let subscriptions = client.list_my_subscriptions(12).await?;
//! for sub in &subscriptions.items {
//!     println!("{} ({})", sub.snippet.title, sub.snippet.resource_id.channel_id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod search;
pub mod subscriptions;
pub mod types;
pub mod videos;

pub use client::{DEFAULT_API_BASE, YouTubeClient};
pub use search::{SearchListResponse, SearchResult, SearchResultId};
pub use subscriptions::{ResourceId, Subscription, SubscriptionListResponse, SubscriptionSnippet};
pub use types::{PageInfo, Thumbnail, Thumbnails};
pub use videos::{Video, VideoContentDetails, VideoListResponse, VideoSnippet, VideoStatistics};
