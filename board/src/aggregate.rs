//! Joins subscriptions, latest-video searches and video details into board channels.

use crate::error::Result;
use crate::model::{Channel, Video};
use crate::youtube_api::{Video as ApiVideo, YouTubeClient};
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// How many subscriptions are shown. Only the first page is ever fetched.
pub const SUBSCRIPTION_PAGE_SIZE: u32 = 12;

/// Builds the board's channel list for the user `client` is authorized as.
///
/// Runs in three stages:
///
/// 1. fetch the first [`SUBSCRIPTION_PAGE_SIZE`] subscriptions, alphabetically;
/// 2. look up every channel's latest video concurrently;
/// 3. fetch details for all found videos in one batched call.
///
/// Channels without a discoverable video, or whose video is missing from the batch response,
/// are left out. The result is in subscription order; sorting is up to the caller.
///
/// Any stage failing fails the whole aggregation, so a rejected credential always surfaces as
/// [`crate::BoardError::Auth`] and never as a partial list.
#[instrument(skip(client))]
pub async fn aggregate(client: &YouTubeClient) -> Result<Vec<Channel>> {
    let subscriptions = client
        .list_my_subscriptions(SUBSCRIPTION_PAGE_SIZE)
        .await?
        .items;

    // one column per channel, even if the API repeats itself
    let mut seen = HashSet::new();
    let subscriptions: Vec<_> = subscriptions
        .into_iter()
        .filter(|sub| seen.insert(sub.snippet.resource_id.channel_id.clone()))
        .collect();
    if subscriptions.is_empty() {
        tracing::debug!("user has no subscriptions");
        return Ok(Vec::new());
    }

    let latest_video_ids = try_join_all(
        subscriptions
            .iter()
            .map(|sub| client.latest_video_id(&sub.snippet.resource_id.channel_id)),
    )
    .await?;

    let video_ids: Vec<String> = latest_video_ids.iter().flatten().cloned().collect();
    if video_ids.is_empty() {
        tracing::debug!(
            channels = subscriptions.len(),
            "no subscribed channel has a video"
        );
        return Ok(Vec::new());
    }

    let mut details: HashMap<String, ApiVideo> = client
        .list_videos(&video_ids)
        .await?
        .items
        .into_iter()
        .map(|video| (video.id.clone(), video))
        .collect();

    let mut channels = Vec::with_capacity(video_ids.len());
    for (sub, video_id) in subscriptions.into_iter().zip(latest_video_ids) {
        let channel_id = sub.snippet.resource_id.channel_id;
        let Some(video_id) = video_id else {
            tracing::trace!(%channel_id, "dropping channel without videos");
            continue;
        };
        let Some(video) = details.remove(&video_id) else {
            tracing::warn!(%channel_id, %video_id, "video missing from details response");
            continue;
        };

        channels.push(Channel {
            channel_id,
            channel_name: sub.snippet.title,
            channel_thumbnail_url: sub.snippet.thumbnails.default_url(),
            latest_video: to_board_video(video),
        });
    }

    tracing::info!(channels = channels.len(), "aggregated subscription board");
    Ok(channels)
}

fn to_board_video(video: ApiVideo) -> Video {
    Video {
        thumbnail_url: video.snippet.thumbnails.best_video_url(),
        title: video.snippet.title,
        published_at: video.snippet.published_at,
        view_count: video
            .statistics
            .and_then(|s| s.view_count)
            .unwrap_or_default(),
        duration: video
            .content_details
            .and_then(|c| c.duration)
            .unwrap_or_default(),
        video_id: video.id,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::BoardError;
    use crate::identity::Credential;
    use mockito::{Matcher, Mock, Server};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    pub(crate) async fn mock_subscriptions(server: &mut Server, channels: &[&str]) -> Mock {
        let items: Vec<_> = channels
            .iter()
            .map(|id| {
                json!({
                    "kind": "youtube#subscription",
                    "id": format!("sub-{id}"),
                    "snippet": {
                        "title": format!("Channel {id}"),
                        "resourceId": { "kind": "youtube#channel", "channelId": id },
                        "thumbnails": { "default": { "url": format!("https://yt3.example/{id}.jpg") } }
                    }
                })
            })
            .collect();
        server
            .mock("GET", "/subscriptions")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(json!({ "items": items, "pageInfo": { "totalResults": channels.len(), "resultsPerPage": 12 } }).to_string())
            .create_async()
            .await
    }

    pub(crate) async fn mock_search(
        server: &mut Server,
        channel_id: &str,
        video_id: Option<&str>,
    ) -> Mock {
        let items: Vec<_> = video_id
            .into_iter()
            .map(|v| json!({ "kind": "youtube#searchResult", "id": { "kind": "youtube#video", "videoId": v } }))
            .collect();
        server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("part".into(), "id".into()),
                Matcher::UrlEncoded("channelId".into(), channel_id.into()),
                Matcher::UrlEncoded("maxResults".into(), "1".into()),
                Matcher::UrlEncoded("order".into(), "date".into()),
                Matcher::UrlEncoded("type".into(), "video".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(json!({ "items": items }).to_string())
            .create_async()
            .await
    }

    pub(crate) fn video_json(id: &str, published_at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "snippet": {
                "title": format!("Video {id}"),
                "publishedAt": published_at,
                "channelId": "ignored",
                "thumbnails": {
                    "medium": { "url": format!("https://i.ytimg.com/{id}/mq.jpg") },
                    "high": { "url": format!("https://i.ytimg.com/{id}/hq.jpg") }
                }
            },
            "contentDetails": { "duration": "PT4M13S" },
            "statistics": { "viewCount": "1234" }
        })
    }

    pub(crate) async fn mock_videos(server: &mut Server, videos: Vec<serde_json::Value>) -> Mock {
        server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(json!({ "items": videos }).to_string())
            .create_async()
            .await
    }

    fn client(server: &Server) -> YouTubeClient {
        YouTubeClient::new(Credential::new("tok"), reqwest::Client::new())
            .with_base_url(server.url())
    }

    fn ids(channels: &[Channel]) -> Vec<&str> {
        channels.iter().map(|c| c.channel_id.as_str()).collect()
    }

    #[tokio::test]
    async fn joins_three_stages() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a", "b"]).await;
        let _sa = mock_search(&mut server, "a", Some("va")).await;
        let _sb = mock_search(&mut server, "b", Some("vb")).await;
        let videos = server
            .mock("GET", "/videos")
            .match_query(Matcher::UrlEncoded("id".into(), "va,vb".into()))
            .with_body(
                json!({ "items": [
                    video_json("vb", "2025-05-02T10:00:00Z"),
                    video_json("va", "2025-05-01T10:00:00Z"),
                ]})
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let channels = aggregate(&client(&server)).await.unwrap();
        videos.assert_async().await;

        assert_eq!(ids(&channels), ["a", "b"]);
        let a = &channels[0];
        assert_eq!(a.channel_name, "Channel a");
        assert_eq!(a.channel_thumbnail_url, "https://yt3.example/a.jpg");
        assert_eq!(
            a.latest_video,
            Video {
                video_id: "va".to_string(),
                title: "Video va".to_string(),
                thumbnail_url: "https://i.ytimg.com/va/hq.jpg".to_string(),
                published_at: "2025-05-01T10:00:00Z".parse().unwrap(),
                view_count: "1234".to_string(),
                duration: "PT4M13S".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn drops_channels_without_videos() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a", "b", "c"]).await;
        let _sa = mock_search(&mut server, "a", Some("va")).await;
        let _sb = mock_search(&mut server, "b", None).await;
        let _sc = mock_search(&mut server, "c", Some("vc")).await;
        // vc vanished between search and details
        let _videos = mock_videos(&mut server, vec![video_json("va", "2025-05-01T10:00:00Z")]).await;

        let channels = aggregate(&client(&server)).await.unwrap();
        assert_eq!(ids(&channels), ["a"]);
    }

    #[tokio::test]
    async fn no_subscriptions_makes_no_further_calls() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &[]).await;
        let search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        assert!(aggregate(&client(&server)).await.unwrap().is_empty());
        search.assert_async().await;
    }

    #[tokio::test]
    async fn no_videos_skips_details_call() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a"]).await;
        let _sa = mock_search(&mut server, "a", None).await;
        let videos = server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        assert!(aggregate(&client(&server)).await.unwrap().is_empty());
        videos.assert_async().await;
    }

    #[tokio::test]
    async fn duplicate_subscriptions_collapse() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a", "a"]).await;
        let _sa = mock_search(&mut server, "a", Some("va")).await;
        let _videos = mock_videos(&mut server, vec![video_json("va", "2025-05-01T10:00:00Z")]).await;

        let channels = aggregate(&client(&server)).await.unwrap();
        assert_eq!(ids(&channels), ["a"]);
    }

    #[tokio::test]
    async fn missing_optional_fields_degrade_to_empty() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a"]).await;
        let _sa = mock_search(&mut server, "a", Some("va")).await;
        let _videos = mock_videos(
            &mut server,
            vec![json!({
                "id": "va",
                "snippet": { "title": "bare", "publishedAt": "2025-05-01T10:00:00Z",
                             "thumbnails": { "default": { "url": "d.jpg" } } }
            })],
        )
        .await;

        let channels = aggregate(&client(&server)).await.unwrap();
        let video = &channels[0].latest_video;
        assert_eq!(video.thumbnail_url, "");
        assert_eq!(video.view_count, "");
        assert_eq!(video.duration, "");
    }

    #[tokio::test]
    async fn forbidden_search_fails_everything() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a", "b"]).await;
        let _sa = mock_search(&mut server, "a", Some("va")).await;
        let _sb = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("channelId".into(), "b".into()))
            .with_status(403)
            .create_async()
            .await;
        let videos = server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let err = aggregate(&client(&server)).await.unwrap_err();
        assert!(err.is_auth(), "{err:?}");
        videos.assert_async().await;
    }

    #[tokio::test]
    async fn forbidden_details_fails_everything() {
        let mut server = Server::new_async().await;
        let _subs = mock_subscriptions(&mut server, &["a"]).await;
        let _sa = mock_search(&mut server, "a", Some("va")).await;
        let _videos = server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let err = aggregate(&client(&server)).await.unwrap_err();
        assert!(err.is_auth(), "{err:?}");
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let mut server = Server::new_async().await;
        let _subs = server
            .mock("GET", "/subscriptions")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error":{"code":500,"message":"Backend Error"}}"#)
            .create_async()
            .await;

        let err = aggregate(&client(&server)).await.unwrap_err();
        assert!(
            matches!(&err, BoardError::Transport { message, .. } if message == "Backend Error"),
            "{err:?}"
        );
    }
}
