//! The denormalized view model shown on the board.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A subscribed channel together with its single most recent video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub channel_id: String,
    pub channel_name: String,
    pub channel_thumbnail_url: String,
    pub latest_video: Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub published_at: Timestamp,
    /// The raw count as reported upstream; see [`crate::format::format_view_count`].
    pub view_count: String,
    /// ISO 8601 duration; see [`crate::format::format_duration`].
    pub duration: String,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Orders channels by their latest video, newest first.
///
/// The sort is stable, so channels whose videos share a publish time keep their input order.
pub fn sort_by_recency(channels: &mut [Channel]) {
    channels.sort_by(|a, b| b.latest_video.published_at.cmp(&a.latest_video.published_at));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn channel(id: &str, published_at: &str) -> Channel {
        Channel {
            channel_id: id.to_string(),
            channel_name: format!("Channel {id}"),
            channel_thumbnail_url: format!("https://yt3.example/{id}.jpg"),
            latest_video: Video {
                video_id: format!("vid-{id}"),
                title: format!("Latest from {id}"),
                thumbnail_url: String::new(),
                published_at: published_at.parse().unwrap(),
                view_count: "42".to_string(),
                duration: "PT1M".to_string(),
            },
        }
    }

    fn ids(channels: &[Channel]) -> Vec<&str> {
        channels.iter().map(|c| c.channel_id.as_str()).collect()
    }

    #[test]
    fn sorts_newest_first() {
        let mut channels = vec![
            channel("a", "2025-05-01T00:00:00Z"),
            channel("b", "2025-05-03T00:00:00Z"),
            channel("c", "2025-05-02T00:00:00Z"),
        ];
        sort_by_recency(&mut channels);
        assert_eq!(ids(&channels), ["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut channels = vec![
            channel("x", "2025-05-01T00:00:00Z"),
            channel("y", "2025-05-02T00:00:00Z"),
            channel("z", "2025-05-01T00:00:00Z"),
        ];
        sort_by_recency(&mut channels);
        assert_eq!(ids(&channels), ["y", "x", "z"]);
    }

    #[test]
    fn camel_case_json() {
        let json = serde_json::to_value(channel("a", "2025-05-01T00:00:00Z")).unwrap();
        assert_eq!(json["channelName"], "Channel a");
        assert_eq!(json["latestVideo"]["videoId"], "vid-a");
        assert_eq!(json["latestVideo"]["publishedAt"], "2025-05-01T00:00:00Z");
    }
}
