//! Shared types for the YouTube API client.

use serde::Deserialize;

/// Paging details for lists of resources.
///
/// Includes the total number of items available and the number of resources
/// returned in a single page response.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Default, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: u32,
}

/// A single thumbnail image.
///
/// See: <https://developers.google.com/youtube/v3/docs/thumbnails>
#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// The set of thumbnail variants attached to a resource.
///
/// Every variant is optional: which ones exist depends on the resource and on the resolution
/// of the uploaded media.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// The URL of the best video thumbnail for a card: `high`, then `standard`, then `medium`.
    ///
    /// Returns an empty string if none of those are present.
    pub fn best_video_url(&self) -> String {
        self.high
            .as_ref()
            .or(self.standard.as_ref())
            .or(self.medium.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }

    /// The URL of the `default` thumbnail, or an empty string.
    pub fn default_url(&self) -> String {
        self.default
            .as_ref()
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

/// The error envelope Google APIs return alongside non-success statuses.
///
/// See: <https://developers.google.com/youtube/v3/docs/errors>
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl ErrorEnvelope {
    /// Extracts `error.message` from a response body, if it has one.
    pub(crate) fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| e.error.message)
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn thumb(url: &str) -> Option<Thumbnail> {
        Some(Thumbnail {
            url: url.to_string(),
            width: None,
            height: None,
        })
    }

    #[test]
    fn best_video_thumbnail_preference() {
        let mut t = Thumbnails {
            default: thumb("d"),
            medium: thumb("m"),
            high: thumb("h"),
            standard: thumb("s"),
            maxres: thumb("x"),
        };
        assert_eq!(t.best_video_url(), "h");
        t.high = None;
        assert_eq!(t.best_video_url(), "s");
        t.standard = None;
        assert_eq!(t.best_video_url(), "m");
        t.medium = None;
        assert_eq!(t.best_video_url(), "");
    }

    #[test]
    fn error_message_extraction() {
        let body = r#"{"error":{"code":400,"message":"Invalid channel ID","errors":[]}}"#;
        assert_eq!(
            ErrorEnvelope::message_from(body).as_deref(),
            Some("Invalid channel ID")
        );
        assert_eq!(ErrorEnvelope::message_from("<html>oops</html>"), None);
        assert_eq!(ErrorEnvelope::message_from(r#"{"error":{"code":500}}"#), None);
    }
}
