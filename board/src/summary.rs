//! AI summaries for individual video cards.

use crate::error::Result;
use crate::gemini::GeminiClient;
use crate::model::Video;
use std::collections::HashMap;
use tracing::instrument;

/// Asks the generative text service for a short summary of a video.
///
/// Calls are independent: asking about the same video twice makes two remote calls.
#[derive(Debug, Clone)]
pub struct SummaryRequester {
    gemini: GeminiClient,
}

impl SummaryRequester {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Returns a one-paragraph summary of the video, or a [`crate::BoardError::Generation`].
    #[instrument(skip(self))]
    pub async fn summarize(&self, title: &str, channel_name: &str) -> Result<String> {
        self.gemini.generate_text(&prompt(title, channel_name)).await
    }
}

fn prompt(title: &str, channel_name: &str) -> String {
    format!(
        "Write a short, engaging one-paragraph summary of a YouTube video titled \"{title}\" \
         from the channel \"{channel_name}\". Describe what a viewer can expect to learn or \
         see. Do not use markdown."
    )
}

/// What a card is currently showing in its summary slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Hidden,
    Shown(String),
    /// The request failed; the message is shown on the card instead of a summary.
    Failed(String),
}

/// Per-card summary state for one board session. Nothing here is persisted.
#[derive(Debug, Default)]
pub struct SummaryCards {
    cards: HashMap<String, SummaryState>,
}

impl SummaryCards {
    pub fn state(&self, video_id: &str) -> &SummaryState {
        self.cards.get(video_id).unwrap_or(&SummaryState::Hidden)
    }

    /// Flips a card's summary.
    ///
    /// A card that is showing something is hidden again without any remote call. A hidden card
    /// requests a fresh summary; a failure only affects this card.
    pub async fn toggle(
        &mut self,
        video: &Video,
        channel_name: &str,
        requester: &SummaryRequester,
    ) -> &SummaryState {
        let next = match self.state(&video.video_id) {
            SummaryState::Shown(_) | SummaryState::Failed(_) => SummaryState::Hidden,
            SummaryState::Hidden => match requester.summarize(&video.title, channel_name).await {
                Ok(summary) => SummaryState::Shown(summary),
                Err(e) => {
                    tracing::warn!(video_id = %video.video_id, error = %e, "summary failed");
                    SummaryState::Failed("Could not generate a summary.".to_string())
                }
            },
        };
        let slot = self.cards.entry(video.video_id.clone()).or_insert(SummaryState::Hidden);
        *slot = next;
        slot
    }

    /// Forgets every card, e.g. when the board is reloaded or the user logs out.
    pub fn clear(&mut self) {
        self.cards.clear();
    }
}
