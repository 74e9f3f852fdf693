//! Plain-text rendering of the board for the terminal.

use crate::controller::BoardState;
use crate::format::{format_duration, format_time_ago_at, format_view_count};
use crate::model::Channel;
use crate::summary::{SummaryCards, SummaryState};
use jiff::Timestamp;
use std::fmt::Write;

pub const EMPTY_BOARD: &str =
    "No subscriptions found or videos posted recently by your subscriptions.";

/// Renders `state` as it would be shown at `now`, one numbered card per channel.
pub fn render_board(state: &BoardState, cards: &SummaryCards, now: Timestamp) -> String {
    let mut out = String::new();
    match state {
        BoardState::LoggedOut { message } => {
            out.push_str("Not connected. Run `subscription-board login` to connect your account.\n");
            if let Some(message) = message {
                let _ = writeln!(out, "{message}");
            }
        }
        BoardState::Authenticating => out.push_str("Waiting for Google sign-in...\n"),
        BoardState::Loading => out.push_str("Loading subscriptions...\n"),
        BoardState::Errored(message) => {
            let _ = writeln!(out, "An Error Occurred\n{message}");
        }
        BoardState::Ready(channels) if channels.is_empty() => {
            let _ = writeln!(out, "{EMPTY_BOARD}");
        }
        BoardState::Ready(channels) => {
            for (i, channel) in channels.iter().enumerate() {
                let summary = cards.state(&channel.latest_video.video_id);
                render_card(&mut out, i + 1, channel, summary, now);
            }
        }
    }
    out
}

fn render_card(
    out: &mut String,
    number: usize,
    channel: &Channel,
    summary: &SummaryState,
    now: Timestamp,
) {
    let video = &channel.latest_video;
    let _ = writeln!(out, "{number}. {}", channel.channel_name);
    let _ = writeln!(
        out,
        "  {} [{}]",
        video.title,
        format_duration(Some(&video.duration))
    );
    let _ = writeln!(
        out,
        "  {} · {}",
        format_view_count(Some(&video.view_count)),
        format_time_ago_at(video.published_at, now)
    );
    let _ = writeln!(out, "  {}", video.watch_url());
    match summary {
        SummaryState::Hidden => {}
        SummaryState::Shown(text) | SummaryState::Failed(text) => {
            let _ = writeln!(out, "  > {text}");
        }
    }
    out.push('\n');
}
