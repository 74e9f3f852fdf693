//! Human-readable labels for video cards.

use jiff::Timestamp;
use jiff::fmt::temporal::SpanParser;

/// Accepts ISO 8601 durations only, not jiff's friendly `5h 3m` format.
static DURATION_PARSER: SpanParser = SpanParser::new();

/// Formats an ISO 8601 duration (e.g. `PT15M32S`) as `M:SS`, or `H:MM:SS` when it has an hours
/// component.
///
/// Missing or unparseable input yields `0:00`. Days and weeks are folded into the hours, which
/// is how YouTube reports videos longer than a day (`P1DT2H3M4S`).
pub fn format_duration(iso_duration: Option<&str>) -> String {
    let Some(span) = iso_duration.and_then(|d| DURATION_PARSER.parse_span(d.trim()).ok()) else {
        return "0:00".to_string();
    };
    let span = span.abs();

    let hours = i64::from(span.get_weeks()) * 7 * 24
        + i64::from(span.get_days()) * 24
        + i64::from(span.get_hours());
    let minutes = span.get_minutes();
    let seconds = span.get_seconds();

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats a raw view count as `1 view`, `999 views`, `1K views`, `1.2M views` and so on.
///
/// Counts of a thousand or more are scaled to one decimal with a `K`/`M`/`B` suffix, and a
/// trailing `.0` is dropped. Like `parseInt`, a leading integer is honoured even if it is
/// followed by junk; input with no leading integer yields `0 views`.
pub fn format_view_count(view_count: Option<&str>) -> String {
    let Some(num) = view_count.and_then(leading_integer) else {
        return "0 views".to_string();
    };

    if num >= 1e9 {
        scaled(num / 1e9, "B")
    } else if num >= 1e6 {
        scaled(num / 1e6, "M")
    } else if num >= 1e3 {
        scaled(num / 1e3, "K")
    } else if num == 1.0 {
        "1 view".to_string()
    } else {
        format!("{} views", num as i64)
    }
}

fn scaled(value: f64, suffix: &str) -> String {
    let fixed = format!("{value:.1}");
    let fixed = fixed.strip_suffix(".0").unwrap_or(&fixed);
    format!("{fixed}{suffix} views")
}

fn leading_integer(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    rest[..end].parse::<f64>().ok().map(|n| sign * n)
}

/// Formats how long ago `published_at` was, relative to the current time.
///
/// See [`format_time_ago_at`].
pub fn format_time_ago(published_at: Timestamp) -> String {
    format_time_ago_at(published_at, Timestamp::now())
}

/// Formats how long before `now` the timestamp `published_at` was.
///
/// Uses fixed divisors (365 days, 30 days, 1 day, 1 hour, 1 minute) tried in that order; the
/// first one that fits strictly more than once wins. Anything under that, including timestamps
/// in the future, is `Just now`. Units are always plural, so 400 days is `1 years ago`.
pub fn format_time_ago_at(published_at: Timestamp, now: Timestamp) -> String {
    const UNITS: [(f64, &str); 5] = [
        (31_536_000.0, "years"),
        (2_592_000.0, "months"),
        (86_400.0, "days"),
        (3_600.0, "hours"),
        (60.0, "minutes"),
    ];

    let seconds = now.duration_since(published_at).as_secs() as f64;
    for (divisor, unit) in UNITS {
        let interval = seconds / divisor;
        if interval > 1.0 {
            return format!("{} {unit} ago", interval.floor() as i64);
        }
    }
    "Just now".to_string()
}
