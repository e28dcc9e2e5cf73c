//! Minute formatting and parsing used by the API and the stats engine.

/// Renders a minute count as `"2h 5m"`, or `"45m"` when under an hour.
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Parses strings like `"1h 30m"` or `"45m"` back into minutes. Missing
/// tokens count as zero, so this inverts `format_minutes` for any
/// non-negative minute count.
pub fn parse_minutes(input: &str) -> i64 {
    let mut hours = 0;
    let mut minutes = 0;
    for token in input.split_whitespace() {
        if let Some(value) = token.strip_suffix('h') {
            hours = value.parse().unwrap_or(0);
        } else if let Some(value) = token.strip_suffix('m') {
            minutes = value.parse().unwrap_or(0);
        }
    }
    hours * 60 + minutes
}

/// Whole minutes from a second count, rounding half up: 90 s is 2 minutes,
/// 89 s is 1.
pub fn minutes_from_seconds(seconds: i64) -> i64 {
    (seconds + 30) / 60
}
