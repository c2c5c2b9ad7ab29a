use core::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Signed challenge messages are accepted for five minutes on either side of
/// their embedded timestamp. The window is symmetric: a captured signature is
/// useless after it and cannot be replayed from the future.
pub const FRESHNESS_WINDOW_SECS: u64 = 300;

const TIMESTAMP_FIELD: &str = "Timestamp:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FreshnessError {
    MissingTimestamp,
    OutsideWindow { skew_secs: u64 },
}

impl fmt::Display for FreshnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTimestamp => write!(f, "message has no parsable Timestamp field"),
            Self::OutsideWindow { skew_secs } => write!(
                f,
                "timestamp is {skew_secs}s from now (allowed {FRESHNESS_WINDOW_SECS}s)"
            ),
        }
    }
}

impl std::error::Error for FreshnessError {}

pub fn now_unix_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

/// Extract the `Timestamp: <unix seconds>` field from a challenge message.
///
/// Messages are line-oriented `Key: Value` text, but for wire compatibility
/// with existing clients the field is accepted anywhere in the line, e.g.
/// `"challenge, Timestamp: 1700000000"`.
pub fn embedded_timestamp(message: &str) -> Option<u64> {
    for line in message.lines() {
        let Some(idx) = line.find(TIMESTAMP_FIELD) else {
            continue;
        };
        let rest = line[idx + TIMESTAMP_FIELD.len()..].trim_start();
        let digits: &str = rest
            .split_once(|c: char| !c.is_ascii_digit())
            .map_or(rest, |(head, _)| head);
        if let Ok(value) = digits.parse::<u64>() {
            return Some(value);
        }
    }
    None
}

/// Check that the message's embedded timestamp is within the freshness window
/// of `now`. Absent or unparsable timestamps fail closed.
pub fn check_freshness_at(message: &str, now: u64) -> Result<(), FreshnessError> {
    let timestamp = embedded_timestamp(message).ok_or(FreshnessError::MissingTimestamp)?;
    let skew_secs = now.abs_diff(timestamp);
    if skew_secs > FRESHNESS_WINDOW_SECS {
        return Err(FreshnessError::OutsideWindow { skew_secs });
    }
    Ok(())
}

pub fn check_freshness(message: &str) -> Result<(), FreshnessError> {
    check_freshness_at(message, now_unix_s())
}
