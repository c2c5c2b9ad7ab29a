use std::{env, sync::Arc};

use crate::store::Store;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub(crate) const DEFAULT_DATA_DIR: &str = "data";
// Fixed anti-cheat ceiling; scores above this are rejected outright.
pub(crate) const DEFAULT_MAX_SCORE: i64 = 1_000_000;
pub(crate) const DEFAULT_TOP_LIMIT: usize = 100;
pub(crate) const DEFAULT_JSON_LIMIT_BYTES: usize = 64 * 1024;

pub(crate) const SERVICE_NAME: &str = "rollbounce-leaderboard-api";

/// Server-side request policy, read once at startup from the environment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ServerPolicy {
    pub(crate) max_score: i64,
    pub(crate) top_limit: usize,
    /// Whether a request may ask to skip signature verification via its
    /// `isDevelopmentMode` flag. Off by default: the bypass is gated here,
    /// never by the client alone.
    pub(crate) allow_dev_mode_requests: bool,
}

impl ServerPolicy {
    pub(crate) fn from_env() -> Self {
        Self {
            max_score: read_env_i64("MAX_SCORE", DEFAULT_MAX_SCORE),
            top_limit: read_env_usize("TOP_LIMIT", DEFAULT_TOP_LIMIT),
            allow_dev_mode_requests: read_env_bool("ALLOW_DEV_MODE_REQUESTS", false),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<Store>,
    pub(crate) policy: ServerPolicy,
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(default)
}
