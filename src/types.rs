//! Wire DTOs. The boundary schema is flat camelCase with numbers emitted as
//! JSON numbers; the game client's deserializer rejects anything else.

use serde::{Deserialize, Serialize};

use crate::store::{Account, PlayerStats, RankedEntry};

// ── requests ──

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitScoreRequest {
    pub(crate) user_id: Option<String>,
    pub(crate) player_name: Option<String>,
    pub(crate) score: Option<i64>,
    #[serde(default)]
    pub(crate) max_combo: i64,
    #[serde(default)]
    pub(crate) time_survived: f64,
    #[serde(default)]
    pub(crate) total_bounces: i64,
    #[serde(default)]
    pub(crate) wallet_address: Option<String>,
    #[serde(default)]
    pub(crate) nft_skin_id: Option<String>,
    #[serde(default)]
    pub(crate) is_verified: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAccountRequest {
    pub(crate) wallet_address: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) signature: Option<String>,
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) is_development_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInRequest {
    pub(crate) wallet_address: Option<String>,
    pub(crate) signature: Option<String>,
    pub(crate) message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateUsernameRequest {
    pub(crate) wallet_address: Option<String>,
    pub(crate) new_username: Option<String>,
    pub(crate) signature: Option<String>,
    pub(crate) message: Option<String>,
}

// ── responses ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) timestamp: u64,
    pub(crate) service: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeaderboardEntryDto {
    pub(crate) rank: i64,
    pub(crate) user_id: String,
    pub(crate) player_name: String,
    pub(crate) score: i64,
    pub(crate) max_combo: i64,
    pub(crate) time_survived: f64,
    pub(crate) total_bounces: i64,
    pub(crate) wallet_address: String,
    pub(crate) nft_skin_id: String,
    pub(crate) is_verified: bool,
    pub(crate) timestamp: i64,
}

impl From<RankedEntry> for LeaderboardEntryDto {
    fn from(entry: RankedEntry) -> Self {
        Self {
            rank: entry.rank,
            user_id: entry.user_id,
            player_name: entry.player_name,
            score: entry.score,
            max_combo: entry.max_combo,
            time_survived: entry.time_survived,
            total_bounces: entry.total_bounces,
            // Nullable linkage fields go out as "" for the client's strict
            // deserializer, never as null.
            wallet_address: entry.wallet_address.unwrap_or_default(),
            nft_skin_id: entry.nft_skin_id.unwrap_or_default(),
            is_verified: entry.is_verified,
            timestamp: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TopResponse {
    pub(crate) entries: Vec<LeaderboardEntryDto>,
    pub(crate) last_updated: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitResponse {
    pub(crate) success: bool,
    pub(crate) new_rank: i64,
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAccountResponse {
    pub(crate) success: bool,
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) player_name: String,
    pub(crate) wallet_address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckWalletResponse {
    pub(crate) exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl CheckWalletResponse {
    pub(crate) fn absent() -> Self {
        Self {
            exists: false,
            user_id: None,
            username: None,
            player_name: None,
            is_verified: None,
            message: Some("No account found for this wallet".to_string()),
        }
    }

    pub(crate) fn found(account: Account) -> Self {
        Self {
            exists: true,
            user_id: Some(account.id),
            username: Some(account.username),
            player_name: Some(account.player_name),
            is_verified: Some(account.is_verified),
            message: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerStatsDto {
    pub(crate) score: i64,
    pub(crate) max_combo: i64,
    pub(crate) time_survived: f64,
    pub(crate) total_bounces: i64,
}

impl From<PlayerStats> for PlayerStatsDto {
    fn from(stats: PlayerStats) -> Self {
        Self {
            score: stats.score,
            max_combo: stats.max_combo,
            time_survived: stats.time_survived,
            total_bounces: stats.total_bounces,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub(crate) success: bool,
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) player_name: String,
    pub(crate) wallet_address: String,
    pub(crate) is_verified: bool,
    /// Best ledger row for the wallet; `null` when the player has no score yet.
    pub(crate) stats: Option<PlayerStatsDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateUsernameResponse {
    pub(crate) success: bool,
    pub(crate) username: String,
    pub(crate) player_name: String,
}
