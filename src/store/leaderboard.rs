use rusqlite::{params, Connection, OptionalExtension};

use super::{map_sqlite_err, PlayerStats, RankedEntry, Store, StoreError};
use crate::challenge::now_unix_s;

// One total order for Submit, Top and GetPlayer: score descending, then
// rowid ascending (insertion order) as the stable tiebreak.
const RANKED_SELECT: &str = "SELECT
        ROW_NUMBER() OVER (ORDER BY score DESC, id ASC) AS rank,
        user_id, player_name, score, max_combo, time_survived, total_bounces,
        wallet_address, nft_skin_id, is_verified, created_at
     FROM leaderboard";

/// A score submission, validated by the handler before it gets here.
#[derive(Debug, Clone)]
pub struct NewScore<'a> {
    pub user_id: &'a str,
    pub player_name: &'a str,
    pub score: i64,
    pub max_combo: i64,
    pub time_survived: f64,
    pub total_bounces: i64,
    pub wallet_address: Option<&'a str>,
    pub nft_skin_id: Option<&'a str>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// 1-based rank against the full ledger after the write.
    pub rank: i64,
    /// The stored best score after the write (may be the old one).
    pub best_score: i64,
    /// Whether the row was inserted or updated; false means the existing
    /// score was equal or higher and the submission was kept out.
    pub applied: bool,
}

impl Store {
    /// Insert a new entry or raise an existing one, best-score-only.
    ///
    /// The write is a single conditional upsert: the update branch fires only
    /// when the incoming score strictly exceeds the stored one, so a racing
    /// pair of submissions converges on the higher value no matter the
    /// arrival order. Stats columns move together with the score; the
    /// nullable linkage fields keep their stored value when the incoming one
    /// is absent. Rank is computed in the same critical section.
    pub fn submit_score(&self, score: &NewScore<'_>) -> Result<SubmitOutcome, StoreError> {
        let conn = self.lock();
        let now = now_unix_s() as i64;

        let applied = conn
            .execute(
                "INSERT INTO leaderboard (
                    user_id, player_name, score, max_combo, time_survived,
                    total_bounces, wallet_address, nft_skin_id, is_verified,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, COALESCE(?9, 0), ?10, ?10)
                ON CONFLICT(user_id) DO UPDATE SET
                    player_name = excluded.player_name,
                    score = excluded.score,
                    max_combo = excluded.max_combo,
                    time_survived = excluded.time_survived,
                    total_bounces = excluded.total_bounces,
                    wallet_address = COALESCE(?7, wallet_address),
                    nft_skin_id = COALESCE(?8, nft_skin_id),
                    is_verified = COALESCE(?9, is_verified),
                    updated_at = excluded.updated_at
                WHERE excluded.score > leaderboard.score",
                params![
                    score.user_id,
                    score.player_name,
                    score.score,
                    score.max_combo,
                    score.time_survived,
                    score.total_bounces,
                    score.wallet_address,
                    score.nft_skin_id,
                    score.is_verified.map(i64::from),
                    now,
                ],
            )
            .map_err(|e| map_sqlite_err("submit_score upsert", e))?
            > 0;

        let best_score: i64 = conn
            .query_row(
                "SELECT score FROM leaderboard WHERE user_id = ?1",
                params![score.user_id],
                |row| row.get(0),
            )
            .map_err(|e| map_sqlite_err("submit_score readback", e))?;

        let rank = Self::rank_of(&conn, score.user_id)?
            .ok_or_else(|| StoreError::Internal("submitted row has no rank".to_string()))?;

        Ok(SubmitOutcome {
            rank,
            best_score,
            applied,
        })
    }

    /// Top `limit` entries with live ranks.
    pub fn top(&self, limit: usize) -> Result<Vec<RankedEntry>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&format!("{RANKED_SELECT} ORDER BY score DESC, id ASC LIMIT ?1"))
            .map_err(|e| map_sqlite_err("top prepare", e))?;

        let rows = stmt
            .query_map(params![limit as i64], row_to_entry)
            .map_err(|e| map_sqlite_err("top query", e))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| map_sqlite_err("top row", e))?);
        }
        Ok(entries)
    }

    /// One entry plus its rank against the full ledger.
    pub fn player(&self, user_id: &str) -> Result<Option<RankedEntry>, StoreError> {
        let conn = self.lock();
        conn.query_row(
            &format!("SELECT * FROM ({RANKED_SELECT}) WHERE user_id = ?1"),
            params![user_id],
            row_to_entry,
        )
        .optional()
        .map_err(|e| map_sqlite_err("player", e))
    }

    /// Best ledger row linked to a wallet, for the sign-in response.
    pub fn best_stats_by_wallet(&self, wallet: &str) -> Result<Option<PlayerStats>, StoreError> {
        let wallet = wallet.to_ascii_lowercase();
        let conn = self.lock();
        conn.query_row(
            "SELECT score, max_combo, time_survived, total_bounces
             FROM leaderboard WHERE wallet_address = ?1
             ORDER BY score DESC LIMIT 1",
            params![wallet],
            |row| {
                Ok(PlayerStats {
                    score: row.get(0)?,
                    max_combo: row.get(1)?,
                    time_survived: row.get(2)?,
                    total_bounces: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| map_sqlite_err("best_stats_by_wallet", e))
    }

    fn rank_of(conn: &Connection, user_id: &str) -> Result<Option<i64>, StoreError> {
        conn.query_row(
            "SELECT rank FROM (
                SELECT user_id, ROW_NUMBER() OVER (ORDER BY score DESC, id ASC) AS rank
                FROM leaderboard
             ) WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| map_sqlite_err("rank_of", e))
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<RankedEntry> {
    Ok(RankedEntry {
        rank: row.get(0)?,
        user_id: row.get(1)?,
        player_name: row.get(2)?,
        score: row.get(3)?,
        max_combo: row.get(4)?,
        time_survived: row.get(5)?,
        total_bounces: row.get(6)?,
        wallet_address: row.get(7)?,
        nft_skin_id: row.get(8)?,
        is_verified: row.get::<_, i64>(9)? != 0,
        created_at: row.get(10)?,
    })
}
