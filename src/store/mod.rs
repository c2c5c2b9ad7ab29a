mod accounts;
mod leaderboard;

use core::fmt;
use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use rusqlite::Connection;

pub use leaderboard::{NewScore, SubmitOutcome};

const DB_FILENAME: &str = "rollbounce.db";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictKind {
    WalletTaken,
    UsernameTaken,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule was violated, either by pre-check or by the SQLite
    /// constraint itself when two requests race past the pre-check.
    Conflict(ConflictKind),
    /// SQLite's busy timeout expired; the operation may be retried.
    Busy,
    Internal(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict(ConflictKind::WalletTaken) => write!(f, "wallet already registered"),
            Self::Conflict(ConflictKind::UsernameTaken) => write!(f, "username already taken"),
            Self::Busy => write!(f, "database busy"),
            Self::Internal(detail) => write!(f, "{detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Account row: identity bound to a wallet.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub id: i64,
    pub wallet_address: String,
    /// Lowercased storage key; `player_name` keeps the chosen casing.
    pub username: String,
    pub player_name: String,
    pub is_verified: bool,
}

/// Best-score stats attached to a sign-in response.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStats {
    pub score: i64,
    pub max_combo: i64,
    pub time_survived: f64,
    pub total_bounces: i64,
}

/// One leaderboard row annotated with its live 1-based rank.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedEntry {
    pub rank: i64,
    pub user_id: String,
    pub player_name: String,
    pub score: i64,
    pub max_combo: i64,
    pub time_survived: f64,
    pub total_bounces: i64,
    pub wallet_address: Option<String>,
    pub nft_skin_id: Option<String>,
    pub is_verified: bool,
    pub created_at: i64,
}

/// SQLite-backed store for accounts and the score ledger.
///
/// All access goes through one `Mutex<Connection>`, so every method is a
/// single critical section: check-then-mutate sequences and the
/// upsert-then-rank pair in `submit` cannot interleave with other writers.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database under `data_dir` and bootstrap the
    /// schema. Bootstrap is idempotent; re-opening an existing database is a
    /// no-op beyond the pragmas.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|e| {
            StoreError::Internal(format!(
                "failed to create data dir {}: {e}",
                data_dir.display()
            ))
        })?;

        let db_path = data_dir.join(DB_FILENAME);
        let conn = Connection::open(&db_path).map_err(|e| {
            StoreError::Internal(format!("failed to open SQLite at {}: {e}", db_path.display()))
        })?;

        // busy_timeout bounds every storage call; expiry surfaces as Busy.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(|e| StoreError::Internal(format!("failed to set pragmas: {e}")))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                wallet_address  TEXT NOT NULL UNIQUE,
                username        TEXT NOT NULL UNIQUE,
                player_name     TEXT NOT NULL,
                is_verified     INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS leaderboard (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         TEXT NOT NULL UNIQUE,
                player_name     TEXT NOT NULL,
                score           INTEGER NOT NULL,
                max_combo       INTEGER NOT NULL DEFAULT 0,
                time_survived   REAL NOT NULL DEFAULT 0,
                total_bounces   INTEGER NOT NULL DEFAULT 0,
                wallet_address  TEXT,
                nft_skin_id     TEXT,
                is_verified     INTEGER NOT NULL DEFAULT 0,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_leaderboard_score ON leaderboard(score DESC);
            CREATE INDEX IF NOT EXISTS idx_leaderboard_wallet
                ON leaderboard(wallet_address) WHERE wallet_address IS NOT NULL;",
        )
        .map_err(|e| StoreError::Internal(format!("failed to create schema: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

/// Translate a rusqlite failure into the store taxonomy. Constraint
/// violations become `Conflict` (the race-remap rule); busy-timeout expiry
/// becomes the retryable `Busy`.
pub(crate) fn map_sqlite_err(context: &str, err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, ref message) = err {
        match code.code {
            rusqlite::ErrorCode::ConstraintViolation => {
                let detail = message.as_deref().unwrap_or_default();
                if detail.contains("users.username") {
                    return StoreError::Conflict(ConflictKind::UsernameTaken);
                }
                if detail.contains("users.wallet_address") {
                    return StoreError::Conflict(ConflictKind::WalletTaken);
                }
            }
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                return StoreError::Busy;
            }
            _ => {}
        }
    }
    StoreError::Internal(format!("{context}: {err}"))
}
