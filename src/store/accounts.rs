use rusqlite::{params, Connection, OptionalExtension};

use super::{map_sqlite_err, Account, ConflictKind, Store, StoreError};
use crate::challenge::now_unix_s;

impl Store {
    /// Create a verified account. The wallet address and the username storage
    /// key are lowercased; `player_name` keeps the submitted casing.
    ///
    /// The two existence pre-checks give precise conflict reasons; the UNIQUE
    /// constraints on the insert remain the authoritative guard, and a
    /// constraint violation maps back to the same `Conflict`.
    pub fn create_account(&self, wallet: &str, username: &str) -> Result<Account, StoreError> {
        let wallet = wallet.to_ascii_lowercase();
        let username_key = username.to_ascii_lowercase();

        let conn = self.lock();

        if Self::wallet_exists(&conn, &wallet)? {
            return Err(StoreError::Conflict(ConflictKind::WalletTaken));
        }
        if Self::username_owner(&conn, &username_key)?.is_some() {
            return Err(StoreError::Conflict(ConflictKind::UsernameTaken));
        }

        let now = now_unix_s() as i64;
        conn.execute(
            "INSERT INTO users (wallet_address, username, player_name, is_verified, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)",
            params![wallet, username_key, username, now],
        )
        .map_err(|e| map_sqlite_err("create_account insert", e))?;

        Ok(Account {
            id: conn.last_insert_rowid(),
            wallet_address: wallet,
            username: username_key,
            player_name: username.to_string(),
            is_verified: true,
        })
    }

    /// Look up an account by wallet. Absence is `Ok(None)`, never an error.
    pub fn account_by_wallet(&self, wallet: &str) -> Result<Option<Account>, StoreError> {
        let wallet = wallet.to_ascii_lowercase();
        let conn = self.lock();
        conn.query_row(
            "SELECT id, wallet_address, username, player_name, is_verified
             FROM users WHERE wallet_address = ?1",
            params![wallet],
            row_to_account,
        )
        .optional()
        .map_err(|e| map_sqlite_err("account_by_wallet", e))
    }

    /// Change an account's username and display casing. Returns `Ok(None)`
    /// when no account exists for the wallet. Fails with `Conflict` when the
    /// name belongs to a different wallet; renaming to your own current name
    /// (e.g. to change casing) is allowed.
    pub fn rename_account(
        &self,
        wallet: &str,
        new_username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let wallet = wallet.to_ascii_lowercase();
        let username_key = new_username.to_ascii_lowercase();

        let conn = self.lock();

        if let Some(owner) = Self::username_owner(&conn, &username_key)? {
            if owner != wallet {
                return Err(StoreError::Conflict(ConflictKind::UsernameTaken));
            }
        }

        let now = now_unix_s() as i64;
        let changed = conn
            .execute(
                "UPDATE users SET username = ?1, player_name = ?2, updated_at = ?3
                 WHERE wallet_address = ?4",
                params![username_key, new_username, now, wallet],
            )
            .map_err(|e| map_sqlite_err("rename_account update", e))?;

        if changed == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, wallet_address, username, player_name, is_verified
             FROM users WHERE wallet_address = ?1",
            params![wallet],
            row_to_account,
        )
        .optional()
        .map_err(|e| map_sqlite_err("rename_account readback", e))
    }

    fn wallet_exists(conn: &Connection, wallet: &str) -> Result<bool, StoreError> {
        conn.query_row(
            "SELECT 1 FROM users WHERE wallet_address = ?1",
            params![wallet],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
        .map_err(|e| map_sqlite_err("wallet_exists", e))
    }

    /// Wallet that currently owns `username_key`, if any.
    fn username_owner(conn: &Connection, username_key: &str) -> Result<Option<String>, StoreError> {
        conn.query_row(
            "SELECT wallet_address FROM users WHERE username = ?1",
            params![username_key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| map_sqlite_err("username_owner", e))
    }
}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        wallet_address: row.get(1)?,
        username: row.get(2)?,
        player_name: row.get(3)?,
        is_verified: row.get::<_, i64>(4)? != 0,
    })
}
