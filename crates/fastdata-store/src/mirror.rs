//! Key -> string mirror of remote state.
//!
//! Values are JSON documents. The following list of an account lives under
//! [`following_key`].

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use fastdata_shared::AccountId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{MirrorEntry, MirroredFollowing};

/// Mirror key holding the following list of `account`.
pub fn following_key(account: &AccountId) -> String {
    format!("following_{account}")
}

impl Database {
    pub fn mirror_entry(&self, key: &str) -> Result<Option<MirrorEntry>> {
        self.conn()
            .query_row(
                "SELECT key, value, updated_at FROM mirror WHERE key = ?1",
                params![key],
                row_to_entry,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    pub fn mirror_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO mirror (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Last mirrored following list of `account`, `None` if never written.
    pub fn load_following(&self, account: &AccountId) -> Result<Option<MirroredFollowing>> {
        let Some(entry) = self.mirror_entry(&following_key(account))? else {
            return Ok(None);
        };
        Ok(Some(MirroredFollowing {
            accounts: serde_json::from_str(&entry.value)?,
            updated_at: entry.updated_at,
        }))
    }

    pub fn save_following(&self, account: &AccountId, following: &[AccountId]) -> Result<()> {
        let json = serde_json::to_string(following)?;
        self.mirror_set(&following_key(account), &json)?;
        tracing::debug!(account = %account, count = following.len(), "following list mirrored");
        Ok(())
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<MirrorEntry> {
    let key: String = row.get(0)?;
    let value: String = row.get(1)?;
    let updated_str: String = row.get(2)?;

    let updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&updated_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(MirrorEntry {
        key,
        value,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("mirror.db")).unwrap();
        (dir, db)
    }

    fn ids(list: &[&str]) -> Vec<AccountId> {
        list.iter().map(|s| AccountId::from_trusted(*s)).collect()
    }

    fn accounts(db: &Database, account: &AccountId) -> Option<Vec<AccountId>> {
        db.load_following(account).unwrap().map(|m| m.accounts)
    }

    #[test]
    fn test_following_roundtrip() {
        let (_dir, db) = open();
        let james = AccountId::from_trusted("james.near");

        assert_eq!(db.load_following(&james).unwrap(), None);

        let before = Utc::now();
        let list = ids(&["alice.near", "bob.near"]);
        db.save_following(&james, &list).unwrap();

        let mirrored = db.load_following(&james).unwrap().unwrap();
        assert_eq!(mirrored.accounts, list);
        assert!(mirrored.updated_at >= before - chrono::Duration::seconds(1));

        let raw = db.mirror_entry("following_james.near").unwrap().unwrap();
        assert_eq!(raw.key, "following_james.near");
        assert_eq!(raw.value, r#"["alice.near","bob.near"]"#);
    }

    #[test]
    fn test_accounts_are_isolated() {
        let (_dir, db) = open();
        let james = AccountId::from_trusted("james.near");
        let kate = AccountId::from_trusted("kate.near");

        db.save_following(&james, &ids(&["alice.near"])).unwrap();
        db.save_following(&kate, &ids(&["bob.near", "carol.near"])).unwrap();

        assert_eq!(accounts(&db, &james), Some(ids(&["alice.near"])));
        assert_eq!(accounts(&db, &kate), Some(ids(&["bob.near", "carol.near"])));
    }

    #[test]
    fn test_overwrite_moves_timestamp() {
        let (_dir, db) = open();
        db.mirror_set("k", "1").unwrap();
        let first = db.mirror_entry("k").unwrap().unwrap();
        db.mirror_set("k", "2").unwrap();
        let second = db.mirror_entry("k").unwrap().unwrap();
        assert_eq!(second.value, "2");
        assert!(second.updated_at >= first.updated_at);

        assert_eq!(db.mirror_entry("missing").unwrap(), None);
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let (_dir, db) = open();
        let james = AccountId::from_trusted("james.near");
        db.mirror_set(&following_key(&james), "not json").unwrap();
        assert!(matches!(db.load_following(&james), Err(StoreError::Json(_))));
    }
}
