// SQLite persistence for the live draft log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::draft::pick::DraftPick;

/// SQLite-backed storage for recorded picks and key-value draft state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS draft_picks (
                pick_number INTEGER NOT NULL,
                player_name TEXT NOT NULL,
                position    TEXT NOT NULL,
                draft_id    TEXT NOT NULL DEFAULT '',
                timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (pick_number, draft_id)
            );

            CREATE INDEX IF NOT EXISTS idx_draft_picks_draft_id ON draft_picks(draft_id);

            CREATE TABLE IF NOT EXISTS draft_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self { conn })
    }

    // ------------------------------------------------------------------
    // Draft picks
    // ------------------------------------------------------------------

    /// Record a single pick. Re-recording the same pick number in the same
    /// draft is a no-op. The timestamp is generated by SQLite.
    pub fn record_pick(&self, pick: &DraftPick, draft_id: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO draft_picks (pick_number, player_name, position, draft_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![pick.pick_number, pick.player_name, pick.position, draft_id],
            )
            .context("failed to record draft pick")?;
        Ok(())
    }

    /// Picks for one draft, ordered by pick number.
    pub fn load_picks(&self, draft_id: &str) -> Result<Vec<DraftPick>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT pick_number, player_name, position, timestamp
                 FROM draft_picks WHERE draft_id = ?1 ORDER BY pick_number",
            )
            .context("failed to prepare load_picks query")?;

        let picks = stmt
            .query_map(params![draft_id], |row| {
                let timestamp: String = row.get(3)?;
                Ok(DraftPick {
                    pick_number: row.get(0)?,
                    player_name: row.get(1)?,
                    position: row.get(2)?,
                    recorded_at: parse_timestamp(&timestamp),
                })
            })
            .context("failed to query draft picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map draft pick rows")?;

        Ok(picks)
    }

    /// Delete the highest-numbered pick of a draft and return it.
    /// `None` when the draft has no picks.
    pub fn remove_last_pick(&mut self, draft_id: &str) -> Result<Option<DraftPick>> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;

        let last = tx
            .query_row(
                "SELECT pick_number, player_name, position, timestamp
                 FROM draft_picks WHERE draft_id = ?1
                 ORDER BY pick_number DESC LIMIT 1",
                params![draft_id],
                |row| {
                    let timestamp: String = row.get(3)?;
                    Ok(DraftPick {
                        pick_number: row.get(0)?,
                        player_name: row.get(1)?,
                        position: row.get(2)?,
                        recorded_at: parse_timestamp(&timestamp),
                    })
                },
            )
            .optional()
            .context("failed to query last draft pick")?;

        if let Some(pick) = &last {
            tx.execute(
                "DELETE FROM draft_picks WHERE draft_id = ?1 AND pick_number = ?2",
                params![draft_id, pick.pick_number],
            )
            .context("failed to delete draft pick")?;
        }

        tx.commit().context("failed to commit remove_last_pick")?;
        Ok(last)
    }

    /// Delete all picks and draft state. Uses a transaction so a failure
    /// leaves the log untouched.
    pub fn clear_draft(&mut self) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to begin transaction")?;
        tx.execute("DELETE FROM draft_picks", [])
            .context("failed to delete draft picks")?;
        tx.execute("DELETE FROM draft_state", [])
            .context("failed to delete draft state")?;
        tx.commit().context("failed to commit clear_draft")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Key-value state
    // ------------------------------------------------------------------

    /// Persist a JSON value under `key`, replacing any previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO draft_state (key, value) VALUES (?1, ?2)",
                params![key, json_str],
            )
            .context("failed to save state")?;
        Ok(())
    }

    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let json_str: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM draft_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query draft state")?;

        match json_str {
            Some(s) => {
                let value = serde_json::from_str(&s).context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Draft ID management
    // ------------------------------------------------------------------

    const DRAFT_ID_KEY: &'static str = "current_draft_id";

    pub fn get_draft_id(&self) -> Result<Option<String>> {
        let value = self.load_state(Self::DRAFT_ID_KEY)?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    pub fn set_draft_id(&self, draft_id: &str) -> Result<()> {
        self.save_state(
            Self::DRAFT_ID_KEY,
            &serde_json::Value::String(draft_id.to_string()),
        )
    }

    /// The stored draft ID, or a freshly generated and stored one.
    pub fn current_draft_id(&self) -> Result<String> {
        if let Some(id) = self.get_draft_id()? {
            return Ok(id);
        }
        let id = Self::generate_draft_id();
        self.set_draft_id(&id)?;
        Ok(id)
    }

    /// New draft ID from the current UTC time:
    /// `draft_YYYYMMDD_HHMMSS_mmm`.
    pub fn generate_draft_id() -> String {
        Utc::now().format("draft_%Y%m%d_%H%M%S_%3f").to_string()
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_DRAFT_ID: &str = "test_draft_001";

    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn sample_pick(pick_number: u32) -> DraftPick {
        DraftPick {
            pick_number,
            player_name: format!("Player {pick_number}"),
            position: "RB".to_string(),
            recorded_at: None,
        }
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"draft_picks".to_string()));
        assert!(tables.contains(&"draft_state".to_string()));
    }

    #[test]
    fn record_and_load_picks_in_order() {
        let db = test_db();
        db.record_pick(&sample_pick(2), TEST_DRAFT_ID).unwrap();
        db.record_pick(&sample_pick(1), TEST_DRAFT_ID).unwrap();

        let picks = db.load_picks(TEST_DRAFT_ID).unwrap();
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].pick_number, 1);
        assert_eq!(picks[0].player_name, "Player 1");
        assert_eq!(picks[0].position, "RB");
        assert_eq!(picks[1].pick_number, 2);
    }

    #[test]
    fn loaded_picks_carry_timestamp() {
        let db = test_db();
        db.record_pick(&sample_pick(1), TEST_DRAFT_ID).unwrap();
        let picks = db.load_picks(TEST_DRAFT_ID).unwrap();
        assert!(picks[0].recorded_at.is_some());
    }

    #[test]
    fn record_pick_idempotent_on_duplicate() {
        let db = test_db();
        db.record_pick(&sample_pick(1), TEST_DRAFT_ID).unwrap();
        let dup = DraftPick {
            player_name: "Someone Else".into(),
            ..sample_pick(1)
        };
        db.record_pick(&dup, TEST_DRAFT_ID).unwrap();

        let picks = db.load_picks(TEST_DRAFT_ID).unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].player_name, "Player 1");
    }

    #[test]
    fn picks_scoped_to_draft_id() {
        let db = test_db();
        db.record_pick(&sample_pick(1), "draft_a").unwrap();
        db.record_pick(&sample_pick(1), "draft_b").unwrap();
        db.record_pick(&sample_pick(2), "draft_b").unwrap();

        assert_eq!(db.load_picks("draft_a").unwrap().len(), 1);
        assert_eq!(db.load_picks("draft_b").unwrap().len(), 2);
        assert_eq!(db.load_picks("draft_c").unwrap().len(), 0);
    }

    #[test]
    fn remove_last_pick_returns_highest() {
        let mut db = test_db();
        for n in 1..=3 {
            db.record_pick(&sample_pick(n), TEST_DRAFT_ID).unwrap();
        }

        let removed = db.remove_last_pick(TEST_DRAFT_ID).unwrap().unwrap();
        assert_eq!(removed.pick_number, 3);
        assert_eq!(db.load_picks(TEST_DRAFT_ID).unwrap().len(), 2);

        let next = db.remove_last_pick(TEST_DRAFT_ID).unwrap().unwrap();
        assert_eq!(next.pick_number, 2);
    }

    #[test]
    fn remove_last_pick_on_empty_draft() {
        let mut db = test_db();
        assert!(db.remove_last_pick(TEST_DRAFT_ID).unwrap().is_none());
    }

    #[test]
    fn save_and_load_state() {
        let db = test_db();
        db.save_state("settings", &json!({"target": 11})).unwrap();
        assert_eq!(db.load_state("settings").unwrap(), Some(json!({"target": 11})));

        db.save_state("settings", &json!({"target": 14})).unwrap();
        assert_eq!(db.load_state("settings").unwrap(), Some(json!({"target": 14})));

        assert_eq!(db.load_state("missing").unwrap(), None);
    }

    #[test]
    fn clear_draft_resets_picks_and_state() {
        let mut db = test_db();
        db.record_pick(&sample_pick(1), TEST_DRAFT_ID).unwrap();
        db.set_draft_id(TEST_DRAFT_ID).unwrap();

        db.clear_draft().unwrap();

        assert!(db.load_picks(TEST_DRAFT_ID).unwrap().is_empty());
        assert_eq!(db.get_draft_id().unwrap(), None);
    }

    #[test]
    fn draft_id_persists_via_state_store() {
        let db = test_db();
        assert_eq!(db.get_draft_id().unwrap(), None);

        db.set_draft_id("draft_x").unwrap();
        assert_eq!(db.get_draft_id().unwrap().as_deref(), Some("draft_x"));
        assert_eq!(db.current_draft_id().unwrap(), "draft_x");
    }

    #[test]
    fn current_draft_id_generates_once() {
        let db = test_db();
        let first = db.current_draft_id().unwrap();
        let second = db.current_draft_id().unwrap();
        assert!(first.starts_with("draft_"));
        assert_eq!(first, second);
    }

    #[test]
    fn generate_draft_id_format() {
        let id = Database::generate_draft_id();
        assert!(id.starts_with("draft_"), "unexpected draft id: {id}");
        // draft_YYYYMMDD_HHMMSS_mmm
        assert_eq!(id.len(), 25, "unexpected draft id: {id}");
    }
}
