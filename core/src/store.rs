//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine hands over events and snapshots; nothing else runs SQL.

use crate::{
    error::GameResult,
    event::EventLogEntry,
    types::Turn,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    /// Open (or create) the game database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> GameResult<()> {
        let started_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO run (run_id, seed, version, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_at],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    /// Append a batch in one transaction.
    pub fn append_events(&mut self, entries: &[EventLogEntry]) -> GameResult<()> {
        let tx = self.conn.transaction()?;
        for entry in entries {
            tx.execute(
                "INSERT INTO event_log (run_id, turn, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entry.run_id, entry.turn as i64, entry.event_type, entry.payload],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn events_for_turn(&self, run_id: &str, turn: Turn) -> GameResult<Vec<EventLogEntry>> {
        self.query_events(
            "SELECT id, run_id, turn, event_type, payload
             FROM event_log WHERE run_id = ?1 AND turn = ?2
             ORDER BY id ASC",
            params![run_id, turn as i64],
        )
    }

    pub fn events_for_run(&self, run_id: &str) -> GameResult<Vec<EventLogEntry>> {
        self.query_events(
            "SELECT id, run_id, turn, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY id ASC",
            params![run_id],
        )
    }

    pub fn event_count(&self, run_id: &str) -> GameResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn query_events(
        &self,
        sql:  &str,
        args: impl rusqlite::Params,
    ) -> GameResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let entries = stmt
            .query_map(args, |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    turn:       row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, turn: Turn, state_json: &str) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot (run_id, turn, state_json) VALUES (?1, ?2, ?3)",
            params![run_id, turn as i64, state_json],
        )?;
        Ok(())
    }

    /// Most recently saved snapshot for the run.
    pub fn latest_snapshot(&self, run_id: &str) -> GameResult<Option<(Turn, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT turn, state_json FROM snapshot
                 WHERE run_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![run_id],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}
