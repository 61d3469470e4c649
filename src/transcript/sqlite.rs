use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rusqlite::{Connection, Row, params};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Transcript, TurnRecord};

/// SQLite-backed transcript. Each instance writes under its own session
/// id, so several runs can share one database file.
pub struct SqliteTranscript {
    conn: Mutex<Connection>,
    session: String,
}

impl SqliteTranscript {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open transcript database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL DEFAULT (datetime('now')),
                session TEXT NOT NULL,
                seq INTEGER NOT NULL,
                kind TEXT NOT NULL,
                outgoing TEXT NOT NULL,
                incoming TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS turns_session ON turns (session, seq);",
        )
        .context("failed to create transcript table")?;

        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Ok(Self {
            conn: Mutex::new(conn),
            session: format!("{}-{}", std::process::id(), started),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    /// The id this instance records under.
    pub fn session(&self) -> &str {
        &self.session
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("transcript connection poisoned"))
    }

    fn turn_from_row(row: &Row<'_>) -> rusqlite::Result<TurnRecord> {
        Ok(TurnRecord {
            seq: row.get::<_, i64>(0)? as u64,
            kind: row.get(1)?,
            outgoing: row.get(2)?,
            incoming: row.get(3)?,
        })
    }
}

#[async_trait]
impl Transcript for SqliteTranscript {
    async fn record(&self, turn: TurnRecord) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO turns (session, seq, kind, outgoing, incoming)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                self.session,
                turn.seq as i64,
                turn.kind,
                turn.outgoing,
                turn.incoming
            ],
        )?;
        Ok(())
    }

    async fn turns(&self) -> Result<Vec<TurnRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT seq, kind, outgoing, incoming FROM turns
             WHERE session = ?1 ORDER BY seq ASC",
        )?;
        let turns = stmt
            .query_map(params![self.session], Self::turn_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(turns)
    }
}
