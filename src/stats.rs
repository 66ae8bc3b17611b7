use crate::app_dirs::AppDirs;
use crate::drill::InputOutcome;
use crate::error::DrillResult;
use chrono::Local;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Historical timing aggregate for one letter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LetterStat {
    pub total_ms: u64,
    pub timed_count: u64,
    pub hits: u64,
    pub misses: u64,
}

impl LetterStat {
    /// Average reaction time over timed observations
    pub fn avg_ms(&self) -> Option<f64> {
        if self.timed_count == 0 {
            None
        } else {
            Some(self.total_ms as f64 / self.timed_count as f64)
        }
    }

    /// Percentage of attempts on this letter that were misses
    pub fn miss_rate(&self) -> f64 {
        let attempts = self.hits + self.misses;
        if attempts == 0 {
            0.0
        } else {
            self.misses as f64 / attempts as f64 * 100.0
        }
    }
}

/// Read-only view of per-letter history consulted by letter selection.
/// A letter with no entry has no data.
pub trait StatsSource {
    fn letter_stat(&self, letter: char) -> Option<LetterStat>;
}

impl StatsSource for HashMap<char, LetterStat> {
    fn letter_stat(&self, letter: char) -> Option<LetterStat> {
        self.get(&letter).copied()
    }
}

/// In-memory per-letter aggregates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LetterStats {
    data: HashMap<char, LetterStat>,
}

impl LetterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one keystroke outcome into the aggregates.
    /// Only hits that were not skipped contribute timing.
    pub fn record(&mut self, outcome: &InputOutcome) {
        let stat = self.data.entry(outcome.letter).or_default();
        if !outcome.hit {
            stat.misses += 1;
            return;
        }
        stat.hits += 1;
        if !outcome.skip_time {
            stat.total_ms += outcome.time_ms;
            stat.timed_count += 1;
        }
    }

    pub fn insert(&mut self, letter: char, stat: LetterStat) {
        self.data.insert(letter, stat);
    }

    pub fn get(&self, letter: char) -> Option<&LetterStat> {
        self.data.get(&letter)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &LetterStat)> {
        self.data.iter().map(|(c, s)| (*c, s))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl StatsSource for LetterStats {
    fn letter_stat(&self, letter: char) -> Option<LetterStat> {
        self.data.get(&letter).copied()
    }
}

/// SQLite-backed log of every evaluated keystroke
#[derive(Debug)]
pub struct StatsDb {
    conn: Connection,
}

impl StatsDb {
    /// Open the database at the default state location
    pub fn open_default() -> DrillResult<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("letterdrill_stats.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> DrillResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> DrillResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DrillResult<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS letter_observations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                letter TEXT NOT NULL,
                time_ms INTEGER NOT NULL,
                hit BOOLEAN NOT NULL,
                timed BOOLEAN NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_letter_observations_letter ON letter_observations(letter)",
            [],
        )?;

        Ok(StatsDb { conn })
    }

    /// Record a single keystroke outcome
    pub fn record(&self, outcome: &InputOutcome) -> DrillResult<()> {
        Self::insert(&self.conn, outcome)?;
        Ok(())
    }

    /// Record several outcomes in one transaction
    pub fn record_batch(&mut self, outcomes: &[InputOutcome]) -> DrillResult<()> {
        let tx = self.conn.transaction()?;
        for outcome in outcomes {
            Self::insert(&tx, outcome)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(conn: &Connection, outcome: &InputOutcome) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO letter_observations (letter, time_ms, hit, timed, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                outcome.letter.to_string(),
                outcome.time_ms,
                outcome.hit,
                outcome.hit && !outcome.skip_time,
                Local::now().to_rfc3339(),
            ],
        )
    }

    /// Aggregate the full history into per-letter stats
    pub fn load_summary(&self) -> DrillResult<LetterStats> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                letter,
                COALESCE(SUM(CASE WHEN timed = 1 THEN time_ms ELSE 0 END), 0) AS total_ms,
                SUM(CASE WHEN timed = 1 THEN 1 ELSE 0 END) AS timed_count,
                SUM(CASE WHEN hit = 1 THEN 1 ELSE 0 END) AS hits,
                SUM(CASE WHEN hit = 0 THEN 1 ELSE 0 END) AS misses
            FROM letter_observations
            GROUP BY letter
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let letter: String = row.get(0)?;
            let stat = LetterStat {
                total_ms: row.get::<_, i64>(1)? as u64,
                timed_count: row.get::<_, i64>(2)? as u64,
                hits: row.get::<_, i64>(3)? as u64,
                misses: row.get::<_, i64>(4)? as u64,
            };
            Ok((letter.chars().next().unwrap_or('\0'), stat))
        })?;

        let mut stats = LetterStats::new();
        for row in rows {
            let (letter, stat) = row?;
            stats.insert(letter, stat);
        }
        Ok(stats)
    }

    /// Clear all statistics
    pub fn clear_all(&self) -> DrillResult<()> {
        self.conn.execute("DELETE FROM letter_observations", [])?;
        Ok(())
    }
}
