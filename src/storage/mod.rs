//! Read-only access to the SQLite match database.
//!
//! All scouting queries go through [`ScoutStore`]. Fixed aggregations use
//! parametrized SQL internally; the free-form [`ScoutStore::query`] path
//! (used by AI-generated SQL) is additionally screened so only read
//! statements ever reach the engine.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags, ToSql};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod schema;

/// How long a statement may wait on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("query timed out waiting for the database")]
    Timeout,

    #[error("statement rejected: {0}")]
    Rejected(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                StorageError::Timeout
            }
            _ => StorageError::Query(err.to_string()),
        }
    }
}

/// Column-ordered result of a free-form query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
}

impl TabularResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<serde_json::Value>>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as column-keyed JSON objects, capped at `limit`. Used when
    /// handing samples to an AI backend.
    pub fn sample_records(&self, limit: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Something free-form SQL can be run against.
///
/// `ScoutStore` implements this by borrowing its connection, which is
/// enough for the CLI and tests. Async callers that must stay `Send`
/// across awaits use [`ReadOnlyDb`] instead, which reopens the database
/// per query.
pub trait QuerySource {
    fn run_query(&self, sql: &str) -> Result<TabularResult, StorageError>;
}

impl QuerySource for ScoutStore {
    fn run_query(&self, sql: &str) -> Result<TabularResult, StorageError> {
        self.query(sql, &[])
    }
}

/// Re-opening read-only handle. A fresh connection per query keeps this
/// `Sync`, which a borrowed `rusqlite::Connection` is not.
#[derive(Debug, Clone)]
pub struct ReadOnlyDb {
    path: PathBuf,
    busy_timeout_ms: u64,
}

impl ReadOnlyDb {
    pub fn new(path: impl Into<PathBuf>, busy_timeout_ms: u64) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms,
        }
    }

    pub fn open(&self) -> Result<ScoutStore, StorageError> {
        ScoutStore::open_read_only_with_timeout(&self.path, self.busy_timeout_ms)
    }
}

impl QuerySource for ReadOnlyDb {
    fn run_query(&self, sql: &str) -> Result<TabularResult, StorageError> {
        self.open()?.query(sql, &[])
    }
}

fn write_intent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(drop|delete|update|insert|alter|truncate|create)\b")
            .expect("write-intent pattern is valid")
    })
}

/// Rejects any statement that is not a plain read.
///
/// Two screens: the statement must start with SELECT or WITH, and it must
/// not contain a write-intent keyword anywhere. The keyword scan matches
/// whole tokens, so column names like `created_at` pass.
pub fn guard_read_only(sql: &str) -> Result<(), StorageError> {
    let head = sql.trim_start();
    let starts_read = ["select", "with"].iter().any(|kw| {
        head.get(..kw.len())
            .is_some_and(|h| h.eq_ignore_ascii_case(kw))
    });
    if !starts_read {
        return Err(StorageError::Rejected(
            "only SELECT statements are allowed".to_string(),
        ));
    }
    if let Some(m) = write_intent_re().find(sql) {
        return Err(StorageError::Rejected(format!(
            "write keyword '{}' is not allowed",
            m.as_str().to_uppercase()
        )));
    }
    Ok(())
}

/// Handle to the match database.
///
/// Wraps a single `rusqlite::Connection`; a `ScoutStore` is cheap to open,
/// so concurrent callers open their own instead of sharing one.
#[derive(Debug)]
pub struct ScoutStore {
    conn: Connection,
}

impl ScoutStore {
    /// Opens (or creates) a database file with the default busy timeout.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        Self::configure(conn, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Opens an existing database file read-only. This is the production
    /// path; the scouting engine never writes.
    pub fn open_read_only(path: &Path) -> Result<Self, StorageError> {
        Self::open_read_only_with_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn open_read_only_with_timeout(
        path: &Path,
        busy_timeout_ms: u64,
    ) -> Result<Self, StorageError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        Self::configure(conn, busy_timeout_ms)
    }

    /// In-memory database with the schema applied. Used for embedding and
    /// for test fixtures.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        schema::init(&conn).map_err(|e| StorageError::Connection(e.to_string()))?;
        Self::configure(conn, DEFAULT_BUSY_TIMEOUT_MS)
    }

    fn configure(conn: Connection, busy_timeout_ms: u64) -> Result<Self, StorageError> {
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Every team name appearing in the series table, either side,
    /// deduplicated and sorted. Names are case-sensitive identifiers.
    pub fn list_teams(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT team_name FROM (
                 SELECT team1_name AS team_name FROM series
                 UNION
                 SELECT team2_name FROM series
             )
             ORDER BY team_name",
        )?;
        let teams = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    /// Whether the exact team name appears in any series.
    pub fn team_exists(&self, team_name: &str) -> Result<bool, StorageError> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM series WHERE team1_name = ?1 OR team2_name = ?1)",
            [team_name],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    /// Runs a free-form read query and returns every row as JSON values.
    /// The statement is screened by [`guard_read_only`] first.
    pub fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<TabularResult, StorageError> {
        guard_read_only(sql)?;
        debug!(sql, "executing free-form query");

        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(width);
            for i in 0..width {
                record.push(value_to_json(row.get_ref(i)?));
            }
            out.push(record);
        }
        Ok(TabularResult::new(columns, out))
    }
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<{} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::schema::fixtures;

    fn seeded_store() -> ScoutStore {
        let store = ScoutStore::in_memory().unwrap();
        fixtures::series(
            store.conn(),
            "s1",
            "VCT Americas",
            ("100", "Sentinels"),
            ("200", "Cloud9"),
            Some("100"),
            (2, 0),
            "2026-02-01T17:00:00Z",
            true,
        );
        fixtures::series(
            store.conn(),
            "s2",
            "VCT Americas",
            ("300", "100 Thieves"),
            ("100", "Sentinels"),
            Some("300"),
            (2, 1),
            "2026-02-03T17:00:00Z",
            true,
        );
        store
    }

    #[test]
    fn test_list_teams_sorted_and_deduplicated() {
        let store = seeded_store();
        let teams = store.list_teams().unwrap();
        assert_eq!(teams, vec!["100 Thieves", "Cloud9", "Sentinels"]);
    }

    #[test]
    fn test_team_exists_is_case_sensitive() {
        let store = seeded_store();
        assert!(store.team_exists("Sentinels").unwrap());
        assert!(store.team_exists("Cloud9").unwrap());
        assert!(!store.team_exists("sentinels").unwrap());
        assert!(!store.team_exists("Fnatic").unwrap());
    }

    #[test]
    fn test_query_returns_columns_rows_and_count() {
        let store = seeded_store();
        let result = store
            .query(
                "SELECT team1_name, team1_score FROM series ORDER BY started_at",
                &[],
            )
            .unwrap();
        assert_eq!(result.columns, vec!["team1_name", "team1_score"]);
        assert_eq!(result.row_count, 2);
        assert_eq!(result.rows[0][0], serde_json::json!("Sentinels"));
        assert_eq!(result.rows[0][1], serde_json::json!(2));
    }

    #[test]
    fn test_query_supports_parameters() {
        let store = seeded_store();
        let result = store
            .query(
                "SELECT winner_team_id FROM series WHERE team1_name = ?1",
                &[&"Sentinels"],
            )
            .unwrap();
        assert_eq!(result.row_count, 1);
        assert_eq!(result.rows[0][0], serde_json::json!("100"));
    }

    #[test]
    fn test_query_null_becomes_json_null() {
        let store = seeded_store();
        fixtures::series(
            store.conn(),
            "s3",
            "VCT Americas",
            ("100", "Sentinels"),
            ("200", "Cloud9"),
            None,
            (0, 0),
            "2026-02-05T17:00:00Z",
            false,
        );
        let result = store
            .query(
                "SELECT winner_team_id FROM series WHERE series_id = 's3'",
                &[],
            )
            .unwrap();
        assert_eq!(result.rows[0][0], serde_json::Value::Null);
    }

    #[test]
    fn test_guard_allows_select_and_with() {
        assert!(guard_read_only("SELECT 1").is_ok());
        assert!(guard_read_only("  select team1_name from series").is_ok());
        assert!(guard_read_only("WITH x AS (SELECT 1) SELECT * FROM x").is_ok());
    }

    #[test]
    fn test_guard_rejects_write_keywords_case_insensitively() {
        for sql in [
            "DROP TABLE series",
            "delete from series",
            "SELECT 1; Update series SET finished = 1",
            "INSERT INTO series VALUES (1)",
            "alter table series add column x",
            "TRUNCATE TABLE series",
            "CREATE TABLE x (id INT)",
        ] {
            let err = guard_read_only(sql).unwrap_err();
            assert!(matches!(err, StorageError::Rejected(_)), "{sql}");
        }
    }

    #[test]
    fn test_guard_rejects_non_select_statements() {
        assert!(matches!(
            guard_read_only("PRAGMA table_info(series)"),
            Err(StorageError::Rejected(_))
        ));
        assert!(matches!(
            guard_read_only("EXPLAIN SELECT 1"),
            Err(StorageError::Rejected(_))
        ));
    }

    #[test]
    fn test_guard_allows_word_boundary_lookalikes() {
        assert!(guard_read_only("SELECT created_at FROM events").is_ok());
        assert!(guard_read_only("SELECT updated_count FROM stats").is_ok());
    }

    #[test]
    fn test_store_query_rejects_writes() {
        let store = seeded_store();
        let err = store.query("DELETE FROM series", &[]).unwrap_err();
        assert!(matches!(err, StorageError::Rejected(_)));
        // Nothing was deleted.
        assert_eq!(store.list_teams().unwrap().len(), 3);
    }

    #[test]
    fn test_query_error_carries_engine_message() {
        let store = seeded_store();
        let err = store.query("SELECT nope FROM missing_table", &[]).unwrap_err();
        match err {
            StorageError::Query(msg) => assert!(msg.contains("missing_table"), "{msg}"),
            other => panic!("expected Query error, got {other:?}"),
        }
    }

    #[test]
    fn test_open_read_only_on_seeded_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.db");

        let writer = ScoutStore::open(&path).unwrap();
        schema::init(writer.conn()).unwrap();
        fixtures::series(
            writer.conn(),
            "s1",
            "Champions",
            ("100", "Sentinels"),
            ("200", "Fnatic"),
            Some("200"),
            (1, 2),
            "2026-02-10T12:00:00Z",
            true,
        );
        drop(writer);

        let reader = ScoutStore::open_read_only(&path).unwrap();
        assert_eq!(reader.list_teams().unwrap(), vec!["Fnatic", "Sentinels"]);
    }

    #[test]
    fn test_open_read_only_missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScoutStore::open_read_only(&dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }
}
