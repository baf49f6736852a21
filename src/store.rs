//! SQLite persistence for to-do records and page-load counts.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use tracing::debug;

use crate::models::Todo;
use crate::schema::{NewTodo, TodoChanges};

/// Path value that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    Directory(String),

    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Store connection lock poisoned")]
    Poisoned,
}

/// Handle to the database. Cheap to clone; clones share one connection.
///
/// Every operation runs on tokio's blocking pool and holds the connection
/// lock for its full duration, so read-modify-write sequences do not
/// interleave.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (or creates) the database at `path` and initializes the schema.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.as_os_str() == IN_MEMORY {
            return Self::open_in_memory();
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Directory(e.to_string()))?;
            }
        }

        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        initialize_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn call<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await?
    }

    /// All records, latest due date first. Records without a due date come
    /// last; ties go to the newer record.
    pub async fn list_todos(&self) -> Result<Vec<Todo>, StoreError> {
        self.call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task, is_completed, should_be_completed_by_date, created, last_updated
                 FROM todos
                 ORDER BY should_be_completed_by_date IS NULL,
                          should_be_completed_by_date DESC,
                          id DESC",
            )?;
            let todos = stmt
                .query_map([], row_to_todo)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(todos)
        })
        .await
    }

    pub async fn get_todo(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        self.call(move |conn| select_todo(conn, id)).await
    }

    /// Inserts a record and returns it as re-read from the table.
    pub async fn insert_todo(&self, new: NewTodo) -> Result<Todo, StoreError> {
        self.call(move |conn| {
            let now = write_time(None);
            conn.execute(
                "INSERT INTO todos (task, is_completed, should_be_completed_by_date, created, last_updated)
                 VALUES (?1, 0, ?2, ?3, ?3)",
                params![new.task, encode(&new.should_be_completed_by_date), encode(&now)],
            )?;
            let id = conn.last_insert_rowid();
            debug!(id, "inserted todo");
            select_todo(conn, id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
        .await
    }

    /// Assigns the present `changes` to record `id` and advances its
    /// `last_updated`. Returns `None` when no such record exists.
    pub async fn update_todo(
        &self,
        id: i64,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let Some(mut todo) = select_todo(&tx, id)? else {
                return Ok(None);
            };

            todo.apply(changes);
            todo.last_updated = write_time(Some(todo.last_updated));

            tx.execute(
                "UPDATE todos
                 SET task = ?1, is_completed = ?2, should_be_completed_by_date = ?3, last_updated = ?4
                 WHERE id = ?5",
                params![
                    todo.task,
                    todo.is_completed,
                    todo.should_be_completed_by_date.as_ref().map(encode),
                    encode(&todo.last_updated),
                    id,
                ],
            )?;
            tx.commit()?;
            Ok(Some(todo))
        })
        .await
    }

    /// Records one page load and returns the running total.
    pub async fn record_visit(&self) -> Result<i64, StoreError> {
        self.call(|conn| {
            conn.execute(
                "INSERT INTO count_logs (timestamp) VALUES (?1)",
                params![encode(&write_time(None))],
            )?;
            count_visits(conn)
        })
        .await
    }

    /// Cheap round trip used by the readiness check.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.call(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
        .await
    }
}

fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS todos (
            id                          INTEGER PRIMARY KEY AUTOINCREMENT,
            task                        TEXT NOT NULL,
            is_completed                INTEGER NOT NULL DEFAULT 0,
            should_be_completed_by_date TEXT,
            created                     TEXT NOT NULL,
            last_updated                TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_todos_due_date ON todos(should_be_completed_by_date);
        CREATE TABLE IF NOT EXISTS count_logs (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn select_todo(conn: &Connection, id: i64) -> Result<Option<Todo>, StoreError> {
    let todo = conn
        .query_row(
            "SELECT id, task, is_completed, should_be_completed_by_date, created, last_updated
             FROM todos WHERE id = ?1",
            params![id],
            row_to_todo,
        )
        .optional()?;
    Ok(todo)
}

fn count_visits(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM count_logs", [], |row| row.get(0))?)
}

fn row_to_todo(row: &Row) -> Result<Todo, rusqlite::Error> {
    let due: Option<String> = row.get(3)?;
    Ok(Todo {
        id: row.get(0)?,
        task: row.get(1)?,
        is_completed: row.get(2)?,
        should_be_completed_by_date: due.map(|s| parse_stored(3, &s)).transpose()?,
        created: decode(row, 4)?,
        last_updated: decode(row, 5)?,
    })
}

// ── Timestamp encoding ────────────────────────────────────────────────────────
//
// Stored as fixed-width UTC RFC 3339 with microseconds, so text order is
// chronological order.

fn encode(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let text: String = row.get(idx)?;
    parse_stored(idx, &text)
}

fn parse_stored(idx: usize, text: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.to_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// The timestamp for a write, at storage precision. Strictly later than
/// `previous` so that `last_updated` always moves forward.
fn write_time(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match previous {
        Some(prev) => now.max(prev + Duration::microseconds(1)),
        None => now,
    }
}
