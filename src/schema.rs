//! Inbound payload shapes.
//!
//! Create bodies deserialize straight into a typed payload. Partial-update
//! bodies are read as a raw JSON object so that an absent key and an explicit
//! `null` can be told apart.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::MAX_TASK_LEN;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: id")]
    MissingId,

    #[error("Field 'id' must be an integer")]
    InvalidId,

    #[error("Field 'task' must be a string")]
    TaskNotString,

    #[error("Field 'task' must be at most {} characters", MAX_TASK_LEN)]
    TaskTooLong,

    #[error("Field 'is_completed' must be a boolean")]
    InvalidCompleted,

    #[error("Field 'should_be_completed_by_date' must include timezone information")]
    NaiveTimestamp,

    #[error("Field 'should_be_completed_by_date' is not a valid ISO 8601 timestamp")]
    InvalidTimestamp,
}

impl SchemaError {
    fn from_serde(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            Self::InvalidJson(e)
        } else {
            Self::InvalidPayload(e)
        }
    }
}

// ── Timestamps ────────────────────────────────────────────────────────────────

/// A parsed timestamp, keeping track of whether it carried an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
}

const AWARE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses ISO 8601 text. Returns `None` when `s` is not a timestamp at all.
///
/// A bare date (`2024-12-01`) parses as naive midnight.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(Timestamp::Aware(ts.to_utc()));
    }
    if let Some(ts) = AWARE_FORMATS.iter().find_map(|f| DateTime::parse_from_str(s, f).ok()) {
        return Some(Timestamp::Aware(ts.to_utc()));
    }
    if let Some(ts) = NAIVE_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(s, f).ok()) {
        return Some(Timestamp::Naive(ts));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Timestamp::Naive)
}

fn check_task(task: &str) -> Result<(), SchemaError> {
    if task.chars().count() > MAX_TASK_LEN {
        return Err(SchemaError::TaskTooLong);
    }
    Ok(())
}

// ── Create ────────────────────────────────────────────────────────────────────

/// A validated create payload: `{task, should_be_completed_by_date}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub should_be_completed_by_date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct NewTodoPayload {
    task: String,
    should_be_completed_by_date: String,
}

impl NewTodo {
    /// Validates a create body.
    ///
    /// Naive timestamps are read as UTC and logged, matching how a
    /// timezone-aware ORM stores them.
    pub fn from_json(body: &[u8]) -> Result<Self, SchemaError> {
        let payload: NewTodoPayload =
            serde_json::from_slice(body).map_err(SchemaError::from_serde)?;
        check_task(&payload.task)?;

        let due = match parse_timestamp(&payload.should_be_completed_by_date) {
            Some(Timestamp::Aware(ts)) => ts,
            Some(Timestamp::Naive(ts)) => {
                warn!(value = %payload.should_be_completed_by_date, "naive due date read as UTC");
                ts.and_utc()
            }
            None => return Err(SchemaError::InvalidTimestamp),
        };

        Ok(Self { task: payload.task, should_be_completed_by_date: due })
    }
}

// ── Partial update ────────────────────────────────────────────────────────────

/// The fields a partial update may assign. `None` means "leave as is".
///
/// The due date is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub task: Option<String>,
    pub is_completed: Option<bool>,
    pub should_be_completed_by_date: Option<Option<DateTime<Utc>>>,
}

/// A validated partial-update payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoPatch {
    pub id: i64,
    pub changes: TodoChanges,
}

impl TodoPatch {
    /// Parses and validates a raw update body. Unknown keys are ignored.
    pub fn from_json(body: &[u8]) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_slice(body).map_err(SchemaError::InvalidJson)?;
        let Value::Object(mut fields) = value else {
            return Err(SchemaError::NotAnObject);
        };

        let id = parse_id(fields.remove("id"))?;
        let changes = TodoChanges {
            task: parse_task(&mut fields)?,
            is_completed: match fields.remove("is_completed") {
                None => None,
                Some(Value::Bool(b)) => Some(b),
                Some(_) => return Err(SchemaError::InvalidCompleted),
            },
            should_be_completed_by_date: parse_due(&mut fields)?,
        };

        Ok(Self { id, changes })
    }
}

fn parse_id(value: Option<Value>) -> Result<i64, SchemaError> {
    match value {
        None | Some(Value::Null) => Err(SchemaError::MissingId),
        Some(Value::Number(n)) => n.as_i64().ok_or(SchemaError::InvalidId),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| SchemaError::InvalidId),
        Some(_) => Err(SchemaError::InvalidId),
    }
}

fn parse_task(fields: &mut Map<String, Value>) -> Result<Option<String>, SchemaError> {
    match fields.remove("task") {
        None => Ok(None),
        Some(Value::String(task)) => {
            check_task(&task)?;
            Ok(Some(task))
        }
        Some(_) => Err(SchemaError::TaskNotString),
    }
}

fn parse_due(fields: &mut Map<String, Value>) -> Result<Option<Option<DateTime<Utc>>>, SchemaError> {
    match fields.remove("should_be_completed_by_date") {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => match parse_timestamp(&s) {
            Some(Timestamp::Aware(ts)) => Ok(Some(Some(ts))),
            Some(Timestamp::Naive(_)) => Err(SchemaError::NaiveTimestamp),
            None => Err(SchemaError::InvalidTimestamp),
        },
        Some(_) => Err(SchemaError::InvalidTimestamp),
    }
}
