//! Persisted to-do records and their JSON shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::schema::TodoChanges;

/// Longest task text a record accepts, in characters.
pub const MAX_TASK_LEN: usize = 100;

/// A persisted to-do item.
///
/// `created` is written once at insert; `last_updated` on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub is_completed: bool,
    #[serde(with = "iso8601::option")]
    pub should_be_completed_by_date: Option<DateTime<Utc>>,
    #[serde(with = "iso8601")]
    pub created: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub last_updated: DateTime<Utc>,
}

impl Todo {
    /// Assigns every field present in `changes`. Absent fields keep their value.
    pub fn apply(&mut self, changes: TodoChanges) {
        if let Some(task) = changes.task {
            self.task = task;
        }
        if let Some(is_completed) = changes.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(due) = changes.should_be_completed_by_date {
            self.should_be_completed_by_date = due;
        }
    }
}

/// The flat mapping the list endpoint returns for each record.
#[derive(Debug, Serialize)]
pub struct TodoListItem {
    pub id: i64,
    pub task: String,
    pub is_completed: bool,
    #[serde(with = "iso8601::option")]
    pub should_be_completed_by_date: Option<DateTime<Utc>>,
    #[serde(with = "iso8601")]
    pub created: DateTime<Utc>,
}

impl From<Todo> for TodoListItem {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            task: todo.task,
            is_completed: todo.is_completed,
            should_be_completed_by_date: todo.should_be_completed_by_date,
            created: todo.created,
        }
    }
}

/// ISO 8601 text with an explicit `+00:00` offset, e.g.
/// `2024-12-01T00:00:00+00:00`. Sub-second digits appear only when non-zero.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => serializer.serialize_str(&format(ts)),
                None => serializer.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Todo {
        let at = Utc.with_ymd_and_hms(2024, 11, 1, 9, 30, 0).unwrap();
        Todo {
            id: 1,
            task: "buy milk".to_owned(),
            is_completed: false,
            should_be_completed_by_date: Some(Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()),
            created: at,
            last_updated: at,
        }
    }

    #[test]
    fn serializes_timestamps_with_explicit_offset() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["should_be_completed_by_date"], "2024-12-01T00:00:00+00:00");
        assert_eq!(json["created"], "2024-11-01T09:30:00+00:00");
        assert_eq!(json["last_updated"], "2024-11-01T09:30:00+00:00");
    }

    #[test]
    fn list_item_omits_last_updated() {
        let json = serde_json::to_value(TodoListItem::from(sample())).unwrap();
        assert!(json.get("last_updated").is_none());
        assert_eq!(json["task"], "buy milk");
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let mut todo = sample();
        todo.apply(TodoChanges { is_completed: Some(true), ..TodoChanges::default() });
        assert!(todo.is_completed);
        assert_eq!(todo.task, "buy milk");
        assert!(todo.should_be_completed_by_date.is_some());

        todo.apply(TodoChanges { should_be_completed_by_date: Some(None), ..TodoChanges::default() });
        assert_eq!(todo.should_be_completed_by_date, None);
    }
}
