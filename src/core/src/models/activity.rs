//! Work tracking: to-dos assigned to people and the change history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Extra, Id, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<Id>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Todo, title, status);

/// Audit trail entry. Read-only on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Id,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<Id>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub user: Option<Id>,
    /// Naive timestamps are read as UTC.
    #[serde(default, deserialize_with = "super::lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for HistoryEntry {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        match (&self.action, &self.entity_type, self.entity_id) {
            (Some(action), Some(kind), Some(id)) => format!("{} {} #{}", action, kind, id),
            (Some(action), Some(kind), None) => format!("{} {}", action, kind),
            _ => self.description.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_label() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": 1,
            "entity_type": "project",
            "entity_id": 42,
            "action": "updated",
            "timestamp": "2024-05-02T10:15:00Z"
        }))
        .unwrap();
        assert_eq!(entry.label(), "updated project #42");
        assert!(entry.timestamp.is_some());
    }

    #[test]
    fn test_naive_timestamp_read_as_utc() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "id": 2,
            "action": "created",
            "timestamp": "2024-05-01T10:00:00"
        }))
        .unwrap();
        let expected = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(entry.timestamp, Some(expected));

        let entry: HistoryEntry =
            serde_json::from_value(json!({"id": 3, "timestamp": "2024-05-01 10:00:00.250"}))
                .unwrap();
        assert!(entry.timestamp.is_some());

        let entry: HistoryEntry =
            serde_json::from_value(json!({"id": 4, "timestamp": null})).unwrap();
        assert!(entry.timestamp.is_none());

        let bad = serde_json::from_value::<HistoryEntry>(json!({"id": 5, "timestamp": "yesterday"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_null_title_is_empty() {
        let todo: Todo = serde_json::from_value(json!({"id": 9, "title": null})).unwrap();
        assert_eq!(todo.title, "");
    }

    #[test]
    fn test_todo_status() {
        let todo: Todo =
            serde_json::from_value(json!({"id": 9, "title": "Run MSA", "status": "open"})).unwrap();
        assert_eq!(todo.status(), Some("open"));
        assert_eq!(todo.label(), "Run MSA");
    }
}
