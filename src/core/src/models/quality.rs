//! APQP project structure: projects, PPAPs, phases, outputs, documents,
//! elements and the templates phases and outputs are cloned from.

use serde::{Deserialize, Serialize};

use super::{Extra, Id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client: Option<Id>,
    #[serde(default)]
    pub team: Option<Id>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Project, name, status);

/// Production Part Approval Process submission attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ppap {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub project: Option<Id>,
    /// Submission level (1-5).
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Ppap, name, status);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub project: Option<Id>,
    #[serde(default)]
    pub template: Option<Id>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Phase, name, status);

/// Deliverable produced within a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub phase: Option<Id>,
    #[serde(default)]
    pub template: Option<Id>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Output, name, status);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub element: Option<Id>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Document, name);

/// One of the PPAP submission elements (design records, PFMEA, control plan, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub ppap: Option<Id>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Element, name, status);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTemplate {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(PhaseTemplate, name);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTemplate {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub phase_template: Option<Id>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(OutputTemplate, name);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use serde_json::json;

    #[test]
    fn test_project_keeps_unknown_fields() {
        let value = json!({
            "id": 42,
            "name": "Bracket launch",
            "status": "active",
            "start_date": "2024-03-01"
        });
        let project: Project = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(project.id(), 42);
        assert_eq!(project.label(), "Bracket launch");
        assert_eq!(project.status(), Some("active"));
        assert_eq!(project.extra["start_date"], "2024-03-01");
        assert_eq!(serde_json::to_value(&project).unwrap()["start_date"], "2024-03-01");
    }

    #[test]
    fn test_missing_id_fails() {
        assert!(serde_json::from_value::<Phase>(json!({"name": "Planning"})).is_err());
    }

    #[test]
    fn test_ppap_level() {
        let ppap: Ppap = serde_json::from_value(json!({"id": 3, "level": 3})).unwrap();
        assert_eq!(ppap.level, Some(3));
        assert_eq!(ppap.status(), None);
    }
}
