//! People and access: teams, persons, departments, customer contacts and
//! clients, user accounts and authorization profiles.

use serde::{Deserialize, Serialize};

use super::{Extra, Id, Record};
use crate::permissions::{AuthorizationLevel, PermissionSets};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub members: Vec<Id>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Team, name);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<Id>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub teams: Vec<Id>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Record for Person {
    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Department, name);

/// Contact person at a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub contact_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub client: Option<Id>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Contact, name);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Client, name);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub authorization: Option<Id>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(User, username);

/// Named authorization profile that users are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: Id,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub authorization_level: AuthorizationLevel,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub permissions: PermissionSets,
    #[serde(flatten)]
    pub extra: Extra,
}

impl_record!(Authorization, name);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_label_joins_names() {
        let person: Person =
            serde_json::from_value(json!({"id": 5, "first_name": "Ada", "last_name": "Lovelace"}))
                .unwrap();
        assert_eq!(person.label(), "Ada Lovelace");

        let person: Person = serde_json::from_value(json!({"id": 6, "first_name": "Ada"})).unwrap();
        assert_eq!(person.label(), "Ada");
    }

    #[test]
    fn test_authorization_profile_fields() {
        let auth: Authorization = serde_json::from_value(json!({
            "id": 3,
            "name": "Quality admin",
            "authorization_level": "admin",
            "permissions": {"can_read": ["project"]}
        }))
        .unwrap();
        assert_eq!(auth.authorization_level, AuthorizationLevel::Admin);
        assert!(auth.permissions.can_read.contains("project"));
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let team: Team =
            serde_json::from_value(json!({"id": 1, "name": null, "members": null})).unwrap();
        assert_eq!(team.name, "");
        assert!(team.members.is_empty());

        let person: Person =
            serde_json::from_value(json!({"id": 5, "first_name": "Ada", "last_name": null}))
                .unwrap();
        assert_eq!(person.label(), "Ada");
    }
}
