//! Permission evaluation against the cached authorization profile.
//!
//! Pure decisions, no I/O. The evaluator answers "may the current user
//! perform `action` on entities of `entity_type`?":
//!
//! 1. no authenticated user → deny
//! 2. `authorization_level == admin` → allow
//! 3. otherwise allow iff `entity_type` is in the set named by the action
//!    (`can_create`, `can_read`, `can_update`, `can_delete`); any other action
//!    denies
//!
//! A denial is a `false` / [`PolicyDecision::Deny`], never an error.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::models::Id;
use crate::session::Session;

// ═══════════════════════════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════════════════════════

/// CRUD action a permission set is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned for action names outside create/read/update/delete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Authorization Profile
// ═══════════════════════════════════════════════════════════════════════════════

/// Role tier of an authorization profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationLevel {
    Admin,
    #[default]
    Standard,
    /// Any level this client does not know by name.
    #[serde(other)]
    Other,
}

/// Entity types the user may act on, per action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSets {
    #[serde(default)]
    pub can_create: BTreeSet<String>,
    #[serde(default)]
    pub can_read: BTreeSet<String>,
    #[serde(default)]
    pub can_update: BTreeSet<String>,
    #[serde(default)]
    pub can_delete: BTreeSet<String>,
}

impl PermissionSets {
    /// The entity-type set that governs `action`.
    pub fn for_action(&self, action: Action) -> &BTreeSet<String> {
        match action {
            Action::Create => &self.can_create,
            Action::Read => &self.can_read,
            Action::Update => &self.can_update,
            Action::Delete => &self.can_delete,
        }
    }
}

/// Cached description of what the current user may do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationProfile {
    #[serde(default)]
    pub authorization_level: AuthorizationLevel,
    #[serde(default)]
    pub permissions: PermissionSets,
}

impl AuthorizationProfile {
    pub fn is_admin(&self) -> bool {
        self.authorization_level == AuthorizationLevel::Admin
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The action is allowed.
    Allow,
    /// The action is denied, with a reason.
    Deny(String),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }
}

/// Evaluate `action` on `entity_type` for the session's current user.
///
/// `entity_id` is accepted for call-site symmetry with per-item screens; the
/// decision does not depend on it.
pub fn decide(
    session: &Session,
    action: &str,
    entity_type: &str,
    entity_id: Option<Id>,
) -> PolicyDecision {
    let Some(user) = session.current_user() else {
        return PolicyDecision::Deny("not authenticated".to_string());
    };

    let profile = &user.authorization;
    if profile.is_admin() {
        return PolicyDecision::Allow;
    }

    let action = match action.parse::<Action>() {
        Ok(action) => action,
        Err(e) => return PolicyDecision::Deny(e.to_string()),
    };

    trace!(%action, entity_type, entity_id = ?entity_id, "Evaluating permission");

    if profile.permissions.for_action(action).contains(entity_type) {
        PolicyDecision::Allow
    } else {
        PolicyDecision::Deny(format!("missing can_{} for {}", action, entity_type))
    }
}

/// Boolean form of [`decide`].
pub fn has_permission(
    session: &Session,
    action: &str,
    entity_type: &str,
    entity_id: Option<Id>,
) -> bool {
    decide(session, action, entity_type, entity_id).is_allowed()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CurrentUser;

    const ACTIONS: [&str; 6] = ["create", "read", "update", "delete", "approve", ""];
    const ENTITIES: [&str; 4] = ["project", "ppap", "todo", "history"];

    fn session_with(profile: AuthorizationProfile) -> Session {
        Session::authenticated(CurrentUser {
            permissions: serde_json::Value::Null,
            authorization: profile,
        })
    }

    fn standard(create: &[&str], read: &[&str]) -> AuthorizationProfile {
        AuthorizationProfile {
            authorization_level: AuthorizationLevel::Standard,
            permissions: PermissionSets {
                can_create: create.iter().map(|s| s.to_string()).collect(),
                can_read: read.iter().map(|s| s.to_string()).collect(),
                ..PermissionSets::default()
            },
        }
    }

    #[test]
    fn test_unauthenticated_denies_everything() {
        let session = Session::default();
        for action in ACTIONS {
            for entity in ENTITIES {
                assert!(!has_permission(&session, action, entity, None));
                assert!(!has_permission(&session, action, entity, Some(1)));
            }
        }
    }

    #[test]
    fn test_admin_allows_everything() {
        let session = session_with(AuthorizationProfile {
            authorization_level: AuthorizationLevel::Admin,
            permissions: PermissionSets::default(),
        });
        for action in ACTIONS {
            for entity in ENTITIES {
                assert!(has_permission(&session, action, entity, None));
            }
        }
    }

    #[test]
    fn test_create_requires_membership() {
        let session = session_with(standard(&["project"], &["project", "todo"]));
        assert!(has_permission(&session, "create", "project", None));
        assert!(!has_permission(&session, "create", "todo", None));
        assert!(has_permission(&session, "read", "todo", None));
        assert!(!has_permission(&session, "update", "project", None));
        assert!(!has_permission(&session, "delete", "project", None));
    }

    #[test]
    fn test_unknown_action_denies() {
        let session = session_with(standard(&["project"], &["project"]));
        let decision = decide(&session, "approve", "project", None);
        assert_eq!(decision, PolicyDecision::Deny("Unknown action: approve".to_string()));
        assert!(!has_permission(&session, "CREATE", "project", None));
    }

    #[test]
    fn test_entity_id_does_not_change_decision() {
        let session = session_with(standard(&["project"], &[]));
        assert_eq!(
            has_permission(&session, "create", "project", None),
            has_permission(&session, "create", "project", Some(42))
        );
    }

    #[test]
    fn test_profile_decoding() {
        let profile: AuthorizationProfile = serde_json::from_value(serde_json::json!({
            "authorization_level": "quality_engineer",
            "permissions": {
                "can_create": ["project"],
                "can_read": ["project", "phase"]
            }
        }))
        .unwrap();
        assert_eq!(profile.authorization_level, AuthorizationLevel::Other);
        assert!(profile.permissions.can_create.contains("project"));
        assert!(profile.permissions.can_delete.is_empty());
    }
}
