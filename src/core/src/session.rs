//! Authentication state.
//!
//! [`AuthManager`] owns the [`Session`] and keeps it in step with the backend
//! by probing the permission-introspection endpoint. The session is replaced
//! wholesale on every transition (auth check, login, logout) and read by any
//! number of callers through cheap snapshots.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::config::AuthConfig;
use crate::error::{ApqpError, Result};
use crate::models::Id;
use crate::permissions::{self, AuthorizationProfile, PolicyDecision};

/// The authenticated user as described by the permissions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend permission payload, kept as returned.
    #[serde(default)]
    pub permissions: Value,
    pub authorization: AuthorizationProfile,
}

/// Authentication state. A session is authenticated exactly when it holds a
/// current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_user: Option<CurrentUser>,
}

impl Session {
    pub fn authenticated(user: CurrentUser) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }
}

/// Drives login, logout and auth checks, and answers permission queries from
/// the cached profile.
#[derive(Debug, Clone)]
pub struct AuthManager {
    client: ApiClient,
    config: AuthConfig,
    session: Arc<RwLock<Session>>,
}

impl AuthManager {
    /// Create a manager with an empty (unauthenticated) session.
    pub fn new(client: ApiClient, config: AuthConfig) -> Self {
        Self {
            client,
            config,
            session: Arc::new(RwLock::new(Session::default())),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.session.read().current_user().cloned()
    }

    fn replace(&self, session: Session) {
        *self.session.write() = session;
    }

    /// Probe the permissions endpoint and update the session from the result.
    ///
    /// Any failure (transport, HTTP status, malformed payload) leaves the
    /// session unauthenticated. Never returns an error.
    pub async fn check_auth_status(&self) -> bool {
        match self
            .client
            .get::<CurrentUser>(&self.config.permissions_path)
            .await
        {
            Ok(user) => {
                debug!(
                    level = ?user.authorization.authorization_level,
                    "Session authenticated"
                );
                self.replace(Session::authenticated(user));
                true
            }
            Err(e) => {
                debug!(error = %e, "Auth check failed; session cleared");
                self.replace(Session::default());
                false
            }
        }
    }

    /// Log in with form-encoded credentials, then refresh the session.
    ///
    /// The backend signals bad credentials by sending the browser back to the
    /// login page, so a successful response whose final URL path still
    /// contains `login` is rejected with `Invalid credentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        if self.client.csrf_token().is_none() {
            if let Err(e) = self.client.fetch_page(&self.config.login_path).await {
                warn!(error = %e, "Could not fetch login page for CSRF cookie");
            }
        }

        let page = self
            .client
            .submit_form(
                &self.config.login_path,
                &[("username", username), ("password", password)],
            )
            .await
            .map_err(|e| {
                e.log();
                ApqpError::login_failed().with_source(e)
            })?;

        if !page.is_success() {
            let error = ApqpError::login_failed().with_endpoint(self.config.login_path.as_str());
            warn!(username, status = page.status, "Login rejected");
            return Err(error);
        }

        if page.url.path().contains("login") {
            warn!(username, "Login redirected back to login page");
            return Err(ApqpError::invalid_credentials());
        }

        info!(username, "Logged in");
        if !self.check_auth_status().await {
            warn!(username, "Logged in but permissions could not be loaded");
        }
        Ok(())
    }

    /// Log out and clear the session.
    pub async fn logout(&self) -> Result<()> {
        let page = self
            .client
            .submit_form(&self.config.logout_path, &[])
            .await
            .map_err(|e| {
                e.log();
                ApqpError::logout_failed().with_source(e)
            })?;

        if !page.is_success() {
            warn!(status = page.status, "Logout rejected");
            return Err(ApqpError::logout_failed());
        }

        self.replace(Session::default());
        info!("Logged out");
        Ok(())
    }

    /// Whether the current user may perform `action` on `entity_type`.
    pub fn has_permission(&self, action: &str, entity_type: &str, entity_id: Option<Id>) -> bool {
        permissions::has_permission(&self.session.read(), action, entity_type, entity_id)
    }

    /// Like [`has_permission`](Self::has_permission) but with the denial reason.
    pub fn decide(&self, action: &str, entity_type: &str, entity_id: Option<Id>) -> PolicyDecision {
        permissions::decide(&self.session.read(), action, entity_type, entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_session_is_unauthenticated() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_current_user_requires_authorization() {
        assert!(serde_json::from_value::<CurrentUser>(json!({})).is_err());

        let user: CurrentUser = serde_json::from_value(json!({
            "authorization": {"authorization_level": "admin"}
        }))
        .unwrap();
        assert!(user.authorization.is_admin());
        assert_eq!(user.permissions, Value::Null);
    }

    #[test]
    fn test_new_manager_starts_empty() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let auth = AuthManager::new(client, AuthConfig::default());
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().is_none());
        assert!(!auth.has_permission("read", "project", None));
    }
}
