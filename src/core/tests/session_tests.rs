//! Login, logout and auth-check flows against a mock backend.

use apqp_core::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, ApqpClient) {
    let server = MockServer::start().await;
    let config = ClientConfig {
        api: ApiConfig {
            base_url: server.uri(),
            ..ApiConfig::default()
        },
        ..ClientConfig::default()
    };
    let client = ApqpClient::from_config(&config).unwrap();
    (server, client)
}

fn permissions_payload(level: &str) -> serde_json::Value {
    json!({
        "permissions": {"projects": ["read"]},
        "authorization": {
            "authorization_level": level,
            "permissions": {
                "can_create": ["project"],
                "can_read": ["project", "todo"],
                "can_update": [],
                "can_delete": []
            }
        }
    })
}

async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "csrftoken=tok123; Path=/")
                .set_body_string("<form></form>"),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Auth check
// ============================================================================

#[tokio::test]
async fn test_check_auth_status_success() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(permissions_payload("standard")))
        .mount(&server)
        .await;

    assert!(client.auth.check_auth_status().await);
    let user = client.auth.current_user().unwrap();
    assert_eq!(
        user.authorization.authorization_level,
        AuthorizationLevel::Standard
    );
    assert!(client.auth.has_permission("create", "project", None));
    assert!(!client.auth.has_permission("create", "todo", None));
    assert!(client.auth.has_permission("read", "todo", Some(3)));
}

#[tokio::test]
async fn test_check_auth_status_forbidden_clears_session() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(permissions_payload("admin")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Forbidden"})))
        .mount(&server)
        .await;

    assert!(client.auth.check_auth_status().await);
    assert!(client.auth.has_permission("delete", "history", None));

    assert!(!client.auth.check_auth_status().await);
    assert!(!client.auth.is_authenticated());
    assert!(client.auth.current_user().is_none());
    assert!(!client.auth.has_permission("read", "project", None));
}

#[tokio::test]
async fn test_check_auth_status_unreachable_backend() {
    let config = ClientConfig {
        api: ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..ApiConfig::default()
        },
        ..ClientConfig::default()
    };
    let client = ApqpClient::from_config(&config).unwrap();
    assert!(!client.auth.check_auth_status().await);
    assert!(!client.auth.is_authenticated());
}

#[tokio::test]
async fn test_check_auth_status_malformed_payload() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(!client.auth.check_auth_status().await);
    assert!(client.auth.current_user().is_none());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success_loads_profile() {
    let (server, client) = setup().await;
    mount_login_page(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .and(header("X-CSRFToken", "tok123"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/")
                .insert_header("set-cookie", "sessionid=sess42; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("dashboard"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(permissions_payload("admin")))
        .mount(&server)
        .await;

    client.auth.login("alice", "s3cret").await.unwrap();

    assert!(client.auth.is_authenticated());
    assert!(client.auth.current_user().unwrap().authorization.is_admin());
    assert!(client
        .client()
        .cookies()
        .iter()
        .any(|c| c == "sessionid=sess42"));
}

#[tokio::test]
async fn test_login_redirect_back_to_login_is_invalid_credentials() {
    let (server, client) = setup().await;
    mount_login_page(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login/"))
        .mount(&server)
        .await;

    let err = client.auth.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    assert_eq!(err.message(), "Invalid credentials");
    assert!(!client.auth.is_authenticated());
}

#[tokio::test]
async fn test_login_server_error_is_login_failed() {
    let (server, client) = setup().await;
    mount_login_page(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.auth.login("alice", "s3cret").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::LoginFailed);
    assert_eq!(err.message(), "Login failed");
}

#[tokio::test]
async fn test_login_transport_failure_is_login_failed() {
    let config = ClientConfig {
        api: ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..ApiConfig::default()
        },
        ..ClientConfig::default()
    };
    let client = ApqpClient::from_config(&config).unwrap();

    let err = client.auth.login("alice", "s3cret").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::LoginFailed);
    assert!(std::error::Error::source(&err).is_some());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let (server, client) = setup().await;
    client.client().add_cookie("csrftoken=tok123; Path=/");
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(permissions_payload("standard")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout/"))
        .and(header("X-CSRFToken", "tok123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.auth.check_auth_status().await);
    client.auth.logout().await.unwrap();
    assert!(!client.auth.is_authenticated());
}

#[tokio::test]
async fn test_logout_failure_keeps_session() {
    let (server, client) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/users/permissions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(permissions_payload("standard")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(client.auth.check_auth_status().await);
    let err = client.auth.logout().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::LogoutFailed);
    assert_eq!(err.message(), "Logout failed");
    assert!(client.auth.is_authenticated());
}
