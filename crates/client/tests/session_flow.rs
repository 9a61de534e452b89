//! Session lifecycle against a mock server: refresh fallback, hard
//! transport failures, full reauthentication.

use std::sync::Arc;

use chrono::Utc;
use httpmock::prelude::*;

use tensorhub_client::{
    ClientError, Credentials, CredentialSource, Endpoints, SessionManager,
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRE_KEY,
};
use tensorhub_config::{ConfigStore, MemoryStore};

struct ScriptedCredentials {
    username: &'static str,
    password: &'static str,
}

impl CredentialSource for ScriptedCredentials {
    fn credentials(&self) -> Result<Credentials, ClientError> {
        Ok(Credentials {
            username: self.username.to_string(),
            password: self.password.to_string(),
        })
    }
}

struct NoPrompt;

impl CredentialSource for NoPrompt {
    fn credentials(&self) -> Result<Credentials, ClientError> {
        Err(ClientError::Auth("unexpected credential prompt".into()))
    }
}

fn entry(key: &str, value: String) -> (String, String) {
    (key.to_string(), value)
}

fn expired_session_entries() -> Vec<(String, String)> {
    vec![
        entry(ACCESS_TOKEN_KEY, "stale".into()),
        entry(TOKEN_EXPIRE_KEY, (Utc::now() - chrono::Duration::hours(1)).to_rfc3339()),
        entry(REFRESH_TOKEN_KEY, "refresh-1".into()),
    ]
}

#[test]
fn test_refresh_renews_access_token() {
    let server = MockServer::start();

    let refresh_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/token/refresh/")
            .json_body(serde_json::json!({ "refresh": "refresh-1" }));
        then.status(200)
            .json_body(serde_json::json!({ "access": "renewed" }));
    });
    let login_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/login/");
        then.status(200);
    });

    let store = Arc::new(MemoryStore::with_entries(expired_session_entries()));
    let mgr = SessionManager::new(
        store.clone(),
        Endpoints::new(&server.base_url()),
        Box::new(NoPrompt),
    );

    assert_eq!(mgr.get_valid_token().unwrap(), "renewed");

    refresh_mock.assert();
    assert_eq!(login_mock.hits(), 0);

    // Token and expiry were replaced together
    let map = store.get().unwrap();
    assert_eq!(map.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("renewed"));
    let expiry = chrono::DateTime::parse_from_rfc3339(map.get(TOKEN_EXPIRE_KEY).unwrap()).unwrap();
    assert!(expiry.with_timezone(&Utc) > Utc::now());
    // Refresh token survives a refresh
    assert_eq!(map.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("refresh-1"));
}

#[test]
fn test_expired_refresh_token_falls_through_to_login() {
    let server = MockServer::start();

    let refresh_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/token/refresh/");
        then.status(401)
            .json_body(serde_json::json!({ "detail": "Token is invalid or expired" }));
    });
    let login_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/login/")
            .json_body(serde_json::json!({ "username": "kamal", "password": "hunter2" }));
        then.status(200)
            .json_body(serde_json::json!({
                "access_token": "fresh-access",
                "refresh_token": "fresh-refresh",
            }));
    });

    let store = Arc::new(MemoryStore::with_entries(expired_session_entries()));
    let mgr = SessionManager::new(
        store.clone(),
        Endpoints::new(&server.base_url()),
        Box::new(ScriptedCredentials { username: "kamal", password: "hunter2" }),
    );

    assert_eq!(mgr.get_valid_token().unwrap(), "fresh-access");

    refresh_mock.assert();
    login_mock.assert();

    let map = store.get().unwrap();
    assert_eq!(map.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("fresh-refresh"));
}

#[test]
fn test_refresh_server_error_propagates() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/v1/token/refresh/");
        then.status(502).body("bad gateway");
    });
    let login_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/login/");
        then.status(200);
    });

    let mgr = SessionManager::new(
        Arc::new(MemoryStore::with_entries(expired_session_entries())),
        Endpoints::new(&server.base_url()),
        Box::new(NoPrompt),
    );

    let err = mgr.get_valid_token().unwrap_err();
    match err {
        ClientError::Transport { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected Transport, got {:?}", other),
    }
    // A hard refresh failure is not silently retried as a login
    assert_eq!(login_mock.hits(), 0);
}

#[test]
fn test_rejected_credentials_fail_with_auth_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/v1/login/");
        then.status(401)
            .json_body(serde_json::json!({ "detail": "Invalid username or password" }));
    });

    let mgr = SessionManager::new(
        Arc::new(MemoryStore::new()),
        Endpoints::new(&server.base_url()),
        Box::new(ScriptedCredentials { username: "kamal", password: "wrong" }),
    );

    let err = mgr.get_valid_token().unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)), "got {:?}", err);
}

#[test]
fn test_malformed_login_response_fails_with_auth_error() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/v1/login/");
        then.status(200)
            .json_body(serde_json::json!({ "refresh_token": "only-half" }));
    });

    let mgr = SessionManager::new(
        Arc::new(MemoryStore::new()),
        Endpoints::new(&server.base_url()),
        Box::new(ScriptedCredentials { username: "kamal", password: "hunter2" }),
    );

    let err = mgr.get_valid_token().unwrap_err();
    match err {
        ClientError::Auth(msg) => assert!(msg.contains("access_token"), "message: {}", msg),
        other => panic!("expected Auth, got {:?}", other),
    }
}

#[test]
fn test_successful_login_persists_full_session() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/v1/login/");
        then.status(200)
            .json_body(serde_json::json!({
                "access_token": "a-1",
                "refresh_token": "r-1",
            }));
    });

    let store = Arc::new(MemoryStore::new());
    let mgr = SessionManager::new(
        store.clone(),
        Endpoints::new(&server.base_url()),
        Box::new(ScriptedCredentials { username: "kamal", password: "hunter2" }),
    );

    mgr.authenticate().unwrap();

    let map = store.get().unwrap();
    assert_eq!(map.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("a-1"));
    assert_eq!(map.get(REFRESH_TOKEN_KEY).map(String::as_str), Some("r-1"));

    let expiry = chrono::DateTime::parse_from_rfc3339(map.get(TOKEN_EXPIRE_KEY).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    let hours_out = (expiry - Utc::now()).num_hours();
    assert!((23..=24).contains(&hours_out), "expiry {} hours out", hours_out);

    // The fresh session passes the validity check
    assert!(mgr.is_valid().unwrap());
}
