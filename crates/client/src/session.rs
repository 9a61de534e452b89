//! Credential-session lifecycle.
//!
//! The session (access token, expiry, refresh token) lives in the config
//! store under three keys and is only ever written as a unit, so readers
//! never observe a half-updated session. `SessionManager` is the sole
//! writer; interactive credential collection goes through the injected
//! `CredentialSource` and must not run concurrently against the same store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tensorhub_config::ConfigStore;

use crate::endpoints::Endpoints;
use crate::error::ClientError;

/// Config key holding the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Config key holding the token expiry (RFC 3339, UTC).
pub const TOKEN_EXPIRE_KEY: &str = "token_expire";
/// Config key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Issued tokens are good for 24 hours.
const TOKEN_TTL_HOURS: i64 = 24;

/// Username/password pair collected from the user.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The one interactive boundary in the library: asked for credentials when
/// a full reauthentication is needed. Implementations may block on a human.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Result<Credentials, ClientError>;
}

/// A complete persisted session. Written atomically in a single store
/// update; never partially.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub token_expiry: DateTime<Utc>,
    pub refresh_token: String,
}

impl Session {
    fn persist(&self, store: &dyn ConfigStore) -> Result<(), ClientError> {
        let mut updates = HashMap::new();
        updates.insert(ACCESS_TOKEN_KEY.to_string(), self.access_token.clone());
        updates.insert(TOKEN_EXPIRE_KEY.to_string(), self.token_expiry.to_rfc3339());
        updates.insert(REFRESH_TOKEN_KEY.to_string(), self.refresh_token.clone());
        store.update(&updates)?;
        Ok(())
    }
}

fn expiry_after_issue(now: DateTime<Utc>) -> DateTime<Utc> {
    now + chrono::Duration::hours(TOKEN_TTL_HOURS)
}

/// Owns the token lifecycle: validity check, refresh, full reauthentication.
pub struct SessionManager {
    store: Arc<dyn ConfigStore>,
    endpoints: Endpoints,
    http: reqwest::blocking::Client,
    credentials: Box<dyn CredentialSource>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        endpoints: Endpoints,
        credentials: Box<dyn CredentialSource>,
    ) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("tensorhub/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { store, endpoints, http, credentials }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    fn stored(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.store.get()?.get(key).cloned())
    }

    /// Whether the persisted session is present and unexpired.
    /// Makes no network calls.
    pub fn is_valid(&self) -> Result<bool, ClientError> {
        let config = self.store.get()?;
        let Some(expiry) = config.get(TOKEN_EXPIRE_KEY) else {
            return Ok(false);
        };
        if !config.contains_key(ACCESS_TOKEN_KEY) {
            return Ok(false);
        }
        let Ok(expiry) = DateTime::parse_from_rfc3339(expiry) else {
            // Unparseable expiry counts as expired
            return Ok(false);
        };
        Ok(expiry.with_timezone(&Utc) > Utc::now())
    }

    /// Attempt to refresh the access token with the stored refresh token.
    ///
    /// Returns `Ok(false)` when no refresh token is stored or the endpoint
    /// answers 401 (the refresh token itself has expired) — callers fall
    /// through to full reauthentication. Any other non-2xx propagates as a
    /// hard transport error.
    pub fn refresh(&self) -> Result<bool, ClientError> {
        let Some(refresh_token) = self.stored(REFRESH_TOKEN_KEY)? else {
            return Ok(false);
        };

        let response = self.http
            .post(self.endpoints.token_refresh())
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 {
            tracing::debug!("refresh token expired");
            return Ok(false);
        }
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Transport { status, body });
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let access = json["access"]
            .as_str()
            .ok_or_else(|| ClientError::Parse("Missing access in refresh response".into()))?;

        // Replace token and expiry together; keep the refresh token.
        let mut updates = HashMap::new();
        updates.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        updates.insert(TOKEN_EXPIRE_KEY.to_string(), expiry_after_issue(Utc::now()).to_rfc3339());
        self.store.update(&updates)?;

        Ok(true)
    }

    /// Full reauthentication: collect credentials, exchange them for a
    /// fresh token pair, persist the session.
    pub fn authenticate(&self) -> Result<String, ClientError> {
        let creds = self.credentials.credentials()?;

        let response = self.http
            .post(self.endpoints.login())
            .json(&serde_json::json!({
                "username": creds.username,
                "password": creds.password,
            }))
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Auth(format!("login rejected (HTTP {}): {}", status, body)));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let access_token = json["access_token"]
            .as_str()
            .ok_or_else(|| ClientError::Auth("Missing access_token in login response".into()))?
            .to_string();
        let refresh_token = json["refresh_token"]
            .as_str()
            .ok_or_else(|| ClientError::Auth("Missing refresh_token in login response".into()))?
            .to_string();

        let session = Session {
            access_token: access_token.clone(),
            token_expiry: expiry_after_issue(Utc::now()),
            refresh_token,
        };
        session.persist(self.store.as_ref())?;

        Ok(access_token)
    }

    /// Return a usable access token: the stored one when still valid,
    /// a refreshed one when the refresh token still works, otherwise a
    /// fresh pair from full reauthentication. Fails fast — callers never
    /// proceed unauthenticated.
    pub fn get_valid_token(&self) -> Result<String, ClientError> {
        if self.is_valid()? || self.refresh()? {
            if let Some(token) = self.stored(ACCESS_TOKEN_KEY)? {
                return Ok(token);
            }
        }
        self.authenticate()
    }

    /// Drop the persisted session.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.remove(&[ACCESS_TOKEN_KEY, TOKEN_EXPIRE_KEY, REFRESH_TOKEN_KEY])?;
        Ok(())
    }
}
