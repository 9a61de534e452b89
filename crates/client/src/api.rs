//! Authenticated HTTP transport.
//!
//! Stateless beyond the embedded session manager: every authenticated call
//! obtains a fresh token immediately before dispatch, so a token refreshed
//! mid-pipeline is picked up by the next request automatically.

use std::path::Path;
use std::time::Duration;

use crate::endpoints::Endpoints;
use crate::error::ClientError;
use crate::session::SessionManager;

pub struct ApiClient {
    http: reqwest::blocking::Client,
    session: SessionManager,
}

impl ApiClient {
    pub fn new(session: SessionManager) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("tensorhub/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, session }
    }

    pub fn endpoints(&self) -> &Endpoints {
        self.session.endpoints()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// POST a JSON body with a bearer token and parse the JSON response.
    pub fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ClientError> {
        let token = self.session.get_valid_token()?;

        let response = self.http
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Transport { status, body });
        }

        response.json().map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Stream a file's bytes to a signed upload target.
    ///
    /// The target URL is pre-authorized by the backend, so no bearer token
    /// is attached. The body is streamed from disk (the whole archive is
    /// never held in memory) and a failed transfer is terminal — large
    /// files are never silently re-uploaded.
    pub fn transfer_file(
        &self,
        method: &str,
        url: &str,
        path: &Path,
    ) -> Result<(), ClientError> {
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|_| ClientError::Parse(format!("Invalid upload method: {}", method)))?;

        let len = std::fs::metadata(path)
            .map_err(|e| ClientError::Io(e.to_string()))?
            .len();
        let file = std::fs::File::open(path)
            .map_err(|e| ClientError::Io(e.to_string()))?;

        let response = self.http
            .request(method, url)
            .header("Content-Type", "application/octet-stream")
            .body(reqwest::blocking::Body::sized(file, len))
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Transport { status, body });
        }

        Ok(())
    }
}

/// Extract a field that backends return as either an integer or a string.
pub(crate) fn json_id(json: &serde_json::Value, key: &str) -> Result<String, ClientError> {
    json[key]
        .as_i64()
        .map(|n| n.to_string())
        .or_else(|| json[key].as_str().map(String::from))
        .ok_or_else(|| ClientError::Parse(format!("Missing {} in response", key)))
}
