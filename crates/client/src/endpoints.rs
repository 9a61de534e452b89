//! Endpoint URLs derived from the base URL.
//!
//! One immutable value, constructed once from the configured base URL.
//! Changing the base URL means persisting the override and constructing a
//! new `Endpoints` — there is no mutable global URL state.

use tensorhub_config::ConfigStore;

use crate::error::ClientError;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://app.tensorhub.cloud";

/// Config key holding the base-URL override.
pub const BASE_URL_KEY: &str = "base_url";

/// The full set of service URLs for one base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    login: String,
    token_refresh: String,
    model_uploads: String,
    models: String,
    query_token: String,
}

impl Endpoints {
    /// Derive all endpoint URLs from a base URL. Pure.
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            login: format!("{}/v1/login/", base),
            token_refresh: format!("{}/v1/token/refresh/", base),
            model_uploads: format!("{}/v1/model-uploads/", base),
            models: format!("{}/v1/models/", base),
            query_token: format!("{}/v1/query-access-token/", base),
            base,
        }
    }

    /// Construct from the store's `base_url` key, falling back to the
    /// default service URL.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, ClientError> {
        let config = store.get()?;
        let base = config
            .get(BASE_URL_KEY)
            .map(String::as_str)
            .unwrap_or(DEFAULT_BASE_URL);
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn token_refresh(&self) -> &str {
        &self.token_refresh
    }

    pub fn model_uploads(&self) -> &str {
        &self.model_uploads
    }

    pub fn models(&self) -> &str {
        &self.models
    }

    pub fn query_token(&self) -> &str {
        &self.query_token
    }
}

/// Persist a base-URL override and return the re-derived endpoints.
/// Handy when running against localhost.
pub fn set_base_url(store: &dyn ConfigStore, url: &str) -> Result<Endpoints, ClientError> {
    let mut updates = std::collections::HashMap::new();
    updates.insert(BASE_URL_KEY.to_string(), url.to_string());
    store.update(&updates)?;
    Ok(Endpoints::new(url))
}
