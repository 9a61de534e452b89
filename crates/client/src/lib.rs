//! TensorHub API client — shared between library embedders and the CLI.
//!
//! This crate is the single source of truth for the TensorHub wire contract:
//! login, token refresh, request upload target, transfer bytes, register
//! model, mint query token.
//!
//! Blocking reqwest client (no Tokio runtime required). No retries beyond
//! the single refresh-then-reauthenticate fallback in the session layer.

mod api;
mod artifact;
mod endpoints;
mod error;
mod session;
mod upload;

pub use api::ApiClient;
pub use artifact::{ArtifactValidator, ModelSerializer, ValidationReport};
pub use endpoints::{Endpoints, set_base_url, BASE_URL_KEY, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use session::{
    Credentials, CredentialSource, Session, SessionManager,
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, TOKEN_EXPIRE_KEY,
};
pub use upload::{Framework, UploadOutcome, UploadPipeline, UploadTarget};
