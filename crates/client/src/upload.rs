//! The 4-step upload saga: request a signed upload target, transfer the
//! archive bytes, register the model, optionally mint a query token.
//!
//! Steps run in strict order and short-circuit on first failure. There is
//! no compensating transaction: a failure at step k leaves steps 1..k-1 in
//! place on the backend. Each step authenticates independently, so the
//! session may refresh mid-pipeline.

use std::path::Path;

use uuid::Uuid;

use crate::api::{json_id, ApiClient};
use crate::error::ClientError;

/// Supported model frameworks, with their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    TensorFlow,
    PyTorch,
    Transformers,
}

impl Framework {
    /// Short code sent to the backend.
    pub fn code(&self) -> &'static str {
        match self {
            Framework::TensorFlow => "TF",
            Framework::PyTorch => "PT",
            Framework::Transformers => "HF",
        }
    }

    /// Parse a user-facing name ("tf", "pytorch", "HF", ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tf" | "tensorflow" => Some(Framework::TensorFlow),
            "pt" | "pytorch" | "torch" => Some(Framework::PyTorch),
            "hf" | "transformers" => Some(Framework::Transformers),
            _ => None,
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A backend-issued signed upload destination. Ephemeral, one per upload
/// attempt, never persisted.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Permanent remote identifier of the archive
    pub address: String,
    /// HTTP method authorized for the transfer
    pub method: String,
    /// Signed URL to send the bytes to
    pub url: String,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadOutcome {
    pub model_id: String,
    pub query_token: Option<String>,
}

pub struct UploadPipeline {
    api: ApiClient,
}

impl UploadPipeline {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Upload an archive and register it as a model.
    ///
    /// Fails with `NotFound` before any network call when `archive` does
    /// not reference an existing file. The registered size is the exact
    /// on-disk byte length of the archive. Registration (step 3) is not
    /// idempotent — retrying a run that failed after step 2 may create a
    /// duplicate model record on the backend.
    pub fn upload(
        &self,
        name: &str,
        archive: &Path,
        framework: Framework,
        mint_token: bool,
    ) -> Result<UploadOutcome, ClientError> {
        let metadata = std::fs::metadata(archive)
            .map_err(|_| ClientError::NotFound(archive.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(ClientError::NotFound(archive.to_path_buf()));
        }
        let size = metadata.len();

        // The address is fixed before the target request so it stays
        // stable even if that request is retried by the caller.
        let address = Uuid::new_v4().to_string();

        let target = self.request_upload_target(&address)?;

        tracing::info!(archive = %archive.display(), size, "uploading");
        self.api.transfer_file(&target.method, &target.url, archive)?;

        let model_id = self.register_model(&address, name, size, framework)?;

        let query_token = if mint_token {
            Some(self.mint_query_token(&model_id)?)
        } else {
            None
        };

        Ok(UploadOutcome { model_id, query_token })
    }

    /// Step 1: request a signed upload destination for the archive.
    pub fn request_upload_target(&self, address: &str) -> Result<UploadTarget, ClientError> {
        let json = self.api.post_json(
            self.api.endpoints().model_uploads(),
            &serde_json::json!({
                "filename": address,
                "contentType": "tar",
            }),
        )?;

        let url = json["url"]
            .as_str()
            .ok_or_else(|| ClientError::Parse("Missing url in upload-target response".into()))?
            .to_string();
        let method = json["method"]
            .as_str()
            .ok_or_else(|| ClientError::Parse("Missing method in upload-target response".into()))?
            .to_string();

        Ok(UploadTarget { address: address.to_string(), method, url })
    }

    /// Step 3: register the uploaded archive as a model record.
    pub fn register_model(
        &self,
        address: &str,
        name: &str,
        size: u64,
        framework: Framework,
    ) -> Result<String, ClientError> {
        let json = self.api.post_json(
            self.api.endpoints().models(),
            &serde_json::json!({
                "address": address,
                "name": name,
                "size": size,
                "framework": framework.code(),
            }),
        )?;
        json_id(&json, "id")
    }

    /// Step 4 (optional): mint a query token for later inference calls.
    pub fn mint_query_token(&self, model_id: &str) -> Result<String, ClientError> {
        let json = self.api.post_json(
            self.api.endpoints().query_token(),
            &serde_json::json!({ "model": model_id }),
        )?;
        json_id(&json, "id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framework_codes() {
        assert_eq!(Framework::TensorFlow.code(), "TF");
        assert_eq!(Framework::PyTorch.code(), "PT");
        assert_eq!(Framework::Transformers.code(), "HF");
    }

    #[test]
    fn test_framework_parse() {
        assert_eq!(Framework::parse("tf"), Some(Framework::TensorFlow));
        assert_eq!(Framework::parse("TensorFlow"), Some(Framework::TensorFlow));
        assert_eq!(Framework::parse("pytorch"), Some(Framework::PyTorch));
        assert_eq!(Framework::parse("PT"), Some(Framework::PyTorch));
        assert_eq!(Framework::parse("transformers"), Some(Framework::Transformers));
        assert_eq!(Framework::parse("hf"), Some(Framework::Transformers));
        assert_eq!(Framework::parse("keras"), None);
    }

    #[test]
    fn test_framework_display_is_wire_code() {
        assert_eq!(Framework::PyTorch.to_string(), "PT");
    }
}
