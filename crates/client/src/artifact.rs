//! Artifact collaborators.
//!
//! Weight serialization and static validation of user-supplied prediction
//! code are framework-specific and live outside this crate; the pipeline
//! consumes them through these traits and only ever sees the resulting
//! archive as an opaque file path.

use std::path::{Path, PathBuf};

use crate::error::ClientError;
use crate::upload::{Framework, UploadOutcome, UploadPipeline};

/// Outcome of a static check of a prediction-wrapper file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub diagnostics: Vec<String>,
}

impl ValidationReport {
    pub fn pass() -> Self {
        Self { passed: true, diagnostics: Vec::new() }
    }

    pub fn fail(diagnostics: Vec<String>) -> Self {
        Self { passed: false, diagnostics }
    }
}

/// Static validation of the user's prediction-wrapper file: lint errors,
/// wrong extension, zero or multiple class definitions, and so on.
pub trait ArtifactValidator {
    fn check(&self, wrapper: &Path) -> Result<ValidationReport, ClientError>;
}

/// Packages a model into a single gzip-tar archive.
///
/// Implementations own the framework-specific work (writing weights,
/// copying the wrapper file, taring a checkpoint directory). A model
/// object without the required shape is reported as
/// `ClientError::MalformedArtifact`.
pub trait ModelSerializer {
    fn framework(&self) -> Framework;

    /// The user's prediction-wrapper file, when the framework requires one.
    fn wrapper_file(&self) -> Option<&Path> {
        None
    }

    /// Write the archive into `staging` and return its path.
    fn serialize(&self, staging: &Path) -> Result<PathBuf, ClientError>;
}

impl UploadPipeline {
    /// Validate, serialize, and upload a model in one call.
    ///
    /// A failed validation report is surfaced as `MalformedArtifact` with
    /// the collaborator's diagnostics, before anything is serialized or
    /// sent over the network.
    pub fn upload_artifact(
        &self,
        serializer: &dyn ModelSerializer,
        validator: Option<&dyn ArtifactValidator>,
        staging: &Path,
        name: &str,
        mint_token: bool,
    ) -> Result<UploadOutcome, ClientError> {
        if let (Some(validator), Some(wrapper)) = (validator, serializer.wrapper_file()) {
            let report = validator.check(wrapper)?;
            if !report.passed {
                return Err(ClientError::MalformedArtifact(report.diagnostics.join("\n")));
            }
        }

        let archive = serializer.serialize(staging)?;
        self.upload(name, &archive, serializer.framework(), mint_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_constructors() {
        assert!(ValidationReport::pass().passed);
        let fail = ValidationReport::fail(vec!["model.py: undefined name 'np'".into()]);
        assert!(!fail.passed);
        assert_eq!(fail.diagnostics.len(), 1);
    }
}
