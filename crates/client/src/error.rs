use std::path::PathBuf;

use tensorhub_config::ConfigError;

/// Error type for client operations.
#[derive(Debug)]
pub enum ClientError {
    /// Credentials rejected, credential collection failed, or the auth
    /// response was malformed
    Auth(String),
    /// Non-2xx response from an endpoint, with status code and body
    Transport { status: u16, body: String },
    /// Network error before a response was received
    Network(String),
    /// Response body did not have the expected shape
    Parse(String),
    /// Local file does not exist
    NotFound(PathBuf),
    /// Caller-supplied model object lacks the required shape
    MalformedArtifact(String),
    /// Config store failure
    Config(ConfigError),
    /// File I/O error
    Io(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Auth(msg) => write!(f, "Authentication failed: {}", msg),
            ClientError::Transport { status, body } => write!(f, "HTTP {}: {}", status, body),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            ClientError::MalformedArtifact(msg) => write!(f, "Malformed artifact: {}", msg),
            ClientError::Config(err) => write!(f, "Config error: {}", err),
            ClientError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::Config(err)
    }
}
