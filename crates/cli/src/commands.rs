//! Command implementations: login, logout, upload, base-url.

use std::path::PathBuf;
use std::sync::Arc;

use dialoguer::{Input, Password};

use tensorhub_client::{
    ApiClient, ClientError, Credentials, CredentialSource, Endpoints, Framework,
    SessionManager, UploadPipeline,
    set_base_url, BASE_URL_KEY, DEFAULT_BASE_URL,
};
use tensorhub_config::{ConfigStore, FileStore};

use crate::exit_codes::*;
use crate::CliError;

// ── Wiring ──────────────────────────────────────────────────────────

/// Interactive username/password prompt. Blocks on the terminal; the one
/// place the CLI stops and waits for a human.
struct TerminalCredentials;

impl CredentialSource for TerminalCredentials {
    fn credentials(&self) -> Result<Credentials, ClientError> {
        let username: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(|e| ClientError::Auth(format!("credential prompt failed: {}", e)))?;
        let password = Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| ClientError::Auth(format!("credential prompt failed: {}", e)))?;
        Ok(Credentials { username, password })
    }
}

fn store() -> Result<Arc<dyn ConfigStore>, CliError> {
    let store = FileStore::at_default_path().map_err(|e| CliError {
        code: EXIT_ERROR,
        message: e.to_string(),
        hint: None,
    })?;
    Ok(Arc::new(store))
}

fn session_manager(store: Arc<dyn ConfigStore>) -> Result<SessionManager, CliError> {
    let endpoints = Endpoints::from_store(store.as_ref()).map_err(client_error)?;
    Ok(SessionManager::new(store, endpoints, Box::new(TerminalCredentials)))
}

// ── Login / logout ──────────────────────────────────────────────────

pub fn cmd_login() -> Result<(), CliError> {
    let session = session_manager(store()?)?;
    let base = session.endpoints().base().to_string();

    session.authenticate().map_err(client_error)?;

    eprintln!("Logged in to {}. Session is valid for 24 hours.", base);
    Ok(())
}

pub fn cmd_logout() -> Result<(), CliError> {
    let session = session_manager(store()?)?;
    session.logout().map_err(client_error)?;
    eprintln!("Logged out.");
    Ok(())
}

// ── Upload ──────────────────────────────────────────────────────────

pub fn cmd_upload(
    archive: PathBuf,
    name: Option<String>,
    framework: String,
    no_token: bool,
    json: bool,
) -> Result<(), CliError> {
    let Some(framework) = Framework::parse(&framework) else {
        return Err(CliError {
            code: EXIT_USAGE,
            message: format!("Unknown framework: '{}'", framework),
            hint: Some("expected one of: tf, pt, hf".into()),
        });
    };

    if !archive.is_file() {
        return Err(CliError {
            code: EXIT_USAGE,
            message: format!("File not found: {}", archive.display()),
            hint: None,
        });
    }

    let name = name.unwrap_or_else(|| {
        archive
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string()
    });

    let session = session_manager(store()?)?;
    let pipeline = UploadPipeline::new(ApiClient::new(session));

    let outcome = pipeline
        .upload(&name, &archive, framework, !no_token)
        .map_err(client_error)?;

    if json {
        match serde_json::to_string(&outcome) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                return Err(CliError {
                    code: EXIT_ERROR,
                    message: e.to_string(),
                    hint: None,
                })
            }
        }
    } else {
        println!("Model ID: {}", outcome.model_id);
        if let Some(token) = &outcome.query_token {
            println!("Query token: {}", token);
        }
    }
    Ok(())
}

// ── Base URL ────────────────────────────────────────────────────────

pub fn cmd_base_url(url: Option<String>) -> Result<(), CliError> {
    let store = store()?;
    match url {
        Some(url) => {
            let endpoints = set_base_url(store.as_ref(), &url).map_err(client_error)?;
            eprintln!("Base URL set to {}", endpoints.base());
        }
        None => {
            let config = store.get().map_err(|e| CliError {
                code: EXIT_ERROR,
                message: e.to_string(),
                hint: None,
            })?;
            let base = config
                .get(BASE_URL_KEY)
                .map(String::as_str)
                .unwrap_or(DEFAULT_BASE_URL);
            println!("{}", base);
        }
    }
    Ok(())
}

// ── Error mapping ───────────────────────────────────────────────────

pub fn client_error(err: ClientError) -> CliError {
    match err {
        ClientError::Auth(msg) => CliError {
            code: EXIT_NOT_AUTH,
            message: msg,
            hint: Some("run `thub login` to reauthenticate".into()),
        },
        ClientError::Transport { status, body } if status == 400 || status == 422 => CliError {
            code: EXIT_VALIDATION,
            message: format!("Server rejected the request (HTTP {}): {}", status, body),
            hint: None,
        },
        ClientError::Transport { status, body } => CliError {
            code: EXIT_NETWORK,
            message: format!("HTTP {}: {}", status, body),
            hint: None,
        },
        ClientError::Network(msg) => CliError {
            code: EXIT_NETWORK,
            message: format!("Cannot reach TensorHub: {}", msg),
            hint: None,
        },
        ClientError::NotFound(path) => CliError {
            code: EXIT_USAGE,
            message: format!("File not found: {}", path.display()),
            hint: None,
        },
        ClientError::MalformedArtifact(msg) => CliError {
            code: EXIT_VALIDATION,
            message: msg,
            hint: None,
        },
        other => CliError {
            code: EXIT_ERROR,
            message: other.to_string(),
            hint: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_maps_to_not_auth() {
        let err = client_error(ClientError::Auth("bad credentials".into()));
        assert_eq!(err.code, EXIT_NOT_AUTH);
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_validation_status_maps_to_validation() {
        let err = client_error(ClientError::Transport {
            status: 400,
            body: "bad name".into(),
        });
        assert_eq!(err.code, EXIT_VALIDATION);

        let err = client_error(ClientError::Transport {
            status: 422,
            body: "bad size".into(),
        });
        assert_eq!(err.code, EXIT_VALIDATION);
    }

    #[test]
    fn test_other_transport_maps_to_network() {
        let err = client_error(ClientError::Transport {
            status: 503,
            body: "down".into(),
        });
        assert_eq!(err.code, EXIT_NETWORK);
    }

    #[test]
    fn test_missing_file_maps_to_usage() {
        let err = client_error(ClientError::NotFound("/tmp/nope.tar.gz".into()));
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.message.contains("/tmp/nope.tar.gz"));
    }

    #[test]
    fn test_malformed_artifact_maps_to_validation() {
        let err = client_error(ClientError::MalformedArtifact("not a .py file".into()));
        assert_eq!(err.code, EXIT_VALIDATION);
    }
}
