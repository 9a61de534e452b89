//! Key/value settings persisted as a flat JSON object.
//!
//! Semantics the rest of the workspace relies on:
//! - `get` returns the full map; a missing file reads as an empty map.
//! - `update` merges keys into the existing map, it never replaces it.
//! - writes go through a temp file + rename so a crash mid-write cannot
//!   leave a half-written config behind (last writer wins).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Error type for config store operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Could not determine the platform config directory
    NoConfigDir,
    /// File I/O error
    Io(String),
    /// JSON serialization error
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
            ConfigError::Io(msg) => write!(f, "I/O error: {}", msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Durable key/value settings. Merge semantics, not replace.
pub trait ConfigStore: Send + Sync {
    /// Return the full settings map.
    fn get(&self) -> Result<HashMap<String, String>, ConfigError>;

    /// Merge `updates` into the stored map and persist.
    fn update(&self, updates: &HashMap<String, String>) -> Result<(), ConfigError>;

    /// Drop the given keys, if present.
    fn remove(&self, keys: &[&str]) -> Result<(), ConfigError>;
}

/// Returns the default path of the config file.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("tensorhub/config.json"))
}

/// File-backed store at a fixed path.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the platform default location.
    pub fn at_default_path() -> Result<Self, ConfigError> {
        config_file_path()
            .map(Self::new)
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(ConfigError::Io(e.to_string())),
        };

        match serde_json::from_str::<HashMap<String, String>>(&contents) {
            Ok(map) => Ok(map),
            Err(_) => {
                // Malformed config is replaced with an empty one rather than
                // wedging every caller.
                tracing::warn!(path = %self.path.display(), "config file is malformed, replacing");
                let empty = HashMap::new();
                self.write_map(&empty)?;
                Ok(empty)
            }
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(map)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        // Temp file in the same directory so the rename stays on one filesystem.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&tmp, permissions)
                .map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

impl ConfigStore for FileStore {
    fn get(&self) -> Result<HashMap<String, String>, ConfigError> {
        self.read_map()
    }

    fn update(&self, updates: &HashMap<String, String>) -> Result<(), ConfigError> {
        let mut current = self.read_map()?;
        for (k, v) in updates {
            current.insert(k.clone(), v.clone());
        }
        self.write_map(&current)
    }

    fn remove(&self, keys: &[&str]) -> Result<(), ConfigError> {
        let mut current = self.read_map()?;
        let mut changed = false;
        for k in keys {
            changed |= current.remove(*k).is_some();
        }
        if changed {
            self.write_map(&current)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            inner: std::sync::Mutex::new(entries.into_iter().collect()),
        }
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self) -> Result<HashMap<String, String>, ConfigError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn update(&self, updates: &HashMap<String, String>) -> Result<(), ConfigError> {
        let mut map = self.inner.lock().unwrap();
        for (k, v) in updates {
            map.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), ConfigError> {
        let mut map = self.inner.lock().unwrap();
        for k in keys {
            map.remove(*k);
        }
        Ok(())
    }
}
