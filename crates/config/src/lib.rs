//! Local key/value configuration store.
//!
//! Reads/writes ~/.config/tensorhub/config.json (0600 on Unix).
//! The same file holds the session tokens and the base-URL override, so
//! both the client library and the CLI go through this crate.

mod store;

pub use store::{
    ConfigStore, ConfigError, FileStore, MemoryStore,
    config_file_path,
};
