//! # wgapi-rs: ordered collections for WarGaming API models
//!
//! The API model layer stores lists of vehicles, players and statistics in
//! a single ordered key-value container. This facade re-exports it together
//! with its binary codec and configuration.
//!
//! - [`collection`] - [`Collection`](collection::Collection), keys, dynamic values
//! - [`io`] - binary writer/reader and the `Serializable` trait
//! - [`config`] - codec limits and collection settings
//!
//! ## Quick Start
//!
//! ```rust
//! use wgapi_rs::prelude::*;
//!
//! let mut players: Collection<Value> = Collection::new();
//! players.insert("nickname", Value::from("Zhuk"));
//! players.try_merge(Value::List(vec![Value::from(1), Value::from(2)]))?;
//! assert_eq!(players.len(), 3);
//! # Ok::<(), CollectionError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Ordered collection, keys and dynamic values.
pub use wgapi_collection as collection;
/// Codec limits and collection settings.
pub use wgapi_config as config;
/// Binary reader/writer.
pub use wgapi_io as io;

/// Common imports
pub mod prelude {
    pub use crate::collection::{Collection, CollectionError, CollectionResult, Key, KeyRef, Value};
    pub use crate::config::{CodecLimits, CollectionConfig};
}

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` when a
/// subscriber is already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Reads and validates a TOML collection configuration file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<config::CollectionConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = config::CollectionConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "collection config loaded");
    Ok(config)
}
