//! Error types for the voxel world.
//!
//! Only construction-time and asset-loading paths can fail. Block queries and edits
//! never return errors: missing chunks read as air and out-of-range writes are
//! ignored.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or configuring the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig {
        /// Name of the setting (environment variable).
        key: &'static str,
        /// The raw value that was rejected.
        value: String,
    },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn chunk worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// A material texture could not be read or decoded.
    #[error("failed to load texture {path}: {source}")]
    Texture {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying decoder error.
        #[source]
        source: image::ImageError,
    },
}
