//! Error types for the `vde` crate.
//!
//! This module defines [`VdeError`], the unified error type returned by all
//! fallible operations in the crate. Only startup-time failures (manifest,
//! target spec) are fatal to a run; fetch and transcode failures are
//! recovered per item by the pipeline, which skips the item's remaining
//! stages and moves on.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `vde` operations.
///
/// Every public method that can fail returns `Result<T, VdeError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VdeError {
    /// The `-t/--target` spec could not be parsed. Fatal at startup.
    #[error("Malformed target spec '{spec}': {reason}")]
    MalformedTarget {
        /// The spec string as given on the command line.
        spec: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The manifest file could not be read or understood. Fatal at startup.
    #[error("Failed to load manifest at {path}: {reason}")]
    Manifest {
        /// Path that was passed to [`crate::manifest::load_manifest`].
        path: PathBuf,
        /// Underlying reason the load failed.
        reason: String,
    },

    /// A video could not be fetched from its source. Recovered per item.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch {
        /// The source URL that failed.
        url: String,
        /// Underlying reason (network error, tool exit status, ...).
        reason: String,
    },

    /// The external decode tool failed or could not be started.
    /// Recovered per item.
    #[error("Frame extraction failed: {0}")]
    Transcode(String),

    /// An I/O error occurred while managing workspace directories or
    /// artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}
