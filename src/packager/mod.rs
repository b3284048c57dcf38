//! Installer packaging boundary.
//!
//! The engine decides *whether* a package must be built and records the
//! result; how the bundle is produced lives behind [`ArtifactPackager`].

mod archive;
mod client_config;

pub use archive::ZipPackager;
pub use client_config::{ClientConfig, package_name, permanent_password};

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::CustomerMetadata;

/// A finished installer bundle on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    pub artifact_path: PathBuf,
    pub artifact_name: String,
}

#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("remote-access binary not available at {0}")]
    MissingVendorBinary(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("config serialization failed: {0}")]
    Config(#[from] serde_json::Error),

    #[error("package at {0} is empty")]
    EmptyArtifact(PathBuf),

    #[error("package build timed out after {0:?}")]
    Timeout(Duration),

    #[error("package build task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Failed(String),
}

/// Builds a downloadable installer bundle for a support code.
///
/// Implementations are called from the blocking thread pool. On success the
/// returned path must already resolve to a non-empty file; failures must be
/// reported as an error, never as an empty artifact.
pub trait ArtifactPackager: Send + Sync + 'static {
    fn build_package(
        &self,
        code: &str,
        metadata: &CustomerMetadata,
    ) -> Result<BuiltArtifact, PackagerError>;
}
