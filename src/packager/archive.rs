use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::client_config::{ClientConfig, package_name};
use super::{ArtifactPackager, BuiltArtifact, PackagerError};
use crate::models::CustomerMetadata;

const VENDOR_BINARY: &str = "downloads/rustdesk-windows.exe";
const CLIENT_EXE: &str = "connectassist-windows.exe";
const INSTALL_SCRIPTS: [&str; 2] = ["install-service.ps1", "install-connectassist.bat"];

/// Builds installer bundles as zip archives in the downloads directory.
///
/// The archive is written to a hidden temporary file first and renamed into
/// place, so a path handed out by a previous build never points at a
/// half-written file.
#[derive(Debug, Clone)]
pub struct ZipPackager {
    builder_path: PathBuf,
    downloads_path: PathBuf,
    server_domain: String,
}

impl ZipPackager {
    pub fn new(
        builder_path: impl Into<PathBuf>,
        downloads_path: impl Into<PathBuf>,
        server_domain: impl Into<String>,
    ) -> Self {
        Self {
            builder_path: builder_path.into(),
            downloads_path: downloads_path.into(),
            server_domain: server_domain.into(),
        }
    }

    pub fn vendor_binary_path(&self) -> PathBuf {
        self.builder_path.join(VENDOR_BINARY)
    }

    fn write_archive(
        &self,
        target: &Path,
        vendor_binary: &Path,
        config: &ClientConfig,
    ) -> Result<(), PackagerError> {
        let file = File::create(target)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(CLIENT_EXE, options)?;
        io::copy(&mut File::open(vendor_binary)?, &mut zip)?;

        for script in INSTALL_SCRIPTS {
            let path = self.builder_path.join(script);
            if path.is_file() {
                zip.start_file(script, options)?;
                io::copy(&mut File::open(&path)?, &mut zip)?;
            } else {
                tracing::debug!("Install script {} not found, skipping", path.display());
            }
        }

        zip.start_file("connectassist-config.json", options)?;
        zip.write_all(&serde_json::to_vec_pretty(config)?)?;

        zip.start_file("INSTALLATION-INSTRUCTIONS.txt", options)?;
        zip.write_all(config.instructions().as_bytes())?;

        zip.start_file("setup-connectassist.bat", options)?;
        zip.write_all(config.setup_script().as_bytes())?;

        let file = zip.finish()?;
        file.sync_all()?;
        Ok(())
    }
}

impl ArtifactPackager for ZipPackager {
    fn build_package(
        &self,
        code: &str,
        metadata: &CustomerMetadata,
    ) -> Result<BuiltArtifact, PackagerError> {
        let vendor_binary = self.vendor_binary_path();
        if !vendor_binary.is_file() {
            return Err(PackagerError::MissingVendorBinary(vendor_binary));
        }

        fs::create_dir_all(&self.downloads_path)?;

        let artifact_name = package_name(code, &metadata.customer_name);
        let artifact_path = self.downloads_path.join(&artifact_name);
        let partial = self
            .downloads_path
            .join(format!(".{}.{}.partial", artifact_name, Uuid::new_v4()));

        let config = ClientConfig::for_code(code, metadata, &self.server_domain);

        if let Err(e) = self.write_archive(&partial, &vendor_binary, &config) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        if let Err(e) = fs::rename(&partial, &artifact_path) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        if fs::metadata(&artifact_path)?.len() == 0 {
            return Err(PackagerError::EmptyArtifact(artifact_path));
        }

        tracing::info!(
            "Built installer package {} for support code {}",
            artifact_name,
            code
        );

        Ok(BuiltArtifact {
            artifact_path,
            artifact_name,
        })
    }
}
