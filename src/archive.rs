//! Archive formats accepted by the deposit service.
//!
//! Provides detection of the archive type from a content type, a file
//! extension, or the archive bytes themselves.

use crate::errors::DepositError;
use std::fs;
use std::path::Path;

/// Supported archive formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// ZIP archive
    Zip,
    /// Uncompressed tarball
    Tar,
}

impl ArchiveFormat {
    /// Map a request content type to a format
    pub fn from_content_type(content_type: &str) -> Result<Self, DepositError> {
        match content_type.trim() {
            "application/zip" => Ok(ArchiveFormat::Zip),
            "application/x-tar" => Ok(ArchiveFormat::Tar),
            other => Err(DepositError::InvalidInput(format!(
                "unsupported content type: {}",
                other
            ))),
        }
    }

    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Result<Self, DepositError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                DepositError::InvalidInput(format!(
                    "Could not determine file extension for: {}",
                    path.display()
                ))
            })?;

        match extension.to_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar" => Ok(ArchiveFormat::Tar),
            ext => Err(DepositError::InvalidInput(format!(
                "Unsupported archive format: .{}. Supported formats: .zip, .tar",
                ext
            ))),
        }
    }

    /// Detect format from the archive's magic bytes
    pub fn from_content(content: &[u8]) -> Result<Self, DepositError> {
        if content.starts_with(b"PK\x03\x04") || content.starts_with(b"PK\x05\x06") {
            return Ok(ArchiveFormat::Zip);
        }
        // POSIX tar headers carry "ustar" at offset 257
        if content.get(257..262) == Some(b"ustar".as_slice()) {
            return Ok(ArchiveFormat::Tar);
        }
        Err(DepositError::InvalidInput(
            "Could not detect archive format from content. Expected a ZIP or tar archive"
                .to_string(),
        ))
    }

    /// Get the MIME type sent to the deposit service
    pub fn content_type(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "application/zip",
            ArchiveFormat::Tar => "application/x-tar",
        }
    }

    /// Get the typical file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
        }
    }

    /// File name announced for uploaded archives
    pub fn file_name(&self) -> String {
        format!("archive.{}", self.extension())
    }
}

/// Archive bytes ready to be deposited.
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    pub format: ArchiveFormat,
    pub data: Vec<u8>,
}

impl Archive {
    pub fn new(format: ArchiveFormat, data: Vec<u8>) -> Self {
        Self { format, data }
    }

    /// Read an archive from disk, detecting its format from the extension
    /// and falling back to the file content.
    pub fn from_file(path: &Path) -> Result<Self, DepositError> {
        let data = fs::read(path).map_err(|e| {
            DepositError::Io(e, format!("Failed to read archive: {}", path.display()))
        })?;
        let format = ArchiveFormat::from_extension(path)
            .or_else(|_| ArchiveFormat::from_content(&data))?;
        Ok(Self { format, data })
    }
}
