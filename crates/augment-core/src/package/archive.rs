//! Archive writer capability and the default zip implementation.

use std::io::{Cursor, Write};

use async_trait::async_trait;

use crate::error::PackagingError;

/// One encoded output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A named folder of encoded images, one per operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFolder {
    pub name: String,
    pub files: Vec<EncodedFile>,
}

/// Assembles grouped output into a single archive.
///
/// A writer may be unavailable when packaging starts (for example while a
/// backing service is still loading); callers check [`ArchiveWriter::is_ready`]
/// first so that case is reported instead of dropping results.
#[async_trait]
pub trait ArchiveWriter: Send + Sync {
    /// Whether the writer can accept work right now.
    async fn is_ready(&self) -> bool;

    /// Build the archive and return its bytes.
    async fn write_archive(&self, folders: Vec<ArchiveFolder>) -> Result<Vec<u8>, PackagingError>;
}

/// Deflate-compressed zip with one directory per folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiveWriter;

impl ZipArchiveWriter {
    pub fn new() -> Self {
        Self
    }

    fn write_sync(folders: Vec<ArchiveFolder>) -> Result<Vec<u8>, PackagingError> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for folder in folders {
            zip.add_directory(folder.name.as_str(), options)
                .map_err(archive_err)?;
            for file in folder.files {
                zip.start_file(format!("{}/{}", folder.name, file.file_name), options)
                    .map_err(archive_err)?;
                zip.write_all(&file.bytes).map_err(archive_err)?;
            }
        }

        let cursor = zip.finish().map_err(archive_err)?;
        Ok(cursor.into_inner())
    }
}

fn archive_err(e: impl std::fmt::Display) -> PackagingError {
    PackagingError::Archive(e.to_string())
}

#[async_trait]
impl ArchiveWriter for ZipArchiveWriter {
    async fn is_ready(&self) -> bool {
        true
    }

    async fn write_archive(&self, folders: Vec<ArchiveFolder>) -> Result<Vec<u8>, PackagingError> {
        tokio::task::spawn_blocking(move || Self::write_sync(folders))
            .await
            .map_err(|e| PackagingError::Archive(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn folder(name: &str, files: &[(&str, &[u8])]) -> ArchiveFolder {
        ArchiveFolder {
            name: name.to_string(),
            files: files
                .iter()
                .map(|(n, b)| EncodedFile {
                    file_name: n.to_string(),
                    bytes: b.to_vec(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_zip_layout() {
        let bytes = ZipArchiveWriter::new()
            .write_archive(vec![
                folder("hflip", &[("hflip_a.png", b"one"), ("hflip_b.png", b"two")]),
                folder("noise", &[("noise_a.png", b"three")]),
            ])
            .await
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "hflip/",
                "hflip/hflip_a.png",
                "hflip/hflip_b.png",
                "noise/",
                "noise/noise_a.png"
            ]
        );

        let mut content = String::new();
        archive
            .by_name("noise/noise_a.png")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "three");
    }

    #[tokio::test]
    async fn test_zip_writer_is_ready() {
        assert!(ZipArchiveWriter::new().is_ready().await);
    }
}
