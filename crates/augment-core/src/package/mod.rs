//! Output packaging: encode batch entries, group them by operator, and hand
//! the groups to an [`ArchiveWriter`].
//!
//! Entry names are `{operatorId}_{originalName}` and folders are operator ids,
//! both kept verbatim for compatibility with archives produced elsewhere.

mod archive;

pub use archive::{ArchiveFolder, ArchiveWriter, EncodedFile, ZipArchiveWriter};

use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::config::{OutputConfig, OutputFormat};
use crate::error::PackagingError;
use crate::types::{BatchEntry, BatchResult};

/// A finished archive, ready to be saved.
#[derive(Debug, Clone)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Archive {
    /// Write the archive into `dir`, creating it if needed.
    pub async fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}

/// `augmented_images_{YYYY-MM-DD}.zip`.
pub fn archive_file_name(date: NaiveDate) -> String {
    format!("augmented_images_{}.zip", date.format("%Y-%m-%d"))
}

/// Encodes and groups batch output.
#[derive(Debug, Clone)]
pub struct OutputPackager {
    format: OutputFormat,
    jpeg_quality: u8,
}

impl OutputPackager {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            format: config.format,
            jpeg_quality: config.jpeg_quality,
        }
    }

    /// Encode one entry under its output name.
    pub fn encode(&self, entry: &BatchEntry) -> Result<EncodedFile, PackagingError> {
        let file_name = entry.output_name();
        let encode_err = |e: image::ImageError| PackagingError::Encode {
            file_name: file_name.clone(),
            message: e.to_string(),
        };

        let mut bytes = Vec::new();
        match self.format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha; transparent areas flatten to black
                let rgb = DynamicImage::ImageRgba8(entry.image.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality)
                    .encode_image(&rgb)
                    .map_err(encode_err)?;
            }
            OutputFormat::Png => {
                entry
                    .image
                    .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                    .map_err(encode_err)?;
            }
        }

        Ok(EncodedFile { file_name, bytes })
    }

    /// Encode every entry and group by operator, folders in order of first
    /// appearance and files in entry order.
    pub fn group(&self, result: &BatchResult) -> Result<Vec<ArchiveFolder>, PackagingError> {
        if result.is_empty() {
            return Err(PackagingError::Empty);
        }

        let mut folders: Vec<ArchiveFolder> = Vec::new();
        for entry in &result.entries {
            let file = self.encode(entry)?;
            let name = entry.operator_id.as_str();
            match folders.iter_mut().find(|f| f.name == name) {
                Some(folder) => folder.files.push(file),
                None => folders.push(ArchiveFolder {
                    name: name.to_string(),
                    files: vec![file],
                }),
            }
        }
        Ok(folders)
    }

    /// Package a batch with today's (UTC) archive name.
    pub async fn package(
        &self,
        result: &BatchResult,
        writer: &dyn ArchiveWriter,
    ) -> Result<Archive, PackagingError> {
        self.package_dated(result, writer, Utc::now().date_naive())
            .await
    }

    /// Package a batch, naming the archive after `date`.
    ///
    /// Readiness is checked before any encoding work.
    pub async fn package_dated(
        &self,
        result: &BatchResult,
        writer: &dyn ArchiveWriter,
        date: NaiveDate,
    ) -> Result<Archive, PackagingError> {
        if !writer.is_ready().await {
            return Err(PackagingError::NotReady);
        }

        let folders = self.group(result)?;
        let files: usize = folders.iter().map(|f| f.files.len()).sum();
        tracing::debug!(
            "Packaging {} {} file(s) in {} folder(s)",
            files,
            self.format,
            folders.len()
        );

        let bytes = writer.write_archive(folders).await?;
        let file_name = archive_file_name(date);
        tracing::info!("Built {} ({} bytes)", file_name, bytes.len());
        Ok(Archive { file_name, bytes })
    }
}
