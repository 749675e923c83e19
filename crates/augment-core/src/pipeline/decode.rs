//! Image decoding with format sniffing, size limits, and timeout support.

use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::{ImageInput, SourceImage};

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory image into RGBA pixels.
    ///
    /// The byte budget is checked before decoding; dimensions after. Decoding
    /// runs on the blocking pool and is abandoned after `decode_timeout_ms`.
    pub async fn decode(&self, input: ImageInput) -> Result<SourceImage, PipelineError> {
        let ImageInput { name, bytes } = input;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(PipelineError::FileTooLarge {
                name,
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let max_dim = self.limits.max_image_dimension;
        let task_name = name.clone();

        let decode_result = timeout(timeout_duration, async move {
            tokio::task::spawn_blocking(move || Self::decode_sync(bytes, &task_name, max_dim))
                .await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(pixels))) => Ok(SourceImage { name, pixels }),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                name,
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                name,
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode (runs in spawn_blocking).
    fn decode_sync(
        bytes: Vec<u8>,
        name: &str,
        max_dim: u32,
    ) -> Result<image::RgbaImage, PipelineError> {
        let decode_err = |message: String| PipelineError::Decode {
            name: name.to_string(),
            message,
        };
        let reader = || {
            image::ImageReader::new(Cursor::new(bytes.as_slice()))
                .with_guessed_format()
                .map_err(|e| decode_err(format!("Cannot detect image format: {}", e)))
        };

        let probe = reader()?;
        if probe.format().is_none() {
            return Err(decode_err("Unrecognized image format".to_string()));
        }

        // Header-only probe so oversized images are rejected before allocation
        let (width, height) = probe
            .into_dimensions()
            .map_err(|e| decode_err(e.to_string()))?;
        if width > max_dim || height > max_dim {
            return Err(PipelineError::ImageTooLarge {
                name: name.to_string(),
                width,
                height,
                max_dim,
            });
        }

        let image = reader()?
            .decode()
            .map_err(|e| decode_err(e.to_string()))?;
        tracing::trace!("Decoded {} ({}x{})", name, image.width(), image.height());
        Ok(image.to_rgba8())
    }
}
