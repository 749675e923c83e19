//! Augment Core - Embeddable image augmentation engine.
//!
//! Augment applies a catalog of geometric, photometric, noise, and color-space
//! transforms to batches of images, for training-data diversification. Every
//! (image, operator) pair is an independent task; a failing task degrades to
//! a passthrough copy instead of failing the batch.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Decode → [Operator × N, bounded workers] → BatchResult → Package → Zip
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use augment_core::{Augmenter, BatchOptions, Config, ImageInput, OperatorId};
//! use augment_core::package::{OutputPackager, ZipArchiveWriter};
//! use augment_core::pipeline::NoProgress;
//!
//! #[tokio::main]
//! async fn main() -> augment_core::Result<()> {
//!     let config = Config::load()?;
//!     let augmenter = Augmenter::new(&config);
//!
//!     let input = ImageInput::new("cat.png", std::fs::read("cat.png")?);
//!     let result = augmenter
//!         .run(
//!             vec![input],
//!             &[OperatorId::HFlip, OperatorId::Rotate],
//!             &config.operators,
//!             &BatchOptions::default(),
//!             Arc::new(NoProgress),
//!         )
//!         .await?;
//!
//!     let archive = OutputPackager::new(&config.output)
//!         .package(&result, &ZipArchiveWriter::new())
//!         .await?;
//!     archive.save_to(&config.output_dir()).await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod color;
pub mod config;
pub mod error;
pub mod ops;
pub mod package;
pub mod params;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, OutputFormat};
pub use error::{
    AugmentError, ConfigError, OperatorError, PackagingError, ParamError, PipelineError,
    PipelineResult, Result,
};
pub use ops::{Operator, OperatorDescriptor, OperatorId, Registry};
pub use params::{Bound, ParameterSet, Range, Sampling};
pub use pipeline::{Augmenter, BatchOptions, CancelToken, ProgressSink};
pub use types::{BatchEntry, BatchResult, BatchStats, ImageInput, SourceImage, TaskOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
