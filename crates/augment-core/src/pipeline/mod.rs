//! Batch augmentation pipeline.
//!
//! - **decode**: Load and decode images, enforcing size limits and a timeout
//! - **discovery**: Find image files in directories
//! - **runner**: Fan out image × operator tasks over a bounded worker pool
//! - **progress**: Monotonic percentage reporting
//! - **cancel**: Cooperative cancellation between tasks

pub mod cancel;
pub mod decode;
pub mod discovery;
pub mod progress;
pub mod runner;

// Re-exports for convenient access
pub use cancel::CancelToken;
pub use decode::ImageDecoder;
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use progress::{percent, NoProgress, ProgressSink};
pub use runner::{Augmenter, BatchOptions};
