//! Error types for the Augment engine.
//!
//! Errors are organized by concern. Operator errors never escape a batch: the
//! pipeline turns them into degraded passthrough entries. Decode failures are
//! scoped to one image. Packaging errors are the caller's to handle.

use thiserror::Error;

use crate::ops::OperatorId;

/// Top-level error type for Augment operations.
#[derive(Error, Debug)]
pub enum AugmentError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Parameter lookup/update errors
    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),

    /// Output packaging errors
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Batch pipeline errors.
///
/// Only `EmptyBatch` and `Cancelled` abort a whole batch; the decode variants
/// are reported per image and logged.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No images or no operators were selected
    #[error("Nothing to do: {images} image(s) x {operators} operator(s)")]
    EmptyBatch { images: usize, operators: usize },

    /// Image decoding failed
    #[error("Decode error for {name}: {message}")]
    Decode { name: String, message: String },

    /// Decoding took longer than the configured limit
    #[error("Timeout decoding {name} after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    /// Image dimensions exceed limit
    #[error("Image too large: {name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// File exceeds size limit
    #[error("File too large: {name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// The batch was cancelled between tasks
    #[error("Batch cancelled after {completed} of {total} task(s)")]
    Cancelled { completed: usize, total: usize },
}

/// Failure inside a single transform. Always degrades the task, never the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// A parameter value makes the transform meaningless (e.g. zero block size)
    #[error("{operator}: invalid parameter {field}: {message}")]
    InvalidParameter {
        operator: OperatorId,
        field: &'static str,
        message: String,
    },

    /// The transform produced a non-finite intermediate value
    #[error("{operator}: numeric error: {message}")]
    Numeric {
        operator: OperatorId,
        message: String,
    },
}

/// Parameter set lookup and update errors.
#[derive(Error, Debug)]
pub enum ParamError {
    /// The operator id is not in the catalog
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    /// The operator takes no parameters
    #[error("Operator {0} has no parameters")]
    NoParameters(OperatorId),

    /// The field is not part of the operator's configuration
    #[error("Unknown field {field} for operator {operator}")]
    UnknownField { operator: OperatorId, field: String },

    /// The field exists but is not a `[low, high]` range
    #[error("Field {field} of operator {operator} is not a range")]
    NotARange { operator: OperatorId, field: String },

    /// The new value does not fit the field's type
    #[error("Invalid value for {operator}.{field}: {message}")]
    InvalidValue {
        operator: OperatorId,
        field: String,
        message: String,
    },
}

/// Output packaging errors.
#[derive(Error, Debug)]
pub enum PackagingError {
    /// The archive capability is not available yet
    #[error("Archive writer is not ready")]
    NotReady,

    /// There are no results to package
    #[error("No results to package")]
    Empty,

    /// Encoding an output image failed
    #[error("Failed to encode {file_name}: {message}")]
    Encode { file_name: String, message: String },

    /// Building the archive failed
    #[error("Archive construction failed: {0}")]
    Archive(String),
}

/// Convenience type alias for Augment results.
pub type Result<T> = std::result::Result<T, AugmentError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
