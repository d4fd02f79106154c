//! Error types for Chitra.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Stay serializable where the payload allows it (frontend/IPC friendly)
//! - Include actionable information (which stage, which geometry field)
//! - Support error chaining for context

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for one convolution run owned by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a run ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for Chitra.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum ChitraError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Convolution error: {0}")]
    Convolve(#[from] ConvolveError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors describing malformed pixel-buffer geometry.
///
/// Channel-order and channel-count mismatches never surface as errors;
/// normalization resolves them locally. Only geometry that cannot describe
/// a valid raster is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("stride {stride} is smaller than {width} pixels x {bytes_per_pixel} bytes")]
    StrideTooSmall {
        stride: usize,
        width: u32,
        bytes_per_pixel: usize,
    },

    #[error("buffer holds {len} bytes but geometry requires at least {required} (stride {stride} x height {height})")]
    DataTooShort {
        len: usize,
        required: usize,
        stride: usize,
        height: u32,
    },
}

/// Errors from the kernel catalog.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogError {
    #[error("kernel '{name}' is not registered")]
    KernelNotFound { name: String },

    #[error("kernel '{name}' is already registered")]
    DuplicateKernel { name: String },

    #[error("invalid kernel: {reason}")]
    InvalidKernel { reason: String },
}

/// Errors from the execution controller's state machine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlError {
    #[error("a run is already active on this controller")]
    AlreadyRunning,
}

/// Errors during a convolution run.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConvolveError {
    /// User-requested terminal outcome, not a fault. No partial result
    /// is delivered.
    #[error("convolution cancelled")]
    Cancelled,

    #[error("source buffer rejected: {0}")]
    Buffer(#[from] BufferError),

    #[error("convolution failed in {stage}: {detail}")]
    Failed { stage: String, detail: String },
}

impl ConvolveError {
    /// Whether this outcome is a user cancellation rather than a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ConvolveError::Cancelled)
    }
}

/// Errors from the image loader/saver collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaError {
    #[error("unsupported output format: .{0}")]
    UnsupportedFormat(String),

    #[error("path has no file extension: {0}")]
    MissingExtension(String),
}

impl ChitraError {
    /// Whether this error represents a user cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ChitraError::Convolve(ConvolveError::Cancelled))
    }
}

/// Result type alias for Chitra operations.
pub type ChitraResult<T> = Result<T, ChitraError>;

/// Result type alias for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for convolution runs.
pub type ConvolveResult<T> = Result<T, ConvolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_display() {
        let id = RunId::new();
        let display = format!("{}", id);
        assert_eq!(display.len(), 8);
    }

    #[test]
    fn test_cancellation_detection() {
        assert!(ConvolveError::Cancelled.is_cancellation());
        assert!(!ConvolveError::Failed {
            stage: "normalize".to_string(),
            detail: "boom".to_string(),
        }
        .is_cancellation());

        let top: ChitraError = ConvolveError::Cancelled.into();
        assert!(top.is_cancellation());
    }

    #[test]
    fn test_buffer_error_message_carries_geometry() {
        let err = BufferError::DataTooShort {
            len: 10,
            required: 40,
            stride: 8,
            height: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("40"));
    }
}
