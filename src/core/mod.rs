//! Core types for the Chitra convolution engine.
//!
//! This module contains the foundational pieces shared by every stage:
//! - Pixel buffers and format normalization
//! - Error types

pub mod buffer;
pub mod error;

// Re-export commonly used types
pub use buffer::{PixelBuffer, PixelFormat, CANONICAL_BPP};
pub use error::{
    BufferError, CatalogError, ChitraError, ControlError, ConvolveError, MediaError, RunId,
};
