//! # Chitra - Pausable Raster Convolution
//!
//! Chitra applies 2D convolution kernels to raster images. It provides a
//! canonical pixel-buffer representation, a named catalog of kernels, and
//! an engine with two execution strategies behind one cooperative control
//! surface.
//!
//! ## Features
//!
//! - **Canonical pixel buffers**: arbitrary input layouts normalize once
//!   into a 4-byte-per-pixel BGRA working format with explicit stride
//! - **Kernel catalog**: immutable named kernels, built-ins plus
//!   caller-registered ones (including JSON kernel files)
//! - **Two strategies, one algorithm**: a deterministic sequential
//!   reference path and a row-parallel path with bit-identical output
//! - **Cooperative control**: pause, resume, and cancel at row
//!   boundaries, with ordered progress reporting across worker threads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chitra::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = KernelCatalog::with_builtins();
//! let kernel = catalog.lookup("blur")?;
//! let source = chitra::io::load_image("input.png")?;
//!
//! let engine = ConvolutionEngine::new();
//! let controller = ExecutionController::new();
//! let filtered = controller.run(
//!     &engine,
//!     &source,
//!     kernel,
//!     Strategy::Parallel,
//!     Some(Arc::new(|pct: f64| println!("{pct:.1}%"))),
//! )?;
//!
//! chitra::io::save_image(&filtered, "output.png")?;
//! ```
//!
//! Runs execute on the calling thread; to drive `pause`/`resume`/`cancel`
//! while a run is in flight, share the controller via `Arc` and call
//! `run` from a worker thread.
//!
//! ## Architecture
//!
//! - [`core`]: pixel buffers, format normalization, and error handling
//! - [`kernels`]: the kernel type, the catalog, and built-in kernels
//! - [`execution`]: the engine, the controller, and progress delivery
//! - [`io`]: image file loading and saving collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod io;
pub mod kernels;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use chitra::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::buffer::{PixelBuffer, PixelFormat};

    // Errors
    pub use crate::core::error::{
        BufferError, CatalogError, ChitraError, ChitraResult, ControlError, ConvolveError,
        MediaError, RunId,
    };

    // Kernels
    pub use crate::kernels::catalog::{KernelCatalog, KernelFileEntry};
    pub use crate::kernels::kernel::Kernel;

    // Execution
    pub use crate::execution::controller::{ExecutionController, ExecutionState};
    pub use crate::execution::engine::{ConvolutionEngine, Strategy};
    pub use crate::execution::progress::{ChannelSink, ProgressSink};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
