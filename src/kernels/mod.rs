//! Kernel module.
//!
//! Contains the kernel type, the named catalog, and the built-in kernels.

pub mod builtin;
pub mod catalog;
pub mod kernel;

pub use catalog::{KernelCatalog, KernelFileEntry};
pub use kernel::Kernel;
