//! Named registry of immutable convolution kernels.

use crate::core::error::{CatalogError, CatalogResult, ChitraResult};
use crate::kernels::kernel::Kernel;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of a user kernel file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelFileEntry {
    /// Name to register the kernel under.
    pub name: String,
    /// Weight grid, one inner vector per kernel row.
    pub weights: Vec<Vec<f32>>,
}

/// Registry for all available kernels.
///
/// The catalog is populated once at startup (built-ins plus any user
/// kernel files) and never mutated after that; lookups hand out shared
/// references to immutable kernels. Registration preserves insertion
/// order so listings are stable.
#[derive(Debug, Default)]
pub struct KernelCatalog {
    kernels: IndexMap<String, Kernel>,
}

impl KernelCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            kernels: IndexMap::new(),
        }
    }

    /// Create a catalog pre-populated with the built-in kernels.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        crate::kernels::builtin::register_all(&mut catalog)
            .expect("builtin kernel names are unique");
        catalog
    }

    /// Register a kernel under a unique name.
    pub fn register(&mut self, name: impl Into<String>, kernel: Kernel) -> CatalogResult<()> {
        let name = name.into();
        if self.kernels.contains_key(&name) {
            return Err(CatalogError::DuplicateKernel { name });
        }
        self.kernels.insert(name, kernel);
        Ok(())
    }

    /// Look up a kernel by name.
    pub fn lookup(&self, name: &str) -> CatalogResult<&Kernel> {
        self.kernels
            .get(name)
            .ok_or_else(|| CatalogError::KernelNotFound {
                name: name.to_string(),
            })
    }

    /// Check if a kernel is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.kernels.contains_key(name)
    }

    /// Registered kernel names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kernels.keys().map(|s| s.as_str())
    }

    /// All registered kernels.
    pub fn kernels(&self) -> impl Iterator<Item = (&str, &Kernel)> {
        self.kernels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registered kernels.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Register every entry of a JSON kernel file.
    ///
    /// The file holds an array of `{ "name": ..., "weights": [[...]] }`
    /// entries; each goes through the same [`register`](Self::register)
    /// path as the built-ins, so duplicate names and malformed grids are
    /// rejected with the usual catalog errors.
    pub fn register_from_file(&mut self, path: impl AsRef<Path>) -> ChitraResult<usize> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let entries: Vec<KernelFileEntry> = serde_json::from_str(&text)?;
        let count = entries.len();
        for entry in entries {
            let kernel = Kernel::from_rows(entry.weights)?;
            self.register(entry.name, kernel)?;
        }
        log::debug!(
            "registered {} user kernel(s) from {}",
            count,
            path.as_ref().display()
        );
        Ok(count)
    }
}
