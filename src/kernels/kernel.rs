//! The convolution kernel type.

use crate::core::error::{CatalogError, CatalogResult};
use std::fmt;

/// An immutable rectangular grid of signed convolution weights.
///
/// Dimensions are at least 1x1, need not be equal, and need not be odd.
/// The centering offsets follow the even-dimension convention of shifting
/// the center one cell towards the origin, so a 4-wide kernel centers on
/// its second column.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    rows: usize,
    cols: usize,
    /// Row-major weights, `rows * cols` entries.
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from nested rows, rejecting empty or ragged grids.
    pub fn from_rows(grid: Vec<Vec<f32>>) -> CatalogResult<Self> {
        if grid.is_empty() {
            return Err(CatalogError::InvalidKernel {
                reason: "kernel has no rows".to_string(),
            });
        }
        let cols = grid[0].len();
        if cols == 0 {
            return Err(CatalogError::InvalidKernel {
                reason: "kernel has no columns".to_string(),
            });
        }
        if let Some(bad) = grid.iter().find(|row| row.len() != cols) {
            return Err(CatalogError::InvalidKernel {
                reason: format!(
                    "ragged kernel: expected {} columns per row, found a row with {}",
                    cols,
                    bad.len()
                ),
            });
        }
        let rows = grid.len();
        let weights = grid.into_iter().flatten().collect();
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// Build a kernel from a flat row-major weight slice.
    pub fn from_weights(rows: usize, cols: usize, weights: Vec<f32>) -> CatalogResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(CatalogError::InvalidKernel {
                reason: format!("kernel dimensions must be non-zero, got {}x{}", rows, cols),
            });
        }
        if weights.len() != rows * cols {
            return Err(CatalogError::InvalidKernel {
                reason: format!(
                    "{}x{} kernel needs {} weights, got {}",
                    rows,
                    cols,
                    rows * cols,
                    weights.len()
                ),
            });
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// The 1x1 identity kernel.
    pub fn identity() -> Self {
        Self {
            rows: 1,
            cols: 1,
            weights: vec![1.0],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Horizontal centering offset in cells.
    pub fn offset_x(&self) -> usize {
        self.cols / 2 - usize::from(self.cols % 2 == 0)
    }

    /// Vertical centering offset in cells.
    pub fn offset_y(&self) -> usize {
        self.rows / 2 - usize::from(self.rows % 2 == 0)
    }

    /// Weight at kernel cell `(ky, kx)`.
    ///
    /// # Panics
    /// Panics if the cell is out of bounds.
    pub fn weight(&self, ky: usize, kx: usize) -> f32 {
        assert!(ky < self.rows && kx < self.cols, "kernel cell out of bounds");
        self.weights[ky * self.cols + kx]
    }

    /// Flat row-major weight slice.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ky in 0..self.rows {
            for kx in 0..self.cols {
                if kx > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>8.4}", self.weight(ky, kx))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
