//! Built-in convolution kernels.
//!
//! The standard set every catalog starts from: smoothing, edge detection,
//! sharpening, and embossing, in both small and large footprints. The
//! numeric weights are a product decision; callers substitute their own
//! kernels through the same registration interface.

use crate::core::error::CatalogResult;
use crate::kernels::catalog::KernelCatalog;
use crate::kernels::kernel::Kernel;

/// Register all built-in kernels.
pub fn register_all(catalog: &mut KernelCatalog) -> CatalogResult<()> {
    catalog.register("blur", blur())?;
    catalog.register("edge_detect", edge_detect())?;
    catalog.register("sharpen", sharpen())?;
    catalog.register("emboss", emboss())?;
    catalog.register("even_blur", even_blur())?;
    catalog.register("strong_blur", strong_blur())?;
    Ok(())
}

fn grid(rows: Vec<Vec<f32>>) -> Kernel {
    // Built-in tables are rectangular by construction.
    Kernel::from_rows(rows).expect("builtin kernel grids are well-formed")
}

/// 3x3 Gaussian blur, weights summing to 1.
pub fn blur() -> Kernel {
    grid(vec![
        vec![1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
        vec![2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
        vec![1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    ])
}

/// 3x3 Sobel-style horizontal edge detector.
pub fn edge_detect() -> Kernel {
    grid(vec![
        vec![-1.0, -2.0, -1.0],
        vec![0.0, 0.0, 0.0],
        vec![1.0, 2.0, 1.0],
    ])
}

/// 3x3 sharpen.
pub fn sharpen() -> Kernel {
    grid(vec![
        vec![0.0, -1.0, 0.0],
        vec![-1.0, 5.0, -1.0],
        vec![0.0, -1.0, 0.0],
    ])
}

/// 3x3 emboss.
pub fn emboss() -> Kernel {
    grid(vec![
        vec![-2.0, -1.0, 0.0],
        vec![-1.0, 1.0, 1.0],
        vec![0.0, 1.0, 2.0],
    ])
}

/// 4x4 averaging blur, an even-dimension kernel summing to 1.
pub fn even_blur() -> Kernel {
    grid(vec![
        vec![1.0 / 36.0, 2.0 / 36.0, 2.0 / 36.0, 1.0 / 36.0],
        vec![2.0 / 36.0, 4.0 / 36.0, 4.0 / 36.0, 2.0 / 36.0],
        vec![2.0 / 36.0, 4.0 / 36.0, 4.0 / 36.0, 2.0 / 36.0],
        vec![1.0 / 36.0, 2.0 / 36.0, 2.0 / 36.0, 1.0 / 36.0],
    ])
}

/// 7x7 weighted blur built from the outer product of the binomial
/// 7-tap `[1, 6, 15, 20, 15, 6, 1]`, normalized to sum 1.
pub fn strong_blur() -> Kernel {
    const TAPS: [f32; 7] = [1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0];
    const NORM: f32 = 4096.0; // 64 * 64

    let rows = TAPS
        .iter()
        .map(|&ty| TAPS.iter().map(|&tx| ty * tx / NORM).collect())
        .collect();
    grid(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_kernels_sum_to_one() {
        for kernel in [blur(), even_blur(), strong_blur()] {
            assert!(
                (kernel.sum() - 1.0).abs() < 1e-5,
                "blur kernel sum was {}",
                kernel.sum()
            );
        }
    }

    #[test]
    fn test_edge_detect_sums_to_zero() {
        assert_eq!(edge_detect().sum(), 0.0);
    }

    #[test]
    fn test_sharpen_preserves_brightness() {
        assert_eq!(sharpen().sum(), 1.0);
    }

    #[test]
    fn test_builtin_dimensions() {
        assert_eq!((blur().rows(), blur().cols()), (3, 3));
        assert_eq!((even_blur().rows(), even_blur().cols()), (4, 4));
        assert_eq!((strong_blur().rows(), strong_blur().cols()), (7, 7));
    }

    #[test]
    fn test_strong_blur_is_symmetric() {
        let k = strong_blur();
        for ky in 0..7 {
            for kx in 0..7 {
                assert_eq!(k.weight(ky, kx), k.weight(kx, ky));
                assert_eq!(k.weight(ky, kx), k.weight(6 - ky, 6 - kx));
            }
        }
    }
}
