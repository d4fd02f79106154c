//! The convolution engine.
//!
//! One canonical algorithm with two execution strategies. The sequential
//! path walks rows in index order on the calling thread and serves as the
//! reference implementation; the parallel path partitions the same rows
//! across rayon's worker pool. Both run the identical per-row routine, so
//! their numeric output is bit-identical: every row writes a disjoint
//! destination slice and reads only the immutable source, which makes the
//! parallel schedule race-free without any row-level locking.

use crate::core::buffer::{PixelBuffer, CANONICAL_BPP};
use crate::core::error::ConvolveResult;
use crate::execution::controller::ExecutionController;
use crate::execution::progress::RowProgress;
use crate::kernels::kernel::Kernel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How rows are assigned to execution units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Rows in index order on the calling thread. Deterministic; the
    /// reference path.
    Sequential,
    /// Rows fanned out across a worker pool sized to the available
    /// hardware parallelism.
    Parallel,
}

/// Applies a convolution kernel to a pixel buffer.
#[derive(Debug, Clone, Default)]
pub struct ConvolutionEngine;

impl ConvolutionEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Convolve `source` with `kernel`, producing a buffer of identical
    /// dimensions.
    ///
    /// The source is normalized to the canonical layout first; when that
    /// allocates, the caller's buffer stays untouched and the copy is
    /// dropped with this call. Workers honor the controller's pause gate
    /// and cancellation flag at row boundaries; on cancellation the
    /// partially written destination is discarded, never returned.
    pub fn convolve(
        &self,
        source: &PixelBuffer,
        kernel: &Kernel,
        strategy: Strategy,
        control: &ExecutionController,
    ) -> ConvolveResult<PixelBuffer> {
        let src = source.as_canonical();
        let height = src.height();
        log::debug!(
            "convolving {}x{} with {}x{} kernel ({:?})",
            src.width(),
            height,
            kernel.rows(),
            kernel.cols(),
            strategy
        );

        let mut result = PixelBuffer::new(src.width(), height)?;
        let progress = RowProgress::new(height as usize, control.router());
        let dst_stride = result.stride();

        match strategy {
            Strategy::Sequential => {
                for y in 0..height {
                    control.checkpoint()?;
                    convolve_row(&src, kernel, y as usize, result.row_mut(y));
                    progress.row_done();
                }
            }
            Strategy::Parallel => {
                let src = &*src;
                result
                    .data_mut()
                    .par_chunks_mut(dst_stride)
                    .enumerate()
                    .try_for_each(|(y, dst_row)| -> ConvolveResult<()> {
                        control.checkpoint()?;
                        convolve_row(src, kernel, y, dst_row);
                        progress.row_done();
                        Ok(())
                    })?;
            }
        }

        progress.finish();
        Ok(result)
    }
}

/// Compute one output row.
///
/// Sample coordinates outside the image clamp to the nearest edge pixel
/// (edge replication). Channel sums accumulate in f32, clamp to `[0, 255]`,
/// and truncate to bytes; the kernel never applies to alpha, which is
/// written fully opaque.
fn convolve_row(src: &PixelBuffer, kernel: &Kernel, y: usize, dst_row: &mut [u8]) {
    let width = src.width() as usize;
    let height = src.height() as usize;
    let stride = src.stride();
    let data = src.data();

    let k_rows = kernel.rows();
    let k_cols = kernel.cols();
    let offset_x = kernel.offset_x() as isize;
    let offset_y = kernel.offset_y() as isize;
    let weights = kernel.weights();

    for x in 0..width {
        let mut blue = 0.0f32;
        let mut green = 0.0f32;
        let mut red = 0.0f32;

        for ky in 0..k_rows {
            let py = (y as isize + ky as isize - offset_y).clamp(0, height as isize - 1);
            let row_base = py as usize * stride;
            let weight_base = ky * k_cols;

            for kx in 0..k_cols {
                let px = (x as isize + kx as isize - offset_x).clamp(0, width as isize - 1);
                let sample = row_base + px as usize * CANONICAL_BPP;
                let weight = weights[weight_base + kx];

                blue += data[sample] as f32 * weight;
                green += data[sample + 1] as f32 * weight;
                red += data[sample + 2] as f32 * weight;
            }
        }

        let out = x * CANONICAL_BPP;
        dst_row[out] = blue.clamp(0.0, 255.0) as u8;
        dst_row[out + 1] = green.clamp(0.0, 255.0) as u8;
        dst_row[out + 2] = red.clamp(0.0, 255.0) as u8;
        dst_row[out + 3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::PixelFormat;
    use crate::kernels::builtin;

    fn image_from_bytes(width: u32, height: u32, data: Vec<u8>) -> PixelBuffer {
        PixelBuffer::from_raw(width, height, width as usize * 4, PixelFormat::Bgra8, data)
            .unwrap()
    }

    fn noise_image(width: u32, height: u32) -> PixelBuffer {
        // Deterministic pseudo-random bytes, alpha varying on purpose.
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        let mut seed = 0x2545f491u32;
        for _ in 0..(width * height * 4) {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            data.push((seed >> 16) as u8);
        }
        image_from_bytes(width, height, data)
    }

    fn convolve(source: &PixelBuffer, kernel: &Kernel, strategy: Strategy) -> PixelBuffer {
        let ctrl = ExecutionController::new();
        ConvolutionEngine::new()
            .convolve(source, kernel, strategy, &ctrl)
            .unwrap()
    }

    #[test]
    fn test_identity_kernel_is_passthrough_with_opaque_alpha() {
        let source = noise_image(9, 7);
        let result = convolve(&source, &Kernel::identity(), Strategy::Sequential);

        for y in 0..7 {
            for x in 0..9 {
                let [b, g, r, _] = source.pixel(x, y);
                assert_eq!(result.pixel(x, y), [b, g, r, 255]);
            }
        }
    }

    #[test]
    fn test_sequential_and_parallel_agree_bit_for_bit() {
        let source = noise_image(33, 21);
        for kernel in [
            builtin::blur(),
            builtin::edge_detect(),
            builtin::even_blur(),
            builtin::strong_blur(),
        ] {
            let seq = convolve(&source, &kernel, Strategy::Sequential);
            let par = convolve(&source, &kernel, Strategy::Parallel);
            assert_eq!(seq.data(), par.data());
        }
    }

    #[test]
    fn test_output_dimensions_match_input_for_any_kernel_shape() {
        let source = noise_image(10, 6);
        for (rows, cols) in [(1, 1), (3, 3), (4, 4), (2, 6), (1, 3), (7, 7)] {
            let kernel = Kernel::from_weights(rows, cols, vec![0.1; rows * cols]).unwrap();
            let result = convolve(&source, &kernel, Strategy::Parallel);
            assert_eq!((result.width(), result.height()), (10, 6));
        }
    }

    #[test]
    fn test_single_pixel_image_reduces_to_weight_sum() {
        // Every sample clamps to the one pixel, so the output is
        // clamp(pixel * sum(kernel)) per channel.
        let source = image_from_bytes(1, 1, vec![100, 50, 10, 255]);
        let kernel =
            Kernel::from_rows(vec![vec![0.5, 0.25], vec![0.25, 0.5]]).unwrap(); // sum 1.5
        let result = convolve(&source, &kernel, Strategy::Sequential);
        assert_eq!(result.pixel(0, 0), [150, 75, 15, 255]);
    }

    #[test]
    fn test_single_pixel_image_clamps_overflow() {
        let source = image_from_bytes(1, 1, vec![200, 200, 200, 255]);
        let kernel = Kernel::from_rows(vec![vec![2.0, 2.0]]).unwrap();
        let result = convolve(&source, &kernel, Strategy::Sequential);
        assert_eq!(result.pixel(0, 0), [255, 255, 255, 255]);

        let negate = Kernel::from_rows(vec![vec![-1.0]]).unwrap();
        let result = convolve(&source, &negate, Strategy::Sequential);
        assert_eq!(result.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_edge_replication_samples_nearest_pixel() {
        // 3x1 image, kernel [1, 0, 0] with offset_x = 1: output x reads
        // the sample at clamp(x - 1), so the left edge replicates.
        let source = image_from_bytes(
            3,
            1,
            vec![10, 11, 12, 255, 20, 21, 22, 255, 30, 31, 32, 255],
        );
        let kernel = Kernel::from_rows(vec![vec![1.0, 0.0, 0.0]]).unwrap();
        let result = convolve(&source, &kernel, Strategy::Sequential);

        assert_eq!(result.pixel(0, 0), [10, 11, 12, 255]);
        assert_eq!(result.pixel(1, 0), [10, 11, 12, 255]);
        assert_eq!(result.pixel(2, 0), [20, 21, 22, 255]);
    }

    #[test]
    fn test_uniform_image_unchanged_by_normalized_blur() {
        let data: Vec<u8> = std::iter::repeat([90u8, 120, 150, 255])
            .take(25)
            .flatten()
            .collect();
        let source = image_from_bytes(5, 5, data);
        let result = convolve(&source, &builtin::blur(), Strategy::Sequential);

        for y in 0..5 {
            for x in 0..5 {
                let [b, g, r, a] = result.pixel(x, y);
                assert!((89..=91).contains(&b));
                assert!((119..=121).contains(&g));
                assert!((149..=151).contains(&r));
                assert_eq!(a, 255);
            }
        }
    }

    #[test]
    fn test_non_canonical_source_is_normalized_not_mutated() {
        // RGBA input: engine must convert internally and leave the
        // original untouched.
        let source = PixelBuffer::from_rgba(2, 2, vec![5; 16]).unwrap();
        let before = source.clone();
        let result = convolve(&source, &Kernel::identity(), Strategy::Sequential);

        assert_eq!(source, before);
        assert!(result.is_canonical());
        assert_eq!(result.pixel(0, 0), [5, 5, 5, 255]);
    }

    #[test]
    fn test_stride_padding_in_source_is_respected() {
        // 2x2 canonical image with 4 bytes of padding per row; padding
        // bytes are garbage the engine must never read as pixels.
        let data = vec![
            1, 2, 3, 255, 4, 5, 6, 255, 99, 99, 99, 99, // row 0 + pad
            7, 8, 9, 255, 10, 11, 12, 255, 99, 99, 99, 99, // row 1 + pad
        ];
        let padded =
            PixelBuffer::from_raw(2, 2, 12, PixelFormat::Bgra8, data).unwrap();
        let tight = image_from_bytes(
            2,
            2,
            vec![1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255, 10, 11, 12, 255],
        );

        let a = convolve(&padded, &builtin::blur(), Strategy::Sequential);
        let b = convolve(&tight, &builtin::blur(), Strategy::Sequential);
        assert_eq!(a.data(), b.data());
    }
}
