//! Checked row transforms
//!
//! Thin safe wrappers over the raw kernels: buffer lengths are validated and
//! reported as [`Error`]s, then the whole row runs through one kernel call.

use crate::kernels::{KernelSet, kernels};
use crate::types::{ColorMatrix, Kernel3x3, Kernel5x5, MatrixVariant, Pixel};
use crate::{Error, Result};

fn pixel_count(len: usize) -> Result<usize> {
    if len % 4 != 0 {
        return Err(Error::PixelStride { len });
    }
    Ok(len / 4)
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if actual < expected {
        return Err(Error::BufferSize { expected, actual });
    }
    Ok(())
}

/// A color matrix bound to a kernel variant and tier
#[derive(Debug, Clone, Copy)]
pub struct ColorMatrixTransform {
    matrix: ColorMatrix,
    variant: MatrixVariant,
    kernels: KernelSet,
}

impl ColorMatrixTransform {
    /// Use the cheapest variant that computes `matrix` exactly
    pub fn new(matrix: ColorMatrix) -> Self {
        Self::with_variant(matrix, matrix.variant())
    }

    /// Force a variant; unused coefficients are ignored
    pub fn with_variant(matrix: ColorMatrix, variant: MatrixVariant) -> Self {
        Self {
            matrix,
            variant,
            kernels: *kernels(),
        }
    }

    /// Run on an explicit kernel set instead of the process-wide one
    pub fn with_kernels(mut self, kernels: KernelSet) -> Self {
        self.kernels = kernels;
        self
    }

    /// Matrix this transform applies
    pub fn matrix(&self) -> &ColorMatrix {
        &self.matrix
    }

    /// Kernel variant used by [`apply`](Self::apply)
    pub fn variant(&self) -> MatrixVariant {
        self.variant
    }

    /// Transform every pixel of `src` into the front of `dst`
    pub fn apply(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        let count = pixel_count(src.len())?;
        check_len(src.len(), dst.len())?;
        let kernel = self.kernels.color_matrix_fn(self.variant);
        // SAFETY: both buffers hold `count` pixels and cannot overlap
        unsafe { kernel(dst.as_mut_ptr(), src.as_ptr(), self.matrix.coefficients(), count) };
        Ok(())
    }

    /// Transform `buf` in place
    pub fn apply_in_place(&self, buf: &mut [u8]) -> Result<()> {
        let count = pixel_count(buf.len())?;
        let kernel = self.kernels.color_matrix_fn(self.variant);
        let ptr = buf.as_mut_ptr();
        // SAFETY: `dst == src` is allowed and the buffer holds `count` pixels
        unsafe { kernel(ptr, ptr, self.matrix.coefficients(), count) };
        Ok(())
    }

    /// Transform pixel arrays
    pub fn apply_pixels(&self, src: &[Pixel], dst: &mut [Pixel]) -> Result<()> {
        self.apply(
            bytemuck::cast_slice(src),
            bytemuck::cast_slice_mut(dst),
        )
    }
}

macro_rules! convolution {
    ($name:ident, $kernel:ty, $size:literal, $raw:ident) => {
        #[doc = concat!("A ", stringify!($size), "x", stringify!($size), " convolution bound to a tier")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            kernel: $kernel,
            kernels: KernelSet,
        }

        impl $name {
            /// Bind `kernel` to the process-wide kernel set
            pub fn new(kernel: $kernel) -> Self {
                Self {
                    kernel,
                    kernels: *kernels(),
                }
            }

            /// Run on an explicit kernel set instead of the process-wide one
            pub fn with_kernels(mut self, kernels: KernelSet) -> Self {
                self.kernels = kernels;
                self
            }

            /// Weights this convolution applies
            pub fn kernel(&self) -> &$kernel {
                &self.kernel
            }

            #[doc = concat!(
                "Compute one output row\n\n",
                "`rows[r]` starts ", stringify!($size), " / 2 pixels left of the first output ",
                "pixel and must hold `dst.len() / 4 + ", stringify!($size), " - 1` pixels."
            )]
            pub fn apply_row(&self, dst: &mut [u8], rows: [&[u8]; $size]) -> Result<()> {
                let count = pixel_count(dst.len())?;
                let needed = (count + $size - 1) * 4;
                for row in rows {
                    check_len(needed, row.len())?;
                }
                // SAFETY: lengths checked above; `dst` is exclusively borrowed
                unsafe {
                    self.kernels.$raw(
                        dst.as_mut_ptr(),
                        rows.map(|r| r.as_ptr()),
                        self.kernel.coefficients(),
                        count,
                    )
                };
                Ok(())
            }
        }
    };
}

convolution!(Convolution3x3, Kernel3x3, 3, convolve_3x3);
convolution!(Convolution5x5, Kernel5x5, 5, convolve_5x5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::Tier;

    #[test]
    fn test_identity_round_trip() {
        let src: Vec<u8> = (0..=255).collect();
        let mut dst = vec![0u8; src.len()];
        let t = ColorMatrixTransform::with_variant(ColorMatrix::identity(), MatrixVariant::Mat4x4);
        t.apply(&src, &mut dst).unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn test_stride_error() {
        let t = ColorMatrixTransform::new(ColorMatrix::identity());
        let mut dst = [0u8; 8];
        assert_eq!(
            t.apply(&[0u8; 6], &mut dst),
            Err(Error::PixelStride { len: 6 })
        );
    }

    #[test]
    fn test_short_destination() {
        let t = ColorMatrixTransform::new(ColorMatrix::identity());
        let mut dst = [0u8; 4];
        assert_eq!(
            t.apply(&[0u8; 8], &mut dst),
            Err(Error::BufferSize {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn test_greyscale_in_place() {
        let mut buf = [255u8, 255, 255, 9, 0, 0, 0, 200];
        ColorMatrixTransform::new(ColorMatrix::greyscale())
            .apply_in_place(&mut buf)
            .unwrap();
        // 77 + 150 + 29 = 256, so white stays white
        assert_eq!(buf, [255, 255, 255, 9, 0, 0, 0, 200]);
    }

    #[test]
    fn test_apply_pixels() {
        let src = [[10u8, 20, 30, 40]; 5];
        let mut dst = [[0u8; 4]; 5];
        let t = ColorMatrixTransform::new(ColorMatrix::identity())
            .with_kernels(KernelSet::for_tier(Tier::Scalar).unwrap());
        t.apply_pixels(&src, &mut dst).unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn test_short_convolution_row() {
        let conv = Convolution3x3::new(Kernel3x3::identity());
        let row = [0u8; 16];
        let short = [0u8; 12];
        let mut dst = [0u8; 8];
        assert_eq!(
            conv.apply_row(&mut dst, [&row, &short, &row]),
            Err(Error::BufferSize {
                expected: 16,
                actual: 12
            })
        );
    }

    #[test]
    fn test_convolution_identity_row() {
        let center: Vec<u8> = (0..52).map(|i| (i * 5) as u8).collect();
        let other = vec![200u8; 52];
        let mut dst = vec![0u8; 36];
        Convolution5x5::new(Kernel5x5::identity())
            .apply_row(&mut dst, [&other, &other, &center, &other, &other])
            .unwrap();
        assert_eq!(&dst[..], &center[8..44]);
    }
}
