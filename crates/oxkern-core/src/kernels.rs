//! Kernel selection and raw row entry points
//!
//! A [`KernelSet`] is the table of kernel functions for one [`Tier`]. The
//! process-wide set is chosen once from the running CPU; explicit sets can
//! be built for testing and benchmarking.
//!
//! # Safety contract of the raw entry points
//!
//! Nothing is checked at runtime:
//! - color matrix: `src` and `dst` hold `count` pixels; `dst` may equal
//!   `src` or trail it, but must not lead it
//! - convolution: `dst` holds `count` pixels; row `r` starts `K / 2` pixels
//!   left of the first output pixel and holds `count + K - 1` pixels; `dst`
//!   overlaps no row

use crate::lanes::{self, Tier};
use crate::scalar;
use crate::types::MatrixVariant;
use crate::{Error, Result};
use std::fmt;
use std::sync::OnceLock;

/// Color-matrix row kernel: `(dst, src, coef, count)`
pub type ColorMatrixFn = unsafe fn(*mut u8, *const u8, &[i16; 16], usize);

/// 3x3 convolution row kernel: `(dst, rows, coef, count)`
pub type Convolve3x3Fn = unsafe fn(*mut u8, [*const u8; 3], &[i16; 9], usize);

/// 5x5 convolution row kernel: `(dst, rows, coef, count)`
pub type Convolve5x5Fn = unsafe fn(*mut u8, [*const u8; 5], &[i16; 25], usize);

/// The kernels of one instruction tier
#[derive(Clone, Copy)]
pub struct KernelSet {
    tier: Tier,
    color_matrix_4x4: ColorMatrixFn,
    color_matrix_3x3: ColorMatrixFn,
    color_matrix_dot: ColorMatrixFn,
    convolve_3x3: Convolve3x3Fn,
    convolve_5x5: Convolve5x5Fn,
}

impl fmt::Debug for KernelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelSet").field("tier", &self.tier).finish()
    }
}

impl KernelSet {
    /// Kernels for `tier`
    ///
    /// Fails with [`Error::UnsupportedTier`] when the CPU cannot run it.
    pub fn for_tier(tier: Tier) -> Result<Self> {
        if !tier.is_supported() {
            return Err(Error::UnsupportedTier(tier));
        }
        log::debug!("building {tier} kernel set");
        Ok(Self::build(tier))
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn build(tier: Tier) -> Self {
        use crate::simd;
        match tier {
            Tier::Sse41 => Self {
                tier,
                color_matrix_4x4: simd::color_matrix_4x4_sse41,
                color_matrix_3x3: simd::color_matrix_3x3_sse41,
                color_matrix_dot: simd::color_matrix_dot_sse41,
                convolve_3x3: simd::convolve_3x3_sse41,
                convolve_5x5: simd::convolve_5x5_sse41,
            },
            Tier::Ssse3 => Self {
                tier,
                color_matrix_4x4: simd::color_matrix_4x4_ssse3,
                color_matrix_3x3: simd::color_matrix_3x3_ssse3,
                color_matrix_dot: simd::color_matrix_dot_ssse3,
                convolve_3x3: simd::convolve_3x3_ssse3,
                convolve_5x5: simd::convolve_5x5_ssse3,
            },
            Tier::Scalar => Self::scalar(),
        }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn build(_tier: Tier) -> Self {
        Self::scalar()
    }

    fn scalar() -> Self {
        Self {
            tier: Tier::Scalar,
            color_matrix_4x4: scalar::color_matrix_4x4,
            color_matrix_3x3: scalar::color_matrix_3x3,
            color_matrix_dot: scalar::color_matrix_dot,
            convolve_3x3: scalar::convolve_3x3,
            convolve_5x5: scalar::convolve_5x5,
        }
    }

    /// Tier these kernels run on
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Color-matrix kernel for `variant`
    pub fn color_matrix_fn(&self, variant: MatrixVariant) -> ColorMatrixFn {
        match variant {
            MatrixVariant::Mat4x4 => self.color_matrix_4x4,
            MatrixVariant::Mat3x3 => self.color_matrix_3x3,
            MatrixVariant::Dot => self.color_matrix_dot,
        }
    }

    /// Full 4x4 transform of `count` pixels
    ///
    /// # Safety
    ///
    /// See the [module documentation](self).
    #[inline]
    pub unsafe fn color_matrix_4x4(
        &self,
        dst: *mut u8,
        src: *const u8,
        coef: &[i16; 16],
        count: usize,
    ) {
        unsafe { (self.color_matrix_4x4)(dst, src, coef, count) }
    }

    /// 3x3 transform of the first three channels, fourth copied
    ///
    /// # Safety
    ///
    /// See the [module documentation](self).
    #[inline]
    pub unsafe fn color_matrix_3x3(
        &self,
        dst: *mut u8,
        src: *const u8,
        coef: &[i16; 16],
        count: usize,
    ) {
        unsafe { (self.color_matrix_3x3)(dst, src, coef, count) }
    }

    /// First coefficient row broadcast to three channels, fourth copied
    ///
    /// # Safety
    ///
    /// See the [module documentation](self).
    #[inline]
    pub unsafe fn color_matrix_dot(
        &self,
        dst: *mut u8,
        src: *const u8,
        coef: &[i16; 16],
        count: usize,
    ) {
        unsafe { (self.color_matrix_dot)(dst, src, coef, count) }
    }

    /// # Safety
    ///
    /// See the [module documentation](self).
    #[inline]
    pub unsafe fn convolve_3x3(
        &self,
        dst: *mut u8,
        rows: [*const u8; 3],
        coef: &[i16; 9],
        count: usize,
    ) {
        unsafe { (self.convolve_3x3)(dst, rows, coef, count) }
    }

    /// # Safety
    ///
    /// See the [module documentation](self).
    #[inline]
    pub unsafe fn convolve_5x5(
        &self,
        dst: *mut u8,
        rows: [*const u8; 5],
        coef: &[i16; 25],
        count: usize,
    ) {
        unsafe { (self.convolve_5x5)(dst, rows, coef, count) }
    }
}

/// Kernels for [`lanes::active_tier`], built once per process
pub fn kernels() -> &'static KernelSet {
    static KERNELS: OnceLock<KernelSet> = OnceLock::new();
    KERNELS.get_or_init(|| {
        let tier = lanes::active_tier();
        KernelSet::for_tier(tier).unwrap_or_else(|_| KernelSet::scalar())
    })
}

/// Full 4x4 color matrix over `count` pixels with the process-wide kernels
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn color_matrix_4x4(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
    unsafe { kernels().color_matrix_4x4(dst, src, coef, count) }
}

/// 3x3 color matrix with the fourth channel passed through
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn color_matrix_3x3(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
    unsafe { kernels().color_matrix_3x3(dst, src, coef, count) }
}

/// Single-row projection broadcast to three channels, fourth passed through
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn color_matrix_dot(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
    unsafe { kernels().color_matrix_dot(dst, src, coef, count) }
}

/// 3x3 convolution of one output row
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn convolve_3x3(dst: *mut u8, rows: [*const u8; 3], coef: &[i16; 9], count: usize) {
    unsafe { kernels().convolve_3x3(dst, rows, coef, count) }
}

/// 5x5 convolution of one output row
///
/// # Safety
///
/// See the [module documentation](self).
pub unsafe fn convolve_5x5(dst: *mut u8, rows: [*const u8; 5], coef: &[i16; 25], count: usize) {
    unsafe { kernels().convolve_5x5(dst, rows, coef, count) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_kernels_match_active_tier() {
        assert_eq!(kernels().tier(), lanes::active_tier());
    }

    #[test]
    fn test_unsupported_tier_rejected() {
        for tier in Tier::ALL {
            match KernelSet::for_tier(tier) {
                Ok(set) => assert_eq!(set.tier(), tier),
                Err(err) => {
                    assert!(!tier.is_supported());
                    assert_eq!(err, Error::UnsupportedTier(tier));
                }
            }
        }
    }

    #[test]
    fn test_blue_extraction_every_tier() {
        let mut coef = [0i16; 16];
        coef[2] = 256;
        coef[6] = 256;
        coef[10] = 256;
        let src = [200u8, 50, 10, 255];
        for tier in Tier::ALL {
            let Ok(set) = KernelSet::for_tier(tier) else {
                continue;
            };
            let mut dst = [0u8; 4];
            unsafe { set.color_matrix_3x3(dst.as_mut_ptr(), src.as_ptr(), &coef, 1) };
            assert_eq!(dst, [10, 10, 10, 255], "tier {tier}");
        }
    }

    #[test]
    fn test_zero_count_writes_nothing() {
        let coef = [0i16; 16];
        let src = [1u8; 4];
        let mut dst = [7u8; 4];
        unsafe { color_matrix_4x4(dst.as_mut_ptr(), src.as_ptr(), &coef, 0) };
        assert_eq!(dst, [7; 4]);
    }
}
