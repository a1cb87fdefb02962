//! Vector color-matrix kernels, four pixels per batch
//!
//! A batch is loaded as 16 bytes, split into one 32-bit-lane vector per
//! channel, multiplied against the splatted coefficients, shifted, saturated
//! and transposed back to pixel order.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::lanes::x86::{LanePrimitives, Sse41, Ssse3};
use crate::types::Q8_SHIFT;
use std::ptr;

/// Pixels per batch
const BATCH: usize = 4;

/// Constants loaded once per call
struct Setup {
    /// `pshufb` masks extracting channel `c` of each pixel into a dword
    channels: [__m128i; 4],
    /// Channel-major bytes back to pixel-major
    transpose: __m128i,
    /// `coef[out][in]` splatted across all four lanes
    coef: [[__m128i; 4]; 4],
}

impl Setup {
    #[inline(always)]
    unsafe fn new<L: LanePrimitives>(coef: &[i16; 16]) -> Self {
        unsafe {
            let mut splat = [[_mm_setzero_si128(); 4]; 4];
            for (out, row) in splat.iter_mut().enumerate() {
                let widened =
                    L::widen_i16_to_i32(_mm_loadl_epi64(coef.as_ptr().add(out * 4).cast()));
                row[0] = _mm_shuffle_epi32(widened, 0x00);
                row[1] = _mm_shuffle_epi32(widened, 0x55);
                row[2] = _mm_shuffle_epi32(widened, 0xaa);
                row[3] = _mm_shuffle_epi32(widened, 0xff);
            }

            let mut channels = [_mm_setzero_si128(); 4];
            for (c, mask) in channels.iter_mut().enumerate() {
                let c = c as i8;
                *mask = _mm_set_epi8(
                    -1, -1, -1, 12 + c, -1, -1, -1, 8 + c, -1, -1, -1, 4 + c, -1, -1, -1, c,
                );
            }

            Self {
                channels,
                transpose: _mm_set_epi8(15, 11, 7, 3, 14, 10, 6, 2, 13, 9, 5, 1, 12, 8, 4, 0),
                coef: splat,
            }
        }
    }

    #[inline(always)]
    unsafe fn deinterleave(&self, px: __m128i) -> [__m128i; 4] {
        unsafe {
            [
                _mm_shuffle_epi8(px, self.channels[0]),
                _mm_shuffle_epi8(px, self.channels[1]),
                _mm_shuffle_epi8(px, self.channels[2]),
                _mm_shuffle_epi8(px, self.channels[3]),
            ]
        }
    }

    /// `(sum_{k < inputs} channel[k] * coef[out][k]) >> 8`
    #[inline(always)]
    unsafe fn project<L: LanePrimitives>(
        &self,
        out: usize,
        channel: &[__m128i; 4],
        inputs: usize,
    ) -> __m128i {
        unsafe {
            let row = &self.coef[out];
            let mut acc = L::multiply_i32_lanes_low(channel[0], row[0]);
            for k in 1..inputs {
                acc = _mm_add_epi32(acc, L::multiply_i32_lanes_low(channel[k], row[k]));
            }
            _mm_srai_epi32(acc, Q8_SHIFT)
        }
    }

    #[inline(always)]
    unsafe fn interleave<L: LanePrimitives>(
        &self,
        x: __m128i,
        y: __m128i,
        z: __m128i,
        w: __m128i,
    ) -> __m128i {
        unsafe { _mm_shuffle_epi8(L::narrow_i32_to_u8_saturate(x, y, z, w), self.transpose) }
    }
}

/// Per-variant batch body
trait MatrixBatch {
    unsafe fn apply<L: LanePrimitives>(setup: &Setup, px: __m128i) -> __m128i;
}

struct Full;
struct Rgb;
struct Luma;

impl MatrixBatch for Full {
    #[inline(always)]
    unsafe fn apply<L: LanePrimitives>(setup: &Setup, px: __m128i) -> __m128i {
        unsafe {
            let ch = setup.deinterleave(px);
            setup.interleave::<L>(
                setup.project::<L>(0, &ch, 4),
                setup.project::<L>(1, &ch, 4),
                setup.project::<L>(2, &ch, 4),
                setup.project::<L>(3, &ch, 4),
            )
        }
    }
}

impl MatrixBatch for Rgb {
    #[inline(always)]
    unsafe fn apply<L: LanePrimitives>(setup: &Setup, px: __m128i) -> __m128i {
        unsafe {
            let ch = setup.deinterleave(px);
            setup.interleave::<L>(
                setup.project::<L>(0, &ch, 3),
                setup.project::<L>(1, &ch, 3),
                setup.project::<L>(2, &ch, 3),
                ch[3],
            )
        }
    }
}

impl MatrixBatch for Luma {
    #[inline(always)]
    unsafe fn apply<L: LanePrimitives>(setup: &Setup, px: __m128i) -> __m128i {
        unsafe {
            let ch = setup.deinterleave(px);
            let luma = setup.project::<L>(0, &ch, 3);
            setup.interleave::<L>(luma, luma, luma, ch[3])
        }
    }
}

#[inline(always)]
unsafe fn color_matrix<L: LanePrimitives, B: MatrixBatch>(
    dst: *mut u8,
    src: *const u8,
    coef: &[i16; 16],
    count: usize,
) {
    unsafe {
        let setup = Setup::new::<L>(coef);

        let mut i = 0;
        while i + BATCH <= count {
            let px = _mm_loadu_si128(src.add(i * 4).cast());
            _mm_storeu_si128(dst.add(i * 4).cast(), B::apply::<L>(&setup, px));
            i += BATCH;
        }

        let rest = count - i;
        if rest > 0 {
            let mut staged = [0u8; BATCH * 4];
            ptr::copy_nonoverlapping(src.add(i * 4), staged.as_mut_ptr(), rest * 4);
            let out = B::apply::<L>(&setup, _mm_loadu_si128(staged.as_ptr().cast()));
            _mm_storeu_si128(staged.as_mut_ptr().cast(), out);
            ptr::copy_nonoverlapping(staged.as_ptr(), dst.add(i * 4), rest * 4);
        }
    }
}

macro_rules! tier_entry {
    ($name:ident, $feature:literal, $lanes:ty, $batch:ty) => {
        /// # Safety
        ///
        /// The CPU must support the named feature; `src` and `dst` must hold
        /// `count` pixels and `dst` may only equal or trail `src`.
        #[target_feature(enable = $feature)]
        pub unsafe fn $name(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
            unsafe { color_matrix::<$lanes, $batch>(dst, src, coef, count) }
        }
    };
}

tier_entry!(color_matrix_4x4_sse41, "sse4.1", Sse41, Full);
tier_entry!(color_matrix_3x3_sse41, "sse4.1", Sse41, Rgb);
tier_entry!(color_matrix_dot_sse41, "sse4.1", Sse41, Luma);
tier_entry!(color_matrix_4x4_ssse3, "ssse3", Ssse3, Full);
tier_entry!(color_matrix_3x3_ssse3, "ssse3", Ssse3, Rgb);
tier_entry!(color_matrix_dot_ssse3, "ssse3", Ssse3, Luma);
