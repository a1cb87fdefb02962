//! Vector convolution kernels, four adjacent output pixels per batch
//!
//! Each tap loads the 16 bytes starting at its horizontal offset, so the
//! four output pixels share every load of the row. Pixels stay interleaved:
//! the kernel weight is the same for all channels, so no transpose is needed.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::lanes::x86::{LanePrimitives, Sse41, Ssse3};
use crate::types::Q8_SHIFT;
use std::ptr;

/// Output pixels per batch
const BATCH: usize = 4;

/// Staging row for the tail: a batch plus the widest (5x5) apron
const STAGED_BYTES: usize = (BATCH + 4) * 4;

/// Four RGBA8 pixels as four vectors of 32-bit channel lanes
#[inline(always)]
unsafe fn widen_pixels<L: LanePrimitives>(v: __m128i) -> [__m128i; 4] {
    unsafe {
        let zero = _mm_setzero_si128();
        let lo = _mm_unpacklo_epi8(v, zero);
        let hi = _mm_unpackhi_epi8(v, zero);
        [
            L::widen_i16_to_i32(lo),
            L::widen_i16_to_i32(_mm_srli_si128(lo, 8)),
            L::widen_i16_to_i32(hi),
            L::widen_i16_to_i32(_mm_srli_si128(hi, 8)),
        ]
    }
}

#[inline(always)]
unsafe fn convolve_batch<L: LanePrimitives, const K: usize>(
    rows: &[*const u8; K],
    coef: &[[__m128i; K]; K],
    x: usize,
) -> __m128i {
    unsafe {
        let mut acc = [_mm_setzero_si128(); BATCH];
        for (row, weights) in rows.iter().zip(coef.iter()) {
            for (dx, &weight) in weights.iter().enumerate() {
                let window = _mm_loadu_si128(row.add((x + dx) * 4).cast());
                let px = widen_pixels::<L>(window);
                for (a, p) in acc.iter_mut().zip(px) {
                    *a = _mm_add_epi32(*a, L::multiply_i32_lanes_low(p, weight));
                }
            }
        }
        L::narrow_i32_to_u8_saturate(
            _mm_srai_epi32(acc[0], Q8_SHIFT),
            _mm_srai_epi32(acc[1], Q8_SHIFT),
            _mm_srai_epi32(acc[2], Q8_SHIFT),
            _mm_srai_epi32(acc[3], Q8_SHIFT),
        )
    }
}

#[inline(always)]
unsafe fn convolve<L: LanePrimitives, const K: usize>(
    dst: *mut u8,
    rows: [*const u8; K],
    coef: &[i16],
    count: usize,
) {
    unsafe {
        let mut splat = [[_mm_setzero_si128(); K]; K];
        for (dy, row) in splat.iter_mut().enumerate() {
            for (dx, w) in row.iter_mut().enumerate() {
                *w = _mm_set1_epi32(coef[dy * K + dx] as i32);
            }
        }

        let mut x = 0;
        while x + BATCH <= count {
            let out = convolve_batch::<L, K>(&rows, &splat, x);
            _mm_storeu_si128(dst.add(x * 4).cast(), out);
            x += BATCH;
        }

        let rest = count - x;
        if rest > 0 {
            let mut staged = [[0u8; STAGED_BYTES]; K];
            let mut staged_rows = [ptr::null::<u8>(); K];
            for ((buf, staged_row), row) in staged.iter_mut().zip(staged_rows.iter_mut()).zip(rows) {
                ptr::copy_nonoverlapping(row.add(x * 4), buf.as_mut_ptr(), (rest + K - 1) * 4);
                *staged_row = buf.as_ptr();
            }
            let out = convolve_batch::<L, K>(&staged_rows, &splat, 0);
            let mut tail = [0u8; BATCH * 4];
            _mm_storeu_si128(tail.as_mut_ptr().cast(), out);
            ptr::copy_nonoverlapping(tail.as_ptr(), dst.add(x * 4), rest * 4);
        }
    }
}

macro_rules! tier_entry {
    ($name:ident, $feature:literal, $lanes:ty, $k:literal) => {
        /// # Safety
        ///
        /// The CPU must support the named feature; `dst` must hold `count`
        /// pixels, each row `count + K - 1` pixels, and `dst` must not overlap
        /// any row.
        #[target_feature(enable = $feature)]
        pub unsafe fn $name(
            dst: *mut u8,
            rows: [*const u8; $k],
            coef: &[i16; $k * $k],
            count: usize,
        ) {
            unsafe { convolve::<$lanes, $k>(dst, rows, coef, count) }
        }
    };
}

tier_entry!(convolve_3x3_sse41, "sse4.1", Sse41, 3);
tier_entry!(convolve_5x5_sse41, "sse4.1", Sse41, 5);
tier_entry!(convolve_3x3_ssse3, "ssse3", Ssse3, 3);
tier_entry!(convolve_5x5_ssse3, "ssse3", Ssse3, 5);
