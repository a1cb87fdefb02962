//! SSE4.1 and SSSE3 implementations of the lane primitives
//!
//! Kernels are written once against [`LanePrimitives`] and instantiated per
//! tier inside a `#[target_feature]` wrapper, so the trait methods inline into
//! code compiled for the matching instruction set.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::Tier;

/// Fixed-point vector operations shared by every kernel
///
/// # Safety
///
/// Implementations may only be called from code compiled with (or running on
/// a CPU supporting) the features of [`LanePrimitives::TIER`].
pub trait LanePrimitives {
    /// Tier this implementation requires
    const TIER: Tier;

    /// Sign-extend the low four 16-bit lanes of `x` into 32-bit lanes
    unsafe fn widen_i16_to_i32(x: __m128i) -> __m128i;

    /// Saturate 32-bit lanes to `[0, 65535]`; `lo` fills the low four 16-bit
    /// lanes of the result and `hi` the high four
    unsafe fn narrow_i32_to_u16_saturate(lo: __m128i, hi: __m128i) -> __m128i;

    /// Lane-wise 32-bit multiply keeping the low 32 bits of each product
    unsafe fn multiply_i32_lanes_low(a: __m128i, b: __m128i) -> __m128i;

    /// Saturate sixteen 32-bit lanes to unsigned bytes, in order `a, b, c, d`
    #[inline(always)]
    unsafe fn narrow_i32_to_u8_saturate(
        a: __m128i,
        b: __m128i,
        c: __m128i,
        d: __m128i,
    ) -> __m128i {
        unsafe {
            // packuswb reads signed words, so words above 32767 must be
            // clamped to 255 first or they pack to 0.
            let max = _mm_set1_epi16(255);
            let lo = Self::narrow_i32_to_u16_saturate(a, b);
            let hi = Self::narrow_i32_to_u16_saturate(c, d);
            let lo = _mm_subs_epu16(lo, _mm_subs_epu16(lo, max));
            let hi = _mm_subs_epu16(hi, _mm_subs_epu16(hi, max));
            _mm_packus_epi16(lo, hi)
        }
    }
}

/// Native SSE4.1 instructions
#[derive(Debug, Clone, Copy)]
pub struct Sse41;

impl LanePrimitives for Sse41 {
    const TIER: Tier = Tier::Sse41;

    #[inline(always)]
    unsafe fn widen_i16_to_i32(x: __m128i) -> __m128i {
        unsafe { _mm_cvtepi16_epi32(x) }
    }

    #[inline(always)]
    unsafe fn narrow_i32_to_u16_saturate(lo: __m128i, hi: __m128i) -> __m128i {
        unsafe { _mm_packus_epi32(lo, hi) }
    }

    #[inline(always)]
    unsafe fn multiply_i32_lanes_low(a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_mullo_epi32(a, b) }
    }
}

/// SSSE3 emulation of the SSE4.1 instructions
#[derive(Debug, Clone, Copy)]
pub struct Ssse3;

impl LanePrimitives for Ssse3 {
    const TIER: Tier = Tier::Ssse3;

    #[inline(always)]
    unsafe fn widen_i16_to_i32(x: __m128i) -> __m128i {
        unsafe {
            // word i -> low half of dword i, high half zeroed
            let spread = _mm_set_epi8(-1, -1, 7, 6, -1, -1, 5, 4, -1, -1, 3, 2, -1, -1, 1, 0);
            let x = _mm_shuffle_epi8(x, spread);
            let x = _mm_slli_epi32(x, 16);
            _mm_srai_epi32(x, 16)
        }
    }

    #[inline(always)]
    unsafe fn narrow_i32_to_u16_saturate(lo: __m128i, hi: __m128i) -> __m128i {
        unsafe {
            let zero = _mm_setzero_si128();
            let max = _mm_set1_epi32(0xffff);
            let low_words = _mm_set_epi8(-1, -1, -1, -1, -1, -1, -1, -1, 13, 12, 9, 8, 5, 4, 1, 0);
            let high_words = _mm_set_epi8(13, 12, 9, 8, 5, 4, 1, 0, -1, -1, -1, -1, -1, -1, -1, -1);

            // Negative lanes become 0, lanes above 65535 become all ones and
            // their low word reads back as 65535.
            let lo = _mm_andnot_si128(_mm_cmpgt_epi32(zero, lo), lo);
            let lo = _mm_or_si128(lo, _mm_cmpgt_epi32(lo, max));
            let hi = _mm_andnot_si128(_mm_cmpgt_epi32(zero, hi), hi);
            let hi = _mm_or_si128(hi, _mm_cmpgt_epi32(hi, max));

            _mm_or_si128(
                _mm_shuffle_epi8(lo, low_words),
                _mm_shuffle_epi8(hi, high_words),
            )
        }
    }

    #[inline(always)]
    unsafe fn multiply_i32_lanes_low(a: __m128i, b: __m128i) -> __m128i {
        unsafe {
            let even_lanes = _mm_set_epi32(0, -1, 0, -1);
            // pmuludq only reads lanes 0 and 2; the low 32 bits of an
            // unsigned product equal those of the signed one.
            let even = _mm_mul_epu32(a, b);
            let odd = _mm_mul_epu32(_mm_srli_si128(a, 4), _mm_srli_si128(b, 4));
            let even = _mm_and_si128(even, even_lanes);
            let odd = _mm_and_si128(odd, even_lanes);
            _mm_or_si128(even, _mm_slli_si128(odd, 4))
        }
    }
}

#[inline(always)]
unsafe fn widen_array<L: LanePrimitives>(x: [i16; 8]) -> [i32; 4] {
    let mut out = [0i32; 4];
    unsafe {
        let v = _mm_loadu_si128(x.as_ptr().cast());
        _mm_storeu_si128(out.as_mut_ptr().cast(), L::widen_i16_to_i32(v));
    }
    out
}

#[inline(always)]
unsafe fn narrow_array<L: LanePrimitives>(lo: [i32; 4], hi: [i32; 4]) -> [u16; 8] {
    let mut out = [0u16; 8];
    unsafe {
        let lo = _mm_loadu_si128(lo.as_ptr().cast());
        let hi = _mm_loadu_si128(hi.as_ptr().cast());
        _mm_storeu_si128(
            out.as_mut_ptr().cast(),
            L::narrow_i32_to_u16_saturate(lo, hi),
        );
    }
    out
}

#[inline(always)]
unsafe fn narrow_u8_array<L: LanePrimitives>(lanes: [[i32; 4]; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    unsafe {
        let a = _mm_loadu_si128(lanes[0].as_ptr().cast());
        let b = _mm_loadu_si128(lanes[1].as_ptr().cast());
        let c = _mm_loadu_si128(lanes[2].as_ptr().cast());
        let d = _mm_loadu_si128(lanes[3].as_ptr().cast());
        _mm_storeu_si128(
            out.as_mut_ptr().cast(),
            L::narrow_i32_to_u8_saturate(a, b, c, d),
        );
    }
    out
}

#[inline(always)]
unsafe fn multiply_array<L: LanePrimitives>(a: [i32; 4], b: [i32; 4]) -> [i32; 4] {
    let mut out = [0i32; 4];
    unsafe {
        let a = _mm_loadu_si128(a.as_ptr().cast());
        let b = _mm_loadu_si128(b.as_ptr().cast());
        _mm_storeu_si128(out.as_mut_ptr().cast(), L::multiply_i32_lanes_low(a, b));
    }
    out
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn widen_array_sse41(x: [i16; 8]) -> [i32; 4] {
    unsafe { widen_array::<Sse41>(x) }
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn narrow_array_sse41(lo: [i32; 4], hi: [i32; 4]) -> [u16; 8] {
    unsafe { narrow_array::<Sse41>(lo, hi) }
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn narrow_u8_array_sse41(lanes: [[i32; 4]; 4]) -> [u8; 16] {
    unsafe { narrow_u8_array::<Sse41>(lanes) }
}

#[target_feature(enable = "sse4.1")]
pub(crate) unsafe fn multiply_array_sse41(a: [i32; 4], b: [i32; 4]) -> [i32; 4] {
    unsafe { multiply_array::<Sse41>(a, b) }
}

#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn widen_array_ssse3(x: [i16; 8]) -> [i32; 4] {
    unsafe { widen_array::<Ssse3>(x) }
}

#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn narrow_array_ssse3(lo: [i32; 4], hi: [i32; 4]) -> [u16; 8] {
    unsafe { narrow_array::<Ssse3>(lo, hi) }
}

#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn narrow_u8_array_ssse3(lanes: [[i32; 4]; 4]) -> [u8; 16] {
    unsafe { narrow_u8_array::<Ssse3>(lanes) }
}

#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn multiply_array_ssse3(a: [i32; 4], b: [i32; 4]) -> [i32; 4] {
    unsafe { multiply_array::<Ssse3>(a, b) }
}
