//! Fixed-point lane primitives and instruction tiers
//!
//! Every kernel in this crate is built from three lane operations:
//!
//! - **widen**: sign-extend the low four 16-bit lanes to 32-bit lanes
//! - **narrow**: saturate two vectors of 32-bit lanes into eight unsigned
//!   16-bit lanes
//! - **multiply-low**: lane-wise 32-bit multiply keeping the low half
//!
//! Supported tiers:
//! - x86/x86_64: SSE4.1 (native instructions), SSSE3 (emulated from
//!   shuffles, masks and 32x32->64 multiplies)
//! - any target: scalar reference
//!
//! All tiers are bit-identical. [`LaneOps`] exposes each tier's primitives on
//! plain arrays so that property can be checked directly.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod x86;

use crate::{Error, Result};
use std::fmt;
use std::sync::OnceLock;

/// Instruction capability tier used by the kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// SSE4.1: `pmovsxwd`, `packusdw` and `pmulld` are available
    Sse41,
    /// SSSE3: the three primitives are emulated with `pshufb` and `pmuludq`
    Ssse3,
    /// Portable per-pixel code, one lane at a time
    Scalar,
}

impl Tier {
    /// All tiers, best first
    pub const ALL: [Tier; 3] = [Tier::Sse41, Tier::Ssse3, Tier::Scalar];

    /// Best tier the running CPU supports
    pub fn detect() -> Tier {
        Self::ALL
            .into_iter()
            .find(|tier| tier.is_supported())
            .unwrap_or(Tier::Scalar)
    }

    /// Check whether this tier can execute on the running CPU
    pub fn is_supported(self) -> bool {
        match self {
            Tier::Sse41 => has_sse41(),
            Tier::Ssse3 => has_ssse3(),
            Tier::Scalar => true,
        }
    }

    /// Short human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Tier::Sse41 => "SSE4.1",
            Tier::Ssse3 => "SSSE3",
            Tier::Scalar => "scalar",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check if SSE4.1 is available at runtime
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn has_sse41() -> bool {
    is_x86_feature_detected!("sse4.1")
}

/// Check if SSSE3 is available at runtime
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn has_ssse3() -> bool {
    is_x86_feature_detected!("ssse3")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub fn has_sse41() -> bool {
    false
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub fn has_ssse3() -> bool {
    false
}

/// Tier chosen for this process, detected once
pub fn active_tier() -> Tier {
    static ACTIVE: OnceLock<Tier> = OnceLock::new();
    *ACTIVE.get_or_init(|| {
        let tier = Tier::detect();
        if tier == Tier::Scalar && cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            log::warn!("CPU lacks SSSE3, falling back to {tier} kernels");
        }
        log::debug!("selected lane tier: {tier}");
        tier
    })
}

// ============================================================================
// Scalar reference primitives
// ============================================================================

/// Sign-extend the low four 16-bit lanes to 32 bits
#[inline]
pub fn widen_i16_to_i32(x: [i16; 8]) -> [i32; 4] {
    [x[0] as i32, x[1] as i32, x[2] as i32, x[3] as i32]
}

/// Saturate each 32-bit lane to `[0, 65535]`, `lo` into lanes 0..4 and `hi`
/// into lanes 4..8
#[inline]
pub fn narrow_i32_to_u16_saturate(lo: [i32; 4], hi: [i32; 4]) -> [u16; 8] {
    let mut out = [0u16; 8];
    for (dst, &v) in out.iter_mut().zip(lo.iter().chain(hi.iter())) {
        *dst = v.clamp(0, u16::MAX as i32) as u16;
    }
    out
}

/// Saturate four vectors of 32-bit lanes all the way to unsigned bytes
#[inline]
pub fn narrow_i32_to_u8_saturate(a: [i32; 4], b: [i32; 4], c: [i32; 4], d: [i32; 4]) -> [u8; 16] {
    let lo = narrow_i32_to_u16_saturate(a, b);
    let hi = narrow_i32_to_u16_saturate(c, d);
    let mut out = [0u8; 16];
    for (dst, &v) in out.iter_mut().zip(lo.iter().chain(hi.iter())) {
        *dst = v.min(u8::MAX as u16) as u8;
    }
    out
}

/// Lane-wise multiply keeping the low 32 bits of each product
#[inline]
pub fn multiply_i32_lanes_low(a: [i32; 4], b: [i32; 4]) -> [i32; 4] {
    [
        a[0].wrapping_mul(b[0]),
        a[1].wrapping_mul(b[1]),
        a[2].wrapping_mul(b[2]),
        a[3].wrapping_mul(b[3]),
    ]
}

// ============================================================================
// Array-level access to every tier
// ============================================================================

type WidenFn = unsafe fn([i16; 8]) -> [i32; 4];
type NarrowFn = unsafe fn([i32; 4], [i32; 4]) -> [u16; 8];
type NarrowU8Fn = unsafe fn([[i32; 4]; 4]) -> [u8; 16];
type MultiplyFn = unsafe fn([i32; 4], [i32; 4]) -> [i32; 4];

/// The lane primitives of one tier, callable on plain arrays
#[derive(Clone, Copy)]
pub struct LaneOps {
    tier: Tier,
    widen: WidenFn,
    narrow: NarrowFn,
    narrow_u8: NarrowU8Fn,
    multiply: MultiplyFn,
}

impl fmt::Debug for LaneOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaneOps").field("tier", &self.tier).finish()
    }
}

impl LaneOps {
    /// Primitives for `tier`, failing if the CPU cannot run it
    pub fn for_tier(tier: Tier) -> Result<Self> {
        if !tier.is_supported() {
            return Err(Error::UnsupportedTier(tier));
        }
        Ok(match tier {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Tier::Sse41 => Self {
                tier,
                widen: x86::widen_array_sse41,
                narrow: x86::narrow_array_sse41,
                narrow_u8: x86::narrow_u8_array_sse41,
                multiply: x86::multiply_array_sse41,
            },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Tier::Ssse3 => Self {
                tier,
                widen: x86::widen_array_ssse3,
                narrow: x86::narrow_array_ssse3,
                narrow_u8: x86::narrow_u8_array_ssse3,
                multiply: x86::multiply_array_ssse3,
            },
            _ => Self {
                tier: Tier::Scalar,
                widen: scalar_widen,
                narrow: scalar_narrow,
                narrow_u8: scalar_narrow_u8,
                multiply: scalar_multiply,
            },
        })
    }

    /// Tier these primitives belong to
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Sign-extend the low four 16-bit lanes
    pub fn widen_i16_to_i32(&self, x: [i16; 8]) -> [i32; 4] {
        // SAFETY: `for_tier` only hands out functions the CPU supports
        unsafe { (self.widen)(x) }
    }

    /// Saturate two vectors of 32-bit lanes to unsigned words
    pub fn narrow_i32_to_u16_saturate(&self, lo: [i32; 4], hi: [i32; 4]) -> [u16; 8] {
        // SAFETY: see `widen_i16_to_i32`
        unsafe { (self.narrow)(lo, hi) }
    }

    /// Saturate four vectors of 32-bit lanes to unsigned bytes
    pub fn narrow_i32_to_u8_saturate(
        &self,
        a: [i32; 4],
        b: [i32; 4],
        c: [i32; 4],
        d: [i32; 4],
    ) -> [u8; 16] {
        // SAFETY: see `widen_i16_to_i32`
        unsafe { (self.narrow_u8)([a, b, c, d]) }
    }

    /// Lane-wise multiply keeping the low 32 bits
    pub fn multiply_i32_lanes_low(&self, a: [i32; 4], b: [i32; 4]) -> [i32; 4] {
        // SAFETY: see `widen_i16_to_i32`
        unsafe { (self.multiply)(a, b) }
    }
}

unsafe fn scalar_widen(x: [i16; 8]) -> [i32; 4] {
    widen_i16_to_i32(x)
}

unsafe fn scalar_narrow(lo: [i32; 4], hi: [i32; 4]) -> [u16; 8] {
    narrow_i32_to_u16_saturate(lo, hi)
}

unsafe fn scalar_narrow_u8(lanes: [[i32; 4]; 4]) -> [u8; 16] {
    let [a, b, c, d] = lanes;
    narrow_i32_to_u8_saturate(a, b, c, d)
}

unsafe fn scalar_multiply(a: [i32; 4], b: [i32; 4]) -> [i32; 4] {
    multiply_i32_lanes_low(a, b)
}
