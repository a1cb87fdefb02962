//! # oxkern - fixed-point pixel kernels
//!
//! Per-row numeric kernels for RGBA8 images:
//!
//! - **Color matrix**: 4x4, 3x3 (fourth channel passed through) and dot
//!   (one projection broadcast to three channels) transforms
//! - **Convolution**: 3x3 and 5x5 spatial kernels applied per channel
//!
//! All coefficients are Q8 fixed point (`1.0 == 256`). Every kernel
//! accumulates in `i32`, shifts right by 8 (flooring) and saturates to
//! `[0, 255]`, giving the same bytes on every instruction tier:
//!
//! ```text
//! out = clamp_u8((sum coef * channel) >> 8)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use oxkern_core::{ColorMatrix, ColorMatrixTransform};
//!
//! let mut pixels = [200u8, 50, 10, 255, 0, 128, 255, 64];
//! ColorMatrixTransform::new(ColorMatrix::greyscale())
//!     .apply_in_place(&mut pixels)
//!     .unwrap();
//! assert_eq!(pixels[3], 255);
//! assert_eq!(pixels[0], pixels[1]);
//! ```
//!
//! Boundary handling, tiling and threading belong to the caller: each call
//! works on one row (or a band of rows for convolution) and keeps no state.

pub mod error;
pub mod kernels;
pub mod lanes;
pub mod scalar;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod simd;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
pub use kernels::{
    KernelSet, color_matrix_3x3, color_matrix_4x4, color_matrix_dot, convolve_3x3, convolve_5x5,
    kernels,
};
pub use lanes::{LaneOps, Tier, active_tier};
pub use transform::{ColorMatrixTransform, Convolution3x3, Convolution5x5};
pub use types::{ColorMatrix, Kernel3x3, Kernel5x5, MatrixVariant, Pixel, Q8_ONE, to_q8};

/// Version of oxkern
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
