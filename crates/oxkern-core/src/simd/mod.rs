//! SSE4.1/SSSE3 kernels
//!
//! Every kernel has one generic body over
//! [`LanePrimitives`](crate::lanes::x86::LanePrimitives) and one
//! `#[target_feature]` entry point per tier. Callers pick the tier with
//! [`crate::kernels::KernelSet`]; calling an entry point directly requires
//! checking the CPU first.

mod color_matrix;
mod convolve;

pub use color_matrix::{
    color_matrix_3x3_sse41, color_matrix_3x3_ssse3, color_matrix_4x4_sse41,
    color_matrix_4x4_ssse3, color_matrix_dot_sse41, color_matrix_dot_ssse3,
};
pub use convolve::{convolve_3x3_sse41, convolve_3x3_ssse3, convolve_5x5_sse41, convolve_5x5_ssse3};
