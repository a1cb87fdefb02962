//! Error types for oxkern
//!
//! The raw kernels never fail at runtime; these errors come from the
//! slice-validating API in [`crate::transform`] and from tier selection.

use crate::lanes::Tier;
use thiserror::Error;

/// Result type for oxkern operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in oxkern operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Buffer size mismatch
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Byte length does not hold a whole number of RGBA8 pixels
    #[error("Buffer of {len} bytes is not a whole number of 4-byte pixels")]
    PixelStride { len: usize },

    /// The requested instruction tier cannot run on this CPU
    #[error("Instruction tier {0} is not supported on this CPU")]
    UnsupportedTier(Tier),
}
