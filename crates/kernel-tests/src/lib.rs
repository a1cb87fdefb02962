//! # kernel-tests
//!
//! Parity testing for oxkern.
//!
//! This crate provides:
//! - Reference formulas written directly from the per-pixel definitions,
//!   sharing no code with the kernels
//! - Deterministic random rows, matrices and kernels
//! - Helpers to run every supported tier over the same input
//!
//! ## Test Categories
//!
//! 1. **Primitive equivalence**: widen / narrow / multiply-low per tier
//! 2. **Color matrix**: identity, reference parity, pass-through rules
//! 3. **Convolution**: identity, reference parity, negative accumulations
//! 4. **Batch independence**: whole-row vs one-pixel calls
//! 5. **Concurrency**: disjoint rows on many threads

pub mod patterns;
pub mod reference;

use oxkern_core::{KernelSet, Tier};

/// Kernel sets for every tier the running CPU supports
pub fn supported_kernel_sets() -> Vec<KernelSet> {
    Tier::ALL
        .into_iter()
        .filter_map(|tier| KernelSet::for_tier(tier).ok())
        .collect()
}
