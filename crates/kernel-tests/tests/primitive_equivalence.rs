//! Lane primitive equivalence
//!
//! Every supported tier must produce the same bits as the scalar reference
//! for widen, both narrow-saturate stages and multiply-low, on boundary
//! values and on
//! random lanes.

use kernel_tests::patterns::{i16_lane_vectors, i32_lane_vectors};
use oxkern_core::lanes::{self, LaneOps, Tier};

fn supported_ops() -> Vec<LaneOps> {
    Tier::ALL
        .into_iter()
        .filter_map(|tier| LaneOps::for_tier(tier).ok())
        .collect()
}

#[test]
fn widen_matches_reference() {
    for ops in supported_ops() {
        for x in i16_lane_vectors(1, 2000) {
            assert_eq!(
                ops.widen_i16_to_i32(x),
                lanes::widen_i16_to_i32(x),
                "{} widen {:?}",
                ops.tier(),
                x
            );
        }
    }
}

#[test]
fn narrow_matches_reference() {
    let vectors = i32_lane_vectors(2, 200);
    for ops in supported_ops() {
        for lo in &vectors {
            for hi in vectors.iter().step_by(7) {
                assert_eq!(
                    ops.narrow_i32_to_u16_saturate(*lo, *hi),
                    lanes::narrow_i32_to_u16_saturate(*lo, *hi),
                    "{} narrow {:?} {:?}",
                    ops.tier(),
                    lo,
                    hi
                );
            }
        }
    }
}

#[test]
fn narrow_saturates_each_half_independently() {
    // One half entirely out of range must not leak into the other.
    let lo = [-5, 70000, 12, 65535];
    let hi = [300, 0, i32::MIN, 65536];
    for ops in supported_ops() {
        assert_eq!(
            ops.narrow_i32_to_u16_saturate(lo, hi),
            [0, 65535, 12, 65535, 300, 0, 0, 65535],
            "{}",
            ops.tier()
        );
    }
}

#[test]
fn multiply_low_matches_reference() {
    let vectors = i32_lane_vectors(3, 200);
    for ops in supported_ops() {
        for a in &vectors {
            for b in vectors.iter().step_by(5) {
                assert_eq!(
                    ops.multiply_i32_lanes_low(*a, *b),
                    lanes::multiply_i32_lanes_low(*a, *b),
                    "{} multiply {:?} {:?}",
                    ops.tier(),
                    a,
                    b
                );
            }
        }
    }
}

#[test]
fn u8_saturation_after_shift() {
    // Accumulations as the kernels produce them, before the shift by 8.
    let sums: [i64; 14] = [
        -1_000_000,
        -256,
        -1,
        0,
        1,
        128,
        255 << 8,
        256 << 8,
        32767 << 8,
        32768 << 8,
        8_651_645,
        65535 << 8,
        65536 << 8,
        i32::MAX as i64,
    ];
    for ops in supported_ops() {
        for &s in &sums {
            let shifted = (s >> 8) as i32;
            let bytes = ops.narrow_i32_to_u8_saturate([shifted; 4], [shifted; 4], [0; 4], [-shifted; 4]);
            let expected = shifted.clamp(0, 255) as u8;
            assert_eq!(&bytes[..8], &[expected; 8], "{} sum {s}", ops.tier());
            assert_eq!(&bytes[8..12], &[0; 4], "{} sum {s}", ops.tier());
            assert_eq!(&bytes[12..], &[(-shifted).clamp(0, 255) as u8; 4], "{} sum {s}", ops.tier());
        }
    }
}

#[test]
fn narrow_u8_matches_reference() {
    let vectors = i32_lane_vectors(4, 200);
    for ops in supported_ops() {
        for quad in vectors.chunks_exact(4) {
            assert_eq!(
                ops.narrow_i32_to_u8_saturate(quad[0], quad[1], quad[2], quad[3]),
                lanes::narrow_i32_to_u8_saturate(quad[0], quad[1], quad[2], quad[3]),
                "{} narrow_u8 {:?}",
                ops.tier(),
                quad
            );
        }
    }
}

#[test]
fn detected_tier_is_listed() {
    let tiers: Vec<Tier> = supported_ops().iter().map(|o| o.tier()).collect();
    eprintln!("Supported tiers: {:?}", tiers);
    assert!(tiers.contains(&Tier::detect()));
    assert!(tiers.contains(&Tier::Scalar));
}
