//! Deterministic test data
//!
//! All generators take a seed so failures reproduce exactly.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Boundary values for 16-bit lanes
pub const I16_EDGES: [i16; 10] = [0, -1, 1, i16::MIN, i16::MIN + 1, i16::MAX, 255, 256, -256, 0x7f00];

/// Boundary values for 32-bit lanes
pub const I32_EDGES: [i32; 14] = [
    0,
    -1,
    1,
    255,
    256,
    65535,
    65536,
    -65535,
    -65536,
    i32::MIN,
    i32::MIN + 1,
    i32::MAX,
    0x0000_ffff,
    0x7fff_0000,
];

/// Random RGBA8 row of `pixels` pixels
pub fn random_row(seed: u64, pixels: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..pixels * 4).map(|_| rng.r#gen::<u8>()).collect()
}

/// `rows` independent random rows
pub fn random_rows(seed: u64, rows: usize, pixels: usize) -> Vec<Vec<u8>> {
    (0..rows)
        .map(|r| random_row(seed.wrapping_mul(31).wrapping_add(r as u64), pixels))
        .collect()
}

/// Random Q8 coefficients in `[-range, range]`
pub fn random_coefficients<const N: usize>(seed: u64, range: i16) -> [i16; N] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    std::array::from_fn(|_| rng.gen_range(-range..=range))
}

/// Random coefficients including full-range extremes
pub fn random_extreme_coefficients<const N: usize>(seed: u64) -> [i16; N] {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    std::array::from_fn(|_| match rng.gen_range(0..4) {
        0 => i16::MIN,
        1 => i16::MAX,
        _ => rng.r#gen::<i16>(),
    })
}

/// Random vectors of 16-bit lanes, edges first
pub fn i16_lane_vectors(seed: u64, random: usize) -> Vec<[i16; 8]> {
    let mut out = Vec::new();
    for rot in 0..I16_EDGES.len() {
        out.push(std::array::from_fn(|i| I16_EDGES[(i + rot) % I16_EDGES.len()]));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..random {
        out.push(std::array::from_fn(|_| rng.r#gen::<i16>()));
    }
    out
}

/// Random vectors of 32-bit lanes, edges first
pub fn i32_lane_vectors(seed: u64, random: usize) -> Vec<[i32; 4]> {
    let mut out = Vec::new();
    for rot in 0..I32_EDGES.len() {
        out.push(std::array::from_fn(|i| I32_EDGES[(i * 3 + rot) % I32_EDGES.len()]));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..random {
        out.push(std::array::from_fn(|_| match rng.gen_range(0..3) {
            0 => rng.gen_range(-70000..70000),
            _ => rng.r#gen::<i32>(),
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_row_deterministic() {
        assert_eq!(random_row(42, 17), random_row(42, 17));
        assert_ne!(random_row(42, 17), random_row(43, 17));
    }

    #[test]
    fn test_coefficient_range() {
        let c: [i16; 25] = random_coefficients(7, 300);
        assert!(c.iter().all(|v| (-300..=300).contains(v)));
    }

    #[test]
    fn test_edges_lead_lane_vectors() {
        let v = i32_lane_vectors(1, 4);
        assert_eq!(v.len(), I32_EDGES.len() + 4);
        assert_eq!(v[0][0], I32_EDGES[0]);
    }
}
