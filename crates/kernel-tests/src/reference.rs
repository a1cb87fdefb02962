//! Reference formulas
//!
//! Straight transcriptions of the per-pixel definitions, one channel at a
//! time, with `i64` accumulation so an `i32` overflow in a kernel would show
//! up as a mismatch.

/// `clamp_u8(sum >> 8)` with a flooring shift
pub fn q8_to_u8(sum: i64) -> u8 {
    sum.div_euclid(256).clamp(0, 255) as u8
}

/// Color matrix variant shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Full,
    Rgb,
    Dot,
}

/// Per-pixel reference for a color matrix row, `coef[out * 4 + in]`
pub fn color_matrix(shape: Shape, coef: &[i16; 16], src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    for px in src.chunks_exact(4) {
        for channel in 0..4 {
            let value = match shape {
                Shape::Full => project(coef, channel, px, 4),
                Shape::Rgb if channel < 3 => project(coef, channel, px, 3),
                Shape::Dot if channel < 3 => project(coef, 0, px, 3),
                _ => px[3],
            };
            out.push(value);
        }
    }
    out
}

fn project(coef: &[i16; 16], row: usize, px: &[u8], inputs: usize) -> u8 {
    let sum: i64 = (0..inputs)
        .map(|k| coef[row * 4 + k] as i64 * px[k] as i64)
        .sum();
    q8_to_u8(sum)
}

/// Per-pixel reference for a `size`x`size` convolution of `count` pixels
pub fn convolve(size: usize, coef: &[i16], rows: &[&[u8]], count: usize) -> Vec<u8> {
    assert_eq!(coef.len(), size * size);
    assert_eq!(rows.len(), size);
    let mut out = Vec::with_capacity(count * 4);
    for x in 0..count {
        for channel in 0..4 {
            let mut sum = 0i64;
            for dy in 0..size {
                for dx in 0..size {
                    sum += coef[dy * size + dx] as i64 * rows[dy][(x + dx) * 4 + channel] as i64;
                }
            }
            out.push(q8_to_u8(sum));
        }
    }
    out
}
