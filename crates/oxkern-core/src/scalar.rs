//! Portable per-pixel kernels
//!
//! Used as the `Scalar` tier and on targets without the x86 vector paths.
//! These read one pixel at a time, so a color-matrix call may run in place.

use crate::types::{Pixel, Q8_SHIFT};
use multiversion::multiversion;

/// Remove the Q8 scale (flooring) and saturate to a byte
#[inline]
pub fn clamp_q8(acc: i32) -> u8 {
    (acc >> Q8_SHIFT).clamp(0, u8::MAX as i32) as u8
}

#[inline]
fn dot(row: &[i16], px: Pixel) -> i32 {
    row.iter()
        .zip(px)
        .map(|(&c, p)| c as i32 * p as i32)
        .sum()
}

/// `out[j] = clamp(sum_k coef[j][k] * px[k] >> 8)` over all four channels
#[inline]
pub fn color_matrix_4x4_pixel(coef: &[i16; 16], px: Pixel) -> Pixel {
    let mut out = [0u8; 4];
    for (o, row) in out.iter_mut().zip(coef.chunks_exact(4)) {
        *o = clamp_q8(dot(row, px));
    }
    out
}

/// 3x3 over the first three channels, fourth copied
#[inline]
pub fn color_matrix_3x3_pixel(coef: &[i16; 16], px: Pixel) -> Pixel {
    [
        clamp_q8(dot(&coef[0..3], px)),
        clamp_q8(dot(&coef[4..7], px)),
        clamp_q8(dot(&coef[8..11], px)),
        px[3],
    ]
}

/// First coefficient row broadcast to three channels, fourth copied
#[inline]
pub fn color_matrix_dot_pixel(coef: &[i16; 16], px: Pixel) -> Pixel {
    let v = clamp_q8(dot(&coef[0..3], px));
    [v, v, v, px[3]]
}

#[inline(always)]
unsafe fn color_matrix_row(
    dst: *mut u8,
    src: *const u8,
    coef: &[i16; 16],
    count: usize,
    pixel_fn: fn(&[i16; 16], Pixel) -> Pixel,
) {
    for i in 0..count {
        unsafe {
            let px = src.add(i * 4).cast::<Pixel>().read();
            dst.add(i * 4).cast::<Pixel>().write(pixel_fn(coef, px));
        }
    }
}

/// # Safety
///
/// `src` and `dst` must hold `count` pixels; `dst` may equal or trail `src`.
pub unsafe fn color_matrix_4x4(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
    unsafe { color_matrix_row(dst, src, coef, count, color_matrix_4x4_pixel) }
}

/// # Safety
///
/// See [`color_matrix_4x4`].
pub unsafe fn color_matrix_3x3(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
    unsafe { color_matrix_row(dst, src, coef, count, color_matrix_3x3_pixel) }
}

/// # Safety
///
/// See [`color_matrix_4x4`].
pub unsafe fn color_matrix_dot(dst: *mut u8, src: *const u8, coef: &[i16; 16], count: usize) {
    unsafe { color_matrix_row(dst, src, coef, count, color_matrix_dot_pixel) }
}

/// Weighted `K`x`K` neighborhood sum for output pixel `x`
#[inline(always)]
fn convolve_pixel<const K: usize>(rows: &[&[u8]; K], coef: &[i16], x: usize) -> Pixel {
    let mut acc = [0i32; 4];
    for (dy, row) in rows.iter().enumerate() {
        for dx in 0..K {
            let c = coef[dy * K + dx] as i32;
            let px = &row[(x + dx) * 4..(x + dx) * 4 + 4];
            for (a, &p) in acc.iter_mut().zip(px) {
                *a += c * p as i32;
            }
        }
    }
    acc.map(clamp_q8)
}

/// Convolve one output row with a 3x3 kernel
///
/// Each of `rows` starts one pixel left of the first output pixel and holds
/// at least `dst.len() / 4 + 2` pixels.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn convolve_3x3_row(dst: &mut [u8], rows: [&[u8]; 3], coef: &[i16; 9]) {
    for (x, out) in dst.chunks_exact_mut(4).enumerate() {
        out.copy_from_slice(&convolve_pixel::<3>(&rows, coef, x));
    }
}

/// Convolve one output row with a 5x5 kernel
///
/// Each of `rows` starts two pixels left of the first output pixel and holds
/// at least `dst.len() / 4 + 4` pixels.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn convolve_5x5_row(dst: &mut [u8], rows: [&[u8]; 5], coef: &[i16; 25]) {
    for (x, out) in dst.chunks_exact_mut(4).enumerate() {
        out.copy_from_slice(&convolve_pixel::<5>(&rows, coef, x));
    }
}

/// # Safety
///
/// `dst` must hold `count` pixels and each row `count + 2` pixels; `dst`
/// must not overlap any row.
pub unsafe fn convolve_3x3(dst: *mut u8, rows: [*const u8; 3], coef: &[i16; 9], count: usize) {
    if count == 0 {
        return;
    }
    unsafe {
        let dst = std::slice::from_raw_parts_mut(dst, count * 4);
        let rows = rows.map(|r| std::slice::from_raw_parts(r, (count + 2) * 4));
        convolve_3x3_row(dst, rows, coef);
    }
}

/// # Safety
///
/// `dst` must hold `count` pixels and each row `count + 4` pixels; `dst`
/// must not overlap any row.
pub unsafe fn convolve_5x5(dst: *mut u8, rows: [*const u8; 5], coef: &[i16; 25], count: usize) {
    if count == 0 {
        return;
    }
    unsafe {
        let dst = std::slice::from_raw_parts_mut(dst, count * 4);
        let rows = rows.map(|r| std::slice::from_raw_parts(r, (count + 4) * 4));
        convolve_5x5_row(dst, rows, coef);
    }
}
