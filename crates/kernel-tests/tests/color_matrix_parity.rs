//! Color matrix parity against the reference formulas
//!
//! Covers the identity, the 3x3/dot pass-through rules, saturation at both
//! ends and random matrices on every supported tier.

use kernel_tests::patterns::{random_coefficients, random_extreme_coefficients, random_row};
use kernel_tests::reference::{self, Shape};
use kernel_tests::supported_kernel_sets;
use oxkern_core::{ColorMatrix, ColorMatrixTransform, KernelSet, MatrixVariant};

const VARIANTS: [(MatrixVariant, Shape); 3] = [
    (MatrixVariant::Mat4x4, Shape::Full),
    (MatrixVariant::Mat3x3, Shape::Rgb),
    (MatrixVariant::Dot, Shape::Dot),
];

fn run(set: &KernelSet, variant: MatrixVariant, coef: &[i16; 16], src: &[u8]) -> Vec<u8> {
    let mut dst = vec![0u8; src.len()];
    let kernel = set.color_matrix_fn(variant);
    unsafe { kernel(dst.as_mut_ptr(), src.as_ptr(), coef, src.len() / 4) };
    dst
}

#[test]
fn identity_4x4_leaves_pixels_unchanged() {
    let identity = *ColorMatrix::identity().coefficients();
    for set in supported_kernel_sets() {
        for pixels in [1, 4, 63, 256] {
            let src = random_row(pixels as u64, pixels);
            assert_eq!(
                run(&set, MatrixVariant::Mat4x4, &identity, &src),
                src,
                "{} with {pixels} pixels",
                set.tier()
            );
        }
    }
}

#[test]
fn blue_extraction_example() {
    let mut coef = [0i16; 16];
    coef[2] = 256;
    coef[6] = 256;
    coef[10] = 256;
    for set in supported_kernel_sets() {
        let out = run(&set, MatrixVariant::Mat3x3, &coef, &[200, 50, 10, 255]);
        assert_eq!(out, vec![10, 10, 10, 255], "{}", set.tier());
    }
}

#[test]
fn large_positive_sums_saturate_to_255() {
    // Row 0 sums to 8_651_645, which is 33795 after the shift.
    let mut coef = [0i16; 16];
    coef[0..4].copy_from_slice(&[3378, 24740, 5323, 26810]);
    coef[5] = 256;
    let src = [149u8, 246, 191, 39];
    for set in supported_kernel_sets() {
        assert_eq!(
            run(&set, MatrixVariant::Mat4x4, &coef, &src),
            vec![255, 246, 0, 0],
            "{}",
            set.tier()
        );
        // 11_710_072 >> 8 = 45742, broadcast with alpha passed through
        let mut dot = [0i16; 16];
        dot[0..3].copy_from_slice(&[3378, 24740, 26810]);
        let expected = reference::color_matrix(Shape::Dot, &dot, &src);
        assert_eq!(expected, vec![255, 255, 255, 39]);
        assert_eq!(run(&set, MatrixVariant::Dot, &dot, &src), expected, "{}", set.tier());
    }
}

#[test]
fn random_matrices_match_reference() {
    for set in supported_kernel_sets() {
        for seed in 0..40u64 {
            let coef: [i16; 16] = random_coefficients(seed, 600);
            let src = random_row(seed + 1000, 37);
            for (variant, shape) in VARIANTS {
                assert_eq!(
                    run(&set, variant, &coef, &src),
                    reference::color_matrix(shape, &coef, &src),
                    "{} {:?} seed {seed}",
                    set.tier(),
                    variant
                );
            }
        }
    }
}

#[test]
fn extreme_coefficients_match_reference() {
    for set in supported_kernel_sets() {
        for seed in 0..20u64 {
            let coef: [i16; 16] = random_extreme_coefficients(seed);
            let src = random_row(seed + 77, 21);
            for (variant, shape) in VARIANTS {
                assert_eq!(
                    run(&set, variant, &coef, &src),
                    reference::color_matrix(shape, &coef, &src),
                    "{} {:?} seed {seed}",
                    set.tier(),
                    variant
                );
            }
        }
    }
}

#[test]
fn saturates_high_and_low() {
    // Channel 0 doubled, channel 1 negated, channel 2 halved, channel 3 kept.
    let coef = [
        512, 0, 0, 0, //
        0, -256, 0, 0, //
        0, 0, 128, 0, //
        0, 0, 0, 256,
    ];
    let src = [200u8, 50, 3, 77, 100, 0, 255, 1];
    for set in supported_kernel_sets() {
        assert_eq!(
            run(&set, MatrixVariant::Mat4x4, &coef, &src),
            vec![255, 0, 1, 77, 200, 0, 127, 1],
            "{}",
            set.tier()
        );
    }
}

#[test]
fn negative_sums_floor() {
    // -1/256 floors to -1 and saturates to 0; +1.5 floors to 1.
    let mut coef = [0i16; 16];
    coef[0] = -1;
    coef[5] = 384;
    let src = [1u8, 1, 0, 0];
    for set in supported_kernel_sets() {
        let out = run(&set, MatrixVariant::Mat4x4, &coef, &src);
        assert_eq!(out, vec![0, 1, 0, 0], "{}", set.tier());
    }
}

#[test]
fn pass_through_ignores_alpha_coefficients() {
    let coef: [i16; 16] = random_coefficients(99, 1000);
    let src = random_row(5, 16);
    for set in supported_kernel_sets() {
        for variant in [MatrixVariant::Mat3x3, MatrixVariant::Dot] {
            let out = run(&set, variant, &coef, &src);
            for (o, s) in out.chunks_exact(4).zip(src.chunks_exact(4)) {
                assert_eq!(o[3], s[3], "{} {:?}", set.tier(), variant);
            }
        }
        let dot = run(&set, MatrixVariant::Dot, &coef, &src);
        assert!(dot.chunks_exact(4).all(|p| p[0] == p[1] && p[1] == p[2]));
    }
}

#[test]
fn transform_picks_variant_with_same_result() {
    let src = random_row(11, 50);
    for matrix in [ColorMatrix::identity(), ColorMatrix::greyscale()] {
        let auto = ColorMatrixTransform::new(matrix);
        let full = ColorMatrixTransform::with_variant(matrix, MatrixVariant::Mat4x4);
        let mut a = vec![0u8; src.len()];
        let mut b = vec![0u8; src.len()];
        auto.apply(&src, &mut a).unwrap();
        full.apply(&src, &mut b).unwrap();
        assert_ne!(auto.variant(), MatrixVariant::Mat4x4);
        assert_eq!(a, b, "{:?}", matrix);
    }
}

#[test]
fn in_place_matches_out_of_place() {
    let coef: [i16; 16] = random_coefficients(3, 400);
    let matrix = ColorMatrix::from_q8(coef);
    let src = random_row(4, 45);
    for set in supported_kernel_sets() {
        let t = ColorMatrixTransform::with_variant(matrix, MatrixVariant::Mat4x4).with_kernels(set);
        let mut out = vec![0u8; src.len()];
        t.apply(&src, &mut out).unwrap();
        let mut buf = src.clone();
        t.apply_in_place(&mut buf).unwrap();
        assert_eq!(buf, out, "{}", set.tier());
    }
}
