//! Fixed-point coefficient types
//!
//! All coefficients are Q8: a real value `r` is stored as `round(r * 256)`
//! in an `i16`, so `1.0` is [`Q8_ONE`].

/// One RGBA8 pixel (channel order is up to the caller)
pub type Pixel = [u8; 4];

/// Q8 representation of 1.0
pub const Q8_ONE: i16 = 256;

/// Number of fractional bits in a Q8 coefficient
pub const Q8_SHIFT: i32 = 8;

/// Convert a real coefficient to Q8, rounding to nearest and saturating
#[inline]
pub fn to_q8(value: f32) -> i16 {
    let scaled = (value * Q8_ONE as f32).round();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Which color-matrix kernel a matrix needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixVariant {
    /// Full 4x4 transform
    Mat4x4,
    /// 3x3 transform of the first three channels, fourth passed through
    Mat3x3,
    /// One projection broadcast to the first three channels, fourth passed through
    Dot,
}

/// A 4x4 Q8 color matrix
///
/// Stored row-major by output channel: `coef[out * 4 + in]` weights input
/// channel `in` when computing output channel `out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorMatrix {
    coef: [i16; 16],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorMatrix {
    /// Create a matrix from Q8 entries
    #[inline]
    pub const fn from_q8(coef: [i16; 16]) -> Self {
        Self { coef }
    }

    /// Create a matrix from real coefficients, `m[out][in]`
    pub fn from_f32(m: [[f32; 4]; 4]) -> Self {
        let mut coef = [0i16; 16];
        for (row, src) in coef.chunks_exact_mut(4).zip(m.iter()) {
            for (dst, &v) in row.iter_mut().zip(src.iter()) {
                *dst = to_q8(v);
            }
        }
        Self { coef }
    }

    /// Identity matrix
    pub const fn identity() -> Self {
        let one = Q8_ONE;
        Self {
            coef: [
                one, 0, 0, 0, //
                0, one, 0, 0, //
                0, 0, one, 0, //
                0, 0, 0, one,
            ],
        }
    }

    /// BT.601 luma broadcast to the first three channels, alpha kept
    pub fn greyscale() -> Self {
        let luma = [0.299, 0.587, 0.114, 0.0];
        Self::from_f32([luma, luma, luma, [0.0, 0.0, 0.0, 1.0]])
    }

    /// Q8 entries, row-major by output channel
    #[inline]
    pub fn coefficients(&self) -> &[i16; 16] {
        &self.coef
    }

    /// Coefficient weighting input `input` into output `output`
    #[inline]
    pub fn get(&self, output: usize, input: usize) -> i16 {
        self.coef[output * 4 + input]
    }

    /// Pick the cheapest kernel that computes this matrix exactly
    pub fn variant(&self) -> MatrixVariant {
        let alpha_row = self.coef[12..16] == [0, 0, 0, Q8_ONE];
        let alpha_column = (0..3).all(|out| self.get(out, 3) == 0);
        if !(alpha_row && alpha_column) {
            return MatrixVariant::Mat4x4;
        }

        let first = &self.coef[0..3];
        if first == &self.coef[4..7] && first == &self.coef[8..11] {
            MatrixVariant::Dot
        } else {
            MatrixVariant::Mat3x3
        }
    }
}

/// A 3x3 Q8 convolution kernel, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kernel3x3 {
    coef: [i16; 9],
}

/// A 5x5 Q8 convolution kernel, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kernel5x5 {
    coef: [i16; 25],
}

macro_rules! square_kernel {
    ($name:ident, $size:expr) => {
        impl $name {
            /// Side length of the kernel
            pub const SIZE: usize = $size;

            /// Create a kernel from Q8 entries
            #[inline]
            pub const fn from_q8(coef: [i16; $size * $size]) -> Self {
                Self { coef }
            }

            /// Create a kernel from real weights, row-major
            pub fn from_f32(weights: [f32; $size * $size]) -> Self {
                Self {
                    coef: weights.map(to_q8),
                }
            }

            /// Single 1.0 at the center
            pub const fn identity() -> Self {
                let mut coef = [0i16; $size * $size];
                coef[($size * $size) / 2] = Q8_ONE;
                Self { coef }
            }

            /// Uniform average over the neighborhood
            pub fn box_blur() -> Self {
                Self::from_f32([1.0 / ($size * $size) as f32; $size * $size])
            }

            /// Q8 entries, row-major
            #[inline]
            pub fn coefficients(&self) -> &[i16; $size * $size] {
                &self.coef
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::identity()
            }
        }
    };
}

square_kernel!(Kernel3x3, 3);
square_kernel!(Kernel5x5, 5);
