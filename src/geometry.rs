//! 2D affine geometry shared by the renderer and the overlay builder.
//!
//! Matrices use the PDF 6-tuple layout `[a, b, c, d, e, f]`, which maps a
//! point `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing composed anchors.
pub const EPSILON: f64 = 1e-9;

/// A 2D affine transform in PDF `[a, b, c, d, e, f]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix(pub [f64; 6]);

impl Matrix {
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self([a, b, c, d, e, f])
    }

    #[must_use]
    pub const fn translation(x: f64, y: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, x, y])
    }

    #[must_use]
    pub const fn scaling(sx: f64, sy: f64) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Compose `self` with `other`, applying `other` first.
    ///
    /// Equivalent to pdf.js `Util.transform(self, other)`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * e2 + c1 * f2 + e1,
            b1 * e2 + d1 * f2 + f1,
        ])
    }

    /// Map a point through the transform.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    #[must_use]
    pub fn scale_x(&self) -> f64 {
        self.0[0]
    }

    #[must_use]
    pub fn translate_x(&self) -> f64 {
        self.0[4]
    }

    #[must_use]
    pub fn translate_y(&self) -> f64 {
        self.0[5]
    }

    /// Component-wise comparison within `eps`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compose two transforms, applying `inner` first.
#[must_use]
pub fn compose(outer: &Matrix, inner: &Matrix) -> Matrix {
    outer.compose(inner)
}

/// Axis-aligned rectangle in viewport pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
