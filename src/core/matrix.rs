use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// Row-major 4x4 homogeneous transform.
///
/// Only the translation/scale/rotation subset is ever populated. Points are
/// column vectors, so `(a * b).apply(p)` applies `b` first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix4 {
    rows: [[f64; 4]; 4],
}

impl Default for AffineMatrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMatrix4 {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub const fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self { rows }
    }

    /// Orthographic projection mapping `[l, r] x [b, t] x [n, f]` onto `[-1, 1]^3`.
    ///
    /// Callers guarantee `l != r`, `b != t` and `n != f`.
    #[must_use]
    pub fn ortho(l: f64, r: f64, b: f64, t: f64, n: f64, f: f64) -> Self {
        Self {
            rows: [
                [2.0 / (r - l), 0.0, 0.0, -(r + l) / (r - l)],
                [0.0, 2.0 / (t - b), 0.0, -(t + b) / (t - b)],
                [0.0, 0.0, -2.0 / (f - n), -(f + n) / (f - n)],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Exact inverse of [`AffineMatrix4::ortho`] for the same arguments.
    #[must_use]
    pub fn unortho(l: f64, r: f64, b: f64, t: f64, n: f64, f: f64) -> Self {
        Self {
            rows: [
                [(r - l) / 2.0, 0.0, 0.0, (r + l) / 2.0],
                [0.0, (t - b) / 2.0, 0.0, (t + b) / 2.0],
                [0.0, 0.0, -(f - n) / 2.0, -(f + n) / 2.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub fn translate(x: f64, y: f64) -> Self {
        let mut m = Self::identity();
        m.rows[0][3] = x;
        m.rows[1][3] = y;
        m
    }

    /// Counter-clockwise rotation about the z axis.
    #[must_use]
    pub fn rotate(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        let mut m = Self::identity();
        m.rows[0][0] = cos;
        m.rows[0][1] = -sin;
        m.rows[1][0] = sin;
        m.rows[1][1] = cos;
        m
    }

    #[must_use]
    pub const fn rows(&self) -> &[[f64; 4]; 4] {
        &self.rows
    }

    #[must_use]
    pub const fn entry(&self, row: usize, col: usize) -> f64 {
        self.rows[row][col]
    }

    /// Transforms the point `(x, y, 0, 1)` and returns the resulting `(x, y)`.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.rows;
        (
            m[0][0] * x + m[0][1] * y + m[0][3],
            m[1][0] * x + m[1][1] * y + m[1][3],
        )
    }

    /// Single-precision copy handed to the rendering backend.
    #[must_use]
    pub fn to_f32(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (row_out, row) in out.iter_mut().zip(self.rows.iter()) {
            for (value_out, value) in row_out.iter_mut().zip(row.iter()) {
                *value_out = *value as f32;
            }
        }
        out
    }
}

impl Mul for AffineMatrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        Self { rows }
    }
}
