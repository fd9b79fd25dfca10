use bytemuck::{Pod, Zeroable};

/// Row-major 4x4 matrix using the row-vector convention (`v' = v * M`).
///
/// `a.concatenate(b)` yields `a * b`: the transform `a` followed by `b`.
/// Translation lives in the fourth row.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Matrix4 {
    pub m: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    #[inline]
    pub const fn from_rows(m: [f32; 16]) -> Self {
        Self { m }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::from_rows([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
        ])
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::from_rows([0.0; 16])
    }

    #[inline]
    pub const fn translation(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0, //
        ])
    }

    #[inline]
    pub const fn scale(x: f32, y: f32, z: f32) -> Self {
        Self::from_rows([
            x, 0.0, 0.0, 0.0, //
            0.0, y, 0.0, 0.0, //
            0.0, 0.0, z, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
        ])
    }

    /// Orthographic projection mapping the given box to clip space.
    pub fn ortho(left: f32, right: f32, top: f32, bottom: f32, z_near: f32, z_far: f32) -> Self {
        Self::from_rows([
            2.0 / (right - left), 0.0, 0.0, 0.0, //
            0.0, 2.0 / (top - bottom), 0.0, 0.0, //
            0.0, 0.0, 1.0 / (z_near - z_far), 0.0, //
            (left + right) / (left - right),
            (top + bottom) / (bottom - top),
            z_near / (z_near - z_far),
            1.0,
        ])
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.m[row * 4 + col]
    }

    /// Whether the last column is `(0, 0, 0, 1)`.
    #[inline]
    pub fn is_affine(&self) -> bool {
        self.m[3] == 0.0 && self.m[7] == 0.0 && self.m[11] == 0.0 && self.m[15] == 1.0
    }

    /// General product `self * rhs`.
    pub fn concatenate(&self, rhs: &Matrix4) -> Matrix4 {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col]
                    + a[row * 4 + 3] * b[12 + col];
            }
        }
        Matrix4::from_rows(out)
    }

    /// Product `self * rhs` for two affine matrices.
    ///
    /// Skips the projective column. Falls back to [`concatenate`](Self::concatenate)
    /// when either operand is not affine.
    pub fn concatenate_affine(&self, rhs: &Matrix4) -> Matrix4 {
        if !self.is_affine() || !rhs.is_affine() {
            return self.concatenate(rhs);
        }

        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..3 {
                out[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col];
            }
        }
        // Translation row picks up rhs translation.
        out[12] += b[12];
        out[13] += b[13];
        out[14] += b[14];
        out[15] = 1.0;
        Matrix4::from_rows(out)
    }

    pub fn determinant(&self) -> f32 {
        let m = &self.m;
        let a0 = m[0] * m[5] - m[1] * m[4];
        let a1 = m[0] * m[6] - m[2] * m[4];
        let a2 = m[0] * m[7] - m[3] * m[4];
        let a3 = m[1] * m[6] - m[2] * m[5];
        let a4 = m[1] * m[7] - m[3] * m[5];
        let a5 = m[2] * m[7] - m[3] * m[6];
        let b0 = m[8] * m[13] - m[9] * m[12];
        let b1 = m[8] * m[14] - m[10] * m[12];
        let b2 = m[8] * m[15] - m[11] * m[12];
        let b3 = m[9] * m[14] - m[10] * m[13];
        let b4 = m[9] * m[15] - m[11] * m[13];
        let b5 = m[10] * m[15] - m[11] * m[14];

        a0 * b5 - a1 * b4 + a2 * b3 + a3 * b2 - a4 * b1 + a5 * b0
    }

    /// Returns the inverse, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix4> {
        let m = &self.m;
        let a0 = m[0] * m[5] - m[1] * m[4];
        let a1 = m[0] * m[6] - m[2] * m[4];
        let a2 = m[0] * m[7] - m[3] * m[4];
        let a3 = m[1] * m[6] - m[2] * m[5];
        let a4 = m[1] * m[7] - m[3] * m[5];
        let a5 = m[2] * m[7] - m[3] * m[6];
        let b0 = m[8] * m[13] - m[9] * m[12];
        let b1 = m[8] * m[14] - m[10] * m[12];
        let b2 = m[8] * m[15] - m[11] * m[12];
        let b3 = m[9] * m[14] - m[10] * m[13];
        let b4 = m[9] * m[15] - m[11] * m[13];
        let b5 = m[10] * m[15] - m[11] * m[14];

        let det = a0 * b5 - a1 * b4 + a2 * b3 + a3 * b2 - a4 * b1 + a5 * b0;
        if det.abs() <= f32::EPSILON * f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;

        let out = [
            (m[5] * b5 - m[6] * b4 + m[7] * b3) * inv,
            (-m[1] * b5 + m[2] * b4 - m[3] * b3) * inv,
            (m[13] * a5 - m[14] * a4 + m[15] * a3) * inv,
            (-m[9] * a5 + m[10] * a4 - m[11] * a3) * inv,
            (-m[4] * b5 + m[6] * b2 - m[7] * b1) * inv,
            (m[0] * b5 - m[2] * b2 + m[3] * b1) * inv,
            (-m[12] * a5 + m[14] * a2 - m[15] * a1) * inv,
            (m[8] * a5 - m[10] * a2 + m[11] * a1) * inv,
            (m[4] * b4 - m[5] * b2 + m[7] * b0) * inv,
            (-m[0] * b4 + m[1] * b2 - m[3] * b0) * inv,
            (m[12] * a4 - m[13] * a2 + m[15] * a0) * inv,
            (-m[8] * a4 + m[9] * a2 - m[11] * a0) * inv,
            (-m[4] * b3 + m[5] * b1 - m[6] * b0) * inv,
            (m[0] * b3 - m[1] * b1 + m[2] * b0) * inv,
            (-m[12] * a3 + m[13] * a1 - m[14] * a0) * inv,
            (m[8] * a3 - m[9] * a1 + m[10] * a0) * inv,
        ];

        Some(Matrix4::from_rows(out))
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Matrix4, eps: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Raw floats in row-major order, suitable for uniform upload.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }
}
