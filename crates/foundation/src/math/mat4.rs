//! Column-major 4x4 matrices with OpenGL clip conventions.
//!
//! `cols[c][r]` is the element at row `r`, column `c`. Vectors are columns and
//! transforms compose right-to-left (`a.mul(b)` applies `b` first).

use super::Vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_cols(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Builds a matrix from rows, which reads closer to the textbook layout.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                cols[c][r] = *v;
            }
        }
        Self { cols }
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut cols = [[0.0; 4]; 4];
        for (c, out_col) in cols.iter_mut().enumerate() {
            for (r, out) in out_col.iter_mut().enumerate() {
                *out = (0..4).map(|k| self.at(r, k) * other.at(k, c)).sum();
            }
        }
        Mat4 { cols }
    }

    pub fn mul_vec4(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|k| self.at(r, k) * v[k]).sum();
        }
        out
    }

    /// Transforms a point (w = 1) and drops w without a perspective divide.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let [x, y, z, _] = self.mul_vec4([p.x, p.y, p.z, 1.0]);
        Vec3::new(x, y, z)
    }

    /// Transforms a direction (w = 0).
    pub fn transform_dir(&self, d: Vec3) -> Vec3 {
        let [x, y, z, _] = self.mul_vec4([d.x, d.y, d.z, 0.0]);
        Vec3::new(x, y, z)
    }

    /// Right-handed view matrix looking from `eye` towards the point `center`.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let f = (center - eye).normalized().unwrap_or(Vec3::new(0.0, 0.0, -1.0));
        let s = f.cross(up).normalized().unwrap_or(Vec3::new(1.0, 0.0, 0.0));
        let u = s.cross(f);

        Mat4::from_rows([
            [s.x, s.y, s.z, -s.dot(eye)],
            [u.x, u.y, u.z, -u.dot(eye)],
            [-f.x, -f.y, -f.z, f.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Perspective frustum mapping eye space to GL clip space (z in [-1, 1]).
    pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Mat4 {
        let w = right - left;
        let h = top - bottom;
        let d = far - near;
        Mat4::from_rows([
            [2.0 * near / w, 0.0, (right + left) / w, 0.0],
            [0.0, 2.0 * near / h, (top + bottom) / h, 0.0],
            [0.0, 0.0, -(far + near) / d, -2.0 * far * near / d],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Rotation about +Y by `angle_rad` (right-handed).
    pub fn rotation_y(angle_rad: f64) -> Mat4 {
        let (s, c) = angle_rad.sin_cos();
        Mat4::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// General inverse by cofactor expansion. `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Mat4> {
        let m: [f64; 16] = [
            self.cols[0][0],
            self.cols[0][1],
            self.cols[0][2],
            self.cols[0][3],
            self.cols[1][0],
            self.cols[1][1],
            self.cols[1][2],
            self.cols[1][3],
            self.cols[2][0],
            self.cols[2][1],
            self.cols[2][2],
            self.cols[2][3],
            self.cols[3][0],
            self.cols[3][1],
            self.cols[3][2],
            self.cols[3][3],
        ];
        let mut inv = [0.0f64; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det.abs() < 1e-300 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let mut cols = [[0.0; 4]; 4];
        for (i, v) in inv.iter().enumerate() {
            cols[i / 4][i % 4] = v * inv_det;
        }
        Some(Mat4 { cols })
    }

    /// Single-precision copy for GPU upload, column-major.
    pub fn to_cols_f32(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, v) in col.iter().enumerate() {
                out[c][r] = *v as f32;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::Vec3;

    fn assert_mat_close(a: &Mat4, b: &Mat4, eps: f64) {
        for c in 0..4 {
            for r in 0..4 {
                let diff = (a.at(r, c) - b.at(r, c)).abs();
                assert!(diff <= eps, "({r},{c}): {} vs {}", a.at(r, c), b.at(r, c));
            }
        }
    }

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let d = (a - b).length();
        assert!(d <= eps, "expected {a:?} ~= {b:?} (diff {d})");
    }

    #[test]
    fn frustum_inverse_round_trips() {
        let p = Mat4::frustum(-1.6, 1.6, -1.0, 1.0, 1.0, 10.0);
        let inv = p.inverse().expect("invertible");
        assert_mat_close(&inv.mul(&p), &Mat4::IDENTITY, 1e-12);
    }

    #[test]
    fn look_at_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 1.2, 4.8);
        let view = Mat4::look_at(eye, Vec3::new(0.0, -1.2, -4.8), Vec3::new(0.0, 1.0, 0.0));
        assert_vec_close(view.transform_point(eye), Vec3::ZERO, 1e-12);

        let inv = view.inverse().expect("invertible");
        assert_vec_close(inv.transform_point(Vec3::ZERO), eye, 1e-12);
    }

    #[test]
    fn look_at_points_forward_down_negative_z() {
        let view = Mat4::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let p = view.transform_point(Vec3::ZERO);
        assert_vec_close(p, Vec3::new(0.0, 0.0, -5.0), 1e-12);
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let r = Mat4::rotation_y(std::f64::consts::FRAC_PI_2);
        assert_vec_close(
            r.transform_dir(Vec3::new(1.0, 0.0, 0.0)),
            Vec3::new(0.0, 0.0, -1.0),
            1e-12,
        );
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Mat4::from_cols([[0.0; 4]; 4]);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn from_rows_transposes_into_columns() {
        let m = Mat4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]);
        assert_eq!(m.cols[0], [1.0, 5.0, 9.0, 13.0]);
        assert_eq!(m.at(0, 3), 4.0);
    }
}
