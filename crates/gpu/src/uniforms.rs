use bytemuck::{Pod, Zeroable};

/// Remaps GL clip depth `[-1, 1]` onto the `[0, 1]` range wgpu expects.
/// Column-major.
pub const OPENGL_TO_WGPU: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.5, 0.0],
    [0.0, 0.0, 0.5, 1.0],
];

/// Per-frame shader inputs, laid out for a single uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub mvp: [[f32; 4]; 4],
    pub mv: [[f32; 4]; 4],
}

impl FrameUniforms {
    pub fn new(mvp: [[f32; 4]; 4], mv: [[f32; 4]; 4]) -> Self {
        Self { mvp, mv }
    }

    /// Same matrices with the projection's depth range converted for wgpu.
    pub fn with_depth_correction(self) -> Self {
        Self {
            mvp: mat4_mul(OPENGL_TO_WGPU, self.mvp),
            mv: self.mv,
        }
    }
}

/// Column-major multiply: `a * b`.
pub fn mat4_mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::{FrameUniforms, mat4_mul};

    const IDENTITY: [[f32; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    fn apply(m: [[f32; 4]; 4], v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|k| m[k][r] * v[k]).sum();
        }
        out
    }

    #[test]
    fn depth_correction_maps_near_and_far() {
        let u = FrameUniforms::new(IDENTITY, IDENTITY).with_depth_correction();
        assert_eq!(apply(u.mvp, [0.0, 0.0, -1.0, 1.0])[2], 0.0);
        assert_eq!(apply(u.mvp, [0.0, 0.0, 1.0, 1.0])[2], 1.0);
        assert_eq!(u.mv, IDENTITY);
    }

    #[test]
    fn identity_is_neutral() {
        let m = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ];
        assert_eq!(mat4_mul(IDENTITY, m), m);
        assert_eq!(mat4_mul(m, IDENTITY), m);
    }

    #[test]
    fn uniform_block_is_two_matrices() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 128);
    }
}
