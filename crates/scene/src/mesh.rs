//! Procedural UV-sphere tessellation.
//!
//! The mesh is a flat triangle list (no index buffer) so every vertex can
//! carry the UV of the face it belongs to, which keeps the texture seam and
//! the pole fans free of shared-vertex artefacts.

use std::f64::consts::{PI, TAU};
use std::fmt;

use bytemuck::{Pod, Zeroable};

pub const DEFAULT_RADIUS: f64 = 2.0;
pub const DEFAULT_STEP: u32 = 48;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    StepTooSmall { step: u32 },
    InvalidRadius { radius: f64 },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::StepTooSmall { step } => {
                write!(f, "sphere step must be at least 2 (got {step})")
            }
            MeshError::InvalidRadius { radius } => {
                write!(f, "sphere radius must be finite and positive (got {radius})")
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// Immutable triangle list; three consecutive vertices form one triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    radius: f64,
    step: u32,
    vertices: Vec<Vertex>,
}

impl Mesh {
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(3)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

pub fn triangle_count_for(step: u32) -> usize {
    let step = step as usize;
    4 * step * step.saturating_sub(1)
}

/// Builds a sphere of `step` latitude bands and `2 * step` longitude segments.
///
/// The polar axis is emitted as +Y. Texture `u` runs from 1 at θ = 0 down to 0
/// after a full turn, `v` from 0 at the north pole to 1 at the south pole.
/// Both pole vertices of a segment take the `u` halfway across it, not the
/// segment's left or right edge.
pub fn build_sphere(radius: f64, step: u32) -> Result<Mesh, MeshError> {
    if step < 2 {
        return Err(MeshError::StepTooSmall { step });
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeshError::InvalidRadius { radius });
    }

    let d = PI / step as f64;
    let segments = 2 * step;
    let mut vertices = Vec::with_capacity(triangle_count_for(step) * 3);

    let point = |phi: f64, theta: f64| -> [f32; 3] {
        [
            (radius * phi.sin() * theta.cos()) as f32,
            (radius * phi.cos()) as f32,
            (radius * phi.sin() * theta.sin()) as f32,
        ]
    };
    let u_at = |j: f64| -> f32 { (1.0 - j / segments as f64) as f32 };
    let v_at = |i: u32| -> f32 { (i as f64 / step as f64) as f32 };
    let mut push = |position: [f32; 3], uv: [f32; 2]| {
        vertices.push(Vertex {
            position,
            color: WHITE,
            uv,
        });
    };

    for i in 0..step {
        let phi_u = i as f64 * d;
        let phi_l = (i + 1) as f64 * d;
        for j in 0..segments {
            let theta_l = j as f64 * d;
            let theta_r = ((j + 1) as f64 * d) % TAU;
            // um: pole u, centered on the wedge.
            let (ul, ur, um) = (u_at(j as f64), u_at((j + 1) as f64), u_at(j as f64 + 0.5));

            if i == 0 {
                push([0.0, radius as f32, 0.0], [um, 0.0]);
                push(point(phi_l, theta_r), [ur, v_at(1)]);
                push(point(phi_l, theta_l), [ul, v_at(1)]);
            } else if i == step - 1 {
                push(point(phi_u, theta_l), [ul, v_at(i)]);
                push(point(phi_u, theta_r), [ur, v_at(i)]);
                push([0.0, -radius as f32, 0.0], [um, 1.0]);
            } else {
                push(point(phi_u, theta_l), [ul, v_at(i)]);
                push(point(phi_l, theta_r), [ur, v_at(i + 1)]);
                push(point(phi_l, theta_l), [ul, v_at(i + 1)]);

                push(point(phi_u, theta_l), [ul, v_at(i)]);
                push(point(phi_u, theta_r), [ur, v_at(i)]);
                push(point(phi_l, theta_r), [ur, v_at(i + 1)]);
            }
        }
    }

    Ok(Mesh {
        radius,
        step,
        vertices,
    })
}
