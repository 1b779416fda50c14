use scene::mesh::{Mesh, Vertex};

use crate::error::GpuError;
use crate::texture::{fit_within, resample_rgba};
use crate::uniforms::FrameUniforms;

/// What a graphics binding must provide to draw the globe.
///
/// Implementations own every GPU object; callers only hand over CPU data.
pub trait RenderBackend {
    fn max_texture_dimension(&self) -> u32;
    fn upload_mesh(&mut self, vertices: &[Vertex]) -> Result<(), GpuError>;
    fn upload_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), GpuError>;
    fn draw(&mut self, uniforms: &FrameUniforms, vertex_count: u32) -> Result<(), GpuError>;
    fn resize(&mut self, width: u32, height: u32);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub texture_uploads: u64,
    /// Size of the texture actually on the GPU, after any downscale.
    pub texture_size: Option<(u32, u32)>,
}

/// Drives a backend: one mesh, one texture, one draw per frame.
#[derive(Debug)]
pub struct GlobeRenderer<B> {
    backend: B,
    vertex_count: u32,
    stats: RenderStats,
}

impl<B: RenderBackend> GlobeRenderer<B> {
    pub fn new(mut backend: B, mesh: &Mesh) -> Result<Self, GpuError> {
        if mesh.vertices().is_empty() {
            return Err(GpuError::EmptyMesh);
        }
        backend.upload_mesh(mesh.vertices())?;
        Ok(Self {
            backend,
            vertex_count: mesh.vertices().len() as u32,
            stats: RenderStats::default(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Uploads an RGBA8 texture, shrinking it first if the device can't hold it.
    pub fn upload_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), GpuError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(GpuError::TextureSize {
                expected,
                actual: rgba.len(),
            });
        }
        let max = self.backend.max_texture_dimension();
        if max == 0 {
            return Err(GpuError::TextureTooLarge { width, height, max });
        }
        let (w, h) = fit_within(width, height, max);
        if (w, h) == (width, height) {
            self.backend.upload_texture(width, height, rgba)?;
        } else {
            let scaled = resample_rgba(rgba, width, height, w, h);
            self.backend.upload_texture(w, h, &scaled)?;
        }
        self.stats.texture_uploads += 1;
        self.stats.texture_size = Some((w, h));
        Ok(())
    }

    pub fn draw(&mut self, uniforms: &FrameUniforms) -> Result<(), GpuError> {
        self.backend.draw(uniforms, self.vertex_count)?;
        self.stats.frames += 1;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width.max(1), height.max(1));
    }
}
