#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use gpu::{FrameUniforms, GpuError, RenderBackend};
    use scene::Vertex;
    use std::borrow::Cow;
    use wasm_bindgen::JsCast;

    /// Globe renderer on a browser canvas: one textured, depth-tested mesh.
    #[derive(Debug)]
    pub struct WgpuBackend {
        _instance: &'static ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        pipeline: ::wgpu::RenderPipeline,
        uniform_buffer: ::wgpu::Buffer,
        uniform_bind_group: ::wgpu::BindGroup,
        texture_layout: ::wgpu::BindGroupLayout,
        sampler: ::wgpu::Sampler,
        texture: ::wgpu::Texture,
        texture_bind_group: ::wgpu::BindGroup,
        depth_view: ::wgpu::TextureView,
        vertex_buffer: Option<::wgpu::Buffer>,
    }

    const GLOBE_SHADER: &str = r#"
struct Frame {
    mvp: mat4x4<f32>,
    mv: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var globe_texture: texture_2d<f32>;
@group(1) @binding(1)
var globe_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    var out: VsOut;
    out.pos = frame.mvp * vec4<f32>(position, 1.0);
    out.uv = uv;
    out.color = color;
    return out;
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(globe_texture, globe_sampler, fs_in.uv) * fs_in.color;
}
"#;

    const VERTEX_ATTRIBUTES: [::wgpu::VertexAttribute; 3] =
        ::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x2];

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("worlddata-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_globe_texture(device: &::wgpu::Device, width: u32, height: u32) -> ::wgpu::Texture {
        device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("worlddata-globe-texture"),
            size: ::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn create_texture_bind_group(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        texture: &::wgpu::Texture,
        sampler: &::wgpu::Sampler,
    ) -> ::wgpu::BindGroup {
        let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("worlddata-texture-bg"),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(&view),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub async fn init_from_canvas_id(canvas_id: &str) -> Result<WgpuBackend, GpuError> {
        let window = web_sys::window().ok_or(GpuError::Unsupported("window"))?;
        let document = window
            .document()
            .ok_or(GpuError::Unsupported("document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| GpuError::Surface(format!("canvas `{canvas_id}` not found")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| GpuError::Surface(format!("`{canvas_id}` is not a canvas")))?;

        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        // The surface borrows the instance for its whole life; leak it.
        let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
            &::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            },
        )));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| GpuError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GpuError::Adapter(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("worlddata-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(|e| GpuError::Device(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| GpuError::Surface("no surface formats".to_string()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("worlddata-globe-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(GLOBE_SHADER)),
        });

        let uniform_buffer = device.create_buffer_init(&::wgpu::util::BufferInitDescriptor {
            label: Some("worlddata-frame-uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::new([[0.0; 4]; 4], [[0.0; 4]; 4])),
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("worlddata-frame-bgl"),
            entries: &[::wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: ::wgpu::ShaderStages::VERTEX,
                ty: ::wgpu::BindingType::Buffer {
                    ty: ::wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("worlddata-frame-bg"),
            layout: &uniform_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
            label: Some("worlddata-texture-bgl"),
            entries: &[
                ::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Texture {
                        sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: ::wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                ::wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ::wgpu::ShaderStages::FRAGMENT,
                    ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("worlddata-globe-sampler"),
            address_mode_u: ::wgpu::AddressMode::Repeat,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // 1x1 white until the first real upload.
        let texture = create_globe_texture(&device, 1, 1);
        write_texture(&queue, &texture, 1, 1, &[255, 255, 255, 255]);
        let texture_bind_group =
            create_texture_bind_group(&device, &texture_layout, &texture, &sampler);

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("worlddata-globe-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some("worlddata-globe-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: ::wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(::wgpu::BlendState::REPLACE),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology: ::wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: ::wgpu::CompareFunction::Less,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(WgpuBackend {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            sampler,
            texture,
            texture_bind_group,
            depth_view,
            vertex_buffer: None,
        })
    }

    fn write_texture(
        queue: &::wgpu::Queue,
        texture: &::wgpu::Texture,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) {
        queue.write_texture(
            ::wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            rgba,
            ::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            ::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    impl RenderBackend for WgpuBackend {
        fn max_texture_dimension(&self) -> u32 {
            self.device.limits().max_texture_dimension_2d
        }

        fn upload_mesh(&mut self, vertices: &[Vertex]) -> Result<(), GpuError> {
            self.vertex_buffer = Some(self.device.create_buffer_init(
                &::wgpu::util::BufferInitDescriptor {
                    label: Some("worlddata-globe-vertices"),
                    contents: bytemuck::cast_slice(vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                },
            ));
            Ok(())
        }

        fn upload_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<(), GpuError> {
            let size = self.texture.size();
            if (size.width, size.height) != (width, height) {
                self.texture = create_globe_texture(&self.device, width, height);
                self.texture_bind_group = create_texture_bind_group(
                    &self.device,
                    &self.texture_layout,
                    &self.texture,
                    &self.sampler,
                );
            }
            write_texture(&self.queue, &self.texture, width, height, rgba);
            Ok(())
        }

        fn draw(&mut self, uniforms: &FrameUniforms, vertex_count: u32) -> Result<(), GpuError> {
            let Some(vertex_buffer) = &self.vertex_buffer else {
                return Err(GpuError::EmptyMesh);
            };
            let frame = self
                .surface
                .get_current_texture()
                .map_err(|e| GpuError::Surface(format!("acquire failed: {e}")))?;
            let view = frame
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());

            self.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

            let mut encoder = self
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("worlddata-frame-encoder"),
                });
            {
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("worlddata-globe-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color::BLACK),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
                rpass.set_bind_group(1, &self.texture_bind_group, &[]);
                rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
                rpass.draw(0..vertex_count, 0..1);
            }

            self.queue.submit(std::iter::once(encoder.finish()));
            frame.present();
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.config.width = width.max(1);
            self.config.height = height.max(1);
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{FrameUniforms, GpuError, RenderBackend};
    use scene::Vertex;

    #[derive(Debug, Default)]
    pub struct WgpuBackend;

    pub async fn init_from_canvas_id(_canvas_id: &str) -> Result<WgpuBackend, GpuError> {
        Err(GpuError::Unsupported("canvas rendering"))
    }

    impl RenderBackend for WgpuBackend {
        fn max_texture_dimension(&self) -> u32 {
            0
        }

        fn upload_mesh(&mut self, _vertices: &[Vertex]) -> Result<(), GpuError> {
            Err(GpuError::Unsupported("canvas rendering"))
        }

        fn upload_texture(&mut self, _width: u32, _height: u32, _rgba: &[u8]) -> Result<(), GpuError> {
            Err(GpuError::Unsupported("canvas rendering"))
        }

        fn draw(&mut self, _uniforms: &FrameUniforms, _vertex_count: u32) -> Result<(), GpuError> {
            Err(GpuError::Unsupported("canvas rendering"))
        }

        fn resize(&mut self, _width: u32, _height: u32) {}
    }
}

pub use imp::{WgpuBackend, init_from_canvas_id};
