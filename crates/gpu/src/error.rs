use std::fmt;

/// Failure to bring up or feed the GPU. Fatal to the render session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    Surface(String),
    Adapter(String),
    Device(String),
    Shader { label: &'static str, message: String },
    TextureTooLarge { width: u32, height: u32, max: u32 },
    TextureSize { expected: usize, actual: usize },
    EmptyMesh,
    Unsupported(&'static str),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::Surface(m) => write!(f, "surface error: {m}"),
            GpuError::Adapter(m) => write!(f, "adapter error: {m}"),
            GpuError::Device(m) => write!(f, "device error: {m}"),
            GpuError::Shader { label, message } => write!(f, "shader `{label}` failed: {message}"),
            GpuError::TextureTooLarge { width, height, max } => {
                write!(f, "texture {width}x{height} exceeds device limit {max}")
            }
            GpuError::TextureSize { expected, actual } => {
                write!(f, "texture data is {actual} bytes, expected {expected}")
            }
            GpuError::EmptyMesh => write!(f, "mesh has no vertices"),
            GpuError::Unsupported(what) => write!(f, "{what} is not supported on this target"),
        }
    }
}

impl std::error::Error for GpuError {}
