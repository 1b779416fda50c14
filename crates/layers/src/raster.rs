//! Owned RGBA8 rasters and the few drawing primitives the overlays need.
//!
//! Pixels are stored row-major, top row first, straight (non-premultiplied)
//! alpha. Every write is bounds-checked; shapes that spill past an edge are
//! clipped, never wrapped (wrapping is the caller's business).

use std::fmt;

pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    ZeroSize { width: u32, height: u32 },
    SizeMismatch { expected: usize, actual: usize },
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::ZeroSize { width, height } => {
                write!(f, "raster must not be empty ({width}x{height})")
            }
            RasterError::SizeMismatch { expected, actual } => {
                write!(f, "expected {expected} RGBA bytes, got {actual}")
            }
            RasterError::DimensionMismatch { expected, actual } => write!(
                f,
                "raster is {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for RasterError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaRaster {
    /// Fully transparent raster.
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSize { width, height });
        }
        let n = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            pixels: color.repeat(n),
        })
    }

    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Transparent raster with the same dimensions.
    pub fn blank_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: vec![0; self.pixels.len()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn get(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        let o = self.offset(x, y)?;
        let p = &self.pixels[o..o + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Overwrites one pixel; out-of-range writes are dropped.
    pub fn put(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if let Some(o) = self.offset(x, y) {
            self.pixels[o..o + 4].copy_from_slice(&color);
        }
    }

    /// Source-over one pixel; out-of-range writes are dropped.
    pub fn blend(&mut self, x: i64, y: i64, color: [u8; 4]) {
        if let Some(o) = self.offset(x, y) {
            let dst = [
                self.pixels[o],
                self.pixels[o + 1],
                self.pixels[o + 2],
                self.pixels[o + 3],
            ];
            self.pixels[o..o + 4].copy_from_slice(&blend_over(color, dst));
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn is_transparent(&self) -> bool {
        self.pixels.chunks_exact(4).all(|p| p[3] == 0)
    }

    /// Paints `src` over `self` in place. Both rasters must share dimensions.
    pub fn composite_over(&mut self, src: &RgbaRaster) -> Result<(), RasterError> {
        if src.dimensions() != self.dimensions() {
            return Err(RasterError::DimensionMismatch {
                expected: self.dimensions(),
                actual: src.dimensions(),
            });
        }
        over_in_place(&mut self.pixels, &src.pixels);
        Ok(())
    }

    /// Filled axis-aligned ellipse. The pixel holding the center is always painted.
    pub fn fill_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: [u8; 4]) {
        let center = (cx.floor() as i64, cy.floor() as i64);
        let mut center_painted = false;
        self.for_each_in_box(cx, cy, rx, ry, |raster, x, y, d| {
            if d <= 1.0 {
                raster.blend(x, y, color);
                center_painted |= (x, y) == center;
            }
        });
        if !center_painted {
            self.blend(center.0, center.1, color);
        }
    }

    /// One-pixel outline of an axis-aligned ellipse.
    pub fn stroke_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, color: [u8; 4]) {
        let r_min = rx.min(ry);
        self.for_each_in_box(cx, cy, rx, ry, |raster, x, y, d| {
            if (d.sqrt() - 1.0).abs() * r_min <= 0.5 {
                raster.blend(x, y, color);
            }
        });
    }

    /// Visits pixels near the ellipse with their normalized squared distance
    /// from the center, measured at pixel centers.
    fn for_each_in_box<F>(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, mut f: F)
    where
        F: FnMut(&mut Self, i64, i64, f64),
    {
        if !(rx > 0.0 && ry > 0.0) {
            return;
        }
        let x0 = ((cx - rx - 1.0).floor() as i64).max(0);
        let x1 = ((cx + rx + 1.0).ceil() as i64).min(self.width as i64 - 1);
        let y0 = ((cy - ry - 1.0).floor() as i64).max(0);
        let y1 = ((cy + ry + 1.0).ceil() as i64).min(self.height as i64 - 1);
        for y in y0..=y1 {
            let dy = (y as f64 + 0.5 - cy) / ry;
            for x in x0..=x1 {
                let dx = (x as f64 + 0.5 - cx) / rx;
                f(self, x, y, dx * dx + dy * dy);
            }
        }
    }
}

/// Source-over of one RGBA8 buffer onto another, pixel by pixel.
fn over_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = blend_over([s[0], s[1], s[2], s[3]], [d[0], d[1], d[2], d[3]]);
        d.copy_from_slice(&out);
    }
}

/// Straight-alpha source-over.
pub fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}
