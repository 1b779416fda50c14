//! CPU-side texture preparation before upload.

/// Largest size not exceeding `max_dim` on either side that keeps the aspect ratio.
pub fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if width <= max_dim && height <= max_dim {
        return (width, height);
    }
    let scale = max_dim as f64 / width.max(height) as f64;
    (
        ((width as f64 * scale).floor() as u32).max(1),
        ((height as f64 * scale).floor() as u32).max(1),
    )
}

/// Nearest-neighbour resample of a tightly packed RGBA8 buffer.
pub fn resample_rgba(src: &[u8], width: u32, height: u32, out_w: u32, out_h: u32) -> Vec<u8> {
    if (out_w, out_h) == (width, height) {
        return src.to_vec();
    }
    let mut out = vec![0u8; out_w as usize * out_h as usize * 4];
    for y in 0..out_h {
        let sy = ((y as u64 * height as u64) / out_h as u64) as usize;
        for x in 0..out_w {
            let sx = ((x as u64 * width as u64) / out_w as u64) as usize;
            let s = (sy * width as usize + sx) * 4;
            let d = (y as usize * out_w as usize + x as usize) * 4;
            if let (Some(src_px), Some(dst_px)) = (src.get(s..s + 4), out.get_mut(d..d + 4)) {
                dst_px.copy_from_slice(src_px);
            }
        }
    }
    out
}
