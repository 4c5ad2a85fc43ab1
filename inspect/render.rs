//! Presentation helpers for raw IDX samples.
//!
//! Samples store ink as high intensity. The bitmap renderer inverts each byte
//! (`255 - value`) to draw dark strokes on a light background.

use image::{Rgba, RgbaImage};

/// Renders one `rows × cols` sample as an RGBA image with a fixed alpha.
pub fn to_rgba_image(pixels: &[u8], rows: usize, cols: usize, alpha: u8) -> Result<RgbaImage, String> {
    if pixels.len() != rows * cols {
        return Err(format!(
            "sample has {} bytes, expected {}x{}={}",
            pixels.len(),
            rows,
            cols,
            rows * cols
        ));
    }
    let width = u32::try_from(cols).map_err(|e| e.to_string())?;
    let height = u32::try_from(rows).map_err(|e| e.to_string())?;
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let v = 255 - pixels[y as usize * cols + x as usize];
        Rgba([v, v, v, alpha])
    }))
}

/// Five-step ASCII ramp, darkest glyph for the strongest ink.
const RAMP: [char; 5] = [' ', '.', ':', '*', '#'];

/// Renders a sample as text, one line per pixel row.
pub fn to_ascii(pixels: &[u8], cols: usize) -> String {
    if cols == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(pixels.len() + pixels.len() / cols);
    for row in pixels.chunks(cols) {
        for &p in row {
            out.push(RAMP[p as usize * (RAMP.len() - 1) / 255]);
        }
        out.push('\n');
    }
    out
}
