//! CPU pixel surfaces the software renderer draws into.
//!
//! The world is raycast into a small [`PixelBuffer`] and integer-upscaled
//! into a larger compose buffer where the HUD, text, and overlays are drawn
//! at full resolution. The compose buffer's bytes are uploaded to the GPU
//! verbatim, so everything here is tightly packed RGBA8.

use crate::renderer::textures::Texture;

/// A tightly packed RGBA8 surface with y pointing down.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// Width in pixels.
    pub w: usize,
    /// Height in pixels.
    pub h: usize,
    data: Vec<u8>,
}

/// Widens an RGB triple into an opaque RGBA pixel.
pub fn opaque(c: [u8; 3]) -> [u8; 4] {
    [c[0], c[1], c[2], 255]
}

impl PixelBuffer {
    /// Creates a buffer of the given size, cleared to transparent black.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h * 4],
        }
    }

    /// The raw bytes, row-major RGBA8. Exactly `w * h * 4` long.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Overwrites every pixel with `color`.
    pub fn fill(&mut self, color: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Overwrites the pixels of a rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, rw: i32, rh: i32, color: [u8; 4]) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + rw).min(self.w as i32);
        let y1 = (y + rh).min(self.h as i32);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        for yy in y0..y1 {
            let row = (yy as usize * self.w + x0 as usize) * 4;
            for px in self.data[row..row + (x1 - x0) as usize * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }

    /// Overwrites a single pixel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set_px(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x >= 0 && (x as usize) < self.w && y >= 0 && (y as usize) < self.h {
            let i = (y as usize * self.w + x as usize) * 4;
            self.data[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Source-over blends a single pixel. Out-of-range coordinates are
    /// ignored; fully transparent and fully opaque sources take fast paths.
    #[inline]
    pub fn blend_px(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let a = color[3] as u32;
        if a == 0 {
            return;
        }
        if a == 255 {
            self.set_px(x, y, color);
            return;
        }
        if x < 0 || x as usize >= self.w || y < 0 || y as usize >= self.h {
            return;
        }
        let i = (y as usize * self.w + x as usize) * 4;
        let inv = 255 - a;
        for c in 0..3 {
            let src = color[c] as u32;
            let dst = self.data[i + c] as u32;
            self.data[i + c] = ((src * a + dst * inv + 127) / 255) as u8;
        }
        let da = self.data[i + 3] as u32;
        self.data[i + 3] = (a + (da * inv + 127) / 255).min(255) as u8;
    }

    /// Source-over blends a rectangle, clipped to the buffer.
    pub fn blend_rect(&mut self, x: i32, y: i32, rw: i32, rh: i32, color: [u8; 4]) {
        for yy in y..y + rh {
            for xx in x..x + rw {
                self.blend_px(xx, yy, color);
            }
        }
    }

    /// Overwrites a filled circle, clipped to the buffer.
    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: [u8; 4]) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_px(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Overwrites a line of the given thickness, Bresenham-stepped with a
    /// square stamp at each point.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 4], width: i32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        let half = width / 2;
        loop {
            for oy in -half..width - half {
                for ox in -half..width - half {
                    self.set_px(x + ox, y + oy, color);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Replaces this buffer's pixels with `src` scaled up by an integer
    /// factor, nearest-neighbor. The buffer must be exactly `factor` times
    /// the source in both dimensions.
    pub fn upscale_from(&mut self, src: &PixelBuffer, factor: usize) {
        debug_assert_eq!(self.w, src.w * factor);
        debug_assert_eq!(self.h, src.h * factor);
        for sy in 0..src.h {
            let src_row = sy * src.w * 4;
            // Expand one source row, then stamp it `factor` times.
            let first_dst = sy * factor * self.w * 4;
            for sx in 0..src.w {
                let s = src_row + sx * 4;
                let px: [u8; 4] = src.data[s..s + 4].try_into().unwrap();
                let d = first_dst + sx * factor * 4;
                for k in 0..factor {
                    self.data[d + k * 4..d + k * 4 + 4].copy_from_slice(&px);
                }
            }
            let (head, tail) = self.data.split_at_mut(first_dst + self.w * 4);
            let row = &head[first_dst..];
            for k in 1..factor {
                let off = (k - 1) * self.w * 4;
                tail[off..off + self.w * 4].copy_from_slice(row);
            }
        }
    }

    /// Source-over blits another buffer at `(x, y)`, clipped.
    pub fn blit_alpha(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        for sy in 0..src.h as i32 {
            for sx in 0..src.w as i32 {
                let i = (sy as usize * src.w + sx as usize) * 4;
                let px: [u8; 4] = src.data[i..i + 4].try_into().unwrap();
                self.blend_px(x + sx, y + sy, px);
            }
        }
    }

    /// Scales a texture to `dw` x `dh` (nearest-neighbor) and source-over
    /// blits it at `(x, y)`. Color channels are multiplied by
    /// `brightness / 255` on the way, which is how the HUD dims
    /// not-yet-collected seal icons.
    pub fn blit_scaled(
        &mut self,
        tex: &Texture,
        x: i32,
        y: i32,
        dw: i32,
        dh: i32,
        brightness: u8,
    ) {
        if dw <= 0 || dh <= 0 {
            return;
        }
        let b = brightness as u32;
        for dy in 0..dh {
            let sy = (dy as usize * tex.h) / dh as usize;
            for dx in 0..dw {
                let sx = (dx as usize * tex.w) / dw as usize;
                let mut px = tex.at(sx, sy);
                if b < 255 {
                    for c in px.iter_mut().take(3) {
                        *c = ((*c as u32 * b) / 255) as u8;
                    }
                }
                self.blend_px(x + dx, y + dy, px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut buf = PixelBuffer::new(4, 4);
        buf.fill_rect(-2, -2, 3, 3, [10, 20, 30, 255]);
        // Only the overlapping 1x1 corner is written.
        assert_eq!(&buf.bytes()[0..4], &[10, 20, 30, 255]);
        assert_eq!(&buf.bytes()[4..8], &[0, 0, 0, 0]);
        // Fully outside is a no-op, on either axis alone or both.
        buf.fill_rect(10, 10, 5, 5, [1, 1, 1, 255]);
        buf.fill_rect(10, 0, 5, 5, [1, 1, 1, 255]);
        buf.fill_rect(0, 10, 5, 5, [1, 1, 1, 255]);
        assert_eq!(&buf.bytes()[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn blend_px_is_source_over() {
        let mut buf = PixelBuffer::new(1, 1);
        buf.set_px(0, 0, [100, 100, 100, 255]);
        buf.blend_px(0, 0, [200, 0, 0, 128]);
        let px = &buf.bytes()[0..4];
        // 200*128/255 + 100*127/255, rounded.
        assert_eq!(px[0], 150);
        assert_eq!(px[1], 50);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn upscale_maps_blocks() {
        let mut src = PixelBuffer::new(2, 1);
        src.set_px(0, 0, [255, 0, 0, 255]);
        src.set_px(1, 0, [0, 255, 0, 255]);
        let mut dst = PixelBuffer::new(6, 3);
        dst.upscale_from(&src, 3);
        // Left 3x3 block is red, right 3x3 block is green, every row.
        for y in 0..3i32 {
            for x in 0..3i32 {
                let i = (y as usize * 6 + x as usize) * 4;
                assert_eq!(&dst.bytes()[i..i + 3], &[255, 0, 0]);
                let j = (y as usize * 6 + (x + 3) as usize) * 4;
                assert_eq!(&dst.bytes()[j..j + 3], &[0, 255, 0]);
            }
        }
    }

    #[test]
    fn blit_scaled_dims_by_brightness() {
        let tex = Texture::filled(2, 2, [200, 100, 50, 255]);
        let mut buf = PixelBuffer::new(2, 2);
        buf.blit_scaled(&tex, 0, 0, 2, 2, 110);
        let px = &buf.bytes()[0..4];
        assert_eq!(px[0], (200u32 * 110 / 255) as u8);
        assert_eq!(px[1], (100u32 * 110 / 255) as u8);
        assert_eq!(px[3], 255);
    }
}
