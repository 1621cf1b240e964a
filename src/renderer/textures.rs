//! Procedurally painted textures.
//!
//! Nothing is loaded from disk: every surface the game shows is generated at
//! startup from a seeded RNG plus analytic shapes, so two launches always
//! produce the same wall. The painting routines run once and are written for
//! clarity, not speed.

use crate::config::TEXTURE_SIZE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An RGBA8 image sampled by the raycaster and the HUD.
#[derive(Debug, Clone)]
pub struct Texture {
    /// Width in pixels.
    pub w: usize,
    /// Height in pixels.
    pub h: usize,
    data: Vec<u8>,
}

impl Texture {
    /// Creates a fully transparent texture.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0; w * h * 4],
        }
    }

    /// Creates a texture filled with one color.
    pub fn filled(w: usize, h: usize, color: [u8; 4]) -> Self {
        let mut t = Self::new(w, h);
        t.fill_rect(0, 0, w as i32, h as i32, color);
        t
    }

    /// The raw bytes, row-major RGBA8.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Overwrites one pixel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x < self.w && y < self.h {
            let i = (y * self.w + x) * 4;
            self.data[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Reads one pixel. The caller keeps coordinates in range.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.w + x) * 4;
        self.data[i..i + 4].try_into().unwrap()
    }

    /// Overwrites the pixels of a rectangle, clipped to the texture.
    pub fn fill_rect(&mut self, x: i32, y: i32, rw: i32, rh: i32, color: [u8; 4]) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + rw).min(self.w as i32);
        let y1 = (y + rh).min(self.h as i32);
        for yy in y0..y1 {
            for xx in x0..x1 {
                let i = (yy as usize * self.w + xx as usize) * 4;
                self.data[i..i + 4].copy_from_slice(&color);
            }
        }
    }
}

/// Every texture the game draws, painted once at startup.
#[derive(Debug, Clone)]
pub struct TextureSet {
    /// Wall surface used by the raycaster.
    pub wall: Texture,
    /// Wall surface of the exit door cell and its slab plane.
    pub door: Texture,
    /// Stalker billboard sprite.
    pub stalker: Texture,
    /// Full-screen face shown while the screamer runs.
    pub screamer: Texture,
    /// Seal pickup billboard and HUD icon.
    pub seal: Texture,
    /// HUD life marker.
    pub heart: Texture,
}

impl TextureSet {
    /// Paints the whole set. The seed is fixed so every run of the binary
    /// shows the same world.
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0x0b11_e77e);
        let wall = wall_texture(&mut rng);
        let door = door_texture(&mut rng, &wall);
        let stalker = stalker_texture(&mut rng);
        let screamer = screamer_texture(&mut rng);
        let seal = seal_texture(&mut rng);
        let heart = heart_texture();
        Self {
            wall,
            door,
            stalker,
            screamer,
            seal,
            heart,
        }
    }
}

impl Default for TextureSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Aged plaster: a warm base, faded vertical stripes, blotches, speckles.
fn wall_texture(rng: &mut StdRng) -> Texture {
    let n = TEXTURE_SIZE as i32;
    let mut tex = Texture::filled(TEXTURE_SIZE, TEXTURE_SIZE, [210, 198, 120, 255]);

    let mut x = 0;
    while x < n {
        let c = [
            (200 + rng.gen_range(-8..=8)) as u8,
            (190 + rng.gen_range(-8..=8)) as u8,
            (115 + rng.gen_range(-8..=8)) as u8,
            255,
        ];
        tex.fill_rect(x, 0, 6, n, c);
        x += 18;
    }

    for _ in 0..1400 {
        let d = rng.gen_range(1..=4);
        let bx = rng.gen_range(0..n - d);
        let by = rng.gen_range(0..n - d);
        let c = rng.gen_range(140..=205);
        tex.fill_rect(bx, by, d, d, [c as u8, (c - 8) as u8, (c - 40) as u8, 255]);
    }

    for _ in 0..9000 {
        let sx = rng.gen_range(0..n) as usize;
        let sy = rng.gen_range(0..n) as usize;
        let c = rng.gen_range(160..=220);
        tex.set(sx, sy, [c as u8, (c - 10) as u8, (c - 55) as u8, 255]);
    }

    tex
}

/// The wall texture with a wooden slab, iron bands, and a handle painted
/// over it, so the door cell reads as furniture in the same wall.
fn door_texture(rng: &mut StdRng, wall: &Texture) -> Texture {
    let mut tex = wall.clone();
    let n = TEXTURE_SIZE as i32;

    let (sx, sy, sw, sh) = (24, 16, n - 48, n - 16);
    tex.fill_rect(sx, sy, sw, sh, [74, 52, 34, 255]);

    // Plank seams.
    for k in 1..4 {
        tex.fill_rect(sx + k * sw / 4, sy, 2, sh, [52, 36, 22, 255]);
    }
    // Grain.
    for _ in 0..900 {
        let gx = rng.gen_range(sx..sx + sw) as usize;
        let gy = rng.gen_range(sy..sy + sh) as usize;
        let c = rng.gen_range(58..=96);
        tex.set(gx, gy, [c as u8, (c * 7 / 10) as u8, (c / 2) as u8, 255]);
    }

    // Iron bands with rivets.
    for &by in &[64, 176] {
        tex.fill_rect(sx, by, sw, 14, [46, 46, 52, 255]);
        let mut rx = sx + 10;
        while rx < sx + sw - 8 {
            tex.fill_rect(rx, by + 4, 5, 5, [96, 96, 104, 255]);
            rx += 26;
        }
    }

    // Handle ring.
    let (hx, hy) = (n - 72, 134);
    for dy in -16..=16 {
        for dx in -16..=16 {
            let r2 = dx * dx + dy * dy;
            if (100..=196).contains(&r2) {
                tex.set((hx + dx) as usize, (hy + dy) as usize, [168, 150, 64, 255]);
            }
        }
    }

    tex
}

/// A pale, gaunt face on a transparent background: head ellipse, sunken
/// eyes, a gaping mouth with a row of teeth.
fn stalker_texture(rng: &mut StdRng) -> Texture {
    let n = TEXTURE_SIZE;
    let mut tex = Texture::new(n, n);

    for y in 0..n {
        for x in 0..n {
            let fx = (x as f32 - 128.0) / 76.0;
            let fy = (y as f32 - 120.0) / 96.0;
            let d = fx * fx + fy * fy;
            if d <= 1.0 {
                let j = rng.gen_range(-7..=7);
                let base = (224.0 * (1.0 - 0.35 * d)) as i32;
                tex.set(
                    x,
                    y,
                    [
                        (base + j).clamp(0, 255) as u8,
                        (base - 6 + j).clamp(0, 255) as u8,
                        (base - 22 + j).clamp(0, 255) as u8,
                        255,
                    ],
                );
            }
        }
    }

    for &(ex, ey) in &[(94, 92), (162, 92)] {
        paint_ellipse(&mut tex, ex, ey, 19.0, 24.0, [16, 10, 12, 255]);
        paint_ellipse(&mut tex, ex, ey + 6, 6.0, 6.0, [172, 24, 24, 255]);
    }

    paint_ellipse(&mut tex, 128, 178, 36.0, 30.0, [10, 6, 8, 255]);
    for k in 0..6 {
        tex.fill_rect(98 + k * 11, 150, 7, 12, [214, 206, 182, 255]);
    }

    // Grime streaks over the skin.
    for _ in 0..500 {
        let x = rng.gen_range(52..204);
        let y = rng.gen_range(28..214);
        let fx = (x as f32 - 128.0) / 76.0;
        let fy = (y as f32 - 120.0) / 96.0;
        if fx * fx + fy * fy <= 1.0 {
            let c = rng.gen_range(70..=110);
            tex.set(x as usize, y as usize, [c as u8, (c - 14) as u8, (c - 24) as u8, 255]);
        }
    }

    tex
}

/// The jumpscare variant: opaque black backdrop, a larger face with a torn
/// mouth, bloodshot veins walked in from the edges.
fn screamer_texture(rng: &mut StdRng) -> Texture {
    let n = TEXTURE_SIZE;
    let mut tex = Texture::filled(n, n, [0, 0, 0, 255]);

    for y in 0..n {
        for x in 0..n {
            let fx = (x as f32 - 128.0) / 96.0;
            let fy = (y as f32 - 124.0) / 118.0;
            let d = fx * fx + fy * fy;
            if d <= 1.0 {
                let j = rng.gen_range(-10..=10);
                let base = (216.0 * (1.0 - 0.45 * d)) as i32;
                tex.set(
                    x,
                    y,
                    [
                        (base + j).clamp(0, 255) as u8,
                        (base - 10 + j).clamp(0, 255) as u8,
                        (base - 28 + j).clamp(0, 255) as u8,
                        255,
                    ],
                );
            }
        }
    }

    for &(ex, ey) in &[(86, 88), (170, 88)] {
        paint_ellipse(&mut tex, ex, ey, 24.0, 30.0, [12, 6, 8, 255]);
        paint_ellipse(&mut tex, ex, ey + 8, 8.0, 8.0, [190, 20, 20, 255]);
    }
    paint_ellipse(&mut tex, 128, 188, 44.0, 52.0, [8, 4, 6, 255]);
    for k in 0..7 {
        tex.fill_rect(94 + k * 11, 142, 7, 16, [206, 198, 174, 255]);
    }

    // Veins: jittered walks from the rim toward the eyes.
    for _ in 0..24 {
        let mut vx = rng.gen_range(0..n as i32) as f32;
        let mut vy = if rng.gen_range(0..2) == 0 { 0.0 } else { (n - 1) as f32 };
        let (tx, ty) = if vx < 128.0 { (86.0, 88.0) } else { (170.0, 88.0) };
        for _ in 0..140 {
            let dx = tx - vx;
            let dy = ty - vy;
            let len = (dx * dx + dy * dy).sqrt().max(1.0);
            vx += dx / len * 1.8 + rng.gen_range(-1.2..1.2);
            vy += dy / len * 1.8 + rng.gen_range(-1.2..1.2);
            tex.fill_rect(vx as i32, vy as i32, 2, 2, [120, 16, 16, 255]);
            if len < 6.0 {
                break;
            }
        }
    }

    tex
}

/// An engraved amber disc with ring bands and a bar-and-crossbar sigil.
fn seal_texture(rng: &mut StdRng) -> Texture {
    let n = TEXTURE_SIZE;
    let mut tex = Texture::new(n, n);

    for y in 0..n {
        for x in 0..n {
            let dx = x as f32 - 128.0;
            let dy = y as f32 - 128.0;
            let r = (dx * dx + dy * dy).sqrt();
            if r <= 100.0 {
                let radial = 1.0 - (r / 100.0) * 0.45;
                let j = rng.gen_range(-6..=6);
                let mut px = [
                    ((236.0 * radial) as i32 + j).clamp(0, 255) as u8,
                    ((196.0 * radial) as i32 + j).clamp(0, 255) as u8,
                    ((88.0 * radial) as i32 + j).clamp(0, 255) as u8,
                    255,
                ];
                if (88.0..=98.0).contains(&r) || (58.0..=64.0).contains(&r) {
                    px = [140, 104, 34, 255];
                }
                tex.set(x, y, px);
            }
        }
    }

    // Sigil.
    tex.fill_rect(122, 66, 12, 124, [124, 90, 28, 255]);
    tex.fill_rect(96, 100, 64, 10, [124, 90, 28, 255]);
    tex.fill_rect(104, 140, 48, 10, [124, 90, 28, 255]);

    // Pitting.
    for _ in 0..300 {
        let dx = rng.gen_range(-96..=96);
        let dy = rng.gen_range(-96..=96);
        if dx * dx + dy * dy <= 96 * 96 {
            let c = rng.gen_range(120..=160);
            tex.set(
                (128 + dx) as usize,
                (128 + dy) as usize,
                [c as u8, (c * 3 / 4) as u8, (c / 4) as u8, 255],
            );
        }
    }

    tex
}

/// A crimson heart from the classic implicit curve, with a small highlight.
fn heart_texture() -> Texture {
    let n = 64;
    let mut tex = Texture::new(n, n);
    for y in 0..n {
        for x in 0..n {
            if heart_inside(x, y) {
                tex.set(x, y, [206, 36, 52, 255]);
            }
        }
    }
    // Highlight spot on the upper-left lobe.
    for y in 0..n {
        for x in 0..n {
            let dx = x as i32 - 22;
            let dy = y as i32 - 20;
            if dx * dx + dy * dy <= 25 && heart_inside(x, y) {
                tex.set(x, y, [238, 120, 132, 255]);
            }
        }
    }
    tex
}

fn heart_inside(x: usize, y: usize) -> bool {
    let u = (x as f32 - 31.5) / 22.0;
    let v = (30.0 - y as f32) / 22.0;
    let a = u * u + v * v - 1.0;
    a * a * a - u * u * v * v * v <= 0.0
}

fn paint_ellipse(tex: &mut Texture, cx: i32, cy: i32, rx: f32, ry: f32, color: [u8; 4]) {
    let (ix, iy) = (rx.ceil() as i32, ry.ceil() as i32);
    for dy in -iy..=iy {
        for dx in -ix..=ix {
            let fx = dx as f32 / rx;
            let fy = dy as f32 / ry;
            if fx * fx + fy * fy <= 1.0 {
                let x = cx + dx;
                let y = cy + dy;
                if x >= 0 && y >= 0 {
                    tex.set(x as usize, y as usize, color);
                }
            }
        }
    }
}

/// Per-pixel vignette alpha for a surface of the given size: zero at the
/// center, 170 at the corners, eased with a 1.8 exponent.
pub fn vignette_alpha(w: usize, h: usize) -> Vec<u8> {
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let maxd = (cx * cx + cy * cy).sqrt();
    let mut mask = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            mask.push((170.0 * (d / maxd).powf(1.8)) as u8);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_set_is_deterministic() {
        let a = TextureSet::new();
        let b = TextureSet::new();
        assert_eq!(a.wall.bytes(), b.wall.bytes());
        assert_eq!(a.stalker.bytes(), b.stalker.bytes());
        assert_eq!(a.seal.bytes(), b.seal.bytes());
    }

    #[test]
    fn wall_is_fully_opaque() {
        let set = TextureSet::new();
        assert!(set.wall.bytes().chunks_exact(4).all(|px| px[3] == 255));
        assert!(set.door.bytes().chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn sprites_keep_transparent_corners() {
        let set = TextureSet::new();
        assert_eq!(set.stalker.at(0, 0)[3], 0);
        assert_eq!(set.seal.at(0, 0)[3], 0);
        assert_eq!(set.seal.at(128, 128)[3], 255);
        assert_eq!(set.heart.at(0, 0)[3], 0);
        assert_eq!(set.heart.at(32, 30)[3], 255);
    }

    #[test]
    fn vignette_is_dark_at_corners_only() {
        let mask = vignette_alpha(100, 60);
        assert_eq!(mask[0], 170);
        assert_eq!(mask[30 * 100 + 50], 0);
    }
}
