//! A tiny 5x7 bitmap font for all in-framebuffer text.
//!
//! Glyphs are stored as seven row bytes, bit 4 being the leftmost column.
//! Lowercase folds to uppercase and anything unknown renders as a hollow
//! box, so a bad string is visible rather than invisible. Pixel sizes come
//! from an integer `scale`: the layout constants in the screen code pick 2
//! for body text, 3 for menu rows, 5 for titles, 8 for the logo.

use crate::renderer::framebuffer::PixelBuffer;

/// Glyph cell width in font pixels.
pub const GLYPH_W: usize = 5;
/// Glyph cell height in font pixels.
pub const GLYPH_H: usize = 7;

/// Horizontal advance per character at scale 1, including the 1px gap.
const ADVANCE: usize = GLYPH_W + 1;

const UNKNOWN: [u8; 7] = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

#[rustfmt::skip]
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ' ' => [0, 0, 0, 0, 0, 0, 0],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '"' => [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        _ => UNKNOWN,
    }
}

/// Pixel width of `text` at the given scale.
pub fn text_width(text: &str, scale: usize) -> i32 {
    let n = text.chars().count();
    if n == 0 {
        return 0;
    }
    (n * ADVANCE * scale - scale) as i32
}

/// Draws `text` with its top-left corner at `(x, y)`.
pub fn draw_text(buf: &mut PixelBuffer, x: i32, y: i32, text: &str, color: [u8; 4], scale: usize) {
    let mut pen = x;
    for ch in text.chars() {
        let rows = glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits >> (GLYPH_W - 1 - col) & 1 == 1 {
                    buf.fill_rect(
                        pen + (col * scale) as i32,
                        y + (row * scale) as i32,
                        scale as i32,
                        scale as i32,
                        color,
                    );
                }
            }
        }
        pen += (ADVANCE * scale) as i32;
    }
}

/// Draws `text` horizontally centered on `cx`.
pub fn draw_text_centered(
    buf: &mut PixelBuffer,
    cx: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
    scale: usize,
) {
    draw_text(buf, cx - text_width(text, scale) / 2, y, text, color, scale);
}

/// Draws `text` centered on `cx` with stacked outlines: each `(color,
/// radius)` layer is stamped at the eight compass offsets of its radius, in
/// order, then the inner color goes on top.
pub fn draw_text_outlined(
    buf: &mut PixelBuffer,
    cx: i32,
    y: i32,
    text: &str,
    layers: &[([u8; 4], i32)],
    inner: [u8; 4],
    scale: usize,
) {
    let x = cx - text_width(text, scale) / 2;
    for &(color, rad) in layers {
        for &(ox, oy) in &[
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ] {
            draw_text(buf, x + ox * rad, y + oy * rad, text, color, scale);
        }
    }
    draw_text(buf, x, y, text, inner, scale);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_gaps() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 2), 10);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn lowercase_folds_to_uppercase() {
        let mut a = PixelBuffer::new(10, 10);
        let mut b = PixelBuffer::new(10, 10);
        draw_text(&mut a, 0, 0, "a", [255, 255, 255, 255], 1);
        draw_text(&mut b, 0, 0, "A", [255, 255, 255, 255], 1);
        assert_eq!(a.bytes(), b.bytes());
    }

    #[test]
    fn draws_inside_the_cell() {
        let mut buf = PixelBuffer::new(12, 16);
        draw_text(&mut buf, 0, 0, "T", [255, 0, 0, 255], 2);
        // Top row of 'T' spans the full five columns at scale 2.
        assert_eq!(&buf.bytes()[0..4], &[255, 0, 0, 255]);
        let i = (1 * 12 + 9) * 4;
        assert_eq!(&buf.bytes()[i..i + 4], &[255, 0, 0, 255]);
        // Row below the glyph stays empty.
        let below = (14 * 12) * 4;
        assert!(buf.bytes()[below..below + 12 * 4].iter().all(|&b| b == 0));
    }
}
