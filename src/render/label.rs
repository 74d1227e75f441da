//! Minimal bitmap font for entity index labels.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

/// Glyph width in font pixels.
pub const GLYPH_WIDTH: u32 = 3;
/// Glyph height in font pixels.
pub const GLYPH_HEIGHT: u32 = 5;

/// 3x5 digit glyphs, one row per byte, bit 2 = leftmost column.
#[rustfmt::skip]
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Size in canvas pixels of `text` drawn at `scale`.
#[must_use]
pub fn label_size(text: &str, scale: u32) -> (u32, u32) {
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    ((n * (GLYPH_WIDTH + 1) - 1) * scale, GLYPH_HEIGHT * scale)
}

/// Draw `text` with its top-left corner at `(x, y)`.
///
/// Only ASCII digits have glyphs; any other character advances like a space.
/// Pixels falling off the canvas are clipped.
pub fn draw_label(fb: &mut Framebuffer, x: i32, y: i32, text: &str, scale: u32, color: Rgba) {
    let scale = scale.max(1) as i32;
    let advance = (GLYPH_WIDTH as i32 + 1) * scale;

    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = ch.to_digit(10).map(|d| DIGITS[d as usize]) else {
            continue;
        };
        let gx = x + i as i32 * advance;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_WIDTH as i32 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                let px = gx + col * scale;
                let py = y + row as i32 * scale;
                let (x0, y0) = (px.max(0), py.max(0));
                let (x1, y1) = (px + scale, py + scale);
                if x1 > x0 && y1 > y0 {
                    fb.fill_rect(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32, color);
                }
            }
        }
    }
}
