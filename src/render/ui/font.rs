//! A tiny built-in bitmap font, so the overlay needs no font files.

use std::sync::Arc;

use glam::{Vec2, Vec4};

use super::renderer::{DrawCommand, UIRenderMode};
use crate::abs::{PixelFormat, Texture2D, TextureConfig};
use crate::error::Result;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Atlas cell size; the extra column and row keep neighbours from bleeding.
const CELL: (u32, u32) = (GLYPH_WIDTH + 1, GLYPH_HEIGHT + 1);

/// Rows of each glyph, top first; bit 4 is the leftmost pixel. Covers
/// `' '..='`'` followed by `'{'..='~'`; lower case letters reuse upper case.
#[rustfmt::skip]
const GLYPHS: [[u8; 7]; 69] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04], // '!'
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // '#'
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // '$'
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // '%'
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // '&'
    [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // '('
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // ')'
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // '*'
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ','
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // '.'
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // '/'
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // '0'
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // '1'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // '2'
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // '3'
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // '4'
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // '5'
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // '6'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // '7'
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // '8'
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // '9'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // ':'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ';'
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // '<'
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // '='
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // '>'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // '?'
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // '@'
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'A'
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // 'B'
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // 'C'
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // 'D'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // 'E'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // 'F'
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // 'G'
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'H'
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'I'
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // 'J'
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // 'K'
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // 'L'
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // 'M'
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // 'N'
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'O'
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // 'P'
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // 'Q'
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // 'R'
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // 'S'
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // 'T'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'U'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'V'
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // 'W'
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // 'X'
    [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04], // 'Y'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // 'Z'
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // '['
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // '\\'
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ']'
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // '_'
    [0x08, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x02, 0x04, 0x04, 0x08, 0x04, 0x04, 0x02], // '{'
    [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // '|'
    [0x08, 0x04, 0x04, 0x02, 0x04, 0x04, 0x08], // '}'
    [0x00, 0x00, 0x08, 0x15, 0x02, 0x00, 0x00], // '~'
];

/// Index of the glyph drawn for `c`, if the font has one.
pub fn glyph_index(c: char) -> Option<usize> {
    match c.to_ascii_uppercase() {
        c @ ' '..='`' => Some(c as usize - ' ' as usize),
        c @ '{'..='~' => Some(65 + c as usize - '{' as usize),
        _ => None,
    }
}

/// Rasterises every glyph into a single-row RGBA atlas: white where the glyph
/// is set, transparent elsewhere. Returns `(width, height, pixels)`.
pub fn atlas_pixels() -> (u32, u32, Vec<u8>) {
    let width = CELL.0 * GLYPHS.len() as u32;
    let height = CELL.1;
    let mut pixels = vec![0u8; (width * height * 4) as usize];

    for (index, rows) in GLYPHS.iter().enumerate() {
        let origin_x = index as u32 * CELL.0;
        for (y, bits) in rows.iter().enumerate() {
            for x in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - x)) != 0 {
                    let offset = ((y as u32 * width + origin_x + x) * 4) as usize;
                    pixels[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
                }
            }
        }
    }
    (width, height, pixels)
}

/// Where each glyph sits in the atlas and how big it is drawn.
#[derive(Debug, Clone, Copy)]
pub struct GlyphMetrics {
    /// Height of a line in pixels; glyphs are scaled to fit.
    pub size: f32,
}

impl GlyphMetrics {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    /// On-screen size of one character cell.
    pub fn char_size(&self) -> Vec2 {
        Vec2::new(self.size * CELL.0 as f32 / CELL.1 as f32, self.size)
    }

    pub fn glyph_uvs(c: char) -> Option<[Vec2; 2]> {
        let index = glyph_index(c)?;
        let cell_u = 1.0 / GLYPHS.len() as f32;
        let uv_min = Vec2::new(index as f32 * cell_u, 0.0);
        Some([uv_min, uv_min + Vec2::new(cell_u, 1.0)])
    }

    pub fn measure(&self, text: &str) -> Vec2 {
        let char_size = self.char_size();
        let (columns, lines) = text
            .split('\n')
            .fold((0, 0), |(columns, lines), line| {
                (columns.max(line.chars().count()), lines + 1)
            });
        Vec2::new(columns as f32 * char_size.x, lines as f32 * char_size.y)
    }

    /// Screen and atlas rectangles for every visible glyph of `text`, relative
    /// to the top-left corner of the text. Unknown characters advance the
    /// cursor without drawing.
    pub fn layout(&self, text: &str) -> Vec<([Vec2; 2], [Vec2; 2])> {
        let char_size = self.char_size();
        let mut quads = Vec::new();
        let mut cursor = Vec2::ZERO;

        for line in text.split('\n') {
            for c in line.chars() {
                if c != ' ' {
                    if let Some(uvs) = Self::glyph_uvs(c) {
                        quads.push(([cursor, cursor + char_size], uvs));
                    }
                }
                cursor.x += char_size.x;
            }
            cursor.x = 0.0;
            cursor.y += char_size.y;
        }
        quads
    }
}

/// The bitmap font uploaded to the GPU.
pub struct BitmapFont {
    atlas: Texture2D,
}

impl BitmapFont {
    pub fn new(gl: &Arc<glow::Context>) -> Result<Self> {
        let (width, height, pixels) = atlas_pixels();
        let config = TextureConfig::default()
            .with_format(PixelFormat::Rgba)
            .with_wrap(glow::CLAMP_TO_EDGE)
            .with_filters(glow::NEAREST, glow::NEAREST);
        let mut atlas = Texture2D::new(gl, config)?;
        atlas.generate(width, height, Some(&pixels), false);
        Ok(Self { atlas })
    }

    /// Draw commands for `text` with its top-left corner at `position`.
    pub fn text(&self, text: &str, position: Vec2, size: f32, color: Vec4) -> Vec<DrawCommand> {
        let mode = UIRenderMode::Texture(self.atlas.handle(), color);
        GlyphMetrics::new(size)
            .layout(text)
            .into_iter()
            .map(|(rect, uv_rect)| {
                DrawCommand {
                    rect,
                    uv_rect,
                    mode,
                }
                .offset(position)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_case_uses_upper_case_glyphs() {
        assert_eq!(glyph_index(' '), Some(0));
        assert_eq!(glyph_index('A'), Some(33));
        assert_eq!(glyph_index('a'), glyph_index('A'));
        assert_eq!(glyph_index('z'), glyph_index('Z'));
        assert_eq!(glyph_index('`'), Some(64));
        assert_eq!(glyph_index('~'), Some(68));
        assert_eq!(glyph_index('\u{e9}'), None);
        assert_eq!(glyph_index('\t'), None);
    }

    #[test]
    fn atlas_has_one_cell_per_glyph() {
        let (width, height, pixels) = atlas_pixels();
        assert_eq!((width, height), (6 * 69, 8));
        assert_eq!(pixels.len(), (width * height * 4) as usize);

        let alpha = |x: u32, y: u32| pixels[((y * width + x) * 4 + 3) as usize];
        // space is empty
        assert!((0..6).all(|x| (0..8).all(|y| alpha(x, y) == 0)));
        // '|' is a vertical bar in the middle column of its cell
        let bar = 6 * glyph_index('|').unwrap() as u32;
        assert!((0..7).all(|y| alpha(bar + 2, y) == 255));
        assert!((0..7).all(|y| alpha(bar + 1, y) == 0));
        // spacing row and column stay clear
        assert!((0..width).all(|x| alpha(x, 7) == 0));
    }

    #[test]
    fn glyph_uvs_cover_one_cell() {
        let [min, max] = GlyphMetrics::glyph_uvs('!').unwrap();
        assert!((min.x - 1.0 / 69.0).abs() < 1e-6);
        assert!((max.x - 2.0 / 69.0).abs() < 1e-6);
        assert_eq!((min.y, max.y), (0.0, 1.0));
    }

    #[test]
    fn measure_uses_longest_line() {
        let metrics = GlyphMetrics::new(16.0);
        assert_eq!(metrics.char_size(), Vec2::new(12.0, 16.0));
        assert_eq!(metrics.measure("FPS 60\nab"), Vec2::new(72.0, 32.0));
        assert_eq!(metrics.measure(""), Vec2::new(0.0, 16.0));
    }

    #[test]
    fn layout_skips_spaces_and_wraps_lines() {
        let metrics = GlyphMetrics::new(8.0);
        let quads = metrics.layout("A B\nC");
        assert_eq!(quads.len(), 3);
        assert_eq!(quads[0].0, [Vec2::ZERO, Vec2::new(6.0, 8.0)]);
        assert_eq!(quads[1].0[0], Vec2::new(12.0, 0.0));
        assert_eq!(quads[2].0[0], Vec2::new(0.0, 8.0));
    }
}
