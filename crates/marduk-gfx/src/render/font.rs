//! Bitmap font metrics.
//!
//! Fonts are pre-rasterized into a single atlas texture; this type only holds
//! where each glyph lives in the atlas and how to place it. See
//! [`crate::text::bake_font`] for building one from a TrueType file.

use std::collections::HashMap;

use super::texture::Texture;

/// Placement of one glyph, in atlas pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CharData {
    /// Atlas region.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Offset of the quad from the pen position (top-left, +y down).
    pub x_offset: f32,
    pub y_offset: f32,
    /// Pen advance after this glyph.
    pub x_advance: f32,
}

#[derive(Debug, Clone)]
pub struct BitmapFont {
    texture: Texture,
    line_height: f32,
    glyphs: HashMap<char, CharData>,
    kerning: HashMap<(char, char), f32>,
}

impl BitmapFont {
    pub fn new(texture: Texture, line_height: f32) -> Self {
        Self {
            texture,
            line_height,
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
        }
    }

    pub fn with_glyph(mut self, ch: char, data: CharData) -> Self {
        self.glyphs.insert(ch, data);
        self
    }

    pub fn with_kerning(mut self, left: char, right: char, amount: f32) -> Self {
        self.kerning.insert((left, right), amount);
        self
    }

    pub fn insert_glyph(&mut self, ch: char, data: CharData) {
        self.glyphs.insert(ch, data);
    }

    pub fn insert_kerning(&mut self, left: char, right: char, amount: f32) {
        self.kerning.insert((left, right), amount);
    }

    #[inline]
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    #[inline]
    pub fn char_data(&self, ch: char) -> Option<&CharData> {
        self.glyphs.get(&ch)
    }

    /// Horizontal adjustment between `left` and `right`; 0 when undefined.
    #[inline]
    pub fn kerning(&self, left: char, right: char) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Width of the widest line of `text`, using the same pen rules as
    /// drawing.
    pub fn measure(&self, text: &str) -> f32 {
        let mut widest = 0.0f32;
        let mut pen = 0.0f32;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if ch == '\n' {
                widest = widest.max(pen);
                pen = 0.0;
                prev = None;
                continue;
            }
            let Some(glyph) = self.char_data(ch) else {
                continue;
            };
            if let Some(p) = prev {
                pen += self.kerning(p, ch);
            }
            pen += glyph.x_advance;
            prev = Some(ch);
        }

        widest.max(pen)
    }
}
