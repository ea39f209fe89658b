use fontdue::{Font, FontSettings, Metrics};
use thiserror::Error;

use crate::render::{BitmapFont, CharData, GpuContext, Graphics, GraphicsError};

/// Printable ASCII.
pub const ASCII: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

#[derive(Debug, Clone)]
pub struct BakeOptions {
    /// Pixel height glyphs are rasterized at.
    pub px: f32,
    /// Characters to bake. Characters the font lacks are skipped.
    pub charset: String,
    /// Atlas width in pixels; the height grows to fit.
    pub atlas_width: u32,
    /// Empty pixels around every glyph, so linear filtering never bleeds
    /// into a neighbour.
    pub padding: u32,
    /// Bake kerning pairs for every ordered pair of charset characters.
    pub kerning: bool,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            px: 24.0,
            charset: ASCII.to_string(),
            atlas_width: 512,
            padding: 1,
            kerning: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum BakeError {
    #[error("failed to parse font: {0}")]
    Parse(&'static str),

    #[error("font has no horizontal line metrics")]
    NoLineMetrics,

    #[error("glyph '{ch}' ({width}px) does not fit a {atlas_width}px atlas")]
    GlyphTooWide { ch: char, width: u32, atlas_width: u32 },

    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

/// Rasterizes `options.charset` from `bytes` into an atlas texture owned by
/// `gfx` and returns the font metrics that go with it.
pub fn bake_font<G: GpuContext>(
    gfx: &mut Graphics<G>,
    bytes: &[u8],
    options: &BakeOptions,
) -> Result<BitmapFont, BakeError> {
    let font = Font::from_bytes(
        bytes,
        FontSettings {
            scale: options.px,
            ..FontSettings::default()
        },
    )
    .map_err(BakeError::Parse)?;

    let line = font
        .horizontal_line_metrics(options.px)
        .ok_or(BakeError::NoLineMetrics)?;

    let mut chars: Vec<char> = options
        .charset
        .chars()
        .filter(|&c| c == ' ' || font.lookup_glyph_index(c) != 0)
        .collect();
    chars.sort_unstable();
    chars.dedup();

    let glyphs: Vec<(char, Metrics, Vec<u8>)> = chars
        .iter()
        .map(|&c| {
            let (metrics, coverage) = font.rasterize(c, options.px);
            (c, metrics, coverage)
        })
        .collect();

    let sizes: Vec<(u32, u32)> = glyphs
        .iter()
        .map(|(_, m, _)| (m.width as u32, m.height as u32))
        .collect();

    let packed = pack_glyphs(&sizes, options.atlas_width, options.padding).map_err(|i| {
        BakeError::GlyphTooWide {
            ch: glyphs[i].0,
            width: sizes[i].0,
            atlas_width: options.atlas_width,
        }
    })?;

    let mut rgba = vec![0u8; options.atlas_width as usize * packed.height as usize * 4];
    for ((_, m, coverage), &(x, y)) in glyphs.iter().zip(&packed.positions) {
        blit_coverage(&mut rgba, options.atlas_width, x, y, m.width, coverage);
    }

    let texture = gfx.create_texture(options.atlas_width, packed.height, &rgba)?;
    let mut out = BitmapFont::new(texture, line.new_line_size.ceil());

    for ((c, m, _), &(x, y)) in glyphs.iter().zip(&packed.positions) {
        out.insert_glyph(*c, char_data(m, x, y, line.ascent));
    }

    if options.kerning {
        for &left in &chars {
            for &right in &chars {
                if let Some(k) = font.horizontal_kern(left, right, options.px) {
                    if k != 0.0 {
                        out.insert_kerning(left, right, k);
                    }
                }
            }
        }
    }

    log::debug!(
        "baked {} glyphs at {}px into a {}x{} atlas",
        glyphs.len(),
        options.px,
        options.atlas_width,
        packed.height
    );
    Ok(out)
}

/// Pen-relative placement of a glyph whose bitmap sits at (`x`, `y`) in the
/// atlas. The pen is at the top of the line; the baseline is `ascent` below.
fn char_data(m: &Metrics, x: u32, y: u32, ascent: f32) -> CharData {
    CharData {
        x: x as f32,
        y: y as f32,
        width: m.width as f32,
        height: m.height as f32,
        x_offset: m.xmin as f32,
        y_offset: (ascent - (m.ymin as f32 + m.height as f32)).round(),
        x_advance: m.advance_width.round(),
    }
}

/// Writes a coverage bitmap as white texels with coverage in alpha.
fn blit_coverage(rgba: &mut [u8], atlas_width: u32, x: u32, y: u32, width: usize, coverage: &[u8]) {
    if width == 0 {
        return;
    }
    let stride = atlas_width as usize * 4;
    for (row, src) in coverage.chunks_exact(width).enumerate() {
        let start = (y as usize + row) * stride + x as usize * 4;
        let dst = &mut rgba[start..start + width * 4];
        for (texel, &a) in dst.chunks_exact_mut(4).zip(src) {
            texel.copy_from_slice(&[255, 255, 255, a]);
        }
    }
}

#[derive(Debug, PartialEq)]
struct Packed {
    positions: Vec<(u32, u32)>,
    height: u32,
}

/// Shelf packer: glyphs fill rows left to right; a glyph that does not fit
/// horizontally opens a new row below the tallest glyph of the current one.
///
/// Errors with the index of the first glyph wider than the atlas.
fn pack_glyphs(sizes: &[(u32, u32)], atlas_width: u32, padding: u32) -> Result<Packed, usize> {
    let mut positions = Vec::with_capacity(sizes.len());
    let mut cursor_x = padding;
    let mut cursor_y = padding;
    let mut row_height = 0;

    for (i, &(w, h)) in sizes.iter().enumerate() {
        if w + 2 * padding > atlas_width {
            return Err(i);
        }
        if cursor_x + w + padding > atlas_width {
            cursor_y += row_height + padding;
            cursor_x = padding;
            row_height = 0;
        }
        positions.push((cursor_x, cursor_y));
        cursor_x += w + padding;
        row_height = row_height.max(h);
    }

    Ok(Packed {
        positions,
        height: (cursor_y + row_height + padding).max(1),
    })
}
