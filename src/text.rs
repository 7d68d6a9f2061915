//! Caption layout.
//!
//! Lays a caption out as device-space glyph paths: glyph outlines come from
//! ttf-parser, are collected into tiny-skia paths, then scaled and placed on
//! their baseline. The layout origin is the top-left corner of the first
//! line's ascender box.

use tiny_skia::{Path, PathBuilder, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Extra pixels between consecutive lines of a multi-line caption.
pub const LINE_SPACING: f32 = 4.0;

/// Converts ttf-parser glyph outlines to tiny-skia paths in font units (y-up).
pub struct GlyphOutlineBuilder {
    builder: PathBuilder,
}

impl GlyphOutlineBuilder {
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
        }
    }

    pub fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl Default for GlyphOutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineBuilder for GlyphOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Axis-aligned box in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Grows the box by `dx` on the left and right and by `dy` on the top and bottom.
    pub fn expanded(&self, dx: f32, dy: f32) -> BoundingBox {
        BoundingBox {
            left: self.left - dx,
            top: self.top - dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    fn union(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// A caption laid out at a fixed origin.
#[derive(Debug, Clone)]
pub struct TextLayout {
    glyphs: Vec<Path>,
    ink: Option<BoundingBox>,
    advance: BoundingBox,
}

impl TextLayout {
    /// Device-space glyph outlines, ready to fill.
    pub fn glyphs(&self) -> &[Path] {
        &self.glyphs
    }

    /// Tight box around the rendered ink. Captions with no visible glyphs
    /// (empty or whitespace-only) fall back to their advance box.
    pub fn bounding_box(&self) -> BoundingBox {
        self.ink.unwrap_or(self.advance)
    }
}

/// Lays `text` out at `origin` with the face scaled to `size` pixels per em.
pub fn layout(face: &Face<'_>, size: f32, origin: (f32, f32), text: &str) -> TextLayout {
    let scale = size / f32::from(face.units_per_em().max(1));
    let ascender = f32::from(face.ascender()) * scale;
    let descender = f32::from(face.descender()) * scale;
    let line_gap = f32::from(face.line_gap()) * scale;
    let line_advance = ascender - descender + line_gap + LINE_SPACING;

    let (origin_x, origin_y) = origin;
    let mut glyphs = Vec::new();
    let mut ink: Option<BoundingBox> = None;
    let mut widest = 0.0f32;
    let mut line_count = 0usize;

    for (index, line) in text.split('\n').enumerate() {
        line_count = index + 1;
        let baseline = origin_y + ascender + index as f32 * line_advance;
        let mut pen_x = origin_x;
        let mut previous: Option<GlyphId> = None;

        for ch in line.chars().filter(|c| !c.is_control()) {
            let glyph_id = face.glyph_index(ch).unwrap_or(GlyphId(0));
            if let Some(left) = previous {
                pen_x += f32::from(kerning(face, left, glyph_id)) * scale;
            }

            if let Some(path) = glyph_path(face, glyph_id, scale, pen_x, baseline) {
                let bounds = path.bounds();
                let glyph_box = BoundingBox {
                    left: bounds.left(),
                    top: bounds.top(),
                    right: bounds.right(),
                    bottom: bounds.bottom(),
                };
                ink = Some(match ink {
                    Some(acc) => acc.union(glyph_box),
                    None => glyph_box,
                });
                glyphs.push(path);
            }

            pen_x += f32::from(face.glyph_hor_advance(glyph_id).unwrap_or(0)) * scale;
            previous = Some(glyph_id);
        }
        widest = widest.max(pen_x - origin_x);
    }

    let advance = BoundingBox {
        left: origin_x,
        top: origin_y,
        right: origin_x + widest,
        bottom: origin_y + ascender - descender + (line_count.saturating_sub(1)) as f32 * line_advance,
    };

    TextLayout {
        glyphs,
        ink,
        advance,
    }
}

fn glyph_path(face: &Face<'_>, glyph_id: GlyphId, scale: f32, x: f32, baseline: f32) -> Option<Path> {
    let mut builder = GlyphOutlineBuilder::new();
    face.outline_glyph(glyph_id, &mut builder)?;
    // Font units are y-up; flip onto the y-down canvas at the pen position.
    let transform = Transform::from_row(scale, 0.0, 0.0, -scale, x, baseline);
    builder.finish()?.transform(transform)
}

fn kerning(face: &Face<'_>, left: GlyphId, right: GlyphId) -> i16 {
    let Some(kern) = face.tables().kern else {
        return 0;
    };
    kern.subtables
        .into_iter()
        .filter(|subtable| subtable.horizontal && !subtable.variable)
        .find_map(|subtable| subtable.glyphs_kerning(left, right))
        .unwrap_or(0)
}
