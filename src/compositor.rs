//! Caption compositing.
//!
//! `ImageCompositor::render` fetches the source image, then on the blocking
//! pool decodes it, resolves the caption position against the source size,
//! lays down the optional dark overlay, the optional background box and the
//! caption glyphs in that order, and encodes a JPEG. The JPEG is written to
//! scratch storage only after every step succeeded.

use crate::{
    color::Rgba,
    domain::FileStorage,
    errors::RenderError,
    fonts::FontResolver,
    models::{RenderRequest, RenderedArtifact, TextPosition},
    storage::random_filename,
    text::{self, BoundingBox},
};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::{io::Cursor, sync::Arc};
use tiny_skia::{ColorU8, FillRule, Paint, Pixmap, Rect, Transform};

/// Extension of every rendered artifact.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Fixed growth of the background box beyond the text, added to the requested padding.
pub const BACKGROUND_MARGIN_X: i64 = 10;
pub const BACKGROUND_MARGIN_Y: i64 = 15;

pub struct ImageCompositor {
    http: reqwest::Client,
    fonts: Arc<FontResolver>,
    storage: Arc<dyn FileStorage>,
}

impl ImageCompositor {
    pub fn new(http: reqwest::Client, fonts: Arc<FontResolver>, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            http,
            fonts,
            storage,
        }
    }

    /// Renders the caption and stores the result under a fresh random name.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderedArtifact, RenderError> {
        let source = self.fetch_source(&request.image_url).await?;

        let fonts = Arc::clone(&self.fonts);
        let job = request.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            let rendered = compose(&source, &job, &fonts)?;
            encode_jpeg(&rendered)
        })
        .await
        .map_err(|e| RenderError::Processing(format!("render task failed: {e}")))??;

        let filename = format!("{}.{}", random_filename(), OUTPUT_EXTENSION);
        self.storage.write(&filename, encoded).await?;

        tracing::info!(filename = %filename, source = %request.image_url, "Rendered caption image");
        Ok(RenderedArtifact { filename })
    }

    async fn fetch_source(&self, url: &str) -> Result<Bytes, RenderError> {
        tracing::debug!(source = %url, "Fetching source image");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RenderError::SourceFetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::SourceFetch(e.to_string()))?;
        tracing::debug!(source = %url, bytes = bytes.len(), "Fetched source image");
        Ok(bytes)
    }
}

/// Truncates the fractional position onto the source pixel grid.
pub fn resolve_position(position: TextPosition, width: u32, height: u32) -> (i64, i64) {
    let x = (position.x * f64::from(width)).trunc() as i64;
    let y = (position.y * f64::from(height)).trunc() as i64;
    (x, y)
}

/// Overlay alpha for an intensity, clamped to the byte range.
pub fn overlay_alpha(intensity: f64) -> u8 {
    if intensity.is_nan() {
        return 0;
    }
    (255.0 * intensity).round().clamp(0.0, 255.0) as u8
}

/// Draws the caption described by `request` onto the decoded `source` bytes. Blocking.
pub fn compose(source: &[u8], request: &RenderRequest, fonts: &FontResolver) -> Result<RgbaImage, RenderError> {
    let decoded = image::load_from_memory(source)
        .map_err(|e| RenderError::SourceFetch(format!("source is not a decodable image: {e}")))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    let (x, y) = resolve_position(request.text_position, width, height);

    let font = fonts.load(request.is_bold, request.is_italic, request.font_size)?;
    let face = font.face()?;
    let font_color = parse_color("font_color", &request.font_color)?;
    let background = if request.background_enabled {
        let spec = request.background_color.as_deref().ok_or_else(|| {
            RenderError::Configuration("background_color is required when background is enabled".into())
        })?;
        Some(parse_color("background_color", spec)?)
    } else {
        None
    };

    let mut canvas = to_pixmap(&decoded)?;

    if request.overlay_enabled {
        let alpha = overlay_alpha(request.overlay_intensity);
        if alpha > 0 {
            if let Some(full) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
                let shade = solid(Rgba { a: alpha, ..Rgba::BLACK });
                canvas.fill_rect(full, &shade, Transform::identity(), None);
            }
        }
    }

    let layout = text::layout(&face, font.size(), (x as f32, y as f32), &request.text);

    if let Some(color) = background {
        let padded = layout.bounding_box().expanded(
            request.padding_x.saturating_add(BACKGROUND_MARGIN_X) as f32,
            request.padding_y.saturating_add(BACKGROUND_MARGIN_Y) as f32,
        );
        match background_rect(padded, width, height) {
            Some(rect) => canvas.fill_rect(rect, &solid(color), Transform::identity(), None),
            None => tracing::debug!(?padded, "Background box is empty or off-canvas, skipping"),
        }
    }

    let paint = solid(font_color);
    for glyph in layout.glyphs() {
        canvas.fill_path(glyph, &paint, FillRule::Winding, Transform::identity(), None);
    }

    from_pixmap(&canvas)
}

/// Encodes the raster as a JPEG at the encoder's default quality.
pub fn encode_jpeg(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .map_err(|e| RenderError::Processing(format!("JPEG encoding failed: {e}")))?;
    Ok(buf)
}

fn parse_color(field: &str, spec: &str) -> Result<Rgba, RenderError> {
    spec.parse()
        .map_err(|e| RenderError::Configuration(format!("{field}: {e}")))
}

fn solid(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

// Box corners are inclusive, so the fill reaches one pixel past the right and bottom edges.
// The result is clipped to the canvas.
fn background_rect(bbox: BoundingBox, width: u32, height: u32) -> Option<Rect> {
    if bbox.right < bbox.left || bbox.bottom < bbox.top {
        return None;
    }
    let (w, h) = (width as f32, height as f32);
    Rect::from_ltrb(
        bbox.left.clamp(0.0, w),
        bbox.top.clamp(0.0, h),
        (bbox.right + 1.0).clamp(0.0, w),
        (bbox.bottom + 1.0).clamp(0.0, h),
    )
}

fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, RenderError> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        RenderError::Processing(format!("cannot allocate a {width}x{height} canvas"))
    })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

fn from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage, RenderError> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let color = pixel.demultiply();
            [color.red(), color.green(), color.blue(), color.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| RenderError::Processing("canvas size does not match its pixel buffer".into()))
}
