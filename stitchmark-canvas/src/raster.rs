//! Flatten a display list onto a pixmap for PNG export.
//!
//! The list is drawn as committed artwork: ghost shapes, endpoint
//! handles, and selection flags never reach the export. Pin numbers and
//! measurement labels are stamped in a second pass and silently skipped
//! when no usable system font can be found.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use ab_glyph::FontArc;
use image::RgbaImage;
use imageproc::drawing::draw_text_mut;
use thiserror::Error;
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};
use tracing::warn;

use crate::geometry::PercentPoint;
use crate::layers::{Rgb, parse_hex_color};
use crate::render::{BlendHint, DrawOp};
use crate::source::SourceError;

// ── Export ink sizing, percent of image width ──

const LINE_WIDTH_PCT: f64 = 0.4;
const ENDPOINT_DOT_PCT: f64 = 0.7;
const PIN_RADIUS_PCT: f64 = 1.8;
const NUMBER_SIZE_PCT: f64 = 2.4;
const LABEL_SIZE_PCT: f64 = 3.0;
const MIN_INK_PX: f32 = 1.5;

// ── Fixed export inks ──

const LINE_INK: Rgb = Rgb { r: 217, g: 75, b: 75 };
const PIN_INK: Rgb = Rgb { r: 31, g: 41, b: 51 };

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot allocate a {width}x{height} surface")]
    Alloc { width: u32, height: u32 },
    #[error("display list has no sketch or fill layer to size the surface from")]
    NoSurface,
    #[error("sketch image unusable: {0}")]
    Source(#[from] SourceError),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Flatten one side's display list into an RGBA image at the sketch's
/// natural pixel size.
///
/// `fill_composite` is the memoized flood-fill layer from
/// [`crate::engine::Engine::fill_composite`]; pass it whenever the list
/// contains [`DrawOp::FillLayer`]. Overlay graphics that fail to decode
/// and strokes with unusable colors are skipped, not fatal.
///
/// # Errors
///
/// Fails when the sketch cannot be decoded, when neither a sketch nor a
/// fill composite is available to size the surface, or when the surface
/// cannot be allocated.
pub fn flatten_side(
    ops: &[DrawOp],
    fill_composite: Option<&RgbaImage>,
) -> Result<RgbaImage, RasterError> {
    let base_source = ops.iter().find_map(|op| match op {
        DrawOp::BaseImage { source, .. } => Some(source),
        _ => None,
    });
    let base = match base_source {
        Some(source) => Some(source.decode()?),
        None => None,
    };
    let (width, height) = base
        .as_ref()
        .map(RgbaImage::dimensions)
        .or_else(|| fill_composite.map(RgbaImage::dimensions))
        .ok_or(RasterError::NoSurface)?;

    let mut pixmap =
        Pixmap::new(width, height).ok_or(RasterError::Alloc { width, height })?;
    for op in ops {
        draw_op(&mut pixmap, op, base.as_ref(), fill_composite, width, height);
    }

    let mut out = read_back(&pixmap);
    draw_text_pass(&mut out, ops, width, height);
    Ok(out)
}

/// Lift an RGBA buffer into a pixmap, premultiplying each pixel.
/// Pixmaps store premultiplied color; straight-alpha bytes copied in
/// raw would composite translucent overlays too bright.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let (w, h) = image.dimensions();
    let mut pixmap = Pixmap::new(w, h)?;
    for (src, dst) in image.pixels().zip(pixmap.pixels_mut()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Read a pixmap back into a straight-alpha RGBA buffer.
fn read_back(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (src, dst) in pixmap.pixels().iter().zip(out.pixels_mut()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Encode a flattened image as PNG bytes.
///
/// # Errors
///
/// Fails when the encoder rejects the image.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn draw_op(
    pixmap: &mut Pixmap,
    op: &DrawOp,
    base: Option<&RgbaImage>,
    fill_composite: Option<&RgbaImage>,
    width: u32,
    height: u32,
) {
    match op {
        DrawOp::FillLayer => {
            if let Some(fills) = fill_composite {
                draw_bitmap(pixmap, fills, BlendMode::SourceOver);
            }
        }
        DrawOp::BaseImage { blend, .. } => {
            if let Some(base) = base {
                let mode = match blend {
                    BlendHint::Normal => BlendMode::SourceOver,
                    BlendHint::Multiply => BlendMode::Multiply,
                };
                draw_bitmap(pixmap, base, mode);
            }
        }
        DrawOp::Graphic { center, width: width_pct, image, .. } => match image.decode() {
            Ok(overlay) => draw_graphic(pixmap, &overlay, *center, *width_pct, width, height),
            Err(err) => warn!(source = %image, error = %err, "overlay graphic skipped"),
        },
        DrawOp::StrokePath { points, color, width: width_pct, .. } => {
            match parse_hex_color(color) {
                Ok(rgb) => {
                    let ink = px(*width_pct, width).max(MIN_INK_PX);
                    stroke_polyline(pixmap, points, rgb, ink, width, height);
                }
                Err(err) => warn!(error = %err, "stroke skipped"),
            }
        }
        DrawOp::Line { start, end, .. } => {
            draw_measure_line(pixmap, *start, *end, width, height);
        }
        DrawOp::PinMarker { at, .. } => draw_pin(pixmap, *at, width, height),
        // Interactive chrome stays on screen.
        DrawOp::GhostStroke { .. } | DrawOp::GhostLine { .. } | DrawOp::EndpointHandle { .. } => {}
    }
}

fn draw_bitmap(pixmap: &mut Pixmap, image: &RgbaImage, blend_mode: BlendMode) {
    let Some(source) = to_pixmap(image) else {
        return;
    };
    let paint = PixmapPaint { blend_mode, ..PixmapPaint::default() };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, Transform::identity(), None);
}

fn draw_graphic(
    pixmap: &mut Pixmap,
    overlay: &RgbaImage,
    center: PercentPoint,
    width_pct: f64,
    width: u32,
    height: u32,
) {
    let (ow, oh) = overlay.dimensions();
    if ow == 0 || oh == 0 {
        return;
    }
    let Some(source) = to_pixmap(overlay) else {
        return;
    };

    // Width comes from the document; height follows the overlay's own
    // aspect ratio.
    let target_w = px(width_pct, width).max(1.0);
    let scale = target_w / upx(ow);
    let target_h = upx(oh) * scale;
    let left = px(center.x, width) - target_w / 2.0;
    let top = px(center.y, height) - target_h / 2.0;

    let paint = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    let transform = Transform::from_row(scale, 0.0, 0.0, scale, left, top);
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
}

fn stroke_polyline(
    pixmap: &mut Pixmap,
    points: &[PercentPoint],
    rgb: Rgb,
    ink_px: f32,
    width: u32,
    height: u32,
) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(px(first.x, width), px(first.y, height));
    for p in rest {
        pb.line_to(px(p.x, width), px(p.y, height));
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb.r, rgb.g, rgb.b, 255);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: ink_px,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn draw_measure_line(
    pixmap: &mut Pixmap,
    start: PercentPoint,
    end: PercentPoint,
    width: u32,
    height: u32,
) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(LINE_INK.r, LINE_INK.g, LINE_INK.b, 255);
    paint.anti_alias = true;

    let mut pb = PathBuilder::new();
    pb.move_to(px(start.x, width), px(start.y, height));
    pb.line_to(px(end.x, width), px(end.y, height));
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: px(LINE_WIDTH_PCT, width).max(MIN_INK_PX),
            line_cap: LineCap::Round,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    let dot = px(ENDPOINT_DOT_PCT, width).max(MIN_INK_PX * 2.0);
    let mut pb = PathBuilder::new();
    pb.push_circle(px(start.x, width), px(start.y, height), dot);
    pb.push_circle(px(end.x, width), px(end.y, height), dot);
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_pin(pixmap: &mut Pixmap, at: PercentPoint, width: u32, height: u32) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(PIN_INK.r, PIN_INK.g, PIN_INK.b, 255);
    paint.anti_alias = true;
    let mut pb = PathBuilder::new();
    pb.push_circle(px(at.x, width), px(at.y, height), px(PIN_RADIUS_PCT, width).max(4.0));
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
}

fn draw_text_pass(image: &mut RgbaImage, ops: &[DrawOp], width: u32, height: u32) {
    let Some(font) = load_system_font() else {
        return;
    };
    for op in ops {
        match op {
            DrawOp::PinMarker { at, number, .. } => {
                let size = px(NUMBER_SIZE_PCT, width).max(8.0);
                draw_text_mut(
                    image,
                    image::Rgba([255, 255, 255, 255]),
                    anchor(px(at.x, width) - size * 0.28),
                    anchor(px(at.y, height) - size * 0.55),
                    size,
                    &font,
                    &number.to_string(),
                );
            }
            DrawOp::Line { start, end, label, target, .. } if !label.is_empty() => {
                let size = px(LABEL_SIZE_PCT, width).max(10.0);
                let text = match target {
                    Some(value) => format!("{label} ({value})"),
                    None => label.clone(),
                };
                let mid_x = px((start.x + end.x) / 2.0, width);
                let mid_y = px((start.y + end.y) / 2.0, height);
                draw_text_mut(
                    image,
                    image::Rgba([LINE_INK.r, LINE_INK.g, LINE_INK.b, 255]),
                    anchor(mid_x - size),
                    anchor(mid_y - size * 1.4),
                    size,
                    &font,
                    &text,
                );
            }
            _ => {}
        }
    }
}

fn load_system_font() -> Option<FontArc> {
    let candidates = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Helvetica.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                return Some(font);
            }
        }
    }
    None
}

#[allow(clippy::cast_possible_truncation)]
fn px(pct: f64, extent: u32) -> f32 {
    (pct / 100.0 * f64::from(extent)) as f32
}

#[allow(clippy::cast_precision_loss)]
fn upx(v: u32) -> f32 {
    v as f32
}

#[allow(clippy::cast_possible_truncation)]
fn anchor(v: f32) -> i32 {
    v.round() as i32
}
