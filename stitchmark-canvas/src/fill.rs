//! Flood-fill engine: replays recorded fills over the sketch bitmap.
//!
//! Fills are data, not pixels. Each [`RegionFill`] stores a seed point in
//! percent space plus paint settings, and the composite is rebuilt by
//! replaying the list over the pristine sketch bitmap. Region membership
//! is always decided against the pristine bitmap, never the composite,
//! so overlapping fills repaint each other without changing each other's
//! shape. Painting goes to the composite, where the last fill over a
//! pixel wins.

#[cfg(test)]
#[path = "fill_test.rs"]
mod fill_test;

use std::collections::HashMap;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::geometry::{fraction_to_pixel, percent_to_fraction};
use crate::layers::{RegionFill, parse_hex_color};
use crate::source::ImageSource;

/// Decoded-bitmap cache for the sketch image.
///
/// Holds at most one decoded buffer; swapping the source identity drops
/// it. Decode failures are cached too, so a bad source logs once rather
/// than once per pointer event.
#[derive(Default)]
pub struct BitmapCache {
    slot: Option<(ImageSource, Option<RgbaImage>)>,
}

impl BitmapCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The decoded buffer for `source`, decoding on first use.
    pub fn get(&mut self, source: &ImageSource) -> Option<&RgbaImage> {
        let cached = matches!(&self.slot, Some((key, _)) if key == source);
        if !cached {
            let decoded = match source.decode() {
                Ok(img) => Some(img),
                Err(err) => {
                    warn!(source = %source, error = %err, "sketch image failed to decode");
                    None
                }
            };
            self.slot = Some((source.clone(), decoded));
        }
        self.slot.as_ref().and_then(|(_, img)| img.as_ref())
    }

    /// Drop whatever is cached.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

/// One compose pass's pattern cache, so N fills sharing a pattern image
/// decode it once per pass.
#[derive(Default)]
struct PatternCache {
    decoded: HashMap<ImageSource, Option<RgbaImage>>,
}

impl PatternCache {
    fn get(&mut self, source: &ImageSource) -> Option<&RgbaImage> {
        self.decoded
            .entry(source.clone())
            .or_insert_with(|| match source.decode() {
                Ok(img) => Some(img),
                Err(err) => {
                    warn!(source = %source, error = %err, "fill pattern failed to decode");
                    None
                }
            })
            .as_ref()
    }
}

/// What a fill paints with once region membership is decided.
enum Paint<'a> {
    Solid([u8; 4]),
    /// Tiled from the image's own top-left corner, independent of the
    /// seed position.
    Pattern(&'a RgbaImage),
}

impl Paint<'_> {
    fn at(&self, x: u32, y: u32) -> [u8; 4] {
        match self {
            Paint::Solid(px) => *px,
            Paint::Pattern(tile) => {
                let (tw, th) = tile.dimensions();
                tile.get_pixel(x % tw, y % th).0
            }
        }
    }
}

/// Replay `fills` over the pristine `source` bitmap, in list order.
///
/// Fills that cannot apply (seed off the image or on a fully transparent
/// pixel, undecodable pattern, unparseable color) are skipped and leave
/// the composite untouched.
#[must_use]
pub fn compose(source: &RgbaImage, fills: &[RegionFill]) -> RgbaImage {
    let mut composite = source.clone();
    let mut patterns = PatternCache::default();
    for fill in fills {
        apply_fill(source, &mut composite, fill, &mut patterns);
    }
    composite
}

/// Composite for a side's sketch: decode through `cache`, then replay
/// `fills`. `None` when there is no usable sketch bitmap.
pub fn compose_side(
    cache: &mut BitmapCache,
    image: Option<&ImageSource>,
    fills: &[RegionFill],
) -> Option<RgbaImage> {
    let source = cache.get(image?)?;
    Some(compose(source, fills))
}

fn apply_fill(
    source: &RgbaImage,
    composite: &mut RgbaImage,
    fill: &RegionFill,
    patterns: &mut PatternCache,
) {
    let (width, height) = source.dimensions();
    let Some(seed_x) = fraction_to_pixel(percent_to_fraction(fill.x), width) else {
        debug!(fill = %fill.id, x = fill.x, "fill seed off image, skipped");
        return;
    };
    let Some(seed_y) = fraction_to_pixel(percent_to_fraction(fill.y), height) else {
        debug!(fill = %fill.id, y = fill.y, "fill seed off image, skipped");
        return;
    };
    let seed = source.get_pixel(seed_x, seed_y).0;
    if seed[3] == 0 {
        debug!(fill = %fill.id, "fill seed on a fully transparent pixel, skipped");
        return;
    }

    let paint = match &fill.pattern {
        Some(pattern_src) => match patterns.get(pattern_src) {
            Some(tile) if tile.width() > 0 && tile.height() > 0 => Paint::Pattern(tile),
            _ => return,
        },
        None => match parse_hex_color(&fill.color) {
            Ok(rgb) => Paint::Solid([rgb.r, rgb.g, rgb.b, 255]),
            Err(err) => {
                warn!(fill = %fill.id, error = %err, "fill color unusable, skipped");
                return;
            }
        },
    };

    flood(source, composite, (seed_x, seed_y), seed, fill.tolerance, &paint);
}

/// Stack-based 4-connected flood from `seed_at`.
///
/// Membership tests read `source`; paint lands in `composite`. The
/// visited set keeps already-decided pixels off the stack.
fn flood(
    source: &RgbaImage,
    composite: &mut RgbaImage,
    seed_at: (u32, u32),
    seed: [u8; 4],
    tolerance: u8,
    paint: &Paint<'_>,
) {
    let (width, height) = source.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let mut stack = Vec::with_capacity(1024);
    stack.push(seed_at);

    while let Some((x, y)) = stack.pop() {
        let idx = y as usize * width as usize + x as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        if !matches_seed(source.get_pixel(x, y).0, seed, tolerance) {
            continue;
        }
        composite.put_pixel(x, y, image::Rgba(paint.at(x, y)));
        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }
}

/// Inclusive per-channel match across all four RGBA channels.
fn matches_seed(pixel: [u8; 4], seed: [u8; 4], tolerance: u8) -> bool {
    pixel
        .iter()
        .zip(&seed)
        .all(|(p, s)| p.abs_diff(*s) <= tolerance)
}
