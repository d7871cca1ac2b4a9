//! Layer model: the five annotation entity types and the per-side container.
//!
//! Every entity stores its geometry in percent image space (see
//! [`crate::geometry::PercentPoint`]), so documents survive any display
//! size. `SideLayers` owns one list per layer; the engine mutates it and
//! hands whole lists back to the host, the renderer reads it to build a
//! display list, and the fill engine replays `fills` over the sketch
//! bitmap.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{FILL_DEFAULT_TOLERANCE, GRAPHIC_MAX_WIDTH_PCT, GRAPHIC_MIN_WIDTH_PCT};
use crate::geometry::PercentPoint;
use crate::source::ImageSource;

/// Unique identifier for a layer entity.
pub type EntityId = Uuid;

/// A numbered annotation pin with a free-text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Unique identifier for this pin.
    pub id: EntityId,
    /// Horizontal position, percent of image width.
    pub x: f64,
    /// Vertical position, percent of image height.
    pub y: f64,
    /// 1-based display number, contiguous across the side's pins.
    pub number: u32,
    /// Free-text construction note attached to the pin.
    #[serde(default)]
    pub note: String,
}

/// A freehand polyline captured from one draw gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Unique identifier for this stroke.
    pub id: EntityId,
    /// Captured points in gesture order. Always at least two.
    pub points: Vec<PercentPoint>,
    /// Stroke color as `#RRGGBB`.
    pub color: String,
    /// Stroke width, percent of image width.
    pub width: f64,
}

/// A two-endpoint measurement line with a free-text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureLine {
    /// Unique identifier for this line.
    pub id: EntityId,
    /// First endpoint.
    pub start: PercentPoint,
    /// Second endpoint.
    pub end: PercentPoint,
    /// Label text, typically a measurement code like `CHEST`.
    #[serde(default)]
    pub label: String,
}

/// A repositionable overlay image (logo, print, trim detail).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedGraphic {
    /// Unique identifier for this graphic.
    pub id: EntityId,
    /// Center position, percent of image width.
    pub x: f64,
    /// Center position, percent of image height.
    pub y: f64,
    /// Rendered width, percent of image width. Height follows the
    /// graphic's own aspect ratio.
    pub width: f64,
    /// The overlay image itself.
    pub image: ImageSource,
}

impl PlacedGraphic {
    /// Set the width, clamped to the allowed range.
    pub fn set_width(&mut self, width: f64) {
        self.width = clamp_graphic_width(width);
    }
}

/// One recorded flood-fill action: seed position, paint, and tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFill {
    /// Unique identifier for this fill.
    pub id: EntityId,
    /// Seed position, percent of image width.
    pub x: f64,
    /// Seed position, percent of image height.
    pub y: f64,
    /// Solid fill color as `#RRGGBB`. Ignored for painting when
    /// `pattern` is present, but kept for the host's swatch UI.
    pub color: String,
    /// Optional pattern image tiled across the region instead of the
    /// solid color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<ImageSource>,
    /// Per-channel match tolerance on the 0–255 scale, inclusive.
    #[serde(default = "default_tolerance")]
    pub tolerance: u8,
}

fn default_tolerance() -> u8 {
    FILL_DEFAULT_TOLERANCE
}

/// A measurement-code record used for read-only target display next to
/// line labels. Owned by the host document, never edited on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSpec {
    /// Measurement code, e.g. `CHEST` or `SLEEVE-L`.
    pub code: String,
    /// Target value in the document's unit of measure.
    pub target: f64,
}

/// Validation failure in host-supplied layer data.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("{entity} coordinate out of range: {axis} = {value} (expected 0–100)")]
    CoordinateOutOfRange {
        entity: &'static str,
        axis: &'static str,
        value: f64,
    },
    #[error("invalid color `{0}` (expected #RRGGBB)")]
    InvalidColor(String),
    #[error("non-positive stroke width: {0}")]
    NonPositiveWidth(f64),
    #[error("non-finite graphic width: {0}")]
    NonFiniteWidth(f64),
    #[error("stroke has fewer than two points")]
    DegenerateStroke,
}

/// A parsed `#RRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse a strict `#RRGGBB` hex color.
///
/// # Errors
///
/// Returns [`LayerError::InvalidColor`] for anything that is not a `#`
/// followed by exactly six hex digits.
pub fn parse_hex_color(raw: &str) -> Result<Rgb, LayerError> {
    let hex = raw
        .strip_prefix('#')
        .filter(|h| h.len() == 6 && h.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| LayerError::InvalidColor(raw.to_string()))?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| LayerError::InvalidColor(raw.to_string()))
    };
    Ok(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// Clamp a placed-graphic width into the slider range.
#[must_use]
pub fn clamp_graphic_width(width: f64) -> f64 {
    width.clamp(GRAPHIC_MIN_WIDTH_PCT, GRAPHIC_MAX_WIDTH_PCT)
}

/// All five layer lists for one garment side.
///
/// Lists are append-ordered: later entries were created later and draw
/// on top of earlier ones within their layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideLayers {
    /// Numbered annotation pins.
    #[serde(default)]
    pub pins: Vec<Pin>,
    /// Freehand strokes.
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    /// Measurement lines.
    #[serde(default)]
    pub lines: Vec<MeasureLine>,
    /// Placed overlay graphics.
    #[serde(default)]
    pub graphics: Vec<PlacedGraphic>,
    /// Recorded flood fills, in application order.
    #[serde(default)]
    pub fills: Vec<RegionFill>,
}

impl SideLayers {
    /// Append a new pin at `at`, numbered after the current last pin.
    pub fn add_pin(&mut self, at: PercentPoint) -> EntityId {
        let id = Uuid::new_v4();
        let number = u32::try_from(self.pins.len()).unwrap_or(u32::MAX).saturating_add(1);
        self.pins.push(Pin {
            id,
            x: at.x,
            y: at.y,
            number,
            note: String::new(),
        });
        id
    }

    /// Remove a pin and renumber the remainder contiguously from 1.
    /// Returns `false` when no pin has that id.
    pub fn remove_pin(&mut self, id: EntityId) -> bool {
        let before = self.pins.len();
        self.pins.retain(|p| p.id != id);
        let removed = self.pins.len() != before;
        if removed {
            self.renumber_pins();
        }
        removed
    }

    /// Reassign pin numbers to 1..=len in list order.
    pub fn renumber_pins(&mut self) {
        for (index, pin) in self.pins.iter_mut().enumerate() {
            pin.number = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
        }
    }

    /// Look up a pin by id.
    #[must_use]
    pub fn pin_mut(&mut self, id: EntityId) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|p| p.id == id)
    }

    /// Look up a measurement line by id.
    #[must_use]
    pub fn line_mut(&mut self, id: EntityId) -> Option<&mut MeasureLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    /// Look up a placed graphic by id.
    #[must_use]
    pub fn graphic_mut(&mut self, id: EntityId) -> Option<&mut PlacedGraphic> {
        self.graphics.iter_mut().find(|g| g.id == id)
    }

    /// Total entity count across all five layers.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.pins.len()
            + self.strokes.len()
            + self.lines.len()
            + self.graphics.len()
            + self.fills.len()
    }

    /// Returns `true` when every layer list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Check host-supplied data for hard violations.
    ///
    /// Gesture-created entities always pass; this guards the load
    /// boundary against documents written by other tools.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayerError`] found, scanning pins, strokes,
    /// lines, graphics, then fills.
    pub fn validate(&self) -> Result<(), LayerError> {
        for pin in &self.pins {
            check_coord("pin", "x", pin.x)?;
            check_coord("pin", "y", pin.y)?;
        }
        for stroke in &self.strokes {
            if stroke.points.len() < 2 {
                return Err(LayerError::DegenerateStroke);
            }
            for point in &stroke.points {
                check_coord("stroke", "x", point.x)?;
                check_coord("stroke", "y", point.y)?;
            }
            parse_hex_color(&stroke.color)?;
            if !stroke.width.is_finite() || stroke.width <= 0.0 {
                return Err(LayerError::NonPositiveWidth(stroke.width));
            }
        }
        for line in &self.lines {
            check_coord("line", "x", line.start.x)?;
            check_coord("line", "y", line.start.y)?;
            check_coord("line", "x", line.end.x)?;
            check_coord("line", "y", line.end.y)?;
        }
        for graphic in &self.graphics {
            check_coord("graphic", "x", graphic.x)?;
            check_coord("graphic", "y", graphic.y)?;
            if !graphic.width.is_finite() {
                return Err(LayerError::NonFiniteWidth(graphic.width));
            }
        }
        for fill in &self.fills {
            check_coord("fill", "x", fill.x)?;
            check_coord("fill", "y", fill.y)?;
            if fill.pattern.is_none() {
                parse_hex_color(&fill.color)?;
            }
        }
        Ok(())
    }

    /// Repair soft drift in host-supplied data: pin numbering gaps and
    /// graphic widths outside the slider range.
    pub fn normalize(&mut self) {
        self.renumber_pins();
        for graphic in &mut self.graphics {
            graphic.width = clamp_graphic_width(graphic.width);
        }
    }
}

fn check_coord(entity: &'static str, axis: &'static str, value: f64) -> Result<(), LayerError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(LayerError::CoordinateOutOfRange { entity, axis, value })
    }
}
