#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in percent image space.
///
/// Both axes run 0–100 relative to the rendered image box, so a stored
/// point lands on the same garment feature at any display size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both axes lie inside the image box (inclusive edges).
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }

    /// Euclidean distance to `other`, in percent units.
    #[must_use]
    pub fn dist(&self, other: PercentPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Snap both axes into the image box. Drag gestures use this so a
    /// pointer that wanders off the element leaves coordinates storable.
    #[must_use]
    pub fn clamped(self) -> PercentPoint {
        PercentPoint {
            x: self.x.clamp(0.0, 100.0),
            y: self.y.clamp(0.0, 100.0),
        }
    }
}

/// A point in screen space (CSS pixels of the host viewport).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The rendered image box inside the host viewport.
///
/// `left` / `top` are in CSS pixels. All percent conversions are taken
/// against this box, never against raw bitmap dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContainerBox {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, width: 1000.0, height: 1000.0 }
    }
}

impl ContainerBox {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Convert a screen-space point to percent image space.
    #[must_use]
    pub fn to_percent(&self, screen: ScreenPoint) -> PercentPoint {
        PercentPoint {
            x: (screen.x - self.left) / self.width * 100.0,
            y: (screen.y - self.top) / self.height * 100.0,
        }
    }

    /// Convert a percent-space point back to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, pct: PercentPoint) -> ScreenPoint {
        ScreenPoint {
            x: pct.x / 100.0 * self.width + self.left,
            y: pct.y / 100.0 * self.height + self.top,
        }
    }
}

/// Convert a percent coordinate (0–100) to a unit fraction (0–1).
#[must_use]
pub fn percent_to_fraction(pct: f64) -> f64 {
    pct / 100.0
}

/// Map a unit fraction onto a pixel index within `extent` pixels.
///
/// Returns `None` when the fraction lands outside the buffer, so a seed
/// taken from a stale or off-image coordinate is dropped rather than
/// clamped onto the nearest edge pixel.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fraction_to_pixel(frac: f64, extent: u32) -> Option<u32> {
    if !frac.is_finite() || frac < 0.0 {
        return None;
    }
    let px = (frac * f64::from(extent)).floor();
    if px >= f64::from(extent) {
        return None;
    }
    Some(px as u32)
}

/// A raw pointer sample from the host, before normalization.
///
/// Mouse and touch input collapse onto one interaction point; multi-touch
/// beyond the first finger is ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse(ScreenPoint),
    Touch(Vec<ScreenPoint>),
}

impl PointerInput {
    /// The position used for interaction: the mouse point, or the first touch.
    #[must_use]
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            PointerInput::Mouse(p) => Some(*p),
            PointerInput::Touch(points) => points.first().copied(),
        }
    }
}
